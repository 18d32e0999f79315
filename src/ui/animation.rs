use std::f32::consts::PI;
use std::marker::PhantomData;
use std::time::Duration;

use lateshift_derive::Component;

use crate::ecs::{Component, EntityCollection, EntityId, System, SystemSignature};
use crate::input::InputAction;

use super::color::Color;
use super::components::{HasColor, HasOpacity, HasUIModifiers};
use super::context::UIContext;

#[derive(Debug, Clone, PartialEq)]
pub enum AnimationDirection {
    Forward,
    Backward,
    Alternate,
    AlternateReverse,
}

impl AnimationDirection {
    pub fn is_flippable(&self) -> bool {
        matches!(
            self,
            AnimationDirection::Alternate | AnimationDirection::AlternateReverse
        )
    }
}

/// What drives an animation: pointer hover (eases back out when the pointer
/// leaves) or free-running.
#[derive(Debug, Clone, PartialEq)]
pub enum AnimationWhen {
    Hover,
    Forever,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationRange<T> {
    pub from: T,
    pub to: T,
}

impl<T> AnimationRange<T> {
    pub fn new(from: T, to: T) -> Self {
        Self { from, to }
    }
}

/// Which widget property the animation writes each frame.
#[derive(Debug, Clone, PartialEq)]
pub enum AnimationType {
    Color { range: AnimationRange<Color> },
    Scale { range: AnimationRange<f32> },
    Opacity { range: AnimationRange<f32> },
}

#[derive(Debug, Clone)]
pub struct AnimationConfig {
    pub duration: Duration,
    pub direction: AnimationDirection,
    pub easing: EasingFunction,
    pub animation_type: AnimationType,
    pub when: AnimationWhen,
}

impl AnimationConfig {
    /// Hover scale-up, the most common decoration.
    pub fn hover_scale(to: f32) -> Self {
        Self {
            duration: Duration::from_millis(150),
            direction: AnimationDirection::Forward,
            easing: EasingFunction::EaseOutQuad,
            animation_type: AnimationType::Scale {
                range: AnimationRange::new(1.0, to),
            },
            when: AnimationWhen::Hover,
        }
    }

    pub fn hover_color(from: Color, to: Color) -> Self {
        Self {
            duration: Duration::from_millis(150),
            direction: AnimationDirection::Forward,
            easing: EasingFunction::EaseOutQuad,
            animation_type: AnimationType::Color {
                range: AnimationRange::new(from, to),
            },
            when: AnimationWhen::Hover,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EasingFunction {
    Linear,
    EaseInSine,
    EaseInQuad,
    EaseInCubic,
    EaseInExpo,
    EaseInCirc,
    EaseInBack,
    EaseOutSine,
    EaseOutQuad,
    EaseOutCubic,
    EaseOutExpo,
    EaseOutCirc,
    EaseOutBack,
    EaseOutBounce,
    EaseInOutSine,
    EaseInOutQuad,
    EaseInOutCubic,
    EaseInOutExpo,
    EaseInOutBack,
}

impl EasingFunction {
    pub fn compute(&self, t: f32) -> f32 {
        match self {
            EasingFunction::Linear => t,
            EasingFunction::EaseInSine => 1.0 - (t * PI / 2.0).cos(),
            EasingFunction::EaseInQuad => t * t,
            EasingFunction::EaseInCubic => t * t * t,
            EasingFunction::EaseInExpo => {
                if t == 0.0 {
                    0.0
                } else {
                    2.0f32.powf(10.0 * t - 10.0)
                }
            }
            EasingFunction::EaseInCirc => 1.0 - (1.0 - t * t).sqrt(),
            EasingFunction::EaseInBack => {
                let c1 = 1.70158;
                let c3 = c1 + 1.0;
                c3 * t * t * t - c1 * t * t
            }
            EasingFunction::EaseOutSine => ((t * PI) / 2.0).sin(),
            EasingFunction::EaseOutQuad => 1.0 - (1.0 - t) * (1.0 - t),
            EasingFunction::EaseOutCubic => 1.0 - (1.0 - t).powi(3),
            EasingFunction::EaseOutExpo => {
                if t == 1.0 {
                    1.0
                } else {
                    1.0 - 2.0f32.powf(-10.0 * t)
                }
            }
            EasingFunction::EaseOutCirc => (1.0 - ((t - 1.0) * (t - 1.0))).sqrt(),
            EasingFunction::EaseOutBack => {
                let c1 = 1.70158;
                let c3 = c1 + 1.0;
                1.0 + c3 * (t - 1.0).powi(3) + c1 * (t - 1.0).powi(2)
            }
            EasingFunction::EaseOutBounce => {
                let n1 = 7.5625;
                let d1 = 2.75;
                if t < 1.0 / d1 {
                    n1 * t * t
                } else if t < 2.0 / d1 {
                    n1 * (t - 1.5 / d1) * (t - 1.5 / d1) + 0.75
                } else if t < 2.5 / d1 {
                    n1 * (t - 2.25 / d1) * (t - 2.25 / d1) + 0.9375
                } else {
                    n1 * (t - 2.625 / d1) * (t - 2.625 / d1) + 0.984375
                }
            }
            EasingFunction::EaseInOutSine => -((t * PI).cos() - 1.0) / 2.0,
            EasingFunction::EaseInOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
            EasingFunction::EaseInOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
            EasingFunction::EaseInOutExpo => {
                if t == 0.0 {
                    0.0
                } else if t == 1.0 {
                    1.0
                } else if t < 0.5 {
                    2.0f32.powf(20.0 * t - 10.0) / 2.0
                } else {
                    (2.0 - 2.0f32.powf(-20.0 * t + 10.0)) / 2.0
                }
            }
            EasingFunction::EaseInOutBack => {
                let c1 = 1.70158;
                let c2 = c1 * 1.525;
                if t < 0.5 {
                    ((2.0 * t).powi(2) * ((c2 + 1.0) * 2.0 * t - c2)) / 2.0
                } else {
                    ((2.0 * t - 2.0).powi(2) * ((c2 + 1.0) * (t * 2.0 - 2.0) + c2) + 2.0) / 2.0
                }
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct Animation {
    pub config: AnimationConfig,
    pub progress: f32,
    /// Only used for Forever animations with a flippable direction.
    pub is_going_forward: bool,
}

impl Animation {
    pub fn new(config: AnimationConfig) -> Self {
        let is_going_forward = config.direction != AnimationDirection::Backward;
        Self {
            config,
            progress: 0.0,
            is_going_forward,
        }
    }
}

/// Animations attached to a widget; advanced by [`UIAnimationSystem`].
#[derive(Component, Default)]
pub struct HasAnimations {
    pub animations: Vec<Animation>,
}

fn lerp(from: f32, to: f32, t: f32) -> f32 {
    from + (to - from) * t
}

fn lerp_color(from: Color, to: Color, t: f32) -> Color {
    Color::rgba(
        lerp(from.r as f32, to.r as f32, t) as u8,
        lerp(from.g as f32, to.g as f32, t) as u8,
        lerp(from.b as f32, to.b as f32, t) as u8,
        lerp(from.a as f32, to.a as f32, t) as u8,
    )
}

/// Advances widget animations and writes the eased values into the visual
/// components. Hover animations run forward while the widget was hot last
/// frame and backward once the pointer leaves.
pub struct UIAnimationSystem<A: InputAction> {
    _marker: PhantomData<A>,
}

impl<A: InputAction> Default for UIAnimationSystem<A> {
    fn default() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<A: InputAction> System for UIAnimationSystem<A> {
    fn signature(&self) -> SystemSignature {
        SystemSignature::new().with::<HasAnimations>()
    }

    fn run_iteration(
        &mut self,
        collection: &mut EntityCollection,
        signature: &SystemSignature,
        dt: f32,
    ) {
        let hot = match collection.get_singleton_cmp::<UIContext<A>>() {
            Some(context) => context.prev_hot_id,
            None => return,
        };

        let animated: Vec<EntityId> = collection
            .entities()
            .filter(|entity| signature.matches(entity))
            .map(|entity| entity.id)
            .collect();

        for id in animated {
            let is_hovered = id == hot;

            struct Write {
                animation_type: AnimationType,
                eased: f32,
            }
            let mut writes: Vec<Write> = Vec::new();

            {
                let Some(animations) = collection
                    .get_entity_for_id_mut(id)
                    .and_then(|entity| entity.get_mut::<HasAnimations>())
                else {
                    continue;
                };

                for animation in &mut animations.animations {
                    let forward = match animation.config.when {
                        AnimationWhen::Hover => is_hovered,
                        AnimationWhen::Forever => animation.is_going_forward,
                    };

                    let delta = dt / animation.config.duration.as_secs_f32().max(f32::EPSILON);
                    animation.progress = if forward {
                        (animation.progress + delta).min(1.0)
                    } else {
                        (animation.progress - delta).max(0.0)
                    };

                    // Flippable forever animations bounce between the ends.
                    if animation.config.when == AnimationWhen::Forever
                        && animation.config.direction.is_flippable()
                    {
                        if animation.progress >= 1.0 {
                            animation.is_going_forward = false;
                        } else if animation.progress <= 0.0 {
                            animation.is_going_forward = true;
                        }
                    }

                    writes.push(Write {
                        animation_type: animation.config.animation_type.clone(),
                        eased: animation.config.easing.compute(animation.progress),
                    });
                }
            }

            let Some(entity) = collection.get_entity_for_id_mut(id) else {
                continue;
            };
            for write in writes {
                match write.animation_type {
                    AnimationType::Scale { range } => {
                        entity
                            .add_component_if_missing(HasUIModifiers::default)
                            .scale = lerp(range.from, range.to, write.eased);
                    }
                    AnimationType::Color { range } => {
                        let color = lerp_color(range.from, range.to, write.eased);
                        entity
                            .add_component_if_missing(|| HasColor::new(color))
                            .set(color);
                    }
                    AnimationType::Opacity { range } => {
                        entity
                            .add_component_if_missing(|| HasOpacity { value: 1.0 })
                            .value = lerp(range.from, range.to, write.eased);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn easings_hit_their_endpoints() {
        let curves = [
            EasingFunction::Linear,
            EasingFunction::EaseInSine,
            EasingFunction::EaseInQuad,
            EasingFunction::EaseInCubic,
            EasingFunction::EaseInExpo,
            EasingFunction::EaseInCirc,
            EasingFunction::EaseOutSine,
            EasingFunction::EaseOutQuad,
            EasingFunction::EaseOutCubic,
            EasingFunction::EaseOutExpo,
            EasingFunction::EaseOutCirc,
            EasingFunction::EaseOutBounce,
            EasingFunction::EaseInOutSine,
            EasingFunction::EaseInOutQuad,
            EasingFunction::EaseInOutCubic,
            EasingFunction::EaseInOutExpo,
        ];
        for curve in curves {
            assert!(curve.compute(0.0).abs() < 1e-4, "{curve:?} at 0");
            assert!((curve.compute(1.0) - 1.0).abs() < 1e-4, "{curve:?} at 1");
        }
    }

    #[test]
    fn back_curves_overshoot() {
        // Overshooting curves leave [0, 1] on purpose but still land on the
        // endpoints.
        assert!((EasingFunction::EaseOutBack.compute(1.0) - 1.0).abs() < 1e-4);
        assert!(EasingFunction::EaseOutBack.compute(0.7) > 1.0);
        assert!(EasingFunction::EaseInBack.compute(0.3) < 0.0);
    }

    #[test]
    fn color_lerp_is_channelwise() {
        let midpoint = lerp_color(Color::BLACK, Color::WHITE, 0.5);
        assert!(midpoint.r > 100 && midpoint.r < 155);
        assert_eq!(midpoint.r, midpoint.g);
        assert_eq!(midpoint.g, midpoint.b);
    }
}
