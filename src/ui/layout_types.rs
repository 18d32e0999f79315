use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use strum_macros::Display;

/// Layout axis. `X`/`Y` are the size axes; the four sides index padding and
/// margin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
    Top,
    Left,
    Bottom,
    Right,
}

impl Axis {
    /// The size axis a spacing side contributes to.
    pub fn size_axis(self) -> Axis {
        match self {
            Axis::X | Axis::Left | Axis::Right => Axis::X,
            Axis::Y | Axis::Top | Axis::Bottom => Axis::Y,
        }
    }
}

/// How a desired size is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, Serialize, Deserialize)]
pub enum Dim {
    #[default]
    None,
    /// Absolute pixels (scaled by `ui_scale` in Adaptive mode).
    Pixels,
    /// Measured size of the attached label.
    Text,
    /// Fraction of the parent's content area.
    Percent,
    /// Fraction of the screen resolution.
    ScreenPercent,
    /// Sum (main axis) or max (cross axis) of the children.
    Children,
    /// Weight used to split leftover space among siblings.
    Expand,
}

/// A desired size: dimension, magnitude, and willingness to shrink.
/// `strictness` 1.0 never shrinks during violation solving; 0.0 shrinks
/// first.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub dim: Dim,
    pub value: f32,
    pub strictness: f32,
}

impl Default for Size {
    fn default() -> Self {
        Size {
            dim: Dim::None,
            value: -1.0,
            strictness: 1.0,
        }
    }
}

impl Size {
    pub fn with_strictness(mut self, strictness: f32) -> Size {
        self.strictness = strictness.clamp(0.0, 1.0);
        self
    }
}

pub fn pixels(value: f32) -> Size {
    Size {
        dim: Dim::Pixels,
        value,
        strictness: 1.0,
    }
}

pub fn percent(value: f32) -> Size {
    Size {
        dim: Dim::Percent,
        value,
        strictness: 1.0,
    }
}

pub fn screen_pct(value: f32) -> Size {
    Size {
        dim: Dim::ScreenPercent,
        value,
        strictness: 1.0,
    }
}

pub fn text_size() -> Size {
    Size {
        dim: Dim::Text,
        value: 0.0,
        strictness: 1.0,
    }
}

/// Size to fit the children; `children_min` floors the result.
pub fn children() -> Size {
    Size {
        dim: Dim::Children,
        value: 0.0,
        strictness: 1.0,
    }
}

pub fn children_min(min: f32) -> Size {
    Size {
        dim: Dim::Children,
        value: min,
        strictness: 1.0,
    }
}

/// Take a weighted share of the leftover space among siblings.
pub fn expand(weight: f32) -> Size {
    Size {
        dim: Dim::Expand,
        value: weight,
        strictness: 0.0,
    }
}

bitflags! {
    /// Flex flow direction. A container may flex on both axes; an empty set
    /// means the node does not flex at all.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct FlexDirection: u8 {
        const ROW = 1 << 0;
        const COLUMN = 1 << 1;
    }
}

impl Default for FlexDirection {
    fn default() -> Self {
        FlexDirection::COLUMN
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FlexWrap {
    #[default]
    Wrap,
    NoWrap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum JustifyContent {
    #[default]
    FlexStart,
    FlexEnd,
    Center,
    SpaceBetween,
    SpaceAround,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AlignItems {
    #[default]
    FlexStart,
    FlexEnd,
    Center,
    Stretch,
}

/// Per-child override of the parent's `align_items`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SelfAlign {
    #[default]
    Auto,
    FlexStart,
    FlexEnd,
    Center,
}

/// Whether pixel values scale with `ui_scale`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ScalingMode {
    #[default]
    Proportional,
    Adaptive,
}

/// Four-sided desired spacing (padding or margin).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Spacing {
    pub top: Size,
    pub left: Size,
    pub bottom: Size,
    pub right: Size,
}

impl Spacing {
    pub const ZERO: Spacing = Spacing {
        top: Size {
            dim: Dim::None,
            value: -1.0,
            strictness: 1.0,
        },
        left: Size {
            dim: Dim::None,
            value: -1.0,
            strictness: 1.0,
        },
        bottom: Size {
            dim: Dim::None,
            value: -1.0,
            strictness: 1.0,
        },
        right: Size {
            dim: Dim::None,
            value: -1.0,
            strictness: 1.0,
        },
    };

    pub fn all(size: Size) -> Spacing {
        Spacing {
            top: size,
            left: size,
            bottom: size,
            right: size,
        }
    }

    pub fn horizontal(size: Size) -> Spacing {
        Spacing {
            left: size,
            right: size,
            ..Default::default()
        }
    }

    pub fn vertical(size: Size) -> Spacing {
        Spacing {
            top: size,
            bottom: size,
            ..Default::default()
        }
    }

    pub fn left(size: Size) -> Spacing {
        Spacing {
            left: size,
            ..Default::default()
        }
    }

    pub fn side(&self, axis: Axis) -> Size {
        match axis {
            Axis::Top => self.top,
            Axis::Left => self.left,
            Axis::Bottom => self.bottom,
            Axis::Right => self.right,
            Axis::X | Axis::Y => {
                debug_assert!(false, "spacing indexed with a size axis");
                Size::default()
            }
        }
    }

    pub fn side_mut(&mut self, axis: Axis) -> &mut Size {
        match axis {
            Axis::Top => &mut self.top,
            Axis::Left => &mut self.left,
            Axis::Bottom => &mut self.bottom,
            Axis::Right => &mut self.right,
            Axis::X | Axis::Y => {
                debug_assert!(false, "spacing indexed with a size axis");
                &mut self.right
            }
        }
    }

    /// Whether any side on the given size axis is percent-based.
    pub fn is_percent_based(&self, axis: Axis) -> bool {
        match axis.size_axis() {
            Axis::X => self.left.dim == Dim::Percent || self.right.dim == Dim::Percent,
            _ => self.top.dim == Dim::Percent || self.bottom.dim == Dim::Percent,
        }
    }
}

/// Resolved spacing: the four sides plus the per-axis sums.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ComputedSpacing {
    pub top: f32,
    pub left: f32,
    pub bottom: f32,
    pub right: f32,
}

impl ComputedSpacing {
    pub fn axis(&self, axis: Axis) -> f32 {
        match axis {
            Axis::X => self.left + self.right,
            Axis::Y => self.top + self.bottom,
            Axis::Top => self.top,
            Axis::Left => self.left,
            Axis::Bottom => self.bottom,
            Axis::Right => self.right,
        }
    }

    pub fn set_side(&mut self, axis: Axis, value: f32) {
        match axis {
            Axis::Top => self.top = value,
            Axis::Left => self.left = value,
            Axis::Bottom => self.bottom = value,
            Axis::Right => self.right = value,
            Axis::X | Axis::Y => debug_assert!(false, "spacing side indexed with a size axis"),
        }
    }
}

/// A pair of per-axis values indexed by `Axis::X` / `Axis::Y`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AxisPair<T> {
    pub x: T,
    pub y: T,
}

impl<T: Copy> AxisPair<T> {
    pub fn splat(value: T) -> Self {
        Self { x: value, y: value }
    }

    pub fn get(&self, axis: Axis) -> T {
        match axis.size_axis() {
            Axis::X => self.x,
            _ => self.y,
        }
    }

    pub fn set(&mut self, axis: Axis, value: T) {
        match axis.size_axis() {
            Axis::X => self.x = value,
            _ => self.y = value,
        }
    }
}
