use lateshift_derive::Component;

use crate::ecs::{Component, EntityCollection, System};
use crate::geometry::Vec2;
use crate::input::{ActionDone, InputAction, InputSnapshot};

#[derive(Component, Debug, PartialEq, Clone)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

#[derive(Component, Debug, PartialEq)]
pub struct Velocity {
    pub dx: f32,
    pub dy: f32,
}

#[derive(Component, Debug, PartialEq)]
pub struct Health {
    pub current: i32,
    pub max: i32,
}

#[derive(Component, Debug, PartialEq)]
pub struct Name(pub String);

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(usize)]
pub enum GameTag {
    Player = 0,
    Npc = 1,
    Enemy = 2,
    Projectile = 3,
}

impl GameTag {
    pub fn id(self) -> usize {
        self as usize
    }
}

/// Input actions used across the interaction tests.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TestAction {
    None,
    WidgetMod,
    WidgetNext,
    WidgetBack,
    WidgetPress,
    WidgetLeft,
    WidgetRight,
    WidgetUp,
    WidgetDown,
    TextBackspace,
    TextDelete,
    TextHome,
    TextEnd,
}

impl InputAction for TestAction {
    fn none() -> Self {
        TestAction::None
    }
    fn index(self) -> usize {
        self as usize
    }
    fn action_count() -> usize {
        13
    }
    fn widget_mod() -> Option<Self> {
        Some(TestAction::WidgetMod)
    }
    fn widget_next() -> Option<Self> {
        Some(TestAction::WidgetNext)
    }
    fn widget_back() -> Option<Self> {
        Some(TestAction::WidgetBack)
    }
    fn widget_press() -> Option<Self> {
        Some(TestAction::WidgetPress)
    }
    fn widget_left() -> Option<Self> {
        Some(TestAction::WidgetLeft)
    }
    fn widget_right() -> Option<Self> {
        Some(TestAction::WidgetRight)
    }
    fn widget_up() -> Option<Self> {
        Some(TestAction::WidgetUp)
    }
    fn widget_down() -> Option<Self> {
        Some(TestAction::WidgetDown)
    }
    fn text_backspace() -> Option<Self> {
        Some(TestAction::TextBackspace)
    }
    fn text_delete() -> Option<Self> {
        Some(TestAction::TextDelete)
    }
    fn text_home() -> Option<Self> {
        Some(TestAction::TextHome)
    }
    fn text_end() -> Option<Self> {
        Some(TestAction::TextEnd)
    }
}

/// Host-style widget-building system: runs a closure against the collection
/// once per frame, before the layout and interaction passes.
pub struct BuildUi<F: FnMut(&mut EntityCollection)> {
    pub build: F,
}

impl<F: FnMut(&mut EntityCollection)> System for BuildUi<F> {
    fn should_iterate(&self) -> bool {
        false
    }

    fn once(&mut self, collection: &mut EntityCollection, _dt: f32) {
        (self.build)(collection);
    }
}

/// Convenience snapshot constructors for driving interaction tests.
pub fn mouse_snapshot(pos: Vec2, left_down: bool) -> InputSnapshot<TestAction> {
    InputSnapshot {
        mouse_pos: pos,
        mouse_left_down: left_down,
        ..Default::default()
    }
}

pub fn press_action(action: TestAction) -> InputSnapshot<TestAction> {
    InputSnapshot {
        actions: vec![ActionDone {
            action,
            amount_pressed: 1.0,
        }],
        actions_pressed: vec![ActionDone {
            action,
            amount_pressed: 1.0,
        }],
        ..Default::default()
    }
}

pub fn press_action_with_held(
    pressed: TestAction,
    held: TestAction,
) -> InputSnapshot<TestAction> {
    InputSnapshot {
        actions: vec![
            ActionDone {
                action: pressed,
                amount_pressed: 1.0,
            },
            ActionDone {
                action: held,
                amount_pressed: 1.0,
            },
        ],
        actions_pressed: vec![ActionDone {
            action: pressed,
            amount_pressed: 1.0,
        }],
        ..Default::default()
    }
}
