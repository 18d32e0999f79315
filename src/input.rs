use fixedbitset::FixedBitSet;

use crate::ecs::Component;
use crate::geometry::Vec2;

/// Host-defined input action enum consumed by the UI context.
///
/// `none()` and `index()` are mandatory; the widget actions are optional but
/// the features they drive (tab traversal, keyboard activation, text
/// editing) degrade without them. Run [`validate_actions`] at startup to get
/// a report of what is missing.
///
/// `index()` must be a dense 0-based index below `action_count()`; deriving
/// `strum::EnumCount` and casting the discriminant is the usual way:
///
/// ```ignore
/// #[derive(Copy, Clone, PartialEq, Eq, Debug, EnumCount)]
/// enum Action { None, WidgetNext, WidgetMod, WidgetBack, WidgetPress }
///
/// impl InputAction for Action {
///     fn none() -> Self { Action::None }
///     fn index(self) -> usize { self as usize }
///     fn action_count() -> usize { <Action as strum::EnumCount>::COUNT }
///     fn widget_next() -> Option<Self> { Some(Action::WidgetNext) }
///     // ...
/// }
/// ```
pub trait InputAction: Copy + Eq + std::fmt::Debug + 'static {
    fn none() -> Self;
    fn index(self) -> usize;
    fn action_count() -> usize;

    // Widget traversal / activation.
    fn widget_mod() -> Option<Self> {
        None
    }
    fn widget_next() -> Option<Self> {
        None
    }
    fn widget_back() -> Option<Self> {
        None
    }
    fn widget_press() -> Option<Self> {
        None
    }
    fn widget_left() -> Option<Self> {
        None
    }
    fn widget_right() -> Option<Self> {
        None
    }
    fn widget_up() -> Option<Self> {
        None
    }
    fn widget_down() -> Option<Self> {
        None
    }

    // Text editing.
    fn text_backspace() -> Option<Self> {
        None
    }
    fn text_delete() -> Option<Self> {
        None
    }
    fn text_home() -> Option<Self> {
        None
    }
    fn text_end() -> Option<Self> {
        None
    }
}

/// How [`validate_actions`] reports missing action variants.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum ValidationMode {
    None,
    #[default]
    LogOnly,
    Assert,
}

/// Check that the widget-facing actions are mapped and report the gaps.
/// Returns the list of missing action names.
pub fn validate_actions<A: InputAction>(mode: ValidationMode) -> Vec<&'static str> {
    let required: [(&'static str, bool); 12] = [
        ("WidgetMod", A::widget_mod().is_some()),
        ("WidgetNext", A::widget_next().is_some()),
        ("WidgetBack", A::widget_back().is_some()),
        ("WidgetPress", A::widget_press().is_some()),
        ("WidgetLeft", A::widget_left().is_some()),
        ("WidgetRight", A::widget_right().is_some()),
        ("WidgetUp", A::widget_up().is_some()),
        ("WidgetDown", A::widget_down().is_some()),
        ("TextBackspace", A::text_backspace().is_some()),
        ("TextDelete", A::text_delete().is_some()),
        ("TextHome", A::text_home().is_some()),
        ("TextEnd", A::text_end().is_some()),
    ];

    let missing: Vec<&'static str> = required
        .iter()
        .filter(|(_, present)| !present)
        .map(|(name, _)| *name)
        .collect();

    if !missing.is_empty() {
        match mode {
            ValidationMode::None => {}
            ValidationMode::LogOnly => log::warn!(
                "InputAction {} is missing reserved actions: {missing:?}; the widgets that use them wont respond to keyboard input",
                std::any::type_name::<A>()
            ),
            ValidationMode::Assert => panic!(
                "InputAction {} is missing reserved actions: {missing:?}",
                std::any::type_name::<A>()
            ),
        }
    }
    missing
}

/// One action observed this frame, with an analog press amount.
#[derive(Debug, Clone, Copy)]
pub struct ActionDone<A: InputAction> {
    pub action: A,
    pub amount_pressed: f32,
}

/// Per-frame input snapshot the host fills before running UI systems.
#[derive(Debug)]
pub struct InputSnapshot<A: InputAction> {
    pub mouse_pos: Vec2,
    pub mouse_left_down: bool,
    pub wheel: Vec2,
    /// Characters typed this frame, in order.
    pub chars: Vec<char>,
    /// Actions held this frame.
    pub actions: Vec<ActionDone<A>>,
    /// Actions that transitioned to pressed this frame.
    pub actions_pressed: Vec<ActionDone<A>>,
}

impl<A: InputAction> Default for InputSnapshot<A> {
    fn default() -> Self {
        Self {
            mouse_pos: Vec2::ZERO,
            mouse_left_down: false,
            wheel: Vec2::ZERO,
            chars: Vec::new(),
            actions: Vec::new(),
            actions_pressed: Vec::new(),
        }
    }
}

impl<A: InputAction> InputSnapshot<A> {
    /// Fold held actions into a bitset indexed by `InputAction::index`.
    pub fn actions_as_bits(&self) -> FixedBitSet {
        let mut bits = FixedBitSet::with_capacity(A::action_count());
        for done in &self.actions {
            if done.amount_pressed <= 0.0 {
                continue;
            }
            bits.insert(done.action.index());
        }
        bits
    }

    /// Reset the per-frame fields, keeping allocations.
    pub fn clear_frame(&mut self) {
        self.wheel = Vec2::ZERO;
        self.chars.clear();
        self.actions.clear();
        self.actions_pressed.clear();
    }
}

/// Singleton component holding the host-filled input snapshot. Lives in the
/// UI collection so `BeginUIContextManager` can copy it into the context.
pub struct InputCollector<A: InputAction> {
    pub snapshot: InputSnapshot<A>,
}

impl<A: InputAction> Default for InputCollector<A> {
    fn default() -> Self {
        Self {
            snapshot: InputSnapshot::default(),
        }
    }
}

impl<A: InputAction> Component for InputCollector<A> {
    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}
