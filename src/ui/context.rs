use fixedbitset::FixedBitSet;

use crate::ecs::{Component, EntityId};
use crate::geometry::{Rect, Vec2};
use crate::input::InputAction;

use super::theme::Theme;

/// Sentinel id meaning "nothing" for hot/focus/active tracking.
pub const ROOT: EntityId = -1;
/// Sentinel id meaning "the press landed on no widget"; blocks hover
/// stealing while the button stays down.
pub const FAKE: EntityId = -2;

/// Mouse pointer snapshot with press-origin tracking used to tell clicks
/// from drags.
#[derive(Debug, Clone, Copy, Default)]
pub struct MousePointerState {
    pub pos: Vec2,
    pub left_down: bool,
    pub just_pressed: bool,
    pub just_released: bool,
    pub press_pos: Vec2,
    /// The pointer moved beyond the drag threshold since the press.
    pub press_moved: bool,
    pub wheel: Vec2,
}

impl MousePointerState {
    /// Press-to-pointer displacement beyond which a press stops being a
    /// click.
    pub const PRESS_DRAG_THRESHOLD_PX: f32 = 6.0;
}

/// One queued render command: draw entity `id` at `layer`. Drained in
/// `(layer, id)` order by the render bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderInfo {
    pub id: EntityId,
    pub layer: i32,
}

type InputGate = Box<dyn Fn(EntityId) -> bool>;

/// Singleton component carrying the immediate-mode interaction state:
/// which widget is hot (under the pointer), focused (keyboard target), and
/// active (being pressed/dragged), plus this frame's inputs and the render
/// queue.
pub struct UIContext<A: InputAction> {
    /// Widget under the pointer this frame.
    pub hot_id: EntityId,
    /// Previous frame's hot id, for animations.
    pub prev_hot_id: EntityId,
    /// Keyboard focus target.
    pub focus_id: EntityId,
    /// Entity the focus ring renders on (cluster root).
    pub visual_focus_id: EntityId,
    /// Widget being interacted with (mouse held).
    pub active_id: EntityId,
    pub prev_active_id: EntityId,
    /// Last widget visited by the tab pass; target of reverse tabbing.
    pub last_processed: EntityId,

    /// Widgets that were valid tab targets this frame.
    pub focused_ids: std::collections::HashSet<EntityId>,

    pub mouse: MousePointerState,
    pub last_action: A,
    pub all_actions: FixedBitSet,
    /// Characters typed this frame.
    pub chars_pressed: Vec<char>,

    pub theme: Theme,
    pub dt: f32,

    pub(crate) input_gates: Vec<(String, InputGate)>,
    pub(crate) render_cmds: Vec<RenderInfo>,
}

impl<A: InputAction> Component for UIContext<A> {
    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}

impl<A: InputAction> Default for UIContext<A> {
    fn default() -> Self {
        Self {
            hot_id: ROOT,
            prev_hot_id: ROOT,
            focus_id: ROOT,
            visual_focus_id: ROOT,
            active_id: ROOT,
            prev_active_id: ROOT,
            last_processed: ROOT,
            focused_ids: std::collections::HashSet::new(),
            mouse: MousePointerState::default(),
            last_action: A::none(),
            all_actions: FixedBitSet::with_capacity(A::action_count()),
            chars_pressed: Vec::new(),
            theme: Theme::default(),
            dt: 0.0,
            input_gates: Vec::new(),
            render_cmds: Vec::new(),
        }
    }
}

impl<A: InputAction> UIContext<A> {
    // -- Hot / active / focus ----------------------------------------------

    pub fn is_hot(&self, id: EntityId) -> bool {
        self.hot_id == id
    }

    pub fn is_active(&self, id: EntityId) -> bool {
        self.active_id == id
    }

    /// Previous-frame state, for animations: the current frame's values are
    /// not final until the interaction passes ran.
    pub fn was_hot(&self, id: EntityId) -> bool {
        self.prev_hot_id == id
    }

    pub fn was_active(&self, id: EntityId) -> bool {
        self.prev_active_id == id
    }

    pub fn set_hot(&mut self, id: EntityId) {
        self.hot_id = id;
    }

    pub fn set_active(&mut self, id: EntityId) {
        self.active_id = id;
    }

    pub fn has_focus(&self, id: EntityId) -> bool {
        self.focus_id == id
    }

    pub fn set_focus(&mut self, id: EntityId) {
        self.focus_id = id;
    }

    /// Register the widget as a tab target; grabs focus if nothing has it.
    pub fn try_to_grab(&mut self, id: EntityId) {
        self.focused_ids.insert(id);
        if self.has_focus(ROOT) {
            self.set_focus(id);
        }
    }

    /// Standard hot/active transition for a widget rectangle. Gated by the
    /// input gates (modals block background widgets here).
    pub fn active_if_mouse_inside(&mut self, id: EntityId, rect: Rect) {
        if !self.is_input_allowed(id) {
            return;
        }
        if rect.contains(self.mouse.pos) {
            self.set_hot(id);
            if self.is_active(ROOT) && self.mouse.left_down {
                self.set_active(id);
            }
        }
    }

    pub fn reset(&mut self) {
        self.focus_id = ROOT;
        self.visual_focus_id = ROOT;
        self.last_processed = ROOT;
        self.hot_id = ROOT;
        self.active_id = ROOT;
        self.focused_ids.clear();
        self.render_cmds.clear();
    }

    // -- Mouse activation ---------------------------------------------------

    /// Activation on the press edge: press landed on this widget and the
    /// pointer has not wandered.
    pub fn is_mouse_press(&self, id: EntityId) -> bool {
        self.mouse.just_pressed && self.is_active(id) && self.is_hot(id) && !self.mouse.press_moved
    }

    /// Activation on the release edge.
    pub fn is_mouse_click(&self, id: EntityId) -> bool {
        self.mouse.just_released && self.is_active(id) && self.is_hot(id) && !self.mouse.press_moved
    }

    // -- Actions ------------------------------------------------------------

    /// Edge-triggered action check; consumes the action.
    pub fn pressed(&mut self, action: A) -> bool {
        let matched = self.last_action == action;
        if matched {
            self.last_action = A::none();
        }
        matched
    }

    /// Level-triggered action check; consumes the bit.
    pub fn is_held_down(&mut self, action: A) -> bool {
        let index = action.index();
        let held = self.all_actions.contains(index);
        if held {
            self.all_actions.set(index, false);
        }
        held
    }

    /// Tab traversal bookkeeping, run per visited widget:
    /// WidgetNext moves focus forward (backward with WidgetMod held);
    /// WidgetBack moves backward.
    pub fn process_tabbing(&mut self, id: EntityId) {
        if self.has_focus(id) {
            if let Some(next) = A::widget_next() {
                if self.pressed(next) {
                    self.set_focus(ROOT);
                    if let Some(modifier) = A::widget_mod() {
                        if self.is_held_down(modifier) {
                            self.set_focus(self.last_processed);
                        }
                    }
                }
            }
            if let Some(back) = A::widget_back() {
                if self.pressed(back) {
                    self.set_focus(self.last_processed);
                }
            }
        }
        // before any returns
        self.last_processed = id;
    }

    // -- Input gates --------------------------------------------------------

    /// Register a named gate; returning false blocks input for an entity.
    /// A gate with the same name is replaced.
    pub fn add_input_gate(&mut self, name: &str, gate: impl Fn(EntityId) -> bool + 'static) {
        self.remove_input_gate(name);
        self.input_gates.push((name.to_string(), Box::new(gate)));
    }

    pub fn remove_input_gate(&mut self, name: &str) {
        self.input_gates.retain(|(gate_name, _)| gate_name != name);
    }

    pub fn is_input_allowed(&self, id: EntityId) -> bool {
        self.input_gates.iter().all(|(_, gate)| gate(id))
    }

    // -- Render queue -------------------------------------------------------

    pub fn queue_render(&mut self, info: RenderInfo) {
        self.render_cmds.push(info);
    }

    /// Drain this frame's render commands in (layer, id) order.
    pub fn drain_render_cmds(&mut self) -> Vec<RenderInfo> {
        let mut cmds = std::mem::take(&mut self.render_cmds);
        cmds.sort_by_key(|info| (info.layer, info.id));
        cmds
    }
}
