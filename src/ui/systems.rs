use std::marker::PhantomData;

use crate::ecs::{EntityCollection, EntityId, System, SystemManager, SystemSignature};
use crate::geometry::{Rect, Resolution, Vec2};
use crate::input::{InputAction, InputCollector};

use super::autolayout::{Measurer, autolayout};
use super::component::{AutoLayoutRoot, UIComponent};
use super::components::{
    HasChildrenComponent, HasClickActivationMode, HasClickListener, HasDragListener,
    HasDropdownState, HasLabel, HasLeftRightListener, HasScrollView, HasToggleSwitchState,
    InFocusCluster, SelectOnFocus, ShouldHide, SkipWhenTabbing,
};
use super::context::{MousePointerState, ROOT, UIContext};
use super::identity::UIElementRegistry;
use super::config::UIStylingDefaults;
use super::layout_types::{percent, pixels};
use super::text::{HasLineIndex, HasTextAreaState, HasTextInputState, text_hash};
use super::text_cache::TextMeasureCache;
use super::theme::{ClickActivationMode, Theme};

/// Wheel ticks to pixels.
pub const SCROLL_MULTIPLIER: f32 = 20.0;

// ---------------------------------------------------------------------------
// Frame bracketing
// ---------------------------------------------------------------------------

/// Copies the host-filled input snapshot into the UI context and clears the
/// per-frame interaction state. Runs before any widget call.
pub struct BeginUIContextManager<A: InputAction> {
    _marker: PhantomData<A>,
}

impl<A: InputAction> Default for BeginUIContextManager<A> {
    fn default() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<A: InputAction> System for BeginUIContextManager<A> {
    fn should_iterate(&self) -> bool {
        false
    }

    fn once(&mut self, collection: &mut EntityCollection, dt: f32) {
        let Some(collector) = collection.get_singleton_cmp::<InputCollector<A>>() else {
            return;
        };
        let mouse_pos = collector.snapshot.mouse_pos;
        let left_down = collector.snapshot.mouse_left_down;
        let wheel = collector.snapshot.wheel;
        let chars: Vec<char> = collector.snapshot.chars.clone();
        let action_bits = collector.snapshot.actions_as_bits();
        let last_pressed = collector.snapshot.actions_pressed.last().map(|done| done.action);

        let Some(context) = collection.get_singleton_cmp_mut::<UIContext<A>>() else {
            return;
        };

        let was_down = context.mouse.left_down;
        context.mouse.pos = mouse_pos;
        context.mouse.left_down = left_down;
        context.mouse.just_pressed = left_down && !was_down;
        context.mouse.just_released = !left_down && was_down;
        context.mouse.wheel = wheel;
        if context.mouse.just_pressed {
            context.mouse.press_pos = mouse_pos;
            context.mouse.press_moved = false;
        }
        if left_down
            && context.mouse.press_pos.distance_to(mouse_pos)
                > MousePointerState::PRESS_DRAG_THRESHOLD_PX
        {
            context.mouse.press_moved = true;
        }

        context.all_actions = action_bits;
        if let Some(action) = last_pressed {
            context.last_action = action;
        }
        context.chars_pressed = chars;

        context.prev_hot_id = context.hot_id;
        context.prev_active_id = context.active_id;
        context.hot_id = ROOT;
        context.dt = dt;
        context.render_cmds.clear();
    }
}

/// Releases pressed state, drops focus that stopped being reachable, and
/// handles click-outside focus release. Runs last.
pub struct EndUIContextManager<A: InputAction> {
    _marker: PhantomData<A>,
}

impl<A: InputAction> Default for EndUIContextManager<A> {
    fn default() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<A: InputAction> System for EndUIContextManager<A> {
    fn should_iterate(&self) -> bool {
        false
    }

    fn once(&mut self, collection: &mut EntityCollection, _dt: f32) {
        let Some(context) = collection.get_singleton_cmp_mut::<UIContext<A>>() else {
            return;
        };

        // A press that landed on no widget releases keyboard focus.
        if context.mouse.just_pressed && context.hot_id == ROOT {
            context.set_focus(ROOT);
        }

        if context.focus_id == ROOT {
            return;
        }

        if context.mouse.left_down {
            if context.is_active(ROOT) {
                context.set_active(super::context::FAKE);
            }
        } else {
            context.set_active(ROOT);
        }
        if !context.focused_ids.contains(&context.focus_id) {
            context.focus_id = ROOT;
        }
        context.focused_ids.clear();
    }
}

// ---------------------------------------------------------------------------
// Layout
// ---------------------------------------------------------------------------

/// Resets visibility ahead of layout.
pub struct ClearVisibility;

impl System for ClearVisibility {
    fn signature(&self) -> SystemSignature {
        SystemSignature::new().with::<UIComponent>()
    }

    fn for_each(&mut self, entity: &mut crate::ecs::Entity, _dt: f32) {
        if let Some(cmp) = entity.get_mut::<UIComponent>() {
            cmp.is_visible = false;
        }
    }
}

/// Runs the autolayout solver from every `AutoLayoutRoot`.
pub struct RunAutoLayout {
    pub resolution: Resolution,
    pub enable_grid_snapping: bool,
    pub ui_scale: f32,
    /// Measures text when set; otherwise the `TextMeasureCache` singleton is
    /// used, and failing that labels measure zero.
    pub measure_text: Option<Box<dyn FnMut(&str, &str, f32, f32) -> Vec2>>,
}

impl RunAutoLayout {
    pub fn new(resolution: Resolution) -> Self {
        Self {
            resolution,
            enable_grid_snapping: false,
            ui_scale: 1.0,
            measure_text: None,
        }
    }

    pub fn with_grid_snapping(mut self, enabled: bool) -> Self {
        self.enable_grid_snapping = enabled;
        self
    }

    pub fn with_ui_scale(mut self, scale: f32) -> Self {
        self.ui_scale = scale;
        self
    }

    pub fn with_measure_text(
        mut self,
        measure: impl FnMut(&str, &str, f32, f32) -> Vec2 + 'static,
    ) -> Self {
        self.measure_text = Some(Box::new(measure));
        self
    }
}

impl System for RunAutoLayout {
    fn signature(&self) -> SystemSignature {
        SystemSignature::new().with::<AutoLayoutRoot>().with::<UIComponent>()
    }

    fn run_iteration(
        &mut self,
        collection: &mut EntityCollection,
        signature: &SystemSignature,
        _dt: f32,
    ) {
        let roots: Vec<EntityId> = collection
            .entities()
            .filter(|entity| signature.matches(entity))
            .map(|entity| entity.id)
            .collect();

        for root in roots {
            if let Some(measure) = self.measure_text.as_mut() {
                autolayout(
                    collection,
                    root,
                    self.resolution,
                    self.enable_grid_snapping,
                    self.ui_scale,
                    Measurer::External(measure.as_mut()),
                );
                continue;
            }

            let resolution = self.resolution;
            let snapping = self.enable_grid_snapping;
            let scale = self.ui_scale;
            let ran = collection.singleton_scope::<TextMeasureCache, _>(|collection, cache| {
                autolayout(
                    collection,
                    root,
                    resolution,
                    snapping,
                    scale,
                    Measurer::Cache(cache),
                );
            });
            if ran.is_none() {
                autolayout(
                    collection,
                    root,
                    self.resolution,
                    self.enable_grid_snapping,
                    self.ui_scale,
                    Measurer::None,
                );
            }
        }

        if let Some(cache) = collection.get_singleton_cmp_mut::<TextMeasureCache>() {
            cache.end_frame();
        }
    }
}

/// Marks every laid-out node visible, walking down from the roots.
pub struct SetVisibility;

fn set_visibility_recursive(collection: &mut EntityCollection, id: EntityId) {
    let Some(cmp) = collection
        .get_entity_for_id(id)
        .and_then(|entity| entity.get::<UIComponent>())
    else {
        return;
    };
    if cmp.width() < 0.0 || cmp.height() < 0.0 {
        return;
    }
    let children = cmp.children.clone();
    for child in children {
        set_visibility_recursive(collection, child);
    }
    if let Some(cmp) = collection
        .get_entity_for_id_mut(id)
        .and_then(|entity| entity.get_mut::<UIComponent>())
    {
        cmp.is_visible = true;
    }
}

impl System for SetVisibility {
    fn signature(&self) -> SystemSignature {
        SystemSignature::new().with::<AutoLayoutRoot>().with::<UIComponent>()
    }

    fn run_iteration(
        &mut self,
        collection: &mut EntityCollection,
        signature: &SystemSignature,
        _dt: f32,
    ) {
        let roots: Vec<EntityId> = collection
            .entities()
            .filter(|entity| signature.matches(entity))
            .map(|entity| entity.id)
            .collect();
        for root in roots {
            set_visibility_recursive(collection, root);
        }
    }
}

// ---------------------------------------------------------------------------
// Interaction
// ---------------------------------------------------------------------------

fn widget_rect(collection: &EntityCollection, id: EntityId) -> Option<Rect> {
    let entity = collection.get_entity_for_id(id)?;
    if entity.has::<ShouldHide>() {
        return None;
    }
    let cmp = entity.get::<UIComponent>()?;
    if !cmp.is_visible {
        return None;
    }
    Some(cmp.rect())
}

/// Detach a click callback, run it, reattach. Keeps the borrow checker out
/// of the subscriber's way.
fn fire_click_listener(collection: &mut EntityCollection, id: EntityId) {
    let Some(listener) = collection
        .get_entity_for_id_mut(id)
        .and_then(|entity| entity.get_mut::<HasClickListener>())
    else {
        return;
    };
    listener.down = true;
    let mut cb = std::mem::replace(&mut listener.cb, Box::new(|_, _| {}));
    cb(collection, id);
    if let Some(listener) = collection
        .get_entity_for_id_mut(id)
        .and_then(|entity| entity.get_mut::<HasClickListener>())
    {
        listener.cb = cb;
    }
}

/// Keyboard traversal across the frame's tab targets, including focus
/// clusters and select-on-focus widgets.
pub struct HandleTabbing<A: InputAction> {
    _marker: PhantomData<A>,
}

impl<A: InputAction> Default for HandleTabbing<A> {
    fn default() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<A: InputAction> System for HandleTabbing<A> {
    fn run_iteration(
        &mut self,
        collection: &mut EntityCollection,
        _signature: &SystemSignature,
        _dt: f32,
    ) {
        struct Target {
            id: EntityId,
            select_on_focus: bool,
            cluster_root: Option<EntityId>,
        }

        let targets: Vec<Target> = collection
            .entities()
            .filter(|entity| {
                entity.has::<UIComponent>()
                    && entity.has::<HasClickListener>()
                    && !entity.has::<SkipWhenTabbing>()
                    && !entity.has::<ShouldHide>()
                    && entity
                        .get::<UIComponent>()
                        .is_some_and(|cmp| cmp.is_visible)
            })
            .map(|entity| Target {
                id: entity.id,
                select_on_focus: entity.has::<SelectOnFocus>(),
                cluster_root: entity.get::<InFocusCluster>().map(|cluster| cluster.root),
            })
            .collect();

        let mut fire_select: Option<EntityId> = None;
        collection.singleton_scope::<UIContext<A>, _>(|_, context| {
            let focus_before = context.focus_id;
            for target in &targets {
                context.try_to_grab(target.id);
                context.process_tabbing(target.id);
            }

            // Focus ring renders on the cluster root for clustered widgets.
            context.visual_focus_id = context.focus_id;
            if let Some(target) = targets.iter().find(|target| target.id == context.focus_id) {
                if let Some(root) = target.cluster_root {
                    context.visual_focus_id = root;
                }
                if target.select_on_focus && context.focus_id != focus_before {
                    fire_select = Some(target.id);
                }
            }
        });

        if let Some(id) = fire_select {
            fire_click_listener(collection, id);
        }
    }
}

/// Hot/active bookkeeping and click dispatch on the configured activation
/// edge.
pub struct HandleClicks<A: InputAction> {
    _marker: PhantomData<A>,
}

impl<A: InputAction> Default for HandleClicks<A> {
    fn default() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<A: InputAction> System for HandleClicks<A> {
    fn run_iteration(
        &mut self,
        collection: &mut EntityCollection,
        _signature: &SystemSignature,
        _dt: f32,
    ) {
        let candidates: Vec<(EntityId, Rect, Option<ClickActivationMode>)> = collection
            .entities()
            .filter(|entity| entity.has::<HasClickListener>())
            .filter_map(|entity| {
                let rect = widget_rect(collection, entity.id)?;
                let mode = entity
                    .get::<HasClickActivationMode>()
                    .map(|activation| activation.mode);
                Some((entity.id, rect, mode))
            })
            .collect();

        let mut to_fire: Vec<EntityId> = Vec::new();
        collection.singleton_scope::<UIContext<A>, _>(|_, context| {
            for (id, rect, mode_override) in &candidates {
                context.active_if_mouse_inside(*id, *rect);

                if context.has_focus(*id) {
                    if let Some(press) = A::widget_press() {
                        if context.pressed(press) {
                            context.set_focus(*id);
                            to_fire.push(*id);
                            continue;
                        }
                    }
                }

                let mode = match mode_override.unwrap_or(ClickActivationMode::Default) {
                    ClickActivationMode::Default => context.theme.click_activation_mode,
                    other => other,
                };
                let activated = match mode {
                    ClickActivationMode::Release => context.is_mouse_click(*id),
                    _ => context.is_mouse_press(*id),
                };
                if activated {
                    context.set_focus(*id);
                    to_fire.push(*id);
                }
            }
        });

        for id in to_fire {
            fire_click_listener(collection, id);
        }
    }
}

/// Drag dispatch: listeners fire every frame their widget stays active.
pub struct HandleDrags<A: InputAction> {
    _marker: PhantomData<A>,
}

impl<A: InputAction> Default for HandleDrags<A> {
    fn default() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<A: InputAction> System for HandleDrags<A> {
    fn run_iteration(
        &mut self,
        collection: &mut EntityCollection,
        _signature: &SystemSignature,
        _dt: f32,
    ) {
        let candidates: Vec<(EntityId, Rect)> = collection
            .entities()
            .filter(|entity| entity.has::<HasDragListener>())
            .filter_map(|entity| Some((entity.id, widget_rect(collection, entity.id)?)))
            .collect();

        let mut to_fire: Vec<EntityId> = Vec::new();
        collection.singleton_scope::<UIContext<A>, _>(|_, context| {
            for (id, rect) in &candidates {
                context.active_if_mouse_inside(*id, *rect);

                if context.has_focus(*id) {
                    if let Some(press) = A::widget_press() {
                        if context.pressed(press) {
                            context.set_focus(*id);
                            to_fire.push(*id);
                            continue;
                        }
                    }
                }

                if context.is_active(*id) {
                    context.set_focus(*id);
                    to_fire.push(*id);
                }
            }
        });

        for id in to_fire {
            let Some(listener) = collection
                .get_entity_for_id_mut(id)
                .and_then(|entity| entity.get_mut::<HasDragListener>())
            else {
                continue;
            };
            listener.down = true;
            let mut cb = std::mem::replace(&mut listener.cb, Box::new(|_, _| {}));
            cb(collection, id);
            if let Some(listener) = collection
                .get_entity_for_id_mut(id)
                .and_then(|entity| entity.get_mut::<HasDragListener>())
            {
                listener.cb = cb;
            }
        }
    }
}

/// WidgetLeft / WidgetRight on the focused widget (sliders, paginators).
pub struct HandleLeftRight<A: InputAction> {
    _marker: PhantomData<A>,
}

impl<A: InputAction> Default for HandleLeftRight<A> {
    fn default() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<A: InputAction> System for HandleLeftRight<A> {
    fn run_iteration(
        &mut self,
        collection: &mut EntityCollection,
        _signature: &SystemSignature,
        _dt: f32,
    ) {
        let candidates: Vec<EntityId> = collection
            .entities()
            .filter(|entity| entity.has::<HasLeftRightListener>())
            .map(|entity| entity.id)
            .collect();

        let mut to_fire: Option<(EntityId, i32)> = None;
        collection.singleton_scope::<UIContext<A>, _>(|_, context| {
            for id in &candidates {
                if !context.has_focus(*id) {
                    continue;
                }
                if let Some(left) = A::widget_left() {
                    if context.pressed(left) {
                        to_fire = Some((*id, -1));
                        return;
                    }
                }
                if let Some(right) = A::widget_right() {
                    if context.pressed(right) {
                        to_fire = Some((*id, 1));
                        return;
                    }
                }
            }
        });

        if let Some((id, direction)) = to_fire {
            let Some(listener) = collection
                .get_entity_for_id_mut(id)
                .and_then(|entity| entity.get_mut::<HasLeftRightListener>())
            else {
                return;
            };
            let mut cb = std::mem::replace(&mut listener.cb, Box::new(|_, _, _| {}));
            cb(collection, id, direction);
            if let Some(listener) = collection
                .get_entity_for_id_mut(id)
                .and_then(|entity| entity.get_mut::<HasLeftRightListener>())
            {
                listener.cb = cb;
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Widget-specific systems
// ---------------------------------------------------------------------------

/// Rebuilds the visible children of dropdowns whose options are fetched
/// dynamically, and collapses them to the selected row when closed.
pub struct UpdateDropdownOptions<A: InputAction> {
    _marker: PhantomData<A>,
}

impl<A: InputAction> Default for UpdateDropdownOptions<A> {
    fn default() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<A: InputAction> System for UpdateDropdownOptions<A> {
    fn run_iteration(
        &mut self,
        collection: &mut EntityCollection,
        _signature: &SystemSignature,
        _dt: f32,
    ) {
        let dropdowns: Vec<EntityId> = collection
            .entities()
            .filter(|entity| {
                entity.has::<UIComponent>()
                    && entity.has::<HasDropdownState>()
                    && entity.has::<HasChildrenComponent>()
            })
            .map(|entity| entity.id)
            .collect();

        for id in dropdowns {
            // Refresh options.
            let (options, desired_row_height, needs_children) = {
                let Some(entity) = collection.get_entity_for_id_mut(id) else {
                    continue;
                };
                let row_height = entity
                    .get::<UIComponent>()
                    .map(|cmp| cmp.desired.y.value)
                    .unwrap_or(50.0);
                let state = entity.get_mut::<HasDropdownState>().unwrap();
                if let Some(fetch) = state.fetch_options.as_mut() {
                    state.options = fetch();
                }
                let needs_children = entity
                    .get::<HasChildrenComponent>()
                    .is_some_and(|children| children.children.is_empty());
                let entity = collection.get_entity_for_id(id).unwrap();
                let state = entity.get::<HasDropdownState>().unwrap();
                (state.options.clone(), row_height, needs_children)
            };

            if needs_children {
                if options.is_empty() {
                    log::warn!("you have a dropdown with no options");
                    continue;
                }
                for (index, option) in options.iter().enumerate() {
                    let child_id = {
                        let child = collection.create_entity();
                        let child_id = child.id;
                        child
                            .add_component(UIComponent::new(child_id))
                            .set_desired_width(percent(1.0))
                            .set_desired_height(pixels(desired_row_height))
                            .set_parent(id);
                        child.add_component(HasLabel::new(option, false));
                        child.add_component(HasClickListener::new(Box::new(
                            move |collection, _self_id| {
                                log::info!("clicked {index}");
                                let Some(state) = collection
                                    .get_entity_for_id_mut(id)
                                    .and_then(|entity| entity.get_mut::<HasDropdownState>())
                                else {
                                    return;
                                };
                                state.on = !state.on;
                                state.last_option_clicked = index;
                                state.changed_since = true;
                                if let Some(on_changed) = state.on_option_changed.as_mut() {
                                    on_changed(index);
                                }
                            },
                        )));
                        child_id
                    };
                    if let Some(children) = collection
                        .get_entity_for_id_mut(id)
                        .and_then(|entity| entity.get_mut::<HasChildrenComponent>())
                    {
                        children.children.push(child_id);
                    }
                }
            }

            // Reconcile the layout tree with the open/closed state.
            let Some(entity) = collection.get_entity_for_id_mut(id) else {
                continue;
            };
            let owned = entity
                .get::<HasChildrenComponent>()
                .map(|children| children.children.clone())
                .unwrap_or_default();
            let (open, selected) = entity
                .get::<HasDropdownState>()
                .map(|state| (state.on, state.last_option_clicked))
                .unwrap_or((false, 0));
            if let Some(cmp) = entity.get_mut::<UIComponent>() {
                cmp.children.clear();
                if open {
                    for child in owned {
                        cmp.add_child(child);
                    }
                } else if let Some(child) = owned.get(selected) {
                    cmp.add_child(*child);
                }
            }
        }
    }
}

/// Up/Down cycles the focused dropdown's options.
pub struct DropdownKeyboardNav<A: InputAction> {
    _marker: PhantomData<A>,
}

impl<A: InputAction> Default for DropdownKeyboardNav<A> {
    fn default() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<A: InputAction> System for DropdownKeyboardNav<A> {
    fn run_iteration(
        &mut self,
        collection: &mut EntityCollection,
        _signature: &SystemSignature,
        _dt: f32,
    ) {
        let dropdowns: Vec<EntityId> = collection
            .entities()
            .filter(|entity| entity.has::<HasDropdownState>())
            .map(|entity| entity.id)
            .collect();

        let mut change: Option<(EntityId, i32)> = None;
        collection.singleton_scope::<UIContext<A>, _>(|_, context| {
            for id in &dropdowns {
                if !context.has_focus(*id) {
                    continue;
                }
                if let Some(up) = A::widget_up() {
                    if context.pressed(up) {
                        change = Some((*id, -1));
                        return;
                    }
                }
                if let Some(down) = A::widget_down() {
                    if context.pressed(down) {
                        change = Some((*id, 1));
                        return;
                    }
                }
            }
        });

        let Some((id, direction)) = change else {
            return;
        };
        let Some(state) = collection
            .get_entity_for_id_mut(id)
            .and_then(|entity| entity.get_mut::<HasDropdownState>())
        else {
            return;
        };
        if state.options.is_empty() {
            return;
        }
        let count = state.options.len() as i32;
        let next = (state.last_option_clicked as i32 + direction).rem_euclid(count);
        state.last_option_clicked = next as usize;
        state.changed_since = true;
        if let Some(on_changed) = state.on_option_changed.as_mut() {
            on_changed(next as usize);
        }
    }
}

/// Closes an open dropdown when a press lands outside its subtree.
pub struct DropdownClickOutside<A: InputAction> {
    _marker: PhantomData<A>,
}

impl<A: InputAction> Default for DropdownClickOutside<A> {
    fn default() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

fn subtree_contains(collection: &EntityCollection, id: EntityId, point: Vec2) -> bool {
    let Some(cmp) = collection
        .get_entity_for_id(id)
        .and_then(|entity| entity.get::<UIComponent>())
    else {
        return false;
    };
    if cmp.is_visible && cmp.rect().contains(point) {
        return true;
    }
    cmp.children
        .clone()
        .into_iter()
        .any(|child| subtree_contains(collection, child, point))
}

impl<A: InputAction> System for DropdownClickOutside<A> {
    fn run_iteration(
        &mut self,
        collection: &mut EntityCollection,
        _signature: &SystemSignature,
        _dt: f32,
    ) {
        let (just_pressed, press_pos) = match collection.get_singleton_cmp::<UIContext<A>>() {
            Some(context) => (context.mouse.just_pressed, context.mouse.press_pos),
            None => return,
        };
        if !just_pressed {
            return;
        }

        let open_dropdowns: Vec<EntityId> = collection
            .entities()
            .filter(|entity| {
                entity
                    .get::<HasDropdownState>()
                    .is_some_and(|state| state.on)
            })
            .map(|entity| entity.id)
            .collect();

        for id in open_dropdowns {
            if subtree_contains(collection, id, press_pos) {
                continue;
            }
            if let Some(state) = collection
                .get_entity_for_id_mut(id)
                .and_then(|entity| entity.get_mut::<HasDropdownState>())
            {
                state.on = false;
            }
        }
    }
}

/// Eases every toggle switch knob toward its target.
pub struct ToggleSwitchAnimation;

impl System for ToggleSwitchAnimation {
    fn signature(&self) -> SystemSignature {
        SystemSignature::new().with::<HasToggleSwitchState>()
    }

    fn for_each(&mut self, entity: &mut crate::ecs::Entity, _dt: f32) {
        if let Some(state) = entity.get_mut::<HasToggleSwitchState>() {
            let target = if state.on { 1.0 } else { 0.0 };
            state.progress += 0.2 * (target - state.progress);
        }
    }
}

/// Wheel scrolling for scroll views: measures content, clamps the offset,
/// and shifts the laid-out subtree.
pub struct ScrollViewSystem<A: InputAction> {
    _marker: PhantomData<A>,
}

impl<A: InputAction> Default for ScrollViewSystem<A> {
    fn default() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

fn shift_subtree(collection: &mut EntityCollection, id: EntityId, delta_y: f32) {
    let children = {
        let Some(cmp) = collection
            .get_entity_for_id_mut(id)
            .and_then(|entity| entity.get_mut::<UIComponent>())
        else {
            return;
        };
        cmp.computed_rel.y += delta_y;
        cmp.children.clone()
    };
    for child in children {
        shift_subtree(collection, child, delta_y);
    }
}

impl<A: InputAction> System for ScrollViewSystem<A> {
    fn run_iteration(
        &mut self,
        collection: &mut EntityCollection,
        _signature: &SystemSignature,
        _dt: f32,
    ) {
        let (mouse_pos, wheel_y) = match collection.get_singleton_cmp::<UIContext<A>>() {
            Some(context) => (context.mouse.pos, context.mouse.wheel.y),
            None => return,
        };

        let views: Vec<EntityId> = collection
            .entities()
            .filter(|entity| entity.has::<HasScrollView>() && entity.has::<UIComponent>())
            .map(|entity| entity.id)
            .collect();

        for id in views {
            let Some(entity) = collection.get_entity_for_id(id) else {
                continue;
            };
            let Some(cmp) = entity.get::<UIComponent>() else {
                continue;
            };
            let rect = cmp.rect();
            let children = cmp.children.clone();

            // Content extent below the view's own origin.
            let mut content_height = 0.0f32;
            for child in &children {
                if let Some(child_cmp) = collection
                    .get_entity_for_id(*child)
                    .and_then(|entity| entity.get::<UIComponent>())
                {
                    let bottom = child_cmp.computed_rel.y + child_cmp.computed.y - rect.y;
                    content_height = content_height.max(bottom);
                }
            }

            let Some(view) = collection
                .get_entity_for_id_mut(id)
                .and_then(|entity| entity.get_mut::<HasScrollView>())
            else {
                continue;
            };
            view.content_height = content_height;
            view.viewport_height = rect.height;
            if rect.contains(mouse_pos) && wheel_y != 0.0 {
                view.offset_y -= wheel_y * SCROLL_MULTIPLIER;
            }
            view.offset_y = view.offset_y.clamp(0.0, view.max_scroll());
            let offset = view.offset_y;

            if offset != 0.0 {
                for child in children {
                    shift_subtree(collection, child, -offset);
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Text editing systems
// ---------------------------------------------------------------------------

/// Advances cursor blink timers on focused editors.
pub struct TextCursorBlinkSystem;

impl System for TextCursorBlinkSystem {
    fn for_each(&mut self, entity: &mut crate::ecs::Entity, dt: f32) {
        if let Some(state) = entity.get_mut::<HasTextInputState>() {
            if state.is_focused {
                state.cursor_blink_timer += dt;
                if state.cursor_blink_timer >= state.cursor_blink_rate * 2.0 {
                    state.cursor_blink_timer = 0.0;
                }
            }
        }
        if let Some(area) = entity.get_mut::<HasTextAreaState>() {
            if area.input.is_focused {
                area.input.cursor_blink_timer += dt;
                if area.input.cursor_blink_timer >= area.input.cursor_blink_rate * 2.0 {
                    area.input.cursor_blink_timer = 0.0;
                }
            }
        }
    }
}

/// Rebuilds attached line indexes when the text hash changes.
pub struct LineIndexUpdateSystem;

impl System for LineIndexUpdateSystem {
    fn signature(&self) -> SystemSignature {
        SystemSignature::new().with::<HasLineIndex>().with::<HasTextInputState>()
    }

    fn for_each(&mut self, entity: &mut crate::ecs::Entity, _dt: f32) {
        let hash = {
            let Some(state) = entity.get::<HasTextInputState>() else {
                return;
            };
            text_hash(state.text())
        };
        let text = entity
            .get::<HasTextInputState>()
            .map(|state| state.text().to_string())
            .unwrap_or_default();
        if let Some(line_index) = entity.get_mut::<HasLineIndex>() {
            if hash != line_index.last_text_hash {
                line_index.index.rebuild(&text);
                line_index.last_text_hash = hash;
            }
        }
    }
}

fn is_insertable(ch: char) -> bool {
    ch == '\t' || (!ch.is_control() && ch != '\u{7f}')
}

/// Routes typed characters and editing actions into the focused single-line
/// editor.
pub struct TextInputSystem<A: InputAction> {
    _marker: PhantomData<A>,
}

impl<A: InputAction> Default for TextInputSystem<A> {
    fn default() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<A: InputAction> System for TextInputSystem<A> {
    fn run_iteration(
        &mut self,
        collection: &mut EntityCollection,
        _signature: &SystemSignature,
        _dt: f32,
    ) {
        let inputs: Vec<EntityId> = collection
            .entities()
            .filter(|entity| entity.has::<HasTextInputState>())
            .map(|entity| entity.id)
            .collect();

        collection.singleton_scope::<UIContext<A>, _>(|collection, context| {
            for id in inputs {
                let focused = context.has_focus(id);
                let Some(state) = collection
                    .get_entity_for_id_mut(id)
                    .and_then(|entity| entity.get_mut::<HasTextInputState>())
                else {
                    continue;
                };
                state.is_focused = focused;
                if !focused {
                    continue;
                }

                let mut edited = false;
                for ch in context.chars_pressed.clone() {
                    if is_insertable(ch) {
                        edited |= state.insert_at_cursor(&ch.to_string());
                    }
                }

                if let Some(backspace) = A::text_backspace() {
                    if context.pressed(backspace) {
                        edited |= state.backspace();
                    }
                }
                if let Some(delete) = A::text_delete() {
                    if context.pressed(delete) {
                        edited |= state.delete_forward();
                    }
                }
                if let Some(left) = A::widget_left() {
                    if context.pressed(left) {
                        state.move_left();
                        edited = true;
                    }
                }
                if let Some(right) = A::widget_right() {
                    if context.pressed(right) {
                        state.move_right();
                        edited = true;
                    }
                }
                if let Some(home) = A::text_home() {
                    if context.pressed(home) {
                        state.move_home();
                        edited = true;
                    }
                }
                if let Some(end) = A::text_end() {
                    if context.pressed(end) {
                        state.move_end();
                        edited = true;
                    }
                }

                if edited {
                    // Typing restarts the blink cycle with the caret shown.
                    state.cursor_blink_timer = 0.0;
                }
            }
        });
    }
}

/// Multi-line editing for the focused text area: character input, newlines,
/// vertical movement with a preferred column, and cursor-following scroll.
pub struct TextAreaInputSystem<A: InputAction> {
    _marker: PhantomData<A>,
}

impl<A: InputAction> Default for TextAreaInputSystem<A> {
    fn default() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<A: InputAction> System for TextAreaInputSystem<A> {
    fn run_iteration(
        &mut self,
        collection: &mut EntityCollection,
        _signature: &SystemSignature,
        _dt: f32,
    ) {
        let areas: Vec<EntityId> = collection
            .entities()
            .filter(|entity| entity.has::<HasTextAreaState>())
            .map(|entity| entity.id)
            .collect();

        collection.singleton_scope::<UIContext<A>, _>(|collection, context| {
            for id in areas {
                let focused = context.has_focus(id);
                let viewport = collection
                    .get_entity_for_id(id)
                    .and_then(|entity| entity.get::<UIComponent>())
                    .map(|cmp| cmp.computed.y)
                    .unwrap_or(0.0);
                let Some(area) = collection
                    .get_entity_for_id_mut(id)
                    .and_then(|entity| entity.get_mut::<HasTextAreaState>())
                else {
                    continue;
                };
                area.input.is_focused = focused;
                if !focused {
                    continue;
                }

                let mut edited = false;
                let mut horizontal = false;
                for ch in context.chars_pressed.clone() {
                    if ch == '\n' || ch == '\r' {
                        edited |= area.input.insert_at_cursor("\n");
                        horizontal = true;
                    } else if is_insertable(ch) {
                        edited |= area.input.insert_at_cursor(&ch.to_string());
                        horizontal = true;
                    }
                }

                if let Some(backspace) = A::text_backspace() {
                    if context.pressed(backspace) {
                        edited |= area.input.backspace();
                        horizontal = true;
                    }
                }
                if let Some(delete) = A::text_delete() {
                    if context.pressed(delete) {
                        edited |= area.input.delete_forward();
                        horizontal = true;
                    }
                }
                if let Some(left) = A::widget_left() {
                    if context.pressed(left) {
                        area.input.move_left();
                        horizontal = true;
                    }
                }
                if let Some(right) = A::widget_right() {
                    if context.pressed(right) {
                        area.input.move_right();
                        horizontal = true;
                    }
                }
                if let Some(home) = A::text_home() {
                    if context.pressed(home) {
                        let pos = area.cursor_position_rc();
                        area.input.cursor_position = area.line_index.line_start(pos.row);
                        horizontal = true;
                    }
                }
                if let Some(end) = A::text_end() {
                    if context.pressed(end) {
                        let pos = area.cursor_position_rc();
                        area.input.cursor_position = area.line_index.line_end(pos.row);
                        horizontal = true;
                    }
                }

                if edited {
                    area.rebuild_line_index();
                    area.input.cursor_blink_timer = 0.0;
                }
                if horizontal {
                    area.remember_column();
                }

                if let Some(up) = A::widget_up() {
                    if context.pressed(up) {
                        area.move_up();
                    }
                }
                if let Some(down) = A::widget_down() {
                    if context.pressed(down) {
                        area.move_down();
                    }
                }

                area.ensure_cursor_visible(viewport.max(0.0));
            }
        });
    }
}

// ---------------------------------------------------------------------------
// Wiring
// ---------------------------------------------------------------------------

/// Create the UI singleton entity (context, input collector, styling
/// defaults, text cache, widget registry) and register every singleton.
pub fn add_singleton_components<A: InputAction>(
    ui: &mut EntityCollection,
    theme: Theme,
) -> EntityId {
    let id = {
        let entity = ui.create_permanent_entity();
        entity.add_component(UIContext::<A> {
            theme,
            ..Default::default()
        });
        entity.add_component(InputCollector::<A>::default());
        entity.add_component(TextMeasureCache::default());
        entity.add_component(UIStylingDefaults::default());
        entity.add_component(UIElementRegistry::default());
        entity.id
    };
    ui.register_singleton::<UIContext<A>>(id);
    ui.register_singleton::<InputCollector<A>>(id);
    ui.register_singleton::<TextMeasureCache>(id);
    ui.register_singleton::<UIStylingDefaults>(id);
    ui.register_singleton::<UIElementRegistry>(id);
    id
}

/// Register the frame-opening UI system. Host widget-building systems go
/// between this and [`register_after_ui_systems`].
pub fn register_before_ui_systems<A: InputAction>(systems: &mut SystemManager) {
    systems.register_ui_update_system(BeginUIContextManager::<A>::default());
}

/// Register layout, interaction, and frame-closing systems, in frame order.
pub fn register_after_ui_systems<A: InputAction>(
    systems: &mut SystemManager,
    resolution: Resolution,
) {
    systems.register_ui_update_system(UpdateDropdownOptions::<A>::default());
    systems.register_ui_update_system(ClearVisibility);
    systems.register_ui_update_system(RunAutoLayout::new(resolution));
    systems.register_ui_update_system(SetVisibility);
    systems.register_ui_update_system(ScrollViewSystem::<A>::default());
    systems.register_ui_update_system(HandleTabbing::<A>::default());
    systems.register_ui_update_system(HandleClicks::<A>::default());
    systems.register_ui_update_system(HandleDrags::<A>::default());
    systems.register_ui_update_system(HandleLeftRight::<A>::default());
    systems.register_ui_update_system(DropdownKeyboardNav::<A>::default());
    systems.register_ui_update_system(DropdownClickOutside::<A>::default());
    systems.register_ui_update_system(ToggleSwitchAnimation);
    systems.register_ui_update_system(super::animation::UIAnimationSystem::<A>::default());
    systems.register_ui_update_system(TextCursorBlinkSystem);
    systems.register_ui_update_system(LineIndexUpdateSystem);
    systems.register_ui_update_system(TextInputSystem::<A>::default());
    systems.register_ui_update_system(TextAreaInputSystem::<A>::default());
    systems.register_ui_update_system(EndUIContextManager::<A>::default());
}
