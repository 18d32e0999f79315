mod text_area;
mod text_input;

pub use text_input::TextInputConfig;

use std::marker::PhantomData;

use fixedbitset::FixedBitSet;

use crate::ecs::{EntityCollection, EntityId};
use crate::geometry::Resolution;
use crate::input::InputAction;

use super::component::{AutoLayoutRoot, NO_PARENT, UIComponent, UIComponentDebug};
use super::components::{
    HasCheckboxState, HasCircularProgress, HasClickListener, HasColor,
    HasDragListener, HasDropdownState, HasLabel, HasLeftRightListener, HasRoundedCorners,
    HasScrollView, HasSliderState, HasToggleSwitchState, ShouldHide, SkipWhenTabbing,
};
use super::config::{
    ComponentConfig, ComponentSize, DEFAULT_COMPONENT_SIZE, UIStylingDefaults, WidgetKind,
    overwrite_defaults,
};
use super::context::{RenderInfo, UIContext};
use super::identity::{EntityParent, mk, mk_indexed};
use super::layout_types::{
    Axis, FlexDirection, Spacing, children, children_min, percent, pixels,
};
use super::theme::{ColorUsage, CornerMask, Theme, modify_corners};

/// Typed payload carried back from a widget call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ElementData {
    None,
    Float(f32),
    Int(i64),
    Bool(bool),
    Bits(u64),
}

/// What a widget call returns: whether the widget changed this frame, the
/// backing entity, and a widget-specific payload. Total: every widget
/// returns a valid result even in degenerate cases.
#[derive(Debug, Clone, Copy)]
pub struct ElementResult {
    changed: bool,
    entity: EntityId,
    data: ElementData,
}

impl ElementResult {
    pub fn new(changed: bool, entity: EntityId) -> Self {
        Self {
            changed,
            entity,
            data: ElementData::None,
        }
    }

    pub fn with_data(changed: bool, entity: EntityId, data: ElementData) -> Self {
        Self {
            changed,
            entity,
            data,
        }
    }

    pub fn changed(&self) -> bool {
        self.changed
    }

    pub fn id(&self) -> EntityId {
        self.entity
    }

    pub fn as_f32(&self) -> f32 {
        match self.data {
            ElementData::Float(value) => value,
            ElementData::Int(value) => value as f32,
            _ => 0.0,
        }
    }

    pub fn as_usize(&self) -> usize {
        match self.data {
            ElementData::Int(value) => value.max(0) as usize,
            ElementData::Float(value) => value.max(0.0) as usize,
            _ => 0,
        }
    }

    pub fn as_bool(&self) -> bool {
        match self.data {
            ElementData::Bool(value) => value,
            _ => self.changed,
        }
    }

    pub fn as_bits(&self) -> u64 {
        match self.data {
            ElementData::Bits(bits) => bits,
            _ => 0,
        }
    }
}

impl From<&ElementResult> for bool {
    fn from(result: &ElementResult) -> bool {
        result.changed
    }
}

/// How a progress bar labels itself.
#[derive(Debug, Clone, Default)]
pub enum ProgressBarStyle {
    #[default]
    Percentage,
    Fraction,
    Custom(String),
    None,
}

/// One row source for [`Imm::tree_view`].
pub struct TreeNode {
    pub label: String,
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    pub fn leaf(label: &str) -> Self {
        Self {
            label: label.to_string(),
            children: Vec::new(),
        }
    }

    pub fn branch(label: &str, children: Vec<TreeNode>) -> Self {
        Self {
            label: label.to_string(),
            children,
        }
    }
}

/// Per-frame facade for immediate-mode widget calls against the UI
/// collection.
///
/// ```ignore
/// let mut imm = Imm::<Action>::new(app.ui());
/// let root = imm.root(resolution);
/// let ep = imm.mk(root.id());
/// if imm.button(ep, ComponentConfig::new().with_label("Play")).changed() {
///     start_game();
/// }
/// ```
pub struct Imm<'a, A: InputAction> {
    pub ui: &'a mut EntityCollection,
    _marker: PhantomData<A>,
}

impl<'a, A: InputAction> Imm<'a, A> {
    pub fn new(ui: &'a mut EntityCollection) -> Self {
        Self {
            ui,
            _marker: PhantomData,
        }
    }

    /// Resolve-or-create the widget entity for this call site.
    #[track_caller]
    pub fn mk(&mut self, parent: EntityId) -> EntityParent {
        mk(self.ui, parent)
    }

    /// [`Imm::mk`] with a disambiguator for call sites inside loops.
    #[track_caller]
    pub fn mk_indexed(&mut self, parent: EntityId, index: i64) -> EntityParent {
        mk_indexed(self.ui, parent, index)
    }

    /// The screen-sized layout root for this call site.
    #[track_caller]
    pub fn root(&mut self, resolution: Resolution) -> ElementResult {
        let (entity_id, _) = mk(self.ui, NO_PARENT);
        let created = self
            .ui
            .get_entity_for_id(entity_id)
            .is_some_and(|entity| entity.is_missing::<UIComponent>());
        if created {
            let entity = self.ui.get_entity_for_id_mut(entity_id).unwrap();
            entity.add_component(UIComponent::new(entity_id));
            entity.add_component(AutoLayoutRoot);
            entity.add_component(UIComponentDebug::new("root"));
        }
        let entity = self.ui.get_entity_for_id_mut(entity_id).unwrap();
        let cmp = entity.get_mut::<UIComponent>().unwrap();
        cmp.set_desired_width(pixels(resolution.width))
            .set_desired_height(pixels(resolution.height));
        cmp.children.clear();
        ElementResult::new(true, entity_id)
    }

    // -- Internals ----------------------------------------------------------

    fn theme(&self) -> Theme {
        self.ui
            .get_singleton_cmp::<UIContext<A>>()
            .map(|context| context.theme.clone())
            .unwrap_or_default()
    }

    fn resolve_config(
        &mut self,
        kind: WidgetKind,
        config: ComponentConfig,
        enable_color: bool,
    ) -> ComponentConfig {
        let theme = self.theme();
        let styling = self.ui.get_singleton_cmp::<UIStylingDefaults>();
        overwrite_defaults(
            &theme,
            styling.and_then(|defaults| defaults.get(kind)),
            config,
            enable_color,
        )
    }

    /// Create-or-refresh the entity's UI components from a resolved config.
    /// Returns true the frame the widget is first created.
    fn init_component(
        &mut self,
        ep: EntityParent,
        config: &ComponentConfig,
        debug_fallback: &str,
    ) -> bool {
        let (entity_id, parent_id) = ep;
        let theme = self.theme();

        let created = {
            let Some(entity) = self.ui.get_entity_for_id_mut(entity_id) else {
                log::error!("widget entity {entity_id} vanished before initialization");
                return false;
            };
            let created = entity.is_missing::<UIComponent>();
            if created {
                entity.add_component(UIComponent::new(entity_id));
                entity
                    .get_mut::<UIComponent>()
                    .unwrap()
                    .set_parent(parent_id);
                entity.add_component(UIComponentDebug::new(if config.debug_name.is_empty() {
                    debug_fallback
                } else {
                    &config.debug_name
                }));

                if !config.label.is_empty() {
                    let mut label = HasLabel::new(&config.label, config.disabled);
                    label.set_alignment(config.label_alignment);
                    entity.add_component(label);
                }
                if config.skip_when_tabbing {
                    entity.add_component(SkipWhenTabbing);
                }
            }
            created
        };

        // Attach to the parent tree (idempotent across frames).
        if let Some(parent_cmp) = self
            .ui
            .get_entity_for_id_mut(parent_id)
            .and_then(|entity| entity.get_mut::<UIComponent>())
        {
            parent_cmp.add_child(entity_id);
        } else if parent_id != NO_PARENT {
            log::warn!("widget {entity_id} attached to parent {parent_id} without a UIComponent");
        }

        // Everything below runs every frame so config changes apply live.
        let resolved_color = match config.color_usage {
            Some(ColorUsage::Custom) => Some(config.custom_color.unwrap_or_else(|| {
                log::warn!(
                    "custom color usage selected on {debug_fallback} but custom_color not set"
                );
                super::color::Color::UI_PINK
            })),
            Some(usage) if usage.is_valid() => Some(theme.from_usage(usage, config.disabled)),
            _ => None,
        };

        let Some(entity) = self.ui.get_entity_for_id_mut(entity_id) else {
            return created;
        };

        if config.hidden {
            entity.add_component_if_missing(ShouldHide::default);
        } else {
            entity.remove_component_if_exists::<ShouldHide>();
        }

        {
            let cmp = entity.get_mut::<UIComponent>().unwrap();
            cmp.set_desired_width(config.size.x_axis)
                .set_desired_height(config.size.y_axis)
                .set_desired_padding(config.padding)
                .set_desired_margin(config.margin);
            if let Some(direction) = config.flex_direction {
                cmp.set_flex_direction(direction);
            }
            if config.is_absolute {
                cmp.make_absolute();
                if let Some((x, y)) = config.absolute_pos {
                    cmp.set_absolute_position(x, y);
                }
            }
            cmp.font_name = config.font_name.clone().unwrap_or_default();
            cmp.font_size = pixels(config.font_size);
        }

        if let Some(corners) = config.rounded_corners {
            if corners.any() {
                let roundness = theme.roundness;
                let segments = theme.segments;
                entity
                    .add_component_if_missing(|| {
                        HasRoundedCorners::new(corners, roundness, segments)
                    })
                    .set(corners);
            }
        }

        if !config.label.is_empty() {
            entity
                .add_component_if_missing(|| HasLabel::new(&config.label, config.disabled))
                .set_label(&config.label)
                .set_disabled(config.disabled)
                .set_alignment(config.label_alignment);
            if let Some(usage) = config.color_usage {
                if usage.is_valid() {
                    entity
                        .get_mut::<HasLabel>()
                        .unwrap()
                        .set_background_hint(usage);
                }
            }
        }

        if let Some(color) = resolved_color {
            entity
                .add_component_if_missing(|| HasColor::new(color))
                .set(color);
        }

        if !config.debug_name.is_empty() {
            entity
                .add_component_if_missing(|| UIComponentDebug::new(&config.debug_name))
                .set(&config.debug_name);
        }

        let layer = config.render_layer;
        if let Some(context) = self.ui.get_singleton_cmp_mut::<UIContext<A>>() {
            context.queue_render(RenderInfo {
                id: entity_id,
                layer,
            });
        }
        created
    }

    /// Attach an animation to a widget (once; repeated calls with the same
    /// widget are no-ops for already-added configs of the same kind).
    pub fn animate(&mut self, id: EntityId, config: super::animation::AnimationConfig) {
        use super::animation::{Animation, HasAnimations};
        if let Some(entity) = self.ui.get_entity_for_id_mut(id) {
            let animations = entity.add_component_if_missing(HasAnimations::default);
            let exists = animations.animations.iter().any(|animation| {
                animation.config.when == config.when
                    && std::mem::discriminant(&animation.config.animation_type)
                        == std::mem::discriminant(&config.animation_type)
            });
            if !exists {
                animations.animations.push(Animation::new(config));
            }
        }
    }

    fn set_focus(&mut self, id: EntityId) {
        if let Some(context) = self.ui.get_singleton_cmp_mut::<UIContext<A>>() {
            context.set_focus(id);
        }
    }

    /// Read-and-clear a click listener's fired edge.
    fn take_click(&mut self, id: EntityId) -> bool {
        self.ui
            .get_entity_for_id_mut(id)
            .and_then(|entity| entity.get_mut::<HasClickListener>())
            .map(|listener| std::mem::take(&mut listener.down))
            .unwrap_or(false)
    }

    // -- Primitive widgets --------------------------------------------------

    /// Layout-only container.
    pub fn div(&mut self, ep: EntityParent, mut config: ComponentConfig) -> ElementResult {
        if config.size.is_default && config.label.is_empty() {
            config = config.with_size(ComponentSize::new(children(), children()));
        } else if config.size.is_default {
            config = config.with_size(ComponentSize::new(
                children_min(DEFAULT_COMPONENT_SIZE.0),
                children_min(DEFAULT_COMPONENT_SIZE.1),
            ));
        }
        let config = self.resolve_config(WidgetKind::Div, config, false);
        self.init_component(ep, &config, "div");
        ElementResult::new(true, ep.0)
    }

    /// Colored rectangle + label + click listener. `changed` the frame the
    /// activation edge fires.
    pub fn button(&mut self, ep: EntityParent, config: ComponentConfig) -> ElementResult {
        let config = self.resolve_config(WidgetKind::Button, config, true);
        self.init_component(ep, &config, "button");

        if let Some(entity) = self.ui.get_entity_for_id_mut(ep.0) {
            entity.add_component_if_missing(|| HasClickListener::new(Box::new(|_, _| {})));
        }

        let clicked = self.take_click(ep.0);
        ElementResult::new(clicked, ep.0)
    }

    /// A run of buttons sharing one container. `data` is the clicked index.
    pub fn button_group(
        &mut self,
        ep: EntityParent,
        labels: &[&str],
        mut config: ComponentConfig,
    ) -> ElementResult {
        let per_button = config.size;
        config.size = ComponentSize::new(per_button.x_axis, children_min(per_button.y_axis.value));
        let config = self.resolve_config(WidgetKind::ButtonGroup, config, false);
        self.init_component(ep, &config, "button_group");

        let mut clicked = false;
        let mut value: i64 = -1;
        for (index, label) in labels.iter().enumerate() {
            let child = self.mk_indexed(ep.0, index as i64);
            let child_config = ComponentConfig::inherit_from(&config, &format!("button group {index}"))
                .with_size(per_button)
                .with_label(label);
            if self.button(child, child_config).changed() {
                clicked = true;
                value = index as i64;
            }
        }

        ElementResult::with_data(clicked, ep.0, ElementData::Int(value))
    }

    /// Toggles `value` on click; Enter/Space toggles while focused.
    pub fn checkbox(
        &mut self,
        ep: EntityParent,
        value: &mut bool,
        mut config: ComponentConfig,
    ) -> ElementResult {
        {
            let initial = *value;
            if let Some(entity) = self.ui.get_entity_for_id_mut(ep.0) {
                entity.add_component_if_missing(|| HasCheckboxState::new(initial));
            }
        }

        config.label = if *value { "X" } else { " " }.to_string();
        let config = self.resolve_config(WidgetKind::Checkbox, config, true);
        let disabled = config.disabled;
        self.init_component(ep, &config, "checkbox");

        if let Some(entity) = self.ui.get_entity_for_id_mut(ep.0) {
            if disabled {
                entity.remove_component_if_exists::<HasClickListener>();
            } else {
                entity.add_component_if_missing(|| {
                    HasClickListener::new(Box::new(|collection, id| {
                        if let Some(state) = collection
                            .get_entity_for_id_mut(id)
                            .and_then(|entity| entity.get_mut::<HasCheckboxState>())
                        {
                            state.on = !state.on;
                            state.changed_since = true;
                        }
                    }))
                });
            }
        }

        let (on, changed) = {
            let state = self
                .ui
                .get_entity_for_id_mut(ep.0)
                .and_then(|entity| entity.get_mut::<HasCheckboxState>());
            match state {
                Some(state) => {
                    let changed = std::mem::take(&mut state.changed_since);
                    (state.on, changed)
                }
                None => (*value, false),
            }
        };
        *value = on;
        ElementResult::with_data(changed, ep.0, ElementData::Bool(on))
    }

    /// Labeled checkboxes over a bitset; `min_max` bounds how many may be
    /// set (-1 = unbounded) by disabling the toggles that would violate.
    pub fn checkbox_group(
        &mut self,
        ep: EntityParent,
        values: &mut FixedBitSet,
        labels: &[&str],
        min_max: (i32, i32),
        mut config: ComponentConfig,
    ) -> ElementResult {
        let row_size = config.size;
        config.size = ComponentSize::new(row_size.x_axis, children());
        let config = self.resolve_config(WidgetKind::CheckboxGroup, config, false);
        self.init_component(ep, &config, "checkbox_group");

        let count = values.count_ones(..) as i32;
        let should_disable = |value: bool| -> bool {
            let at_cap = !value && min_max.1 != -1 && count >= min_max.1;
            let at_min = value && min_max.0 != -1 && count <= min_max.0;
            at_cap || at_min
        };

        let mut changed = false;
        for index in 0..values.len() {
            let mut value = values.contains(index);
            let row = self.mk_indexed(ep.0, index as i64);
            let label = labels.get(index).copied().unwrap_or("");
            let row_config = ComponentConfig::inherit_from(&config, &format!("checkbox row {index}"))
                .with_size(row_size)
                .with_label(label)
                .with_flex_direction(FlexDirection::ROW)
                .with_disabled(config.disabled || should_disable(value));
            if self.checkbox_row(row, index, &mut value, row_config).changed() {
                changed = true;
                values.set(index, value);
            }
        }

        let bits: u64 = values.ones().take(64).fold(0u64, |acc, i| acc | (1 << i));
        ElementResult::with_data(changed, ep.0, ElementData::Bits(bits))
    }

    fn checkbox_row(
        &mut self,
        ep: EntityParent,
        index: usize,
        value: &mut bool,
        mut config: ComponentConfig,
    ) -> ElementResult {
        let label = std::mem::take(&mut config.label);
        let row_config = self.resolve_config(WidgetKind::CheckboxGroup, config, false);
        self.init_component(ep, &row_config, "checkbox_row");

        let mut size = ComponentSize::new(
            pixels(DEFAULT_COMPONENT_SIZE.0),
            children_min(DEFAULT_COMPONENT_SIZE.1),
        );
        if !label.is_empty() {
            size = size.scale_x(0.5);
            let label_ep = self.mk_indexed(ep.0, index as i64);
            self.div(
                label_ep,
                ComponentConfig::inherit_from(&row_config, &format!("checkbox label {index}"))
                    .with_size(size)
                    .with_label(&label),
            );
        }

        let box_ep = self.mk_indexed(ep.0, index as i64);
        let result = self.checkbox(
            box_ep,
            value,
            ComponentConfig::inherit_from(&row_config, &format!("checkbox {index}"))
                .with_size(size)
                .with_disabled(row_config.disabled),
        );
        ElementResult::with_data(result.changed(), ep.0, ElementData::Bool(*value))
    }

    /// Horizontal draggable control over `[0, 1]`. Left/Right arrows step by
    /// 1% while focused. The handle overlays the track via left padding.
    pub fn slider(
        &mut self,
        ep: EntityParent,
        owned_value: &mut f32,
        mut config: ComponentConfig,
    ) -> ElementResult {
        let original_label = std::mem::take(&mut config.label);
        let config = self.resolve_config(WidgetKind::Slider, config, true);
        self.init_component(ep, &config, "slider");

        let corners = config.rounded_corners.unwrap_or(CornerMask::ALL);
        let track_size = config.size;

        if !original_label.is_empty() {
            let label_corners = modify_corners(corners, &[(1, false), (3, false)]);
            let label_ep = self.mk(ep.0);
            self.div(
                label_ep,
                ComponentConfig::inherit_from(&config, "slider_text")
                    .with_size(ComponentSize::new(
                        track_size.scale_x(0.5).x_axis,
                        track_size.y_axis,
                    ))
                    .with_label(&original_label)
                    .with_color_usage(ColorUsage::Primary)
                    .with_rounded_corners(label_corners),
            );
        }

        // The handle is the track's child; the track's left padding is what
        // slides it.
        let track_ep = self.mk(ep.0);
        let current_value = self
            .ui
            .get_entity_for_id(track_ep.0)
            .and_then(|entity| entity.get::<HasSliderState>())
            .map(|state| state.value)
            .unwrap_or(*owned_value);

        let track_corners = modify_corners(corners, &[(0, false), (2, false)]);
        let track = self.div(
            track_ep,
            ComponentConfig::inherit_from(&config, "slider_background")
                .with_size(ComponentSize::new(track_size.x_axis, track_size.y_axis))
                .with_padding(Spacing::left(pixels(
                    current_value * 0.75 * track_size.x_axis.value,
                )))
                .with_color_usage(ColorUsage::Secondary)
                .with_rounded_corners(track_corners)
                .with_render_layer(config.render_layer + 1),
        );
        let track_id = track.id();

        {
            let initial = *owned_value;
            if let Some(entity) = self.ui.get_entity_for_id_mut(track_id) {
                entity.add_component_if_missing(|| HasSliderState::new(initial));
                entity.add_component_if_missing(|| HasClickListener::new(Box::new(|_, _| {})));
                entity.add_component_if_missing(|| {
                    HasDragListener::new(Box::new(move |collection, id| {
                        slider_drag::<A>(collection, id);
                    }))
                });
                entity.add_component_if_missing(|| {
                    HasLeftRightListener {
                        cb: Box::new(move |collection, id, direction| {
                            slider_step(collection, id, direction as f32 * 0.01);
                        }),
                    }
                });
            }
        }

        let handle_corners = modify_corners(corners, &[(0, false), (2, false)]);
        let handle_ep = self.mk(track_id);
        let handle_width = 0.25 * track_size.x_axis.value;
        self.div(
            handle_ep,
            ComponentConfig::inherit_from(&config, "slider_handle")
                .with_size(ComponentSize::new(
                    pixels(handle_width).with_strictness(1.0),
                    track_size.y_axis,
                ))
                .with_color_usage(ColorUsage::Primary)
                .with_rounded_corners(handle_corners)
                .with_render_layer(config.render_layer + 2)
                .with_skip_tabbing(true),
        );

        let value = self
            .ui
            .get_entity_for_id(track_id)
            .and_then(|entity| entity.get::<HasSliderState>())
            .map(|state| state.value)
            .unwrap_or(*owned_value);

        let changed = {
            let state = self
                .ui
                .get_entity_for_id_mut(track_id)
                .and_then(|entity| entity.get_mut::<HasSliderState>());
            match state {
                Some(state) => std::mem::take(&mut state.changed_since),
                None => false,
            }
        };

        *owned_value = value;
        ElementResult::with_data(changed, ep.0, ElementData::Float(value))
    }

    /// Collapsed: selected label + arrow. Expanded: an absolute button
    /// column. Click-outside closes; Up/Down cycles while focused.
    pub fn dropdown(
        &mut self,
        ep: EntityParent,
        options: &[&str],
        option_index: &mut usize,
        mut config: ComponentConfig,
    ) -> ElementResult {
        if options.is_empty() {
            return ElementResult::new(false, ep.0);
        }

        {
            let initial = *option_index;
            let options_owned: Vec<String> =
                options.iter().map(|option| option.to_string()).collect();
            if let Some(entity) = self.ui.get_entity_for_id_mut(ep.0) {
                entity.add_component_if_missing(|| {
                    let mut state = HasDropdownState::new(options_owned);
                    state.last_option_clicked = initial;
                    state
                });
            }
        }

        let label_str = std::mem::take(&mut config.label);
        config.size = ComponentSize::new(
            children_min(DEFAULT_COMPONENT_SIZE.0),
            pixels(DEFAULT_COMPONENT_SIZE.1),
        );
        let config = self.resolve_config(WidgetKind::Dropdown, config, false);
        self.init_component(ep, &config, "dropdown");

        let corners = config.rounded_corners.unwrap_or(CornerMask::ALL);
        let size = ComponentSize::new(
            pixels(if label_str.is_empty() {
                DEFAULT_COMPONENT_SIZE.0
            } else {
                DEFAULT_COMPONENT_SIZE.0 / 2.0
            }),
            pixels(DEFAULT_COMPONENT_SIZE.1),
        );

        let mut button_corners = corners;
        if !label_str.is_empty() {
            let label_corners = modify_corners(corners, &[(1, false), (3, false)]);
            button_corners = modify_corners(button_corners, &[(0, false), (2, false)]);
            let label_ep = self.mk(ep.0);
            self.div(
                label_ep,
                ComponentConfig::inherit_from(&config, "dropdown_label")
                    .with_size(size)
                    .with_label(&label_str)
                    .with_color_usage(ColorUsage::Primary)
                    .with_rounded_corners(label_corners),
            );
        }

        let (open, selected) = {
            let state = self
                .ui
                .get_entity_for_id(ep.0)
                .and_then(|entity| entity.get::<HasDropdownState>());
            match state {
                Some(state) => (state.on, state.last_option_clicked.min(options.len() - 1)),
                None => (false, 0),
            }
        };

        let current_option = options[if open { 0 } else { selected }];
        let arrow = if open { " ^" } else { " v" };
        let main_label = format!("{current_option}{arrow}");

        let main_ep = self.mk(ep.0);
        let main_clicked = self
            .button(
                main_ep,
                ComponentConfig::inherit_from(&config, "dropdown_main")
                    .with_size(size)
                    .with_label(&main_label)
                    .with_rounded_corners(button_corners),
            )
            .changed();

        if main_clicked {
            if let Some(state) = self
                .ui
                .get_entity_for_id_mut(ep.0)
                .and_then(|entity| entity.get_mut::<HasDropdownState>())
            {
                if state.on {
                    // Open dropdown's first row is the selected option.
                    state.last_option_clicked = 0;
                    state.changed_since = true;
                }
                state.on = !state.on;
            }
        }

        let group_ep = self.mk(ep.0);
        let group = self.button_group(
            group_ep,
            options,
            ComponentConfig::inherit_from(&config, "dropdown options")
                .with_hidden(config.hidden || !open)
                .with_absolute()
                .with_render_layer(config.render_layer + 1),
        );
        if group.changed() {
            let picked = group.as_usize();
            if let Some(state) = self
                .ui
                .get_entity_for_id_mut(ep.0)
                .and_then(|entity| entity.get_mut::<HasDropdownState>())
            {
                state.on = false;
                state.last_option_clicked = picked;
                state.changed_since = true;
                if let Some(on_changed) = state.on_option_changed.as_mut() {
                    on_changed(picked);
                }
            }
            self.set_focus(ep.0);
        }

        let (index, changed) = {
            let state = self
                .ui
                .get_entity_for_id_mut(ep.0)
                .and_then(|entity| entity.get_mut::<HasDropdownState>());
            match state {
                Some(state) => (
                    state.last_option_clicked,
                    std::mem::take(&mut state.changed_since),
                ),
                None => (*option_index, false),
            }
        };
        *option_index = index;
        ElementResult::with_data(changed, ep.0, ElementData::Int(index as i64))
    }

    /// ‹ | option buttons | ›.
    pub fn pagination(
        &mut self,
        ep: EntityParent,
        options: &[&str],
        option_index: &mut usize,
        mut config: ComponentConfig,
    ) -> ElementResult {
        if options.is_empty() {
            return ElementResult::new(false, ep.0);
        }

        config.size = ComponentSize::new(
            children_min(DEFAULT_COMPONENT_SIZE.0),
            pixels(DEFAULT_COMPONENT_SIZE.1),
        );
        config.flex_direction = Some(FlexDirection::ROW);
        let config = self.resolve_config(WidgetKind::Pagination, config, false);
        self.init_component(ep, &config, "pagination");

        let arrow_size = ComponentSize::new(
            pixels(DEFAULT_COMPONENT_SIZE.0 / 4.0),
            pixels(DEFAULT_COMPONENT_SIZE.1),
        );
        let option_size = ComponentSize::new(
            pixels(DEFAULT_COMPONENT_SIZE.0 / 2.0),
            pixels(DEFAULT_COMPONENT_SIZE.1),
        );

        let mut next_index: Option<usize> = None;

        let left_ep = self.mk(ep.0);
        if self
            .button(
                left_ep,
                ComponentConfig::inherit_from(&config, "left")
                    .with_size(arrow_size)
                    .with_label("<"),
            )
            .changed()
        {
            next_index = Some(if *option_index > 0 {
                *option_index - 1
            } else {
                options.len() - 1
            });
        }

        for (index, option) in options.iter().enumerate() {
            let option_ep = self.mk_indexed(ep.0, index as i64);
            if self
                .button(
                    option_ep,
                    ComponentConfig::inherit_from(&config, &format!("option {}", index + 1))
                        .with_size(option_size)
                        .with_label(option)
                        .with_render_layer(config.render_layer + 1),
                )
                .changed()
            {
                next_index = Some(index);
            }
        }

        let right_ep = self.mk(ep.0);
        if self
            .button(
                right_ep,
                ComponentConfig::inherit_from(&config, "right")
                    .with_size(arrow_size)
                    .with_label(">"),
            )
            .changed()
        {
            next_index = Some((*option_index + 1) % options.len());
        }

        let changed = next_index.is_some_and(|next| next != *option_index);
        if let Some(next) = next_index {
            *option_index = next;
        }
        ElementResult::with_data(changed, ep.0, ElementData::Int(*option_index as i64))
    }

    /// ‹ centered current label ›.
    pub fn navigation_bar(
        &mut self,
        ep: EntityParent,
        options: &[&str],
        option_index: &mut usize,
        mut config: ComponentConfig,
    ) -> ElementResult {
        if options.is_empty() {
            return ElementResult::new(false, ep.0);
        }

        config.size = ComponentSize::new(
            children_min(DEFAULT_COMPONENT_SIZE.0),
            pixels(DEFAULT_COMPONENT_SIZE.1),
        );
        config.flex_direction = Some(FlexDirection::ROW);
        let config = self.resolve_config(WidgetKind::NavigationBar, config, false);
        self.init_component(ep, &config, "navigation_bar");

        let arrow_size = ComponentSize::new(
            pixels(DEFAULT_COMPONENT_SIZE.0 / 4.0),
            pixels(DEFAULT_COMPONENT_SIZE.1),
        );

        let mut changed = false;
        let left_ep = self.mk(ep.0);
        if self
            .button(
                left_ep,
                ComponentConfig::inherit_from(&config, "nav_left")
                    .with_size(arrow_size)
                    .with_label("<"),
            )
            .changed()
        {
            *option_index = if *option_index > 0 {
                *option_index - 1
            } else {
                options.len() - 1
            };
            changed = true;
        }

        let label_ep = self.mk(ep.0);
        self.div(
            label_ep,
            ComponentConfig::inherit_from(&config, "nav_label")
                .with_size(ComponentSize::new(
                    pixels(DEFAULT_COMPONENT_SIZE.0 / 2.0),
                    pixels(DEFAULT_COMPONENT_SIZE.1),
                ))
                .with_label(options[*option_index])
                .with_color_usage(ColorUsage::Surface),
        );

        let right_ep = self.mk(ep.0);
        if self
            .button(
                right_ep,
                ComponentConfig::inherit_from(&config, "nav_right")
                    .with_size(arrow_size)
                    .with_label(">"),
            )
            .changed()
        {
            *option_index = (*option_index + 1) % options.len();
            changed = true;
        }

        ElementResult::with_data(changed, ep.0, ElementData::Int(*option_index as i64))
    }

    /// Row of equal-width tabs; the active one highlights.
    pub fn tab_container(
        &mut self,
        ep: EntityParent,
        labels: &[&str],
        active: &mut usize,
        mut config: ComponentConfig,
    ) -> ElementResult {
        if labels.is_empty() {
            return ElementResult::new(false, ep.0);
        }

        config.flex_direction = Some(FlexDirection::ROW);
        let config = self.resolve_config(WidgetKind::TabContainer, config, false);
        self.init_component(ep, &config, "tab_container");

        let tab_width = 1.0 / labels.len() as f32;
        let mut changed = false;
        for (index, label) in labels.iter().enumerate() {
            let tab_ep = self.mk_indexed(ep.0, index as i64);
            let usage = if index == *active {
                ColorUsage::Accent
            } else {
                ColorUsage::Secondary
            };
            if self
                .button(
                    tab_ep,
                    ComponentConfig::inherit_from(&config, &format!("tab {index}"))
                        .with_size(ComponentSize::new(percent(tab_width), percent(1.0)))
                        .with_label(label)
                        .with_color_usage(usage),
                )
                .changed()
                && index != *active
            {
                *active = index;
                changed = true;
            }
        }

        ElementResult::with_data(changed, ep.0, ElementData::Int(*active as i64))
    }

    /// Pill switch with an animated sliding knob.
    pub fn toggle_switch(
        &mut self,
        ep: EntityParent,
        value: &mut bool,
        mut config: ComponentConfig,
    ) -> ElementResult {
        {
            let initial = *value;
            if let Some(entity) = self.ui.get_entity_for_id_mut(ep.0) {
                entity.add_component_if_missing(|| HasToggleSwitchState::new(initial));
            }
        }

        if config.size.is_default {
            config.size = ComponentSize::new(pixels(72.0), pixels(32.0));
        }
        let config = self.resolve_config(WidgetKind::ToggleSwitch, config, false);
        self.init_component(ep, &config, "toggle_switch");

        let (on, progress) = {
            let state = self
                .ui
                .get_entity_for_id(ep.0)
                .and_then(|entity| entity.get::<HasToggleSwitchState>());
            match state {
                Some(state) => (state.on, state.progress),
                None => (*value, 0.0),
            }
        };

        // Track colored by state; knob slides with the eased progress.
        let track_ep = self.mk(ep.0);
        let track_usage = if on {
            ColorUsage::Primary
        } else {
            ColorUsage::Secondary
        };
        let track = self.div(
            track_ep,
            ComponentConfig::inherit_from(&config, "toggle_track")
                .with_size(ComponentSize::new(percent(1.0), percent(1.0)))
                .with_color_usage(track_usage)
                .with_skip_tabbing(true),
        );

        let knob_size = config.size.y_axis.value - 8.0;
        let travel = config.size.x_axis.value - knob_size - 8.0;
        let knob_ep = self.mk(track.id());
        self.div(
            knob_ep,
            ComponentConfig::inherit_from(&config, "toggle_knob")
                .with_size(ComponentSize::new(pixels(knob_size), pixels(knob_size)))
                .with_padding(Spacing::left(pixels(4.0 + travel * progress)))
                .with_color_usage(ColorUsage::Font)
                .with_render_layer(config.render_layer + 1)
                .with_skip_tabbing(true),
        );

        if !self
            .ui
            .get_entity_for_id(ep.0)
            .is_some_and(|entity| entity.has::<HasClickListener>())
        {
            if let Some(entity) = self.ui.get_entity_for_id_mut(ep.0) {
                entity.add_component(HasClickListener::new(Box::new(|collection, id| {
                    if let Some(state) = collection
                        .get_entity_for_id_mut(id)
                        .and_then(|entity| entity.get_mut::<HasToggleSwitchState>())
                    {
                        state.on = !state.on;
                        state.changed_since = true;
                    }
                })));
            }
        }

        let (on, changed) = {
            let state = self
                .ui
                .get_entity_for_id_mut(ep.0)
                .and_then(|entity| entity.get_mut::<HasToggleSwitchState>());
            match state {
                Some(state) => (state.on, std::mem::take(&mut state.changed_since)),
                None => (*value, false),
            }
        };
        *value = on;
        ElementResult::with_data(changed, ep.0, ElementData::Bool(on))
    }

    /// Mutually-exclusive ring buttons with an inner dot on the selection.
    pub fn radio_group(
        &mut self,
        ep: EntityParent,
        labels: &[&str],
        selected: &mut usize,
        config: ComponentConfig,
    ) -> ElementResult {
        let config = self.resolve_config(WidgetKind::RadioGroup, config, false);
        self.init_component(ep, &config, "radio_group");

        let mut changed = false;
        for (index, label) in labels.iter().enumerate() {
            let row_ep = self.mk_indexed(ep.0, index as i64);
            let row = self.div(
                row_ep,
                ComponentConfig::inherit_from(&config, &format!("radio row {index}"))
                    .with_size(ComponentSize::new(
                        children_min(DEFAULT_COMPONENT_SIZE.0),
                        children_min(32.0),
                    ))
                    .with_flex_direction(FlexDirection::ROW),
            );

            // Outer ring, with the inner dot only on the selection.
            let ring_ep = self.mk_indexed(row.id(), index as i64);
            let ring = self.button(
                ring_ep,
                ComponentConfig::inherit_from(&config, &format!("radio ring {index}"))
                    .with_size(ComponentSize::new(pixels(24.0), pixels(24.0)))
                    .with_color_usage(ColorUsage::Secondary)
                    .with_rounded_corners(CornerMask::ALL),
            );
            if ring.changed() && index != *selected {
                *selected = index;
                changed = true;
            }

            if index == *selected {
                let dot_ep = self.mk_indexed(ring.id(), index as i64);
                self.div(
                    dot_ep,
                    ComponentConfig::inherit_from(&config, &format!("radio dot {index}"))
                        .with_size(ComponentSize::new(pixels(12.0), pixels(12.0)))
                        .with_padding(Spacing::all(pixels(6.0)))
                        .with_color_usage(ColorUsage::Accent)
                        .with_rounded_corners(CornerMask::ALL)
                        .with_render_layer(config.render_layer + 1)
                        .with_skip_tabbing(true),
                );
            }

            let label_ep = self.mk_indexed(row.id(), index as i64);
            self.div(
                label_ep,
                ComponentConfig::inherit_from(&config, &format!("radio label {index}"))
                    .with_size(ComponentSize::new(
                        pixels(DEFAULT_COMPONENT_SIZE.0 - 24.0),
                        pixels(32.0),
                    ))
                    .with_label(label),
            );
        }

        ElementResult::with_data(changed, ep.0, ElementData::Int(*selected as i64))
    }

    /// Read-only fill bar with a generated or custom label.
    pub fn progress_bar(
        &mut self,
        ep: EntityParent,
        value: f32,
        min: f32,
        max: f32,
        style: ProgressBarStyle,
        config: ComponentConfig,
    ) -> ElementResult {
        let config = self.resolve_config(WidgetKind::ProgressBar, config, false);
        self.init_component(ep, &config, "progress_bar");

        let span = (max - min).max(f32::EPSILON);
        let fraction = ((value - min) / span).clamp(0.0, 1.0);

        let track_ep = self.mk(ep.0);
        let track = self.div(
            track_ep,
            ComponentConfig::inherit_from(&config, "progress_track")
                .with_size(ComponentSize::new(percent(1.0), percent(1.0)))
                .with_color_usage(ColorUsage::Secondary)
                .with_skip_tabbing(true),
        );

        if fraction > 0.0 {
            let fill_ep = self.mk(track.id());
            self.div(
                fill_ep,
                ComponentConfig::inherit_from(&config, "progress_fill")
                    .with_size(ComponentSize::new(percent(fraction), percent(1.0)))
                    .with_color_usage(ColorUsage::Primary)
                    .with_render_layer(config.render_layer + 1)
                    .with_skip_tabbing(true),
            );
        }

        let label = match style {
            ProgressBarStyle::Percentage => format!("{:.0}%", fraction * 100.0),
            ProgressBarStyle::Fraction => format!("{value:.0}/{max:.0}"),
            ProgressBarStyle::Custom(text) => text,
            ProgressBarStyle::None => String::new(),
        };
        if !label.is_empty() {
            let label_ep = self.mk(track.id());
            self.div(
                label_ep,
                ComponentConfig::inherit_from(&config, "progress_label")
                    .with_size(ComponentSize::new(percent(1.0), percent(1.0)))
                    .with_label(&label)
                    .with_absolute()
                    .with_render_layer(config.render_layer + 2)
                    .with_skip_tabbing(true),
            );
        }

        ElementResult::with_data(false, ep.0, ElementData::Float(fraction))
    }

    /// Ring progress indicator; rendered by the backend's ring hook rather
    /// than as a rectangle.
    pub fn circular_progress(
        &mut self,
        ep: EntityParent,
        value: f32,
        mut config: ComponentConfig,
    ) -> ElementResult {
        if config.size.is_default {
            config.size = ComponentSize::new(pixels(48.0), pixels(48.0));
        }
        let config = self.resolve_config(WidgetKind::CircularProgress, config, false);
        self.init_component(ep, &config, "circular_progress");

        let clamped = value.clamp(0.0, 1.0);
        if let Some(entity) = self.ui.get_entity_for_id_mut(ep.0) {
            entity
                .add_component_if_missing(|| HasCircularProgress {
                    value: clamped,
                    thickness: 6.0,
                })
                .value = clamped;
        }

        ElementResult::with_data(false, ep.0, ElementData::Float(clamped))
    }

    /// Thin muted rule.
    pub fn separator(&mut self, ep: EntityParent, mut config: ComponentConfig) -> ElementResult {
        if config.size.is_default {
            config.size = ComponentSize::new(percent(1.0), pixels(2.0));
        }
        let config = self.resolve_config(WidgetKind::Separator, config, false);
        let config = if config.color_usage.is_none() {
            config.with_color_usage(ColorUsage::FontMuted)
        } else {
            config
        };
        self.init_component(ep, &config, "separator");
        ElementResult::new(true, ep.0)
    }

    /// Four thin edge divs around a content hole.
    pub fn decorative_frame(
        &mut self,
        ep: EntityParent,
        config: ComponentConfig,
    ) -> ElementResult {
        let config = self.resolve_config(WidgetKind::DecorativeFrame, config, false);
        self.init_component(ep, &config, "decorative_frame");

        let thickness = 2.0;
        let edges: [(&str, ComponentSize, bool); 4] = [
            ("frame_top", ComponentSize::new(percent(1.0), pixels(thickness)), false),
            ("frame_bottom", ComponentSize::new(percent(1.0), pixels(thickness)), true),
            ("frame_left", ComponentSize::new(pixels(thickness), percent(1.0)), false),
            ("frame_right", ComponentSize::new(pixels(thickness), percent(1.0)), true),
        ];
        for (index, (name, size, _far)) in edges.into_iter().enumerate() {
            let edge_ep = self.mk_indexed(ep.0, index as i64);
            self.div(
                edge_ep,
                ComponentConfig::inherit_from(&config, name)
                    .with_size(size)
                    .with_absolute()
                    .with_color_usage(ColorUsage::Accent)
                    .with_skip_tabbing(true),
            );
        }
        ElementResult::new(true, ep.0)
    }

    /// Container whose overflow scrolls with the wheel.
    pub fn scroll_view(&mut self, ep: EntityParent, mut config: ComponentConfig) -> ElementResult {
        if config.size.is_default {
            config.size = ComponentSize::new(
                pixels(DEFAULT_COMPONENT_SIZE.0),
                pixels(DEFAULT_COMPONENT_SIZE.1 * 4.0),
            );
        }
        let config = self.resolve_config(WidgetKind::ScrollView, config, false);
        self.init_component(ep, &config, "scroll_view");
        if let Some(entity) = self.ui.get_entity_for_id_mut(ep.0) {
            entity.add_component_if_missing(HasScrollView::default);
        }
        ElementResult::new(true, ep.0)
    }

    /// Indented expand/collapse rows. `data` is the index of the clicked
    /// leaf within pre-order traversal, or -1.
    pub fn tree_view(
        &mut self,
        ep: EntityParent,
        nodes: &[TreeNode],
        config: ComponentConfig,
    ) -> ElementResult {
        let config = self.resolve_config(WidgetKind::TreeView, config, false);
        self.init_component(ep, &config, "tree_view");

        if let Some(entity) = self.ui.get_entity_for_id_mut(ep.0) {
            entity.add_component_if_missing(
                super::components::HasTreeViewState::default,
            );
        }

        let mut row_counter: i64 = 0;
        let mut clicked_leaf: i64 = -1;
        let mut changed = false;
        self.tree_rows(
            ep.0,
            ep.0,
            nodes,
            0,
            &mut row_counter,
            &mut clicked_leaf,
            &mut changed,
            &config,
        );

        ElementResult::with_data(changed, ep.0, ElementData::Int(clicked_leaf))
    }

    #[allow(clippy::too_many_arguments)]
    fn tree_rows(
        &mut self,
        tree_id: EntityId,
        parent: EntityId,
        nodes: &[TreeNode],
        depth: usize,
        row_counter: &mut i64,
        clicked_leaf: &mut i64,
        changed: &mut bool,
        config: &ComponentConfig,
    ) {
        for node in nodes {
            let row_index = *row_counter;
            *row_counter += 1;

            let row_key = {
                // Row identity must be stable across frames even as rows
                // collapse, so hash the label path depth.
                let mut hash: u64 = 1469598103934665603;
                for byte in node.label.bytes() {
                    hash ^= byte as u64;
                    hash = hash.wrapping_mul(1099511628211);
                }
                hash ^ depth as u64
            };

            let is_branch = !node.children.is_empty();
            let collapsed = self
                .ui
                .get_entity_for_id(tree_id)
                .and_then(|entity| entity.get::<super::components::HasTreeViewState>())
                .map(|state| state.collapsed.contains(&row_key))
                .unwrap_or(false);

            let marker = if !is_branch {
                "  "
            } else if collapsed {
                "+ "
            } else {
                "- "
            };
            let row_label = format!("{}{marker}{}", "  ".repeat(depth), node.label);

            let row_ep = self.mk_indexed(parent, row_index);
            let row = self.button(
                row_ep,
                ComponentConfig::inherit_from(config, &format!("tree row {row_index}"))
                    .with_size(ComponentSize::new(percent(1.0), pixels(28.0)))
                    .with_label(&row_label)
                    .with_alignment(super::components::TextAlignment::Left)
                    .with_color_usage(ColorUsage::Surface),
            );

            if row.changed() {
                *changed = true;
                if is_branch {
                    if let Some(state) = self.ui.get_entity_for_id_mut(tree_id).and_then(|entity| {
                        entity.get_mut::<super::components::HasTreeViewState>()
                    }) {
                        if !state.collapsed.insert(row_key) {
                            state.collapsed.remove(&row_key);
                        }
                    }
                } else {
                    *clicked_leaf = row_index;
                }
            }

            if is_branch && !collapsed {
                self.tree_rows(
                    tree_id,
                    parent,
                    &node.children,
                    depth + 1,
                    row_counter,
                    clicked_leaf,
                    changed,
                    config,
                );
            } else if is_branch {
                // Skip hidden descendants but keep row numbering stable.
                fn count(nodes: &[TreeNode]) -> i64 {
                    nodes
                        .iter()
                        .map(|node| 1 + count(&node.children))
                        .sum::<i64>()
                }
                *row_counter += count(&node.children);
            }
        }
    }

    /// Label on the left, a caller-built control on the right.
    pub fn setting_row(
        &mut self,
        ep: EntityParent,
        label: &str,
        config: ComponentConfig,
        control: impl FnOnce(&mut Self, EntityId),
    ) -> ElementResult {
        let config = self.resolve_config(WidgetKind::SettingRow, config, false);
        let config = config.with_flex_direction(FlexDirection::ROW).with_size(
            ComponentSize::new(percent(1.0), children_min(DEFAULT_COMPONENT_SIZE.1)),
        );
        self.init_component(ep, &config, "setting_row");

        let label_ep = self.mk(ep.0);
        self.div(
            label_ep,
            ComponentConfig::inherit_from(&config, "setting_label")
                .with_size(ComponentSize::new(
                    percent(0.5),
                    pixels(DEFAULT_COMPONENT_SIZE.1),
                ))
                .with_label(label)
                .with_alignment(super::components::TextAlignment::Left),
        );

        control(self, ep.0);
        ElementResult::new(true, ep.0)
    }

    /// Row of small square icon buttons. `data` is the clicked index.
    pub fn icon_row(
        &mut self,
        ep: EntityParent,
        icons: &[&str],
        mut config: ComponentConfig,
    ) -> ElementResult {
        config.flex_direction = Some(FlexDirection::ROW);
        if config.size.is_default {
            config.size = ComponentSize::new(children(), children_min(32.0));
        }
        let config = self.resolve_config(WidgetKind::IconRow, config, false);
        self.init_component(ep, &config, "icon_row");

        let mut clicked: i64 = -1;
        for (index, icon) in icons.iter().enumerate() {
            let icon_ep = self.mk_indexed(ep.0, index as i64);
            if self
                .button(
                    icon_ep,
                    ComponentConfig::inherit_from(&config, &format!("icon {index}"))
                        .with_size(ComponentSize::new(pixels(32.0), pixels(32.0)))
                        .with_label(icon),
                )
                .changed()
            {
                clicked = index as i64;
            }
        }

        ElementResult::with_data(clicked >= 0, ep.0, ElementData::Int(clicked))
    }
}

// ---------------------------------------------------------------------------
// Slider helpers shared by the drag and arrow-key paths
// ---------------------------------------------------------------------------

fn slider_drag<A: InputAction>(collection: &mut EntityCollection, id: EntityId) {
    let Some(mouse_x) = collection
        .get_singleton_cmp::<UIContext<A>>()
        .map(|context| context.mouse.pos.x)
    else {
        return;
    };
    let Some(rect) = collection
        .get_entity_for_id(id)
        .and_then(|entity| entity.get::<UIComponent>())
        .map(|cmp| cmp.rect())
    else {
        return;
    };
    if rect.width <= 0.0 {
        return;
    }
    let value = ((mouse_x - rect.x) / rect.width).clamp(0.0, 1.0);
    apply_slider_value(collection, id, value, rect.width);
}

fn slider_step(collection: &mut EntityCollection, id: EntityId, delta: f32) {
    let Some((value, width)) = collection
        .get_entity_for_id(id)
        .and_then(|entity| {
            let state = entity.get::<HasSliderState>()?;
            let cmp = entity.get::<UIComponent>()?;
            Some((state.value, cmp.rect().width))
        })
    else {
        return;
    };
    apply_slider_value(collection, id, (value + delta).clamp(0.0, 1.0), width);
}

fn apply_slider_value(
    collection: &mut EntityCollection,
    id: EntityId,
    value: f32,
    track_width: f32,
) {
    let Some(entity) = collection.get_entity_for_id_mut(id) else {
        return;
    };
    let Some(state) = entity.get_mut::<HasSliderState>() else {
        return;
    };
    if state.value != value {
        state.value = value;
        state.changed_since = true;
    }

    // The track's left padding slides the handle along it.
    if let Some(cmp) = entity.get_mut::<UIComponent>() {
        cmp.set_desired_padding_side(pixels(value * 0.75 * track_width), Axis::Left);
    }
}
