use std::collections::HashMap;

use lateshift_derive::Component;
use strum_macros::Display;

use crate::ecs::Component;

use super::color::Color;
use super::layout_types::{FlexDirection, Size, Spacing, pixels};
use super::components::TextAlignment;
use super::theme::{ColorUsage, CornerMask, Theme, UNSET_FONT_SIZE};

/// Library default widget footprint.
pub const DEFAULT_COMPONENT_SIZE: (f32, f32) = (200.0, 50.0);

/// Desired width/height pair for a widget, with a flag recording whether the
/// caller ever overrode the default (widgets pick their own fallback when
/// not).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComponentSize {
    pub x_axis: Size,
    pub y_axis: Size,
    pub is_default: bool,
}

impl Default for ComponentSize {
    fn default() -> Self {
        Self {
            x_axis: pixels(DEFAULT_COMPONENT_SIZE.0),
            y_axis: pixels(DEFAULT_COMPONENT_SIZE.1),
            is_default: true,
        }
    }
}

impl ComponentSize {
    pub fn new(x_axis: Size, y_axis: Size) -> Self {
        Self {
            x_axis,
            y_axis,
            is_default: false,
        }
    }

    /// Scale the x magnitude; used by widgets that split their box.
    pub fn scale_x(mut self, factor: f32) -> Self {
        self.x_axis.value *= factor;
        self
    }
}

/// Widget kinds the styling defaults table can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum WidgetKind {
    Div,
    Button,
    ButtonGroup,
    Checkbox,
    CheckboxGroup,
    Slider,
    Dropdown,
    ToggleSwitch,
    RadioGroup,
    Pagination,
    NavigationBar,
    TabContainer,
    ProgressBar,
    CircularProgress,
    Separator,
    DecorativeFrame,
    ScrollView,
    TreeView,
    SettingRow,
    IconRow,
    TextInput,
    TextArea,
}

/// Per-call widget configuration with fluent builders. Unset fields fall
/// back to the styling defaults for the widget kind, then to the theme.
#[derive(Default)]
pub struct ComponentConfig {
    pub size: ComponentSize,
    pub padding: Spacing,
    pub margin: Spacing,
    pub label: String,
    pub is_absolute: bool,
    pub absolute_pos: Option<(f32, f32)>,
    pub flex_direction: Option<FlexDirection>,

    pub color_usage: Option<ColorUsage>,
    pub custom_color: Option<Color>,
    pub rounded_corners: Option<CornerMask>,

    pub font_name: Option<String>,
    /// `UNSET_FONT_SIZE` means "use the theme ramp".
    pub font_size: f32,

    // Inheritable options.
    pub label_alignment: TextAlignment,
    pub skip_when_tabbing: bool,
    pub disabled: bool,
    pub hidden: bool,

    // Debugs.
    pub debug_name: String,
    pub render_layer: i32,
}

impl ComponentConfig {
    pub fn new() -> Self {
        Self {
            font_size: UNSET_FONT_SIZE,
            ..Default::default()
        }
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.label = label.to_string();
        self
    }

    pub fn with_size(mut self, size: ComponentSize) -> Self {
        self.size = size;
        self
    }

    pub fn with_padding(mut self, padding: Spacing) -> Self {
        self.padding = padding;
        self
    }

    pub fn with_margin(mut self, margin: Spacing) -> Self {
        self.margin = margin;
        self
    }

    pub fn with_color_usage(mut self, usage: ColorUsage) -> Self {
        self.color_usage = Some(usage);
        self
    }

    pub fn with_custom_color(mut self, color: Color) -> Self {
        self.color_usage = Some(ColorUsage::Custom);
        self.custom_color = Some(color);
        self
    }

    pub fn with_alignment(mut self, alignment: TextAlignment) -> Self {
        self.label_alignment = alignment;
        self
    }

    pub fn with_rounded_corners(mut self, corners: CornerMask) -> Self {
        self.rounded_corners = Some(corners);
        self
    }

    pub fn with_font(mut self, name: &str, size: f32) -> Self {
        self.font_name = Some(name.to_string());
        self.font_size = size;
        self
    }

    pub fn with_debug_name(mut self, name: &str) -> Self {
        self.debug_name = name.to_string();
        self
    }

    pub fn with_render_layer(mut self, layer: i32) -> Self {
        self.render_layer = layer;
        self
    }

    pub fn with_disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    pub fn with_hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    pub fn with_skip_tabbing(mut self, skip: bool) -> Self {
        self.skip_when_tabbing = skip;
        self
    }

    pub fn with_flex_direction(mut self, direction: FlexDirection) -> Self {
        self.flex_direction = Some(direction);
        self
    }

    pub fn with_absolute(mut self) -> Self {
        self.is_absolute = true;
        self
    }

    pub fn with_absolute_position(mut self, x: f32, y: f32) -> Self {
        self.is_absolute = true;
        self.absolute_pos = Some((x, y));
        self
    }

    /// A child config carrying over only the inheritable options.
    pub fn inherit_from(parent: &ComponentConfig, debug_name: &str) -> Self {
        Self::new()
            .with_alignment(parent.label_alignment)
            .with_disabled(parent.disabled)
            .with_hidden(parent.hidden)
            .with_skip_tabbing(parent.skip_when_tabbing)
            .with_render_layer(parent.render_layer)
            .with_debug_name(debug_name)
    }
}

/// Overridable per-widget-kind defaults, applied between the user's config
/// and the theme.
#[derive(Default)]
pub struct StylingDefault {
    pub size: Option<ComponentSize>,
    pub padding: Option<Spacing>,
    pub margin: Option<Spacing>,
    pub color_usage: Option<ColorUsage>,
    pub rounded_corners: Option<CornerMask>,
    pub label_alignment: Option<TextAlignment>,
    pub font_name: Option<String>,
    pub font_size: Option<f32>,
}

/// Singleton mapping widget kinds to default configs. Merge order when a
/// widget resolves its config: user-provided values, then the kind's
/// styling default, then the theme.
#[derive(Component, Default)]
pub struct UIStylingDefaults {
    defaults: HashMap<WidgetKind, StylingDefault>,
}

impl UIStylingDefaults {
    pub fn set(&mut self, kind: WidgetKind, default: StylingDefault) -> &mut Self {
        self.defaults.insert(kind, default);
        self
    }

    pub fn get(&self, kind: WidgetKind) -> Option<&StylingDefault> {
        self.defaults.get(&kind)
    }

    pub fn clear(&mut self) {
        self.defaults.clear();
    }
}

/// Resolve unset config fields against the styling defaults and the theme.
/// `enable_color` gives colorless configs the primary role (buttons and
/// other filled widgets).
pub fn overwrite_defaults(
    theme: &Theme,
    styling: Option<&StylingDefault>,
    mut config: ComponentConfig,
    enable_color: bool,
) -> ComponentConfig {
    if let Some(styling) = styling {
        if config.size.is_default {
            if let Some(size) = styling.size {
                config.size = size;
            }
        }
        if config.padding == Spacing::ZERO {
            if let Some(padding) = styling.padding {
                config.padding = padding;
            }
        }
        if config.margin == Spacing::ZERO {
            if let Some(margin) = styling.margin {
                config.margin = margin;
            }
        }
        if config.color_usage.is_none() {
            config.color_usage = styling.color_usage;
        }
        if config.rounded_corners.is_none() {
            config.rounded_corners = styling.rounded_corners;
        }
        if config.label_alignment == TextAlignment::None {
            if let Some(alignment) = styling.label_alignment {
                config.label_alignment = alignment;
            }
        }
        if config.font_name.is_none() {
            config.font_name = styling.font_name.clone();
        }
        if config.font_size == UNSET_FONT_SIZE {
            if let Some(size) = styling.font_size {
                config.font_size = size;
            }
        }
    }

    if enable_color && config.color_usage.is_none() {
        config.color_usage = Some(ColorUsage::Primary);
    }

    // Buttons and labels center their text unless told otherwise.
    if config.label_alignment == TextAlignment::None {
        config.label_alignment = TextAlignment::Center;
    }

    if config.rounded_corners.is_none() {
        config.rounded_corners = Some(theme.rounded_corners);
    }

    if config.font_size == UNSET_FONT_SIZE {
        config.font_size = theme.font_size_md;
    }

    config
}
