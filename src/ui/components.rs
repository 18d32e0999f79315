use lateshift_derive::Component;

use crate::ecs::{Component, EntityCollection, EntityId};
use crate::geometry::Vec2;

use super::color::Color;
use super::theme::{ClickActivationMode, ColorUsage, CornerMask};

/// Callback wired to a widget. Receives the collection and the widget's id
/// so it can reach both the widget's own state and related entities.
pub type EntityCallback = Box<dyn FnMut(&mut EntityCollection, EntityId)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlignment {
    #[default]
    None,
    Left,
    Center,
    Right,
}

/// Text attached to a widget.
#[derive(Component)]
pub struct HasLabel {
    pub label: String,
    pub alignment: TextAlignment,
    pub disabled: bool,
    /// Explicit text color; `None` means auto-contrast against the
    /// background hint.
    pub color: Option<Color>,
    /// Background role the label sits on, for auto text color.
    pub background_hint: Option<ColorUsage>,
}

impl HasLabel {
    pub fn new(label: &str, disabled: bool) -> Self {
        Self {
            label: label.to_string(),
            alignment: TextAlignment::None,
            disabled,
            color: None,
            background_hint: None,
        }
    }

    pub fn set_label(&mut self, label: &str) -> &mut Self {
        self.label = label.to_string();
        self
    }

    pub fn set_disabled(&mut self, disabled: bool) -> &mut Self {
        self.disabled = disabled;
        self
    }

    pub fn set_alignment(&mut self, alignment: TextAlignment) -> &mut Self {
        self.alignment = alignment;
        self
    }

    pub fn set_background_hint(&mut self, usage: ColorUsage) -> &mut Self {
        self.background_hint = Some(usage);
        self
    }
}

#[derive(Component)]
pub struct HasColor {
    pub color: Color,
}

impl HasColor {
    pub fn new(color: Color) -> Self {
        Self { color }
    }

    pub fn set(&mut self, color: Color) -> &mut Self {
        self.color = color;
        self
    }
}

#[derive(Component)]
pub struct HasOpacity {
    pub value: f32,
}

/// Post-layout visual adjustments applied at render time. `scale` is a
/// multiplier; 1.0 is neutral and 0.0 collapses the widget.
#[derive(Component)]
pub struct HasUIModifiers {
    pub translate: Vec2,
    pub scale: f32,
}

impl Default for HasUIModifiers {
    fn default() -> Self {
        Self {
            translate: Vec2::ZERO,
            scale: 1.0,
        }
    }
}

#[derive(Component)]
pub struct HasRoundedCorners {
    pub corners: CornerMask,
    pub roundness: f32,
    pub segments: u8,
}

impl HasRoundedCorners {
    pub fn new(corners: CornerMask, roundness: f32, segments: u8) -> Self {
        Self {
            corners,
            roundness,
            segments,
        }
    }

    pub fn set(&mut self, corners: CornerMask) -> &mut Self {
        self.corners = corners;
        self
    }
}

/// Per-widget override of the theme's click activation edge.
#[derive(Component)]
pub struct HasClickActivationMode {
    pub mode: ClickActivationMode,
}

// -- Listeners --------------------------------------------------------------

#[derive(Component)]
pub struct HasClickListener {
    /// True for exactly the frame the activation edge fired.
    pub down: bool,
    pub cb: EntityCallback,
}

impl HasClickListener {
    pub fn new(cb: EntityCallback) -> Self {
        Self { down: false, cb }
    }
}

#[derive(Component)]
pub struct HasDragListener {
    pub down: bool,
    pub cb: EntityCallback,
}

impl HasDragListener {
    pub fn new(cb: EntityCallback) -> Self {
        Self { down: false, cb }
    }
}

/// Fires on WidgetLeft / WidgetRight while the widget has focus. The third
/// argument is the direction: -1 for left, +1 for right.
#[derive(Component)]
pub struct HasLeftRightListener {
    pub cb: Box<dyn FnMut(&mut EntityCollection, EntityId, i32)>,
}

// -- Widget state -----------------------------------------------------------

#[derive(Component)]
pub struct HasCheckboxState {
    pub on: bool,
    pub changed_since: bool,
}

impl HasCheckboxState {
    pub fn new(on: bool) -> Self {
        Self {
            on,
            changed_since: false,
        }
    }
}

#[derive(Component)]
pub struct HasSliderState {
    pub value: f32,
    pub changed_since: bool,
}

impl HasSliderState {
    pub fn new(value: f32) -> Self {
        Self {
            value,
            changed_since: false,
        }
    }
}

#[derive(Component)]
pub struct HasDropdownState {
    /// Expanded?
    pub on: bool,
    pub changed_since: bool,
    pub options: Vec<String>,
    pub last_option_clicked: usize,
    /// Re-fetched each frame by the dropdown reconciler when present.
    pub fetch_options: Option<Box<dyn FnMut() -> Vec<String>>>,
    pub on_option_changed: Option<Box<dyn FnMut(usize)>>,
}

impl HasDropdownState {
    pub fn new(options: Vec<String>) -> Self {
        Self {
            on: false,
            changed_since: false,
            options,
            last_option_clicked: 0,
            fetch_options: None,
            on_option_changed: None,
        }
    }

    pub fn current_index(&self) -> usize {
        self.last_option_clicked
    }

    pub fn set_current_index(&mut self, index: usize) {
        self.last_option_clicked = index;
    }
}

/// Pill-style switch with an animated knob. `progress` eases toward the
/// target each frame.
#[derive(Component)]
pub struct HasToggleSwitchState {
    pub on: bool,
    pub progress: f32,
    pub changed_since: bool,
}

impl HasToggleSwitchState {
    pub fn new(on: bool) -> Self {
        Self {
            on,
            progress: if on { 1.0 } else { 0.0 },
            changed_since: false,
        }
    }
}

#[derive(Component, Default)]
pub struct HasScrollView {
    pub offset_y: f32,
    /// Total height of the content measured after layout.
    pub content_height: f32,
    /// Visible viewport height measured after layout.
    pub viewport_height: f32,
}

impl HasScrollView {
    pub fn max_scroll(&self) -> f32 {
        (self.content_height - self.viewport_height).max(0.0)
    }
}

/// Ring progress indicator; drawn by the render bridge, not as a rectangle.
#[derive(Component)]
pub struct HasCircularProgress {
    /// Normalized fill in [0, 1].
    pub value: f32,
    pub thickness: f32,
}

/// Expand/collapse state for tree views, keyed by row id hash.
#[derive(Component, Default)]
pub struct HasTreeViewState {
    pub collapsed: std::collections::HashSet<u64>,
}

/// Children owned by a reconciling widget (dropdowns). The UI tree's
/// `children` list is rebuilt from this each frame.
#[derive(Component, Default)]
pub struct HasChildrenComponent {
    pub children: Vec<EntityId>,
}

// -- Markers ----------------------------------------------------------------

/// Excluded from layout and rendering.
#[derive(Component, Default)]
pub struct ShouldHide;

/// Tab traversal skips this widget.
#[derive(Component, Default)]
pub struct SkipWhenTabbing;

/// Fires its click listener when gaining focus (dropdown options).
#[derive(Component, Default)]
pub struct SelectOnFocus;

/// Root of a focus cluster; the focus ring renders here for any focused
/// member.
#[derive(Component, Default)]
pub struct FocusClusterRoot;

/// Member of a focus cluster. `root` is the cluster's render anchor.
#[derive(Component)]
pub struct InFocusCluster {
    pub root: EntityId,
}
