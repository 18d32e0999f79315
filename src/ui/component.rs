use lateshift_derive::Component;

use crate::ecs::{Component, EntityId};
use crate::geometry::Rect;

use super::layout_types::{
    Axis, AxisPair, ComputedSpacing, FlexDirection, FlexWrap, JustifyContent, AlignItems,
    ScalingMode, SelfAlign, Size, Spacing,
};

/// Sentinel parent id for roots.
pub const NO_PARENT: EntityId = -1;

/// Tree node carrying desired and computed layout for one UI entity.
///
/// `computed`/`computed_rel` and the computed spacings are reset to sentinels
/// at the start of every layout run. After layout, `computed` holds the full
/// box (content + padding) and `computed_rel` the world-space origin of the
/// margin box.
#[derive(Component)]
pub struct UIComponent {
    pub id: EntityId,
    pub parent: EntityId,
    pub children: Vec<EntityId>,

    pub desired: AxisPair<Size>,
    pub desired_padding: Spacing,
    pub desired_margin: Spacing,
    pub min_size: AxisPair<Size>,
    pub max_size: AxisPair<Size>,

    pub flex_direction: FlexDirection,
    pub flex_wrap: FlexWrap,
    pub justify_content: JustifyContent,
    pub align_items: AlignItems,
    pub self_align: SelfAlign,

    /// Positioned via `absolute_pos_{x,y}`, skipped by sibling flex math.
    pub absolute: bool,
    pub absolute_pos_x: f32,
    pub absolute_pos_y: f32,

    /// Excluded from layout and rendering. Mirrors the `ShouldHide` marker
    /// so the solver can check it without entity lookups.
    pub should_hide: bool,

    pub font_name: String,
    /// Resolved lazily during text sizing; Pixels or ScreenPercent.
    pub font_size: Size,
    pub resolved_scaling_mode: ScalingMode,

    /// Force wrap warnings for this node.
    pub debug_wrap: bool,

    // Computed each frame.
    pub computed: AxisPair<f32>,
    pub computed_rel: AxisPair<f32>,
    pub computed_padd: ComputedSpacing,
    pub computed_margin: ComputedSpacing,
    pub is_visible: bool,
    pub was_rendered_to_screen: bool,
}

impl UIComponent {
    pub fn new(id: EntityId) -> Self {
        Self {
            id,
            parent: NO_PARENT,
            children: Vec::new(),
            desired: AxisPair::splat(Size::default()),
            desired_padding: Spacing::ZERO,
            desired_margin: Spacing::ZERO,
            min_size: AxisPair::splat(Size::default()),
            max_size: AxisPair::splat(Size::default()),
            flex_direction: FlexDirection::COLUMN,
            flex_wrap: FlexWrap::default(),
            justify_content: JustifyContent::default(),
            align_items: AlignItems::default(),
            self_align: SelfAlign::default(),
            absolute: false,
            absolute_pos_x: 0.0,
            absolute_pos_y: 0.0,
            should_hide: false,
            font_name: String::new(),
            font_size: Size::default(),
            resolved_scaling_mode: ScalingMode::default(),
            debug_wrap: false,
            computed: AxisPair::splat(-1.0),
            computed_rel: AxisPair::splat(0.0),
            computed_padd: ComputedSpacing::default(),
            computed_margin: ComputedSpacing::default(),
            is_visible: false,
            was_rendered_to_screen: false,
        }
    }

    // -- Tree operations ----------------------------------------------------

    pub fn set_parent(&mut self, parent: EntityId) -> &mut Self {
        self.parent = parent;
        self
    }

    /// Append a child id, keeping order; re-adding an existing child is a
    /// no-op so per-frame widget code can call this unconditionally.
    pub fn add_child(&mut self, child: EntityId) -> &mut Self {
        if !self.children.contains(&child) {
            self.children.push(child);
        }
        self
    }

    pub fn remove_child(&mut self, child: EntityId) -> &mut Self {
        self.children.retain(|&id| id != child);
        self
    }

    // -- Configuration ------------------------------------------------------

    pub fn set_desired_width(&mut self, size: Size) -> &mut Self {
        self.desired.x = size;
        self
    }

    pub fn set_desired_height(&mut self, size: Size) -> &mut Self {
        self.desired.y = size;
        self
    }

    pub fn set_desired_padding(&mut self, padding: Spacing) -> &mut Self {
        self.desired_padding = padding;
        self
    }

    pub fn set_desired_padding_side(&mut self, size: Size, side: Axis) -> &mut Self {
        *self.desired_padding.side_mut(side) = size;
        self
    }

    pub fn set_desired_margin(&mut self, margin: Spacing) -> &mut Self {
        self.desired_margin = margin;
        self
    }

    pub fn set_min_size(&mut self, axis: Axis, size: Size) -> &mut Self {
        self.min_size.set(axis, size);
        self
    }

    pub fn set_max_size(&mut self, axis: Axis, size: Size) -> &mut Self {
        self.max_size.set(axis, size);
        self
    }

    pub fn set_flex_direction(&mut self, direction: FlexDirection) -> &mut Self {
        self.flex_direction = direction;
        self
    }

    pub fn set_flex_wrap(&mut self, wrap: FlexWrap) -> &mut Self {
        self.flex_wrap = wrap;
        self
    }

    pub fn set_justify_content(&mut self, justify: JustifyContent) -> &mut Self {
        self.justify_content = justify;
        self
    }

    pub fn set_align_items(&mut self, align: AlignItems) -> &mut Self {
        self.align_items = align;
        self
    }

    pub fn set_self_align(&mut self, align: SelfAlign) -> &mut Self {
        self.self_align = align;
        self
    }

    pub fn set_font(&mut self, name: &str, size: Size) -> &mut Self {
        self.font_name = name.to_string();
        self.font_size = size;
        self
    }

    pub fn make_absolute(&mut self) -> &mut Self {
        self.absolute = true;
        self
    }

    pub fn set_absolute_position(&mut self, x: f32, y: f32) -> &mut Self {
        self.absolute = true;
        self.absolute_pos_x = x;
        self.absolute_pos_y = y;
        self
    }

    // -- Computed values ----------------------------------------------------

    /// Clear all computed fields ahead of a layout run.
    pub fn reset_computed_values(&mut self) {
        self.computed = AxisPair::splat(-1.0);
        self.computed_rel = AxisPair::splat(0.0);
        self.computed_padd = ComputedSpacing::default();
        self.computed_margin = ComputedSpacing::default();
        self.was_rendered_to_screen = false;
    }

    pub fn width(&self) -> f32 {
        self.computed.x
    }

    pub fn height(&self) -> f32 {
        self.computed.y
    }

    /// World-space rectangle after layout, used by rendering and hit tests.
    pub fn rect(&self) -> Rect {
        Rect::new(
            self.computed_rel.x + self.computed_margin.left,
            self.computed_rel.y + self.computed_margin.top,
            self.computed.x,
            self.computed.y,
        )
    }
}

/// Marks the root of a layout tree; `RunAutoLayout` starts from these.
#[derive(Component, Default)]
pub struct AutoLayoutRoot;

/// Debug name shown in layout warnings.
#[derive(Component)]
pub struct UIComponentDebug {
    pub name: String,
}

impl UIComponentDebug {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }

    pub fn set(&mut self, name: &str) {
        if !name.is_empty() {
            self.name = name.to_string();
        }
    }
}
