use std::collections::HashMap;

use crate::ecs::{EntityCollection, EntityId};
use crate::geometry::{Resolution, Vec2};

use super::component::{NO_PARENT, UIComponent, UIComponentDebug};
use super::components::{HasLabel, HasScrollView, ShouldHide};
use super::layout_types::{Axis, Dim, FlexDirection, FlexWrap, JustifyContent, AlignItems,
    ScalingMode, SelfAlign, Size};
use super::text_cache::TextMeasureCache;
use super::theme::MIN_FONT_SIZE;

/// One grid unit at the 720p baseline, scaled by the actual resolution when
/// grid snapping is active.
const GRID_UNIT_720P: f32 = 4.0;

/// Sub-pixel error tolerated by the violation solver.
const ACCEPTABLE_ERROR: f32 = 1.0;

/// Extra slack for wrap/overflow warnings, past the grid tolerance.
const BASE_WRAP_TOLERANCE: f32 = 4.0;
const BASE_OVERFLOW_TOLERANCE: f32 = 4.0;

/// Where text measurement comes from during layout: an external function,
/// the measure cache, or nothing (labels size to zero with a warning).
pub enum Measurer<'a> {
    None,
    External(&'a mut dyn FnMut(&str, &str, f32, f32) -> Vec2),
    Cache(&'a mut TextMeasureCache),
}

impl Measurer<'_> {
    fn measure(&mut self, font_name: &str, text: &str, font_size: f32, spacing: f32) -> Vec2 {
        match self {
            Measurer::None => Vec2::ZERO,
            Measurer::External(measure) => measure(font_name, text, font_size, spacing),
            Measurer::Cache(cache) => cache.measure(text, font_name, font_size, spacing),
        }
    }
}

struct Node {
    cmp: UIComponent,
    label: Option<String>,
    is_scroll_view: bool,
    debug_name: String,
}

/// The multi-pass constraint solver. Operates on a snapshot of the
/// `UIComponent` tree taken out of the collection, so passes can mutate
/// parent and child freely; components are written back when the run ends.
pub struct AutoLayout<'a> {
    resolution: Resolution,
    enable_grid_snapping: bool,
    ui_scale: f32,
    nodes: HashMap<EntityId, Node>,
    measurer: Measurer<'a>,
}

/// Compute the layout for the tree under `root`: desired sizes in, absolute
/// rectangles out.
#[lateshift_derive::time_function]
pub fn autolayout(
    collection: &mut EntityCollection,
    root: EntityId,
    resolution: Resolution,
    enable_grid_snapping: bool,
    ui_scale: f32,
    measurer: Measurer<'_>,
) {
    let mut layout = AutoLayout {
        resolution,
        enable_grid_snapping,
        ui_scale,
        nodes: HashMap::new(),
        measurer,
    };

    layout.snapshot(collection, root);

    layout.reset_computed_values(root);
    // Sizes that depend on nothing else.
    layout.calculate_standalone(root);
    // Sizes that depend on the parent.
    layout.calculate_those_with_parents(root);
    // Sizes that depend on the children (post-order).
    layout.calculate_those_with_children(root);
    // Shrink or distribute until children fit.
    layout.solve_violations(root);
    // Flow positions within each parent's content area.
    layout.compute_relative_positions(root);
    // Absolute world-space rectangles.
    layout.compute_rect_bounds(root);

    layout.write_back(collection);
}

impl AutoLayout<'_> {
    // -- Snapshot -----------------------------------------------------------

    fn snapshot(&mut self, collection: &mut EntityCollection, id: EntityId) {
        let Some(entity) = collection.get_entity_for_id_mut(id) else {
            log::error!(
                "during autolayout, we looked for an entity with id {id} but it wasnt in the collection"
            );
            return;
        };

        let label = entity.get::<HasLabel>().map(|label| label.label.clone());
        let is_scroll_view = entity.has::<HasScrollView>();
        let should_hide = entity.has::<ShouldHide>();
        let debug_name = entity
            .get::<UIComponentDebug>()
            .map(|debug| debug.name.clone())
            .unwrap_or_else(|| format!("entity_{id}"));

        let Some(cmp) = entity.get_mut::<UIComponent>() else {
            log::error!("autolayout visited entity {id} without a UIComponent");
            return;
        };
        let mut cmp = std::mem::replace(cmp, UIComponent::new(id));
        cmp.should_hide = should_hide;

        let children = cmp.children.clone();
        self.nodes.insert(
            id,
            Node {
                cmp,
                label,
                is_scroll_view,
                debug_name,
            },
        );

        for child in children {
            self.snapshot(collection, child);
        }
    }

    fn write_back(self, collection: &mut EntityCollection) {
        for (id, node) in self.nodes {
            if let Some(slot) = collection
                .get_entity_for_id_mut(id)
                .and_then(|entity| entity.get_mut::<UIComponent>())
            {
                *slot = node.cmp;
            }
        }
    }

    fn has_node(&self, id: EntityId) -> bool {
        self.nodes.contains_key(&id)
    }

    fn cmp(&self, id: EntityId) -> &UIComponent {
        &self.nodes[&id].cmp
    }

    fn cmp_mut(&mut self, id: EntityId) -> &mut UIComponent {
        &mut self.nodes.get_mut(&id).unwrap().cmp
    }

    fn children_of(&self, id: EntityId) -> Vec<EntityId> {
        self.nodes
            .get(&id)
            .map(|node| node.cmp.children.clone())
            .unwrap_or_default()
    }

    /// Children that participate in flow: present, not absolute, not hidden.
    fn layout_children_of(&self, id: EntityId) -> Vec<EntityId> {
        self.children_of(id)
            .into_iter()
            .filter(|child| {
                self.nodes
                    .get(child)
                    .is_some_and(|node| !node.cmp.absolute && !node.cmp.should_hide)
            })
            .collect()
    }

    fn debug_name(&self, id: EntityId) -> String {
        self.nodes
            .get(&id)
            .map(|node| node.debug_name.clone())
            .unwrap_or_else(|| format!("entity_{id}"))
    }

    // -- Shared helpers -----------------------------------------------------

    fn resolve_pixels(&self, value: f32, mode: ScalingMode) -> f32 {
        if mode == ScalingMode::Adaptive {
            return value * self.ui_scale;
        }
        value
    }

    fn fetch_screen_value(&self, axis: Axis) -> f32 {
        match axis.size_axis() {
            Axis::X => self.resolution.width,
            _ => self.resolution.height,
        }
    }

    fn grid_unit(&self, axis: Axis) -> f32 {
        GRID_UNIT_720P * (self.fetch_screen_value(axis) / 720.0)
    }

    fn snap_to_grid(&self, value: f32, axis: Axis) -> f32 {
        let unit = self.grid_unit(axis);
        (value / unit).round() * unit
    }

    fn resolve_font_size(&self, size: Size, mode: ScalingMode) -> f32 {
        let screen_height = self.fetch_screen_value(Axis::Y);
        let resolved = match size.dim {
            Dim::Pixels => self.resolve_pixels(size.value, mode),
            Dim::ScreenPercent => size.value * screen_height,
            _ => {
                if size.value > 0.0 {
                    size.value
                } else {
                    20.0
                }
            }
        };
        if resolved < MIN_FONT_SIZE {
            log::warn!("font size {resolved} below minimum; clamping to {MIN_FONT_SIZE}");
            return MIN_FONT_SIZE;
        }
        resolved
    }

    fn text_size_for_axis(&mut self, id: EntityId, axis: Axis) -> f32 {
        let node = &self.nodes[&id];
        let Some(label) = node.label.clone() else {
            log::warn!(
                "trying to size '{}' by Text but it has no text attached (add HasLabel)",
                node.debug_name
            );
            return 0.0;
        };
        let font_name = node.cmp.font_name.clone();
        let font_size = self.resolve_font_size(node.cmp.font_size, node.cmp.resolved_scaling_mode);
        let spacing = 1.0;

        let measured = self.measurer.measure(&font_name, &label, font_size, spacing);
        match axis {
            Axis::X => measured.x,
            Axis::Y => measured.y,
            _ => {
                log::error!("text size not supported for axis {axis}");
                0.0
            }
        }
    }

    // -- Pass 0: reset ------------------------------------------------------

    fn reset_computed_values(&mut self, id: EntityId) {
        if !self.has_node(id) {
            return;
        }
        self.cmp_mut(id).reset_computed_values();
        for child in self.children_of(id) {
            self.reset_computed_values(child);
        }
    }

    // -- Pass 1: standalone sizing ------------------------------------------

    fn standalone_size(&mut self, id: EntityId, axis: Axis) -> f32 {
        let cmp = self.cmp(id);
        let desired = cmp.desired.get(axis);
        let mode = cmp.resolved_scaling_mode;
        let no_change = cmp.computed.get(axis);
        match desired.dim {
            Dim::Pixels => self.resolve_pixels(desired.value, mode),
            Dim::ScreenPercent => desired.value * self.fetch_screen_value(axis),
            Dim::Text => self.text_size_for_axis(id, axis),
            Dim::Percent | Dim::None | Dim::Children | Dim::Expand => no_change,
        }
    }

    fn standalone_spacing(&self, desired: Size, mode: ScalingMode, axis: Axis, no_change: f32,
        what: &str) -> f32 {
        match desired.dim {
            Dim::Pixels => self.resolve_pixels(desired.value, mode),
            Dim::ScreenPercent => desired.value * self.fetch_screen_value(axis),
            Dim::Text => {
                log::error!("{what} by dimension text not supported");
                no_change
            }
            Dim::Children => {
                log::error!("{what} by children not supported");
                no_change
            }
            Dim::Percent | Dim::None | Dim::Expand => no_change,
        }
    }

    fn calculate_standalone(&mut self, id: EntityId) {
        if !self.has_node(id) {
            return;
        }
        let x = self.standalone_size(id, Axis::X);
        let y = self.standalone_size(id, Axis::Y);
        {
            let cmp = self.cmp_mut(id);
            cmp.computed.set(Axis::X, x);
            cmp.computed.set(Axis::Y, y);
        }

        for side in [Axis::Top, Axis::Left, Axis::Bottom, Axis::Right] {
            let cmp = self.cmp(id);
            let mode = cmp.resolved_scaling_mode;
            let padding = self.standalone_spacing(
                cmp.desired_padding.side(side),
                mode,
                side,
                cmp.computed_padd.axis(side),
                "padding",
            );
            let margin = self.standalone_spacing(
                cmp.desired_margin.side(side),
                mode,
                side,
                cmp.computed_margin.axis(side),
                "margin",
            );
            let cmp = self.cmp_mut(id);
            cmp.computed_padd.set_side(side, padding);
            cmp.computed_margin.set_side(side, margin);
        }

        for child in self.children_of(id) {
            self.calculate_standalone(child);
        }
    }

    // -- Pass 2: parent-dependent sizing ------------------------------------

    /// Parent's content-box size on the axis: full box minus margin and
    /// padding.
    fn parent_content_size(&self, parent: EntityId, axis: Axis) -> f32 {
        let parent_cmp = self.cmp(parent);
        parent_cmp.computed.get(axis)
            - parent_cmp.computed_margin.axis(axis.size_axis())
            - parent_cmp.computed_padd.axis(axis.size_axis())
    }

    fn parent_size(&mut self, id: EntityId, axis: Axis) -> f32 {
        let cmp = self.cmp(id);
        let desired = cmp.desired.get(axis);
        let no_change = cmp.computed.get(axis);
        let parent = cmp.parent;

        if cmp.absolute && desired.dim == Dim::Percent {
            log::error!("absolute widget {id} should not use Percent sizing");
            #[cfg(feature = "strict")]
            panic!("absolute widgets should not use Percent");
        }

        if parent == NO_PARENT {
            if desired.dim == Dim::Percent {
                log::error!("trying to compute percent expectation for {id}, but never set parent");
            }
            return no_change;
        }

        if self.cmp(parent).computed.get(axis) == -1.0 {
            if desired.dim == Dim::Percent {
                log::error!(
                    "trying to compute expectation for {id}, but parent {parent} size hasnt been calculated yet"
                );
            }
            return no_change;
        }

        match desired.dim {
            Dim::Percent => desired.value * self.parent_content_size(parent, axis),
            // Expand children are sized during surplus distribution, after
            // every other child is known.
            Dim::Expand => 0.0,
            _ => no_change,
        }
    }

    fn parent_padding(&self, id: EntityId, side: Axis) -> f32 {
        let cmp = self.cmp(id);
        let desired = cmp.desired_padding.side(side);
        let no_change = cmp.computed_padd.axis(side);
        let parent = cmp.parent;

        if parent == NO_PARENT {
            if desired.dim == Dim::Percent {
                log::error!(
                    "trying to compute padding percent expectation for {id}, but never set parent"
                );
            }
            return no_change;
        }

        let parent_cmp = self.cmp(parent);
        let size_axis = side.size_axis();
        if parent_cmp.computed.get(size_axis) == -1.0 {
            if desired.dim == Dim::Percent {
                log::error!(
                    "trying to compute padding percent expectation for {id}, but parent {parent} size not calculated yet"
                );
            }
            return no_change;
        }

        match desired.dim {
            Dim::Percent => desired.value * parent_cmp.computed.get(size_axis),
            Dim::Children | Dim::Text | Dim::Expand => {
                log::error!("padding by {} not supported", desired.dim);
                no_change
            }
            // Handled during the standalone pass.
            Dim::ScreenPercent | Dim::None | Dim::Pixels => no_change,
        }
    }

    fn parent_margin(&self, id: EntityId, side: Axis) -> f32 {
        let cmp = self.cmp(id);
        let desired = cmp.desired_margin.side(side);
        let no_change = cmp.computed_margin.axis(side);
        let parent = cmp.parent;

        if parent == NO_PARENT {
            if desired.dim == Dim::Percent {
                log::error!(
                    "trying to compute margin percent expectation for {id}, but no parent"
                );
            }
            return no_change;
        }

        let parent_cmp = self.cmp(parent);
        let size_axis = side.size_axis();
        if parent_cmp.computed.get(size_axis) == -1.0 {
            if desired.dim == Dim::Percent {
                log::error!(
                    "trying to compute margin percent expectation for {id}, but parent {parent} size not calculated yet"
                );
            }
            return no_change;
        }

        match desired.dim {
            // Percent margin resolves against the parent's box minus its own
            // margin; padding is ignored on purpose.
            Dim::Percent => {
                desired.value
                    * (parent_cmp.computed.get(size_axis)
                        - parent_cmp.computed_margin.axis(size_axis))
            }
            _ => no_change,
        }
    }

    fn calculate_those_with_parents(&mut self, id: EntityId) {
        if !self.has_node(id) {
            return;
        }
        let x = self.parent_size(id, Axis::X);
        let y = self.parent_size(id, Axis::Y);
        {
            let cmp = self.cmp_mut(id);
            cmp.computed.set(Axis::X, x);
            cmp.computed.set(Axis::Y, y);
        }

        for side in [Axis::Top, Axis::Left, Axis::Bottom, Axis::Right] {
            let padding = self.parent_padding(id, side);
            let margin = self.parent_margin(id, side);
            let cmp = self.cmp_mut(id);
            cmp.computed_padd.set_side(side, padding);
            cmp.computed_margin.set_side(side, margin);
        }

        for child in self.children_of(id) {
            self.calculate_those_with_parents(child);
        }
    }

    // -- Pass 3: child-dependent sizing -------------------------------------

    fn sum_children_for_axis(&self, id: EntityId, axis: Axis) -> f32 {
        let parent_dim = self.cmp(id).desired.get(axis).dim;
        let mut total = 0.0;
        for child in self.layout_children_of(id) {
            let child_cmp = self.cmp(child);
            let child_size = child_cmp.computed.get(axis);
            if child_cmp.desired.get(axis).dim == Dim::Percent && parent_dim == Dim::Children {
                log::error!(
                    "parents sized with mode 'children' cannot have children sized with mode 'percent'. Failed when checking children for {id} axis {axis}"
                );
            }
            if child_size == -1.0 {
                log::error!(
                    "expect that all children have been solved by now child {child} parent {id}"
                );
                continue;
            }
            total += child_size;
        }
        total
    }

    fn max_child_size(&self, id: EntityId, axis: Axis) -> f32 {
        let parent_dim = self.cmp(id).desired.get(axis).dim;
        let mut max_size: f32 = 0.0;
        for child in self.layout_children_of(id) {
            let child_cmp = self.cmp(child);
            let child_size = child_cmp.computed.get(axis);
            if child_size == -1.0 {
                if child_cmp.desired.get(axis).dim == Dim::Percent && parent_dim == Dim::Children {
                    log::error!(
                        "parents sized with mode 'children' cannot have children sized with mode 'percent'"
                    );
                } else {
                    log::error!("expect that all children have been solved by now");
                }
                continue;
            }
            max_size = max_size.max(child_size);
        }
        max_size
    }

    fn child_expectation_size(&mut self, id: EntityId, axis: Axis) -> f32 {
        let cmp = self.cmp(id);
        let desired = cmp.desired.get(axis);
        let no_change = cmp.computed.get(axis);
        if desired.dim != Dim::Children {
            return no_change;
        }

        // Padding is included so computed[axis] consistently represents the
        // full box for every sizing mode.
        let pad = cmp.computed_padd.axis(axis);
        let existing_desire = desired.value;
        let flex = cmp.flex_direction;
        let has_children = !cmp.children.is_empty();
        let has_label = self.nodes[&id].label.is_some();

        if !has_children {
            // Leaf elements with a label size to fit the text instead of
            // collapsing to padding only.
            let text = if has_label {
                self.text_size_for_axis(id, axis)
            } else {
                0.0
            };
            return no_change.max(existing_desire).max(text).max(0.0) + pad;
        }

        let mut expectation = self.sum_children_for_axis(id, axis);

        // The non-flex side of the box tracks the largest child: a column is
        // as wide as its widest child.
        if (flex.contains(FlexDirection::COLUMN) && axis == Axis::X)
            || (flex.contains(FlexDirection::ROW) && axis == Axis::Y)
        {
            expectation = self.max_child_size(id, axis).max(existing_desire);
        }

        expectation + pad
    }

    fn calculate_those_with_children(&mut self, id: EntityId) {
        if !self.has_node(id) {
            return;
        }
        // No early return when empty: min/max logic still needs to run for
        // widgets whose children change frame to frame (dropdowns).
        for child in self.children_of(id) {
            self.calculate_those_with_children(child);
        }

        let x = self.child_expectation_size(id, Axis::X);
        let y = self.child_expectation_size(id, Axis::Y);
        let cmp = self.cmp_mut(id);
        cmp.computed.set(Axis::X, x);
        cmp.computed.set(Axis::Y, y);
    }

    // -- Pass 4: violation solving ------------------------------------------

    fn resolve_constraint(&self, id: EntityId, constraint: Size, axis: Axis) -> f32 {
        let cmp = self.cmp(id);
        match constraint.dim {
            Dim::None => -1.0,
            Dim::Pixels => self.resolve_pixels(constraint.value, cmp.resolved_scaling_mode),
            Dim::ScreenPercent => constraint.value * self.fetch_screen_value(axis),
            Dim::Percent => {
                if cmp.parent == NO_PARENT {
                    return -1.0;
                }
                constraint.value * self.parent_content_size(cmp.parent, axis)
            }
            Dim::Children | Dim::Text | Dim::Expand => -1.0,
        }
    }

    fn apply_size_constraints(&mut self, id: EntityId) {
        for axis in [Axis::X, Axis::Y] {
            let min_constraint = self.cmp(id).min_size.get(axis);
            let max_constraint = self.cmp(id).max_size.get(axis);
            let min_value = self.resolve_constraint(id, min_constraint, axis);
            let max_value = self.resolve_constraint(id, max_constraint, axis);

            let cmp = self.cmp_mut(id);
            let current = cmp.computed.get(axis);
            if min_value >= 0.0 && current < min_value {
                cmp.computed.set(axis, min_value);
            }
            let current = cmp.computed.get(axis);
            if max_value >= 0.0 && current > max_value {
                cmp.computed.set(axis, max_value);
            }
        }
    }

    /// Distribute surplus space (negative error). Expand-weighted children
    /// take it proportionally and short-circuit the generic path; otherwise
    /// strictness-0 children split it equally and pass it down.
    fn tax_refund(&mut self, id: EntityId, axis: Axis, error: f32) {
        let layout_children = self.layout_children_of(id);

        let total_expand_weight: f32 = layout_children
            .iter()
            .filter(|child| self.cmp(**child).desired.get(axis).dim == Dim::Expand)
            .map(|child| self.cmp(*child).desired.get(axis).value)
            .sum();

        if total_expand_weight > 0.0 {
            let available_space = error.abs();
            for child in &layout_children {
                let desired = self.cmp(*child).desired.get(axis);
                if desired.dim == Dim::Expand {
                    let share = available_space * (desired.value / total_expand_weight);
                    self.cmp_mut(*child).computed.set(axis, share);
                }
            }
            return;
        }

        let eligible: Vec<EntityId> = layout_children
            .iter()
            .copied()
            .filter(|child| self.cmp(*child).desired.get(axis).strictness == 0.0)
            .collect();

        if eligible.is_empty() {
            log::trace!("I have all this money to return, but no one wants it :(");
            return;
        }

        let indiv_refund = error / eligible.len() as f32;
        for child in eligible {
            let cmp = self.cmp_mut(child);
            let current = cmp.computed.get(axis);
            cmp.computed.set(axis, current + indiv_refund.abs());
            log::trace!("just gave back, time for trickle down");
            self.tax_refund(child, axis, indiv_refund);
        }
    }

    fn total_child(&self, children: &[EntityId], axis: Axis) -> f32 {
        children
            .iter()
            .map(|child| self.cmp(*child).computed.get(axis))
            .sum()
    }

    fn max_child(&self, children: &[EntityId], axis: Axis) -> f32 {
        children
            .iter()
            .map(|child| self.cmp(*child).computed.get(axis))
            .fold(0.0, f32::max)
    }

    /// Shrink children that do not care about their size, spreading the
    /// error equally.
    fn solve_error_optional(&mut self, children: &[EntityId], axis: Axis, error: &mut f32) {
        let optional: Vec<EntityId> = children
            .iter()
            .copied()
            .filter(|child| self.cmp(*child).desired.get(axis).strictness == 0.0)
            .collect();
        if optional.is_empty() {
            return;
        }
        let approx_epc = *error / optional.len() as f32;
        for child in optional {
            let cmp = self.cmp_mut(child);
            let current = cmp.computed.get(axis);
            cmp.computed.set(axis, (current - approx_epc).max(0.0));
            if current > approx_epc {
                *error -= approx_epc;
            }
        }
    }

    /// Weighted shrink over non-rigid children; each round lowers every
    /// child's strictness by 0.05 so the loop converges.
    fn fix_violating_children(&mut self, children: &[EntityId], axis: Axis, error: f32) {
        let num_strict = children
            .iter()
            .filter(|child| self.cmp(**child).desired.get(axis).strictness == 1.0)
            .count();
        let num_resizeable = children.len().saturating_sub(num_strict);
        let approx_epc = error / (num_resizeable.max(1) as f32);

        for child in children {
            let mut desired = self.cmp(*child).desired.get(axis);
            if desired.strictness == 1.0 {
                continue;
            }
            let portion_of_error = (1.0 - desired.strictness) * approx_epc;
            let cmp = self.cmp_mut(*child);
            let current = cmp.computed.get(axis);
            cmp.computed.set(axis, (current - portion_of_error).max(0.0));
            desired.strictness = (desired.strictness - 0.05).max(0.0);
            cmp.desired.set(axis, desired);
        }
    }

    fn compute_error(&mut self, id: EntityId, children: &[EntityId], axis: Axis,
        is_main_axis: bool) -> f32 {
        // Children lay out in the content area: the box minus padding.
        let cmp = self.cmp(id);
        let my_size = (cmp.computed.get(axis) - cmp.computed_padd.axis(axis)).max(0.0);

        // Main axis: children stack, sizes sum. Cross axis: children
        // overlap, only the largest matters.
        let mut all_children = if is_main_axis {
            self.total_child(children, axis)
        } else {
            self.max_child(children, axis)
        };
        let mut error = all_children - my_size;
        log::trace!("starting error {axis} {error}");

        // Only the main axis iterates; shrinking overlapping children to fit
        // a summed budget would be wrong.
        if !is_main_axis {
            return error;
        }

        let mut iterations = 0;
        while error > ACCEPTABLE_ERROR {
            self.solve_error_optional(children, axis, &mut error);
            iterations += 1;

            self.fix_violating_children(children, axis, error);
            all_children = self.total_child(children, axis);
            error = all_children - my_size;
            if iterations > 10 {
                log::trace!("hit {iterations} iteration limit trying to solve violations {error}");
                break;
            }
        }
        error
    }

    fn solve_violations(&mut self, id: EntityId) {
        if !self.has_node(id) {
            return;
        }
        let layout_children = self.layout_children_of(id);
        if layout_children.is_empty() {
            return;
        }

        let flex = self.cmp(id).flex_direction;
        let is_row = flex.contains(FlexDirection::ROW);
        let is_column = flex.contains(FlexDirection::COLUMN);

        let error_x = self.compute_error(id, &layout_children, Axis::X, is_row);
        if error_x < 0.0 {
            self.tax_refund(id, Axis::X, error_x);
        }

        let error_y = self.compute_error(id, &layout_children, Axis::Y, is_column);
        if error_y < 0.0 {
            self.tax_refund(id, Axis::Y, error_y);
        }

        self.apply_size_constraints(id);

        for child in layout_children {
            self.apply_size_constraints(child);
            self.solve_violations(child);
        }
    }

    // -- Pass 5: positioning ------------------------------------------------

    fn compute_relative_positions(&mut self, id: EntityId) {
        if !self.has_node(id) {
            return;
        }
        if self.cmp(id).parent == NO_PARENT {
            let cmp = self.cmp_mut(id);
            cmp.computed_rel.set(Axis::X, 0.0);
            cmp.computed_rel.set(Axis::Y, 0.0);
        }

        if self.enable_grid_snapping {
            let snapped_x = self.snap_to_grid(self.cmp(id).computed.x, Axis::X);
            let snapped_y = self.snap_to_grid(self.cmp(id).computed.y, Axis::Y);
            let cmp = self.cmp_mut(id);
            cmp.computed.x = snapped_x;
            cmp.computed.y = snapped_y;
        }

        let cmp = self.cmp(id);
        let container_w = (cmp.computed.x - cmp.computed_padd.axis(Axis::X)).max(0.0);
        let container_h = (cmp.computed.y - cmp.computed_padd.axis(Axis::Y)).max(0.0);
        let flex = cmp.flex_direction;
        let flex_wrap = cmp.flex_wrap;
        let justify = cmp.justify_content;
        let align_items = cmp.align_items;
        let parent_is_scroll_view = self.nodes[&id].is_scroll_view;
        let desired_x_dim = cmp.desired.x.dim;
        let desired_y_dim = cmp.desired.y.dim;
        let children = cmp.children.clone();

        let is_column = flex.contains(FlexDirection::COLUMN);
        let is_row = flex.contains(FlexDirection::ROW);

        // Wrap boundary is the content area.
        let (sx, sy) = (container_w, container_h);

        // One grid unit of tolerance prevents snap-induced wrapping; the
        // warning tolerance additionally scales with child count for
        // children-sized containers.
        let (grid_tolerance_x, grid_tolerance_y) = if self.enable_grid_snapping {
            (self.grid_unit(Axis::X), self.grid_unit(Axis::Y))
        } else {
            (0.0, 0.0)
        };

        // Count layout children and total main-axis size for justify math.
        let mut num_layout_children = 0usize;
        let mut total_main_size = 0.0f32;
        for child in &children {
            let child_cmp = self.cmp(*child);
            if child_cmp.absolute || child_cmp.should_hide {
                continue;
            }
            num_layout_children += 1;
            let cx = child_cmp.computed.x + child_cmp.computed_margin.axis(Axis::X);
            let cy = child_cmp.computed.y + child_cmp.computed_margin.axis(Axis::Y);
            if is_column {
                total_main_size += cy;
            } else if is_row {
                total_main_size += cx;
            }
        }

        let main_axis_size = if is_column { container_h } else { container_w };
        let cross_axis_size = if is_column { container_w } else { container_h };
        let remaining_space = main_axis_size - total_main_size;

        let mut start_offset = 0.0;
        let mut gap = 0.0;
        if remaining_space > 0.0 && num_layout_children > 0 {
            match justify {
                JustifyContent::FlexStart => {}
                JustifyContent::FlexEnd => start_offset = remaining_space,
                JustifyContent::Center => start_offset = remaining_space / 2.0,
                JustifyContent::SpaceBetween => {
                    if num_layout_children > 1 {
                        gap = remaining_space / (num_layout_children - 1) as f32;
                    }
                }
                JustifyContent::SpaceAround => {
                    gap = remaining_space / num_layout_children as f32;
                    start_offset = gap / 2.0;
                }
            }
        }

        // Accumulated snap tolerance for warning checks only.
        let mut accumulated_tolerance_x = grid_tolerance_x;
        let mut accumulated_tolerance_y = grid_tolerance_y;
        if self.enable_grid_snapping && num_layout_children > 2 {
            let spread = num_layout_children as f32 / 2.0;
            if desired_x_dim == Dim::Children {
                accumulated_tolerance_x = grid_tolerance_x.max(spread * grid_tolerance_x);
            }
            if desired_y_dim == Dim::Children {
                accumulated_tolerance_y = grid_tolerance_y.max(spread * grid_tolerance_y);
            }
        }

        let mut offx = if is_row { start_offset } else { 0.0 };
        let mut offy = if is_column { start_offset } else { 0.0 };
        let mut col_w = 0.0f32;
        let mut col_h = 0.0f32;

        for child in children {
            let child_cmp = self.cmp(child);

            if child_cmp.absolute {
                let (abs_x, abs_y) = (child_cmp.absolute_pos_x, child_cmp.absolute_pos_y);
                let child_mut = self.cmp_mut(child);
                child_mut.computed_rel.set(Axis::X, abs_x);
                child_mut.computed_rel.set(Axis::Y, abs_y);
                self.compute_relative_positions(child);
                continue;
            }

            if child_cmp.should_hide {
                self.compute_relative_positions(child);
                continue;
            }

            let cx = child_cmp.computed.x + child_cmp.computed_margin.axis(Axis::X);
            let cy = child_cmp.computed.y + child_cmp.computed_margin.axis(Axis::Y);
            let child_flex = child_cmp.flex_direction;
            let child_wrap = child_cmp.flex_wrap;
            let child_self_align = child_cmp.self_align;
            let child_debug_wrap = child_cmp.debug_wrap;

            let will_hit_max_x = cx + offx > sx;
            let will_hit_max_y = cy + offy > sy;

            // A child that cannot flex and is over the limit parks at the
            // corner and stays out of flow.
            if child_flex.is_empty() && (will_hit_max_x || will_hit_max_y) {
                let child_mut = self.cmp_mut(child);
                child_mut.computed_rel.set(Axis::X, sx);
                child_mut.computed_rel.set(Axis::Y, sy);
                continue;
            }

            let will_wrap_column = is_column && cy + offy > sy + grid_tolerance_y;
            let will_wrap_row = is_row && cx + offx > sx + grid_tolerance_x;

            let should_warn_wrap_column =
                is_column && (cy + offy > sy + accumulated_tolerance_y + BASE_WRAP_TOLERANCE);
            let should_warn_wrap_row =
                is_row && (cx + offx > sx + accumulated_tolerance_x + BASE_WRAP_TOLERANCE);
            if (should_warn_wrap_column || should_warn_wrap_row) && !parent_is_scroll_view {
                let mut warn_reason: Option<String> = None;
                if flex_wrap == FlexWrap::NoWrap {
                    warn_reason = Some("NoWrap set but would overflow".to_string());
                } else if child_flex == flex && child_wrap == FlexWrap::NoWrap {
                    // Only warn when the child itself is NoWrap; otherwise
                    // every naturally-wrapping long page would trigger this.
                    warn_reason = Some(format!(
                        "child FlexDirection matches parent ({}) and has NoWrap - may cause unexpected wrap",
                        if is_column { "Column" } else { "Row" }
                    ));
                } else if child_debug_wrap {
                    warn_reason = Some("debug_wrap enabled".to_string());
                }

                if let Some(reason) = warn_reason {
                    log::warn!(
                        "layout wrap: '{}' in parent '{}' - {reason} (child_size={:.1}, offset={:.1}, container={:.1})",
                        self.debug_name(child),
                        self.debug_name(id),
                        if will_wrap_column { cy } else { cx },
                        if will_wrap_column { offy } else { offx },
                        if will_wrap_column { sy } else { sx },
                    );
                }
            }

            if flex_wrap == FlexWrap::NoWrap {
                // Items overflow or clip instead of wrapping.
            } else {
                if will_wrap_column {
                    offy = 0.0;
                    offx += col_w;
                    col_w = cx;
                }
                if will_wrap_row {
                    offx = 0.0;
                    offy += col_h;
                    col_h = cy;
                }
            }

            // Cross-axis offset: self_align overrides the parent's
            // align_items.
            let mut cross_offset = 0.0;
            let child_cross = if is_column { cx } else { cy };
            let cross_remaining = cross_axis_size - child_cross;
            if cross_remaining > 0.0 {
                if child_self_align != SelfAlign::Auto {
                    match child_self_align {
                        SelfAlign::Auto | SelfAlign::FlexStart => {}
                        SelfAlign::FlexEnd => cross_offset = cross_remaining,
                        SelfAlign::Center => cross_offset = cross_remaining / 2.0,
                    }
                } else {
                    match align_items {
                        AlignItems::FlexStart => {}
                        AlignItems::FlexEnd => cross_offset = cross_remaining,
                        AlignItems::Center => cross_offset = cross_remaining / 2.0,
                        // Stretch is a sizing concern, not positioning.
                        AlignItems::Stretch => {}
                    }
                }
            }

            let final_x = if is_column { offx + cross_offset } else { offx };
            let final_y = if is_column { offy } else { offy + cross_offset };

            let (rel_x, rel_y) = if self.enable_grid_snapping {
                (
                    self.snap_to_grid(final_x, Axis::X),
                    self.snap_to_grid(final_y, Axis::Y),
                )
            } else {
                (final_x, final_y)
            };
            {
                let child_mut = self.cmp_mut(child);
                child_mut.computed_rel.set(Axis::X, rel_x);
                child_mut.computed_rel.set(Axis::Y, rel_y);
            }

            // Overflow check after positioning. Scroll views expect
            // overflow; the wrap-direction axis legitimately exceeds the
            // single-line content area.
            let child_end_x = rel_x + cx;
            let child_end_y = rel_y + cy;
            let wraps = flex_wrap == FlexWrap::Wrap;
            let suppress_x = wraps && is_column;
            let suppress_y = wraps && is_row;
            let overflows_x = !suppress_x
                && child_end_x > sx + accumulated_tolerance_x + BASE_OVERFLOW_TOLERANCE;
            let overflows_y = !suppress_y
                && child_end_y > sy + accumulated_tolerance_y + BASE_OVERFLOW_TOLERANCE;
            if (overflows_x || overflows_y) && !parent_is_scroll_view {
                log::warn!(
                    "layout overflow: '{}' extends outside parent '{}' bounds (child_rel=[{rel_x:.1},{rel_y:.1}], child_size=[{cx:.1},{cy:.1}], child_end=[{child_end_x:.1},{child_end_y:.1}], parent_size=[{sx:.1},{sy:.1}], gap={gap:.1}, start_offset={start_offset:.1})",
                    self.debug_name(child),
                    self.debug_name(id),
                );
            }

            // Advance the cursor for the next child. Grid snapping affects
            // only final positions, not child spacing.
            if is_column {
                let mut next_y = offy + cy + gap;
                if self.enable_grid_snapping {
                    next_y = self.snap_to_grid(next_y, Axis::Y);
                }
                offy = next_y;
            }
            if is_row {
                let mut next_x = offx + cx + gap;
                if self.enable_grid_snapping {
                    next_x = self.snap_to_grid(next_x, Axis::X);
                }
                offx = next_x;
            }

            col_w = col_w.max(cx);
            col_h = col_h.max(cy);
            self.compute_relative_positions(child);
        }

        // Children-sized containers grow to fit wrapped content so the next
        // frame sees the true size.
        if desired_y_dim == Dim::Children && is_row {
            let wrapped_height = offy + col_h + self.cmp(id).computed_padd.axis(Axis::Y);
            if wrapped_height > self.cmp(id).computed.y {
                self.cmp_mut(id).computed.y = wrapped_height;
            }
        }
        if desired_x_dim == Dim::Children && is_column {
            let wrapped_width = offx + col_w + self.cmp(id).computed_padd.axis(Axis::X);
            if wrapped_width > self.cmp(id).computed.x {
                self.cmp_mut(id).computed.x = wrapped_width;
            }
        }
    }

    // -- Pass 6: absolute positioning ---------------------------------------

    fn compute_rect_bounds(&mut self, id: EntityId) {
        if !self.has_node(id) {
            return;
        }
        let parent = self.cmp(id).parent;
        if parent != NO_PARENT {
            // Children position within the parent's content area: origin
            // plus margin plus padding.
            let parent_cmp = self.cmp(parent);
            let offset_x = parent_cmp.computed_rel.x
                + parent_cmp.computed_margin.left
                + parent_cmp.computed_padd.left;
            let offset_y = parent_cmp.computed_rel.y
                + parent_cmp.computed_margin.top
                + parent_cmp.computed_padd.top;
            let cmp = self.cmp_mut(id);
            cmp.computed_rel.x += offset_x;
            cmp.computed_rel.y += offset_y;
        }

        for child in self.children_of(id) {
            self.compute_rect_bounds(child);
        }
    }
}
