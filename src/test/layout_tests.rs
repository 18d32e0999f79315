use crate::ecs::{EntityCollection, EntityId};
use crate::geometry::{Resolution, Vec2};
use crate::ui::autolayout::{Measurer, autolayout};
use crate::ui::component::UIComponent;
use crate::ui::components::HasLabel;
use crate::ui::layout_types::{
    AlignItems, Axis, FlexDirection, FlexWrap, JustifyContent, Size, Spacing, children, expand,
    percent, pixels, screen_pct, text_size,
};

const RES: Resolution = Resolution {
    width: 1280.0,
    height: 720.0,
};

fn ui_entity(
    collection: &mut EntityCollection,
    parent: Option<EntityId>,
    width: Size,
    height: Size,
) -> EntityId {
    let id = {
        let entity = collection.create_entity();
        let id = entity.id;
        entity.add_component(UIComponent::new(id));
        id
    };
    {
        let cmp = collection
            .get_entity_for_id_mut(id)
            .unwrap()
            .get_mut::<UIComponent>()
            .unwrap();
        cmp.set_desired_width(width).set_desired_height(height);
        if let Some(parent) = parent {
            cmp.set_parent(parent);
        }
    }
    if let Some(parent) = parent {
        collection
            .get_entity_for_id_mut(parent)
            .unwrap()
            .get_mut::<UIComponent>()
            .unwrap()
            .add_child(id);
    }
    id
}

fn cmp(collection: &EntityCollection, id: EntityId) -> &UIComponent {
    collection
        .get_entity_for_id(id)
        .unwrap()
        .get::<UIComponent>()
        .unwrap()
}

fn layout(collection: &mut EntityCollection, root: EntityId) {
    collection.merge_entity_arrays();
    autolayout(collection, root, RES, false, 1.0, Measurer::None);
}

#[test]
fn children_sized_row_container() {
    let mut collection = EntityCollection::new();
    let root = ui_entity(&mut collection, None, pixels(1280.0), pixels(720.0));
    let container = ui_entity(&mut collection, Some(root), children(), children());
    collection
        .get_entity_for_id_mut(container)
        .unwrap()
        .get_mut::<UIComponent>()
        .unwrap()
        .set_flex_direction(FlexDirection::ROW);

    let mut kids = Vec::new();
    for _ in 0..3 {
        kids.push(ui_entity(
            &mut collection,
            Some(container),
            pixels(100.0),
            pixels(100.0),
        ));
    }

    layout(&mut collection, root);

    let container_cmp = cmp(&collection, container);
    assert_eq!(container_cmp.computed.x, 300.0);
    assert_eq!(container_cmp.computed.y, 100.0);

    let xs: Vec<f32> = kids
        .iter()
        .map(|kid| cmp(&collection, *kid).computed_rel.x)
        .collect();
    assert_eq!(xs, vec![0.0, 100.0, 200.0]);
}

#[test]
fn percent_child_under_children_parent_stays_unsolved() {
    let mut collection = EntityCollection::new();
    let root = ui_entity(&mut collection, None, pixels(1280.0), pixels(720.0));
    let parent = ui_entity(&mut collection, Some(root), children(), children());
    let child = ui_entity(&mut collection, Some(parent), percent(0.5), pixels(10.0));

    // Circular dependency: logged as an error, the child's X is left
    // unresolved.
    layout(&mut collection, root);
    assert_eq!(cmp(&collection, child).computed.x, -1.0);
    assert_eq!(cmp(&collection, child).computed.y, 10.0);
}

#[test]
fn percent_resolves_against_the_content_box() {
    let mut collection = EntityCollection::new();
    let root = ui_entity(&mut collection, None, pixels(200.0), pixels(100.0));
    collection
        .get_entity_for_id_mut(root)
        .unwrap()
        .get_mut::<UIComponent>()
        .unwrap()
        .set_desired_padding(Spacing::horizontal(pixels(10.0)));
    let child = ui_entity(&mut collection, Some(root), percent(1.0), percent(1.0));

    layout(&mut collection, root);

    // 200 wide minus 10px padding on each side.
    assert_eq!(cmp(&collection, child).computed.x, 180.0);
    assert_eq!(cmp(&collection, child).computed.y, 100.0);
}

#[test]
fn screen_percent_uses_the_resolution() {
    let mut collection = EntityCollection::new();
    let root = ui_entity(&mut collection, None, screen_pct(0.5), screen_pct(0.25));
    layout(&mut collection, root);
    assert_eq!(cmp(&collection, root).computed.x, 640.0);
    assert_eq!(cmp(&collection, root).computed.y, 180.0);
}

#[test]
fn text_sizing_uses_the_measure_fn() {
    let mut collection = EntityCollection::new();
    let root = ui_entity(&mut collection, None, pixels(500.0), pixels(100.0));
    let label = ui_entity(&mut collection, Some(root), text_size(), text_size());
    collection
        .get_entity_for_id_mut(label)
        .unwrap()
        .add_component(HasLabel::new("hello", false));

    collection.merge_entity_arrays();
    let mut measure = |_font: &str, text: &str, _size: f32, _spacing: f32| {
        Vec2::new(text.len() as f32 * 10.0, 20.0)
    };
    autolayout(
        &mut collection,
        root,
        RES,
        false,
        1.0,
        Measurer::External(&mut measure),
    );

    assert_eq!(cmp(&collection, label).computed.x, 50.0);
    assert_eq!(cmp(&collection, label).computed.y, 20.0);
}

#[test]
fn justify_content_center_and_space_between() {
    for (justify, expected) in [
        (JustifyContent::Center, vec![100.0, 150.0]),
        (JustifyContent::SpaceBetween, vec![0.0, 250.0]),
        (JustifyContent::FlexEnd, vec![200.0, 250.0]),
    ] {
        let mut collection = EntityCollection::new();
        let root = ui_entity(&mut collection, None, pixels(300.0), pixels(100.0));
        {
            let cmp = collection
                .get_entity_for_id_mut(root)
                .unwrap()
                .get_mut::<UIComponent>()
                .unwrap();
            cmp.set_flex_direction(FlexDirection::ROW)
                .set_justify_content(justify);
        }
        let a = ui_entity(&mut collection, Some(root), pixels(50.0), pixels(50.0));
        let b = ui_entity(&mut collection, Some(root), pixels(50.0), pixels(50.0));

        layout(&mut collection, root);

        assert_eq!(
            vec![
                cmp(&collection, a).computed_rel.x,
                cmp(&collection, b).computed_rel.x
            ],
            expected,
            "justify {justify:?}"
        );
    }
}

#[test]
fn align_items_centers_on_the_cross_axis() {
    let mut collection = EntityCollection::new();
    let root = ui_entity(&mut collection, None, pixels(300.0), pixels(100.0));
    collection
        .get_entity_for_id_mut(root)
        .unwrap()
        .get_mut::<UIComponent>()
        .unwrap()
        .set_flex_direction(FlexDirection::ROW)
        .set_align_items(AlignItems::Center);
    let child = ui_entity(&mut collection, Some(root), pixels(50.0), pixels(40.0));

    layout(&mut collection, root);
    assert_eq!(cmp(&collection, child).computed_rel.y, 30.0);
}

#[test]
fn self_align_overrides_parent_alignment() {
    let mut collection = EntityCollection::new();
    let root = ui_entity(&mut collection, None, pixels(300.0), pixels(100.0));
    collection
        .get_entity_for_id_mut(root)
        .unwrap()
        .get_mut::<UIComponent>()
        .unwrap()
        .set_flex_direction(FlexDirection::ROW)
        .set_align_items(AlignItems::FlexStart);
    let child = ui_entity(&mut collection, Some(root), pixels(50.0), pixels(40.0));
    collection
        .get_entity_for_id_mut(child)
        .unwrap()
        .get_mut::<UIComponent>()
        .unwrap()
        .set_self_align(crate::ui::layout_types::SelfAlign::FlexEnd);

    layout(&mut collection, root);
    assert_eq!(cmp(&collection, child).computed_rel.y, 60.0);
}

#[test]
fn elastic_children_shrink_to_fit() {
    let mut collection = EntityCollection::new();
    let root = ui_entity(&mut collection, None, pixels(100.0), pixels(50.0));
    collection
        .get_entity_for_id_mut(root)
        .unwrap()
        .get_mut::<UIComponent>()
        .unwrap()
        .set_flex_direction(FlexDirection::ROW);
    let a = ui_entity(
        &mut collection,
        Some(root),
        pixels(100.0).with_strictness(0.5),
        pixels(50.0),
    );
    let b = ui_entity(
        &mut collection,
        Some(root),
        pixels(100.0).with_strictness(0.5),
        pixels(50.0),
    );

    layout(&mut collection, root);

    let width_a = cmp(&collection, a).computed.x;
    let width_b = cmp(&collection, b).computed.x;
    assert!(width_a < 100.0);
    assert!(width_b < 100.0);
    // Within the solver's acceptable error of the 100px budget.
    assert!(width_a + width_b <= 101.5, "sum was {}", width_a + width_b);
}

#[test]
fn fully_elastic_children_give_way_first() {
    let mut collection = EntityCollection::new();
    let root = ui_entity(&mut collection, None, pixels(100.0), pixels(50.0));
    collection
        .get_entity_for_id_mut(root)
        .unwrap()
        .get_mut::<UIComponent>()
        .unwrap()
        .set_flex_direction(FlexDirection::ROW);
    let rigid = ui_entity(&mut collection, Some(root), pixels(80.0), pixels(50.0));
    let elastic = ui_entity(
        &mut collection,
        Some(root),
        pixels(80.0).with_strictness(0.0),
        pixels(50.0),
    );

    layout(&mut collection, root);

    assert_eq!(cmp(&collection, rigid).computed.x, 80.0);
    assert!(cmp(&collection, elastic).computed.x <= 21.0);
}

#[test]
fn expand_splits_surplus_by_weight() {
    let mut collection = EntityCollection::new();
    let root = ui_entity(&mut collection, None, pixels(300.0), pixels(50.0));
    collection
        .get_entity_for_id_mut(root)
        .unwrap()
        .get_mut::<UIComponent>()
        .unwrap()
        .set_flex_direction(FlexDirection::ROW);
    let fixed = ui_entity(&mut collection, Some(root), pixels(100.0), pixels(50.0));
    let small = ui_entity(&mut collection, Some(root), expand(1.0), pixels(50.0));
    let large = ui_entity(&mut collection, Some(root), expand(2.0), pixels(50.0));

    layout(&mut collection, root);

    assert_eq!(cmp(&collection, fixed).computed.x, 100.0);
    let small_width = cmp(&collection, small).computed.x;
    let large_width = cmp(&collection, large).computed.x;
    assert!((small_width - 200.0 / 3.0).abs() < 0.1, "small {small_width}");
    assert!((large_width - 400.0 / 3.0).abs() < 0.1, "large {large_width}");
}

#[test]
fn min_and_max_constraints_clamp_sizes() {
    let mut collection = EntityCollection::new();
    let root = ui_entity(&mut collection, None, pixels(300.0), pixels(100.0));
    let child = ui_entity(&mut collection, Some(root), pixels(10.0), pixels(500.0));
    collection
        .get_entity_for_id_mut(child)
        .unwrap()
        .get_mut::<UIComponent>()
        .unwrap()
        .set_min_size(Axis::X, pixels(50.0))
        .set_max_size(Axis::Y, pixels(80.0));

    layout(&mut collection, root);

    assert_eq!(cmp(&collection, child).computed.x, 50.0);
    assert_eq!(cmp(&collection, child).computed.y, 80.0);
}

#[test]
fn row_wraps_and_grows_children_sized_height() {
    let mut collection = EntityCollection::new();
    let root = ui_entity(&mut collection, None, pixels(250.0), children());
    collection
        .get_entity_for_id_mut(root)
        .unwrap()
        .get_mut::<UIComponent>()
        .unwrap()
        .set_flex_direction(FlexDirection::ROW)
        .set_flex_wrap(FlexWrap::Wrap);
    let mut kids = Vec::new();
    for _ in 0..3 {
        kids.push(ui_entity(
            &mut collection,
            Some(root),
            pixels(100.0),
            pixels(50.0),
        ));
    }

    layout(&mut collection, root);

    assert_eq!(cmp(&collection, kids[0]).computed_rel.y, 0.0);
    assert_eq!(cmp(&collection, kids[1]).computed_rel.y, 0.0);
    // The third child wraps onto the next line...
    assert_eq!(cmp(&collection, kids[2]).computed_rel.x, 0.0);
    assert_eq!(cmp(&collection, kids[2]).computed_rel.y, 50.0);
    // ...and the container grows to hold the wrapped content.
    assert_eq!(cmp(&collection, root).computed.y, 100.0);
}

#[test]
fn absolute_children_skip_flex_flow() {
    let mut collection = EntityCollection::new();
    let root = ui_entity(&mut collection, None, pixels(500.0), pixels(500.0));
    collection
        .get_entity_for_id_mut(root)
        .unwrap()
        .get_mut::<UIComponent>()
        .unwrap()
        .set_flex_direction(FlexDirection::ROW);
    let flowed = ui_entity(&mut collection, Some(root), pixels(100.0), pixels(100.0));
    let floating = ui_entity(&mut collection, Some(root), pixels(50.0), pixels(50.0));
    collection
        .get_entity_for_id_mut(floating)
        .unwrap()
        .get_mut::<UIComponent>()
        .unwrap()
        .set_absolute_position(400.0, 300.0);

    layout(&mut collection, root);

    // The absolute child takes its configured position and does not push
    // the flowed sibling.
    assert_eq!(cmp(&collection, flowed).computed_rel.x, 0.0);
    assert_eq!(cmp(&collection, floating).computed_rel.x, 400.0);
    assert_eq!(cmp(&collection, floating).computed_rel.y, 300.0);
}

#[test]
fn hidden_children_are_skipped_by_flow() {
    let mut collection = EntityCollection::new();
    let root = ui_entity(&mut collection, None, pixels(500.0), pixels(100.0));
    collection
        .get_entity_for_id_mut(root)
        .unwrap()
        .get_mut::<UIComponent>()
        .unwrap()
        .set_flex_direction(FlexDirection::ROW);
    let first = ui_entity(&mut collection, Some(root), pixels(100.0), pixels(100.0));
    let hidden = ui_entity(&mut collection, Some(root), pixels(100.0), pixels(100.0));
    collection
        .get_entity_for_id_mut(hidden)
        .unwrap()
        .add_component(crate::ui::components::ShouldHide);
    let last = ui_entity(&mut collection, Some(root), pixels(100.0), pixels(100.0));

    layout(&mut collection, root);

    assert_eq!(cmp(&collection, first).computed_rel.x, 0.0);
    // The hidden sibling takes no main-axis space.
    assert_eq!(cmp(&collection, last).computed_rel.x, 100.0);
}

#[test]
fn world_rects_accumulate_parent_offsets() {
    let mut collection = EntityCollection::new();
    let root = ui_entity(&mut collection, None, pixels(500.0), pixels(500.0));
    collection
        .get_entity_for_id_mut(root)
        .unwrap()
        .get_mut::<UIComponent>()
        .unwrap()
        .set_desired_padding(Spacing::all(pixels(10.0)));
    let outer = ui_entity(&mut collection, Some(root), pixels(200.0), pixels(200.0));
    let inner = ui_entity(&mut collection, Some(outer), pixels(50.0), pixels(50.0));

    layout(&mut collection, root);

    // Root padding shifts the outer child; the inner child inherits it.
    let outer_rect = cmp(&collection, outer).rect();
    assert_eq!((outer_rect.x, outer_rect.y), (10.0, 10.0));
    let inner_rect = cmp(&collection, inner).rect();
    assert_eq!((inner_rect.x, inner_rect.y), (10.0, 10.0));
}

#[test]
fn computed_values_reset_between_runs() {
    let mut collection = EntityCollection::new();
    let root = ui_entity(&mut collection, None, pixels(100.0), pixels(100.0));
    layout(&mut collection, root);
    assert_eq!(cmp(&collection, root).computed.x, 100.0);

    // Shrink the desired size and re-run: stale computed values must not
    // leak through.
    collection
        .get_entity_for_id_mut(root)
        .unwrap()
        .get_mut::<UIComponent>()
        .unwrap()
        .set_desired_width(pixels(60.0));
    autolayout(&mut collection, root, RES, false, 1.0, Measurer::None);
    assert_eq!(cmp(&collection, root).computed.x, 60.0);
}

#[test]
fn adaptive_scaling_multiplies_pixels() {
    let mut collection = EntityCollection::new();
    let root = ui_entity(&mut collection, None, pixels(100.0), pixels(50.0));
    collection
        .get_entity_for_id_mut(root)
        .unwrap()
        .get_mut::<UIComponent>()
        .unwrap()
        .resolved_scaling_mode = crate::ui::layout_types::ScalingMode::Adaptive;

    collection.merge_entity_arrays();
    autolayout(&mut collection, root, RES, false, 2.0, Measurer::None);

    assert_eq!(cmp(&collection, root).computed.x, 200.0);
    assert_eq!(cmp(&collection, root).computed.y, 100.0);
}

#[test]
fn grid_snapping_rounds_to_the_grid() {
    let mut collection = EntityCollection::new();
    // At 1280x720 the X grid unit is 4 * (1280/720) = 7.1111.
    let root = ui_entity(&mut collection, None, pixels(101.0), pixels(50.0));
    collection.merge_entity_arrays();
    autolayout(&mut collection, root, RES, true, 1.0, Measurer::None);

    let unit = 4.0 * (1280.0 / 720.0);
    let snapped = cmp(&collection, root).computed.x;
    assert!((snapped / unit - (snapped / unit).round()).abs() < 1e-3);
}
