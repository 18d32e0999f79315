use std::cell::{Cell, RefCell};
use std::rc::Rc;

use super::common::*;
use crate::app::App;
use crate::ecs::{EntityCollection, EntityId};
use crate::geometry::{Resolution, Vec2};
use crate::input::InputSnapshot;
use crate::ui::components::{HasDropdownState, HasSliderState, HasToggleSwitchState};
use crate::ui::context::{ROOT, UIContext};
use crate::ui::identity::mk;
use crate::ui::theme::Theme;
use crate::ui::widgets::Imm;
use crate::ui::{ComponentConfig, TextInputConfig};

const RES: Resolution = Resolution {
    width: 1280.0,
    height: 720.0,
};

fn install<F>(build: F) -> App
where
    F: FnMut(&mut EntityCollection) + 'static,
{
    let mut app = App::new();
    app.install_ui::<TestAction>(Theme::default(), RES, |systems| {
        systems.register_ui_update_system(BuildUi { build });
    });
    app
}

fn run_with_input(app: &mut App, snapshot: InputSnapshot<TestAction>) {
    *app.input_mut::<TestAction>().unwrap() = snapshot;
    app.run_frame(1.0 / 60.0);
}

fn focus_id(app: &mut App) -> EntityId {
    app.ui()
        .get_singleton_cmp::<UIContext<TestAction>>()
        .unwrap()
        .focus_id
}

#[test]
fn button_click_fires_on_press() {
    let clicked = Rc::new(Cell::new(false));
    let clicked_in_build = clicked.clone();

    let mut app = install(move |ui| {
        let mut imm = Imm::<TestAction>::new(ui);
        let root = imm.root(RES);
        let ep = imm.mk(root.id());
        if imm
            .button(ep, ComponentConfig::new().with_label("Play"))
            .changed()
        {
            clicked_in_build.set(true);
        }
    });

    // Warm up: create, merge, lay out.
    run_with_input(&mut app, InputSnapshot::default());
    run_with_input(&mut app, InputSnapshot::default());
    assert!(!clicked.get());

    // Press inside the button; the widget observes it on the next build.
    run_with_input(&mut app, mouse_snapshot(Vec2::new(100.0, 25.0), true));
    run_with_input(&mut app, mouse_snapshot(Vec2::new(100.0, 25.0), true));
    assert!(clicked.get());
}

#[test]
fn click_sets_focus_and_click_outside_clears_it() {
    let button_id = Rc::new(Cell::new(ROOT));
    let id_in_build = button_id.clone();

    let mut app = install(move |ui| {
        let mut imm = Imm::<TestAction>::new(ui);
        let root = imm.root(RES);
        let ep = imm.mk(root.id());
        let result = imm.button(ep, ComponentConfig::new().with_label("Play"));
        id_in_build.set(result.id());
    });

    run_with_input(&mut app, InputSnapshot::default());
    run_with_input(&mut app, InputSnapshot::default());

    run_with_input(&mut app, mouse_snapshot(Vec2::new(100.0, 25.0), true));
    assert_eq!(focus_id(&mut app), button_id.get());

    // Release, then press far away from every widget.
    run_with_input(&mut app, mouse_snapshot(Vec2::new(100.0, 25.0), false));
    run_with_input(&mut app, mouse_snapshot(Vec2::new(900.0, 600.0), true));
    assert_eq!(focus_id(&mut app), ROOT);
}

#[test]
fn checkbox_toggles_on_click() {
    let value = Rc::new(Cell::new(false));
    let value_in_build = value.clone();

    let mut app = install(move |ui| {
        let mut imm = Imm::<TestAction>::new(ui);
        let root = imm.root(RES);
        let ep = imm.mk(root.id());
        let mut current = value_in_build.get();
        imm.checkbox(ep, &mut current, ComponentConfig::new());
        value_in_build.set(current);
    });

    run_with_input(&mut app, InputSnapshot::default());
    run_with_input(&mut app, InputSnapshot::default());
    assert!(!value.get());

    run_with_input(&mut app, mouse_snapshot(Vec2::new(100.0, 25.0), true));
    run_with_input(&mut app, mouse_snapshot(Vec2::new(100.0, 25.0), true));
    assert!(value.get());

    // A separate press toggles back off.
    run_with_input(&mut app, mouse_snapshot(Vec2::new(100.0, 25.0), false));
    run_with_input(&mut app, mouse_snapshot(Vec2::new(100.0, 25.0), true));
    run_with_input(&mut app, mouse_snapshot(Vec2::new(100.0, 25.0), true));
    assert!(!value.get());
}

#[test]
fn slider_follows_the_mouse() {
    let value = Rc::new(Cell::new(0.0f32));
    let slider_root = Rc::new(Cell::new(ROOT));
    let value_in_build = value.clone();
    let root_in_build = slider_root.clone();

    let mut app = install(move |ui| {
        let mut imm = Imm::<TestAction>::new(ui);
        let root = imm.root(RES);
        let ep = imm.mk(root.id());
        let mut current = value_in_build.get();
        let result = imm.slider(ep, &mut current, ComponentConfig::new());
        root_in_build.set(result.id());
        value_in_build.set(current);
    });

    run_with_input(&mut app, InputSnapshot::default());
    run_with_input(&mut app, InputSnapshot::default());

    // The track spans (0,0) to (200,50). Press at the midpoint...
    run_with_input(&mut app, mouse_snapshot(Vec2::new(100.0, 25.0), true));
    // ...then drag to three quarters.
    run_with_input(&mut app, mouse_snapshot(Vec2::new(150.0, 25.0), true));
    run_with_input(&mut app, mouse_snapshot(Vec2::new(150.0, 25.0), false));
    run_with_input(&mut app, InputSnapshot::default());

    assert!((value.get() - 0.75).abs() < 0.01, "value {}", value.get());

    // The state component carries the same value.
    let track_value = {
        let ui = app.ui();
        let slider = ui.get_entity_for_id(slider_root.get()).unwrap();
        let track = slider
            .get::<crate::ui::UIComponent>()
            .unwrap()
            .children
            .first()
            .copied()
            .unwrap();
        ui.get_entity_for_id(track)
            .unwrap()
            .get::<HasSliderState>()
            .unwrap()
            .value
    };
    assert!((track_value - 0.75).abs() < 0.01);
}

#[test]
fn slider_arrow_keys_step_one_percent() {
    let value = Rc::new(Cell::new(0.5f32));
    let value_in_build = value.clone();

    let mut app = install(move |ui| {
        let mut imm = Imm::<TestAction>::new(ui);
        let root = imm.root(RES);
        let ep = imm.mk(root.id());
        let mut current = value_in_build.get();
        imm.slider(ep, &mut current, ComponentConfig::new());
        value_in_build.set(current);
    });

    run_with_input(&mut app, InputSnapshot::default());
    run_with_input(&mut app, InputSnapshot::default());

    // Focus the track by pressing on it, release, then tap Right.
    run_with_input(&mut app, mouse_snapshot(Vec2::new(100.0, 25.0), true));
    run_with_input(&mut app, mouse_snapshot(Vec2::new(100.0, 25.0), false));
    let before = value.get();
    run_with_input(&mut app, press_action(TestAction::WidgetRight));
    run_with_input(&mut app, InputSnapshot::default());
    assert!(
        (value.get() - (before + 0.01)).abs() < 1e-4,
        "value {}",
        value.get()
    );
}

#[test]
fn tab_cycles_focus_through_buttons() {
    let ids = Rc::new(RefCell::new(Vec::new()));
    let ids_in_build = ids.clone();

    let mut app = install(move |ui| {
        let mut imm = Imm::<TestAction>::new(ui);
        let root = imm.root(RES);
        let mut seen = Vec::new();
        for index in 0..3 {
            let ep = imm.mk_indexed(root.id(), index);
            let result = imm.button(
                ep,
                ComponentConfig::new().with_label(&format!("B{index}")),
            );
            seen.push(result.id());
        }
        *ids_in_build.borrow_mut() = seen;
    });

    run_with_input(&mut app, InputSnapshot::default());
    run_with_input(&mut app, InputSnapshot::default());

    let buttons = ids.borrow().clone();
    // With nothing focused, the first tab target grabs focus.
    assert_eq!(focus_id(&mut app), buttons[0]);

    run_with_input(&mut app, press_action(TestAction::WidgetNext));
    assert_eq!(focus_id(&mut app), buttons[1]);

    run_with_input(&mut app, press_action(TestAction::WidgetNext));
    assert_eq!(focus_id(&mut app), buttons[2]);

    // Wrapping takes one frame: the last widget releases, the first grabs.
    run_with_input(&mut app, press_action(TestAction::WidgetNext));
    run_with_input(&mut app, InputSnapshot::default());
    assert_eq!(focus_id(&mut app), buttons[0]);
}

#[test]
fn modifier_reverses_tab_direction() {
    let ids = Rc::new(RefCell::new(Vec::new()));
    let ids_in_build = ids.clone();

    let mut app = install(move |ui| {
        let mut imm = Imm::<TestAction>::new(ui);
        let root = imm.root(RES);
        let mut seen = Vec::new();
        for index in 0..3 {
            let ep = imm.mk_indexed(root.id(), index);
            seen.push(
                imm.button(
                    ep,
                    ComponentConfig::new().with_label(&format!("B{index}")),
                )
                .id(),
            );
        }
        *ids_in_build.borrow_mut() = seen;
    });

    run_with_input(&mut app, InputSnapshot::default());
    run_with_input(&mut app, InputSnapshot::default());

    let buttons = ids.borrow().clone();
    run_with_input(&mut app, press_action(TestAction::WidgetNext));
    assert_eq!(focus_id(&mut app), buttons[1]);

    run_with_input(
        &mut app,
        press_action_with_held(TestAction::WidgetNext, TestAction::WidgetMod),
    );
    assert_eq!(focus_id(&mut app), buttons[0]);
}

#[test]
fn toggle_switch_animates_toward_target() {
    let value = Rc::new(Cell::new(false));
    let switch_id = Rc::new(Cell::new(ROOT));
    let value_in_build = value.clone();
    let id_in_build = switch_id.clone();

    let mut app = install(move |ui| {
        let mut imm = Imm::<TestAction>::new(ui);
        let root = imm.root(RES);
        let ep = imm.mk(root.id());
        let mut current = value_in_build.get();
        let result = imm.toggle_switch(ep, &mut current, ComponentConfig::new());
        id_in_build.set(result.id());
        value_in_build.set(current);
    });

    run_with_input(&mut app, InputSnapshot::default());
    run_with_input(&mut app, InputSnapshot::default());

    run_with_input(&mut app, mouse_snapshot(Vec2::new(30.0, 15.0), true));
    run_with_input(&mut app, mouse_snapshot(Vec2::new(30.0, 15.0), true));
    assert!(value.get());

    // The knob eases in; progress grows monotonically toward 1.
    let progress_at = |app: &mut App| {
        app.ui()
            .get_entity_for_id(switch_id.get())
            .unwrap()
            .get::<HasToggleSwitchState>()
            .unwrap()
            .progress
    };
    let first = progress_at(&mut app);
    run_with_input(&mut app, InputSnapshot::default());
    let second = progress_at(&mut app);
    run_with_input(&mut app, InputSnapshot::default());
    let third = progress_at(&mut app);
    assert!(first < second && second < third);
    assert!(third < 1.0);
}

#[test]
fn dropdown_opens_on_click_and_closes_on_click_outside() {
    let dropdown_id = Rc::new(Cell::new(ROOT));
    let index = Rc::new(Cell::new(0usize));
    let id_in_build = dropdown_id.clone();
    let index_in_build = index.clone();

    let mut app = install(move |ui| {
        let mut imm = Imm::<TestAction>::new(ui);
        let root = imm.root(RES);
        let ep = imm.mk(root.id());
        let mut current = index_in_build.get();
        let result = imm.dropdown(
            ep,
            &["red", "green", "blue"],
            &mut current,
            ComponentConfig::new(),
        );
        id_in_build.set(result.id());
        index_in_build.set(current);
    });

    run_with_input(&mut app, InputSnapshot::default());
    run_with_input(&mut app, InputSnapshot::default());

    let is_open = |app: &mut App, id: EntityId| {
        app.ui()
            .get_entity_for_id(id)
            .unwrap()
            .get::<HasDropdownState>()
            .unwrap()
            .on
    };
    assert!(!is_open(&mut app, dropdown_id.get()));

    // Click the collapsed button.
    run_with_input(&mut app, mouse_snapshot(Vec2::new(100.0, 25.0), true));
    run_with_input(&mut app, mouse_snapshot(Vec2::new(100.0, 25.0), false));
    assert!(is_open(&mut app, dropdown_id.get()));

    // A press far outside the dropdown closes it.
    run_with_input(&mut app, mouse_snapshot(Vec2::new(1000.0, 600.0), true));
    assert!(!is_open(&mut app, dropdown_id.get()));
}

#[test]
fn dropdown_arrow_keys_cycle_options() {
    let index = Rc::new(Cell::new(0usize));
    let dropdown_id = Rc::new(Cell::new(ROOT));
    let index_in_build = index.clone();
    let id_in_build = dropdown_id.clone();

    let mut app = install(move |ui| {
        let mut imm = Imm::<TestAction>::new(ui);
        let root = imm.root(RES);
        let ep = imm.mk(root.id());
        let mut current = index_in_build.get();
        let result = imm.dropdown(
            ep,
            &["red", "green", "blue"],
            &mut current,
            ComponentConfig::new(),
        );
        id_in_build.set(result.id());
        index_in_build.set(current);
    });

    run_with_input(&mut app, InputSnapshot::default());
    run_with_input(&mut app, InputSnapshot::default());

    // Focus the dropdown container directly and cycle with the arrows.
    {
        let id = dropdown_id.get();
        let ui = app.ui();
        ui.get_singleton_cmp_mut::<UIContext<TestAction>>()
            .unwrap()
            .set_focus(id);
    }
    run_with_input(&mut app, press_action(TestAction::WidgetDown));
    run_with_input(&mut app, InputSnapshot::default());
    assert_eq!(index.get(), 1);
}

#[test]
fn text_input_receives_typed_characters() {
    let text = Rc::new(RefCell::new(String::new()));
    let input_id = Rc::new(Cell::new(ROOT));
    let text_in_build = text.clone();
    let id_in_build = input_id.clone();

    let mut app = install(move |ui| {
        let mut imm = Imm::<TestAction>::new(ui);
        let root = imm.root(RES);
        let ep = imm.mk(root.id());
        let mut value = text_in_build.borrow().clone();
        let result = imm.text_input(
            ep,
            &mut value,
            TextInputConfig::default(),
            ComponentConfig::new(),
        );
        id_in_build.set(result.id());
        *text_in_build.borrow_mut() = value;
    });

    run_with_input(&mut app, InputSnapshot::default());
    run_with_input(&mut app, InputSnapshot::default());

    {
        let id = input_id.get();
        let ui = app.ui();
        ui.get_singleton_cmp_mut::<UIContext<TestAction>>()
            .unwrap()
            .set_focus(id);
    }

    run_with_input(
        &mut app,
        InputSnapshot {
            chars: vec!['h', 'i'],
            ..Default::default()
        },
    );
    run_with_input(&mut app, InputSnapshot::default());
    assert_eq!(*text.borrow(), "hi");

    run_with_input(&mut app, press_action(TestAction::TextBackspace));
    run_with_input(&mut app, InputSnapshot::default());
    assert_eq!(*text.borrow(), "h");
}

#[test]
fn identity_reuses_entities_per_call_site() {
    let mut ui = EntityCollection::new();
    let (first, _) = mk(&mut ui, 7);
    ui.merge_entity_arrays();
    let (second, _) = mk(&mut ui, 7);
    // Separate source locations resolve to separate entities.
    assert_ne!(first, second);

    // Repeated calls from one location with one parent reuse the entity.
    let mut repeat = Vec::new();
    for _ in 0..3 {
        repeat.push(mk(&mut ui, 7).0);
    }
    assert_eq!(repeat[0], repeat[1]);
    assert_eq!(repeat[1], repeat[2]);
}

#[test]
fn identity_recovers_when_the_entity_was_deleted() {
    fn make(ui: &mut EntityCollection) -> EntityId {
        mk(ui, 3).0
    }

    let mut ui = EntityCollection::new();
    let original = make(&mut ui);
    ui.merge_entity_arrays();

    ui.mark_id_for_cleanup(original);
    ui.cleanup();

    // Same call site: a recoverable error that produces a fresh entity.
    let replacement = make(&mut ui);
    assert_ne!(original, replacement);
    assert!(ui.get_entity_for_id(replacement).is_some());
}

#[test]
fn progress_bar_reports_the_clamped_fraction() {
    let fraction = Rc::new(Cell::new(0.0f32));
    let fraction_in_build = fraction.clone();

    let mut app = install(move |ui| {
        let mut imm = Imm::<TestAction>::new(ui);
        let root = imm.root(RES);
        let ep = imm.mk(root.id());
        let result = imm.progress_bar(
            ep,
            150.0,
            0.0,
            100.0,
            crate::ui::ProgressBarStyle::Percentage,
            ComponentConfig::new(),
        );
        fraction_in_build.set(result.as_f32());
    });

    run_with_input(&mut app, InputSnapshot::default());
    assert_eq!(fraction.get(), 1.0);
}

#[test]
fn dropdown_reconciler_builds_and_collapses_children() {
    use crate::ecs::SystemManager;
    use crate::ui::UIComponent;
    use crate::ui::components::HasChildrenComponent;
    use crate::ui::layout_types::pixels;
    use crate::ui::systems::UpdateDropdownOptions;

    let mut collection = EntityCollection::new();
    let id = {
        let entity = collection.create_entity();
        let id = entity.id;
        entity
            .add_component(UIComponent::new(id))
            .set_desired_height(pixels(40.0));
        let mut state = HasDropdownState::new(Vec::new());
        state.fetch_options = Some(Box::new(|| {
            vec!["a".to_string(), "b".to_string(), "c".to_string()]
        }));
        state.last_option_clicked = 1;
        entity.add_component(state);
        entity.add_component(HasChildrenComponent::default());
        id
    };
    collection.merge_entity_arrays();

    let mut manager = SystemManager::new();
    manager.register_update_system(UpdateDropdownOptions::<TestAction>::default());
    manager.run(&mut collection, 1.0 / 60.0);

    // Three rows exist, but only the selected one is in the layout tree.
    let entity = collection.get_entity_for_id(id).unwrap();
    let owned = entity.get::<HasChildrenComponent>().unwrap().children.clone();
    assert_eq!(owned.len(), 3);
    assert_eq!(
        entity.get::<UIComponent>().unwrap().children,
        vec![owned[1]]
    );

    // Expanding shows every row.
    collection
        .get_entity_for_id_mut(id)
        .unwrap()
        .get_mut::<HasDropdownState>()
        .unwrap()
        .on = true;
    manager.run(&mut collection, 1.0 / 60.0);
    let entity = collection.get_entity_for_id(id).unwrap();
    assert_eq!(entity.get::<UIComponent>().unwrap().children, owned);
}

#[test]
fn hover_animation_eases_in_and_back_out() {
    use crate::ui::animation::{AnimationConfig, HasAnimations};

    let button_id = Rc::new(Cell::new(ROOT));
    let id_in_build = button_id.clone();

    let mut app = install(move |ui| {
        let mut imm = Imm::<TestAction>::new(ui);
        let root = imm.root(RES);
        let ep = imm.mk(root.id());
        let result = imm.button(ep, ComponentConfig::new().with_label("Hover"));
        imm.animate(result.id(), AnimationConfig::hover_scale(1.1));
        id_in_build.set(result.id());
    });

    run_with_input(&mut app, InputSnapshot::default());
    run_with_input(&mut app, InputSnapshot::default());

    let progress_at = |app: &mut App| {
        app.ui()
            .get_entity_for_id(button_id.get())
            .unwrap()
            .get::<HasAnimations>()
            .unwrap()
            .animations[0]
            .progress
    };
    assert_eq!(progress_at(&mut app), 0.0);

    // Hover over the button: progress grows.
    run_with_input(&mut app, mouse_snapshot(Vec2::new(100.0, 25.0), false));
    run_with_input(&mut app, mouse_snapshot(Vec2::new(100.0, 25.0), false));
    let while_hovered = progress_at(&mut app);
    assert!(while_hovered > 0.0);

    // Pointer leaves: progress falls back toward zero.
    run_with_input(&mut app, mouse_snapshot(Vec2::new(900.0, 600.0), false));
    run_with_input(&mut app, mouse_snapshot(Vec2::new(900.0, 600.0), false));
    assert!(progress_at(&mut app) < while_hovered);
}
