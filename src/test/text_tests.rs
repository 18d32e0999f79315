use crate::ui::text::{
    HasTextAreaState, HasTextInputState, LineIndex, LinePosition, TextSelection, text_hash,
};

#[test]
fn backspace_then_insert_matches_the_expected_text() {
    // Start with "hello", cursor at the end.
    let mut state = HasTextInputState::new("hello", 0);
    assert_eq!(state.cursor_position, 5);

    state.backspace();
    state.backspace();
    assert_eq!(state.text(), "hel");
    assert_eq!(state.cursor_position, 3);

    state.insert_at_cursor("p");
    state.insert_at_cursor("y");
    assert_eq!(state.text(), "helpy");
    assert_eq!(state.cursor_position, 5);

    let mut index = LineIndex::new(state.text());
    index.rebuild(state.text());
    assert_eq!(
        index.offset_to_position(3),
        LinePosition { row: 0, column: 3 }
    );
}

#[test]
fn insert_n_then_backspace_n_is_identity() {
    let mut state = HasTextInputState::new("stable", 0);
    state.cursor_position = 3;
    let original = state.text().to_string();
    let cursor = state.cursor_position;

    for ch in ["a", "b", "c", "d"] {
        state.insert_at_cursor(ch);
    }
    for _ in 0..4 {
        state.backspace();
    }

    assert_eq!(state.text(), original);
    assert_eq!(state.cursor_position, cursor);
}

#[test]
fn line_index_round_trips_every_offset() {
    let text = "alpha\nbeta\n\ngamma delta\nend";
    let index = LineIndex::new(text);
    for offset in 0..=text.len() {
        let pos = index.offset_to_position(offset);
        assert_eq!(index.position_to_offset(pos.row, pos.column), offset);
    }
}

#[test]
fn text_hash_changes_with_content() {
    assert_ne!(text_hash("hello"), text_hash("hellp"));
    assert_ne!(text_hash("aa"), text_hash("a"));
    assert_eq!(text_hash("same"), text_hash("same"));
}

#[test]
fn selection_spans_are_ordered() {
    let mut selection = TextSelection::default();
    selection.set_cursor(10, false);
    selection.set_cursor(4, true);
    assert_eq!(selection.start(), 4);
    assert_eq!(selection.end(), 10);

    selection.select_all(20);
    assert_eq!(selection.length(), 20);
}

#[test]
fn area_editing_keeps_the_line_index_fresh() {
    let mut area = HasTextAreaState::new("one\ntwo");
    area.input.move_end();
    area.input.insert_at_cursor("\nthree");
    area.rebuild_line_index();

    assert_eq!(area.line_count(), 3);
    let pos = area.cursor_position_rc();
    assert_eq!(pos.row, 2);
    assert_eq!(pos.column, 5);
}

#[test]
fn home_and_end_clamp_to_the_row() {
    let mut area = HasTextAreaState::new("short\na much longer line");
    // Jump the cursor into row 1, then use the index to find its edges.
    area.input.cursor_position = area.line_index.position_to_offset(1, 3);
    let pos = area.cursor_position_rc();
    assert_eq!(area.line_index.line_start(pos.row), 6);
    assert_eq!(
        area.line_index.line_end(pos.row),
        area.text().len()
    );
}

#[test]
fn delete_forward_at_the_end_is_a_no_op() {
    let mut state = HasTextInputState::new("ab", 0);
    state.move_end();
    assert!(!state.delete_forward());
    assert_eq!(state.text(), "ab");

    state.move_home();
    assert!(state.delete_forward());
    assert_eq!(state.text(), "b");
}
