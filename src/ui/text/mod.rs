pub mod line_index;
pub mod selection;
pub mod state;
pub mod storage;

pub use line_index::{LineIndex, LinePosition};
pub use selection::TextSelection;
pub use state::{
    DEFAULT_BLINK_RATE, HasLineIndex, HasTextAreaState, HasTextInputState, HasTextSelection,
    text_hash,
};
pub use storage::{StringStorage, TextStorage, next_char_boundary, prev_char_boundary};
