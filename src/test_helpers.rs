use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::editor::{Editor, EditorOptions};
use crate::slash::SlashCommands;

pub fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

pub fn ctrl_key(c: char) -> KeyEvent {
    KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
}

/// Feed `text` to the editor one key press at a time.
pub fn type_text(editor: &mut Editor, text: &str) {
    for c in text.chars() {
        editor.handle_key(key(KeyCode::Char(c)));
    }
}

/// Empty editor with the default slash commands installed.
pub fn slash_editor() -> Editor {
    Editor::new(EditorOptions {
        extensions: vec![Box::new(SlashCommands::default())],
        ..EditorOptions::default()
    })
}
