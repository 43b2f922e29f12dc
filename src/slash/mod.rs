//! Slash commands: type the trigger character to open a menu of document
//! transformations.
//!
//! - `registry`: the command list and its query filter
//! - `menu`: the floating popup and its key handling
//! - `executor`: applies a chosen command over the trigger range

pub mod executor;
pub mod menu;
pub mod registry;

use crate::document::DocRange;
use crate::editor::{EditorState, Extension, Plugin};
use crate::suggestion::{Suggestion, SuggestionOptions, SuggestionRenderer};

pub use executor::execute;
pub use menu::{MenuState, SlashMenu};
pub use registry::{Command, CommandRegistry, ExecutionContext};

pub const DEFAULT_TRIGGER: char = '/';
pub const EXTENSION_NAME: &str = "slashCommands";

/// Suggestion wiring for a registry: filtered items, the executor and the
/// slash menu renderer.
pub fn slash_commands_config(registry: CommandRegistry, trigger: char) -> SuggestionOptions<Command> {
    SuggestionOptions {
        char: trigger,
        items: Box::new(move |query: &str| registry.filter(query)),
        command: Box::new(|editor: &mut EditorState, range: DocRange, command: &Command| {
            execute(command, range, editor)
        }),
        render: Box::new(|| -> Box<dyn SuggestionRenderer<Command>> { Box::new(SlashMenu::new()) }),
    }
}

pub struct SlashCommandsOptions {
    pub suggestion: SuggestionOptions<Command>,
}

impl Default for SlashCommandsOptions {
    fn default() -> Self {
        Self {
            suggestion: slash_commands_config(CommandRegistry::builtins(), DEFAULT_TRIGGER),
        }
    }
}

/// Editor extension that installs the slash command suggestion plugin.
pub struct SlashCommands {
    options: SlashCommandsOptions,
}

impl SlashCommands {
    pub fn configure(options: SlashCommandsOptions) -> Self {
        Self { options }
    }

    pub fn with_trigger(trigger: char) -> Self {
        Self::configure(SlashCommandsOptions {
            suggestion: slash_commands_config(CommandRegistry::builtins(), trigger),
        })
    }
}

impl Default for SlashCommands {
    fn default() -> Self {
        Self::configure(SlashCommandsOptions::default())
    }
}

impl Extension for SlashCommands {
    fn name(&self) -> &str {
        EXTENSION_NAME
    }

    fn into_plugins(self: Box<Self>) -> Vec<Box<dyn Plugin>> {
        vec![Box::new(Suggestion::new(EXTENSION_NAME, self.options.suggestion))]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{BlockKind, Marks};
    use crate::test_helpers::{key, slash_editor, type_text};
    use crossterm::event::{KeyCode, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
    use ratatui::{Terminal, backend::TestBackend, layout::Rect};

    #[test]
    fn typing_trigger_opens_menu() {
        let mut ed = slash_editor();
        assert!(!ed.has_active_plugin());
        type_text(&mut ed, "/");
        assert!(ed.has_active_plugin());
    }

    #[test]
    fn enter_on_empty_list_is_noop() {
        let mut ed = slash_editor();
        type_text(&mut ed, "/h1x");
        assert!(ed.handle_key(key(KeyCode::Enter)));
        assert_eq!(ed.state().doc().plain_text(), "/h1x");
        assert_eq!(ed.state().doc().blocks().len(), 1);
        // The session stays open over the literal text.
        assert!(ed.has_active_plugin());
    }

    #[test]
    fn enter_on_h1_converts_block() {
        let mut ed = slash_editor();
        type_text(&mut ed, "/h1");
        assert!(ed.handle_key(key(KeyCode::Enter)));
        let doc = ed.state().doc();
        assert_eq!(doc.plain_text(), "");
        assert_eq!(doc.blocks()[0].kind, BlockKind::Heading { level: 1 });
        assert!(!ed.has_active_plugin());
    }

    #[test]
    fn bold_then_typing_is_bold() {
        let mut ed = slash_editor();
        type_text(&mut ed, "/b");
        ed.handle_key(key(KeyCode::Enter));
        assert!(!ed.has_active_plugin());
        assert_eq!(ed.state().doc().plain_text(), "");
        type_text(&mut ed, "hi");
        assert_eq!(ed.state().doc().marks_at(1), Marks::BOLD);
        assert_eq!(ed.state().doc().marks_at(2), Marks::BOLD);
    }

    #[test]
    fn arrows_pick_second_item() {
        let mut ed = slash_editor();
        type_text(&mut ed, "/");
        ed.handle_key(key(KeyCode::Down));
        ed.handle_key(key(KeyCode::Enter));
        assert_eq!(ed.state().doc().blocks()[0].kind, BlockKind::Heading { level: 2 });
        assert_eq!(ed.state().caret(), 0);
    }

    #[test]
    fn escape_dismisses_until_trigger_left() {
        let mut ed = slash_editor();
        type_text(&mut ed, "/he");
        assert!(ed.handle_key(key(KeyCode::Esc)));
        assert!(!ed.has_active_plugin());
        assert_eq!(ed.state().doc().plain_text(), "/he");

        type_text(&mut ed, "a");
        assert!(!ed.has_active_plugin());

        // Enter is an ordinary split once the menu is gone.
        ed.handle_key(key(KeyCode::Enter));
        assert_eq!(ed.state().doc().blocks().len(), 2);
    }

    #[test]
    fn space_closes_menu() {
        let mut ed = slash_editor();
        type_text(&mut ed, "/h ");
        assert!(!ed.has_active_plugin());
        assert_eq!(ed.state().doc().plain_text(), "/h ");
    }

    #[test]
    fn trigger_inside_word_does_not_open() {
        let mut ed = slash_editor();
        type_text(&mut ed, "and/or");
        assert!(!ed.has_active_plugin());
    }

    #[test]
    fn backspacing_trigger_closes_menu() {
        let mut ed = slash_editor();
        type_text(&mut ed, "/");
        ed.handle_key(key(KeyCode::Backspace));
        assert!(!ed.has_active_plugin());
    }

    #[test]
    fn slash_command_undoes_in_one_step() {
        let mut ed = slash_editor();
        type_text(&mut ed, "/h2");
        ed.handle_key(key(KeyCode::Enter));
        assert!(ed.state_mut().undo());
        assert_eq!(ed.state().doc().plain_text(), "/h2");
        assert_eq!(ed.state().doc().blocks()[0].kind, BlockKind::Paragraph);
    }

    #[test]
    fn custom_trigger_character() {
        let mut ed = crate::editor::Editor::new(crate::editor::EditorOptions {
            extensions: vec![Box::new(SlashCommands::with_trigger('@'))],
            ..Default::default()
        });
        type_text(&mut ed, "/");
        assert!(!ed.has_active_plugin());
        type_text(&mut ed, " @it");
        assert!(ed.has_active_plugin());
        ed.handle_key(key(KeyCode::Enter));
        assert_eq!(ed.state().doc().plain_text(), "/ ");
        assert_eq!(ed.state().stored_marks(), Some(Marks::ITALIC));
    }

    #[test]
    fn click_on_item_runs_it() {
        let mut ed = slash_editor();
        let mut terminal = Terminal::new(TestBackend::new(40, 12)).unwrap();
        type_text(&mut ed, "/");
        terminal.draw(|f| ed.draw(f, Rect::new(0, 0, 40, 12))).unwrap();

        // Popup opens under the trigger: border on row 1, items from row 2.
        let click = MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: 3,
            row: 4,
            modifiers: KeyModifiers::NONE,
        };
        assert!(ed.handle_mouse(click));
        assert_eq!(ed.state().doc().plain_text(), "");
        assert_eq!(ed.state().stored_marks(), Some(Marks::BOLD));
        assert!(!ed.has_active_plugin());
    }
}
