//! Runs a chosen command against the trigger range.

use crate::document::DocRange;
use crate::editor::EditorState;

use super::registry::{Command, ExecutionContext};

/// Delete `range`, apply `command` at the resulting caret and refocus the
/// document, all as one undoable edit.
pub fn execute(command: &Command, range: DocRange, editor: &mut EditorState) -> bool {
    let mut chain = editor.chain();
    chain.focus().delete_range(range);
    command.apply(&mut ExecutionContext {
        range,
        chain: &mut chain,
    });
    let applied = chain.run();

    if applied {
        tracing::info!(command = command.title(), from = range.from, to = range.to, "slash command executed");
    } else {
        tracing::warn!(command = command.title(), from = range.from, to = range.to, "slash command rejected");
    }
    applied
}
