//! Chainable document edits.
//!
//! Steps are staged on a `ChainedCommands` and applied together by `run()`.
//! Either every step succeeds and the result is committed as a single undo
//! step, or nothing changes.

use crate::document::{BlockKind, DocRange, Document, DocumentError, Marks, Pos};

use super::EditorState;
use super::history::Snapshot;

#[derive(Debug, Clone, PartialEq)]
enum Step {
    Focus,
    SetCaret(Pos),
    DeleteRange(DocRange),
    InsertText(String),
    SplitBlock,
    DeleteBackward,
    DeleteForward,
    SetNode(BlockKind),
    SetMark(Marks),
    ToggleMark(Marks),
}

/// Working copy the steps are applied to.
struct Draft {
    doc: Document,
    caret: Pos,
    stored_marks: Option<Marks>,
    focused: bool,
    changed: bool,
}

impl Draft {
    fn current_marks(&self) -> Marks {
        self.stored_marks
            .unwrap_or_else(|| self.doc.marks_at(self.caret))
    }

    fn apply(&mut self, step: &Step) -> Result<(), DocumentError> {
        match step {
            Step::Focus => self.focused = true,
            Step::SetCaret(pos) => {
                if *pos > self.doc.end() {
                    return Err(DocumentError::PositionOutOfRange(*pos));
                }
                self.caret = *pos;
                self.stored_marks = None;
            }
            Step::DeleteRange(range) => {
                self.doc.delete_range(*range)?;
                if self.caret >= range.to {
                    self.caret -= range.len();
                } else if self.caret > range.from {
                    self.caret = range.from;
                }
                self.changed = true;
            }
            Step::InsertText(text) => {
                let marks = self.current_marks();
                self.caret = self.doc.insert_text(self.caret, text, marks)?;
                self.stored_marks = None;
                self.changed = true;
            }
            Step::SplitBlock => {
                self.caret = self.doc.split_block(self.caret)?;
                self.stored_marks = None;
                self.changed = true;
            }
            Step::DeleteBackward => {
                let (index, offset) = self.doc.resolve(self.caret)?;
                if offset > 0 {
                    self.doc
                        .delete_range(DocRange::new(self.caret - 1, self.caret))?;
                    self.caret -= 1;
                } else if self.doc.blocks()[index].kind != BlockKind::Paragraph {
                    self.doc.set_block_kind(index, BlockKind::Paragraph)?;
                } else if index > 0 {
                    self.caret = self.doc.join_backward(index)?;
                } else {
                    return Ok(());
                }
                self.stored_marks = None;
                self.changed = true;
            }
            Step::DeleteForward => {
                let (index, offset) = self.doc.resolve(self.caret)?;
                if offset < self.doc.blocks()[index].len() {
                    self.doc
                        .delete_range(DocRange::new(self.caret, self.caret + 1))?;
                } else if index + 1 < self.doc.blocks().len() {
                    self.doc.join_backward(index + 1)?;
                } else {
                    return Ok(());
                }
                self.changed = true;
            }
            Step::SetNode(kind) => {
                let (index, _) = self.doc.resolve(self.caret)?;
                self.doc.set_block_kind(index, *kind)?;
                self.changed = true;
            }
            Step::SetMark(marks) => {
                self.stored_marks = Some(self.current_marks() | *marks);
            }
            Step::ToggleMark(marks) => {
                let current = self.current_marks();
                self.stored_marks = Some(if current.contains(*marks) {
                    current - *marks
                } else {
                    current | *marks
                });
            }
        }
        Ok(())
    }
}

/// Staged edit against an `EditorState`, built with `EditorState::chain`.
pub struct ChainedCommands<'a> {
    state: &'a mut EditorState,
    steps: Vec<Step>,
}

impl<'a> ChainedCommands<'a> {
    pub(super) fn new(state: &'a mut EditorState) -> Self {
        Self {
            state,
            steps: Vec::new(),
        }
    }

    fn push(&mut self, step: Step) -> &mut Self {
        self.steps.push(step);
        self
    }

    /// Return input focus to the document.
    pub fn focus(&mut self) -> &mut Self {
        self.push(Step::Focus)
    }

    pub fn set_caret(&mut self, pos: Pos) -> &mut Self {
        self.push(Step::SetCaret(pos))
    }

    pub fn delete_range(&mut self, range: DocRange) -> &mut Self {
        self.push(Step::DeleteRange(range))
    }

    /// Insert text at the caret using the stored or inherited marks.
    pub fn insert_text(&mut self, text: &str) -> &mut Self {
        self.push(Step::InsertText(text.to_string()))
    }

    pub fn split_block(&mut self) -> &mut Self {
        self.push(Step::SplitBlock)
    }

    pub fn delete_backward(&mut self) -> &mut Self {
        self.push(Step::DeleteBackward)
    }

    pub fn delete_forward(&mut self) -> &mut Self {
        self.push(Step::DeleteForward)
    }

    /// Change the kind of the block holding the caret.
    pub fn set_node(&mut self, kind: BlockKind) -> &mut Self {
        self.push(Step::SetNode(kind))
    }

    /// Activate marks for the next typed text.
    pub fn set_mark(&mut self, marks: Marks) -> &mut Self {
        self.push(Step::SetMark(marks))
    }

    pub fn toggle_mark(&mut self, marks: Marks) -> &mut Self {
        self.push(Step::ToggleMark(marks))
    }

    /// Apply all staged steps atomically. Returns false (and leaves the
    /// editor untouched) if any step fails.
    pub fn run(&mut self) -> bool {
        let steps = std::mem::take(&mut self.steps);
        let mut draft = Draft {
            doc: self.state.doc.clone(),
            caret: self.state.caret,
            stored_marks: self.state.stored_marks,
            focused: self.state.focused,
            changed: false,
        };

        for step in &steps {
            if let Err(e) = draft.apply(step) {
                tracing::warn!(error = %e, step = ?step, "edit rejected");
                return false;
            }
        }

        if draft.changed {
            let before = Snapshot {
                doc: std::mem::replace(&mut self.state.doc, draft.doc),
                caret: self.state.caret,
            };
            self.state.history.record(before);
            self.state.version += 1;
        }
        self.state.caret = draft.caret;
        self.state.stored_marks = draft.stored_marks;
        self.state.focused = draft.focused;
        self.state.scroll_into_view();
        true
    }
}
