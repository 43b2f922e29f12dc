//! Snapshot-based undo/redo.

use std::collections::VecDeque;

use crate::document::{Document, Pos};

pub const DEFAULT_HISTORY_DEPTH: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub doc: Document,
    pub caret: Pos,
}

#[derive(Debug)]
pub struct History {
    undo: VecDeque<Snapshot>,
    redo: Vec<Snapshot>,
    depth: usize,
}

impl History {
    pub fn new(depth: usize) -> Self {
        Self {
            undo: VecDeque::new(),
            redo: Vec::new(),
            depth: depth.max(1),
        }
    }

    /// Record the state before a committed edit. Clears the redo stack.
    pub fn record(&mut self, before: Snapshot) {
        self.undo.push_back(before);
        while self.undo.len() > self.depth {
            self.undo.pop_front();
        }
        self.redo.clear();
    }

    pub fn undo(&mut self, current: Snapshot) -> Option<Snapshot> {
        let previous = self.undo.pop_back()?;
        self.redo.push(current);
        Some(previous)
    }

    pub fn redo(&mut self, current: Snapshot) -> Option<Snapshot> {
        let next = self.redo.pop()?;
        self.undo.push_back(current);
        Some(next)
    }

    pub fn undo_depth(&self) -> usize {
        self.undo.len()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_DEPTH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Block, BlockKind};

    fn snap(text: &str) -> Snapshot {
        Snapshot {
            doc: Document::new(vec![Block::from_text(BlockKind::Paragraph, text)]),
            caret: text.chars().count(),
        }
    }

    #[test]
    fn undo_then_redo() {
        let mut history = History::new(10);
        history.record(snap("a"));
        let restored = history.undo(snap("ab")).unwrap();
        assert_eq!(restored, snap("a"));
        assert!(history.can_redo());
        let again = history.redo(snap("a")).unwrap();
        assert_eq!(again, snap("ab"));
    }

    #[test]
    fn record_clears_redo() {
        let mut history = History::new(10);
        history.record(snap("a"));
        history.undo(snap("ab"));
        history.record(snap("a"));
        assert!(!history.can_redo());
    }

    #[test]
    fn depth_is_bounded() {
        let mut history = History::new(2);
        history.record(snap("a"));
        history.record(snap("b"));
        history.record(snap("c"));
        assert_eq!(history.undo_depth(), 2);
        assert_eq!(history.undo(snap("d")), Some(snap("c")));
        assert_eq!(history.undo(snap("c")), Some(snap("b")));
        assert_eq!(history.undo(snap("b")), None);
    }
}
