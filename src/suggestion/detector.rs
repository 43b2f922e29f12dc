//! Trigger detection state machine.

use crate::document::{DocRange, Document, Pos};

/// A trigger character followed by the query typed so far.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestionMatch {
    /// Trigger character through the caret.
    pub range: DocRange,
    /// Text typed after the trigger.
    pub query: String,
    /// Trigger plus query.
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SuggestionState {
    #[default]
    Idle,
    Active { range: DocRange, query: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    Start(SuggestionMatch),
    Update(SuggestionMatch),
    Exit,
}

/// Find a trigger match ending at `caret`.
///
/// The trigger must sit at the start of its block or right after whitespace,
/// and nothing between it and the caret may be whitespace.
pub fn find_suggestion_match(trigger: char, doc: &Document, caret: Pos) -> Option<SuggestionMatch> {
    let (index, offset) = doc.resolve(caret).ok()?;
    let content = &doc.block(index)?.content;

    let mut start = offset;
    loop {
        if start == 0 {
            return None;
        }
        let ch = content[start - 1].ch;
        if ch == trigger {
            start -= 1;
            break;
        }
        if ch.is_whitespace() {
            return None;
        }
        start -= 1;
    }

    if start > 0 && !content[start - 1].ch.is_whitespace() {
        return None;
    }

    let block_start = doc.block_start(index);
    let range = DocRange::new(block_start + start, block_start + offset);
    let text = doc.text_between(range).ok()?;
    let query = text.chars().skip(1).collect();
    Some(SuggestionMatch { range, query, text })
}

#[derive(Debug)]
pub struct TriggerDetector {
    trigger: char,
    state: SuggestionState,
    /// Trigger position of a session that was explicitly exited.
    dismissed: Option<Pos>,
}

impl TriggerDetector {
    pub fn new(trigger: char) -> Self {
        Self {
            trigger,
            state: SuggestionState::Idle,
            dismissed: None,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, SuggestionState::Active { .. })
    }

    /// Re-derive the session from the current document and caret.
    pub fn observe(&mut self, doc: &Document, caret: Pos) -> Vec<Transition> {
        let found = find_suggestion_match(self.trigger, doc, caret);

        let found = match (found, self.dismissed) {
            (Some(m), Some(dismissed)) if m.range.from == dismissed => None,
            (found, _) => {
                self.dismissed = None;
                found
            }
        };

        let mut transitions = Vec::new();
        match (&self.state, found) {
            (SuggestionState::Idle, None) => {}
            (SuggestionState::Idle, Some(m)) => {
                self.activate(&m);
                transitions.push(Transition::Start(m));
            }
            (SuggestionState::Active { .. }, None) => {
                self.state = SuggestionState::Idle;
                transitions.push(Transition::Exit);
            }
            (SuggestionState::Active { range, query }, Some(m)) => {
                if range.from != m.range.from {
                    transitions.push(Transition::Exit);
                    self.activate(&m);
                    transitions.push(Transition::Start(m));
                } else if *range != m.range || *query != m.query {
                    self.activate(&m);
                    transitions.push(Transition::Update(m));
                }
            }
        }
        transitions
    }

    /// End the active session explicitly. The same trigger stays closed until
    /// the caret leaves it or it is removed.
    pub fn dismiss(&mut self) -> Option<Transition> {
        match std::mem::take(&mut self.state) {
            SuggestionState::Active { range, .. } => {
                self.dismissed = Some(range.from);
                Some(Transition::Exit)
            }
            SuggestionState::Idle => None,
        }
    }

    fn activate(&mut self, m: &SuggestionMatch) {
        self.state = SuggestionState::Active {
            range: m.range,
            query: m.query.clone(),
        };
    }
}
