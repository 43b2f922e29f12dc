//! Slash command definitions and filtering.

use std::fmt;
use std::rc::Rc;

use crate::document::{BlockKind, DocRange, Marks};
use crate::editor::ChainedCommands;

/// What a command sees when it runs: the trigger range and the staged edit
/// it should extend. The range has already been queued for deletion.
pub struct ExecutionContext<'c, 'a> {
    pub range: DocRange,
    pub chain: &'c mut ChainedCommands<'a>,
}

pub type ApplyFn = Rc<dyn Fn(&mut ExecutionContext<'_, '_>)>;

/// A named document transformation offered in the menu.
#[derive(Clone)]
pub struct Command {
    title: String,
    apply: ApplyFn,
}

impl Command {
    pub fn new(title: impl Into<String>, apply: impl Fn(&mut ExecutionContext<'_, '_>) + 'static) -> Self {
        Self {
            title: title.into(),
            apply: Rc::new(apply),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn apply(&self, ctx: &mut ExecutionContext<'_, '_>) {
        (self.apply)(ctx)
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command").field("title", &self.title).finish()
    }
}

/// Commands are identified by title.
impl PartialEq for Command {
    fn eq(&self, other: &Self) -> bool {
        self.title == other.title
    }
}

impl Eq for Command {}

fn heading(level: u8) -> Command {
    Command::new(format!("H{}", level), move |ctx| {
        ctx.chain.set_node(BlockKind::Heading { level });
    })
}

fn mark(title: &str, marks: Marks) -> Command {
    Command::new(title, move |ctx| {
        ctx.chain.set_mark(marks);
    })
}

/// Ordered, fixed set of commands.
#[derive(Debug, Clone)]
pub struct CommandRegistry {
    commands: Vec<Command>,
}

impl CommandRegistry {
    pub fn new(commands: Vec<Command>) -> Self {
        Self { commands }
    }

    /// H1, H2, Bold, Italic.
    pub fn builtins() -> Self {
        Self::new(vec![
            heading(1),
            heading(2),
            mark("Bold", Marks::BOLD),
            mark("Italic", Marks::ITALIC),
        ])
    }

    /// Commands whose title contains `query`, case-insensitively, in
    /// declaration order.
    pub fn filter(&self, query: &str) -> Vec<Command> {
        if query.is_empty() {
            self.commands.clone()
        } else {
            let query_lower = query.to_lowercase();
            self.commands
                .iter()
                .filter(|cmd| cmd.title.to_lowercase().contains(&query_lower))
                .cloned()
                .collect()
        }
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::builtins()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn titles(commands: &[Command]) -> Vec<&str> {
        commands.iter().map(Command::title).collect()
    }

    #[test]
    fn filter_by_substring() {
        let registry = CommandRegistry::builtins();
        assert_eq!(titles(&registry.filter("h")), vec!["H1", "H2"]);
    }

    #[test]
    fn filter_empty_returns_all() {
        let registry = CommandRegistry::builtins();
        assert_eq!(titles(&registry.filter("")), vec!["H1", "H2", "Bold", "Italic"]);
    }

    #[test]
    fn filter_no_match() {
        let registry = CommandRegistry::builtins();
        assert!(registry.filter("xyz").is_empty());
        assert!(registry.filter("h1 ").is_empty());
    }

    #[test]
    fn filter_is_case_insensitive() {
        let registry = CommandRegistry::builtins();
        assert_eq!(titles(&registry.filter("BO")), vec!["Bold"]);
        assert_eq!(titles(&registry.filter("tal")), vec!["Italic"]);
        assert_eq!(titles(&registry.filter("h1")), vec!["H1"]);
    }

    #[test]
    fn filter_keeps_declaration_order() {
        let registry = CommandRegistry::new(vec![
            Command::new("Zeta list", |_| {}),
            Command::new("Alpha list", |_| {}),
            Command::new("Other", |_| {}),
        ]);
        assert_eq!(titles(&registry.filter("LIST")), vec!["Zeta list", "Alpha list"]);
    }

    #[test]
    fn commands_compare_by_title() {
        assert_eq!(Command::new("A", |_| {}), Command::new("A", |_| {}));
        assert_ne!(Command::new("A", |_| {}), Command::new("B", |_| {}));
    }
}
