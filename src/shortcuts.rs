//! Keyboard shortcuts and status bar hints.

use std::borrow::Cow;

/// Where a shortcut applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShortcutContext {
    /// Typing in the document
    Editing,
    /// Slash menu open
    Menu,
}

/// All keyboard shortcuts in the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shortcut {
    // Editing
    OpenSlashMenu,
    Undo,
    Redo,
    ToggleBold,
    ToggleItalic,
    Quit,

    // Menu
    MenuUp,
    MenuDown,
    MenuRun,
    MenuDismiss,
}

impl Shortcut {
    pub fn all() -> Vec<Self> {
        vec![
            Self::OpenSlashMenu,
            Self::Undo,
            Self::Redo,
            Self::ToggleBold,
            Self::ToggleItalic,
            Self::Quit,
            Self::MenuUp,
            Self::MenuDown,
            Self::MenuRun,
            Self::MenuDismiss,
        ]
    }

    /// Human-readable key representation. The menu opens on whatever
    /// trigger character is configured.
    pub fn key_display(&self, trigger: char) -> Cow<'static, str> {
        let key = match self {
            Self::OpenSlashMenu => return Cow::Owned(trigger.to_string()),
            Self::Undo => "Ctrl+Z",
            Self::Redo => "Ctrl+Y",
            Self::ToggleBold => "Ctrl+B",
            Self::ToggleItalic => "Ctrl+I",
            Self::Quit => "Ctrl+Q",
            Self::MenuUp => "\u{2191}",
            Self::MenuDown => "\u{2193}",
            Self::MenuRun => "Enter",
            Self::MenuDismiss => "Esc",
        };
        Cow::Borrowed(key)
    }

    /// Short description for status bar.
    pub fn short_desc(&self) -> &'static str {
        match self {
            Self::OpenSlashMenu => "commands",
            Self::Undo => "undo",
            Self::Redo => "redo",
            Self::ToggleBold => "bold",
            Self::ToggleItalic => "italic",
            Self::Quit => "quit",
            Self::MenuUp => "prev",
            Self::MenuDown => "next",
            Self::MenuRun => "run",
            Self::MenuDismiss => "close",
        }
    }

    pub fn contexts(&self) -> &'static [ShortcutContext] {
        match self {
            Self::OpenSlashMenu
            | Self::Undo
            | Self::Redo
            | Self::ToggleBold
            | Self::ToggleItalic => &[ShortcutContext::Editing],
            Self::Quit => &[ShortcutContext::Editing, ShortcutContext::Menu],
            Self::MenuUp | Self::MenuDown | Self::MenuRun | Self::MenuDismiss => &[ShortcutContext::Menu],
        }
    }
}

/// Shortcuts available in a context, in declaration order.
pub fn shortcuts_for_context(context: ShortcutContext) -> Vec<Shortcut> {
    Shortcut::all()
        .into_iter()
        .filter(|s| s.contexts().contains(&context))
        .collect()
}

/// Format status bar string from shortcuts.
pub fn format_status_bar(context: ShortcutContext, trigger: char, prefix: &str) -> String {
    let hints: Vec<String> = shortcuts_for_context(context)
        .iter()
        .map(|s| format!("{} {}", s.key_display(trigger), s.short_desc()))
        .collect();

    if prefix.is_empty() {
        format!(" {} ", hints.join(" \u{2502} "))
    } else {
        format!(" {} \u{2502} {} ", prefix, hints.join(" \u{2502} "))
    }
}
