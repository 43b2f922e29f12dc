//! Markdown-ish loader for initial document content.

use std::sync::LazyLock;

use regex::Regex;

use super::{Block, BlockKind, Document, Marks, StyledChar};

static INLINE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\*\*([^*]+)\*\*|\*([^*]+)\*|`([^`]+)`").expect("inline markdown regex")
});

/// Parse markdown-ish text into a document, one block per line.
pub fn parse_document(content: &str) -> Document {
    let mut blocks = Vec::new();
    let mut in_code = false;

    for line in content.lines() {
        let trimmed = line.trim_end();

        if trimmed.trim_start().starts_with("```") {
            in_code = !in_code;
            continue;
        }
        if in_code {
            blocks.push(Block::from_text(BlockKind::CodeBlock, trimmed));
            continue;
        }

        let trimmed = trimmed.trim_start();
        if trimmed.is_empty() {
            continue;
        }

        let (kind, rest) = if let Some(h3) = trimmed.strip_prefix("### ") {
            (BlockKind::Heading { level: 3 }, h3)
        } else if let Some(h2) = trimmed.strip_prefix("## ") {
            (BlockKind::Heading { level: 2 }, h2)
        } else if let Some(h1) = trimmed.strip_prefix("# ") {
            (BlockKind::Heading { level: 1 }, h1)
        } else if let Some(item) = trimmed
            .strip_prefix("- ")
            .or_else(|| trimmed.strip_prefix("* "))
        {
            (BlockKind::BulletItem, item)
        } else if let Some(quote) = trimmed.strip_prefix("> ") {
            (BlockKind::Blockquote, quote)
        } else {
            (BlockKind::Paragraph, trimmed)
        };

        blocks.push(Block {
            kind,
            content: parse_inline(rest),
        });
    }

    Document::new(blocks)
}

/// Parse `**bold**`, `*italic*` and `` `code` `` spans into styled characters.
pub fn parse_inline(text: &str) -> Vec<StyledChar> {
    let mut out = Vec::new();
    let mut last_end = 0;

    let push = |out: &mut Vec<StyledChar>, s: &str, marks: Marks| {
        out.extend(s.chars().map(|ch| StyledChar { ch, marks }));
    };

    for cap in INLINE_REGEX.captures_iter(text) {
        let Some(full) = cap.get(0) else { continue };
        if full.start() > last_end {
            push(&mut out, &text[last_end..full.start()], Marks::empty());
        }
        if let Some(bold) = cap.get(1) {
            push(&mut out, bold.as_str(), Marks::BOLD);
        } else if let Some(italic) = cap.get(2) {
            push(&mut out, italic.as_str(), Marks::ITALIC);
        } else if let Some(code) = cap.get(3) {
            push(&mut out, code.as_str(), Marks::CODE);
        }
        last_end = full.end();
    }

    if last_end < text.len() {
        push(&mut out, &text[last_end..], Marks::empty());
    }
    out
}

/// Seed content shown when no file is given.
pub fn welcome_document() -> Document {
    parse_document(
        "# Welcome to slashpad\n\
         This is a **basic example** of the editor with some initial content. \
         You can start typing here or use slash commands to format your text.\n\
         ## Features\n\
         - Use `/` to access slash commands\n\
         - Basic text formatting (bold, italic, etc.)\n\
         - Headings\n\
         - Lists\n\
         > Try out different styles and formatting options!\n\
         Happy editing! 🎉\n",
    )
}
