//! Document rendering and position geometry.
//!
//! Each block is drawn on one terminal line behind a kind-specific prefix.
//! Lines are not wrapped; the view scrolls horizontally to keep the caret
//! visible. Columns are display cells, so wide characters count twice.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::document::{Block, BlockKind, Document, Marks, Pos};

use super::EditorState;

/// Viewport placement of the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ViewGeometry {
    /// Screen area the document is drawn into.
    pub area: Rect,
    /// Index of the first visible block.
    pub scroll: u16,
    /// First visible display column.
    pub hscroll: u16,
}

pub fn block_prefix(kind: BlockKind) -> &'static str {
    match kind {
        BlockKind::Heading { level: 1 } => "═ ",
        BlockKind::Heading { level: 2 } => "▸ ",
        BlockKind::Heading { .. } => "  ",
        BlockKind::BulletItem => "  • ",
        BlockKind::Blockquote => "│ ",
        BlockKind::CodeBlock => "    ",
        BlockKind::Paragraph => "",
    }
}

fn prefix_width(kind: BlockKind) -> usize {
    block_prefix(kind).width()
}

fn char_width(ch: char) -> usize {
    UnicodeWidthChar::width(ch).unwrap_or(1)
}

/// Display column of `offset` within `block`, prefix included.
pub fn column_at(block: &Block, offset: usize) -> u16 {
    let column = prefix_width(block.kind)
        + block
            .content
            .iter()
            .take(offset)
            .map(|c| char_width(c.ch))
            .sum::<usize>();
    u16::try_from(column).unwrap_or(u16::MAX)
}

fn block_style(kind: BlockKind) -> Style {
    match kind {
        // H1: bright cyan
        BlockKind::Heading { level: 1 } => Style::default()
            .fg(Color::LightCyan)
            .add_modifier(Modifier::BOLD),
        // H2: cyan bold
        BlockKind::Heading { level: 2 } => Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
        BlockKind::Heading { .. } => Style::default().fg(Color::DarkGray),
        BlockKind::Blockquote => Style::default()
            .fg(Color::Gray)
            .add_modifier(Modifier::ITALIC),
        BlockKind::CodeBlock => Style::default().fg(Color::Green),
        BlockKind::BulletItem | BlockKind::Paragraph => Style::default(),
    }
}

fn prefix_style(kind: BlockKind) -> Style {
    match kind {
        BlockKind::BulletItem => Style::default().fg(Color::Yellow),
        BlockKind::Blockquote => Style::default().fg(Color::DarkGray),
        _ => block_style(kind),
    }
}

fn marks_style(base: Style, marks: Marks) -> Style {
    let mut style = base;
    if marks.contains(Marks::BOLD) {
        style = style.add_modifier(Modifier::BOLD);
    }
    if marks.contains(Marks::ITALIC) {
        style = style.add_modifier(Modifier::ITALIC);
    }
    if marks.contains(Marks::CODE) {
        style = style.fg(Color::Magenta);
    }
    style
}

/// Styled terminal line for one block.
pub fn render_block(block: &Block) -> Line<'static> {
    let base = block_style(block.kind);
    let mut spans = vec![Span::styled(
        block_prefix(block.kind).to_string(),
        prefix_style(block.kind),
    )];
    spans.extend(
        block
            .runs()
            .into_iter()
            .map(|(marks, text)| Span::styled(text, marks_style(base, marks))),
    );
    Line::from(spans)
}

pub fn render_document(frame: &mut Frame, area: Rect, state: &EditorState) {
    let geometry = state.geometry();
    let lines: Vec<Line> = state
        .doc()
        .blocks()
        .iter()
        .skip(geometry.scroll as usize)
        .take(area.height as usize)
        .map(render_block)
        .collect();
    frame.render_widget(Paragraph::new(lines).scroll((0, geometry.hscroll)), area);
}

/// Screen cell of `pos`; `None` when the position is invalid or scrolled out.
pub fn coords_at_pos(doc: &Document, geometry: ViewGeometry, pos: Pos) -> Option<Rect> {
    let (index, offset) = doc.resolve(pos).ok()?;
    let row = u16::try_from(index).ok()?;
    let area = geometry.area;
    if row < geometry.scroll || row - geometry.scroll >= area.height {
        return None;
    }
    let column = column_at(doc.block(index)?, offset);
    if column < geometry.hscroll || column - geometry.hscroll >= area.width {
        return None;
    }
    Some(Rect::new(
        area.x + column - geometry.hscroll,
        area.y + row - geometry.scroll,
        1,
        1,
    ))
}

/// Document position under a screen cell, clamped to the clicked line.
pub fn pos_at_coords(doc: &Document, geometry: ViewGeometry, column: u16, row: u16) -> Option<Pos> {
    let area = geometry.area;
    if column < area.x || column >= area.right() || row < area.y || row >= area.bottom() {
        return None;
    }
    let index = (geometry.scroll + (row - area.y)) as usize;
    let Some(block) = doc.block(index) else {
        return Some(doc.end());
    };
    let target = usize::from(column - area.x) + usize::from(geometry.hscroll);
    let mut cell = prefix_width(block.kind);
    let mut offset = 0;
    // A click anywhere on a wide character lands before it.
    for c in &block.content {
        let width = char_width(c.ch);
        if cell + width > target {
            break;
        }
        cell += width;
        offset += 1;
    }
    Some(doc.block_start(index) + offset)
}
