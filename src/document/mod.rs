//! In-memory rich-text document model.
//!
//! A document is a flat list of textblocks. Positions are `usize` offsets
//! where every block contributes its characters plus one boundary position,
//! so block `i` spans `block_start(i)..=block_start(i) + len(i)`.

pub mod markdown;

use bitflags::bitflags;

bitflags! {
    /// Inline marks carried by each character.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Marks: u8 {
        const BOLD = 1;
        const ITALIC = 1 << 1;
        const CODE = 1 << 2;
    }
}

/// Document position (flat offset).
pub type Pos = usize;

/// Half-open span of document positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DocRange {
    pub from: Pos,
    pub to: Pos,
}

impl DocRange {
    pub fn new(from: Pos, to: Pos) -> Self {
        Self {
            from: from.min(to),
            to: from.max(to),
        }
    }

    pub fn len(&self) -> usize {
        self.to - self.from
    }

    pub fn is_empty(&self) -> bool {
        self.from == self.to
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Paragraph,
    Heading { level: u8 },
    BulletItem,
    Blockquote,
    CodeBlock,
}

impl BlockKind {
    /// Whether inline marks may be applied to content of this block.
    pub fn allows_marks(&self) -> bool {
        !matches!(self, BlockKind::CodeBlock)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StyledChar {
    pub ch: char,
    pub marks: Marks,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub kind: BlockKind,
    pub content: Vec<StyledChar>,
}

impl Block {
    pub fn new(kind: BlockKind) -> Self {
        Self {
            kind,
            content: Vec::new(),
        }
    }

    pub fn from_text(kind: BlockKind, text: &str) -> Self {
        Self {
            kind,
            content: text
                .chars()
                .map(|ch| StyledChar {
                    ch,
                    marks: Marks::empty(),
                })
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    pub fn text(&self) -> String {
        self.content.iter().map(|c| c.ch).collect()
    }

    /// Group content into runs of identical marks.
    pub fn runs(&self) -> Vec<(Marks, String)> {
        let mut runs: Vec<(Marks, String)> = Vec::new();
        for c in &self.content {
            match runs.last_mut() {
                Some((marks, text)) if *marks == c.marks => text.push(c.ch),
                _ => runs.push((c.marks, c.ch.to_string())),
            }
        }
        runs
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentError {
    PositionOutOfRange(Pos),
    InvalidRange(DocRange),
    NoBlock(usize),
}

impl std::fmt::Display for DocumentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DocumentError::PositionOutOfRange(pos) => {
                write!(f, "Position {} is outside the document", pos)
            }
            DocumentError::InvalidRange(range) => {
                write!(f, "Invalid range {}..{}", range.from, range.to)
            }
            DocumentError::NoBlock(index) => write!(f, "No block at index {}", index),
        }
    }
}

impl std::error::Error for DocumentError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    blocks: Vec<Block>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl Document {
    /// Create a document. An empty block list becomes a single empty paragraph.
    pub fn new(mut blocks: Vec<Block>) -> Self {
        if blocks.is_empty() {
            blocks.push(Block::new(BlockKind::Paragraph));
        }
        Self { blocks }
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn block(&self, index: usize) -> Option<&Block> {
        self.blocks.get(index)
    }

    /// Position of the first character slot of block `index`.
    pub fn block_start(&self, index: usize) -> Pos {
        self.blocks[..index.min(self.blocks.len())]
            .iter()
            .map(|b| b.len() + 1)
            .sum()
    }

    /// Largest valid position (end of the last block).
    pub fn end(&self) -> Pos {
        let last = self.blocks.len() - 1;
        self.block_start(last) + self.blocks[last].len()
    }

    /// Map a position to `(block index, offset within block)`.
    pub fn resolve(&self, pos: Pos) -> Result<(usize, usize), DocumentError> {
        let mut start = 0;
        for (index, block) in self.blocks.iter().enumerate() {
            if pos <= start + block.len() {
                return Ok((index, pos - start));
            }
            start += block.len() + 1;
        }
        Err(DocumentError::PositionOutOfRange(pos))
    }

    fn check_range(&self, range: DocRange) -> Result<((usize, usize), (usize, usize)), DocumentError> {
        if range.from > range.to {
            return Err(DocumentError::InvalidRange(range));
        }
        Ok((self.resolve(range.from)?, self.resolve(range.to)?))
    }

    /// Text covered by `range`, with block boundaries rendered as `\n`.
    pub fn text_between(&self, range: DocRange) -> Result<String, DocumentError> {
        let ((first, from), (last, to)) = self.check_range(range)?;
        let mut out = String::new();
        for index in first..=last {
            let block = &self.blocks[index];
            let start = if index == first { from } else { 0 };
            let end = if index == last { to } else { block.len() };
            out.extend(block.content[start..end].iter().map(|c| c.ch));
            if index != last {
                out.push('\n');
            }
        }
        Ok(out)
    }

    /// Marks of the character before `pos` (the ones typed text inherits).
    pub fn marks_at(&self, pos: Pos) -> Marks {
        match self.resolve(pos) {
            Ok((index, offset)) if offset > 0 => self.blocks[index].content[offset - 1].marks,
            _ => Marks::empty(),
        }
    }

    /// Insert single-line text at `pos`. Returns the position after the text.
    pub fn insert_text(&mut self, pos: Pos, text: &str, marks: Marks) -> Result<Pos, DocumentError> {
        let (index, offset) = self.resolve(pos)?;
        let block = &mut self.blocks[index];
        let marks = if block.kind.allows_marks() {
            marks
        } else {
            Marks::empty()
        };
        let chars: Vec<StyledChar> = text
            .chars()
            .filter(|ch| *ch != '\n' && *ch != '\r')
            .map(|ch| StyledChar { ch, marks })
            .collect();
        let inserted = chars.len();
        block.content.splice(offset..offset, chars);
        Ok(pos + inserted)
    }

    /// Remove the content of `range`, joining blocks when it crosses a boundary.
    pub fn delete_range(&mut self, range: DocRange) -> Result<(), DocumentError> {
        let ((first, from), (last, to)) = self.check_range(range)?;
        if first == last {
            self.blocks[first].content.drain(from..to);
            return Ok(());
        }
        let tail: Vec<StyledChar> = self.blocks[last].content[to..].to_vec();
        self.blocks[first].content.truncate(from);
        self.blocks[first].content.extend(tail);
        self.blocks.drain(first + 1..=last);
        Ok(())
    }

    /// Split the block at `pos`. Returns the position at the start of the new block.
    pub fn split_block(&mut self, pos: Pos) -> Result<Pos, DocumentError> {
        let (index, offset) = self.resolve(pos)?;
        let block = &mut self.blocks[index];
        let tail: Vec<StyledChar> = block.content.split_off(offset);
        let kind = match block.kind {
            BlockKind::Heading { .. } | BlockKind::Blockquote => BlockKind::Paragraph,
            other => other,
        };
        // Splitting mid-block keeps the kind for both halves.
        let kind = if tail.is_empty() { kind } else { block.kind };
        self.blocks.insert(index + 1, Block { kind, content: tail });
        Ok(pos + 1)
    }

    /// Merge block `index` into the previous one. Returns the join position.
    pub fn join_backward(&mut self, index: usize) -> Result<Pos, DocumentError> {
        if index == 0 || index >= self.blocks.len() {
            return Err(DocumentError::NoBlock(index));
        }
        let joined = self.block_start(index) - 1;
        let block = self.blocks.remove(index);
        self.blocks[index - 1].content.extend(block.content);
        Ok(joined)
    }

    pub fn set_block_kind(&mut self, index: usize, kind: BlockKind) -> Result<(), DocumentError> {
        let block = self
            .blocks
            .get_mut(index)
            .ok_or(DocumentError::NoBlock(index))?;
        block.kind = kind;
        if !kind.allows_marks() {
            for c in &mut block.content {
                c.marks = Marks::empty();
            }
        }
        Ok(())
    }

    /// Block texts joined with newlines.
    pub fn plain_text(&self) -> String {
        self.blocks
            .iter()
            .map(Block::text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(lines: &[&str]) -> Document {
        Document::new(
            lines
                .iter()
                .map(|l| Block::from_text(BlockKind::Paragraph, l))
                .collect(),
        )
    }

    #[test]
    fn empty_document_has_one_paragraph() {
        let d = Document::default();
        assert_eq!(d.blocks().len(), 1);
        assert_eq!(d.end(), 0);
    }

    #[test]
    fn resolve_positions_across_blocks() {
        let d = doc(&["ab", "cde"]);
        assert_eq!(d.resolve(0), Ok((0, 0)));
        assert_eq!(d.resolve(2), Ok((0, 2)));
        assert_eq!(d.resolve(3), Ok((1, 0)));
        assert_eq!(d.resolve(6), Ok((1, 3)));
        assert_eq!(d.resolve(7), Err(DocumentError::PositionOutOfRange(7)));
        assert_eq!(d.block_start(1), 3);
        assert_eq!(d.end(), 6);
    }

    #[test]
    fn delete_within_block() {
        let mut d = doc(&["hello /b"]);
        d.delete_range(DocRange::new(6, 8)).unwrap();
        assert_eq!(d.plain_text(), "hello ");
    }

    #[test]
    fn delete_across_blocks_joins() {
        let mut d = doc(&["abc", "def", "ghi"]);
        d.delete_range(DocRange::new(2, 9)).unwrap();
        assert_eq!(d.plain_text(), "abi");
        assert_eq!(d.blocks().len(), 1);
    }

    #[test]
    fn text_between_renders_boundaries() {
        let d = doc(&["abc", "def"]);
        assert_eq!(d.text_between(DocRange::new(1, 5)).unwrap(), "bc\nd");
    }

    #[test]
    fn split_heading_at_end_makes_paragraph() {
        let mut d = Document::new(vec![Block::from_text(BlockKind::Heading { level: 1 }, "Title")]);
        let pos = d.split_block(5).unwrap();
        assert_eq!(pos, 6);
        assert_eq!(d.blocks()[1].kind, BlockKind::Paragraph);
    }

    #[test]
    fn split_heading_in_middle_keeps_kind() {
        let mut d = Document::new(vec![Block::from_text(BlockKind::Heading { level: 2 }, "Title")]);
        d.split_block(2).unwrap();
        assert_eq!(d.blocks()[1].kind, BlockKind::Heading { level: 2 });
        assert_eq!(d.plain_text(), "Ti\ntle");
    }

    #[test]
    fn join_backward_merges() {
        let mut d = doc(&["ab", "cd"]);
        assert_eq!(d.join_backward(1), Ok(2));
        assert_eq!(d.plain_text(), "abcd");
        assert!(d.join_backward(0).is_err());
    }

    #[test]
    fn marks_and_inheritance() {
        let mut d = doc(&["ad"]);
        d.insert_text(1, "bc", Marks::BOLD).unwrap();
        assert_eq!(d.marks_at(3), Marks::BOLD);
        assert_eq!(d.marks_at(1), Marks::empty());
        assert_eq!(d.marks_at(4), Marks::empty());
        // Converting to a code block strips inline marks.
        d.set_block_kind(0, BlockKind::CodeBlock).unwrap();
        assert_eq!(d.marks_at(3), Marks::empty());
    }

    #[test]
    fn code_blocks_drop_marks() {
        let mut d = Document::new(vec![Block::new(BlockKind::CodeBlock)]);
        d.insert_text(0, "x", Marks::BOLD).unwrap();
        assert_eq!(d.marks_at(1), Marks::empty());
    }

    #[test]
    fn insert_strips_newlines() {
        let mut d = Document::default();
        let end = d.insert_text(0, "a\nb", Marks::empty()).unwrap();
        assert_eq!(end, 2);
        assert_eq!(d.plain_text(), "ab");
    }

    #[test]
    fn runs_group_marks() {
        let mut d = doc(&["ab"]);
        d.insert_text(2, "cd", Marks::ITALIC).unwrap();
        let runs = d.blocks()[0].runs();
        assert_eq!(
            runs,
            vec![
                (Marks::empty(), "ab".to_string()),
                (Marks::ITALIC, "cd".to_string())
            ]
        );
    }
}
