//! Editor core: state, plugins and the built-in keymap.
//!
//! - `commands`: chainable atomic edits
//! - `history`: undo/redo snapshots
//! - `view`: terminal rendering and position geometry

pub mod commands;
pub mod history;
pub mod view;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::Frame;
use ratatui::layout::Rect;

use crate::document::{DocRange, Document, Marks, Pos};

pub use commands::ChainedCommands;
use history::{History, Snapshot};
pub use view::ViewGeometry;

/// Editor state shared with plugins.
pub struct EditorState {
    doc: Document,
    caret: Pos,
    stored_marks: Option<Marks>,
    focused: bool,
    history: History,
    geometry: ViewGeometry,
    version: u64,
}

impl EditorState {
    pub fn new(doc: Document, history_depth: usize) -> Self {
        Self {
            doc,
            caret: 0,
            stored_marks: None,
            focused: true,
            history: History::new(history_depth),
            geometry: ViewGeometry::default(),
            version: 0,
        }
    }

    pub fn doc(&self) -> &Document {
        &self.doc
    }

    pub fn caret(&self) -> Pos {
        self.caret
    }

    /// Marks that the next typed text will carry, if explicitly set.
    pub fn stored_marks(&self) -> Option<Marks> {
        self.stored_marks
    }

    /// Marks the next typed text will carry.
    pub fn active_marks(&self) -> Marks {
        self.stored_marks
            .unwrap_or_else(|| self.doc.marks_at(self.caret))
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    /// Incremented on every committed document change.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn geometry(&self) -> ViewGeometry {
        self.geometry
    }

    pub fn chain(&mut self) -> ChainedCommands<'_> {
        ChainedCommands::new(self)
    }

    pub fn undo(&mut self) -> bool {
        let current = Snapshot {
            doc: self.doc.clone(),
            caret: self.caret,
        };
        match self.history.undo(current) {
            Some(previous) => {
                self.restore(previous);
                tracing::debug!(remaining = self.history.undo_depth(), "undo");
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        let current = Snapshot {
            doc: self.doc.clone(),
            caret: self.caret,
        };
        match self.history.redo(current) {
            Some(next) => {
                self.restore(next);
                tracing::debug!(more = self.history.can_redo(), "redo");
                true
            }
            None => false,
        }
    }

    fn restore(&mut self, snapshot: Snapshot) {
        self.doc = snapshot.doc;
        self.caret = snapshot.caret.min(self.doc.end());
        self.stored_marks = None;
        self.version += 1;
        self.scroll_into_view();
    }

    pub fn set_viewport(&mut self, area: Rect) {
        self.geometry.area = area;
        self.scroll_into_view();
    }

    /// Adjust both scroll offsets so the caret's cell is visible.
    pub fn scroll_into_view(&mut self) {
        let Rect { width, height, .. } = self.geometry.area;
        if width == 0 || height == 0 {
            return;
        }
        let Ok((index, offset)) = self.doc.resolve(self.caret) else {
            return;
        };
        let row = u16::try_from(index).unwrap_or(u16::MAX);
        if row < self.geometry.scroll {
            self.geometry.scroll = row;
        } else if row >= self.geometry.scroll.saturating_add(height) {
            self.geometry.scroll = row + 1 - height;
        }

        let Some(block) = self.doc.block(index) else {
            return;
        };
        let column = view::column_at(block, offset);
        if column < self.geometry.hscroll {
            self.geometry.hscroll = column;
        } else if column >= self.geometry.hscroll.saturating_add(width) {
            self.geometry.hscroll = column + 1 - width;
        }
    }

    /// Screen cell of `pos`, if it is inside the viewport.
    pub fn coords_at_pos(&self, pos: Pos) -> Option<Rect> {
        view::coords_at_pos(&self.doc, self.geometry, pos)
    }

    /// Screen rectangle covering `range` (clipped to one line).
    pub fn coords_for_range(&self, range: DocRange) -> Option<Rect> {
        let start = self.coords_at_pos(range.from)?;
        let (index, from) = self.doc.resolve(range.from).ok()?;
        let block = self.doc.block(index)?;
        let to = (from + range.len()).min(block.len());
        let span = view::column_at(block, to).saturating_sub(view::column_at(block, from));
        let right = self.geometry.area.right();
        let width = span.max(1).min(right.saturating_sub(start.x).max(1));
        Some(Rect::new(start.x, start.y, width, 1))
    }

    pub fn pos_at_coords(&self, column: u16, row: u16) -> Option<Pos> {
        view::pos_at_coords(&self.doc, self.geometry, column, row)
    }

    fn caret_row_offset(&self) -> Option<(usize, usize)> {
        self.doc.resolve(self.caret).ok()
    }

    fn vertical_target(&self, down: bool) -> Option<Pos> {
        let (row, offset) = self.caret_row_offset()?;
        let target = if down {
            row + 1
        } else {
            row.checked_sub(1)?
        };
        let block = self.doc.block(target)?;
        Some(self.doc.block_start(target) + offset.min(block.len()))
    }

    fn line_bounds(&self) -> Option<(Pos, Pos)> {
        let (row, _) = self.caret_row_offset()?;
        let start = self.doc.block_start(row);
        let len = self.doc.block(row)?.len();
        Some((start, start + len))
    }
}

/// Hooks a plugin can attach to the editor.
///
/// Plugins see key and mouse events before the editor's own keymap; returning
/// `true` stops propagation.
pub trait Plugin {
    fn name(&self) -> &str;

    /// Called after every handled event with the resulting state.
    fn view_update(&mut self, _state: &EditorState) {}

    fn handle_key_down(&mut self, _state: &mut EditorState, _event: &KeyEvent) -> bool {
        false
    }

    fn handle_mouse_down(&mut self, _state: &mut EditorState, _event: &MouseEvent) -> bool {
        false
    }

    fn render_overlay(&self, _frame: &mut Frame, _state: &EditorState) {}

    /// Whether the plugin currently shows transient UI.
    fn is_active(&self) -> bool {
        false
    }

    /// Release any UI the plugin holds.
    fn destroy(&mut self) {}
}

/// A named bundle of plugins.
pub trait Extension {
    fn name(&self) -> &str;
    fn into_plugins(self: Box<Self>) -> Vec<Box<dyn Plugin>>;
}

pub struct EditorOptions {
    pub content: Document,
    pub extensions: Vec<Box<dyn Extension>>,
    pub history_depth: usize,
}

impl Default for EditorOptions {
    fn default() -> Self {
        Self {
            content: Document::default(),
            extensions: Vec::new(),
            history_depth: history::DEFAULT_HISTORY_DEPTH,
        }
    }
}

pub struct Editor {
    state: EditorState,
    plugins: Vec<Box<dyn Plugin>>,
}

impl Editor {
    pub fn new(options: EditorOptions) -> Self {
        let mut plugins = Vec::new();
        for extension in options.extensions {
            tracing::debug!(extension = extension.name(), "registering extension");
            plugins.extend(extension.into_plugins());
        }
        let mut editor = Self {
            state: EditorState::new(options.content, options.history_depth),
            plugins,
        };
        editor.notify();
        editor
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut EditorState {
        &mut self.state
    }

    /// Whether any plugin is showing transient UI (e.g. a suggestion menu).
    pub fn has_active_plugin(&self) -> bool {
        self.plugins.iter().any(|p| p.is_active())
    }

    /// Dispatch a key event through plugins, then the built-in keymap.
    pub fn handle_key(&mut self, event: KeyEvent) -> bool {
        let mut handled = false;
        for plugin in self.plugins.iter_mut() {
            if plugin.handle_key_down(&mut self.state, &event) {
                tracing::trace!(plugin = plugin.name(), code = ?event.code, "key consumed by plugin");
                handled = true;
                break;
            }
        }
        if !handled {
            handled = self.handle_builtin_key(&event);
        }
        self.notify();
        handled
    }

    pub fn handle_mouse(&mut self, event: MouseEvent) -> bool {
        if !matches!(event.kind, MouseEventKind::Down(MouseButton::Left)) {
            return false;
        }
        let mut handled = false;
        for plugin in self.plugins.iter_mut() {
            if plugin.handle_mouse_down(&mut self.state, &event) {
                handled = true;
                break;
            }
        }
        if !handled && let Some(pos) = self.state.pos_at_coords(event.column, event.row) {
            handled = self.state.chain().focus().set_caret(pos).run();
        }
        self.notify();
        handled
    }

    pub fn resize(&mut self, area: Rect) {
        if self.state.geometry.area != area {
            self.state.set_viewport(area);
            self.notify();
        }
    }

    /// Render the document into `area`, then plugin overlays over the frame.
    pub fn draw(&mut self, frame: &mut Frame, area: Rect) {
        self.resize(area);
        view::render_document(frame, area, &self.state);
        if self.state.focused
            && let Some(caret) = self.state.coords_at_pos(self.state.caret)
        {
            frame.set_cursor_position((caret.x, caret.y));
        }
        for plugin in &self.plugins {
            plugin.render_overlay(frame, &self.state);
        }
    }

    fn notify(&mut self) {
        for plugin in self.plugins.iter_mut() {
            plugin.view_update(&self.state);
        }
    }

    fn handle_builtin_key(&mut self, event: &KeyEvent) -> bool {
        let ctrl = event.modifiers.contains(KeyModifiers::CONTROL);
        let alt = event.modifiers.contains(KeyModifiers::ALT);
        let shift = event.modifiers.contains(KeyModifiers::SHIFT);
        let state = &mut self.state;

        match event.code {
            KeyCode::Char('z') | KeyCode::Char('Z') if ctrl => {
                if shift { state.redo() } else { state.undo() }
            }
            KeyCode::Char('y') if ctrl => state.redo(),
            KeyCode::Char('b') if ctrl => state.chain().toggle_mark(Marks::BOLD).run(),
            KeyCode::Char('i') if ctrl => state.chain().toggle_mark(Marks::ITALIC).run(),
            KeyCode::Char(c) if !ctrl && !alt => {
                let mut buf = [0u8; 4];
                state.chain().focus().insert_text(c.encode_utf8(&mut buf)).run()
            }
            KeyCode::Enter => state.chain().split_block().run(),
            KeyCode::Backspace => state.chain().delete_backward().run(),
            KeyCode::Delete => state.chain().delete_forward().run(),
            KeyCode::Left => {
                let target = state.caret.saturating_sub(1);
                state.chain().set_caret(target).run()
            }
            KeyCode::Right => {
                let target = (state.caret + 1).min(state.doc.end());
                state.chain().set_caret(target).run()
            }
            KeyCode::Up => match state.vertical_target(false) {
                Some(target) => state.chain().set_caret(target).run(),
                None => false,
            },
            KeyCode::Down => match state.vertical_target(true) {
                Some(target) => state.chain().set_caret(target).run(),
                None => false,
            },
            KeyCode::Home => match state.line_bounds() {
                Some((start, _)) => state.chain().set_caret(start).run(),
                None => false,
            },
            KeyCode::End => match state.line_bounds() {
                Some((_, end)) => state.chain().set_caret(end).run(),
                None => false,
            },
            _ => false,
        }
    }
}

impl Drop for Editor {
    fn drop(&mut self) {
        for plugin in self.plugins.iter_mut() {
            plugin.destroy();
        }
    }
}
