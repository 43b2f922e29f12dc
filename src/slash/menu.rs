//! Floating slash command menu.
//!
//! `SlashMenu` owns at most one mounted popup. `on_start` mounts it,
//! `on_update` refreshes items and position in place, and `on_exit` or
//! Escape unmounts it. Calls that arrive after unmounting are no-ops.

use std::cell::Cell;

use crossterm::event::{KeyCode, MouseButton, MouseEventKind};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};

use crate::editor::ViewGeometry;
use crate::suggestion::{SuggestionKeyDown, SuggestionMouseDown, SuggestionProps, SuggestionRenderer};

use super::registry::Command;

pub const MAX_VISIBLE_ITEMS: usize = 8;
const MIN_WIDTH: u16 = 16;

/// Items on display plus the highlighted entry.
#[derive(Debug, Clone, Default)]
pub struct MenuState {
    items: Vec<Command>,
    selected: usize,
}

impl MenuState {
    pub fn new(items: Vec<Command>) -> Self {
        Self { items, selected: 0 }
    }

    pub fn items(&self) -> &[Command] {
        &self.items
    }

    /// Highlighted index; `None` when there are no items.
    pub fn selected_index(&self) -> Option<usize> {
        (!self.items.is_empty()).then_some(self.selected)
    }

    pub fn selected_item(&self) -> Option<&Command> {
        self.items.get(self.selected)
    }

    /// Replace the items, resetting the selection if they differ.
    pub fn set_items(&mut self, items: Vec<Command>) {
        if items != self.items {
            self.selected = 0;
        }
        self.items = items;
    }

    pub fn select_previous(&mut self) {
        let len = self.items.len();
        if len > 0 {
            self.selected = (self.selected + len - 1) % len;
        }
    }

    pub fn select_next(&mut self) {
        let len = self.items.len();
        if len > 0 {
            self.selected = (self.selected + 1) % len;
        }
    }

    pub fn select(&mut self, index: usize) -> bool {
        if index < self.items.len() {
            self.selected = index;
            true
        } else {
            false
        }
    }

    /// First item shown when the list is longer than the popup.
    fn window_start(&self) -> usize {
        self.selected.saturating_sub(MAX_VISIBLE_ITEMS - 1)
    }
}

/// A mounted popup and where it is anchored.
#[derive(Debug)]
pub struct PopupHandle {
    id: u64,
    /// Trigger range rectangle in document coordinates: `y` is the block row
    /// and `x` the display column, both independent of scrolling.
    anchor: Option<Rect>,
    menu: MenuState,
    /// Area covered by the last draw, used for pointer hit-testing.
    drawn: Cell<Option<Rect>>,
}

impl PopupHandle {
    fn mount(id: u64, props: &SuggestionProps<Command>) -> Self {
        let mut popup = Self {
            id,
            anchor: None,
            menu: MenuState::new(props.items.clone()),
            drawn: Cell::new(None),
        };
        popup.reposition(props);
        popup
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn anchor(&self) -> Option<Rect> {
        self.anchor
    }

    pub fn menu(&self) -> &MenuState {
        &self.menu
    }

    fn reposition(&mut self, props: &SuggestionProps<Command>) {
        let geometry = props.geometry;
        self.anchor = props.anchor_rect.map(|rect| {
            let row = rect.y.saturating_sub(geometry.area.y) + geometry.scroll;
            let column = rect.x.saturating_sub(geometry.area.x) + geometry.hscroll;
            Rect::new(column, row, rect.width, rect.height)
        });
    }

    fn size(&self) -> (u16, u16) {
        let widest = self
            .menu
            .items
            .iter()
            .map(|c| c.title().chars().count())
            .max()
            .unwrap_or(0) as u16;
        let width = (widest + 4).max(MIN_WIDTH);
        let rows = self.menu.items.len().clamp(1, MAX_VISIBLE_ITEMS) as u16;
        (width, rows + 2)
    }

    /// Screen area for the popup: below the anchor, or above it when the
    /// frame has no room below, clamped into `frame`.
    pub fn area(&self, frame: Rect, geometry: ViewGeometry) -> Option<Rect> {
        let anchor = self.anchor?;
        let (width, height) = self.size();
        let width = width.min(frame.width);
        let height = height.min(frame.height);

        let anchor_top = i32::from(geometry.area.y) + i32::from(anchor.y) - i32::from(geometry.scroll);
        let below = anchor_top + i32::from(anchor.height.max(1));
        let frame_top = i32::from(frame.y);
        let frame_bottom = i32::from(frame.bottom());

        let y = if below + i32::from(height) <= frame_bottom {
            below
        } else if anchor_top - i32::from(height) >= frame_top {
            anchor_top - i32::from(height)
        } else {
            (frame_bottom - i32::from(height)).max(frame_top)
        };
        let anchor_left =
            i32::from(geometry.area.x) + i32::from(anchor.x) - i32::from(geometry.hscroll);
        let max_x = i32::from(frame.right().saturating_sub(width));
        let x = u16::try_from(anchor_left.clamp(i32::from(frame.x), max_x.max(i32::from(frame.x)))).ok()?;

        Some(Rect::new(x, u16::try_from(y).ok()?, width, height))
    }

    fn render(&self, frame: &mut Frame, geometry: ViewGeometry) {
        let Some(area) = self.area(frame.area(), geometry) else {
            self.drawn.set(None);
            return;
        };
        self.drawn.set(Some(area));

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow));
        let inner = block.inner(area);
        frame.render_widget(Clear, area);
        frame.render_widget(block, area);

        if self.menu.items.is_empty() {
            let empty = Paragraph::new("no match").style(Style::default().fg(Color::DarkGray));
            frame.render_widget(empty, inner);
            return;
        }

        let start = self.menu.window_start();
        let lines: Vec<Line> = self
            .menu
            .items
            .iter()
            .enumerate()
            .skip(start)
            .take(MAX_VISIBLE_ITEMS)
            .map(|(i, cmd)| {
                let is_selected = i == self.menu.selected;
                let prefix = if is_selected { "▸ " } else { "  " };
                let style = if is_selected {
                    Style::default()
                        .bg(Color::DarkGray)
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                };
                Line::from(vec![Span::raw(prefix), Span::raw(cmd.title().to_string())]).style(style)
            })
            .collect();
        frame.render_widget(Paragraph::new(lines), inner);
    }

    /// Item index under a screen cell, if any.
    fn item_at(&self, column: u16, row: u16) -> Option<usize> {
        let area = self.drawn.get()?;
        let inner = Rect::new(
            area.x + 1,
            area.y + 1,
            area.width.saturating_sub(2),
            area.height.saturating_sub(2),
        );
        if column < inner.x || column >= inner.right() || row < inner.y || row >= inner.bottom() {
            return None;
        }
        let index = self.menu.window_start() + usize::from(row - inner.y);
        (index < self.menu.items.len()).then_some(index)
    }

    fn contains(&self, column: u16, row: u16) -> bool {
        self.drawn.get().is_some_and(|area| {
            column >= area.x && column < area.right() && row >= area.y && row < area.bottom()
        })
    }
}

/// Menu controller for slash command sessions.
#[derive(Debug, Default)]
pub struct SlashMenu {
    popup: Option<PopupHandle>,
    mounted: u64,
}

impl SlashMenu {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn popup(&self) -> Option<&PopupHandle> {
        self.popup.as_ref()
    }

    /// Number of popups mounted over this menu's lifetime.
    pub fn mount_count(&self) -> u64 {
        self.mounted
    }

    fn destroy_popup(&mut self) {
        if let Some(popup) = self.popup.take() {
            tracing::trace!(popup = popup.id, "popup unmounted");
        }
    }
}

impl SuggestionRenderer<Command> for SlashMenu {
    fn on_start(&mut self, props: &SuggestionProps<Command>) {
        self.destroy_popup();
        self.mounted += 1;
        let popup = PopupHandle::mount(self.mounted, props);
        tracing::trace!(popup = popup.id, items = props.items.len(), "popup mounted");
        self.popup = Some(popup);
    }

    fn on_update(&mut self, props: &SuggestionProps<Command>) {
        if let Some(popup) = self.popup.as_mut() {
            popup.menu.set_items(props.items.clone());
            popup.reposition(props);
        }
    }

    fn on_key_down(&mut self, mut key: SuggestionKeyDown<'_, Command>) -> bool {
        if key.event.code == KeyCode::Esc {
            self.destroy_popup();
            return true;
        }
        let Some(popup) = self.popup.as_mut() else {
            return false;
        };
        match key.event.code {
            KeyCode::Up => {
                popup.menu.select_previous();
                true
            }
            KeyCode::Down => {
                popup.menu.select_next();
                true
            }
            KeyCode::Enter => {
                if let Some(item) = popup.menu.selected_item().cloned() {
                    key.command(&item);
                }
                true
            }
            _ => false,
        }
    }

    fn on_mouse_down(&mut self, mut mouse: SuggestionMouseDown<'_, Command>) -> bool {
        if !matches!(mouse.event.kind, MouseEventKind::Down(MouseButton::Left)) {
            return false;
        }
        let Some(popup) = self.popup.as_mut() else {
            return false;
        };
        let (column, row) = (mouse.event.column, mouse.event.row);
        if let Some(index) = popup.item_at(column, row) {
            popup.menu.select(index);
            if let Some(item) = popup.menu.selected_item().cloned() {
                mouse.command(&item);
            }
            return true;
        }
        popup.contains(column, row)
    }

    fn on_exit(&mut self) {
        self.destroy_popup();
    }

    fn is_mounted(&self) -> bool {
        self.popup.is_some()
    }

    fn draw(&self, frame: &mut Frame, geometry: ViewGeometry) {
        if let Some(popup) = &self.popup {
            popup.render(frame, geometry);
        }
    }
}
