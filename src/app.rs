//! Full-screen terminal shell around the editor.

use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::Paragraph,
};
use std::io;
use std::time::Duration;

use crate::document::{BlockKind, Document, Marks};
use crate::editor::{Editor, EditorOptions};
use crate::shortcuts::{ShortcutContext, format_status_bar};
use crate::slash::SlashCommands;

pub struct AppOptions {
    pub content: Document,
    pub trigger: char,
    pub history_depth: usize,
}

pub struct App {
    pub editor: Editor,
    pub should_quit: bool,
    trigger: char,
}

impl App {
    pub fn new(options: AppOptions) -> Self {
        let editor = Editor::new(EditorOptions {
            content: options.content,
            extensions: vec![Box::new(SlashCommands::with_trigger(options.trigger))],
            history_depth: options.history_depth,
        });
        Self {
            editor,
            should_quit: false,
            trigger: options.trigger,
        }
    }

    pub fn context(&self) -> ShortcutContext {
        if self.editor.has_active_plugin() {
            ShortcutContext::Menu
        } else {
            ShortcutContext::Editing
        }
    }

    pub fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key(key),
            Event::Mouse(mouse) => {
                self.editor.handle_mouse(mouse);
            }
            _ => {}
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('q') {
            tracing::info!("quit requested");
            self.should_quit = true;
            return;
        }
        self.editor.handle_key(key);
    }

    /// Block kind and active marks at the caret, plus a marker once the
    /// document has been edited.
    fn status_prefix(&self) -> String {
        let state = self.editor.state();
        let kind = state
            .doc()
            .resolve(state.caret())
            .ok()
            .and_then(|(index, _)| state.doc().block(index))
            .map(|block| block.kind);

        let mut parts = Vec::new();
        if let Some(kind) = kind {
            parts.push(block_label(kind).to_string());
        }
        let marks = state.active_marks();
        for (mark, label) in [(Marks::BOLD, "bold"), (Marks::ITALIC, "italic"), (Marks::CODE, "code")] {
            if marks.contains(mark) {
                parts.push(label.to_string());
            }
        }
        if state.version() > 0 {
            parts.push("[+]".to_string());
        }
        parts.join(" ")
    }

    pub fn draw(&mut self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(1), Constraint::Length(1)])
            .split(frame.area());

        let status = Paragraph::new(format_status_bar(self.context(), self.trigger, &self.status_prefix()))
            .style(Style::default().fg(Color::Black).bg(Color::Gray));
        frame.render_widget(status, chunks[1]);

        // Overlays draw last so the menu can cover the status bar.
        self.editor.draw(frame, chunks[0]);
    }
}

fn block_label(kind: BlockKind) -> &'static str {
    match kind {
        BlockKind::Paragraph => "Paragraph",
        BlockKind::Heading { level: 1 } => "H1",
        BlockKind::Heading { level: 2 } => "H2",
        BlockKind::Heading { .. } => "H3",
        BlockKind::BulletItem => "List",
        BlockKind::Blockquote => "Quote",
        BlockKind::CodeBlock => "Code",
    }
}

/// Run the editor until Ctrl+Q.
pub fn run(options: AppOptions) -> io::Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(options);
    let result = event_loop(&mut terminal, &mut app);

    // Restore the terminal even when the loop failed.
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), DisableMouseCapture, LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(ref e) = result {
        tracing::error!(error = %e, "event loop failed");
    }
    result
}

fn event_loop(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> io::Result<()> {
    while !app.should_quit {
        terminal.draw(|f| app.draw(f))?;

        if event::poll(Duration::from_millis(100))? {
            app.handle_event(event::read()?);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::markdown::welcome_document;
    use crate::test_helpers::{ctrl_key, key};
    use ratatui::backend::TestBackend;

    fn app(content: Document) -> App {
        App::new(AppOptions {
            content,
            trigger: '/',
            history_depth: 10,
        })
    }

    fn type_into(app: &mut App, text: &str) {
        for c in text.chars() {
            app.handle_event(Event::Key(key(KeyCode::Char(c))));
        }
    }

    fn status_row(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        let y = buffer.area.height - 1;
        (0..buffer.area.width).map(|x| buffer[(x, y)].symbol()).collect()
    }

    #[test]
    fn ctrl_q_quits() {
        let mut app = app(Document::default());
        app.handle_event(Event::Key(ctrl_key('q')));
        assert!(app.should_quit);
        assert_eq!(app.editor.state().doc().plain_text(), "");
    }

    #[test]
    fn status_bar_switches_to_menu_hints() {
        let mut app = app(Document::default());
        let mut terminal = Terminal::new(TestBackend::new(80, 10)).unwrap();

        terminal.draw(|f| app.draw(f)).unwrap();
        assert!(status_row(&terminal).contains("/ commands"));
        assert_eq!(app.context(), ShortcutContext::Editing);

        type_into(&mut app, "/");
        terminal.draw(|f| app.draw(f)).unwrap();
        assert_eq!(app.context(), ShortcutContext::Menu);
        assert!(status_row(&terminal).contains("Esc close"));
    }

    #[test]
    fn status_prefix_shows_block_and_marks() {
        let mut app = app(Document::default());
        type_into(&mut app, "/h1");
        app.handle_event(Event::Key(key(KeyCode::Enter)));
        app.handle_event(Event::Key(ctrl_key('b')));
        assert_eq!(app.status_prefix(), "H1 bold [+]");
    }

    #[test]
    fn status_prefix_marks_edits() {
        let mut app = app(Document::default());
        assert_eq!(app.status_prefix(), "Paragraph");
        // Caret movement alone is not an edit.
        app.handle_event(Event::Key(key(KeyCode::Right)));
        assert_eq!(app.status_prefix(), "Paragraph");
        type_into(&mut app, "x");
        assert_eq!(app.status_prefix(), "Paragraph [+]");
    }

    #[test]
    fn status_bar_uses_configured_trigger() {
        let mut app = App::new(AppOptions {
            content: Document::default(),
            trigger: '@',
            history_depth: 10,
        });
        let mut terminal = Terminal::new(TestBackend::new(80, 10)).unwrap();
        terminal.draw(|f| app.draw(f)).unwrap();
        assert!(status_row(&terminal).contains("@ commands"));
        assert!(!status_row(&terminal).contains("/ commands"));
    }

    #[test]
    fn menu_renders_over_welcome_document() {
        let mut app = app(welcome_document());
        let mut terminal = Terminal::new(TestBackend::new(60, 20)).unwrap();
        let end = app.editor.state().doc().end();
        app.editor.state_mut().chain().set_caret(end).run();
        app.handle_event(Event::Key(key(KeyCode::Enter)));
        type_into(&mut app, "/");
        terminal.draw(|f| app.draw(f)).unwrap();

        let buffer = terminal.backend().buffer();
        let screen: String = (0..buffer.area.height)
            .flat_map(|y| (0..buffer.area.width).map(move |x| (x, y)))
            .map(|pos| buffer[pos].symbol())
            .collect();
        assert!(screen.contains("▸ H1"));
        assert!(screen.contains("Italic"));
    }
}
