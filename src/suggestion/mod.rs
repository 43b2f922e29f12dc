//! Suggestion plugin: trigger tracking plus a pluggable popup renderer.
//!
//! The plugin watches every editor update through a [`TriggerDetector`],
//! queries `items` with the live query and forwards the session lifecycle to
//! a [`SuggestionRenderer`]. Key events reach the renderer before the
//! editor's own keymap while a session is active.

pub mod detector;

use crossterm::event::{KeyCode, KeyEvent, MouseEvent};
use ratatui::Frame;
use ratatui::layout::Rect;

use crate::document::DocRange;
use crate::editor::{EditorState, Plugin, ViewGeometry};

pub use detector::{SuggestionMatch, SuggestionState, Transition, TriggerDetector, find_suggestion_match};

pub type ItemsFn<I> = Box<dyn Fn(&str) -> Vec<I>>;
pub type CommandFn<I> = Box<dyn Fn(&mut EditorState, DocRange, &I) -> bool>;
pub type RenderFn<I> = Box<dyn Fn() -> Box<dyn SuggestionRenderer<I>>>;

/// Configuration of a suggestion plugin.
pub struct SuggestionOptions<I> {
    /// Character that opens a session.
    pub char: char,
    /// Items offered for a query, in display order.
    pub items: ItemsFn<I>,
    /// Runs a chosen item against the trigger range.
    pub command: CommandFn<I>,
    /// Builds the renderer, once per plugin.
    pub render: RenderFn<I>,
}

/// Live session data handed to the renderer.
#[derive(Debug, Clone)]
pub struct SuggestionProps<I> {
    pub range: DocRange,
    pub query: String,
    pub text: String,
    pub items: Vec<I>,
    /// Screen rectangle of the trigger range.
    pub anchor_rect: Option<Rect>,
    /// Viewport placement at the time the props were built.
    pub geometry: ViewGeometry,
}

/// Key event delivered to an active renderer.
pub struct SuggestionKeyDown<'a, I> {
    pub event: &'a KeyEvent,
    pub props: &'a SuggestionProps<I>,
    editor: &'a mut EditorState,
    command: &'a CommandFn<I>,
}

impl<'a, I> SuggestionKeyDown<'a, I> {
    pub fn new(
        event: &'a KeyEvent,
        props: &'a SuggestionProps<I>,
        editor: &'a mut EditorState,
        command: &'a CommandFn<I>,
    ) -> Self {
        Self {
            event,
            props,
            editor,
            command,
        }
    }

    /// Execute `item` against the session's trigger range.
    pub fn command(&mut self, item: &I) -> bool {
        (self.command)(&mut *self.editor, self.props.range, item)
    }
}

/// Left-button press delivered to an active renderer.
pub struct SuggestionMouseDown<'a, I> {
    pub event: &'a MouseEvent,
    pub props: &'a SuggestionProps<I>,
    editor: &'a mut EditorState,
    command: &'a CommandFn<I>,
}

impl<'a, I> SuggestionMouseDown<'a, I> {
    pub fn new(
        event: &'a MouseEvent,
        props: &'a SuggestionProps<I>,
        editor: &'a mut EditorState,
        command: &'a CommandFn<I>,
    ) -> Self {
        Self {
            event,
            props,
            editor,
            command,
        }
    }

    pub fn command(&mut self, item: &I) -> bool {
        (self.command)(&mut *self.editor, self.props.range, item)
    }
}

/// Popup UI for one suggestion plugin.
pub trait SuggestionRenderer<I> {
    fn on_start(&mut self, props: &SuggestionProps<I>);
    fn on_update(&mut self, props: &SuggestionProps<I>);
    /// Returns whether the key was consumed.
    fn on_key_down(&mut self, key: SuggestionKeyDown<'_, I>) -> bool;
    fn on_mouse_down(&mut self, _mouse: SuggestionMouseDown<'_, I>) -> bool {
        false
    }
    /// Must be safe to call when nothing is mounted.
    fn on_exit(&mut self);
    fn is_mounted(&self) -> bool;
    fn draw(&self, frame: &mut Frame, geometry: ViewGeometry);
}

pub struct Suggestion<I> {
    name: String,
    options: SuggestionOptions<I>,
    detector: TriggerDetector,
    renderer: Box<dyn SuggestionRenderer<I>>,
    props: Option<SuggestionProps<I>>,
}

impl<I: Clone> Suggestion<I> {
    pub fn new(name: impl Into<String>, options: SuggestionOptions<I>) -> Self {
        let renderer = (options.render)();
        Self {
            name: name.into(),
            detector: TriggerDetector::new(options.char),
            renderer,
            options,
            props: None,
        }
    }

    fn build_props(&self, m: SuggestionMatch, state: &EditorState) -> SuggestionProps<I> {
        SuggestionProps {
            items: (self.options.items)(&m.query),
            anchor_rect: state.coords_for_range(m.range),
            geometry: state.geometry(),
            range: m.range,
            query: m.query,
            text: m.text,
        }
    }

    fn exit(&mut self) {
        self.renderer.on_exit();
        self.props = None;
    }
}

impl<I: Clone> Plugin for Suggestion<I> {
    fn name(&self) -> &str {
        &self.name
    }

    fn view_update(&mut self, state: &EditorState) {
        let transitions = self.detector.observe(state.doc(), state.caret());

        for transition in transitions {
            match transition {
                Transition::Start(m) => {
                    let props = self.build_props(m, state);
                    tracing::debug!(plugin = %self.name, query = %props.query, from = props.range.from, "suggestion start");
                    self.renderer.on_start(&props);
                    self.props = Some(props);
                }
                Transition::Update(m) => {
                    let props = self.build_props(m, state);
                    tracing::trace!(plugin = %self.name, query = %props.query, items = props.items.len(), "suggestion update");
                    self.renderer.on_update(&props);
                    self.props = Some(props);
                }
                Transition::Exit => {
                    tracing::debug!(plugin = %self.name, "suggestion exit");
                    self.exit();
                }
            }
        }

        // Reposition when only the viewport moved.
        if let Some(props) = self.props.as_mut() {
            let anchor_rect = state.coords_for_range(props.range);
            let geometry = state.geometry();
            if (anchor_rect, geometry) != (props.anchor_rect, props.geometry) {
                props.anchor_rect = anchor_rect;
                props.geometry = geometry;
                self.renderer.on_update(props);
            }
        }
    }

    fn handle_key_down(&mut self, state: &mut EditorState, event: &KeyEvent) -> bool {
        let Some(props) = self.props.as_ref() else {
            return false;
        };
        let consumed = self.renderer.on_key_down(SuggestionKeyDown::new(
            event,
            props,
            state,
            &self.options.command,
        ));
        if consumed && event.code == KeyCode::Esc && self.detector.dismiss().is_some() {
            tracing::debug!(plugin = %self.name, "suggestion dismissed");
            self.exit();
        }
        consumed
    }

    fn handle_mouse_down(&mut self, state: &mut EditorState, event: &MouseEvent) -> bool {
        let Some(props) = self.props.as_ref() else {
            return false;
        };
        self.renderer.on_mouse_down(SuggestionMouseDown::new(
            event,
            props,
            state,
            &self.options.command,
        ))
    }

    fn render_overlay(&self, frame: &mut Frame, state: &EditorState) {
        if self.props.is_some() {
            self.renderer.draw(frame, state.geometry());
        }
    }

    fn is_active(&self) -> bool {
        self.detector.is_active() && self.renderer.is_mounted()
    }

    fn destroy(&mut self) {
        self.exit();
    }
}
