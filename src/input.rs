//! Input event model.
//!
//! A closed set of event variants produced by the host's device-event
//! decoders and consumed from the [`InputPipeline`](crate::InputPipeline).
//! Events are immutable once constructed; the timestamp is captured at the
//! moment the raw device event was decoded. Consumers are expected to
//! match exhaustively on [`Input`] and on [`KeyKind`].

use std::time::Instant;

use crate::geometry::Position;

/// What a key event represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyKind {
    /// A printable character; the glyph carries the value.
    Character,
    Enter,
    Tab,
    ReverseTab,
    Backspace,
    Escape,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Home,
    End,
    PageUp,
    PageDown,
    Insert,
    Delete,
    /// Function key F1..=F12.
    Function(u8),
    /// End of input: the pipeline was closed and drained. A value, not an
    /// error; it terminates the consumer's read loop.
    Eof,
}

/// A decoded keyboard event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub kind: KeyKind,
    /// The character for `KeyKind::Character`; `None` for special keys.
    pub glyph: Option<char>,
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub timestamp: Instant,
}

impl KeyEvent {
    /// A printable-character key with no modifiers.
    pub fn character(glyph: char) -> Self {
        KeyEvent {
            kind: KeyKind::Character,
            glyph: Some(glyph),
            ctrl: false,
            alt: false,
            shift: false,
            timestamp: Instant::now(),
        }
    }

    /// A special (non-printing) key with no modifiers.
    pub fn special(kind: KeyKind) -> Self {
        KeyEvent {
            kind,
            glyph: None,
            ctrl: false,
            alt: false,
            shift: false,
            timestamp: Instant::now(),
        }
    }

    /// The end-of-input sentinel.
    pub fn eof() -> Self {
        Self::special(KeyKind::Eof)
    }

    pub fn with_modifiers(mut self, ctrl: bool, alt: bool, shift: bool) -> Self {
        self.ctrl = ctrl;
        self.alt = alt;
        self.shift = shift;
        self
    }
}

/// What a mouse event represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseAction {
    Pressed,
    Released,
    Clicked,
    Moved,
    Dragged,
    Entered,
    Exited,
    WheelUp,
    WheelDown,
}

/// Which button participated in a mouse event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Motion and enter/exit events carry no button.
    None,
    Left,
    Middle,
    Right,
}

/// A decoded mouse event, positioned in cell coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MouseEvent {
    pub action: MouseAction,
    pub button: MouseButton,
    pub position: Position,
    pub timestamp: Instant,
}

impl MouseEvent {
    pub fn new(action: MouseAction, button: MouseButton, position: Position) -> Self {
        MouseEvent {
            action,
            button,
            position,
            timestamp: Instant::now(),
        }
    }
}

/// A decoded input event: keyboard or mouse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    Key(KeyEvent),
    Mouse(MouseEvent),
}

impl Input {
    /// The end-of-input sentinel returned by a closed, drained pipeline.
    pub fn eof() -> Self {
        Input::Key(KeyEvent::eof())
    }

    pub fn is_eof(&self) -> bool {
        matches!(
            self,
            Input::Key(KeyEvent {
                kind: KeyKind::Eof,
                ..
            })
        )
    }
}

impl From<KeyEvent> for Input {
    fn from(event: KeyEvent) -> Self {
        Input::Key(event)
    }
}

impl From<MouseEvent> for Input {
    fn from(event: MouseEvent) -> Self {
        Input::Mouse(event)
    }
}
