use std::fmt;

use crate::coords::{Point, Rect};

/// Keyboard key identifier.
///
/// Platform layers map scancodes/keycodes into these variants where possible;
/// anything else travels as `Key::Unknown` with a stable platform code.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Key {
    Escape,
    Enter,
    Tab,
    Backspace,
    Space,
    Insert,
    Delete,
    Home,
    End,
    PageUp,
    PageDown,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Shift,
    Control,
    Alt,
    Meta,
    /// Letter key, uppercase ASCII (`'A'..='Z'`).
    Letter(char),
    /// Digit row key, `0..=9`.
    Digit(u8),
    /// Function key, `1..=12`.
    F(u8),
    Unknown(u32),
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Letter(c) => write!(f, "{c}"),
            Key::Digit(d) => write!(f, "{d}"),
            Key::F(n) => write!(f, "F{n}"),
            other => write!(f, "{other:?}"),
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Back,
    Forward,
    Other(u16),
}

/// Modifier keys held while an event was generated.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub fn any(&self) -> bool {
        self.shift || self.ctrl || self.alt || self.meta
    }
}

/// Mouse wheel delta.
///
/// `Lines` is notch-style input; `Pixels` is high-precision trackpad input.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum WheelDelta {
    Lines { x: f32, y: f32 },
    Pixels { x: i32, y: i32 },
}

/// Discrete window event consumed by the UI core.
///
/// The platform layer produces the first group; the router synthesizes the
/// `MouseEnter`/`MouseLeave`/`FocusGained`/`FocusLost` notifications it sends
/// to individual widgets. Pointer positions are window-absolute when produced
/// by the platform and widget-local once delivered.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    MouseMove {
        pos: Point,
        modifiers: Modifiers,
    },
    MousePress {
        pos: Point,
        button: MouseButton,
        modifiers: Modifiers,
    },
    MouseRelease {
        pos: Point,
        button: MouseButton,
        modifiers: Modifiers,
    },
    MouseWheel {
        pos: Point,
        delta: WheelDelta,
        modifiers: Modifiers,
    },
    KeyPress {
        key: Key,
        /// Stable platform code when available (e.g. scancode).
        code: u32,
        modifiers: Modifiers,
        repeat: bool,
    },
    KeyRelease {
        key: Key,
        code: u32,
        modifiers: Modifiers,
    },
    /// Committed UTF-8 text.
    Char { text: String },
    /// Part (or, with `None`, all) of the window must be repainted.
    Expose { rect: Option<Rect> },
    Resize { width: i32, height: i32 },
    /// The window gained or lost system focus.
    WindowFocus(bool),
    /// The window was shown or hidden.
    Visibility(bool),

    MouseEnter,
    MouseLeave,
    FocusGained,
    FocusLost,
}

impl Event {
    /// Pointer position carried by mouse events.
    pub fn pos(&self) -> Option<Point> {
        match self {
            Event::MouseMove { pos, .. }
            | Event::MousePress { pos, .. }
            | Event::MouseRelease { pos, .. }
            | Event::MouseWheel { pos, .. } => Some(*pos),
            _ => None,
        }
    }

    /// Returns a copy with the pointer position shifted by `-origin`.
    ///
    /// Events without a position are returned unchanged.
    pub fn relative_to(&self, origin: Point) -> Event {
        let mut ev = self.clone();
        match &mut ev {
            Event::MouseMove { pos, .. }
            | Event::MousePress { pos, .. }
            | Event::MouseRelease { pos, .. }
            | Event::MouseWheel { pos, .. } => *pos = *pos - origin,
            _ => {}
        }
        ev
    }

    /// `true` for `KeyPress`, `KeyRelease` and `Char`.
    pub fn is_keyboard(&self) -> bool {
        matches!(self, Event::KeyPress { .. } | Event::KeyRelease { .. } | Event::Char { .. })
    }

    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Event::MouseMove { .. } => "MouseMove",
            Event::MousePress { .. } => "MousePress",
            Event::MouseRelease { .. } => "MouseRelease",
            Event::MouseWheel { .. } => "MouseWheel",
            Event::KeyPress { .. } => "KeyPress",
            Event::KeyRelease { .. } => "KeyRelease",
            Event::Char { .. } => "Char",
            Event::Expose { .. } => "Expose",
            Event::Resize { .. } => "Resize",
            Event::WindowFocus(_) => "WindowFocus",
            Event::Visibility(_) => "Visibility",
            Event::MouseEnter => "MouseEnter",
            Event::MouseLeave => "MouseLeave",
            Event::FocusGained => "FocusGained",
            Event::FocusLost => "FocusLost",
        }
    }
}
