//! Inbound input types.
//!
//! Defines [`Key`], [`Modifiers`], [`KeyEvent`], [`MouseButton`] and the
//! [`InputEvent`] enum used by the delayed input queue. Coordinates are
//! always relative to the surface the event is delivered to; converting OS
//! events into these types is the embedder's job.

use bitflags::bitflags;

// ---------------------------------------------------------------------------
// Key
// ---------------------------------------------------------------------------

/// Keyboard key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Char(char),
    Enter,
    Escape,
    Tab,
    BackTab,
    Backspace,
    Delete,
    Left,
    Right,
    Up,
    Down,
    Home,
    End,
    PageUp,
    PageDown,
    F(u8),
}

// ---------------------------------------------------------------------------
// Modifiers
// ---------------------------------------------------------------------------

bitflags! {
    /// Modifier keys held during an input event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        const SHIFT = 1 << 0;
        const CTRL = 1 << 1;
        const ALT = 1 << 2;
    }
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers::empty();
}

// ---------------------------------------------------------------------------
// KeyEvent
// ---------------------------------------------------------------------------

/// A keyboard event with key and modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    pub code: Key,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    /// Create a new key event.
    pub fn new(code: Key, modifiers: Modifiers) -> Self {
        Self { code, modifiers }
    }

    /// A key event with no modifiers.
    pub fn plain(code: Key) -> Self {
        Self::new(code, Modifiers::NONE)
    }
}

// ---------------------------------------------------------------------------
// MouseButton
// ---------------------------------------------------------------------------

/// Mouse button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

// ---------------------------------------------------------------------------
// InputEvent
// ---------------------------------------------------------------------------

/// One inbound input call, as queued in delayed mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    MouseMove { x: i32, y: i32 },
    /// The pointer entered the surface.
    MouseEnter { x: i32, y: i32 },
    /// The pointer left the surface.
    MouseLeave,
    MouseDown { button: MouseButton, x: i32, y: i32 },
    MouseUp { button: MouseButton, x: i32, y: i32 },
    DoubleClick { button: MouseButton, x: i32, y: i32 },
    Wheel { x: i32, y: i32, dx: i32, dy: i32 },
    KeyDown(KeyEvent),
    KeyUp(KeyEvent),
    /// A printable character, after keyboard layout translation.
    Char(char),
}

// ===========================================================================
// Tests
// ===========================================================================
