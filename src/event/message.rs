//! Events delivered to listeners.
//!
//! Every structural, layout and input notification is an [`Event`]: a kind,
//! an optional target element, the surface it happened on and a typed
//! [`EventDetail`].

use std::fmt;

use super::input::{KeyEvent, Modifiers, MouseButton};
use crate::dom::node::{ElementId, SurfaceId};
use crate::geometry::Offset;

// ---------------------------------------------------------------------------
// EventKind
// ---------------------------------------------------------------------------

/// What happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Relative or absolute position changed during validation.
    Move,
    /// Width or height changed during validation.
    Resize,
    Show,
    Hide,
    MouseEnter,
    MouseLeave,
    MouseMove,
    MouseDown,
    MouseUp,
    /// Press and release over the same element.
    Click,
    DoubleClick,
    Wheel,
    KeyDown,
    KeyUp,
    /// Printable character.
    Char,
    Focus,
    Blur,
    DragStart,
    DragEnd,
    ResizeStart,
    ResizeEnd,
    /// A drag proxy was released over the target.
    Drop,
    TooltipShow,
    TooltipHide,
    /// Editable text content changed.
    TextChanged,
    /// The element is about to be destroyed.
    Delete,
    /// Non-fatal problem, e.g. a resource failed to load.
    Warning,
}

// ---------------------------------------------------------------------------
// EventDetail
// ---------------------------------------------------------------------------

/// Pointer data carried by mouse events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerDetail {
    /// Surface coordinates.
    pub position: Offset,
    /// Coordinates relative to the target's border box.
    pub local: Offset,
    pub button: Option<MouseButton>,
    pub modifiers: Modifiers,
}

/// Kind-specific payload.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum EventDetail {
    #[default]
    None,
    Pointer(PointerDetail),
    Wheel { dx: i32, dy: i32 },
    Key(KeyEvent),
    Char(char),
    /// The proxy element that was dropped.
    Drop { proxy: ElementId },
    Warning(String),
}

// ---------------------------------------------------------------------------
// Event
// ---------------------------------------------------------------------------

/// A notification posted to element-local and context-global listeners.
#[derive(Clone, PartialEq, Eq)]
pub struct Event {
    pub kind: EventKind,
    pub target: Option<ElementId>,
    pub surface: Option<SurfaceId>,
    pub detail: EventDetail,
}

impl Event {
    /// An event aimed at `target` with no payload.
    pub fn new(kind: EventKind, target: Option<ElementId>) -> Self {
        Self { kind, target, surface: None, detail: EventDetail::None }
    }

    pub fn on_surface(mut self, surface: Option<SurfaceId>) -> Self {
        self.surface = surface;
        self
    }

    pub fn with_detail(mut self, detail: EventDetail) -> Self {
        self.detail = detail;
        self
    }

    /// Pointer payload, if this is a mouse event.
    pub fn pointer(&self) -> Option<&PointerDetail> {
        match &self.detail {
            EventDetail::Pointer(p) => Some(p),
            _ => None,
        }
    }
}

impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("kind", &self.kind)
            .field("target", &self.target)
            .field("detail", &self.detail)
            .finish()
    }
}

// ===========================================================================
// Tests
// ===========================================================================
