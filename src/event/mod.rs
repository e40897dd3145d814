//! Event system: input types, events, listeners and routing.
//!
//! Pointer and keyboard routing live in [`pointer`] and [`keyboard`] as
//! `impl Context` blocks; [`queue`] carries input across threads.

pub mod handler;
pub mod input;
pub mod keyboard;
pub mod message;
pub mod pointer;
pub mod queue;

pub use handler::{ControlFlow, ListenerId, Listeners};
pub use input::{InputEvent, Key, KeyEvent, Modifiers, MouseButton};
pub use keyboard::TextCursor;
pub use message::{Event, EventDetail, EventKind, PointerDetail};
pub use queue::InputSender;
