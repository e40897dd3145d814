//! # gilt-gui
//!
//! A retained-mode GUI context: an element tree laid out by an incremental
//! layout engine, with pointer and keyboard routing and a renderer boundary.
//!
//! Elements live in a slotmap arena owned by a [`Context`] and are attached
//! to surfaces. Style writes only mark what they affect; the next
//! [`Context::validate`] recomputes exactly the dirty geometry, posts
//! `Move`/`Resize`/`Show`/`Hide` events and repeats while handlers keep
//! changing things.
//!
//! ## Core Systems
//!
//! - **[`style`]**: Tagged style values, colors, enumerated properties, parsing
//! - **[`dom`]**: Slotmap-backed element arena, surfaces, stacking layers
//! - **[`layout`]**: Incremental layout: dirty flags, pending list, size/position rules, hit testing
//! - **[`text`]**: Text buffers and the pluggable text layouter
//! - **[`event`]**: Input events, listeners, pointer and keyboard routing, cross-thread input queue
//! - **[`render`]**: Renderer and resource traits, paint pass
//! - **[`context`]**: The [`Context`] tying everything together
//! - **[`testing`]**: Recording renderer, input pilot, layout snapshots
//! - **[`geometry`]**: Offset, Size, Region, Spacing primitives

// Foundation
pub mod config;
pub mod error;
pub mod geometry;

// Core systems
pub mod dom;
pub mod layout;
pub mod style;
pub mod text;

// Events and rendering
pub mod event;
pub mod render;

// Context
pub mod context;

// Headless test support
pub mod testing;

pub use config::ContextConfig;
pub use context::{Context, ValidationStats};
pub use dom::{Element, ElementId, Surface, SurfaceId};
pub use error::{LayoutError, ResourceError, StyleParseError};
pub use event::{ControlFlow, Event, EventKind};
pub use geometry::{Offset, Region, Size, Spacing};
pub use style::{Style, StyleValue};
