//! Headless testing helpers: a recording renderer, the [`Pilot`] input
//! driver and layout snapshots.
//!
//! Use the [`Pilot`] to drive a [`Context`](crate::Context) with simulated
//! pointer and keyboard input, [`RecordingRenderer`] to capture what a paint
//! would draw, and [`layout_snapshot`] to dump element geometry as text for
//! snapshot assertions.

pub mod pilot;
pub mod recorder;
pub mod snapshot;

pub use pilot::Pilot;
pub use recorder::{DrawCommand, RecordingRenderer};
pub use snapshot::layout_snapshot;
