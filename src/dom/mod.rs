//! Element arena: slotmap-backed element tree, surfaces, id index, layers.

pub mod node;
pub mod tree;

pub use node::{Element, ElementId, LayoutRecord, Surface, SurfaceId};
pub use tree::{Children, Dom, InsertPosition};
