//! Rendering boundary: renderer and resource traits, paint dispatch.

pub mod paint;
pub mod renderer;
pub mod resources;

pub use renderer::{Renderer, TextRun};
pub use resources::{ImageHandle, ImageInfo, MemoryResources, PixelFormat, ResourceManager};
