//! Resource manager boundary.
//!
//! Images are loaded by path through a [`ResourceManager`] and referred to by
//! [`ImageHandle`] afterwards. [`MemoryResources`] serves images registered
//! in memory, which is enough for headless use and tests.

use std::collections::HashMap;
use std::rc::Rc;

use slotmap::{new_key_type, SlotMap};

use crate::error::ResourceError;
use crate::geometry::Size;

new_key_type! {
    /// Handle of a loaded image.
    pub struct ImageHandle;
}

/// Pixel layout of image data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    Rgba8,
    Bgra8,
    Gray8,
}

impl PixelFormat {
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            PixelFormat::Rgba8 | PixelFormat::Bgra8 => 4,
            PixelFormat::Gray8 => 1,
        }
    }
}

/// Dimensions and format of an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageInfo {
    pub width: i32,
    pub height: i32,
    pub format: PixelFormat,
}

impl ImageInfo {
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Bytes a tightly packed buffer of this image takes.
    pub fn byte_len(&self) -> usize {
        self.width.max(0) as usize * self.height.max(0) as usize * self.format.bytes_per_pixel()
    }
}

/// Loads and owns image data on behalf of a context.
pub trait ResourceManager {
    fn load_image(&mut self, path: &str) -> Result<ImageHandle, ResourceError>;
    fn unload_image(&mut self, image: ImageHandle);
    fn image_info(&self, image: ImageHandle) -> Option<ImageInfo>;
    fn image_data(&self, image: ImageHandle) -> Option<&[u8]>;
}

/// In-memory image store.
///
/// Images are registered under a path with [`MemoryResources::insert`];
/// each load hands out a fresh handle sharing the registered pixels.
#[derive(Debug, Default)]
pub struct MemoryResources {
    sources: HashMap<String, (ImageInfo, Rc<[u8]>)>,
    loaded: SlotMap<ImageHandle, (ImageInfo, Rc<[u8]>)>,
}

impl MemoryResources {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register pixel data under `path`.
    pub fn insert(&mut self, path: impl Into<String>, info: ImageInfo, data: impl Into<Rc<[u8]>>) {
        self.sources.insert(path.into(), (info, data.into()));
    }

    /// Number of handles currently loaded.
    pub fn loaded_count(&self) -> usize {
        self.loaded.len()
    }
}

impl ResourceManager for MemoryResources {
    fn load_image(&mut self, path: &str) -> Result<ImageHandle, ResourceError> {
        let (info, data) = self
            .sources
            .get(path)
            .ok_or_else(|| ResourceError::NotFound(path.to_owned()))?;
        if data.len() != info.byte_len() {
            return Err(ResourceError::Decode {
                path: path.to_owned(),
                reason: format!("expected {} bytes, found {}", info.byte_len(), data.len()),
            });
        }
        Ok(self.loaded.insert((*info, Rc::clone(data))))
    }

    fn unload_image(&mut self, image: ImageHandle) {
        self.loaded.remove(image);
    }

    fn image_info(&self, image: ImageHandle) -> Option<ImageInfo> {
        self.loaded.get(image).map(|(info, _)| *info)
    }

    fn image_data(&self, image: ImageHandle) -> Option<&[u8]> {
        self.loaded.get(image).map(|(_, data)| &data[..])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(width: i32, height: i32) -> ImageInfo {
        ImageInfo { width, height, format: PixelFormat::Rgba8 }
    }

    #[test]
    fn load_and_unload() {
        let mut res = MemoryResources::new();
        res.insert("dot.png", info(1, 1), vec![1u8, 2, 3, 4]);
        let a = res.load_image("dot.png").unwrap();
        let b = res.load_image("dot.png").unwrap();
        assert_ne!(a, b);
        assert_eq!(res.image_info(a), Some(info(1, 1)));
        assert_eq!(res.image_data(b), Some(&[1u8, 2, 3, 4][..]));
        res.unload_image(a);
        assert_eq!(res.image_info(a), None);
        assert_eq!(res.loaded_count(), 1);
    }

    #[test]
    fn missing_and_malformed() {
        let mut res = MemoryResources::new();
        res.insert("bad.png", info(2, 2), vec![0u8; 3]);
        assert_eq!(res.load_image("nope.png"), Err(ResourceError::NotFound("nope.png".into())));
        assert!(matches!(res.load_image("bad.png"), Err(ResourceError::Decode { .. })));
    }
}
