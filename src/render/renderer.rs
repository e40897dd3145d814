//! Renderer boundary.
//!
//! The context decides what to draw and in which order; a [`Renderer`]
//! implementation turns those calls into pixels. All coordinates are surface
//! pixels.

use std::any::Any;

use super::resources::{ImageHandle, ImageInfo};
use crate::dom::node::SurfaceId;
use crate::geometry::{Offset, Region};
use crate::style::{Color, FontDesc};

/// One run of text to draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextRun<'a> {
    pub font: &'a FontDesc,
    /// Resolved font size in device pixels.
    pub font_px: i32,
    pub text: &'a str,
    /// Top-left of the line box.
    pub position: Offset,
    pub color: Color,
}

/// Drawing backend.
pub trait Renderer {
    /// Start painting `surface`. `user_data` is whatever was attached to the
    /// surface, typically a native window handle.
    fn begin_paint(&mut self, surface: SurfaceId, user_data: Option<&dyn Any>);
    fn end_paint(&mut self, surface: SurfaceId);

    /// Clear `rect`, or the whole surface.
    fn clear(&mut self, rect: Option<Region>);
    fn draw_rectangle(&mut self, rect: Region, color: Color);
    /// Draw `source` (in image pixels) of `image` stretched over `rect`,
    /// modulated by `color`.
    fn draw_textured_rectangle(&mut self, rect: Region, image: ImageHandle, color: Color, source: Region);
    /// Restrict drawing to `rect`; `None` lifts the restriction.
    fn set_clipping_rect(&mut self, rect: Option<Region>);
    fn draw_text(&mut self, run: &TextRun<'_>);

    /// Whether `font` can be drawn at all. Text in unsupported fonts is skipped.
    fn can_draw_text(&self, _font: &FontDesc) -> bool {
        true
    }

    /// Upload an image before its first use.
    fn initialize_image(&mut self, image: ImageHandle, info: &ImageInfo, data: &[u8]);
    /// Release an image that will not be drawn again.
    fn uninitialize_image(&mut self, image: ImageHandle);
}
