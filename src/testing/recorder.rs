//! A [`Renderer`] that records draw calls instead of drawing.

use std::any::Any;

use crate::dom::node::SurfaceId;
use crate::geometry::{Offset, Region};
use crate::render::renderer::{Renderer, TextRun};
use crate::render::resources::{ImageHandle, ImageInfo};
use crate::style::Color;

/// One recorded renderer call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrawCommand {
    BeginPaint { surface: SurfaceId },
    EndPaint { surface: SurfaceId },
    Clear { rect: Option<Region> },
    Rectangle { rect: Region, color: Color },
    TexturedRectangle { rect: Region, image: ImageHandle, color: Color, source: Region },
    Clip { rect: Option<Region> },
    Text { text: String, position: Offset, font_px: i32, color: Color },
    InitializeImage { image: ImageHandle, info: ImageInfo },
    UninitializeImage { image: ImageHandle },
}

/// Records every call it receives, in order.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    commands: Vec<DrawCommand>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Take the recorded commands, leaving the recorder empty.
    pub fn take(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Text of every `draw_text` call, in order.
    pub fn texts(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Every filled rectangle, in order.
    pub fn rectangles(&self) -> Vec<(Region, Color)> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Rectangle { rect, color } => Some((*rect, *color)),
                _ => None,
            })
            .collect()
    }
}

impl Renderer for RecordingRenderer {
    fn begin_paint(&mut self, surface: SurfaceId, _user_data: Option<&dyn Any>) {
        self.commands.push(DrawCommand::BeginPaint { surface });
    }

    fn end_paint(&mut self, surface: SurfaceId) {
        self.commands.push(DrawCommand::EndPaint { surface });
    }

    fn clear(&mut self, rect: Option<Region>) {
        self.commands.push(DrawCommand::Clear { rect });
    }

    fn draw_rectangle(&mut self, rect: Region, color: Color) {
        self.commands.push(DrawCommand::Rectangle { rect, color });
    }

    fn draw_textured_rectangle(&mut self, rect: Region, image: ImageHandle, color: Color, source: Region) {
        self.commands.push(DrawCommand::TexturedRectangle { rect, image, color, source });
    }

    fn set_clipping_rect(&mut self, rect: Option<Region>) {
        self.commands.push(DrawCommand::Clip { rect });
    }

    fn draw_text(&mut self, run: &TextRun<'_>) {
        self.commands.push(DrawCommand::Text {
            text: run.text.to_owned(),
            position: run.position,
            font_px: run.font_px,
            color: run.color,
        });
    }

    fn initialize_image(&mut self, image: ImageHandle, info: &ImageInfo, _data: &[u8]) {
        self.commands.push(DrawCommand::InitializeImage { image, info: *info });
    }

    fn uninitialize_image(&mut self, image: ImageHandle) {
        self.commands.push(DrawCommand::UninitializeImage { image });
    }
}
