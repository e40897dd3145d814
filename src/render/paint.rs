//! Paint pass.
//!
//! [`Context::paint`] walks the layers of a surface bottom to top and issues
//! draw calls for everything that intersects the requested area: background
//! color, background image, border sides, text lines, then children under
//! the element's clip. Absolute elements are painted as their own layers and
//! are not clipped by their ancestors.

use std::collections::HashSet;

use crate::context::Context;
use crate::dom::node::{Element, ElementId, SurfaceId};
use crate::geometry::{Offset, Region, Size};
use crate::layout::boundary_box;
use crate::layout::hit::{clip_rect, is_shown};
use crate::style::{Background, BackgroundRepeat, BorderMask, Boundary, Color, HAlign, ImageScale, Positioning, VAlign};

use super::renderer::{Renderer, TextRun};
use super::resources::ImageHandle;

/// Which images the renderer has been handed.
#[derive(Debug, Default)]
pub(crate) struct ImageCache {
    initialized: HashSet<ImageHandle>,
    /// Initialized images whose owner let go; uninitialized on the next paint.
    released: Vec<ImageHandle>,
}

impl ImageCache {
    pub(crate) fn release(&mut self, image: ImageHandle) {
        if self.initialized.remove(&image) {
            self.released.push(image);
        }
    }
}

impl Context {
    /// Add `rect` to the area of `surface` repainted by the next paint.
    pub fn invalidate_rect(&mut self, surface: SurfaceId, rect: Region) -> bool {
        match self.dom.surface_mut(surface).filter(|s| !s.doomed) {
            Some(surf) => {
                surf.invalidate(rect);
                true
            }
            None => false,
        }
    }

    /// Paint `rect` of `surface`, or its accumulated invalid area.
    ///
    /// Layout is validated first. Nothing is drawn while a batch is open or
    /// when the area is empty; returns whether anything was painted.
    pub fn paint(&mut self, surface: SurfaceId, renderer: &mut dyn Renderer, rect: Option<Region>) -> bool {
        if self.is_batching() || self.surface(surface).is_none() {
            return false;
        }
        self.ensure_valid();

        for image in std::mem::take(&mut self.images.released) {
            renderer.uninitialize_image(image);
        }

        let Some(surf) = self.dom.surface(surface) else {
            return false;
        };
        let invalid = surf.invalid_region();
        let area = rect.unwrap_or(invalid).intersection(surf.bounds());
        if area.is_empty() {
            return false;
        }
        self.upload_images(surface, renderer);

        let Some(surf) = self.dom.surface(surface) else {
            return false;
        };
        log::trace!(target: "gilt_gui::render", "painting {area:?} of {surface:?}");
        renderer.begin_paint(surface, surf.user_data());
        renderer.set_clipping_rect(Some(area));
        renderer.clear(Some(area));
        for &layer in surf.layers() {
            if is_shown(&self.dom, layer) {
                paint_element(self, renderer, layer, area);
            }
        }
        renderer.set_clipping_rect(Some(area));
        self.paint_text_cursor(surface, renderer, area);
        renderer.set_clipping_rect(None);
        renderer.end_paint(surface);

        if let Some(surf) = self.dom.surface_mut(surface) {
            if area.union(invalid) == area {
                surf.invalid = Region::EMPTY;
            }
        }
        true
    }

    /// Hand every not yet uploaded background image of `surface` to the renderer.
    fn upload_images(&mut self, surface: SurfaceId, renderer: &mut dyn Renderer) {
        let images: Vec<ImageHandle> = self
            .dom
            .surface_elements(surface)
            .into_iter()
            .filter_map(|id| self.dom.get(id).and_then(|el| el.image))
            .filter(|image| !self.images.initialized.contains(image))
            .collect();
        for image in images {
            let (Some(info), Some(data)) = (self.resources.image_info(image), self.resources.image_data(image)) else {
                continue;
            };
            renderer.initialize_image(image, &info, data);
            self.images.initialized.insert(image);
        }
    }

    fn paint_text_cursor(&self, surface: SurfaceId, renderer: &mut dyn Renderer, area: Region) {
        let cursor = *self.text_cursor();
        let Some(el) = cursor.element.and_then(|e| self.element(e)) else {
            return;
        };
        if !cursor.visible || el.surface != Some(surface) {
            return;
        }
        let rect = cursor.rect(self.config().text_cursor_width).intersection(area);
        if !rect.is_empty() {
            renderer.draw_rectangle(rect, el.style.text_color);
        }
    }
}

// ---------------------------------------------------------------------------
// Element drawing
// ---------------------------------------------------------------------------

fn paint_element(ctx: &Context, renderer: &mut dyn Renderer, id: ElementId, clip: Region) {
    let Some(el) = ctx.dom.get(id) else {
        return;
    };
    if !el.style.is_visible() {
        return;
    }
    if el.layout.region().overlaps(clip) {
        renderer.set_clipping_rect(Some(clip));
        paint_background(ctx, renderer, el, clip);
        paint_border(renderer, el);
        paint_text(renderer, el, clip);
    }
    // Children may overflow a non-clipping parent, so they are visited
    // even when the parent itself is outside the area.
    let child_clip = clip_rect(el).map_or(clip, |c| clip.intersection(c));
    if child_clip.is_empty() {
        return;
    }
    for child in ctx.dom.children(id) {
        if ctx.dom.get(child).is_some_and(|c| c.style.positioning != Positioning::Absolute) {
            paint_element(ctx, renderer, child, child_clip);
        }
    }
}

fn paint_background(ctx: &Context, renderer: &mut dyn Renderer, el: &Element, clip: Region) {
    let background = &el.style.background;
    let rect = boundary_box(&el.layout, background.boundary).translate(el.layout.absolute);
    if !background.color.is_transparent() {
        renderer.draw_rectangle(rect, background.color);
    }
    let Some(image) = el.image else {
        return;
    };
    let Some(info) = ctx.resources.image_info(image) else {
        return;
    };
    let tiles = image_tiles(rect, info.size(), background);
    if tiles.is_empty() {
        return;
    }
    renderer.set_clipping_rect(Some(rect.intersection(clip)));
    for tile in tiles {
        renderer.draw_textured_rectangle(tile, image, Color::WHITE, info.size().to_region());
    }
    renderer.set_clipping_rect(Some(clip));
}

fn paint_border(renderer: &mut dyn Renderer, el: &Element) {
    let region = el.layout.region();
    let border = el.layout.border;
    let colors = &el.style.border_color;
    let middle = region.height - border.top - border.bottom;
    let sides = [
        (BorderMask::TOP, colors.top, Region::new(region.x, region.y, region.width, border.top)),
        (
            BorderMask::BOTTOM,
            colors.bottom,
            Region::new(region.x, region.bottom() - border.bottom, region.width, border.bottom),
        ),
        (BorderMask::LEFT, colors.left, Region::new(region.x, region.y + border.top, border.left, middle)),
        (
            BorderMask::RIGHT,
            colors.right,
            Region::new(region.right() - border.right, region.y + border.top, border.right, middle),
        ),
    ];
    for (side, color, rect) in sides {
        if el.style.border_mask.contains(side) && !color.is_transparent() && !rect.is_empty() {
            renderer.draw_rectangle(rect, color);
        }
    }
}

fn paint_text(renderer: &mut dyn Renderer, el: &Element, clip: Region) {
    let (Some(buffer), Some(layout)) = (el.text.as_ref(), el.text_layout.as_ref()) else {
        return;
    };
    if !renderer.can_draw_text(&el.style.font) {
        return;
    }
    let padding_box = boundary_box(&el.layout, Boundary::InnerBorder).translate(el.layout.absolute);
    let text_clip = padding_box.intersection(clip);
    if text_clip.is_empty() {
        return;
    }
    let origin = el.layout.content_box().origin() + el.layout.absolute + el.layout.inner_offset;
    renderer.set_clipping_rect(Some(text_clip));
    for line in &layout.lines {
        let position = origin + Offset::new(0, line.y);
        let line_box = Region::new(position.x, position.y, line.width.max(1), layout.line_height);
        if line.range.is_empty() || !line_box.overlaps(text_clip) {
            continue;
        }
        let Some(text) = buffer.as_str().get(line.range.clone()) else {
            continue;
        };
        renderer.draw_text(&TextRun {
            font: &el.style.font,
            font_px: layout.font_px,
            text,
            position,
            color: el.style.text_color,
        });
    }
    renderer.set_clipping_rect(Some(clip));
}

/// Where copies of an image of `image` size land inside `rect`.
fn image_tiles(rect: Region, image: Size, background: &Background) -> Vec<Region> {
    if image.width <= 0 || image.height <= 0 || rect.is_empty() {
        return Vec::new();
    }
    let size = match background.scale {
        ImageScale::None => image,
        ImageScale::Stretch => rect.size(),
        ImageScale::Fit | ImageScale::Fill => {
            let sx = rect.width as f64 / image.width as f64;
            let sy = rect.height as f64 / image.height as f64;
            let scale = if background.scale == ImageScale::Fit { sx.min(sy) } else { sx.max(sy) };
            Size::new(
                (image.width as f64 * scale).round() as i32,
                (image.height as f64 * scale).round() as i32,
            )
        }
    };
    if size.width <= 0 || size.height <= 0 {
        return Vec::new();
    }
    let x = rect.x
        + match background.h_align {
            HAlign::Left => 0,
            HAlign::Center => (rect.width - size.width) / 2,
            HAlign::Right => rect.width - size.width,
        };
    let y = rect.y
        + match background.v_align {
            VAlign::Top => 0,
            VAlign::Center => (rect.height - size.height) / 2,
            VAlign::Bottom => rect.height - size.height,
        };
    let (repeat_x, repeat_y) = match background.repeat {
        BackgroundRepeat::None => (false, false),
        BackgroundRepeat::RepeatX => (true, false),
        BackgroundRepeat::RepeatY => (false, true),
        BackgroundRepeat::Repeat => (true, true),
    };
    let columns = tile_starts(x, size.width, rect.x, rect.right(), repeat_x);
    let rows = tile_starts(y, size.height, rect.y, rect.bottom(), repeat_y);
    rows.iter()
        .flat_map(|&ty| columns.iter().map(move |&tx| Region::new(tx, ty, size.width, size.height)))
        .collect()
}

/// Tile origins along one axis covering `[lo, hi)`, aligned on `start`.
fn tile_starts(start: i32, step: i32, lo: i32, hi: i32, repeat: bool) -> Vec<i32> {
    if !repeat {
        return vec![start];
    }
    let mut first = start - (start - lo).div_euclid(step) * step;
    if first > lo {
        first -= step;
    }
    (0..).map(|i| first + i * step).take_while(|&p| p < hi).collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::render::resources::{ImageInfo, MemoryResources, PixelFormat};
    use crate::style::{Sides, StyleValue};
    use crate::testing::{DrawCommand, RecordingRenderer};

    fn background(scale: ImageScale, repeat: BackgroundRepeat) -> Background {
        Background { scale, repeat, h_align: HAlign::Center, v_align: VAlign::Center, ..Background::default() }
    }

    #[test]
    fn fit_and_fill_keep_the_aspect_ratio() {
        let rect = Region::new(0, 0, 100, 50);
        let image = Size::new(20, 20);
        assert_eq!(
            image_tiles(rect, image, &background(ImageScale::Fit, BackgroundRepeat::None)),
            vec![Region::new(25, 0, 50, 50)]
        );
        assert_eq!(
            image_tiles(rect, image, &background(ImageScale::Fill, BackgroundRepeat::None)),
            vec![Region::new(0, -25, 100, 100)]
        );
        assert_eq!(
            image_tiles(rect, image, &background(ImageScale::Stretch, BackgroundRepeat::None)),
            vec![rect]
        );
    }

    #[test]
    fn repeat_covers_the_box_from_the_aligned_tile() {
        let rect = Region::new(0, 0, 50, 10);
        let tiles = image_tiles(rect, Size::new(20, 10), &background(ImageScale::None, BackgroundRepeat::RepeatX));
        let xs: Vec<i32> = tiles.iter().map(|t| t.x).collect();
        assert_eq!(xs, vec![-5, 15, 35]);
        assert_eq!(tile_starts(0, 4, 0, 8, true), vec![0, 4]);
        assert_eq!(tile_starts(-5, 4, 0, 6, true), vec![-1, 3]);
    }

    fn painted_surface() -> (Context, SurfaceId, ElementId, ElementId) {
        let mut ctx = Context::default();
        let s = ctx.create_surface();
        ctx.set_surface_size(s, 100, 100);
        let panel = ctx.create_element();
        ctx.update_style(panel, |st| {
            st.width = StyleValue::absolute(60);
            st.height = StyleValue::absolute(40);
            st.border = Sides::new(
                StyleValue::absolute(1),
                StyleValue::ZERO,
                StyleValue::absolute(1),
                StyleValue::ZERO,
            );
            st.background.color = Color::WHITE;
            st.background.boundary = Boundary::Outer;
        });
        ctx.attach(panel, s);
        let label = ctx.create_element();
        ctx.set_text(label, "hi");
        ctx.append_child(panel, label);
        (ctx, s, panel, label)
    }

    #[test]
    fn paints_background_border_and_text() {
        let (mut ctx, s, _, _) = painted_surface();
        let mut renderer = RecordingRenderer::new();
        assert!(ctx.paint(s, &mut renderer, None));
        let drawn: Vec<&DrawCommand> = renderer
            .commands()
            .iter()
            .filter(|c| matches!(c, DrawCommand::Rectangle { .. } | DrawCommand::Text { .. }))
            .collect();
        assert_eq!(
            drawn,
            vec![
                &DrawCommand::Rectangle { rect: Region::new(0, 0, 60, 40), color: Color::WHITE },
                &DrawCommand::Rectangle { rect: Region::new(0, 0, 60, 1), color: Color::BLACK },
                &DrawCommand::Rectangle { rect: Region::new(0, 39, 60, 1), color: Color::BLACK },
                &DrawCommand::Text { text: "hi".into(), position: Offset::new(0, 1), font_px: 12, color: Color::BLACK },
            ]
        );
        // Everything was repainted, nothing is left invalid.
        assert!(!ctx.paint(s, &mut renderer, None));
    }

    #[test]
    fn partial_paint_skips_elements_outside_the_area() {
        let (mut ctx, s, panel, _) = painted_surface();
        ctx.paint(s, &mut RecordingRenderer::new(), None);
        ctx.set_width(panel, StyleValue::absolute(30));
        let mut renderer = RecordingRenderer::new();
        assert!(ctx.paint(s, &mut renderer, Some(Region::new(80, 80, 10, 10))));
        assert!(!renderer.commands().iter().any(|c| matches!(c, DrawCommand::Rectangle { .. })));
        // The resize is still pending repaint.
        assert!(ctx.paint(s, &mut renderer, None));
    }

    #[test]
    fn batches_suppress_painting() {
        let (mut ctx, s, _, _) = painted_surface();
        ctx.begin_batch();
        assert!(!ctx.paint(s, &mut RecordingRenderer::new(), None));
        ctx.end_batch().unwrap();
        assert!(ctx.paint(s, &mut RecordingRenderer::new(), None));
    }

    #[test]
    fn images_are_uploaded_once_and_released() {
        let mut resources = MemoryResources::new();
        resources.insert("px.png", ImageInfo { width: 2, height: 1, format: PixelFormat::Rgba8 }, vec![0u8; 8]);
        let mut ctx = Context::default().with_resources(resources);
        let s = ctx.create_surface();
        ctx.set_surface_size(s, 10, 10);
        let el = ctx.create_element();
        ctx.update_style(el, |st| {
            st.width = StyleValue::absolute(4);
            st.height = StyleValue::absolute(1);
            st.background.image = Some("px.png".into());
            st.background.repeat = BackgroundRepeat::RepeatX;
        });
        ctx.attach(el, s);

        let mut renderer = RecordingRenderer::new();
        ctx.paint(s, &mut renderer, None);
        let uploads = |r: &RecordingRenderer| {
            r.commands().iter().filter(|c| matches!(c, DrawCommand::InitializeImage { .. })).count()
        };
        assert_eq!(uploads(&renderer), 1);
        let tiles = renderer.commands().iter().filter(|c| matches!(c, DrawCommand::TexturedRectangle { .. })).count();
        assert_eq!(tiles, 2);

        ctx.paint(s, &mut renderer, Some(Region::new(0, 0, 10, 10)));
        assert_eq!(uploads(&renderer), 1);

        ctx.delete_element(el);
        ctx.paint(s, &mut renderer, None);
        assert!(renderer.commands().iter().any(|c| matches!(c, DrawCommand::UninitializeImage { .. })));
    }
}
