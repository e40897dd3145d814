//! Node types: ElementId, SurfaceId, Element, Surface, LayoutRecord.

use std::any::Any;
use std::fmt;

use slotmap::new_key_type;

use crate::event::handler::Listeners;
use crate::geometry::{Offset, Region, Size, Spacing};
use crate::layout::flags::LayoutFlags;
use crate::render::resources::ImageHandle;
use crate::style::{Axis, Positioning, Style};
use crate::text::{TextBuffer, TextLayout};

new_key_type! {
    /// Handle of an element. Copy, lightweight (u64); stale handles are
    /// detected by the arena instead of dangling.
    pub struct ElementId;

    /// Handle of a drawing surface.
    pub struct SurfaceId;
}

// ---------------------------------------------------------------------------
// LayoutRecord
// ---------------------------------------------------------------------------

/// Cached geometry of one element.
///
/// `x`/`y` locate the border box relative to the parent's border box, or to
/// the surface for roots and `Absolute` elements. `absolute` is derived from
/// the chain of relative positions and is only refreshed by the post-pass of
/// a validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayoutRecord {
    pub x: i32,
    pub y: i32,
    pub absolute: Offset,
    pub width: i32,
    pub height: i32,
    /// Size before min/max clamping.
    pub unclamped_width: i32,
    pub unclamped_height: i32,
    pub margin: Spacing,
    pub border: Spacing,
    pub padding: Spacing,
    /// Scroll offset applied to children and text.
    pub inner_offset: Offset,
    /// Facets that must be recomputed.
    pub invalid: LayoutFlags,
    /// Facets that changed during the last validation and are not reported yet.
    pub changed: LayoutFlags,
    /// Surface rectangle the element occupied when it was last reported.
    pub(crate) painted: Region,
}

impl LayoutRecord {
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Border box in surface coordinates.
    pub fn region(&self) -> Region {
        Region::from_parts(self.absolute, self.size())
    }

    /// Size of the border box along `axis`.
    pub fn extent(&self, axis: Axis) -> i32 {
        match axis {
            Axis::Horizontal => self.width,
            Axis::Vertical => self.height,
        }
    }

    /// Size including margins along `axis`.
    pub fn outer_extent(&self, axis: Axis) -> i32 {
        match axis {
            Axis::Horizontal => self.width.saturating_add(self.margin.width()),
            Axis::Vertical => self.height.saturating_add(self.margin.height()),
        }
    }

    /// Relative position along `axis`.
    pub fn position(&self, axis: Axis) -> i32 {
        match axis {
            Axis::Horizontal => self.x,
            Axis::Vertical => self.y,
        }
    }

    /// Border plus padding: the distance from the border box to the content box.
    pub fn insets(&self) -> Spacing {
        self.border + self.padding
    }

    /// Content box relative to the element's own border-box origin.
    pub fn content_box(&self) -> Region {
        self.size().to_region().shrink(self.insets())
    }
}

// ---------------------------------------------------------------------------
// Element
// ---------------------------------------------------------------------------

/// One node of the element tree.
///
/// Elements are owned by the [`Dom`](super::Dom) arena; tree links are
/// handles into the same arena and form one doubly linked sibling list per
/// level.
pub struct Element {
    /// Optional human-readable id used by [`Dom::find_by_id`](super::Dom::find_by_id).
    pub(crate) id: Option<String>,
    pub(crate) style: Style,
    pub(crate) layout: LayoutRecord,

    pub(crate) parent: Option<ElementId>,
    pub(crate) first_child: Option<ElementId>,
    pub(crate) last_child: Option<ElementId>,
    pub(crate) prev_sibling: Option<ElementId>,
    pub(crate) next_sibling: Option<ElementId>,

    /// Surface of the nearest surfaced ancestor (or of the element itself).
    pub(crate) surface: Option<SurfaceId>,

    pub(crate) text: Option<TextBuffer>,
    pub(crate) text_layout: Option<TextLayout>,
    pub(crate) image: Option<ImageHandle>,
    pub(crate) listeners: Listeners,

    /// Deleted while an event was being dispatched; swept afterwards.
    pub(crate) doomed: bool,
}

impl Element {
    pub(crate) fn new() -> Self {
        Self {
            id: None,
            style: Style::default(),
            layout: LayoutRecord::default(),
            parent: None,
            first_child: None,
            last_child: None,
            prev_sibling: None,
            next_sibling: None,
            surface: None,
            text: None,
            text_layout: None,
            image: None,
            listeners: Listeners::new(),
            doomed: false,
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn style(&self) -> &Style {
        &self.style
    }

    pub fn layout(&self) -> &LayoutRecord {
        &self.layout
    }

    pub fn parent(&self) -> Option<ElementId> {
        self.parent
    }

    pub fn surface(&self) -> Option<SurfaceId> {
        self.surface
    }

    /// Text content, if any was set.
    pub fn text(&self) -> Option<&str> {
        self.text.as_ref().map(TextBuffer::as_str)
    }

    pub fn text_layout(&self) -> Option<&TextLayout> {
        self.text_layout.as_ref()
    }

    /// Whether the element is a member of its surface's stacking layers:
    /// surface roots and `Absolute` elements.
    pub fn is_layer(&self) -> bool {
        self.parent.is_none() || self.style.positioning == Positioning::Absolute
    }

    /// Whether the element takes part in its parent's flow.
    pub(crate) fn in_flow(&self) -> bool {
        self.style.is_auto_positioned() && self.style.is_visible()
    }
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Element")
            .field("id", &self.id)
            .field("parent", &self.parent)
            .field("surface", &self.surface)
            .field("layout", &self.layout)
            .field("doomed", &self.doomed)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Surface
// ---------------------------------------------------------------------------

/// A drawing target holding root-level elements.
pub struct Surface {
    pub(crate) width: i32,
    pub(crate) height: i32,
    pub(crate) dpi: u32,
    /// Bounding rectangle of everything that needs repainting.
    pub(crate) invalid: Region,
    /// Parentless elements in attachment order.
    pub(crate) roots: Vec<ElementId>,
    /// Roots and `Absolute` elements, ordered bottom to top.
    pub(crate) layers: Vec<ElementId>,
    pub(crate) user_data: Option<Box<dyn Any>>,
    pub(crate) doomed: bool,
}

impl Surface {
    pub(crate) fn new(dpi: u32) -> Self {
        Self {
            width: 0,
            height: 0,
            dpi,
            invalid: Region::EMPTY,
            roots: Vec::new(),
            layers: Vec::new(),
            user_data: None,
            doomed: false,
        }
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// The whole surface as a region at the origin.
    pub fn bounds(&self) -> Region {
        self.size().to_region()
    }

    pub fn dpi(&self) -> u32 {
        self.dpi
    }

    pub fn invalid_region(&self) -> Region {
        self.invalid
    }

    pub fn roots(&self) -> &[ElementId] {
        &self.roots
    }

    pub fn layers(&self) -> &[ElementId] {
        &self.layers
    }

    pub fn user_data(&self) -> Option<&dyn Any> {
        self.user_data.as_deref()
    }

    /// Grow the invalid rectangle to cover `region`, clipped to the surface.
    pub(crate) fn invalidate(&mut self, region: Region) {
        let clipped = region.intersection(self.bounds());
        self.invalid = self.invalid.union(clipped);
    }
}

impl fmt::Debug for Surface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Surface")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("dpi", &self.dpi)
            .field("invalid", &self.invalid)
            .field("roots", &self.roots)
            .field("layers", &self.layers)
            .finish_non_exhaustive()
    }
}
