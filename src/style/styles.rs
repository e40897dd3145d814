//! The per-element [`Style`] record.
//!
//! Every property has a concrete value (there is no cascade): a freshly
//! created element carries [`Style::default`], and callers mutate fields
//! through the context so that each change can be turned into layout
//! invalidation.

use bitflags::bitflags;

use super::color::Color;
use super::props::{
    Axis, BackgroundRepeat, BorderMask, Boundary, ClipMode, CursorIcon, DragClamp, HAlign,
    ImageScale, Positioning, StyleFlags, VAlign,
};
use super::value::StyleValue;

/// Four per-side values in CSS order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Sides<T> {
    pub top: T,
    pub right: T,
    pub bottom: T,
    pub left: T,
}

impl<T: Copy> Sides<T> {
    pub fn all(value: T) -> Self {
        Self { top: value, right: value, bottom: value, left: value }
    }

    pub fn new(top: T, right: T, bottom: T, left: T) -> Self {
        Self { top, right, bottom, left }
    }
}

/// Font selection handed to the text layouter and renderer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FontDesc {
    pub family: String,
    pub weight: u16,
    pub italic: bool,
    /// Font size; `Points`/`Pixels` are DPI-scaled, `Absolute` is used as-is.
    pub size: StyleValue,
}

impl FontDesc {
    pub fn new(family: impl Into<String>, size: StyleValue) -> Self {
        Self { family: family.into(), weight: 400, italic: false, size }
    }
}

impl Default for FontDesc {
    fn default() -> Self {
        Self::new("sans-serif", StyleValue::points(12))
    }
}

/// Background painting options.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Background {
    pub color: Color,
    /// Resource path of the background image, loaded through the
    /// resource manager when set.
    pub image: Option<String>,
    pub boundary: Boundary,
    pub h_align: HAlign,
    pub v_align: VAlign,
    pub repeat: BackgroundRepeat,
    pub scale: ImageScale,
}

bitflags! {
    /// Groups of properties that differ between two styles.
    ///
    /// Each group maps onto one layout propagation rule, so the engine never
    /// has to compare individual fields.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct StyleChanges: u32 {
        const POSITIONING = 1 << 0;
        /// `left` or `right` (or the right-priority flag).
        const OFFSET_X = 1 << 1;
        /// `top` or `bottom` (or the bottom-priority flag).
        const OFFSET_Y = 1 << 2;
        /// `width`, `min_width` or `max_width`.
        const WIDTH = 1 << 3;
        const HEIGHT = 1 << 4;
        /// Horizontal margin, border or padding.
        const SPACING_X = 1 << 5;
        const SPACING_Y = 1 << 6;
        const CHILD_AXIS = 1 << 7;
        const H_ALIGN = 1 << 8;
        const V_ALIGN = 1 << 9;
        const CHILDREN_SIZE_BOUNDARY = 1 << 10;
        const POSITION_ORIGIN = 1 << 11;
        const FLEX = 1 << 12;
        const VISIBILITY = 1 << 13;
        const FONT = 1 << 14;
        const Z_INDEX = 1 << 15;
        const TEXT_WRAP = 1 << 16;
        /// Anything that only needs a repaint.
        const PAINT = 1 << 17;
        const BACKGROUND_IMAGE = 1 << 18;
    }
}

/// All style properties of one element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Style {
    pub positioning: Positioning,
    pub left: StyleValue,
    pub top: StyleValue,
    pub right: StyleValue,
    pub bottom: StyleValue,
    /// Stacking order among the surface's layers (roots and absolute elements).
    pub z_index: i32,

    pub width: StyleValue,
    pub min_width: StyleValue,
    pub max_width: StyleValue,
    pub height: StyleValue,
    pub min_height: StyleValue,
    pub max_height: StyleValue,

    pub margin: Sides<StyleValue>,
    pub padding: Sides<StyleValue>,
    pub border: Sides<StyleValue>,
    pub border_color: Sides<Color>,
    pub border_mask: BorderMask,

    pub background: Background,

    pub child_axis: Axis,
    pub h_align: HAlign,
    pub v_align: VAlign,
    /// Parent box that percent sizes of children resolve against.
    pub children_size_boundary: Boundary,
    /// Parent box that relative positions of children are measured from.
    pub position_origin: Boundary,
    pub clip_mode: ClipMode,
    pub clip_boundary: Boundary,

    pub font: FontDesc,
    pub text_color: Color,
    pub cursor: CursorIcon,
    pub drag_clamp: DragClamp,
    pub tooltip: Option<String>,

    pub flags: StyleFlags,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            positioning: Positioning::Auto,
            left: StyleValue::AUTO,
            top: StyleValue::AUTO,
            right: StyleValue::AUTO,
            bottom: StyleValue::AUTO,
            z_index: 0,
            width: StyleValue::AUTO,
            min_width: StyleValue::AUTO,
            max_width: StyleValue::AUTO,
            height: StyleValue::AUTO,
            min_height: StyleValue::AUTO,
            max_height: StyleValue::AUTO,
            margin: Sides::all(StyleValue::ZERO),
            padding: Sides::all(StyleValue::ZERO),
            border: Sides::all(StyleValue::ZERO),
            border_color: Sides::all(Color::BLACK),
            border_mask: BorderMask::default(),
            background: Background::default(),
            child_axis: Axis::Vertical,
            h_align: HAlign::Left,
            v_align: VAlign::Top,
            children_size_boundary: Boundary::Inner,
            position_origin: Boundary::Inner,
            clip_mode: ClipMode::Visible,
            clip_boundary: Boundary::InnerBorder,
            font: FontDesc::default(),
            text_color: Color::BLACK,
            cursor: CursorIcon::Inherit,
            drag_clamp: DragClamp::None,
            tooltip: None,
            flags: StyleFlags::default(),
        }
    }
}

impl Style {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_visible(&self) -> bool {
        self.flags.contains(StyleFlags::VISIBLE)
    }

    pub fn is_auto_positioned(&self) -> bool {
        self.positioning == Positioning::Auto
    }

    /// Whether keyboard focus lands on this element when it is pressed.
    pub fn takes_focus(&self) -> bool {
        self.flags.intersects(StyleFlags::FOCUSABLE | StyleFlags::EDITABLE)
    }

    /// `(size, min, max)` along `axis`.
    pub fn extent(&self, axis: Axis) -> (StyleValue, StyleValue, StyleValue) {
        match axis {
            Axis::Horizontal => (self.width, self.min_width, self.max_width),
            Axis::Vertical => (self.height, self.min_height, self.max_height),
        }
    }

    /// `(near, far)` offsets along `axis`: left/right or top/bottom.
    pub fn offsets(&self, axis: Axis) -> (StyleValue, StyleValue) {
        match axis {
            Axis::Horizontal => (self.left, self.right),
            Axis::Vertical => (self.top, self.bottom),
        }
    }

    /// Whether the far offset wins over the near one along `axis`.
    pub fn far_priority(&self, axis: Axis) -> bool {
        match axis {
            Axis::Horizontal => self.flags.contains(StyleFlags::RIGHT_PRIORITY),
            Axis::Vertical => self.flags.contains(StyleFlags::BOTTOM_PRIORITY),
        }
    }

    /// Whether this element flexes its percent-sized children along `axis`.
    pub fn flexes(&self, axis: Axis) -> bool {
        let flag = match axis {
            Axis::Horizontal => StyleFlags::FLEX_CHILDREN_WIDTH,
            Axis::Vertical => StyleFlags::FLEX_CHILDREN_HEIGHT,
        };
        self.child_axis == axis && self.flags.contains(flag)
    }

    /// Which property groups differ between `self` and `other`.
    pub fn diff(&self, other: &Style) -> StyleChanges {
        let mut changes = StyleChanges::empty();
        let mut mark = |differs: bool, group: StyleChanges| {
            if differs {
                changes |= group;
            }
        };
        mark(self.positioning != other.positioning, StyleChanges::POSITIONING);
        mark(
            self.left != other.left
                || self.right != other.right
                || self.far_priority(Axis::Horizontal) != other.far_priority(Axis::Horizontal),
            StyleChanges::OFFSET_X,
        );
        mark(
            self.top != other.top
                || self.bottom != other.bottom
                || self.far_priority(Axis::Vertical) != other.far_priority(Axis::Vertical),
            StyleChanges::OFFSET_Y,
        );
        mark(self.extent(Axis::Horizontal) != other.extent(Axis::Horizontal), StyleChanges::WIDTH);
        mark(self.extent(Axis::Vertical) != other.extent(Axis::Vertical), StyleChanges::HEIGHT);
        let horizontal = |s: &Style| {
            [s.margin.left, s.margin.right, s.border.left, s.border.right, s.padding.left, s.padding.right]
        };
        let vertical = |s: &Style| {
            [s.margin.top, s.margin.bottom, s.border.top, s.border.bottom, s.padding.top, s.padding.bottom]
        };
        mark(horizontal(self) != horizontal(other), StyleChanges::SPACING_X);
        mark(vertical(self) != vertical(other), StyleChanges::SPACING_Y);
        mark(self.child_axis != other.child_axis, StyleChanges::CHILD_AXIS);
        mark(self.h_align != other.h_align, StyleChanges::H_ALIGN);
        mark(self.v_align != other.v_align, StyleChanges::V_ALIGN);
        mark(
            self.children_size_boundary != other.children_size_boundary,
            StyleChanges::CHILDREN_SIZE_BOUNDARY,
        );
        mark(self.position_origin != other.position_origin, StyleChanges::POSITION_ORIGIN);
        let flex = StyleFlags::FLEX_CHILDREN_WIDTH | StyleFlags::FLEX_CHILDREN_HEIGHT;
        mark((self.flags & flex) != (other.flags & flex), StyleChanges::FLEX);
        mark(self.is_visible() != other.is_visible(), StyleChanges::VISIBILITY);
        mark(self.font != other.font, StyleChanges::FONT);
        mark(self.z_index != other.z_index, StyleChanges::Z_INDEX);
        let wrap = StyleFlags::WORD_WRAP | StyleFlags::MULTI_LINE;
        mark((self.flags & wrap) != (other.flags & wrap), StyleChanges::TEXT_WRAP);
        mark(self.background.image != other.background.image, StyleChanges::BACKGROUND_IMAGE);
        mark(
            self.border_color != other.border_color
                || self.border_mask != other.border_mask
                || self.background != other.background
                || self.text_color != other.text_color
                || self.clip_mode != other.clip_mode
                || self.clip_boundary != other.clip_boundary,
            StyleChanges::PAINT,
        );
        changes
    }

    /// Whether the element may be resized along `axis` by a gripper.
    pub fn resizable(&self, axis: Axis) -> bool {
        match axis {
            Axis::Horizontal => self.flags.contains(StyleFlags::RESIZE_WIDTH),
            Axis::Vertical => self.flags.contains(StyleFlags::RESIZE_HEIGHT),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_style_is_auto_flow() {
        let style = Style::new();
        assert!(style.is_visible());
        assert!(style.is_auto_positioned());
        assert!(style.width.is_auto());
        assert_eq!(style.margin, Sides::all(StyleValue::ZERO));
        assert!(!style.takes_focus());
    }

    #[test]
    fn axis_accessors_pick_matching_fields() {
        let mut style = Style::new();
        style.width = StyleValue::pixels(10);
        style.min_height = StyleValue::pixels(3);
        style.right = StyleValue::absolute(4);
        assert_eq!(style.extent(Axis::Horizontal).0, StyleValue::pixels(10));
        assert_eq!(style.extent(Axis::Vertical).1, StyleValue::pixels(3));
        assert_eq!(style.offsets(Axis::Horizontal).1, StyleValue::absolute(4));
    }

    #[test]
    fn diff_groups_changed_properties() {
        let base = Style::new();
        assert!(base.diff(&base.clone()).is_empty());

        let mut other = base.clone();
        other.min_width = StyleValue::pixels(10);
        other.padding.top = StyleValue::pixels(2);
        other.flags |= StyleFlags::RIGHT_PRIORITY;
        assert_eq!(
            base.diff(&other),
            StyleChanges::WIDTH | StyleChanges::SPACING_Y | StyleChanges::OFFSET_X
        );

        let mut hidden = base.clone();
        hidden.flags.remove(StyleFlags::VISIBLE);
        hidden.text_color = Color::WHITE;
        assert_eq!(base.diff(&hidden), StyleChanges::VISIBILITY | StyleChanges::PAINT);
    }

    #[test]
    fn flexing_requires_matching_child_axis() {
        let mut style = Style::new();
        style.flags |= StyleFlags::FLEX_CHILDREN_WIDTH;
        assert!(!style.flexes(Axis::Horizontal));
        style.child_axis = Axis::Horizontal;
        assert!(style.flexes(Axis::Horizontal));
        assert!(!style.flexes(Axis::Vertical));
    }
}
