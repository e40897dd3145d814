//! Enumerated style properties and the boolean flag word.
//!
//! Enumerated properties are small integer codes (`code()` / `from_code()`),
//! booleans live together in [`StyleFlags`].

use bitflags::bitflags;

/// Declares a fieldless enum whose variants map to consecutive `u8` codes.
/// The first variant is the default.
macro_rules! coded_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident { $first:ident $(, $rest:ident)* $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
        pub enum $name {
            #[default]
            $first,
            $($rest,)*
        }

        impl $name {
            const ALL: &'static [$name] = &[$name::$first, $($name::$rest,)*];

            /// The integer code of this variant.
            pub fn code(self) -> u8 {
                self as u8
            }

            /// Decode an integer code. Unknown codes give `None`.
            pub fn from_code(code: u8) -> Option<Self> {
                Self::ALL.get(code as usize).copied()
            }
        }
    };
}

coded_enum! {
    /// How an element picks its position.
    pub enum Positioning { Auto, Relative, Absolute }
}

coded_enum! {
    /// Direction along which a parent stacks its auto-positioned children.
    pub enum Axis { Vertical, Horizontal }
}

impl Axis {
    /// The orthogonal axis.
    pub fn cross(self) -> Axis {
        match self {
            Axis::Horizontal => Axis::Vertical,
            Axis::Vertical => Axis::Horizontal,
        }
    }
}

coded_enum! {
    /// Horizontal placement of children (or of a background image).
    pub enum HAlign { Left, Center, Right }
}

coded_enum! {
    /// Vertical placement of children (or of a background image).
    pub enum VAlign { Top, Center, Bottom }
}

coded_enum! {
    /// Which box of an element a measurement refers to.
    ///
    /// `Inner` is the content box, `InnerBorder` the padding box and `Outer`
    /// the border box.
    pub enum Boundary { Inner, InnerBorder, Outer }
}

coded_enum! {
    /// Whether descendants are clipped to this element.
    pub enum ClipMode { Visible, Clip }
}

coded_enum! {
    /// Tiling of a background image.
    pub enum BackgroundRepeat { None, RepeatX, RepeatY, Repeat }
}

coded_enum! {
    /// Scaling of a background image inside its boundary.
    pub enum ImageScale { None, Fit, Fill, Stretch }
}

coded_enum! {
    /// Pointer icon requested by an element.
    ///
    /// `Inherit` defers to the nearest ancestor that sets one.
    pub enum CursorIcon {
        Inherit,
        Arrow,
        Hand,
        Text,
        Move,
        ResizeHorizontal,
        ResizeVertical,
        ResizeNwse,
        ResizeNesw,
        NotAllowed,
        Wait,
    }
}

coded_enum! {
    /// How a dragged element's position is constrained.
    ///
    /// `Border` keeps the element's outer box inside the parent's
    /// position-origin box; `ClickPoint` only keeps the grabbed point inside.
    pub enum DragClamp { None, Border, ClickPoint }
}

bitflags! {
    /// Boolean style properties.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct StyleFlags: u32 {
        const VISIBLE = 1 << 0;
        const DRAGGABLE = 1 << 1;
        const RESIZE_WIDTH = 1 << 2;
        const RESIZE_HEIGHT = 1 << 3;
        const FOCUSABLE = 1 << 4;
        const EDITABLE = 1 << 5;
        const MULTI_LINE = 1 << 6;
        const WORD_WRAP = 1 << 7;
        /// Scale percent-sized children so they exactly fill the width.
        const FLEX_CHILDREN_WIDTH = 1 << 8;
        /// Scale percent-sized children so they exactly fill the height.
        const FLEX_CHILDREN_HEIGHT = 1 << 9;
        /// `right` wins over `left` when both are set.
        const RIGHT_PRIORITY = 1 << 10;
        /// `bottom` wins over `top` when both are set.
        const BOTTOM_PRIORITY = 1 << 11;
    }
}

impl Default for StyleFlags {
    fn default() -> Self {
        StyleFlags::VISIBLE
    }
}

bitflags! {
    /// Which sides of the border are drawn.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct BorderMask: u8 {
        const TOP = 1 << 0;
        const RIGHT = 1 << 1;
        const BOTTOM = 1 << 2;
        const LEFT = 1 << 3;
    }
}

impl Default for BorderMask {
    fn default() -> Self {
        BorderMask::all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_round_trip_through_lookup() {
        assert_eq!(Positioning::Absolute.code(), 2);
        assert_eq!(Positioning::from_code(1), Some(Positioning::Relative));
        assert_eq!(Positioning::from_code(3), None);
        assert_eq!(CursorIcon::from_code(CursorIcon::Wait.code()), Some(CursorIcon::Wait));
    }

    #[test]
    fn first_variant_is_default() {
        assert_eq!(Axis::default(), Axis::Vertical);
        assert_eq!(Boundary::default(), Boundary::Inner);
        assert_eq!(DragClamp::default(), DragClamp::None);
    }

    #[test]
    fn cross_axis() {
        assert_eq!(Axis::Vertical.cross(), Axis::Horizontal);
        assert_eq!(Axis::Horizontal.cross(), Axis::Vertical);
    }

    #[test]
    fn default_flags_are_visible_only() {
        assert_eq!(StyleFlags::default(), StyleFlags::VISIBLE);
        assert_eq!(BorderMask::default().bits(), 0b1111);
    }
}
