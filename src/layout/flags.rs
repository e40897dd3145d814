//! Invalid/changed bitfields carried by every element's layout record.
//!
//! The same flag type serves both words: `invalid` says which facets must be
//! recomputed, `changed` says which facets moved during the last validation
//! and have not yet been reported.

use bitflags::bitflags;

use crate::style::Axis;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct LayoutFlags: u16 {
        /// Relative x position.
        const X = 1 << 0;
        /// Relative y position.
        const Y = 1 << 1;
        const WIDTH = 1 << 2;
        const HEIGHT = 1 << 3;
        /// Text layout object.
        const TEXT = 1 << 4;
        /// Report x as changed even if the value is numerically the same.
        const FORCE_X = 1 << 5;
        const FORCE_Y = 1 << 6;
        const FORCE_WIDTH = 1 << 7;
        const FORCE_HEIGHT = 1 << 8;
        /// Changed-only: absolute position moved.
        const ABSOLUTE = 1 << 9;

        const POSITION = Self::X.bits() | Self::Y.bits();
        const SIZE = Self::WIDTH.bits() | Self::HEIGHT.bits();
        const GEOMETRY = Self::POSITION.bits() | Self::SIZE.bits() | Self::TEXT.bits();
        const FORCE_ALL = Self::FORCE_X.bits()
            | Self::FORCE_Y.bits()
            | Self::FORCE_WIDTH.bits()
            | Self::FORCE_HEIGHT.bits();
    }
}

impl LayoutFlags {
    /// The position flag for `axis`.
    pub fn position(axis: Axis) -> LayoutFlags {
        match axis {
            Axis::Horizontal => LayoutFlags::X,
            Axis::Vertical => LayoutFlags::Y,
        }
    }

    /// The size flag for `axis`.
    pub fn size(axis: Axis) -> LayoutFlags {
        match axis {
            Axis::Horizontal => LayoutFlags::WIDTH,
            Axis::Vertical => LayoutFlags::HEIGHT,
        }
    }

    /// The forced counterpart of the position flag for `axis`.
    pub fn force_position(axis: Axis) -> LayoutFlags {
        match axis {
            Axis::Horizontal => LayoutFlags::FORCE_X,
            Axis::Vertical => LayoutFlags::FORCE_Y,
        }
    }

    /// The forced counterpart of the size flag for `axis`.
    pub fn force_size(axis: Axis) -> LayoutFlags {
        match axis {
            Axis::Horizontal => LayoutFlags::FORCE_WIDTH,
            Axis::Vertical => LayoutFlags::FORCE_HEIGHT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn composites_cover_their_parts() {
        assert!(LayoutFlags::GEOMETRY.contains(LayoutFlags::X | LayoutFlags::HEIGHT | LayoutFlags::TEXT));
        assert!(!LayoutFlags::GEOMETRY.intersects(LayoutFlags::FORCE_ALL));
        assert!(!LayoutFlags::GEOMETRY.contains(LayoutFlags::ABSOLUTE));
    }

    #[test]
    fn axis_helpers() {
        assert_eq!(LayoutFlags::position(Axis::Vertical), LayoutFlags::Y);
        assert_eq!(LayoutFlags::size(Axis::Horizontal), LayoutFlags::WIDTH);
        assert_eq!(LayoutFlags::force_size(Axis::Vertical), LayoutFlags::FORCE_HEIGHT);
    }
}
