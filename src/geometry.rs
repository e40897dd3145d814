//! Pixel geometry: Offset, Size, Region, Spacing.
//!
//! All coordinates are signed integer pixels in surface space. Layout code
//! mixes positive sizes with negative positions (elements may sit partially
//! outside their parent), so every field is `i32`.

use std::ops::{Add, Neg, Sub};

// ---------------------------------------------------------------------------
// Offset
// ---------------------------------------------------------------------------

/// A 2D position or displacement in pixels.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Offset {
    pub x: i32,
    pub y: i32,
}

impl Offset {
    /// The origin.
    pub const ZERO: Offset = Offset { x: 0, y: 0 };

    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl Add for Offset {
    type Output = Offset;
    #[inline]
    fn add(self, rhs: Offset) -> Offset {
        Offset { x: self.x + rhs.x, y: self.y + rhs.y }
    }
}

impl Sub for Offset {
    type Output = Offset;
    #[inline]
    fn sub(self, rhs: Offset) -> Offset {
        Offset { x: self.x - rhs.x, y: self.y - rhs.y }
    }
}

impl Neg for Offset {
    type Output = Offset;
    #[inline]
    fn neg(self) -> Offset {
        Offset { x: -self.x, y: -self.y }
    }
}

// ---------------------------------------------------------------------------
// Size
// ---------------------------------------------------------------------------

/// A width/height pair in pixels.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    pub const ZERO: Size = Size { width: 0, height: 0 };

    #[inline]
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    /// Convert to a [`Region`] positioned at the origin.
    #[inline]
    pub const fn to_region(self) -> Region {
        Region { x: 0, y: 0, width: self.width, height: self.height }
    }
}

// ---------------------------------------------------------------------------
// Region
// ---------------------------------------------------------------------------

/// A rectangle defined by its top-left corner and size.
///
/// The right and bottom edges are exclusive. A region with a non-positive
/// width or height is empty and never contains a point.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Region {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Region {
    /// An empty region at the origin.
    pub const EMPTY: Region = Region { x: 0, y: 0, width: 0, height: 0 };

    #[inline]
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    /// Build a region from an origin and a size.
    #[inline]
    pub const fn from_parts(origin: Offset, size: Size) -> Self {
        Self { x: origin.x, y: origin.y, width: size.width, height: size.height }
    }

    /// The right edge (exclusive).
    #[inline]
    pub const fn right(self) -> i32 {
        self.x + self.width
    }

    /// The bottom edge (exclusive).
    #[inline]
    pub const fn bottom(self) -> i32 {
        self.y + self.height
    }

    #[inline]
    pub const fn origin(self) -> Offset {
        Offset { x: self.x, y: self.y }
    }

    #[inline]
    pub const fn size(self) -> Size {
        Size { width: self.width, height: self.height }
    }

    /// Whether the region has no area.
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Whether the point lies inside this region.
    #[inline]
    pub const fn contains(self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Whether the two regions share a non-zero area.
    #[inline]
    pub const fn overlaps(self, other: Region) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    /// The shared area of two regions, or [`Region::EMPTY`].
    pub fn intersection(self, other: Region) -> Region {
        let x1 = self.x.max(other.x);
        let y1 = self.y.max(other.y);
        let x2 = self.right().min(other.right());
        let y2 = self.bottom().min(other.bottom());
        if x2 <= x1 || y2 <= y1 {
            Region::EMPTY
        } else {
            Region::new(x1, y1, x2 - x1, y2 - y1)
        }
    }

    /// The bounding rectangle of both regions.
    ///
    /// Empty operands are ignored so that accumulating into an empty region
    /// does not drag the bounds towards the origin.
    pub fn union(self, other: Region) -> Region {
        if self.is_empty() {
            return other;
        }
        if other.is_empty() {
            return self;
        }
        let x1 = self.x.min(other.x);
        let y1 = self.y.min(other.y);
        let x2 = self.right().max(other.right());
        let y2 = self.bottom().max(other.bottom());
        Region::new(x1, y1, x2 - x1, y2 - y1)
    }

    #[inline]
    pub const fn translate(self, offset: Offset) -> Region {
        Region { x: self.x + offset.x, y: self.y + offset.y, width: self.width, height: self.height }
    }

    /// Contract the region inward by `spacing`, clamping the size at zero.
    #[inline]
    pub const fn shrink(self, spacing: Spacing) -> Region {
        let w = self.width - spacing.left - spacing.right;
        let h = self.height - spacing.top - spacing.bottom;
        Region {
            x: self.x + spacing.left,
            y: self.y + spacing.top,
            width: if w > 0 { w } else { 0 },
            height: if h > 0 { h } else { 0 },
        }
    }

    /// Expand the region outward by `spacing`.
    #[inline]
    pub const fn grow(self, spacing: Spacing) -> Region {
        Region {
            x: self.x - spacing.left,
            y: self.y - spacing.top,
            width: self.width + spacing.left + spacing.right,
            height: self.height + spacing.top + spacing.bottom,
        }
    }
}

// ---------------------------------------------------------------------------
// Spacing
// ---------------------------------------------------------------------------

/// Resolved per-side pixel amounts for margin, border and padding.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Spacing {
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
    pub left: i32,
}

impl Spacing {
    pub const ZERO: Spacing = Spacing { top: 0, right: 0, bottom: 0, left: 0 };

    #[inline]
    pub const fn new(top: i32, right: i32, bottom: i32, left: i32) -> Self {
        Self { top, right, bottom, left }
    }

    #[inline]
    pub const fn all(value: i32) -> Self {
        Self { top: value, right: value, bottom: value, left: value }
    }

    /// `left + right`.
    #[inline]
    pub const fn width(self) -> i32 {
        self.left + self.right
    }

    /// `top + bottom`.
    #[inline]
    pub const fn height(self) -> i32 {
        self.top + self.bottom
    }
}

impl Add for Spacing {
    type Output = Spacing;
    #[inline]
    fn add(self, rhs: Spacing) -> Spacing {
        Spacing {
            top: self.top + rhs.top,
            right: self.right + rhs.right,
            bottom: self.bottom + rhs.bottom,
            left: self.left + rhs.left,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_arithmetic() {
        let a = Offset::new(1, 2);
        let b = Offset::new(3, -4);
        assert_eq!(a + b, Offset::new(4, -2));
        assert_eq!(b - a, Offset::new(2, -6));
        assert_eq!(-a, Offset::new(-1, -2));
    }

    #[test]
    fn region_edges_exclusive() {
        let r = Region::new(5, 5, 10, 10);
        assert!(r.contains(5, 5));
        assert!(r.contains(14, 14));
        assert!(!r.contains(15, 14));
        assert!(!r.contains(14, 15));
        assert!(!r.contains(4, 5));
    }

    #[test]
    fn empty_region_contains_nothing() {
        assert!(!Region::new(3, 3, 0, 4).contains(3, 3));
        assert!(Region::new(0, 0, -2, 5).is_empty());
    }

    #[test]
    fn intersection_and_overlap() {
        let a = Region::new(0, 0, 10, 10);
        let b = Region::new(5, 5, 10, 10);
        assert!(a.overlaps(b));
        assert_eq!(a.intersection(b), Region::new(5, 5, 5, 5));
        let c = Region::new(10, 0, 5, 5);
        assert!(!a.overlaps(c));
        assert_eq!(a.intersection(c), Region::EMPTY);
    }

    #[test]
    fn union_ignores_empty() {
        let a = Region::new(10, 10, 5, 5);
        assert_eq!(Region::EMPTY.union(a), a);
        assert_eq!(a.union(Region::EMPTY), a);
        let b = Region::new(0, 20, 2, 2);
        assert_eq!(a.union(b), Region::new(0, 10, 15, 12));
    }

    #[test]
    fn shrink_clamps_and_grow_restores() {
        let r = Region::new(0, 0, 10, 6);
        let s = Spacing::new(1, 2, 3, 4);
        assert_eq!(r.shrink(s), Region::new(4, 1, 4, 2));
        assert_eq!(r.shrink(s).grow(s), r);
        assert_eq!(r.shrink(Spacing::all(8)).size(), Size::ZERO);
    }

    #[test]
    fn spacing_extents() {
        let s = Spacing::new(1, 2, 3, 4);
        assert_eq!(s.width(), 6);
        assert_eq!(s.height(), 4);
        assert_eq!(s + Spacing::all(1), Spacing::new(2, 3, 4, 5));
    }
}
