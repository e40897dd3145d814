//! Style value resolution: tagged [`StyleValue`]s to pixels.
//!
//! [`Resolver`] carries the DPI context of one surface. Percentages resolve
//! against a caller-supplied base dimension; the caller decides which box of
//! the parent (or the surface) that base comes from.

use crate::geometry::{Size, Spacing};
use crate::style::{FontDesc, Sides, StyleValue, Unit};

/// `round(base * hundredths / 10000)`: a percentage kept in hundredths.
pub fn percent_of(base: i32, hundredths: i32) -> i32 {
    (base as f64 * hundredths as f64 / 10_000.0).round() as i32
}

/// DPI context for resolving lengths on one surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolver {
    pub dpi: u32,
    pub base_dpi: u32,
}

impl Resolver {
    pub fn new(dpi: u32, base_dpi: u32) -> Self {
        Self { dpi, base_dpi: base_dpi.max(1) }
    }

    /// Scale a pixel or point magnitude: `round(value * dpi / base_dpi)`.
    pub fn scale(&self, value: i32) -> i32 {
        (value as f64 * self.dpi as f64 / self.base_dpi as f64).round() as i32
    }

    /// Resolve `value` against `base`. `Auto` has no plain resolution and
    /// yields `None`.
    pub fn resolve(&self, value: StyleValue, base: i32) -> Option<i32> {
        match value.unit() {
            Unit::Absolute => Some(value.magnitude()),
            Unit::Percent => Some(percent_of(base, value.magnitude())),
            Unit::Pixels | Unit::Points => Some(self.scale(value.magnitude())),
            Unit::Auto => None,
        }
    }

    /// Resolve `value`, treating `Auto` as `fallback`.
    pub fn resolve_or(&self, value: StyleValue, base: i32, fallback: i32) -> i32 {
        self.resolve(value, base).unwrap_or(fallback)
    }

    /// Resolve four sides. Left/right percentages use `base.width`,
    /// top/bottom use `base.height`; `Auto` sides are zero.
    pub fn spacing(&self, sides: &Sides<StyleValue>, base: Size) -> Spacing {
        Spacing {
            top: self.resolve_or(sides.top, base.height, 0),
            right: self.resolve_or(sides.right, base.width, 0),
            bottom: self.resolve_or(sides.bottom, base.height, 0),
            left: self.resolve_or(sides.left, base.width, 0),
        }
    }

    /// Font size in device pixels. Percent sizes resolve against `fallback_px`.
    pub fn font_px(&self, font: &FontDesc, fallback_px: i32) -> i32 {
        self.resolve(font.size, fallback_px).unwrap_or(fallback_px).max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: Resolver = Resolver { dpi: 96, base_dpi: 96 };

    #[test]
    fn absolute_is_used_as_is() {
        assert_eq!(BASE.resolve(StyleValue::absolute(-30), 500), Some(-30));
        let hi = Resolver::new(192, 96);
        assert_eq!(hi.resolve(StyleValue::absolute(10), 0), Some(10));
    }

    #[test]
    fn percent_rounds_half_away_from_zero() {
        assert_eq!(percent_of(200, 5000), 100);
        assert_eq!(percent_of(201, 5000), 101);
        assert_eq!(percent_of(-201, 5000), -101);
        assert_eq!(percent_of(300, 3333), 100);
        assert_eq!(BASE.resolve(StyleValue::percent(25.0), 90), Some(23));
    }

    #[test]
    fn pixels_and_points_scale_with_dpi() {
        let r = Resolver::new(144, 96);
        assert_eq!(r.resolve(StyleValue::pixels(10), 0), Some(15));
        assert_eq!(r.resolve(StyleValue::points(3), 0), Some(5));
        assert_eq!(BASE.resolve(StyleValue::pixels(7), 0), Some(7));
    }

    #[test]
    fn auto_has_no_plain_resolution() {
        assert_eq!(BASE.resolve(StyleValue::AUTO, 100), None);
        assert_eq!(BASE.resolve_or(StyleValue::AUTO, 100, 42), 42);
    }

    #[test]
    fn spacing_uses_matching_axis() {
        let sides = Sides::new(
            StyleValue::percent(10.0),
            StyleValue::percent(10.0),
            StyleValue::AUTO,
            StyleValue::pixels(2),
        );
        assert_eq!(BASE.spacing(&sides, Size::new(200, 50)), Spacing::new(5, 20, 0, 2));
    }

    #[test]
    fn zero_base_dpi_is_guarded() {
        let r = Resolver::new(96, 0);
        assert_eq!(r.scale(4), 384);
    }
}
