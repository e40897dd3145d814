//! Tagged style numbers: a [`Unit`] plus a signed magnitude.
//!
//! Every geometric property (position, size, min/max, margin, padding,
//! border) is a [`StyleValue`]. Magnitudes are limited to 28 bits so a value
//! fits in one `u32` next to its 4-bit unit tag; see [`StyleValue::pack`].

use std::fmt;

/// Largest magnitude a style value can hold.
pub const STYLE_VALUE_MAX: i32 = (1 << 27) - 1;
/// Smallest (most negative) magnitude a style value can hold.
pub const STYLE_VALUE_MIN: i32 = -(1 << 27);

const MAGNITUDE_MASK: u32 = 0x0FFF_FFFF;

/// How a style magnitude is interpreted during resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum Unit {
    /// Base units, used as-is.
    Absolute = 0,
    /// Hundredths of a percent of the relevant parent dimension.
    Percent = 1,
    /// Device-independent pixels, scaled by `dpi / base_dpi`.
    Pixels = 2,
    /// Same scaling as pixels; reserved for font sizes.
    Points = 3,
    /// Resolved by a different path (size to children / flexed remainder).
    #[default]
    Auto = 4,
}

impl Unit {
    /// Decode a 4-bit unit tag. Unknown tags decode as [`Unit::Auto`].
    pub fn from_tag(tag: u8) -> Unit {
        match tag {
            0 => Unit::Absolute,
            1 => Unit::Percent,
            2 => Unit::Pixels,
            3 => Unit::Points,
            _ => Unit::Auto,
        }
    }
}

/// A tagged style number.
///
/// Constructors clamp out-of-range magnitudes to
/// [`STYLE_VALUE_MIN`]..=[`STYLE_VALUE_MAX`] instead of rejecting them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct StyleValue {
    unit: Unit,
    magnitude: i32,
}

impl StyleValue {
    /// `auto`.
    pub const AUTO: StyleValue = StyleValue { unit: Unit::Auto, magnitude: 0 };
    /// Zero base units.
    pub const ZERO: StyleValue = StyleValue { unit: Unit::Absolute, magnitude: 0 };

    fn with(unit: Unit, magnitude: i64) -> Self {
        let magnitude = magnitude.clamp(STYLE_VALUE_MIN as i64, STYLE_VALUE_MAX as i64) as i32;
        Self { unit, magnitude }
    }

    /// A value in base units.
    pub fn absolute(value: i32) -> Self {
        Self::with(Unit::Absolute, value as i64)
    }

    /// A DPI-scaled pixel value.
    pub fn pixels(value: i32) -> Self {
        Self::with(Unit::Pixels, value as i64)
    }

    /// A DPI-scaled point value.
    pub fn points(value: i32) -> Self {
        Self::with(Unit::Points, value as i64)
    }

    /// A percentage, kept to two decimal places (`33.333` becomes `33.33`).
    pub fn percent(value: f32) -> Self {
        Self::with(Unit::Percent, (value as f64 * 100.0).round() as i64)
    }

    /// A percentage given directly in hundredths (`5000` is 50%).
    pub fn percent_hundredths(hundredths: i32) -> Self {
        Self::with(Unit::Percent, hundredths as i64)
    }

    pub fn auto() -> Self {
        Self::AUTO
    }

    pub fn unit(self) -> Unit {
        self.unit
    }

    /// Raw magnitude. Hundredths of a percent for [`Unit::Percent`].
    pub fn magnitude(self) -> i32 {
        self.magnitude
    }

    pub fn is_auto(self) -> bool {
        self.unit == Unit::Auto
    }

    pub fn is_percent(self) -> bool {
        self.unit == Unit::Percent
    }

    /// Whether the value is a fixed length (absolute, pixels or points).
    pub fn is_fixed(self) -> bool {
        matches!(self.unit, Unit::Absolute | Unit::Pixels | Unit::Points)
    }

    /// Pack into 32 bits: unit tag in the top 4 bits, two's-complement
    /// magnitude in the low 28.
    pub fn pack(self) -> u32 {
        ((self.unit as u32) << 28) | (self.magnitude as u32 & MAGNITUDE_MASK)
    }

    /// Inverse of [`pack`](Self::pack).
    pub fn unpack(raw: u32) -> Self {
        let unit = Unit::from_tag((raw >> 28) as u8);
        // Shift the 28-bit field to the top and back to sign-extend it.
        let magnitude = ((raw << 4) as i32) >> 4;
        if unit == Unit::Auto {
            return Self::AUTO;
        }
        Self { unit, magnitude }
    }
}

impl fmt::Display for StyleValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.unit {
            Unit::Auto => write!(f, "auto"),
            Unit::Absolute => write!(f, "{}", self.magnitude),
            Unit::Pixels => write!(f, "{}px", self.magnitude),
            Unit::Points => write!(f, "{}pt", self.magnitude),
            Unit::Percent => {
                let sign = if self.magnitude < 0 { "-" } else { "" };
                let abs = self.magnitude.unsigned_abs();
                let (whole, frac) = (abs / 100, abs % 100);
                if frac == 0 {
                    write!(f, "{sign}{whole}%")
                } else if frac % 10 == 0 {
                    write!(f, "{sign}{whole}.{}%", frac / 10)
                } else {
                    write!(f, "{sign}{whole}.{frac:02}%")
                }
            }
        }
    }
}
