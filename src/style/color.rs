//! RGBA colors with four 8-bit channels.

use std::fmt;

/// An 8-bit-per-channel RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// An opaque color.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Whether drawing this color has no visible effect.
    pub const fn is_transparent(self) -> bool {
        self.a == 0
    }

    /// Pack as `0xRRGGBBAA`.
    pub const fn to_u32(self) -> u32 {
        (self.r as u32) << 24 | (self.g as u32) << 16 | (self.b as u32) << 8 | self.a as u32
    }

    /// Unpack from `0xRRGGBBAA`.
    pub const fn from_u32(raw: u32) -> Self {
        Self {
            r: (raw >> 24) as u8,
            g: (raw >> 16) as u8,
            b: (raw >> 8) as u8,
            a: raw as u8,
        }
    }

    /// Parse `rgb`, `rgba`, `rrggbb` or `rrggbbaa` hex digits (no leading `#`).
    pub fn from_hex_digits(digits: &str) -> Option<Self> {
        let nibble = |i: usize| u8::from_str_radix(digits.get(i..i + 1)?, 16).ok();
        let byte = |i: usize| u8::from_str_radix(digits.get(i..i + 2)?, 16).ok();
        match digits.len() {
            3 | 4 => {
                let r = nibble(0)?;
                let g = nibble(1)?;
                let b = nibble(2)?;
                let a = if digits.len() == 4 { nibble(3)? } else { 15 };
                Some(Color::rgba(r * 17, g * 17, b * 17, a * 17))
            }
            6 | 8 => {
                let a = if digits.len() == 8 { byte(6)? } else { 255 };
                Some(Color::rgba(byte(0)?, byte(2)?, byte(4)?, a))
            }
            _ => None,
        }
    }

    /// Look up one of the basic named colors.
    pub fn named(name: &str) -> Option<Self> {
        let color = match name.to_ascii_lowercase().as_str() {
            "transparent" => Color::TRANSPARENT,
            "black" => Color::BLACK,
            "white" => Color::WHITE,
            "red" => Color::rgb(255, 0, 0),
            "green" => Color::rgb(0, 128, 0),
            "blue" => Color::rgb(0, 0, 255),
            "yellow" => Color::rgb(255, 255, 0),
            "gray" | "grey" => Color::rgb(128, 128, 128),
            _ => return None,
        };
        Some(color)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)?;
        if self.a != 255 {
            write!(f, "{:02x}", self.a)?;
        }
        Ok(())
    }
}
