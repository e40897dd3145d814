//! Style model: tagged values, colors, enumerated properties, parsing.

pub mod color;
pub mod parse;
pub mod props;
pub mod styles;
pub mod value;

pub use color::Color;
pub use parse::{parse_color, parse_sides, parse_value};
pub use props::{
    Axis, BackgroundRepeat, BorderMask, Boundary, ClipMode, CursorIcon, DragClamp, HAlign,
    ImageScale, Positioning, StyleFlags, VAlign,
};
pub use styles::{Background, FontDesc, Sides, Style, StyleChanges};
pub use value::{StyleValue, Unit, STYLE_VALUE_MAX, STYLE_VALUE_MIN};
