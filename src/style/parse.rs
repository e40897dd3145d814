//! logos-based parsing of style value strings.
//!
//! Markup front ends hand attribute strings such as `"50%"`, `"12px"`,
//! `"auto"` or `"#ff00aa"` to the context; this module turns them into
//! [`StyleValue`]s and [`Color`]s. Token priority follows logos' longest-match
//! rule, so `12px` lexes as one [`ValueToken::Pixels`] rather than a number
//! followed by an identifier.

use logos::Logos;

use super::color::Color;
use super::styles::Sides;
use super::value::StyleValue;
use crate::error::StyleParseError;

/// Token produced by the value lexer.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\n\r\f]+")]
pub enum ValueToken {
    /// `#fff`, `#ff00aa`, `#ff00aa80`.
    #[regex(r"#[0-9a-fA-F]+")]
    Hex,

    /// `50%`, `-12.5%`.
    #[regex(r"-?[0-9]+(\.[0-9]+)?%")]
    Percent,

    /// `12px`.
    #[regex(r"-?[0-9]+(\.[0-9]+)?px")]
    Pixels,

    /// `9pt`.
    #[regex(r"-?[0-9]+(\.[0-9]+)?pt")]
    Points,

    /// Bare number, taken as base units.
    #[regex(r"-?[0-9]+(\.[0-9]+)?")]
    Number,

    /// `auto` or a color name.
    #[regex(r"[a-zA-Z][a-zA-Z0-9_-]*")]
    Ident,
}

/// Lex `input` into `(token, text)` pairs, failing on the first bad token.
fn lex(input: &str) -> Result<Vec<(ValueToken, &str)>, StyleParseError> {
    let mut lexer = ValueToken::lexer(input);
    let mut out = Vec::new();
    while let Some(result) = lexer.next() {
        match result {
            Ok(token) => out.push((token, lexer.slice())),
            Err(()) => return Err(StyleParseError::Unrecognized(lexer.slice().to_owned())),
        }
    }
    Ok(out)
}

fn number(text: &str, suffix_len: usize) -> Result<f64, StyleParseError> {
    text[..text.len() - suffix_len]
        .parse::<f64>()
        .map_err(|_| StyleParseError::ExpectedLength(text.to_owned()))
}

fn to_value(token: ValueToken, text: &str) -> Result<StyleValue, StyleParseError> {
    match token {
        ValueToken::Percent => Ok(StyleValue::percent(number(text, 1)? as f32)),
        ValueToken::Pixels => Ok(StyleValue::pixels(number(text, 2)?.round() as i32)),
        ValueToken::Points => Ok(StyleValue::points(number(text, 2)?.round() as i32)),
        ValueToken::Number => Ok(StyleValue::absolute(number(text, 0)?.round() as i32)),
        ValueToken::Ident if text.eq_ignore_ascii_case("auto") => Ok(StyleValue::AUTO),
        ValueToken::Ident | ValueToken::Hex => Err(StyleParseError::ExpectedLength(text.to_owned())),
    }
}

/// Parse a single style value.
pub fn parse_value(input: &str) -> Result<StyleValue, StyleParseError> {
    let tokens = lex(input)?;
    match tokens.as_slice() {
        [] => Err(StyleParseError::Empty),
        [(token, text)] => to_value(*token, text),
        [_, (_, extra), ..] => Err(StyleParseError::Trailing((*extra).to_owned())),
    }
}

/// Parse a CSS-style shorthand of one to four values
/// (`all`, `vertical horizontal`, `top horizontal bottom`, `top right bottom left`).
pub fn parse_sides(input: &str) -> Result<Sides<StyleValue>, StyleParseError> {
    let values = lex(input)?
        .into_iter()
        .map(|(token, text)| to_value(token, text))
        .collect::<Result<Vec<_>, _>>()?;
    match values.as_slice() {
        [] => Err(StyleParseError::Empty),
        [all] => Ok(Sides::all(*all)),
        [v, h] => Ok(Sides::new(*v, *h, *v, *h)),
        [t, h, b] => Ok(Sides::new(*t, *h, *b, *h)),
        [t, r, b, l] => Ok(Sides::new(*t, *r, *b, *l)),
        more => Err(StyleParseError::SideCount(more.len())),
    }
}

/// Parse a hex (`#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa`) or named color.
pub fn parse_color(input: &str) -> Result<Color, StyleParseError> {
    let tokens = lex(input)?;
    match tokens.as_slice() {
        [] => Err(StyleParseError::Empty),
        [(ValueToken::Hex, text)] => Color::from_hex_digits(&text[1..])
            .ok_or_else(|| StyleParseError::InvalidColor((*text).to_owned())),
        [(ValueToken::Ident, text)] => {
            Color::named(text).ok_or_else(|| StyleParseError::InvalidColor((*text).to_owned()))
        }
        [(_, text)] => Err(StyleParseError::InvalidColor((*text).to_owned())),
        [_, (_, extra), ..] => Err(StyleParseError::Trailing((*extra).to_owned())),
    }
}
