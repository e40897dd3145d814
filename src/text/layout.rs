//! Text layout collaborator and its result type.
//!
//! Shaping and font metrics live outside this crate: the context asks a
//! [`TextLayouter`] to break a string into lines and reads caret stops back
//! from the resulting [`TextLayout`]. [`MonospaceLayouter`] is a fixed-advance
//! stand-in used by default and in tests.

use std::ops::Range;

use crate::geometry::{Offset, Size};
use crate::style::FontDesc;

/// One laid-out line. `range` excludes the terminating newline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextLine {
    pub range: Range<usize>,
    pub y: i32,
    pub width: i32,
    /// `(byte, x)` for every char boundary in `range`, including both ends.
    pub carets: Vec<(usize, i32)>,
}

/// A string broken into lines for one font and wrap width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextLayout {
    pub lines: Vec<TextLine>,
    pub line_height: i32,
    /// Widest line.
    pub width: i32,
    pub height: i32,
    /// Width of the widest hard line with wrapping disabled.
    pub natural_width: i32,
    /// Resolved font size the layout was made for.
    pub font_px: i32,
}

impl TextLayout {
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Index of the line holding `byte`. A byte on a soft wrap boundary
    /// belongs to the later line.
    pub fn line_of(&self, byte: usize) -> usize {
        self.lines
            .iter()
            .rposition(|line| line.range.start <= byte)
            .unwrap_or(0)
    }

    /// Top of the caret before `byte`, plus the caret height.
    pub fn caret(&self, byte: usize) -> (Offset, i32) {
        let Some(line) = self.lines.get(self.line_of(byte)) else {
            return (Offset::ZERO, self.line_height);
        };
        let x = line
            .carets
            .iter()
            .take_while(|(b, _)| *b <= byte)
            .last()
            .map_or(0, |(_, x)| *x);
        (Offset::new(x, line.y), self.line_height)
    }

    /// Byte offset of the caret stop closest to `point`.
    pub fn byte_at(&self, point: Offset) -> usize {
        if self.lines.is_empty() {
            return 0;
        }
        let row = if self.line_height > 0 { point.y / self.line_height } else { 0 };
        let row = row.clamp(0, self.lines.len() as i32 - 1) as usize;
        let line = &self.lines[row];
        line.carets
            .iter()
            .min_by_key(|(_, x)| (x - point.x).abs())
            .map_or(line.range.start, |(b, _)| *b)
    }
}

/// Breaks text into lines.
pub trait TextLayouter {
    /// Lay out `text` in `font` at `font_px`. With `wrap_width`, lines are
    /// broken at spaces (or mid-word when a word does not fit).
    fn layout(&self, text: &str, font: &FontDesc, font_px: i32, wrap_width: Option<i32>) -> TextLayout;
}

/// Fixed-advance layouter: every char is `font_px / 2` wide and every line
/// `font_px` tall.
#[derive(Debug, Clone, Copy, Default)]
pub struct MonospaceLayouter;

impl MonospaceLayouter {
    pub fn advance(font_px: i32) -> i32 {
        (font_px / 2).max(1)
    }

    pub fn line_height(font_px: i32) -> i32 {
        font_px.max(1)
    }
}

impl TextLayouter for MonospaceLayouter {
    fn layout(&self, text: &str, _font: &FontDesc, font_px: i32, wrap_width: Option<i32>) -> TextLayout {
        let advance = Self::advance(font_px);
        let line_height = Self::line_height(font_px);
        let mut ranges: Vec<Range<usize>> = Vec::new();
        let mut natural_width = 0;

        let mut start = 0;
        for hard in text.split('\n') {
            let end = start + hard.len();
            natural_width = natural_width.max(hard.chars().count() as i32 * advance);
            match wrap_width {
                Some(max) => wrap_line(text, start..end, advance, max, &mut ranges),
                None => ranges.push(start..end),
            }
            start = end + 1;
        }

        let lines: Vec<TextLine> = ranges
            .into_iter()
            .enumerate()
            .map(|(row, range)| {
                let mut carets = Vec::new();
                let mut x = 0;
                for (i, _) in text[range.clone()].char_indices() {
                    carets.push((range.start + i, x));
                    x += advance;
                }
                carets.push((range.end, x));
                TextLine { range, y: row as i32 * line_height, width: x, carets }
            })
            .collect();

        let width = lines.iter().map(|l| l.width).max().unwrap_or(0);
        TextLayout {
            height: lines.len() as i32 * line_height,
            lines,
            line_height,
            width,
            natural_width,
            font_px,
        }
    }
}

/// Greedy word wrap of `text[range]` into `out`.
fn wrap_line(text: &str, range: Range<usize>, advance: i32, max: i32, out: &mut Vec<Range<usize>>) {
    let mut line_start = range.start;
    let mut x = 0;
    // Byte just after the last space on the current line, and x there.
    let mut last_break: Option<(usize, i32)> = None;
    for (i, ch) in text[range.clone()].char_indices() {
        let at = range.start + i;
        if x + advance > max && x > 0 {
            match last_break.take() {
                Some((brk, bx)) if brk > line_start => {
                    out.push(line_start..brk);
                    line_start = brk;
                    x -= bx;
                }
                _ => {
                    out.push(line_start..at);
                    line_start = at;
                    x = 0;
                }
            }
        }
        x += advance;
        if ch == ' ' {
            last_break = Some((at + ch.len_utf8(), x));
        }
    }
    out.push(line_start..range.end);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lay(text: &str, wrap: Option<i32>) -> TextLayout {
        MonospaceLayouter.layout(text, &FontDesc::default(), 12, wrap)
    }

    fn line_texts<'a>(text: &'a str, layout: &TextLayout) -> Vec<&'a str> {
        layout.lines.iter().map(|l| &text[l.range.clone()]).collect()
    }

    #[test]
    fn single_line_metrics() {
        let layout = lay("hello", None);
        assert_eq!(layout.size(), Size::new(30, 12));
        assert_eq!(layout.natural_width, 30);
        assert_eq!(layout.lines[0].carets.len(), 6);
    }

    #[test]
    fn hard_breaks() {
        let text = "ab\n\ncdef";
        let layout = lay(text, None);
        assert_eq!(line_texts(text, &layout), vec!["ab", "", "cdef"]);
        assert_eq!(layout.height, 36);
        assert_eq!(layout.width, 24);
    }

    #[test]
    fn wraps_at_spaces() {
        let text = "aaa bbb ccc";
        // 6px per char, room for 7 chars.
        let layout = lay(text, Some(42));
        assert_eq!(line_texts(text, &layout), vec!["aaa ", "bbb ccc"]);
        let narrow = lay(text, Some(36));
        assert_eq!(line_texts(text, &narrow), vec!["aaa ", "bbb ", "ccc"]);
        assert_eq!(layout.natural_width, 66);
    }

    #[test]
    fn breaks_long_words() {
        let text = "abcdefgh";
        let layout = lay(text, Some(18));
        assert_eq!(line_texts(text, &layout), vec!["abc", "def", "gh"]);
    }

    #[test]
    fn caret_and_hit_lookup() {
        let text = "ab\ncd";
        let layout = lay(text, None);
        assert_eq!(layout.caret(1), (Offset::new(6, 0), 12));
        assert_eq!(layout.caret(5), (Offset::new(12, 12), 12));
        assert_eq!(layout.byte_at(Offset::new(7, 14)), 4);
        assert_eq!(layout.byte_at(Offset::new(100, 100)), 5);
        assert_eq!(layout.byte_at(Offset::new(-5, -5)), 0);
    }

    #[test]
    fn empty_text_has_one_line() {
        let layout = lay("", None);
        assert_eq!(layout.lines.len(), 1);
        assert_eq!(layout.size(), Size::new(0, 12));
        assert_eq!(layout.caret(0), (Offset::ZERO, 12));
    }
}
