//! Layout snapshot helpers.
//!
//! [`layout_snapshot`] validates a surface and renders every element's
//! geometry as indented text, one element per line, suitable for snapshot
//! testing and assertions.

use std::fmt::Write;

use crate::context::Context;
use crate::dom::node::{ElementId, SurfaceId};
use crate::style::Positioning;

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Dump the element tree of `surface` after validating it.
///
/// Each line reads `name x,y WxH @ax,ay`, where `x,y` is the position
/// relative to the parent and `@ax,ay` the surface position. Elements
/// without an id print as `_`. Absolute, hidden and text-bearing elements
/// carry a trailing marker. Children are indented two spaces per level.
///
/// # Examples
///
/// ```
/// use gilt_gui::testing::layout_snapshot;
/// use gilt_gui::Context;
///
/// let mut ctx = Context::default();
/// let surface = ctx.create_surface();
/// let el = ctx.create_element();
/// ctx.set_id(el, Some("hello"));
/// ctx.set_text(el, "hi");
/// ctx.attach(el, surface);
/// assert_eq!(layout_snapshot(&mut ctx, surface), "hello 0,0 12x12 @0,0 text=\"hi\"");
/// ```
pub fn layout_snapshot(ctx: &mut Context, surface: SurfaceId) -> String {
    if let Err(err) = ctx.validate() {
        log::warn!(target: "gilt_gui::layout", "snapshot of unsettled layout: {err}");
    }
    let Some(surf) = ctx.surface(surface) else {
        return String::new();
    };
    let mut out = String::new();
    for &root in surf.roots() {
        write_element(ctx, root, 0, &mut out);
    }
    // No trailing newline.
    out.pop();
    out
}

fn write_element(ctx: &Context, id: ElementId, depth: usize, out: &mut String) {
    let Some(el) = ctx.element(id) else {
        return;
    };
    let l = el.layout();
    let _ = write!(
        out,
        "{:indent$}{} {},{} {}x{} @{},{}",
        "",
        el.id().unwrap_or("_"),
        l.x,
        l.y,
        l.width,
        l.height,
        l.absolute.x,
        l.absolute.y,
        indent = depth * 2
    );
    if el.style().positioning == Positioning::Absolute {
        out.push_str(" absolute");
    }
    if !el.style().is_visible() {
        out.push_str(" hidden");
    }
    if let Some(text) = el.text() {
        let _ = write!(out, " text={text:?}");
    }
    out.push('\n');
    for child in ctx.dom().children(id) {
        write_element(ctx, child, depth + 1, out);
    }
}

// ===========================================================================
// Tests
// ===========================================================================
