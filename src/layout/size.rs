//! Width/height resolution, children-based auto sizing and flexing.
//!
//! Both axes run through the same code: `Axis::Horizontal` resolves width
//! and the left/right spacing, `Axis::Vertical` height and top/bottom.

use crate::dom::node::{ElementId, LayoutRecord};
use crate::dom::Dom;
use crate::geometry::{Region, Size, Spacing};
use crate::style::{Axis, Boundary, Positioning, Sides, Style, StyleFlags, StyleValue};
use crate::text::TextLayouter;

use super::engine::LayoutEngine;
use super::flags::LayoutFlags;
use super::position::{align_of, Align};

// ---------------------------------------------------------------------------
// Axis helpers
// ---------------------------------------------------------------------------

pub(crate) fn along(size: Size, axis: Axis) -> i32 {
    match axis {
        Axis::Horizontal => size.width,
        Axis::Vertical => size.height,
    }
}

/// `(near, far)` sides of `spacing` along `axis`.
pub(crate) fn sides_along(spacing: Spacing, axis: Axis) -> (i32, i32) {
    match axis {
        Axis::Horizontal => (spacing.left, spacing.right),
        Axis::Vertical => (spacing.top, spacing.bottom),
    }
}

fn copy_sides(into: &mut Spacing, from: Spacing, axis: Axis) {
    match axis {
        Axis::Horizontal => {
            into.left = from.left;
            into.right = from.right;
        }
        Axis::Vertical => {
            into.top = from.top;
            into.bottom = from.bottom;
        }
    }
}

fn set_extent(record: &mut LayoutRecord, axis: Axis, value: i32, unclamped: i32) {
    match axis {
        Axis::Horizontal => {
            record.width = value;
            record.unclamped_width = unclamped;
        }
        Axis::Vertical => {
            record.height = value;
            record.unclamped_height = unclamped;
        }
    }
}

// ---------------------------------------------------------------------------
// Boxes
// ---------------------------------------------------------------------------

/// The box selected by `boundary`, relative to the element's border-box origin.
pub fn boundary_box(record: &LayoutRecord, boundary: Boundary) -> Region {
    let outer = record.size().to_region();
    match boundary {
        Boundary::Outer => outer,
        Boundary::InnerBorder => outer.shrink(record.border),
        Boundary::Inner => outer.shrink(record.insets()),
    }
}

pub(crate) fn surface_size(dom: &Dom, id: ElementId) -> Size {
    dom.get(id)
        .and_then(|el| el.surface)
        .and_then(|s| dom.surface(s))
        .map_or(Size::ZERO, |s| s.size())
}

/// Box that percentages of `id`'s size and spacing resolve against: the
/// parent's children-size boundary, or the surface for roots and absolute
/// elements.
pub(crate) fn sizing_base(dom: &Dom, id: ElementId) -> Size {
    let Some(el) = dom.get(id) else {
        return Size::ZERO;
    };
    match el.parent.and_then(|p| dom.get(p)) {
        Some(parent) if el.style.positioning != Positioning::Absolute => {
            boundary_box(&parent.layout, parent.style.children_size_boundary).size()
        }
        _ => surface_size(dom, id),
    }
}

// ---------------------------------------------------------------------------
// Flow membership
// ---------------------------------------------------------------------------

fn is_in_flow(dom: &Dom, id: ElementId) -> bool {
    dom.get(id).is_some_and(|el| el.in_flow())
}

pub(crate) fn next_in_flow(dom: &Dom, id: ElementId) -> Option<ElementId> {
    std::iter::successors(dom.next_sibling(id), |&s| dom.next_sibling(s)).find(|&s| is_in_flow(dom, s))
}

pub(crate) fn prev_in_flow(dom: &Dom, id: ElementId) -> Option<ElementId> {
    std::iter::successors(dom.prev_sibling(id), |&s| dom.prev_sibling(s)).find(|&s| is_in_flow(dom, s))
}

pub(crate) fn first_in_flow(dom: &Dom, parent: ElementId) -> Option<ElementId> {
    dom.children(parent).find(|&c| is_in_flow(dom, c))
}

pub(crate) fn in_flow_children(dom: &Dom, parent: ElementId) -> impl Iterator<Item = ElementId> + '_ {
    dom.children(parent).filter(move |&c| is_in_flow(dom, c))
}

// ---------------------------------------------------------------------------
// Flexing
// ---------------------------------------------------------------------------

/// Weights of the flexible children of `parent` along `axis`, in child order.
///
/// Percent children weigh their percentage. Auto children split whatever is
/// left of 100% evenly; when nothing is left they size to content and are not
/// flexible. Empty unless `parent` flexes `axis`.
pub(crate) fn flex_weights(dom: &Dom, parent: ElementId, axis: Axis) -> Vec<(ElementId, i64)> {
    if !dom.get(parent).is_some_and(|p| p.style.flexes(axis)) {
        return Vec::new();
    }
    let mut percent_total: i64 = 0;
    let mut autos: i64 = 0;
    for child in in_flow_children(dom, parent) {
        let Some(el) = dom.get(child) else { continue };
        let size = el.style.extent(axis).0;
        if size.is_percent() {
            percent_total += i64::from(size.magnitude().max(0));
        } else if size.is_auto() {
            autos += 1;
        }
    }
    let auto_weight = if autos > 0 { (10_000 - percent_total).max(0) / autos } else { 0 };

    in_flow_children(dom, parent)
        .filter_map(|child| {
            let size = dom.get(child)?.style.extent(axis).0;
            if size.is_percent() {
                Some((child, i64::from(size.magnitude().max(0))))
            } else if size.is_auto() && auto_weight > 0 {
                Some((child, auto_weight))
            } else {
                None
            }
        })
        .collect()
}

/// Border-box size allotted to `child` by its flexing parent, or `None` if the
/// child is not flexible.
///
/// The available length is the parent's children-size box minus the outer
/// sizes of the fixed children and the margins of the flexible ones. Shares
/// are rounded cumulatively so that they add up to the available length.
pub(crate) fn flex_share(dom: &Dom, parent: ElementId, axis: Axis, child: ElementId) -> Option<i32> {
    let weights = flex_weights(dom, parent, axis);
    if !weights.iter().any(|&(id, _)| id == child) {
        return None;
    }
    let p = dom.get(parent)?;
    let inner = along(boundary_box(&p.layout, p.style.children_size_boundary).size(), axis);

    let mut used: i32 = 0;
    for sibling in in_flow_children(dom, parent) {
        let Some(el) = dom.get(sibling) else { continue };
        let extent = if weights.iter().any(|&(id, _)| id == sibling) {
            let (near, far) = sides_along(el.layout.margin, axis);
            near.saturating_add(far)
        } else {
            el.layout.outer_extent(axis)
        };
        used = used.saturating_add(extent);
    }
    let available = i64::from((inner - used).max(0));
    let total: i64 = weights.iter().map(|&(_, w)| w).sum();
    if total == 0 {
        return Some(0);
    }

    let mut acc = 0;
    let mut prev_end = 0;
    for &(id, weight) in &weights {
        acc += weight;
        let end = (available * acc + total / 2) / total;
        if id == child {
            return Some((end - prev_end) as i32);
        }
        prev_end = end;
    }
    None
}

// ---------------------------------------------------------------------------
// Content size
// ---------------------------------------------------------------------------

fn percent_along(sides: &Sides<StyleValue>, axis: Axis) -> bool {
    let (near, far) = match axis {
        Axis::Horizontal => (sides.left, sides.right),
        Axis::Vertical => (sides.top, sides.bottom),
    };
    near.is_percent() || far.is_percent()
}

/// Whether `style`'s size or spacing along `axis` is a fraction of the parent.
pub(crate) fn depends_on_parent(style: &Style, axis: Axis) -> bool {
    let (size, min, max) = style.extent(axis);
    size.is_percent()
        || min.is_percent()
        || max.is_percent()
        || percent_along(&style.margin, axis)
        || percent_along(&style.border, axis)
        || percent_along(&style.padding, axis)
}

/// Extent of `id`'s content along `axis`, excluding its own insets: the
/// in-flow children stacked along the child axis (or the widest across it),
/// or the text, whichever is larger.
pub(crate) fn content_extent(dom: &Dom, id: ElementId, axis: Axis) -> i32 {
    let Some(el) = dom.get(id) else {
        return 0;
    };
    let stacked = el.style.child_axis == axis;
    let flexible = flex_weights(dom, id, axis);

    let mut children: i32 = 0;
    for child in in_flow_children(dom, id) {
        let Some(c) = dom.get(child) else { continue };
        if depends_on_parent(&c.style, axis) || flexible.iter().any(|&(f, _)| f == child) {
            continue;
        }
        let outer = c.layout.outer_extent(axis);
        children = if stacked { children.saturating_add(outer) } else { children.max(outer) };
    }

    let text = el.text_layout.as_ref().map_or(0, |t| match axis {
        Axis::Horizontal => t.natural_width,
        Axis::Vertical => t.height,
    });
    children.max(text)
}

// ---------------------------------------------------------------------------
// Size stage
// ---------------------------------------------------------------------------

impl LayoutEngine {
    /// Resolve the size and spacing of `id` along `axis`.
    pub(super) fn update_size(&mut self, dom: &mut Dom, id: ElementId, axis: Axis, force: bool) {
        let Some(el) = dom.get(id) else {
            return;
        };
        let resolver = self.resolver(dom, el.surface);
        let base = sizing_base(dom, id);
        let base_len = along(base, axis);

        let margin = resolver.spacing(&el.style.margin, base);
        let border = resolver.spacing(&el.style.border, base);
        let padding = resolver.spacing(&el.style.padding, base);
        let (bn, bf) = sides_along(border, axis);
        let (pn, pf) = sides_along(padding, axis);
        let insets = bn + bf + pn + pf;

        let (size, min, max) = el.style.extent(axis);
        let flexed = match el.parent {
            Some(parent) if el.in_flow() => flex_share(dom, parent, axis, id),
            _ => None,
        };
        let raw = match flexed {
            Some(share) => share,
            None => resolver
                .resolve(size, base_len)
                .unwrap_or_else(|| content_extent(dom, id, axis).saturating_add(insets)),
        };
        let mut value = raw;
        if let Some(max) = resolver.resolve(max, base_len) {
            value = value.min(max);
        }
        if let Some(min) = resolver.resolve(min, base_len) {
            value = value.max(min);
        }
        let value = value.max(0);

        let Some(el) = dom.get_mut(id) else {
            return;
        };
        let record = &mut el.layout;
        let old_size = record.extent(axis);
        let old_margin = sides_along(record.margin, axis);
        let old_insets = (sides_along(record.border, axis), sides_along(record.padding, axis));

        set_extent(record, axis, value, raw);
        copy_sides(&mut record.margin, margin, axis);
        copy_sides(&mut record.border, border, axis);
        copy_sides(&mut record.padding, padding, axis);

        let size_changed = value != old_size || force;
        let margin_changed = sides_along(record.margin, axis) != old_margin;
        let insets_changed = ((bn, bf), (pn, pf)) != old_insets;

        if size_changed {
            self.mark_changed(dom, id, LayoutFlags::size(axis));
        }
        if size_changed || margin_changed || insets_changed {
            self.propagate_size(dom, id, axis, size_changed || margin_changed, size_changed || insets_changed, insets_changed);
        }
    }

    /// Invalidate whatever depends on `id`'s extent along `axis`.
    ///
    /// `outer`: the margin box changed, which moves later flow siblings and
    /// feeds the parent's content size. `inner`: the border or content box
    /// changed, which matters to children. `insets`: the content box origin
    /// moved.
    fn propagate_size(&mut self, dom: &mut Dom, id: ElementId, axis: Axis, outer: bool, inner: bool, insets: bool) {
        let Some(el) = dom.get(id) else {
            return;
        };
        let parent = el.parent;
        let in_flow = el.in_flow();
        let has_text = el.text.is_some();

        // Far anchoring and alignment read the own size.
        self.invalidate(dom, id, LayoutFlags::position(axis));

        if outer && in_flow {
            if let Some(parent) = parent {
                let next = next_in_flow(dom, id);
                self.flow_changed(dom, parent, next, axis);
            }
        }
        if inner {
            self.children_box_changed(dom, id, axis, insets);
            if axis == Axis::Horizontal && has_text {
                self.invalidate(dom, id, LayoutFlags::TEXT);
            }
        }
    }

    /// The in-flow content of `parent` changed along `axis` just before
    /// `next` (the first in-flow child after the change, if any).
    pub(super) fn flow_changed(&mut self, dom: &mut Dom, parent: ElementId, next: Option<ElementId>, axis: Axis) {
        let Some(p) = dom.get(parent) else {
            return;
        };
        let stacked = p.style.child_axis == axis;
        let aligned = align_of(&p.style, axis) != Align::Start;
        let auto_size = p.style.extent(axis).0.is_auto();

        let mut targets: Vec<(ElementId, LayoutFlags)> = Vec::new();
        if stacked {
            if let Some(next) = next {
                targets.push((next, LayoutFlags::position(axis)));
            }
            if aligned {
                if let Some(first) = first_in_flow(dom, parent) {
                    targets.push((first, LayoutFlags::position(axis)));
                }
            }
            for (sibling, _) in flex_weights(dom, parent, axis) {
                targets.push((sibling, LayoutFlags::size(axis)));
            }
        }
        if auto_size {
            targets.push((parent, LayoutFlags::size(axis)));
        }
        for (target, flags) in targets {
            self.invalidate(dom, target, flags);
        }
    }

    /// The border or content box of `id` changed along `axis`.
    fn children_box_changed(&mut self, dom: &mut Dom, id: ElementId, axis: Axis, insets: bool) {
        let Some(el) = dom.get(id) else {
            return;
        };
        let stacked = el.style.child_axis == axis;
        let aligned = align_of(&el.style, axis) != Align::Start;
        let flexible = flex_weights(dom, id, axis);

        let mut targets: Vec<(ElementId, LayoutFlags)> = Vec::new();
        for child in dom.children(id) {
            let Some(c) = dom.get(child) else { continue };
            let mut flags = LayoutFlags::empty();
            if depends_on_parent(&c.style, axis) || flexible.iter().any(|&(f, _)| f == child) {
                flags |= LayoutFlags::size(axis);
            }
            match c.style.positioning {
                Positioning::Relative => flags |= LayoutFlags::position(axis),
                Positioning::Auto if !stacked && (insets || aligned) => flags |= LayoutFlags::position(axis),
                _ => {}
            }
            if !flags.is_empty() {
                targets.push((child, flags));
            }
        }
        if stacked && (insets || aligned) {
            if let Some(first) = first_in_flow(dom, id) {
                targets.push((first, LayoutFlags::position(axis)));
            }
        }
        for (target, flags) in targets {
            self.invalidate(dom, target, flags);
        }
    }

    // -----------------------------------------------------------------------
    // Text stage
    // -----------------------------------------------------------------------

    /// Lay out the text of `id`, wrapping at its content width when word wrap
    /// is on.
    pub(super) fn update_text(&mut self, dom: &mut Dom, layouter: &dyn TextLayouter, id: ElementId) {
        let Some(el) = dom.get(id) else {
            return;
        };
        let Some(buffer) = el.text.as_ref() else {
            if el.text_layout.is_some() {
                if let Some(el) = dom.get_mut(id) {
                    el.text_layout = None;
                }
                self.mark_changed(dom, id, LayoutFlags::TEXT);
                self.invalidate(dom, id, LayoutFlags::SIZE);
            }
            return;
        };
        let resolver = self.resolver(dom, el.surface);
        let font_px = resolver.font_px(&el.style.font, self.default_font_px(&resolver));
        let wrap = el
            .style
            .flags
            .contains(StyleFlags::WORD_WRAP)
            .then(|| (el.layout.width - el.layout.insets().width()).max(0));
        let layout = layouter.layout(buffer.as_str(), &el.style.font, font_px, wrap);
        if el.text_layout.as_ref() == Some(&layout) {
            return;
        }
        let old = el.text_layout.as_ref().map(|t| (t.natural_width, t.height));
        let auto_width = el.style.width.is_auto();
        let auto_height = el.style.height.is_auto();
        let (natural, height) = (layout.natural_width, layout.height);

        if let Some(el) = dom.get_mut(id) {
            el.text_layout = Some(layout);
        }
        self.mark_changed(dom, id, LayoutFlags::TEXT);
        if auto_width && old.map(|o| o.0) != Some(natural) {
            self.invalidate(dom, id, LayoutFlags::WIDTH);
        }
        if auto_height && old.map(|o| o.1) != Some(height) {
            self.invalidate(dom, id, LayoutFlags::HEIGHT);
        }
    }
}
