//! Relative position resolution for the three positioning modes.
//!
//! * `Absolute`: left/top/right/bottom against the surface.
//! * `Relative`: the same offsets against the parent's position-origin box.
//! * `Auto`: flow. The first in-flow child starts at the aligned origin of
//!   the parent's box, every later one right after its previous in-flow
//!   sibling along the parent's child axis. Across the child axis each child
//!   is aligned on its own.

use crate::dom::node::ElementId;
use crate::dom::Dom;
use crate::geometry::{Offset, Region};
use crate::style::{Axis, HAlign, Positioning, Style, VAlign};

use super::engine::LayoutEngine;
use super::flags::LayoutFlags;
use super::size::{boundary_box, in_flow_children, next_in_flow, prev_in_flow, sides_along};

/// Alignment of a parent's flow along one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Align {
    Start,
    Center,
    End,
}

pub(crate) fn align_of(style: &Style, axis: Axis) -> Align {
    match axis {
        Axis::Horizontal => match style.h_align {
            HAlign::Left => Align::Start,
            HAlign::Center => Align::Center,
            HAlign::Right => Align::End,
        },
        Axis::Vertical => match style.v_align {
            VAlign::Top => Align::Start,
            VAlign::Center => Align::Center,
            VAlign::Bottom => Align::End,
        },
    }
}

/// Offset of content of some extent inside a box with `leftover` spare room.
fn aligned(align: Align, leftover: i32) -> i32 {
    match align {
        Align::Start => 0,
        Align::Center => leftover / 2,
        Align::End => leftover,
    }
}

/// `(origin, length)` of `region` along `axis`.
fn span(region: Region, axis: Axis) -> (i32, i32) {
    match axis {
        Axis::Horizontal => (region.x, region.width),
        Axis::Vertical => (region.y, region.height),
    }
}

/// Box `id` is positioned in: the parent's position-origin box relative to
/// the parent's border box, or the surface for roots and absolute elements.
pub(crate) fn position_box(dom: &Dom, id: ElementId) -> Region {
    let Some(el) = dom.get(id) else {
        return Region::EMPTY;
    };
    match el.parent.and_then(|p| dom.get(p)) {
        Some(parent) if el.style.positioning != Positioning::Absolute => {
            boundary_box(&parent.layout, parent.style.position_origin)
        }
        _ => super::size::surface_size(dom, id).to_region(),
    }
}

/// Surface position of the border box of `id`, from its parent's absolute
/// position, its own relative position and the parent's scroll offset.
pub(crate) fn absolute_of(dom: &Dom, id: ElementId) -> Offset {
    let Some(el) = dom.get(id) else {
        return Offset::ZERO;
    };
    let relative = Offset::new(el.layout.x, el.layout.y);
    match el.parent.and_then(|p| dom.get(p)) {
        Some(parent) if el.style.positioning != Positioning::Absolute => {
            parent.layout.absolute + relative + parent.layout.inner_offset
        }
        _ => relative,
    }
}

fn set_position(dom: &mut Dom, id: ElementId, axis: Axis, value: i32) {
    if let Some(el) = dom.get_mut(id) {
        match axis {
            Axis::Horizontal => el.layout.x = value,
            Axis::Vertical => el.layout.y = value,
        }
    }
}

/// Flow position of `id` inside `parent` along `axis`.
fn flow_position(dom: &Dom, parent: ElementId, id: ElementId, axis: Axis, origin: i32, length: i32) -> i32 {
    let (Some(p), Some(el)) = (dom.get(parent), dom.get(id)) else {
        return origin;
    };
    let (margin_near, _) = sides_along(el.layout.margin, axis);
    let align = align_of(&p.style, axis);

    if p.style.child_axis != axis {
        return origin + aligned(align, length - el.layout.outer_extent(axis)) + margin_near;
    }
    if let Some(prev) = prev_in_flow(dom, id).and_then(|s| dom.get(s)) {
        let r = &prev.layout;
        let (_, prev_far) = sides_along(r.margin, axis);
        return r.position(axis) + r.extent(axis) + prev_far + margin_near;
    }
    let total: i32 = in_flow_children(dom, parent)
        .filter_map(|c| dom.get(c))
        .map(|c| c.layout.outer_extent(axis))
        .sum();
    origin + aligned(align, length - total) + margin_near
}

impl LayoutEngine {
    /// Resolve the relative position of `id` along `axis`.
    pub(super) fn update_position(&mut self, dom: &mut Dom, id: ElementId, axis: Axis, force: bool) {
        let Some(el) = dom.get(id) else {
            return;
        };
        let resolver = self.resolver(dom, el.surface);
        let (origin, length) = span(position_box(dom, id), axis);
        let (margin_near, margin_far) = sides_along(el.layout.margin, axis);
        let size = el.layout.extent(axis);

        let value = match (el.style.positioning, el.parent) {
            (Positioning::Auto, Some(parent)) => flow_position(dom, parent, id, axis, origin, length),
            (Positioning::Auto, None) => origin + margin_near,
            _ => {
                let (near, far) = el.style.offsets(axis);
                let near = resolver.resolve(near, length);
                let far = resolver.resolve(far, length);
                let use_far = match (near, far) {
                    (Some(_), Some(_)) => el.style.far_priority(axis),
                    (None, Some(_)) => true,
                    _ => false,
                };
                match far {
                    Some(far) if use_far => origin + length - far - margin_far - size,
                    _ => origin + near.unwrap_or(0) + margin_near,
                }
            }
        };

        let old = el.layout.position(axis);
        let chained = el.in_flow() && el.parent.and_then(|p| dom.get(p)).is_some_and(|p| p.style.child_axis == axis);
        if value == old && !force {
            return;
        }
        set_position(dom, id, axis, value);
        self.mark_changed(dom, id, LayoutFlags::position(axis));
        if chained && value != old {
            if let Some(next) = next_in_flow(dom, id) {
                self.invalidate(dom, next, LayoutFlags::position(axis));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::InsertPosition;
    use crate::geometry::Spacing;
    use crate::style::Boundary;

    #[test]
    fn alignment_offsets() {
        assert_eq!(aligned(Align::Start, 40), 0);
        assert_eq!(aligned(Align::Center, 41), 20);
        assert_eq!(aligned(Align::End, 40), 40);
        assert_eq!(aligned(Align::Center, -10), -5);
    }

    #[test]
    fn align_follows_axis() {
        let mut style = Style::new();
        style.h_align = HAlign::Right;
        style.v_align = VAlign::Center;
        assert_eq!(align_of(&style, Axis::Horizontal), Align::End);
        assert_eq!(align_of(&style, Axis::Vertical), Align::Center);
    }

    #[test]
    fn absolute_position_adds_parent_scroll() {
        let mut dom = Dom::new();
        let parent = dom.create_element();
        let child = dom.create_element();
        dom.insert_child(parent, child, InsertPosition::Last);
        {
            let p = dom.get_mut(parent).unwrap();
            p.layout.absolute = Offset::new(10, 20);
            p.layout.inner_offset = Offset::new(0, -5);
        }
        {
            let c = dom.get_mut(child).unwrap();
            c.layout.x = 3;
            c.layout.y = 4;
        }
        assert_eq!(absolute_of(&dom, child), Offset::new(13, 19));

        dom.get_mut(child).unwrap().style.positioning = Positioning::Absolute;
        assert_eq!(absolute_of(&dom, child), Offset::new(3, 4));
    }

    #[test]
    fn position_box_uses_parent_origin_boundary() {
        let mut dom = Dom::new();
        let parent = dom.create_element();
        let child = dom.create_element();
        dom.insert_child(parent, child, InsertPosition::Last);
        {
            let p = dom.get_mut(parent).unwrap();
            p.layout.width = 100;
            p.layout.height = 60;
            p.layout.border = Spacing::all(1);
            p.layout.padding = Spacing::all(4);
        }
        assert_eq!(position_box(&dom, child), Region::new(5, 5, 90, 50));
        dom.get_mut(parent).unwrap().style.position_origin = Boundary::Outer;
        assert_eq!(position_box(&dom, child), Region::new(0, 0, 100, 60));
    }
}
