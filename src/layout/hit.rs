//! Hit testing against laid-out geometry.
//!
//! A surface is searched layer by layer from the top of its z-order. Inside a
//! layer, later children are searched before earlier ones and before their
//! parent, and every subtree is clipped by the clip boxes of its clipping
//! ancestors. Absolute descendants are layers of their own and are skipped
//! inside a subtree walk.

use bitflags::bitflags;

use crate::dom::node::{Element, ElementId, SurfaceId};
use crate::dom::Dom;
use crate::geometry::{Offset, Region};
use crate::style::{Axis, ClipMode, CursorIcon, Positioning};

use super::size::boundary_box;

bitflags! {
    /// Edges of a resize gripper. Corners set two bits.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Grip: u8 {
        const LEFT = 1 << 0;
        const RIGHT = 1 << 1;
        const TOP = 1 << 2;
        const BOTTOM = 1 << 3;
    }
}

impl Grip {
    /// Cursor shown while hovering or dragging this gripper.
    pub fn cursor(self) -> CursorIcon {
        let horizontal = self.intersects(Grip::LEFT | Grip::RIGHT);
        let vertical = self.intersects(Grip::TOP | Grip::BOTTOM);
        match (horizontal, vertical) {
            (true, true) if self == Grip::LEFT | Grip::TOP || self == Grip::RIGHT | Grip::BOTTOM => {
                CursorIcon::ResizeNwse
            }
            (true, true) => CursorIcon::ResizeNesw,
            (true, false) => CursorIcon::ResizeHorizontal,
            (false, true) => CursorIcon::ResizeVertical,
            (false, false) => CursorIcon::Inherit,
        }
    }

    /// Whether the gripper moves the near edge along `axis`.
    pub fn moves_near(self, axis: Axis) -> bool {
        match axis {
            Axis::Horizontal => self.contains(Grip::LEFT),
            Axis::Vertical => self.contains(Grip::TOP),
        }
    }

    /// Whether the gripper resizes along `axis` at all.
    pub fn acts_on(self, axis: Axis) -> bool {
        match axis {
            Axis::Horizontal => self.intersects(Grip::LEFT | Grip::RIGHT),
            Axis::Vertical => self.intersects(Grip::TOP | Grip::BOTTOM),
        }
    }
}

/// Result of a hit test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit {
    pub element: ElementId,
    /// Non-empty when the point fell in a resize band of `element`.
    pub grip: Grip,
}

/// Surface rectangle that children of `el` are clipped to, if it clips.
pub(crate) fn clip_rect(el: &Element) -> Option<Region> {
    match el.style.clip_mode {
        ClipMode::Clip => Some(boundary_box(&el.layout, el.style.clip_boundary).translate(el.layout.absolute)),
        ClipMode::Visible => None,
    }
}

/// Gripper bands of `el` under `point`.
///
/// An axis has bands only when the element may be resized along it and its
/// size on that axis is a fixed length. Near-edge bands also need the
/// element to be positioned by offsets, since dragging them moves it.
pub fn gripper_at(el: &Element, point: Offset, gripper_size: i32) -> Grip {
    let region = el.layout.region();
    let mut grip = Grip::empty();
    if gripper_size <= 0 || !region.contains(point.x, point.y) {
        return grip;
    }
    let style = &el.style;
    let offset_positioned = style.positioning != Positioning::Auto;
    if style.resizable(Axis::Horizontal) && style.width.is_fixed() {
        if point.x >= region.right() - gripper_size {
            grip |= Grip::RIGHT;
        } else if offset_positioned && point.x < region.x + gripper_size {
            grip |= Grip::LEFT;
        }
    }
    if style.resizable(Axis::Vertical) && style.height.is_fixed() {
        if point.y >= region.bottom() - gripper_size {
            grip |= Grip::BOTTOM;
        } else if offset_positioned && point.y < region.y + gripper_size {
            grip |= Grip::TOP;
        }
    }
    grip
}

/// Whether `id` and all its ancestors are visible.
pub(crate) fn is_shown(dom: &Dom, id: ElementId) -> bool {
    let mut current = Some(id);
    while let Some(node) = current {
        match dom.get(node) {
            Some(el) if el.style.is_visible() => current = el.parent,
            _ => return false,
        }
    }
    true
}

/// Topmost visible element of `surface` under `point`.
///
/// `exclude` removes an element and its subtree from the search (used for
/// drag proxies). Resize bands of an element win over its descendants.
pub fn hit_test(dom: &Dom, surface: SurfaceId, point: Offset, exclude: Option<ElementId>, gripper_size: i32) -> Option<Hit> {
    let surf = dom.surface(surface)?;
    let bounds = surf.bounds();
    if !bounds.contains(point.x, point.y) {
        return None;
    }
    let walker = Walker { dom, point, exclude, gripper_size };
    surf.layers()
        .iter()
        .rev()
        .filter(|&&layer| is_shown(dom, layer))
        .filter(|&&layer| !exclude.is_some_and(|x| dom.is_ancestor_or_self(x, layer)))
        .find_map(|&layer| walker.visit(layer, bounds))
}

struct Walker<'a> {
    dom: &'a Dom,
    point: Offset,
    exclude: Option<ElementId>,
    gripper_size: i32,
}

impl Walker<'_> {
    fn visit(&self, id: ElementId, clip: Region) -> Option<Hit> {
        let el = self.dom.get(id)?;
        if !el.style.is_visible() || Some(id) == self.exclude {
            return None;
        }
        let inside = clip.contains(self.point.x, self.point.y);

        if inside {
            let grip = gripper_at(el, self.point, self.gripper_size);
            if !grip.is_empty() {
                return Some(Hit { element: id, grip });
            }
        }

        let child_clip = clip_rect(el).map_or(clip, |r| clip.intersection(r));
        if child_clip.contains(self.point.x, self.point.y) {
            let found = self
                .dom
                .children_rev(id)
                .filter(|&c| self.dom.get(c).is_some_and(|c| c.style.positioning != Positioning::Absolute))
                .find_map(|c| self.visit(c, child_clip));
            if found.is_some() {
                return found;
            }
        }

        (inside && el.layout.region().contains(self.point.x, self.point.y)).then_some(Hit { element: id, grip: Grip::empty() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::InsertPosition;
    use crate::style::{StyleFlags, StyleValue};

    fn place(dom: &mut Dom, id: ElementId, x: i32, y: i32, w: i32, h: i32) {
        let el = dom.get_mut(id).unwrap();
        el.layout.absolute = Offset::new(x, y);
        el.layout.width = w;
        el.layout.height = h;
    }

    fn surface_with_size(dom: &mut Dom) -> SurfaceId {
        let s = dom.create_surface(96);
        let surf = dom.surface_mut(s).unwrap();
        surf.width = 200;
        surf.height = 200;
        s
    }

    #[test]
    fn later_root_wins_then_z_index() {
        let mut dom = Dom::new();
        let s = surface_with_size(&mut dom);
        let a = dom.create_element();
        let b = dom.create_element();
        dom.attach_to_surface(a, s);
        dom.attach_to_surface(b, s);
        place(&mut dom, a, 0, 0, 100, 100);
        place(&mut dom, b, 50, 50, 100, 100);
        let hit = |dom: &Dom| hit_test(dom, s, Offset::new(75, 75), None, 0).map(|h| h.element);
        assert_eq!(hit(&dom), Some(b));

        dom.get_mut(a).unwrap().style.z_index = 5;
        dom.restack(a);
        assert_eq!(hit(&dom), Some(a));
    }

    #[test]
    fn children_are_clipped_by_clipping_parent() {
        let mut dom = Dom::new();
        let s = surface_with_size(&mut dom);
        let parent = dom.create_element();
        let child = dom.create_element();
        dom.attach_to_surface(parent, s);
        dom.insert_child(parent, child, InsertPosition::Last);
        place(&mut dom, parent, 0, 0, 50, 50);
        place(&mut dom, child, 40, 40, 40, 40);

        assert_eq!(hit_test(&dom, s, Offset::new(60, 60), None, 0).map(|h| h.element), Some(child));
        dom.get_mut(parent).unwrap().style.clip_mode = ClipMode::Clip;
        assert_eq!(hit_test(&dom, s, Offset::new(60, 60), None, 0), None);
        assert_eq!(hit_test(&dom, s, Offset::new(45, 45), None, 0).map(|h| h.element), Some(child));
    }

    #[test]
    fn hidden_and_excluded_subtrees_are_skipped() {
        let mut dom = Dom::new();
        let s = surface_with_size(&mut dom);
        let under = dom.create_element();
        let over = dom.create_element();
        dom.attach_to_surface(under, s);
        dom.attach_to_surface(over, s);
        place(&mut dom, under, 0, 0, 100, 100);
        place(&mut dom, over, 0, 0, 100, 100);
        let p = Offset::new(10, 10);
        assert_eq!(hit_test(&dom, s, p, Some(over), 0).map(|h| h.element), Some(under));
        dom.get_mut(over).unwrap().style.flags.remove(StyleFlags::VISIBLE);
        assert_eq!(hit_test(&dom, s, p, None, 0).map(|h| h.element), Some(under));
    }

    #[test]
    fn gripper_band_beats_children() {
        let mut dom = Dom::new();
        let s = surface_with_size(&mut dom);
        let panel = dom.create_element();
        let filler = dom.create_element();
        dom.attach_to_surface(panel, s);
        dom.insert_child(panel, filler, InsertPosition::Last);
        place(&mut dom, panel, 0, 0, 100, 100);
        place(&mut dom, filler, 0, 0, 100, 100);
        {
            let style = &mut dom.get_mut(panel).unwrap().style;
            style.flags |= StyleFlags::RESIZE_WIDTH | StyleFlags::RESIZE_HEIGHT;
            style.width = StyleValue::absolute(100);
            style.height = StyleValue::absolute(100);
        }
        let corner = hit_test(&dom, s, Offset::new(98, 99), None, 4).unwrap();
        assert_eq!(corner, Hit { element: panel, grip: Grip::RIGHT | Grip::BOTTOM });
        assert_eq!(corner.grip.cursor(), CursorIcon::ResizeNwse);
        // Auto-positioned elements have no near-edge bands.
        assert_eq!(hit_test(&dom, s, Offset::new(1, 50), None, 4).map(|h| h.element), Some(filler));
        assert_eq!(hit_test(&dom, s, Offset::new(50, 50), None, 4).map(|h| h.element), Some(filler));
    }

    #[test]
    fn grip_cursors() {
        assert_eq!(Grip::LEFT.cursor(), CursorIcon::ResizeHorizontal);
        assert_eq!(Grip::TOP.cursor(), CursorIcon::ResizeVertical);
        assert_eq!((Grip::RIGHT | Grip::TOP).cursor(), CursorIcon::ResizeNesw);
        assert!(Grip::LEFT.moves_near(Axis::Horizontal));
        assert!(!Grip::BOTTOM.moves_near(Axis::Vertical));
    }
}
