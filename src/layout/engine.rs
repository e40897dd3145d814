//! Incremental layout: dirty tracking, validation and the post-pass.
//!
//! [`LayoutEngine`] owns the pending list and the list of elements with
//! unreported changes. Mutations call [`LayoutEngine::invalidate`] (directly
//! or through the style/structure hooks below); [`LayoutEngine::drain`]
//! recomputes pending elements until none are left, and
//! [`LayoutEngine::settle`] refreshes absolute positions and paint rectangles
//! and hands back what changed so the caller can post events.

use std::collections::HashSet;

use crate::dom::node::{ElementId, SurfaceId};
use crate::dom::Dom;
use crate::style::{Axis, FontDesc, Positioning, StyleChanges};
use crate::text::TextLayouter;

use super::flags::LayoutFlags;
use super::position::absolute_of;
use super::resolve::Resolver;
use super::scheduler::PendingList;
use super::size::{first_in_flow, in_flow_children, next_in_flow};

const AXES: [Axis; 2] = [Axis::Horizontal, Axis::Vertical];

/// Per-element processing stages, in order.
const STAGES: [(LayoutFlags, Stage); 5] = [
    (LayoutFlags::WIDTH.union(LayoutFlags::FORCE_WIDTH), Stage::Size(Axis::Horizontal)),
    (LayoutFlags::TEXT, Stage::Text),
    (LayoutFlags::HEIGHT.union(LayoutFlags::FORCE_HEIGHT), Stage::Size(Axis::Vertical)),
    (LayoutFlags::X.union(LayoutFlags::FORCE_X), Stage::Position(Axis::Horizontal)),
    (LayoutFlags::Y.union(LayoutFlags::FORCE_Y), Stage::Position(Axis::Vertical)),
];

#[derive(Debug, Clone, Copy)]
enum Stage {
    Size(Axis),
    Text,
    Position(Axis),
}

/// Dirty-tracking layout engine.
#[derive(Debug)]
pub struct LayoutEngine {
    pending: PendingList,
    /// Elements whose `changed` word went non-empty since the last settle.
    changed: Vec<ElementId>,
    base_dpi: u32,
    default_font: FontDesc,
}

impl LayoutEngine {
    pub fn new(base_dpi: u32, default_font: FontDesc) -> Self {
        Self {
            pending: PendingList::new(),
            changed: Vec::new(),
            base_dpi: base_dpi.max(1),
            default_font,
        }
    }

    /// DPI context of `surface` (base DPI when detached).
    pub fn resolver(&self, dom: &Dom, surface: Option<SurfaceId>) -> Resolver {
        let dpi = surface.and_then(|s| dom.surface(s)).map_or(self.base_dpi, |s| s.dpi());
        Resolver::new(dpi, self.base_dpi)
    }

    pub(crate) fn default_font_px(&self, resolver: &Resolver) -> i32 {
        resolver.font_px(&self.default_font, resolver.scale(12))
    }

    // ── Dirty tracking ───────────────────────────────────────────────

    /// Mark `flags` stale on `id` and queue it. Force flags imply their plain
    /// counterparts.
    pub fn invalidate(&mut self, dom: &mut Dom, id: ElementId, flags: LayoutFlags) {
        let mut flags = flags;
        for axis in AXES {
            if flags.contains(LayoutFlags::force_position(axis)) {
                flags |= LayoutFlags::position(axis);
            }
            if flags.contains(LayoutFlags::force_size(axis)) {
                flags |= LayoutFlags::size(axis);
            }
        }
        flags.remove(LayoutFlags::ABSOLUTE);
        if flags.is_empty() {
            return;
        }
        let Some(el) = dom.get_mut(id) else {
            return;
        };
        el.layout.invalid |= flags;
        self.pending.push_back(id);
    }

    /// Invalidate `flags` on `id` and every descendant.
    pub fn invalidate_subtree(&mut self, dom: &mut Dom, id: ElementId, flags: LayoutFlags) {
        for node in dom.walk_depth_first(id) {
            self.invalidate(dom, node, flags);
        }
    }

    /// Record that `flags` changed on `id` and must be reported.
    pub(crate) fn mark_changed(&mut self, dom: &mut Dom, id: ElementId, flags: LayoutFlags) {
        let Some(el) = dom.get_mut(id) else {
            return;
        };
        if el.layout.changed.is_empty() {
            self.changed.push(id);
        }
        el.layout.changed |= flags;
    }

    /// Drop every reference to a destroyed element.
    pub fn forget(&mut self, id: ElementId) {
        self.pending.remove(id);
        self.changed.retain(|&c| c != id);
    }

    pub fn is_pending(&self, id: ElementId) -> bool {
        self.pending.contains(id)
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn pending(&self) -> impl Iterator<Item = ElementId> + '_ {
        self.pending.iter()
    }

    /// Whether a drain or settle would do anything.
    pub fn has_work(&self) -> bool {
        !self.pending.is_empty() || !self.changed.is_empty()
    }

    // ── Validation ───────────────────────────────────────────────────

    /// Process pending elements until the list is empty. Elements invalidated
    /// along the way are appended and drained in the same loop. Returns the
    /// number of elements processed.
    pub fn drain(&mut self, dom: &mut Dom, layouter: &dyn TextLayouter) -> usize {
        let mut processed = 0;
        while let Some(id) = self.pending.pop_front() {
            self.process(dom, layouter, id);
            processed += 1;
        }
        log::trace!(target: "gilt_gui::layout", "drained {processed} pending elements");
        processed
    }

    fn process(&mut self, dom: &mut Dom, layouter: &dyn TextLayouter, id: ElementId) {
        let Some(el) = dom.get_mut(id) else {
            return;
        };
        if el.surface.is_none() {
            // Detached subtrees are laid out again when they are attached.
            el.layout.invalid = LayoutFlags::empty();
            return;
        }
        for (mask, stage) in STAGES {
            let Some(el) = dom.get_mut(id) else {
                return;
            };
            let bits = el.layout.invalid & mask;
            if bits.is_empty() {
                continue;
            }
            el.layout.invalid.remove(mask);
            match stage {
                Stage::Size(axis) => {
                    let force = bits.contains(LayoutFlags::force_size(axis));
                    self.update_size(dom, id, axis, force);
                }
                Stage::Text => self.update_text(dom, layouter, id),
                Stage::Position(axis) => {
                    let force = bits.contains(LayoutFlags::force_position(axis));
                    self.update_position(dom, id, axis, force);
                }
            }
        }
        if dom.get(id).is_some_and(|el| el.layout.invalid.is_empty()) {
            self.pending.remove(id);
        }
    }

    /// Post-pass over every element with unreported changes.
    ///
    /// Absolute positions are recomputed top-down (a moved element drags its
    /// flow descendants along), the old and new rectangles of each changed
    /// element are invalidated on its surface, and the changed words are
    /// taken. Returns `(element, changed)` pairs, ancestors first.
    pub fn settle(&mut self, dom: &mut Dom) -> Vec<(ElementId, LayoutFlags)> {
        let mut order = std::mem::take(&mut self.changed);
        order.retain(|&id| dom.contains(id));
        order.sort_by_cached_key(|&id| dom.depth(id));

        for &id in &order {
            self.refresh_absolute(dom, id);
        }
        order.append(&mut self.changed);

        let mut seen = HashSet::with_capacity(order.len());
        let mut reports = Vec::with_capacity(order.len());
        for id in order {
            if !seen.insert(id) {
                continue;
            }
            let Some(el) = dom.get_mut(id) else { continue };
            let flags = std::mem::take(&mut el.layout.changed);
            if flags.is_empty() {
                continue;
            }
            let old = el.layout.painted;
            let new = el.layout.region();
            el.layout.painted = new;
            let surface = el.surface;
            if let Some(surface) = surface.and_then(|s| dom.surface_mut(s)) {
                surface.invalidate(old);
                surface.invalidate(new);
            }
            reports.push((id, flags));
        }
        log::trace!(target: "gilt_gui::layout", "settled {} changed elements", reports.len());
        reports
    }

    fn refresh_absolute(&mut self, dom: &mut Dom, id: ElementId) {
        let absolute = absolute_of(dom, id);
        let Some(el) = dom.get_mut(id) else {
            return;
        };
        if el.layout.absolute == absolute {
            return;
        }
        el.layout.absolute = absolute;
        self.mark_changed(dom, id, LayoutFlags::ABSOLUTE);
        let children: Vec<ElementId> = dom.children(id).collect();
        for child in children {
            if dom.get(child).is_some_and(|c| c.style.positioning != Positioning::Absolute) {
                self.refresh_absolute(dom, child);
            }
        }
    }

    // ── Style and structure hooks ────────────────────────────────────

    /// Turn a style change on `id` into invalidations.
    pub fn style_changed(&mut self, dom: &mut Dom, id: ElementId, changes: StyleChanges) {
        let Some(el) = dom.get(id) else {
            return;
        };
        let style = &el.style;
        let mut own = LayoutFlags::empty();
        let mut children = LayoutFlags::empty();
        let mut flow_children = LayoutFlags::empty();
        let mut first_child = LayoutFlags::empty();

        if changes.contains(StyleChanges::POSITIONING) {
            // The sizing base and the positioning box both depend on the mode.
            own |= LayoutFlags::SIZE | LayoutFlags::POSITION;
        }
        if changes.contains(StyleChanges::OFFSET_X) {
            own |= LayoutFlags::X;
        }
        if changes.contains(StyleChanges::OFFSET_Y) {
            own |= LayoutFlags::Y;
        }
        if changes.intersects(StyleChanges::WIDTH | StyleChanges::SPACING_X) {
            own |= LayoutFlags::WIDTH;
        }
        if changes.intersects(StyleChanges::HEIGHT | StyleChanges::SPACING_Y) {
            own |= LayoutFlags::HEIGHT;
        }
        if changes.contains(StyleChanges::CHILD_AXIS) {
            own |= LayoutFlags::SIZE;
            flow_children |= LayoutFlags::POSITION | LayoutFlags::SIZE;
        }
        for (change, axis) in [(StyleChanges::H_ALIGN, Axis::Horizontal), (StyleChanges::V_ALIGN, Axis::Vertical)] {
            if changes.contains(change) {
                if style.child_axis == axis {
                    first_child |= LayoutFlags::position(axis);
                } else {
                    flow_children |= LayoutFlags::position(axis);
                }
            }
        }
        if changes.contains(StyleChanges::CHILDREN_SIZE_BOUNDARY) {
            children |= LayoutFlags::SIZE;
        }
        if changes.contains(StyleChanges::POSITION_ORIGIN) {
            children |= LayoutFlags::POSITION;
        }
        if changes.contains(StyleChanges::FLEX) {
            own |= LayoutFlags::SIZE;
            flow_children |= LayoutFlags::SIZE;
        }
        if changes.intersects(StyleChanges::FONT | StyleChanges::TEXT_WRAP) {
            own |= LayoutFlags::TEXT;
        }

        let parent = el.parent;
        let flow_membership = changes.intersects(StyleChanges::POSITIONING | StyleChanges::VISIBILITY);
        // A unit change can keep the resolved size yet move the element in
        // or out of its parent's auto size and flex set.
        let resized_in_flow: Vec<Axis> = [
            (StyleChanges::WIDTH | StyleChanges::SPACING_X, Axis::Horizontal),
            (StyleChanges::HEIGHT | StyleChanges::SPACING_Y, Axis::Vertical),
        ]
        .into_iter()
        .filter(|&(change, _)| el.in_flow() && changes.intersects(change))
        .map(|(_, axis)| axis)
        .collect();

        self.invalidate(dom, id, own);
        if !children.is_empty() {
            let kids: Vec<ElementId> = dom.children(id).collect();
            for kid in kids {
                self.invalidate(dom, kid, children);
            }
        }
        if !flow_children.is_empty() {
            let kids: Vec<ElementId> = in_flow_children(dom, id).collect();
            for kid in kids {
                self.invalidate(dom, kid, flow_children);
            }
        }
        if let Some(first) = first_in_flow(dom, id).filter(|_| !first_child.is_empty()) {
            self.invalidate(dom, first, first_child);
        }
        if let Some(parent) = parent.filter(|_| !resized_in_flow.is_empty()) {
            let next = next_in_flow(dom, id);
            for axis in resized_in_flow {
                self.flow_changed(dom, parent, next, axis);
            }
        }
        if flow_membership {
            if let Some(parent) = parent {
                let next = next_in_flow(dom, id);
                for axis in AXES {
                    self.flow_changed(dom, parent, next, axis);
                }
            }
            self.invalidate(dom, id, LayoutFlags::POSITION);
        }
    }

    /// Before `id` leaves its parent: the parent and the next in-flow
    /// sibling, so that [`Self::removed_from_flow`] can repair the flow.
    pub fn flow_neighbours(&self, dom: &Dom, id: ElementId) -> Option<(ElementId, Option<ElementId>)> {
        let el = dom.get(id)?;
        if !el.in_flow() {
            return None;
        }
        Some((el.parent?, next_in_flow(dom, id)))
    }

    /// Repair the flow an element was removed from.
    pub fn removed_from_flow(&mut self, dom: &mut Dom, neighbours: Option<(ElementId, Option<ElementId>)>) {
        let Some((parent, next)) = neighbours else {
            return;
        };
        for axis in AXES {
            self.flow_changed(dom, parent, next, axis);
        }
    }

    /// `id` was linked under a parent or onto a surface.
    ///
    /// The element is forced to report a move even when its numbers stay
    /// the same. When it landed on a different surface the whole subtree is
    /// laid out again, since DPI and percentage bases may differ.
    pub fn attached(&mut self, dom: &mut Dom, id: ElementId, surface_changed: bool) {
        if surface_changed {
            self.invalidate_subtree(dom, id, LayoutFlags::GEOMETRY);
        }
        self.invalidate(dom, id, LayoutFlags::GEOMETRY | LayoutFlags::FORCE_ALL);
        let neighbours = self.flow_neighbours(dom, id);
        self.removed_from_flow(dom, neighbours);
    }

    /// The surface was resized: roots and absolute elements depend on its box.
    pub fn surface_resized(&mut self, dom: &mut Dom, surface: SurfaceId) {
        let layers = dom.surface(surface).map(|s| s.layers().to_vec()).unwrap_or_default();
        for layer in layers {
            self.invalidate(dom, layer, LayoutFlags::SIZE | LayoutFlags::POSITION);
        }
    }

    /// The surface DPI changed: everything on it is laid out again.
    pub fn surface_rescaled(&mut self, dom: &mut Dom, surface: SurfaceId) {
        for id in dom.surface_elements(surface) {
            self.invalidate(dom, id, LayoutFlags::GEOMETRY);
        }
    }

    /// The scroll offset of `id` changed: children move, text is redrawn.
    pub fn inner_offset_changed(&mut self, dom: &mut Dom, id: ElementId) {
        let kids: Vec<ElementId> = dom.children(id).collect();
        for kid in kids {
            if dom.get(kid).is_some_and(|k| k.style.positioning != Positioning::Absolute) {
                self.invalidate(dom, kid, LayoutFlags::FORCE_X | LayoutFlags::FORCE_Y);
            }
        }
        self.invalidate(dom, id, LayoutFlags::TEXT);
        self.mark_changed(dom, id, LayoutFlags::TEXT);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::InsertPosition;
    use crate::geometry::Offset;
    use crate::style::{StyleFlags, StyleValue};
    use crate::text::MonospaceLayouter;
    use pretty_assertions::assert_eq;

    struct Fixture {
        dom: Dom,
        engine: LayoutEngine,
        surface: SurfaceId,
    }

    impl Fixture {
        fn new(width: i32, height: i32) -> Self {
            let mut dom = Dom::new();
            let surface = dom.create_surface(96);
            if let Some(s) = dom.surface_mut(surface) {
                s.width = width;
                s.height = height;
            }
            Self { dom, engine: LayoutEngine::new(96, FontDesc::default()), surface }
        }

        fn root(&mut self) -> ElementId {
            let id = self.dom.create_element();
            self.dom.attach_to_surface(id, self.surface);
            self.engine.attached(&mut self.dom, id, true);
            id
        }

        fn child(&mut self, parent: ElementId) -> ElementId {
            let id = self.dom.create_element();
            self.dom.insert_child(parent, id, InsertPosition::Last);
            self.engine.attached(&mut self.dom, id, true);
            id
        }

        fn style(&mut self, id: ElementId, f: impl FnOnce(&mut crate::style::Style)) {
            let el = self.dom.get_mut(id).unwrap();
            let old = el.style.clone();
            f(&mut el.style);
            let changes = old.diff(&el.style);
            self.engine.style_changed(&mut self.dom, id, changes);
        }

        fn validate(&mut self) -> Vec<(ElementId, LayoutFlags)> {
            self.engine.drain(&mut self.dom, &MonospaceLayouter);
            self.engine.settle(&mut self.dom)
        }

        fn rect(&self, id: ElementId) -> (i32, i32, i32, i32) {
            let l = self.dom.get(id).unwrap().layout();
            (l.x, l.y, l.width, l.height)
        }
    }

    #[test]
    fn root_fills_percent_of_surface() {
        let mut fx = Fixture::new(400, 300);
        let root = fx.root();
        fx.style(root, |s| {
            s.width = StyleValue::percent(50.0);
            s.height = StyleValue::percent(100.0);
        });
        fx.validate();
        assert_eq!(fx.rect(root), (0, 0, 200, 300));
    }

    #[test]
    fn auto_parent_wraps_stacked_children() {
        let mut fx = Fixture::new(400, 300);
        let root = fx.root();
        fx.style(root, |s| s.padding = crate::style::Sides::all(StyleValue::absolute(5)));
        let a = fx.child(root);
        let b = fx.child(root);
        fx.style(a, |s| {
            s.width = StyleValue::absolute(50);
            s.height = StyleValue::absolute(20);
        });
        fx.style(b, |s| {
            s.width = StyleValue::absolute(80);
            s.height = StyleValue::absolute(10);
            s.margin.top = StyleValue::absolute(3);
        });
        fx.validate();
        assert_eq!(fx.rect(a), (5, 5, 50, 20));
        assert_eq!(fx.rect(b), (5, 28, 80, 10));
        assert_eq!(fx.rect(root), (0, 0, 90, 43));
        assert_eq!(fx.dom.get(b).unwrap().layout().absolute, Offset::new(5, 28));
    }

    #[test]
    fn second_settle_reports_nothing() {
        let mut fx = Fixture::new(100, 100);
        let root = fx.root();
        fx.child(root);
        assert!(!fx.validate().is_empty());
        assert!(!fx.engine.has_work());
        assert_eq!(fx.engine.drain(&mut fx.dom, &MonospaceLayouter), 0);
        assert!(fx.engine.settle(&mut fx.dom).is_empty());
    }

    #[test]
    fn centered_flow() {
        let mut fx = Fixture::new(100, 100);
        let root = fx.root();
        fx.style(root, |s| {
            s.width = StyleValue::absolute(100);
            s.height = StyleValue::absolute(100);
            s.h_align = crate::style::HAlign::Center;
            s.v_align = crate::style::VAlign::Bottom;
        });
        let a = fx.child(root);
        fx.style(a, |s| {
            s.width = StyleValue::absolute(40);
            s.height = StyleValue::absolute(30);
        });
        fx.validate();
        assert_eq!(fx.rect(a), (30, 70, 40, 30));

        // Growing the child re-centres it.
        fx.style(a, |s| s.width = StyleValue::absolute(60));
        fx.validate();
        assert_eq!(fx.rect(a), (20, 70, 60, 30));
    }

    #[test]
    fn relative_far_priority() {
        let mut fx = Fixture::new(200, 100);
        let root = fx.root();
        fx.style(root, |s| {
            s.width = StyleValue::absolute(200);
            s.height = StyleValue::absolute(100);
        });
        let el = fx.child(root);
        fx.style(el, |s| {
            s.positioning = Positioning::Relative;
            s.width = StyleValue::absolute(20);
            s.height = StyleValue::absolute(10);
            s.left = StyleValue::absolute(5);
            s.right = StyleValue::absolute(15);
            s.bottom = StyleValue::absolute(-4);
        });
        fx.validate();
        assert_eq!(fx.rect(el), (5, 94, 20, 10));

        fx.style(el, |s| s.flags |= StyleFlags::RIGHT_PRIORITY);
        fx.validate();
        assert_eq!(fx.rect(el), (165, 94, 20, 10));
    }

    #[test]
    fn text_sizes_auto_element() {
        let mut fx = Fixture::new(200, 100);
        let root = fx.root();
        fx.dom.get_mut(root).unwrap().text = Some(crate::text::TextBuffer::new("hello"));
        fx.engine.invalidate(&mut fx.dom, root, LayoutFlags::TEXT);
        fx.validate();
        // 12pt at 96 dpi: 6px advance, 12px lines.
        assert_eq!(fx.rect(root), (0, 0, 30, 12));
    }

    #[test]
    fn wrapped_text_grows_height_under_max_width() {
        let mut fx = Fixture::new(200, 100);
        let root = fx.root();
        fx.style(root, |s| {
            s.max_width = StyleValue::absolute(42);
            s.flags |= StyleFlags::WORD_WRAP;
        });
        fx.dom.get_mut(root).unwrap().text = Some(crate::text::TextBuffer::new("aaa bbb ccc"));
        fx.engine.invalidate(&mut fx.dom, root, LayoutFlags::TEXT);
        fx.validate();
        let layout = fx.dom.get(root).unwrap().layout();
        assert_eq!((layout.width, layout.height, layout.unclamped_width), (42, 24, 66));
    }

    #[test]
    fn forget_drops_pending_entry() {
        let mut fx = Fixture::new(10, 10);
        let root = fx.root();
        assert!(fx.engine.is_pending(root));
        fx.engine.forget(root);
        assert!(!fx.engine.is_pending(root));
        assert_eq!(fx.engine.pending_len(), 0);
    }
}
