//! Pointer routing: hover tracking, press/click, drag, resize, wheel scroll.
//!
//! All entry points take surface coordinates. The hovered chain is kept
//! deepest first; enter events fire outermost first and leave events deepest
//! first, so handlers always see a consistent nesting.
//!
//! Tooltip changes are posted once the hover update is complete, after every
//! leave and enter event of the move. When the owner changes, `TooltipShow`
//! for the new owner comes before the deferred `TooltipHide` of the old one.

use crate::context::Context;
use crate::dom::node::{ElementId, SurfaceId};
use crate::geometry::{Offset, Size};
use crate::layout::hit::{clip_rect, is_shown};
use crate::layout::position::position_box;
use crate::layout::{hit_test, Grip, Hit};
use crate::style::{Axis, ClipMode, CursorIcon, DragClamp, Positioning, StyleFlags, StyleValue};

use super::handler::ControlFlow;
use super::input::{Modifiers, MouseButton};
use super::message::{Event, EventDetail, EventKind, PointerDetail};

/// Gesture started by a left press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Gesture {
    /// `anchor` is the grabbed point relative to the element's border box.
    Drag { element: ElementId, anchor: Offset },
    Resize {
        element: ElementId,
        grip: Grip,
        start: Offset,
        size: Size,
        /// left/top in effect when the gesture began.
        offsets: Offset,
    },
    /// Text selection inside an editable element.
    Select { element: ElementId },
}

impl Gesture {
    fn element(self) -> ElementId {
        match self {
            Gesture::Drag { element, .. } | Gesture::Resize { element, .. } | Gesture::Select { element } => element,
        }
    }
}

#[derive(Debug)]
pub(crate) struct PointerState {
    pub(crate) surface: Option<SurfaceId>,
    pub(crate) position: Offset,
    pub(crate) hovered: Vec<ElementId>,
    pub(crate) pushed: Option<ElementId>,
    pub(crate) capture: Option<ElementId>,
    pub(crate) gesture: Option<Gesture>,
    pub(crate) drag_proxy: Option<ElementId>,
    pub(crate) tooltip: Option<ElementId>,
    pub(crate) cursor: CursorIcon,
}

impl Default for PointerState {
    fn default() -> Self {
        Self {
            surface: None,
            position: Offset::ZERO,
            hovered: Vec::new(),
            pushed: None,
            capture: None,
            gesture: None,
            drag_proxy: None,
            tooltip: None,
            cursor: CursorIcon::Arrow,
        }
    }
}

impl PointerState {
    /// Drop references to elements that left the surface or were destroyed.
    pub(crate) fn forget(&mut self, ids: &[ElementId]) {
        let gone = |id: &ElementId| ids.contains(id);
        self.hovered.retain(|id| !gone(id));
        for slot in [&mut self.pushed, &mut self.capture, &mut self.drag_proxy, &mut self.tooltip] {
            if slot.as_ref().is_some_and(gone) {
                *slot = None;
            }
        }
        if self.gesture.is_some_and(|g| gone(&g.element())) {
            self.gesture = None;
        }
    }
}

impl Context {
    // ── Accessors ────────────────────────────────────────────────────

    /// Hovered elements, deepest first.
    pub fn hovered(&self) -> &[ElementId] {
        &self.pointer.hovered
    }

    /// Element the left button went down on.
    pub fn pushed(&self) -> Option<ElementId> {
        self.pointer.pushed
    }

    pub fn capture(&self) -> Option<ElementId> {
        self.pointer.capture
    }

    /// Route every pointer event to `id` regardless of hit testing.
    pub fn set_capture(&mut self, id: Option<ElementId>) -> bool {
        if id.is_some_and(|id| !self.contains(id)) {
            return false;
        }
        self.pointer.capture = id;
        true
    }

    pub fn drag_proxy(&self) -> Option<ElementId> {
        self.pointer.drag_proxy
    }

    /// Make `id` follow the pointer until the next button release, where it
    /// is dropped onto the element underneath. The proxy is switched to
    /// absolute positioning.
    pub fn set_drag_proxy(&mut self, id: Option<ElementId>) -> bool {
        if let Some(id) = id {
            if !self.contains(id) {
                return false;
            }
            self.update_style(id, |s| s.positioning = Positioning::Absolute);
        }
        self.pointer.drag_proxy = id;
        if id.is_some() {
            self.move_drag_proxy(self.pointer.position);
        }
        true
    }

    /// Cursor icon the embedder should show.
    pub fn cursor(&self) -> CursorIcon {
        self.pointer.cursor
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.pointer.gesture, Some(Gesture::Drag { .. }))
    }

    pub fn is_resizing(&self) -> bool {
        matches!(self.pointer.gesture, Some(Gesture::Resize { .. }))
    }

    /// Element whose tooltip is currently shown.
    pub fn tooltip_owner(&self) -> Option<ElementId> {
        self.pointer.tooltip
    }

    // ── Entry points ─────────────────────────────────────────────────

    pub fn mouse_enter(&mut self, surface: SurfaceId, x: i32, y: i32) -> ControlFlow {
        self.mouse_move(surface, x, y)
    }

    /// The pointer left `surface`: everything hovered on it is left.
    pub fn mouse_leave(&mut self, surface: SurfaceId) {
        if self.pointer.surface != Some(surface) {
            return;
        }
        self.update_hover(None);
        self.pointer.surface = None;
        self.pointer.cursor = CursorIcon::Arrow;
    }

    pub fn mouse_move(&mut self, surface: SurfaceId, x: i32, y: i32) -> ControlFlow {
        if self.surface(surface).is_none() {
            return ControlFlow::Continue;
        }
        self.ensure_valid();
        let point = Offset::new(x, y);
        self.pointer.surface = Some(surface);
        self.pointer.position = point;

        if let Some(gesture) = self.pointer.gesture {
            self.continue_gesture(gesture, point);
        }
        if let Some(proxy) = self.pointer.drag_proxy {
            self.move_drag_proxy(point);
            log::trace!(target: "gilt_gui::event", "drag proxy {proxy:?} at {point:?}");
        }
        if self.pointer.gesture.is_some() || self.pointer.drag_proxy.is_some() {
            self.ensure_valid();
        }

        let hit = self.hit(surface, point);
        self.update_hover(hit.map(|h| h.element));
        self.update_cursor(hit);
        match self.pointer.capture.or(hit.map(|h| h.element)) {
            Some(target) => self.post_pointer(EventKind::MouseMove, target, None),
            None => ControlFlow::Continue,
        }
    }

    pub fn mouse_down(&mut self, surface: SurfaceId, button: MouseButton, x: i32, y: i32) -> ControlFlow {
        if self.surface(surface).is_none() {
            return ControlFlow::Continue;
        }
        self.ensure_valid();
        let point = Offset::new(x, y);
        self.pointer.surface = Some(surface);
        self.pointer.position = point;
        let hit = self.hit(surface, point);
        self.update_hover(hit.map(|h| h.element));

        if button == MouseButton::Left {
            let focus_target = hit.and_then(|h| self.focus_target(h.element));
            if focus_target.is_some() {
                self.set_focus(focus_target);
            }
        }
        let Some(target) = self.pointer.capture.or(hit.map(|h| h.element)) else {
            return ControlFlow::Continue;
        };
        let flow = self.post_pointer(EventKind::MouseDown, target, Some(button));
        if button != MouseButton::Left {
            return flow;
        }
        self.pointer.pushed = Some(target);
        if flow == ControlFlow::Continue {
            self.start_gesture(hit, target, point);
        }
        self.update_cursor(hit);
        flow
    }

    pub fn mouse_up(&mut self, surface: SurfaceId, button: MouseButton, x: i32, y: i32) -> ControlFlow {
        if self.surface(surface).is_none() {
            return ControlFlow::Continue;
        }
        self.ensure_valid();
        let point = Offset::new(x, y);
        self.pointer.surface = Some(surface);
        self.pointer.position = point;

        if button == MouseButton::Left {
            if let Some(proxy) = self.pointer.drag_proxy.take() {
                let under = hit_test(&self.dom, surface, point, Some(proxy), self.config().gripper_size);
                if let Some(under) = under {
                    self.post(
                        Event::new(EventKind::Drop, Some(under.element)).with_detail(EventDetail::Drop { proxy }),
                    );
                }
            }
        }

        let hit = self.hit(surface, point);
        self.update_hover(hit.map(|h| h.element));
        let flow = match self.pointer.capture.or(hit.map(|h| h.element)) {
            Some(target) => self.post_pointer(EventKind::MouseUp, target, Some(button)),
            None => ControlFlow::Continue,
        };

        if button == MouseButton::Left {
            let pushed = self.pointer.pushed.take();
            match self.pointer.gesture.take() {
                Some(Gesture::Drag { element, .. }) => {
                    log::debug!(target: "gilt_gui::event", "drag of {element:?} ended");
                    self.post(Event::new(EventKind::DragEnd, Some(element)));
                }
                Some(Gesture::Resize { element, .. }) => {
                    log::debug!(target: "gilt_gui::event", "resize of {element:?} ended");
                    self.post(Event::new(EventKind::ResizeEnd, Some(element)));
                }
                _ => {}
            }
            if let Some(pushed) = pushed.filter(|p| self.pointer.hovered.first() == Some(p)) {
                self.post_pointer(EventKind::Click, pushed, Some(button));
            }
        }
        self.update_cursor(hit);
        flow
    }

    pub fn double_click(&mut self, surface: SurfaceId, button: MouseButton, x: i32, y: i32) -> ControlFlow {
        if self.surface(surface).is_none() {
            return ControlFlow::Continue;
        }
        self.ensure_valid();
        let point = Offset::new(x, y);
        self.pointer.position = point;
        let hit = self.hit(surface, point);
        match self.pointer.capture.or(hit.map(|h| h.element)) {
            Some(target) => self.post_pointer(EventKind::DoubleClick, target, Some(button)),
            None => ControlFlow::Continue,
        }
    }

    /// Wheel rotation at `(x, y)`. Unless a listener stops it, the nearest
    /// clipping element scrolls by `(dx, dy)` pixels.
    pub fn wheel(&mut self, surface: SurfaceId, x: i32, y: i32, dx: i32, dy: i32) -> ControlFlow {
        if self.surface(surface).is_none() {
            return ControlFlow::Continue;
        }
        self.ensure_valid();
        let point = Offset::new(x, y);
        self.pointer.position = point;
        let hit = self.hit(surface, point);
        let Some(target) = self.pointer.capture.or(hit.map(|h| h.element)) else {
            return ControlFlow::Continue;
        };
        let flow = self.post(Event::new(EventKind::Wheel, Some(target)).with_detail(EventDetail::Wheel { dx, dy }));
        if flow == ControlFlow::Continue {
            self.scroll_by(target, dx, dy);
        }
        flow
    }

    // ── Internals ────────────────────────────────────────────────────

    fn hit(&self, surface: SurfaceId, point: Offset) -> Option<Hit> {
        hit_test(&self.dom, surface, point, self.pointer.drag_proxy, self.config().gripper_size)
    }

    fn post_pointer(&mut self, kind: EventKind, target: ElementId, button: Option<MouseButton>) -> ControlFlow {
        let position = self.pointer.position;
        let origin = self.layout(target).map_or(Offset::ZERO, |l| l.absolute);
        let detail = PointerDetail {
            position,
            local: position - origin,
            button,
            modifiers: self.keyboard.modifiers,
        };
        self.post(Event::new(kind, Some(target)).with_detail(EventDetail::Pointer(detail)))
    }

    fn update_hover(&mut self, deepest: Option<ElementId>) {
        let chain: Vec<ElementId> = match deepest {
            Some(id) => std::iter::once(id).chain(self.dom.ancestors(id)).collect(),
            None => Vec::new(),
        };
        if chain == self.pointer.hovered {
            return;
        }
        let old = std::mem::replace(&mut self.pointer.hovered, chain.clone());
        for &id in old.iter().filter(|id| !chain.contains(id)) {
            self.post(Event::new(EventKind::MouseLeave, Some(id)));
        }
        for &id in chain.iter().rev().filter(|id| !old.contains(id)) {
            self.post(Event::new(EventKind::MouseEnter, Some(id)));
        }
        self.update_tooltip();
    }

    fn update_tooltip(&mut self) {
        let owner = self
            .pointer
            .hovered
            .iter()
            .copied()
            .find(|&id| self.style(id).is_some_and(|s| s.tooltip.is_some()));
        if owner == self.pointer.tooltip {
            return;
        }
        // The hide of the previous owner is deferred past the show of the
        // next one, so a tooltip host can swap content without closing.
        let hidden = std::mem::replace(&mut self.pointer.tooltip, owner);
        if let Some(new) = owner {
            self.post(Event::new(EventKind::TooltipShow, Some(new)));
        }
        if let Some(old) = hidden {
            self.post(Event::new(EventKind::TooltipHide, Some(old)));
        }
    }

    fn update_cursor(&mut self, hit: Option<Hit>) {
        self.pointer.cursor = match self.pointer.gesture {
            Some(Gesture::Resize { grip, .. }) => grip.cursor(),
            Some(Gesture::Drag { .. }) => CursorIcon::Move,
            _ => match hit {
                Some(h) if !h.grip.is_empty() => h.grip.cursor(),
                _ => self
                    .pointer
                    .hovered
                    .iter()
                    .filter_map(|&id| self.style(id).map(|s| s.cursor))
                    .find(|&c| c != CursorIcon::Inherit)
                    .unwrap_or(CursorIcon::Arrow),
            },
        };
    }

    /// Nearest ancestor-or-self of `id` that takes keyboard focus.
    fn focus_target(&self, id: ElementId) -> Option<ElementId> {
        std::iter::once(id)
            .chain(self.dom.ancestors(id))
            .find(|&e| self.style(e).is_some_and(|s| s.takes_focus()))
    }

    fn start_gesture(&mut self, hit: Option<Hit>, target: ElementId, point: Offset) {
        if let Some(Hit { element, grip }) = hit.filter(|h| !h.grip.is_empty()) {
            let Some(el) = self.element(element) else {
                return;
            };
            let origin = position_box(&self.dom, element);
            let offsets = Offset::new(
                el.layout.x - origin.x - el.layout.margin.left,
                el.layout.y - origin.y - el.layout.margin.top,
            );
            let size = el.layout.size();
            self.pointer.gesture = Some(Gesture::Resize { element, grip, start: point, size, offsets });
            log::debug!(target: "gilt_gui::event", "resize of {element:?} started with {grip:?}");
            self.post(Event::new(EventKind::ResizeStart, Some(element)));
            return;
        }

        let draggable = std::iter::once(target).chain(self.dom.ancestors(target)).find(|&id| {
            self.style(id)
                .is_some_and(|s| s.flags.contains(StyleFlags::DRAGGABLE) && s.positioning != Positioning::Auto)
        });
        if let Some(element) = draggable {
            let anchor = point - self.layout(element).map_or(Offset::ZERO, |l| l.absolute);
            self.pointer.gesture = Some(Gesture::Drag { element, anchor });
            log::debug!(target: "gilt_gui::event", "drag of {element:?} started");
            self.post(Event::new(EventKind::DragStart, Some(element)));
            return;
        }

        if self.style(target).is_some_and(|s| s.flags.contains(StyleFlags::EDITABLE)) {
            self.pointer.gesture = Some(Gesture::Select { element: target });
            let extend = self.keyboard.modifiers.contains(Modifiers::SHIFT);
            self.place_caret_at(target, point, extend);
        }
    }

    fn continue_gesture(&mut self, gesture: Gesture, point: Offset) {
        match gesture {
            Gesture::Drag { element, anchor } => self.drag_to(element, anchor, point),
            Gesture::Resize { element, grip, start, size, offsets } => {
                self.resize_to(element, grip, point - start, size, offsets)
            }
            Gesture::Select { element } => self.place_caret_at(element, point, true),
        }
    }

    /// Move a dragged element so the grabbed point follows the pointer,
    /// honoring its drag clamp.
    fn drag_to(&mut self, element: ElementId, anchor: Offset, point: Offset) {
        let Some(el) = self.element(element) else {
            return;
        };
        let origin = position_box(&self.dom, element);
        let base = match el.parent.and_then(|p| self.dom.get(p)) {
            Some(parent) if el.style.positioning != Positioning::Absolute => {
                parent.layout.absolute + parent.layout.inner_offset
            }
            _ => Offset::ZERO,
        };
        let margin = el.layout.margin;
        let outer = Size::new(el.layout.width + margin.width(), el.layout.height + margin.height());
        let mut left = point.x - anchor.x - base.x - origin.x - margin.left;
        let mut top = point.y - anchor.y - base.y - origin.y - margin.top;
        match el.style.drag_clamp {
            DragClamp::Border => {
                left = left.clamp(0, (origin.width - outer.width).max(0));
                top = top.clamp(0, (origin.height - outer.height).max(0));
            }
            DragClamp::ClickPoint => {
                let min = Offset::new(-margin.left - anchor.x, -margin.top - anchor.y);
                left = left.clamp(min.x, (origin.width + min.x).max(min.x));
                top = top.clamp(min.y, (origin.height + min.y).max(min.y));
            }
            DragClamp::None => {}
        }
        self.update_style(element, |s| {
            s.left = StyleValue::absolute(left);
            s.top = StyleValue::absolute(top);
            s.right = StyleValue::AUTO;
            s.bottom = StyleValue::AUTO;
        });
    }

    fn resize_to(&mut self, element: ElementId, grip: Grip, delta: Offset, size: Size, offsets: Offset) {
        self.update_style(element, |s| {
            if grip.acts_on(Axis::Horizontal) {
                if grip.moves_near(Axis::Horizontal) {
                    let width = (size.width - delta.x).max(0);
                    s.width = StyleValue::absolute(width);
                    s.left = StyleValue::absolute(offsets.x + size.width - width);
                    s.right = StyleValue::AUTO;
                } else {
                    s.width = StyleValue::absolute((size.width + delta.x).max(0));
                }
            }
            if grip.acts_on(Axis::Vertical) {
                if grip.moves_near(Axis::Vertical) {
                    let height = (size.height - delta.y).max(0);
                    s.height = StyleValue::absolute(height);
                    s.top = StyleValue::absolute(offsets.y + size.height - height);
                    s.bottom = StyleValue::AUTO;
                } else {
                    s.height = StyleValue::absolute((size.height + delta.y).max(0));
                }
            }
        });
    }

    fn move_drag_proxy(&mut self, point: Offset) {
        let Some(proxy) = self.pointer.drag_proxy else {
            return;
        };
        self.update_style(proxy, |s| {
            s.left = StyleValue::absolute(point.x);
            s.top = StyleValue::absolute(point.y);
            s.right = StyleValue::AUTO;
            s.bottom = StyleValue::AUTO;
        });
    }

    /// Scroll the nearest visible clipping ancestor-or-self of `id`.
    fn scroll_by(&mut self, id: ElementId, dx: i32, dy: i32) {
        let scroller = std::iter::once(id)
            .chain(self.dom.ancestors(id))
            .find(|&e| self.style(e).is_some_and(|s| s.clip_mode == ClipMode::Clip) && is_shown(&self.dom, e));
        let Some(scroller) = scroller else {
            return;
        };
        let Some(current) = self.inner_offset(scroller) else {
            return;
        };
        let overflow = Offset::new(self.overflow(scroller, Axis::Horizontal), self.overflow(scroller, Axis::Vertical));
        let next = Offset::new(
            (current.x - dx).clamp(-overflow.x, 0),
            (current.y - dy).clamp(-overflow.y, 0),
        );
        if next != current {
            self.set_inner_offset(scroller, next);
        }
    }

    /// How far the content of `id` extends past its clip box along `axis`.
    pub(crate) fn overflow(&self, id: ElementId, axis: Axis) -> i32 {
        let Some(el) = self.element(id) else {
            return 0;
        };
        let Some(clip) = clip_rect(el) else {
            return 0;
        };
        let (clip_end, padding_far) = match axis {
            Axis::Horizontal => (clip.right() - el.layout.absolute.x, el.layout.padding.right),
            Axis::Vertical => (clip.bottom() - el.layout.absolute.y, el.layout.padding.bottom),
        };
        let content = el.layout.content_box();
        let text_end = el.text_layout.as_ref().map_or(0, |t| match axis {
            Axis::Horizontal => content.x + t.width,
            Axis::Vertical => content.y + t.height,
        });
        let children_end = self
            .dom
            .children(id)
            .filter_map(|c| self.dom.get(c))
            .filter(|c| c.style.positioning != Positioning::Absolute && c.style.is_visible())
            .map(|c| {
                let far = match axis {
                    Axis::Horizontal => c.layout.margin.right,
                    Axis::Vertical => c.layout.margin.bottom,
                };
                c.layout.position(axis) + c.layout.extent(axis) + far
            })
            .max()
            .unwrap_or(0);
        (text_end.max(children_end) + padding_far - clip_end).max(0)
    }
}

// ===========================================================================
// Tests
// ===========================================================================
