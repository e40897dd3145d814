//! The context: owner of surfaces, elements and all interaction state.
//!
//! [`Context`] is the single entry point of the crate. Every mutation goes
//! through it so that layout invalidation, repaint regions, pointer and focus
//! bookkeeping, and deferred deletion stay consistent. Layout work is batched:
//! mutations only mark elements stale, and [`Context::validate`] (called
//! implicitly before painting, hit testing and input) settles them.

use std::any::Any;

use crate::config::ContextConfig;
use crate::dom::node::{Element, ElementId, LayoutRecord, Surface, SurfaceId};
use crate::dom::{Dom, InsertPosition};
use crate::error::LayoutError;
use crate::event::handler::{invoke, ControlFlow, ListenerId, Listeners};
use crate::event::keyboard::KeyboardState;
use crate::event::message::{Event, EventDetail, EventKind};
use crate::event::pointer::PointerState;
use crate::event::queue::InputQueue;
use crate::geometry::{Offset, Region};
use crate::layout::{LayoutEngine, LayoutFlags};
use crate::render::paint::ImageCache;
use crate::render::resources::{ImageHandle, MemoryResources, ResourceManager};
use crate::style::{Style, StyleChanges, StyleValue};
use crate::text::{MonospaceLayouter, TextBuffer, TextLayouter};

// ---------------------------------------------------------------------------
// ValidationStats
// ---------------------------------------------------------------------------

/// Counters of the most recent [`Context::validate`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ValidationStats {
    /// Drain/settle rounds. Event handlers that invalidate layout add rounds.
    pub passes: u32,
    /// Element visits made by the layout engine.
    pub processed: usize,
    /// Elements reported as moved or resized.
    pub reported: usize,
}

// ---------------------------------------------------------------------------
// Context
// ---------------------------------------------------------------------------

/// A GUI context.
///
/// Not thread-safe; input produced on other threads goes through
/// [`Context::input_sender`].
pub struct Context {
    config: ContextConfig,
    pub(crate) dom: Dom,
    pub(crate) layout: LayoutEngine,
    pub(crate) layouter: Box<dyn TextLayouter>,
    pub(crate) resources: Box<dyn ResourceManager>,
    global: Listeners,
    pub(crate) pointer: PointerState,
    pub(crate) keyboard: KeyboardState,
    pub(crate) queue: InputQueue,
    pub(crate) images: ImageCache,

    dispatch_depth: u32,
    doomed: Vec<ElementId>,
    doomed_surfaces: Vec<SurfaceId>,
    batch_depth: u32,
    validating: bool,
    /// Visibility flips waiting for the next validation, at most one per element.
    visibility: Vec<(ElementId, bool)>,
    stats: ValidationStats,
}

impl Context {
    /// Create a context with a [`MonospaceLayouter`] and an empty
    /// [`MemoryResources`].
    pub fn new(config: ContextConfig) -> Self {
        let layout = LayoutEngine::new(config.base_dpi, config.default_font.clone());
        Self {
            config,
            dom: Dom::new(),
            layout,
            layouter: Box::new(MonospaceLayouter),
            resources: Box::new(MemoryResources::new()),
            global: Listeners::new(),
            pointer: PointerState::default(),
            keyboard: KeyboardState::default(),
            queue: InputQueue::new(),
            images: ImageCache::default(),
            dispatch_depth: 0,
            doomed: Vec::new(),
            doomed_surfaces: Vec::new(),
            batch_depth: 0,
            validating: false,
            visibility: Vec::new(),
            stats: ValidationStats::default(),
        }
    }

    /// Replace the text layouter. Every element with text is laid out again.
    pub fn with_text_layouter(mut self, layouter: impl TextLayouter + 'static) -> Self {
        self.layouter = Box::new(layouter);
        let texts: Vec<ElementId> = self
            .dom
            .surface_ids()
            .flat_map(|s| self.dom.surface_elements(s))
            .filter(|&id| self.dom.get(id).is_some_and(|el| el.text.is_some()))
            .collect();
        for id in texts {
            self.layout.invalidate(&mut self.dom, id, LayoutFlags::TEXT);
        }
        self
    }

    /// Replace the resource manager.
    pub fn with_resources(mut self, resources: impl ResourceManager + 'static) -> Self {
        self.resources = Box::new(resources);
        self
    }

    pub fn config(&self) -> &ContextConfig {
        &self.config
    }

    /// Read-only view of the element tree.
    pub fn dom(&self) -> &Dom {
        &self.dom
    }

    pub fn resources(&self) -> &dyn ResourceManager {
        self.resources.as_ref()
    }

    pub fn resources_mut(&mut self) -> &mut dyn ResourceManager {
        self.resources.as_mut()
    }

    // ── Surfaces ─────────────────────────────────────────────────────

    /// Create an empty 0x0 surface at the configured default DPI.
    pub fn create_surface(&mut self) -> SurfaceId {
        let id = self.dom.create_surface(self.config.default_dpi);
        log::debug!(target: "gilt_gui::context", "created surface {id:?}");
        id
    }

    pub fn surface(&self, surface: SurfaceId) -> Option<&Surface> {
        self.dom.surface(surface).filter(|s| !s.doomed)
    }

    /// Delete `surface` and every element attached to it.
    ///
    /// Each element receives a `Delete` event; destruction is deferred until
    /// no event is being dispatched.
    pub fn delete_surface(&mut self, surface: SurfaceId) -> bool {
        let Some(surf) = self.dom.surface_mut(surface) else {
            return false;
        };
        if surf.doomed {
            return true;
        }
        surf.doomed = true;
        let roots = surf.roots.clone();
        self.dispatch_depth += 1;
        for root in roots {
            self.delete_element(root);
        }
        self.dispatch_depth -= 1;
        self.doomed_surfaces.push(surface);
        if self.dispatch_depth == 0 {
            self.sweep();
        }
        true
    }

    /// Resize `surface`. Roots and absolute elements are laid out again and
    /// the whole surface is repainted.
    pub fn set_surface_size(&mut self, surface: SurfaceId, width: i32, height: i32) -> bool {
        let Some(surf) = self.dom.surface_mut(surface) else {
            return false;
        };
        let (width, height) = (width.max(0), height.max(0));
        if surf.width == width && surf.height == height {
            return true;
        }
        surf.width = width;
        surf.height = height;
        surf.invalid = surf.bounds();
        self.layout.surface_resized(&mut self.dom, surface);
        true
    }

    /// Change the DPI of `surface`; every element on it is laid out again.
    pub fn set_surface_dpi(&mut self, surface: SurfaceId, dpi: u32) -> bool {
        let Some(surf) = self.dom.surface_mut(surface) else {
            return false;
        };
        let dpi = dpi.max(1);
        if surf.dpi == dpi {
            return true;
        }
        surf.dpi = dpi;
        surf.invalid = surf.bounds();
        self.layout.surface_rescaled(&mut self.dom, surface);
        true
    }

    /// Attach opaque embedder data (a window handle, say), handed to the
    /// renderer on every paint.
    pub fn set_surface_user_data(&mut self, surface: SurfaceId, data: Option<Box<dyn Any>>) -> bool {
        match self.dom.surface_mut(surface) {
            Some(surf) => {
                surf.user_data = data;
                true
            }
            None => false,
        }
    }

    // ── Elements ─────────────────────────────────────────────────────

    /// Create a detached element with the default style and font.
    pub fn create_element(&mut self) -> ElementId {
        let id = self.dom.create_element();
        if let Some(el) = self.dom.get_mut(id) {
            el.style.font = self.config.default_font.clone();
        }
        id
    }

    /// Live element behind `id`. Elements waiting for destruction are hidden.
    pub fn element(&self, id: ElementId) -> Option<&Element> {
        self.dom.get(id).filter(|el| !el.doomed)
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.element(id).is_some()
    }

    /// Delete `id` and its subtree.
    ///
    /// `Delete` is posted to the element first; the subtree is destroyed once
    /// the outermost dispatch returns, so handlers never see freed handles.
    pub fn delete_element(&mut self, id: ElementId) -> bool {
        let Some(el) = self.dom.get(id) else {
            return false;
        };
        if el.doomed {
            return true;
        }
        for node in self.dom.walk_depth_first(id) {
            if let Some(el) = self.dom.get_mut(node) {
                el.doomed = true;
            }
        }
        self.doomed.push(id);
        self.dispatch(Event::new(EventKind::Delete, Some(id)), true);
        if self.dispatch_depth == 0 {
            self.sweep();
        }
        true
    }

    pub fn set_id(&mut self, id: ElementId, name: Option<&str>) -> bool {
        if !self.contains(id) {
            return false;
        }
        self.dom.set_id(id, name.map(str::to_owned));
        true
    }

    /// Earliest live element carrying `name`.
    pub fn find_by_id(&self, name: &str) -> Option<ElementId> {
        self.dom.find_by_id(name).filter(|&id| self.contains(id))
    }

    // ── Structure ────────────────────────────────────────────────────

    /// Make `id` a root of `surface`, detaching it from its parent first.
    pub fn attach(&mut self, id: ElementId, surface: SurfaceId) -> bool {
        let Some(el) = self.element(id) else {
            return false;
        };
        if self.surface(surface).is_none() {
            return false;
        }
        if el.parent.is_none() && el.surface == Some(surface) {
            return true;
        }
        let old_surface = el.surface;
        self.repaint_subtree(id);
        let neighbours = self.layout.flow_neighbours(&self.dom, id);
        self.dom.detach(id);
        if !self.dom.attach_to_surface(id, surface) {
            return false;
        }
        self.layout.removed_from_flow(&mut self.dom, neighbours);
        if old_surface != Some(surface) {
            let moved = self.dom.walk_depth_first(id);
            self.forget_interaction(&moved);
        }
        self.layout.attached(&mut self.dom, id, old_surface != Some(surface));
        true
    }

    /// Unlink `id` from its parent or surface. The subtree keeps its state
    /// and can be attached again.
    pub fn detach(&mut self, id: ElementId) -> bool {
        let Some(el) = self.element(id) else {
            return false;
        };
        if el.parent.is_none() && el.surface.is_none() {
            return true;
        }
        self.repaint_subtree(id);
        let neighbours = self.layout.flow_neighbours(&self.dom, id);
        self.dom.detach(id);
        self.layout.removed_from_flow(&mut self.dom, neighbours);
        let detached = self.dom.walk_depth_first(id);
        self.forget_interaction(&detached);
        true
    }

    pub fn append_child(&mut self, parent: ElementId, child: ElementId) -> bool {
        self.link(parent, child, InsertPosition::Last)
    }

    pub fn prepend_child(&mut self, parent: ElementId, child: ElementId) -> bool {
        self.link(parent, child, InsertPosition::First)
    }

    /// Insert `element` right before `sibling`, under the same parent.
    pub fn insert_before(&mut self, sibling: ElementId, element: ElementId) -> bool {
        match self.dom.parent(sibling) {
            Some(parent) => self.link(parent, element, InsertPosition::Before(sibling)),
            None => false,
        }
    }

    /// Insert `element` right after `sibling`, under the same parent.
    pub fn insert_after(&mut self, sibling: ElementId, element: ElementId) -> bool {
        match self.dom.parent(sibling) {
            Some(parent) => self.link(parent, element, InsertPosition::After(sibling)),
            None => false,
        }
    }

    fn link(&mut self, parent: ElementId, child: ElementId, position: InsertPosition) -> bool {
        if !self.contains(parent) || !self.contains(child) || self.dom.is_ancestor_or_self(child, parent) {
            return false;
        }
        if let InsertPosition::Before(s) | InsertPosition::After(s) = position {
            if s == child || self.dom.parent(s) != Some(parent) {
                return false;
            }
        }
        let old_surface = self.dom.get(child).and_then(|el| el.surface);
        self.repaint_subtree(child);
        let neighbours = self.layout.flow_neighbours(&self.dom, child);
        if !self.dom.insert_child(parent, child, position) {
            return false;
        }
        self.layout.removed_from_flow(&mut self.dom, neighbours);
        let new_surface = self.dom.get(child).and_then(|el| el.surface);
        if old_surface != new_surface {
            let moved = self.dom.walk_depth_first(child);
            self.forget_interaction(&moved);
        }
        self.layout.attached(&mut self.dom, child, old_surface != new_surface);
        true
    }

    /// Raise `id` above every layer with the same z-index.
    pub fn bring_to_front(&mut self, id: ElementId) -> bool {
        if !self.contains(id) || !self.dom.bring_to_front(id) {
            return false;
        }
        self.repaint_subtree(id);
        true
    }

    // ── Style and content ────────────────────────────────────────────

    pub fn style(&self, id: ElementId) -> Option<&Style> {
        self.element(id).map(|el| &el.style)
    }

    /// Edit the style of `id` in place.
    ///
    /// Only the property groups that actually differ afterwards cause
    /// invalidation, so writing the same value twice is free.
    pub fn update_style(&mut self, id: ElementId, edit: impl FnOnce(&mut Style)) -> bool {
        let Some(el) = self.dom.get_mut(id).filter(|el| !el.doomed) else {
            return false;
        };
        let old = el.style.clone();
        edit(&mut el.style);
        let changes = old.diff(&el.style);
        if !changes.is_empty() {
            self.style_changed(id, changes);
        }
        true
    }

    pub fn set_style(&mut self, id: ElementId, style: Style) -> bool {
        self.update_style(id, |s| *s = style)
    }

    pub fn set_width(&mut self, id: ElementId, width: StyleValue) -> bool {
        self.update_style(id, |s| s.width = width)
    }

    pub fn set_height(&mut self, id: ElementId, height: StyleValue) -> bool {
        self.update_style(id, |s| s.height = height)
    }

    pub fn set_visible(&mut self, id: ElementId, visible: bool) -> bool {
        self.update_style(id, |s| s.flags.set(crate::style::StyleFlags::VISIBLE, visible))
    }

    fn style_changed(&mut self, id: ElementId, changes: StyleChanges) {
        if changes.intersects(StyleChanges::POSITIONING | StyleChanges::Z_INDEX) {
            self.dom.restack(id);
        }
        if changes.contains(StyleChanges::VISIBILITY) {
            let visible = self.dom.get(id).is_some_and(|el| el.style.is_visible());
            self.queue_visibility(id, visible);
            if !visible {
                self.element_hidden(id);
            }
        }
        if changes.intersects(
            StyleChanges::VISIBILITY | StyleChanges::Z_INDEX | StyleChanges::PAINT | StyleChanges::POSITIONING,
        ) {
            self.repaint_subtree(id);
        }
        if changes.contains(StyleChanges::BACKGROUND_IMAGE) {
            self.reload_background(id);
        }
        self.layout.style_changed(&mut self.dom, id, changes);
    }

    /// Set the text of `id`, creating its text buffer on first use.
    pub fn set_text(&mut self, id: ElementId, text: &str) -> bool {
        let Some(el) = self.dom.get_mut(id).filter(|el| !el.doomed) else {
            return false;
        };
        match &mut el.text {
            Some(buffer) if buffer.as_str() == text => return true,
            Some(buffer) => buffer.set_text(text),
            None => el.text = Some(TextBuffer::new(text)),
        }
        self.layout.invalidate(&mut self.dom, id, LayoutFlags::TEXT);
        self.repaint(id);
        true
    }

    /// Drop the text of `id` entirely.
    pub fn clear_text(&mut self, id: ElementId) -> bool {
        let Some(el) = self.dom.get_mut(id).filter(|el| !el.doomed) else {
            return false;
        };
        if el.text.take().is_none() {
            return true;
        }
        self.layout.invalidate(&mut self.dom, id, LayoutFlags::TEXT);
        self.repaint(id);
        true
    }

    pub fn text(&self, id: ElementId) -> Option<&str> {
        self.element(id).and_then(Element::text)
    }

    // ── Geometry ─────────────────────────────────────────────────────

    /// Cached geometry of `id`. Stale until the next validation.
    pub fn layout(&self, id: ElementId) -> Option<&LayoutRecord> {
        self.element(id).map(|el| &el.layout)
    }

    /// Border box of `id` in surface coordinates.
    pub fn region(&self, id: ElementId) -> Option<Region> {
        self.layout(id).map(LayoutRecord::region)
    }

    pub fn inner_offset(&self, id: ElementId) -> Option<Offset> {
        self.layout(id).map(|l| l.inner_offset)
    }

    /// Scroll the children and text of `id`.
    pub fn set_inner_offset(&mut self, id: ElementId, offset: Offset) -> bool {
        let Some(el) = self.dom.get_mut(id).filter(|el| !el.doomed) else {
            return false;
        };
        if el.layout.inner_offset == offset {
            return true;
        }
        el.layout.inner_offset = offset;
        self.layout.inner_offset_changed(&mut self.dom, id);
        self.repaint(id);
        true
    }

    /// Topmost element of `surface` at `(x, y)`.
    pub fn element_at(&mut self, surface: SurfaceId, x: i32, y: i32) -> Option<ElementId> {
        self.ensure_valid();
        crate::layout::hit_test(&self.dom, surface, Offset::new(x, y), None, self.config.gripper_size)
            .map(|hit| hit.element)
    }

    // ── Validation ───────────────────────────────────────────────────

    /// Suspend implicit validation and painting until the matching
    /// [`Context::end_batch`]. Batches nest.
    pub fn begin_batch(&mut self) {
        self.batch_depth += 1;
    }

    /// Close a batch; the outermost one validates.
    pub fn end_batch(&mut self) -> Result<(), LayoutError> {
        self.batch_depth = self.batch_depth.saturating_sub(1);
        if self.batch_depth == 0 {
            self.validate()
        } else {
            Ok(())
        }
    }

    pub fn is_batching(&self) -> bool {
        self.batch_depth > 0
    }

    /// Bring layout up to date and post the resulting events.
    ///
    /// Handlers of `Move`, `Resize`, `Show` and `Hide` may mutate the tree;
    /// their invalidations are processed in further passes of the same call.
    /// With [`ContextConfig::max_validation_passes`] set, a tree that keeps
    /// invalidating itself yields [`LayoutError::NotConverged`] and is left
    /// pending. Calling this from inside a handler is a no-op.
    pub fn validate(&mut self) -> Result<(), LayoutError> {
        if self.validating {
            return Ok(());
        }
        self.validating = true;
        let result = self.run_validation();
        self.validating = false;
        result
    }

    fn run_validation(&mut self) -> Result<(), LayoutError> {
        let mut stats = ValidationStats::default();
        let mut cursor_checked = false;
        let result = loop {
            if !self.layout.has_work() && self.visibility.is_empty() {
                if cursor_checked {
                    break Ok(());
                }
                // Caret tracking may scroll, which queues more work.
                cursor_checked = true;
                self.refresh_text_cursor();
                continue;
            }
            if let Some(max) = self.config.max_validation_passes {
                if stats.passes >= max {
                    log::warn!(
                        target: "gilt_gui::layout",
                        "layout did not settle after {} passes, {} elements still pending",
                        stats.passes,
                        self.layout.pending_len()
                    );
                    break Err(LayoutError::NotConverged { passes: stats.passes });
                }
            }
            stats.passes += 1;
            stats.processed += self.layout.drain(&mut self.dom, self.layouter.as_ref());
            let reports = self.layout.settle(&mut self.dom);
            stats.reported += reports.len();

            for (id, visible) in std::mem::take(&mut self.visibility) {
                let kind = if visible { EventKind::Show } else { EventKind::Hide };
                self.post(Event::new(kind, Some(id)));
            }
            for (id, flags) in reports {
                if flags.intersects(LayoutFlags::POSITION | LayoutFlags::ABSOLUTE) {
                    self.post(Event::new(EventKind::Move, Some(id)));
                }
                if flags.intersects(LayoutFlags::SIZE) {
                    self.post(Event::new(EventKind::Resize, Some(id)));
                }
            }
        };
        if stats.passes > 0 {
            log::debug!(
                target: "gilt_gui::layout",
                "validated in {} passes ({} visits, {} reported)",
                stats.passes,
                stats.processed,
                stats.reported
            );
        }
        self.stats = stats;
        result
    }

    /// Validate unless a batch is open. Errors are logged, not returned.
    pub(crate) fn ensure_valid(&mut self) {
        if self.batch_depth > 0 {
            return;
        }
        if let Err(err) = self.validate() {
            log::warn!(target: "gilt_gui::layout", "implicit validation failed: {err}");
        }
    }

    pub fn validation_stats(&self) -> ValidationStats {
        self.stats
    }

    /// Elements waiting for layout.
    pub fn pending_layout_len(&self) -> usize {
        self.layout.pending_len()
    }

    pub fn is_layout_pending(&self, id: ElementId) -> bool {
        self.layout.is_pending(id)
    }

    fn queue_visibility(&mut self, id: ElementId, visible: bool) {
        // Flipping back before validation cancels the notification.
        match self.visibility.iter().position(|&(v, _)| v == id) {
            Some(index) => {
                self.visibility.remove(index);
            }
            None => self.visibility.push((id, visible)),
        }
    }

    // ── Events ───────────────────────────────────────────────────────

    /// Register a context-wide listener. Global listeners run after the
    /// target's own listeners, for every target.
    pub fn add_listener<F>(&mut self, kind: EventKind, callback: F) -> ListenerId
    where
        F: FnMut(&mut Context, &Event) -> ControlFlow + 'static,
    {
        self.global.add(kind, callback)
    }

    pub fn remove_listener(&mut self, listener: ListenerId) -> bool {
        self.global.remove(listener)
    }

    /// Register a listener on `id`. `None` for stale handles.
    pub fn add_element_listener<F>(&mut self, id: ElementId, kind: EventKind, callback: F) -> Option<ListenerId>
    where
        F: FnMut(&mut Context, &Event) -> ControlFlow + 'static,
    {
        let el = self.dom.get_mut(id).filter(|el| !el.doomed)?;
        Some(el.listeners.add(kind, callback))
    }

    pub fn remove_element_listener(&mut self, id: ElementId, listener: ListenerId) -> bool {
        self.dom.get_mut(id).is_some_and(|el| el.listeners.remove(listener))
    }

    /// Deliver `event` to its target's listeners, then to global ones.
    ///
    /// Events aimed at deleted elements are dropped. Returns
    /// [`ControlFlow::Stop`] if a listener stopped the dispatch.
    pub fn post(&mut self, event: Event) -> ControlFlow {
        self.dispatch(event, false)
    }

    fn dispatch(&mut self, mut event: Event, allow_doomed: bool) -> ControlFlow {
        let local = match event.target {
            Some(target) => match self.dom.get(target) {
                Some(el) if allow_doomed || !el.doomed => {
                    if event.surface.is_none() {
                        event.surface = el.surface;
                    }
                    el.listeners.for_kind(event.kind)
                }
                _ => return ControlFlow::Continue,
            },
            None => Vec::new(),
        };
        let global = self.global.for_kind(event.kind);
        if local.is_empty() && global.is_empty() {
            return ControlFlow::Continue;
        }
        log::trace!(target: "gilt_gui::event", "dispatching {:?} to {:?}", event.kind, event.target);

        self.dispatch_depth += 1;
        let mut flow = invoke(&local, self, &event);
        if flow == ControlFlow::Continue {
            flow = invoke(&global, self, &event);
        }
        self.dispatch_depth -= 1;
        if self.dispatch_depth == 0 {
            self.sweep();
        }
        flow
    }

    // ── Deferred destruction ─────────────────────────────────────────

    fn sweep(&mut self) {
        while let Some(id) = self.doomed.pop() {
            self.destroy_element(id);
        }
        while let Some(surface) = self.doomed_surfaces.pop() {
            self.destroy_surface(surface);
        }
    }

    fn destroy_element(&mut self, id: ElementId) {
        if !self.dom.contains(id) {
            return;
        }
        self.repaint_subtree(id);
        let neighbours = self.layout.flow_neighbours(&self.dom, id);
        self.dom.detach(id);
        self.layout.removed_from_flow(&mut self.dom, neighbours);

        let images: Vec<ImageHandle> = self
            .dom
            .walk_depth_first(id)
            .into_iter()
            .filter_map(|node| self.dom.get(node).and_then(|el| el.image))
            .collect();
        let removed = self.dom.remove_element(id);
        for &node in &removed {
            self.layout.forget(node);
        }
        self.visibility.retain(|(v, _)| !removed.contains(v));
        self.forget_interaction(&removed);
        for image in images {
            self.release_image(image);
        }
        log::debug!(target: "gilt_gui::context", "destroyed {} elements under {id:?}", removed.len());
    }

    fn destroy_surface(&mut self, surface: SurfaceId) {
        // Roots attached while the deletion was pending go down too.
        let roots = self.dom.surface(surface).map(|s| s.roots.clone()).unwrap_or_default();
        for root in roots {
            self.destroy_element(root);
        }
        self.dom.remove_surface(surface);
        if self.pointer.surface == Some(surface) {
            self.pointer.surface = None;
        }
        log::debug!(target: "gilt_gui::context", "destroyed surface {surface:?}");
    }

    /// Drop every pointer and keyboard reference into `ids`.
    fn forget_interaction(&mut self, ids: &[ElementId]) {
        self.pointer.forget(ids);
        if self.keyboard.focused.is_some_and(|f| ids.contains(&f)) {
            self.keyboard.focused = None;
        }
        if self.keyboard.cursor.element.is_some_and(|e| ids.contains(&e)) {
            self.hide_text_cursor();
        }
    }

    // ── Repaint bookkeeping ──────────────────────────────────────────

    /// Invalidate the last painted rectangle of `id`.
    pub(crate) fn repaint(&mut self, id: ElementId) {
        let Some(el) = self.dom.get(id) else {
            return;
        };
        let (surface, painted) = (el.surface, el.layout.painted);
        if let Some(surf) = surface.and_then(|s| self.dom.surface_mut(s)) {
            surf.invalidate(painted);
        }
    }

    /// Invalidate the last painted rectangles of `id` and its descendants.
    pub(crate) fn repaint_subtree(&mut self, id: ElementId) {
        for node in self.dom.walk_depth_first(id) {
            self.repaint(node);
        }
    }

    // ── Background images ────────────────────────────────────────────

    fn reload_background(&mut self, id: ElementId) {
        let Some(el) = self.dom.get_mut(id) else {
            return;
        };
        let old = el.image.take();
        let path = el.style.background.image.clone();
        if let Some(old) = old {
            self.release_image(old);
        }
        let Some(path) = path else {
            return;
        };
        match self.resources.load_image(&path) {
            Ok(handle) => {
                if let Some(el) = self.dom.get_mut(id) {
                    el.image = Some(handle);
                }
            }
            Err(err) => {
                log::warn!(target: "gilt_gui::render", "background image {path:?} failed to load: {err}");
                self.post(Event::new(EventKind::Warning, Some(id)).with_detail(EventDetail::Warning(err.to_string())));
            }
        }
    }

    fn release_image(&mut self, image: ImageHandle) {
        self.resources.unload_image(image);
        self.images.release(image);
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new(ContextConfig::default())
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("elements", &self.dom.len())
            .field("pending", &self.layout.pending_len())
            .field("batch_depth", &self.batch_depth)
            .field("dispatch_depth", &self.dispatch_depth)
            .finish_non_exhaustive()
    }
}

// ===========================================================================
// Tests
// ===========================================================================
