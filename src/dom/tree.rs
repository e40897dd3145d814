//! Tree operations: create, link, unlink, reparent, walk.

use std::collections::HashMap;

use slotmap::SlotMap;

use super::node::{Element, ElementId, Surface, SurfaceId};

/// Where a node is linked relative to its new parent's children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertPosition {
    First,
    Last,
    Before(ElementId),
    After(ElementId),
}

/// The element/surface arena.
///
/// All elements and surfaces live in `SlotMap`s. Tree links are stored on
/// the elements themselves as an intrusive doubly linked list per level, so
/// insert, remove and reorder are O(1) once the position is known.
pub struct Dom {
    pub(crate) elements: SlotMap<ElementId, Element>,
    pub(crate) surfaces: SlotMap<SurfaceId, Surface>,
    ids: HashMap<String, Vec<ElementId>>,
}

impl Dom {
    /// Create an empty DOM.
    pub fn new() -> Self {
        Self {
            elements: SlotMap::with_key(),
            surfaces: SlotMap::with_key(),
            ids: HashMap::new(),
        }
    }

    // ── Creation / destruction ───────────────────────────────────────

    /// Create a detached element with the default style.
    pub fn create_element(&mut self) -> ElementId {
        self.elements.insert(Element::new())
    }

    /// Create an empty 0x0 surface.
    pub fn create_surface(&mut self, dpi: u32) -> SurfaceId {
        self.surfaces.insert(Surface::new(dpi))
    }

    /// Detach `id` and drop it together with its whole subtree.
    ///
    /// Returns the removed handles in pre-order, or an empty vec if `id` is
    /// stale.
    pub fn remove_element(&mut self, id: ElementId) -> Vec<ElementId> {
        if !self.contains(id) {
            return Vec::new();
        }
        self.detach(id);
        let subtree = self.walk_depth_first(id);
        for &node in &subtree {
            if let Some(el) = self.elements.remove(node) {
                if let Some(name) = el.id {
                    self.unindex(&name, node);
                }
            }
        }
        subtree
    }

    /// Drop a surface. Its roots must have been removed or detached first;
    /// any that remain are detached and left in the arena.
    pub fn remove_surface(&mut self, surface: SurfaceId) -> Option<Surface> {
        let roots = self.surfaces.get(surface)?.roots.clone();
        for root in roots {
            self.detach(root);
        }
        self.surfaces.remove(surface)
    }

    // ── Access ───────────────────────────────────────────────────────

    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(id)
    }

    pub fn get_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.elements.get_mut(id)
    }

    pub fn surface(&self, id: SurfaceId) -> Option<&Surface> {
        self.surfaces.get(id)
    }

    pub fn surface_mut(&mut self, id: SurfaceId) -> Option<&mut Surface> {
        self.surfaces.get_mut(id)
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.elements.contains_key(id)
    }

    pub fn contains_surface(&self, id: SurfaceId) -> bool {
        self.surfaces.contains_key(id)
    }

    /// Number of live elements.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn surface_ids(&self) -> impl Iterator<Item = SurfaceId> + '_ {
        self.surfaces.keys()
    }

    pub fn parent(&self, id: ElementId) -> Option<ElementId> {
        self.elements.get(id)?.parent
    }

    pub fn first_child(&self, id: ElementId) -> Option<ElementId> {
        self.elements.get(id)?.first_child
    }

    pub fn last_child(&self, id: ElementId) -> Option<ElementId> {
        self.elements.get(id)?.last_child
    }

    pub fn next_sibling(&self, id: ElementId) -> Option<ElementId> {
        self.elements.get(id)?.next_sibling
    }

    pub fn prev_sibling(&self, id: ElementId) -> Option<ElementId> {
        self.elements.get(id)?.prev_sibling
    }

    /// Children of `id`, first to last. Empty for stale handles.
    pub fn children(&self, id: ElementId) -> Children<'_> {
        Children { dom: self, next: self.first_child(id), back: false }
    }

    /// Children of `id`, last to first.
    pub fn children_rev(&self, id: ElementId) -> Children<'_> {
        Children { dom: self, next: self.last_child(id), back: true }
    }

    /// Ancestors of `id`, nearest first. Does not include `id`.
    pub fn ancestors(&self, id: ElementId) -> Vec<ElementId> {
        let mut result = Vec::new();
        let mut current = id;
        while let Some(p) = self.parent(current) {
            result.push(p);
            current = p;
        }
        result
    }

    /// Number of ancestors.
    pub fn depth(&self, id: ElementId) -> usize {
        let mut depth = 0;
        let mut current = id;
        while let Some(p) = self.parent(current) {
            depth += 1;
            current = p;
        }
        depth
    }

    /// Whether `ancestor` is `id` or one of its ancestors.
    pub fn is_ancestor_or_self(&self, ancestor: ElementId, id: ElementId) -> bool {
        let mut current = Some(id);
        while let Some(c) = current {
            if c == ancestor {
                return true;
            }
            current = self.parent(c);
        }
        false
    }

    /// Pre-order depth-first traversal starting from `start`.
    pub fn walk_depth_first(&self, start: ElementId) -> Vec<ElementId> {
        let mut result = Vec::new();
        if !self.contains(start) {
            return result;
        }
        let mut stack = vec![start];
        while let Some(current) = stack.pop() {
            result.push(current);
            // Push children in reverse so the first child is visited first.
            stack.extend(self.children_rev(current));
        }
        result
    }

    /// Every element of `surface`, each root subtree in pre-order.
    pub fn surface_elements(&self, surface: SurfaceId) -> Vec<ElementId> {
        let Some(s) = self.surfaces.get(surface) else {
            return Vec::new();
        };
        s.roots.iter().flat_map(|&root| self.walk_depth_first(root)).collect()
    }

    // ── ID index ─────────────────────────────────────────────────────

    /// Set or clear the human-readable id. Ids are not required to be unique;
    /// lookups return the earliest element still carrying it.
    pub fn set_id(&mut self, id: ElementId, name: Option<String>) {
        let Some(el) = self.elements.get_mut(id) else {
            return;
        };
        let old = std::mem::replace(&mut el.id, name.clone());
        if let Some(old) = old {
            self.unindex(&old, id);
        }
        if let Some(name) = name {
            self.ids.entry(name).or_default().push(id);
        }
    }

    pub fn find_by_id(&self, name: &str) -> Option<ElementId> {
        self.ids.get(name)?.first().copied()
    }

    fn unindex(&mut self, name: &str, id: ElementId) {
        if let Some(list) = self.ids.get_mut(name) {
            list.retain(|&e| e != id);
            if list.is_empty() {
                self.ids.remove(name);
            }
        }
    }

    // ── Linking ──────────────────────────────────────────────────────

    /// Make a parentless element a root of `surface`.
    ///
    /// Returns `false` if either handle is stale or the element has a parent.
    pub fn attach_to_surface(&mut self, id: ElementId, surface: SurfaceId) -> bool {
        if !self.surfaces.contains_key(surface) {
            return false;
        }
        match self.elements.get(id) {
            Some(el) if el.parent.is_none() => {}
            _ => return false,
        }
        self.detach(id);
        if let Some(s) = self.surfaces.get_mut(surface) {
            s.roots.push(id);
        }
        self.assign_surface(id, Some(surface));
        true
    }

    /// Link `child` under `parent` at `position`, detaching it first.
    ///
    /// Refuses (returns `false`) to link an element under itself or one of
    /// its descendants, or relative to a sibling that is not a child of
    /// `parent`.
    pub fn insert_child(&mut self, parent: ElementId, child: ElementId, position: InsertPosition) -> bool {
        if !self.contains(parent) || !self.contains(child) || self.is_ancestor_or_self(child, parent) {
            return false;
        }
        if let InsertPosition::Before(sibling) | InsertPosition::After(sibling) = position {
            if sibling == child || self.parent(sibling) != Some(parent) {
                return false;
            }
        }
        self.detach(child);

        let (prev, next) = match position {
            InsertPosition::First => (None, self.first_child(parent)),
            InsertPosition::Last => (self.last_child(parent), None),
            InsertPosition::Before(sibling) => (self.prev_sibling(sibling), Some(sibling)),
            InsertPosition::After(sibling) => (Some(sibling), self.next_sibling(sibling)),
        };
        if let Some(el) = self.elements.get_mut(child) {
            el.parent = Some(parent);
            el.prev_sibling = prev;
            el.next_sibling = next;
        }
        match prev {
            Some(p) => self.elements[p].next_sibling = Some(child),
            None => self.elements[parent].first_child = Some(child),
        }
        match next {
            Some(n) => self.elements[n].prev_sibling = Some(child),
            None => self.elements[parent].last_child = Some(child),
        }

        let surface = self.elements[parent].surface;
        self.assign_surface(child, surface);
        true
    }

    /// Unlink `id` from its parent (or from its surface if it is a root).
    /// The subtree stays intact but no longer belongs to any surface.
    pub fn detach(&mut self, id: ElementId) {
        let Some(el) = self.elements.get(id) else {
            return;
        };
        let (parent, prev, next, surface) = (el.parent, el.prev_sibling, el.next_sibling, el.surface);

        match parent {
            Some(parent) => {
                match prev {
                    Some(p) => self.elements[p].next_sibling = next,
                    None => self.elements[parent].first_child = next,
                }
                match next {
                    Some(n) => self.elements[n].prev_sibling = prev,
                    None => self.elements[parent].last_child = prev,
                }
            }
            None => {
                if let Some(s) = surface.and_then(|s| self.surfaces.get_mut(s)) {
                    s.roots.retain(|&r| r != id);
                }
            }
        }
        let el = &mut self.elements[id];
        el.parent = None;
        el.prev_sibling = None;
        el.next_sibling = None;
        self.assign_surface(id, None);
    }

    /// Set the surface of a whole subtree and keep the surfaces' layer lists
    /// in step.
    fn assign_surface(&mut self, id: ElementId, surface: Option<SurfaceId>) {
        for node in self.walk_depth_first(id) {
            self.remove_layer(node);
            self.elements[node].surface = surface;
            if surface.is_some() && self.elements[node].is_layer() {
                self.add_layer(node);
            }
        }
    }

    // ── Layers ───────────────────────────────────────────────────────

    /// Insert `id` into its surface's layers above every layer with an equal
    /// or lower z-index.
    pub(crate) fn add_layer(&mut self, id: ElementId) {
        let Some(el) = self.elements.get(id) else {
            return;
        };
        let (z, surface) = (el.style.z_index, el.surface);
        let Some(s) = surface else {
            return;
        };
        let elements = &self.elements;
        let Some(s) = self.surfaces.get_mut(s) else {
            return;
        };
        if s.layers.contains(&id) {
            return;
        }
        let at = s
            .layers
            .iter()
            .position(|&l| elements.get(l).map_or(0, |e| e.style.z_index) > z)
            .unwrap_or(s.layers.len());
        s.layers.insert(at, id);
    }

    pub(crate) fn remove_layer(&mut self, id: ElementId) {
        let Some(surface) = self.elements.get(id).and_then(|e| e.surface) else {
            return;
        };
        if let Some(s) = self.surfaces.get_mut(surface) {
            s.layers.retain(|&l| l != id);
        }
    }

    /// Re-evaluate layer membership and order after a positioning or z-index
    /// change.
    pub(crate) fn restack(&mut self, id: ElementId) {
        self.remove_layer(id);
        if self.elements.get(id).is_some_and(|e| e.is_layer()) {
            self.add_layer(id);
        }
    }

    /// Move a layer above every other layer, raising its z-index to the
    /// current maximum if needed. Non-layers are ignored.
    pub fn bring_to_front(&mut self, id: ElementId) -> bool {
        let Some(surface) = self.elements.get(id).filter(|e| e.is_layer()).and_then(|e| e.surface) else {
            return false;
        };
        let top = self.surfaces[surface]
            .layers
            .iter()
            .filter_map(|&l| self.elements.get(l))
            .map(|e| e.style.z_index)
            .max()
            .unwrap_or(0);
        let el = &mut self.elements[id];
        el.style.z_index = el.style.z_index.max(top);
        self.restack(id);
        true
    }
}

impl Default for Dom {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over one level of siblings.
pub struct Children<'a> {
    dom: &'a Dom,
    next: Option<ElementId>,
    back: bool,
}

impl Iterator for Children<'_> {
    type Item = ElementId;

    fn next(&mut self) -> Option<ElementId> {
        let current = self.next?;
        self.next = if self.back {
            self.dom.prev_sibling(current)
        } else {
            self.dom.next_sibling(current)
        };
        Some(current)
    }
}
