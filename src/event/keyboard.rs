//! Keyboard routing: focus, tab order, text editing and the text cursor.
//!
//! Key events go to the focused element (or only to global listeners when
//! nothing has focus). Unless a listener stops them, Tab/BackTab move focus
//! and editing keys act on the text of a focused editable element.

use crate::context::Context;
use crate::dom::node::ElementId;
use crate::geometry::{Offset, Region};
use crate::layout::hit::is_shown;
use crate::layout::LayoutFlags;
use crate::style::{Positioning, StyleFlags};
use crate::text::TextBuffer;

use super::handler::ControlFlow;
use super::input::{Key, KeyEvent, Modifiers};
use super::message::{Event, EventDetail, EventKind};

/// Caret of the focused editable element, in surface coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextCursor {
    pub element: Option<ElementId>,
    pub x: i32,
    pub y: i32,
    pub height: i32,
    /// Blink phase.
    pub visible: bool,
}

impl TextCursor {
    pub fn rect(&self, width: i32) -> Region {
        Region::new(self.x, self.y, width, self.height)
    }
}

#[derive(Debug, Default)]
pub(crate) struct KeyboardState {
    pub(crate) focused: Option<ElementId>,
    pub(crate) cursor: TextCursor,
    /// Modifiers of the last key event, reported with pointer events too.
    pub(crate) modifiers: Modifiers,
}

impl Context {
    // ── Focus ────────────────────────────────────────────────────────

    pub fn focused(&self) -> Option<ElementId> {
        self.keyboard.focused
    }

    /// Give keyboard focus to `id`, posting `Blur` and `Focus`.
    pub fn focus(&mut self, id: ElementId) -> bool {
        if !self.contains(id) {
            return false;
        }
        self.set_focus(Some(id));
        true
    }

    pub fn blur(&mut self) {
        self.set_focus(None);
    }

    pub(crate) fn set_focus(&mut self, target: Option<ElementId>) {
        let old = self.keyboard.focused;
        if old == target {
            return;
        }
        self.keyboard.focused = target;
        log::debug!(target: "gilt_gui::event", "focus {old:?} -> {target:?}");
        if let Some(old) = old {
            self.post(Event::new(EventKind::Blur, Some(old)));
        }
        // A blur handler may already have moved focus elsewhere.
        if let Some(new) = target.filter(|&t| self.keyboard.focused == Some(t)) {
            self.ensure_text_buffer(new);
            self.post(Event::new(EventKind::Focus, Some(new)));
        }
        self.ensure_valid();
    }

    /// Move focus forward in tab order, wrapping around.
    pub fn focus_next(&mut self) -> Option<ElementId> {
        self.step_focus(true)
    }

    /// Move focus backward in tab order, wrapping around.
    pub fn focus_previous(&mut self) -> Option<ElementId> {
        self.step_focus(false)
    }

    fn step_focus(&mut self, forward: bool) -> Option<ElementId> {
        let chain = self.focus_chain();
        if chain.is_empty() {
            return None;
        }
        let current = self.keyboard.focused.and_then(|f| chain.iter().position(|&c| c == f));
        let index = match (current, forward) {
            (Some(i), true) => (i + 1) % chain.len(),
            (Some(0), false) | (None, false) => chain.len() - 1,
            (Some(i), false) => i - 1,
            (None, true) => 0,
        };
        self.set_focus(Some(chain[index]));
        self.keyboard.focused
    }

    /// Focusable, shown elements of the active surface: layers bottom to
    /// top, each in pre-order.
    fn focus_chain(&self) -> Vec<ElementId> {
        let surface = self
            .keyboard
            .focused
            .and_then(|f| self.element(f))
            .and_then(|el| el.surface)
            .or(self.pointer.surface)
            .or_else(|| self.dom.surface_ids().next());
        let Some(surf) = surface.and_then(|s| self.surface(s)) else {
            return Vec::new();
        };
        let mut chain = Vec::new();
        for &layer in surf.layers().iter().filter(|&&l| is_shown(&self.dom, l)) {
            let mut stack = vec![layer];
            while let Some(id) = stack.pop() {
                let Some(el) = self.element(id).filter(|el| el.style.is_visible()) else {
                    continue;
                };
                if el.style.takes_focus() {
                    chain.push(id);
                }
                stack.extend(
                    self.dom
                        .children_rev(id)
                        .filter(|&c| self.style(c).is_some_and(|s| s.positioning != Positioning::Absolute)),
                );
            }
        }
        chain
    }

    /// `id` was hidden: focus inside it is dropped.
    pub(crate) fn element_hidden(&mut self, id: ElementId) {
        if self.keyboard.focused.is_some_and(|f| self.dom.is_ancestor_or_self(id, f)) {
            self.set_focus(None);
        }
    }

    // ── Key entry points ─────────────────────────────────────────────

    pub fn key_down(&mut self, key: KeyEvent) -> ControlFlow {
        self.ensure_valid();
        self.keyboard.modifiers = key.modifiers;
        let target = self.keyboard.focused;
        let flow = self.post(Event::new(EventKind::KeyDown, target).with_detail(EventDetail::Key(key)));
        if flow == ControlFlow::Stop {
            return flow;
        }
        match key.code {
            Key::Tab if key.modifiers.contains(Modifiers::SHIFT) => {
                self.focus_previous();
            }
            Key::Tab => {
                self.focus_next();
            }
            Key::BackTab => {
                self.focus_previous();
            }
            _ => {
                if let Some(target) = target.filter(|&t| self.is_editable(t)) {
                    self.edit_text(target, key);
                }
            }
        }
        flow
    }

    pub fn key_up(&mut self, key: KeyEvent) -> ControlFlow {
        self.keyboard.modifiers = key.modifiers;
        let target = self.keyboard.focused;
        self.post(Event::new(EventKind::KeyUp, target).with_detail(EventDetail::Key(key)))
    }

    /// A printable character after keyboard layout translation. Inserted into
    /// a focused editable element unless a listener stops it.
    pub fn key_char(&mut self, ch: char) -> ControlFlow {
        self.ensure_valid();
        let target = self.keyboard.focused;
        let flow = self.post(Event::new(EventKind::Char, target).with_detail(EventDetail::Char(ch)));
        let chorded = self.keyboard.modifiers.contains(Modifiers::CTRL) || self.keyboard.modifiers.contains(Modifiers::ALT);
        if flow == ControlFlow::Stop || ch.is_control() || chorded {
            return flow;
        }
        if let Some(target) = target.filter(|&t| self.is_editable(t)) {
            if let Some(buffer) = self.text_buffer_mut(target) {
                let mut encoded = [0u8; 4];
                buffer.insert(ch.encode_utf8(&mut encoded));
                self.text_edited(target);
            }
        }
        flow
    }

    // ── Editing ──────────────────────────────────────────────────────

    /// Text content and editing state of `id`.
    pub fn text_buffer(&self, id: ElementId) -> Option<&TextBuffer> {
        self.element(id).and_then(|el| el.text.as_ref())
    }

    fn text_buffer_mut(&mut self, id: ElementId) -> Option<&mut TextBuffer> {
        self.dom.get_mut(id).filter(|el| !el.doomed).and_then(|el| el.text.as_mut())
    }

    fn is_editable(&self, id: ElementId) -> bool {
        self.style(id).is_some_and(|s| s.flags.contains(StyleFlags::EDITABLE))
    }

    /// Editable elements always carry a buffer once focused.
    fn ensure_text_buffer(&mut self, id: ElementId) {
        if !self.is_editable(id) || self.text_buffer(id).is_some() {
            return;
        }
        if let Some(el) = self.dom.get_mut(id) {
            el.text = Some(TextBuffer::default());
        }
        self.layout.invalidate(&mut self.dom, id, LayoutFlags::TEXT);
    }

    fn edit_text(&mut self, id: ElementId, key: KeyEvent) {
        let extend = key.modifiers.contains(Modifiers::SHIFT);
        match key.code {
            Key::Up => return self.move_caret_vertically(id, -1, extend),
            Key::Down => return self.move_caret_vertically(id, 1, extend),
            _ => {}
        }
        let multi_line = self.style(id).is_some_and(|s| s.flags.contains(StyleFlags::MULTI_LINE));
        let Some(buffer) = self.text_buffer_mut(id) else {
            return;
        };
        let edited = match key.code {
            Key::Backspace => buffer.backspace(),
            Key::Delete => buffer.delete_forward(),
            Key::Enter if multi_line => {
                buffer.insert("\n");
                true
            }
            Key::Left => {
                buffer.move_left(extend);
                false
            }
            Key::Right => {
                buffer.move_right(extend);
                false
            }
            Key::Home => {
                buffer.move_home(extend);
                false
            }
            Key::End => {
                buffer.move_end(extend);
                false
            }
            Key::Char('a') if key.modifiers.contains(Modifiers::CTRL) => {
                buffer.select_all();
                false
            }
            _ => return,
        };
        if edited {
            self.text_edited(id);
        } else {
            self.caret_moved(id);
        }
    }

    fn move_caret_vertically(&mut self, id: ElementId, rows: i32, extend: bool) {
        let Some(el) = self.element(id) else {
            return;
        };
        let (Some(layout), Some(buffer)) = (el.text_layout.as_ref(), el.text.as_ref()) else {
            return;
        };
        let (caret, _) = layout.caret(buffer.cursor());
        let byte = layout.byte_at(Offset::new(caret.x, caret.y + rows * layout.line_height));
        if let Some(buffer) = self.text_buffer_mut(id) {
            buffer.set_cursor(byte, extend);
        }
        self.caret_moved(id);
    }

    /// Put the caret of `id` at the text position under the surface `point`.
    pub(crate) fn place_caret_at(&mut self, id: ElementId, point: Offset, extend: bool) {
        let Some(el) = self.element(id) else {
            return;
        };
        let Some(layout) = el.text_layout.as_ref() else {
            return;
        };
        let content = el.layout.content_box().origin();
        let local = point - el.layout.absolute - content - el.layout.inner_offset;
        let byte = layout.byte_at(local);
        if let Some(buffer) = self.text_buffer_mut(id) {
            buffer.set_cursor(byte, extend);
        }
        self.caret_moved(id);
    }

    fn text_edited(&mut self, id: ElementId) {
        self.layout.invalidate(&mut self.dom, id, LayoutFlags::TEXT);
        self.repaint(id);
        self.post(Event::new(EventKind::TextChanged, Some(id)));
        self.ensure_valid();
    }

    fn caret_moved(&mut self, id: ElementId) {
        self.repaint(id);
        self.ensure_valid();
    }

    // ── Text cursor ──────────────────────────────────────────────────

    pub fn text_cursor(&self) -> &TextCursor {
        &self.keyboard.cursor
    }

    /// Toggle the blink phase of the text cursor. Returns the new phase.
    pub fn blink_text_cursor(&mut self) -> bool {
        if self.keyboard.cursor.element.is_none() {
            return false;
        }
        self.keyboard.cursor.visible = !self.keyboard.cursor.visible;
        self.invalidate_cursor();
        self.keyboard.cursor.visible
    }

    pub(crate) fn hide_text_cursor(&mut self) {
        if self.keyboard.cursor.element.is_some() {
            self.invalidate_cursor();
        }
        self.keyboard.cursor = TextCursor::default();
    }

    fn invalidate_cursor(&mut self) {
        let cursor = self.keyboard.cursor;
        let rect = cursor.rect(self.config().text_cursor_width);
        let surface = cursor.element.and_then(|e| self.dom.get(e)).and_then(|el| el.surface);
        if let Some(surf) = surface.and_then(|s| self.dom.surface_mut(s)) {
            surf.invalidate(rect);
        }
    }

    /// Re-place the caret from current layout, scrolling the focused element
    /// so the caret stays inside its content box.
    pub(crate) fn refresh_text_cursor(&mut self) {
        let target = self
            .keyboard
            .focused
            .filter(|&f| self.is_editable(f) && is_shown(&self.dom, f));
        let Some(id) = target else {
            self.hide_text_cursor();
            return;
        };
        let Some(el) = self.element(id) else {
            return self.hide_text_cursor();
        };
        let (Some(layout), Some(buffer), Some(_)) = (el.text_layout.as_ref(), el.text.as_ref(), el.surface) else {
            return self.hide_text_cursor();
        };
        let (caret, height) = layout.caret(buffer.cursor());
        let content = el.layout.content_box();
        let inner = el.layout.inner_offset;
        let absolute = el.layout.absolute;
        let width = self.config().text_cursor_width;

        let mut offset = inner;
        if caret.x + offset.x < 0 {
            offset.x = -caret.x;
        } else if caret.x + width + offset.x > content.width {
            offset.x = (content.width - caret.x - width).min(0);
        }
        if caret.y + offset.y < 0 {
            offset.y = -caret.y;
        } else if caret.y + height + offset.y > content.height {
            offset.y = (content.height - caret.y - height).min(0);
        }
        if offset != inner {
            self.set_inner_offset(id, offset);
        }

        let position = absolute + content.origin() + offset + caret;
        let old = self.keyboard.cursor;
        let next = TextCursor {
            element: Some(id),
            x: position.x,
            y: position.y,
            height,
            visible: if old.element == Some(id) && old.x == position.x && old.y == position.y {
                old.visible
            } else {
                true
            },
        };
        if next != old {
            self.hide_text_cursor();
            self.keyboard.cursor = next;
            self.invalidate_cursor();
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::dom::node::SurfaceId;
    use crate::event::input::MouseButton;
    use crate::style::StyleValue;

    fn setup() -> (Context, SurfaceId) {
        let mut ctx = Context::default();
        let s = ctx.create_surface();
        ctx.set_surface_size(s, 400, 300);
        (ctx, s)
    }

    fn field(ctx: &mut Context, parent: Option<ElementId>, s: SurfaceId, width: i32) -> ElementId {
        let id = ctx.create_element();
        ctx.update_style(id, |st| {
            st.width = StyleValue::absolute(width);
            st.flags |= StyleFlags::EDITABLE;
        });
        match parent {
            Some(p) => ctx.append_child(p, id),
            None => ctx.attach(id, s),
        };
        id
    }

    fn press(ctx: &mut Context, code: Key) {
        ctx.key_down(KeyEvent::plain(code));
        ctx.key_up(KeyEvent::plain(code));
    }

    fn type_text(ctx: &mut Context, text: &str) {
        for ch in text.chars() {
            ctx.key_char(ch);
        }
    }

    #[test]
    fn tab_cycles_through_shown_focusable_elements() {
        let (mut ctx, s) = setup();
        let form = ctx.create_element();
        ctx.attach(form, s);
        let a = field(&mut ctx, Some(form), s, 50);
        let b = field(&mut ctx, Some(form), s, 50);
        let c = field(&mut ctx, Some(form), s, 50);
        ctx.set_visible(b, false);

        let events = Rc::new(RefCell::new(Vec::new()));
        for kind in [EventKind::Focus, EventKind::Blur] {
            let sink = Rc::clone(&events);
            ctx.add_listener(kind, move |_, e| {
                sink.borrow_mut().push((e.kind, e.target));
                ControlFlow::Continue
            });
        }

        press(&mut ctx, Key::Tab);
        assert_eq!(ctx.focused(), Some(a));
        press(&mut ctx, Key::Tab);
        assert_eq!(ctx.focused(), Some(c));
        press(&mut ctx, Key::Tab);
        assert_eq!(ctx.focused(), Some(a));
        press(&mut ctx, Key::BackTab);
        assert_eq!(ctx.focused(), Some(c));
        assert_eq!(
            events.borrow()[..3],
            [(EventKind::Focus, Some(a)), (EventKind::Blur, Some(a)), (EventKind::Focus, Some(c))]
        );
    }

    #[test]
    fn hiding_the_focused_element_blurs_it() {
        let (mut ctx, s) = setup();
        let a = field(&mut ctx, None, s, 50);
        ctx.focus(a);
        ctx.set_visible(a, false);
        assert_eq!(ctx.focused(), None);
    }

    #[test]
    fn typing_edits_the_focused_field() {
        let (mut ctx, s) = setup();
        let a = field(&mut ctx, None, s, 100);
        let changes = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&changes);
        ctx.add_element_listener(a, EventKind::TextChanged, move |_, _| {
            *sink.borrow_mut() += 1;
            ControlFlow::Continue
        });

        ctx.focus(a);
        type_text(&mut ctx, "hey");
        press(&mut ctx, Key::Backspace);
        press(&mut ctx, Key::Left);
        type_text(&mut ctx, "\t");
        type_text(&mut ctx, "a");
        assert_eq!(ctx.text(a), Some("hae"));
        assert_eq!(*changes.borrow(), 5);

        ctx.key_down(KeyEvent::new(Key::Char('a'), Modifiers::CTRL));
        ctx.key_up(KeyEvent::plain(Key::Char('a')));
        type_text(&mut ctx, "z");
        assert_eq!(ctx.text(a), Some("z"));
    }

    #[test]
    fn enter_only_breaks_multi_line_fields() {
        let (mut ctx, s) = setup();
        let a = field(&mut ctx, None, s, 100);
        ctx.focus(a);
        type_text(&mut ctx, "ab");
        press(&mut ctx, Key::Enter);
        assert_eq!(ctx.text(a), Some("ab"));
        ctx.update_style(a, |st| st.flags |= StyleFlags::MULTI_LINE);
        press(&mut ctx, Key::Enter);
        type_text(&mut ctx, "c");
        assert_eq!(ctx.text(a), Some("ab\nc"));
        press(&mut ctx, Key::Up);
        assert_eq!(ctx.text_buffer(a).map(TextBuffer::cursor), Some(1));
    }

    #[test]
    fn stopped_key_down_skips_editing() {
        let (mut ctx, s) = setup();
        let a = field(&mut ctx, None, s, 100);
        ctx.set_text(a, "keep");
        ctx.focus(a);
        ctx.add_element_listener(a, EventKind::KeyDown, |_, _| ControlFlow::Stop);
        press(&mut ctx, Key::Backspace);
        assert_eq!(ctx.text(a), Some("keep"));
    }

    #[test]
    fn caret_sits_after_the_text() {
        let (mut ctx, s) = setup();
        let a = ctx.create_element();
        ctx.update_style(a, |st| {
            st.positioning = Positioning::Relative;
            st.left = StyleValue::absolute(10);
            st.top = StyleValue::absolute(20);
            st.width = StyleValue::absolute(100);
            st.padding = crate::style::Sides::all(StyleValue::absolute(2));
            st.flags |= StyleFlags::EDITABLE;
        });
        ctx.attach(a, s);
        ctx.set_text(a, "abc");
        ctx.focus(a);
        let cursor = *ctx.text_cursor();
        assert_eq!((cursor.element, cursor.x, cursor.y, cursor.height), (Some(a), 30, 22, 12));
        assert!(cursor.visible);
        assert!(!ctx.blink_text_cursor());
        assert!(ctx.blink_text_cursor());

        ctx.blur();
        assert_eq!(ctx.text_cursor().element, None);
    }

    #[test]
    fn caret_scrolls_narrow_fields() {
        let (mut ctx, s) = setup();
        let a = field(&mut ctx, None, s, 30);
        ctx.focus(a);
        type_text(&mut ctx, "0123456789");
        assert_eq!(ctx.inner_offset(a), Some(Offset::new(-31, 0)));
        assert_eq!(ctx.text_cursor().x, 29);
        press(&mut ctx, Key::Home);
        assert_eq!(ctx.inner_offset(a), Some(Offset::ZERO));
        assert_eq!(ctx.text_cursor().x, 0);
    }

    #[test]
    fn pressing_places_the_caret() {
        let (mut ctx, s) = setup();
        let a = field(&mut ctx, None, s, 100);
        ctx.set_text(a, "hello");
        ctx.mouse_down(s, MouseButton::Left, 13, 5);
        assert_eq!(ctx.focused(), Some(a));
        assert_eq!(ctx.text_buffer(a).map(TextBuffer::cursor), Some(2));
        ctx.mouse_move(s, 25, 5);
        ctx.mouse_up(s, MouseButton::Left, 25, 5);
        assert_eq!(ctx.text_buffer(a).and_then(|b| b.selected_text()), Some("ll"));
    }
}
