//! Pilot: programmatic interaction with a headless context.
//!
//! The `Pilot` owns a [`Context`] with one surface and provides methods to
//! simulate pointer and keyboard input, validate layout and paint into a
//! [`RecordingRenderer`].

use crate::context::Context;
use crate::dom::node::{ElementId, SurfaceId};
use crate::event::handler::ControlFlow;
use crate::event::input::{Key, KeyEvent, Modifiers, MouseButton};
use crate::style::Style;

use super::recorder::RecordingRenderer;

// ---------------------------------------------------------------------------
// Pilot
// ---------------------------------------------------------------------------

/// A headless context driver for tests.
///
/// # Examples
///
/// ```
/// use gilt_gui::testing::Pilot;
/// use gilt_gui::style::StyleValue;
///
/// let mut pilot = Pilot::new(200, 100);
/// let button = pilot.spawn(|st| {
///     st.width = StyleValue::absolute(50);
///     st.height = StyleValue::absolute(20);
/// });
/// pilot.click(10, 10);
/// assert_eq!(pilot.ctx().hovered(), &[button]);
/// ```
pub struct Pilot {
    ctx: Context,
    surface: SurfaceId,
    position: (i32, i32),
}

impl Pilot {
    /// Create a context with one surface of the given size.
    pub fn new(width: i32, height: i32) -> Self {
        Self::with_context(Context::default(), width, height)
    }

    /// Drive an existing context, adding a surface of the given size to it.
    pub fn with_context(mut ctx: Context, width: i32, height: i32) -> Self {
        let surface = ctx.create_surface();
        ctx.set_surface_size(surface, width, height);
        Self { ctx, surface, position: (0, 0) }
    }

    pub fn ctx(&self) -> &Context {
        &self.ctx
    }

    pub fn ctx_mut(&mut self) -> &mut Context {
        &mut self.ctx
    }

    pub fn surface(&self) -> SurfaceId {
        self.surface
    }

    // ── Building ─────────────────────────────────────────────────────

    /// Create an element styled by `edit` and attach it as a surface root.
    pub fn spawn(&mut self, edit: impl FnOnce(&mut Style)) -> ElementId {
        let id = self.ctx.create_element();
        self.ctx.update_style(id, edit);
        self.ctx.attach(id, self.surface);
        id
    }

    /// Create an element styled by `edit` as the last child of `parent`.
    pub fn spawn_child(&mut self, parent: ElementId, edit: impl FnOnce(&mut Style)) -> ElementId {
        let id = self.ctx.create_element();
        self.ctx.update_style(id, edit);
        self.ctx.append_child(parent, id);
        id
    }

    // ── Pointer ──────────────────────────────────────────────────────

    /// Move the pointer to (x, y).
    pub fn move_to(&mut self, x: i32, y: i32) -> ControlFlow {
        self.position = (x, y);
        self.ctx.mouse_move(self.surface, x, y)
    }

    /// Move to (x, y) and press the left button.
    pub fn press(&mut self, x: i32, y: i32) -> ControlFlow {
        self.move_to(x, y);
        self.ctx.mouse_down(self.surface, MouseButton::Left, x, y)
    }

    /// Release the left button where the pointer is.
    pub fn release(&mut self) -> ControlFlow {
        let (x, y) = self.position;
        self.ctx.mouse_up(self.surface, MouseButton::Left, x, y)
    }

    /// Press and release the left button at (x, y).
    pub fn click(&mut self, x: i32, y: i32) -> ControlFlow {
        self.press(x, y);
        self.release()
    }

    /// Press at `from`, move to `to` and release there.
    pub fn drag(&mut self, from: (i32, i32), to: (i32, i32)) -> ControlFlow {
        self.press(from.0, from.1);
        self.move_to(to.0, to.1);
        self.release()
    }

    /// Turn the wheel over the current pointer position.
    pub fn scroll(&mut self, dx: i32, dy: i32) -> ControlFlow {
        let (x, y) = self.position;
        self.ctx.wheel(self.surface, x, y, dx, dy)
    }

    // ── Keyboard ─────────────────────────────────────────────────────

    /// Press and release `key` with no modifiers.
    pub fn press_key(&mut self, key: Key) -> ControlFlow {
        self.press_key_with(key, Modifiers::NONE)
    }

    /// Press and release `key` with `modifiers` held.
    pub fn press_key_with(&mut self, key: Key, modifiers: Modifiers) -> ControlFlow {
        let event = KeyEvent::new(key, modifiers);
        let flow = self.ctx.key_down(event);
        self.ctx.key_up(event);
        flow
    }

    /// Type each character of `text` into the focused element.
    pub fn type_text(&mut self, text: &str) {
        for ch in text.chars() {
            self.ctx.key_char(ch);
        }
    }

    // ── Output ───────────────────────────────────────────────────────

    /// Paint the accumulated invalid area and return what was drawn.
    pub fn paint(&mut self) -> RecordingRenderer {
        let mut renderer = RecordingRenderer::new();
        self.ctx.paint(self.surface, &mut renderer, None);
        renderer
    }

    /// Layout dump of the pilot's surface, see [`layout_snapshot`](super::layout_snapshot).
    pub fn snapshot(&mut self) -> String {
        super::layout_snapshot(&mut self.ctx, self.surface)
    }
}
