//! Delayed input.
//!
//! Input may be produced on any thread through an [`InputSender`]; the owner
//! of the context drains it with [`Context::process_queued_input`] on its own
//! thread. Events for surfaces deleted in the meantime are dropped.

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::context::Context;
use crate::dom::node::SurfaceId;

use super::handler::ControlFlow;
use super::input::InputEvent;

/// Cloneable, `Send` handle for queueing input.
#[derive(Debug, Clone)]
pub struct InputSender {
    tx: UnboundedSender<(SurfaceId, InputEvent)>,
}

impl InputSender {
    /// Queue `event` for `surface`. Fails only once the context is gone.
    pub fn send(&self, surface: SurfaceId, event: InputEvent) -> bool {
        self.tx.send((surface, event)).is_ok()
    }
}

#[derive(Debug)]
pub(crate) struct InputQueue {
    tx: UnboundedSender<(SurfaceId, InputEvent)>,
    rx: UnboundedReceiver<(SurfaceId, InputEvent)>,
}

impl InputQueue {
    pub(crate) fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self { tx, rx }
    }
}

impl Context {
    pub fn input_sender(&self) -> InputSender {
        InputSender { tx: self.queue.tx.clone() }
    }

    /// Dispatch everything queued so far, in order. Returns the number of
    /// events taken from the queue.
    pub fn process_queued_input(&mut self) -> usize {
        let mut count = 0;
        while let Ok((surface, event)) = self.queue.rx.try_recv() {
            if self.surface(surface).is_some() {
                self.dispatch_input(surface, event);
            } else {
                log::trace!(target: "gilt_gui::event", "dropping input for deleted surface {surface:?}");
            }
            count += 1;
        }
        count
    }

    /// Route one input event immediately.
    pub fn dispatch_input(&mut self, surface: SurfaceId, event: InputEvent) -> ControlFlow {
        match event {
            InputEvent::MouseMove { x, y } => self.mouse_move(surface, x, y),
            InputEvent::MouseEnter { x, y } => self.mouse_enter(surface, x, y),
            InputEvent::MouseLeave => {
                self.mouse_leave(surface);
                ControlFlow::Continue
            }
            InputEvent::MouseDown { button, x, y } => self.mouse_down(surface, button, x, y),
            InputEvent::MouseUp { button, x, y } => self.mouse_up(surface, button, x, y),
            InputEvent::DoubleClick { button, x, y } => self.double_click(surface, button, x, y),
            InputEvent::Wheel { x, y, dx, dy } => self.wheel(surface, x, y, dx, dy),
            InputEvent::KeyDown(key) => self.key_down(key),
            InputEvent::KeyUp(key) => self.key_up(key),
            InputEvent::Char(ch) => self.key_char(ch),
        }
    }
}
