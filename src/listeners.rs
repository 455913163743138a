use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{ EventTarget, HtmlCanvasElement, MouseEvent };
use crate::error::Result;
use crate::source::{ PointerEvent, PointerInput };

/// Pointer events waiting for the next frame
///
/// Shared only between the DOM callbacks, which push, and the renderer, which drains.
/// Consecutive moves collapse into the latest one.
#[derive(Clone, Default)]
pub struct PointerQueue {
    events: Rc<RefCell<VecDeque<PointerEvent>>>,
}

impl PointerQueue {
    pub fn push(&self, event: PointerEvent) {
        let mut events = self.events.borrow_mut();
        let replaces_move = matches!(event, PointerEvent::Move { .. })
            && matches!(events.back(), Some(PointerEvent::Move { .. }));
        if replaces_move {
            events.pop_back();
        }
        events.push_back(event);
    }

    pub fn drain(&self) -> Vec<PointerEvent> {
        self.events.borrow_mut().drain(..).collect()
    }

    /// Drain the queue into `input` in arrival order
    pub fn apply_to(&self, input: &mut PointerInput) {
        for event in self.drain() {
            input.apply(event);
        }
    }

    pub fn len(&self) -> usize {
        self.events.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.borrow().is_empty()
    }
}

type Callback = Closure<dyn FnMut(MouseEvent)>;

/// Pointer callbacks registered on a canvas, unregistered when dropped
pub struct PointerListeners {
    target: EventTarget,
    callbacks: Vec<(&'static str, Callback)>,
}

impl PointerListeners {
    /// Forward the pointer events of `canvas` into `queue`
    ///
    /// Positions are the CSS pixel offsets inside the canvas, origin at the top left.
    pub fn attach(canvas: &HtmlCanvasElement, queue: &PointerQueue) -> Result<PointerListeners> {
        let mut listeners = PointerListeners {
            target: canvas.clone().into(),
            callbacks: Vec::with_capacity(5),
        };

        listeners.listen("pointermove", queue, |event| PointerEvent::Move {
            x: event.offset_x() as f32,
            y: event.offset_y() as f32,
        })?;
        listeners.listen("pointerdown", queue, |_| PointerEvent::Down)?;
        listeners.listen("pointerup", queue, |_| PointerEvent::Up)?;
        listeners.listen("pointerleave", queue, |_| PointerEvent::Up)?;
        listeners.listen("pointercancel", queue, |_| PointerEvent::Up)?;

        log::debug!("attached {} pointer listeners", listeners.callbacks.len());

        Ok(listeners)
    }

    fn listen(
        &mut self,
        name: &'static str,
        queue: &PointerQueue,
        translate: fn(&MouseEvent) -> PointerEvent,
    ) -> Result<()> {
        let queue = queue.clone();
        let callback = Closure::wrap(Box::new(move |event: MouseEvent| {
            queue.push(translate(&event));
        }) as Box<dyn FnMut(MouseEvent)>);

        self.target.add_event_listener_with_callback(name, callback.as_ref().unchecked_ref())?;
        self.callbacks.push((name, callback));

        Ok(())
    }
}

impl Drop for PointerListeners {
    fn drop(&mut self) {
        for (name, callback) in self.callbacks.drain(..) {
            if let Err(error) = self.target.remove_event_listener_with_callback(name, callback.as_ref().unchecked_ref()) {
                log::warn!("unable to remove {name} listener: {error:?}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{ Origin, ACTIVE_STRENGTH };

    #[test]
    fn moves_collapse_into_the_latest() {
        let queue = PointerQueue::default();
        queue.push(PointerEvent::Move { x: 1.0, y: 1.0 });
        queue.push(PointerEvent::Move { x: 2.0, y: 2.0 });
        queue.push(PointerEvent::Move { x: 3.0, y: 3.0 });
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.drain(), vec![PointerEvent::Move { x: 3.0, y: 3.0 }]);
        assert!(queue.is_empty());
    }

    #[test]
    fn presses_are_never_dropped() {
        let queue = PointerQueue::default();
        queue.push(PointerEvent::Move { x: 1.0, y: 1.0 });
        queue.push(PointerEvent::Down);
        queue.push(PointerEvent::Move { x: 2.0, y: 2.0 });
        queue.push(PointerEvent::Up);
        queue.push(PointerEvent::Down);
        assert_eq!(
            queue.drain(),
            vec![
                PointerEvent::Move { x: 1.0, y: 1.0 },
                PointerEvent::Down,
                PointerEvent::Move { x: 2.0, y: 2.0 },
                PointerEvent::Up,
                PointerEvent::Down,
            ],
        );
    }

    #[test]
    fn release_queued_before_a_flush_is_applied() {
        let queue = PointerQueue::default();
        let mut input = PointerInput::new(Origin::BottomLeft, 100, 1.0);

        queue.push(PointerEvent::Down);
        queue.apply_to(&mut input);
        assert!(input.source().is_active());

        queue.push(PointerEvent::Up);
        queue.apply_to(&mut input);
        assert!(queue.is_empty());
        assert_eq!(input.source().strength, 0.0);

        queue.apply_to(&mut input);
        assert_eq!(input.source().strength, 0.0);
    }

    #[test]
    fn events_are_applied_in_order() {
        let queue = PointerQueue::default();
        let mut input = PointerInput::new(Origin::TopLeft, 100, 2.0);
        queue.push(PointerEvent::Down);
        queue.push(PointerEvent::Move { x: 10.0, y: 5.0 });
        queue.push(PointerEvent::Up);
        queue.push(PointerEvent::Down);
        queue.apply_to(&mut input);
        assert_eq!(input.source().as_array(), [20.0, 90.0, ACTIVE_STRENGTH]);
    }

    #[test]
    fn clones_share_the_queue() {
        let queue = PointerQueue::default();
        let callback_side = queue.clone();
        callback_side.push(PointerEvent::Down);
        assert_eq!(queue.drain(), vec![PointerEvent::Down]);
    }
}
