//! `requestAnimationFrame` frame source

use crate::engine::{FrameCallback, FrameScheduler, FrameTick};
use std::cell::Cell;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::Window;

/// Schedules frames with the browser's `requestAnimationFrame`
///
/// Each request registers a one-shot closure; the `DOMHighResTimeStamp`
/// passed by the browser becomes the tick timestamp.
pub struct RafScheduler {
    window: Window,
    frame_index: Rc<Cell<u64>>,
}

impl RafScheduler {
    pub fn new(window: Window) -> Self {
        Self {
            window,
            frame_index: Rc::new(Cell::new(0)),
        }
    }
}

impl FrameScheduler for RafScheduler {
    fn request_frame(&self, callback: FrameCallback) {
        let counter = Rc::clone(&self.frame_index);
        let closure = Closure::once_into_js(move |timestamp_ms: f64| {
            let frame_index = counter.get();
            counter.set(frame_index + 1);
            callback(FrameTick::new(timestamp_ms, frame_index));
        });

        if let Err(err) = self.window.request_animation_frame(closure.unchecked_ref()) {
            tracing::warn!("requestAnimationFrame failed: {:?}", err);
        }
    }
}

impl std::fmt::Debug for RafScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RafScheduler")
            .field("frame_index", &self.frame_index.get())
            .finish()
    }
}
