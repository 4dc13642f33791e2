//! Frame scheduling
//!
//! The display's "call me before the next repaint" primitive is abstracted
//! as [`FrameScheduler`]. [`FrameLoop`] keeps a shared engine stepping by
//! re-requesting a frame from inside every frame callback.
//! [`ManualScheduler`] fires frames on demand for tests and replays.

use crate::engine::trail_engine::TrailEngine;
use crate::render::MarkerSurface;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// One display refresh
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTick {
    /// Milliseconds on the host's monotonic clock
    pub timestamp_ms: f64,
    /// Counter maintained by the scheduler
    pub frame_index: u64,
}

impl FrameTick {
    pub fn new(timestamp_ms: f64, frame_index: u64) -> Self {
        Self {
            timestamp_ms,
            frame_index,
        }
    }
}

/// Callback invoked once on the next frame
pub type FrameCallback = Box<dyn FnOnce(FrameTick)>;

/// Source of "next frame" callbacks
pub trait FrameScheduler {
    /// Invoke `callback` once before the next repaint
    fn request_frame(&self, callback: FrameCallback);
}

/// Scheduler driven by explicit [`advance`](Self::advance) calls
#[derive(Default)]
pub struct ManualScheduler {
    queue: RefCell<Vec<FrameCallback>>,
    now_ms: Cell<f64>,
    frame_index: Cell<u64>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the clock forward by `dt_ms` and fire every pending callback
    ///
    /// Callbacks requested while firing wait for the next advance. Returns
    /// the number of callbacks fired.
    pub fn advance(&self, dt_ms: f64) -> usize {
        let now = self.now_ms.get() + dt_ms;
        self.now_ms.set(now);

        let tick = FrameTick::new(now, self.frame_index.get());
        self.frame_index.set(tick.frame_index + 1);

        let pending = std::mem::take(&mut *self.queue.borrow_mut());
        let fired = pending.len();
        for callback in pending {
            callback(tick);
        }
        fired
    }

    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }

    pub fn now_ms(&self) -> f64 {
        self.now_ms.get()
    }
}

impl FrameScheduler for ManualScheduler {
    fn request_frame(&self, callback: FrameCallback) {
        self.queue.borrow_mut().push(callback);
    }
}

impl std::fmt::Debug for ManualScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManualScheduler")
            .field("pending", &self.pending())
            .field("now_ms", &self.now_ms.get())
            .field("frame_index", &self.frame_index.get())
            .finish()
    }
}

/// Keeps a shared [`TrailEngine`] stepping once per frame
///
/// Input handlers hold a clone of [`engine`](Self::engine) and mutate it
/// between frames; both sides run on the same thread.
pub struct FrameLoop<S: MarkerSurface + 'static> {
    engine: Rc<RefCell<TrailEngine<S>>>,
    scheduler: Rc<dyn FrameScheduler>,
    running: Rc<Cell<bool>>,
    generation: Rc<Cell<u64>>,
}

impl<S: MarkerSurface + 'static> FrameLoop<S> {
    pub fn new(engine: Rc<RefCell<TrailEngine<S>>>, scheduler: Rc<dyn FrameScheduler>) -> Self {
        Self {
            engine,
            scheduler,
            running: Rc::new(Cell::new(false)),
            generation: Rc::new(Cell::new(0)),
        }
    }

    pub fn engine(&self) -> &Rc<RefCell<TrailEngine<S>>> {
        &self.engine
    }

    /// Start requesting frames. No-op if already running.
    pub fn start(&self) {
        if self.running.get() {
            return;
        }
        self.running.set(true);

        // Callbacks left over from an earlier start/stop cycle see a stale
        // generation and drop out instead of doubling the loop.
        let generation = self.generation.get() + 1;
        self.generation.set(generation);

        Self::request(
            Rc::clone(&self.engine),
            &self.scheduler,
            Rc::clone(&self.running),
            Rc::clone(&self.generation),
            generation,
        );
    }

    /// Stop after the currently pending frame; it will not step the engine
    pub fn stop(&self) {
        self.running.set(false);
    }

    pub fn is_running(&self) -> bool {
        self.running.get()
    }

    // Pending callbacks hold the scheduler weakly so a queued frame never
    // keeps its own scheduler alive.
    fn request(
        engine: Rc<RefCell<TrailEngine<S>>>,
        scheduler: &Rc<dyn FrameScheduler>,
        running: Rc<Cell<bool>>,
        current: Rc<Cell<u64>>,
        generation: u64,
    ) {
        let next = Rc::downgrade(scheduler);
        scheduler.request_frame(Box::new(move |tick: FrameTick| {
            if !running.get() || current.get() != generation {
                return;
            }
            engine.borrow_mut().step_frame(tick);
            if let Some(scheduler) = next.upgrade() {
                Self::request(engine, &scheduler, running, current, generation);
            }
        }));
    }
}

impl<S: MarkerSurface + 'static> std::fmt::Debug for FrameLoop<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameLoop")
            .field("running", &self.running.get())
            .field("generation", &self.generation.get())
            .finish()
    }
}
