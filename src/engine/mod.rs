//! Trail animation engine
//!
//! [`TrailEngine`] owns the session registry and turns input notifications
//! and frame ticks into marker updates. Frames come from a
//! [`FrameScheduler`], kept alive by a [`FrameLoop`].

pub mod frame;
pub mod trail_engine;

pub use frame::{FrameCallback, FrameLoop, FrameScheduler, FrameTick, ManualScheduler};
pub use trail_engine::TrailEngine;
