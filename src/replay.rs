//! Headless replay of recorded input
//!
//! Feeds a recorded input log through a [`TrailEngine`] at a fixed output
//! frame rate and captures every marker after each frame. Useful for
//! tuning the trail constants without a browser.

use crate::config::{ConfigError, TrailConfig};
use crate::engine::{FrameLoop, ManualScheduler, TrailEngine};
use crate::input::{DeviceCapabilities, RecordedInput};
use crate::render::{MarkerState, RecordingSurface};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;
use thiserror::Error;

/// Errors that can occur while replaying a log
#[derive(Error, Debug)]
pub enum ReplayError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    ConfigError(#[from] ConfigError),

    #[error("Output frame rate must be positive, got {0}")]
    InvalidFrameRate(f64),

    #[error("Log spans {0}ms, more than {MAX_REPLAY_FRAMES} output frames")]
    LogTooLong(f64),
}

/// Upper bound on frames produced by a single replay
pub const MAX_REPLAY_FRAMES: usize = 1_000_000;

/// Distance below which a dot counts as at rest in the replay summary
const SETTLE_THRESHOLD_PX: f64 = 0.5;

/// Result type for replay operations
pub type ReplayResult<T> = Result<T, ReplayError>;

/// A recorded sequence of input notifications
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplayLog {
    pub events: Vec<RecordedInput>,
}

/// Every marker on the surface after one frame
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameSnapshot {
    pub frame_index: u64,
    pub time_ms: f64,
    pub markers: Vec<MarkerState>,
}

/// Replay `log` and return one snapshot per output frame
///
/// Events are applied before the first frame whose time reaches them.
/// Frames continue past the last event for one grace period so that
/// ended contacts are removed in the output.
pub fn replay(
    log: &ReplayLog,
    config: TrailConfig,
    capabilities: DeviceCapabilities,
    output_fps: f64,
) -> ReplayResult<Vec<FrameSnapshot>> {
    if !(output_fps > 0.0) {
        return Err(ReplayError::InvalidFrameRate(output_fps));
    }
    if log.events.is_empty() {
        return Ok(vec![]);
    }

    let mut events = log.events.clone();
    events.sort_by(|a, b| a.time_ms.total_cmp(&b.time_ms));

    let frame_duration_ms = 1000.0 / output_fps;
    let total_duration_ms = events.last().map(|e| e.time_ms).unwrap_or(0.0) + config.grace_period_ms;
    let frames_needed = (total_duration_ms / frame_duration_ms).ceil();
    if !(frames_needed.is_finite() && frames_needed < MAX_REPLAY_FRAMES as f64) {
        return Err(ReplayError::LogTooLong(total_duration_ms));
    }
    let frame_count = (frames_needed as usize)
        .checked_add(1)
        .ok_or(ReplayError::LogTooLong(total_duration_ms))?;

    let engine = Rc::new(RefCell::new(TrailEngine::new(
        config,
        capabilities,
        RecordingSurface::new(),
    )?));
    let scheduler = Rc::new(ManualScheduler::new());
    let frame_loop = FrameLoop::new(Rc::clone(&engine), scheduler.clone());
    frame_loop.start();

    let mut result = Vec::new();
    let mut next_event = 0;

    for frame in 0..frame_count {
        let frame_time_ms = scheduler.now_ms() + frame_duration_ms;

        while next_event < events.len() && events[next_event].time_ms <= frame_time_ms {
            engine.borrow_mut().handle(&events[next_event].event);
            next_event += 1;
        }

        scheduler.advance(frame_duration_ms);

        result.push(FrameSnapshot {
            frame_index: frame as u64,
            time_ms: scheduler.now_ms(),
            markers: engine.borrow().surface().snapshot(),
        });
    }

    frame_loop.stop();

    let engine = engine.borrow();
    tracing::debug!(
        "{} of {} sessions settled at end of replay",
        engine
            .sessions()
            .filter(|s| s.is_settled(SETTLE_THRESHOLD_PX))
            .count(),
        engine.session_count()
    );
    tracing::info!(
        "Replayed {} events into {} frames at {}fps ({} markers created)",
        events.len(),
        result.len(),
        output_fps,
        engine.surface().created()
    );

    Ok(result)
}

/// Read a log from `input_file`, replay it, and write the snapshots to
/// `output_file` as JSON. Returns the number of frames written.
pub fn replay_file(
    input_file: &Path,
    output_file: &Path,
    config: TrailConfig,
    capabilities: DeviceCapabilities,
    output_fps: f64,
) -> ReplayResult<usize> {
    let content = std::fs::read_to_string(input_file)?;
    let log: ReplayLog = serde_json::from_str(&content)?;

    tracing::info!(
        "Replaying {} ({} events) -> {}",
        input_file.display(),
        log.events.len(),
        output_file.display()
    );

    let frames = replay(&log, config, capabilities, output_fps)?;
    let output = serde_json::to_vec_pretty(&frames)?;
    std::fs::write(output_file, output)?;

    Ok(frames.len())
}
