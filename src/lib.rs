//! Portfolio Trail - eased cursor and touch trails for the portfolio site.
//!
//! A chain of dots follows the mouse, or one chain per finger on touch
//! devices, each dot closing a fixed fraction of the gap to the one ahead
//! every frame. The engine is host independent; the `web` feature adds the
//! browser host and the `trail-replay` binary replays recorded input.

pub mod config;
pub mod engine;
pub mod input;
pub mod render;
pub mod replay;
pub mod trail;

#[cfg(feature = "web")]
pub mod web;

pub use config::{ConfigError, TrailConfig};
pub use engine::{FrameLoop, FrameScheduler, FrameTick, ManualScheduler, TrailEngine};
pub use input::{ContactPoint, DeviceCapabilities, DeviceMode, InputEvent};
pub use render::{MarkerSurface, RecordingSurface};
pub use trail::{SessionKey, TrailPoint, TrailSession};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Install the logging subscriber
///
/// Honors `RUST_LOG`; defaults to debug output for this crate.
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "portfolio_trail=debug,trail_replay=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
