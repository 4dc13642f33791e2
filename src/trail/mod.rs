//! Trail state: dots, sessions, and the registry that owns them
//!
//! A [`TrailSession`] tracks one continuous contact (the mouse, or one
//! touch) and the chain of [`TrailPoint`]s chasing it. Positions are
//! advanced with the exponential easing in [`easing`].

pub mod easing;
pub mod registry;
pub mod session;

pub use easing::{ease_toward, is_settled, step_chain};
pub use registry::SessionRegistry;
pub use session::{SessionKey, SessionPhase, TrailPoint, TrailSession};
