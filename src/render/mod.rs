//! Marker output
//!
//! The engine never touches a display directly. It reports marker
//! creation, updates, and removal to a [`MarkerSurface`]; the browser host
//! maps those to `<div>` elements and [`RecordingSurface`] keeps them in
//! memory for replays and tests.

pub mod recording;
pub mod surface;

pub use recording::RecordingSurface;
pub use surface::{MarkerId, MarkerState, MarkerStyle, MarkerSurface};
