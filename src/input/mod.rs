//! Input notifications and device capabilities
//!
//! The host environment reports pointer and touch activity as
//! [`InputEvent`]s. Which of them the engine listens to is decided once,
//! from the [`DeviceCapabilities`] read at startup.

pub mod capabilities;
pub mod types;

pub use capabilities::{DeviceCapabilities, DeviceMode};
pub use types::{ContactPoint, InputEvent, RecordedInput};
