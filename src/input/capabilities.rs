use serde::{Deserialize, Serialize};

/// What the host device can do, read once at startup
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceCapabilities {
    /// The host delivers touch events
    pub touch: bool,
    /// The primary pointer can hover (a mouse or trackpad)
    pub hover: bool,
}

impl DeviceCapabilities {
    pub fn new(touch: bool, hover: bool) -> Self {
        Self { touch, hover }
    }

    /// A mouse-driven desktop
    pub fn desktop() -> Self {
        Self::new(false, true)
    }

    /// A phone or tablet
    pub fn touchscreen() -> Self {
        Self::new(true, false)
    }
}

/// Which input source drives the trails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DeviceMode {
    /// One trail per touch contact; pointer events are dropped so that
    /// mouse events synthesized from taps never draw a cursor trail
    Touch,
    /// A single trail following the mouse
    Pointer,
    /// No continuous pointer and no touch: trails stay off
    Disabled,
}

impl DeviceMode {
    /// Touch wins over hover; without either there is nothing to follow
    pub fn resolve(capabilities: DeviceCapabilities) -> Self {
        if capabilities.touch {
            DeviceMode::Touch
        } else if capabilities.hover {
            DeviceMode::Pointer
        } else {
            DeviceMode::Disabled
        }
    }
}

impl std::fmt::Display for DeviceMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeviceMode::Touch => write!(f, "touch"),
            DeviceMode::Pointer => write!(f, "pointer"),
            DeviceMode::Disabled => write!(f, "disabled"),
        }
    }
}
