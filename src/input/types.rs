use kurbo::Point;
use serde::{Deserialize, Serialize};

/// One touch contact as reported by the host
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactPoint {
    pub identifier: i32,
    pub x: f64,
    pub y: f64,
}

impl ContactPoint {
    pub fn new(identifier: i32, x: f64, y: f64) -> Self {
        Self { identifier, x, y }
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Environment notification consumed by the trail engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum InputEvent {
    /// Contacts currently on the surface when a new touch begins
    ContactStart { contacts: Vec<ContactPoint> },
    /// Updated coordinates of live contacts
    ContactMove { contacts: Vec<ContactPoint> },
    /// Contacts still on the surface after one or more were lifted
    ContactEnd { remaining: Vec<ContactPoint> },
    /// The gesture was interrupted; every contact is gone
    ContactCancel,
    PointerMove { x: f64, y: f64 },
    PointerEnter,
    PointerLeave,
}

impl InputEvent {
    pub fn is_contact(&self) -> bool {
        matches!(
            self,
            InputEvent::ContactStart { .. }
                | InputEvent::ContactMove { .. }
                | InputEvent::ContactEnd { .. }
                | InputEvent::ContactCancel
        )
    }
}

/// Input event stamped with its arrival time, as stored in replay logs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordedInput {
    /// Milliseconds since the start of the recording
    pub time_ms: f64,
    pub event: InputEvent,
}
