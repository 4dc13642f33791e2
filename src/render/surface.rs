use crate::config::TrailConfig;
use crate::trail::session::{SessionKey, TrailPoint};
use serde::{Deserialize, Serialize};

/// Handle of one marker on a surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MarkerId(pub u64);

impl std::fmt::Display for MarkerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "marker-{}", self.0)
    }
}

/// Fixed styling applied when a marker is created
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkerStyle {
    pub class_name: String,
    pub color: String,
    pub z_index: i32,
    /// CSS transition used when the host animates opacity changes
    pub transition: String,
}

impl MarkerStyle {
    /// Cursor dots sit above touch dots and ease every property; touch
    /// dots only fade, and do so quickly enough for the grace period
    pub fn for_session(key: SessionKey, config: &TrailConfig) -> Self {
        match key {
            SessionKey::Pointer => Self {
                class_name: "cursor-trail".to_string(),
                color: config.color.clone(),
                z_index: 9999,
                transition: "all 0.1s ease".to_string(),
            },
            SessionKey::Contact(id) => Self {
                class_name: format!("touch-trail touch-trail-{}", id),
                color: config.color.clone(),
                z_index: 9998,
                transition: "opacity 0.05s ease".to_string(),
            },
        }
    }
}

/// Snapshot of a marker as last reported to a surface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkerState {
    pub id: MarkerId,
    pub session: SessionKey,
    pub index: usize,
    pub x: f64,
    pub y: f64,
    pub size: f64,
    pub opacity: f64,
}

impl MarkerState {
    pub fn from_point(session: SessionKey, point: &TrailPoint) -> Self {
        Self {
            id: point.marker,
            session,
            index: point.index,
            x: point.position.x,
            y: point.position.y,
            size: point.size,
            opacity: point.opacity,
        }
    }
}

/// Where trail markers are drawn
pub trait MarkerSurface {
    /// Create a marker for `point` with the given fixed style
    fn create_marker(&mut self, session: SessionKey, point: &TrailPoint, style: &MarkerStyle);

    /// Apply the point's current position and opacity to its marker
    fn update_marker(&mut self, point: &TrailPoint);

    /// Remove a marker; unknown ids are ignored
    fn remove_marker(&mut self, marker: MarkerId);
}
