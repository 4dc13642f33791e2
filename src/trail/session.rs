use crate::config::TrailConfig;
use crate::render::MarkerId;
use crate::trail::easing::{is_settled, step_chain};
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Identifies the contact a session follows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "camelCase")]
pub enum SessionKey {
    /// The mouse; there is at most one
    Pointer,
    /// A touch contact, keyed by the host's touch identifier
    Contact(i32),
}

impl SessionKey {
    pub fn is_contact(&self) -> bool {
        matches!(self, SessionKey::Contact(_))
    }
}

impl std::fmt::Display for SessionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionKey::Pointer => write!(f, "pointer"),
            SessionKey::Contact(id) => write!(f, "touch-{}", id),
        }
    }
}

/// One dot of a trail
#[derive(Debug, Clone, PartialEq)]
pub struct TrailPoint {
    pub marker: MarkerId,
    /// Position in the chain, 0 being the head
    pub index: usize,
    pub size: f64,
    /// Opacity while the trail is shown
    pub base_opacity: f64,
    /// Opacity currently rendered
    pub opacity: f64,
    /// Position currently rendered
    pub position: Point,
}

impl TrailPoint {
    pub fn new(marker: MarkerId, index: usize, config: &TrailConfig, position: Point) -> Self {
        let base_opacity = config.point_opacity(index);
        Self {
            marker,
            index,
            size: config.point_size(index),
            base_opacity,
            opacity: base_opacity,
            position,
        }
    }
}

/// Lifecycle of a session
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SessionPhase {
    Live,
    /// Pointer left the surface; dots are transparent but keep moving
    Hidden,
    /// Contact ended; dots are transparent and get removed at the deadline
    Ending { remove_at_ms: f64 },
}

/// Tracked state for one continuous contact
#[derive(Debug, Clone, PartialEq)]
pub struct TrailSession {
    key: SessionKey,
    points: Vec<TrailPoint>,
    target: Point,
    eased: Vec<Point>,
    phase: SessionPhase,
}

impl TrailSession {
    /// Create a session with every dot and eased position at `start`
    pub fn new(key: SessionKey, points: Vec<TrailPoint>, start: Point) -> Self {
        let eased = vec![start; points.len()];
        Self {
            key,
            points,
            target: start,
            eased,
            phase: SessionPhase::Live,
        }
    }

    pub fn key(&self) -> SessionKey {
        self.key
    }

    pub fn points(&self) -> &[TrailPoint] {
        &self.points
    }

    pub fn head(&self) -> Option<&TrailPoint> {
        self.points.first()
    }

    pub fn tail(&self) -> Option<&TrailPoint> {
        self.points.last()
    }

    pub fn target(&self) -> Point {
        self.target
    }

    pub fn set_target(&mut self, target: Point) {
        self.target = target;
    }

    pub fn eased(&self) -> &[Point] {
        &self.eased
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn is_ending(&self) -> bool {
        matches!(self.phase, SessionPhase::Ending { .. })
    }

    /// Removal deadline, if the session is fading out
    pub fn remove_at_ms(&self) -> Option<f64> {
        match self.phase {
            SessionPhase::Ending { remove_at_ms } => Some(remove_at_ms),
            _ => None,
        }
    }

    /// Advance every dot one frame and copy the eased positions to the
    /// rendered ones
    pub fn step(&mut self, easing: f64) {
        self.ensure_eased();
        step_chain(&mut self.eased, self.target, easing);
        for (point, eased) in self.points.iter_mut().zip(&self.eased) {
            point.position = *eased;
        }
    }

    /// Hide the dots until [`show`](Self::show); ignored while ending
    pub fn hide(&mut self) {
        if self.is_ending() {
            return;
        }
        self.set_opacity(0.0);
        self.phase = SessionPhase::Hidden;
    }

    /// Restore each dot's base opacity; ignored while ending
    pub fn show(&mut self) {
        if self.is_ending() {
            return;
        }
        for point in &mut self.points {
            point.opacity = point.base_opacity;
        }
        self.phase = SessionPhase::Live;
    }

    /// Make the dots transparent and mark the session for removal
    pub fn begin_ending(&mut self, remove_at_ms: f64) {
        self.set_opacity(0.0);
        self.phase = SessionPhase::Ending { remove_at_ms };
    }

    /// Move the removal deadline by `offset_ms`; no-op unless ending
    pub fn shift_deadline(&mut self, offset_ms: f64) {
        if let SessionPhase::Ending { remove_at_ms } = self.phase {
            self.phase = SessionPhase::Ending {
                remove_at_ms: remove_at_ms + offset_ms,
            };
        }
    }

    /// True once the head is within `threshold` of the target and every
    /// dot is within `threshold` of the one ahead of it
    pub fn is_settled(&self, threshold: f64) -> bool {
        let mut antecedent = self.target;
        for position in &self.eased {
            if !is_settled(*position, antecedent, threshold) {
                return false;
            }
            antecedent = *position;
        }
        true
    }

    fn set_opacity(&mut self, opacity: f64) {
        for point in &mut self.points {
            point.opacity = opacity;
        }
    }

    // Re-seed at the target if the eased chain got out of step with the dots
    fn ensure_eased(&mut self) {
        if self.eased.len() != self.points.len() {
            tracing::warn!(
                "Session {} had {} eased positions for {} points, resetting",
                self.key,
                self.eased.len(),
                self.points.len()
            );
            self.eased = vec![self.target; self.points.len()];
        }
    }
}
