use crate::config::{ConfigResult, TrailConfig};
use crate::engine::frame::FrameTick;
use crate::input::{DeviceCapabilities, DeviceMode, InputEvent};
use crate::render::{MarkerId, MarkerStyle, MarkerSurface};
use crate::trail::{SessionKey, SessionRegistry, TrailPoint, TrailSession};
use kurbo::Point;

/// Drives every trail session and reports marker changes to a surface
///
/// Operations on unknown or already-ending sessions are silent no-ops;
/// nothing here can fail once the engine is built.
#[derive(Debug)]
pub struct TrailEngine<S: MarkerSurface> {
    config: TrailConfig,
    mode: DeviceMode,
    surface: S,
    registry: SessionRegistry,
    next_marker: u64,
    /// Timestamp of the most recent frame
    clock_ms: f64,
    frames_stepped: u64,
}

impl<S: MarkerSurface> TrailEngine<S> {
    /// Build an engine, fixing the device mode from `capabilities`
    pub fn new(config: TrailConfig, capabilities: DeviceCapabilities, surface: S) -> ConfigResult<Self> {
        config.validate()?;
        let mode = DeviceMode::resolve(capabilities);

        tracing::info!(
            "Trail engine initialized (mode={}, touch={}, hover={}, points={}, easing={})",
            mode,
            capabilities.touch,
            capabilities.hover,
            config.point_count,
            config.easing
        );

        Ok(Self {
            config,
            mode,
            surface,
            registry: SessionRegistry::new(),
            next_marker: 0,
            clock_ms: 0.0,
            frames_stepped: 0,
        })
    }

    pub fn config(&self) -> &TrailConfig {
        &self.config
    }

    pub fn mode(&self) -> DeviceMode {
        self.mode
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn session(&self, key: SessionKey) -> Option<&TrailSession> {
        self.registry.get(&key)
    }

    pub fn sessions(&self) -> impl Iterator<Item = &TrailSession> {
        self.registry.iter()
    }

    /// Number of sessions in the registry, fading ones included
    pub fn session_count(&self) -> usize {
        self.registry.len()
    }

    pub fn is_ending(&self, key: SessionKey) -> bool {
        self.registry.get(&key).is_some_and(TrailSession::is_ending)
    }

    pub fn clock_ms(&self) -> f64 {
        self.clock_ms
    }

    pub fn frames_stepped(&self) -> u64 {
        self.frames_stepped
    }

    /// Route a host notification according to the device mode
    pub fn handle(&mut self, event: &InputEvent) {
        match self.mode {
            DeviceMode::Disabled => {
                tracing::trace!("Trails disabled, ignoring {:?}", event);
                return;
            }
            DeviceMode::Touch if !event.is_contact() => {
                // Taps synthesize mouse events; they must not draw a cursor trail
                tracing::trace!("Touch mode, dropping pointer event {:?}", event);
                return;
            }
            DeviceMode::Pointer if event.is_contact() => {
                tracing::trace!("Pointer mode, dropping contact event {:?}", event);
                return;
            }
            _ => {}
        }

        match event {
            InputEvent::ContactStart { contacts } => {
                for contact in contacts {
                    self.start_session(SessionKey::Contact(contact.identifier), contact.position());
                }
            }
            InputEvent::ContactMove { contacts } => {
                for contact in contacts {
                    self.update_target(SessionKey::Contact(contact.identifier), contact.position());
                }
            }
            InputEvent::ContactEnd { remaining } => {
                let lifted: Vec<SessionKey> = self
                    .registry
                    .contact_keys()
                    .into_iter()
                    .filter(|key| {
                        !remaining
                            .iter()
                            .any(|c| SessionKey::Contact(c.identifier) == *key)
                    })
                    .collect();
                for key in lifted {
                    self.end_session(key);
                }
            }
            InputEvent::ContactCancel => self.cancel_all(),
            InputEvent::PointerMove { x, y } => {
                let position = Point::new(*x, *y);
                if self.registry.contains(&SessionKey::Pointer) {
                    self.update_target(SessionKey::Pointer, position);
                } else {
                    self.start_session(SessionKey::Pointer, position);
                }
            }
            InputEvent::PointerEnter => self.show_pointer(),
            InputEvent::PointerLeave => self.hide_pointer(),
        }
    }

    /// Create a session with all dots collapsed at `position`
    ///
    /// Ignored if `key` is live. A session still fading out under the same
    /// key (touch identifiers get reused) is removed first.
    pub fn start_session(&mut self, key: SessionKey, position: Point) {
        if let Some(existing) = self.registry.get(&key) {
            if !existing.is_ending() {
                tracing::trace!("Session {} already live, ignoring start", key);
                return;
            }
            self.finish_session(key);
        }

        let style = MarkerStyle::for_session(key, &self.config);
        let mut points = Vec::with_capacity(self.config.point_count);
        for index in 0..self.config.point_count {
            let marker = MarkerId(self.next_marker);
            self.next_marker += 1;
            points.push(TrailPoint::new(marker, index, &self.config, position));
        }

        for point in &points {
            self.surface.create_marker(key, point, &style);
        }
        self.registry.insert(TrailSession::new(key, points, position));

        tracing::debug!(
            "Started session {} at ({}, {}) ({} live)",
            key,
            position.x,
            position.y,
            self.registry.len()
        );
    }

    /// Store a new target for `key`; dots move on the next frame
    pub fn update_target(&mut self, key: SessionKey, position: Point) {
        match self.registry.get_mut(&key) {
            Some(session) => session.set_target(position),
            None => tracing::trace!("No session {}, ignoring target update", key),
        }
    }

    /// Advance every session by one frame
    ///
    /// Sessions whose grace period ran out by `tick` are removed before
    /// the rest are eased.
    pub fn step_frame(&mut self, tick: FrameTick) {
        if self.frames_stepped == 0 {
            // Sessions ended before any frame got deadlines on the unseeded
            // clock; rebase them onto the host's first timestamp.
            let offset = tick.timestamp_ms - self.clock_ms;
            for session in self.registry.iter_mut() {
                session.shift_deadline(offset);
            }
        }
        self.clock_ms = tick.timestamp_ms;
        self.frames_stepped += 1;

        for key in self.registry.expired(tick.timestamp_ms) {
            self.finish_session(key);
        }

        let easing = self.config.easing;
        for session in self.registry.iter_mut() {
            session.step(easing);
            for point in session.points() {
                self.surface.update_marker(point);
            }
        }
    }

    /// Hide `key`'s dots now and remove them after the grace period
    pub fn end_session(&mut self, key: SessionKey) {
        let remove_at_ms = self.clock_ms + self.config.grace_period_ms;
        match self.registry.get_mut(&key) {
            None => tracing::trace!("No session {}, ignoring end", key),
            Some(session) if session.is_ending() => {
                tracing::trace!("Session {} already ending", key)
            }
            Some(session) => {
                session.begin_ending(remove_at_ms);
                for point in session.points() {
                    self.surface.update_marker(point);
                }
                tracing::debug!("Ending session {} (removal at {}ms)", key, remove_at_ms);
            }
        }
    }

    /// Remove every session immediately, skipping the grace period
    pub fn cancel_all(&mut self) {
        let sessions = self.registry.drain();
        for session in &sessions {
            for point in session.points() {
                self.surface.remove_marker(point.marker);
            }
        }
        tracing::debug!("Cancelled {} sessions", sessions.len());
    }

    /// Make the cursor trail transparent while the pointer is outside
    pub fn hide_pointer(&mut self) {
        if let Some(session) = self.registry.get_mut(&SessionKey::Pointer) {
            session.hide();
            for point in session.points() {
                self.surface.update_marker(point);
            }
        }
    }

    /// Restore the cursor trail's opacity when the pointer comes back
    pub fn show_pointer(&mut self) {
        if let Some(session) = self.registry.get_mut(&SessionKey::Pointer) {
            session.show();
            for point in session.points() {
                self.surface.update_marker(point);
            }
        }
    }

    fn finish_session(&mut self, key: SessionKey) {
        if let Some(session) = self.registry.remove(&key) {
            for point in session.points() {
                self.surface.remove_marker(point.marker);
            }
            tracing::debug!("Removed session {} ({} live)", key, self.registry.len());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::ContactPoint;
    use crate::render::RecordingSurface;
    use crate::trail::SessionPhase;

    fn touch_engine() -> TrailEngine<RecordingSurface> {
        TrailEngine::new(
            TrailConfig::default(),
            DeviceCapabilities::touchscreen(),
            RecordingSurface::new(),
        )
        .unwrap()
    }

    fn desktop_engine() -> TrailEngine<RecordingSurface> {
        TrailEngine::new(
            TrailConfig::default(),
            DeviceCapabilities::desktop(),
            RecordingSurface::new(),
        )
        .unwrap()
    }

    fn tick(timestamp_ms: f64) -> FrameTick {
        FrameTick::new(timestamp_ms, 0)
    }

    fn contact(id: i32) -> SessionKey {
        SessionKey::Contact(id)
    }

    #[test]
    fn test_rejects_invalid_config() {
        let config = TrailConfig {
            point_count: 0,
            ..TrailConfig::default()
        };
        let result = TrailEngine::new(config, DeviceCapabilities::desktop(), RecordingSurface::new());
        assert!(result.is_err());
    }

    #[test]
    fn test_start_session_creates_tapered_points() {
        let mut engine = touch_engine();
        engine.start_session(contact(1), Point::new(10.0, 20.0));

        let session = engine.session(contact(1)).unwrap();
        assert_eq!(session.points().len(), 6);
        assert_eq!(session.eased().len(), 6);
        for (i, point) in session.points().iter().enumerate() {
            assert_eq!(point.size, 8.0 - i as f64);
            assert!((point.opacity - (0.6 - i as f64 * 0.1)).abs() < 1e-9);
            assert_eq!(point.position, Point::new(10.0, 20.0));
        }

        let markers = engine.surface().markers_for(contact(1));
        assert_eq!(markers.len(), 6);
        assert!(markers.iter().all(|m| m.opacity > 0.0));
    }

    #[test]
    fn test_double_start_is_ignored() {
        let mut engine = touch_engine();
        engine.start_session(contact(1), Point::new(0.0, 0.0));
        engine.start_session(contact(1), Point::new(50.0, 50.0));

        assert_eq!(engine.session_count(), 1);
        assert_eq!(engine.surface().created(), 6);
        assert_eq!(engine.session(contact(1)).unwrap().target(), Point::ZERO);
    }

    #[test]
    fn test_point_count_constant_while_live() {
        let mut engine = touch_engine();
        engine.start_session(contact(1), Point::ZERO);

        for frame in 1..=20 {
            engine.update_target(contact(1), Point::new(frame as f64 * 7.0, 3.0));
            engine.step_frame(tick(frame as f64 * 16.0));
            assert_eq!(engine.session(contact(1)).unwrap().points().len(), 6);
            assert_eq!(engine.surface().markers_for(contact(1)).len(), 6);
        }
    }

    #[test]
    fn test_update_target_does_not_move_points() {
        let mut engine = touch_engine();
        engine.start_session(contact(1), Point::ZERO);
        engine.update_target(contact(1), Point::new(100.0, 100.0));

        let session = engine.session(contact(1)).unwrap();
        assert_eq!(session.target(), Point::new(100.0, 100.0));
        assert!(session.points().iter().all(|p| p.position == Point::ZERO));
    }

    #[test]
    fn test_update_unknown_session_is_noop() {
        let mut engine = touch_engine();
        engine.start_session(contact(1), Point::new(5.0, 5.0));
        let before = engine.session(contact(1)).cloned();

        engine.update_target(contact(99), Point::new(500.0, 500.0));

        assert_eq!(engine.session_count(), 1);
        assert_eq!(engine.session(contact(1)).cloned(), before);
        assert!(engine.session(contact(99)).is_none());
    }

    #[test]
    fn test_step_moves_toward_antecedent_without_overshoot() {
        let mut engine = touch_engine();
        engine.start_session(contact(1), Point::ZERO);
        engine.update_target(contact(1), Point::new(100.0, 40.0));
        // Spread the chain out first
        for frame in 1..=3 {
            engine.step_frame(tick(frame as f64 * 16.0));
        }

        let before: Vec<Point> = engine
            .session(contact(1))
            .unwrap()
            .points()
            .iter()
            .map(|p| p.position)
            .collect();
        engine.step_frame(tick(64.0));
        let session = engine.session(contact(1)).unwrap();

        let mut antecedent = session.target();
        for (i, point) in session.points().iter().enumerate() {
            let old_gap = before[i].distance(antecedent);
            let new_gap = point.position.distance(antecedent);
            assert!(
                new_gap < old_gap,
                "Point {} gap {} should shrink below {}",
                i,
                new_gap,
                old_gap
            );
            assert!(point.position.x <= antecedent.x && point.position.y <= antecedent.y);
            antecedent = point.position;
        }
    }

    #[test]
    fn test_head_converges_to_constant_target() {
        let mut engine = touch_engine();
        engine.start_session(contact(1), Point::ZERO);
        engine.update_target(contact(1), Point::new(100.0, 0.0));

        for frame in 1..=25 {
            engine.step_frame(tick(frame as f64 * 16.0));
        }

        let session = engine.session(contact(1)).unwrap();
        let head = session.head().unwrap().position;
        let tail = session.tail().unwrap().position;
        assert!(head.distance(Point::new(100.0, 0.0)) < 1.0, "Head at {:?}", head);
        // The tail is still catching up
        assert!(tail.x < head.x, "Tail {} should lag head {}", tail.x, head.x);
        assert!(head.x - tail.x > 0.0);
    }

    #[test]
    fn test_stationary_session_stays_put() {
        let mut engine = touch_engine();
        engine.start_session(contact(1), Point::new(100.0, 100.0));

        for frame in 1..=10 {
            engine.step_frame(tick(frame as f64 * 16.0));
        }

        let session = engine.session(contact(1)).unwrap();
        for point in session.points() {
            assert!(point.position.distance(Point::new(100.0, 100.0)) < 1.0);
        }
    }

    #[test]
    fn test_end_session_fades_then_removes() {
        let mut engine = touch_engine();
        engine.step_frame(tick(100.0));
        engine.start_session(contact(1), Point::new(10.0, 10.0));

        engine.end_session(contact(1));

        assert!(engine.is_ending(contact(1)));
        let session = engine.session(contact(1)).unwrap();
        assert_eq!(session.phase(), SessionPhase::Ending { remove_at_ms: 150.0 });
        assert!(session.points().iter().all(|p| p.opacity == 0.0));
        assert!(engine
            .surface()
            .markers_for(contact(1))
            .iter()
            .all(|m| m.opacity == 0.0));

        // Still inside the grace period
        engine.step_frame(tick(116.0));
        assert_eq!(engine.session_count(), 1);

        engine.step_frame(tick(150.0));
        assert!(engine.session(contact(1)).is_none());
        assert!(engine.surface().is_empty());
        assert_eq!(engine.surface().removed(), 6);
    }

    #[test]
    fn test_end_before_first_frame_keeps_grace_period() {
        let mut engine = touch_engine();
        engine.start_session(contact(1), Point::new(10.0, 10.0));
        engine.end_session(contact(1));

        // Host clocks start far from zero
        engine.step_frame(tick(5000.0));
        assert!(engine.is_ending(contact(1)));
        assert_eq!(engine.session(contact(1)).unwrap().remove_at_ms(), Some(5050.0));

        engine.step_frame(tick(5030.0));
        assert_eq!(engine.session_count(), 1);

        engine.step_frame(tick(5050.0));
        assert!(engine.session(contact(1)).is_none());
        assert!(engine.surface().is_empty());
    }

    #[test]
    fn test_end_unknown_or_ending_session_is_noop() {
        let mut engine = touch_engine();
        engine.end_session(contact(5));
        assert_eq!(engine.session_count(), 0);

        engine.step_frame(tick(0.0));
        engine.start_session(contact(5), Point::ZERO);
        engine.end_session(contact(5));
        engine.step_frame(tick(30.0));
        // A second end must not push the deadline back
        engine.end_session(contact(5));
        assert_eq!(engine.session(contact(5)).unwrap().remove_at_ms(), Some(50.0));
    }

    #[test]
    fn test_restart_while_fading_replaces_session() {
        let mut engine = touch_engine();
        engine.start_session(contact(1), Point::ZERO);
        engine.end_session(contact(1));

        engine.start_session(contact(1), Point::new(30.0, 30.0));

        assert!(!engine.is_ending(contact(1)));
        assert_eq!(engine.session_count(), 1);
        assert_eq!(engine.surface().len(), 6);
        assert_eq!(engine.surface().removed(), 6);
        assert_eq!(
            engine.session(contact(1)).unwrap().target(),
            Point::new(30.0, 30.0)
        );
    }

    #[test]
    fn test_cancel_all_with_various_counts() {
        for count in [0, 1, 3] {
            let mut engine = touch_engine();
            for id in 0..count {
                engine.start_session(contact(id), Point::new(id as f64 * 10.0, 0.0));
            }
            if count > 0 {
                engine.end_session(contact(0));
            }

            engine.cancel_all();

            assert_eq!(engine.session_count(), 0, "{} sessions should be cleared", count);
            assert!(engine.surface().is_empty());
            assert_eq!(engine.surface().removed(), count as usize * 6);
        }
    }

    #[test]
    fn test_sessions_are_independent() {
        let mut engine = touch_engine();
        engine.start_session(contact(1), Point::new(0.0, 0.0));
        engine.start_session(contact(2), Point::new(300.0, 300.0));
        let b_before = engine.session(contact(2)).cloned();

        engine.update_target(contact(1), Point::new(50.0, 80.0));
        engine.end_session(contact(1));
        assert_eq!(engine.session(contact(2)).cloned(), b_before);

        engine.step_frame(tick(16.0));
        let b = engine.session(contact(2)).unwrap();
        assert!(b.points().iter().all(|p| p.position == Point::new(300.0, 300.0)));
        assert!(b.points().iter().all(|p| p.opacity > 0.0));
    }

    #[test]
    fn test_contact_events_drive_sessions() {
        let mut engine = touch_engine();
        engine.handle(&InputEvent::ContactStart {
            contacts: vec![ContactPoint::new(1, 0.0, 0.0)],
        });
        engine.handle(&InputEvent::ContactStart {
            contacts: vec![ContactPoint::new(1, 5.0, 5.0), ContactPoint::new(2, 50.0, 50.0)],
        });
        assert_eq!(engine.session_count(), 2);

        engine.handle(&InputEvent::ContactMove {
            contacts: vec![ContactPoint::new(1, 20.0, 20.0), ContactPoint::new(2, 60.0, 60.0)],
        });
        assert_eq!(engine.session(contact(1)).unwrap().target(), Point::new(20.0, 20.0));
        assert_eq!(engine.session(contact(2)).unwrap().target(), Point::new(60.0, 60.0));

        // Contact 1 lifted, contact 2 stays
        engine.handle(&InputEvent::ContactEnd {
            remaining: vec![ContactPoint::new(2, 60.0, 60.0)],
        });
        assert!(engine.is_ending(contact(1)));
        assert!(!engine.is_ending(contact(2)));

        engine.handle(&InputEvent::ContactCancel);
        assert_eq!(engine.session_count(), 0);
    }

    #[test]
    fn test_touch_mode_drops_pointer_events() {
        let mut engine = touch_engine();
        engine.handle(&InputEvent::PointerMove { x: 10.0, y: 10.0 });
        engine.handle(&InputEvent::PointerEnter);

        assert!(engine.session(SessionKey::Pointer).is_none());
        assert!(engine.surface().is_empty());
    }

    #[test]
    fn test_pointer_trail_lifecycle() {
        let mut engine = desktop_engine();
        engine.handle(&InputEvent::ContactStart {
            contacts: vec![ContactPoint::new(1, 0.0, 0.0)],
        });
        assert_eq!(engine.session_count(), 0);

        engine.handle(&InputEvent::PointerMove { x: 10.0, y: 10.0 });
        engine.handle(&InputEvent::PointerMove { x: 90.0, y: 10.0 });
        let session = engine.session(SessionKey::Pointer).unwrap();
        assert_eq!(session.target(), Point::new(90.0, 10.0));
        assert!(session.points().iter().all(|p| p.position == Point::new(10.0, 10.0)));

        engine.handle(&InputEvent::PointerLeave);
        assert!(engine
            .surface()
            .markers_for(SessionKey::Pointer)
            .iter()
            .all(|m| m.opacity == 0.0));

        // Dots keep chasing while hidden
        engine.step_frame(tick(16.0));
        let head = engine.session(SessionKey::Pointer).unwrap().head().unwrap();
        assert!(head.position.x > 10.0);
        assert_eq!(head.opacity, 0.0);

        engine.handle(&InputEvent::PointerEnter);
        let markers = engine.surface().markers_for(SessionKey::Pointer);
        assert!((markers[0].opacity - 0.6).abs() < 1e-9);
        assert!((markers[5].opacity - 0.1).abs() < 1e-9);
        assert_eq!(engine.session_count(), 1);
    }

    #[test]
    fn test_disabled_mode_ignores_everything() {
        let mut engine = TrailEngine::new(
            TrailConfig::default(),
            DeviceCapabilities::default(),
            RecordingSurface::new(),
        )
        .unwrap();
        assert_eq!(engine.mode(), DeviceMode::Disabled);

        engine.handle(&InputEvent::PointerMove { x: 1.0, y: 1.0 });
        engine.handle(&InputEvent::ContactStart {
            contacts: vec![ContactPoint::new(1, 0.0, 0.0)],
        });
        assert_eq!(engine.session_count(), 0);
    }
}
