use crate::render::surface::{MarkerId, MarkerState, MarkerStyle, MarkerSurface};
use crate::trail::session::{SessionKey, TrailPoint};
use std::collections::BTreeMap;

/// In-memory surface that remembers the latest state of every marker
#[derive(Debug, Default)]
pub struct RecordingSurface {
    markers: BTreeMap<MarkerId, MarkerState>,
    styles: BTreeMap<MarkerId, MarkerStyle>,
    created: usize,
    removed: usize,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn marker(&self, id: MarkerId) -> Option<&MarkerState> {
        self.markers.get(&id)
    }

    pub fn style(&self, id: MarkerId) -> Option<&MarkerStyle> {
        self.styles.get(&id)
    }

    /// Markers belonging to one session, head first
    pub fn markers_for(&self, session: SessionKey) -> Vec<&MarkerState> {
        let mut markers: Vec<&MarkerState> = self
            .markers
            .values()
            .filter(|m| m.session == session)
            .collect();
        markers.sort_by_key(|m| m.index);
        markers
    }

    /// All live markers ordered by id
    pub fn snapshot(&self) -> Vec<MarkerState> {
        self.markers.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    /// Total markers ever created
    pub fn created(&self) -> usize {
        self.created
    }

    /// Total markers ever removed
    pub fn removed(&self) -> usize {
        self.removed
    }
}

impl MarkerSurface for RecordingSurface {
    fn create_marker(&mut self, session: SessionKey, point: &TrailPoint, style: &MarkerStyle) {
        self.markers
            .insert(point.marker, MarkerState::from_point(session, point));
        self.styles.insert(point.marker, style.clone());
        self.created += 1;
    }

    fn update_marker(&mut self, point: &TrailPoint) {
        if let Some(state) = self.markers.get_mut(&point.marker) {
            state.x = point.position.x;
            state.y = point.position.y;
            state.opacity = point.opacity;
        }
    }

    fn remove_marker(&mut self, marker: MarkerId) {
        self.styles.remove(&marker);
        if self.markers.remove(&marker).is_some() {
            self.removed += 1;
        }
    }
}
