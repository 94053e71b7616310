//! Tracker: one tracked device's smoother + membership
//!
//! Each fix: validate → smooth → evaluate against the current areas.

use tracing::{debug, info};

use crate::core::{GeofenceEvaluator, LocationSmoother};
use crate::error::Result;
use crate::types::{Area, Fix, Membership, SmoothingPhase, TrackOutput};
use crate::DEFAULT_ACCURACY_M;

/// Per-device tracking state
#[derive(Debug, Clone, Default)]
pub struct Tracker {
    smoother: LocationSmoother,
    evaluator: GeofenceEvaluator,
    membership: Membership,
    /// Last position estimate
    position: Option<Fix>,
    /// Number of accepted fixes
    update_count: u64,
}

impl Tracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ingest a fix and evaluate the resulting position against `areas`
    pub fn ingest(&mut self, fix: Fix, areas: &[Area]) -> Result<TrackOutput> {
        let position = self.smoother.ingest(fix)?;
        self.update_count += 1;
        Ok(self.apply(position, areas))
    }

    /// Replace history with a manually placed, high-accuracy fix
    pub fn pin(&mut self, fix: Fix, areas: &[Area]) -> Result<TrackOutput> {
        fix.validate()?;
        let pinned = Fix::new(fix.lat, fix.lng, Some(DEFAULT_ACCURACY_M));
        info!(lat = pinned.lat, lng = pinned.lng, "location pinned manually");
        self.smoother.clear();
        self.ingest(pinned, areas)
    }

    fn apply(&mut self, position: Fix, areas: &[Area]) -> TrackOutput {
        let eval = self
            .evaluator
            .evaluate(position.coordinate(), areas, &self.membership);
        self.membership = eval.membership;
        self.membership.retain_areas(areas);
        self.position = Some(position);

        debug!(
            samples = self.smoother.len(),
            events = eval.events.len(),
            "tracker updated"
        );

        TrackOutput::new(
            position,
            self.smoother.phase(),
            self.smoother.len(),
            eval.events,
            self.membership.inside_ids(),
        )
    }

    /// Latest position estimate, if any fix was accepted
    pub fn position(&self) -> Option<Fix> {
        self.position
    }

    pub fn phase(&self) -> SmoothingPhase {
        self.smoother.phase()
    }

    pub fn sample_count(&self) -> usize {
        self.smoother.len()
    }

    pub fn membership(&self) -> &Membership {
        &self.membership
    }

    pub fn update_count(&self) -> u64 {
        self.update_count
    }

    /// Reset to a fresh tracker
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GeofenceError;
    use crate::types::{Coordinate, Direction};

    fn home() -> Area {
        Area::new("Home", Coordinate::new(33.0, -96.0), 50.0).with_id("home")
    }

    #[test]
    fn test_first_fix_enters() {
        let mut tracker = Tracker::new();
        let out = tracker.ingest(Fix::at(33.0, -96.0), &[home()]).unwrap();
        assert_eq!(out.phase, SmoothingPhase::Improving);
        assert_eq!(out.sample_count, 1);
        assert_eq!(out.events.len(), 1);
        assert_eq!(out.events[0].direction, Direction::Entered);
        assert_eq!(out.inside, vec!["home".to_string()]);
    }

    #[test]
    fn test_rejected_fix_changes_nothing() {
        let mut tracker = Tracker::new();
        tracker.ingest(Fix::at(33.0, -96.0), &[home()]).unwrap();
        let err = tracker.ingest(Fix::at(120.0, -96.0), &[home()]).unwrap_err();
        assert!(matches!(err, GeofenceError::InvalidFix { .. }));
        assert_eq!(tracker.sample_count(), 1);
        assert_eq!(tracker.update_count(), 1);
        assert!(tracker.membership().is_inside("home"));
    }

    #[test]
    fn test_pin_restarts_history() {
        let mut tracker = Tracker::new();
        for _ in 0..5 {
            tracker.ingest(Fix::new(34.0, -97.0, Some(30.0)), &[home()]).unwrap();
        }
        assert_eq!(tracker.phase(), SmoothingPhase::Smoothed);

        let out = tracker.pin(Fix::at(33.0, -96.0), &[home()]).unwrap();
        assert_eq!(out.sample_count, 1);
        assert_eq!(out.position.accuracy, Some(1.0));
        assert_eq!(out.events.len(), 1);
    }

    #[test]
    fn test_deleted_area_state_is_dropped() {
        let mut tracker = Tracker::new();
        tracker.ingest(Fix::at(33.0, -96.0), &[home()]).unwrap();
        tracker.ingest(Fix::at(33.0, -96.0), &[]).unwrap();
        assert!(tracker.membership().is_empty());

        tracker.reset();
        assert_eq!(tracker.update_count(), 0);
        assert!(tracker.position().is_none());
    }
}
