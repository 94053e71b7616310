//! Geofence evaluation: edge-triggered enter/exit detection
//!
//! For each active area: inside = distance(position, center) <= radius_ft * 0.3048.
//! An event fires only when that differs from the previous membership.
//! Inactive areas are skipped and keep their last known flag.

use tracing::{debug, info};

use crate::types::{Area, AreaCheck, Coordinate, Direction, Membership, TransitionEvent};

/// Result of one evaluation pass
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    /// Membership after this pass
    pub membership: Membership,
    /// Events fired, in area input order
    pub events: Vec<TransitionEvent>,
}

/// Stateless geofence evaluator
#[derive(Debug, Default, Clone, Copy)]
pub struct GeofenceEvaluator;

impl GeofenceEvaluator {
    pub fn new() -> Self {
        Self
    }

    /// Evaluate a position against areas, starting from `previous` membership
    pub fn evaluate(
        &self,
        position: Coordinate,
        areas: &[Area],
        previous: &Membership,
    ) -> Evaluation {
        let mut membership = previous.clone();
        let mut events = Vec::new();

        for area in areas.iter().filter(|a| a.is_active) {
            let distance = position.distance_to(&area.center);
            let inside = area.within(distance);
            debug!(area = %area.name, distance, inside, "evaluated area");

            if inside != previous.is_inside(&area.id) {
                let event = TransitionEvent {
                    area_id: area.id.clone(),
                    area_name: area.name.clone(),
                    direction: Direction::from_inside(inside),
                };
                info!(area = %area.name, direction = %event.direction, "area transition");
                events.push(event);
            }
            membership.set(area.id.clone(), inside);
        }

        Evaluation { membership, events }
    }

    /// Report inside/outside and distance for each active area, without state
    pub fn check(&self, position: Coordinate, areas: &[Area]) -> Vec<AreaCheck> {
        areas
            .iter()
            .filter(|a| a.is_active)
            .map(|area| {
                let distance = position.distance_to(&area.center);
                AreaCheck {
                    area_id: area.id.clone(),
                    is_inside: area.within(distance),
                    distance,
                }
            })
            .collect()
    }
}

// =============================================================================
// TESTS
// =============================================================================
