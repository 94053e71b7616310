//! Location smoothing over a bounded history window
//!
//! - Fewer than 3 fixes: raw fix passes through (improving accuracy)
//! - 3 or more: accuracy-weighted average over the last 10 fixes

use std::collections::VecDeque;

use tracing::{debug, warn};

use crate::error::{GeofenceError, Result};
use crate::types::{Fix, SmoothingPhase};
use crate::{DEFAULT_ACCURACY_M, HISTORY_CAPACITY, SMOOTHING_MIN_SAMPLES};

/// Accuracy-weighted location smoother
#[derive(Debug, Clone)]
pub struct LocationSmoother {
    history: VecDeque<Fix>,
}

impl Default for LocationSmoother {
    fn default() -> Self {
        Self::new()
    }
}

impl LocationSmoother {
    pub fn new() -> Self {
        Self {
            history: VecDeque::with_capacity(HISTORY_CAPACITY + 1),
        }
    }

    /// Add a fix and return the current position estimate
    ///
    /// Invalid fixes are rejected and leave the history unchanged.
    pub fn ingest(&mut self, fix: Fix) -> Result<Fix> {
        if let Err(e) = fix.validate() {
            warn!(lat = fix.lat, lng = fix.lng, error = %e, "rejected fix");
            return Err(e);
        }

        self.history.push_back(fix);
        while self.history.len() > HISTORY_CAPACITY {
            self.history.pop_front();
        }

        if self.history.len() < SMOOTHING_MIN_SAMPLES {
            debug!(samples = self.history.len(), "improving accuracy, using raw fix");
            return Ok(fix);
        }

        let averaged = weighted_average(self.history.iter())?;
        debug!(
            samples = self.history.len(),
            lat = averaged.lat,
            lng = averaged.lng,
            "smoothed position"
        );
        Ok(averaged)
    }

    /// Current phase given the history length
    pub fn phase(&self) -> SmoothingPhase {
        if self.history.len() < SMOOTHING_MIN_SAMPLES {
            SmoothingPhase::Improving
        } else {
            SmoothingPhase::Smoothed
        }
    }

    /// Fixes in the window (oldest first)
    pub fn history(&self) -> impl Iterator<Item = &Fix> {
        self.history.iter()
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    /// Forget all fixes
    pub fn clear(&mut self) {
        self.history.clear();
    }
}

/// Accuracy-weighted mean of the given fixes
///
/// The result carries the best (smallest) accuracy seen in the window.
pub fn weighted_average<'a, I>(fixes: I) -> Result<Fix>
where
    I: IntoIterator<Item = &'a Fix>,
{
    let mut total_weight = 0.0;
    let mut lat = 0.0;
    let mut lng = 0.0;
    let mut best_accuracy = f64::INFINITY;
    let mut count = 0usize;

    for fix in fixes {
        let w = fix.weight();
        total_weight += w;
        lat += fix.lat * w;
        lng += fix.lng * w;
        best_accuracy = best_accuracy.min(fix.effective_accuracy());
        count += 1;
    }

    if count == 0 {
        return Err(GeofenceError::EmptyHistory);
    }

    let accuracy = if best_accuracy.is_finite() {
        best_accuracy
    } else {
        DEFAULT_ACCURACY_M
    };

    Ok(Fix::new(lat / total_weight, lng / total_weight, Some(accuracy)))
}

// =============================================================================
// TESTS
// =============================================================================
