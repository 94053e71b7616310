//! Areawatch: geofence membership and transition engine
//!
//! Location fixes → LocationSmoother → GeofenceEvaluator → transition events

pub mod core;
pub mod error;
pub mod types;

pub use error::{GeofenceError, Result};

// =============================================================================
// GEODESY [C]
// =============================================================================

/// Mean Earth radius used by the haversine formula (meters)
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Area radii are stored in feet; distances are computed in meters
pub const FEET_TO_METERS: f64 = 0.3048;

// =============================================================================
// SMOOTHING [C]
// =============================================================================

/// Number of most recent fixes kept in the smoothing window
pub const HISTORY_CAPACITY: usize = 10;

/// Fixes required before the weighted average replaces the raw fix
pub const SMOOTHING_MIN_SAMPLES: usize = 3;

/// Accuracy assumed when a fix reports none (meters); also the weight floor
pub const DEFAULT_ACCURACY_M: f64 = 1.0;

// =============================================================================
// AREA DEFAULTS
// =============================================================================

/// Radius offered for newly drawn areas (feet)
pub const DEFAULT_RADIUS_FEET: f64 = 50.0;

/// Fill color for areas created without one
pub const DEFAULT_AREA_COLOR: &str = "#FF4444";

/// Page size for area listings
pub const DEFAULT_PAGE_LIMIT: usize = 100;

// =============================================================================
// VERSION
// =============================================================================

pub const VERSION: &str = "1.0.0";
