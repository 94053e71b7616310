//! Error types for the geofence engine and area store

use thiserror::Error;

/// Errors raised by smoothing, evaluation and area storage
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeofenceError {
    /// Latitude/longitude non-finite or outside the valid range
    #[error("Invalid fix: lat={lat}, lng={lng}")]
    InvalidFix { lat: f64, lng: f64 },

    /// Reported accuracy is infinite
    #[error("Invalid accuracy: {0}")]
    InvalidAccuracy(f64),

    /// Weighted average requested over an empty history
    #[error("Location history is empty")]
    EmptyHistory,

    /// Area definition failed validation
    #[error("Invalid area: {0}")]
    InvalidArea(String),

    /// No area with the given id
    #[error("Area not found: {0}")]
    AreaNotFound(String),

    /// Backing store could not be read or written
    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<std::io::Error> for GeofenceError {
    fn from(err: std::io::Error) -> Self {
        GeofenceError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for GeofenceError {
    fn from(err: serde_json::Error) -> Self {
        GeofenceError::Storage(err.to_string())
    }
}

/// Result type for geofence operations
pub type Result<T> = std::result::Result<T, GeofenceError>;
