//! Location fixes and coordinates

use serde::{Deserialize, Serialize};

use crate::error::{GeofenceError, Result};
use crate::DEFAULT_ACCURACY_M;

/// A latitude/longitude pair in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Both components finite and within [-90,90] / [-180,180]
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }

    /// Great-circle distance to another coordinate (meters)
    pub fn distance_to(&self, other: &Coordinate) -> f64 {
        crate::core::haversine_distance(self.lat, self.lng, other.lat, other.lng)
    }
}

/// A single reported location sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Fix {
    pub lat: f64,
    pub lng: f64,
    /// Radius of uncertainty in meters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<f64>,
}

impl Fix {
    pub fn new(lat: f64, lng: f64, accuracy: Option<f64>) -> Self {
        Self { lat, lng, accuracy }
    }

    /// Fix with no reported accuracy
    pub fn at(lat: f64, lng: f64) -> Self {
        Self::new(lat, lng, None)
    }

    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.lat, self.lng)
    }

    /// Reject non-finite or out-of-range positions and infinite accuracy
    pub fn validate(&self) -> Result<()> {
        if !self.coordinate().is_valid() {
            return Err(GeofenceError::InvalidFix {
                lat: self.lat,
                lng: self.lng,
            });
        }
        match self.accuracy {
            Some(a) if a.is_infinite() => Err(GeofenceError::InvalidAccuracy(a)),
            _ => Ok(()),
        }
    }

    /// Smoothing weight: 1 / max(accuracy, 1). Missing or zero accuracy weighs 1,
    /// infinite accuracy weighs 0.
    pub fn weight(&self) -> f64 {
        1.0 / self.effective_accuracy().max(DEFAULT_ACCURACY_M)
    }

    /// Reported accuracy, with missing, zero or NaN treated as the default
    pub fn effective_accuracy(&self) -> f64 {
        match self.accuracy {
            Some(a) if !a.is_nan() && a != 0.0 => a,
            _ => DEFAULT_ACCURACY_M,
        }
    }

    /// Parse `lat,lng[,accuracy]`
    pub fn parse(input: &str) -> Option<Self> {
        let mut parts = input.split(',').map(str::trim);
        let lat = parts.next()?.parse().ok()?;
        let lng = parts.next()?.parse().ok()?;
        let accuracy = match parts.next() {
            Some(s) if !s.is_empty() => Some(s.parse().ok()?),
            _ => None,
        };
        if parts.next().is_some() {
            return None;
        }
        Some(Self::new(lat, lng, accuracy))
    }
}

impl From<Fix> for Coordinate {
    fn from(fix: Fix) -> Self {
        fix.coordinate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rejects_out_of_range() {
        assert!(Fix::at(90.0, 180.0).validate().is_ok());
        assert!(Fix::at(-90.0, -180.0).validate().is_ok());
        assert_eq!(
            Fix::at(91.0, 0.0).validate(),
            Err(GeofenceError::InvalidFix { lat: 91.0, lng: 0.0 })
        );
        assert!(Fix::at(0.0, -180.5).validate().is_err());
        assert!(Fix::at(f64::NAN, 0.0).validate().is_err());
        assert!(Fix::at(0.0, f64::INFINITY).validate().is_err());
    }

    #[test]
    fn test_weight_clamps_small_accuracy() {
        assert_eq!(Fix::new(0.0, 0.0, None).weight(), 1.0);
        assert_eq!(Fix::new(0.0, 0.0, Some(0.0)).weight(), 1.0);
        assert_eq!(Fix::new(0.0, 0.0, Some(0.5)).weight(), 1.0);
        assert_eq!(Fix::new(0.0, 0.0, Some(4.0)).weight(), 0.25);
        assert_eq!(Fix::new(0.0, 0.0, Some(f64::NAN)).weight(), 1.0);
    }

    #[test]
    fn test_infinite_accuracy_has_no_weight_and_is_rejected() {
        let fix = Fix::new(33.0, -96.0, Some(f64::INFINITY));
        assert_eq!(fix.weight(), 0.0);
        assert_eq!(fix.effective_accuracy(), f64::INFINITY);
        assert_eq!(
            fix.validate(),
            Err(GeofenceError::InvalidAccuracy(f64::INFINITY))
        );
    }

    #[test]
    fn test_parse() {
        assert_eq!(Fix::parse("33.0, -96.0"), Some(Fix::at(33.0, -96.0)));
        assert_eq!(
            Fix::parse("33.0,-96.0,12.5"),
            Some(Fix::new(33.0, -96.0, Some(12.5)))
        );
        assert_eq!(Fix::parse("33.0"), None);
        assert_eq!(Fix::parse("a,b"), None);
        assert_eq!(Fix::parse("1,2,3,4"), None);
    }
}
