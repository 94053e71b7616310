//! Area definitions and per-area membership state
//!
//! An `Area` is immutable configuration. Whether a tracked device is inside
//! it lives in `Membership`, which is never persisted with the area.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{GeofenceError, Result};
use crate::types::Coordinate;
use crate::{DEFAULT_AREA_COLOR, DEFAULT_PAGE_LIMIT, DEFAULT_RADIUS_FEET, FEET_TO_METERS};

/// A circular geofence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Area {
    pub id: String,
    pub name: String,
    pub center: Coordinate,
    /// Radius in feet
    pub radius: f64,
    pub color: String,
    pub is_active: bool,
    pub created: DateTime<Utc>,
}

impl Area {
    /// Build an active area with a fresh id
    pub fn new(name: impl Into<String>, center: Coordinate, radius_feet: f64) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            center,
            radius: radius_feet,
            color: DEFAULT_AREA_COLOR.to_string(),
            is_active: true,
            created: Utc::now(),
        }
    }

    /// Override the generated id
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn radius_meters(&self) -> f64 {
        self.radius * FEET_TO_METERS
    }

    /// A distance from the center (meters) counts as inside up to and including the radius
    pub fn within(&self, distance_m: f64) -> bool {
        distance_m <= self.radius_meters()
    }

    pub fn contains(&self, position: &Coordinate) -> bool {
        self.within(position.distance_to(&self.center))
    }

    pub fn validate(&self) -> Result<()> {
        validate_fields(&self.name, &self.center, self.radius)
    }
}

pub(crate) fn validate_fields(name: &str, center: &Coordinate, radius: f64) -> Result<()> {
    if name.trim().is_empty() {
        return Err(GeofenceError::InvalidArea("name is required".to_string()));
    }
    if !center.is_valid() {
        return Err(GeofenceError::InvalidArea(format!(
            "invalid center coordinates ({}, {})",
            center.lat, center.lng
        )));
    }
    if !radius.is_finite() || radius <= 0.0 {
        return Err(GeofenceError::InvalidArea(format!(
            "radius must be positive, got {}",
            radius
        )));
    }
    Ok(())
}

/// Request to create an area
#[derive(Debug, Clone, Deserialize)]
pub struct NewArea {
    pub name: String,
    pub center: Coordinate,
    /// Feet; 50 when omitted
    #[serde(default = "default_radius")]
    pub radius: f64,
    #[serde(default)]
    pub color: Option<String>,
}

impl NewArea {
    pub fn into_area(self) -> Result<Area> {
        validate_fields(&self.name, &self.center, self.radius)?;
        let mut area = Area::new(self.name, self.center, self.radius);
        if let Some(color) = self.color.filter(|c| !c.is_empty()) {
            area.color = color;
        }
        Ok(area)
    }
}

/// Full replacement of an area's editable fields
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaUpdate {
    pub name: String,
    pub center: Coordinate,
    pub radius: f64,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

impl AreaUpdate {
    /// Apply onto an existing area; id and creation time are kept
    pub fn apply(self, area: &Area) -> Result<Area> {
        validate_fields(&self.name, &self.center, self.radius)?;
        Ok(Area {
            id: area.id.clone(),
            name: self.name,
            center: self.center,
            radius: self.radius,
            color: self
                .color
                .filter(|c| !c.is_empty())
                .unwrap_or_else(|| DEFAULT_AREA_COLOR.to_string()),
            is_active: self.is_active.unwrap_or(true),
            created: area.created,
        })
    }
}

/// Listing filter with pagination
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct AreaFilter {
    #[serde(default, rename = "active")]
    pub active_only: bool,
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default)]
    pub offset: usize,
}

fn default_radius() -> f64 {
    DEFAULT_RADIUS_FEET
}

fn default_limit() -> usize {
    DEFAULT_PAGE_LIMIT
}

impl Default for AreaFilter {
    fn default() -> Self {
        Self {
            active_only: false,
            limit: DEFAULT_PAGE_LIMIT,
            offset: 0,
        }
    }
}

/// One page of areas, newest first
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaPage {
    pub areas: Vec<Area>,
    pub total: usize,
    pub limit: usize,
    pub offset: usize,
    pub has_more: bool,
}

/// Inside/outside flag per area id
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Membership(BTreeMap<String, bool>);

impl Membership {
    pub fn new() -> Self {
        Self::default()
    }

    /// Unknown areas count as outside
    pub fn is_inside(&self, area_id: &str) -> bool {
        self.0.get(area_id).copied().unwrap_or(false)
    }

    pub fn set(&mut self, area_id: impl Into<String>, inside: bool) {
        self.0.insert(area_id.into(), inside);
    }

    /// Drop state for areas that no longer exist
    pub fn retain_areas(&mut self, areas: &[Area]) {
        self.0.retain(|id, _| areas.iter().any(|a| &a.id == id));
    }

    /// Ids currently flagged inside
    pub fn inside_ids(&self) -> Vec<String> {
        self.0
            .iter()
            .filter(|(_, inside)| **inside)
            .map(|(id, _)| id.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_area_defaults() {
        let area = Area::new("Home", Coordinate::new(33.0, -96.0), 50.0);
        assert!(area.is_active);
        assert_eq!(area.color, DEFAULT_AREA_COLOR);
        assert!(uuid::Uuid::parse_str(&area.id).is_ok());
        assert!((area.radius_meters() - 15.24).abs() < 1e-9);
        assert!(area.contains(&Coordinate::new(33.0, -96.0)));
        assert!(!area.contains(&Coordinate::new(33.001, -96.0)));
    }

    #[test]
    fn test_validation() {
        let center = Coordinate::new(33.0, -96.0);
        assert!(validate_fields("Home", &center, 50.0).is_ok());
        assert!(validate_fields("  ", &center, 50.0).is_err());
        assert!(validate_fields("Home", &center, 0.0).is_err());
        assert!(validate_fields("Home", &center, -1.0).is_err());
        assert!(validate_fields("Home", &Coordinate::new(95.0, 0.0), 50.0).is_err());
    }

    #[test]
    fn test_update_keeps_identity() {
        let area = Area::new("Home", Coordinate::new(33.0, -96.0), 50.0);
        let update = AreaUpdate {
            name: "Office".to_string(),
            center: Coordinate::new(33.1, -96.1),
            radius: 75.0,
            color: None,
            is_active: Some(false),
        };
        let updated = update.apply(&area).unwrap();
        assert_eq!(updated.id, area.id);
        assert_eq!(updated.created, area.created);
        assert_eq!(updated.name, "Office");
        assert!(!updated.is_active);
    }

    #[test]
    fn test_area_json_is_camel_case() {
        let area = Area::new("Home", Coordinate::new(33.0, -96.0), 50.0);
        let json = serde_json::to_string(&area).unwrap();
        assert!(json.contains("\"isActive\":true"));
        assert!(!json.contains("isInside"));
    }

    #[test]
    fn test_new_area_radius_defaults() {
        let req: NewArea =
            serde_json::from_str(r#"{"name":"Park","center":{"lat":33.0,"lng":-96.0}}"#).unwrap();
        let area = req.into_area().unwrap();
        assert_eq!(area.radius, DEFAULT_RADIUS_FEET);
    }

    #[test]
    fn test_membership_defaults_outside() {
        let mut membership = Membership::new();
        assert!(!membership.is_inside("a"));
        membership.set("a", true);
        membership.set("b", false);
        assert!(membership.is_inside("a"));
        assert_eq!(membership.inside_ids(), vec!["a".to_string()]);
    }
}
