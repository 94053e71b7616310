//! Transition events and stateless area checks

use serde::{Deserialize, Serialize};

/// Direction of a membership change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Entered,
    Exited,
}

impl Direction {
    pub fn from_inside(inside: bool) -> Self {
        if inside {
            Direction::Entered
        } else {
            Direction::Exited
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Entered => "entered",
            Direction::Exited => "exited",
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fired once per inside/outside flip of an active area
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionEvent {
    pub area_id: String,
    pub area_name: String,
    pub direction: Direction,
}

impl TransitionEvent {
    /// Short alert text, e.g. "entered Home"
    pub fn message(&self) -> String {
        format!("{} {}", self.direction, self.area_name)
    }
}

/// Result of checking one area without tracking state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaCheck {
    pub area_id: String,
    pub is_inside: bool,
    /// Distance from the position to the area center (meters)
    pub distance: f64,
}
