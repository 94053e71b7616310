//! Smoothing phase definitions

use serde::{Deserialize, Serialize};

/// Whether positions are raw fixes or the weighted history average
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SmoothingPhase {
    /// Fewer than the minimum samples; raw fixes pass through
    Improving,
    /// Accuracy-weighted average over the history window
    Smoothed,
}

impl SmoothingPhase {
    /// Get ANSI color code for terminal display
    pub fn color_code(&self) -> &'static str {
        match self {
            SmoothingPhase::Improving => "\x1b[33m", // Yellow
            SmoothingPhase::Smoothed => "\x1b[32m",  // Green
        }
    }

    /// Reset ANSI color
    pub fn color_reset() -> &'static str {
        "\x1b[0m"
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            SmoothingPhase::Improving => "📡",
            SmoothingPhase::Smoothed => "📍",
        }
    }
}

impl std::fmt::Display for SmoothingPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SmoothingPhase::Improving => "IMPROVING",
            SmoothingPhase::Smoothed => "SMOOTHED",
        };
        write!(f, "{}", name)
    }
}
