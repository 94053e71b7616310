//! Output structures for terminal display and the API

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{Fix, SmoothingPhase, TransitionEvent};

/// Output for each ingested fix
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackOutput {
    pub timestamp: DateTime<Utc>,
    /// Smoothed (or raw, while improving) position
    pub position: Fix,
    pub phase: SmoothingPhase,
    /// Fixes currently in the history window
    pub sample_count: usize,
    /// Transitions fired by this fix
    pub events: Vec<TransitionEvent>,
    /// Ids of areas the position is inside
    pub inside: Vec<String>,
}

impl TrackOutput {
    pub fn new(
        position: Fix,
        phase: SmoothingPhase,
        sample_count: usize,
        events: Vec<TransitionEvent>,
        inside: Vec<String>,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            position,
            phase,
            sample_count,
            events,
            inside,
        }
    }

    fn accuracy_label(&self) -> String {
        match self.position.accuracy {
            Some(a) => format!("±{:.0}m", a),
            None => "±?m".to_string(),
        }
    }

    /// Format for terminal display (with colors)
    pub fn to_terminal_string(&self) -> String {
        let color = self.phase.color_code();
        let reset = SmoothingPhase::color_reset();

        let mut out = format!(
            "{}{} {:.6},{:.6} {} | {} ({} readings) | inside={}{}",
            color,
            self.phase.emoji(),
            self.position.lat,
            self.position.lng,
            self.accuracy_label(),
            self.phase,
            self.sample_count,
            self.inside.len(),
            reset
        );
        for event in &self.events {
            let event_color = match event.direction {
                crate::types::Direction::Entered => "\x1b[36m",
                crate::types::Direction::Exited => "\x1b[31m",
            };
            out.push_str(&format!("\n{}  ⚑ {}{}", event_color, event.message(), reset));
        }
        out
    }

    /// Format for parseable output (no colors)
    pub fn to_parseable_string(&self) -> String {
        let events: Vec<String> = self
            .events
            .iter()
            .map(|e| format!("{}:{}", e.direction, e.area_name))
            .collect();
        format!(
            "lat={:.6} | lng={:.6} | accuracy={} | phase={} | samples={} | events=[{}]",
            self.position.lat,
            self.position.lng,
            self.position
                .accuracy
                .map(|a| format!("{:.1}", a))
                .unwrap_or_else(|| "-".to_string()),
            self.phase,
            self.sample_count,
            events.join(",")
        )
    }
}
