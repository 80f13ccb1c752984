//! Eye Movement Events
//!
//! Fixations and saccades produced by one segmentation run, as a flat
//! tagged sequence ordered by start time.

use serde::{Deserialize, Serialize};

/// A period of relatively stable gaze position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Fixation {
    pub start_time_ms: f64,
    pub end_time_ms: f64,
    pub duration_ms: f64,
    /// Mean gaze position over the fixation
    pub start_x: f64,
    pub start_y: f64,
}

/// A rapid gaze shift between two positions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Saccade {
    pub start_time_ms: f64,
    pub end_time_ms: f64,
    pub duration_ms: f64,
    pub start_x: f64,
    pub start_y: f64,
    pub end_x: f64,
    pub end_y: f64,
    /// Euclidean distance between start and end positions
    pub amplitude: f64,
    /// Highest sample velocity inside the saccade (px/s)
    pub peak_velocity: f64,
}

impl Saccade {
    /// Build a saccade between two samples; amplitude is derived from the endpoints.
    pub fn between(
        start: (f64, f64, f64),
        end: (f64, f64, f64),
        peak_velocity: f64,
    ) -> Self {
        let (start_time_ms, start_x, start_y) = start;
        let (end_time_ms, end_x, end_y) = end;
        let dx = end_x - start_x;
        let dy = end_y - start_y;
        Self {
            start_time_ms,
            end_time_ms,
            duration_ms: end_time_ms - start_time_ms,
            start_x,
            start_y,
            end_x,
            end_y,
            amplitude: (dx * dx + dy * dy).sqrt(),
            peak_velocity,
        }
    }
}

/// Segmented eye movement event
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EyeEvent {
    Fixation(Fixation),
    Saccade(Saccade),
}

impl EyeEvent {
    pub fn start_time_ms(&self) -> f64 {
        match self {
            EyeEvent::Fixation(f) => f.start_time_ms,
            EyeEvent::Saccade(s) => s.start_time_ms,
        }
    }

    pub fn end_time_ms(&self) -> f64 {
        match self {
            EyeEvent::Fixation(f) => f.end_time_ms,
            EyeEvent::Saccade(s) => s.end_time_ms,
        }
    }

    pub fn duration_ms(&self) -> f64 {
        match self {
            EyeEvent::Fixation(f) => f.duration_ms,
            EyeEvent::Saccade(s) => s.duration_ms,
        }
    }

    pub fn as_fixation(&self) -> Option<&Fixation> {
        match self {
            EyeEvent::Fixation(f) => Some(f),
            EyeEvent::Saccade(_) => None,
        }
    }

    pub fn as_saccade(&self) -> Option<&Saccade> {
        match self {
            EyeEvent::Saccade(s) => Some(s),
            EyeEvent::Fixation(_) => None,
        }
    }
}
