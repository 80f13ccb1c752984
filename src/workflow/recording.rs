//! Recording File Format
//!
//! JSON representation of one gaze recording. The sample arrays use the
//! same flat keys as the analysis service payload (`timestamps`,
//! `x_positions`, `y_positions`, `pupil_sizes`, ...), so payloads captured
//! from that service load directly.

use crate::signal::series::{GazeSeries, SessionInfo, DEFAULT_SAMPLING_RATE_HZ};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use uuid::Uuid;

/// Current recording format version
pub const CURRENT_FORMAT_VERSION: &str = "1.0";

fn default_sampling_rate() -> f64 {
    DEFAULT_SAMPLING_RATE_HZ
}

/// Recording metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordingMetadata {
    /// Unique recording ID
    pub id: Uuid,
    /// When the file was created
    pub created_at: DateTime<Utc>,
    /// Producer of the samples ("tracker", "synthetic:normal", ...)
    pub source: Option<String>,
    /// Version of the recording format
    pub format_version: String,
}

impl RecordingMetadata {
    pub fn new(source: Option<String>) -> Self {
        Self {
            source,
            ..Default::default()
        }
    }
}

impl Default for RecordingMetadata {
    fn default() -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            source: None,
            format_version: CURRENT_FORMAT_VERSION.to_string(),
        }
    }
}

/// One gaze recording as stored on disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recording {
    #[serde(default)]
    pub metadata: RecordingMetadata,
    /// Sample times (ms)
    pub timestamps: Vec<f64>,
    pub x_positions: Vec<f64>,
    pub y_positions: Vec<f64>,
    /// Pupil diameters; `null` entries are missing samples
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pupil_sizes: Option<Vec<Option<f64>>>,
    /// Sampling rate (Hz)
    #[serde(default = "default_sampling_rate")]
    pub sampling_rate: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_type: Option<String>,
}

impl Recording {
    /// Capture a series (and its session metadata) for storage
    pub fn from_series(series: &GazeSeries, source: Option<String>) -> Self {
        let session = series.session();
        Self {
            metadata: RecordingMetadata::new(source),
            timestamps: series.timestamps().to_vec(),
            x_positions: series.x().to_vec(),
            y_positions: series.y().to_vec(),
            pupil_sizes: series.pupil().map(|p| {
                p.iter()
                    .map(|v| if v.is_finite() { Some(*v) } else { None })
                    .collect()
            }),
            sampling_rate: session.sampling_rate_hz,
            subject_id: session.subject_id.clone(),
            session_id: session.session_id.clone(),
            task_type: session.task_type.clone(),
        }
    }

    /// Build a validated series.
    ///
    /// Fails with [`crate::Error::Validation`] when the arrays don't describe a
    /// valid series or the sampling rate isn't a positive number.
    pub fn to_series(&self) -> crate::Result<GazeSeries> {
        if !(self.sampling_rate.is_finite() && self.sampling_rate > 0.0) {
            return Err(crate::Error::Validation(format!(
                "sampling_rate must be a positive number (got {})",
                self.sampling_rate
            )));
        }

        let pupil = self.pupil_sizes.as_ref().map(|p| {
            p.iter()
                .map(|v| v.unwrap_or(f64::NAN))
                .collect::<Vec<f64>>()
        });

        let series = GazeSeries::new(
            self.timestamps.clone(),
            self.x_positions.clone(),
            self.y_positions.clone(),
            pupil,
        )?;

        Ok(series.with_session(SessionInfo {
            subject_id: self.subject_id.clone(),
            session_id: self.session_id.clone(),
            task_type: self.task_type.clone(),
            sampling_rate_hz: self.sampling_rate,
        }))
    }

    /// Save recording to a file
    pub fn save(&self, path: &Path) -> crate::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load recording from a file.
    ///
    /// Logs a warning if the recording was saved with a different format
    /// version, but still attempts to deserialize it.
    pub fn load(path: &Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let recording: Recording = serde_json::from_str(&content)?;
        if recording.metadata.format_version != CURRENT_FORMAT_VERSION {
            tracing::warn!(
                path = %path.display(),
                found = %recording.metadata.format_version,
                expected = CURRENT_FORMAT_VERSION,
                "Recording has different format version; some fields may use default values"
            );
        }
        Ok(recording)
    }

    /// Load a file and build its series in one step
    pub fn load_series(path: &Path) -> crate::Result<GazeSeries> {
        Self::load(path)?.to_series()
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }
}
