//! Gaze Sample Series
//!
//! Immutable container for one gaze recording. Kinematics (velocity and
//! acceleration) are derived lazily on first access and cached; the sample
//! arrays themselves are never mutated after construction.

use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Default sampling rate when a recording doesn't state one (Hz)
pub const DEFAULT_SAMPLING_RATE_HZ: f64 = 1000.0;

/// Session metadata carried alongside the samples
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionInfo {
    pub subject_id: Option<String>,
    pub session_id: Option<String>,
    /// Task performed during the recording ("reading", "visual_search", ...)
    pub task_type: Option<String>,
    /// Nominal sampling rate (Hz)
    pub sampling_rate_hz: f64,
}

impl Default for SessionInfo {
    fn default() -> Self {
        Self {
            subject_id: None,
            session_id: None,
            task_type: None,
            sampling_rate_hz: DEFAULT_SAMPLING_RATE_HZ,
        }
    }
}

/// Per-sample kinematics derived from positions and timestamps
#[derive(Debug, Clone, PartialEq)]
pub struct Kinematics {
    /// Instantaneous velocity (px/s), zero at index 0
    pub velocity: Vec<f64>,
    /// Finite difference of velocity (px/s²), zero at index 0
    pub acceleration: Vec<f64>,
}

/// One recording of gaze samples
#[derive(Debug, Clone)]
pub struct GazeSeries {
    timestamps: Vec<f64>,
    x: Vec<f64>,
    y: Vec<f64>,
    pupil: Option<Vec<f64>>,
    session: SessionInfo,
    kinematics: OnceLock<Kinematics>,
}

impl GazeSeries {
    /// Build a series from parallel arrays.
    ///
    /// Fails with [`crate::Error::Validation`] if any array length differs from
    /// the timestamp count, if a timestamp or position is not finite, or if
    /// timestamps ever decrease. Missing pupil samples are represented as NaN.
    pub fn new(
        timestamps: Vec<f64>,
        x: Vec<f64>,
        y: Vec<f64>,
        pupil: Option<Vec<f64>>,
    ) -> crate::Result<Self> {
        let n = timestamps.len();
        if x.len() != n || y.len() != n {
            return Err(crate::Error::Validation(format!(
                "timestamps, x and y must have the same length (got {}, {}, {})",
                n,
                x.len(),
                y.len()
            )));
        }
        if let Some(p) = &pupil {
            if p.len() != n {
                return Err(crate::Error::Validation(format!(
                    "pupil diameters must have the same length as timestamps (got {}, expected {})",
                    p.len(),
                    n
                )));
            }
        }
        let non_finite = |v: &[f64]| v.iter().position(|s| !s.is_finite());
        for (channel, values) in [("timestamp", &timestamps), ("x", &x), ("y", &y)] {
            if let Some(i) = non_finite(values.as_slice()) {
                return Err(crate::Error::Validation(format!(
                    "{} at sample {} is not a finite number",
                    channel, i
                )));
            }
        }
        if let Some(i) = timestamps.windows(2).position(|w| w[1] < w[0]) {
            return Err(crate::Error::Validation(format!(
                "timestamps must be non-decreasing (sample {} at {} ms follows {} ms)",
                i + 1,
                timestamps[i + 1],
                timestamps[i]
            )));
        }

        Ok(Self {
            timestamps,
            x,
            y,
            pupil,
            session: SessionInfo::default(),
            kinematics: OnceLock::new(),
        })
    }

    /// Attach session metadata
    pub fn with_session(mut self, session: SessionInfo) -> Self {
        self.session = session;
        self
    }

    /// Same timestamps, pupil data and session with new positions.
    ///
    /// Used by the denoiser; `x` and `y` must match the sample count.
    pub(crate) fn with_positions(&self, x: Vec<f64>, y: Vec<f64>) -> Self {
        debug_assert_eq!(x.len(), self.timestamps.len());
        debug_assert_eq!(y.len(), self.timestamps.len());
        Self {
            timestamps: self.timestamps.clone(),
            x,
            y,
            pupil: self.pupil.clone(),
            session: self.session.clone(),
            kinematics: OnceLock::new(),
        }
    }

    pub fn timestamps(&self) -> &[f64] {
        &self.timestamps
    }

    pub fn x(&self) -> &[f64] {
        &self.x
    }

    pub fn y(&self) -> &[f64] {
        &self.y
    }

    pub fn pupil(&self) -> Option<&[f64]> {
        self.pupil.as_deref()
    }

    pub fn session(&self) -> &SessionInfo {
        &self.session
    }

    /// Number of samples
    pub fn sample_count(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// Last minus first timestamp (ms); zero for fewer than two samples
    pub fn duration_ms(&self) -> f64 {
        match (self.timestamps.first(), self.timestamps.last()) {
            (Some(first), Some(last)) => last - first,
            _ => 0.0,
        }
    }

    /// Position of sample `i`
    pub fn position(&self, i: usize) -> (f64, f64) {
        (self.x[i], self.y[i])
    }

    /// Instantaneous velocity per sample (px/s)
    pub fn velocity(&self) -> &[f64] {
        &self.kinematics().velocity
    }

    /// Instantaneous acceleration per sample (px/s²)
    pub fn acceleration(&self) -> &[f64] {
        &self.kinematics().acceleration
    }

    fn kinematics(&self) -> &Kinematics {
        self.kinematics.get_or_init(|| self.compute_kinematics())
    }

    fn compute_kinematics(&self) -> Kinematics {
        let n = self.timestamps.len();
        let mut velocity = vec![0.0; n];
        let mut acceleration = vec![0.0; n];

        for i in 1..n {
            let dt_s = (self.timestamps[i] - self.timestamps[i - 1]) / 1000.0;
            if dt_s <= 0.0 {
                continue;
            }
            let dx = self.x[i] - self.x[i - 1];
            let dy = self.y[i] - self.y[i - 1];
            velocity[i] = (dx * dx + dy * dy).sqrt() / dt_s;
            acceleration[i] = (velocity[i] - velocity[i - 1]) / dt_s;
        }

        Kinematics {
            velocity,
            acceleration,
        }
    }
}

impl PartialEq for GazeSeries {
    fn eq(&self, other: &Self) -> bool {
        self.timestamps == other.timestamps
            && self.x == other.x
            && self.y == other.y
            && self.pupil == other.pupil
            && self.session == other.session
    }
}
