//! Synthetic Gaze Recordings
//!
//! Seeded generator for demo and test data: gaze jitters around a current
//! point and occasionally jumps to a new one inside the screen box.

use crate::signal::series::{GazeSeries, SessionInfo};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

/// Gaze is kept inside this box after every jump (px)
const SCREEN_X: (f64, f64) = (100.0, 900.0);
const SCREEN_Y: (f64, f64) = (100.0, 700.0);
const START_POSITION: (f64, f64) = (500.0, 400.0);

/// Preset movement patterns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyntheticProfile {
    /// Frequent, medium jumps
    #[default]
    Baseline,
    /// About three jumps per second
    Normal,
    /// Rare, small jumps with steady gaze
    Parkinsonian,
    /// Frequent, large jumps with noisier gaze
    Hyperactive,
}

impl SyntheticProfile {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyntheticProfile::Baseline => "baseline",
            SyntheticProfile::Normal => "normal",
            SyntheticProfile::Parkinsonian => "parkinsonian",
            SyntheticProfile::Hyperactive => "hyperactive",
        }
    }
}

impl fmt::Display for SyntheticProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SyntheticProfile {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "baseline" => Ok(SyntheticProfile::Baseline),
            "normal" => Ok(SyntheticProfile::Normal),
            "parkinsonian" | "parkinsons" => Ok(SyntheticProfile::Parkinsonian),
            "hyperactive" | "adhd" => Ok(SyntheticProfile::Hyperactive),
            other => Err(crate::Error::Config(format!(
                "Unknown synthetic profile '{}'",
                other
            ))),
        }
    }
}

/// Generator parameters
#[derive(Debug, Clone, PartialEq)]
pub struct SyntheticConfig {
    pub duration_ms: f64,
    pub sampling_rate_hz: f64,
    /// Std of per-sample jitter around the current point (px)
    pub fixation_jitter: f64,
    /// Per-sample chance of jumping
    pub saccade_probability: f64,
    /// Std of a jump along each axis (px)
    pub saccade_spread: f64,
    /// Emit a pupil channel
    pub with_pupil: bool,
    pub pupil_amplitude: f64,
    pub pupil_period_ms: f64,
    pub pupil_noise: f64,
    pub seed: u64,
}

impl SyntheticConfig {
    pub fn for_profile(profile: SyntheticProfile) -> Self {
        let base = Self {
            duration_ms: 5000.0,
            sampling_rate_hz: 1000.0,
            fixation_jitter: 2.0,
            saccade_probability: 0.01,
            saccade_spread: 50.0,
            with_pupil: true,
            pupil_amplitude: 0.5,
            pupil_period_ms: 1000.0,
            pupil_noise: 0.1,
            seed: 42,
        };
        match profile {
            SyntheticProfile::Baseline => base,
            SyntheticProfile::Normal => Self {
                saccade_probability: 0.003,
                saccade_spread: 80.0,
                pupil_amplitude: 0.3,
                pupil_noise: 0.08,
                ..base
            },
            SyntheticProfile::Parkinsonian => Self {
                fixation_jitter: 1.5,
                saccade_probability: 0.0015,
                saccade_spread: 30.0,
                pupil_amplitude: 0.2,
                pupil_noise: 0.05,
                ..base
            },
            SyntheticProfile::Hyperactive => Self {
                fixation_jitter: 3.0,
                saccade_probability: 0.005,
                saccade_spread: 100.0,
                pupil_amplitude: 0.4,
                pupil_period_ms: 500.0,
                pupil_noise: 0.12,
                ..base
            },
        }
    }
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self::for_profile(SyntheticProfile::Baseline)
    }
}

/// Seeded synthetic recording generator
pub struct SyntheticGenerator {
    config: SyntheticConfig,
    rng: StdRng,
}

impl SyntheticGenerator {
    pub fn new(config: SyntheticConfig) -> Self {
        let rng = StdRng::seed_from_u64(config.seed);
        Self { config, rng }
    }

    /// Zero-mean normal sample with standard deviation `std`
    fn normal(&mut self, std: f64) -> f64 {
        let z: f64 = self.rng.sample(StandardNormal);
        std * z
    }

    /// Evenly spaced timestamps over `[0, duration]`, both ends included
    fn timestamps(&self) -> Vec<f64> {
        let n = (self.config.duration_ms * self.config.sampling_rate_hz / 1000.0).max(0.0) as usize;
        match n {
            0 => Vec::new(),
            1 => vec![0.0],
            _ => {
                let step = self.config.duration_ms / (n - 1) as f64;
                (0..n).map(|i| i as f64 * step).collect()
            }
        }
    }

    /// Generate one recording
    pub fn generate(&mut self, session: SessionInfo) -> crate::Result<GazeSeries> {
        let timestamps = self.timestamps();
        let n = timestamps.len();
        let mut x = Vec::with_capacity(n);
        let mut y = Vec::with_capacity(n);

        let (mut current_x, mut current_y) = START_POSITION;
        for _ in 0..n {
            x.push(current_x + self.normal(self.config.fixation_jitter));
            y.push(current_y + self.normal(self.config.fixation_jitter));

            if self.rng.gen::<f64>() < self.config.saccade_probability {
                current_x = (current_x + self.normal(self.config.saccade_spread))
                    .clamp(SCREEN_X.0, SCREEN_X.1);
                current_y = (current_y + self.normal(self.config.saccade_spread))
                    .clamp(SCREEN_Y.0, SCREEN_Y.1);
            }
        }

        let pupil = if self.config.with_pupil {
            let mut values = Vec::with_capacity(n);
            for t in &timestamps {
                let wave = self.config.pupil_amplitude * (2.0 * PI * t / self.config.pupil_period_ms).sin();
                values.push(3.0 + wave + self.normal(self.config.pupil_noise));
            }
            Some(values)
        } else {
            None
        };

        let session = SessionInfo {
            sampling_rate_hz: self.config.sampling_rate_hz,
            ..session
        };
        Ok(GazeSeries::new(timestamps, x, y, pupil)?.with_session(session))
    }
}
