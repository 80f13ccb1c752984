//! Velocity/Acceleration Event Segmentation
//!
//! Classifies every sample of a (denoised) gaze series as saccadic or not,
//! turns contiguous saccadic runs into saccades, and fills the gaps between
//! them with fixations.
//!
//! Gaps shorter than the minimum fixation duration produce no event, so some
//! time between saccades is intentionally left unaccounted for.

use super::events::{EyeEvent, Fixation, Saccade};
use crate::signal::denoise::{denoise, DenoiseMethod};
use crate::signal::series::GazeSeries;
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Segmentation thresholds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SegmentationConfig {
    /// Velocity above which a sample is saccadic (px/s)
    pub velocity_threshold: f64,
    /// |Acceleration| above which a sample is saccadic (px/s²)
    pub acceleration_threshold: f64,
    /// Shortest gap that counts as a fixation (ms)
    pub fixation_min_duration_ms: f64,
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            velocity_threshold: 30.0,
            acceleration_threshold: 8000.0,
            fixation_min_duration_ms: 100.0,
        }
    }
}

/// A series together with the events segmented from it
#[derive(Debug, Clone)]
pub struct SegmentedSeries {
    /// The series the events were detected on (denoised)
    pub series: GazeSeries,
    /// Fixations and saccades ordered by start time
    pub events: Vec<EyeEvent>,
}

impl SegmentedSeries {
    pub fn saccade_count(&self) -> usize {
        self.events.iter().filter(|e| e.as_saccade().is_some()).count()
    }

    pub fn fixation_count(&self) -> usize {
        self.events.iter().filter(|e| e.as_fixation().is_some()).count()
    }
}

/// Fixation/saccade segmentation engine
#[derive(Debug, Clone, Default)]
pub struct EventSegmenter {
    pub config: SegmentationConfig,
}

impl EventSegmenter {
    /// Create with default thresholds
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: SegmentationConfig) -> Self {
        Self { config }
    }

    /// Denoise, then segment
    pub fn process(&self, raw: &GazeSeries, method: DenoiseMethod) -> SegmentedSeries {
        let series = denoise(raw, method);
        let events = self.segment(&series);
        SegmentedSeries { series, events }
    }

    /// Segment a series into fixations and saccades ordered by start time
    pub fn segment(&self, series: &GazeSeries) -> Vec<EyeEvent> {
        let saccades = self.detect_saccades(series);
        let fixations = self.detect_fixations(series, &saccades);

        tracing::debug!(
            samples = series.sample_count(),
            saccades = saccades.len(),
            fixations = fixations.len(),
            "Segmented gaze series"
        );

        let mut events: Vec<EyeEvent> = saccades
            .into_iter()
            .map(EyeEvent::Saccade)
            .chain(fixations.into_iter().map(EyeEvent::Fixation))
            .collect();

        // Stable: a saccade and fixation with equal start keep saccade-first order
        events.sort_by(|a, b| {
            a.start_time_ms()
                .partial_cmp(&b.start_time_ms())
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        events
    }

    /// Whether sample `i` is moving fast enough to be part of a saccade
    fn is_saccadic(&self, velocity: f64, acceleration: f64) -> bool {
        velocity > self.config.velocity_threshold
            || acceleration.abs() > self.config.acceleration_threshold
    }

    /// Run-length encode saccadic samples into saccades.
    ///
    /// Single-sample runs are dropped. A run still open at the final sample
    /// is never closed and produces no saccade.
    fn detect_saccades(&self, series: &GazeSeries) -> Vec<Saccade> {
        let velocity = series.velocity();
        let acceleration = series.acceleration();
        let timestamps = series.timestamps();

        let mut saccades = Vec::new();
        let mut run_start: Option<usize> = None;

        for i in 0..series.sample_count() {
            let saccadic = self.is_saccadic(velocity[i], acceleration[i]);

            match (saccadic, run_start) {
                (true, None) => run_start = Some(i),
                (false, Some(start)) => {
                    let end = i - 1;
                    if end > start {
                        let (sx, sy) = series.position(start);
                        let (ex, ey) = series.position(end);
                        let peak_velocity = velocity[start..=end].iter().cloned().fold(0.0, f64::max);
                        saccades.push(Saccade::between(
                            (timestamps[start], sx, sy),
                            (timestamps[end], ex, ey),
                            peak_velocity,
                        ));
                    }
                    run_start = None;
                }
                _ => {}
            }
        }

        saccades
    }

    /// Fill the gaps around saccades with fixations
    fn detect_fixations(&self, series: &GazeSeries, saccades: &[Saccade]) -> Vec<Fixation> {
        let timestamps = series.timestamps();
        let (Some(&first), Some(&last)) = (timestamps.first(), timestamps.last()) else {
            return vec![];
        };
        let min_duration = self.config.fixation_min_duration_ms;

        let (Some(first_saccade), Some(last_saccade)) = (saccades.first(), saccades.last()) else {
            // No saccades: the whole recording is one fixation if long enough
            if last - first >= min_duration {
                return self
                    .fixation_over(series, first, last, 0..series.sample_count())
                    .into_iter()
                    .collect();
            }
            return vec![];
        };

        let mut fixations = Vec::new();

        // Before the first saccade
        if first_saccade.start_time_ms - first >= min_duration {
            let inside = 0..samples_before(timestamps, first_saccade.start_time_ms);
            fixations.extend(self.fixation_over(series, first, first_saccade.start_time_ms, inside));
        }

        // Between consecutive saccades
        for pair in saccades.windows(2) {
            let (start, end) = (pair[0].end_time_ms, pair[1].start_time_ms);
            if end - start >= min_duration {
                let inside = samples_through(timestamps, start)..samples_before(timestamps, end);
                fixations.extend(self.fixation_over(series, start, end, inside));
            }
        }

        // After the last saccade
        if last - last_saccade.end_time_ms >= min_duration {
            let inside = samples_through(timestamps, last_saccade.end_time_ms)..timestamps.len();
            fixations.extend(self.fixation_over(series, last_saccade.end_time_ms, last, inside));
        }

        fixations
    }

    /// Fixation spanning `[start, end]` positioned at the mean of the samples in `inside`
    fn fixation_over(
        &self,
        series: &GazeSeries,
        start: f64,
        end: f64,
        inside: Range<usize>,
    ) -> Option<Fixation> {
        if inside.is_empty() {
            return None;
        }
        let count = inside.len() as f64;
        let mean_x = series.x()[inside.clone()].iter().sum::<f64>() / count;
        let mean_y = series.y()[inside].iter().sum::<f64>() / count;

        Some(Fixation {
            start_time_ms: start,
            end_time_ms: end,
            duration_ms: end - start,
            start_x: mean_x,
            start_y: mean_y,
        })
    }
}

/// Number of samples with timestamp strictly before `t`
fn samples_before(timestamps: &[f64], t: f64) -> usize {
    timestamps.partition_point(|&ts| ts < t)
}

/// Number of samples with timestamp at or before `t`
fn samples_through(timestamps: &[f64], t: f64) -> usize {
    timestamps.partition_point(|&ts| ts <= t)
}
