//! Feature Extraction
//!
//! Reduces an event sequence plus the raw gaze series into a fixed-schema
//! vector of named features. Every feature in the schema is always present;
//! groups whose source data is missing (no saccades, no pupil channel, ...)
//! read as 0.0.

use super::events::{EyeEvent, Fixation, Saccade};
use super::stats::{max, mean, population_std, range};
use crate::signal::series::GazeSeries;
use serde::de::Deserializer;
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Version of the feature schema below. Bump when features are added or renamed.
pub const FEATURE_SCHEMA_VERSION: u32 = 2;

/// Source group of a feature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureGroup {
    Saccade,
    Fixation,
    Spatial,
    Pupil,
    Kinematic,
}

/// Named feature in the fixed schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Feature {
    SaccadeCount,
    SaccadeRate,
    MeanSaccadeAmplitude,
    StdSaccadeAmplitude,
    MeanSaccadeVelocity,
    StdSaccadeVelocity,
    MeanSaccadeDuration,
    StdSaccadeDuration,
    FixationCount,
    FixationRate,
    MeanFixationDuration,
    StdFixationDuration,
    TotalFixationTime,
    XRange,
    YRange,
    XStd,
    YStd,
    CoverageArea,
    XMean,
    YMean,
    TotalDistance,
    MeanPupilSize,
    StdPupilSize,
    PupilSizeVariability,
    MeanVelocity,
    StdVelocity,
    MaxVelocity,
    MeanAcceleration,
    StdAcceleration,
    MaxAcceleration,
}

impl Feature {
    pub const COUNT: usize = 30;

    /// Every feature, in schema order
    pub const ALL: [Feature; Feature::COUNT] = [
        Feature::SaccadeCount,
        Feature::SaccadeRate,
        Feature::MeanSaccadeAmplitude,
        Feature::StdSaccadeAmplitude,
        Feature::MeanSaccadeVelocity,
        Feature::StdSaccadeVelocity,
        Feature::MeanSaccadeDuration,
        Feature::StdSaccadeDuration,
        Feature::FixationCount,
        Feature::FixationRate,
        Feature::MeanFixationDuration,
        Feature::StdFixationDuration,
        Feature::TotalFixationTime,
        Feature::XRange,
        Feature::YRange,
        Feature::XStd,
        Feature::YStd,
        Feature::CoverageArea,
        Feature::XMean,
        Feature::YMean,
        Feature::TotalDistance,
        Feature::MeanPupilSize,
        Feature::StdPupilSize,
        Feature::PupilSizeVariability,
        Feature::MeanVelocity,
        Feature::StdVelocity,
        Feature::MaxVelocity,
        Feature::MeanAcceleration,
        Feature::StdAcceleration,
        Feature::MaxAcceleration,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Feature::SaccadeCount => "saccade_count",
            Feature::SaccadeRate => "saccade_rate",
            Feature::MeanSaccadeAmplitude => "mean_saccade_amplitude",
            Feature::StdSaccadeAmplitude => "std_saccade_amplitude",
            Feature::MeanSaccadeVelocity => "mean_saccade_velocity",
            Feature::StdSaccadeVelocity => "std_saccade_velocity",
            Feature::MeanSaccadeDuration => "mean_saccade_duration",
            Feature::StdSaccadeDuration => "std_saccade_duration",
            Feature::FixationCount => "fixation_count",
            Feature::FixationRate => "fixation_rate",
            Feature::MeanFixationDuration => "mean_fixation_duration",
            Feature::StdFixationDuration => "std_fixation_duration",
            Feature::TotalFixationTime => "total_fixation_time",
            Feature::XRange => "x_range",
            Feature::YRange => "y_range",
            Feature::XStd => "x_std",
            Feature::YStd => "y_std",
            Feature::CoverageArea => "coverage_area",
            Feature::XMean => "x_mean",
            Feature::YMean => "y_mean",
            Feature::TotalDistance => "total_distance",
            Feature::MeanPupilSize => "mean_pupil_size",
            Feature::StdPupilSize => "std_pupil_size",
            Feature::PupilSizeVariability => "pupil_size_variability",
            Feature::MeanVelocity => "mean_velocity",
            Feature::StdVelocity => "std_velocity",
            Feature::MaxVelocity => "max_velocity",
            Feature::MeanAcceleration => "mean_acceleration",
            Feature::StdAcceleration => "std_acceleration",
            Feature::MaxAcceleration => "max_acceleration",
        }
    }

    pub fn from_name(name: &str) -> Option<Feature> {
        Feature::ALL.iter().copied().find(|f| f.name() == name)
    }

    pub fn group(&self) -> FeatureGroup {
        use Feature::*;
        match self {
            SaccadeCount | SaccadeRate | MeanSaccadeAmplitude | StdSaccadeAmplitude
            | MeanSaccadeVelocity | StdSaccadeVelocity | MeanSaccadeDuration
            | StdSaccadeDuration => FeatureGroup::Saccade,
            FixationCount | FixationRate | MeanFixationDuration | StdFixationDuration
            | TotalFixationTime => FeatureGroup::Fixation,
            XRange | YRange | XStd | YStd | CoverageArea | XMean | YMean | TotalDistance => {
                FeatureGroup::Spatial
            }
            MeanPupilSize | StdPupilSize | PupilSizeVariability => FeatureGroup::Pupil,
            MeanVelocity | StdVelocity | MaxVelocity | MeanAcceleration | StdAcceleration
            | MaxAcceleration => FeatureGroup::Kinematic,
        }
    }

    fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Total mapping from every schema feature to a finite value
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector {
    values: [f64; Feature::COUNT],
}

impl Default for FeatureVector {
    fn default() -> Self {
        Self {
            values: [0.0; Feature::COUNT],
        }
    }
}

impl FeatureVector {
    /// All-zero vector
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from (name, value) pairs; unknown names are ignored, missing ones are 0.0
    pub fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, f64)>,
    {
        let mut vector = Self::new();
        for (name, value) in pairs {
            if let Some(feature) = Feature::from_name(name) {
                vector.set(feature, value);
            }
        }
        vector
    }

    pub fn get(&self, feature: Feature) -> f64 {
        self.values[feature.index()]
    }

    /// Lookup by name; names outside the schema read as 0.0
    pub fn get_by_name(&self, name: &str) -> f64 {
        Feature::from_name(name).map(|f| self.get(f)).unwrap_or(0.0)
    }

    /// Store a value. Non-finite values are stored as 0.0.
    pub fn set(&mut self, feature: Feature, value: f64) {
        self.values[feature.index()] = if value.is_finite() { value } else { 0.0 };
    }

    /// Features and values in schema order
    pub fn iter(&self) -> impl Iterator<Item = (Feature, f64)> + '_ {
        Feature::ALL.iter().map(move |f| (*f, self.get(*f)))
    }

    pub fn to_map(&self) -> BTreeMap<&'static str, f64> {
        self.iter().map(|(f, v)| (f.name(), v)).collect()
    }

    pub fn schema_version(&self) -> u32 {
        FEATURE_SCHEMA_VERSION
    }
}

impl Serialize for FeatureVector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(Feature::COUNT))?;
        for (feature, value) in self.iter() {
            map.serialize_entry(feature.name(), &value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for FeatureVector {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = BTreeMap::<String, f64>::deserialize(deserializer)?;
        Ok(FeatureVector::from_pairs(raw.iter().map(|(k, v)| (k.as_str(), *v))))
    }
}

/// Feature extractor over segmented events and the raw series
#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureExtractor;

impl FeatureExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extract every feature group
    pub fn extract(&self, events: &[EyeEvent], raw: &GazeSeries) -> FeatureVector {
        let mut features = FeatureVector::new();

        let saccades: Vec<&Saccade> = events.iter().filter_map(EyeEvent::as_saccade).collect();
        let fixations: Vec<&Fixation> = events.iter().filter_map(EyeEvent::as_fixation).collect();

        self.saccade_features(&saccades, &mut features);
        self.fixation_features(&fixations, &mut features);
        self.spatial_features(raw, &mut features);
        self.pupil_features(raw, &mut features);
        self.kinematic_features(raw, &mut features);

        features
    }

    fn saccade_features(&self, saccades: &[&Saccade], out: &mut FeatureVector) {
        let (Some(first), Some(last)) = (saccades.first(), saccades.last()) else {
            return;
        };

        let amplitudes: Vec<f64> = saccades.iter().map(|s| s.amplitude).collect();
        let velocities: Vec<f64> = saccades.iter().map(|s| s.peak_velocity).collect();
        let durations: Vec<f64> = saccades.iter().map(|s| s.duration_ms).collect();

        let span_s = (last.end_time_ms - first.start_time_ms) / 1000.0;

        out.set(Feature::SaccadeCount, saccades.len() as f64);
        out.set(Feature::SaccadeRate, rate(saccades.len(), span_s));
        out.set(Feature::MeanSaccadeAmplitude, mean(&amplitudes));
        out.set(Feature::StdSaccadeAmplitude, population_std(&amplitudes));
        out.set(Feature::MeanSaccadeVelocity, mean(&velocities));
        out.set(Feature::StdSaccadeVelocity, population_std(&velocities));
        out.set(Feature::MeanSaccadeDuration, mean(&durations));
        out.set(Feature::StdSaccadeDuration, population_std(&durations));
    }

    fn fixation_features(&self, fixations: &[&Fixation], out: &mut FeatureVector) {
        let (Some(first), Some(last)) = (fixations.first(), fixations.last()) else {
            return;
        };

        let durations: Vec<f64> = fixations.iter().map(|f| f.duration_ms).collect();
        let span_s = (last.end_time_ms - first.start_time_ms) / 1000.0;

        out.set(Feature::FixationCount, fixations.len() as f64);
        out.set(Feature::FixationRate, rate(fixations.len(), span_s));
        out.set(Feature::MeanFixationDuration, mean(&durations));
        out.set(Feature::StdFixationDuration, population_std(&durations));
        out.set(Feature::TotalFixationTime, durations.iter().sum());
    }

    fn spatial_features(&self, raw: &GazeSeries, out: &mut FeatureVector) {
        let (x, y) = (raw.x(), raw.y());
        let x_range = range(x);
        let y_range = range(y);

        let total_distance: f64 = x
            .windows(2)
            .zip(y.windows(2))
            .map(|(xw, yw)| {
                let dx = xw[1] - xw[0];
                let dy = yw[1] - yw[0];
                (dx * dx + dy * dy).sqrt()
            })
            .sum();

        out.set(Feature::XRange, x_range);
        out.set(Feature::YRange, y_range);
        out.set(Feature::XStd, population_std(x));
        out.set(Feature::YStd, population_std(y));
        // Bounding-box approximation of the visited area
        out.set(Feature::CoverageArea, x_range * y_range);
        out.set(Feature::XMean, mean(x));
        out.set(Feature::YMean, mean(y));
        out.set(Feature::TotalDistance, total_distance);
    }

    fn pupil_features(&self, raw: &GazeSeries, out: &mut FeatureVector) {
        let Some(pupil) = raw.pupil() else {
            return;
        };
        let valid: Vec<f64> = pupil.iter().copied().filter(|p| p.is_finite()).collect();
        if valid.is_empty() {
            return;
        }

        let pupil_mean = mean(&valid);
        let pupil_std = population_std(&valid);
        let variability = if pupil_mean > 0.0 { pupil_std / pupil_mean } else { 0.0 };

        out.set(Feature::MeanPupilSize, pupil_mean);
        out.set(Feature::StdPupilSize, pupil_std);
        out.set(Feature::PupilSizeVariability, variability);
    }

    fn kinematic_features(&self, raw: &GazeSeries, out: &mut FeatureVector) {
        let velocity = raw.velocity();
        let abs_acceleration: Vec<f64> = raw.acceleration().iter().map(|a| a.abs()).collect();

        out.set(Feature::MeanVelocity, mean(velocity));
        out.set(Feature::StdVelocity, population_std(velocity));
        out.set(Feature::MaxVelocity, max(velocity));
        out.set(Feature::MeanAcceleration, mean(&abs_acceleration));
        out.set(Feature::StdAcceleration, population_std(&abs_acceleration));
        out.set(Feature::MaxAcceleration, max(&abs_acceleration));
    }
}

/// Events per second over `span_s`; zero for a non-positive span
fn rate(count: usize, span_s: f64) -> f64 {
    if span_s > 0.0 {
        count as f64 / span_s
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn still_series(len: usize, pupil: Option<Vec<f64>>) -> GazeSeries {
        let t = (0..len).map(|i| i as f64).collect();
        GazeSeries::new(t, vec![10.0; len], vec![20.0; len], pupil).unwrap()
    }

    fn fixation(start: f64, end: f64) -> EyeEvent {
        EyeEvent::Fixation(Fixation {
            start_time_ms: start,
            end_time_ms: end,
            duration_ms: end - start,
            start_x: 0.0,
            start_y: 0.0,
        })
    }

    #[test]
    fn test_schema_is_consistent() {
        assert_eq!(Feature::ALL.len(), Feature::COUNT);
        for (i, feature) in Feature::ALL.iter().enumerate() {
            assert_eq!(feature.index(), i);
            assert_eq!(Feature::from_name(feature.name()), Some(*feature));
        }
    }

    #[test]
    fn test_no_events_gives_zero_event_features() {
        let series = still_series(10, None);
        let features = FeatureExtractor::new().extract(&[], &series);

        assert_eq!(features.get(Feature::SaccadeCount), 0.0);
        assert_eq!(features.get(Feature::SaccadeRate), 0.0);
        assert_eq!(features.get(Feature::FixationCount), 0.0);
        assert_eq!(features.get(Feature::MeanPupilSize), 0.0);
        assert_eq!(features.get(Feature::XMean), 10.0);
        assert!(features.iter().all(|(_, v)| v.is_finite()));
    }

    #[test]
    fn test_saccade_group() {
        let events = vec![
            EyeEvent::Saccade(Saccade::between((0.0, 0.0, 0.0), (20.0, 3.0, 4.0), 400.0)),
            fixation(20.0, 480.0),
            EyeEvent::Saccade(Saccade::between((480.0, 0.0, 0.0), (500.0, 6.0, 8.0), 600.0)),
        ];
        let features = FeatureExtractor::new().extract(&events, &still_series(600, None));

        assert_eq!(features.get(Feature::SaccadeCount), 2.0);
        // 2 saccades over 0.5 s
        assert!((features.get(Feature::SaccadeRate) - 4.0).abs() < 1e-9);
        assert_eq!(features.get(Feature::MeanSaccadeAmplitude), 7.5);
        assert_eq!(features.get(Feature::StdSaccadeAmplitude), 2.5);
        assert_eq!(features.get(Feature::MeanSaccadeVelocity), 500.0);
        assert_eq!(features.get(Feature::StdSaccadeVelocity), 100.0);
        assert_eq!(features.get(Feature::MeanSaccadeDuration), 20.0);
        assert_eq!(features.get(Feature::StdSaccadeDuration), 0.0);
    }

    #[test]
    fn test_fixation_group() {
        let events = vec![fixation(0.0, 200.0), fixation(300.0, 700.0)];
        let features = FeatureExtractor::new().extract(&events, &still_series(10, None));

        assert_eq!(features.get(Feature::FixationCount), 2.0);
        // 2 fixations over 0.7 s
        assert!((features.get(Feature::FixationRate) - 2.0 / 0.7).abs() < 1e-9);
        assert_eq!(features.get(Feature::MeanFixationDuration), 300.0);
        assert_eq!(features.get(Feature::StdFixationDuration), 100.0);
        assert_eq!(features.get(Feature::TotalFixationTime), 600.0);
    }

    #[test]
    fn test_zero_span_gives_zero_rate() {
        let events = vec![fixation(5.0, 5.0)];
        let features = FeatureExtractor::new().extract(&events, &still_series(10, None));
        assert_eq!(features.get(Feature::FixationCount), 1.0);
        assert_eq!(features.get(Feature::FixationRate), 0.0);
    }

    #[test]
    fn test_spatial_group() {
        let t = vec![0.0, 1.0, 2.0, 3.0];
        let x = vec![0.0, 30.0, 30.0, 0.0];
        let y = vec![0.0, 0.0, 40.0, 40.0];
        let series = GazeSeries::new(t, x, y, None).unwrap();
        let features = FeatureExtractor::new().extract(&[], &series);

        assert_eq!(features.get(Feature::XRange), 30.0);
        assert_eq!(features.get(Feature::YRange), 40.0);
        assert_eq!(features.get(Feature::CoverageArea), 1200.0);
        assert_eq!(features.get(Feature::XStd), 15.0);
        assert_eq!(features.get(Feature::YStd), 20.0);
        assert_eq!(features.get(Feature::XMean), 15.0);
        assert_eq!(features.get(Feature::TotalDistance), 100.0);
    }

    #[test]
    fn test_pupil_group_ignores_nan() {
        let pupil = vec![2.0, f64::NAN, 4.0, f64::NAN];
        let features = FeatureExtractor::new().extract(&[], &still_series(4, Some(pupil)));

        assert_eq!(features.get(Feature::MeanPupilSize), 3.0);
        assert_eq!(features.get(Feature::StdPupilSize), 1.0);
        assert!((features.get(Feature::PupilSizeVariability) - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_all_nan_pupil_is_zero() {
        let features = FeatureExtractor::new().extract(&[], &still_series(3, Some(vec![f64::NAN; 3])));
        assert_eq!(features.get(Feature::MeanPupilSize), 0.0);
        assert_eq!(features.get(Feature::PupilSizeVariability), 0.0);
    }

    #[test]
    fn test_kinematic_group_uses_absolute_acceleration() {
        // Velocities 0, 1000, 0 px/s => accelerations 0, +1e6, -1e6
        let series = GazeSeries::new(vec![0.0, 1.0, 2.0], vec![0.0, 1.0, 1.0], vec![0.0; 3], None).unwrap();
        let features = FeatureExtractor::new().extract(&[], &series);

        assert!((features.get(Feature::MaxVelocity) - 1000.0).abs() < 1e-6);
        assert!((features.get(Feature::MaxAcceleration) - 1e6).abs() < 1e-3);
        assert!((features.get(Feature::MeanAcceleration) - 2e6 / 3.0).abs() < 1e-3);
    }

    #[test]
    fn test_empty_series_is_all_zero() {
        let series = GazeSeries::new(vec![], vec![], vec![], None).unwrap();
        let features = FeatureExtractor::new().extract(&[], &series);
        assert!(features.iter().all(|(_, v)| v == 0.0));
    }

    #[test]
    fn test_unknown_name_reads_zero() {
        let features = FeatureVector::from_pairs([("saccade_rate", 2.5), ("not_a_feature", 9.0)]);
        assert_eq!(features.get_by_name("saccade_rate"), 2.5);
        assert_eq!(features.get_by_name("not_a_feature"), 0.0);
    }

    #[test]
    fn test_non_finite_values_are_stored_as_zero() {
        let mut features = FeatureVector::new();
        features.set(Feature::MaxVelocity, f64::INFINITY);
        assert_eq!(features.get(Feature::MaxVelocity), 0.0);
    }

    #[test]
    fn test_serialization_contains_every_name() {
        let json = serde_json::to_value(FeatureVector::new()).unwrap();
        let object = json.as_object().unwrap();
        assert_eq!(object.len(), Feature::COUNT);

        // Missing names deserialize as zero
        let partial: FeatureVector = serde_json::from_str(r#"{"x_std": 12.5}"#).unwrap();
        assert_eq!(partial.get(Feature::XStd), 12.5);
        assert_eq!(partial.get(Feature::YStd), 0.0);
    }
}
