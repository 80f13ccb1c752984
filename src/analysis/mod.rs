//! Eye movement analysis
//!
//! This module turns a gaze series into events and features:
//! - Velocity/acceleration threshold segmentation into fixations and saccades
//! - Fixed-schema feature extraction over events and the raw trajectory

pub mod events;
pub mod stats;
pub mod event_segmentation;
pub mod feature_extraction;

pub use events::{EyeEvent, Fixation, Saccade};
pub use event_segmentation::{EventSegmenter, SegmentationConfig, SegmentedSeries};
pub use feature_extraction::{Feature, FeatureExtractor, FeatureVector, FEATURE_SCHEMA_VERSION};
