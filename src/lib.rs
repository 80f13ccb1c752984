//! # Gaze Screening
//!
//! Signal-processing and scoring pipeline that turns a raw gaze-tracking time series
//! into per-subject screening risk scores for four oculomotor patterns
//! (Parkinson's, Alzheimer's, ASD and ADHD).
//!
//! Outputs are screening heuristics, not diagnoses.
//!
//! ## Quick Start
//!
//! ```no_run
//! use gaze_screening::{Analyzer, GazeSeries, render_report};
//!
//! let timestamps: Vec<f64> = (0..1000).map(|i| i as f64).collect();
//! let x = vec![500.0; 1000];
//! let y = vec![400.0; 1000];
//! let series = GazeSeries::new(timestamps, x, y, None).expect("valid series");
//!
//! let analyzer = Analyzer::default();
//! let result = analyzer.analyze(&series, None);
//! println!("{}", render_report(&result));
//! ```
//!
//! ## Architecture
//!
//! - [`signal`]: the gaze series data model and trajectory denoising
//! - [`analysis`]: fixation/saccade segmentation and feature extraction
//! - [`scoring`]: rule tables, the hybrid risk scorer and the model collaborator seam
//! - [`report`]: orchestration, summary and the text report
//! - [`workflow`]: recording files and synthetic recordings
//! - [`app`]: CLI and configuration management
//!
//! ## Pipeline
//!
//! ```text
//! ┌─────────────┐    ┌─────────────┐    ┌─────────────┐    ┌─────────────┐
//! │ GazeSeries  │───▶│  Denoiser   │───▶│   Event     │───▶│  Feature    │
//! │   (raw)     │    │ (savgol)    │    │ Segmenter   │    │  Extractor  │
//! └─────────────┘    └─────────────┘    └─────────────┘    └─────────────┘
//!                                                                 │
//!                                                                 ▼
//!                    ┌─────────────┐    ┌─────────────┐    ┌─────────────┐
//!                    │   Report    │◀───│   Summary   │◀───│ RiskScorer  │
//!                    │  Builder    │    │             │    │    × 4      │
//!                    └─────────────┘    └─────────────┘    └─────────────┘
//! ```

pub mod signal;
pub mod analysis;
pub mod scoring;
pub mod report;
pub mod workflow;
pub mod app;

// Re-export commonly used types
pub use signal::series::GazeSeries;
pub use signal::denoise::DenoiseMethod;
pub use analysis::events::{EyeEvent, Fixation, Saccade};
pub use analysis::feature_extraction::{Feature, FeatureVector};
pub use scoring::model::ModelScorer;
pub use scoring::risk::{Condition, DetectionMethod, RiskAssessment, RiskLevel};
pub use report::analyzer::{AnalysisResult, Analyzer, Summary};
pub use report::text_report::render_report;
pub use workflow::recording::Recording;

/// Result type alias for the gaze screening pipeline
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the gaze screening pipeline
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Model error: {0}")]
    Model(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
