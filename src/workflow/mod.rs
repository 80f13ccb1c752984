//! Workflow Module
//!
//! Recording files and synthetic recordings feeding the analysis pipeline.

pub mod recording;
pub mod synthetic;

pub use recording::{Recording, RecordingMetadata};
pub use synthetic::{SyntheticConfig, SyntheticGenerator, SyntheticProfile};
