//! Gaze signal data model and preprocessing
//!
//! - [`series`]: immutable gaze sample series with lazily derived kinematics
//! - [`denoise`]: Savitzky-Golay / median smoothing of x/y trajectories

pub mod series;
pub mod denoise;

pub use series::{GazeSeries, SessionInfo};
pub use denoise::{denoise, DenoiseMethod};
