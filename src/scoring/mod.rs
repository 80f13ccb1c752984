//! Condition risk scoring
//!
//! Static per-condition rule tables, the hybrid rule/model scorer and the
//! seam for injecting a learned model.

pub mod risk;
pub mod rules;
pub mod model;
pub mod scorer;

pub use model::{LinearModelScorer, ModelScorer};
pub use risk::{Condition, DetectionMethod, RiskAssessment, RiskLevel};
pub use scorer::RiskScorer;
