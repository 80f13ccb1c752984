//! Risk Assessment Types
//!
//! Conditions, risk levels and the per-condition assessment produced by
//! the risk scorer.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Screening target. Ordering is the fixed evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Condition {
    Parkinsons,
    Alzheimers,
    Asd,
    Adhd,
}

impl Condition {
    /// All conditions in evaluation order
    pub const ALL: [Condition; 4] = [
        Condition::Parkinsons,
        Condition::Alzheimers,
        Condition::Asd,
        Condition::Adhd,
    ];

    /// Lowercase key used in files and on the command line
    pub fn key(&self) -> &'static str {
        match self {
            Condition::Parkinsons => "parkinsons",
            Condition::Alzheimers => "alzheimers",
            Condition::Asd => "asd",
            Condition::Adhd => "adhd",
        }
    }

    /// Name shown in reports
    pub fn display_name(&self) -> &'static str {
        match self {
            Condition::Parkinsons => "Parkinsons",
            Condition::Alzheimers => "Alzheimers",
            Condition::Asd => "ASD",
            Condition::Adhd => "ADHD",
        }
    }

    /// Requested subset in evaluation order with duplicates removed
    pub fn normalize(requested: &[Condition]) -> Vec<Condition> {
        Condition::ALL
            .iter()
            .copied()
            .filter(|c| requested.contains(c))
            .collect()
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Condition {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        let key = s.trim().to_ascii_lowercase().replace(['\'', '_', '-', ' '], "");
        match key.as_str() {
            "parkinsons" | "parkinson" | "pd" => Ok(Condition::Parkinsons),
            "alzheimers" | "alzheimer" | "ad" => Ok(Condition::Alzheimers),
            "asd" | "autism" => Ok(Condition::Asd),
            "adhd" => Ok(Condition::Adhd),
            _ => Err(crate::Error::Config(format!(
                "Unknown condition '{}' (expected parkinsons, alzheimers, asd or adhd)",
                s
            ))),
        }
    }
}

/// Coarse risk bucket for a score
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
}

impl RiskLevel {
    /// `< 0.3` Low, `< 0.6` Moderate, otherwise High
    pub fn from_score(score: f64) -> Self {
        if score < 0.3 {
            RiskLevel::Low
        } else if score < 0.6 {
            RiskLevel::Moderate
        } else {
            RiskLevel::High
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Moderate => "Moderate",
            RiskLevel::High => "High",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a risk score was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DetectionMethod {
    #[serde(rename = "rule-based")]
    RuleBased,
    #[serde(rename = "hybrid")]
    Hybrid,
}

impl DetectionMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            DetectionMethod::RuleBased => "rule-based",
            DetectionMethod::Hybrid => "hybrid",
        }
    }
}

impl fmt::Display for DetectionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of scoring one condition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    /// Combined score in `[0, 1]`
    pub risk_score: f64,
    pub risk_level: RiskLevel,
    /// Indicator text of each triggered rule, in rule-table order
    pub indicators: Vec<String>,
    pub recommendations: Vec<String>,
    pub detection_method: DetectionMethod,
    /// Rule-only score before blending
    pub rule_score: f64,
    /// Model score, when a trained model was available
    pub model_score: Option<f64>,
}
