//! Configuration Management

use crate::analysis::event_segmentation::SegmentationConfig;
use crate::report::analyzer::Analyzer;
use crate::scoring::model::LinearModelScorer;
use crate::scoring::risk::Condition;
use crate::signal::denoise::DenoiseMethod;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

/// Main configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Denoising and segmentation settings
    #[serde(default)]
    pub preprocessing: PreprocessingConfig,
    /// Condition scoring settings
    #[serde(default)]
    pub scoring: ScoringConfig,
    /// Report output settings
    #[serde(default)]
    pub report: ReportConfig,
}

/// Preprocessing configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PreprocessingConfig {
    /// Smoothing applied before segmentation
    pub denoise: DenoiseMethod,
    /// Saccade velocity threshold (px/s)
    pub velocity_threshold: f64,
    /// Saccade |acceleration| threshold (px/s²)
    pub acceleration_threshold: f64,
    /// Shortest gap reported as a fixation (ms)
    pub fixation_min_duration_ms: f64,
}

/// Scoring configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScoringConfig {
    /// Blend model probabilities when a model file is configured
    pub use_model: bool,
    /// Linear model coefficients (JSON)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_path: Option<PathBuf>,
    /// Conditions analyzed when none are requested explicitly
    pub conditions: Vec<Condition>,
}

/// Report output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// Human-readable text report
    #[default]
    Text,
    /// Structured JSON result
    Json,
}

/// Report configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReportConfig {
    /// Default output format
    pub format: ReportFormat,
    /// Pretty-print JSON output
    pub pretty_json: bool,
}

impl Default for PreprocessingConfig {
    fn default() -> Self {
        let segmentation = SegmentationConfig::default();
        Self {
            denoise: DenoiseMethod::default(),
            velocity_threshold: segmentation.velocity_threshold,
            acceleration_threshold: segmentation.acceleration_threshold,
            fixation_min_duration_ms: segmentation.fixation_min_duration_ms,
        }
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            use_model: true,
            model_path: None,
            conditions: Condition::ALL.to_vec(),
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            format: ReportFormat::Text,
            pretty_json: true,
        }
    }
}

impl PreprocessingConfig {
    pub fn segmentation(&self) -> SegmentationConfig {
        SegmentationConfig {
            velocity_threshold: self.velocity_threshold,
            acceleration_threshold: self.acceleration_threshold,
            fixation_min_duration_ms: self.fixation_min_duration_ms,
        }
    }
}

impl Config {
    /// Validate config values are within acceptable ranges.
    /// Returns Ok(()) if valid, or Err with a description of the first invalid field.
    pub fn validate(&self) -> Result<(), crate::Error> {
        let p = &self.preprocessing;
        if !(p.velocity_threshold.is_finite() && p.velocity_threshold > 0.0) {
            return Err(crate::Error::Config(format!(
                "velocity_threshold must be > 0, got {}",
                p.velocity_threshold
            )));
        }
        if !(p.acceleration_threshold.is_finite() && p.acceleration_threshold > 0.0) {
            return Err(crate::Error::Config(format!(
                "acceleration_threshold must be > 0, got {}",
                p.acceleration_threshold
            )));
        }
        if !(p.fixation_min_duration_ms.is_finite() && p.fixation_min_duration_ms >= 0.0) {
            return Err(crate::Error::Config(format!(
                "fixation_min_duration_ms must be >= 0, got {}",
                p.fixation_min_duration_ms
            )));
        }
        if self.scoring.conditions.is_empty() {
            return Err(crate::Error::Config(
                "scoring.conditions must name at least one condition".to_string(),
            ));
        }
        if let Some(path) = &self.scoring.model_path {
            if path.as_os_str().is_empty() {
                return Err(crate::Error::Config("model_path must not be empty".to_string()));
            }
        }
        Ok(())
    }

    /// Build the analysis pipeline described by this config.
    ///
    /// Loads the model file when one is configured and enabled.
    pub fn build_analyzer(&self) -> Result<Analyzer, crate::Error> {
        let analyzer = Analyzer::new(self.preprocessing.denoise, self.preprocessing.segmentation());

        match (&self.scoring.model_path, self.scoring.use_model) {
            (Some(path), true) => {
                let model = LinearModelScorer::load(path)?;
                Ok(analyzer.with_model(Arc::new(model)))
            }
            _ => {
                tracing::debug!("No model configured; scoring with rules only");
                Ok(analyzer)
            }
        }
    }

    /// Load config from file
    pub fn load(path: &PathBuf) -> Result<Self, crate::Error> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content).map_err(|e| crate::Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load config from default location
    pub fn load_default() -> Result<Self, crate::Error> {
        let path = Self::default_path();
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save config to file
    pub fn save(&self, path: &PathBuf) -> Result<(), crate::Error> {
        let content = self.to_toml()?;

        // Create parent directories
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Save to default location
    pub fn save_default(&self) -> Result<(), crate::Error> {
        self.save(&Self::default_path())
    }

    /// Get default config path
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .map(|h| h.join(".gaze_screening").join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }

    /// Generate TOML representation
    pub fn to_toml(&self) -> Result<String, crate::Error> {
        toml::to_string_pretty(self).map_err(|e| crate::Error::Config(e.to_string()))
    }

    /// Parse and validate TOML text
    pub fn from_toml(content: &str) -> Result<Self, crate::Error> {
        let config: Self = toml::from_str(content).map_err(|e| crate::Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}

/// Simple TOML value lookup by dotted key
pub fn find_toml_value<'a>(toml_str: &'a str, key: &str) -> Option<&'a str> {
    let (section_name, leaf_key) = split_key(key)?;

    // Top-level keys live before the first section header
    let mut in_section = section_name.is_empty();

    for line in toml_str.lines() {
        let trimmed = line.trim();

        if let Some(section) = section_header(trimmed) {
            in_section = section == section_name;
            continue;
        }

        if in_section {
            if let Some(eq_pos) = trimmed.find('=') {
                if trimmed[..eq_pos].trim() == leaf_key {
                    return Some(trimmed[eq_pos + 1..].trim());
                }
            }
        }
    }

    None
}

/// Simple TOML value setter by dotted key.
///
/// Bare words are written as quoted strings; numbers, booleans, arrays and
/// already-quoted strings are written verbatim. A key missing from its
/// section is appended to that section. Returns false if the section
/// doesn't exist.
pub fn set_toml_value(toml_str: &mut String, key: &str, value: &str) -> bool {
    let Some((section_name, leaf_key)) = split_key(key) else {
        return false;
    };
    let entry = format!("{} = {}", leaf_key, toml_literal(value));

    let mut in_section = section_name.is_empty();
    let mut found = false;
    // Position just past the last non-blank line of the section
    let mut insert_at = in_section.then_some(0);
    let mut new_lines = Vec::new();

    for line in toml_str.lines() {
        let trimmed = line.trim();

        if let Some(section) = section_header(trimmed) {
            in_section = section == section_name;
        } else if in_section && !found {
            if let Some(eq_pos) = trimmed.find('=') {
                if trimmed[..eq_pos].trim() == leaf_key {
                    new_lines.push(entry.clone());
                    found = true;
                    continue;
                }
            }
        }

        new_lines.push(line.to_string());
        if in_section && !trimmed.is_empty() {
            insert_at = Some(new_lines.len());
        }
    }

    if !found {
        let Some(at) = insert_at else {
            return false;
        };
        new_lines.insert(at, entry);
    }

    *toml_str = new_lines.join("\n");
    // Ensure trailing newline
    if !toml_str.ends_with('\n') {
        toml_str.push('\n');
    }
    true
}

fn split_key(key: &str) -> Option<(&str, &str)> {
    match key.rsplit_once('.') {
        Some((section, leaf)) if !leaf.is_empty() => Some((section, leaf)),
        Some(_) => None,
        None if key.is_empty() => None,
        None => Some(("", key)),
    }
}

fn section_header(line: &str) -> Option<&str> {
    line.strip_prefix('[')?.strip_suffix(']')
}

fn toml_literal(value: &str) -> String {
    let v = value.trim();
    let verbatim = v == "true"
        || v == "false"
        || v.parse::<f64>().is_ok()
        || v.starts_with('[')
        || v.starts_with('"');
    if verbatim {
        v.to_string()
    } else {
        format!("\"{}\"", v.replace('\\', "\\\\").replace('"', "\\\""))
    }
}
