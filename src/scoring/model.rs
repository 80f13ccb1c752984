//! Learned Model Collaborator
//!
//! The risk scorer blends rule scores with an optional learned probability.
//! Models are injected through the [`ModelScorer`] trait; training happens
//! outside this crate.

use super::risk::Condition;
use crate::analysis::feature_extraction::{Feature, FeatureVector};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Source of per-condition model probabilities
pub trait ModelScorer: Send + Sync {
    /// Whether a trained model exists for `condition`
    fn is_trained(&self, condition: Condition) -> bool;

    /// Probability in `[0, 1]` that `features` show the condition's pattern.
    ///
    /// `None` when no prediction is available.
    fn predict(&self, condition: Condition, features: &FeatureVector) -> Option<f64>;
}

/// Standardized logistic-regression coefficients for one condition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    pub feature_names: Vec<String>,
    pub means: Vec<f64>,
    pub scales: Vec<f64>,
    pub weights: Vec<f64>,
    #[serde(default)]
    pub intercept: f64,
}

impl LinearModel {
    fn validate(&self, condition: Condition) -> crate::Result<Vec<Feature>> {
        let n = self.feature_names.len();
        if self.means.len() != n || self.scales.len() != n || self.weights.len() != n {
            return Err(crate::Error::Model(format!(
                "{}: feature_names, means, scales and weights must have the same length",
                condition.key()
            )));
        }
        if !self.intercept.is_finite()
            || self
                .means
                .iter()
                .chain(&self.scales)
                .chain(&self.weights)
                .any(|v| !v.is_finite())
        {
            return Err(crate::Error::Model(format!(
                "{}: coefficients must be finite numbers",
                condition.key()
            )));
        }
        self.feature_names
            .iter()
            .map(|name| {
                Feature::from_name(name).ok_or_else(|| {
                    crate::Error::Model(format!(
                        "{}: unknown feature '{}'",
                        condition.key(),
                        name
                    ))
                })
            })
            .collect()
    }
}

#[derive(Debug, Clone)]
struct ResolvedModel {
    features: Vec<Feature>,
    model: LinearModel,
}

impl ResolvedModel {
    fn predict(&self, features: &FeatureVector) -> f64 {
        let z = self
            .features
            .iter()
            .enumerate()
            .fold(self.model.intercept, |acc, (i, feature)| {
                let scale = if self.model.scales[i] > 0.0 {
                    self.model.scales[i]
                } else {
                    1.0
                };
                let standardized = (features.get(*feature) - self.model.means[i]) / scale;
                acc + self.model.weights[i] * standardized
            });
        sigmoid(z)
    }
}

/// Model file layout: condition key → coefficients
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LinearModelFile {
    #[serde(default)]
    pub models: BTreeMap<Condition, LinearModel>,
}

/// [`ModelScorer`] backed by per-condition linear models
#[derive(Debug, Clone, Default)]
pub struct LinearModelScorer {
    models: BTreeMap<Condition, ResolvedModel>,
}

impl LinearModelScorer {
    /// Build from coefficients, validating every model
    pub fn from_file(file: LinearModelFile) -> crate::Result<Self> {
        let mut models = BTreeMap::new();
        for (condition, model) in file.models {
            let features = model.validate(condition)?;
            models.insert(condition, ResolvedModel { features, model });
        }
        Ok(Self { models })
    }

    /// Load coefficients from a JSON file
    pub fn load(path: &Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let file: LinearModelFile = serde_json::from_str(&content)
            .map_err(|e| crate::Error::Model(format!("{}: {}", path.display(), e)))?;
        let scorer = Self::from_file(file)?;

        tracing::info!(
            path = %path.display(),
            conditions = scorer.models.len(),
            "Loaded model coefficients"
        );
        Ok(scorer)
    }

    /// Conditions with a trained model
    pub fn conditions(&self) -> impl Iterator<Item = Condition> + '_ {
        self.models.keys().copied()
    }
}

impl ModelScorer for LinearModelScorer {
    fn is_trained(&self, condition: Condition) -> bool {
        self.models.contains_key(&condition)
    }

    fn predict(&self, condition: Condition, features: &FeatureVector) -> Option<f64> {
        self.models.get(&condition).map(|m| m.predict(features))
    }
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}
