//! Analysis Orchestration
//!
//! Runs denoise → segment → extract → score for a requested set of
//! conditions and folds the per-condition assessments into a summary.

use crate::analysis::event_segmentation::{EventSegmenter, SegmentationConfig};
use crate::analysis::feature_extraction::{FeatureExtractor, FeatureVector, FEATURE_SCHEMA_VERSION};
use crate::scoring::model::ModelScorer;
use crate::scoring::risk::{Condition, RiskAssessment, RiskLevel};
use crate::scoring::scorer::RiskScorer;
use crate::signal::denoise::DenoiseMethod;
use crate::signal::series::{GazeSeries, SessionInfo};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::sync::Arc;

/// Cross-condition summary of one analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    /// First condition reaching the highest score; `None` when nothing was analyzed
    pub highest_risk_condition: Option<Condition>,
    pub highest_risk_score: f64,
    pub overall_risk_level: RiskLevel,
    /// Union of every condition's recommendations, first-seen order
    pub overall_recommendations: Vec<String>,
}

impl Summary {
    /// Fold assessments (in evaluation order) into a summary
    pub fn from_assessments(disease_analysis: &BTreeMap<Condition, RiskAssessment>) -> Self {
        let mut highest: Option<(Condition, f64)> = None;
        for (condition, assessment) in disease_analysis {
            match highest {
                Some((_, score)) if assessment.risk_score <= score => {}
                _ => highest = Some((*condition, assessment.risk_score)),
            }
        }

        let mut seen = HashSet::new();
        let overall_recommendations = disease_analysis
            .values()
            .flat_map(|a| a.recommendations.iter())
            .filter(|r| seen.insert(r.as_str()))
            .cloned()
            .collect();

        let highest_risk_score = highest.map(|(_, s)| s).unwrap_or(0.0);
        Self {
            highest_risk_condition: highest.map(|(c, _)| c),
            highest_risk_score,
            overall_risk_level: RiskLevel::from_score(highest_risk_score),
            overall_recommendations,
        }
    }
}

/// Structured result of one analysis call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    #[serde(flatten)]
    pub session: SessionInfo,
    pub sample_count: usize,
    pub duration_ms: f64,
    pub saccade_count: usize,
    pub fixation_count: usize,
    pub feature_schema_version: u32,
    pub features: FeatureVector,
    pub disease_analysis: BTreeMap<Condition, RiskAssessment>,
    pub summary: Summary,
}

/// End-to-end gaze screening pipeline
#[derive(Clone, Default)]
pub struct Analyzer {
    denoise: DenoiseMethod,
    segmenter: EventSegmenter,
    extractor: FeatureExtractor,
    model: Option<Arc<dyn ModelScorer>>,
}

impl fmt::Debug for Analyzer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Analyzer")
            .field("denoise", &self.denoise)
            .field("segmentation", &self.segmenter.config)
            .field("has_model", &self.model.is_some())
            .finish()
    }
}

impl Analyzer {
    pub fn new(denoise: DenoiseMethod, segmentation: SegmentationConfig) -> Self {
        Self {
            denoise,
            segmenter: EventSegmenter::with_config(segmentation),
            extractor: FeatureExtractor::new(),
            model: None,
        }
    }

    /// Blend rule scores with `model` for every condition it has been trained on
    pub fn with_model(mut self, model: Arc<dyn ModelScorer>) -> Self {
        self.model = Some(model);
        self
    }

    pub fn denoise_method(&self) -> DenoiseMethod {
        self.denoise
    }

    /// Denoise, segment and extract features without scoring
    pub fn extract_features(&self, series: &GazeSeries) -> (FeatureVector, usize, usize) {
        let segmented = self.segmenter.process(series, self.denoise);
        let features = self.extractor.extract(&segmented.events, series);
        (features, segmented.saccade_count(), segmented.fixation_count())
    }

    /// Run the full pipeline.
    ///
    /// `conditions` defaults to all four; the subset is always evaluated in
    /// the fixed condition order and duplicates are ignored.
    pub fn analyze(&self, series: &GazeSeries, conditions: Option<&[Condition]>) -> AnalysisResult {
        let selected = match conditions {
            Some(requested) => Condition::normalize(requested),
            None => Condition::ALL.to_vec(),
        };

        let (features, saccade_count, fixation_count) = self.extract_features(series);

        let model = self.model.as_deref();
        let disease_analysis: BTreeMap<Condition, RiskAssessment> = selected
            .iter()
            .map(|&c| (c, RiskScorer::new(c).assess(&features, model)))
            .collect();

        let summary = Summary::from_assessments(&disease_analysis);

        tracing::info!(
            samples = series.sample_count(),
            saccades = saccade_count,
            fixations = fixation_count,
            highest = ?summary.highest_risk_condition,
            score = summary.highest_risk_score,
            "Analysis complete"
        );

        AnalysisResult {
            session: series.session().clone(),
            sample_count: series.sample_count(),
            duration_ms: series.duration_ms(),
            saccade_count,
            fixation_count,
            feature_schema_version: FEATURE_SCHEMA_VERSION,
            features,
            disease_analysis,
            summary,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::risk::DetectionMethod;

    fn assessment(score: f64, recommendations: &[&str]) -> RiskAssessment {
        RiskAssessment {
            risk_score: score,
            risk_level: RiskLevel::from_score(score),
            indicators: Vec::new(),
            recommendations: recommendations.iter().map(|s| s.to_string()).collect(),
            detection_method: DetectionMethod::RuleBased,
            rule_score: score,
            model_score: None,
        }
    }

    fn still_series() -> GazeSeries {
        let t: Vec<f64> = (0..500).map(|i| i as f64).collect();
        GazeSeries::new(t, vec![500.0; 500], vec![400.0; 500], None).unwrap()
    }

    struct ConstantModel;

    impl ModelScorer for ConstantModel {
        fn is_trained(&self, condition: Condition) -> bool {
            condition == Condition::Adhd
        }

        fn predict(&self, _condition: Condition, _features: &FeatureVector) -> Option<f64> {
            Some(1.0)
        }
    }

    #[test]
    fn test_summary_picks_first_maximum() {
        let mut analysis = BTreeMap::new();
        analysis.insert(Condition::Adhd, assessment(0.8, &[]));
        analysis.insert(Condition::Alzheimers, assessment(0.8, &[]));
        analysis.insert(Condition::Parkinsons, assessment(0.2, &[]));

        let summary = Summary::from_assessments(&analysis);
        assert_eq!(summary.highest_risk_condition, Some(Condition::Alzheimers));
        assert_eq!(summary.highest_risk_score, 0.8);
        assert_eq!(summary.overall_risk_level, RiskLevel::High);
    }

    #[test]
    fn test_summary_all_zero_still_names_a_condition() {
        let mut analysis = BTreeMap::new();
        analysis.insert(Condition::Asd, assessment(0.0, &[]));
        analysis.insert(Condition::Adhd, assessment(0.0, &[]));

        let summary = Summary::from_assessments(&analysis);
        assert_eq!(summary.highest_risk_condition, Some(Condition::Asd));
        assert_eq!(summary.overall_risk_level, RiskLevel::Low);
    }

    #[test]
    fn test_summary_dedups_recommendations() {
        let mut analysis = BTreeMap::new();
        analysis.insert(Condition::Parkinsons, assessment(0.6, &["a", "b"]));
        analysis.insert(Condition::Asd, assessment(0.6, &["b", "c"]));

        let summary = Summary::from_assessments(&analysis);
        assert_eq!(summary.overall_recommendations, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_empty_summary() {
        let summary = Summary::from_assessments(&BTreeMap::new());
        assert_eq!(summary.highest_risk_condition, None);
        assert_eq!(summary.highest_risk_score, 0.0);
        assert!(summary.overall_recommendations.is_empty());
    }

    #[test]
    fn test_default_runs_all_conditions() {
        let result = Analyzer::default().analyze(&still_series(), None);
        assert_eq!(
            result.disease_analysis.keys().copied().collect::<Vec<_>>(),
            Condition::ALL.to_vec()
        );
        assert_eq!(result.sample_count, 500);
        assert_eq!(result.saccade_count, 0);
        assert_eq!(result.fixation_count, 1);
    }

    #[test]
    fn test_subset_is_ordered_and_deduplicated() {
        let requested = [Condition::Adhd, Condition::Parkinsons, Condition::Adhd];
        let result = Analyzer::default().analyze(&still_series(), Some(&requested));
        assert_eq!(
            result.disease_analysis.keys().copied().collect::<Vec<_>>(),
            vec![Condition::Parkinsons, Condition::Adhd]
        );
    }

    #[test]
    fn test_empty_selection() {
        let result = Analyzer::default().analyze(&still_series(), Some(&[]));
        assert!(result.disease_analysis.is_empty());
        assert_eq!(result.summary.highest_risk_condition, None);
        assert_eq!(result.summary.highest_risk_score, 0.0);
    }

    #[test]
    fn test_model_is_used_only_where_trained() {
        let analyzer = Analyzer::default().with_model(Arc::new(ConstantModel));
        let result = analyzer.analyze(&still_series(), None);

        assert_eq!(
            result.disease_analysis[&Condition::Adhd].detection_method,
            DetectionMethod::Hybrid
        );
        assert_eq!(
            result.disease_analysis[&Condition::Asd].detection_method,
            DetectionMethod::RuleBased
        );
    }

    #[test]
    fn test_analyzer_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Analyzer>();
    }

    #[test]
    fn test_result_serializes_condition_keys() {
        let result = Analyzer::default().analyze(&still_series(), Some(&[Condition::Asd]));
        let json = serde_json::to_value(&result).unwrap();
        assert!(json["disease_analysis"]["asd"]["risk_score"].is_number());
        assert_eq!(json["summary"]["highest_risk_condition"], "asd");
        assert_eq!(json["features"]["x_mean"], 500.0);
    }
}
