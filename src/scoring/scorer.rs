//! Hybrid Risk Scorer
//!
//! Scores one condition from a feature vector: a rule score from the
//! condition's static table, optionally blended with a learned probability.

use super::model::ModelScorer;
use super::risk::{Condition, DetectionMethod, RiskAssessment, RiskLevel};
use super::rules::{profile, ConditionProfile};
use crate::analysis::feature_extraction::FeatureVector;

/// Weight of the model probability in a hybrid score
pub const MODEL_WEIGHT: f64 = 0.7;
/// Weight of the rule score in a hybrid score
pub const RULE_WEIGHT: f64 = 0.3;

/// Score at which "consider assessment" is recommended
pub const CONSIDER_THRESHOLD: f64 = 0.3;
/// Score at which escalation is recommended
pub const ESCALATE_THRESHOLD: f64 = 0.6;

/// Scorer for a single condition
#[derive(Debug, Clone, Copy)]
pub struct RiskScorer {
    profile: &'static ConditionProfile,
}

impl RiskScorer {
    pub fn new(condition: Condition) -> Self {
        Self {
            profile: profile(condition),
        }
    }

    pub fn condition(&self) -> Condition {
        self.profile.condition
    }

    /// Sum of triggered rule weights clamped to `[0, 1]`, plus triggered indicators
    pub fn rule_score(&self, features: &FeatureVector) -> (f64, Vec<String>) {
        let mut score = 0.0;
        let mut indicators = Vec::new();
        for rule in self.profile.rules {
            if rule.predicate.holds(features) {
                score += rule.weight;
                indicators.push(rule.indicator.to_string());
            }
        }
        (score.clamp(0.0, 1.0), indicators)
    }

    /// Score the condition. `model` is consulted only when it reports a trained model.
    pub fn assess(&self, features: &FeatureVector, model: Option<&dyn ModelScorer>) -> RiskAssessment {
        let condition = self.condition();
        let (rule_score, indicators) = self.rule_score(features);

        let model_score = model
            .filter(|m| m.is_trained(condition))
            .and_then(|m| m.predict(condition, features))
            .and_then(|p| {
                if p.is_finite() {
                    Some(p.clamp(0.0, 1.0))
                } else {
                    tracing::warn!(condition = condition.key(), "Ignoring non-finite model prediction");
                    None
                }
            });

        let (risk_score, detection_method) = match model_score {
            Some(p) => (
                MODEL_WEIGHT * p + RULE_WEIGHT * rule_score,
                DetectionMethod::Hybrid,
            ),
            None => (rule_score, DetectionMethod::RuleBased),
        };

        RiskAssessment {
            risk_score,
            risk_level: RiskLevel::from_score(risk_score),
            indicators,
            recommendations: self.recommendations(risk_score),
            detection_method,
            rule_score,
            model_score,
        }
    }

    fn recommendations(&self, score: f64) -> Vec<String> {
        let mut items = Vec::new();
        if score >= CONSIDER_THRESHOLD {
            items.push(self.profile.consider.to_string());
        }
        if score >= ESCALATE_THRESHOLD {
            items.extend(self.profile.escalate.iter().map(|s| s.to_string()));
        }
        items
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::feature_extraction::Feature;
    use crate::scoring::rules::{Predicate, Rule};

    struct FixedModel(Option<f64>);

    impl ModelScorer for FixedModel {
        fn is_trained(&self, _condition: Condition) -> bool {
            true
        }

        fn predict(&self, _condition: Condition, _features: &FeatureVector) -> Option<f64> {
            self.0
        }
    }

    struct UntrainedModel;

    impl ModelScorer for UntrainedModel {
        fn is_trained(&self, _condition: Condition) -> bool {
            false
        }

        fn predict(&self, _condition: Condition, _features: &FeatureVector) -> Option<f64> {
            Some(1.0)
        }
    }

    /// Features that trigger Parkinson's rules 1 and 3 only (0.3 + 0.2 = 0.5)
    fn parkinsons_half() -> FeatureVector {
        FeatureVector::from_pairs([
            ("mean_saccade_velocity", 200.0),
            ("mean_saccade_amplitude", 10.0),
            ("mean_fixation_duration", 400.0),
            ("saccade_rate", 3.0),
        ])
    }

    #[test]
    fn test_all_zero_features() {
        // Zero velocity, amplitude and rate trigger 0.3 + 0.3 + 0.2
        let assessment = RiskScorer::new(Condition::Parkinsons).assess(&FeatureVector::new(), None);
        assert!((assessment.risk_score - 0.8).abs() < 1e-12);
        assert_eq!(assessment.risk_level, RiskLevel::High);
        assert_eq!(assessment.indicators.len(), 3);
        assert_eq!(assessment.detection_method, DetectionMethod::RuleBased);
        assert_eq!(assessment.recommendations.len(), 3);
    }

    #[test]
    fn test_rule_indicators_in_table_order() {
        let assessment = RiskScorer::new(Condition::Parkinsons).assess(&parkinsons_half(), None);
        assert!((assessment.risk_score - 0.5).abs() < 1e-12);
        assert_eq!(assessment.risk_level, RiskLevel::Moderate);
        assert_eq!(
            assessment.indicators,
            vec![
                "Reduced saccade velocity detected".to_string(),
                "Prolonged fixations detected".to_string(),
            ]
        );
        assert_eq!(
            assessment.recommendations,
            vec!["Consider neurological consultation".to_string()]
        );
    }

    #[test]
    fn test_rule_score_saturates() {
        static HEAVY: ConditionProfile = ConditionProfile {
            condition: Condition::Adhd,
            rules: &[
                Rule { predicate: Predicate::Below(Feature::SaccadeCount, 1.0), weight: 0.3, indicator: "a" },
                Rule { predicate: Predicate::Below(Feature::SaccadeRate, 1.0), weight: 0.3, indicator: "b" },
                Rule { predicate: Predicate::Below(Feature::XStd, 1.0), weight: 0.3, indicator: "c" },
                Rule { predicate: Predicate::Below(Feature::YStd, 1.0), weight: 0.3, indicator: "d" },
                Rule { predicate: Predicate::Below(Feature::XRange, 1.0), weight: 0.3, indicator: "e" },
            ],
            consider: "consider",
            escalate: &["escalate"],
        };
        let scorer = RiskScorer { profile: &HEAVY };

        let (score, indicators) = scorer.rule_score(&FeatureVector::new());
        assert_eq!(score, 1.0);
        assert_eq!(indicators.len(), 5);
    }

    #[test]
    fn test_hybrid_blend() {
        // ADHD: saccade_rate > 4 (0.3) and coverage > 50000 (0.2) => rule 0.5
        let features = FeatureVector::from_pairs([
            ("mean_fixation_duration", 200.0),
            ("saccade_rate", 5.0),
            ("coverage_area", 60000.0),
        ]);
        let model = FixedModel(Some(0.8));
        let assessment = RiskScorer::new(Condition::Adhd).assess(&features, Some(&model));

        assert!((assessment.rule_score - 0.5).abs() < 1e-12);
        assert!((assessment.risk_score - (0.7 * 0.8 + 0.3 * 0.5)).abs() < 1e-12);
        assert_eq!(assessment.detection_method, DetectionMethod::Hybrid);
        assert_eq!(assessment.model_score, Some(0.8));
    }

    #[test]
    fn test_hybrid_exact_value() {
        // ASD: velocity > 500 (0.2) and rate > 4 (0.2) => rule 0.4
        let features = FeatureVector::from_pairs([
            ("mean_saccade_velocity", 600.0),
            ("saccade_rate", 5.0),
        ]);
        let model = FixedModel(Some(0.8));
        let assessment = RiskScorer::new(Condition::Asd).assess(&features, Some(&model));

        assert!((assessment.rule_score - 0.4).abs() < 1e-12);
        assert!((assessment.risk_score - 0.68).abs() < 1e-9);
        assert_eq!(assessment.risk_level, RiskLevel::High);
    }

    #[test]
    fn test_untrained_model_falls_back_to_rules() {
        let assessment =
            RiskScorer::new(Condition::Parkinsons).assess(&parkinsons_half(), Some(&UntrainedModel));
        assert_eq!(assessment.detection_method, DetectionMethod::RuleBased);
        assert!((assessment.risk_score - 0.5).abs() < 1e-12);
        assert!(assessment.model_score.is_none());
    }

    #[test]
    fn test_non_finite_prediction_is_unavailable() {
        let model = FixedModel(Some(f64::NAN));
        let assessment = RiskScorer::new(Condition::Parkinsons).assess(&parkinsons_half(), Some(&model));
        assert_eq!(assessment.detection_method, DetectionMethod::RuleBased);
    }

    #[test]
    fn test_out_of_range_prediction_is_clamped() {
        let model = FixedModel(Some(1.5));
        let assessment = RiskScorer::new(Condition::Parkinsons).assess(&parkinsons_half(), Some(&model));
        assert_eq!(assessment.model_score, Some(1.0));
        assert!((assessment.risk_score - (0.7 + 0.3 * 0.5)).abs() < 1e-12);
    }

    #[test]
    fn test_no_rules_triggered() {
        // Mid-range values trip no ADHD rule
        let features = FeatureVector::from_pairs([
            ("mean_fixation_duration", 250.0),
            ("saccade_rate", 3.0),
            ("coverage_area", 20000.0),
            ("std_velocity", 50.0),
        ]);
        let assessment = RiskScorer::new(Condition::Adhd).assess(&features, None);
        assert_eq!(assessment.risk_score, 0.0);
        assert!(assessment.indicators.is_empty());
        assert!(assessment.recommendations.is_empty());
        assert_eq!(assessment.risk_level, RiskLevel::Low);
    }
}
