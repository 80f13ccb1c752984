//! Condition Rule Tables
//!
//! Static threshold rules per condition. Each triggered rule contributes a
//! fixed weight to the rule score and names the pattern it detected.

use super::risk::Condition;
use crate::analysis::feature_extraction::{Feature, FeatureVector};

/// Threshold test over the feature vector
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Predicate {
    /// `feature < value`
    Below(Feature, f64),
    /// `feature > value`
    Above(Feature, f64),
    /// `feature > factor × other`
    AboveFractionOf(Feature, f64, Feature),
    /// Any of the inner predicates holds
    AnyOf(&'static [Predicate]),
}

impl Predicate {
    pub fn holds(&self, features: &FeatureVector) -> bool {
        match *self {
            Predicate::Below(feature, value) => features.get(feature) < value,
            Predicate::Above(feature, value) => features.get(feature) > value,
            Predicate::AboveFractionOf(feature, factor, other) => {
                features.get(feature) > factor * features.get(other)
            }
            Predicate::AnyOf(inner) => inner.iter().any(|p| p.holds(features)),
        }
    }
}

/// One weighted rule
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rule {
    pub predicate: Predicate,
    pub weight: f64,
    pub indicator: &'static str,
}

/// Rule table plus recommendation wording for one condition
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConditionProfile {
    pub condition: Condition,
    pub rules: &'static [Rule],
    /// Added when the score reaches the moderate threshold
    pub consider: &'static str,
    /// Added when the score reaches the high threshold
    pub escalate: &'static [&'static str],
}

const fn rule(predicate: Predicate, weight: f64, indicator: &'static str) -> Rule {
    Rule {
        predicate,
        weight,
        indicator,
    }
}

use Feature::*;
use Predicate::*;

pub static PARKINSONS: ConditionProfile = ConditionProfile {
    condition: Condition::Parkinsons,
    rules: &[
        rule(Below(MeanSaccadeVelocity, 300.0), 0.3, "Reduced saccade velocity detected"),
        rule(Below(MeanSaccadeAmplitude, 5.0), 0.3, "Hypometric saccades detected"),
        rule(Above(MeanFixationDuration, 300.0), 0.2, "Prolonged fixations detected"),
        rule(Below(SaccadeRate, 2.0), 0.2, "Reduced saccade rate detected"),
    ],
    consider: "Consider neurological consultation",
    escalate: &[
        "Recommend comprehensive neurological assessment",
        "Monitor motor symptoms",
    ],
};

pub static ALZHEIMERS: ConditionProfile = ConditionProfile {
    condition: Condition::Alzheimers,
    rules: &[
        rule(Above(MeanFixationDuration, 350.0), 0.3, "Significantly prolonged fixations detected"),
        rule(Below(CoverageArea, 10000.0), 0.3, "Reduced visual exploration detected"),
        rule(
            AboveFractionOf(StdSaccadeAmplitude, 0.7, MeanSaccadeAmplitude),
            0.2,
            "High saccade variability detected",
        ),
        rule(Below(SaccadeRate, 1.5), 0.2, "Significantly reduced saccade rate"),
    ],
    consider: "Consider cognitive assessment",
    escalate: &[
        "Recommend comprehensive neuropsychological evaluation",
        "Monitor cognitive function",
    ],
};

pub static ASD: ConditionProfile = ConditionProfile {
    condition: Condition::Asd,
    rules: &[
        rule(Above(StdFixationDuration, 200.0), 0.3, "High fixation duration variability detected"),
        rule(
            AnyOf(&[Above(XStd, 150.0), Above(YStd, 150.0)]),
            0.3,
            "Atypical spatial attention patterns detected",
        ),
        rule(Above(MeanSaccadeVelocity, 500.0), 0.2, "Elevated saccade velocity detected"),
        rule(Above(SaccadeRate, 4.0), 0.2, "Elevated saccade rate detected"),
    ],
    consider: "Consider developmental screening",
    escalate: &[
        "Recommend comprehensive ASD assessment",
        "Consider social interaction evaluation",
    ],
};

pub static ADHD: ConditionProfile = ConditionProfile {
    condition: Condition::Adhd,
    rules: &[
        rule(Below(MeanFixationDuration, 150.0), 0.3, "Significantly shortened fixations detected"),
        rule(Above(SaccadeRate, 4.0), 0.3, "Elevated saccade rate detected"),
        rule(Above(CoverageArea, 50000.0), 0.2, "High spatial dispersion detected"),
        rule(Above(StdVelocity, 100.0), 0.2, "High movement variability detected"),
    ],
    consider: "Consider attention assessment",
    escalate: &[
        "Recommend comprehensive ADHD evaluation",
        "Monitor attention and hyperactivity symptoms",
    ],
};

/// Profile for a condition
pub fn profile(condition: Condition) -> &'static ConditionProfile {
    match condition {
        Condition::Parkinsons => &PARKINSONS,
        Condition::Alzheimers => &ALZHEIMERS,
        Condition::Asd => &ASD,
        Condition::Adhd => &ADHD,
    }
}
