//! Plain-text Report Rendering

use super::analyzer::AnalysisResult;
use crate::scoring::risk::{Condition, RiskAssessment};
use std::fmt::{self, Write};

const RULE_WIDTH: usize = 70;

const TITLE: &str = "EYE TRACKING SCREENING REPORT";

/// Text report over one analysis result.
///
/// Sections are always written in the same order: header, overall
/// assessment, per-condition breakdown, disclaimer.
pub struct TextReport<'a> {
    result: &'a AnalysisResult,
}

impl<'a> TextReport<'a> {
    pub fn new(result: &'a AnalysisResult) -> Self {
        Self { result }
    }

    fn write_header(&self, f: &mut impl Write) -> fmt::Result {
        writeln!(f, "{}", "=".repeat(RULE_WIDTH))?;
        writeln!(f, "{}", TITLE)?;
        writeln!(f, "{}", "=".repeat(RULE_WIDTH))?;
        writeln!(f)?;

        let session = &self.result.session;
        if let Some(subject) = &session.subject_id {
            writeln!(f, "Subject ID: {}", subject)?;
        }
        if let Some(id) = &session.session_id {
            writeln!(f, "Session ID: {}", id)?;
        }
        if let Some(task) = &session.task_type {
            writeln!(f, "Task Type: {}", task)?;
        }
        writeln!(
            f,
            "Recording: {} samples over {:.0} ms ({} saccades, {} fixations)",
            self.result.sample_count,
            self.result.duration_ms,
            self.result.saccade_count,
            self.result.fixation_count
        )?;
        writeln!(f)
    }

    fn write_overall(&self, f: &mut impl Write) -> fmt::Result {
        let summary = &self.result.summary;
        writeln!(f, "OVERALL ASSESSMENT")?;
        writeln!(f, "{}", "-".repeat(RULE_WIDTH))?;
        writeln!(f, "Risk Level: {}", summary.overall_risk_level)?;
        if let Some(condition) = summary.highest_risk_condition {
            writeln!(
                f,
                "Highest Risk: {} (Score: {:.2})",
                heading(condition),
                summary.highest_risk_score
            )?;
        }
        writeln!(f)
    }

    fn write_conditions(&self, f: &mut impl Write) -> fmt::Result {
        writeln!(f, "CONDITION-SPECIFIC ANALYSIS")?;
        writeln!(f, "{}", "-".repeat(RULE_WIDTH))?;

        for (condition, assessment) in &self.result.disease_analysis {
            write_assessment(f, *condition, assessment)?;
        }
        writeln!(f)
    }

    fn write_footer(&self, f: &mut impl Write) -> fmt::Result {
        writeln!(f, "{}", "=".repeat(RULE_WIDTH))?;
        writeln!(f, "Note: This analysis is for screening purposes only.")?;
        writeln!(f, "Please consult healthcare professionals for diagnosis.")?;
        write!(f, "{}", "=".repeat(RULE_WIDTH))
    }
}

fn heading(condition: Condition) -> String {
    condition.display_name().to_uppercase()
}

fn write_assessment(f: &mut impl Write, condition: Condition, assessment: &RiskAssessment) -> fmt::Result {
    writeln!(f)?;
    writeln!(f, "{}", heading(condition))?;
    writeln!(f, "  Risk Score: {:.2}", assessment.risk_score)?;
    writeln!(f, "  Risk Level: {}", assessment.risk_level)?;
    writeln!(f, "  Detection Method: {}", assessment.detection_method)?;

    if assessment.indicators.is_empty() {
        writeln!(f, "  Indicators: None detected")?;
    } else {
        writeln!(f, "  Indicators:")?;
        for indicator in &assessment.indicators {
            writeln!(f, "    - {}", indicator)?;
        }
    }

    if !assessment.recommendations.is_empty() {
        writeln!(f, "  Recommendations:")?;
        for recommendation in &assessment.recommendations {
            writeln!(f, "    - {}", recommendation)?;
        }
    }
    Ok(())
}

impl fmt::Display for TextReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_header(f)?;
        self.write_overall(f)?;
        self.write_conditions(f)?;
        self.write_footer(f)
    }
}

/// Render the human-readable report
pub fn render_report(result: &AnalysisResult) -> String {
    TextReport::new(result).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::analyzer::Analyzer;
    use crate::signal::series::{GazeSeries, SessionInfo};

    fn result(conditions: Option<&[Condition]>) -> AnalysisResult {
        let t: Vec<f64> = (0..300).map(|i| i as f64).collect();
        let series = GazeSeries::new(t, vec![100.0; 300], vec![100.0; 300], None)
            .unwrap()
            .with_session(SessionInfo {
                subject_id: Some("S042".to_string()),
                task_type: Some("reading".to_string()),
                ..Default::default()
            });
        Analyzer::default().analyze(&series, conditions)
    }

    #[test]
    fn test_sections_in_order() {
        let report = render_report(&result(None));

        let header = report.find(TITLE).unwrap();
        let overall = report.find("OVERALL ASSESSMENT").unwrap();
        let breakdown = report.find("CONDITION-SPECIFIC ANALYSIS").unwrap();
        let footer = report.find("Note: This analysis is for screening purposes only.").unwrap();
        assert!(header < overall && overall < breakdown && breakdown < footer);

        let parkinsons = report.find("\nPARKINSONS\n").unwrap();
        let adhd = report.find("\nADHD\n").unwrap();
        assert!(parkinsons < adhd);
    }

    #[test]
    fn test_header_lists_present_metadata_only() {
        let report = render_report(&result(None));
        assert!(report.contains("Subject ID: S042"));
        assert!(report.contains("Task Type: reading"));
        assert!(!report.contains("Session ID:"));
    }

    #[test]
    fn test_condition_block() {
        let report = render_report(&result(Some(&[Condition::Parkinsons])));
        assert!(report.contains("  Risk Score: "));
        assert!(report.contains("  Detection Method: rule-based"));
        assert!(report.contains("    - Reduced saccade velocity detected"));
        assert!(report.contains("Highest Risk: PARKINSONS (Score: "));
    }

    #[test]
    fn test_no_indicators() {
        let mut result = result(Some(&[Condition::Asd]));
        if let Some(a) = result.disease_analysis.get_mut(&Condition::Asd) {
            a.indicators.clear();
            a.recommendations.clear();
        }
        let report = render_report(&result);
        assert!(report.contains("  Indicators: None detected"));
        assert!(!report.contains("Recommendations:"));
    }

    #[test]
    fn test_empty_selection_has_no_highest_risk() {
        let report = render_report(&result(Some(&[])));
        assert!(report.contains("Risk Level: Low"));
        assert!(!report.contains("Highest Risk:"));
        assert!(report.ends_with(&"=".repeat(RULE_WIDTH)));
    }
}
