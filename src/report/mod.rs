//! Analysis orchestration and reporting

pub mod analyzer;
pub mod text_report;

pub use analyzer::{AnalysisResult, Analyzer, Summary};
pub use text_report::{render_report, TextReport};
