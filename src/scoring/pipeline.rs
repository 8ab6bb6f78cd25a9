use serde_json::Value;

use crate::config::AnalyzerConfig;
use crate::scoring::TrendAnalyzer;
use crate::{AnalysisResult, SortBy};

/// Thin composition over the aggregate analyzer: owns the sort-by choice
/// and returns the structured result the route layer serializes.
#[derive(Debug, Clone)]
pub struct AnalysisPipeline {
    analyzer: TrendAnalyzer,
}

impl AnalysisPipeline {
    pub fn new(config: AnalyzerConfig) -> Self {
        Self {
            analyzer: TrendAnalyzer::new(config),
        }
    }

    pub fn run(&self, items: &[Value], sort_by: SortBy, now: i64) -> AnalysisResult {
        self.analyzer.analyze(items, sort_by, now)
    }
}
