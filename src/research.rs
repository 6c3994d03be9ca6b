use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::analysis::AnalysisReport;

/// Title shown when neither the page nor the report provide one.
pub const FALLBACK_TITLE: &str = "Current arXiv paper";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InsightLevel {
    Insight,
    Flaw,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Insight {
    pub key: &'static str,
    pub level: InsightLevel,
    pub description: &'static str,
}

impl Insight {
    /// Human readable label, e.g. `key findings` for `key_findings`.
    pub fn label(&self) -> String {
        self.key.replacen('_', " ", 1)
    }
}

pub const INSIGHTS: [Insight; 4] = [
    Insight {
        key: "key_findings",
        level: InsightLevel::Insight,
        description: "Novel approach to attention mechanisms shows promise",
    },
    Insight {
        key: "methodology_strength",
        level: InsightLevel::Insight,
        description: "Comprehensive evaluation across multiple benchmarks",
    },
    Insight {
        key: "data_concern",
        level: InsightLevel::Flaw,
        description: "Limited dataset diversity may affect real-world applicability",
    },
    Insight {
        key: "innovation_highlight",
        level: InsightLevel::Insight,
        description: "Introduces efficient training technique reducing compute by 40%",
    },
];

/// Mock scores shown on the result card, each out of 10.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResearchScores {
    pub methodological_rigor: u8,
    pub data_quality: u8,
    pub innovation_level: u8,
    pub insight_count: u8,
}

impl ResearchScores {
    pub fn draw<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            methodological_rigor: rng.random_range(7..=9),
            data_quality: rng.random_range(9..=10),
            innovation_level: rng.random_range(6..=9),
            insight_count: rng.random_range(1..=3),
        }
    }

    /// Summary line under the scores.
    pub fn insight_summary(&self) -> String {
        match self.insight_count {
            0 => "Analysis complete".to_string(),
            1 => "1 research insight identified".to_string(),
            n => format!("{n} research insights identified"),
        }
    }

    /// Insights listed in the detail view.
    pub fn insights(&self) -> &'static [Insight] {
        let n = usize::from(self.insight_count).min(INSIGHTS.len());
        &INSIGHTS[..n]
    }
}

/// A successful analysis together with the scores drawn for it.
///
/// Built once when the result arrives; navigating between the summary and
/// the detail view never changes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResearchResult {
    pub report: AnalysisReport,
    pub scores: ResearchScores,
}

impl ResearchResult {
    pub fn new<R: Rng + ?Sized>(report: AnalysisReport, rng: &mut R) -> Self {
        Self {
            report,
            scores: ResearchScores::draw(rng),
        }
    }

    /// Title to display. The page title wins over the report title.
    pub fn display_title(&self, page_title: Option<&str>) -> String {
        page_title
            .filter(|t| !t.is_empty())
            .or(Some(self.report.title.as_str()).filter(|t| !t.is_empty()))
            .unwrap_or(FALLBACK_TITLE)
            .to_string()
    }
}
