//! Boundary to the research analysis backend.
//!
//! A request is started with [`Analyzer::analyze`] and the returned
//! [`PendingAnalysis`] is polled once per frame until it is ready. Requests
//! cannot be cancelled; the owner decides whether a late outcome still
//! matters.

use std::task::Poll;

use instant::Instant;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::settings::SettingsAnalysis;

/// Successful analysis payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub title: String,
    pub status: String,
    pub analysis: String,
}

/// Failure payload. A failure is terminal for its request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisFailure {
    pub error: String,
}

pub type AnalysisOutcome = Result<AnalysisReport, AnalysisFailure>;

/// Wire form of an outcome: `{title, status, analysis}` or `{error}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnalysisResponse {
    Failure(AnalysisFailure),
    Report(AnalysisReport),
}

impl From<AnalysisResponse> for AnalysisOutcome {
    fn from(r: AnalysisResponse) -> Self {
        match r {
            AnalysisResponse::Report(report) => Ok(report),
            AnalysisResponse::Failure(failure) => Err(failure),
        }
    }
}

impl From<AnalysisOutcome> for AnalysisResponse {
    fn from(o: AnalysisOutcome) -> Self {
        match o {
            Ok(report) => AnalysisResponse::Report(report),
            Err(failure) => AnalysisResponse::Failure(failure),
        }
    }
}

/// An analysis request in flight.
pub trait PendingAnalysis {
    /// Returns the outcome once available. Must not be polled after it
    /// returned [`Poll::Ready`].
    fn poll(&mut self, now: Instant) -> Poll<AnalysisOutcome>;
}

/// Starts analysis requests for a page.
pub trait Analyzer {
    fn analyze(&mut self, url: &str, now: Instant) -> Box<dyn PendingAnalysis>;
}

/// Placeholder backend: resolves with canned content after a fixed delay.
#[derive(Debug, Clone)]
pub struct MockAnalyzer {
    settings: SettingsAnalysis,
    title: String,
}

impl MockAnalyzer {
    /// `title` is reported back as the paper title.
    pub fn new(settings: SettingsAnalysis, title: impl Into<String>) -> Self {
        Self {
            settings,
            title: title.into(),
        }
    }

    pub fn settings(&self) -> &SettingsAnalysis {
        &self.settings
    }

    pub fn set_settings(&mut self, settings: SettingsAnalysis) {
        self.settings = settings;
    }
}

impl Analyzer for MockAnalyzer {
    fn analyze(&mut self, url: &str, now: Instant) -> Box<dyn PendingAnalysis> {
        info!(url, "starting research analysis");

        let outcome = match &self.settings.failure {
            Some(error) => Err(AnalysisFailure {
                error: error.clone(),
            }),
            None => Ok(AnalysisReport {
                title: self.title.clone(),
                status: "success".to_string(),
                analysis: "Research analysis complete".to_string(),
            }),
        };

        Box::new(MockPending {
            ready_at: now + self.settings.delay,
            outcome: Some(outcome),
        })
    }
}

struct MockPending {
    ready_at: Instant,
    outcome: Option<AnalysisOutcome>,
}

impl PendingAnalysis for MockPending {
    fn poll(&mut self, now: Instant) -> Poll<AnalysisOutcome> {
        if now < self.ready_at {
            return Poll::Pending;
        }
        match self.outcome.take() {
            Some(outcome) => Poll::Ready(outcome),
            None => {
                debug!("mock analysis polled after completion");
                Poll::Pending
            }
        }
    }
}
