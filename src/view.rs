use egui::Rect;
use instant::Instant;

use crate::{
    lifecycle::{Lifecycle, Phase},
    page::PageContext,
    research::{Insight, ResearchScores},
};

pub const BADGE_TEXT: &str = "Elacity Active";
pub const BUTTON_LABEL: &str = "Start";
pub const BUTTON_CAPTION: &str = "Research";
pub const RETRY_HINT: &str = "Please try again later.";

/// What the results panel shows, derived from the lifecycle each frame.
#[derive(Debug, Clone, PartialEq)]
pub enum PanelView {
    Hidden,
    Loading {
        status: String,
    },
    Success {
        title: String,
        scores: ResearchScores,
        /// Cross-fade progress `0..=1`
        fade: f32,
    },
    Error {
        message: String,
        fade: f32,
    },
    Detail {
        title: String,
        insights: &'static [Insight],
    },
}

impl PanelView {
    pub fn from_lifecycle(lifecycle: &Lifecycle, page: &PageContext, now: Instant) -> Self {
        let fade = lifecycle.transition_progress(now).unwrap_or(1.);
        let title = || {
            lifecycle
                .result()
                .map(|r| r.display_title(page.paper_title()))
        };

        match lifecycle.phase() {
            Phase::Hidden => PanelView::Hidden,
            Phase::Loading => PanelView::Loading {
                status: lifecycle.status_message(now).unwrap_or_default().to_string(),
            },
            Phase::Success => match (title(), lifecycle.result()) {
                (Some(title), Some(result)) => PanelView::Success {
                    title,
                    scores: result.scores,
                    fade,
                },
                _ => PanelView::Hidden,
            },
            Phase::Error => PanelView::Error {
                message: format!(
                    "Failed to analyze paper: {}",
                    lifecycle.error().unwrap_or("unknown error")
                ),
                fade,
            },
            Phase::Detail => match (title(), lifecycle.result()) {
                (Some(title), Some(result)) => PanelView::Detail {
                    title,
                    insights: result.scores.insights(),
                },
                _ => PanelView::Hidden,
            },
        }
    }

    pub fn is_visible(&self) -> bool {
        !matches!(self, PanelView::Hidden)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ButtonView {
    pub rect: Rect,
    pub dragging: bool,
}

/// Everything the renderer needs for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayView {
    pub badge: Option<&'static str>,
    pub button: ButtonView,
    pub panel: PanelView,
    pub panel_rect: Rect,
    /// Text must not be selectable while a control is dragged
    pub selection_suppressed: bool,
}
