use egui::{Pos2, Vec2};
use instant::Instant;
use tracing::{debug, info};

use crate::{
    analysis::{Analyzer, PendingAnalysis},
    drag::DraggableSurface,
    lifecycle::Lifecycle,
    page::PageContext,
    settings::SettingsDrag,
    storage::BUTTON_POSITION_KEY,
};

/// An analysis request started by the trigger button.
pub struct InFlight {
    pub generation: u64,
    pub pending: Box<dyn PendingAnalysis>,
}

impl std::fmt::Debug for InFlight {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InFlight")
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}

/// Draggable "Start Research" control.
#[derive(Debug, Clone)]
pub struct TriggerButton {
    surface: DraggableSurface,
}

impl TriggerButton {
    pub fn new(position: Pos2, size: Vec2, settings: SettingsDrag) -> Self {
        Self {
            surface: DraggableSurface::new(BUTTON_POSITION_KEY, position, size, settings),
        }
    }

    /// Default placement: bottom-right corner, `edge_margin` from both edges.
    pub fn default_position(viewport: Vec2, size: Vec2, settings: &SettingsDrag) -> Pos2 {
        let m = settings.edge_margin;
        Pos2::new(viewport.x - size.x - m, viewport.y - size.y - m)
    }

    pub fn surface(&self) -> &DraggableSurface {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut DraggableSurface {
        &mut self.surface
    }

    /// Starts an analysis of the page, unless the pointer sequence that
    /// produced this click was a drag.
    ///
    /// Moves the lifecycle to `Loading` and returns the request to poll. No
    /// retry happens on failure; a new activation is needed.
    pub fn activate(
        &self,
        lifecycle: &mut Lifecycle,
        analyzer: &mut dyn Analyzer,
        page: &PageContext,
        now: Instant,
    ) -> Option<InFlight> {
        if !self.surface.is_click() {
            debug!("click suppressed after drag");
            return None;
        }

        let generation = match lifecycle.begin(now) {
            Ok(generation) => generation,
            Err(err) => {
                debug!(%err, "activation ignored");
                return None;
            }
        };

        info!(generation, url = page.url(), "research activated");
        Some(InFlight {
            generation,
            pending: analyzer.analyze(page.url(), now),
        })
    }
}
