use std::task::Poll;

use egui::{Pos2, Rect, Vec2};
use instant::Instant;
use rand::{rngs::StdRng, SeedableRng};
use tracing::{debug, info, warn};

use crate::{
    analysis::Analyzer,
    drag::{clamp_to_viewport, DraggableSurface, Pointer},
    error::{LifecycleError, MessagingError},
    lifecycle::{Action, Lifecycle, Phase},
    messaging::HostMessenger,
    page::PageContext,
    research::ResearchResult,
    settings::{SettingsDrag, SettingsLifecycle},
    storage::{
        load_position, save_position, PositionStore, BUTTON_POSITION_KEY, PANEL_POSITION_KEY,
    },
    trigger::{InFlight, TriggerButton},
    view::{ButtonView, OverlayView, PanelView, BADGE_TEXT},
};

#[cfg(feature = "events")]
use crate::events::{
    Event, EventSink, PayloadActivated, PayloadDrag, PayloadPhaseChange, PayloadResultDiscarded,
};

/// Draggable control the pointer is interacting with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    Button,
    Panel,
}

/// The research overlay mounted on one page.
///
/// Owns the trigger button, the results panel and their lifecycle. The
/// analysis backend and position storage are injected, so the overlay runs
/// the same way under egui, in a browser host or in tests.
///
/// Everything is driven from the UI thread: route pointer events through
/// [`Self::pointer_down`], [`Self::pointer_move`] and [`Self::pointer_up`],
/// then call [`Self::tick`] and [`Self::end_frame`] once per frame.
pub struct ResearchOverlay {
    page: PageContext,
    analyzer: Box<dyn Analyzer>,
    store: Box<dyn PositionStore>,
    rng: StdRng,

    button: TriggerButton,
    panel: DraggableSurface,
    lifecycle: Lifecycle,
    in_flight: Vec<InFlight>,

    viewport: Vec2,
    created_at: Instant,
    badge_duration: std::time::Duration,

    #[cfg(feature = "events")]
    events_sink: Option<Box<dyn EventSink>>,
}

impl ResearchOverlay {
    /// Creates the overlay and restores the stored control positions.
    pub fn new(
        page: PageContext,
        analyzer: Box<dyn Analyzer>,
        store: Box<dyn PositionStore>,
        viewport: Vec2,
        now: Instant,
    ) -> Self {
        let drag = SettingsDrag::default();
        let lifecycle = SettingsLifecycle::default();
        let badge_duration = lifecycle.badge_duration;

        let button_pos = load_position(
            store.as_ref(),
            BUTTON_POSITION_KEY,
            viewport,
            drag.button_size,
        )
        .unwrap_or_else(|| {
            clamp_to_viewport(
                TriggerButton::default_position(viewport, drag.button_size, &drag),
                drag.button_size,
                viewport,
            )
        });
        let panel_pos = load_position(store.as_ref(), PANEL_POSITION_KEY, viewport, drag.panel_size)
            .unwrap_or_else(|| {
                clamp_to_viewport(
                    default_panel_position(viewport, drag.panel_size, &drag),
                    drag.panel_size,
                    viewport,
                )
            });

        info!(url = page.url(), "research overlay mounted");

        Self {
            page,
            analyzer,
            store,
            rng: StdRng::from_os_rng(),
            button: TriggerButton::new(button_pos, drag.button_size, drag.clone()),
            panel: DraggableSurface::new(PANEL_POSITION_KEY, panel_pos, drag.panel_size, drag),
            lifecycle: Lifecycle::new(lifecycle),
            in_flight: Vec::new(),
            viewport,
            created_at: now,
            badge_duration,
            #[cfg(feature = "events")]
            events_sink: None,
        }
    }

    pub fn with_settings_drag(mut self, settings: SettingsDrag) -> Self {
        self.button.surface_mut().set_settings(settings.clone());
        self.panel.set_settings(settings);
        self
    }

    pub fn with_settings_lifecycle(mut self, settings: SettingsLifecycle) -> Self {
        self.badge_duration = settings.badge_duration;
        self.lifecycle.set_settings(settings);
        self
    }

    /// Seeds the generator used for the mock scores.
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    #[cfg(feature = "events")]
    pub fn with_events(mut self, sink: Box<dyn EventSink>) -> Self {
        self.events_sink = Some(sink);
        self
    }

    pub fn page(&self) -> &PageContext {
        &self.page
    }

    pub fn phase(&self) -> Phase {
        self.lifecycle.phase()
    }

    pub fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    pub fn button(&self) -> &DraggableSurface {
        self.button.surface()
    }

    pub fn panel(&self) -> &DraggableSurface {
        &self.panel
    }

    pub fn viewport(&self) -> Vec2 {
        self.viewport
    }

    /// Number of requests still running, including ones whose outcome will
    /// be discarded.
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Records the viewport size. Controls are re-clamped on their next drag.
    pub fn resize_viewport(&mut self, viewport: Vec2) {
        self.viewport = viewport;
    }

    /// Records measured control sizes.
    pub fn set_sizes(&mut self, button: Vec2, panel: Vec2) {
        self.button.surface_mut().set_size(button);
        self.panel.set_size(panel);
    }

    /// Which control, if any, a press at `pos` would grab.
    pub fn hit_test(&self, pos: Pos2) -> Option<Target> {
        if self.lifecycle.phase() != Phase::Hidden {
            let panel = self.panel.rect();
            let settings = self.panel.settings();
            // the close button sits at the right end of the header
            let handle = Rect::from_min_size(
                panel.min,
                Vec2::new(
                    (panel.width() - settings.panel_close_width).max(0.),
                    settings.panel_handle_height,
                ),
            );
            if handle.contains(pos) {
                return Some(Target::Panel);
            }
            if panel.contains(pos) {
                return None;
            }
        }
        self.button.surface().rect().contains(pos).then_some(Target::Button)
    }

    pub fn pointer_down(&mut self, target: Target, pointer: Pointer) -> bool {
        let viewport = self.viewport;
        let started = self.surface_mut(target).pointer_down(pointer, viewport);

        #[cfg(feature = "events")]
        if started {
            let surface = self.surface(target);
            let event = Event::DragStart(PayloadDrag {
                id: surface.id().to_string(),
                pos: [surface.position().x, surface.position().y],
            });
            self.publish(event);
        }

        started
    }

    /// Forwards a move to whichever control is being dragged.
    pub fn pointer_move(&mut self, pointer: Pointer) -> bool {
        let viewport = self.viewport;
        match self.dragging() {
            Some(target) => self.surface_mut(target).pointer_move(pointer, viewport),
            None => false,
        }
    }

    /// Ends the active drag and persists the final position.
    pub fn pointer_up(&mut self) -> Option<Target> {
        let target = self.dragging()?;
        let surface = self.surface_mut(target);
        let pos = surface.pointer_up()?;
        let key = surface.id().to_string();

        save_position(self.store.as_mut(), &key, pos);

        #[cfg(feature = "events")]
        self.publish(Event::DragEnd(PayloadDrag {
            id: key,
            pos: [pos.x, pos.y],
        }));

        Some(target)
    }

    /// Aborts any drag, e.g. when the window loses focus.
    pub fn cancel_drag(&mut self) {
        self.button.surface_mut().cancel();
        self.panel.cancel();
    }

    /// Handles a click on the trigger button.
    ///
    /// Returns `true` if an analysis was started.
    pub fn click(&mut self, now: Instant) -> bool {
        let from = self.lifecycle.phase();
        let Some(in_flight) =
            self.button
                .activate(&mut self.lifecycle, self.analyzer.as_mut(), &self.page, now)
        else {
            return false;
        };

        #[cfg(feature = "events")]
        self.publish(Event::Activated(PayloadActivated {
            generation: in_flight.generation,
            url: self.page.url().to_string(),
        }));
        self.publish_phase(from);

        self.in_flight.push(in_flight);
        true
    }

    /// Polls running requests and applies the current one when ready.
    ///
    /// Outcomes of requests that are no longer current are dropped.
    pub fn tick(&mut self, now: Instant) {
        let mut ready = Vec::new();
        self.in_flight
            .retain_mut(|f| match f.pending.poll(now) {
                Poll::Ready(outcome) => {
                    ready.push((f.generation, outcome));
                    false
                }
                Poll::Pending => true,
            });

        for (generation, outcome) in ready {
            let from = self.lifecycle.phase();
            let outcome = outcome
                .map(|report| ResearchResult::new(report, &mut self.rng))
                .map_err(|failure| failure.error);

            match self.lifecycle.resolve(generation, outcome, now) {
                Ok(phase) => {
                    info!(generation, ?phase, "research analysis finished");
                    self.publish_phase(from);
                }
                Err(
                    LifecycleError::StaleResult { .. }
                    | LifecycleError::InvalidTransition {
                        action: Action::Resolve,
                        ..
                    },
                ) => {
                    debug!(generation, ?from, "discarding stale analysis result");
                    #[cfg(feature = "events")]
                    self.publish(Event::ResultDiscarded(PayloadResultDiscarded { generation }));
                }
                Err(err) => warn!(%err, "unexpected lifecycle error"),
            }
        }
    }

    /// Commits coalesced drag moves. Call once per frame.
    pub fn end_frame(&mut self) -> bool {
        let button = self.button.surface_mut().apply_frame();
        let panel = self.panel.apply_frame();
        button || panel
    }

    /// # Errors
    ///
    /// Only allowed while a result or error is shown.
    pub fn dismiss(&mut self) -> Result<(), LifecycleError> {
        self.transition(Lifecycle::dismiss)
    }

    /// Closes the panel from any phase.
    pub fn close(&mut self) {
        let from = self.lifecycle.phase();
        self.lifecycle.close();
        self.publish_phase(from);
    }

    /// # Errors
    ///
    /// Only allowed while a result is shown.
    pub fn show_detail(&mut self) -> Result<(), LifecycleError> {
        self.transition(Lifecycle::show_detail)
    }

    /// # Errors
    ///
    /// Only allowed from the detail view.
    pub fn back(&mut self) -> Result<(), LifecycleError> {
        self.transition(Lifecycle::back)
    }

    /// Answers a JSON message from the extension host.
    ///
    /// # Errors
    ///
    /// Fails on malformed messages.
    pub fn handle_host_message<F>(&self, raw: &str, respond: F) -> Result<(), MessagingError>
    where
        F: FnOnce(String),
    {
        HostMessenger::new(self.page.clone()).handle_json(raw, respond)
    }

    /// Needs continuous repaints, e.g. for status cycling and fades.
    pub fn is_animating(&self, now: Instant) -> bool {
        self.lifecycle.phase() == Phase::Loading
            || self
                .lifecycle
                .transition_progress(now)
                .is_some_and(|p| p < 1.)
            || self.badge(now).is_some()
    }

    pub fn view(&self, now: Instant) -> OverlayView {
        OverlayView {
            badge: self.badge(now),
            button: ButtonView {
                rect: self.button.surface().rect(),
                dragging: self.button.surface().is_dragging(),
            },
            panel: PanelView::from_lifecycle(&self.lifecycle, &self.page, now),
            panel_rect: self.panel.rect(),
            selection_suppressed: self.button.surface().selection_suppressed()
                || self.panel.selection_suppressed(),
        }
    }

    fn badge(&self, now: Instant) -> Option<&'static str> {
        (now.saturating_duration_since(self.created_at) < self.badge_duration)
            .then_some(BADGE_TEXT)
    }

    fn dragging(&self) -> Option<Target> {
        if self.button.surface().is_dragging() {
            Some(Target::Button)
        } else if self.panel.is_dragging() {
            Some(Target::Panel)
        } else {
            None
        }
    }

    #[cfg(feature = "events")]
    fn surface(&self, target: Target) -> &DraggableSurface {
        match target {
            Target::Button => self.button.surface(),
            Target::Panel => &self.panel,
        }
    }

    fn surface_mut(&mut self, target: Target) -> &mut DraggableSurface {
        match target {
            Target::Button => self.button.surface_mut(),
            Target::Panel => &mut self.panel,
        }
    }

    fn transition(
        &mut self,
        f: fn(&mut Lifecycle) -> Result<(), LifecycleError>,
    ) -> Result<(), LifecycleError> {
        let from = self.lifecycle.phase();
        f(&mut self.lifecycle)?;
        self.publish_phase(from);
        Ok(())
    }

    fn publish_phase(&self, from: Phase) {
        #[cfg(feature = "events")]
        {
            let to = self.lifecycle.phase();
            if from != to {
                self.publish(Event::PhaseChange(PayloadPhaseChange { from, to }));
            }
        }
        #[cfg(not(feature = "events"))]
        let _ = from;
    }

    #[cfg(feature = "events")]
    fn publish(&self, event: Event) {
        if let Some(sink) = &self.events_sink {
            sink.send(event);
        }
    }
}

/// Default panel placement: near the left edge, 100px from the top.
pub fn default_panel_position(viewport: Vec2, size: Vec2, settings: &SettingsDrag) -> Pos2 {
    let m = settings.edge_margin;
    Pos2::new((viewport.x - size.x - m).min(m), 100.)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::{
        analysis::MockAnalyzer,
        settings::SettingsAnalysis,
        storage::MemoryStore,
    };

    const VIEWPORT: Vec2 = Vec2::new(1000., 800.);

    fn overlay(store: MemoryStore, now: Instant) -> ResearchOverlay {
        ResearchOverlay::new(
            PageContext::new("https://arxiv.org/abs/1706.03762", "[1706.03762] Attention"),
            Box::new(MockAnalyzer::new(SettingsAnalysis::default(), "Attention")),
            Box::new(store),
            VIEWPORT,
            now,
        )
        .with_rng(StdRng::seed_from_u64(9))
    }

    #[test]
    fn test_default_positions() {
        let o = overlay(MemoryStore::new(), Instant::now());
        assert_eq!(o.button().position(), Pos2::new(830., 740.));
        assert_eq!(o.panel().position(), Pos2::new(20., 100.));
    }

    #[test]
    fn test_default_panel_position_narrow_viewport() {
        let pos = default_panel_position(
            Vec2::new(310., 600.),
            Vec2::new(300., 227.),
            &SettingsDrag::default(),
        );
        assert_eq!(pos, Pos2::new(-10., 100.));
    }

    #[test]
    fn test_positions_restored_from_store() {
        let store = MemoryStore::new()
            .with_value(BUTTON_POSITION_KEY, r#"{"x":10,"y":20}"#)
            .with_value(PANEL_POSITION_KEY, r#"{"left":"300px","top":"50px"}"#);
        let o = overlay(store, Instant::now());
        assert_eq!(o.button().position(), Pos2::new(10., 20.));
        assert_eq!(o.panel().position(), Pos2::new(300., 50.));
    }

    #[test]
    fn test_hit_test() {
        let now = Instant::now();
        let mut o = overlay(MemoryStore::new(), now);
        assert_eq!(o.hit_test(Pos2::new(840., 750.)), Some(Target::Button));
        // panel is hidden
        assert_eq!(o.hit_test(Pos2::new(30., 110.)), None);

        assert!(o.click(now));
        assert_eq!(o.hit_test(Pos2::new(30., 110.)), Some(Target::Panel));
        assert_eq!(o.hit_test(Pos2::new(30., 200.)), None);
    }

    #[test]
    fn test_close_button_is_not_a_handle() {
        let now = Instant::now();
        let mut o = overlay(MemoryStore::new(), now);
        assert!(o.click(now));

        // panel spans x 20..320, the close button takes the last 32px
        assert_eq!(o.hit_test(Pos2::new(310., 110.)), None);
        assert_eq!(o.hit_test(Pos2::new(280., 110.)), Some(Target::Panel));
    }

    #[test]
    fn test_badge_expires() {
        let now = Instant::now();
        let o = overlay(MemoryStore::new(), now);
        assert_eq!(o.view(now).badge, Some(BADGE_TEXT));
        assert!(o.is_animating(now));
        assert_eq!(o.view(now + Duration::from_secs(5)).badge, None);
        assert!(!o.is_animating(now + Duration::from_secs(5)));
    }

    #[test]
    fn test_panel_drag_persists() {
        let now = Instant::now();
        let mut o = overlay(MemoryStore::new(), now);
        o.click(now);

        assert!(o.pointer_down(Target::Panel, Pointer::Mouse(Pos2::new(30., 110.))));
        assert!(o.view(now).selection_suppressed);
        o.pointer_move(Pointer::Mouse(Pos2::new(130., 160.)));
        assert!(o.end_frame());
        assert_eq!(o.panel().position(), Pos2::new(120., 150.));
        assert_eq!(o.pointer_up(), Some(Target::Panel));
        assert!(!o.view(now).selection_suppressed);
    }

    #[test]
    fn test_cancel_drag() {
        let now = Instant::now();
        let mut o = overlay(MemoryStore::new(), now);
        o.pointer_down(Target::Button, Pointer::Mouse(Pos2::new(840., 750.)));
        o.cancel_drag();
        assert_eq!(o.pointer_up(), None);
    }

    #[test]
    fn test_host_message() {
        let o = overlay(MemoryStore::new(), Instant::now());
        let mut response = String::new();
        o.handle_host_message(r#"{"action":"getArxivUrl"}"#, |r| response = r)
            .unwrap();
        assert_eq!(response, r#"{"url":"https://arxiv.org/abs/1706.03762"}"#);
    }
}
