use std::time::Duration;

use instant::Instant;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{error::LifecycleError, research::ResearchResult, settings::SettingsLifecycle};

/// Discrete UI state of the results panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Phase {
    #[default]
    Hidden,
    Loading,
    Success,
    Error,
    Detail,
}

/// User or backend event fed to the lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    Begin,
    Resolve,
    Dismiss,
    ShowDetail,
    Back,
    Close,
}

/// Picks the entry of `messages` that is due after `elapsed`, cycling.
pub(crate) fn cycled<S: AsRef<str>>(
    messages: &[S],
    interval: Duration,
    elapsed: Duration,
) -> Option<&str> {
    if messages.is_empty() {
        return None;
    }
    let interval = interval.as_nanos();
    let step = if interval == 0 {
        0
    } else {
        (elapsed.as_nanos() / interval) as usize
    };
    Some(messages[step % messages.len()].as_ref())
}

/// State machine of the floating results panel.
///
/// `Success` and `Error` are only reachable from `Loading`, and only by the
/// request that entered `Loading` most recently.
#[derive(Debug, Clone)]
pub struct Lifecycle {
    phase: Phase,
    generation: u64,
    loading_since: Option<Instant>,
    resolved_at: Option<Instant>,
    result: Option<ResearchResult>,
    error: Option<String>,
    settings: SettingsLifecycle,
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new(SettingsLifecycle::default())
    }
}

impl Lifecycle {
    pub fn new(settings: SettingsLifecycle) -> Self {
        Self {
            phase: Phase::Hidden,
            generation: 0,
            loading_since: None,
            resolved_at: None,
            result: None,
            error: None,
            settings,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Number of the request that most recently entered `Loading`.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn result(&self) -> Option<&ResearchResult> {
        self.result.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn settings(&self) -> &SettingsLifecycle {
        &self.settings
    }

    pub fn set_settings(&mut self, settings: SettingsLifecycle) {
        self.settings = settings;
    }

    /// Enters `Loading` and returns the generation of the new request.
    ///
    /// A result or error that is still on screen is closed first.
    ///
    /// # Errors
    ///
    /// Rejected while a request is already loading.
    pub fn begin(&mut self, now: Instant) -> Result<u64, LifecycleError> {
        if self.phase == Phase::Loading {
            return Err(self.invalid(Action::Begin));
        }
        if self.phase != Phase::Hidden {
            self.close();
        }

        self.generation += 1;
        self.loading_since = Some(now);
        self.enter(Phase::Loading);
        Ok(self.generation)
    }

    /// Applies the outcome of request `generation`.
    ///
    /// # Errors
    ///
    /// [`LifecycleError::InvalidTransition`] outside `Loading` and
    /// [`LifecycleError::StaleResult`] if the request is not the one
    /// currently loading. The outcome must be dropped in both cases.
    pub fn resolve(
        &mut self,
        generation: u64,
        outcome: Result<ResearchResult, String>,
        now: Instant,
    ) -> Result<Phase, LifecycleError> {
        if self.phase != Phase::Loading {
            return Err(self.invalid(Action::Resolve));
        }
        if generation != self.generation {
            return Err(LifecycleError::StaleResult { generation });
        }

        self.loading_since = None;
        self.resolved_at = Some(now);
        match outcome {
            Ok(result) => {
                self.result = Some(result);
                self.enter(Phase::Success);
            }
            Err(message) => {
                self.error = Some(message);
                self.enter(Phase::Error);
            }
        }
        Ok(self.phase)
    }

    /// Dismisses a shown result or error.
    ///
    /// # Errors
    ///
    /// Only allowed from `Success` and `Error`.
    pub fn dismiss(&mut self) -> Result<(), LifecycleError> {
        match self.phase {
            Phase::Success | Phase::Error => {
                self.close();
                Ok(())
            }
            _ => Err(self.invalid(Action::Dismiss)),
        }
    }

    /// # Errors
    ///
    /// Only allowed from `Success`.
    pub fn show_detail(&mut self) -> Result<(), LifecycleError> {
        if self.phase != Phase::Success {
            return Err(self.invalid(Action::ShowDetail));
        }
        self.enter(Phase::Detail);
        Ok(())
    }

    /// Returns from the detail view to the unchanged result.
    ///
    /// # Errors
    ///
    /// Only allowed from `Detail`.
    pub fn back(&mut self) -> Result<(), LifecycleError> {
        if self.phase != Phase::Detail {
            return Err(self.invalid(Action::Back));
        }
        self.enter(Phase::Success);
        Ok(())
    }

    /// Hides the panel from any phase. A request still in flight keeps
    /// running but its outcome will be stale.
    pub fn close(&mut self) {
        self.loading_since = None;
        self.resolved_at = None;
        self.result = None;
        self.error = None;
        self.enter(Phase::Hidden);
    }

    /// Status line due at `now`, `None` unless loading.
    pub fn status_message(&self, now: Instant) -> Option<&str> {
        if self.phase != Phase::Loading {
            return None;
        }
        let since = self.loading_since?;
        cycled(
            self.settings.loading_messages.as_slice(),
            self.settings.message_interval,
            now.saturating_duration_since(since),
        )
    }

    /// Progress `0..=1` of the result transition, `None` outside
    /// `Success`/`Error`.
    pub fn transition_progress(&self, now: Instant) -> Option<f32> {
        if !matches!(self.phase, Phase::Success | Phase::Error) {
            return None;
        }
        let at = self.resolved_at?;
        let total = self.settings.transition.as_secs_f32();
        if total <= 0. {
            return Some(1.);
        }
        Some((now.saturating_duration_since(at).as_secs_f32() / total).min(1.))
    }

    fn enter(&mut self, phase: Phase) {
        if self.phase != phase {
            debug!(from = ?self.phase, to = ?phase, "panel phase");
        }
        self.phase = phase;
    }

    fn invalid(&self, action: Action) -> LifecycleError {
        LifecycleError::InvalidTransition {
            from: self.phase,
            action,
        }
    }
}
