use std::time::Duration;

use egui::Vec2;
use serde::{Deserialize, Serialize};

/// Status lines cycled by the results panel while an analysis is running.
pub const DEFAULT_LOADING_MESSAGES: [&str; 4] = [
    "Extracting key findings...",
    "Analyzing methodology...",
    "Identifying citations...",
    "Processing conclusions...",
];

/// Dragging and placement of the floating controls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingsDrag {
    /// Pointer travel in pixels, measured from the press point, above which
    /// a press is treated as a drag instead of a click. `0.0` means any
    /// movement at all turns the press into a drag.
    pub click_threshold: f32,

    /// Distance kept from the viewport edges by default placements.
    pub edge_margin: f32,

    /// Size of the trigger button until the first layout pass measures it.
    pub button_size: Vec2,

    /// Size of the results panel until the first layout pass measures it.
    pub panel_size: Vec2,

    /// Height of the strip at the top of the panel that starts a panel drag.
    pub panel_handle_height: f32,

    /// Width at the right end of that strip left to the close button.
    pub panel_close_width: f32,
}

impl Default for SettingsDrag {
    fn default() -> Self {
        Self {
            click_threshold: 0.,
            edge_margin: 20.,
            button_size: Vec2::new(150., 40.),
            panel_size: Vec2::new(300., 227.),
            panel_handle_height: 32.,
            panel_close_width: 32.,
        }
    }
}

impl SettingsDrag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Minimum pointer travel that turns a press into a drag.
    pub fn with_click_threshold(mut self, threshold: f32) -> Self {
        self.click_threshold = threshold.max(0.);
        self
    }

    pub fn with_edge_margin(mut self, margin: f32) -> Self {
        self.edge_margin = margin.max(0.);
        self
    }

    pub fn with_button_size(mut self, size: Vec2) -> Self {
        self.button_size = size;
        self
    }

    pub fn with_panel_size(mut self, size: Vec2) -> Self {
        self.panel_size = size;
        self
    }
}

/// Timing and copy of the results panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingsLifecycle {
    /// Ordered status lines shown while loading
    pub loading_messages: Vec<String>,

    /// How long each status line stays on screen
    pub message_interval: Duration,

    /// Length of the cross-fade played when a result arrives
    pub transition: Duration,

    /// How long the "active" badge is shown after the overlay is created
    pub badge_duration: Duration,
}

impl Default for SettingsLifecycle {
    fn default() -> Self {
        Self {
            loading_messages: DEFAULT_LOADING_MESSAGES
                .iter()
                .map(ToString::to_string)
                .collect(),
            message_interval: Duration::from_millis(3000),
            transition: Duration::from_millis(300),
            badge_duration: Duration::from_millis(5000),
        }
    }
}

impl SettingsLifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_loading_messages<I, S>(mut self, messages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.loading_messages = messages.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_message_interval(mut self, interval: Duration) -> Self {
        self.message_interval = interval;
        self
    }

    pub fn with_transition(mut self, transition: Duration) -> Self {
        self.transition = transition;
        self
    }

    pub fn with_badge_duration(mut self, duration: Duration) -> Self {
        self.badge_duration = duration;
        self
    }
}

/// Behavior of the stubbed analysis backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsAnalysis {
    /// Simulated processing time
    pub delay: Duration,

    /// When set, every request fails with this message
    pub failure: Option<String>,
}

impl Default for SettingsAnalysis {
    fn default() -> Self {
        Self {
            delay: Duration::from_millis(2000),
            failure: None,
        }
    }
}

impl SettingsAnalysis {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_failure(mut self, message: impl Into<String>) -> Self {
        self.failure = Some(message.into());
        self
    }
}
