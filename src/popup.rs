use std::time::Duration;

use instant::Instant;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::lifecycle::cycled;

pub const EARLY_ACCESS_TITLE: &str = "Early Access";
pub const EARLY_ACCESS_NOTE: &str =
    "Elacity is currently in development. Research analysis features will be available soon.";
pub const THINKING_TITLE: &str = "Elacity is thinking...";

pub const THINKING_MESSAGES: [&str; 5] = [
    "Extracting key findings...",
    "Analyzing methodology...",
    "Identifying citations...",
    "Processing conclusions...",
    "Evaluating impact...",
];
pub const THINKING_INTERVAL: Duration = Duration::from_millis(3000);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Preference {
    AlertsForListings,
    AlertsForMessages,
    AutoScanPages,
    ProvideImprovementData,
}

impl Preference {
    pub const ALL: [Preference; 4] = [
        Preference::AlertsForListings,
        Preference::AlertsForMessages,
        Preference::AutoScanPages,
        Preference::ProvideImprovementData,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Preference::AlertsForListings => "Alerts for listings",
            Preference::AlertsForMessages => "Alerts for messages",
            Preference::AutoScanPages => "Auto-scan pages",
            Preference::ProvideImprovementData => "Provide improvement data",
        }
    }
}

/// User toggles shown in the popup. Held in memory only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    pub alerts_for_listings: bool,
    pub alerts_for_messages: bool,
    pub auto_scan_pages: bool,
    pub provide_improvement_data: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            alerts_for_listings: true,
            alerts_for_messages: true,
            auto_scan_pages: false,
            provide_improvement_data: true,
        }
    }
}

impl Preferences {
    pub fn get(&self, pref: Preference) -> bool {
        match pref {
            Preference::AlertsForListings => self.alerts_for_listings,
            Preference::AlertsForMessages => self.alerts_for_messages,
            Preference::AutoScanPages => self.auto_scan_pages,
            Preference::ProvideImprovementData => self.provide_improvement_data,
        }
    }

    /// Flips `pref` and returns the new value.
    pub fn toggle(&mut self, pref: Preference) -> bool {
        let slot = match pref {
            Preference::AlertsForListings => &mut self.alerts_for_listings,
            Preference::AlertsForMessages => &mut self.alerts_for_messages,
            Preference::AutoScanPages => &mut self.auto_scan_pages,
            Preference::ProvideImprovementData => &mut self.provide_improvement_data,
        };
        *slot = !*slot;
        debug!(?pref, value = *slot, "preference toggled");
        *slot
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SupportLink {
    pub label: &'static str,
    pub description: &'static str,
}

pub const SUPPORT_LINKS: [SupportLink; 2] = [
    SupportLink {
        label: "Contact support",
        description: "Get help from our team",
    },
    SupportLink {
        label: "Provide feedback",
        description: "Help us improve Elacity",
    },
];

/// State behind the extension's toolbar popup.
#[derive(Debug, Clone, Default)]
pub struct PopupState {
    current_url: Option<String>,
    preferences: Preferences,
    thinking_since: Option<Instant>,
}

impl PopupState {
    pub fn new() -> Self {
        Self::default()
    }

    /// URL of the active tab, once the host reported it.
    pub fn current_url(&self) -> Option<&str> {
        self.current_url.as_deref()
    }

    pub fn set_current_url(&mut self, url: impl Into<String>) {
        self.current_url = Some(url.into());
    }

    pub fn preferences(&self) -> &Preferences {
        &self.preferences
    }

    pub fn toggle(&mut self, pref: Preference) -> bool {
        self.preferences.toggle(pref)
    }

    pub fn open_thinking(&mut self, now: Instant) {
        self.thinking_since = Some(now);
    }

    pub fn close_thinking(&mut self) {
        self.thinking_since = None;
    }

    pub fn is_thinking(&self) -> bool {
        self.thinking_since.is_some()
    }

    /// Message of the thinking overlay due at `now`, `None` while closed.
    pub fn thinking_message(&self, now: Instant) -> Option<&'static str> {
        let since = self.thinking_since?;
        cycled(
            &THINKING_MESSAGES,
            THINKING_INTERVAL,
            now.saturating_duration_since(since),
        )
    }
}
