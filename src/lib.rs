mod analysis;
mod drag;
mod error;
mod lifecycle;
mod messaging;
mod overlay;
mod page;
mod popup;
mod research;
mod settings;
mod storage;
mod trigger;
mod view;
mod widget;

pub use self::analysis::{
    AnalysisFailure, AnalysisOutcome, AnalysisReport, AnalysisResponse, Analyzer, MockAnalyzer,
    PendingAnalysis,
};
pub use self::drag::{clamp_to_viewport, DragState, DraggableSurface, Pointer};
pub use self::error::{LifecycleError, MessagingError, StorageError};
pub use self::lifecycle::{Action, Lifecycle, Phase};
pub use self::messaging::{HostMessenger, HostRequest, HostResponse};
pub use self::overlay::{default_panel_position, ResearchOverlay, Target};
pub use self::page::{arxiv_title, PageContext};
pub use self::popup::{
    Preference, Preferences, PopupState, SupportLink, EARLY_ACCESS_NOTE, EARLY_ACCESS_TITLE,
    SUPPORT_LINKS, THINKING_INTERVAL, THINKING_MESSAGES, THINKING_TITLE,
};
pub use self::research::{
    Insight, InsightLevel, ResearchResult, ResearchScores, FALLBACK_TITLE, INSIGHTS,
};
pub use self::settings::{SettingsAnalysis, SettingsDrag, SettingsLifecycle};
pub use self::storage::{
    decode_position, encode_position, load_position, save_position, EguiStore, MemoryStore,
    PositionStore, BUTTON_POSITION_KEY, PANEL_POSITION_KEY,
};
pub use self::trigger::{InFlight, TriggerButton};
pub use self::view::{
    ButtonView, OverlayView, PanelView, BADGE_TEXT, BUTTON_CAPTION, BUTTON_LABEL, RETRY_HINT,
};

#[cfg(feature = "events")]
pub mod events;
