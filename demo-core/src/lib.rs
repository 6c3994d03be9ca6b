use std::time::Duration;

use eframe::{App, CreationContext};
use egui::{self, CollapsingHeader, RichText, ScrollArea, Ui};
use instant::Instant;
use research_copilot::{
    EguiStore, HostResponse, MockAnalyzer, PageContext, Preference, PopupState, ResearchOverlay,
    SettingsAnalysis, SettingsDrag, EARLY_ACCESS_NOTE, EARLY_ACCESS_TITLE, SUPPORT_LINKS,
    THINKING_TITLE,
};
use tracing::{info, warn};

#[cfg(feature = "events")]
pub const EVENTS_LIMIT: usize = 200;

#[cfg(feature = "events")]
pub use crossbeam::channel::{unbounded, Receiver, Sender};
#[cfg(feature = "events")]
pub use research_copilot::events::Event;

pub mod settings_local {
    pub struct SettingsPage {
        pub url: String,
        pub title: String,
    }
    impl Default for SettingsPage {
        fn default() -> Self {
            Self {
                url: "https://arxiv.org/abs/1706.03762".to_string(),
                title: "[1706.03762] Attention Is All You Need".to_string(),
            }
        }
    }

    pub struct SettingsAnalysis {
        pub delay_ms: u64,
        pub fail: bool,
        pub failure_message: String,
    }
    impl Default for SettingsAnalysis {
        fn default() -> Self {
            Self {
                delay_ms: 2000,
                fail: false,
                failure_message: "service unavailable".to_string(),
            }
        }
    }

    #[derive(Default)]
    pub struct SettingsDrag {
        pub click_threshold: f32,
    }
}

pub use settings_local as settings;

const ABSTRACT: &str = "The dominant sequence transduction models are based on complex recurrent or \
convolutional neural networks that include an encoder and a decoder. The best performing models also \
connect the encoder and decoder through an attention mechanism. We propose a new simple network \
architecture, the Transformer, based solely on attention mechanisms, dispensing with recurrence and \
convolutions entirely.";

pub struct DemoApp {
    pub overlay: Option<ResearchOverlay>,
    pub settings_page: settings::SettingsPage,
    pub settings_analysis: settings::SettingsAnalysis,
    pub settings_drag: settings::SettingsDrag,
    pub popup: PopupState,
    pub show_popup: bool,
    pub show_sidebar: bool,
    pub host_request: String,
    pub host_reply: String,
    #[cfg(feature = "events")]
    pub last_events: Vec<String>,
    #[cfg(feature = "events")]
    pub event_publisher: crate::Sender<Event>,
    #[cfg(feature = "events")]
    pub event_consumer: crate::Receiver<Event>,
}

impl DemoApp {
    pub fn new(cc: &CreationContext<'_>) -> Self {
        #[cfg(feature = "events")]
        let (event_publisher, event_consumer) = crate::unbounded();

        info!(
            dark_mode = cc.egui_ctx.style().visuals.dark_mode,
            "demo started"
        );

        Self {
            overlay: None,
            settings_page: settings::SettingsPage::default(),
            settings_analysis: settings::SettingsAnalysis::default(),
            settings_drag: settings::SettingsDrag::default(),
            popup: PopupState::new(),
            show_popup: false,
            show_sidebar: true,
            host_request: r#"{"action":"getArxivUrl"}"#.to_string(),
            host_reply: String::new(),
            #[cfg(feature = "events")]
            last_events: Vec::new(),
            #[cfg(feature = "events")]
            event_publisher,
            #[cfg(feature = "events")]
            event_consumer,
        }
    }

    /// Mounts the overlay on the given page instead of the sample paper.
    pub fn with_page(mut self, url: impl Into<String>, title: impl Into<String>) -> Self {
        self.settings_page.url = url.into();
        self.settings_page.title = title.into();
        self.remount();
        self
    }

    fn page(&self) -> PageContext {
        PageContext::new(&self.settings_page.url, &self.settings_page.title)
    }

    fn mount(&self, ui: &Ui) -> ResearchOverlay {
        let mut analysis =
            SettingsAnalysis::new().with_delay(Duration::from_millis(self.settings_analysis.delay_ms));
        if self.settings_analysis.fail {
            analysis = analysis.with_failure(self.settings_analysis.failure_message.clone());
        }
        let page = self.page();
        let title = page.paper_title().unwrap_or_default().to_string();

        let overlay = ResearchOverlay::new(
            page,
            Box::new(MockAnalyzer::new(analysis, title)),
            Box::new(EguiStore::new(ui.ctx().clone())),
            ui.available_size(),
            Instant::now(),
        )
        .with_settings_drag(
            SettingsDrag::new().with_click_threshold(self.settings_drag.click_threshold),
        );

        #[cfg(feature = "events")]
        let overlay = overlay.with_events(Box::new(self.event_publisher.clone()));

        overlay
    }

    /// Drops the overlay so the next frame mounts it with current settings.
    /// Positions survive through the egui store.
    pub fn remount(&mut self) {
        self.overlay = None;
    }

    /// Sends `raw` to the overlay the way the extension host would.
    pub fn send_host_message(&self, raw: &str) -> Option<String> {
        let overlay = self.overlay.as_ref()?;
        let mut reply = None;
        if let Err(err) = overlay.handle_host_message(raw, |r| reply = Some(r)) {
            warn!(%err, "host message rejected");
            return Some(format!("error: {err}"));
        }
        reply
    }

    fn refresh_popup_url(&mut self) {
        let Some(reply) = self.send_host_message(r#"{"action":"getArxivUrl"}"#) else {
            return;
        };
        match serde_json::from_str::<HostResponse>(&reply) {
            Ok(HostResponse::Url { url }) => self.popup.set_current_url(url),
            Err(err) => warn!(%err, "unexpected host reply"),
        }
    }

    pub fn ui_page(&mut self, ui: &mut Ui) {
        CollapsingHeader::new("Page").default_open(true).show(ui, |ui| {
            ui.label("URL");
            ui.text_edit_singleline(&mut self.settings_page.url);
            ui.label("Document title");
            ui.text_edit_singleline(&mut self.settings_page.title);
            if ui.button("Reload page").clicked() {
                self.remount();
            }
        });
    }

    pub fn ui_analysis(&mut self, ui: &mut Ui) {
        CollapsingHeader::new("Analysis").default_open(true).show(ui, |ui| {
            let mut changed = ui
                .add(
                    egui::Slider::new(&mut self.settings_analysis.delay_ms, 0..=10_000)
                        .text("delay, ms"),
                )
                .changed();
            changed |= ui
                .checkbox(&mut self.settings_analysis.fail, "simulate failure")
                .changed();
            ui.add_enabled_ui(self.settings_analysis.fail, |ui| {
                changed |= ui
                    .text_edit_singleline(&mut self.settings_analysis.failure_message)
                    .lost_focus();
            });
            if changed {
                self.remount();
            }
        });
    }

    pub fn ui_drag(&mut self, ui: &mut Ui) {
        CollapsingHeader::new("Dragging").default_open(true).show(ui, |ui| {
            if ui
                .add(
                    egui::Slider::new(&mut self.settings_drag.click_threshold, 0.0..=20.0)
                        .text("click threshold, px"),
                )
                .changed()
            {
                self.remount();
            }
            if let Some(overlay) = &self.overlay {
                let b = overlay.button().position();
                let p = overlay.panel().position();
                ui.label(format!("button: ({:.0}, {:.0})", b.x, b.y));
                ui.label(format!("panel: ({:.0}, {:.0})", p.x, p.y));
                ui.label(format!("phase: {:?}", overlay.phase()));
            }
        });
    }

    pub fn ui_host(&mut self, ui: &mut Ui) {
        CollapsingHeader::new("Host messaging").show(ui, |ui| {
            ui.text_edit_singleline(&mut self.host_request);
            if ui.button("Send").clicked() {
                let raw = self.host_request.clone();
                self.host_reply = self
                    .send_host_message(&raw)
                    .unwrap_or_else(|| "no response".to_string());
            }
            if !self.host_reply.is_empty() {
                ui.code(&self.host_reply);
            }
        });
    }

    #[cfg(feature = "events")]
    pub fn ui_events(&mut self, ui: &mut Ui) {
        self.last_events
            .extend(self.event_consumer.try_iter().map(|e| format!("{e:?}")));
        if self.last_events.len() > EVENTS_LIMIT {
            let excess = self.last_events.len() - EVENTS_LIMIT;
            self.last_events.drain(..excess);
        }

        CollapsingHeader::new("Events").default_open(true).show(ui, |ui| {
            if ui.button("Clear").clicked() {
                self.last_events.clear();
            }
            ScrollArea::vertical().max_height(200.0).show(ui, |ui| {
                for e in self.last_events.iter().rev() {
                    ui.label(e);
                }
            });
        });
    }

    pub fn ui_popup(&mut self, ctx: &egui::Context) {
        let mut open = self.show_popup;
        egui::Window::new("Elacity")
            .open(&mut open)
            .resizable(false)
            .default_width(300.0)
            .show(ctx, |ui| {
                if let Some(url) = self.popup.current_url() {
                    ui.small(url);
                }
                ui.separator();

                ui.label(RichText::new("Preferences").strong());
                for pref in Preference::ALL {
                    let mut value = self.popup.preferences().get(pref);
                    if ui.checkbox(&mut value, pref.label()).changed() {
                        self.popup.toggle(pref);
                    }
                }
                ui.separator();

                ui.label(RichText::new("Support").strong());
                for link in SUPPORT_LINKS {
                    if ui.link(link.label).on_hover_text(link.description).clicked() {
                        info!(link = link.label, "support link opened");
                    }
                }
                ui.separator();

                ui.label(RichText::new(EARLY_ACCESS_TITLE).strong());
                ui.small(EARLY_ACCESS_NOTE);
                if ui.button("Try it").clicked() {
                    self.popup.open_thinking(Instant::now());
                }

                if let Some(message) = self.popup.thinking_message(Instant::now()) {
                    ui.separator();
                    ui.horizontal(|ui| {
                        ui.spinner();
                        ui.label(THINKING_TITLE);
                        if ui.small_button("✕").clicked() {
                            self.popup.close_thinking();
                        }
                    });
                    ui.label(message);
                    ui.ctx().request_repaint_after(Duration::from_millis(250));
                }
            });
        self.show_popup = open;
    }

    fn ui_arxiv_page(&self, ui: &mut Ui, selectable: bool) {
        ui.style_mut().interaction.selectable_labels = selectable;
        ui.small(&self.settings_page.url);
        let title = research_copilot::arxiv_title(&self.settings_page.title)
            .unwrap_or(&self.settings_page.title);
        ui.heading(title);
        ui.label(RichText::new("Ashish Vaswani, Noam Shazeer, Niki Parmar, et al.").italics());
        ui.add_space(8.0);
        ui.label(RichText::new("Abstract").strong());
        ui.label(ABSTRACT);
    }
}

impl App for DemoApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.toggle_value(&mut self.show_sidebar, "Settings");
                if ui.toggle_value(&mut self.show_popup, "Extension popup").clicked()
                    && self.show_popup
                {
                    self.refresh_popup_url();
                }
            });
        });

        if self.show_sidebar {
            egui::SidePanel::right("right")
                .default_width(300.0)
                .min_width(300.0)
                .show(ctx, |ui| {
                    ScrollArea::vertical().show(ui, |ui| {
                        self.ui_page(ui);
                        self.ui_analysis(ui);
                        self.ui_drag(ui);
                        self.ui_host(ui);
                        #[cfg(feature = "events")]
                        self.ui_events(ui);
                    });
                });
        }

        if self.show_popup {
            self.ui_popup(ctx);
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            let rect = ui.max_rect();
            if self.overlay.is_none() {
                self.overlay = Some(self.mount(ui));
            }

            let selectable = self.overlay.as_ref().map_or(true, |o| {
                !o.button().selection_suppressed() && !o.panel().selection_suppressed()
            });
            self.ui_arxiv_page(ui, selectable);

            if let Some(overlay) = self.overlay.as_mut() {
                ui.put(rect, overlay);
            }
        });
    }
}
