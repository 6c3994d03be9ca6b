use egui::{
    Align2, Area, Color32, CursorIcon, FontId, Frame, Id, Order, Pos2, Rect, Response, RichText,
    Sense, Stroke, Ui, Vec2, Widget,
};
use instant::Instant;
use tracing::{info, warn};

use crate::{
    drag::Pointer,
    overlay::{ResearchOverlay, Target},
    popup::THINKING_TITLE,
    research::{InsightLevel, ResearchScores},
    storage::{BUTTON_POSITION_KEY, PANEL_POSITION_KEY},
    view::{PanelView, BUTTON_CAPTION, BUTTON_LABEL, RETRY_HINT},
};

const ACCENT: Color32 = Color32::from_rgb(0x6D, 0x28, 0xD9);
const FLAW: Color32 = Color32::from_rgb(0xDC, 0x26, 0x26);
const MUTED: Color32 = Color32::from_rgb(0x9F, 0x9F, 0xA9);

/// Button presses inside the panel, applied after drawing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PanelAction {
    Close,
    Dismiss,
    ShowDetail,
    Back,
    Explore,
}

/// Draws the overlay over the area given to it, which is treated as the
/// page viewport.
impl Widget for &mut ResearchOverlay {
    fn ui(self, ui: &mut Ui) -> Response {
        let now = Instant::now();
        let (resp, painter) = ui.allocate_painter(ui.available_size(), Sense::hover());
        let origin = resp.rect.left_top().to_vec2();

        self.resize_viewport(resp.rect.size());
        self.handle_pointer(ui, origin, now);
        self.tick(now);
        self.end_frame();

        let view = self.view(now);
        let ctx = ui.ctx().clone();

        if view.selection_suppressed {
            ctx.set_cursor_icon(CursorIcon::Grabbing);
        } else if let Some(pos) = ctx.pointer_hover_pos() {
            if self.hit_test(pos - origin).is_some() {
                ctx.set_cursor_icon(CursorIcon::Grab);
            }
        }

        if let Some(badge) = view.badge {
            painter.text(
                resp.rect.right_top() + Vec2::new(-12., 12.),
                Align2::RIGHT_TOP,
                badge,
                FontId::proportional(12.),
                ACCENT,
            );
        }

        draw_button(&ctx, view.button.rect.translate(origin), view.button.dragging);

        let mut action = None;
        if view.panel.is_visible() {
            let panel = Area::new(Id::new(PANEL_POSITION_KEY))
                .order(Order::Foreground)
                .fixed_pos(view.panel_rect.min + origin)
                .show(&ctx, |ui| {
                    ui.style_mut().interaction.selectable_labels = !view.selection_suppressed;
                    Frame::popup(ui.style()).show(ui, |ui| {
                        ui.set_width(view.panel_rect.width());
                        draw_panel(ui, &view.panel)
                    })
                });
            action = panel.inner.inner;
            let measured = panel.response.rect.size();
            if measured != self.panel().size() {
                let button = self.button().size();
                self.set_sizes(button, measured);
            }
        }

        if let Some(action) = action {
            self.apply(action);
        }

        if self.is_animating(now) || view.selection_suppressed {
            ctx.request_repaint();
        }

        resp
    }
}

impl ResearchOverlay {
    fn handle_pointer(&mut self, ui: &Ui, origin: Vec2, now: Instant) {
        let (pressed, released, moved, pos, touches) = ui.input(|i| {
            (
                i.pointer.primary_pressed(),
                i.pointer.primary_released(),
                i.pointer.delta() != Vec2::ZERO,
                i.pointer.interact_pos(),
                i.any_touches()
                    .then(|| i.multi_touch().map_or(1, |t| t.num_touches)),
            )
        });

        let pointer = pos.map(|pos: Pos2| {
            let pos = pos - origin;
            match touches {
                Some(points) => Pointer::Touch { pos, points },
                None => Pointer::Mouse(pos),
            }
        });

        if pressed {
            if let Some(pointer) = pointer {
                let hit = pointer.single().and_then(|pos| self.hit_test(pos));
                if let Some(target) = hit {
                    self.pointer_down(target, pointer);
                }
            }
        }
        if moved {
            if let Some(pointer) = pointer {
                self.pointer_move(pointer);
            }
        }
        if released && self.pointer_up() == Some(Target::Button) && self.button().is_click() {
            self.click(now);
        }
    }

    fn apply(&mut self, action: PanelAction) {
        let res = match action {
            PanelAction::Close => {
                self.close();
                Ok(())
            }
            PanelAction::Dismiss => self.dismiss(),
            PanelAction::ShowDetail => self.show_detail(),
            PanelAction::Back => self.back(),
            PanelAction::Explore => {
                info!(url = self.page().url(), "explore related papers");
                Ok(())
            }
        };
        if let Err(err) = res {
            warn!(%err, ?action, "panel action ignored");
        }
    }
}

fn draw_button(ctx: &egui::Context, rect: Rect, dragging: bool) {
    Area::new(Id::new(BUTTON_POSITION_KEY))
        .order(Order::Foreground)
        .fixed_pos(rect.min)
        .show(ctx, |ui| {
            let (resp, painter) = ui.allocate_painter(rect.size(), Sense::hover());
            let fill = if dragging {
                ACCENT.gamma_multiply(0.8)
            } else {
                ACCENT
            };
            painter.rect_filled(resp.rect, 20., fill);
            painter.text(
                resp.rect.center(),
                Align2::CENTER_CENTER,
                format!("{BUTTON_LABEL} {BUTTON_CAPTION}"),
                FontId::proportional(14.),
                Color32::WHITE,
            );
        });
}

fn draw_panel(ui: &mut Ui, panel: &PanelView) -> Option<PanelAction> {
    let mut action = None;

    ui.horizontal(|ui| {
        ui.label(RichText::new("Elacity Research").strong());
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui.small_button("✕").clicked() {
                action = Some(PanelAction::Close);
            }
        });
    });
    ui.separator();

    match panel {
        PanelView::Hidden => {}
        PanelView::Loading { status } => {
            ui.vertical_centered(|ui| {
                ui.spinner();
                ui.label(RichText::new(THINKING_TITLE).strong());
                ui.colored_label(MUTED, status);
            });
        }
        PanelView::Success {
            title,
            scores,
            fade,
        } => {
            ui.multiply_opacity(*fade);
            ui.label(RichText::new(title).heading());
            draw_scores(ui, scores);
            ui.horizontal(|ui| {
                if ui.button("Breakdown").clicked() {
                    action = Some(PanelAction::ShowDetail);
                }
                if ui.button("Dismiss").clicked() {
                    action = Some(PanelAction::Dismiss);
                }
            });
        }
        PanelView::Error { message, fade } => {
            ui.multiply_opacity(*fade);
            ui.colored_label(FLAW, message);
            ui.colored_label(MUTED, RETRY_HINT);
            if ui.button("Dismiss").clicked() {
                action = Some(PanelAction::Dismiss);
            }
        }
        PanelView::Detail { title, insights } => {
            if ui.button("← Back").clicked() {
                action = Some(PanelAction::Back);
            }
            ui.label(RichText::new(title).strong());
            for insight in *insights {
                let color = match insight.level {
                    InsightLevel::Insight => ACCENT,
                    InsightLevel::Flaw => FLAW,
                };
                ui.colored_label(color, insight.label());
                ui.label(insight.description);
                ui.add_space(4.);
            }
            if ui.button("Explore related papers").clicked() {
                action = Some(PanelAction::Explore);
            }
        }
    }

    action
}

fn draw_scores(ui: &mut Ui, scores: &ResearchScores) {
    egui::Grid::new("research_scores")
        .num_columns(2)
        .show(ui, |ui| {
            for (label, value) in [
                ("Methodological rigor", scores.methodological_rigor),
                ("Data quality", scores.data_quality),
                ("Innovation level", scores.innovation_level),
            ] {
                ui.label(label);
                ui.label(format!("{value}/10"));
                ui.end_row();
            }
        });
    ui.add_space(4.);
    ui.painter().line_segment(
        [ui.cursor().left_top(), ui.cursor().right_top()],
        Stroke::new(1., MUTED),
    );
    ui.colored_label(ACCENT, scores.insight_summary());
}
