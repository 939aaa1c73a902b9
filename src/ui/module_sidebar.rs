use crate::app::DashboardTab;
use crate::ui::theme;
use egui::{Color32, RichText, Ui};
use egui_phosphor::regular as ph;
use mission_roadmap::model::{module::DEFAULT_LAT, Module, ModuleProgress, TaskCounts};
use mission_roadmap::TaskStore;
use uuid::Uuid;

/// Actions that the module sidebar can request.
pub enum SidebarAction {
    None,
    Select(Uuid),
    Add,
    Edit(Uuid),
    Delete(Uuid),
}

fn stat_card(ui: &mut Ui, caption: &str, value: RichText) {
    egui::Frame {
        fill: theme::BG_DARK,
        rounding: egui::Rounding::same(4.0),
        inner_margin: egui::Margin::symmetric(8.0, 6.0),
        outer_margin: egui::Margin::ZERO,
        stroke: egui::Stroke::new(1.0, theme::BORDER_SUBTLE),
        shadow: egui::epaint::Shadow::NONE,
    }
    .show(ui, |ui| {
        ui.set_width(70.0);
        ui.vertical(|ui| {
            ui.label(RichText::new(caption).size(9.0).color(theme::TEXT_DIM));
            ui.label(value);
        });
    });
}

/// Render the left-side module feed.
pub fn show_module_sidebar(store: &TaskStore, selected: Option<Uuid>, ui: &mut Ui) -> SidebarAction {
    let mut action = SidebarAction::None;
    let modules = store.modules();

    let active = modules
        .iter()
        .filter(|m| store.module_progress(m.id) == ModuleProgress::InProgress)
        .count();
    let avg_lat = if modules.is_empty() {
        DEFAULT_LAT
    } else {
        modules.iter().map(|m| m.lat).sum::<f64>() / modules.len() as f64
    };

    ui.add_space(2.0);
    ui.label(
        RichText::new(store.project().name.to_uppercase())
            .strong()
            .size(15.0)
            .color(theme::TEXT_PRIMARY),
    );
    ui.add_space(6.0);

    ui.horizontal(|ui| {
        stat_card(
            ui,
            "MODULES",
            RichText::new(modules.len().to_string()).monospace().size(15.0),
        );
        stat_card(
            ui,
            "ACTIVE",
            RichText::new(active.to_string())
                .monospace()
                .size(15.0)
                .color(theme::SUCCESS),
        );
        stat_card(
            ui,
            "LAT",
            RichText::new(format!("{:.4}", avg_lat)).monospace().size(12.0),
        );
    });

    ui.add_space(6.0);

    let btn = egui::Button::new(
        RichText::new(format!("{}  Add Module", ph::PLUS))
            .color(Color32::WHITE)
            .size(12.0),
    )
    .fill(theme::ACCENT)
    .rounding(egui::Rounding::same(5.0));
    if ui.add_sized([ui.available_width(), 30.0], btn).clicked() {
        action = SidebarAction::Add;
    }

    ui.add_space(6.0);
    ui.separator();
    ui.label(RichText::new("MODULE FEED").size(9.0).strong().color(theme::TEXT_DIM));
    ui.add_space(2.0);

    if modules.is_empty() {
        ui.add_space(20.0);
        ui.vertical_centered(|ui| {
            ui.label(RichText::new("No modules yet").color(theme::TEXT_DIM));
        });
        return action;
    }

    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui| {
            for module in &modules {
                if let Some(a) = module_row(ui, store, module, selected == Some(module.id)) {
                    action = a;
                }
                ui.add_space(2.0);
            }
        });

    action
}

fn module_row(ui: &mut Ui, store: &TaskStore, module: &Module, is_selected: bool) -> Option<SidebarAction> {
    let mut action = None;
    let tint = module.color.unwrap_or(theme::ACCENT);
    let (badge, badge_color) = theme::progress_badge(store.module_progress(module.id));

    let frame = egui::Frame {
        fill: if is_selected { theme::BG_SELECTED } else { theme::BG_DARK },
        rounding: egui::Rounding::same(6.0),
        inner_margin: egui::Margin::symmetric(8.0, 6.0),
        outer_margin: egui::Margin::ZERO,
        stroke: if is_selected {
            egui::Stroke::new(1.0, theme::BORDER_ACCENT)
        } else {
            egui::Stroke::new(1.0, theme::BORDER_SUBTLE)
        },
        shadow: egui::epaint::Shadow::NONE,
    };

    frame.show(ui, |ui| {
        ui.horizontal(|ui| {
            let icon = ui.add(
                egui::Label::new(
                    RichText::new(theme::module_icon_glyph(module.resolved_icon()))
                        .size(18.0)
                        .color(tint),
                )
                .sense(egui::Sense::click()),
            );
            if icon.clicked() {
                action = Some(SidebarAction::Select(module.id));
            }
            ui.vertical(|ui| {
                ui.horizontal(|ui| {
                    let name = ui.add(
                        egui::Label::new(RichText::new(&module.name).strong().size(12.5))
                            .truncate()
                            .sense(egui::Sense::click()),
                    );
                    if name.clicked() {
                        action = Some(SidebarAction::Select(module.id));
                    }
                    ui.label(RichText::new(badge).color(badge_color))
                        .on_hover_text(store.module_progress(module.id).label());
                });
                ui.label(
                    RichText::new(format!("{:.4}, {:.4}", module.lat, module.lng))
                        .monospace()
                        .size(9.5)
                        .color(theme::TEXT_DIM),
                );
            });

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let del = ui.add(
                    egui::Button::new(RichText::new(ph::TRASH).size(12.0).color(theme::TEXT_DIM))
                        .frame(false),
                );
                if del.on_hover_text("Delete module").clicked() {
                    action = Some(SidebarAction::Delete(module.id));
                }
                let edit = ui.add(
                    egui::Button::new(
                        RichText::new(ph::PENCIL_SIMPLE).size(12.0).color(theme::TEXT_DIM),
                    )
                    .frame(false),
                );
                if edit.on_hover_text("Edit module").clicked() {
                    action = Some(SidebarAction::Edit(module.id));
                }
            });
        });
    });

    action
}

/// Title, completion summary and Board/Roadmap tabs above the central panel.
pub fn show_module_header(
    module: Option<&Module>,
    counts: TaskCounts,
    tab: &mut DashboardTab,
    ui: &mut Ui,
) {
    let Some(module) = module else {
        return;
    };

    egui::Frame::default()
        .fill(theme::BG_HEADER)
        .inner_margin(egui::Margin::symmetric(16.0, 10.0))
        .show(ui, |ui| {
            ui.horizontal(|ui| {
                ui.label(
                    RichText::new(theme::module_icon_glyph(module.resolved_icon()))
                        .size(22.0)
                        .color(module.color.unwrap_or(theme::ACCENT)),
                );
                ui.label(RichText::new(module.name.to_uppercase()).strong().size(20.0));
                ui.label(
                    RichText::new(format!("{} · {}", module.kind.label(), module.status.label()))
                        .size(11.0)
                        .color(theme::TEXT_DIM),
                );
            });

            let fraction = if counts.total == 0 {
                0.0
            } else {
                counts.completed as f32 / counts.total as f32
            };
            ui.horizontal(|ui| {
                ui.label(
                    RichText::new(format!("{}/{} Tasks Completed", counts.completed, counts.total))
                        .monospace()
                        .size(11.0)
                        .color(theme::TEXT_SECONDARY),
                );
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.label(
                        RichText::new(format!("{:.0}%", fraction * 100.0))
                            .monospace()
                            .size(11.0)
                            .color(theme::TEXT_SECONDARY),
                    );
                });
            });
            ui.add(
                egui::ProgressBar::new(fraction)
                    .fill(theme::ACCENT)
                    .rounding(egui::Rounding::same(3.0)),
            );

            ui.add_space(6.0);
            ui.horizontal(|ui| {
                ui.selectable_value(tab, DashboardTab::Board, format!("{}  TASK BOARD", ph::LIST));
                ui.selectable_value(tab, DashboardTab::Roadmap, format!("{}  ROADMAP", ph::CALENDAR));
            });
        });
}
