use crate::app::DrawerState;
use crate::ui::theme;
use chrono::NaiveDate;
use egui::{Color32, RichText, Ui};
use egui_phosphor::regular as ph;
use mission_roadmap::model::Deadline;
use uuid::Uuid;

/// Actions the drawer can request.
pub enum DrawerAction {
    None,
    Save,
    Close,
    AddSubtask,
    ToggleSubtask(Uuid),
    DeleteSubtask(Uuid),
}

fn field_label(ui: &mut Ui, text: &str) {
    ui.label(RichText::new(text).size(10.0).color(theme::TEXT_DIM).strong());
}

/// Render the right-side detail drawer for one task.
pub fn show_task_drawer(drawer: &mut DrawerState, today: NaiveDate, ui: &mut Ui) -> DrawerAction {
    let mut action = DrawerAction::None;

    ui.horizontal(|ui| {
        ui.label(
            RichText::new("Task Details")
                .strong()
                .size(15.0)
                .color(theme::TEXT_PRIMARY),
        );
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            let close = ui.add(
                egui::Button::new(RichText::new(ph::X).size(14.0).color(theme::TEXT_SECONDARY))
                    .frame(false),
            );
            if close.on_hover_text("Close").clicked() {
                action = DrawerAction::Close;
            }
        });
    });
    ui.add_space(4.0);
    ui.separator();

    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui| {
            ui.spacing_mut().item_spacing.y = 6.0;
            ui.visuals_mut().extreme_bg_color = theme::BG_FIELD;

            if !drawer.dates_valid {
                ui.label(
                    RichText::new(format!(
                        "{} Stored dates could not be read. Saving replaces them.",
                        ph::WARNING
                    ))
                    .size(11.0)
                    .color(theme::WARNING),
                );
            }

            // ── Title ─────────────────────────────────────────────────
            field_label(ui, "Title");
            ui.add_sized(
                [ui.available_width(), 26.0],
                egui::TextEdit::singleline(&mut drawer.title)
                    .font(egui::FontId::proportional(13.0))
                    .text_color(theme::TEXT_PRIMARY),
            );

            // ── Description ───────────────────────────────────────────
            field_label(ui, "Description");
            ui.add(
                egui::TextEdit::multiline(&mut drawer.description)
                    .hint_text("Add details...")
                    .desired_rows(4)
                    .desired_width(f32::INFINITY),
            );

            // ── Dates ─────────────────────────────────────────────────
            egui::Grid::new("drawer_dates")
                .num_columns(2)
                .spacing([12.0, 6.0])
                .show(ui, |ui| {
                    field_label(ui, "Start");
                    ui.add(egui_extras::DatePickerButton::new(&mut drawer.start).id_salt("drawer_dp_start"));
                    ui.end_row();

                    field_label(ui, "End");
                    ui.add(egui_extras::DatePickerButton::new(&mut drawer.end).id_salt("drawer_dp_end"));
                    ui.end_row();
                });

            if drawer.end < drawer.start {
                ui.label(
                    RichText::new("End date is before the start date")
                        .size(10.5)
                        .color(theme::DANGER),
                );
            }

            let deadline = Deadline::evaluate(drawer.end, drawer.is_completed, today);
            let (status, color) = if drawer.is_completed {
                ("Completed".to_string(), theme::SUCCESS)
            } else if deadline.is_overdue {
                (deadline.label(), theme::DANGER)
            } else {
                (deadline.label(), theme::TEXT_SECONDARY)
            };
            ui.label(RichText::new(status).monospace().size(11.0).color(color));

            ui.add_space(4.0);
            let save_btn = egui::Button::new(
                RichText::new(format!("{}  Save", ph::FLOPPY_DISK)).color(Color32::WHITE),
            )
            .fill(theme::ACCENT)
            .rounding(egui::Rounding::same(4.0));
            if ui.add_sized([100.0, 28.0], save_btn).clicked() {
                action = DrawerAction::Save;
            }

            ui.add_space(8.0);
            ui.separator();

            // ── Subtasks ──────────────────────────────────────────────
            let done = drawer.subtasks.iter().filter(|t| t.is_completed).count();
            ui.horizontal(|ui| {
                ui.label(RichText::new("Subtasks").strong().size(13.0));
                ui.label(
                    RichText::new(format!("{}/{}", done, drawer.subtasks.len()))
                        .size(11.0)
                        .color(theme::TEXT_DIM),
                );
            });

            for subtask in &drawer.subtasks {
                ui.horizontal(|ui| {
                    let mut checked = subtask.is_completed;
                    if ui.checkbox(&mut checked, "").changed() {
                        action = DrawerAction::ToggleSubtask(subtask.id);
                    }
                    let text = if subtask.is_completed {
                        RichText::new(&subtask.title).strikethrough().color(theme::TEXT_DIM)
                    } else {
                        RichText::new(&subtask.title).color(theme::TEXT_PRIMARY)
                    };
                    ui.add(egui::Label::new(text.size(12.0)).truncate());
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        let del = ui.add(
                            egui::Button::new(RichText::new(ph::TRASH).size(11.0).color(theme::TEXT_DIM))
                                .frame(false),
                        );
                        if del.on_hover_text("Delete subtask").clicked() {
                            action = DrawerAction::DeleteSubtask(subtask.id);
                        }
                    });
                });
            }

            ui.horizontal(|ui| {
                let input = ui.add_sized(
                    [ui.available_width() - 40.0, 24.0],
                    egui::TextEdit::singleline(&mut drawer.new_subtask).hint_text("New subtask..."),
                );
                let submitted = input.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
                let add = ui.add_enabled(
                    !drawer.new_subtask.trim().is_empty(),
                    egui::Button::new(ph::PLUS),
                );
                if (submitted || add.clicked()) && !drawer.new_subtask.trim().is_empty() {
                    action = DrawerAction::AddSubtask;
                }
            });
        });

    action
}
