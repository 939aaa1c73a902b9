use crate::ui::theme;
use chrono::NaiveDate;
use egui::{Color32, RichText, Ui};
use egui_phosphor::regular as ph;
use mission_roadmap::Task;
use uuid::Uuid;

/// Actions that the task board can request.
pub enum BoardAction {
    None,
    Add,
    Toggle(Uuid),
    Delete(Uuid),
    Open(Uuid),
}

/// Render the top-level tasks of the selected module as a list.
pub fn show_task_board(tasks: &[Task], today: NaiveDate, ui: &mut Ui) -> BoardAction {
    let mut action = BoardAction::None;
    let top_level: Vec<&Task> = tasks.iter().filter(|t| !t.is_subtask()).collect();

    ui.add_space(8.0);
    ui.horizontal(|ui| {
        ui.add_space(12.0);
        ui.label(
            RichText::new("Tasks")
                .strong()
                .size(15.0)
                .color(theme::TEXT_PRIMARY),
        );
        ui.label(
            RichText::new(format!("({})", top_level.len()))
                .size(11.0)
                .color(theme::TEXT_DIM),
        );
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            ui.add_space(12.0);
            let btn = egui::Button::new(
                RichText::new(format!("{}  Add Task", ph::PLUS))
                    .color(Color32::WHITE)
                    .size(12.0),
            )
            .fill(theme::ACCENT)
            .rounding(egui::Rounding::same(5.0));
            if ui.add_sized([110.0, 28.0], btn).clicked() {
                action = BoardAction::Add;
            }
        });
    });
    ui.add_space(6.0);

    if top_level.is_empty() {
        ui.add_space(40.0);
        ui.vertical_centered(|ui| {
            ui.label(RichText::new("No tasks yet").color(theme::TEXT_DIM));
        });
        return action;
    }

    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui| {
            for (i, task) in top_level.iter().enumerate() {
                let subtask_count = tasks.iter().filter(|t| t.parent_id == Some(task.id)).count();
                if let Some(a) = task_row(ui, task, i, subtask_count, today) {
                    action = a;
                }
                ui.add_space(1.0);
            }
        });

    action
}

fn task_row(
    ui: &mut Ui,
    task: &Task,
    index: usize,
    subtask_count: usize,
    today: NaiveDate,
) -> Option<BoardAction> {
    let mut action = None;
    let deadline = task.deadline(today).ok();
    let overdue = deadline.is_some_and(|d| d.is_overdue);

    let frame = egui::Frame {
        fill: if index % 2 == 0 { theme::BG_PANEL } else { theme::BG_ROW_ALT },
        rounding: egui::Rounding::same(4.0),
        inner_margin: egui::Margin::symmetric(10.0, 6.0),
        outer_margin: egui::Margin::symmetric(12.0, 0.0),
        stroke: egui::Stroke::NONE,
        shadow: egui::epaint::Shadow::NONE,
    };

    frame.show(ui, |ui| {
        ui.horizontal(|ui| {
            ui.spacing_mut().item_spacing.x = 8.0;

            let mut done = task.is_completed;
            if ui.checkbox(&mut done, "").changed() {
                action = Some(BoardAction::Toggle(task.id));
            }

            let mut title = RichText::new(&task.title).size(12.5);
            title = if task.is_completed {
                title.strikethrough().color(theme::TEXT_DIM)
            } else {
                title.color(theme::TEXT_PRIMARY)
            };
            let title_resp = ui.add(egui::Label::new(title).truncate().sense(egui::Sense::click()));
            if title_resp.on_hover_text("Open details").clicked() {
                action = Some(BoardAction::Open(task.id));
            }

            if subtask_count > 0 {
                ui.label(
                    RichText::new(format!("{} {}", ph::LIST_CHECKS, subtask_count))
                        .size(10.0)
                        .color(theme::TEXT_DIM),
                );
            }

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.spacing_mut().item_spacing.x = 4.0;

                let del_btn = ui.add(
                    egui::Button::new(RichText::new(ph::TRASH).size(11.0).color(theme::TEXT_DIM))
                        .frame(false),
                );
                if del_btn.on_hover_text("Delete task").clicked() {
                    action = Some(BoardAction::Delete(task.id));
                }

                let open_btn = ui.add(
                    egui::Button::new(
                        RichText::new(ph::ARROW_RIGHT).size(11.0).color(theme::TEXT_SECONDARY),
                    )
                    .frame(false),
                );
                if open_btn.on_hover_text("Open details").clicked() {
                    action = Some(BoardAction::Open(task.id));
                }

                let end_color = if overdue { theme::DANGER } else { theme::TEXT_SECONDARY };
                ui.label(RichText::new(&task.end_date).size(10.0).color(end_color));
                ui.label(RichText::new("→").size(9.0).color(theme::TEXT_DIM));
                ui.label(
                    RichText::new(&task.start_date)
                        .size(10.0)
                        .color(theme::TEXT_SECONDARY),
                );
                if let Some(deadline) = deadline.filter(|_| !task.is_completed) {
                    let color = if deadline.is_overdue { theme::DANGER } else { theme::TEXT_DIM };
                    ui.label(RichText::new(deadline.label()).size(9.5).color(color));
                }
            });
        });
    });

    action
}
