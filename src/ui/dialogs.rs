use crate::app::RoadmapApp;
use crate::ui::theme;
use egui::{Color32, Context, RichText, Window};
use mission_roadmap::model::{ModuleIcon, ModuleKind, ModuleStatus};

const DIALOG_WIDTH: f32 = 340.0;

fn primary_button(text: &str) -> egui::Button<'static> {
    egui::Button::new(RichText::new(text.to_string()).color(Color32::WHITE))
        .fill(theme::ACCENT)
        .rounding(egui::Rounding::same(4.0))
}

/// Render the "Add Task" dialog.
pub fn show_add_task_dialog(app: &mut RoadmapApp, ctx: &Context) {
    let mut should_close = false;
    let mut submit = false;

    Window::new(RichText::new("Add Task").strong().size(14.0))
        .resizable(false)
        .collapsible(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .fixed_size([DIALOG_WIDTH, 0.0])
        .show(ctx, |ui| {
            // Force dark backgrounds inside this dialog
            ui.visuals_mut().extreme_bg_color = theme::BG_FIELD;
            ui.add_space(4.0);

            egui::Grid::new("add_task_grid")
                .num_columns(2)
                .striped(false)
                .spacing([12.0, 8.0])
                .show(ui, |ui| {
                    ui.label(RichText::new("Title").color(theme::TEXT_SECONDARY));
                    let title = ui.add_sized(
                        [220.0, 24.0],
                        egui::TextEdit::singleline(&mut app.new_task.title)
                            .hint_text("Task title...")
                            .text_color(theme::TEXT_PRIMARY),
                    );
                    if title.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                        submit = true;
                    }
                    ui.end_row();

                    ui.label(RichText::new("Start").color(theme::TEXT_SECONDARY));
                    ui.add(egui_extras::DatePickerButton::new(&mut app.new_task.start).id_salt("dlg_dp_start"));
                    ui.end_row();

                    ui.label(RichText::new("End").color(theme::TEXT_SECONDARY));
                    ui.add(egui_extras::DatePickerButton::new(&mut app.new_task.end).id_salt("dlg_dp_end"));
                    ui.end_row();
                });

            ui.add_space(6.0);
            ui.separator();
            ui.add_space(4.0);

            ui.horizontal(|ui| {
                let can_create = !app.new_task.title.trim().is_empty();
                if ui
                    .add_enabled_ui(can_create, |ui| ui.add_sized([80.0, 28.0], primary_button("Create")))
                    .inner
                    .clicked()
                {
                    submit = true;
                }
                if ui.add_sized([80.0, 28.0], egui::Button::new("Cancel")).clicked() {
                    should_close = true;
                }
            });
            ui.add_space(2.0);
        });

    if submit && app.create_task_from_dialog() {
        should_close = true;
    }
    if should_close || ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
        app.show_add_task = false;
    }
}

/// Render the add/edit module dialog.
pub fn show_module_dialog(app: &mut RoadmapApp, ctx: &Context) {
    let mut should_close = false;
    let mut submit = false;

    let Some(form) = app.module_form.as_mut() else {
        return;
    };
    let title = if form.editing.is_some() { "Edit Module" } else { "Add Module" };

    Window::new(RichText::new(title).strong().size(14.0))
        .resizable(false)
        .collapsible(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .fixed_size([DIALOG_WIDTH + 40.0, 0.0])
        .show(ctx, |ui| {
            ui.visuals_mut().extreme_bg_color = theme::BG_FIELD;
            ui.add_space(4.0);

            egui::Grid::new("module_grid")
                .num_columns(2)
                .spacing([12.0, 8.0])
                .show(ui, |ui| {
                    ui.label(RichText::new("Name").color(theme::TEXT_SECONDARY));
                    ui.add_sized(
                        [240.0, 24.0],
                        egui::TextEdit::singleline(&mut form.name).hint_text("Module name..."),
                    );
                    ui.end_row();

                    ui.label(RichText::new("Type").color(theme::TEXT_SECONDARY));
                    egui::ComboBox::from_id_salt("module_kind")
                        .selected_text(form.kind.label())
                        .show_ui(ui, |ui| {
                            for kind in ModuleKind::ALL {
                                ui.selectable_value(&mut form.kind, kind, kind.label());
                            }
                        });
                    ui.end_row();

                    ui.label(RichText::new("Status").color(theme::TEXT_SECONDARY));
                    egui::ComboBox::from_id_salt("module_status")
                        .selected_text(form.status.label())
                        .show_ui(ui, |ui| {
                            for status in ModuleStatus::ALL {
                                ui.selectable_value(&mut form.status, status, status.label());
                            }
                        });
                    ui.end_row();

                    ui.label(RichText::new("Icon").color(theme::TEXT_SECONDARY));
                    ui.horizontal_wrapped(|ui| {
                        let auto = form.icon.is_none();
                        if ui
                            .selectable_label(auto, format!("{} Auto", theme::module_icon_glyph(form.kind.default_icon())))
                            .on_hover_text("Use the type's icon")
                            .clicked()
                        {
                            form.icon = None;
                        }
                        for icon in ModuleIcon::PICKABLE {
                            let selected = form.icon == Some(icon);
                            if ui
                                .selectable_label(selected, RichText::new(theme::module_icon_glyph(icon)).size(16.0))
                                .on_hover_text(icon.label())
                                .clicked()
                            {
                                form.icon = Some(icon);
                            }
                        }
                    });
                    ui.end_row();

                    ui.label(RichText::new("Color").color(theme::TEXT_SECONDARY));
                    ui.horizontal(|ui| {
                        for &preset in theme::PRESET_COLORS {
                            let (rect, resp) =
                                ui.allocate_exact_size(egui::vec2(20.0, 20.0), egui::Sense::click());
                            ui.painter().circle_filled(rect.center(), 9.0, preset);
                            if form.color == Some(preset) {
                                ui.painter().circle_stroke(
                                    rect.center(),
                                    10.0,
                                    egui::Stroke::new(2.0, Color32::WHITE),
                                );
                            }
                            if resp.clicked() {
                                form.color = Some(preset);
                            }
                        }
                    });
                    ui.end_row();

                    ui.label(RichText::new("Latitude").color(theme::TEXT_SECONDARY));
                    ui.add(
                        egui::DragValue::new(&mut form.lat)
                            .range(-90.0..=90.0)
                            .speed(0.0001)
                            .fixed_decimals(4),
                    );
                    ui.end_row();

                    ui.label(RichText::new("Longitude").color(theme::TEXT_SECONDARY));
                    ui.add(
                        egui::DragValue::new(&mut form.lng)
                            .range(-180.0..=180.0)
                            .speed(0.0001)
                            .fixed_decimals(4),
                    );
                    ui.end_row();
                });

            ui.add_space(6.0);
            ui.separator();
            ui.add_space(4.0);

            ui.horizontal(|ui| {
                if ui.add_sized([80.0, 28.0], primary_button("Save")).clicked() {
                    submit = true;
                }
                if ui.add_sized([80.0, 28.0], egui::Button::new("Cancel")).clicked() {
                    should_close = true;
                }
            });
            ui.add_space(2.0);
        });

    if submit && app.submit_module_form() {
        should_close = true;
    }
    if should_close || ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
        app.module_form = None;
    }
}

/// Render the "About" dialog.
pub fn show_about_dialog(app: &mut RoadmapApp, ctx: &Context) {
    let mut should_close = false;
    Window::new("About")
        .resizable(false)
        .collapsible(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .fixed_size([300.0, 170.0])
        .show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(12.0);
                ui.heading(RichText::new("Mission Roadmap").strong());
                ui.add_space(2.0);
                ui.label(
                    RichText::new(format!("Version {}", env!("CARGO_PKG_VERSION")))
                        .color(theme::TEXT_SECONDARY),
                );
                ui.add_space(10.0);
                ui.label("Site modules, task board and roadmap");
                ui.label("built with Rust and egui.");
                ui.add_space(14.0);
                if ui.add_sized([100.0, 28.0], egui::Button::new("Close")).clicked() {
                    should_close = true;
                }
            });
        });
    if should_close || ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
        app.show_about = false;
    }
}
