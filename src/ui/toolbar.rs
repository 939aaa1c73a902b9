use crate::app::{DashboardTab, RoadmapApp};
use egui::{menu, RichText, Ui};

fn menu_title(text: &str) -> RichText {
    RichText::new(format!("  {}  ", text)).size(13.0)
}

/// Render the top toolbar / menu bar.
pub fn show_toolbar(app: &mut RoadmapApp, ui: &mut Ui) {
    menu::bar(ui, |ui| {
        ui.menu_button(menu_title("File"), |ui| {
            if ui.button("  New Project").clicked() {
                app.new_project();
                ui.close_menu();
            }
            if ui.button("  Open...").clicked() {
                app.open_project();
                ui.close_menu();
            }
            ui.separator();
            if ui.button("  Save          Ctrl+S").clicked() {
                app.save_project();
                ui.close_menu();
            }
            if ui.button("  Save As...").clicked() {
                app.save_project_as();
                ui.close_menu();
            }
            ui.separator();
            if ui.button("  Import CSV into Module...").clicked() {
                app.import_csv();
                ui.close_menu();
            }
            if ui.button("  Export Module CSV...").clicked() {
                app.export_csv();
                ui.close_menu();
            }
        });

        ui.menu_button(menu_title("View"), |ui| {
            if ui.radio_value(&mut app.tab, DashboardTab::Board, "Task Board").clicked() {
                ui.close_menu();
            }
            if ui.radio_value(&mut app.tab, DashboardTab::Roadmap, "Roadmap").clicked() {
                ui.close_menu();
            }
            ui.separator();
            if ui.button("  Zoom In        Ctrl+Scroll ↑").clicked() {
                app.zoom_in();
                ui.close_menu();
            }
            if ui.button("  Zoom Out      Ctrl+Scroll ↓").clicked() {
                app.zoom_out();
                ui.close_menu();
            }
            ui.separator();
            if ui.button("  Open Config Folder").clicked() {
                app.open_config_folder();
                ui.close_menu();
            }
        });

        ui.menu_button(menu_title("Help"), |ui| {
            if ui.button("About").clicked() {
                app.show_about = true;
                ui.close_menu();
            }
        });

        // Right-aligned project name
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            let modified = if app.file_path.is_some() { "" } else { " (unsaved)" };
            ui.label(
                RichText::new(format!("{}{}", app.store.project().name, modified))
                    .size(11.0)
                    .weak(),
            );
        });
    });
}
