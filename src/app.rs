use std::path::{Path, PathBuf};
use std::sync::mpsc::Receiver;

use chrono::{Duration, Local, NaiveDate};
use egui::Color32;
use tracing::{info, warn};
use uuid::Uuid;

use mission_roadmap::config::AppConfig;
use mission_roadmap::io::{self, csv_export, csv_import};
use mission_roadmap::model::{Module, ModuleIcon, ModuleKind, ModuleStatus, Project, Task};
use mission_roadmap::{StoreEvent, TaskStore};

use crate::ui;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardTab {
    Board,
    Roadmap,
}

/// Fields of the "Add Task" dialog.
pub struct NewTaskForm {
    pub title: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl NewTaskForm {
    fn starting(today: NaiveDate) -> Self {
        Self {
            title: String::new(),
            start: today,
            end: today + Duration::days(7),
        }
    }
}

/// Edit buffer of the add/edit module dialog. `editing` is `None` when creating.
pub struct ModuleForm {
    pub editing: Option<Uuid>,
    pub name: String,
    pub kind: ModuleKind,
    pub status: ModuleStatus,
    pub icon: Option<ModuleIcon>,
    pub color: Option<Color32>,
    pub lat: f64,
    pub lng: f64,
}

impl ModuleForm {
    fn from_module(module: &Module, editing: bool) -> Self {
        Self {
            editing: editing.then_some(module.id),
            name: module.name.clone(),
            kind: module.kind,
            status: module.status,
            icon: module.icon,
            color: module.color,
            lat: module.lat,
            lng: module.lng,
        }
    }

    fn apply_to(&self, module: &mut Module) {
        module.name = self.name.clone();
        module.kind = self.kind;
        module.status = self.status;
        module.icon = self.icon;
        module.color = self.color;
        module.lat = self.lat;
        module.lng = self.lng;
    }
}

/// Edit buffer of the task drawer. Changes are written back on save.
pub struct DrawerState {
    pub task_id: Uuid,
    pub title: String,
    pub description: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// False when the stored dates could not be read and today was substituted.
    pub dates_valid: bool,
    pub is_completed: bool,
    pub new_subtask: String,
    pub subtasks: Vec<Task>,
}

impl DrawerState {
    fn open(task: &Task, subtasks: Vec<Task>, today: NaiveDate) -> Self {
        let days = task.days().ok();
        let (start, end) = days.unwrap_or((today, today));
        Self {
            task_id: task.id,
            title: task.title.clone(),
            description: task.description.clone().unwrap_or_default(),
            start,
            end,
            dates_valid: days.is_some(),
            is_completed: task.is_completed,
            new_subtask: String::new(),
            subtasks,
        }
    }
}

/// Main application state.
pub struct RoadmapApp {
    pub store: TaskStore,
    events: Receiver<StoreEvent>,
    pub config: AppConfig,
    config_dirty: bool,
    pub file_path: Option<PathBuf>,

    pub selected_module: Option<Uuid>,
    /// Tasks of the selected module, re-fetched whenever the store reports a change.
    pub module_tasks: Vec<Task>,
    pub drawer: Option<DrawerState>,
    pub tab: DashboardTab,

    // Dialog state
    pub show_add_task: bool,
    pub show_about: bool,
    pub new_task: NewTaskForm,
    pub module_form: Option<ModuleForm>,

    pub status_message: String,
}

impl RoadmapApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        // Register Phosphor icon font as a fallback so icons render inline with text
        let mut fonts = egui::FontDefinitions::default();
        egui_phosphor::add_to_fonts(&mut fonts, egui_phosphor::Variant::Regular);
        cc.egui_ctx.set_fonts(fonts);

        let today = Local::now().date_naive();
        let config = AppConfig::load();

        let (project, file_path, status_message) = match config.last_project.clone() {
            Some(path) if path.exists() => match io::load_project(&path) {
                Ok(project) => (project, Some(path), "Project loaded".to_string()),
                Err(e) => {
                    warn!("Could not reopen {}: {}", path.display(), e);
                    (sample_project(today), None, format!("Error loading: {}", e))
                }
            },
            _ => (sample_project(today), None, "Ready".to_string()),
        };

        let mut store = TaskStore::new(project);
        let events = store.subscribe();

        let mut app = Self {
            store,
            events,
            config,
            config_dirty: false,
            file_path,
            selected_module: None,
            module_tasks: Vec::new(),
            drawer: None,
            tab: DashboardTab::Roadmap,
            show_add_task: false,
            show_about: false,
            new_task: NewTaskForm::starting(today),
            module_form: None,
            status_message,
        };
        app.ensure_module_selected();
        app.refresh_module_view();
        app
    }

    // --- Store notifications ---

    /// Apply pending store events. Views are rebuilt from fresh queries, never patched.
    fn drain_events(&mut self) {
        let mut refresh = false;
        while let Ok(event) = self.events.try_recv() {
            match event {
                StoreEvent::Reloaded | StoreEvent::ModulesChanged => {
                    self.ensure_module_selected();
                    refresh = true;
                }
                StoreEvent::TasksChanged { module_id } => {
                    refresh |= self.selected_module == Some(module_id);
                }
            }
        }
        if refresh {
            self.refresh_module_view();
        }
    }

    fn ensure_module_selected(&mut self) {
        let still_there = self
            .selected_module
            .is_some_and(|id| self.store.module(id).is_ok());
        if !still_there {
            self.selected_module = self.store.modules().first().map(|m| m.id);
        }
    }

    fn refresh_module_view(&mut self) {
        self.module_tasks = self
            .selected_module
            .map(|id| self.store.tasks_for_module(id))
            .unwrap_or_default();

        if let Some(drawer) = &mut self.drawer {
            match self.store.task(drawer.task_id) {
                Ok(task) => {
                    drawer.is_completed = task.is_completed;
                    drawer.subtasks = self.store.subtasks_of(drawer.task_id);
                }
                Err(_) => self.drawer = None,
            }
        }
    }

    pub fn select_module(&mut self, id: Uuid) {
        if self.selected_module != Some(id) {
            self.selected_module = Some(id);
            self.drawer = None;
            self.refresh_module_view();
        }
    }

    pub fn selected_module(&self) -> Option<&Module> {
        self.selected_module.and_then(|id| self.store.module(id).ok())
    }

    // --- File operations ---

    pub fn new_project(&mut self) {
        self.store.replace_project(Project::default());
        self.file_path = None;
        self.drawer = None;
        self.status_message = "New project created".to_string();
    }

    pub fn open_project(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Roadmap Project", &["roadmap.json", "json"])
            .pick_file()
        {
            match io::load_project(&path) {
                Ok(project) => {
                    self.store.replace_project(project);
                    self.drawer = None;
                    self.remember_project(&path);
                    self.file_path = Some(path);
                    self.status_message = "Project loaded".to_string();
                }
                Err(e) => {
                    self.status_message = format!("Error loading: {}", e);
                }
            }
        }
    }

    pub fn save_project(&mut self) {
        match self.file_path.clone() {
            Some(path) => self.write_project(&path),
            None => self.save_project_as(),
        }
    }

    pub fn save_project_as(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Roadmap Project", &["roadmap.json", "json"])
            .set_file_name(format!("{}.roadmap.json", self.store.project().name))
            .save_file()
        {
            self.write_project(&path);
        }
    }

    fn write_project(&mut self, path: &Path) {
        match io::save_project(self.store.project(), path) {
            Ok(()) => {
                self.remember_project(path);
                self.file_path = Some(path.to_path_buf());
                self.status_message = "Project saved".to_string();
            }
            Err(e) => self.status_message = format!("Error saving: {}", e),
        }
    }

    fn remember_project(&mut self, path: &Path) {
        self.config.last_project = Some(path.to_path_buf());
        self.config.save();
    }

    /// Import CSV rows as tasks of the selected module.
    pub fn import_csv(&mut self) {
        let Some(module_id) = self.selected_module else {
            self.status_message = "Select a module before importing".to_string();
            return;
        };

        if let Some(path) = rfd::FileDialog::new()
            .add_filter("CSV Files", &["csv", "txt"])
            .pick_file()
        {
            match csv_import::import_csv(&path, module_id) {
                Ok((mut tasks, skipped)) => {
                    // Parents go in before their subtasks.
                    tasks.sort_by_key(Task::is_subtask);
                    let mut added = 0usize;
                    let mut rejected = skipped;
                    for task in tasks {
                        match self.store.add_task(task) {
                            Ok(_) => added += 1,
                            Err(e) => {
                                warn!("Imported row rejected: {}", e);
                                rejected += 1;
                            }
                        }
                    }
                    info!("Imported {} tasks from {}", added, path.display());
                    self.status_message = if rejected > 0 {
                        format!("Imported {} tasks ({} rows skipped)", added, rejected)
                    } else {
                        format!("Imported {} tasks", added)
                    };
                }
                Err(e) => {
                    self.status_message = format!("CSV import failed: {}", e);
                }
            }
        }
    }

    pub fn export_csv(&mut self) {
        let Some(module) = self.selected_module() else {
            self.status_message = "Select a module to export".to_string();
            return;
        };
        if self.module_tasks.is_empty() {
            self.status_message = "Nothing to export, module has no tasks".to_string();
            return;
        }

        let default_name = format!("{}.csv", module.name);
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("CSV Files", &["csv"])
            .set_file_name(default_name)
            .save_file()
        {
            match csv_export::export_csv(&self.module_tasks, &path) {
                Ok(count) => {
                    self.status_message = format!("Exported {} tasks to CSV", count);
                }
                Err(e) => {
                    self.status_message = format!("CSV export failed: {}", e);
                }
            }
        }
    }

    pub fn open_config_folder(&mut self) {
        match AppConfig::config_dir() {
            Some(dir) => {
                if let Err(e) = std::fs::create_dir_all(&dir).and_then(|_| open::that(&dir)) {
                    self.status_message = format!("Could not open {}: {}", dir.display(), e);
                }
            }
            None => self.status_message = "No config directory on this platform".to_string(),
        }
    }

    // --- Zoom ---

    pub fn zoom_in(&mut self) {
        self.config.timeline.zoom_in();
        self.config_dirty = true;
    }

    pub fn zoom_out(&mut self) {
        self.config.timeline.zoom_out();
        self.config_dirty = true;
    }

    pub fn zoom_percent(&self) -> f32 {
        let default_width = mission_roadmap::TimelineSettings::default().day_width;
        self.config.timeline.effective_day_width() / default_width * 100.0
    }

    // --- Module operations ---

    pub fn open_add_module(&mut self) {
        let count = self.store.project().modules.len();
        let mut module = Module::new(format!("Module {}", count + 1));
        module.color = Some(ui::theme::PRESET_COLORS[count % ui::theme::PRESET_COLORS.len()]);
        self.module_form = Some(ModuleForm::from_module(&module, false));
    }

    pub fn open_edit_module(&mut self, id: Uuid) {
        match self.store.module(id) {
            Ok(module) => self.module_form = Some(ModuleForm::from_module(module, true)),
            Err(e) => self.status_message = e.to_string(),
        }
    }

    /// Commit the module dialog. Returns true when the dialog can close.
    pub fn submit_module_form(&mut self) -> bool {
        let Some(form) = &self.module_form else {
            return true;
        };

        let result = match form.editing {
            Some(id) => self.store.module(id).cloned().and_then(|mut module| {
                form.apply_to(&mut module);
                self.store.update_module(module).map(|()| id)
            }),
            None => {
                let mut module = Module::new(form.name.clone());
                form.apply_to(&mut module);
                self.store.add_module(module)
            }
        };

        match result {
            Ok(id) => {
                self.select_module(id);
                self.status_message = "Module saved".to_string();
                self.module_form = None;
                true
            }
            Err(e) => {
                self.status_message = e.to_string();
                false
            }
        }
    }

    pub fn delete_module(&mut self, id: Uuid) {
        let Ok(module) = self.store.module(id) else {
            return;
        };
        let confirm = rfd::MessageDialog::new()
            .set_title("Delete Module")
            .set_description(format!(
                "Delete '{}' and all of its tasks?",
                module.name
            ))
            .set_buttons(rfd::MessageButtons::YesNo)
            .show();
        if confirm != rfd::MessageDialogResult::Yes {
            return;
        }

        match self.store.delete_module(id) {
            Ok(removed) => {
                self.status_message = format!("Module deleted ({} tasks removed)", removed);
            }
            Err(e) => self.status_message = e.to_string(),
        }
    }

    // --- Task operations ---

    pub fn create_task_from_dialog(&mut self) -> bool {
        let Some(module_id) = self.selected_module else {
            self.status_message = "Select a module first".to_string();
            return false;
        };

        let start = self.new_task.start;
        let end = self.new_task.end.max(start);
        let task = Task::new(module_id, self.new_task.title.trim(), start, end);

        match self.store.add_task(task) {
            Ok(_) => {
                self.new_task = NewTaskForm::starting(Local::now().date_naive());
                self.status_message = "Task added".to_string();
                true
            }
            Err(e) => {
                self.status_message = e.to_string();
                false
            }
        }
    }

    pub fn toggle_task(&mut self, id: Uuid) {
        match self.store.toggle_completed(id) {
            Ok(true) => self.status_message = "Task completed".to_string(),
            Ok(false) => self.status_message = "Task reopened".to_string(),
            Err(e) => self.status_message = e.to_string(),
        }
    }

    pub fn delete_task(&mut self, id: Uuid) {
        match self.store.delete_task(id) {
            Ok(removed) if removed > 1 => {
                self.status_message = format!("Task deleted with {} subtasks", removed - 1);
            }
            Ok(_) => self.status_message = "Task deleted".to_string(),
            Err(e) => self.status_message = e.to_string(),
        }
    }

    pub fn open_drawer(&mut self, id: Uuid) {
        match self.store.task(id) {
            Ok(task) => {
                let subtasks = self.store.subtasks_of(id);
                self.drawer = Some(DrawerState::open(task, subtasks, Local::now().date_naive()));
            }
            Err(e) => self.status_message = e.to_string(),
        }
    }

    pub fn save_drawer(&mut self) {
        let Some(drawer) = &self.drawer else {
            return;
        };
        let Ok(existing) = self.store.task(drawer.task_id) else {
            self.drawer = None;
            return;
        };

        let mut task = existing.clone();
        task.title = drawer.title.clone();
        let description = drawer.description.trim();
        task.description = (!description.is_empty()).then(|| description.to_string());
        task.set_days(drawer.start, drawer.end.max(drawer.start));

        match self.store.update_task(task) {
            Ok(()) => {
                if let Some(drawer) = &mut self.drawer {
                    drawer.dates_valid = true;
                }
                self.status_message = "Task updated".to_string();
            }
            Err(e) => self.status_message = e.to_string(),
        }
    }

    pub fn add_subtask_from_drawer(&mut self) {
        let Some(drawer) = &mut self.drawer else {
            return;
        };
        let title = std::mem::take(&mut drawer.new_subtask);
        let parent_id = drawer.task_id;
        match self.store.add_subtask(parent_id, &title) {
            Ok(_) => self.status_message = "Subtask added".to_string(),
            Err(e) => {
                if let Some(drawer) = &mut self.drawer {
                    drawer.new_subtask = title;
                }
                self.status_message = e.to_string();
            }
        }
    }
}

impl eframe::App for RoadmapApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        ui::theme::apply_theme(ctx);
        self.drain_events();

        let today = Local::now().date_naive();

        // Handle keyboard shortcuts outside closures to avoid borrow issues
        let should_save = ctx.input(|i| i.modifiers.ctrl && i.key_pressed(egui::Key::S));
        if should_save {
            self.save_project();
        }

        // Top panel: toolbar
        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui::toolbar::show_toolbar(self, ui);
        });

        // Bottom panel: status bar
        egui::TopBottomPanel::bottom("status_bar")
            .exact_height(ui::theme::STATUS_BAR_HEIGHT)
            .frame(
                egui::Frame::default()
                    .fill(ui::theme::BG_HEADER)
                    .inner_margin(egui::Margin::symmetric(10.0, 0.0)),
            )
            .show(ctx, |ui| {
                ui.horizontal_centered(|ui| {
                    ui.label(
                        egui::RichText::new(&self.status_message)
                            .size(11.0)
                            .color(ui::theme::TEXT_SECONDARY),
                    );
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        ui.label(
                            egui::RichText::new(format!("Tasks: {}", self.module_tasks.len()))
                                .size(10.5)
                                .color(ui::theme::TEXT_DIM),
                        );
                        ui.label(egui::RichText::new(" · ").size(10.5).color(ui::theme::TEXT_DIM));
                        ui.label(
                            egui::RichText::new(format!("Zoom: {:.0}%", self.zoom_percent()))
                                .size(10.5)
                                .color(ui::theme::TEXT_DIM),
                        );
                    });
                });
            });

        // Left panel: modules
        let mut module_action = ui::module_sidebar::SidebarAction::None;
        egui::SidePanel::left("module_panel")
            .default_width(ui::theme::SIDEBAR_WIDTH)
            .min_width(220.0)
            .resizable(true)
            .frame(
                egui::Frame::default()
                    .fill(ui::theme::BG_PANEL)
                    .inner_margin(egui::Margin::same(8.0))
                    .stroke(egui::Stroke::new(1.0, ui::theme::BORDER_SUBTLE)),
            )
            .show(ctx, |ui| {
                module_action =
                    ui::module_sidebar::show_module_sidebar(&self.store, self.selected_module, ui);
            });

        match module_action {
            ui::module_sidebar::SidebarAction::Select(id) => self.select_module(id),
            ui::module_sidebar::SidebarAction::Add => self.open_add_module(),
            ui::module_sidebar::SidebarAction::Edit(id) => self.open_edit_module(id),
            ui::module_sidebar::SidebarAction::Delete(id) => self.delete_module(id),
            ui::module_sidebar::SidebarAction::None => {}
        }

        // Right panel: task drawer
        let mut drawer_action = ui::task_drawer::DrawerAction::None;
        if let Some(drawer) = &mut self.drawer {
            egui::SidePanel::right("task_drawer")
                .exact_width(ui::theme::DRAWER_WIDTH)
                .resizable(false)
                .frame(
                    egui::Frame::default()
                        .fill(ui::theme::BG_PANEL)
                        .inner_margin(egui::Margin::same(12.0))
                        .stroke(egui::Stroke::new(1.0, ui::theme::BORDER_SUBTLE)),
                )
                .show(ctx, |ui| {
                    drawer_action = ui::task_drawer::show_task_drawer(drawer, today, ui);
                });
        }

        match drawer_action {
            ui::task_drawer::DrawerAction::Save => self.save_drawer(),
            ui::task_drawer::DrawerAction::Close => self.drawer = None,
            ui::task_drawer::DrawerAction::AddSubtask => self.add_subtask_from_drawer(),
            ui::task_drawer::DrawerAction::ToggleSubtask(id) => self.toggle_task(id),
            ui::task_drawer::DrawerAction::DeleteSubtask(id) => self.delete_task(id),
            ui::task_drawer::DrawerAction::None => {}
        }

        // Central panel: board or roadmap
        let central_frame = egui::Frame::default()
            .fill(ui::theme::BG_DARK)
            .inner_margin(egui::Margin::ZERO);
        let mut board_action = ui::task_board::BoardAction::None;
        let mut chart_interaction = ui::roadmap_chart::ChartInteraction::default();
        egui::CentralPanel::default().frame(central_frame).show(ctx, |ui| {
            let module = self.selected_module.and_then(|id| self.store.module(id).ok());
            let counts = module
                .map(|m| self.store.module_counts(m.id))
                .unwrap_or_default();
            ui::module_sidebar::show_module_header(module, counts, &mut self.tab, ui);

            if self.selected_module.is_none() {
                ui.centered_and_justified(|ui| {
                    ui.label(
                        egui::RichText::new("Add a module to start planning")
                            .color(ui::theme::TEXT_DIM),
                    );
                });
                return;
            }

            match self.tab {
                DashboardTab::Board => {
                    board_action = ui::task_board::show_task_board(&self.module_tasks, today, ui);
                }
                DashboardTab::Roadmap => {
                    let layout = mission_roadmap::TimelineLayout::compute(
                        &self.module_tasks,
                        &self.config.timeline,
                        today,
                    );
                    chart_interaction = ui::roadmap_chart::show_roadmap_chart(
                        &layout,
                        today,
                        self.drawer.as_ref().map(|d| d.task_id),
                        ui,
                    );
                }
            }
        });

        match board_action {
            ui::task_board::BoardAction::Add => self.show_add_task = true,
            ui::task_board::BoardAction::Toggle(id) => self.toggle_task(id),
            ui::task_board::BoardAction::Delete(id) => self.delete_task(id),
            ui::task_board::BoardAction::Open(id) => self.open_drawer(id),
            ui::task_board::BoardAction::None => {}
        }
        if let Some(id) = chart_interaction.open_task {
            self.open_drawer(id);
        }
        match chart_interaction.zoom {
            Some(ui::roadmap_chart::ZoomDirection::In) => self.zoom_in(),
            Some(ui::roadmap_chart::ZoomDirection::Out) => self.zoom_out(),
            None => {}
        }

        // Zoom settings are persisted once scrolling settles.
        if self.config_dirty && ctx.input(|i| i.smooth_scroll_delta == egui::Vec2::ZERO) {
            self.config.save();
            self.config_dirty = false;
        }

        // Dialogs
        if self.show_add_task {
            ui::dialogs::show_add_task_dialog(self, ctx);
        }
        if self.module_form.is_some() {
            ui::dialogs::show_module_dialog(self, ctx);
        }
        if self.show_about {
            ui::dialogs::show_about_dialog(self, ctx);
        }
    }
}

/// Generate a sample project for demonstration.
fn sample_project(today: NaiveDate) -> Project {
    let mut project = Project::new("Sample Site");
    let d = |offset: i64| today + Duration::days(offset);

    let mut pump = Module::new("Pump Station");
    pump.kind = ModuleKind::Water;
    pump.status = ModuleStatus::InProgress;
    pump.color = Some(ui::theme::PRESET_COLORS[0]);

    let mut trench = Module::new("Fiber Trench");
    trench.kind = ModuleKind::Fiber;
    trench.lat = 40.7312;
    trench.lng = -80.0468;
    trench.color = Some(ui::theme::PRESET_COLORS[1]);

    let mut survey = Task::new(pump.id, "Site Survey", d(-12), d(-6));
    survey.is_completed = true;
    let mut footing = Task::new(pump.id, "Pour Footings", d(-8), d(-2));
    footing.description = Some("Needs inspection sign-off before backfill".to_string());
    let mut install = Task::new(pump.id, "Install Pumps", d(-1), d(9));
    install.color = Some(ui::theme::PRESET_COLORS[2]);
    let wiring = Task::new_subtask(&install, "Control Wiring");
    let commission = Task::new(pump.id, "Commissioning", d(10), d(16));

    let dig = Task::new(trench.id, "Dig Trench", d(2), d(12));
    let pull = Task::new(trench.id, "Pull Cable", d(12), d(20));

    project.modules = vec![pump, trench];
    project.tasks = vec![survey, footing, install, wiring, commission, dig, pull];
    project
}
