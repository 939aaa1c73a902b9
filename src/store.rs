//! Local task store.
//!
//! Holds a [`Project`] in memory and answers the queries the dashboard needs.
//! Every mutation is broadcast as a [`StoreEvent`]; listeners react by
//! re-fetching what they show rather than patching their own copies.

use std::collections::HashSet;
use std::sync::mpsc::{self, Receiver, Sender};

use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::StoreError;
use crate::model::{Module, ModuleProgress, Project, Task, TaskCounts};

pub type StoreResult<T> = Result<T, StoreError>;

/// Change notification sent to every subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreEvent {
    ModulesChanged,
    TasksChanged { module_id: Uuid },
    /// The whole project was replaced (new/open/import).
    Reloaded,
}

#[derive(Debug, Default)]
pub struct TaskStore {
    project: Project,
    subscribers: Vec<Sender<StoreEvent>>,
}

impl TaskStore {
    pub fn new(project: Project) -> Self {
        Self {
            project,
            subscribers: Vec::new(),
        }
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    /// Swap in a freshly loaded project.
    pub fn replace_project(&mut self, project: Project) {
        info!(
            "Loaded project '{}' ({} modules, {} tasks)",
            project.name,
            project.modules.len(),
            project.tasks.len()
        );
        self.project = project;
        self.emit(StoreEvent::Reloaded);
    }

    /// Register a listener. Receivers that are dropped get pruned on the next
    /// broadcast.
    pub fn subscribe(&mut self) -> Receiver<StoreEvent> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        rx
    }

    fn emit(&mut self, event: StoreEvent) {
        debug!("Store event: {:?}", event);
        self.subscribers.retain(|tx| tx.send(event).is_ok());
    }

    fn changed(&mut self, event: StoreEvent) {
        self.project.touch();
        self.emit(event);
    }

    // --- Modules ---

    /// All modules, oldest first.
    pub fn modules(&self) -> Vec<&Module> {
        let mut modules: Vec<&Module> = self.project.modules.iter().collect();
        modules.sort_by_key(|m| m.created_at);
        modules
    }

    pub fn module(&self, id: Uuid) -> StoreResult<&Module> {
        self.project
            .modules
            .iter()
            .find(|m| m.id == id)
            .ok_or(StoreError::ModuleNotFound(id))
    }

    fn module_mut(&mut self, id: Uuid) -> StoreResult<&mut Module> {
        self.project
            .modules
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or(StoreError::ModuleNotFound(id))
    }

    pub fn add_module(&mut self, mut module: Module) -> StoreResult<Uuid> {
        module.name = validate_name(&module.name, "Module name")?;
        if self.project.modules.iter().any(|m| m.id == module.id) {
            return Err(StoreError::Validation(format!(
                "Module '{}' already exists",
                module.id
            )));
        }
        let id = module.id;
        debug!("Creating module: {} with name: {}", id, module.name);
        self.project.modules.push(module);
        self.changed(StoreEvent::ModulesChanged);
        Ok(id)
    }

    /// Replace a module's editable fields. `created_at` is preserved.
    pub fn update_module(&mut self, module: Module) -> StoreResult<()> {
        let name = validate_name(&module.name, "Module name")?;
        let existing = self.module_mut(module.id)?;
        let created_at = existing.created_at;
        *existing = Module {
            name,
            created_at,
            updated_at: Utc::now(),
            ..module
        };
        self.changed(StoreEvent::ModulesChanged);
        Ok(())
    }

    /// Persist a dragged marker position.
    pub fn move_module(&mut self, id: Uuid, lat: f64, lng: f64) -> StoreResult<()> {
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
            return Err(StoreError::Validation(format!(
                "Coordinates out of range: {lat}, {lng}"
            )));
        }
        let module = self.module_mut(id)?;
        module.lat = lat;
        module.lng = lng;
        module.updated_at = Utc::now();
        self.changed(StoreEvent::ModulesChanged);
        Ok(())
    }

    /// Delete a module and every task it owns. Returns the number of tasks removed.
    pub fn delete_module(&mut self, id: Uuid) -> StoreResult<usize> {
        self.module(id)?;
        self.project.modules.retain(|m| m.id != id);
        let before = self.project.tasks.len();
        self.project.tasks.retain(|t| t.module_id != id);
        let removed = before - self.project.tasks.len();
        debug!("Deleted module {} and {} tasks", id, removed);
        self.changed(StoreEvent::ModulesChanged);
        Ok(removed)
    }

    pub fn module_progress(&self, id: Uuid) -> ModuleProgress {
        ModuleProgress::from_tasks(self.project.tasks.iter().filter(|t| t.module_id == id))
    }

    pub fn module_counts(&self, id: Uuid) -> TaskCounts {
        TaskCounts::from_tasks(self.project.tasks.iter().filter(|t| t.module_id == id))
    }

    // --- Tasks ---

    /// Every task of a module (subtasks included), ordered by start date.
    /// Tasks whose start date cannot be read sort last, in insertion order.
    pub fn tasks_for_module(&self, module_id: Uuid) -> Vec<Task> {
        let mut tasks: Vec<Task> = self
            .project
            .tasks
            .iter()
            .filter(|t| t.module_id == module_id)
            .cloned()
            .collect();
        tasks.sort_by_key(|t| {
            let start = t.start_day().ok();
            (start.is_none(), start)
        });
        tasks
    }

    pub fn task(&self, id: Uuid) -> StoreResult<&Task> {
        self.project
            .tasks
            .iter()
            .find(|t| t.id == id)
            .ok_or(StoreError::TaskNotFound(id))
    }

    fn task_mut(&mut self, id: Uuid) -> StoreResult<&mut Task> {
        self.project
            .tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(StoreError::TaskNotFound(id))
    }

    /// Subtasks of `parent_id`, oldest first.
    pub fn subtasks_of(&self, parent_id: Uuid) -> Vec<Task> {
        let mut subtasks: Vec<Task> = self
            .project
            .tasks
            .iter()
            .filter(|t| t.parent_id == Some(parent_id))
            .cloned()
            .collect();
        subtasks.sort_by_key(|t| t.created_at);
        subtasks
    }

    pub fn add_task(&mut self, mut task: Task) -> StoreResult<Uuid> {
        task.title = validate_name(&task.title, "Task title")?;
        self.module(task.module_id)?;
        if let Some(parent_id) = task.parent_id {
            let parent = self.task(parent_id)?;
            if parent.module_id != task.module_id {
                return Err(StoreError::Validation(
                    "Subtask must belong to its parent's module".to_string(),
                ));
            }
            if parent.is_subtask() {
                return Err(StoreError::Validation(format!(
                    "'{}' is already a subtask and cannot have subtasks",
                    parent.title
                )));
            }
        }
        let id = task.id;
        let module_id = task.module_id;
        debug!("Creating task: {} with title: {}", id, task.title);
        self.project.tasks.push(task);
        self.changed(StoreEvent::TasksChanged { module_id });
        Ok(id)
    }

    /// Add a subtask that inherits the parent's module and dates.
    pub fn add_subtask(&mut self, parent_id: Uuid, title: &str) -> StoreResult<Uuid> {
        let parent = self.task(parent_id)?;
        let subtask = Task::new_subtask(parent, title);
        self.add_task(subtask)
    }

    /// Replace a task's editable fields. Identity, module and parent are kept.
    pub fn update_task(&mut self, task: Task) -> StoreResult<()> {
        let title = validate_name(&task.title, "Task title")?;
        let existing = self.task_mut(task.id)?;
        let module_id = existing.module_id;
        *existing = Task {
            title,
            module_id,
            parent_id: existing.parent_id,
            created_at: existing.created_at,
            updated_at: Utc::now(),
            ..task
        };
        self.changed(StoreEvent::TasksChanged { module_id });
        Ok(())
    }

    /// Flip completion. Returns the new state.
    pub fn toggle_completed(&mut self, id: Uuid) -> StoreResult<bool> {
        let task = self.task_mut(id)?;
        task.is_completed = !task.is_completed;
        task.updated_at = Utc::now();
        let (done, module_id) = (task.is_completed, task.module_id);
        self.changed(StoreEvent::TasksChanged { module_id });
        Ok(done)
    }

    /// Delete a task together with everything below it. Returns the number removed.
    pub fn delete_task(&mut self, id: Uuid) -> StoreResult<usize> {
        let module_id = self.task(id)?.module_id;
        // Loaded files may nest deeper than one level.
        let mut doomed: HashSet<Uuid> = HashSet::from([id]);
        loop {
            let grown = self
                .project
                .tasks
                .iter()
                .filter(|t| t.parent_id.is_some_and(|p| doomed.contains(&p)))
                .map(|t| t.id)
                .filter(|tid| !doomed.contains(tid))
                .collect::<Vec<_>>();
            if grown.is_empty() {
                break;
            }
            doomed.extend(grown);
        }
        let before = self.project.tasks.len();
        self.project.tasks.retain(|t| !doomed.contains(&t.id));
        let removed = before - self.project.tasks.len();
        debug!("Deleted task {} ({} rows)", id, removed);
        self.changed(StoreEvent::TasksChanged { module_id });
        Ok(removed)
    }
}

fn validate_name(raw: &str, what: &str) -> StoreResult<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        Err(StoreError::Validation(format!("{what} cannot be empty")))
    } else {
        Ok(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn store_with_module() -> (TaskStore, Uuid) {
        let mut store = TaskStore::default();
        let id = store.add_module(Module::new("North Well")).unwrap();
        (store, id)
    }

    #[test]
    fn mutations_notify_subscribers() {
        let (mut store, module_id) = store_with_module();
        let rx = store.subscribe();

        let task_id = store
            .add_task(Task::new(module_id, "Survey", day(2026, 1, 5), day(2026, 1, 9)))
            .unwrap();
        store.toggle_completed(task_id).unwrap();
        store.move_module(module_id, 41.0, -80.0).unwrap();
        store.replace_project(Project::new("Fresh"));

        let events: Vec<StoreEvent> = rx.try_iter().collect();
        assert_eq!(
            events,
            vec![
                StoreEvent::TasksChanged { module_id },
                StoreEvent::TasksChanged { module_id },
                StoreEvent::ModulesChanged,
                StoreEvent::Reloaded,
            ]
        );
    }

    #[test]
    fn dropped_subscribers_are_pruned() {
        let (mut store, _) = store_with_module();
        let rx = store.subscribe();
        drop(rx);
        let kept = store.subscribe();
        store.add_module(Module::new("South Pad")).unwrap();
        assert_eq!(store.subscribers.len(), 1);
        assert_eq!(kept.try_recv(), Ok(StoreEvent::ModulesChanged));
    }

    #[test]
    fn tasks_are_ordered_by_start_date() {
        let (mut store, module_id) = store_with_module();
        let mut broken = Task::new(module_id, "Broken", day(2026, 1, 1), day(2026, 1, 1));
        broken.start_date = "garbage".into();
        store.add_task(broken).unwrap();
        store
            .add_task(Task::new(module_id, "Late", day(2026, 3, 1), day(2026, 3, 2)))
            .unwrap();
        store
            .add_task(Task::new(module_id, "Early", day(2026, 1, 1), day(2026, 1, 2)))
            .unwrap();

        let titles: Vec<String> = store
            .tasks_for_module(module_id)
            .into_iter()
            .map(|t| t.title)
            .collect();
        assert_eq!(titles, vec!["Early", "Late", "Broken"]);
    }

    #[test]
    fn delete_task_cascades_to_subtasks() {
        let (mut store, module_id) = store_with_module();
        let parent = store
            .add_task(Task::new(module_id, "Pour slab", day(2026, 2, 1), day(2026, 2, 3)))
            .unwrap();
        store.add_subtask(parent, "Rebar").unwrap();
        store.add_subtask(parent, "Forms").unwrap();
        let other = store
            .add_task(Task::new(module_id, "Fence", day(2026, 2, 1), day(2026, 2, 3)))
            .unwrap();

        let titles: Vec<String> = store.subtasks_of(parent).into_iter().map(|t| t.title).collect();
        assert_eq!(titles, vec!["Rebar", "Forms"]);

        assert_eq!(store.delete_task(parent), Ok(3));
        assert_eq!(store.project().tasks.len(), 1);
        assert!(store.task(other).is_ok());
    }

    #[test]
    fn subtasks_cannot_have_subtasks() {
        let (mut store, module_id) = store_with_module();
        let parent = store
            .add_task(Task::new(module_id, "Trench", day(2026, 3, 1), day(2026, 3, 9)))
            .unwrap();
        let child = store.add_subtask(parent, "Conduit").unwrap();

        assert!(matches!(
            store.add_subtask(child, "Pull fiber"),
            Err(StoreError::Validation(_))
        ));
        assert_eq!(store.project().tasks.len(), 2);
    }

    #[test]
    fn delete_task_removes_nested_descendants() {
        let (mut store, module_id) = store_with_module();
        let mut project = store.project().clone();
        let root = Task::new(module_id, "Trench", day(2026, 3, 1), day(2026, 3, 9));
        let mid = Task::new_subtask(&root, "Conduit");
        let leaf = Task::new_subtask(&mid, "Pull fiber");
        let root_id = root.id;
        project.tasks.extend([root, mid, leaf]);
        store.replace_project(project);

        assert_eq!(store.delete_task(root_id), Ok(3));
        assert!(store.project().tasks.is_empty());
        assert_eq!(store.module_progress(module_id), ModuleProgress::NoTasks);
    }

    #[test]
    fn delete_module_cascades_to_tasks() {
        let (mut store, module_id) = store_with_module();
        let keep = store.add_module(Module::new("Keep")).unwrap();
        store
            .add_task(Task::new(module_id, "a", day(2026, 2, 1), day(2026, 2, 3)))
            .unwrap();
        store
            .add_task(Task::new(keep, "b", day(2026, 2, 1), day(2026, 2, 3)))
            .unwrap();

        assert_eq!(store.delete_module(module_id), Ok(1));
        assert_eq!(store.module(module_id), Err(StoreError::ModuleNotFound(module_id)));
        assert_eq!(store.tasks_for_module(keep).len(), 1);
    }

    #[test]
    fn validation_and_missing_ids() {
        let (mut store, module_id) = store_with_module();
        let blank = Task::new(module_id, "   ", day(2026, 1, 1), day(2026, 1, 1));
        assert!(matches!(store.add_task(blank), Err(StoreError::Validation(_))));

        let orphan = Task::new(Uuid::new_v4(), "Orphan", day(2026, 1, 1), day(2026, 1, 1));
        assert_eq!(
            store.add_task(orphan.clone()),
            Err(StoreError::ModuleNotFound(orphan.module_id))
        );

        let ghost = Uuid::new_v4();
        assert_eq!(store.toggle_completed(ghost), Err(StoreError::TaskNotFound(ghost)));
        assert!(matches!(
            store.move_module(module_id, 120.0, 0.0),
            Err(StoreError::Validation(_))
        ));
    }

    #[test]
    fn update_task_keeps_identity() {
        let (mut store, module_id) = store_with_module();
        let id = store
            .add_task(Task::new(module_id, "Draft", day(2026, 1, 1), day(2026, 1, 2)))
            .unwrap();
        let original = store.task(id).unwrap().clone();

        let mut edited = original.clone();
        edited.title = "  Final  ".into();
        edited.module_id = Uuid::new_v4();
        edited.set_days(day(2026, 1, 3), day(2026, 1, 8));
        store.update_task(edited).unwrap();

        let stored = store.task(id).unwrap();
        assert_eq!(stored.title, "Final");
        assert_eq!(stored.module_id, module_id);
        assert_eq!(stored.created_at, original.created_at);
        assert_eq!(stored.days(), Ok((day(2026, 1, 3), day(2026, 1, 8))));
    }

    #[test]
    fn update_module_keeps_created_at() {
        let (mut store, module_id) = store_with_module();
        let original = store.module(module_id).unwrap().clone();

        let mut edited = original.clone();
        edited.name = "  North Well B  ".into();
        edited.updated_at = original.created_at - chrono::Duration::days(1);
        edited.created_at = original.created_at + chrono::Duration::days(30);
        store.update_module(edited).unwrap();

        let stored = store.module(module_id).unwrap();
        assert_eq!(stored.name, "North Well B");
        assert_eq!(stored.created_at, original.created_at);
        assert!(stored.updated_at >= original.created_at);
    }

    #[test]
    fn progress_and_counts() {
        let (mut store, module_id) = store_with_module();
        assert_eq!(store.module_progress(module_id), ModuleProgress::NoTasks);
        let id = store
            .add_task(Task::new(module_id, "a", day(2026, 1, 1), day(2026, 1, 2)))
            .unwrap();
        store.add_subtask(id, "child").unwrap();
        assert_eq!(store.module_progress(module_id), ModuleProgress::InProgress);
        store.toggle_completed(id).unwrap();
        assert_eq!(
            store.module_counts(module_id),
            TaskCounts {
                completed: 1,
                total: 1
            }
        );
        assert_eq!(store.module_progress(module_id), ModuleProgress::InProgress);
    }
}
