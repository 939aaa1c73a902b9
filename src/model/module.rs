use chrono::{DateTime, Utc};
use egui::Color32;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::task::{color_serde, Task};

/// Default map position for new modules.
pub const DEFAULT_LAT: f64 = 40.7299;
pub const DEFAULT_LNG: f64 = -80.05;

/// Category of work performed at a site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ModuleKind {
    Water,
    Fiber,
    Power,
    Land,
    #[default]
    Misc,
}

impl ModuleKind {
    pub const ALL: [ModuleKind; 5] = [
        ModuleKind::Water,
        ModuleKind::Fiber,
        ModuleKind::Power,
        ModuleKind::Land,
        ModuleKind::Misc,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ModuleKind::Water => "Water",
            ModuleKind::Fiber => "Fiber",
            ModuleKind::Power => "Power",
            ModuleKind::Land => "Land",
            ModuleKind::Misc => "Misc",
        }
    }

    /// Icon used when a module has no explicit icon.
    pub fn default_icon(self) -> ModuleIcon {
        match self {
            ModuleKind::Water => ModuleIcon::Droplet,
            ModuleKind::Fiber => ModuleIcon::Wifi,
            ModuleKind::Power => ModuleIcon::Zap,
            ModuleKind::Land => ModuleIcon::MapPin,
            ModuleKind::Misc => ModuleIcon::Package,
        }
    }
}

/// Marker icon. Stored by lowercase key (`"droplet"`, `"mappin"`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleIcon {
    Droplet,
    Zap,
    Wifi,
    Box,
    MapPin,
    Anchor,
    Wrench,
    User,
    Package,
}

impl ModuleIcon {
    /// Icons offered in the module dialogs. `Package` is only a kind fallback.
    pub const PICKABLE: [ModuleIcon; 8] = [
        ModuleIcon::Droplet,
        ModuleIcon::Zap,
        ModuleIcon::Wifi,
        ModuleIcon::Box,
        ModuleIcon::MapPin,
        ModuleIcon::Anchor,
        ModuleIcon::Wrench,
        ModuleIcon::User,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ModuleIcon::Droplet => "Water",
            ModuleIcon::Zap => "Power",
            ModuleIcon::Wifi => "Network",
            ModuleIcon::Box => "Box",
            ModuleIcon::MapPin => "Location",
            ModuleIcon::Anchor => "Anchor",
            ModuleIcon::Wrench => "Tool",
            ModuleIcon::User => "User",
            ModuleIcon::Package => "Package",
        }
    }
}

/// Lifecycle status set by hand on a module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    OnHold,
}

impl ModuleStatus {
    pub const ALL: [ModuleStatus; 4] = [
        ModuleStatus::Pending,
        ModuleStatus::InProgress,
        ModuleStatus::Completed,
        ModuleStatus::OnHold,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ModuleStatus::Pending => "Pending",
            ModuleStatus::InProgress => "In progress",
            ModuleStatus::Completed => "Completed",
            ModuleStatus::OnHold => "On hold",
        }
    }
}

/// Status derived from a module's tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleProgress {
    NoTasks,
    InProgress,
    Completed,
}

impl ModuleProgress {
    /// Every task of the module counts, subtasks included.
    pub fn from_tasks<'a>(tasks: impl IntoIterator<Item = &'a Task>) -> Self {
        let mut any = false;
        for task in tasks {
            if !task.is_completed {
                return ModuleProgress::InProgress;
            }
            any = true;
        }
        if any {
            ModuleProgress::Completed
        } else {
            ModuleProgress::NoTasks
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ModuleProgress::NoTasks => "No tasks",
            ModuleProgress::InProgress => "In progress",
            ModuleProgress::Completed => "Completed",
        }
    }
}

/// Completed vs. total top-level tasks, as shown in the dashboard header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TaskCounts {
    pub completed: usize,
    pub total: usize,
}

impl TaskCounts {
    pub fn from_tasks<'a>(tasks: impl IntoIterator<Item = &'a Task>) -> Self {
        tasks
            .into_iter()
            .filter(|t| !t.is_subtask())
            .fold(Self::default(), |acc, t| Self {
                completed: acc.completed + usize::from(t.is_completed),
                total: acc.total + 1,
            })
    }
}

/// A physical work site shown as a map marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Module {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub kind: ModuleKind,
    pub lat: f64,
    pub lng: f64,
    #[serde(default)]
    pub status: ModuleStatus,
    #[serde(default)]
    pub icon: Option<ModuleIcon>,
    #[serde(default, with = "color_serde")]
    pub color: Option<Color32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Module {
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            kind: ModuleKind::Misc,
            lat: DEFAULT_LAT,
            lng: DEFAULT_LNG,
            status: ModuleStatus::Pending,
            icon: None,
            color: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Explicit icon, else the kind's default.
    pub fn resolved_icon(&self) -> ModuleIcon {
        self.icon.unwrap_or_else(|| self.kind.default_icon())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn task(done: bool, parent: Option<Uuid>) -> Task {
        let d = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        let mut t = Task::new(Uuid::nil(), "t", d, d);
        t.is_completed = done;
        t.parent_id = parent;
        t
    }

    #[test]
    fn icon_falls_back_to_kind() {
        let mut m = Module::new("Pump house");
        m.kind = ModuleKind::Water;
        assert_eq!(m.resolved_icon(), ModuleIcon::Droplet);
        m.icon = Some(ModuleIcon::Anchor);
        assert_eq!(m.resolved_icon(), ModuleIcon::Anchor);
        m.icon = None;
        m.kind = ModuleKind::Misc;
        assert_eq!(m.resolved_icon(), ModuleIcon::Package);
    }

    #[test]
    fn progress_from_tasks() {
        assert_eq!(ModuleProgress::from_tasks(&[]), ModuleProgress::NoTasks);
        let done = [task(true, None), task(true, Some(Uuid::new_v4()))];
        assert_eq!(ModuleProgress::from_tasks(&done), ModuleProgress::Completed);
        let open_subtask = [task(true, None), task(false, Some(Uuid::new_v4()))];
        assert_eq!(ModuleProgress::from_tasks(&open_subtask), ModuleProgress::InProgress);
    }

    #[test]
    fn counts_skip_subtasks() {
        let tasks = [task(true, None), task(false, None), task(true, Some(Uuid::new_v4()))];
        assert_eq!(
            TaskCounts::from_tasks(&tasks),
            TaskCounts {
                completed: 1,
                total: 2
            }
        );
    }

    #[test]
    fn icon_keys_are_lowercase() {
        assert_eq!(serde_json::to_string(&ModuleIcon::MapPin).unwrap(), "\"mappin\"");
        let icon: ModuleIcon = serde_json::from_str("\"wrench\"").unwrap();
        assert_eq!(icon, ModuleIcon::Wrench);
        assert!(serde_json::from_str::<ModuleIcon>("\"rocket\"").is_err());
        assert_eq!(
            serde_json::to_string(&ModuleStatus::OnHold).unwrap(),
            "\"on_hold\""
        );
    }
}
