use std::path::Path;

use tracing::debug;

use crate::error::IoError;
use crate::model::Project;

/// Save a project to a JSON file.
pub fn save_project(project: &Project, path: &Path) -> Result<(), IoError> {
    let json = serde_json::to_string_pretty(project)?;
    std::fs::write(path, json).map_err(|source| IoError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("Saved project '{}' to {}", project.name, path.display());
    Ok(())
}

/// Load a project from a JSON file.
pub fn load_project(path: &Path) -> Result<Project, IoError> {
    let json = std::fs::read_to_string(path).map_err(|source| IoError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let project: Project = serde_json::from_str(&json)?;
    debug!("Loaded project '{}' from {}", project.name, path.display());
    Ok(project)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Module, ModuleIcon, Task};
    use chrono::NaiveDate;
    use egui::Color32;

    #[test]
    fn project_survives_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("site.roadmap.json");

        let mut project = Project::new("Site");
        let mut module = Module::new("Pump");
        module.icon = Some(ModuleIcon::Droplet);
        let d = NaiveDate::from_ymd_opt(2026, 2, 1).unwrap();
        let mut task = Task::new(module.id, "Dig", d, d);
        task.color = Some(Color32::from_rgb(59, 130, 246));
        project.modules.push(module);
        project.tasks.push(task.clone());

        save_project(&project, &path).unwrap();
        let loaded = load_project(&path).unwrap();
        assert_eq!(loaded.name, "Site");
        assert_eq!(loaded.modules, project.modules);
        assert_eq!(loaded.tasks, vec![task]);
    }

    #[test]
    fn missing_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");
        match load_project(&path) {
            Err(IoError::Read { path: p, .. }) => assert_eq!(p, path),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn garbage_is_a_json_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(load_project(&path), Err(IoError::Json(_))));
    }
}
