use std::collections::HashMap;
use std::path::Path;

use uuid::Uuid;

use crate::error::IoError;
use crate::model::task::to_hex;
use crate::model::Task;

fn completion_status(task: &Task) -> &'static str {
    if task.is_completed {
        "Done"
    } else {
        "Open"
    }
}

/// Export tasks to a semicolon-delimited CSV file matching the import format.
///
/// Columns: Title ; Start Date ; End Date ; Status ; Parent ; Color
/// Dates are written as stored. Returns the number of tasks written.
pub fn export_csv(tasks: &[Task], path: &Path) -> Result<usize, IoError> {
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(b';')
        .from_path(path)?;
    write_tasks(&mut wtr, tasks)?;
    wtr.flush().map_err(|source| IoError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(tasks.len())
}

fn write_tasks<W: std::io::Write>(wtr: &mut csv::Writer<W>, tasks: &[Task]) -> Result<(), IoError> {
    let titles: HashMap<Uuid, &str> = tasks.iter().map(|t| (t.id, t.title.as_str())).collect();

    wtr.write_record(["Title", "Start Date", "End Date", "Status", "Parent", "Color"])?;
    for task in tasks {
        let parent = task
            .parent_id
            .and_then(|id| titles.get(&id).copied())
            .unwrap_or("");
        let color = task.color.map(to_hex).unwrap_or_default();
        wtr.write_record([
            task.title.as_str(),
            task.start_date.as_str(),
            task.end_date.as_str(),
            completion_status(task),
            parent,
            color.as_str(),
        ])?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::csv_import::import_csv;
    use chrono::NaiveDate;

    #[test]
    fn export_reads_back_through_import() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasks.csv");
        let module_id = Uuid::new_v4();
        let d = |day| NaiveDate::from_ymd_opt(2026, 5, day).unwrap();

        let mut parent = Task::new(module_id, "Grade lot", d(1), d(4));
        parent.is_completed = true;
        let child = Task::new_subtask(&parent, "Stake corners");

        assert_eq!(export_csv(&[parent.clone(), child], &path).unwrap(), 2);

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("Title;Start Date;End Date;Status;Parent;Color"));

        let (tasks, skipped) = import_csv(&path, module_id).unwrap();
        assert_eq!(skipped, 0);
        assert_eq!(tasks[0].title, "Grade lot");
        assert!(tasks[0].is_completed);
        assert_eq!(tasks[1].parent_id, Some(tasks[0].id));
        assert_eq!(tasks[1].days(), parent.days());
    }
}
