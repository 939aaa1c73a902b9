use std::collections::{HashMap, HashSet};
use std::path::Path;

use chrono::NaiveDate;
use tracing::warn;
use uuid::Uuid;

use crate::error::IoError;
use crate::model::task::parse_hex_color;
use crate::model::Task;

/// Map a status string to the completion flag.
fn status_is_completed(status: &str) -> bool {
    matches!(
        status.trim().to_lowercase().as_str(),
        "finished" | "done" | "complete" | "completed" | "yes" | "true" | "1" | "x"
    )
}

/// Try parsing a date string with several common formats.
fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    for fmt in &["%Y-%m-%d", "%d/%m/%Y", "%m/%d/%Y", "%d-%m-%Y", "%d.%m.%Y", "%Y/%m/%d", "%m-%d-%Y"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    crate::model::task::parse_day(s).ok()
}

/// Detect delimiter by checking the first line for common separators.
fn detect_delimiter(first_line: &str) -> u8 {
    let semicolons = first_line.matches(';').count();
    let commas = first_line.matches(',').count();
    let tabs = first_line.matches('\t').count();

    if semicolons >= commas && semicolons >= tabs {
        b';'
    } else if tabs >= commas {
        b'\t'
    } else {
        b','
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Column {
    Title,
    Start,
    End,
    Status,
    Description,
    Parent,
    Color,
}

/// Map a header cell to the column it carries, ignoring case and separators.
fn header_to_column(header: &str) -> Option<Column> {
    let normalized = header.trim().to_lowercase().replace([' ', '-', '_'], "");
    match normalized.as_str() {
        "name" | "task" | "tasklabel" | "taskname" | "label" | "title" | "activity" => {
            Some(Column::Title)
        }
        "start" | "startdate" | "from" | "begin" | "begindate" => Some(Column::Start),
        "end" | "enddate" | "to" | "finish" | "finishdate" | "due" | "duedate" => {
            Some(Column::End)
        }
        "status" | "state" | "done" | "completed" | "iscompleted" => Some(Column::Status),
        "description" | "notes" | "note" | "details" | "comment" | "comments" => {
            Some(Column::Description)
        }
        "parent" | "parenttask" | "parentname" | "subtaskof" => Some(Column::Parent),
        "color" | "colour" => Some(Column::Color),
        _ => None,
    }
}

/// Import tasks for one module from a CSV file.
///
/// Auto-detects delimiter (comma, semicolon, tab) and matches column headers
/// flexibly. Parent columns are resolved by title once every row is read.
/// Returns `(tasks, skipped_count)` on success.
pub fn import_csv(path: &Path, module_id: Uuid) -> Result<(Vec<Task>, usize), IoError> {
    let content = std::fs::read_to_string(path).map_err(|source| IoError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    import_csv_str(&content, module_id)
}

pub(crate) fn import_csv_str(content: &str, module_id: Uuid) -> Result<(Vec<Task>, usize), IoError> {
    let first_line = content.lines().next().unwrap_or("");
    let delimiter = detect_delimiter(first_line);

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let headers = reader.headers()?.clone();
    let columns: Vec<Option<Column>> = headers.iter().map(header_to_column).collect();

    let has = |c: Column| columns.contains(&Some(c));
    if !has(Column::Title) || !has(Column::Start) || !has(Column::End) {
        return Err(IoError::MissingColumns {
            found: headers.iter().map(str::to_string).collect(),
        });
    }

    // Parent names are resolved after all rows are read.
    let mut tasks: Vec<Task> = Vec::new();
    let mut parent_names: Vec<Option<String>> = Vec::new();
    let mut skipped = 0usize;

    for (i, result) in reader.records().enumerate() {
        let line = i + 2;
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                warn!("Skipping CSV row {}: {}", line, e);
                skipped += 1;
                continue;
            }
        };

        let mut fields: HashMap<Column, &str> = HashMap::new();
        for (field, column) in record.iter().zip(&columns) {
            if let Some(column) = column {
                fields.entry(*column).or_insert(field);
            }
        }
        let field = |c: Column| fields.get(&c).copied().filter(|s| !s.is_empty());

        let Some(title) = field(Column::Title) else {
            skipped += 1;
            continue;
        };

        let start = match field(Column::Start).and_then(parse_date) {
            Some(d) => d,
            None => {
                warn!("Skipping row {}: invalid start date '{}'", line, field(Column::Start).unwrap_or(""));
                skipped += 1;
                continue;
            }
        };
        let end = match field(Column::End).and_then(parse_date) {
            Some(d) => d,
            None => {
                warn!("Skipping row {}: invalid end date '{}'", line, field(Column::End).unwrap_or(""));
                skipped += 1;
                continue;
            }
        };

        let mut task = Task::new(module_id, title, start, end);
        task.is_completed = field(Column::Status).is_some_and(status_is_completed);
        task.description = field(Column::Description).map(str::to_string);
        task.color = field(Column::Color).and_then(parse_hex_color);

        parent_names.push(field(Column::Parent).map(str::to_string));
        tasks.push(task);
    }

    if tasks.is_empty() {
        return Err(IoError::NoRows { skipped });
    }

    let name_to_id: HashMap<String, Uuid> = tasks
        .iter()
        .map(|t| (t.title.to_lowercase(), t.id))
        .collect();

    for (task, parent_name) in tasks.iter_mut().zip(parent_names.iter()) {
        if let Some(pname) = parent_name {
            match name_to_id.get(&pname.to_lowercase()) {
                Some(&pid) if pid != task.id => task.parent_id = Some(pid),
                Some(_) => {}
                None => warn!("Parent task '{}' not found for '{}'", pname, task.title),
            }
        }
    }

    // Subtasks are one level deep; a row naming another subtask stays top-level.
    let nested: HashSet<Uuid> = tasks.iter().filter(|t| t.is_subtask()).map(|t| t.id).collect();
    for task in tasks.iter_mut() {
        if task.parent_id.is_some_and(|p| nested.contains(&p)) {
            warn!("'{}' names a subtask as its parent; importing it top-level", task.title);
            task.parent_id = None;
        }
    }

    Ok((tasks, skipped))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn imports_semicolon_file_with_parents() {
        let csv = "Task Label;Start Date;End Date;Status;Parent;Color\n\
                   Install pump;01/02/2026;10/02/2026;Done;;#10b981\n\
                   Wire panel;2026-02-03;2026-02-04;open;install pump;\n\
                   Broken;soon;2026-02-04;;;\n\
                   ;2026-02-03;2026-02-04;;;\n";
        let module_id = Uuid::new_v4();
        let (tasks, skipped) = import_csv_str(csv, module_id).unwrap();

        assert_eq!(skipped, 2);
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].title, "Install pump");
        assert_eq!(tasks[0].days(), Ok((day(2026, 2, 1), day(2026, 2, 10))));
        assert!(tasks[0].is_completed);
        assert_eq!(tasks[0].color, parse_hex_color("#10b981"));
        assert!(tasks.iter().all(|t| t.module_id == module_id));

        assert!(!tasks[1].is_completed);
        assert_eq!(tasks[1].parent_id, Some(tasks[0].id));
        assert_eq!(tasks[1].start_date, "2026-02-03");
    }

    #[test]
    fn parent_chains_are_cut_to_one_level() {
        let csv = "name;start;end;parent\n\
                   Trench;2026-03-01;2026-03-09;\n\
                   Conduit;2026-03-02;2026-03-04;Trench\n\
                   Pull fiber;2026-03-05;2026-03-06;Conduit\n";
        let (tasks, _) = import_csv_str(csv, Uuid::nil()).unwrap();

        assert_eq!(tasks[0].parent_id, None);
        assert_eq!(tasks[1].parent_id, Some(tasks[0].id));
        assert_eq!(tasks[2].parent_id, None);
    }

    #[test]
    fn comma_delimited_with_alternate_headers() {
        let csv = "title,from,due,notes\nSurvey,2026-01-05,2026-01-06,bring stakes\n";
        let (tasks, skipped) = import_csv_str(csv, Uuid::nil()).unwrap();
        assert_eq!(skipped, 0);
        assert_eq!(tasks[0].description.as_deref(), Some("bring stakes"));
    }

    #[test]
    fn missing_columns_are_reported() {
        let err = import_csv_str("name;start\nA;2026-01-01\n", Uuid::nil()).unwrap_err();
        match err {
            IoError::MissingColumns { found } => assert_eq!(found, vec!["name", "start"]),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn all_rows_rejected() {
        let err = import_csv_str("name;start;end\nA;x;y\n", Uuid::nil()).unwrap_err();
        assert!(matches!(err, IoError::NoRows { skipped: 1 }));
    }

    #[test]
    fn delimiter_detection() {
        assert_eq!(detect_delimiter("a;b;c"), b';');
        assert_eq!(detect_delimiter("a,b,c"), b',');
        assert_eq!(detect_delimiter("a\tb\tc"), b'\t');
    }
}
