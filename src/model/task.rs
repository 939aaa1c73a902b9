use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use egui::Color32;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Why a task's date could not be turned into a calendar day.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DateError {
    #[error("date is missing")]
    Missing,
    #[error("unparseable date '{0}'")]
    Unparseable(String),
}

/// Truncate a stored date string to its calendar day.
///
/// Accepts plain `YYYY-MM-DD` dates as well as timestamps (RFC 3339 or naive
/// `YYYY-MM-DDTHH:MM:SS`). A timestamp keeps the calendar day written in it;
/// no timezone conversion happens beyond dropping the time of day.
pub fn parse_day(raw: &str) -> Result<NaiveDate, DateError> {
    let s = raw.trim();
    if s.is_empty() {
        return Err(DateError::Missing);
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(d);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.date_naive());
    }
    for fmt in &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(dt.date());
        }
    }
    Err(DateError::Unparseable(s.to_string()))
}

/// Storage format for task dates.
pub fn format_day(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// A unit of work inside a module. Tasks with a `parent_id` are subtasks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub module_id: Uuid,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Raw date as delivered by the store; see [`parse_day`].
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub end_date: String,
    #[serde(default)]
    pub is_completed: bool,
    #[serde(default)]
    pub parent_id: Option<Uuid>,
    /// Explicit bar color, overriding the default gradient.
    #[serde(default, with = "color_serde")]
    pub color: Option<Color32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    pub fn new(module_id: Uuid, title: impl Into<String>, start: NaiveDate, end: NaiveDate) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            module_id,
            title: title.into(),
            description: None,
            start_date: format_day(start),
            end_date: format_day(end),
            is_completed: false,
            parent_id: None,
            color: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// A subtask inherits its parent's module and date strings.
    pub fn new_subtask(parent: &Task, title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            module_id: parent.module_id,
            title: title.into(),
            description: None,
            start_date: parent.start_date.clone(),
            end_date: parent.end_date.clone(),
            is_completed: false,
            parent_id: Some(parent.id),
            color: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_subtask(&self) -> bool {
        self.parent_id.is_some()
    }

    pub fn start_day(&self) -> Result<NaiveDate, DateError> {
        parse_day(&self.start_date)
    }

    pub fn end_day(&self) -> Result<NaiveDate, DateError> {
        parse_day(&self.end_date)
    }

    /// Both truncated dates, or the first problem found.
    pub fn days(&self) -> Result<(NaiveDate, NaiveDate), DateError> {
        Ok((self.start_day()?, self.end_day()?))
    }

    pub fn set_days(&mut self, start: NaiveDate, end: NaiveDate) {
        self.start_date = format_day(start);
        self.end_date = format_day(end);
    }

    /// Deadline status relative to `today`.
    pub fn deadline(&self, today: NaiveDate) -> Result<Deadline, DateError> {
        Ok(Deadline::evaluate(self.end_day()?, self.is_completed, today))
    }

    /// Up to two uppercase initials from the title, `?` if there are none.
    pub fn initials(&self) -> String {
        let initials: String = self
            .title
            .split_whitespace()
            .filter_map(|word| word.chars().next())
            .flat_map(char::to_uppercase)
            .take(2)
            .collect();
        if initials.is_empty() {
            "?".to_string()
        } else {
            initials
        }
    }
}

/// Days remaining and overdue flag, derived together from the same dates so
/// they can never disagree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadline {
    /// `end − today` in whole days; negative when past due.
    pub days_remaining: i64,
    pub is_overdue: bool,
}

impl Deadline {
    pub fn evaluate(end: NaiveDate, is_completed: bool, today: NaiveDate) -> Self {
        let days_remaining = (end - today).num_days();
        Self {
            days_remaining,
            is_overdue: days_remaining < 0 && !is_completed,
        }
    }

    pub fn label(&self) -> String {
        match self.days_remaining {
            d if d < 0 => format!("Overdue by {} days", d.abs()),
            0 => "Due today".to_string(),
            1 => "1 day remaining".to_string(),
            d => format!("{} days remaining", d),
        }
    }
}

/// How the renderer should paint a task bar.
///
/// Precedence: completed, then overdue, then an explicit color, then the
/// default gradient.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarTreatment {
    Completed,
    Overdue,
    Custom(Color32),
    Default,
}

impl BarTreatment {
    pub fn resolve(is_completed: bool, is_overdue: bool, color: Option<Color32>) -> Self {
        if is_completed {
            BarTreatment::Completed
        } else if is_overdue {
            BarTreatment::Overdue
        } else if let Some(c) = color {
            BarTreatment::Custom(c)
        } else {
            BarTreatment::Default
        }
    }
}

/// Parse `#rrggbb` (leading `#` optional).
pub fn parse_hex_color(s: &str) -> Option<Color32> {
    let hex = s.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some(Color32::from_rgb(channel(0)?, channel(2)?, channel(4)?))
}

pub fn to_hex(color: Color32) -> String {
    format!("#{:02x}{:02x}{:02x}", color.r(), color.g(), color.b())
}

/// Serde helper for optional `Color32` stored as a hex string.
///
/// A malformed stored value reads as `None` so one bad record never fails a
/// whole load.
pub(crate) mod color_serde {
    use egui::Color32;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(color: &Option<Color32>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match color {
            Some(c) => serializer.serialize_some(&super::to_hex(*c)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Color32>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        Ok(raw.and_then(|s| {
            let parsed = super::parse_hex_color(&s);
            if parsed.is_none() {
                tracing::warn!("Ignoring malformed color '{}'", s);
            }
            parsed
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parses_plain_dates_and_timestamps() {
        assert_eq!(parse_day("2026-02-16"), Ok(day(2026, 2, 16)));
        assert_eq!(parse_day(" 2026-02-16 "), Ok(day(2026, 2, 16)));
        assert_eq!(parse_day("2026-02-16T23:30:00Z"), Ok(day(2026, 2, 16)));
        assert_eq!(parse_day("2026-02-16T01:00:00-05:00"), Ok(day(2026, 2, 16)));
        assert_eq!(parse_day("2026-02-16T08:15:00"), Ok(day(2026, 2, 16)));
    }

    #[test]
    fn reports_missing_and_garbage_dates() {
        assert_eq!(parse_day(""), Err(DateError::Missing));
        assert_eq!(parse_day("   "), Err(DateError::Missing));
        assert_eq!(
            parse_day("next tuesday"),
            Err(DateError::Unparseable("next tuesday".into()))
        );
        assert!(parse_day("2026-13-01").is_err());
    }

    #[test]
    fn yesterday_open_task_is_overdue_by_one_day() {
        let today = day(2026, 3, 10);
        let mut task = Task::new(Uuid::new_v4(), "Trench", day(2026, 3, 1), day(2026, 3, 9));
        let deadline = task.deadline(today).unwrap();
        assert!(deadline.is_overdue);
        assert_eq!(deadline.days_remaining, -1);
        assert_eq!(deadline.label(), "Overdue by 1 days");

        task.is_completed = true;
        let deadline = task.deadline(today).unwrap();
        assert!(!deadline.is_overdue);
        assert_eq!(deadline.days_remaining, -1);
    }

    #[test]
    fn deadline_labels() {
        let today = day(2026, 3, 10);
        assert_eq!(Deadline::evaluate(today, false, today).label(), "Due today");
        assert!(!Deadline::evaluate(today, false, today).is_overdue);
        assert_eq!(
            Deadline::evaluate(day(2026, 3, 11), false, today).label(),
            "1 day remaining"
        );
        assert_eq!(
            Deadline::evaluate(day(2026, 3, 20), false, today).label(),
            "10 days remaining"
        );
    }

    #[test]
    fn treatment_precedence() {
        let red = Color32::from_rgb(255, 0, 0);
        assert_eq!(BarTreatment::resolve(true, true, Some(red)), BarTreatment::Completed);
        assert_eq!(BarTreatment::resolve(false, true, Some(red)), BarTreatment::Overdue);
        assert_eq!(BarTreatment::resolve(false, false, Some(red)), BarTreatment::Custom(red));
        assert_eq!(BarTreatment::resolve(false, false, None), BarTreatment::Default);
    }

    #[test]
    fn initials_from_title() {
        let mut task = Task::new(Uuid::new_v4(), "lay fiber conduit", day(2026, 1, 1), day(2026, 1, 2));
        assert_eq!(task.initials(), "LF");
        task.title = "   ".into();
        assert_eq!(task.initials(), "?");
    }

    #[test]
    fn subtask_inherits_parent_fields() {
        let parent = Task::new(Uuid::new_v4(), "Pour slab", day(2026, 4, 1), day(2026, 4, 5));
        let sub = Task::new_subtask(&parent, "Rebar");
        assert!(sub.is_subtask());
        assert_eq!(sub.parent_id, Some(parent.id));
        assert_eq!(sub.module_id, parent.module_id);
        assert_eq!(sub.days(), parent.days());
    }

    #[test]
    fn hex_colors() {
        assert_eq!(parse_hex_color("#3b82f6"), Some(Color32::from_rgb(0x3b, 0x82, 0xf6)));
        assert_eq!(parse_hex_color("ef4444"), Some(Color32::from_rgb(0xef, 0x44, 0x44)));
        assert_eq!(parse_hex_color("#zzz"), None);
        assert_eq!(to_hex(Color32::from_rgb(16, 185, 129)), "#10b981");
    }

    #[test]
    fn malformed_color_reads_as_none() {
        let json = format!(
            r##"{{"id":"{}","module_id":"{}","title":"t","start_date":"2026-01-01",
                "end_date":"nope","color":"not-a-color",
                "created_at":"2026-01-01T00:00:00Z","updated_at":"2026-01-01T00:00:00Z"}}"##,
            Uuid::new_v4(),
            Uuid::new_v4()
        );
        let task: Task = serde_json::from_str(&json).unwrap();
        assert_eq!(task.color, None);
        assert!(matches!(task.end_day(), Err(DateError::Unparseable(_))));
        assert!(!task.is_completed);
    }
}
