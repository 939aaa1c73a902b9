//! Roadmap timeline layout.
//!
//! Turns a module's task list into a day-indexed pixel grid: the padded date
//! range, one cell per calendar day, a bar rectangle per top-level task and
//! the month header bands. Every function here is pure; "today" is always
//! passed in by the caller.

use chrono::{Days, Months, NaiveDate};
use egui::Color32;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::task::{BarTreatment, DateError, Deadline, Task};

pub const MIN_DAY_WIDTH: f32 = 8.0;
pub const MAX_DAY_WIDTH: f32 = 120.0;
const ZOOM_STEP: f32 = 1.2;

/// Engine parameters. Persisted as part of the user config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineSettings {
    /// Pixels per calendar day.
    pub day_width: f32,
    /// Context shown before the first and after the last task date.
    pub padding_days: u32,
    /// First day of the grid when there is nothing to lay out.
    pub fallback_anchor: NaiveDate,
    /// Length of the empty-state grid.
    pub fallback_months: u32,
}

impl Default for TimelineSettings {
    fn default() -> Self {
        Self {
            day_width: 40.0,
            padding_days: 14,
            fallback_anchor: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap_or_default(),
            fallback_months: 3,
        }
    }
}

impl TimelineSettings {
    /// Zoom in (increase pixels per day).
    pub fn zoom_in(&mut self) {
        self.day_width = (self.day_width * ZOOM_STEP).min(MAX_DAY_WIDTH);
    }

    /// Zoom out (decrease pixels per day).
    pub fn zoom_out(&mut self) {
        self.day_width = (self.day_width / ZOOM_STEP).max(MIN_DAY_WIDTH);
    }

    /// Day width usable for layout; bad persisted values fall back into range.
    pub fn effective_day_width(&self) -> f32 {
        if self.day_width.is_finite() {
            self.day_width.clamp(MIN_DAY_WIDTH, MAX_DAY_WIDTH)
        } else {
            Self::default().day_width
        }
    }
}

/// Inclusive calendar range covered by the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub min: NaiveDate,
    pub max: NaiveDate,
}

impl DateRange {
    /// Number of calendar days in the range, zero if inverted.
    pub fn num_days(&self) -> i64 {
        ((self.max - self.min).num_days() + 1).max(0)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.min <= date && date <= self.max
    }
}

/// One column of the grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayCell {
    pub date: NaiveDate,
    /// e.g. "Mon 16"
    pub day_label: String,
    /// e.g. "February 2026"
    pub month_label: String,
    /// First cell of its month label within the sequence.
    pub is_month_start: bool,
}

/// A top-level task placed on the grid.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionedTask {
    pub task: Task,
    pub row_index: usize,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub left_offset: f32,
    pub bar_width: f32,
    pub days_remaining: i64,
    pub is_overdue: bool,
    pub treatment: BarTreatment,
}

impl PositionedTask {
    pub fn id(&self) -> Uuid {
        self.task.id
    }

    pub fn is_completed(&self) -> bool {
        self.task.is_completed
    }

    pub fn color(&self) -> Option<Color32> {
        self.task.color
    }

    pub fn deadline(&self) -> Deadline {
        Deadline {
            days_remaining: self.days_remaining,
            is_overdue: self.is_overdue,
        }
    }
}

/// A top-level task whose dates could not be read. It keeps its row so the
/// rows after it do not shift.
#[derive(Debug, Clone, PartialEq)]
pub struct UnplacedTask {
    pub id: Uuid,
    pub title: String,
    pub row_index: usize,
    pub error: DateError,
}

/// Header span covering the consecutive days of one month.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthBand {
    pub label: String,
    pub left_offset: f32,
    pub width: f32,
}

/// Complete layout for one task set.
#[derive(Debug, Clone, PartialEq)]
pub struct TimelineLayout {
    pub range: DateRange,
    pub days: Vec<DayCell>,
    pub tasks: Vec<PositionedTask>,
    pub unplaced: Vec<UnplacedTask>,
    pub months: Vec<MonthBand>,
    pub day_width: f32,
    /// Number of top-level tasks, placed or not.
    pub row_count: usize,
}

impl TimelineLayout {
    /// Run the whole pipeline. `today` feeds the overdue classification only;
    /// the grid itself does not depend on it.
    pub fn compute(tasks: &[Task], settings: &TimelineSettings, today: NaiveDate) -> Self {
        let day_width = settings.effective_day_width();
        let range = compute_range(tasks, settings);
        let (positioned, unplaced) = layout_tasks(tasks, range.min, day_width, today);
        let days = if positioned.is_empty() {
            Vec::new()
        } else {
            build_day_cells(&range)
        };
        let months = month_bands(&days, day_width);

        Self {
            range,
            row_count: positioned.len() + unplaced.len(),
            days,
            tasks: positioned,
            unplaced,
            months,
            day_width,
        }
    }

    /// Nothing placeable: the grid shows the empty state.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Total grid width in pixels.
    pub fn total_width(&self) -> f32 {
        self.days.len() as f32 * self.day_width
    }

    /// Position of the "today" marker, evaluated against the caller's clock.
    pub fn today_offset(&self, today: NaiveDate) -> Option<f32> {
        today_offset(&self.days, today, self.day_width)
    }
}

fn top_level(tasks: &[Task]) -> impl Iterator<Item = &Task> {
    tasks.iter().filter(|t| !t.is_subtask())
}

/// Padded bounding range of all top-level task dates, or the fixed fallback
/// range when no task has usable dates.
pub fn compute_range(tasks: &[Task], settings: &TimelineSettings) -> DateRange {
    let mut bounds: Option<(NaiveDate, NaiveDate)> = None;
    for (start, end) in top_level(tasks).filter_map(|t| t.days().ok()) {
        let lo = start.min(end);
        let hi = start.max(end);
        bounds = Some(match bounds {
            Some((min, max)) => (min.min(lo), max.max(hi)),
            None => (lo, hi),
        });
    }

    match bounds {
        Some((min, max)) => {
            let pad = Days::new(u64::from(settings.padding_days));
            DateRange {
                min: min.checked_sub_days(pad).unwrap_or(NaiveDate::MIN),
                max: max.checked_add_days(pad).unwrap_or(NaiveDate::MAX),
            }
        }
        None => fallback_range(settings),
    }
}

fn fallback_range(settings: &TimelineSettings) -> DateRange {
    let min = settings.fallback_anchor;
    let max = min
        .checked_add_months(Months::new(settings.fallback_months))
        .unwrap_or(min);
    DateRange { min, max }
}

/// One cell per calendar day from `range.min` to `range.max` inclusive.
pub fn build_day_cells(range: &DateRange) -> Vec<DayCell> {
    let mut cells: Vec<DayCell> = Vec::with_capacity(range.num_days() as usize);
    for date in range.min.iter_days().take_while(|d| *d <= range.max) {
        let month_label = date.format("%B %Y").to_string();
        let is_month_start = cells
            .last()
            .map_or(true, |prev| prev.month_label != month_label);
        cells.push(DayCell {
            date,
            day_label: date.format("%a %-d").to_string(),
            month_label,
            is_month_start,
        });
    }
    cells
}

/// Place every top-level task, in input order, one row each.
///
/// Bars never start left of the grid and are at least one day wide, even
/// when `end` precedes `start`.
pub fn layout_tasks(
    tasks: &[Task],
    min: NaiveDate,
    day_width: f32,
    today: NaiveDate,
) -> (Vec<PositionedTask>, Vec<UnplacedTask>) {
    let day_width = day_width.max(0.0);
    let mut positioned = Vec::new();
    let mut unplaced = Vec::new();

    for (row_index, task) in top_level(tasks).enumerate() {
        let (start, end) = match task.days() {
            Ok(days) => days,
            Err(error) => {
                unplaced.push(UnplacedTask {
                    id: task.id,
                    title: task.title.clone(),
                    row_index,
                    error,
                });
                continue;
            }
        };

        let days_from_start = (start - min).num_days();
        let duration = ((end - start).num_days() + 1).max(1);
        let deadline = Deadline::evaluate(end, task.is_completed, today);

        positioned.push(PositionedTask {
            task: task.clone(),
            row_index,
            start,
            end,
            left_offset: days_from_start.max(0) as f32 * day_width,
            bar_width: (duration as f32 * day_width).max(day_width),
            days_remaining: deadline.days_remaining,
            is_overdue: deadline.is_overdue,
            treatment: BarTreatment::resolve(task.is_completed, deadline.is_overdue, task.color),
        });
    }

    (positioned, unplaced)
}

/// Offset of the cell matching `today`, or `None` when today is outside the
/// grid. Never clamped to an edge.
pub fn today_offset(days: &[DayCell], today: NaiveDate, day_width: f32) -> Option<f32> {
    days.iter()
        .position(|cell| cell.date == today)
        .map(|idx| idx as f32 * day_width)
}

/// Month header spans over consecutive cells sharing a month label.
pub fn month_bands(days: &[DayCell], day_width: f32) -> Vec<MonthBand> {
    let mut bands: Vec<MonthBand> = Vec::new();
    for (idx, cell) in days.iter().enumerate() {
        match bands.last_mut() {
            Some(band) if !cell.is_month_start && band.label == cell.month_label => {
                band.width += day_width;
            }
            _ => bands.push(MonthBand {
                label: cell.month_label.clone(),
                left_offset: idx as f32 * day_width,
                width: day_width,
            }),
        }
    }
    bands
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn task(title: &str, start: &str, end: &str) -> Task {
        let mut t = Task::new(Uuid::nil(), title, day(2026, 1, 1), day(2026, 1, 1));
        t.start_date = start.to_string();
        t.end_date = end.to_string();
        t
    }

    fn settings() -> TimelineSettings {
        TimelineSettings::default()
    }

    #[test]
    fn range_is_padded_two_weeks_each_side() {
        let tasks = vec![
            task("a", "2026-02-10", "2026-02-20"),
            task("b", "2026-02-01", "2026-03-05"),
        ];
        let range = compute_range(&tasks, &settings());
        assert_eq!(range.min, day(2026, 1, 18));
        assert_eq!(range.max, day(2026, 3, 19));
    }

    #[test]
    fn range_truncates_timestamps_and_ignores_subtasks() {
        let parent = task("a", "2026-02-10T18:45:00Z", "2026-02-12T06:00:00Z");
        let mut sub = task("sub", "2025-01-01", "2027-01-01");
        sub.parent_id = Some(parent.id);
        let range = compute_range(&[parent, sub], &settings());
        assert_eq!(range.min, day(2026, 1, 27));
        assert_eq!(range.max, day(2026, 2, 26));
    }

    #[test]
    fn empty_range_is_fixed_and_deterministic() {
        let first = compute_range(&[], &settings());
        let second = compute_range(&[], &settings());
        assert_eq!(first, second);
        assert_eq!(first.min, day(2026, 1, 1));
        assert_eq!(first.max, day(2026, 4, 1));
    }

    #[test]
    fn empty_layout_has_no_cells_and_no_marker() {
        let layout = TimelineLayout::compute(&[], &settings(), day(2026, 1, 15));
        assert!(layout.is_empty());
        assert!(layout.days.is_empty());
        assert!(layout.months.is_empty());
        assert_eq!(layout.range, compute_range(&[], &settings()));
        assert_eq!(layout.today_offset(day(2026, 1, 15)), None);
        assert_eq!(layout.total_width(), 0.0);
    }

    #[test]
    fn day_cells_are_contiguous() {
        let range = DateRange {
            min: day(2026, 1, 25),
            max: day(2026, 3, 3),
        };
        let cells = build_day_cells(&range);
        assert_eq!(cells.len() as i64, range.num_days());
        assert_eq!(cells.first().unwrap().date, range.min);
        assert_eq!(cells.last().unwrap().date, range.max);
        for pair in cells.windows(2) {
            assert_eq!(pair[1].date - pair[0].date, chrono::Duration::days(1));
        }
    }

    #[test]
    fn day_cell_labels_and_month_starts() {
        let cells = build_day_cells(&DateRange {
            min: day(2026, 1, 30),
            max: day(2026, 2, 2),
        });
        let starts: Vec<bool> = cells.iter().map(|c| c.is_month_start).collect();
        assert_eq!(starts, vec![true, false, true, false]);
        assert_eq!(cells[0].day_label, "Fri 30");
        assert_eq!(cells[0].month_label, "January 2026");
        assert_eq!(cells[2].day_label, "Sun 1");
        assert_eq!(cells[2].month_label, "February 2026");
    }

    #[test]
    fn inverted_range_has_no_cells() {
        let range = DateRange {
            min: day(2026, 2, 1),
            max: day(2026, 1, 1),
        };
        assert_eq!(range.num_days(), 0);
        assert!(build_day_cells(&range).is_empty());
    }

    #[test]
    fn rows_follow_input_order() {
        let a = task("A", "2026-03-01", "2026-03-10");
        let b = task("B", "2026-01-01", "2026-01-02");
        let c = task("C", "2026-02-01", "2026-02-01");

        let all = TimelineLayout::compute(&[a.clone(), b, c.clone()], &settings(), day(2026, 1, 1));
        let rows: Vec<(&str, usize)> = all
            .tasks
            .iter()
            .map(|p| (p.task.title.as_str(), p.row_index))
            .collect();
        assert_eq!(rows, vec![("A", 0), ("B", 1), ("C", 2)]);

        let without_b = TimelineLayout::compute(&[a, c], &settings(), day(2026, 1, 1));
        let rows: Vec<usize> = without_b.tasks.iter().map(|p| p.row_index).collect();
        assert_eq!(rows, vec![0, 1]);
        assert_eq!(without_b.tasks[1].task.title, "C");
    }

    #[test]
    fn subtasks_never_take_a_row() {
        let a = task("A", "2026-03-01", "2026-03-10");
        let mut sub = task("sub", "2026-03-02", "2026-03-03");
        sub.parent_id = Some(a.id);
        let b = task("B", "2026-03-05", "2026-03-06");

        let layout = TimelineLayout::compute(&[sub.clone(), a, sub, b], &settings(), day(2026, 1, 1));
        assert_eq!(layout.row_count, 2);
        assert!(layout.tasks.iter().all(|p| p.task.parent_id.is_none()));
        let rows: Vec<(&str, usize)> = layout
            .tasks
            .iter()
            .map(|p| (p.task.title.as_str(), p.row_index))
            .collect();
        assert_eq!(rows, vec![("A", 0), ("B", 1)]);
    }

    #[test]
    fn bar_geometry() {
        let tasks = vec![task("A", "2026-02-15", "2026-02-17")];
        let layout = TimelineLayout::compute(&tasks, &settings(), day(2026, 1, 1));
        let bar = &layout.tasks[0];
        assert_eq!(layout.range.min, day(2026, 2, 1));
        assert_eq!(bar.left_offset, 14.0 * 40.0);
        assert_eq!(bar.bar_width, 3.0 * 40.0);
        assert_eq!(layout.total_width(), layout.days.len() as f32 * 40.0);
    }

    #[test]
    fn single_day_task_is_one_day_wide() {
        let (placed, _) = layout_tasks(
            &[task("A", "2026-02-15", "2026-02-15")],
            day(2026, 2, 1),
            40.0,
            day(2026, 1, 1),
        );
        assert_eq!(placed[0].bar_width, 40.0);
    }

    #[test]
    fn inverted_task_is_one_day_wide_and_widens_range() {
        let tasks = vec![task("A", "2026-02-15", "2026-02-10")];
        let layout = TimelineLayout::compute(&tasks, &settings(), day(2026, 1, 1));
        assert_eq!(layout.range.min, day(2026, 1, 27));
        assert_eq!(layout.range.max, day(2026, 3, 1));
        assert_eq!(layout.tasks[0].bar_width, 40.0);
        assert!(layout.tasks[0].left_offset >= 0.0);
    }

    #[test]
    fn task_before_grid_is_clamped_to_left_edge() {
        let (placed, _) = layout_tasks(
            &[task("A", "2026-01-01", "2026-01-10")],
            day(2026, 1, 5),
            40.0,
            day(2026, 1, 1),
        );
        assert_eq!(placed[0].left_offset, 0.0);
        assert_eq!(placed[0].bar_width, 400.0);
    }

    #[test]
    fn unparseable_dates_keep_their_row() {
        let a = task("A", "2026-03-01", "2026-03-10");
        let broken = task("broken", "soon", "2026-03-10");
        let missing = task("missing", "2026-03-01", "");
        let c = task("C", "2026-03-05", "2026-03-06");

        let layout = TimelineLayout::compute(&[a, broken, missing, c], &settings(), day(2026, 1, 1));
        assert_eq!(layout.row_count, 4);
        let placed: Vec<usize> = layout.tasks.iter().map(|p| p.row_index).collect();
        assert_eq!(placed, vec![0, 3]);
        let unplaced: Vec<(usize, DateError)> = layout
            .unplaced
            .iter()
            .map(|u| (u.row_index, u.error.clone()))
            .collect();
        assert_eq!(
            unplaced,
            vec![
                (1, DateError::Unparseable("soon".into())),
                (2, DateError::Missing),
            ]
        );
        assert_eq!(layout.range.min, day(2026, 2, 15));
    }

    #[test]
    fn only_unparseable_tasks_fall_back_to_empty_state() {
        let layout = TimelineLayout::compute(&[task("x", "", "")], &settings(), day(2026, 1, 1));
        assert!(layout.is_empty());
        assert!(layout.days.is_empty());
        assert_eq!(layout.unplaced.len(), 1);
        assert_eq!(layout.range.min, day(2026, 1, 1));
    }

    #[test]
    fn today_marker_offset() {
        let cells = build_day_cells(&DateRange {
            min: day(2026, 1, 1),
            max: day(2026, 3, 1),
        });
        assert_eq!(today_offset(&cells, day(2026, 1, 15), 40.0), Some(560.0));
        assert_eq!(today_offset(&cells, day(2026, 1, 1), 40.0), Some(0.0));
        assert_eq!(today_offset(&cells, day(2025, 12, 1), 40.0), None);
        assert_eq!(today_offset(&cells, day(2026, 3, 2), 40.0), None);
    }

    #[test]
    fn overdue_and_completed_classification() {
        let today = day(2026, 2, 10);
        let late = task("late", "2026-02-01", "2026-02-09");
        let mut done = task("done", "2026-02-01", "2026-02-09");
        done.is_completed = true;
        done.color = Some(Color32::from_rgb(1, 2, 3));
        let mut tinted = task("tinted", "2026-02-01", "2026-02-20");
        tinted.color = Some(Color32::from_rgb(1, 2, 3));

        let layout = TimelineLayout::compute(&[late, done, tinted], &settings(), today);
        let late = &layout.tasks[0];
        assert!(late.is_overdue);
        assert_eq!(late.days_remaining, -1);
        assert_eq!(late.treatment, BarTreatment::Overdue);

        let done = &layout.tasks[1];
        assert!(!done.is_overdue);
        assert_eq!(done.treatment, BarTreatment::Completed);

        let tinted = &layout.tasks[2];
        assert_eq!(tinted.days_remaining, 10);
        assert_eq!(tinted.treatment, BarTreatment::Custom(Color32::from_rgb(1, 2, 3)));
    }

    #[test]
    fn month_bands_cover_the_grid() {
        let cells = build_day_cells(&DateRange {
            min: day(2026, 1, 30),
            max: day(2026, 3, 2),
        });
        let bands = month_bands(&cells, 10.0);
        let labels: Vec<&str> = bands.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, vec!["January 2026", "February 2026", "March 2026"]);
        assert_eq!(bands[0].left_offset, 0.0);
        assert_eq!(bands[0].width, 20.0);
        assert_eq!(bands[1].left_offset, 20.0);
        assert_eq!(bands[1].width, 280.0);
        assert_eq!(bands[2].width, 20.0);
        let total: f32 = bands.iter().map(|b| b.width).sum();
        assert_eq!(total, cells.len() as f32 * 10.0);
    }

    #[test]
    fn layout_is_idempotent() {
        let tasks = vec![
            task("A", "2026-03-01", "2026-03-10"),
            task("B", "bad", "2026-03-10"),
            task("C", "2026-01-20", "2026-04-02"),
        ];
        let today = day(2026, 3, 4);
        let first = TimelineLayout::compute(&tasks, &settings(), today);
        let second = TimelineLayout::compute(&tasks, &settings(), today);
        assert_eq!(first, second);
        assert_eq!(first.today_offset(today), second.today_offset(today));
    }

    #[test]
    fn zoom_is_clamped() {
        let mut s = settings();
        for _ in 0..50 {
            s.zoom_in();
        }
        assert_eq!(s.day_width, MAX_DAY_WIDTH);
        for _ in 0..50 {
            s.zoom_out();
        }
        assert_eq!(s.day_width, MIN_DAY_WIDTH);

        s.day_width = f32::NAN;
        assert_eq!(s.effective_day_width(), 40.0);
        s.day_width = 1000.0;
        assert_eq!(s.effective_day_width(), MAX_DAY_WIDTH);
    }
}
