pub mod module;
pub mod project;
pub mod task;
pub mod timeline;

pub use module::{Module, ModuleIcon, ModuleKind, ModuleProgress, ModuleStatus, TaskCounts};
pub use project::Project;
pub use task::{BarTreatment, DateError, Deadline, Task};
pub use timeline::{DayCell, MonthBand, PositionedTask, TimelineLayout, TimelineSettings};
