//! Module dashboard core: task and module records, the roadmap timeline
//! layout engine, a local task store with change notifications, and file
//! interchange.

pub mod config;
pub mod error;
pub mod io;
pub mod model;
pub mod store;

pub use error::{IoError, StoreError};
pub use model::{Module, Project, Task, TimelineLayout, TimelineSettings};
pub use store::{StoreEvent, TaskStore};
