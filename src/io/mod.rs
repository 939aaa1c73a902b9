pub mod csv_export;
pub mod csv_import;
pub mod file;

pub use file::{load_project, save_project};
