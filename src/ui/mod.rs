pub mod dialogs;
pub mod module_sidebar;
pub mod roadmap_chart;
pub mod task_board;
pub mod task_drawer;
pub mod theme;
pub mod toolbar;
