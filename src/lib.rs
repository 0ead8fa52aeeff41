pub mod app;
pub mod calendar;
pub mod duration;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod state;
pub mod stats;
pub mod storage;
pub mod ui;

pub use app::router;
pub use state::AppState;
pub use storage::{load_blocks, resolve_data_dir};
