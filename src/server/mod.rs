mod handlers;
pub mod models;
mod state;

pub use handlers::{build_app, run_server};
