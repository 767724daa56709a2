// Library surface for the binary, headless/integration tests and reuse.
pub mod app;
pub mod app_dirs;
pub mod attempt;
pub mod config;
pub mod countdown;
pub mod error;
pub mod export;
pub mod history;
pub mod logging;
pub mod question;
pub mod quiz;
pub mod result;
pub mod runtime;
pub mod store;
pub mod time_series;
pub mod ui;
pub mod util;

pub use app::{App, AppState, Control};
