pub mod app;
pub mod clock;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod ledger;
pub mod models;
pub mod progress;
pub mod state;
pub mod storage;
pub mod ui;
pub mod units;

pub use app::router;
pub use config::Config;
pub use ledger::Ledger;
pub use state::AppState;
pub use storage::{UserStore, open_store};
