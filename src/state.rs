use crate::clock::Clock;
use crate::ledger::Ledger;
use std::{path::PathBuf, sync::Arc};
use tokio::sync::Mutex;

/// Shared handler state. The ledger mutex serializes every read-render and
/// log-persist-render path.
#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<Mutex<Ledger>>,
    pub clock: Arc<dyn Clock>,
    pub static_dir: PathBuf,
}

impl AppState {
    pub fn new(ledger: Ledger, clock: Arc<dyn Clock>, static_dir: PathBuf) -> Self {
        Self {
            ledger: Arc::new(Mutex::new(ledger)),
            clock,
            static_dir,
        }
    }
}
