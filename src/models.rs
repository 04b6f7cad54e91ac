use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct User {
    pub name: String,
    pub miles: f64,
    pub runs: u32,
    pub walks: u32,
    pub walk_miles: f64,
    pub run_miles: f64,
    #[serde(default)]
    pub walk_pct: f64,
    #[serde(default)]
    pub run_pct: f64,
    #[serde(default)]
    pub daily_avg_required: f64,
    #[serde(default)]
    pub activity_log: Vec<String>,
}

impl User {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activity {
    Walk,
    Run,
}

impl Activity {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "walk" => Some(Self::Walk),
            "run" => Some(Self::Run),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Walk => "walk",
            Self::Run => "run",
        }
    }
}

impl fmt::Display for Activity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw `POST /log` form; every field is validated by the ledger.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogForm {
    pub name: Option<String>,
    pub distance: Option<String>,
    pub unit: Option<String>,
    pub activity: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StoredData {
    pub users: Vec<User>,
}
