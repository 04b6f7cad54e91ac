//! Runtime configuration read from the environment (and `.env`, if present).

use crate::progress::{DEFAULT_GOAL_MILES, ProgressSettings, TargetWindow};
use chrono::{Datelike, NaiveDate};
use std::{env, path::PathBuf};

#[derive(Debug, Clone, PartialEq)]
pub enum StoreKind {
    Memory,
    File(PathBuf),
    Sqlite(String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub store: StoreKind,
    pub static_dir: PathBuf,
    pub seed_users: Vec<String>,
    pub progress: ProgressSettings,
}

impl Config {
    pub fn from_env(today: NaiveDate) -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok(), today)
    }

    /// Build a config from an arbitrary variable source. `today` picks the
    /// year of the default October window.
    pub fn from_lookup<F>(lookup: F, today: NaiveDate) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let port = var("PORT")
            .and_then(|value| value.trim().parse::<u16>().ok())
            .unwrap_or(8080);

        let database_url = var("DATABASE_URL");
        let data_path = var("APP_DATA_PATH").unwrap_or_else(|| "data/state.json".to_string());
        let store = match var("STORE").as_deref().map(str::trim) {
            Some("memory") => StoreKind::Memory,
            Some("file") => StoreKind::File(PathBuf::from(data_path)),
            Some("sqlite") => {
                StoreKind::Sqlite(database_url.ok_or(ConfigError::Missing("DATABASE_URL"))?)
            }
            Some(other) => return Err(ConfigError::Invalid("STORE", other.to_string())),
            None => match database_url {
                Some(url) => StoreKind::Sqlite(url),
                None => StoreKind::File(PathBuf::from(data_path)),
            },
        };

        let seed_users = var("SEED_USERS")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .map(str::to_owned)
                    .collect()
            })
            .unwrap_or_else(|| vec!["Cadey".to_string()]);

        let goal_miles = match var("GOAL_MILES") {
            Some(raw) => raw
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|goal| goal.is_finite() && *goal > 0.0)
                .ok_or(ConfigError::Invalid("GOAL_MILES", raw))?,
            None => DEFAULT_GOAL_MILES,
        };

        let window = match (var("TARGET_START"), var("TARGET_END")) {
            (None, None) => TargetWindow::october(today.year())
                .ok_or(ConfigError::Invalid("TARGET_START", today.year().to_string()))?,
            (Some(start), Some(end)) => {
                let start_date = parse_date("TARGET_START", &start)?;
                let end_date = parse_date("TARGET_END", &end)?;
                TargetWindow::new(start_date, end_date)
                    .ok_or(ConfigError::Invalid("TARGET_END", end))?
            }
            (Some(_), None) => return Err(ConfigError::Missing("TARGET_END")),
            (None, Some(_)) => return Err(ConfigError::Missing("TARGET_START")),
        };

        Ok(Self {
            port,
            store,
            static_dir: PathBuf::from(var("STATIC_DIR").unwrap_or_else(|| "static".to_string())),
            seed_users,
            progress: ProgressSettings { goal_miles, window },
        })
    }
}

fn parse_date(key: &'static str, raw: &str) -> Result<NaiveDate, ConfigError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| ConfigError::Invalid(key, raw.to_string()))
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("invalid value for {0}: {1:?}")]
    Invalid(&'static str, String),
}
