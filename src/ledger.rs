//! Per-user mileage ledger and the distance logging operation.

use crate::models::{Activity, LogForm, User};
use crate::progress::ProgressSettings;
use crate::storage::{StoreError, UserStore};
use crate::units::Unit;
use chrono::{NaiveDate, NaiveDateTime};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum LogError {
    #[error("missing fields")]
    MissingFields,

    #[error("invalid distance")]
    InvalidDistance,

    #[error("invalid unit")]
    InvalidUnit,

    #[error("user not found")]
    UserNotFound,

    #[error("invalid activity")]
    InvalidActivity,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// A distance entry that passed validation, normalized to miles.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceEntry {
    pub name: String,
    pub miles: f64,
    pub activity: Activity,
}

pub struct Ledger {
    store: Box<dyn UserStore>,
    settings: ProgressSettings,
}

impl Ledger {
    pub fn new(store: Box<dyn UserStore>, settings: ProgressSettings) -> Self {
        Self { store, settings }
    }

    pub fn settings(&self) -> &ProgressSettings {
        &self.settings
    }

    pub async fn lookup(&self, name: &str, today: NaiveDate) -> Result<User, StoreError> {
        let mut user = self.store.get(name).await?;
        self.settings.refresh(&mut user, today);
        Ok(user)
    }

    /// Every user, ordered by name, with derived fields recomputed for `today`.
    pub async fn snapshot(&self, today: NaiveDate) -> Result<Vec<User>, StoreError> {
        let users = self.store.list().await?;
        Ok(users
            .into_values()
            .map(|mut user| {
                self.settings.refresh(&mut user, today);
                user
            })
            .collect())
    }

    /// Validate `form`, apply it to the named user and persist the result.
    /// Nothing is written unless every check passes.
    pub async fn log_distance(
        &self,
        form: &LogForm,
        now: NaiveDateTime,
    ) -> Result<User, LogError> {
        let (name, distance, unit) = match (
            present(&form.name),
            present(&form.distance),
            present(&form.unit),
        ) {
            (Some(name), Some(distance), Some(unit)) => (name, distance, unit),
            _ => {
                warn!(?form, "log request missing fields");
                return Err(LogError::MissingFields);
            }
        };

        let distance = parse_distance(distance).ok_or_else(|| {
            warn!(distance, "invalid distance value");
            LogError::InvalidDistance
        })?;
        let unit = Unit::parse(unit).ok_or_else(|| {
            warn!(unit, "invalid unit");
            LogError::InvalidUnit
        })?;

        let mut user = match self.store.get(name).await {
            Ok(user) => user,
            Err(StoreError::NotFound) => {
                warn!(user = name, "user not found");
                return Err(LogError::UserNotFound);
            }
            Err(err) => return Err(err.into()),
        };

        let activity = form
            .activity
            .as_deref()
            .and_then(Activity::parse)
            .ok_or_else(|| {
                warn!(activity = ?form.activity, "invalid activity type");
                LogError::InvalidActivity
            })?;

        let entry = DistanceEntry {
            name: user.name.clone(),
            miles: unit.to_miles(distance),
            activity,
        };
        if !totals_stay_finite(&user, &entry) {
            warn!(user = name, miles = entry.miles, "distance overflows running totals");
            return Err(LogError::InvalidDistance);
        }
        apply_entry(&mut user, &entry, now);
        self.settings.refresh(&mut user, now.date());

        self.store.update(&user).await?;
        info!(
            user = %entry.name,
            activity = %entry.activity,
            miles = entry.miles,
            total = user.miles,
            "logged distance"
        );
        Ok(user)
    }
}

pub fn apply_entry(user: &mut User, entry: &DistanceEntry, now: NaiveDateTime) {
    match entry.activity {
        Activity::Walk => {
            user.walk_miles += entry.miles;
            user.walks = user.walks.saturating_add(1);
        }
        Activity::Run => {
            user.run_miles += entry.miles;
            user.runs = user.runs.saturating_add(1);
        }
    }
    user.miles += entry.miles;
    user.activity_log.push(format_entry(entry, now));
}

pub fn format_entry(entry: &DistanceEntry, now: NaiveDateTime) -> String {
    format!(
        "{}: {:.2} miles ({})",
        now.format("%Y-%m-%d %H:%M:%S"),
        entry.miles,
        entry.activity
    )
}

fn totals_stay_finite(user: &User, entry: &DistanceEntry) -> bool {
    let activity_total = match entry.activity {
        Activity::Walk => user.walk_miles,
        Activity::Run => user.run_miles,
    };
    (user.miles + entry.miles).is_finite() && (activity_total + entry.miles).is_finite()
}

fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|value| !value.is_empty())
}

fn parse_distance(raw: &str) -> Option<f64> {
    raw.parse::<f64>()
        .ok()
        .filter(|value| value.is_finite() && *value >= 0.0)
        .map(f64::abs)
}
