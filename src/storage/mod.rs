use crate::config::{Config, StoreKind};
use crate::models::User;
use async_trait::async_trait;
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::info;

mod file;
mod memory;
mod sqlite;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use sqlite::{SqliteStore, decode_history, encode_history};

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StoreError {
    #[error("user not found")]
    NotFound,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Self::NotFound,
            other => Self::Database(other.to_string()),
        }
    }
}

/// The ledger of record. Users are never created or removed through it.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn get(&self, name: &str) -> Result<User, StoreError>;

    async fn list(&self) -> Result<BTreeMap<String, User>, StoreError>;

    /// Replace the stored row for `user.name`. Fails with `NotFound`
    /// instead of inserting.
    async fn update(&self, user: &User) -> Result<(), StoreError>;
}

pub fn seed_users(names: &[String]) -> BTreeMap<String, User> {
    names
        .iter()
        .map(|name| (name.clone(), User::new(name.clone())))
        .collect()
}

pub async fn open_store(config: &Config) -> Result<Box<dyn UserStore>, StoreError> {
    let store: Box<dyn UserStore> = match &config.store {
        StoreKind::Memory => {
            info!(seed = config.seed_users.len(), "using in-memory store");
            Box::new(MemoryStore::seeded(&config.seed_users))
        }
        StoreKind::File(path) => {
            info!(path = %path.display(), "using json file store");
            Box::new(FileStore::open(path.clone(), &config.seed_users).await?)
        }
        StoreKind::Sqlite(url) => {
            info!("using sqlite store");
            let store = SqliteStore::connect(url).await?;
            store.migrate(&config.seed_users).await?;
            Box::new(store)
        }
    };
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[tokio::test]
    async fn open_store_honors_configured_backend() {
        let today = NaiveDate::from_ymd_opt(2024, 10, 1).unwrap();
        let config = Config::from_lookup(
            |key| match key {
                "STORE" => Some("memory".to_string()),
                "SEED_USERS" => Some("Cadey,Mara".to_string()),
                _ => None,
            },
            today,
        )
        .unwrap();

        let store = open_store(&config).await.unwrap();
        let users = store.list().await.unwrap();
        assert_eq!(users.len(), 2);
        assert!(users.contains_key("Mara"));
    }
}
