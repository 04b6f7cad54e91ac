use super::{StoreError, UserStore};
use crate::models::User;
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};
use std::collections::BTreeMap;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

pub const HISTORY_DELIMITER: char = ',';

const SELECT_USERS: &str = r"
    SELECT
        name,
        miles,
        runs,
        walks,
        walk_miles,
        run_miles,
        walk_pct,
        run_pct,
        daily_avg_required,
        activity_log
    FROM users
";

/// Ledger backed by a `users` table.
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .acquire_timeout(Duration::from_secs(5))
            .connect_with(options)
            .await?;
        Ok(Self { pool })
    }

    /// Create the `users` table if needed and insert any missing seed users.
    pub async fn migrate(&self, seed: &[String]) -> Result<(), StoreError> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL UNIQUE,
                miles REAL NOT NULL DEFAULT 0,
                runs INTEGER NOT NULL DEFAULT 0 CHECK (runs >= 0),
                walks INTEGER NOT NULL DEFAULT 0 CHECK (walks >= 0),
                walk_miles REAL NOT NULL DEFAULT 0,
                run_miles REAL NOT NULL DEFAULT 0,
                walk_pct REAL NOT NULL DEFAULT 0,
                run_pct REAL NOT NULL DEFAULT 0,
                daily_avg_required REAL NOT NULL DEFAULT 0,
                activity_log TEXT NOT NULL DEFAULT ''
            );
            ",
        )
        .execute(&self.pool)
        .await?;

        let mut tx = self.pool.begin().await?;
        let mut seeded = 0u64;
        for name in seed {
            seeded += sqlx::query("INSERT OR IGNORE INTO users (name) VALUES (?1)")
                .bind(name)
                .execute(&mut *tx)
                .await?
                .rows_affected();
        }
        tx.commit().await?;

        if seeded > 0 {
            info!(seeded, "seeded users");
        }
        Ok(())
    }
}

#[async_trait]
impl UserStore for SqliteStore {
    async fn get(&self, name: &str) -> Result<User, StoreError> {
        let sql = format!("{SELECT_USERS} WHERE name = ?1");
        let row = sqlx::query(&sql)
            .bind(name)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound)?;
        user_from_row(&row)
    }

    async fn list(&self) -> Result<BTreeMap<String, User>, StoreError> {
        let rows = sqlx::query(SELECT_USERS).fetch_all(&self.pool).await?;
        rows.iter()
            .map(|row| user_from_row(row).map(|user| (user.name.clone(), user)))
            .collect()
    }

    async fn update(&self, user: &User) -> Result<(), StoreError> {
        let result = sqlx::query(
            r"
            UPDATE users SET
                miles = ?1,
                runs = ?2,
                walks = ?3,
                walk_miles = ?4,
                run_miles = ?5,
                walk_pct = ?6,
                run_pct = ?7,
                daily_avg_required = ?8,
                activity_log = ?9
            WHERE name = ?10
            ",
        )
        .bind(user.miles)
        .bind(i64::from(user.runs))
        .bind(i64::from(user.walks))
        .bind(user.walk_miles)
        .bind(user.run_miles)
        .bind(user.walk_pct)
        .bind(user.run_pct)
        .bind(user.daily_avg_required)
        .bind(encode_history(&user.activity_log))
        .bind(&user.name)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}

fn user_from_row(row: &SqliteRow) -> Result<User, StoreError> {
    let count = |column: &str| -> Result<u32, StoreError> {
        let raw: i64 = row.try_get(column)?;
        u32::try_from(raw).map_err(|err| StoreError::Serialization(format!("{column}: {err}")))
    };
    let history: String = row.try_get("activity_log")?;

    Ok(User {
        name: row.try_get("name")?,
        miles: row.try_get("miles")?,
        runs: count("runs")?,
        walks: count("walks")?,
        walk_miles: row.try_get("walk_miles")?,
        run_miles: row.try_get("run_miles")?,
        walk_pct: row.try_get("walk_pct")?,
        run_pct: row.try_get("run_pct")?,
        daily_avg_required: row.try_get("daily_avg_required")?,
        activity_log: decode_history(&history),
    })
}

pub fn encode_history(entries: &[String]) -> String {
    entries.join(&HISTORY_DELIMITER.to_string())
}

/// Split a stored history column. Empty segments are dropped, so an empty
/// column yields no entries.
pub fn decode_history(raw: &str) -> Vec<String> {
    raw.split(HISTORY_DELIMITER)
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_owned)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unique_db_url(tag: &str) -> (String, std::path::PathBuf) {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let mut path = std::env::temp_dir();
        path.push(format!("mileage_{tag}_{}_{}.db", std::process::id(), nanos));
        (format!("sqlite://{}", path.display()), path)
    }

    async fn seeded_store(tag: &str) -> (SqliteStore, std::path::PathBuf) {
        let (url, path) = unique_db_url(tag);
        let store = SqliteStore::connect(&url).await.unwrap();
        store
            .migrate(&["Cadey".to_string(), "Mara".to_string()])
            .await
            .unwrap();
        (store, path)
    }

    #[test]
    fn empty_history_decodes_to_no_entries() {
        assert!(decode_history("").is_empty());
        assert!(decode_history(",,").is_empty());
    }

    #[test]
    fn history_joins_and_splits_on_commas() {
        let entries = vec![
            "2024-10-01 07:00:00: 3.00 miles (walk)".to_string(),
            "2024-10-02 07:00:00: 6.21 miles (run)".to_string(),
        ];
        let encoded = encode_history(&entries);
        assert_eq!(encoded.matches(HISTORY_DELIMITER).count(), 1);
        assert_eq!(decode_history(&encoded), entries);
        assert_eq!(encode_history(&[]), "");
    }

    #[tokio::test]
    async fn migrate_seeds_each_user_once() {
        let (store, path) = seeded_store("seed").await;
        store.migrate(&["Cadey".to_string()]).await.unwrap();

        let users = store.list().await.unwrap();
        assert_eq!(users.len(), 2);
        assert!(users["Mara"].activity_log.is_empty());
        let _ = std::fs::remove_file(path);
    }

    #[tokio::test]
    async fn update_writes_full_row() {
        let (store, path) = seeded_store("update").await;

        let mut cadey = store.get("Cadey").await.unwrap();
        cadey.miles = 6.21371;
        cadey.run_miles = 6.21371;
        cadey.runs = 1;
        cadey.run_pct = 6.21371;
        cadey.activity_log.push("2024-10-01 07:00:00: 6.21 miles (run)".into());
        store.update(&cadey).await.unwrap();

        let stored = store.get("Cadey").await.unwrap();
        assert_eq!(stored, cadey);
        let _ = std::fs::remove_file(path);
    }

    #[tokio::test]
    async fn unknown_users_are_not_found() {
        let (store, path) = seeded_store("missing").await;
        assert!(matches!(store.get("Nobody").await, Err(StoreError::NotFound)));
        assert!(matches!(
            store.update(&User::new("Nobody")).await,
            Err(StoreError::NotFound)
        ));
        let _ = std::fs::remove_file(path);
    }
}
