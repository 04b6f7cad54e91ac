use super::{StoreError, UserStore};
use crate::models::{StoredData, User};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{error, info};

/// Ledger kept as a pretty-printed JSON document on disk.
pub struct FileStore {
    path: PathBuf,
    users: Mutex<BTreeMap<String, User>>,
}

impl FileStore {
    /// Load `path`, adding any seed user missing from it, and write the
    /// result back so the file always exists after startup.
    pub async fn open(path: PathBuf, seed: &[String]) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        let mut users = load_data(&path).await;
        let mut seeded = 0usize;
        for name in seed {
            if !users.contains_key(name) {
                users.insert(name.clone(), User::new(name.clone()));
                seeded += 1;
            }
        }
        if seeded > 0 {
            info!(seeded, path = %path.display(), "seeded users");
        }
        persist_data(&path, &users).await?;

        Ok(Self {
            path,
            users: Mutex::new(users),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl UserStore for FileStore {
    async fn get(&self, name: &str) -> Result<User, StoreError> {
        let users = self.users.lock().await;
        users.get(name).cloned().ok_or(StoreError::NotFound)
    }

    async fn list(&self) -> Result<BTreeMap<String, User>, StoreError> {
        Ok(self.users.lock().await.clone())
    }

    async fn update(&self, user: &User) -> Result<(), StoreError> {
        let mut users = self.users.lock().await;
        if !users.contains_key(&user.name) {
            return Err(StoreError::NotFound);
        }

        let mut next = users.clone();
        next.insert(user.name.clone(), user.clone());
        persist_data(&self.path, &next).await?;
        *users = next;
        Ok(())
    }
}

async fn load_data(path: &Path) -> BTreeMap<String, User> {
    match fs::read(path).await {
        Ok(bytes) => match serde_json::from_slice::<StoredData>(&bytes) {
            Ok(data) => data
                .users
                .into_iter()
                .map(|user| (user.name.clone(), user))
                .collect(),
            Err(err) => {
                error!("failed to parse data file: {err}");
                BTreeMap::new()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
        Err(err) => {
            error!("failed to read data file: {err}");
            BTreeMap::new()
        }
    }
}

async fn persist_data(path: &Path, users: &BTreeMap<String, User>) -> Result<(), StoreError> {
    let data = StoredData {
        users: users.values().cloned().collect(),
    };
    let payload =
        serde_json::to_vec_pretty(&data).map_err(|err| StoreError::Serialization(err.to_string()))?;
    fs::write(path, payload).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unique_data_path(tag: &str) -> PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let mut path = std::env::temp_dir();
        path.push(format!("mileage_{tag}_{}_{}.json", std::process::id(), nanos));
        path
    }

    #[tokio::test]
    async fn open_seeds_and_writes_file() {
        let path = unique_data_path("seed");
        let store = FileStore::open(path.clone(), &["Cadey".to_string()])
            .await
            .unwrap();
        assert!(store.path().exists());
        assert_eq!(store.get("Cadey").await.unwrap().miles, 0.0);
        let _ = std::fs::remove_file(path);
    }

    #[tokio::test]
    async fn updates_survive_reopen() {
        let path = unique_data_path("reopen");
        let seed = vec!["Cadey".to_string()];
        let store = FileStore::open(path.clone(), &seed).await.unwrap();

        let mut cadey = store.get("Cadey").await.unwrap();
        cadey.miles = 5.0;
        cadey.walk_miles = 5.0;
        cadey.walks = 1;
        cadey.activity_log.push("2024-10-02 08:00:00: 5.00 miles (walk)".into());
        store.update(&cadey).await.unwrap();
        drop(store);

        let reopened = FileStore::open(path.clone(), &seed).await.unwrap();
        let cadey = reopened.get("Cadey").await.unwrap();
        assert_eq!(cadey.miles, 5.0);
        assert_eq!(cadey.walks, 1);
        assert_eq!(cadey.activity_log.len(), 1);
        let _ = std::fs::remove_file(path);
    }

    #[tokio::test]
    async fn corrupt_file_falls_back_to_seed() {
        let path = unique_data_path("corrupt");
        std::fs::write(&path, b"{not json").unwrap();
        let store = FileStore::open(path.clone(), &["Cadey".to_string()])
            .await
            .unwrap();
        assert_eq!(store.list().await.unwrap().len(), 1);
        let _ = std::fs::remove_file(path);
    }

    #[tokio::test]
    async fn failed_write_leaves_memory_untouched() {
        let path = unique_data_path("readonly");
        let store = FileStore::open(path.clone(), &["Cadey".to_string()])
            .await
            .unwrap();
        std::fs::remove_file(&path).unwrap();
        std::fs::create_dir(&path).unwrap();

        let mut cadey = store.get("Cadey").await.unwrap();
        cadey.miles = 9.0;
        cadey.run_miles = 9.0;
        assert!(store.update(&cadey).await.is_err());
        assert_eq!(store.get("Cadey").await.unwrap().miles, 0.0);
        let _ = std::fs::remove_dir(path);
    }
}
