use super::{StoreError, UserStore, seed_users};
use crate::models::User;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Mutex;

/// Process-local ledger, seeded at start and lost on exit.
#[derive(Default)]
pub struct MemoryStore {
    users: Mutex<BTreeMap<String, User>>,
}

impl MemoryStore {
    pub fn seeded(names: &[String]) -> Self {
        Self {
            users: Mutex::new(seed_users(names)),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, BTreeMap<String, User>>, StoreError> {
        self.users
            .lock()
            .map_err(|err| StoreError::Database(err.to_string()))
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn get(&self, name: &str) -> Result<User, StoreError> {
        self.lock()?.get(name).cloned().ok_or(StoreError::NotFound)
    }

    async fn list(&self) -> Result<BTreeMap<String, User>, StoreError> {
        Ok(self.lock()?.clone())
    }

    async fn update(&self, user: &User) -> Result<(), StoreError> {
        let mut users = self.lock()?;
        let slot = users.get_mut(&user.name).ok_or(StoreError::NotFound)?;
        *slot = user.clone();
        Ok(())
    }
}
