use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::{db::FilmStore, error::AppResult, models::UserFilms};

/// Process-local store used for tests and runs without Redis
#[derive(Clone, Default)]
pub struct MemoryFilmStore {
    records: Arc<RwLock<HashMap<String, UserFilms>>>,
}

impl MemoryFilmStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn key(email: &str) -> String {
    email.to_lowercase()
}

#[async_trait::async_trait]
impl FilmStore for MemoryFilmStore {
    async fn get(&self, email: &str) -> AppResult<Option<UserFilms>> {
        let records = self.records.read().await;
        Ok(records.get(&key(email)).cloned())
    }

    async fn put(&self, record: &UserFilms) -> AppResult<()> {
        let mut records = self.records.write().await;
        records.insert(key(&record.email), record.clone());
        Ok(())
    }

    async fn compare_and_put(
        &self,
        expected: Option<&UserFilms>,
        new: &UserFilms,
    ) -> AppResult<bool> {
        let mut records = self.records.write().await;
        let unchanged = records.get(&key(&new.email)) == expected;
        if unchanged {
            records.insert(key(&new.email), new.clone());
        }
        Ok(unchanged)
    }

    async fn delete(&self, email: &str) -> AppResult<()> {
        let mut records = self.records.write().await;
        records.remove(&key(email));
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
