use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use redis::Client;
use redis::Script;
use std::fmt::Display;

use crate::db::FilmStore;
use crate::error::AppError;
use crate::error::AppResult;
use crate::models::UserFilms;

/// Swaps the value at KEYS[1] to ARGV[2] only while it still equals ARGV[1].
/// An empty ARGV[1] means the key must not exist.
const COMPARE_AND_SET: &str = r"
local current = redis.call('GET', KEYS[1])
if (ARGV[1] == '' and not current) or current == ARGV[1] then
    redis.call('SET', KEYS[1], ARGV[2])
    return 1
end
return 0
";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StoreKey {
    UserFilms(String),
}

impl Display for StoreKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreKey::UserFilms(email) => write!(f, "user_films:{}", email.to_lowercase()),
        }
    }
}

/// Creates a Redis client for the film store
pub fn create_redis_client(redis_url: &str) -> anyhow::Result<Client> {
    let client = Client::open(redis_url)?;
    Ok(client)
}

/// Film store backed by Redis
///
/// Records are stored as JSON strings. Serialization of a `UserFilms` is
/// deterministic, so the conditional put compares the serialized form of the
/// expected record with what is stored, atomically inside a Lua script.
#[derive(Clone)]
pub struct RedisFilmStore {
    connection: ConnectionManager,
    compare_and_set: Script,
}

impl RedisFilmStore {
    /// Connects to Redis through a connection manager that reconnects on failure
    pub async fn connect(client: Client) -> AppResult<Self> {
        let connection = ConnectionManager::new(client).await?;
        tracing::info!("Connected to Redis film store");

        Ok(Self {
            connection,
            compare_and_set: Script::new(COMPARE_AND_SET),
        })
    }

    fn encode(record: &UserFilms) -> AppResult<String> {
        serde_json::to_string(record)
            .map_err(|e| AppError::Internal(format!("Store serialization error: {}", e)))
    }
}

#[async_trait::async_trait]
impl FilmStore for RedisFilmStore {
    async fn get(&self, email: &str) -> AppResult<Option<UserFilms>> {
        let mut conn = self.connection.clone();
        let stored: Option<String> = conn.get(StoreKey::UserFilms(email.to_string()).to_string()).await?;

        match stored {
            Some(json) => {
                let record = serde_json::from_str(&json).map_err(|e| {
                    AppError::Internal(format!("Store deserialization error: {}", e))
                })?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    async fn put(&self, record: &UserFilms) -> AppResult<()> {
        let json = Self::encode(record)?;
        let mut conn = self.connection.clone();
        let _: () = conn
            .set(StoreKey::UserFilms(record.email.clone()).to_string(), json)
            .await?;

        tracing::debug!(email = %record.email, "Stored user films");
        Ok(())
    }

    async fn compare_and_put(
        &self,
        expected: Option<&UserFilms>,
        new: &UserFilms,
    ) -> AppResult<bool> {
        let expected_json = match expected {
            Some(record) => Self::encode(record)?,
            None => String::new(),
        };
        let new_json = Self::encode(new)?;
        let mut conn = self.connection.clone();

        let mut invocation = self.compare_and_set.prepare_invoke();
        invocation
            .key(StoreKey::UserFilms(new.email.clone()).to_string())
            .arg(expected_json)
            .arg(new_json);
        let swapped: i32 = invocation.invoke_async(&mut conn).await?;

        if swapped != 1 {
            tracing::warn!(email = %new.email, "Conditional put lost to a concurrent write");
        }

        Ok(swapped == 1)
    }

    async fn delete(&self, email: &str) -> AppResult<()> {
        let mut conn = self.connection.clone();
        let _: () = conn.del(StoreKey::UserFilms(email.to_string()).to_string()).await?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "redis"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Reaction;

    #[test]
    fn test_store_key_display() {
        let key = StoreKey::UserFilms("ana@example.com".to_string());
        assert_eq!(format!("{}", key), "user_films:ana@example.com");
    }

    #[test]
    fn test_store_key_display_lowercase() {
        let key = StoreKey::UserFilms("Ana@Example.COM".to_string());
        assert_eq!(format!("{}", key), "user_films:ana@example.com");
    }

    #[test]
    fn test_encoding_is_stable_across_round_trip() {
        let mut record = UserFilms::new("ana@example.com");
        record.record(Reaction::Like, "Heat".to_string());

        let first = RedisFilmStore::encode(&record).unwrap();
        let decoded: UserFilms = serde_json::from_str(&first).unwrap();
        assert_eq!(RedisFilmStore::encode(&decoded).unwrap(), first);
    }

    async fn connect() -> RedisFilmStore {
        let redis_url =
            std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string());
        let client = create_redis_client(&redis_url).unwrap();
        RedisFilmStore::connect(client).await.unwrap()
    }

    #[tokio::test]
    #[ignore = "requires a running Redis"]
    async fn test_put_get_delete() {
        let store = connect().await;
        let mut record = UserFilms::new("redis-test-put@example.com");
        record.record(Reaction::Unlike, "Cats".to_string());

        store.put(&record).await.unwrap();
        assert_eq!(store.get(&record.email).await.unwrap(), Some(record.clone()));

        store.delete(&record.email).await.unwrap();
        assert_eq!(store.get(&record.email).await.unwrap(), None);
    }

    #[tokio::test]
    #[ignore = "requires a running Redis"]
    async fn test_compare_and_put() {
        let store = connect().await;
        let mut record = UserFilms::new("redis-test-cas@example.com");
        record.record(Reaction::Like, "Heat".to_string());
        store.put(&record).await.unwrap();

        let updated = record.without_liked("Heat").unwrap();
        assert!(store.compare_and_put(Some(&record), &updated).await.unwrap());
        // The stored value moved on, so the same expectation now fails
        assert!(!store.compare_and_put(Some(&record), &updated).await.unwrap());

        store.delete(&record.email).await.unwrap();
        assert!(store.compare_and_put(None, &record).await.unwrap());
        assert!(!store.compare_and_put(None, &record).await.unwrap());

        store.delete(&record.email).await.unwrap();
    }
}
