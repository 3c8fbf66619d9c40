use crate::{error::AppResult, models::UserFilms};

pub mod memory;
pub mod redis;

pub use memory::MemoryFilmStore;
pub use redis::{create_redis_client, RedisFilmStore, StoreKey};

/// Persistence for per-user film records, keyed by email
#[async_trait::async_trait]
pub trait FilmStore: Send + Sync {
    /// Returns the stored record, or `None` when the user has none
    async fn get(&self, email: &str) -> AppResult<Option<UserFilms>>;

    /// Unconditionally stores `record`
    async fn put(&self, record: &UserFilms) -> AppResult<()>;

    /// Stores `new` only if the current record still equals `expected`.
    /// With `expected == None` the write only lands if no record exists yet.
    ///
    /// Returns `false` when the record changed, appeared or vanished in between.
    async fn compare_and_put(
        &self,
        expected: Option<&UserFilms>,
        new: &UserFilms,
    ) -> AppResult<bool>;

    /// Removes the user's record. Deleting a missing record is not an error.
    async fn delete(&self, email: &str) -> AppResult<()>;

    /// Store name for logging and debugging
    fn name(&self) -> &'static str;
}
