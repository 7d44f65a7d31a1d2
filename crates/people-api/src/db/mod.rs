//! # Record Store
//!
//! Persistence for person records behind the [`PersonStore`] trait.
//!
//! ## Backends
//!
//! - [`people::PgPersonStore`]: PostgreSQL via SQLx. Selected when `DB_HOST`
//!   is set; the `people` table is created by the embedded migration.
//! - [`memory::MemoryPersonStore`]: in-process map. Selected when no
//!   database is configured (development and tests). State does not
//!   survive restarts.
//!
//! Deletes are hard deletes in both backends.

pub mod memory;
pub mod people;

use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};

use crate::config::DatabaseConfig;
use crate::state::Person;

/// Store failures. All of them surface as 500s.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Optional name/surname filters for list queries.
///
/// Each filter is a case-insensitive substring match; both are AND-combined.
/// Empty filters are dropped on construction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersonFilter {
    pub name: Option<String>,
    pub surname: Option<String>,
}

impl PersonFilter {
    pub fn new(name: Option<String>, surname: Option<String>) -> Self {
        Self {
            name: name.filter(|s| !s.is_empty()),
            surname: surname.filter(|s| !s.is_empty()),
        }
    }

    /// Whether `person` satisfies every active filter.
    pub fn matches(&self, person: &Person) -> bool {
        fn contains_ci(haystack: &str, needle: &str) -> bool {
            haystack.to_lowercase().contains(&needle.to_lowercase())
        }
        self.name
            .as_deref()
            .map_or(true, |n| contains_ci(&person.name, n))
            && self
                .surname
                .as_deref()
                .map_or(true, |s| contains_ci(&person.surname, s))
    }
}

/// Persistence operations the request handlers depend on.
#[async_trait]
pub trait PersonStore: Send + Sync {
    /// Insert a new record. `person.id` is ignored; the stored record with
    /// its assigned id is returned.
    async fn create(&self, person: &Person) -> Result<Person, StoreError>;

    /// One page of matching records ordered by id, plus the total number of
    /// matching records before pagination.
    async fn find_many(
        &self,
        filter: &PersonFilter,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<Person>, i64), StoreError>;

    /// Fetch a record by id.
    async fn find_one(&self, id: i64) -> Result<Option<Person>, StoreError>;

    /// Insert or replace the record with `person.id`.
    async fn save(&self, person: &Person) -> Result<Person, StoreError>;

    /// Remove a record by id. Removing a missing id is not an error.
    async fn delete(&self, id: i64) -> Result<(), StoreError>;

    /// Verify the backend is reachable.
    async fn ping(&self) -> Result<(), StoreError>;

    /// Short backend name for logs.
    fn backend(&self) -> &'static str;
}

/// Connect to PostgreSQL and apply the embedded migrations.
///
/// Failure here is fatal at startup.
pub async fn init_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(5))
        .connect_with(config.connect_options())
        .await?;

    tracing::info!(host = %config.host, database = %config.database, "Connected to PostgreSQL");

    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("Database migrations applied");

    Ok(pool)
}
