//! Person persistence operations on PostgreSQL.
//!
//! All queries operate on the `people` table created by
//! `migrations/0001_create_people.sql`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::{PersonFilter, PersonStore, StoreError};
use crate::state::Person;

const COLUMNS: &str =
    "id, name, surname, patronymic, age, gender, nationality, created_at, updated_at";

/// [`PersonStore`] backed by a Postgres connection pool.
#[derive(Debug, Clone)]
pub struct PgPersonStore {
    pool: PgPool,
}

impl PgPersonStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Turn a filter value into an `ILIKE` substring pattern, escaping the
/// LIKE metacharacters so they match literally.
fn like_pattern(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len() + 2);
    escaped.push('%');
    for c in value.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

#[async_trait]
impl PersonStore for PgPersonStore {
    async fn create(&self, person: &Person) -> Result<Person, StoreError> {
        let row = sqlx::query_as::<_, PersonRow>(&format!(
            "INSERT INTO people (name, surname, patronymic, age, gender, nationality, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {COLUMNS}"
        ))
        .bind(&person.name)
        .bind(&person.surname)
        .bind(&person.patronymic)
        .bind(person.age)
        .bind(&person.gender)
        .bind(&person.nationality)
        .bind(person.created_at)
        .bind(person.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into_record())
    }

    async fn find_many(
        &self,
        filter: &PersonFilter,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<Person>, i64), StoreError> {
        let name = filter.name.as_deref().map(like_pattern);
        let surname = filter.surname.as_deref().map(like_pattern);

        // Count and page are separate statements; under concurrent writes
        // they can disagree.
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM people
             WHERE ($1::text IS NULL OR name ILIKE $1)
               AND ($2::text IS NULL OR surname ILIKE $2)",
        )
        .bind(&name)
        .bind(&surname)
        .fetch_one(&self.pool)
        .await?;

        let rows = sqlx::query_as::<_, PersonRow>(&format!(
            "SELECT {COLUMNS} FROM people
             WHERE ($1::text IS NULL OR name ILIKE $1)
               AND ($2::text IS NULL OR surname ILIKE $2)
             ORDER BY id LIMIT $3 OFFSET $4"
        ))
        .bind(&name)
        .bind(&surname)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok((rows.into_iter().map(PersonRow::into_record).collect(), total))
    }

    async fn find_one(&self, id: i64) -> Result<Option<Person>, StoreError> {
        let row = sqlx::query_as::<_, PersonRow>(&format!(
            "SELECT {COLUMNS} FROM people WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(PersonRow::into_record))
    }

    async fn save(&self, person: &Person) -> Result<Person, StoreError> {
        let row = sqlx::query_as::<_, PersonRow>(&format!(
            "INSERT INTO people (id, name, surname, patronymic, age, gender, nationality, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             ON CONFLICT (id) DO UPDATE SET
                 name = EXCLUDED.name,
                 surname = EXCLUDED.surname,
                 patronymic = EXCLUDED.patronymic,
                 age = EXCLUDED.age,
                 gender = EXCLUDED.gender,
                 nationality = EXCLUDED.nationality,
                 updated_at = EXCLUDED.updated_at
             RETURNING {COLUMNS}"
        ))
        .bind(person.id)
        .bind(&person.name)
        .bind(&person.surname)
        .bind(&person.patronymic)
        .bind(person.age)
        .bind(&person.gender)
        .bind(&person.nationality)
        .bind(person.created_at)
        .bind(person.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into_record())
    }

    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM people WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            tracing::debug!(id, "delete matched no rows");
        }
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }
}

/// Internal row type for SQLx mapping.
#[derive(sqlx::FromRow)]
struct PersonRow {
    id: i64,
    name: String,
    surname: String,
    patronymic: Option<String>,
    age: i32,
    gender: String,
    nationality: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl PersonRow {
    fn into_record(self) -> Person {
        Person {
            id: self.id,
            name: self.name,
            surname: self.surname,
            patronymic: self.patronymic,
            age: self.age,
            gender: self.gender,
            nationality: self.nationality,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}
