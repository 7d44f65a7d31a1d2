//! # People API
//!
//! CRUD over person records. Create and update run the three demographic
//! lookups before persisting; a failed lookup leaves its attribute as it was.
//!
//! ## Endpoints
//!
//! - `POST /api/people`: create person
//! - `GET /api/people`: list people (`name`, `surname`, `page`, `limit`)
//! - `GET /api/people/:id`: get person
//! - `PUT /api/people/:id`: update person
//! - `DELETE /api/people/:id`: delete person

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::db::PersonFilter;
use crate::error::AppError;
use crate::extractors::{extract_path, extract_validated_json, Validate};
use crate::state::{AppState, Person};

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_LIMIT: i64 = 10;

// ── Request/Response DTOs ───────────────────────────────────────────

/// Body of create and update requests.
#[derive(Debug, Deserialize)]
pub struct PersonInput {
    pub name: String,
    pub surname: String,
    #[serde(default)]
    pub patronymic: Option<String>,
}

impl PersonInput {
    /// Patronymic with blank values treated as absent.
    fn patronymic(&self) -> Option<String> {
        self.patronymic
            .as_ref()
            .filter(|p| !p.trim().is_empty())
            .cloned()
    }
}

impl Validate for PersonInput {
    fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("name must not be empty".to_string());
        }
        if self.surname.trim().is_empty() {
            return Err("surname must not be empty".to_string());
        }
        Ok(())
    }
}

/// Raw list query. Numeric fields stay strings so that bad values fall
/// back to defaults instead of rejecting the request.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub name: Option<String>,
    pub surname: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

/// Resolved 1-indexed page window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
}

impl Pagination {
    /// Missing, non-numeric and non-positive values take the defaults.
    pub fn from_query(page: Option<&str>, limit: Option<&str>) -> Self {
        fn positive(raw: Option<&str>, default: i64) -> i64 {
            raw.and_then(|s| s.trim().parse::<i64>().ok())
                .filter(|n| *n > 0)
                .unwrap_or(default)
        }
        Self {
            page: positive(page, DEFAULT_PAGE),
            limit: positive(limit, DEFAULT_LIMIT),
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

/// `GET /api/people` response.
#[derive(Debug, Serialize, Deserialize)]
pub struct PersonPage {
    pub data: Vec<Person>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
}

// ── Router ──────────────────────────────────────────────────────────

/// Build the people router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/people", get(list_people).post(create_person))
        .route(
            "/api/people/:id",
            get(get_person).put(update_person).delete(delete_person),
        )
}

// ── Handlers ────────────────────────────────────────────────────────

/// POST /api/people: Create a person, enriched with demographics.
async fn create_person(
    State(state): State<AppState>,
    body: Result<Json<PersonInput>, JsonRejection>,
) -> Result<(StatusCode, Json<Person>), AppError> {
    let input = extract_validated_json(body)?;
    let now = Utc::now();

    let mut person = Person {
        id: 0,
        patronymic: input.patronymic(),
        name: input.name,
        surname: input.surname,
        age: 0,
        gender: String::new(),
        nationality: String::new(),
        created_at: now,
        updated_at: now,
    };

    let demographics = state.enrichment.demographics(&person.name).await;
    person.apply_demographics(demographics);

    let created = state.store.create(&person).await?;
    tracing::info!(id = created.id, "person created");
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /api/people: Filtered, paginated list.
async fn list_people(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<PersonPage>, AppError> {
    let pagination = Pagination::from_query(query.page.as_deref(), query.limit.as_deref());
    let filter = PersonFilter::new(query.name, query.surname);

    let (data, total) = state
        .store
        .find_many(&filter, pagination.offset(), pagination.limit)
        .await?;

    Ok(Json(PersonPage {
        data,
        total,
        page: pagination.page,
        limit: pagination.limit,
    }))
}

/// GET /api/people/:id: Get a single person.
async fn get_person(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Person>, AppError> {
    let id = extract_path(id)?;
    state
        .store
        .find_one(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("person {id} not found")))
}

/// PUT /api/people/:id: Overwrite name fields and re-run enrichment.
async fn update_person(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    body: Result<Json<PersonInput>, JsonRejection>,
) -> Result<Json<Person>, AppError> {
    let id = extract_path(id)?;
    let mut person = state
        .store
        .find_one(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("person {id} not found")))?;
    let input = extract_validated_json(body)?;

    person.patronymic = input.patronymic();
    person.name = input.name;
    person.surname = input.surname;

    let demographics = state.enrichment.demographics(&person.name).await;
    person.apply_demographics(demographics);
    person.updated_at = Utc::now();

    let saved = state.store.save(&person).await?;
    tracing::info!(id = saved.id, "person updated");
    Ok(Json(saved))
}

/// DELETE /api/people/:id: Delete a person. Missing ids still get 204.
async fn delete_person(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, AppError> {
    let id = extract_path(id)?;
    state.store.delete(id).await?;
    tracing::info!(id, "person deleted");
    Ok(StatusCode::NO_CONTENT)
}
