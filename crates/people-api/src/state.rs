//! # Application State
//!
//! Shared state for the Axum application, passed to all route handlers
//! via the `State` extractor. Built once at startup; every clone shares the
//! same store handle and HTTP connection pool.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use people_enrich::{Demographics, EnrichmentClient};
use serde::{Deserialize, Serialize};

use crate::db::memory::MemoryPersonStore;
use crate::db::PersonStore;

/// Person record as stored and returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    pub id: i64,
    pub name: String,
    pub surname: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patronymic: Option<String>,
    pub age: i32,
    pub gender: String,
    /// ISO 3166-1 alpha-2 country code, or empty when unknown.
    pub nationality: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Person {
    /// Overwrite each demographic attribute whose lookup succeeded.
    /// Absent attributes keep their current value.
    pub fn apply_demographics(&mut self, demographics: Demographics) {
        if let Some(age) = demographics.age {
            self.age = age;
        }
        if let Some(gender) = demographics.gender {
            self.gender = gender;
        }
        if let Some(nationality) = demographics.nationality {
            self.nationality = nationality;
        }
    }
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn PersonStore>,
    pub enrichment: EnrichmentClient,
}

impl AppState {
    pub fn new(store: Arc<dyn PersonStore>, enrichment: EnrichmentClient) -> Self {
        Self { store, enrichment }
    }

    /// State backed by a fresh in-memory store.
    pub fn in_memory(enrichment: EnrichmentClient) -> Self {
        Self::new(Arc::new(MemoryPersonStore::new()), enrichment)
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("store", &self.store.backend())
            .field("enrichment", &self.enrichment)
            .finish()
    }
}
