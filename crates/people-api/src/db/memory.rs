//! In-memory person store.
//!
//! All operations are synchronous under a `parking_lot::RwLock`; the lock is
//! never held across an `.await`.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

use super::{PersonFilter, PersonStore, StoreError};
use crate::state::Person;

#[derive(Debug)]
struct Inner {
    rows: BTreeMap<i64, Person>,
    next_id: i64,
}

/// Thread-safe, cloneable [`PersonStore`] keyed by id. Ids start at 1.
#[derive(Debug, Clone)]
pub struct MemoryPersonStore {
    inner: Arc<RwLock<Inner>>,
}

impl MemoryPersonStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(Inner {
                rows: BTreeMap::new(),
                next_id: 1,
            })),
        }
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.inner.read().rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemoryPersonStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PersonStore for MemoryPersonStore {
    async fn create(&self, person: &Person) -> Result<Person, StoreError> {
        let mut inner = self.inner.write();
        let id = inner.next_id;
        inner.next_id += 1;
        let record = Person {
            id,
            ..person.clone()
        };
        inner.rows.insert(id, record.clone());
        Ok(record)
    }

    async fn find_many(
        &self,
        filter: &PersonFilter,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<Person>, i64), StoreError> {
        let inner = self.inner.read();
        let matching: Vec<&Person> = inner.rows.values().filter(|p| filter.matches(p)).collect();
        let total = matching.len() as i64;
        let page = matching
            .into_iter()
            .skip(usize::try_from(offset).unwrap_or(0))
            .take(usize::try_from(limit).unwrap_or(0))
            .cloned()
            .collect();
        Ok((page, total))
    }

    async fn find_one(&self, id: i64) -> Result<Option<Person>, StoreError> {
        Ok(self.inner.read().rows.get(&id).cloned())
    }

    async fn save(&self, person: &Person) -> Result<Person, StoreError> {
        let mut inner = self.inner.write();
        if person.id >= inner.next_id {
            inner.next_id = person.id + 1;
        }
        inner.rows.insert(person.id, person.clone());
        Ok(person.clone())
    }

    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        self.inner.write().rows.remove(&id);
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
