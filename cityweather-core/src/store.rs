//! Persistence for city records.

use crate::{
    error::StoreError,
    model::{City, CityCandidate},
};

pub mod sqlite;

pub use sqlite::SqliteCityStore;

/// Minimal CRUD contract the controllers rely on.
///
/// `select_all` returns records in the store's native order; callers do not
/// re-sort.
pub trait CityStore {
    fn select_all(&self) -> Result<Vec<City>, StoreError>;

    /// Persist a new city and return its assigned id.
    fn insert(&mut self, candidate: &CityCandidate) -> Result<i64, StoreError>;

    /// Overwrite the stored record with the same id.
    fn update(&mut self, city: &City) -> Result<(), StoreError>;

    fn delete(&mut self, id: i64) -> Result<(), StoreError>;

    fn delete_all(&mut self) -> Result<(), StoreError>;
}

/// Volatile store, ordered by insertion.
#[derive(Debug, Clone)]
pub struct MemoryCityStore {
    cities: Vec<City>,
    next_id: i64,
}

impl Default for MemoryCityStore {
    fn default() -> Self {
        Self {
            cities: Vec::new(),
            next_id: 1,
        }
    }
}

impl MemoryCityStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CityStore for MemoryCityStore {
    fn select_all(&self) -> Result<Vec<City>, StoreError> {
        Ok(self.cities.clone())
    }

    fn insert(&mut self, candidate: &CityCandidate) -> Result<i64, StoreError> {
        let id = self.next_id;
        self.next_id += 1;
        self.cities.push(candidate.clone().with_id(id));
        Ok(id)
    }

    fn update(&mut self, city: &City) -> Result<(), StoreError> {
        let slot = self
            .cities
            .iter_mut()
            .find(|c| c.id == city.id)
            .ok_or(StoreError::NotFound(city.id))?;
        *slot = city.clone();
        Ok(())
    }

    fn delete(&mut self, id: i64) -> Result<(), StoreError> {
        let before = self.cities.len();
        self.cities.retain(|c| c.id != id);
        if self.cities.len() == before {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }

    fn delete_all(&mut self) -> Result<(), StoreError> {
        self.cities.clear();
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::Utc;

    pub(crate) fn candidate(name: &str, lat: &str, lon: &str) -> CityCandidate {
        CityCandidate::new(name.into(), lat.into(), lon.into(), Utc::now())
    }

    /// Contract checks shared by every store implementation.
    pub(crate) fn exercise_store<S: CityStore>(store: &mut S) {
        assert!(store.select_all().unwrap().is_empty());

        let paris = store.insert(&candidate("Paris", "48.85", "2.35")).unwrap();
        let oslo = store.insert(&candidate("Oslo", "59.91", "10.75")).unwrap();
        assert_ne!(paris, oslo);

        let all = store.select_all().unwrap();
        assert_eq!(
            all.iter().map(|c| c.name.as_str()).collect::<Vec<_>>(),
            ["Paris", "Oslo"]
        );

        let mut updated = all[0].clone();
        updated.temperature = "18.2".into();
        store.update(&updated).unwrap();
        let reloaded = store.select_all().unwrap();
        assert_eq!(reloaded[0].id, paris);
        assert_eq!(reloaded[0].temperature, "18.2");

        store.delete(oslo).unwrap();
        assert!(matches!(store.delete(oslo), Err(StoreError::NotFound(id)) if id == oslo));
        assert_eq!(store.select_all().unwrap().len(), 1);

        store.delete_all().unwrap();
        assert!(store.select_all().unwrap().is_empty());
    }

    #[test]
    fn memory_store_contract() {
        exercise_store(&mut MemoryCityStore::new());
    }

    #[test]
    fn memory_store_update_unknown_id() {
        let mut store = MemoryCityStore::new();
        let ghost = candidate("Ghost", "0", "0").with_id(42);
        assert!(matches!(store.update(&ghost), Err(StoreError::NotFound(42))));
    }

    #[test]
    fn memory_store_ids_are_not_reused() {
        let mut store = MemoryCityStore::new();
        let first = store.insert(&candidate("A", "1", "1")).unwrap();
        store.delete_all().unwrap();
        let second = store.insert(&candidate("B", "1", "1")).unwrap();
        assert!(second > first);
    }
}
