//! SQLite-backed city store.

use chrono::{DateTime, Utc};
use rusqlite::{Connection, params};
use std::{fs, path::Path};

use crate::{
    error::StoreError,
    model::{City, CityCandidate},
};

use super::CityStore;

pub struct SqliteCityStore {
    conn: Connection,
}

impl std::fmt::Debug for SqliteCityStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteCityStore")
            .field("path", &self.conn.path())
            .finish()
    }
}

impl SqliteCityStore {
    /// Open (or create) the store at `path`, creating parent directories as needed.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| StoreError::Open {
                path: parent.display().to_string(),
                source,
            })?;
        }

        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.init_schema()?;
        tracing::debug!(path = %path.display(), "opened city store");
        Ok(store)
    }

    pub fn in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<(), StoreError> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS cities (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                temperature TEXT NOT NULL,
                latitude TEXT NOT NULL,
                longitude TEXT NOT NULL,
                icon_flag INTEGER NOT NULL DEFAULT 1,
                sync_time TEXT NOT NULL
            );
            "#,
        )?;
        Ok(())
    }

    fn row_to_city(row: &rusqlite::Row) -> rusqlite::Result<City> {
        let sync_time: String = row.get(6)?;
        let last_sync_time = DateTime::parse_from_rfc3339(&sync_time)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(6, rusqlite::types::Type::Text, Box::new(e))
            })?;

        Ok(City {
            id: row.get(0)?,
            name: row.get(1)?,
            temperature: row.get(2)?,
            latitude: row.get(3)?,
            longitude: row.get(4)?,
            icon_flag: row.get(5)?,
            last_sync_time,
        })
    }
}

impl CityStore for SqliteCityStore {
    fn select_all(&self) -> Result<Vec<City>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, temperature, latitude, longitude, icon_flag, sync_time
             FROM cities ORDER BY id",
        )?;
        let cities = stmt
            .query_map([], Self::row_to_city)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(cities)
    }

    fn insert(&mut self, candidate: &CityCandidate) -> Result<i64, StoreError> {
        self.conn.execute(
            "INSERT INTO cities (name, temperature, latitude, longitude, icon_flag, sync_time)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                candidate.name(),
                candidate.temperature(),
                candidate.latitude(),
                candidate.longitude(),
                candidate.icon_flag(),
                candidate.last_sync_time().to_rfc3339(),
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        tracing::info!(id, name = candidate.name(), "inserted city");
        Ok(id)
    }

    fn update(&mut self, city: &City) -> Result<(), StoreError> {
        let changed = self.conn.execute(
            "UPDATE cities
             SET name = ?2, temperature = ?3, latitude = ?4, longitude = ?5,
                 icon_flag = ?6, sync_time = ?7
             WHERE id = ?1",
            params![
                city.id,
                city.name,
                city.temperature,
                city.latitude,
                city.longitude,
                city.icon_flag,
                city.last_sync_time.to_rfc3339(),
            ],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound(city.id));
        }
        Ok(())
    }

    fn delete(&mut self, id: i64) -> Result<(), StoreError> {
        let changed = self
            .conn
            .execute("DELETE FROM cities WHERE id = ?1", params![id])?;
        if changed == 0 {
            return Err(StoreError::NotFound(id));
        }
        tracing::info!(id, "deleted city");
        Ok(())
    }

    fn delete_all(&mut self) -> Result<(), StoreError> {
        let removed = self.conn.execute("DELETE FROM cities", [])?;
        tracing::info!(removed, "deleted all cities");
        Ok(())
    }
}
