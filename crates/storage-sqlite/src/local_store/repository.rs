use std::sync::Arc;

use chrono::Utc;
use diesel::prelude::*;
use log::debug;

use super::model::LocalStorageItemDB;
use crate::db::{get_connection, DbPool};
use crate::errors::IntoCore;
use crate::schema::local_storage::dsl::*;
use mohallaa_core::errors::Result;
use mohallaa_core::storage::LocalStore;

/// Persistent [`LocalStore`] backed by the `local_storage` table.
pub struct SqliteLocalStore {
    pool: Arc<DbPool>,
}

impl SqliteLocalStore {
    pub fn new(pool: Arc<DbPool>) -> Self {
        SqliteLocalStore { pool }
    }

    /// All stored keys, sorted.
    pub fn keys(&self) -> Result<Vec<String>> {
        let mut conn = get_connection(&self.pool)?;
        local_storage
            .select(storage_key)
            .order(storage_key.asc())
            .load::<String>(&mut conn)
            .into_core()
    }

    /// Full row for `key`, including when it was last written.
    pub fn get_entry(&self, key: &str) -> Result<Option<LocalStorageItemDB>> {
        let mut conn = get_connection(&self.pool)?;
        local_storage
            .find(key)
            .select(LocalStorageItemDB::as_select())
            .first(&mut conn)
            .optional()
            .into_core()
    }
}

impl LocalStore for SqliteLocalStore {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        let mut conn = get_connection(&self.pool)?;
        local_storage
            .find(key)
            .select(storage_value)
            .first::<String>(&mut conn)
            .optional()
            .into_core()
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let mut conn = get_connection(&self.pool)?;
        diesel::replace_into(local_storage)
            .values(&LocalStorageItemDB {
                storage_key: key.to_string(),
                storage_value: value.to_string(),
                updated_at: Utc::now().naive_utc(),
            })
            .execute(&mut conn)
            .into_core()?;
        debug!("Stored local item {} ({} bytes)", key, value.len());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        let mut conn = get_connection(&self.pool)?;
        diesel::delete(local_storage.find(key))
            .execute(&mut conn)
            .into_core()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init;
    use tempfile::TempDir;

    fn store() -> (SqliteLocalStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("local.db");
        let pool = init(path.to_str().unwrap()).unwrap();
        (SqliteLocalStore::new(pool), dir)
    }

    #[test]
    fn test_set_get_overwrite_remove() {
        let (store, _dir) = store();
        assert_eq!(store.get_item("k").unwrap(), None);

        store.set_item("k", "v1").unwrap();
        store.set_item("k", "v2").unwrap();
        assert_eq!(store.get_item("k").unwrap().as_deref(), Some("v2"));
        assert_eq!(store.keys().unwrap(), vec!["k".to_string()]);

        store.remove_item("k").unwrap();
        store.remove_item("k").unwrap();
        assert_eq!(store.get_item("k").unwrap(), None);
    }

    #[test]
    fn test_entry_records_write_time() {
        let (store, _dir) = store();
        let before = Utc::now().naive_utc() - chrono::Duration::seconds(1);

        store.set_item("k", "v").unwrap();

        let entry = store.get_entry("k").unwrap().unwrap();
        assert_eq!(entry.storage_value, "v");
        assert!(entry.updated_at >= before);
    }
}
