//! Database model for local storage items.

use chrono::NaiveDateTime;
use diesel::prelude::*;

/// One key/value pair in the `local_storage` table
#[derive(Queryable, Insertable, Selectable, Debug, Clone)]
#[diesel(table_name = crate::schema::local_storage)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct LocalStorageItemDB {
    pub storage_key: String,
    pub storage_value: String,
    pub updated_at: NaiveDateTime,
}
