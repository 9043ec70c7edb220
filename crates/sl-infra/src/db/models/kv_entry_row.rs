use crate::db::schema::kv_entries;
use diesel::prelude::*;

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = kv_entries)]
pub struct KvEntryRow {
    pub key: String,
    pub value: Vec<u8>,
    pub updated_at: i64,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = kv_entries)]
pub struct NewKvEntryRow<'a> {
    pub key: &'a str,
    pub value: &'a [u8],
    pub updated_at: i64,
}
