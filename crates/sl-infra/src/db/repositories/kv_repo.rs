use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use diesel::prelude::*;

use sl_core::ports::{ClockPort, KeyValueStorePort};

use crate::db::models::{KvEntryRow, NewKvEntryRow};
use crate::db::ports::DbExecutor;
use crate::db::schema::kv_entries;

/// SQLite-backed key-value store. Lists are stored as JSON string arrays.
pub struct DieselKeyValueStore<E> {
    executor: E,
    clock: Arc<dyn ClockPort>,
}

impl<E> DieselKeyValueStore<E>
where
    E: DbExecutor,
{
    pub fn new(executor: E, clock: Arc<dyn ClockPort>) -> Self {
        Self { executor, clock }
    }

    fn read(&self, entry_key: &str) -> Result<Option<Vec<u8>>> {
        self.executor.run(|conn| {
            let row = kv_entries::table
                .filter(kv_entries::key.eq(entry_key))
                .select(KvEntryRow::as_select())
                .first::<KvEntryRow>(conn)
                .optional()
                .with_context(|| format!("select kv entry {entry_key}"))?;
            Ok(row.map(|r| r.value))
        })
    }

    fn write(&self, entry_key: &str, bytes: &[u8]) -> Result<()> {
        let now = self.clock.now_ms();
        self.executor.run(|conn| {
            let row = NewKvEntryRow {
                key: entry_key,
                value: bytes,
                updated_at: now,
            };
            diesel::insert_into(kv_entries::table)
                .values(&row)
                .on_conflict(kv_entries::key)
                .do_update()
                .set((
                    kv_entries::value.eq(bytes),
                    kv_entries::updated_at.eq(now),
                ))
                .execute(conn)
                .with_context(|| format!("upsert kv entry {entry_key}"))?;
            Ok(())
        })
    }
}

#[async_trait]
impl<E> KeyValueStorePort for DieselKeyValueStore<E>
where
    E: DbExecutor,
{
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        self.read(key)
    }

    async fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        self.write(key, value)
    }

    async fn get_list(&self, key: &str) -> Result<Vec<String>> {
        match self.read(key)? {
            Some(bytes) => serde_json::from_slice(&bytes)
                .with_context(|| format!("decode list stored under {key}")),
            None => Ok(Vec::new()),
        }
    }

    async fn set_list(&self, key: &str, values: &[String]) -> Result<()> {
        let bytes = serde_json::to_vec(values).context("encode list")?;
        self.write(key, &bytes)
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.executor.run(|conn| {
            diesel::delete(kv_entries::table.filter(kv_entries::key.eq(key)))
                .execute(conn)
                .with_context(|| format!("delete kv entry {key}"))?;
            Ok(())
        })
    }
}
