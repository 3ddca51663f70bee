use super::{MatchRegistry, RegistryError};
use crate::entities::{MatchProgress, MatchRecord};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Process-local registry. Used by the single-process daemon when no
/// database is configured, and by tests.
#[derive(Debug, Default)]
pub struct InMemoryRegistry {
    records: RwLock<HashMap<String, MatchRecord>>,
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MatchRegistry for InMemoryRegistry {
    async fn exists(&self, match_id: &str) -> Result<bool, RegistryError> {
        Ok(self.records.read().await.contains_key(match_id))
    }

    async fn create(&self, record: MatchRecord) -> Result<bool, RegistryError> {
        let mut records = self.records.write().await;
        if records.contains_key(record.match_id()) {
            return Ok(false);
        }
        records.insert(record.match_id().to_owned(), record);
        Ok(true)
    }

    async fn read(&self, match_id: &str) -> Result<MatchRecord, RegistryError> {
        self.records
            .read()
            .await
            .get(match_id)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound(match_id.to_owned()))
    }

    async fn write_cursor_and_seen(
        &self,
        match_id: &str,
        progress: &MatchProgress,
    ) -> Result<(), RegistryError> {
        let mut records = self.records.write().await;
        let record = records
            .get_mut(match_id)
            .ok_or_else(|| RegistryError::NotFound(match_id.to_owned()))?;
        if record.version != progress.expected_version {
            return Err(RegistryError::Conflict {
                match_id: match_id.to_owned(),
                expected: progress.expected_version,
            });
        }
        record.cursor = progress.cursor.clone();
        record.seen = progress.seen.clone();
        record.lifecycle = progress.lifecycle;
        record.version += 1;
        Ok(())
    }

    async fn delete(&self, match_id: &str) -> Result<(), RegistryError> {
        self.records.write().await.remove(match_id);
        Ok(())
    }

    async fn list_live(&self) -> Result<Vec<MatchRecord>, RegistryError> {
        let records = self.records.read().await;
        let mut live: Vec<MatchRecord> = records
            .values()
            .filter(|record| record.lifecycle.needs_poll())
            .cloned()
            .collect();
        live.sort_by(|a, b| {
            a.registered_at
                .cmp(&b.registered_at)
                .then_with(|| a.match_id().cmp(b.match_id()))
        });
        Ok(live)
    }
}
