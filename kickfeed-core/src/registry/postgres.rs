use super::{MatchRegistry, RegistryError};
use crate::entities::match_records::{
    DeleteMatchRecord, GetMatchRecord, InsertMatchRecord, ListLiveMatches, MatchRecordExists,
    UpdateMatchProgress,
};
use crate::entities::{MatchProgress, MatchRecord};
use crate::framework::DatabaseProcessor;
use async_trait::async_trait;
use kanau::processor::Processor;

/// Registry stored in the `matches` table.
#[derive(Debug, Clone)]
pub struct PgMatchRegistry {
    db: DatabaseProcessor,
}

impl PgMatchRegistry {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self {
            db: DatabaseProcessor { pool },
        }
    }
}

#[async_trait]
impl MatchRegistry for PgMatchRegistry {
    async fn exists(&self, match_id: &str) -> Result<bool, RegistryError> {
        let exists = self
            .db
            .process(MatchRecordExists {
                match_id: match_id.to_owned(),
            })
            .await?;
        Ok(exists)
    }

    async fn create(&self, record: MatchRecord) -> Result<bool, RegistryError> {
        let inserted = self.db.process(InsertMatchRecord { record }).await?;
        Ok(inserted)
    }

    async fn read(&self, match_id: &str) -> Result<MatchRecord, RegistryError> {
        self.db
            .process(GetMatchRecord {
                match_id: match_id.to_owned(),
            })
            .await?
            .ok_or_else(|| RegistryError::NotFound(match_id.to_owned()))
    }

    async fn write_cursor_and_seen(
        &self,
        match_id: &str,
        progress: &MatchProgress,
    ) -> Result<(), RegistryError> {
        let updated = self
            .db
            .process(UpdateMatchProgress {
                match_id: match_id.to_owned(),
                progress: progress.clone(),
            })
            .await?;
        if updated > 0 {
            return Ok(());
        }
        // Zero rows: either deleted meanwhile or the version moved on.
        if self.exists(match_id).await? {
            Err(RegistryError::Conflict {
                match_id: match_id.to_owned(),
                expected: progress.expected_version,
            })
        } else {
            Err(RegistryError::NotFound(match_id.to_owned()))
        }
    }

    async fn delete(&self, match_id: &str) -> Result<(), RegistryError> {
        self.db
            .process(DeleteMatchRecord {
                match_id: match_id.to_owned(),
            })
            .await?;
        Ok(())
    }

    async fn list_live(&self) -> Result<Vec<MatchRecord>, RegistryError> {
        let records = self.db.process(ListLiveMatches).await?;
        Ok(records)
    }
}
