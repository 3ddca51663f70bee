//! Persistent store of monitored matches.
//!
//! The registry is the single source of truth for a match's cursor and
//! seen-set. Work items and continuation messages only carry the match
//! identity.

mod memory;
mod postgres;

pub use memory::InMemoryRegistry;
pub use postgres::PgMatchRegistry;

use crate::entities::{MatchProgress, MatchRecord};
use async_trait::async_trait;
use thiserror::Error;

/// Errors returned by a [`MatchRegistry`].
#[derive(Debug, Error)]
pub enum RegistryError {
    /// No record exists for the requested match.
    #[error("match {0} is not registered")]
    NotFound(String),

    /// The record changed since it was read.
    #[error("match {match_id} was updated concurrently (expected version {expected})")]
    Conflict { match_id: String, expected: i64 },

    /// Database error
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A stored value could not be decoded.
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Storage for match records.
///
/// Implementations must make `create` insert-if-absent and
/// `write_cursor_and_seen` conditional on [`MatchProgress::expected_version`]
/// so two concurrent polls of one match cannot both commit.
#[async_trait]
pub trait MatchRegistry: Send + Sync {
    async fn exists(&self, match_id: &str) -> Result<bool, RegistryError>;

    /// Insert `record` unless the match is already registered.
    ///
    /// Returns whether a new record was created.
    async fn create(&self, record: MatchRecord) -> Result<bool, RegistryError>;

    /// Read a record. Fails with [`RegistryError::NotFound`] when absent.
    async fn read(&self, match_id: &str) -> Result<MatchRecord, RegistryError>;

    /// Persist polling progress.
    ///
    /// Fails with [`RegistryError::Conflict`] when the stored version is no
    /// longer `progress.expected_version`, and with
    /// [`RegistryError::NotFound`] when the record is gone.
    async fn write_cursor_and_seen(
        &self,
        match_id: &str,
        progress: &MatchProgress,
    ) -> Result<(), RegistryError>;

    /// Remove a record. Deleting an absent match is not an error.
    async fn delete(&self, match_id: &str) -> Result<(), RegistryError>;

    /// Every record still being polled, oldest registration first.
    ///
    /// `Done` records are included until their removal succeeds.
    async fn list_live(&self) -> Result<Vec<MatchRecord>, RegistryError>;
}
