//! Repository traits describing persistence adapters.
//!
//! Handlers depend on these traits rather than on Postgres directly, so
//! integration tests can substitute in-memory implementations.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::entities::{
    DropboxRecord, PickupRecord, WasteItemWithType, WasteTypeRecord,
};

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("resource not found")]
    NotFound,
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("database timeout")]
    Timeout,
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }
}

/// Filter for the paginated waste item listing.
#[derive(Debug, Clone, Default)]
pub struct WasteQueryFilter {
    /// Case-insensitive substring match on the item name.
    pub search: Option<String>,
}

/// Filter for the paginated pickup listing.
#[derive(Debug, Clone, Default)]
pub struct PickupQueryFilter {
    /// Case-insensitive substring match on the district name.
    pub district: Option<String>,
}

#[async_trait]
pub trait WasteTypesRepo: Send + Sync {
    async fn list_types(&self) -> Result<Vec<WasteTypeRecord>, RepoError>;
}

#[async_trait]
pub trait WasteItemsRepo: Send + Sync {
    async fn list_for_type(&self, type_id: i64) -> Result<Vec<WasteItemWithType>, RepoError>;

    async fn list_page(
        &self,
        filter: &WasteQueryFilter,
        skip: i64,
        take: i64,
    ) -> Result<Vec<WasteItemWithType>, RepoError>;

    async fn count(&self, filter: &WasteQueryFilter) -> Result<u64, RepoError>;

    async fn search_by_name(
        &self,
        name: &str,
        take: i64,
    ) -> Result<Vec<WasteItemWithType>, RepoError>;
}

#[async_trait]
pub trait DropboxesRepo: Send + Sync {
    async fn list_all(&self) -> Result<Vec<DropboxRecord>, RepoError>;
}

#[async_trait]
pub trait PickupsRepo: Send + Sync {
    async fn list_page(
        &self,
        filter: &PickupQueryFilter,
        skip: i64,
        take: i64,
    ) -> Result<Vec<PickupRecord>, RepoError>;

    async fn count(&self, filter: &PickupQueryFilter) -> Result<u64, RepoError>;
}

/// Liveness probe against the backing store, used by the health endpoint.
#[async_trait]
pub trait HealthRepo: Send + Sync {
    async fn ping(&self) -> Result<(), RepoError>;
}
