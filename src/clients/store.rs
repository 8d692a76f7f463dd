use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::clients::errors::ClientError;
use crate::workflow::name::NormalizedName;

/// Opaque token identifying the account that scopes name uniqueness.
/// Supplied by the identity subsystem; never derived or inspected here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(pub String);

impl OwnerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for OwnerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a persisted collection, assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CollectionId(pub String);

impl CollectionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CollectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A persisted collection as the store reports it back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionRecord<I> {
    pub id: CollectionId,
    pub owner: OwnerId,
    pub name: NormalizedName,
    pub items: Vec<I>,
    pub created_at: DateTime<Utc>,
}

/// Result of a create attempt that reached the store.
///
/// `Rejected` is a definitive business outcome (the store refused the write,
/// e.g. a late-discovered duplicate), distinct from a `ClientError`, which
/// means the attempt never got a definitive answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateOutcome {
    Created { id: CollectionId },
    Rejected { reason: String },
}

/// Storage boundary for named collections.
///
/// Covers both halves of the save path: the optimistic existence pre-check
/// and the create itself. `exists` and `create_collection` take the already
/// normalized name, so differently-cased spellings of the same name
/// observably agree. The controller calls `create_collection` at most once
/// per attempt and never retries it.
///
/// Implementations that enforce uniqueness atomically at write time (both
/// bundled stores do) report a collision as `CreateOutcome::Rejected`.
#[async_trait]
pub trait CollectionStore<I>: Send + Sync {
    async fn exists(&self, owner: &OwnerId, name: &NormalizedName) -> Result<bool, ClientError>;

    async fn create_collection(
        &self,
        owner: &OwnerId,
        name: &NormalizedName,
        items: &[I],
    ) -> Result<CreateOutcome, ClientError>;

    async fn list_collections(
        &self,
        owner: &OwnerId,
    ) -> Result<Vec<CollectionRecord<I>>, ClientError>;
}
