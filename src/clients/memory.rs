use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::Mutex;
use tracing::info;
use uuid::Uuid;

use crate::clients::errors::ClientError;
use crate::clients::store::{
    CollectionId, CollectionRecord, CollectionStore, CreateOutcome, OwnerId,
};
use crate::workflow::name::NormalizedName;

/// In-process collection store.
///
/// The whole map sits behind one mutex, so the duplicate check and the
/// insert are a single atomic step: two racing create attempts for the same
/// owner and name can both pass the workflow's pre-check, but only one insert
/// wins and the loser gets a rejected outcome.
pub struct InMemoryCollectionStore<I> {
    collections: Mutex<HashMap<(OwnerId, NormalizedName), CollectionRecord<I>>>,
}

impl<I> InMemoryCollectionStore<I> {
    pub fn new() -> Self {
        Self {
            collections: Mutex::new(HashMap::new()),
        }
    }
}

impl<I> Default for InMemoryCollectionStore<I> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<I> CollectionStore<I> for InMemoryCollectionStore<I>
where
    I: Clone + Send + Sync + 'static,
{
    async fn exists(&self, owner: &OwnerId, name: &NormalizedName) -> Result<bool, ClientError> {
        let collections = self.collections.lock().await;
        Ok(collections.contains_key(&(owner.clone(), name.clone())))
    }

    async fn create_collection(
        &self,
        owner: &OwnerId,
        name: &NormalizedName,
        items: &[I],
    ) -> Result<CreateOutcome, ClientError> {
        let mut collections = self.collections.lock().await;
        let key = (owner.clone(), name.clone());
        if collections.contains_key(&key) {
            return Ok(CreateOutcome::Rejected {
                reason: format!("a collection named '{name}' already exists"),
            });
        }

        let record = CollectionRecord {
            id: CollectionId::new(Uuid::new_v4().to_string()),
            owner: owner.clone(),
            name: name.clone(),
            items: items.to_vec(),
            created_at: Utc::now(),
        };
        let id = record.id.clone();
        collections.insert(key, record);

        info!(owner = %owner, name = %name, id = %id, "collection created");
        Ok(CreateOutcome::Created { id })
    }

    async fn list_collections(
        &self,
        owner: &OwnerId,
    ) -> Result<Vec<CollectionRecord<I>>, ClientError> {
        let collections = self.collections.lock().await;
        let mut records: Vec<_> = collections
            .values()
            .filter(|record| &record.owner == owner)
            .cloned()
            .collect();
        records.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(records)
    }
}
