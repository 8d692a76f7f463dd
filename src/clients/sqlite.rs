use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::{migrate::MigrateDatabase, Row, SqlitePool};
use tracing::info;
use uuid::Uuid;

use crate::clients::errors::ClientError;
use crate::clients::store::{
    CollectionId, CollectionRecord, CollectionStore, CreateOutcome, OwnerId,
};
use crate::workflow::name::NormalizedName;

/// SQLite-backed collection store.
///
/// The `collections` table carries a UNIQUE(owner_id, name) index, so
/// uniqueness is enforced atomically at write time. A constraint violation
/// from a racing attempt surfaces as `CreateOutcome::Rejected`, not as an
/// infrastructure error.
pub struct SqliteCollectionStore {
    pool: SqlitePool,
}

impl SqliteCollectionStore {
    /// Open the database, creating it if missing, and optionally run
    /// migrations.
    pub async fn new(database_url: &str, auto_migrate: bool) -> Result<Self> {
        if !sqlx::Sqlite::database_exists(database_url).await? {
            info!("Creating database at {}", database_url);
            sqlx::Sqlite::create_database(database_url).await?;
        }

        let pool = SqlitePool::connect(database_url).await?;

        if auto_migrate {
            info!("Running database migrations...");
            sqlx::migrate!("./migrations").run(&pool).await?;
            info!("Database migrations completed");
        }

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn storage_error(err: sqlx::Error) -> ClientError {
    ClientError::Storage(err.to_string())
}

#[async_trait]
impl<I> CollectionStore<I> for SqliteCollectionStore
where
    I: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    async fn exists(&self, owner: &OwnerId, name: &NormalizedName) -> Result<bool, ClientError> {
        let row = sqlx::query("SELECT 1 FROM collections WHERE owner_id = ?1 AND name = ?2")
            .bind(owner.as_str())
            .bind(name.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_error)?;

        Ok(row.is_some())
    }

    async fn create_collection(
        &self,
        owner: &OwnerId,
        name: &NormalizedName,
        items: &[I],
    ) -> Result<CreateOutcome, ClientError> {
        let id = CollectionId::new(Uuid::new_v4().to_string());
        let payload =
            serde_json::to_string(items).map_err(|e| ClientError::Storage(e.to_string()))?;
        let created_at = Utc::now();

        let inserted = sqlx::query(
            r#"
            INSERT INTO collections (id, owner_id, name, items, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(id.as_str())
        .bind(owner.as_str())
        .bind(name.as_str())
        .bind(&payload)
        .bind(created_at.to_rfc3339())
        .execute(&self.pool)
        .await;

        match inserted {
            Ok(_) => {
                info!(owner = %owner, name = %name, id = %id, "collection created");
                Ok(CreateOutcome::Created { id })
            }
            Err(err) => {
                let unique_violation = err
                    .as_database_error()
                    .map(|db| db.is_unique_violation())
                    .unwrap_or(false);
                if unique_violation {
                    Ok(CreateOutcome::Rejected {
                        reason: format!("a collection named '{name}' already exists"),
                    })
                } else {
                    Err(storage_error(err))
                }
            }
        }
    }

    async fn list_collections(
        &self,
        owner: &OwnerId,
    ) -> Result<Vec<CollectionRecord<I>>, ClientError> {
        let rows = sqlx::query(
            r#"
            SELECT id, owner_id, name, items, created_at
            FROM collections
            WHERE owner_id = ?1
            ORDER BY created_at ASC
            "#,
        )
        .bind(owner.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(storage_error)?;

        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            let id: String = row.get("id");
            let owner_id: String = row.get("owner_id");
            let name: String = row.get("name");
            let payload: String = row.get("items");
            let created_at: String = row.get("created_at");

            let items: Vec<I> = serde_json::from_str(&payload)
                .map_err(|e| ClientError::Storage(format!("corrupt items payload: {e}")))?;
            let created_at = DateTime::parse_from_rfc3339(&created_at)
                .map_err(|e| ClientError::Storage(format!("corrupt timestamp: {e}")))?
                .with_timezone(&Utc);

            records.push(CollectionRecord {
                id: CollectionId::new(id),
                owner: OwnerId::new(owner_id),
                name: NormalizedName::assume_normalized(name),
                items,
                created_at,
            });
        }

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn open_test_store(dir: &tempfile::TempDir) -> SqliteCollectionStore {
        let url = format!("sqlite://{}/collections.db", dir.path().display());
        SqliteCollectionStore::new(&url, true)
            .await
            .expect("test store should open")
    }

    fn name(raw: &str) -> NormalizedName {
        NormalizedName::new(raw).expect("valid name")
    }

    #[tokio::test]
    async fn create_then_exists_and_list() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = open_test_store(&dir).await;
        let owner = OwnerId::new("u1");

        let outcome = store
            .create_collection(&owner, &name("Word Capitals"), &["paris".to_string()])
            .await
            .expect("create");
        assert!(matches!(outcome, CreateOutcome::Created { .. }));

        // The normalized key is what uniqueness is checked against.
        let found = CollectionStore::<String>::exists(&store, &owner, &name("  WORD CAPITALS "))
            .await
            .expect("exists");
        assert!(found);

        let records: Vec<CollectionRecord<String>> =
            store.list_collections(&owner).await.expect("list");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name.as_str(), "word capitals");
        assert_eq!(records[0].items, vec!["paris".to_string()]);
    }

    #[tokio::test]
    async fn duplicate_insert_is_rejected_not_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = open_test_store(&dir).await;
        let owner = OwnerId::new("u1");

        let first = store
            .create_collection(&owner, &name("geography"), &["a".to_string()])
            .await
            .expect("first create");
        assert!(matches!(first, CreateOutcome::Created { .. }));

        let second = store
            .create_collection(&owner, &name("Geography"), &["b".to_string()])
            .await
            .expect("second create resolves");
        assert!(matches!(second, CreateOutcome::Rejected { .. }));
    }

    #[tokio::test]
    async fn uniqueness_is_scoped_per_owner() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = open_test_store(&dir).await;

        let first = store
            .create_collection(&OwnerId::new("u1"), &name("geography"), &["a".to_string()])
            .await
            .expect("create for u1");
        assert!(matches!(first, CreateOutcome::Created { .. }));

        let second = store
            .create_collection(&OwnerId::new("u2"), &name("geography"), &["b".to_string()])
            .await
            .expect("create for u2");
        assert!(matches!(second, CreateOutcome::Created { .. }));
    }
}
