use anyhow::Context as _;
use sea_orm::Database;
use serde_json::Value;
use tracing::{info, warn};

use crate::config::{RegistryConfig, StoreKind};
use crate::domain::store::{Document, DocumentStore, Snapshot, WriteBatch};
use crate::infra::db::PgDocumentStore;
use crate::infra::memory::MemoryDocumentStore;

/// The document store selected by `STORE_BACKEND`.
#[derive(Clone)]
pub enum StoreBackend {
    Postgres(PgDocumentStore),
    Memory(MemoryDocumentStore),
}

impl StoreBackend {
    pub async fn connect(config: &RegistryConfig) -> anyhow::Result<Self> {
        match config.store_backend {
            StoreKind::Postgres => {
                let url = config
                    .database_url
                    .as_deref()
                    .context("DATABASE_URL is required when STORE_BACKEND=postgres")?;
                let db = Database::connect(url)
                    .await
                    .context("failed to connect to database")?;
                info!("using postgres document store");
                Ok(Self::Postgres(PgDocumentStore { db }))
            }
            StoreKind::Memory => {
                warn!("using in-memory document store; data is lost on restart");
                Ok(Self::Memory(MemoryDocumentStore::new()))
            }
        }
    }
}

impl DocumentStore for StoreBackend {
    async fn get(&self, collection: &str, id: &str) -> anyhow::Result<Option<Document>> {
        match self {
            Self::Postgres(store) => store.get(collection, id).await,
            Self::Memory(store) => store.get(collection, id).await,
        }
    }

    async fn set(&self, collection: &str, id: &str, data: Document) -> anyhow::Result<()> {
        match self {
            Self::Postgres(store) => store.set(collection, id, data).await,
            Self::Memory(store) => store.set(collection, id, data).await,
        }
    }

    async fn update(&self, collection: &str, id: &str, partial: Document) -> anyhow::Result<()> {
        match self {
            Self::Postgres(store) => store.update(collection, id, partial).await,
            Self::Memory(store) => store.update(collection, id, partial).await,
        }
    }

    async fn delete(&self, collection: &str, id: &str) -> anyhow::Result<()> {
        match self {
            Self::Postgres(store) => store.delete(collection, id).await,
            Self::Memory(store) => store.delete(collection, id).await,
        }
    }

    async fn list(&self, collection: &str) -> anyhow::Result<Vec<Snapshot>> {
        match self {
            Self::Postgres(store) => store.list(collection).await,
            Self::Memory(store) => store.list(collection).await,
        }
    }

    async fn find_where(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> anyhow::Result<Vec<Snapshot>> {
        match self {
            Self::Postgres(store) => store.find_where(collection, field, value).await,
            Self::Memory(store) => store.find_where(collection, field, value).await,
        }
    }

    async fn commit(&self, batch: WriteBatch) -> anyhow::Result<()> {
        match self {
            Self::Postgres(store) => store.commit(batch).await,
            Self::Memory(store) => store.commit(batch).await,
        }
    }
}
