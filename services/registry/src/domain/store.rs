#![allow(async_fn_in_trait)]

use serde_json::{Map, Value};

/// A schemaless document body: top-level field name to JSON value.
pub type Document = Map<String, Value>;

/// A document read back from a collection together with its ID.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub id: String,
    pub data: Document,
}

/// A single `set` queued in a [`WriteBatch`].
#[derive(Debug, Clone, PartialEq)]
pub struct BatchWrite {
    pub collection: String,
    pub id: String,
    pub data: Document,
}

/// Accumulates `set` writes that are committed as one unit.
#[derive(Debug, Clone, Default)]
pub struct WriteBatch {
    writes: Vec<BatchWrite>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, collection: &str, id: &str, data: Document) -> &mut Self {
        self.writes.push(BatchWrite {
            collection: collection.to_owned(),
            id: id.to_owned(),
            data,
        });
        self
    }

    pub fn len(&self) -> usize {
        self.writes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    pub fn into_writes(self) -> Vec<BatchWrite> {
        self.writes
    }
}

/// Document database addressed by collection name + document ID.
///
/// This is the only persistence interface the registry uses. Implementations
/// are injected into every repository; there is no process-wide handle.
/// Errors are returned as `anyhow::Error` and gain entity/ID context at the
/// repository boundary.
pub trait DocumentStore: Send + Sync {
    async fn get(&self, collection: &str, id: &str) -> anyhow::Result<Option<Document>>;

    /// Create or overwrite the document at `id`.
    async fn set(&self, collection: &str, id: &str, data: Document) -> anyhow::Result<()>;

    /// Shallow-merge `partial` into an existing document. Fails if the document is absent.
    async fn update(&self, collection: &str, id: &str, partial: Document) -> anyhow::Result<()>;

    /// Remove the document. Removing an absent document is not an error.
    async fn delete(&self, collection: &str, id: &str) -> anyhow::Result<()>;

    /// Full scan. Order is unspecified.
    async fn list(&self, collection: &str) -> anyhow::Result<Vec<Snapshot>>;

    /// Documents whose top-level `field` equals `value`. Order is unspecified.
    async fn find_where(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> anyhow::Result<Vec<Snapshot>>;

    /// Apply every write in the batch, or none of them.
    async fn commit(&self, batch: WriteBatch) -> anyhow::Result<()>;
}
