use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use anyhow::anyhow;
use serde_json::Value;

use crate::domain::store::{Document, DocumentStore, Snapshot, WriteBatch};

type Collections = HashMap<String, BTreeMap<String, Document>>;

/// In-process document store for local development and tests.
///
/// Cloning shares the underlying data.
#[derive(Clone, Default)]
pub struct MemoryDocumentStore {
    collections: Arc<RwLock<Collections>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> anyhow::Result<RwLockReadGuard<'_, Collections>> {
        self.collections
            .read()
            .map_err(|_| anyhow!("memory store lock poisoned"))
    }

    fn write(&self) -> anyhow::Result<RwLockWriteGuard<'_, Collections>> {
        self.collections
            .write()
            .map_err(|_| anyhow!("memory store lock poisoned"))
    }

    fn snapshots<'a>(
        docs: impl Iterator<Item = (&'a String, &'a Document)>,
    ) -> Vec<Snapshot> {
        docs.map(|(id, data)| Snapshot {
            id: id.clone(),
            data: data.clone(),
        })
        .collect()
    }
}

impl DocumentStore for MemoryDocumentStore {
    async fn get(&self, collection: &str, id: &str) -> anyhow::Result<Option<Document>> {
        Ok(self
            .read()?
            .get(collection)
            .and_then(|docs| docs.get(id))
            .cloned())
    }

    async fn set(&self, collection: &str, id: &str, data: Document) -> anyhow::Result<()> {
        self.write()?
            .entry(collection.to_owned())
            .or_default()
            .insert(id.to_owned(), data);
        Ok(())
    }

    async fn update(&self, collection: &str, id: &str, partial: Document) -> anyhow::Result<()> {
        let mut collections = self.write()?;
        let doc = collections
            .get_mut(collection)
            .and_then(|docs| docs.get_mut(id))
            .ok_or_else(|| anyhow!("no document to update at {collection}/{id}"))?;
        doc.extend(partial);
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> anyhow::Result<()> {
        if let Some(docs) = self.write()?.get_mut(collection) {
            docs.remove(id);
        }
        Ok(())
    }

    async fn list(&self, collection: &str) -> anyhow::Result<Vec<Snapshot>> {
        Ok(self
            .read()?
            .get(collection)
            .map(|docs| Self::snapshots(docs.iter()))
            .unwrap_or_default())
    }

    async fn find_where(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> anyhow::Result<Vec<Snapshot>> {
        Ok(self
            .read()?
            .get(collection)
            .map(|docs| {
                Self::snapshots(docs.iter().filter(|(_, doc)| doc.get(field) == Some(value)))
            })
            .unwrap_or_default())
    }

    async fn commit(&self, batch: WriteBatch) -> anyhow::Result<()> {
        let mut collections = self.write()?;
        for write in batch.into_writes() {
            collections
                .entry(write.collection)
                .or_default()
                .insert(write.id, write.data);
        }
        Ok(())
    }
}
