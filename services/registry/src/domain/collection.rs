use std::marker::PhantomData;

use anyhow::Context as _;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::domain::store::{Document, DocumentStore, WriteBatch};
use crate::domain::types::{Record, Stored};
use crate::error::RegistryError;

/// Confirmation returned by [`Collection::delete`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Deleted {
    pub id: String,
    pub message: String,
}

/// Typed CRUD repository over one collection of a [`DocumentStore`].
pub struct Collection<S, T> {
    store: S,
    _record: PhantomData<fn() -> T>,
}

impl<S: Clone, T> Clone for Collection<S, T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            _record: PhantomData,
        }
    }
}

/// Field reserved for the document ID in every response body.
const ID_FIELD: &str = "id";

fn to_document<T: Serialize>(record: &T) -> anyhow::Result<Document> {
    match serde_json::to_value(record)? {
        Value::Object(mut map) => {
            map.remove(ID_FIELD);
            Ok(map)
        }
        other => anyhow::bail!("record serialized to a non-object value: {other}"),
    }
}

fn entity_name<T: Record>() -> String {
    T::ENTITY.to_lowercase()
}

impl<S: DocumentStore, T: Record> Collection<S, T> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            _record: PhantomData,
        }
    }

    fn not_found(id: &str) -> RegistryError {
        RegistryError::NotFound {
            entity: T::ENTITY,
            id: id.to_owned(),
        }
    }

    fn decode(id: &str, mut data: Document) -> Result<Stored<T>, RegistryError> {
        data.remove(ID_FIELD);
        let record = serde_json::from_value(Value::Object(data))
            .with_context(|| format!("decode {} {id}", T::ENTITY))?;
        Ok(Stored {
            id: id.to_owned(),
            record,
        })
    }

    async fn load(&self, id: &str) -> Result<Option<Document>, RegistryError> {
        let doc = self
            .store
            .get(T::COLLECTION, id)
            .await
            .with_context(|| format!("get {} {id}", T::ENTITY))?;
        Ok(doc)
    }

    /// Write `record` at `id`, overwriting any existing document.
    pub async fn create(&self, id: &str, record: T) -> Result<Stored<T>, RegistryError> {
        if id.trim().is_empty() {
            return Err(RegistryError::validation(format!(
                "{} is required",
                T::KEY_FIELD
            )));
        }
        let data = to_document(&record).with_context(|| format!("encode {} {id}", T::ENTITY))?;
        self.store
            .set(T::COLLECTION, id, data)
            .await
            .with_context(|| format!("create {} {id}", T::ENTITY))?;
        debug!(collection = T::COLLECTION, id, "document created");
        Ok(Stored {
            id: id.to_owned(),
            record,
        })
    }

    /// Insert every record in one atomic batch, keyed by [`Record::key`].
    ///
    /// All keys are validated before anything is written; the first record
    /// with an empty key fails the whole call.
    pub async fn create_many(&self, records: Vec<T>) -> Result<Vec<Stored<T>>, RegistryError> {
        if let Some((index, record)) = records
            .iter()
            .enumerate()
            .find(|(_, r)| r.key().trim().is_empty())
        {
            let body = serde_json::to_string(record).unwrap_or_default();
            return Err(RegistryError::validation(format!(
                "{} is required for each {}; record {index} is missing it: {body}",
                T::KEY_FIELD,
                entity_name::<T>(),
            )));
        }
        if records.is_empty() {
            return Ok(Vec::new());
        }

        let mut batch = WriteBatch::new();
        for record in &records {
            let data = to_document(record)
                .with_context(|| format!("encode {} {}", T::ENTITY, record.key()))?;
            batch.set(T::COLLECTION, record.key(), data);
        }
        let count = batch.len();
        self.store
            .commit(batch)
            .await
            .with_context(|| format!("create {count} {} records", T::ENTITY))?;
        debug!(collection = T::COLLECTION, count, "batch committed");

        Ok(records
            .into_iter()
            .map(|record| Stored {
                id: record.key().to_owned(),
                record,
            })
            .collect())
    }

    pub async fn find(&self, id: &str) -> Result<Option<Stored<T>>, RegistryError> {
        self.load(id)
            .await?
            .map(|data| Self::decode(id, data))
            .transpose()
    }

    pub async fn get(&self, id: &str) -> Result<Stored<T>, RegistryError> {
        self.find(id).await?.ok_or_else(|| Self::not_found(id))
    }

    /// Full scan of the collection. Order is unspecified.
    pub async fn list(&self) -> Result<Vec<Stored<T>>, RegistryError> {
        let snapshots = self
            .store
            .list(T::COLLECTION)
            .await
            .with_context(|| format!("list {}", T::COLLECTION))?;
        snapshots
            .into_iter()
            .map(|s| Self::decode(&s.id, s.data))
            .collect()
    }

    /// Records whose top-level `field` equals `value`. Order is unspecified.
    pub async fn find_by(
        &self,
        field: &str,
        value: impl Into<Value>,
    ) -> Result<Vec<Stored<T>>, RegistryError> {
        let value = value.into();
        let snapshots = self
            .store
            .find_where(T::COLLECTION, field, &value)
            .await
            .with_context(|| format!("query {} where {field} == {value}", T::COLLECTION))?;
        snapshots
            .into_iter()
            .map(|s| Self::decode(&s.id, s.data))
            .collect()
    }

    /// Merge `partial` into the record at `id` and return the updated record.
    ///
    /// The merged document must still decode as `T`, and the key and immutable
    /// fields must keep their stored values. The fields written back are taken
    /// from the decoded record, so identifiers are stored in normalised form.
    pub async fn update(
        &self,
        id: &str,
        mut partial: Document,
    ) -> Result<Stored<T>, RegistryError> {
        partial.remove(ID_FIELD);
        if partial.is_empty() {
            return Err(RegistryError::validation("no fields to update"));
        }
        let existing = self.load(id).await?.ok_or_else(|| Self::not_found(id))?;

        let mut merged = existing.clone();
        merged.extend(partial.clone());
        let record = match serde_json::from_value::<T>(Value::Object(merged)) {
            Ok(record) => record,
            Err(e) => {
                return Err(RegistryError::validation(format!(
                    "invalid {} update: {e}",
                    entity_name::<T>()
                )));
            }
        };
        let normalised =
            to_document(&record).with_context(|| format!("encode {} {id}", T::ENTITY))?;

        for field in std::iter::once(&T::KEY_FIELD).chain(T::IMMUTABLE_FIELDS) {
            if partial.contains_key(*field) && existing.get(*field) != normalised.get(*field) {
                return Err(RegistryError::validation(format!(
                    "{field} cannot be changed"
                )));
            }
        }

        // Optional fields that serialize to nothing are written as null.
        let patch: Document = partial
            .keys()
            .map(|field| {
                let value = normalised.get(field).cloned().unwrap_or(Value::Null);
                (field.clone(), value)
            })
            .collect();

        self.store
            .update(T::COLLECTION, id, patch)
            .await
            .with_context(|| format!("update {} {id}", T::ENTITY))?;
        debug!(collection = T::COLLECTION, id, "document updated");
        self.get(id).await
    }

    pub async fn delete(&self, id: &str) -> Result<Deleted, RegistryError> {
        if self.load(id).await?.is_none() {
            return Err(Self::not_found(id));
        }
        self.store
            .delete(T::COLLECTION, id)
            .await
            .with_context(|| format!("delete {} {id}", T::ENTITY))?;
        debug!(collection = T::COLLECTION, id, "document deleted");
        Ok(Deleted {
            id: id.to_owned(),
            message: format!("{} with ID {id} deleted successfully.", T::ENTITY),
        })
    }
}
