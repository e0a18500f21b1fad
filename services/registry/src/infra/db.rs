use anyhow::{Context as _, bail};
use chrono::Utc;
use sea_orm::{
    ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection, DbBackend, EntityTrait,
    QueryFilter, Statement, TransactionTrait, sea_query::OnConflict,
};
use serde_json::Value;

use campus_registry_schema::documents;

use crate::domain::store::{Document, DocumentStore, Snapshot, WriteBatch};

/// PostgreSQL-backed document store: one `documents` table keyed by
/// `(collection, id)` with a `jsonb` body.
#[derive(Clone)]
pub struct PgDocumentStore {
    pub db: DatabaseConnection,
}

fn document_model(collection: &str, id: &str, data: Document) -> documents::ActiveModel {
    let now = Utc::now();
    documents::ActiveModel {
        collection: Set(collection.to_owned()),
        id: Set(id.to_owned()),
        data: Set(Value::Object(data)),
        created_at: Set(now),
        updated_at: Set(now),
    }
}

fn overwrite_on_conflict() -> OnConflict {
    OnConflict::columns([documents::Column::Collection, documents::Column::Id])
        .update_columns([documents::Column::Data, documents::Column::UpdatedAt])
        .to_owned()
}

fn snapshot_from_model(model: documents::Model) -> anyhow::Result<Snapshot> {
    match model.data {
        Value::Object(data) => Ok(Snapshot { id: model.id, data }),
        _ => bail!(
            "document {}/{} is not a JSON object",
            model.collection,
            model.id
        ),
    }
}

impl DocumentStore for PgDocumentStore {
    async fn get(&self, collection: &str, id: &str) -> anyhow::Result<Option<Document>> {
        let model = documents::Entity::find_by_id((collection.to_owned(), id.to_owned()))
            .one(&self.db)
            .await
            .context("find document by id")?;
        model
            .map(|m| snapshot_from_model(m).map(|s| s.data))
            .transpose()
    }

    async fn set(&self, collection: &str, id: &str, data: Document) -> anyhow::Result<()> {
        documents::Entity::insert(document_model(collection, id, data))
            .on_conflict(overwrite_on_conflict())
            .exec_without_returning(&self.db)
            .await
            .context("upsert document")?;
        Ok(())
    }

    async fn update(&self, collection: &str, id: &str, partial: Document) -> anyhow::Result<()> {
        // `||` on jsonb replaces top-level keys, matching a shallow merge.
        let result = self
            .db
            .execute(Statement::from_sql_and_values(
                DbBackend::Postgres,
                r#"
                UPDATE documents
                SET data = data || $1::jsonb, updated_at = now()
                WHERE collection = $2 AND id = $3
                "#,
                [Value::Object(partial).into(), collection.into(), id.into()],
            ))
            .await
            .context("merge document")?;
        if result.rows_affected() == 0 {
            bail!("no document to update at {collection}/{id}");
        }
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> anyhow::Result<()> {
        documents::Entity::delete_by_id((collection.to_owned(), id.to_owned()))
            .exec(&self.db)
            .await
            .context("delete document")?;
        Ok(())
    }

    async fn list(&self, collection: &str) -> anyhow::Result<Vec<Snapshot>> {
        let models = documents::Entity::find()
            .filter(documents::Column::Collection.eq(collection))
            .all(&self.db)
            .await
            .context("list documents")?;
        models.into_iter().map(snapshot_from_model).collect()
    }

    async fn find_where(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> anyhow::Result<Vec<Snapshot>> {
        // Containment on a single top-level key; served by the GIN index on `data`.
        let mut filter = Document::new();
        filter.insert(field.to_owned(), value.clone());
        let models = documents::Entity::find()
            .from_raw_sql(Statement::from_sql_and_values(
                DbBackend::Postgres,
                r#"
                SELECT * FROM documents
                WHERE collection = $1 AND data @> $2::jsonb
                "#,
                [collection.into(), Value::Object(filter).into()],
            ))
            .all(&self.db)
            .await
            .context("query documents by field")?;
        models.into_iter().map(snapshot_from_model).collect()
    }

    async fn commit(&self, batch: WriteBatch) -> anyhow::Result<()> {
        let writes = batch.into_writes();
        self.db
            .transaction::<_, (), sea_orm::DbErr>(move |txn| {
                Box::pin(async move {
                    for write in writes {
                        documents::Entity::insert(document_model(
                            &write.collection,
                            &write.id,
                            write.data,
                        ))
                        .on_conflict(overwrite_on_conflict())
                        .exec_without_returning(txn)
                        .await?;
                    }
                    Ok(())
                })
            })
            .await
            .context("commit write batch")?;
        Ok(())
    }
}
