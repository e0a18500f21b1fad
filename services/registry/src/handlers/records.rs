use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};

use crate::domain::store::Document;
use crate::domain::types::Record;
use crate::error::RegistryError;
use crate::state::AppState;

/// Pull the items out of a `{"<collection>": [...]}` batch body, if it is one.
fn batch_items(body: &mut Value, key: &str) -> Option<Vec<Value>> {
    match body.as_object_mut()?.get_mut(key)? {
        Value::Array(items) => Some(std::mem::take(items)),
        _ => None,
    }
}

fn parse_record<T: Record>(value: Value) -> Result<T, RegistryError> {
    serde_json::from_value(value).map_err(|e| {
        RegistryError::validation(format!("invalid {}: {e}", T::ENTITY.to_lowercase()))
    })
}

// ── GET /api/{collection} ────────────────────────────────────────────────────

pub async fn list_records<T: Record>(
    State(state): State<AppState>,
) -> Result<Response, RegistryError> {
    let records = state.collection::<T>().list().await?;
    Ok(Json(records).into_response())
}

// ── GET /api/{collection}/{id} ───────────────────────────────────────────────

pub async fn get_record<T: Record>(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, RegistryError> {
    let record = state.collection::<T>().get(&id).await?;
    Ok(Json(record).into_response())
}

// ── POST /api/{collection} ───────────────────────────────────────────────────

/// Creates one record, or many when the body is `{"<collection>": [...]}`.
pub async fn create_record<T: Record>(
    State(state): State<AppState>,
    Json(mut body): Json<Value>,
) -> Result<Response, RegistryError> {
    let collection = state.collection::<T>();

    if let Some(items) = batch_items(&mut body, T::COLLECTION) {
        let records = items
            .into_iter()
            .enumerate()
            .map(|(index, item)| {
                serde_json::from_value::<T>(item).map_err(|e| {
                    RegistryError::validation(format!(
                        "invalid {} at index {index}: {e}",
                        T::ENTITY.to_lowercase()
                    ))
                })
            })
            .collect::<Result<Vec<T>, _>>()?;
        let created = collection.create_many(records).await?;
        return Ok((StatusCode::CREATED, Json(created)).into_response());
    }

    let record = parse_record::<T>(body)?;
    let id = record.key().to_owned();
    let created = collection.create(&id, record).await?;
    Ok((StatusCode::CREATED, Json(created)).into_response())
}

// ── PUT /api/{collection}/{id} ───────────────────────────────────────────────

pub async fn update_record<T: Record>(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(partial): Json<Document>,
) -> Result<Response, RegistryError> {
    let updated = state.collection::<T>().update(&id, partial).await?;
    Ok(Json(updated).into_response())
}

// ── DELETE /api/{collection}/{id} ────────────────────────────────────────────

pub async fn delete_record<T: Record>(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, RegistryError> {
    let deleted = state.collection::<T>().delete(&id).await?;
    Ok(Json(json!({ "message": deleted.message })).into_response())
}
