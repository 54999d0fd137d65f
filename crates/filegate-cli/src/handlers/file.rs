//! File operation handlers

use crate::{ApiError, AppState};
use axum::{
    extract::{multipart::Field, rejection::QueryRejection, Multipart, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use filegate_core::Container;
use filegate_storage::byte_stream;
use futures::channel::mpsc;
use futures::SinkExt;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Chunks buffered between the multipart reader and the backend
const UPLOAD_CHANNEL_DEPTH: usize = 8;

/// Query parameters of `/file`
#[derive(Debug, Deserialize)]
pub struct FileQuery {
    pub container: Option<String>,
    pub target: Option<String>,
}

#[derive(Serialize)]
struct UriResponse {
    uri: String,
}

#[derive(Serialize)]
struct ChecksumResponse {
    checksum: String,
}

fn parse_container(raw: &str) -> Result<Container, ApiError> {
    raw.parse::<Container>()
        .map_err(|e| ApiError::invalid_request(e.to_string()))
}

fn required<'a>(value: Option<&'a str>, name: &str) -> Result<&'a str, ApiError> {
    value.ok_or_else(|| ApiError::invalid_request(format!("Parameter '{name}' is required")))
}

fn file_query(query: Result<Query<FileQuery>, QueryRejection>) -> Result<FileQuery, ApiError> {
    query
        .map(|Query(query)| query)
        .map_err(|e| ApiError::invalid_request(format!("Malformed query: {}", e.body_text())))
}

/// GET /file - Issue an access URI
pub async fn get_file(
    State(state): State<Arc<AppState>>,
    query: Result<Query<FileQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    let query = file_query(query)?;
    let container = query.container.as_deref().map(parse_container).transpose()?;

    let uri = state
        .gateway
        .retrieve(container, query.target.as_deref())
        .await?;

    Ok((StatusCode::OK, Json(UriResponse { uri: uri.into() })).into_response())
}

/// HEAD /file - Existence check
pub async fn head_file(
    State(state): State<Arc<AppState>>,
    query: Result<Query<FileQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    let query = file_query(query)?;
    let container = parse_container(required(query.container.as_deref(), "container")?)?;
    let target = required(query.target.as_deref(), "target")?;

    state.gateway.exists(container, target).await?;
    Ok(StatusCode::OK.into_response())
}

/// POST /file - Store an uploaded file
///
/// The `container` and `target` fields must come before `file`, which is
/// streamed to the backend as it arrives.
pub async fn store_file(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Response, ApiError> {
    let mut container = None;
    let mut target = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::invalid_request(format!("Malformed multipart body: {}", e.body_text())))?
    {
        let field_name = field.name().unwrap_or("").to_string();

        match field_name.as_str() {
            "container" => {
                let value = field_text(field).await?;
                container = Some(parse_container(value.trim())?);
            }
            "target" => {
                target = Some(field_text(field).await?);
            }
            "file" => {
                let container = container.ok_or_else(|| {
                    ApiError::invalid_request("Field 'container' must precede 'file'")
                })?;
                let target = target.as_deref().ok_or_else(|| {
                    ApiError::invalid_request("Field 'target' must precede 'file'")
                })?;

                let (tx, rx) = mpsc::channel(UPLOAD_CHANNEL_DEPTH);
                let (stored, ()) = tokio::join!(
                    state.gateway.store(container, target, byte_stream(rx)),
                    forward_field(field, tx),
                );
                let checksum = stored?;

                return Ok((
                    StatusCode::CREATED,
                    Json(ChecksumResponse {
                        checksum: checksum.to_hex(),
                    }),
                )
                    .into_response());
            }
            other => {
                tracing::debug!(field = %other, "Ignoring multipart field");
            }
        }
    }

    Err(ApiError::invalid_request("Field 'file' is required"))
}

/// DELETE /file/{container}/{target} - Delete a file
pub async fn delete_file(
    State(state): State<Arc<AppState>>,
    Path((container, target)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    let container = parse_container(&container)?;
    state.gateway.delete(container, &target).await?;
    Ok(StatusCode::OK.into_response())
}

async fn field_text(field: Field<'_>) -> Result<String, ApiError> {
    field
        .text()
        .await
        .map_err(|e| ApiError::invalid_request(format!("Unreadable multipart field: {}", e.body_text())))
}

/// Feed a multipart field into the upload channel until it ends, fails, or
/// the receiving side hangs up
async fn forward_field(mut field: Field<'_>, mut tx: mpsc::Sender<std::io::Result<Bytes>>) {
    loop {
        let item = match field.chunk().await {
            Ok(Some(chunk)) => Ok(chunk),
            Ok(None) => break,
            Err(e) => Err(std::io::Error::other(e.body_text())),
        };

        let failed = item.is_err();
        if tx.send(item).await.is_err() || failed {
            break;
        }
    }
}
