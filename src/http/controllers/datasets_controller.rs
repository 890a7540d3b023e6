use crate::catalog::DatasetRecord;
use crate::http::error::ApiError;
use crate::http::extract::CurrentUser;
use crate::http::models::{ChartParams, UploadResponse, ViewParams, ViewResponse};
use crate::tabular::ChartSpec;
use crate::DeckEngine;
use axum::{
    extract::{Multipart, Path, Query as QueryParams, State},
    Json,
};
use std::sync::Arc;

/// Handler for POST /datasets/upload - Ingest a CSV or Excel file
#[tracing::instrument(
    name = "handler_upload_dataset",
    skip(engine, multipart),
    fields(
        datadeck.owner_id = %user.id,
        datadeck.dataset_id = tracing::field::Empty,
    )
)]
pub async fn upload_dataset_handler(
    State(engine): State<Arc<DeckEngine>>,
    CurrentUser(user): CurrentUser,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut file: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Failed to read multipart field: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field
            .file_name()
            .map(|name| name.to_string())
            .ok_or_else(|| ApiError::bad_request("No filename provided"))?;
        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::bad_request(format!("Failed to read file data: {}", e)))?;
        file = Some((filename, data.to_vec()));
    }

    let (filename, data) =
        file.ok_or_else(|| ApiError::bad_request("No file provided in upload"))?;

    let record = engine.upload_dataset(&user.id, &filename, &data).await?;

    tracing::Span::current().record("datadeck.dataset_id", &record.id);

    Ok(Json(UploadResponse {
        id: record.id,
        message: "Upload successful".to_string(),
    }))
}

/// Handler for GET /datasets - List the caller's datasets
#[tracing::instrument(
    name = "handler_list_datasets",
    skip(engine),
    fields(
        datadeck.owner_id = %user.id,
        datadeck.dataset_count = tracing::field::Empty,
    )
)]
pub async fn list_datasets_handler(
    State(engine): State<Arc<DeckEngine>>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<DatasetRecord>>, ApiError> {
    let datasets = engine.list_datasets(&user.id).await?;

    tracing::Span::current().record("datadeck.dataset_count", datasets.len());

    Ok(Json(datasets))
}

/// Handler for GET /datasets/{id}/view - Page through rows with
/// filtering, sorting, and search
#[tracing::instrument(
    name = "handler_dataset_view",
    skip(engine, params),
    fields(
        datadeck.owner_id = %user.id,
        datadeck.dataset_id = %id,
    )
)]
pub async fn dataset_view_handler(
    State(engine): State<Arc<DeckEngine>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    QueryParams(params): QueryParams<ViewParams>,
) -> Result<Json<ViewResponse>, ApiError> {
    let spec = params.into_query_spec()?;
    let view = engine.dataset_view(&user.id, &id, &spec).await?;

    Ok(Json(ViewResponse {
        data: view.rows,
        total: view.total,
        columns: view.columns,
    }))
}

/// Handler for GET /datasets/{id}/charts - Group-and-count aggregation
#[tracing::instrument(
    name = "handler_dataset_charts",
    skip(engine, params),
    fields(
        datadeck.owner_id = %user.id,
        datadeck.dataset_id = %id,
        datadeck.chart_type = %params.chart_type,
    )
)]
pub async fn dataset_charts_handler(
    State(engine): State<Arc<DeckEngine>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    QueryParams(params): QueryParams<ChartParams>,
) -> Result<Json<Vec<serde_json::Map<String, serde_json::Value>>>, ApiError> {
    let spec = ChartSpec::from(params);
    let data = engine.dataset_chart(&user.id, &id, &spec).await?;

    Ok(Json(data))
}
