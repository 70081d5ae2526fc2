//! HTTP 路由
//!
//! DXF 解析与序列化是 CPU 密集操作，统一放到 `spawn_blocking` 中执行。

use crate::error::ApiError;
use crate::fetch::normalize_remote_url;
use crate::state::SharedState;
use crate::store::{FileOrigin, StoredFile};
use axum::body::Bytes;
use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::JsonRejection;
use axum::extract::{DefaultBodyLimit, Multipart, Path, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use dxfilter_core::layer::LayerSummary;
use dxfilter_core::units::ReportUnit;
use dxfilter_file::report::LayerReport;
use dxfilter_file::{DrawingDocument, ExtrusionRequest, FileError, SolidGeometry, ViewerEntity};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::info;
use uuid::Uuid;

const INDEX_HTML: &str = include_str!("../assets/index.html");

/// 构建路由
pub fn router(state: SharedState) -> Router {
    let body_limit = state.config.max_upload_bytes;
    Router::new()
        .route("/", get(index))
        .route("/favicon.ico", get(favicon))
        .route("/healthz", get(healthz))
        .route("/api/upload", post(upload))
        .route("/api/upload-from-github", post(upload_from_url))
        .route("/api/upload-from-url", post(upload_from_url))
        .route("/api/filter-layers", post(filter_layers))
        .route("/api/download/{file_id}", get(download))
        .route("/api/cleanup/{file_id}", delete(cleanup))
        .route("/api/get-entities", post(get_entities))
        .route("/api/generate-3d-geometry", post(generate_geometry))
        .route("/api/generate-report", post(generate_report))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(DefaultBodyLimit::max(body_limit)),
        )
        .with_state(state)
}

/// 在阻塞线程池中执行文件操作
async fn blocking<T, F>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, FileError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?
        .map_err(ApiError::from)
}

/// 按 id 查找文件，格式错误的 id 也视为不存在
async fn stored_file(state: &SharedState, file_id: &str) -> Result<StoredFile, ApiError> {
    let id = Uuid::parse_str(file_id).map_err(|_| ApiError::NotFound)?;
    state.store.get(&id).await.ok_or(ApiError::NotFound)
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn favicon() -> StatusCode {
    StatusCode::NO_CONTENT
}

async fn healthz(State(state): State<SharedState>) -> Json<Value> {
    let stored_files = state.store.len().await;
    Json(json!({ "status": "ok", "stored_files": stored_files }))
}

#[derive(Debug, Serialize)]
struct UploadResponse {
    status: &'static str,
    file_id: Uuid,
    layers: Vec<LayerSummary>,
    layer_count: usize,
}

/// 解析、列出图层并保存
async fn register(
    state: &SharedState,
    name: String,
    origin: FileOrigin,
    bytes: Bytes,
) -> Result<Json<UploadResponse>, ApiError> {
    let parse = bytes.clone();
    let layers = blocking(move || DrawingDocument::from_bytes(&parse).map(|doc| doc.layers())).await?;
    let file_id = state.store.insert(name.clone(), origin, bytes).await;
    info!(%file_id, file = %name, ?origin, layers = layers.len(), "drawing stored");

    Ok(Json(UploadResponse {
        status: "success",
        file_id,
        layer_count: layers.len(),
        layers,
    }))
}

async fn upload(
    State(state): State<SharedState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut multipart = multipart?;
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }
        let name = field.file_name().unwrap_or("upload.dxf").to_string();
        let bytes = field.bytes().await?;
        info!(file = %name, size = bytes.len(), "file uploaded");
        return register(&state, name, FileOrigin::Upload, bytes).await;
    }
    Err(ApiError::BadRequest("Missing form field 'file'".to_string()))
}

#[derive(Debug, Deserialize)]
struct RemoteRequest {
    #[serde(default, alias = "url")]
    github_url: Option<String>,
}

async fn upload_from_url(
    State(state): State<SharedState>,
    payload: Result<Json<RemoteRequest>, JsonRejection>,
) -> Result<Json<UploadResponse>, ApiError> {
    let Json(request) = payload?;
    let raw = request
        .github_url
        .ok_or_else(|| ApiError::BadRequest("URL not specified".to_string()))?;
    let url = normalize_remote_url(&raw)?;
    info!(%url, "downloading remote drawing");

    let remote = state.remote.fetch(&url).await?;
    register(&state, remote.name, FileOrigin::Remote, remote.bytes).await
}

#[derive(Debug, Deserialize)]
struct LayerSelection {
    file_id: String,
    #[serde(default)]
    selected_layers: Vec<String>,
}

async fn filter_layers(
    State(state): State<SharedState>,
    payload: Result<Json<LayerSelection>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(request) = payload?;
    let source = stored_file(&state, &request.file_id).await?;
    if request.selected_layers.is_empty() {
        return Err(FileError::EmptySelection.into());
    }

    let selected = request.selected_layers;
    let outcome = blocking(move || DrawingDocument::from_bytes(&source.bytes)?.filter(&selected)).await?;
    let message = outcome.message();
    let file_id = state
        .store
        .insert("filtered.dxf", FileOrigin::Filtered, Bytes::from(outcome.bytes))
        .await;
    info!(%file_id, source = %request.file_id, "{message}");

    Ok(Json(json!({
        "status": "success",
        "file_id": file_id,
        "message": message,
    })))
}

async fn download(
    State(state): State<SharedState>,
    Path(file_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let file = stored_file(&state, &file_id).await?;
    let id = file.id.to_string();
    let disposition = format!("attachment; filename=\"filtered_{}.dxf\"", &id[..8]);
    Ok((
        [
            (header::CONTENT_TYPE, "application/octet-stream".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        file.bytes,
    ))
}

async fn cleanup(State(state): State<SharedState>, Path(file_id): Path<String>) -> Json<Value> {
    if let Ok(id) = Uuid::parse_str(&file_id) {
        if state.store.remove(&id).await {
            info!(%id, "file removed");
        }
    }
    Json(json!({ "status": "success" }))
}

#[derive(Debug, Serialize)]
struct EntitiesResponse {
    status: &'static str,
    count: usize,
    entities: Vec<ViewerEntity>,
}

async fn get_entities(
    State(state): State<SharedState>,
    payload: Result<Json<LayerSelection>, JsonRejection>,
) -> Result<Json<EntitiesResponse>, ApiError> {
    let Json(request) = payload?;
    let file = stored_file(&state, &request.file_id).await?;
    let selected = request.selected_layers;
    let entities = blocking(move || {
        DrawingDocument::from_bytes(&file.bytes).map(|doc| doc.viewer_entities(&selected))
    })
    .await?;

    Ok(Json(EntitiesResponse {
        status: "success",
        count: entities.len(),
        entities,
    }))
}

#[derive(Debug, Deserialize)]
struct GeometryRequest {
    file_id: String,
    #[serde(default)]
    extrusions: Vec<ExtrusionRequest>,
}

#[derive(Debug, Serialize)]
struct GeometryResponse {
    status: &'static str,
    count: usize,
    geometries: Vec<SolidGeometry>,
}

async fn generate_geometry(
    State(state): State<SharedState>,
    payload: Result<Json<GeometryRequest>, JsonRejection>,
) -> Result<Json<GeometryResponse>, ApiError> {
    let Json(request) = payload?;
    let file = stored_file(&state, &request.file_id).await?;
    let extrusions = request.extrusions;
    let geometries = blocking(move || {
        DrawingDocument::from_bytes(&file.bytes).map(|doc| doc.solids(&extrusions))
    })
    .await?;
    info!(file_id = %request.file_id, solids = geometries.len(), "3D geometry generated");

    Ok(Json(GeometryResponse {
        status: "success",
        count: geometries.len(),
        geometries,
    }))
}

#[derive(Debug, Deserialize)]
struct ReportRequest {
    file_id: String,
    #[serde(default)]
    selected_layers: Vec<String>,
    #[serde(default)]
    unit: Option<String>,
}

#[derive(Debug, Serialize)]
struct ReportResponse {
    status: &'static str,
    report: Vec<LayerReport>,
    unit: ReportUnit,
}

async fn generate_report(
    State(state): State<SharedState>,
    payload: Result<Json<ReportRequest>, JsonRejection>,
) -> Result<Json<ReportResponse>, ApiError> {
    let Json(request) = payload?;
    let file = stored_file(&state, &request.file_id).await?;
    let unit = request
        .unit
        .as_deref()
        .map(ReportUnit::parse_lenient)
        .unwrap_or_default();
    let selected = request.selected_layers;
    let report = blocking(move || DrawingDocument::from_bytes(&file.bytes)?.report(&selected, unit)).await?;

    Ok(Json(ReportResponse {
        status: "success",
        report,
        unit,
    }))
}
