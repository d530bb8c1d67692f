//! HTTP server.
//!
//! A thin adapter over [`Catalog`]: it parses request fields into typed
//! inputs, calls the catalog, and renders JSON. It is also the only place
//! where error kinds become status codes.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/` | Hello message |
//! | `GET`  | `/health` | Health check (returns version) |
//! | `POST` | `/items` | Add an item (multipart: `name`, `category`, `image`) |
//! | `GET`  | `/items` | List all items |
//! | `GET`  | `/items/{item_id}` | Get one item by identifier |
//! | `GET`  | `/search?keyword=…` | Items whose name contains the keyword |
//! | `GET`  | `/categories` | List categories |
//! | `GET`  | `/categories/{name}/items` | Items in one category |
//! | `GET`  | `/images/{filename}` | Image bytes, or the placeholder if missing |
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "bad_request", "message": "name is required" } }
//! ```
//!
//! Error codes: `bad_request` (400), `not_found` (404), `conflict` (409),
//! `payload_too_large` (413), `internal` (500).

use axum::{
    extract::{multipart::MultipartError, DefaultBodyLimit, Multipart, Path, Query, State},
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::catalog::Catalog;
use crate::config::{Config, ServerConfig};
use crate::db;
use crate::error::{CatalogError, ErrorKind};
use crate::images::ImageStore;
use crate::migrate;
use crate::models::{parse_item_id, Category, Item};
use crate::store::SqliteStore;

/// Shared application state passed to all route handlers via Axum's `State` extractor.
#[derive(Clone)]
struct AppState {
    catalog: Catalog,
}

/// Starts the HTTP server.
///
/// Opens the database once (running the idempotent migrations), prepares
/// the image directory, and serves until Ctrl-C.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let pool = db::connect(config).await?;
    migrate::run_migrations(&pool).await?;

    let images = ImageStore::open(&config.images.dir).await?;
    let catalog = Catalog::new(Arc::new(SqliteStore::new(pool.clone())), images);

    let app = router(catalog, &config.server)?;

    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    tracing::info!(bind = %config.server.bind, "http server started");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    pool.close().await;
    tracing::info!("http server stopped");
    Ok(())
}

/// Build the router for `catalog`.
pub fn router(catalog: Catalog, server: &ServerConfig) -> anyhow::Result<Router> {
    let origin: HeaderValue = server.front_url.parse()?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::HEAD, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    let app = Router::new()
        .route("/", get(handle_hello))
        .route("/health", get(handle_health))
        .route("/items", get(handle_list_items).post(handle_add_item))
        .route("/items/{item_id}", get(handle_get_item))
        .route("/search", get(handle_search))
        .route("/categories", get(handle_list_categories))
        .route("/categories/{name}/items", get(handle_category_items))
        .route("/images/{filename}", get(handle_get_image))
        .layer(DefaultBodyLimit::max(server.max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(AppState { catalog });

    Ok(app)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    /// Machine-readable error code (e.g., `"bad_request"`, `"not_found"`).
    code: String,
    message: String,
}

/// Internal error type that converts into an Axum HTTP response.
#[derive(Debug)]
struct AppError {
    status: StatusCode,
    code: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "bad_request".to_string(),
        message: message.into(),
    }
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        let (status, code) = match err.kind() {
            ErrorKind::Invalid => (StatusCode::BAD_REQUEST, "bad_request"),
            ErrorKind::NotFound => (StatusCode::NOT_FOUND, "not_found"),
            ErrorKind::Conflict => (StatusCode::CONFLICT, "conflict"),
            ErrorKind::StorageFailure => {
                tracing::error!(error = %err, "storage failure");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal")
            }
        };
        AppError {
            status,
            code: code.to_string(),
            message: err.to_string(),
        }
    }
}

fn multipart_error(err: MultipartError) -> AppError {
    let status = err.status();
    let code = if status == StatusCode::PAYLOAD_TOO_LARGE {
        "payload_too_large"
    } else {
        "bad_request"
    };
    AppError {
        status,
        code: code.to_string(),
        message: err.body_text(),
    }
}

// ============ GET / and GET /health ============

#[derive(Serialize)]
struct HelloResponse {
    message: String,
}

async fn handle_hello() -> Json<HelloResponse> {
    Json(HelloResponse {
        message: "Hello, world!".to_string(),
    })
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============ POST /items ============

/// A fully validated add-item request.
#[derive(Debug, PartialEq, Eq)]
struct AddItemRequest {
    name: String,
    category: String,
    image: Vec<u8>,
}

impl AddItemRequest {
    /// Reject on the first missing or empty field, in declaration order.
    fn from_fields(
        name: Option<String>,
        category: Option<String>,
        image: Option<Vec<u8>>,
    ) -> Result<Self, AppError> {
        let name = name
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| bad_request("name is required"))?;
        let category = category
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| bad_request("category is required"))?;
        let image = image
            .filter(|v| !v.is_empty())
            .ok_or_else(|| bad_request("image is required"))?;
        Ok(Self {
            name,
            category,
            image,
        })
    }
}

async fn parse_add_item_request(mut multipart: Multipart) -> Result<AddItemRequest, AppError> {
    let mut name = None;
    let mut category = None;
    let mut image = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let field_name = field.name().map(str::to_string);
        match field_name.as_deref() {
            Some("name") => name = Some(field.text().await.map_err(multipart_error)?),
            Some("category") => category = Some(field.text().await.map_err(multipart_error)?),
            Some("image") => image = Some(field.bytes().await.map_err(multipart_error)?.to_vec()),
            _ => {}
        }
    }

    AddItemRequest::from_fields(name, category, image)
}

#[derive(Serialize)]
struct AddItemResponse {
    message: String,
    item: Item,
}

async fn handle_add_item(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<AddItemResponse>, AppError> {
    let req = parse_add_item_request(multipart).await?;
    let item = state
        .catalog
        .add_item(&req.name, &req.category, &req.image)
        .await?;

    Ok(Json(AddItemResponse {
        message: format!("item received: {}", item.name),
        item,
    }))
}

// ============ GET /items, /items/{item_id}, /search ============

#[derive(Serialize)]
struct ItemsResponse {
    items: Vec<Item>,
}

async fn handle_list_items(State(state): State<AppState>) -> Result<Json<ItemsResponse>, AppError> {
    let items = state.catalog.list_items().await?;
    Ok(Json(ItemsResponse { items }))
}

/// Looks the item up by its stored identifier, never by list position.
async fn handle_get_item(
    State(state): State<AppState>,
    Path(item_id): Path<String>,
) -> Result<Json<Item>, AppError> {
    let id = parse_item_id(&item_id)?;
    let item = state.catalog.get_item(id).await?;
    Ok(Json(item))
}

#[derive(Deserialize)]
struct SearchParams {
    #[serde(default)]
    keyword: Option<String>,
}

async fn handle_search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<ItemsResponse>, AppError> {
    let keyword = params.keyword.unwrap_or_default();
    let items = state.catalog.search_items(&keyword).await?;
    Ok(Json(ItemsResponse { items }))
}

// ============ GET /categories ============

#[derive(Serialize)]
struct CategoriesResponse {
    categories: Vec<Category>,
}

async fn handle_list_categories(
    State(state): State<AppState>,
) -> Result<Json<CategoriesResponse>, AppError> {
    let categories = state.catalog.list_categories().await?;
    Ok(Json(CategoriesResponse { categories }))
}

async fn handle_category_items(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<ItemsResponse>, AppError> {
    let items = state.catalog.list_items_by_category(&name).await?;
    Ok(Json(ItemsResponse { items }))
}

// ============ GET /images/{filename} ============

/// Serves the image, or the placeholder when the file is missing. Invalid
/// names (traversal attempts, wrong extension) are a 400.
async fn handle_get_image(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Response, AppError> {
    let path = match state.catalog.images().resolve_or_placeholder(&filename).await {
        Ok(path) => path,
        Err(e) => {
            tracing::warn!(file = %filename, error = %e, "rejected image request");
            return Err(e.into());
        }
    };

    let bytes = tokio::fs::read(&path).await.map_err(CatalogError::from)?;
    tracing::debug!(path = %path.display(), "returned image");

    Ok((
        [(header::CONTENT_TYPE, HeaderValue::from_static("image/jpeg"))],
        bytes,
    )
        .into_response())
}
