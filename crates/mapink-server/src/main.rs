//! mapink Development Row Store
//!
//! A local stand-in for the hosted row store, speaking the same REST dialect
//! the map client uses.
//!
//! ## Endpoints
//!
//! ```text
//! POST   /rest/v1/{table}                 body: row object or array of rows
//! DELETE /rest/v1/{table}?id=eq.{id}
//! GET    /rest/v1/{table}?select=*&{column}=eq.{value}
//! ```
//!
//! Only the three feature tables exist. Shapes are validated on insert.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use clap::Parser;
use dashmap::DashMap;
use mapink_core::{
    store::{Filter, NewRow, Row},
    LayerKind, Shape,
};
use serde_json::{json, Value};
use std::{
    collections::HashMap,
    net::SocketAddr,
    sync::{
        atomic::{AtomicI64, Ordering},
        Arc,
    },
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "mapink-server", version, about = "Local development row store for mapink")]
struct Args {
    /// Address to listen on.
    #[arg(long, default_value = "0.0.0.0:3030")]
    bind: SocketAddr,
}

/// Request failure reported as a PostgREST-style JSON error.
#[derive(Debug, Clone, PartialEq)]
enum ApiError {
    UnknownTable(String),
    BadRequest(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::UnknownTable(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn message(&self) -> String {
        match self {
            ApiError::UnknownTable(table) => format!("relation \"public.{}\" does not exist", table),
            ApiError::BadRequest(message) => message.clone(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        warn!("{}", self.message());
        (self.status(), Json(json!({ "message": self.message() }))).into_response()
    }
}

/// Shared application state
struct AppState {
    /// Rows per table
    tables: DashMap<LayerKind, Vec<Row>>,
    next_id: AtomicI64,
}

impl AppState {
    fn new() -> Self {
        Self {
            tables: DashMap::new(),
            next_id: AtomicI64::new(1),
        }
    }

    /// Insert rows, all or nothing.
    fn insert(&self, layer: LayerKind, rows: Vec<NewRow>) -> Result<Vec<Row>, ApiError> {
        for row in &rows {
            row.shape
                .parse::<Shape>()
                .map_err(|e| ApiError::BadRequest(format!("invalid geometry {:?}: {}", row.shape, e)))?;
        }
        let stored: Vec<Row> = rows
            .into_iter()
            .map(|row| Row::from_new(self.next_id.fetch_add(1, Ordering::Relaxed), row))
            .collect();
        self.tables.entry(layer).or_default().extend(stored.iter().cloned());
        Ok(stored)
    }

    /// Delete matching rows, returning how many were removed.
    fn delete(&self, layer: LayerKind, filters: &[Filter]) -> usize {
        let Some(mut rows) = self.tables.get_mut(&layer) else {
            return 0;
        };
        let before = rows.len();
        rows.retain(|row| !filters.iter().all(|filter| row.matches(filter)));
        before - rows.len()
    }

    fn select(&self, layer: LayerKind, filters: &[Filter]) -> Vec<Row> {
        self.tables
            .get(&layer)
            .map(|rows| {
                rows.iter()
                    .filter(|row| filters.iter().all(|filter| row.matches(filter)))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }
}

fn layer_for(table: &str) -> Result<LayerKind, ApiError> {
    LayerKind::from_table(table).ok_or_else(|| ApiError::UnknownTable(table.to_string()))
}

/// Parse `column=eq.value` query parameters. `select` is ignored.
fn parse_filters(params: &HashMap<String, String>) -> Result<Vec<Filter>, ApiError> {
    let mut filters = Vec::new();
    for (column, value) in params {
        if column == "select" {
            continue;
        }
        let value = value.strip_prefix("eq.").ok_or_else(|| {
            ApiError::BadRequest(format!("unsupported filter {}={}", column, value))
        })?;
        filters.push(Filter::eq(column.as_str(), value));
    }
    filters.sort_by(|a, b| a.column.cmp(&b.column));
    Ok(filters)
}

/// Accept either a single row object or an array of rows.
fn parse_rows(body: Value) -> Result<Vec<NewRow>, ApiError> {
    let result = match body {
        Value::Array(_) => serde_json::from_value::<Vec<NewRow>>(body),
        other => serde_json::from_value::<NewRow>(other).map(|row| vec![row]),
    };
    result.map_err(|e| ApiError::BadRequest(format!("invalid row: {}", e)))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mapink_server=info,tower_http=info".into()),
        )
        .init();

    let args = Args::parse();
    let state = Arc::new(AppState::new());

    let app = Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route(
            "/rest/v1/{table}",
            post(insert_rows).get(select_rows).delete(delete_rows),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    info!("mapink row store listening on {}", args.bind);
    info!("REST endpoint: http://{}/rest/v1/{{table}}", args.bind);

    let listener = tokio::net::TcpListener::bind(args.bind).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

/// Index page
async fn index() -> &'static str {
    "mapink row store - REST endpoints under /rest/v1/{table}"
}

/// Health check
async fn health() -> &'static str {
    "ok"
}

async fn insert_rows(
    State(state): State<Arc<AppState>>,
    Path(table): Path<String>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<Vec<Row>>), ApiError> {
    let layer = layer_for(&table)?;
    let rows = parse_rows(body)?;
    let stored = state.insert(layer, rows)?;
    info!("Inserted {} row(s) into {}", stored.len(), table);
    Ok((StatusCode::CREATED, Json(stored)))
}

async fn delete_rows(
    State(state): State<Arc<AppState>>,
    Path(table): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<StatusCode, ApiError> {
    let layer = layer_for(&table)?;
    let filters = parse_filters(&params)?;
    if filters.is_empty() {
        return Err(ApiError::BadRequest("DELETE requires a filter".to_string()));
    }
    let removed = state.delete(layer, &filters);
    info!("Deleted {} row(s) from {}", removed, table);
    Ok(StatusCode::NO_CONTENT)
}

async fn select_rows(
    State(state): State<Arc<AppState>>,
    Path(table): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Vec<Row>>, ApiError> {
    let layer = layer_for(&table)?;
    let filters = parse_filters(&params)?;
    Ok(Json(state.select(layer, &filters)))
}
