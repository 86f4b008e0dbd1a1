use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Query, State};
use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::any;
use axum::{Json, Router};
use serde::Deserialize;
use tower_http::cors::{Any, CorsLayer};

use materials_core::catalog::{self, Material};
use materials_core::config::EndpointContract;

/// How long browsers may cache the preflight answer.
const PREFLIGHT_MAX_AGE: Duration = Duration::from_secs(86400);

// ---------------------------------------------------------------------------
// Shared application state
// ---------------------------------------------------------------------------

pub struct AppState {
    pub contract: EndpointContract,
    /// Where PDFs are read from under the binary contract.
    pub materials_dir: PathBuf,
}

impl AppState {
    pub fn new(contract: EndpointContract, materials_dir: PathBuf) -> Arc<Self> {
        Arc::new(Self {
            contract,
            materials_dir,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct MaterialQuery {
    #[serde(default)]
    pub id: Option<String>,
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
        .allow_origin(Any)
        .max_age(PREFLIGHT_MAX_AGE);

    Router::new()
        .route("/", any(material_handler))
        .route("/download", any(material_handler))
        .layer(cors)
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET    → catalog listing, material metadata or the material file
/// OPTIONS → empty 200 with CORS headers
/// other  → 405, HEAD included
async fn material_handler(
    State(state): State<Arc<AppState>>,
    method: Method,
    Query(query): Query<MaterialQuery>,
) -> Response {
    if method == Method::OPTIONS {
        return preflight();
    }
    if method != Method::GET {
        log::debug!("[materials] {} rejected", method);
        return json_error(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed");
    }

    let id = query.id.unwrap_or_default();
    if id.is_empty() {
        log::debug!("[materials] GET listing");
        return Json(catalog::listing()).into_response();
    }

    let Some(material) = catalog::find(&id) else {
        log::info!("[materials] GET id=\"{}\" not found", id);
        return json_error(StatusCode::NOT_FOUND, "Material not found");
    };

    log::info!("[materials] GET id=\"{}\" contract={}", id, state.contract);
    match state.contract {
        EndpointContract::Metadata => Json(material.metadata()).into_response(),
        EndpointContract::Binary => serve_file(&state, material).await,
    }
}

fn preflight() -> Response {
    (
        StatusCode::OK,
        [
            (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
            (header::ACCESS_CONTROL_ALLOW_METHODS, "GET, OPTIONS"),
            (header::ACCESS_CONTROL_ALLOW_HEADERS, "Content-Type"),
            (header::ACCESS_CONTROL_MAX_AGE, "86400"),
        ],
    )
        .into_response()
}

async fn serve_file(state: &AppState, material: &Material) -> Response {
    let path = state.materials_dir.join(material.filename);
    match tokio::fs::read(&path).await {
        Ok(bytes) => {
            let disposition = HeaderValue::from_str(&format!(
                "attachment; filename=\"{}\"",
                material.filename
            ))
            .unwrap_or_else(|_| HeaderValue::from_static("attachment"));
            (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, HeaderValue::from_static("application/pdf")),
                    (header::CONTENT_DISPOSITION, disposition),
                ],
                bytes,
            )
                .into_response()
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            log::warn!("[materials] file missing for id=\"{}\": {:?}", material.id, path);
            json_error(StatusCode::NOT_FOUND, "Material file not found")
        }
        Err(e) => {
            log::error!("[materials] reading {:?} failed: {}", path, e);
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "Internal error")
        }
    }
}

fn json_error(status: StatusCode, message: &str) -> Response {
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}
