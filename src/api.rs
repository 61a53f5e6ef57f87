// 🌐 HTTP API - read-only tree views and move validation over a snapshot
//
// Every request rebuilds the tree from the shared snapshot; nothing here
// mutates state.

use crate::config::TreeConfig;
use crate::filter::{filter_tree, FilterQuery};
use crate::key::RecordId;
use crate::mutation::{MoveRequest, TreeMutator};
use crate::pipeline::{build_tree, compute_totals};
use crate::snapshot::SourceSnapshot;
use crate::tree::{NodeKind, TreeNode};
use crate::warnings::Warnings;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub snapshot: Arc<SourceSnapshot>,
    pub config: Arc<TreeConfig>,
}

impl AppState {
    pub fn new(snapshot: SourceSnapshot, config: TreeConfig) -> Self {
        AppState {
            snapshot: Arc::new(snapshot),
            config: Arc::new(config),
        }
    }
}

/// API Response wrapper
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
            error: None,
        }
    }

    fn failed(data: T, error: String) -> Self {
        Self {
            success: false,
            data,
            error: Some(error),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct TreeParams {
    /// Case-insensitive name search
    pub search: Option<String>,
    /// Comma-separated visible ids; wins over `search`
    pub visible: Option<String>,
}

impl TreeParams {
    fn to_query(&self) -> FilterQuery {
        match self.visible.as_deref().filter(|v| !v.trim().is_empty()) {
            Some(visible) => FilterQuery::visible_from_csv(visible),
            None => FilterQuery {
                search_term: self.search.clone(),
                visible_ids: Vec::new(),
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TreeResponse {
    pub roots: Vec<TreeNode>,
    pub warnings: Warnings,
}

#[derive(Debug, Serialize)]
pub struct NodeResponse {
    pub node: TreeNode,
    /// Names from the root down to the node
    pub path: Vec<String>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/tree", get(get_tree))
        .route("/api/totals", get(get_totals))
        .route("/api/nodes/:kind/:id", get(get_node))
        .route("/api/moves/validate", post(validate_move))
        .with_state(state)
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// GET /api/tree?search=..&visible=.. - Filtered tree view
async fn get_tree(State(state): State<AppState>, Query(params): Query<TreeParams>) -> impl IntoResponse {
    let build = build_tree(&state.snapshot, &state.config);
    let roots = filter_tree(&build.roots, &params.to_query());
    debug!(roots = roots.len(), "served tree view");

    Json(ApiResponse::ok(TreeResponse {
        roots,
        warnings: build.warnings,
    }))
}

/// GET /api/totals - Recursive totals per category
async fn get_totals(State(state): State<AppState>) -> impl IntoResponse {
    Json(ApiResponse::ok(compute_totals(&state.snapshot)))
}

/// GET /api/nodes/:kind/:id - One node and its ancestry
async fn get_node(State(state): State<AppState>, Path((kind, id)): Path<(String, String)>) -> Response {
    let kind: NodeKind = match kind.parse() {
        Ok(kind) => kind,
        Err(e) => {
            return (StatusCode::BAD_REQUEST, Json(ApiResponse::failed(None::<NodeResponse>, e)))
                .into_response()
        }
    };

    let build = build_tree(&state.snapshot, &state.config);
    let nav = build.navigator();
    let id = RecordId::from(id);

    match (nav.find_node(&id, Some(kind)), nav.path_to(&id, kind)) {
        (Some(node), Some(path)) => Json(ApiResponse::ok(Some(NodeResponse {
            node: node.clone(),
            path,
        })))
        .into_response(),
        _ => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::failed(
                None::<NodeResponse>,
                format!("{} {} not found", kind, id),
            )),
        )
            .into_response(),
    }
}

/// POST /api/moves/validate - Check a drag-and-drop move
async fn validate_move(State(state): State<AppState>, Json(request): Json<MoveRequest>) -> Response {
    let build = build_tree(&state.snapshot, &state.config);

    match TreeMutator::new(&build.roots).validate(&request) {
        Ok(verdict) => Json(ApiResponse::ok(serde_json::json!(verdict))).into_response(),
        Err(e) => {
            warn!(error = %e, "rejected move");
            let message = e.to_string();
            (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(ApiResponse::failed(serde_json::json!(e), message)),
            )
                .into_response()
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
