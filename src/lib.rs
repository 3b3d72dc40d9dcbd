pub mod admin;
pub mod catalog;
pub mod channels;
pub mod error;
pub mod fetch;
pub mod metrics;
pub mod playlists;
pub mod settings;
pub mod store;
pub mod validate;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Json, Response},
    routing::{get, post, put},
    Router,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};

use admin::{PlaylistProbe, PlaylistService};
use catalog::CategoryGroup;
use channels::Channel;
use error::{AdminError, StoreError};
use playlists::Playlist;
use store::{NewPlaylist, PlaylistUpdate, StoredPlaylist};

struct AppState {
    service: PlaylistService,
}

impl IntoResponse for AdminError {
    fn into_response(self) -> Response {
        let status = match &self {
            AdminError::UnacceptableUrl { .. } => StatusCode::BAD_REQUEST,
            AdminError::Store(StoreError::NotFound { .. }) => StatusCode::NOT_FOUND,
            AdminError::Fetch(_) => StatusCode::BAD_GATEWAY,
        };
        warn!("Request failed: status={} err={}", status, self);
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

pub fn create_app(service: PlaylistService) -> Router {
    let state = Arc::new(AppState { service });

    Router::new()
        .route("/api/playlists", get(playlists_handler))
        .route("/api/categories", get(categories_handler))
        .route("/api/categories/sports", get(sports_handler))
        .route("/api/categories/movies", get(movies_handler))
        .route("/api/search", get(search_handler))
        .route("/api/channels/{id}/related", get(related_handler))
        .route("/api/validate", get(validate_handler))
        .route(
            "/api/admin/playlists",
            get(admin_list_handler).post(admin_create_handler),
        )
        .route(
            "/api/admin/playlists/{id}",
            put(admin_update_handler).delete(admin_delete_handler),
        )
        .route("/api/admin/playlists/test", post(admin_test_handler))
        .route("/metrics", get(metrics_handler))
        .fallback(fallback_handler)
        .with_state(state)
}

async fn fallback_handler(method: Method, uri: Uri, headers: HeaderMap) -> impl IntoResponse {
    let user_agent = headers
        .get(axum::http::header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("<none>");
    info!(
        "HTTP 404: method={} uri={} UA=\"{}\"",
        method,
        uri,
        user_agent
    );
    (StatusCode::NOT_FOUND, "Not found")
}

async fn playlists_handler(State(state): State<Arc<AppState>>) -> Json<Vec<Playlist>> {
    Json(state.service.active_playlists().await)
}

async fn categories_handler(State(state): State<Arc<AppState>>) -> Json<Vec<CategoryGroup>> {
    let playlists = state.service.active_playlists().await;
    Json(catalog::group_by_category(&playlists))
}

async fn sports_handler(State(state): State<Arc<AppState>>) -> Json<Vec<Channel>> {
    let playlists = state.service.active_playlists().await;
    Json(catalog::filter_by_keywords(&playlists, catalog::SPORTS))
}

async fn movies_handler(State(state): State<Arc<AppState>>) -> Json<Vec<Channel>> {
    let playlists = state.service.active_playlists().await;
    Json(catalog::filter_by_keywords(&playlists, catalog::MOVIES))
}

#[derive(Deserialize)]
struct SearchParams {
    #[serde(default)]
    q: String,
}

async fn search_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Json<Vec<Channel>> {
    if params.q.trim().is_empty() {
        return Json(Vec::new());
    }
    let playlists = state.service.active_playlists().await;
    Json(catalog::search(&playlists, &params.q, catalog::SEARCH_LIMIT))
}

/// Only meaningful for ids that survive a reload (`tvg-id` or stable ids).
async fn related_handler(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Response {
    let playlists = state.service.active_playlists().await;
    let groups = catalog::group_by_category(&playlists);
    let current = groups
        .iter()
        .flat_map(|g| g.channels.iter())
        .find(|c| c.id == id);
    match current {
        Some(channel) => Json(catalog::related(&groups, channel, catalog::RELATED_LIMIT)).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": format!("channel {id} not found") })),
        )
            .into_response(),
    }
}

#[derive(Deserialize)]
struct UrlParams {
    #[serde(default)]
    url: String,
}

async fn validate_handler(Query(params): Query<UrlParams>) -> Json<serde_json::Value> {
    let acceptable = validate::is_acceptable_playlist_url(&params.url);
    Json(json!({ "url": params.url, "acceptable": acceptable }))
}

async fn admin_list_handler(State(state): State<Arc<AppState>>) -> Json<Vec<StoredPlaylist>> {
    Json(state.service.list_playlists().await)
}

async fn admin_create_handler(
    State(state): State<Arc<AppState>>,
    Json(playlist): Json<NewPlaylist>,
) -> Result<(StatusCode, Json<StoredPlaylist>), AdminError> {
    let stored = state.service.add_playlist(playlist).await?;
    Ok((StatusCode::CREATED, Json(stored)))
}

async fn admin_update_handler(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(update): Json<PlaylistUpdate>,
) -> Result<Json<StoredPlaylist>, AdminError> {
    Ok(Json(state.service.update_playlist(&id, update).await?))
}

async fn admin_delete_handler(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<StatusCode, AdminError> {
    state.service.delete_playlist(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Deserialize)]
struct ProbeRequest {
    url: String,
}

async fn admin_test_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ProbeRequest>,
) -> Json<PlaylistProbe> {
    Json(state.service.test_playlist_url(&request.url).await)
}

async fn metrics_handler() -> Response {
    match metrics::gather_metrics() {
        Ok(text) => (
            [(axum::http::header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            text,
        )
            .into_response(),
        Err(e) => {
            warn!("Failed to encode metrics: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
