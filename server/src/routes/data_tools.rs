//! Backup and restore endpoint routes.

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};

use crate::db::PgStore;
use crate::error::Result;
use crate::handlers::{
    handle_backup, handle_list_doctypes, handle_list_modules, handle_restore, BackupRequest,
    BackupResponse, CatalogResponse, RestoreRequest, RestoreResponse,
};
use crate::AppState;

/// Create backup/restore routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/doctypes", get(list_doctypes))
        .route("/modules", get(list_modules))
        .route("/backup", post(backup))
        .route("/restore", post(restore))
}

/// GET /doctypes - Selectable record types grouped by module.
async fn list_doctypes(State(state): State<AppState>) -> Result<Json<CatalogResponse>> {
    let store = PgStore::new(state.pool.clone());
    let response = handle_list_doctypes(&store).await?;
    Ok(Json(response))
}

/// GET /modules - Sorted distinct module names.
async fn list_modules(State(state): State<AppState>) -> Result<Json<Vec<String>>> {
    let store = PgStore::new(state.pool.clone());
    let response = handle_list_modules(&store).await?;
    Ok(Json(response))
}

/// POST /backup - Build an archive of the selected record types.
async fn backup(
    State(state): State<AppState>,
    Json(request): Json<BackupRequest>,
) -> Result<Json<BackupResponse>> {
    let store = PgStore::new(state.pool.clone());
    let response = handle_backup(&store, &state.config.site_name, request).await?;
    Ok(Json(response))
}

/// POST /restore - Restore an uploaded archive.
///
/// Always responds 200 with a structured body; failures are carried in
/// the `success` flag rather than the status code.
async fn restore(
    State(state): State<AppState>,
    Json(request): Json<RestoreRequest>,
) -> Json<RestoreResponse> {
    let store = PgStore::new(state.pool.clone());
    Json(handle_restore(&store, request).await)
}
