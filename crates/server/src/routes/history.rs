//! Activity history handlers.

use axum::{Json, extract::State, http::StatusCode};

use crate::error::Result;
use crate::middleware::auth::ViewHistory;
use crate::middleware::{RequirePermission, RequireSuperAdmin};
use crate::services::history::HistoryEntry;
use crate::state::AppState;

/// Every log entry, newest first.
pub async fn index(
    State(state): State<AppState>,
    RequirePermission(viewer, _): RequirePermission<ViewHistory>,
) -> Result<Json<Vec<HistoryEntry>>> {
    Ok(Json(state.history().entries(&viewer).await?))
}

/// Clear the whole log.
pub async fn clear(
    State(state): State<AppState>,
    RequireSuperAdmin(actor): RequireSuperAdmin,
) -> Result<StatusCode> {
    state.history().clear(&actor).await?;
    Ok(StatusCode::NO_CONTENT)
}
