//! Inventory handlers.

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Serialize;

use crate::error::Result;
use crate::middleware::auth::{EditInventory, ViewInventory};
use crate::middleware::{RequireAuth, RequirePermission};
use crate::services::inventory::{InventoryChange, InventoryQuery, ProductInput, ProductView};
use crate::state::AppState;

/// Result of an inventory save.
#[derive(Debug, Serialize)]
pub struct SaveResponse {
    pub changes: Vec<InventoryChange>,
    pub products: Vec<ProductView>,
}

/// List products, optionally sorted and filtered.
pub async fn index(
    State(state): State<AppState>,
    _gate: RequirePermission<ViewInventory>,
    Query(query): Query<InventoryQuery>,
) -> Result<Json<Vec<ProductView>>> {
    Ok(Json(state.inventory().list(&query).await?))
}

/// Replace the inventory with the submitted rows.
pub async fn save(
    State(state): State<AppState>,
    RequirePermission(editor, _): RequirePermission<EditInventory>,
    Json(input): Json<Vec<ProductInput>>,
) -> Result<Json<SaveResponse>> {
    let service = state.inventory();
    let changes = service.save(input, &editor, state.now()).await?;
    let products = service.list(&InventoryQuery::default()).await?;
    Ok(Json(SaveResponse { changes, products }))
}

/// Out-of-stock and low-stock products.
pub async fn alerts(
    State(state): State<AppState>,
    _account: RequireAuth,
) -> Result<Json<Vec<ProductView>>> {
    Ok(Json(state.inventory().stock_alerts().await?))
}
