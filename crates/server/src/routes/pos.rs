//! Point-of-sale handlers.
//!
//! The cart lives in the session under [`session_keys::CART`] and is
//! dropped on logout.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::middleware::RequirePermission;
use crate::middleware::auth::ViewTransaction;
use crate::models::{Cart, Receipt, session_keys};
use crate::services::CheckoutService;
use crate::services::checkout::RecentTransaction;
use crate::services::inventory::ProductView;
use crate::state::AppState;

async fn load_cart(session: &Session) -> Result<Cart> {
    Ok(session
        .get::<Cart>(session_keys::CART)
        .await?
        .unwrap_or_default())
}

async fn store_cart(session: &Session, cart: &Cart) -> Result<()> {
    session.insert(session_keys::CART, cart).await?;
    Ok(())
}

// =============================================================================
// Search
// =============================================================================

/// `?q=` query.
#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

/// Products matching a search term.
pub async fn search(
    State(state): State<AppState>,
    _cashier: RequirePermission<ViewTransaction>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<ProductView>>> {
    Ok(Json(state.checkout().search(&query.q).await?))
}

/// Search term to remember.
#[derive(Debug, Deserialize)]
pub struct SearchTerm {
    pub term: String,
}

/// Recent search terms, newest first.
pub async fn recent_searches(
    State(state): State<AppState>,
    _cashier: RequirePermission<ViewTransaction>,
) -> Result<Json<Vec<String>>> {
    Ok(Json(state.checkout().recent_searches().await?))
}

/// Remember a search term.
pub async fn record_search(
    State(state): State<AppState>,
    _cashier: RequirePermission<ViewTransaction>,
    Json(form): Json<SearchTerm>,
) -> Result<Json<Vec<String>>> {
    Ok(Json(state.checkout().record_search(&form.term).await?))
}

// =============================================================================
// Cart
// =============================================================================

/// Cart contents with the running total.
#[derive(Debug, Serialize)]
pub struct CartResponse {
    #[serde(flatten)]
    pub cart: Cart,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: rust_decimal::Decimal,
}

impl From<Cart> for CartResponse {
    fn from(cart: Cart) -> Self {
        let total = cart.total();
        Self { cart, total }
    }
}

/// Item and quantity to add to the cart.
#[derive(Debug, Deserialize)]
pub struct AddToCart {
    pub item: String,
    pub quantity: u32,
}

/// Current cart.
pub async fn cart(
    session: Session,
    _cashier: RequirePermission<ViewTransaction>,
) -> Result<Json<CartResponse>> {
    Ok(Json(load_cart(&session).await?.into()))
}

/// Add an item to the cart.
pub async fn add_to_cart(
    State(state): State<AppState>,
    session: Session,
    _cashier: RequirePermission<ViewTransaction>,
    Json(form): Json<AddToCart>,
) -> Result<Json<CartResponse>> {
    let mut cart = load_cart(&session).await?;
    state
        .checkout()
        .add_to_cart(&mut cart, &form.item, form.quantity)
        .await?;
    store_cart(&session, &cart).await?;
    Ok(Json(cart.into()))
}

/// Remove an item's line from the cart.
pub async fn remove_from_cart(
    session: Session,
    _cashier: RequirePermission<ViewTransaction>,
    Path(item): Path<String>,
) -> Result<Json<CartResponse>> {
    let mut cart = load_cart(&session).await?;
    CheckoutService::remove_from_cart(&mut cart, &item)?;
    store_cart(&session, &cart).await?;
    Ok(Json(cart.into()))
}

// =============================================================================
// Checkout
// =============================================================================

/// Completed sale.
#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub receipt: Receipt,
    /// Printable receipt.
    pub text: String,
}

/// Sell everything in the cart and empty it.
#[instrument(skip_all, fields(cashier = %cashier.username))]
pub async fn checkout(
    State(state): State<AppState>,
    session: Session,
    RequirePermission(cashier, _): RequirePermission<ViewTransaction>,
) -> Result<Json<CheckoutResponse>> {
    let cart = load_cart(&session).await?;
    let receipt = state
        .checkout()
        .checkout(&cart, &cashier, state.now())
        .await?;
    store_cart(&session, &Cart::default()).await?;

    let text = receipt
        .render_text()
        .map_err(|e| AppError::Internal(format!("receipt template: {e}")))?;
    Ok(Json(CheckoutResponse { receipt, text }))
}

/// Latest sales, newest first.
pub async fn transactions(
    State(state): State<AppState>,
    _cashier: RequirePermission<ViewTransaction>,
) -> Result<Json<Vec<RecentTransaction>>> {
    Ok(Json(state.checkout().recent_transactions().await?))
}
