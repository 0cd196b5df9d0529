//! HTTP route handlers for the Stockroom API.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                    - Liveness check
//! GET    /health/ready              - Readiness check (store readable)
//!
//! # Auth
//! POST   /auth/login                - Log in
//! POST   /auth/logout               - Log out (drops the cart)
//! GET    /auth/me                   - Logged-in account
//!
//! # Accounts
//! GET    /accounts                  - Active accounts (plus pending for the super admin)
//! POST   /accounts                  - Create an account (create_account)
//! POST   /accounts/{id}/approve     - Approve a pending account (super admin)
//! DELETE /accounts/{id}             - Delete or reject an account
//!
//! # Inventory
//! GET    /inventory                 - Products (?sort=&order=&q=) (view_inventory)
//! PUT    /inventory                 - Replace the catalog (edit_inventory)
//! GET    /inventory/alerts          - Out-of-stock and low-stock products
//!
//! # Dashboard
//! GET    /dashboard                 - Summary and recent sales (?period=)
//! GET    /dashboard/sales           - Sales on a date (?date=YYYY-MM-DD)
//! GET    /dashboard/charts/sales    - Sales chart (?period=)
//! GET    /dashboard/charts/products - Top products chart (?period=&category=)
//! GET    /dashboard/categories      - Inventory categories
//! GET    /dashboard/report          - Period report
//! GET    /dashboard/report.txt      - Period report as text
//!
//! # Point of Sale (view_transaction)
//! GET    /pos/search                - Product search (?q=)
//! GET    /pos/recent-searches       - Recent search terms
//! POST   /pos/recent-searches       - Remember a search term
//! GET    /pos/cart                  - Current cart
//! POST   /pos/cart                  - Add to cart
//! DELETE /pos/cart/{item}           - Remove a cart line
//! POST   /pos/checkout              - Sell the cart and return the receipt
//! GET    /pos/transactions          - Latest sales
//!
//! # History
//! GET    /history                   - Log entries, newest first (view_history)
//! DELETE /history                   - Clear the log (super admin)
//! ```

pub mod accounts;
pub mod auth;
pub mod dashboard;
pub mod history;
pub mod inventory;
pub mod pos;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    routing::{delete, get, post},
};

use crate::db::InventoryRepository;
use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me))
}

/// Create the account routes router.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(accounts::index).post(accounts::create))
        .route("/{id}", delete(accounts::delete))
        .route("/{id}/approve", post(accounts::approve))
}

/// Create the inventory routes router.
pub fn inventory_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(inventory::index).put(inventory::save))
        .route("/alerts", get(inventory::alerts))
}

/// Create the dashboard routes router.
pub fn dashboard_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(dashboard::index))
        .route("/sales", get(dashboard::sales_on_date))
        .route("/charts/sales", get(dashboard::sales_chart))
        .route("/charts/products", get(dashboard::products_chart))
        .route("/categories", get(dashboard::categories))
        .route("/report", get(dashboard::report))
        .route("/report.txt", get(dashboard::report_text))
}

/// Create the point-of-sale routes router.
pub fn pos_routes() -> Router<AppState> {
    Router::new()
        .route("/search", get(pos::search))
        .route(
            "/recent-searches",
            get(pos::recent_searches).post(pos::record_search),
        )
        .route("/cart", get(pos::cart).post(pos::add_to_cart))
        .route("/cart/{item}", delete(pos::remove_from_cart))
        .route("/checkout", post(pos::checkout))
        .route("/transactions", get(pos::transactions))
}

/// Create the history routes router.
pub fn history_routes() -> Router<AppState> {
    Router::new().route("/", get(history::index).delete(history::clear))
}

/// Create all routes for the API.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .nest("/auth", auth_routes())
        .nest("/accounts", account_routes())
        .nest("/inventory", inventory_routes())
        .nest("/dashboard", dashboard_routes())
        .nest("/pos", pos_routes())
        .nest("/history", history_routes())
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not touch the store.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the catalog cannot be read.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match InventoryRepository::new(state.storage()).load().await {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
