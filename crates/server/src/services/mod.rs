//! Business logic for Stockroom.
//!
//! Services borrow [`crate::db::LocalStorage`] and take the current time as
//! an argument so that period maths stays deterministic under test.

pub mod accounts;
pub mod checkout;
pub mod dashboard;
pub mod history;
pub mod inventory;

pub use accounts::{AccountError, AccountService};
pub use checkout::{CheckoutError, CheckoutService};
pub use dashboard::DashboardService;
pub use history::{HistoryError, HistoryService};
pub use inventory::{InventoryError, InventoryService};
