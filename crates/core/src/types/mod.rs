//! Core types for Stockroom.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod period;
pub mod price;
pub mod status;
pub mod username;

pub use id::*;
pub use period::{Period, PeriodError, PeriodLabels};
pub use price::{CurrencyCode, Price};
pub use status::*;
pub use username::{Username, UsernameError};
