//! Domain models for the Stockroom service.

pub mod account;
pub mod cart;
pub mod product;
pub mod session;
pub mod transaction;

pub use account::{Account, AccountView};
pub use cart::{Cart, CartLine, Receipt};
pub use product::Product;
pub use session::{CurrentAccount, keys as session_keys};
pub use transaction::{Activity, Transaction, TransactionKind};
