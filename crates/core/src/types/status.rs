//! Status enums for various entities.

use serde::{Deserialize, Serialize};

/// Quantity below which an in-stock product counts as low stock.
pub const LOW_STOCK_THRESHOLD: u32 = 15;

/// Stock status derived from a product's quantity.
///
/// Declared in sort order: out of stock first, in stock last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    OutOfStock,
    LowStock,
    InStock,
}

impl StockStatus {
    /// Derive the status for a quantity.
    #[must_use]
    pub const fn from_quantity(quantity: u32) -> Self {
        if quantity == 0 {
            Self::OutOfStock
        } else if quantity < LOW_STOCK_THRESHOLD {
            Self::LowStock
        } else {
            Self::InStock
        }
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::OutOfStock => "Out of stock",
            Self::LowStock => "Low stock",
            Self::InStock => "In stock",
        }
    }

    /// Whether the product needs restocking (low or out of stock).
    #[must_use]
    pub const fn needs_restock(&self) -> bool {
        matches!(self, Self::OutOfStock | Self::LowStock)
    }
}

/// Account approval status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AccountStatus {
    Active,
    #[default]
    Pending,
}

impl std::fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Pending => write!(f, "pending"),
        }
    }
}

/// A single grantable capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    ViewHistory,
    ViewSettings,
    CreateAccount,
    EditInventory,
    ViewInventory,
    ViewTransaction,
}

/// Account role with different permission levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Full access, including account approval.
    #[serde(rename = "Super Admin")]
    SuperAdmin,
    /// Store management: inventory edits, history, account creation.
    Admin,
    /// Counter work: inventory lookups and sales.
    Staff,
}

const STAFF_PERMISSIONS: &[Permission] = &[Permission::ViewInventory, Permission::ViewTransaction];

const ADMIN_PERMISSIONS: &[Permission] = &[
    Permission::ViewHistory,
    Permission::ViewSettings,
    Permission::CreateAccount,
    Permission::EditInventory,
    Permission::ViewInventory,
    Permission::ViewTransaction,
];

impl Role {
    /// Permissions explicitly granted to the role.
    ///
    /// `SuperAdmin` is granted everything and is handled in [`Self::has_permission`].
    #[must_use]
    pub const fn permissions(&self) -> &'static [Permission] {
        match self {
            Self::SuperAdmin | Self::Admin => ADMIN_PERMISSIONS,
            Self::Staff => STAFF_PERMISSIONS,
        }
    }

    /// Whether the role grants a permission.
    #[must_use]
    pub fn has_permission(&self, permission: Permission) -> bool {
        matches!(self, Self::SuperAdmin) || self.permissions().contains(&permission)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SuperAdmin => write!(f, "Super Admin"),
            Self::Admin => write!(f, "Admin"),
            Self::Staff => write!(f, "Staff"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace(['_', '-'], " ").as_str() {
            "super admin" => Ok(Self::SuperAdmin),
            "admin" => Ok(Self::Admin),
            "staff" => Ok(Self::Staff),
            _ => Err(format!("invalid role: {s}")),
        }
    }
}

/// Kind of inventory change recorded in the transaction log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InventoryAction {
    Added,
    Updated,
    Deleted,
}

impl InventoryAction {
    /// Stored action string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Added => "added",
            Self::Updated => "updated",
            Self::Deleted => "deleted",
        }
    }

    /// History label for the action.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Added => "Product added",
            Self::Updated => "Stock update",
            Self::Deleted => "Product deleted",
        }
    }
}

impl std::str::FromStr for InventoryAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "added" => Ok(Self::Added),
            "updated" => Ok(Self::Updated),
            "deleted" => Ok(Self::Deleted),
            _ => Err(format!("invalid inventory action: {s}")),
        }
    }
}
