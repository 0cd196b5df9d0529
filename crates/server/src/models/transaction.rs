//! Transaction log domain types.

use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;

use stockroom_core::InventoryAction;

/// Username recorded when no account is logged in.
pub const SYSTEM_USER: &str = "System";

/// Date format stored on each entry (e.g., "Nov 14. 2025").
pub const STORED_DATE_FORMAT: &str = "%b %-d. %Y";

/// Time format stored on each entry (e.g., "03:25 PM").
pub const STORED_TIME_FORMAT: &str = "%I:%M %p";

/// Login activity recorded in the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activity {
    LoggedIn,
    LoggedOut,
}

impl Activity {
    /// Stored action string, also used as the history label.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::LoggedIn => "Logged in",
            Self::LoggedOut => "Logged out",
        }
    }
}

/// What a log entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionKind {
    /// A completed sale line.
    Sale,
    /// An inventory add/update/delete.
    Inventory(InventoryAction),
    /// A login or logout.
    Activity(Activity),
}

/// One entry in the transaction log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    /// When the entry was recorded, in store-local time.
    pub timestamp: DateTime<FixedOffset>,
    /// Product name; empty for activity entries.
    pub item: String,
    /// Units sold, or the new stock level for inventory entries.
    pub quantity: u32,
    /// Sale total; zero for non-sale entries.
    pub total: Decimal,
    /// Entry kind.
    pub kind: TransactionKind,
    /// Free-form description for inventory and activity entries.
    pub details: Option<String>,
    /// Acting username.
    pub user: String,
}

impl Transaction {
    /// A sale line.
    #[must_use]
    pub fn sale(
        timestamp: DateTime<FixedOffset>,
        item: impl Into<String>,
        quantity: u32,
        total: Decimal,
        user: impl Into<String>,
    ) -> Self {
        Self {
            timestamp,
            item: item.into(),
            quantity,
            total,
            kind: TransactionKind::Sale,
            details: None,
            user: user.into(),
        }
    }

    /// An inventory change record.
    #[must_use]
    pub fn inventory_change(
        timestamp: DateTime<FixedOffset>,
        action: InventoryAction,
        item: impl Into<String>,
        quantity: u32,
        details: impl Into<String>,
        user: impl Into<String>,
    ) -> Self {
        Self {
            timestamp,
            item: item.into(),
            quantity,
            total: Decimal::ZERO,
            kind: TransactionKind::Inventory(action),
            details: Some(details.into()),
            user: user.into(),
        }
    }

    /// A login/logout record.
    #[must_use]
    pub fn activity(timestamp: DateTime<FixedOffset>, activity: Activity, username: &str) -> Self {
        let verb = match activity {
            Activity::LoggedIn => "logged in",
            Activity::LoggedOut => "logged out",
        };
        Self {
            timestamp,
            item: String::new(),
            quantity: 0,
            total: Decimal::ZERO,
            kind: TransactionKind::Activity(activity),
            details: Some(format!("{username} {verb}.")),
            user: username.to_owned(),
        }
    }

    /// Whether the entry counts as a sale for reporting.
    ///
    /// Zero-total entries without an action are ignored.
    #[must_use]
    pub fn is_sale(&self) -> bool {
        self.kind == TransactionKind::Sale && self.total > Decimal::ZERO
    }

    /// Stored date string (e.g., "Nov 14. 2025").
    #[must_use]
    pub fn date_label(&self) -> String {
        self.timestamp.format(STORED_DATE_FORMAT).to_string()
    }

    /// Stored time string (e.g., "03:25 PM").
    #[must_use]
    pub fn time_label(&self) -> String {
        self.timestamp.format(STORED_TIME_FORMAT).to_string()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn at(s: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(s).unwrap()
    }

    #[test]
    fn test_labels() {
        let sale = Transaction::sale(
            at("2025-11-04T15:25:00+08:00"),
            "Jeans",
            2,
            Decimal::from(400),
            "maria",
        );
        assert_eq!(sale.date_label(), "Nov 4. 2025");
        assert_eq!(sale.time_label(), "03:25 PM");
    }

    #[test]
    fn test_is_sale() {
        let now = at("2025-11-14T09:00:00+08:00");
        assert!(Transaction::sale(now, "Jeans", 1, Decimal::from(200), "a").is_sale());
        assert!(!Transaction::sale(now, "Jeans", 1, Decimal::ZERO, "a").is_sale());
        assert!(
            !Transaction::inventory_change(now, InventoryAction::Added, "Caps", 5, "x", "a")
                .is_sale()
        );
        assert!(!Transaction::activity(now, Activity::LoggedIn, "a").is_sale());
    }

    #[test]
    fn test_activity_details() {
        let now = at("2025-11-14T09:00:00+08:00");
        let entry = Transaction::activity(now, Activity::LoggedOut, "maria");
        assert_eq!(entry.details.as_deref(), Some("maria logged out."));
        assert_eq!(entry.user, "maria");
    }
}
