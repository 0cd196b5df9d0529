//! Cart and receipt types.

use askama::Template;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use stockroom_core::{CurrencyCode, Price, ReceiptId};

/// One line in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    /// Product name.
    pub item: String,
    /// Unit price at the time the line was added.
    #[serde(with = "rust_decimal::serde::float")]
    pub unit_price: Decimal,
    /// Units in the cart.
    pub quantity: u32,
    /// `unit_price * quantity`.
    #[serde(with = "rust_decimal::serde::float")]
    pub line_total: Decimal,
}

impl CartLine {
    fn new(item: String, unit_price: Decimal, quantity: u32) -> Self {
        Self {
            item,
            unit_price,
            quantity,
            line_total: unit_price * Decimal::from(quantity),
        }
    }
}

/// Session-held shopping cart.
///
/// Lines are keyed by product name; adding an item already in the cart
/// merges into the existing line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    pub lines: Vec<CartLine>,
}

impl Cart {
    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Quantity of an item already in the cart.
    #[must_use]
    pub fn quantity_of(&self, item: &str) -> u32 {
        self.lines
            .iter()
            .find(|line| line.item == item)
            .map_or(0, |line| line.quantity)
    }

    /// Add units of an item, merging with an existing line.
    ///
    /// Stock checks happen before this is called.
    pub fn add(&mut self, item: &str, unit_price: Decimal, quantity: u32) {
        if let Some(line) = self.lines.iter_mut().find(|line| line.item == item) {
            *line = CartLine::new(line.item.clone(), unit_price, line.quantity + quantity);
        } else {
            self.lines
                .push(CartLine::new(item.to_owned(), unit_price, quantity));
        }
    }

    /// Remove an item's line. Returns `false` if the item was not in the cart.
    pub fn remove(&mut self, item: &str) -> bool {
        let before = self.lines.len();
        self.lines.retain(|line| line.item != item);
        self.lines.len() != before
    }

    /// Sum of all line totals.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.lines.iter().map(|line| line.line_total).sum()
    }
}

/// Receipt produced by a successful checkout.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    pub id: ReceiptId,
    /// Long date (e.g., "November 14, 2025").
    pub date: String,
    /// Time of sale (e.g., "03:25 PM").
    pub time: String,
    pub cashier: String,
    pub lines: Vec<CartLine>,
    #[serde(with = "rust_decimal::serde::float")]
    pub subtotal: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
    pub currency: CurrencyCode,
}

impl Receipt {
    /// Render the receipt as plain text for printing.
    ///
    /// # Errors
    ///
    /// Returns an error if the template fails to render.
    pub fn render_text(&self) -> askama::Result<String> {
        let money = |amount: Decimal| Price::new(amount, self.currency).display_fixed();

        ReceiptDocument {
            id: self.id.as_str(),
            date: &self.date,
            time: &self.time,
            cashier: &self.cashier,
            header: format!("{:<20}{:>4}{:>12}{:>12}", "Item", "Qty", "Price", "Total"),
            rows: self
                .lines
                .iter()
                .map(|line| {
                    format!(
                        "{:<20}{:>4}{:>12}{:>12}",
                        line.item,
                        line.quantity,
                        money(line.unit_price),
                        money(line.line_total)
                    )
                })
                .collect(),
            subtotal: money(self.subtotal),
            total: money(self.total),
        }
        .render()
    }
}

#[derive(Template)]
#[template(path = "receipt.txt")]
struct ReceiptDocument<'a> {
    id: &'a str,
    date: &'a str,
    time: &'a str,
    cashier: &'a str,
    header: String,
    rows: Vec<String>,
    subtotal: String,
    total: String,
}
