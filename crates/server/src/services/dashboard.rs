//! Sales aggregation for the dashboard, charts and period reports.
//!
//! Everything here works on store-local time: each timestamp is shifted into
//! the offset of `now` before dates, hours or months are compared.

use std::collections::BTreeSet;

use askama::Template;
use chrono::{DateTime, Datelike, Duration, FixedOffset, Months, NaiveDate, Timelike};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Serialize, Serializer};
use tracing::instrument;

use stockroom_core::{CurrencyCode, Period, Price, StockStatus};

use crate::db::{InventoryRepository, LocalStorage, RepositoryError, TransactionRepository};
use crate::models::{Product, Transaction};

/// Rows shown in the recent sales table.
pub const RECENT_SALES_LIMIT: usize = 10;

/// Bars shown in the top products chart.
pub const TOP_PRODUCTS_LIMIT: usize = 10;

const REPORT_DATE_FORMAT: &str = "%b %-d, %Y";

// =============================================================================
// Views
// =============================================================================

fn serialize_amounts<S: Serializer>(values: &[Decimal], serializer: S) -> Result<S::Ok, S::Error> {
    #[derive(Serialize)]
    struct Amount(#[serde(with = "rust_decimal::serde::float")] Decimal);

    serializer.collect_seq(values.iter().copied().map(Amount))
}

/// Headline numbers for a period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub period: Period,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_sales: Decimal,
    pub products_sold: u64,
    /// Low-stock plus out-of-stock products.
    pub low_stock_count: usize,
}

/// A sale row as shown in the sales table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleView {
    pub date: String,
    pub time: String,
    pub item: String,
    pub quantity: u32,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
    pub user: String,
}

impl From<&Transaction> for SaleView {
    fn from(sale: &Transaction) -> Self {
        Self {
            date: sale.date_label(),
            time: sale.time_label(),
            item: sale.item.clone(),
            quantity: sale.quantity,
            total: sale.total,
            user: sale.user.clone(),
        }
    }
}

/// Sales totals per bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SalesChart {
    pub labels: Vec<String>,
    #[serde(serialize_with = "serialize_amounts")]
    pub values: Vec<Decimal>,
}

/// Best sellers by units sold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductsChart {
    pub labels: Vec<String>,
    pub values: Vec<u64>,
}

/// Period report with a comparison against the previous window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesReport {
    pub period: Period,
    pub title: &'static str,
    pub date_range: String,
    pub current_label: &'static str,
    pub previous_label: &'static str,
    #[serde(with = "rust_decimal::serde::float")]
    pub current_sales: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub previous_sales: Decimal,
    /// `current_sales - previous_sales`.
    #[serde(with = "rust_decimal::serde::float")]
    pub difference: Decimal,
    /// Change against the previous window, in percent to one decimal place.
    #[serde(with = "rust_decimal::serde::float")]
    pub percentage_change: Decimal,
    pub products_sold: u64,
    pub low_stock_count: usize,
    pub currency: CurrencyCode,
}

impl SalesReport {
    /// Render the report as a plain-text document.
    ///
    /// # Errors
    ///
    /// Returns an error if the template fails to render.
    pub fn render_text(&self, generated_at: DateTime<FixedOffset>) -> askama::Result<String> {
        let money = |amount: Decimal| Price::new(amount, self.currency).display_fixed();
        let sign = if self.difference.is_sign_negative() && !self.difference.is_zero() {
            "-"
        } else {
            "+"
        };

        ReportDocument {
            title: self.title,
            date_range: &self.date_range,
            total_sales: money(self.current_sales),
            products_sold: self.products_sold,
            low_stock_count: self.low_stock_count,
            sales_change: format!("{sign}{}%", self.percentage_change.abs().normalize()),
            current_label: self.current_label,
            previous_label: self.previous_label,
            current_sales: money(self.current_sales),
            previous_sales: money(self.previous_sales),
            difference: format!("{sign}{}", money(self.difference.abs())),
            generated_at: generated_at.format("%b %-d, %Y %I:%M %p").to_string(),
        }
        .render()
    }
}

#[derive(Template)]
#[template(path = "report.txt")]
struct ReportDocument<'a> {
    title: &'a str,
    date_range: &'a str,
    total_sales: String,
    products_sold: u64,
    low_stock_count: usize,
    sales_change: String,
    current_label: &'a str,
    previous_label: &'a str,
    current_sales: String,
    previous_sales: String,
    difference: String,
    generated_at: String,
}

// =============================================================================
// Pure Functions
// =============================================================================

fn local(timestamp: DateTime<FixedOffset>, now: DateTime<FixedOffset>) -> DateTime<FixedOffset> {
    timestamp.with_timezone(&now.timezone())
}

fn months_before(now: DateTime<FixedOffset>, months: u32) -> DateTime<FixedOffset> {
    now.checked_sub_months(Months::new(months)).unwrap_or(now)
}

/// Whole days between `timestamp` and `now`, or `None` if it lies in the future.
fn days_elapsed(timestamp: DateTime<FixedOffset>, now: DateTime<FixedOffset>) -> Option<i64> {
    let elapsed = now.signed_duration_since(timestamp);
    (elapsed >= Duration::zero()).then(|| elapsed.num_days())
}

/// Calendar months between the local month of `timestamp` and that of `now`.
fn months_elapsed(timestamp: DateTime<FixedOffset>, now: DateTime<FixedOffset>) -> i64 {
    let then = local(timestamp, now);
    (i64::from(now.year()) - i64::from(then.year())) * 12 + i64::from(now.month())
        - i64::from(then.month())
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Entries that count as sales, in log order.
pub fn sales(transactions: &[Transaction]) -> impl Iterator<Item = &Transaction> {
    transactions.iter().filter(|t| t.is_sale())
}

/// Sales that fall in the current window of `period`.
#[must_use]
pub fn sales_in_period(
    transactions: &[Transaction],
    period: Period,
    now: DateTime<FixedOffset>,
) -> Vec<&Transaction> {
    let start = match period {
        Period::AllTime => return sales(transactions).collect(),
        Period::Today => {
            let today = now.date_naive();
            return sales(transactions)
                .filter(|t| local(t.timestamp, now).date_naive() == today)
                .collect();
        }
        Period::Weekly => now - Duration::days(7),
        Period::Monthly => months_before(now, 1),
        Period::Yearly => months_before(now, 12),
    };

    sales(transactions)
        .filter(|t| t.timestamp >= start && t.timestamp <= now)
        .collect()
}

/// Sales that fall in the window before the current one.
///
/// All-time has no previous window and always yields nothing.
#[must_use]
pub fn previous_period_sales(
    transactions: &[Transaction],
    period: Period,
    now: DateTime<FixedOffset>,
) -> Vec<&Transaction> {
    let (start, end) = match period {
        Period::AllTime => return Vec::new(),
        Period::Today => {
            let Some(yesterday) = now.date_naive().pred_opt() else {
                return Vec::new();
            };
            return sales(transactions)
                .filter(|t| local(t.timestamp, now).date_naive() == yesterday)
                .collect();
        }
        Period::Weekly => (now - Duration::days(14), now - Duration::days(7)),
        Period::Monthly => (now - Duration::days(60), now - Duration::days(30)),
        Period::Yearly => (months_before(now, 24), months_before(now, 12)),
    };

    sales(transactions)
        .filter(|t| t.timestamp >= start && t.timestamp < end)
        .collect()
}

/// Sales whose local date is `date`, newest first.
#[must_use]
pub fn sales_on_date(
    transactions: &[Transaction],
    date: NaiveDate,
    now: DateTime<FixedOffset>,
) -> Vec<&Transaction> {
    let mut matching: Vec<&Transaction> = sales(transactions)
        .filter(|t| local(t.timestamp, now).date_naive() == date)
        .collect();
    matching.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    matching
}

/// Up to [`RECENT_SALES_LIMIT`] sales in the period, newest first.
#[must_use]
pub fn recent_sales(
    transactions: &[Transaction],
    period: Period,
    now: DateTime<FixedOffset>,
) -> Vec<&Transaction> {
    let mut recent = sales_in_period(transactions, period, now);
    recent.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    recent.truncate(RECENT_SALES_LIMIT);
    recent
}

fn total_of(sales: &[&Transaction]) -> Decimal {
    sales.iter().map(|t| t.total).sum()
}

fn units_of(sales: &[&Transaction]) -> u64 {
    sales.iter().map(|t| u64::from(t.quantity)).sum()
}

/// Products that are low on stock or sold out.
#[must_use]
pub fn low_stock_count(inventory: &[Product]) -> usize {
    inventory
        .iter()
        .filter(|p| p.status() != StockStatus::InStock)
        .count()
}

/// Bucketed sales totals for the chart of `period`.
#[must_use]
pub fn sales_chart(
    transactions: &[Transaction],
    period: Period,
    now: DateTime<FixedOffset>,
) -> SalesChart {
    match period {
        Period::Today => hourly_chart(transactions, now),
        Period::Weekly => daily_chart(transactions, now, 7, "%a, %b %-d"),
        Period::Monthly => daily_chart(transactions, now, 30, "%b %-d"),
        Period::Yearly => monthly_chart(transactions, now, 12),
        Period::AllTime => {
            let first = sales(transactions)
                .map(|t| months_elapsed(t.timestamp, now))
                .max()
                .unwrap_or(0);
            let span = u32::try_from(first.max(0)).unwrap_or(0) + 1;
            monthly_chart(transactions, now, span)
        }
    }
}

fn hourly_chart(transactions: &[Transaction], now: DateTime<FixedOffset>) -> SalesChart {
    let labels = (0..24u32)
        .map(|hour| {
            let display = if hour % 12 == 0 { 12 } else { hour % 12 };
            let meridiem = if hour < 12 { "AM" } else { "PM" };
            format!("{display}:00 {meridiem}")
        })
        .collect();
    let mut values = vec![Decimal::ZERO; 24];

    let today = now.date_naive();
    for sale in sales(transactions) {
        let at = local(sale.timestamp, now);
        if at.date_naive() != today {
            continue;
        }
        if let Some(bucket) = usize::try_from(at.hour())
            .ok()
            .and_then(|hour| values.get_mut(hour))
        {
            *bucket += sale.total;
        }
    }

    SalesChart { labels, values }
}

fn daily_chart(
    transactions: &[Transaction],
    now: DateTime<FixedOffset>,
    days: usize,
    label_format: &str,
) -> SalesChart {
    let span = i64::try_from(days).unwrap_or(i64::MAX);
    let labels = (0..span)
        .rev()
        .map(|ago| (now - Duration::days(ago)).format(label_format).to_string())
        .collect();
    let mut values = vec![Decimal::ZERO; days];

    for sale in sales(transactions) {
        let Some(ago) = days_elapsed(sale.timestamp, now).filter(|ago| *ago < span) else {
            continue;
        };
        if let Some(bucket) = usize::try_from(span - 1 - ago)
            .ok()
            .and_then(|index| values.get_mut(index))
        {
            *bucket += sale.total;
        }
    }

    SalesChart { labels, values }
}

fn monthly_chart(transactions: &[Transaction], now: DateTime<FixedOffset>, months: u32) -> SalesChart {
    let this_month = first_of_month(now.date_naive());
    let labels = (0..months)
        .rev()
        .map(|ago| {
            this_month
                .checked_sub_months(Months::new(ago))
                .unwrap_or(this_month)
                .format("%b %Y")
                .to_string()
        })
        .collect();
    let span = i64::from(months);
    let mut values = vec![Decimal::ZERO; months as usize];

    for sale in sales(transactions) {
        let ago = months_elapsed(sale.timestamp, now);
        if !(0..span).contains(&ago) {
            continue;
        }
        if let Some(bucket) = usize::try_from(span - 1 - ago)
            .ok()
            .and_then(|index| values.get_mut(index))
        {
            *bucket += sale.total;
        }
    }

    SalesChart { labels, values }
}

/// Best-selling products by units in the period's chart window.
///
/// `category` restricts the tally to sales whose product currently sits in
/// that category; `None` or `"all"` counts every product.
#[must_use]
pub fn top_products(
    transactions: &[Transaction],
    inventory: &[Product],
    period: Period,
    category: Option<&str>,
    now: DateTime<FixedOffset>,
) -> ProductsChart {
    let category = category.filter(|c| !c.is_empty() && !c.eq_ignore_ascii_case("all"));
    let today = now.date_naive();

    let in_window = |sale: &Transaction| match period {
        Period::AllTime => true,
        Period::Today => local(sale.timestamp, now).date_naive() == today,
        Period::Weekly => days_elapsed(sale.timestamp, now).is_some_and(|d| d < 7),
        Period::Monthly => days_elapsed(sale.timestamp, now).is_some_and(|d| d < 30),
        Period::Yearly => (0..12).contains(&months_elapsed(sale.timestamp, now)),
    };
    let in_category = |sale: &Transaction| {
        category.is_none_or(|wanted| {
            inventory
                .iter()
                .find(|p| p.name == sale.item)
                .is_some_and(|p| p.category == wanted)
        })
    };

    let mut totals: Vec<(String, u64)> = Vec::new();
    for sale in sales(transactions).filter(|t| in_window(t) && in_category(t)) {
        if let Some((_, units)) = totals.iter_mut().find(|(item, _)| *item == sale.item) {
            *units += u64::from(sale.quantity);
        } else {
            totals.push((sale.item.clone(), u64::from(sale.quantity)));
        }
    }

    totals.sort_by(|a, b| b.1.cmp(&a.1));
    totals.truncate(TOP_PRODUCTS_LIMIT);

    let (labels, values) = totals.into_iter().unzip();
    ProductsChart { labels, values }
}

/// Sorted, unique product categories.
#[must_use]
pub fn categories(inventory: &[Product]) -> Vec<String> {
    inventory
        .iter()
        .map(|p| p.category.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Percentage change from `previous` to `current`, to one decimal place.
///
/// Returns zero when there is nothing to compare against.
#[must_use]
pub fn percentage_change(current: Decimal, previous: Decimal) -> Decimal {
    if previous.is_zero() {
        return Decimal::ZERO;
    }
    ((current - previous) / previous * Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)
}

fn date_range(period: Period, now: DateTime<FixedOffset>) -> String {
    let start = match period {
        Period::AllTime => return "All recorded transactions".to_string(),
        Period::Today => return now.format(REPORT_DATE_FORMAT).to_string(),
        Period::Weekly => now - Duration::days(7),
        Period::Monthly => months_before(now, 1),
        Period::Yearly => months_before(now, 12),
    };
    format!(
        "{} - {}",
        start.format(REPORT_DATE_FORMAT),
        now.format(REPORT_DATE_FORMAT)
    )
}

/// Build the report for `period`.
#[must_use]
pub fn report(
    transactions: &[Transaction],
    inventory: &[Product],
    period: Period,
    currency: CurrencyCode,
    now: DateTime<FixedOffset>,
) -> SalesReport {
    let current = sales_in_period(transactions, period, now);
    let previous = previous_period_sales(transactions, period, now);
    let current_sales = total_of(&current);
    let previous_sales = total_of(&previous);
    let labels = period.labels();

    SalesReport {
        period,
        title: labels.title,
        date_range: date_range(period, now),
        current_label: labels.current_label,
        previous_label: labels.previous_label,
        current_sales,
        previous_sales,
        difference: current_sales - previous_sales,
        percentage_change: percentage_change(current_sales, previous_sales),
        products_sold: units_of(&current),
        low_stock_count: low_stock_count(inventory),
        currency,
    }
}

// =============================================================================
// Service
// =============================================================================

/// Read-only dashboard service over the inventory and the transaction log.
pub struct DashboardService<'a> {
    inventory: InventoryRepository<'a>,
    transactions: TransactionRepository<'a>,
    currency: CurrencyCode,
}

impl<'a> DashboardService<'a> {
    /// Create a new dashboard service.
    #[must_use]
    pub const fn new(storage: &'a LocalStorage, currency: CurrencyCode) -> Self {
        Self {
            inventory: InventoryRepository::new(storage),
            transactions: TransactionRepository::new(storage),
            currency,
        }
    }

    /// Totals for the summary boxes.
    ///
    /// # Errors
    ///
    /// Returns a repository error if the log or the catalog cannot be read.
    #[instrument(skip(self), fields(period = %period))]
    pub async fn summary(
        &self,
        period: Period,
        now: DateTime<FixedOffset>,
    ) -> Result<DashboardSummary, RepositoryError> {
        let log = self.transactions.list_all().await?;
        let inventory = self.inventory.list_all().await?;
        let in_period = sales_in_period(&log, period, now);

        Ok(DashboardSummary {
            period,
            total_sales: total_of(&in_period),
            products_sold: units_of(&in_period),
            low_stock_count: low_stock_count(&inventory),
        })
    }

    /// Latest sales of the period for the sales table.
    ///
    /// # Errors
    ///
    /// Returns a repository error if the log cannot be read.
    pub async fn recent_sales(
        &self,
        period: Period,
        now: DateTime<FixedOffset>,
    ) -> Result<Vec<SaleView>, RepositoryError> {
        let log = self.transactions.list_all().await?;
        Ok(recent_sales(&log, period, now)
            .into_iter()
            .map(SaleView::from)
            .collect())
    }

    /// Every sale on a local calendar date.
    ///
    /// # Errors
    ///
    /// Returns a repository error if the log cannot be read.
    pub async fn sales_on_date(
        &self,
        date: NaiveDate,
        now: DateTime<FixedOffset>,
    ) -> Result<Vec<SaleView>, RepositoryError> {
        let log = self.transactions.list_all().await?;
        Ok(sales_on_date(&log, date, now)
            .into_iter()
            .map(SaleView::from)
            .collect())
    }

    /// Sales chart data.
    ///
    /// # Errors
    ///
    /// Returns a repository error if the log cannot be read.
    pub async fn sales_chart(
        &self,
        period: Period,
        now: DateTime<FixedOffset>,
    ) -> Result<SalesChart, RepositoryError> {
        let log = self.transactions.list_all().await?;
        Ok(sales_chart(&log, period, now))
    }

    /// Top products chart data.
    ///
    /// # Errors
    ///
    /// Returns a repository error if the log or the catalog cannot be read.
    pub async fn top_products(
        &self,
        period: Period,
        category: Option<&str>,
        now: DateTime<FixedOffset>,
    ) -> Result<ProductsChart, RepositoryError> {
        let log = self.transactions.list_all().await?;
        let inventory = self.inventory.list_all().await?;
        Ok(top_products(&log, &inventory, period, category, now))
    }

    /// Categories for the top products filter.
    ///
    /// # Errors
    ///
    /// Returns a repository error if the catalog cannot be read.
    pub async fn categories(&self) -> Result<Vec<String>, RepositoryError> {
        Ok(categories(&self.inventory.list_all().await?))
    }

    /// Period report.
    ///
    /// # Errors
    ///
    /// Returns a repository error if the log or the catalog cannot be read.
    #[instrument(skip(self), fields(period = %period))]
    pub async fn report(
        &self,
        period: Period,
        now: DateTime<FixedOffset>,
    ) -> Result<SalesReport, RepositoryError> {
        let log = self.transactions.list_all().await?;
        let inventory = self.inventory.list_all().await?;
        Ok(report(&log, &inventory, period, self.currency, now))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::models::product::default_catalog;
    use stockroom_core::InventoryAction;

    fn at(rfc3339: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(rfc3339).unwrap()
    }

    fn now() -> DateTime<FixedOffset> {
        at("2025-11-14T15:30:00+08:00")
    }

    fn sale(when: &str, item: &str, qty: u32, total: i64) -> Transaction {
        Transaction::sale(at(when), item, qty, Decimal::from(total), "maria")
    }

    fn sample_log() -> Vec<Transaction> {
        vec![
            sale("2025-11-14T09:15:00+08:00", "Jeans", 2, 400),
            sale("2025-11-13T18:00:00+08:00", "T-shirts", 3, 360),
            sale("2025-11-10T11:00:00+08:00", "Jeans", 1, 200),
            sale("2025-11-05T10:00:00+08:00", "Sandals", 4, 480),
            sale("2025-09-20T10:00:00+08:00", "Coats", 1, 300),
            sale("2024-12-01T10:00:00+08:00", "Boots", 1, 250),
            Transaction::inventory_change(
                at("2025-11-14T08:00:00+08:00"),
                InventoryAction::Added,
                "Caps",
                10,
                "Caps added (Category: Accessories, ₱80, Qty: 10)",
                "admin",
            ),
            sale("2025-11-14T10:00:00+08:00", "Freebie", 1, 0),
        ]
    }

    fn items(sales: &[&Transaction]) -> Vec<String> {
        sales.iter().map(|t| t.item.clone()).collect()
    }

    #[test]
    fn test_sales_in_period_windows() {
        let log = sample_log();

        assert_eq!(items(&sales_in_period(&log, Period::Today, now())), ["Jeans"]);
        assert_eq!(
            items(&sales_in_period(&log, Period::Weekly, now())),
            ["Jeans", "T-shirts", "Jeans"]
        );
        assert_eq!(sales_in_period(&log, Period::Monthly, now()).len(), 4);
        assert_eq!(sales_in_period(&log, Period::Yearly, now()).len(), 6);
        assert_eq!(sales_in_period(&log, Period::AllTime, now()).len(), 6);
    }

    #[test]
    fn test_weekly_window_edges() {
        // now() minus exactly 7 and 14 days, plus one second either side.
        let log = vec![
            sale("2025-11-07T15:30:00+08:00", "AtCurrentStart", 1, 100),
            sale("2025-11-07T15:29:59+08:00", "JustBefore", 1, 100),
            sale("2025-10-31T15:30:00+08:00", "AtPreviousStart", 1, 100),
            sale("2025-10-31T15:29:59+08:00", "TooOld", 1, 100),
        ];

        assert_eq!(
            items(&sales_in_period(&log, Period::Weekly, now())),
            ["AtCurrentStart"]
        );
        assert_eq!(
            items(&previous_period_sales(&log, Period::Weekly, now())),
            ["JustBefore", "AtPreviousStart"]
        );
    }

    #[test]
    fn test_monthly_window_clamps_to_month_end() {
        let leap = at("2024-03-31T12:00:00+08:00");
        assert_eq!(months_before(leap, 1), at("2024-02-29T12:00:00+08:00"));
        let plain = at("2025-03-31T12:00:00+08:00");
        assert_eq!(months_before(plain, 1), at("2025-02-28T12:00:00+08:00"));

        let log = vec![
            sale("2024-02-29T12:00:00+08:00", "AtStart", 1, 100),
            sale("2024-02-29T11:59:59+08:00", "JustBefore", 1, 100),
        ];
        assert_eq!(items(&sales_in_period(&log, Period::Monthly, leap)), ["AtStart"]);
    }

    #[test]
    fn test_previous_window_upper_end_is_exclusive() {
        // The monthly comparison window is [now - 60 d, now - 30 d).
        let log = vec![
            sale("2025-10-15T15:30:00+08:00", "ThirtyDays", 1, 100),
            sale("2025-09-15T15:30:00+08:00", "SixtyDays", 1, 100),
        ];
        assert_eq!(
            items(&previous_period_sales(&log, Period::Monthly, now())),
            ["SixtyDays"]
        );
        assert_eq!(
            items(&sales_in_period(&log, Period::Monthly, now())),
            ["ThirtyDays"]
        );

        // The yearly comparison window ends where the current year starts.
        let log = vec![sale("2024-11-14T15:30:00+08:00", "OneYear", 1, 100)];
        assert!(previous_period_sales(&log, Period::Yearly, now()).is_empty());
        assert_eq!(items(&sales_in_period(&log, Period::Yearly, now())), ["OneYear"]);
    }

    #[test]
    fn test_today_uses_local_date() {
        // 2025-11-13T17:00Z is 01:00 on the 14th in +08:00.
        let log = vec![sale("2025-11-13T17:00:00Z", "Jeans", 1, 200)];
        assert_eq!(sales_in_period(&log, Period::Today, now()).len(), 1);
    }

    #[test]
    fn test_previous_period_sales() {
        let log = sample_log();

        assert_eq!(
            items(&previous_period_sales(&log, Period::Today, now())),
            ["T-shirts"]
        );
        assert_eq!(
            items(&previous_period_sales(&log, Period::Weekly, now())),
            ["Sandals"]
        );
        assert_eq!(
            items(&previous_period_sales(&log, Period::Monthly, now())),
            ["Coats"]
        );
        assert!(previous_period_sales(&log, Period::AllTime, now()).is_empty());
    }

    #[test]
    fn test_recent_sales_newest_first() {
        let log = sample_log();
        let recent = recent_sales(&log, Period::Weekly, now());
        let times: Vec<_> = recent.iter().map(|t| t.timestamp).collect();
        assert!(times.windows(2).all(|w| w.first() >= w.get(1)));
    }

    #[test]
    fn test_sales_on_date() {
        let log = sample_log();
        let date = NaiveDate::from_ymd_opt(2025, 11, 13).unwrap();
        assert_eq!(items(&sales_on_date(&log, date, now())), ["T-shirts"]);
    }

    #[test]
    fn test_hourly_chart() {
        let chart = sales_chart(&sample_log(), Period::Today, now());
        assert_eq!(chart.labels.len(), 24);
        assert_eq!(chart.labels.first().map(String::as_str), Some("12:00 AM"));
        assert_eq!(chart.labels.get(13).map(String::as_str), Some("1:00 PM"));
        assert_eq!(chart.values.get(9), Some(&Decimal::from(400)));
    }

    #[test]
    fn test_weekly_chart_buckets_by_days_elapsed() {
        let chart = sales_chart(&sample_log(), Period::Weekly, now());
        assert_eq!(chart.labels.last().map(String::as_str), Some("Fri, Nov 14"));
        // Yesterday 18:00 is less than a whole day before now.
        assert_eq!(chart.values.get(6), Some(&Decimal::from(760)));
        assert_eq!(chart.values.get(5), Some(&Decimal::ZERO));
        assert_eq!(chart.values.get(2), Some(&Decimal::from(200)));
    }

    #[test]
    fn test_weekly_chart_skips_future_sales() {
        let log = vec![sale("2025-11-14T20:00:00+08:00", "Jeans", 1, 200)];
        let chart = sales_chart(&log, Period::Weekly, now());
        assert!(chart.values.iter().all(Decimal::is_zero));
    }

    #[test]
    fn test_yearly_and_alltime_charts() {
        let yearly = sales_chart(&sample_log(), Period::Yearly, now());
        assert_eq!(yearly.labels.first().map(String::as_str), Some("Dec 2024"));
        assert_eq!(yearly.labels.last().map(String::as_str), Some("Nov 2025"));
        assert_eq!(yearly.values.first(), Some(&Decimal::from(250)));
        assert_eq!(yearly.values.last(), Some(&Decimal::from(1440)));

        let all = sales_chart(&sample_log(), Period::AllTime, now());
        assert_eq!(all.labels.len(), 12);
        assert_eq!(all.values.iter().copied().sum::<Decimal>(), Decimal::from(1990));

        let empty = sales_chart(&[], Period::AllTime, now());
        assert_eq!(empty.labels, ["Nov 2025"]);
    }

    #[test]
    fn test_top_products() {
        let log = sample_log();
        let inventory = default_catalog();

        let chart = top_products(&log, &inventory, Period::AllTime, None, now());
        assert_eq!(chart.labels, ["Sandals", "Jeans", "T-shirts", "Coats", "Boots"]);
        assert_eq!(chart.values, [4, 3, 3, 1, 1]);

        let footwear = top_products(&log, &inventory, Period::AllTime, Some("Footwear"), now());
        assert_eq!(footwear.labels, ["Sandals", "Boots"]);

        let today = top_products(&log, &inventory, Period::Today, Some("all"), now());
        assert_eq!(today.labels, ["Jeans"]);
    }

    #[test]
    fn test_categories_sorted_unique() {
        let cats = categories(&default_catalog());
        assert!(cats.windows(2).all(|w| w.first() < w.get(1)));
    }

    #[test]
    fn test_percentage_change() {
        assert_eq!(percentage_change(Decimal::from(150), Decimal::ZERO), Decimal::ZERO);
        assert_eq!(
            percentage_change(Decimal::from(150), Decimal::from(100)),
            Decimal::new(500, 1)
        );
        assert_eq!(
            percentage_change(Decimal::from(200), Decimal::from(300)),
            Decimal::new(-333, 1)
        );
    }

    #[test]
    fn test_report_and_text() {
        let report = report(
            &sample_log(),
            &default_catalog(),
            Period::Weekly,
            CurrencyCode::PHP,
            now(),
        );
        assert_eq!(report.title, "Weekly Report");
        assert_eq!(report.date_range, "Nov 7, 2025 - Nov 14, 2025");
        assert_eq!(report.current_sales, Decimal::from(960));
        assert_eq!(report.previous_sales, Decimal::from(480));
        assert_eq!(report.difference, Decimal::from(480));
        assert_eq!(report.percentage_change, Decimal::from(100));
        assert_eq!(report.products_sold, 6);
        assert_eq!(report.low_stock_count, 4);

        let text = report.render_text(now()).unwrap();
        assert!(text.starts_with("Weekly Report\nNov 7, 2025 - Nov 14, 2025"));
        assert!(text.contains("Total Sales:      ₱960.00"));
        assert!(text.contains("Sales Change:     +100%"));
        assert!(text.contains("Last Week: ₱480.00"));
    }

    #[test]
    fn test_alltime_report_has_no_comparison() {
        let report = report(
            &sample_log(),
            &default_catalog(),
            Period::AllTime,
            CurrencyCode::PHP,
            now(),
        );
        assert_eq!(report.date_range, "All recorded transactions");
        assert_eq!(report.previous_label, "N/A");
        assert!(report.previous_sales.is_zero());
        assert!(report.percentage_change.is_zero());
    }

    #[test]
    fn test_chart_values_serialize_as_numbers() {
        let chart = SalesChart {
            labels: vec!["Nov 2025".to_string()],
            values: vec![Decimal::new(12050, 2)],
        };
        let json = serde_json::to_value(&chart).unwrap();
        assert_eq!(json["values"][0], serde_json::json!(120.5));
    }
}
