//! Dashboard, chart and report handlers.

use axum::{
    Json,
    extract::{Query, State},
    http::header,
    response::IntoResponse,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use stockroom_core::Period;

use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::services::dashboard::{
    DashboardSummary, ProductsChart, SaleView, SalesChart, SalesReport,
};
use crate::state::AppState;

/// `?period=` query.
#[derive(Debug, Default, Deserialize)]
pub struct PeriodQuery {
    pub period: Option<String>,
}

impl PeriodQuery {
    fn parse(&self) -> Result<Period> {
        self.period
            .as_deref()
            .filter(|p| !p.trim().is_empty())
            .map_or(Ok(Period::default()), |p| {
                p.parse::<Period>()
                    .map_err(|e| AppError::BadRequest(e.to_string()))
            })
    }
}

/// Summary boxes plus the recent sales table.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    #[serde(flatten)]
    pub summary: DashboardSummary,
    pub recent_sales: Vec<SaleView>,
}

/// Dashboard summary for a period.
pub async fn index(
    State(state): State<AppState>,
    _account: RequireAuth,
    Query(query): Query<PeriodQuery>,
) -> Result<Json<DashboardResponse>> {
    let period = query.parse()?;
    let now = state.now();
    let service = state.dashboard();

    Ok(Json(DashboardResponse {
        summary: service.summary(period, now).await?,
        recent_sales: service.recent_sales(period, now).await?,
    }))
}

/// `?date=YYYY-MM-DD` query.
#[derive(Debug, Deserialize)]
pub struct DateQuery {
    pub date: String,
}

/// Sales on a calendar date.
pub async fn sales_on_date(
    State(state): State<AppState>,
    _account: RequireAuth,
    Query(query): Query<DateQuery>,
) -> Result<Json<Vec<SaleView>>> {
    let date = NaiveDate::parse_from_str(query.date.trim(), "%Y-%m-%d")
        .map_err(|_| AppError::BadRequest(format!("Invalid date: {}", query.date)))?;
    Ok(Json(state.dashboard().sales_on_date(date, state.now()).await?))
}

/// Sales chart series.
pub async fn sales_chart(
    State(state): State<AppState>,
    _account: RequireAuth,
    Query(query): Query<PeriodQuery>,
) -> Result<Json<SalesChart>> {
    let period = query.parse()?;
    Ok(Json(state.dashboard().sales_chart(period, state.now()).await?))
}

/// `?period=&category=` query.
#[derive(Debug, Deserialize)]
pub struct ProductsChartQuery {
    pub period: Option<String>,
    pub category: Option<String>,
}

/// Top products chart series.
pub async fn products_chart(
    State(state): State<AppState>,
    _account: RequireAuth,
    Query(query): Query<ProductsChartQuery>,
) -> Result<Json<ProductsChart>> {
    let period = PeriodQuery {
        period: query.period,
    }
    .parse()?;
    Ok(Json(
        state
            .dashboard()
            .top_products(period, query.category.as_deref(), state.now())
            .await?,
    ))
}

/// Inventory categories for the chart filter.
pub async fn categories(
    State(state): State<AppState>,
    _account: RequireAuth,
) -> Result<Json<Vec<String>>> {
    Ok(Json(state.dashboard().categories().await?))
}

/// Period report.
pub async fn report(
    State(state): State<AppState>,
    _account: RequireAuth,
    Query(query): Query<PeriodQuery>,
) -> Result<Json<SalesReport>> {
    let period = query.parse()?;
    Ok(Json(state.dashboard().report(period, state.now()).await?))
}

/// Period report as a printable text document.
pub async fn report_text(
    State(state): State<AppState>,
    _account: RequireAuth,
    Query(query): Query<PeriodQuery>,
) -> Result<impl IntoResponse> {
    let period = query.parse()?;
    let now = state.now();
    let report = state.dashboard().report(period, now).await?;
    let text = report
        .render_text(now)
        .map_err(|e| AppError::Internal(format!("report template: {e}")))?;

    Ok(([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], text))
}
