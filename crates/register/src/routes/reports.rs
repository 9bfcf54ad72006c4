//! Report route handlers.

use axum::{
    Json,
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use tillpoint_core::Feature;

use super::document_response;
use crate::documents::DocumentRequest;
use crate::error::Result;
use crate::middleware::CurrentUser;
use crate::models::Order;
use crate::services::{SalesSummary, orders_on, summarize};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct DailyQuery {
    /// Defaults to today (UTC).
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub format: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DailyReport {
    pub date: NaiveDate,
    pub summary: SalesSummary,
    pub orders: Vec<Order>,
}

/// Sales for one day, as JSON or (`format=html`) as a printable report.
#[instrument(skip(state, user))]
pub async fn daily(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<DailyQuery>,
) -> Result<Response> {
    user.require(Feature::Reports)?;
    let date = query.date.unwrap_or_else(|| Utc::now().date_naive());
    let orders = orders_on(state.catalog(), date)?;

    if query.format.as_deref() == Some("html") {
        let document = state.documents().render(DocumentRequest::DailySalesReport {
            date,
            orders: &orders,
        })?;
        return Ok(document_response(document));
    }

    let summary = summarize(&orders);
    Ok(Json(DailyReport {
        date,
        summary,
        orders,
    })
    .into_response())
}
