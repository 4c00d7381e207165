//! Operator dashboard route handlers.
//!
//! Query parameters are optional; missing ones take the engine defaults and
//! out-of-range ones come back as 400 with a `validation_error` body.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State, rejection::QueryRejection},
    routing::get,
};
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::instrument;

use super::bad_request;
use crate::error::AppError;
use crate::models::{DailySales, KpiSummary, PaymentMethodShare, ProductRanking};
use crate::state::AppState;

/// Create the dashboard routes router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/daily-sales", get(daily_sales))
        .route("/payment-methods", get(payment_methods))
        .route("/top-products/quantity", get(top_by_quantity))
        .route("/top-products/profit", get(top_by_profit))
        .route("/top-products/profit-by-date", get(top_by_profit_on))
        .route("/dates", get(available_dates))
        .route("/kpis", get(kpis))
}

/// Window and size parameters shared by dashboard views.
#[derive(Debug, Default, Deserialize)]
pub struct WindowQuery {
    pub days: Option<i64>,
    pub top: Option<i64>,
    pub date: Option<String>,
}

type WindowParams = Result<Query<WindowQuery>, QueryRejection>;

fn params(query: WindowParams) -> Result<WindowQuery, AppError> {
    query.map(|Query(q)| q).map_err(bad_request)
}

/// `GET /api/dashboard/daily-sales?days=`
#[instrument(skip(state))]
pub async fn daily_sales(
    State(state): State<AppState>,
    query: WindowParams,
) -> Result<Json<Arc<Vec<DailySales>>>, AppError> {
    let q = params(query)?;
    Ok(Json(state.analytics().daily_sales(q.days).await?))
}

/// `GET /api/dashboard/payment-methods`
#[instrument(skip(state))]
pub async fn payment_methods(
    State(state): State<AppState>,
) -> Result<Json<Arc<Vec<PaymentMethodShare>>>, AppError> {
    Ok(Json(state.analytics().payment_methods().await?))
}

/// `GET /api/dashboard/top-products/quantity?days=&top=`
#[instrument(skip(state))]
pub async fn top_by_quantity(
    State(state): State<AppState>,
    query: WindowParams,
) -> Result<Json<Arc<Vec<ProductRanking>>>, AppError> {
    let q = params(query)?;
    Ok(Json(state.analytics().top_by_quantity(q.days, q.top).await?))
}

/// `GET /api/dashboard/top-products/profit?days=&top=`
#[instrument(skip(state))]
pub async fn top_by_profit(
    State(state): State<AppState>,
    query: WindowParams,
) -> Result<Json<Arc<Vec<ProductRanking>>>, AppError> {
    let q = params(query)?;
    Ok(Json(state.analytics().top_by_profit(q.days, q.top).await?))
}

/// `GET /api/dashboard/top-products/profit-by-date?date=&top=`
#[instrument(skip(state))]
pub async fn top_by_profit_on(
    State(state): State<AppState>,
    query: WindowParams,
) -> Result<Json<Arc<Vec<ProductRanking>>>, AppError> {
    let q = params(query)?;
    Ok(Json(
        state
            .analytics()
            .top_by_profit_on(q.date.as_deref(), q.top)
            .await?,
    ))
}

/// `GET /api/dashboard/dates?top=`
#[instrument(skip(state))]
pub async fn available_dates(
    State(state): State<AppState>,
    query: WindowParams,
) -> Result<Json<Arc<Vec<NaiveDate>>>, AppError> {
    let q = params(query)?;
    Ok(Json(state.analytics().available_dates(q.top).await?))
}

/// `GET /api/dashboard/kpis?days=`
#[instrument(skip(state))]
pub async fn kpis(
    State(state): State<AppState>,
    query: WindowParams,
) -> Result<Json<KpiSummary>, AppError> {
    let q = params(query)?;
    Ok(Json(state.analytics().kpis(q.days).await?))
}
