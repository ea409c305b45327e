//! Oil stock API endpoints.

use std::collections::BTreeMap;

use api_types::oil_stock::{OilStockNew, OilStockQuery, OilStockView, StockReconciliationView};
use axum::{
    Extension, Json,
    extract::{Path, State},
};
use axum_extra::extract::WithRejection;
use engine::{Actor, DateRange, OilStockCmd, OilType, StockTransaction};

use crate::{ServerError, Success, server::ServerState, views};

pub async fn create(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    WithRejection(Json(payload), _): WithRejection<Json<OilStockNew>, ServerError>,
) -> Result<Success<OilStockView>, ServerError> {
    let oil_type = OilType::try_from(payload.oil_type.as_str())?;
    let transaction = StockTransaction::from_parts(
        payload.oil_purchased,
        payload.purchase_price_minor,
        payload.oil_used,
    )?;
    let entry = state
        .engine
        .record_oil_stock(OilStockCmd::new(oil_type, &actor.username, transaction))
        .await?;

    Ok(Success::created(
        "Oil stock entry created successfully",
        views::oil_stock(entry),
    ))
}

pub async fn list(
    State(state): State<ServerState>,
    WithRejection(Json(payload), _): WithRejection<Json<OilStockQuery>, ServerError>,
) -> Result<Success<Vec<OilStockView>>, ServerError> {
    let range = DateRange::parse(&payload.start_date, &payload.end_date)?;
    let entries = state.engine.list_oil_stock(range).await?;
    Ok(Success::ok(
        "Oil stock entries retrieved successfully",
        entries.into_iter().map(views::oil_stock).collect(),
    ))
}

/// Latest remaining stock keyed by oil type name.
pub async fn remaining(
    State(state): State<ServerState>,
) -> Result<Success<BTreeMap<String, i64>>, ServerError> {
    let remaining = state.engine.remaining_oil().await?;
    Ok(Success::ok(
        "Remaining oil retrieved successfully",
        remaining
            .into_iter()
            .map(|(oil_type, quantity)| (oil_type.to_string(), quantity))
            .collect(),
    ))
}

pub async fn reconcile(
    State(state): State<ServerState>,
    WithRejection(Path(oil_type), _): WithRejection<Path<String>, ServerError>,
) -> Result<Success<StockReconciliationView>, ServerError> {
    let oil_type = OilType::try_from(oil_type.as_str())?;
    let report = state.engine.reconcile_oil_stock(oil_type).await?;
    Ok(Success::ok(
        "Oil stock reconciled successfully",
        views::stock_reconciliation(report),
    ))
}
