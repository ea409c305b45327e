//! Payments API endpoints.

use api_types::{
    DateRangeQuery,
    payment::{PaymentNew, PaymentUpdate, PaymentView},
    report::{PaymentRangeQuery, PaymentRangeReportView},
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use axum_extra::extract::WithRejection;
use engine::{Actor, CreatePaymentCmd, DateRange, UpdatePaymentCmd};
use uuid::Uuid;

use crate::{
    ServerError, Success,
    server::ServerState,
    views::{self, Actors},
};

pub async fn create(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    WithRejection(Json(payload), _): WithRejection<Json<PaymentNew>, ServerError>,
) -> Result<Success<PaymentView>, ServerError> {
    let payment = state
        .engine
        .create_payment(CreatePaymentCmd::new(
            payload.order_id,
            &actor.username,
            payload.cash_in_minor,
        ))
        .await?;

    let actors = Actors::for_payments(&state.engine, std::slice::from_ref(&payment)).await?;
    Ok(Success::created(
        "Payment created successfully",
        actors.payment(&payment),
    ))
}

pub async fn update(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    WithRejection(Path(payment_id), _): WithRejection<Path<Uuid>, ServerError>,
    WithRejection(Json(payload), _): WithRejection<Json<PaymentUpdate>, ServerError>,
) -> Result<Success<PaymentView>, ServerError> {
    let mut cmd = UpdatePaymentCmd::new(payment_id, &actor.username);
    if let Some(cash_in_minor) = payload.cash_in_minor {
        cmd = cmd.cash_in(cash_in_minor);
    }
    let payment = state.engine.update_payment(cmd).await?;

    let actors = Actors::for_payments(&state.engine, std::slice::from_ref(&payment)).await?;
    Ok(Success::ok(
        "Payment updated successfully",
        actors.payment(&payment),
    ))
}

pub async fn delete(
    State(state): State<ServerState>,
    WithRejection(Path(payment_id), _): WithRejection<Path<Uuid>, ServerError>,
) -> Result<Success<()>, ServerError> {
    state.engine.delete_payment(payment_id).await?;
    Ok(Success::ok("Payment deleted successfully", ()))
}

pub async fn get(
    State(state): State<ServerState>,
    WithRejection(Path(payment_id), _): WithRejection<Path<Uuid>, ServerError>,
) -> Result<Success<PaymentView>, ServerError> {
    let payment = state.engine.payment(payment_id).await?;

    let actors = Actors::for_payments(&state.engine, std::slice::from_ref(&payment)).await?;
    Ok(Success::ok(
        "Payment retrieved successfully",
        actors.payment(&payment),
    ))
}

/// Ledger of one order, in `seq` order.
pub async fn for_order(
    State(state): State<ServerState>,
    WithRejection(Path(order_id), _): WithRejection<Path<Uuid>, ServerError>,
) -> Result<Success<Vec<PaymentView>>, ServerError> {
    let payments = state.engine.payments_for_order(order_id).await?;

    let actors = Actors::for_payments(&state.engine, &payments).await?;
    Ok(Success::ok(
        "Payments retrieved successfully",
        payments.iter().map(|p| actors.payment(p)).collect(),
    ))
}

/// Payments of the requested range, or of the current UTC day.
pub async fn list(
    State(state): State<ServerState>,
    WithRejection(Query(query), _): WithRejection<Query<DateRangeQuery>, ServerError>,
) -> Result<Success<Vec<PaymentView>>, ServerError> {
    let range = DateRange::parse_or_today(query.start_date.as_deref(), query.end_date.as_deref())?;
    let payments = state.engine.list_payments(Some(range)).await?;

    let actors = Actors::for_payments(&state.engine, &payments).await?;
    Ok(Success::ok(
        "Payments retrieved successfully",
        payments.iter().map(|p| actors.payment(p)).collect(),
    ))
}

pub async fn by_date_range(
    State(state): State<ServerState>,
    WithRejection(Json(payload), _): WithRejection<Json<PaymentRangeQuery>, ServerError>,
) -> Result<Success<PaymentRangeReportView>, ServerError> {
    let range = DateRange::parse(&payload.start_date, &payload.end_date)?;
    let report = state.engine.orders_by_payment_range(range).await?;

    Ok(Success::ok(
        "Orders retrieved successfully",
        views::payment_range_report(&state.engine, report).await?,
    ))
}
