//! Orders API endpoints.

use api_types::{
    DateRangeQuery,
    order::{OrderNew, OrderReconciliationView, OrderUpdate, OrderView, PendingPaymentsQuery},
};
use axum::{
    Extension, Json,
    extract::{Path, State},
};
use axum_extra::extract::WithRejection;
use engine::{Actor, Bound, NewOrderCmd, Order, OrderListFilter, UpdateOrderCmd, parse_bound};
use uuid::Uuid;

use crate::{
    ServerError, Success,
    server::ServerState,
    views::{self, Actors},
};

async fn order_views(
    state: &ServerState,
    orders: &[Order],
) -> Result<Vec<OrderView>, ServerError> {
    let actors = Actors::for_orders(&state.engine, orders).await?;
    Ok(orders.iter().map(|order| actors.order(order)).collect())
}

async fn order_view(state: &ServerState, order: &Order) -> Result<OrderView, ServerError> {
    let actors = Actors::for_orders(&state.engine, [order]).await?;
    Ok(actors.order(order))
}

pub async fn create(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    WithRejection(Json(payload), _): WithRejection<Json<OrderNew>, ServerError>,
) -> Result<Success<OrderView>, ServerError> {
    let mut cmd = NewOrderCmd::new(
        payload.customer_id,
        &actor.username,
        payload.source,
        payload.order_type,
        payload.quantity,
        payload.price_minor,
    )
    .pick_up(payload.pick_up)
    .delivery(payload.delivery);
    if let Some(cash_in_minor) = payload.cash_in_minor {
        cmd = cmd.initial_cash_in(cash_in_minor);
    }
    let order = state.engine.new_order(cmd).await?;

    Ok(Success::created(
        "Order created successfully",
        order_view(&state, &order).await?,
    ))
}

pub async fn update(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    WithRejection(Path(order_id), _): WithRejection<Path<Uuid>, ServerError>,
    WithRejection(Json(payload), _): WithRejection<Json<OrderUpdate>, ServerError>,
) -> Result<Success<OrderView>, ServerError> {
    let mut cmd = UpdateOrderCmd::new(order_id, &actor.username);
    if let Some(source) = payload.source {
        cmd = cmd.source(source);
    }
    if let Some(order_type) = payload.order_type {
        cmd = cmd.order_type(order_type);
    }
    if let Some(quantity) = payload.quantity {
        cmd = cmd.quantity(quantity);
    }
    if let Some(pick_up) = payload.pick_up {
        cmd = cmd.pick_up(pick_up);
    }
    if let Some(delivery) = payload.delivery {
        cmd = cmd.delivery(delivery);
    }
    let order = state.engine.update_order(cmd).await?;

    Ok(Success::ok(
        "Order updated successfully",
        order_view(&state, &order).await?,
    ))
}

pub async fn get(
    State(state): State<ServerState>,
    WithRejection(Path(order_id), _): WithRejection<Path<Uuid>, ServerError>,
) -> Result<Success<OrderView>, ServerError> {
    let order = state.engine.order(order_id).await?;
    Ok(Success::ok(
        "Order retrieved successfully",
        order_view(&state, &order).await?,
    ))
}

pub async fn delete(
    State(state): State<ServerState>,
    WithRejection(Path(order_id), _): WithRejection<Path<Uuid>, ServerError>,
) -> Result<Success<()>, ServerError> {
    state.engine.delete_order(order_id).await?;
    Ok(Success::ok("Order deleted successfully", ()))
}

/// Orders by creation time. Either bound may be omitted.
pub async fn list(
    State(state): State<ServerState>,
    WithRejection(Json(payload), _): WithRejection<Json<DateRangeQuery>, ServerError>,
) -> Result<Success<Vec<OrderView>>, ServerError> {
    let filter = OrderListFilter {
        from: payload
            .start_date
            .as_deref()
            .map(|s| parse_bound(s, Bound::Start))
            .transpose()?,
        to: payload
            .end_date
            .as_deref()
            .map(|s| parse_bound(s, Bound::End))
            .transpose()?,
    };
    let orders = state.engine.list_orders(filter).await?;

    Ok(Success::ok(
        "Orders retrieved successfully",
        order_views(&state, &orders).await?,
    ))
}

pub async fn reconcile(
    State(state): State<ServerState>,
    WithRejection(Path(order_id), _): WithRejection<Path<Uuid>, ServerError>,
) -> Result<Success<OrderReconciliationView>, ServerError> {
    let report = state.engine.reconcile_order(order_id).await?;
    Ok(Success::ok(
        "Order reconciled successfully",
        views::order_reconciliation(report),
    ))
}

pub async fn pending_orders(
    State(state): State<ServerState>,
) -> Result<Success<Vec<OrderView>>, ServerError> {
    let orders = state.engine.pending_orders().await?;
    Ok(Success::ok(
        "Pending orders retrieved successfully",
        order_views(&state, &orders).await?,
    ))
}

pub async fn pending_payments(
    State(state): State<ServerState>,
    WithRejection(Json(payload), _): WithRejection<Json<PendingPaymentsQuery>, ServerError>,
) -> Result<Success<Vec<OrderView>>, ServerError> {
    let orders = state.engine.pending_payments(payload.customer_id).await?;
    Ok(Success::ok(
        "Pending payments retrieved successfully",
        order_views(&state, &orders).await?,
    ))
}
