//! Engine values to wire views.

use std::collections::HashMap;

use api_types::{
    ActorView,
    oil_stock::{OilStockView, StockReconciliationView},
    order::{OrderReconciliationView, OrderStatus, OrderView},
    payment::PaymentView,
    report::{CustomerView, OrderPaymentsView, PaymentRangeReportView},
};
use engine::{
    Actor, Customer, Engine, OilStockEntry, Order, OrderReconciliation, Payment,
    PaymentRangeReport, StockReconciliation,
};

use crate::ServerError;

/// Actor lookup for one response.
pub(crate) struct Actors(HashMap<String, Actor>);

impl Actors {
    pub(crate) async fn for_payments(
        engine: &Engine,
        payments: &[Payment],
    ) -> Result<Self, ServerError> {
        let names: Vec<String> = payments
            .iter()
            .flat_map(payment_actors)
            .map(str::to_string)
            .collect();
        Ok(Self(engine.actors(names.iter().map(String::as_str)).await?))
    }

    pub(crate) async fn for_orders<'a>(
        engine: &Engine,
        orders: impl IntoIterator<Item = &'a Order>,
    ) -> Result<Self, ServerError> {
        let names: Vec<String> = orders
            .into_iter()
            .flat_map(|order| {
                [&order.created_by, &order.updated_by, &order.delivered_by]
                    .into_iter()
                    .filter_map(|name| name.as_deref())
                    .chain(order.payments.iter().flat_map(payment_actors))
            })
            .map(str::to_string)
            .collect();
        Ok(Self(engine.actors(names.iter().map(String::as_str)).await?))
    }

    fn view(&self, username: &Option<String>) -> Option<ActorView> {
        let username = username.as_ref()?;
        Some(ActorView {
            username: username.clone(),
            role: self.0.get(username).map(|actor| actor.role.clone()),
        })
    }

    pub(crate) fn payment(&self, payment: &Payment) -> PaymentView {
        PaymentView {
            id: payment.id,
            order_id: payment.order_id,
            seq: payment.seq,
            cash_in_minor: payment.cash_in_minor,
            remaining_amount_minor: payment.remaining_amount_minor,
            created_at: payment.created_at,
            updated_at: payment.updated_at,
            created_by: self.view(&payment.created_by),
            updated_by: self.view(&payment.updated_by),
        }
    }

    pub(crate) fn order(&self, order: &Order) -> OrderView {
        let status = match order.status() {
            engine::OrderStatus::Pending => OrderStatus::Pending,
            engine::OrderStatus::Delivered => OrderStatus::Delivered,
        };
        OrderView {
            id: order.id,
            customer_id: order.customer_id,
            source: order.source.clone(),
            order_type: order.order_type.clone(),
            quantity: order.quantity,
            pick_up: order.pick_up,
            delivery: order.delivery,
            status,
            price_minor: order.price_minor,
            total_paid_minor: order.total_paid_minor(),
            created_at: order.created_at,
            updated_at: order.updated_at,
            delivered_at: order.delivered_at,
            created_by: self.view(&order.created_by),
            updated_by: self.view(&order.updated_by),
            delivered_by: self.view(&order.delivered_by),
            payments: order.payments.iter().map(|p| self.payment(p)).collect(),
        }
    }
}

fn payment_actors(payment: &Payment) -> impl Iterator<Item = &str> {
    [&payment.created_by, &payment.updated_by]
        .into_iter()
        .filter_map(|name| name.as_deref())
}

pub(crate) async fn payment_range_report(
    engine: &Engine,
    report: PaymentRangeReport,
) -> Result<PaymentRangeReportView, ServerError> {
    let orders: Vec<(Order, Option<Customer>, Vec<uuid::Uuid>, i64)> = report
        .orders
        .into_iter()
        .map(|summary| {
            let in_range = summary
                .payments
                .iter()
                .filter(|p| p.in_range)
                .map(|p| p.payment.id)
                .collect();
            let mut order = summary.order;
            order.payments = summary.payments.into_iter().map(|p| p.payment).collect();
            (
                order,
                summary.customer,
                in_range,
                summary.total_in_range_minor,
            )
        })
        .collect();

    let actors = Actors::for_orders(engine, orders.iter().map(|(order, ..)| order)).await?;
    Ok(PaymentRangeReportView {
        orders: orders
            .into_iter()
            .map(
                |(order, customer, in_range_payment_ids, total_in_range_minor)| OrderPaymentsView {
                    order: actors.order(&order),
                    customer: customer.map(customer_view),
                    in_range_payment_ids,
                    total_in_range_minor,
                },
            )
            .collect(),
        grand_total_minor: report.grand_total_minor,
    })
}

fn customer_view(customer: Customer) -> CustomerView {
    CustomerView {
        id: customer.id,
        shop_name: customer.shop_name,
        name: customer.name,
        phone_number: customer.phone_number,
    }
}

pub(crate) fn oil_stock(entry: OilStockEntry) -> OilStockView {
    OilStockView {
        id: entry.id,
        oil_type: entry.oil_type.to_string(),
        seq: entry.seq,
        oil_purchased: entry.oil_purchased,
        oil_used: entry.oil_used,
        purchase_price_minor: entry.purchase_price_minor,
        remaining_oil: entry.remaining_oil,
        created_at: entry.created_at,
        created_by: entry.created_by,
    }
}

pub(crate) fn stock_reconciliation(report: StockReconciliation) -> StockReconciliationView {
    StockReconciliationView {
        oil_type: report.oil_type.to_string(),
        entries: report.entries,
        total_purchased: report.total_purchased,
        total_used: report.total_used,
        latest_remaining: report.latest_remaining,
        mismatched_entries: report.mismatched_entries,
        went_negative: report.went_negative,
        consistent: report.consistent,
    }
}

pub(crate) fn order_reconciliation(report: OrderReconciliation) -> OrderReconciliationView {
    OrderReconciliationView {
        order_id: report.order_id,
        price_minor: report.price_minor,
        total_paid_minor: report.total_paid_minor,
        outstanding_minor: report.outstanding_minor,
        latest_snapshot_minor: report.latest_snapshot_minor,
        stale_snapshots: report.stale_snapshots,
        consistent: report.consistent,
    }
}
