use std::collections::{BTreeSet, HashMap};

use sea_orm::{QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    Customer, DateRange, Order, Payment, ResultEngine, customers, orders, payments,
};

use super::{Engine, with_tx};

/// A payment of a reported order, flagged when it falls inside the range.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentInRange {
    pub payment: Payment,
    pub in_range: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderPaymentSummary {
    pub order: Order,
    pub customer: Option<Customer>,
    /// Full ledger of the order, in `seq` order.
    pub payments: Vec<PaymentInRange>,
    pub total_in_range_minor: i64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRangeReport {
    pub orders: Vec<OrderPaymentSummary>,
    pub grand_total_minor: i64,
}

impl Engine {
    /// Orders that received at least one payment within `range`, with the
    /// money collected in that window.
    pub async fn orders_by_payment_range(
        &self,
        range: DateRange,
    ) -> ResultEngine<PaymentRangeReport> {
        with_tx!(self, |db_tx| {
            let hits = payments::Entity::find()
                .filter(payments::Column::CreatedAt.gte(range.start))
                .filter(payments::Column::CreatedAt.lte(range.end))
                .all(&db_tx)
                .await?;
            let order_ids: BTreeSet<String> = hits.into_iter().map(|p| p.order_id).collect();
            if order_ids.is_empty() {
                return Ok(PaymentRangeReport::default());
            }

            let models = orders::Entity::find()
                .filter(orders::Column::Id.is_in(order_ids))
                .order_by_asc(orders::Column::CreatedAt)
                .all(&db_tx)
                .await?;
            let customer_ids: BTreeSet<String> =
                models.iter().map(|m| m.customer_id.clone()).collect();
            let orders = self.with_payments(&db_tx, models).await?;

            let mut customers_by_id: HashMap<Uuid, Customer> = HashMap::new();
            for model in customers::Entity::find()
                .filter(customers::Column::Id.is_in(customer_ids))
                .all(&db_tx)
                .await?
            {
                let customer = Customer::try_from(model)?;
                customers_by_id.insert(customer.id, customer);
            }

            let mut report = PaymentRangeReport::default();
            for mut order in orders {
                let payments: Vec<PaymentInRange> = std::mem::take(&mut order.payments)
                    .into_iter()
                    .map(|payment| PaymentInRange {
                        in_range: range.contains(payment.created_at),
                        payment,
                    })
                    .collect();
                let total_in_range_minor = payments
                    .iter()
                    .filter(|p| p.in_range)
                    .map(|p| p.payment.cash_in_minor)
                    .sum();
                report.grand_total_minor += total_in_range_minor;
                report.orders.push(OrderPaymentSummary {
                    customer: customers_by_id.get(&order.customer_id).cloned(),
                    order,
                    payments,
                    total_in_range_minor,
                });
            }
            Ok(report)
        })
    }
}

