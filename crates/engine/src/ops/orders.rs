use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, NewOrderCmd, Order, ResultEngine, UpdateOrderCmd, locks::LedgerKey, orders,
    payments, util::ensure_positive,
};

use super::{Engine, normalize_required_text, with_tx};

/// Optional `created_at` bounds for [`Engine::list_orders`]. Both inclusive.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OrderListFilter {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl OrderListFilter {
    pub fn validate(&self) -> ResultEngine<()> {
        if let (Some(from), Some(to)) = (self.from, self.to)
            && from > to
        {
            return Err(EngineError::Validation(
                "invalid range: start must be <= end".to_string(),
            ));
        }
        Ok(())
    }
}

impl Engine {
    /// Creates an order, optionally with its first payment.
    ///
    /// When `delivery` is set the order starts delivered by the creating
    /// user. The initial payment follows the same rules as
    /// [`Engine::create_payment`]; if it is rejected the order is not created
    /// either.
    pub async fn new_order(&self, cmd: NewOrderCmd) -> ResultEngine<Order> {
        let source = normalize_required_text(&cmd.source, "source")?;
        let order_type = normalize_required_text(&cmd.order_type, "order_type")?;
        let mut order = Order::new(
            cmd.customer_id,
            source,
            order_type,
            cmd.quantity,
            cmd.pick_up,
            cmd.price_minor,
            cmd.user_id.clone(),
            cmd.at,
        )?;
        if cmd.delivery {
            order.mark_delivered(&cmd.user_id, cmd.at);
        }

        with_tx!(self, |db_tx| {
            self.require_user(&db_tx, &cmd.user_id).await?;
            self.require_customer(&db_tx, &cmd.customer_id.to_string())
                .await?;

            let model: orders::ActiveModel = (&order).into();
            model.insert(&db_tx).await?;

            if let Some(cash_in_minor) = cmd.initial_cash_in_minor {
                let payment = self
                    .append_payment(&db_tx, &order, cash_in_minor, &cmd.user_id, cmd.at)
                    .await?;
                order.payments.push(payment);
            }

            tracing::info!(
                order_id = %order.id,
                customer_id = %order.customer_id,
                price_minor = order.price_minor,
                "order created"
            );
            Ok(order)
        })
    }

    /// Partially updates an order and applies delivery transitions.
    pub async fn update_order(&self, cmd: UpdateOrderCmd) -> ResultEngine<Order> {
        let source = cmd
            .source
            .as_deref()
            .map(|s| normalize_required_text(s, "source"))
            .transpose()?;
        let order_type = cmd
            .order_type
            .as_deref()
            .map(|s| normalize_required_text(s, "order_type"))
            .transpose()?;
        if let Some(quantity) = cmd.quantity {
            ensure_positive(quantity, "quantity")?;
        }

        let _guard = self.locks.acquire(LedgerKey::Order(cmd.order_id)).await?;
        with_tx!(self, |db_tx| {
            self.require_user(&db_tx, &cmd.user_id).await?;
            let mut order = self.load_order(&db_tx, cmd.order_id).await?;

            if let Some(source) = source {
                order.source = source;
            }
            if let Some(order_type) = order_type {
                order.order_type = order_type;
            }
            if let Some(quantity) = cmd.quantity {
                order.quantity = quantity;
            }
            if let Some(pick_up) = cmd.pick_up {
                order.pick_up = pick_up;
            }
            let delivered_now = match cmd.delivery {
                Some(delivery) => order.apply_delivery(delivery, &cmd.user_id, cmd.at)?,
                None => false,
            };
            order.updated_at = cmd.at;
            order.updated_by = Some(cmd.user_id.clone());

            let mut active: orders::ActiveModel = (&order).into();
            // Fixed at creation.
            active.price_minor = ActiveValue::NotSet;
            active.created_at = ActiveValue::NotSet;
            active.created_by = ActiveValue::NotSet;
            active.update(&db_tx).await?;

            if delivered_now {
                tracing::info!(order_id = %order.id, user = %cmd.user_id, "order delivered");
            }
            Ok(order)
        })
    }

    /// Return an order with its payment ledger.
    pub async fn order(&self, order_id: Uuid) -> ResultEngine<Order> {
        with_tx!(self, |db_tx| self.load_order(&db_tx, order_id).await)
    }

    /// Orders by `created_at`, optionally bounded on either side.
    pub async fn list_orders(&self, filter: OrderListFilter) -> ResultEngine<Vec<Order>> {
        filter.validate()?;
        with_tx!(self, |db_tx| {
            let mut query = orders::Entity::find();
            if let Some(from) = filter.from {
                query = query.filter(orders::Column::CreatedAt.gte(from));
            }
            if let Some(to) = filter.to {
                query = query.filter(orders::Column::CreatedAt.lte(to));
            }
            let models = query
                .order_by_asc(orders::Column::CreatedAt)
                .all(&db_tx)
                .await?;
            self.with_payments(&db_tx, models).await
        })
    }

    /// Deletes an order together with its payments.
    pub async fn delete_order(&self, order_id: Uuid) -> ResultEngine<()> {
        let _guard = self.locks.acquire(LedgerKey::Order(order_id)).await?;
        with_tx!(self, |db_tx| {
            let order_id_str = order_id.to_string();
            self.require_order_model(&db_tx, &order_id_str).await?;

            let removed = payments::Entity::delete_many()
                .filter(payments::Column::OrderId.eq(order_id_str.clone()))
                .exec(&db_tx)
                .await?
                .rows_affected;
            orders::Entity::delete_by_id(order_id_str)
                .exec(&db_tx)
                .await?;

            tracing::info!(%order_id, payments = removed, "order deleted");
            Ok(())
        })
    }

    /// Orders not delivered yet.
    pub async fn pending_orders(&self) -> ResultEngine<Vec<Order>> {
        with_tx!(self, |db_tx| {
            let models = orders::Entity::find()
                .filter(orders::Column::Delivery.eq(false))
                .order_by_asc(orders::Column::CreatedAt)
                .all(&db_tx)
                .await?;
            self.with_payments(&db_tx, models).await
        })
    }

    /// Delivered orders still awaiting money: no payment at all, or a
    /// positive balance on the latest payment snapshot.
    pub async fn pending_payments(&self, customer_id: Option<Uuid>) -> ResultEngine<Vec<Order>> {
        with_tx!(self, |db_tx| {
            let mut query = orders::Entity::find().filter(orders::Column::Delivery.eq(true));
            if let Some(customer_id) = customer_id {
                let customer_id = customer_id.to_string();
                self.require_customer(&db_tx, &customer_id).await?;
                query = query.filter(orders::Column::CustomerId.eq(customer_id));
            }
            let models = query
                .order_by_asc(orders::Column::CreatedAt)
                .all(&db_tx)
                .await?;
            let orders = self.with_payments(&db_tx, models).await?;
            Ok(orders
                .into_iter()
                .filter(Order::awaits_payment)
                .collect::<Vec<_>>())
        })
    }
}
