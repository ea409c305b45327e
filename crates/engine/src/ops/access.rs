use std::collections::HashMap;

use sea_orm::{DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    Actor, EngineError, Order, Payment, ResultEngine, customers, orders, payments, users,
};

use super::{Engine, with_tx};

/// Generates a `require_*` lookup that maps a missing row to `KeyNotFound`.
macro_rules! impl_require_model {
    ($fn_name:ident, $entity:path, $model:path, $err_msg:literal) => {
        pub(super) async fn $fn_name(
            &self,
            db: &DatabaseTransaction,
            id: &str,
        ) -> ResultEngine<$model> {
            <$entity>::find_by_id(id.to_string())
                .one(db)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound($err_msg.to_string()))
        }
    };
}

impl Engine {
    impl_require_model!(require_user, users::Entity, users::Model, "user not exists");

    impl_require_model!(
        require_customer,
        customers::Entity,
        customers::Model,
        "customer not exists"
    );

    impl_require_model!(
        require_order_model,
        orders::Entity,
        orders::Model,
        "order not exists"
    );

    impl_require_model!(
        require_payment_model,
        payments::Entity,
        payments::Model,
        "payment not exists"
    );

    /// Payments of one order in ledger order.
    pub(super) async fn order_payments(
        &self,
        db: &DatabaseTransaction,
        order_id: Uuid,
    ) -> ResultEngine<Vec<Payment>> {
        payments::Entity::find()
            .filter(payments::Column::OrderId.eq(order_id.to_string()))
            .order_by_asc(payments::Column::Seq)
            .all(db)
            .await?
            .into_iter()
            .map(Payment::try_from)
            .collect()
    }

    /// Loads an order together with its full payment ledger.
    pub(super) async fn load_order(
        &self,
        db: &DatabaseTransaction,
        order_id: Uuid,
    ) -> ResultEngine<Order> {
        let model = self.require_order_model(db, &order_id.to_string()).await?;
        let mut order = Order::try_from(model)?;
        order.payments = self.order_payments(db, order_id).await?;
        Ok(order)
    }

    /// Converts order rows and attaches their payments with one extra query.
    pub(super) async fn with_payments(
        &self,
        db: &DatabaseTransaction,
        models: Vec<orders::Model>,
    ) -> ResultEngine<Vec<Order>> {
        if models.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<String> = models.iter().map(|m| m.id.clone()).collect();
        let mut by_order: HashMap<Uuid, Vec<Payment>> = HashMap::new();
        let rows = payments::Entity::find()
            .filter(payments::Column::OrderId.is_in(ids))
            .order_by_asc(payments::Column::OrderId)
            .order_by_asc(payments::Column::Seq)
            .all(db)
            .await?;
        for row in rows {
            let payment = Payment::try_from(row)?;
            by_order.entry(payment.order_id).or_default().push(payment);
        }

        models
            .into_iter()
            .map(|model| {
                let mut order = Order::try_from(model)?;
                order.payments = by_order.remove(&order.id).unwrap_or_default();
                Ok(order)
            })
            .collect()
    }

    /// Resolves one actor reference.
    pub async fn actor(&self, username: &str) -> ResultEngine<Actor> {
        with_tx!(self, |db_tx| {
            let model = self.require_user(&db_tx, username).await?;
            Ok(Actor::from(model))
        })
    }

    /// Resolves actor references in bulk. Unknown usernames are omitted.
    pub async fn actors<'a>(
        &self,
        usernames: impl IntoIterator<Item = &'a str>,
    ) -> ResultEngine<HashMap<String, Actor>> {
        let mut wanted: Vec<String> = usernames.into_iter().map(str::to_string).collect();
        wanted.sort();
        wanted.dedup();
        if wanted.is_empty() {
            return Ok(HashMap::new());
        }
        with_tx!(self, |db_tx| {
            let rows = users::Entity::find()
                .filter(users::Column::Username.is_in(wanted))
                .all(&db_tx)
                .await?;
            Ok(rows
                .into_iter()
                .map(|model| (model.username.clone(), Actor::from(model)))
                .collect())
        })
    }
}
