use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
};
use uuid::Uuid;

use crate::{
    CreatePaymentCmd, DateRange, EngineError, Order, OrderReconciliation, Payment, PaymentLedger,
    ResultEngine, UpdatePaymentCmd,
    locks::LedgerKey,
    payments, reconcile_payments,
    util::conflict_on_unique,
};

use super::{Engine, with_tx};

impl Engine {
    /// Appends `cash_in_minor` to the ledger of an already loaded order.
    ///
    /// The caller holds the order's ledger lock and passes the order with its
    /// full payment history.
    pub(super) async fn append_payment(
        &self,
        db: &DatabaseTransaction,
        order: &Order,
        cash_in_minor: i64,
        user_id: &str,
        at: DateTime<Utc>,
    ) -> ResultEngine<Payment> {
        let ledger = PaymentLedger::new(order.price_minor, &order.payments);
        let remaining_amount_minor = ledger.apply(cash_in_minor)?;
        // One past the highest surviving payment.
        let seq = order.last_payment().map_or(1, |p| p.seq + 1);

        let payment = Payment {
            id: Uuid::new_v4(),
            order_id: order.id,
            seq,
            cash_in_minor,
            remaining_amount_minor,
            created_at: at,
            updated_at: at,
            created_by: Some(user_id.to_string()),
            updated_by: Some(user_id.to_string()),
        };
        let model: payments::ActiveModel = (&payment).into();
        model
            .insert(db)
            .await
            .map_err(|err| conflict_on_unique(err, "payment ledger"))?;

        tracing::info!(
            order_id = %order.id,
            payment_id = %payment.id,
            seq,
            cash_in_minor,
            remaining_amount_minor,
            "payment recorded"
        );
        Ok(payment)
    }

    /// Records a payment against an order.
    ///
    /// The new payment snapshots the balance still owed after it. Payments
    /// exceeding the order price are rejected with
    /// [`EngineError::Overpayment`] and nothing is written.
    pub async fn create_payment(&self, cmd: CreatePaymentCmd) -> ResultEngine<Payment> {
        let _guard = self.locks.acquire(LedgerKey::Order(cmd.order_id)).await?;
        with_tx!(self, |db_tx| {
            self.require_user(&db_tx, &cmd.user_id).await?;
            let order = self.load_order(&db_tx, cmd.order_id).await?;
            self.append_payment(&db_tx, &order, cmd.cash_in_minor, &cmd.user_id, cmd.at)
                .await
        })
    }

    /// Corrects an existing payment.
    ///
    /// The edited payment gets a fresh snapshot computed against every other
    /// payment of the order. Snapshots of later payments are left as they
    /// were; see [`Engine::reconcile_order`].
    pub async fn update_payment(&self, cmd: UpdatePaymentCmd) -> ResultEngine<Payment> {
        let order_id = self.payment(cmd.payment_id).await?.order_id;
        let _guard = self.locks.acquire(LedgerKey::Order(order_id)).await?;
        with_tx!(self, |db_tx| {
            self.require_user(&db_tx, &cmd.user_id).await?;
            let model = self
                .require_payment_model(&db_tx, &cmd.payment_id.to_string())
                .await?;
            let order = self.load_order(&db_tx, order_id).await?;

            let mut active: payments::ActiveModel = model.into();
            if let Some(cash_in_minor) = cmd.cash_in_minor {
                let ledger = PaymentLedger::excluding(
                    order.price_minor,
                    &order.payments,
                    cmd.payment_id,
                );
                let remaining_amount_minor = ledger.apply(cash_in_minor)?;
                active.cash_in_minor = ActiveValue::Set(cash_in_minor);
                active.remaining_amount_minor = ActiveValue::Set(remaining_amount_minor);
            }
            active.updated_at = ActiveValue::Set(cmd.at);
            active.updated_by = ActiveValue::Set(Some(cmd.user_id.clone()));
            let payment = Payment::try_from(active.update(&db_tx).await?)?;

            tracing::info!(
                order_id = %order_id,
                payment_id = %payment.id,
                cash_in_minor = payment.cash_in_minor,
                "payment updated"
            );
            Ok(payment)
        })
    }

    /// Removes a payment. Snapshots of the remaining payments are untouched.
    pub async fn delete_payment(&self, payment_id: Uuid) -> ResultEngine<()> {
        let order_id = self.payment(payment_id).await?.order_id;
        let _guard = self.locks.acquire(LedgerKey::Order(order_id)).await?;
        with_tx!(self, |db_tx| {
            let res = payments::Entity::delete_by_id(payment_id.to_string())
                .exec(&db_tx)
                .await?;
            if res.rows_affected == 0 {
                return Err(EngineError::KeyNotFound("payment not exists".to_string()));
            }
            tracing::info!(%order_id, %payment_id, "payment deleted");
            Ok(())
        })
    }

    /// Return a payment snapshot from DB.
    pub async fn payment(&self, payment_id: Uuid) -> ResultEngine<Payment> {
        with_tx!(self, |db_tx| {
            let model = self
                .require_payment_model(&db_tx, &payment_id.to_string())
                .await?;
            Payment::try_from(model)
        })
    }

    /// The payment ledger of one order, in `seq` order.
    pub async fn payments_for_order(&self, order_id: Uuid) -> ResultEngine<Vec<Payment>> {
        with_tx!(self, |db_tx| {
            self.require_order_model(&db_tx, &order_id.to_string())
                .await?;
            self.order_payments(&db_tx, order_id).await
        })
    }

    /// Payments created within `range`, or within the current UTC day when
    /// no range is given.
    pub async fn list_payments(&self, range: Option<DateRange>) -> ResultEngine<Vec<Payment>> {
        let range = range.unwrap_or_else(DateRange::today);
        with_tx!(self, |db_tx| {
            payments::Entity::find()
                .filter(payments::Column::CreatedAt.gte(range.start))
                .filter(payments::Column::CreatedAt.lte(range.end))
                .order_by_asc(payments::Column::CreatedAt)
                .order_by_asc(payments::Column::Seq)
                .all(&db_tx)
                .await?
                .into_iter()
                .map(Payment::try_from)
                .collect::<ResultEngine<Vec<_>>>()
        })
    }

    /// Replays an order's payments and compares them with the stored
    /// snapshots.
    pub async fn reconcile_order(&self, order_id: Uuid) -> ResultEngine<OrderReconciliation> {
        with_tx!(self, |db_tx| {
            let order = self.load_order(&db_tx, order_id).await?;
            Ok(reconcile_payments(
                order.id,
                order.price_minor,
                &order.payments,
            ))
        })
    }
}
