//! Payment primitives.
//!
//! A [`Payment`] is one entry of an order's payment ledger. Each entry stores
//! a snapshot of the balance still owed on the order right after it was
//! applied (`remaining_amount_minor`). Ledger order is the per-order `seq`.
//!
//! Snapshots are point-in-time values: editing or deleting an earlier payment
//! does not rewrite the snapshots of the payments that follow it. Use
//! [`reconcile_payments`] to compare stored snapshots with the replayed
//! balance.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine,
    util::{ensure_positive, parse_uuid},
};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub id: Uuid,
    pub order_id: Uuid,
    /// 1-based position in the order's ledger.
    pub seq: i64,
    pub cash_in_minor: i64,
    pub remaining_amount_minor: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: Option<String>,
    pub updated_by: Option<String>,
}

/// Running balance of a single order.
///
/// Built from the order price and the payments already on the ledger; it
/// answers "what would the balance be after applying `cash_in`".
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PaymentLedger {
    price_minor: i64,
    paid_minor: i64,
}

impl PaymentLedger {
    pub fn new<'a>(price_minor: i64, payments: impl IntoIterator<Item = &'a Payment>) -> Self {
        Self {
            price_minor,
            paid_minor: payments.into_iter().map(|p| p.cash_in_minor).sum(),
        }
    }

    /// Ledger of an order with one payment left out (the one being edited).
    pub fn excluding<'a>(
        price_minor: i64,
        payments: impl IntoIterator<Item = &'a Payment>,
        payment_id: Uuid,
    ) -> Self {
        Self::new(
            price_minor,
            payments.into_iter().filter(|p| p.id != payment_id),
        )
    }

    pub fn paid_minor(&self) -> i64 {
        self.paid_minor
    }

    pub fn outstanding_minor(&self) -> i64 {
        self.price_minor - self.paid_minor
    }

    /// Remaining amount after applying `cash_in_minor`.
    ///
    /// Fails with [`EngineError::Overpayment`] when the cumulative payments
    /// would exceed the price.
    pub fn apply(&self, cash_in_minor: i64) -> ResultEngine<i64> {
        ensure_positive(cash_in_minor, "cash_in_minor")?;
        let paid = self
            .paid_minor
            .checked_add(cash_in_minor)
            .ok_or_else(|| EngineError::Validation("cash_in_minor overflow".to_string()))?;
        let remaining = self.price_minor - paid;
        if remaining < 0 {
            return Err(EngineError::Overpayment(format!(
                "outstanding {}, got {}",
                self.outstanding_minor(),
                cash_in_minor
            )));
        }
        Ok(remaining)
    }
}

/// Result of replaying an order's payment ledger.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderReconciliation {
    pub order_id: Uuid,
    pub price_minor: i64,
    pub total_paid_minor: i64,
    pub outstanding_minor: i64,
    pub latest_snapshot_minor: Option<i64>,
    /// Payments whose stored snapshot differs from the replayed balance.
    pub stale_snapshots: Vec<Uuid>,
    pub consistent: bool,
}

/// Replays `payments` in `seq` order against `price_minor`.
pub fn reconcile_payments(
    order_id: Uuid,
    price_minor: i64,
    payments: &[Payment],
) -> OrderReconciliation {
    let mut ordered: Vec<&Payment> = payments.iter().collect();
    ordered.sort_by_key(|p| p.seq);

    let mut running = price_minor;
    let mut stale_snapshots = Vec::new();
    for payment in &ordered {
        running -= payment.cash_in_minor;
        if payment.remaining_amount_minor != running {
            stale_snapshots.push(payment.id);
        }
    }

    let latest_snapshot_minor = ordered.last().map(|p| p.remaining_amount_minor);
    let consistent = running >= 0
        && latest_snapshot_minor.is_none_or(|snapshot| snapshot == running);

    OrderReconciliation {
        order_id,
        price_minor,
        total_paid_minor: price_minor - running,
        outstanding_minor: running,
        latest_snapshot_minor,
        stale_snapshots,
        consistent,
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "payments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub order_id: String,
    pub seq: i64,
    pub cash_in_minor: i64,
    pub remaining_amount_minor: i64,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
    pub created_by: Option<String>,
    pub updated_by: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::orders::Entity",
        from = "Column::OrderId",
        to = "super::orders::Column::Id"
    )]
    Orders,
}

impl Related<super::orders::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Orders.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Payment> for ActiveModel {
    fn from(payment: &Payment) -> Self {
        Self {
            id: ActiveValue::Set(payment.id.to_string()),
            order_id: ActiveValue::Set(payment.order_id.to_string()),
            seq: ActiveValue::Set(payment.seq),
            cash_in_minor: ActiveValue::Set(payment.cash_in_minor),
            remaining_amount_minor: ActiveValue::Set(payment.remaining_amount_minor),
            created_at: ActiveValue::Set(payment.created_at),
            updated_at: ActiveValue::Set(payment.updated_at),
            created_by: ActiveValue::Set(payment.created_by.clone()),
            updated_by: ActiveValue::Set(payment.updated_by.clone()),
        }
    }
}

impl TryFrom<Model> for Payment {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "payment")?,
            order_id: parse_uuid(&model.order_id, "order")?,
            seq: model.seq,
            cash_in_minor: model.cash_in_minor,
            remaining_amount_minor: model.remaining_amount_minor,
            created_at: model.created_at,
            updated_at: model.updated_at,
            created_by: model.created_by,
            updated_by: model.updated_by,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payment(seq: i64, cash_in_minor: i64, remaining_amount_minor: i64) -> Payment {
        let now = Utc::now();
        Payment {
            id: Uuid::new_v4(),
            order_id: Uuid::nil(),
            seq,
            cash_in_minor,
            remaining_amount_minor,
            created_at: now,
            updated_at: now,
            created_by: None,
            updated_by: None,
        }
    }

    #[test]
    fn apply_computes_remaining_balance() {
        let ledger = PaymentLedger::new(100, &[]);
        assert_eq!(ledger.apply(60).unwrap(), 40);

        let history = vec![payment(1, 60, 40)];
        let ledger = PaymentLedger::new(100, &history);
        assert_eq!(ledger.paid_minor(), 60);
        assert_eq!(ledger.apply(40).unwrap(), 0);
    }

    #[test]
    fn apply_rejects_overpayment() {
        let history = vec![payment(1, 60, 40), payment(2, 40, 0)];
        let ledger = PaymentLedger::new(100, &history);
        let err = ledger.apply(1).unwrap_err();
        assert!(matches!(err, EngineError::Overpayment(_)));
    }

    #[test]
    fn apply_rejects_non_positive_cash_in() {
        let ledger = PaymentLedger::new(100, &[]);
        assert!(matches!(
            ledger.apply(0).unwrap_err(),
            EngineError::Validation(_)
        ));
        assert!(matches!(
            ledger.apply(-5).unwrap_err(),
            EngineError::Validation(_)
        ));
    }

    #[test]
    fn excluding_leaves_out_the_edited_payment() {
        let first = payment(1, 60, 40);
        let second = payment(2, 30, 10);
        let history = vec![first.clone(), second.clone()];

        let ledger = PaymentLedger::excluding(100, &history, first.id);
        assert_eq!(ledger.paid_minor(), 30);
        assert_eq!(ledger.apply(70).unwrap(), 0);
        assert!(ledger.apply(71).is_err());
    }

    #[test]
    fn reconcile_detects_stale_snapshots() {
        let first = payment(1, 50, 40);
        let second = payment(2, 40, 0);
        let report = reconcile_payments(Uuid::nil(), 100, &[second.clone(), first.clone()]);

        assert_eq!(report.total_paid_minor, 90);
        assert_eq!(report.outstanding_minor, 10);
        assert_eq!(report.latest_snapshot_minor, Some(0));
        assert_eq!(report.stale_snapshots, vec![first.id, second.id]);
        assert!(!report.consistent);
    }

    #[test]
    fn reconcile_empty_ledger_is_consistent() {
        let report = reconcile_payments(Uuid::nil(), 100, &[]);
        assert_eq!(report.outstanding_minor, 100);
        assert_eq!(report.latest_snapshot_minor, None);
        assert!(report.consistent);
    }
}
