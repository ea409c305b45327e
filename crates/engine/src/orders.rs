//! Orders and their fulfillment state.
//!
//! An [`Order`] owns an ordered ledger of [`Payment`]s. The price is fixed at
//! creation; delivery is a one-way transition from [`OrderStatus::Pending`]
//! to [`OrderStatus::Delivered`].

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    EngineError, Payment, ResultEngine,
    util::{ensure_non_negative, ensure_positive, parse_uuid},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Delivered,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub source: String,
    pub order_type: String,
    pub quantity: i64,
    pub pick_up: bool,
    pub delivery: bool,
    pub price_minor: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub created_by: Option<String>,
    pub updated_by: Option<String>,
    pub delivered_by: Option<String>,
    /// Payment ledger, sorted by `seq`. Empty unless loaded explicitly.
    pub payments: Vec<Payment>,
}

impl Order {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        customer_id: Uuid,
        source: String,
        order_type: String,
        quantity: i64,
        pick_up: bool,
        price_minor: i64,
        created_by: String,
        created_at: DateTime<Utc>,
    ) -> ResultEngine<Self> {
        ensure_non_negative(price_minor, "price_minor")?;
        ensure_positive(quantity, "quantity")?;
        Ok(Self {
            id: Uuid::new_v4(),
            customer_id,
            source,
            order_type,
            quantity,
            pick_up,
            delivery: false,
            price_minor,
            created_at,
            updated_at: created_at,
            delivered_at: None,
            created_by: Some(created_by.clone()),
            updated_by: Some(created_by),
            delivered_by: None,
            payments: Vec::new(),
        })
    }

    pub fn status(&self) -> OrderStatus {
        if self.delivery {
            OrderStatus::Delivered
        } else {
            OrderStatus::Pending
        }
    }

    /// Moves the order to `Delivered`.
    ///
    /// Returns `true` when the transition happened. Delivering an already
    /// delivered order keeps the original `delivered_at`/`delivered_by`.
    pub fn mark_delivered(&mut self, actor: &str, at: DateTime<Utc>) -> bool {
        if self.delivery {
            return false;
        }
        self.delivery = true;
        self.delivered_at = Some(at);
        self.delivered_by = Some(actor.to_string());
        true
    }

    /// Applies a requested delivery flag. Reverting a delivery is rejected.
    pub fn apply_delivery(
        &mut self,
        delivery: bool,
        actor: &str,
        at: DateTime<Utc>,
    ) -> ResultEngine<bool> {
        match (self.delivery, delivery) {
            (true, false) => Err(EngineError::Validation(
                "a delivered order cannot be reverted to pending".to_string(),
            )),
            (_, true) => Ok(self.mark_delivered(actor, at)),
            (false, false) => Ok(false),
        }
    }

    /// Sum of `cash_in_minor` over the loaded payments.
    pub fn total_paid_minor(&self) -> i64 {
        self.payments.iter().map(|p| p.cash_in_minor).sum()
    }

    /// The most recent payment by ledger sequence.
    pub fn last_payment(&self) -> Option<&Payment> {
        self.payments.iter().max_by_key(|p| p.seq)
    }

    /// Delivered and either unpaid or with a positive balance on the latest
    /// payment snapshot.
    pub fn awaits_payment(&self) -> bool {
        if !self.delivery {
            return false;
        }
        match self.last_payment() {
            None => true,
            Some(last) => last.remaining_amount_minor > 0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub customer_id: String,
    pub source: String,
    pub order_type: String,
    pub quantity: i64,
    pub pick_up: bool,
    pub delivery: bool,
    pub price_minor: i64,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
    pub delivered_at: Option<DateTimeUtc>,
    pub created_by: Option<String>,
    pub updated_by: Option<String>,
    pub delivered_by: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::payments::Entity")]
    Payments,
    #[sea_orm(
        belongs_to = "super::customers::Entity",
        from = "Column::CustomerId",
        to = "super::customers::Column::Id"
    )]
    Customers,
}

impl Related<super::payments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payments.def()
    }
}

impl Related<super::customers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Customers.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Order> for ActiveModel {
    fn from(order: &Order) -> Self {
        Self {
            id: ActiveValue::Set(order.id.to_string()),
            customer_id: ActiveValue::Set(order.customer_id.to_string()),
            source: ActiveValue::Set(order.source.clone()),
            order_type: ActiveValue::Set(order.order_type.clone()),
            quantity: ActiveValue::Set(order.quantity),
            pick_up: ActiveValue::Set(order.pick_up),
            delivery: ActiveValue::Set(order.delivery),
            price_minor: ActiveValue::Set(order.price_minor),
            created_at: ActiveValue::Set(order.created_at),
            updated_at: ActiveValue::Set(order.updated_at),
            delivered_at: ActiveValue::Set(order.delivered_at),
            created_by: ActiveValue::Set(order.created_by.clone()),
            updated_by: ActiveValue::Set(order.updated_by.clone()),
            delivered_by: ActiveValue::Set(order.delivered_by.clone()),
        }
    }
}

impl TryFrom<Model> for Order {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "order")?,
            customer_id: parse_uuid(&model.customer_id, "customer")?,
            source: model.source,
            order_type: model.order_type,
            quantity: model.quantity,
            pick_up: model.pick_up,
            delivery: model.delivery,
            price_minor: model.price_minor,
            created_at: model.created_at,
            updated_at: model.updated_at,
            delivered_at: model.delivered_at,
            created_by: model.created_by,
            updated_by: model.updated_by,
            delivered_by: model.delivered_by,
            payments: Vec::new(),
        })
    }
}
