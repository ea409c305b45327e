//! Command structs for engine operations.
//!
//! These types group parameters for write operations (orders, payments,
//! stock movements), keeping call sites readable and avoiding long argument
//! lists. Every command carries the acting user and the instant the write is
//! recorded at (`at`, defaulting to now).

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{OilType, StockTransaction};

/// Create an order.
#[derive(Clone, Debug)]
pub struct NewOrderCmd {
    pub customer_id: Uuid,
    pub source: String,
    pub order_type: String,
    pub quantity: i64,
    pub pick_up: bool,
    pub delivery: bool,
    pub price_minor: i64,
    /// Optional first payment, written atomically with the order.
    pub initial_cash_in_minor: Option<i64>,
    pub user_id: String,
    pub at: DateTime<Utc>,
}

impl NewOrderCmd {
    #[must_use]
    pub fn new(
        customer_id: Uuid,
        user_id: impl Into<String>,
        source: impl Into<String>,
        order_type: impl Into<String>,
        quantity: i64,
        price_minor: i64,
    ) -> Self {
        Self {
            customer_id,
            source: source.into(),
            order_type: order_type.into(),
            quantity,
            pick_up: false,
            delivery: false,
            price_minor,
            initial_cash_in_minor: None,
            user_id: user_id.into(),
            at: Utc::now(),
        }
    }

    #[must_use]
    pub fn pick_up(mut self, pick_up: bool) -> Self {
        self.pick_up = pick_up;
        self
    }

    #[must_use]
    pub fn delivery(mut self, delivery: bool) -> Self {
        self.delivery = delivery;
        self
    }

    #[must_use]
    pub fn initial_cash_in(mut self, cash_in_minor: i64) -> Self {
        self.initial_cash_in_minor = Some(cash_in_minor);
        self
    }

    #[must_use]
    pub fn at(mut self, at: DateTime<Utc>) -> Self {
        self.at = at;
        self
    }
}

/// Partially update an order. `None` leaves a field unchanged.
///
/// The price is not part of the command: it is fixed at creation.
#[derive(Clone, Debug)]
pub struct UpdateOrderCmd {
    pub order_id: Uuid,
    pub source: Option<String>,
    pub order_type: Option<String>,
    pub quantity: Option<i64>,
    pub pick_up: Option<bool>,
    pub delivery: Option<bool>,
    pub user_id: String,
    pub at: DateTime<Utc>,
}

impl UpdateOrderCmd {
    #[must_use]
    pub fn new(order_id: Uuid, user_id: impl Into<String>) -> Self {
        Self {
            order_id,
            source: None,
            order_type: None,
            quantity: None,
            pick_up: None,
            delivery: None,
            user_id: user_id.into(),
            at: Utc::now(),
        }
    }

    #[must_use]
    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    #[must_use]
    pub fn order_type(mut self, order_type: impl Into<String>) -> Self {
        self.order_type = Some(order_type.into());
        self
    }

    #[must_use]
    pub fn quantity(mut self, quantity: i64) -> Self {
        self.quantity = Some(quantity);
        self
    }

    #[must_use]
    pub fn pick_up(mut self, pick_up: bool) -> Self {
        self.pick_up = Some(pick_up);
        self
    }

    #[must_use]
    pub fn delivery(mut self, delivery: bool) -> Self {
        self.delivery = Some(delivery);
        self
    }

    #[must_use]
    pub fn at(mut self, at: DateTime<Utc>) -> Self {
        self.at = at;
        self
    }
}

/// Append a payment to an order's ledger.
#[derive(Clone, Debug)]
pub struct CreatePaymentCmd {
    pub order_id: Uuid,
    pub cash_in_minor: i64,
    pub user_id: String,
    pub at: DateTime<Utc>,
}

impl CreatePaymentCmd {
    #[must_use]
    pub fn new(order_id: Uuid, user_id: impl Into<String>, cash_in_minor: i64) -> Self {
        Self {
            order_id,
            cash_in_minor,
            user_id: user_id.into(),
            at: Utc::now(),
        }
    }

    #[must_use]
    pub fn at(mut self, at: DateTime<Utc>) -> Self {
        self.at = at;
        self
    }
}

/// Correct an existing payment.
#[derive(Clone, Debug)]
pub struct UpdatePaymentCmd {
    pub payment_id: Uuid,
    pub cash_in_minor: Option<i64>,
    pub user_id: String,
    pub at: DateTime<Utc>,
}

impl UpdatePaymentCmd {
    #[must_use]
    pub fn new(payment_id: Uuid, user_id: impl Into<String>) -> Self {
        Self {
            payment_id,
            cash_in_minor: None,
            user_id: user_id.into(),
            at: Utc::now(),
        }
    }

    #[must_use]
    pub fn cash_in(mut self, cash_in_minor: i64) -> Self {
        self.cash_in_minor = Some(cash_in_minor);
        self
    }

    #[must_use]
    pub fn at(mut self, at: DateTime<Utc>) -> Self {
        self.at = at;
        self
    }
}

/// Record a stock movement for one oil type.
#[derive(Clone, Debug)]
pub struct OilStockCmd {
    pub oil_type: OilType,
    pub transaction: StockTransaction,
    pub user_id: String,
    pub at: DateTime<Utc>,
}

impl OilStockCmd {
    #[must_use]
    pub fn new(oil_type: OilType, user_id: impl Into<String>, transaction: StockTransaction) -> Self {
        Self {
            oil_type,
            transaction,
            user_id: user_id.into(),
            at: Utc::now(),
        }
    }

    #[must_use]
    pub fn purchase(
        oil_type: OilType,
        user_id: impl Into<String>,
        quantity: i64,
        price_minor: i64,
    ) -> Self {
        Self::new(
            oil_type,
            user_id,
            StockTransaction::Purchase {
                quantity,
                price_minor,
            },
        )
    }

    #[must_use]
    pub fn usage(oil_type: OilType, user_id: impl Into<String>, quantity: i64) -> Self {
        Self::new(oil_type, user_id, StockTransaction::Usage { quantity })
    }

    #[must_use]
    pub fn at(mut self, at: DateTime<Utc>) -> Self {
        self.at = at;
        self
    }
}
