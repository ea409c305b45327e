use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Uniform response body.
///
/// `http_status_code` mirrors the HTTP status of the response; `data` is
/// `null` on errors.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope<T> {
    pub succeeded: bool,
    pub http_status_code: u16,
    pub message: String,
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    pub fn success(http_status_code: u16, message: impl Into<String>, data: T) -> Self {
        Self {
            succeeded: true,
            http_status_code,
            message: message.into(),
            data: Some(data),
        }
    }

    pub fn failure(http_status_code: u16, message: impl Into<String>) -> Self {
        Self {
            succeeded: false,
            http_status_code,
            message: message.into(),
            data: None,
        }
    }
}

/// Optional date filter.
///
/// Each bound is either `YYYY-MM-DD` or an RFC 3339 date-time.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRangeQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// A resolved `created_by`/`updated_by`/`delivered_by` reference.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorView {
    pub username: String,
    /// `None` when the user no longer exists.
    pub role: Option<String>,
}

pub mod payment {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct PaymentNew {
        pub order_id: Uuid,
        pub cash_in_minor: i64,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct PaymentUpdate {
        pub cash_in_minor: Option<i64>,
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct PaymentView {
        pub id: Uuid,
        pub order_id: Uuid,
        pub seq: i64,
        pub cash_in_minor: i64,
        /// Balance owed on the order right after this payment.
        pub remaining_amount_minor: i64,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
        pub created_by: Option<ActorView>,
        pub updated_by: Option<ActorView>,
    }
}

pub mod order {
    use super::*;
    use crate::payment::PaymentView;

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct OrderNew {
        pub customer_id: Uuid,
        pub source: String,
        #[serde(rename = "type")]
        pub order_type: String,
        pub quantity: i64,
        #[serde(default)]
        pub pick_up: bool,
        #[serde(default)]
        pub delivery: bool,
        pub price_minor: i64,
        /// Optional first payment, recorded together with the order.
        pub cash_in_minor: Option<i64>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct OrderUpdate {
        pub source: Option<String>,
        #[serde(rename = "type")]
        pub order_type: Option<String>,
        pub quantity: Option<i64>,
        pub pick_up: Option<bool>,
        pub delivery: Option<bool>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct PendingPaymentsQuery {
        pub customer_id: Option<Uuid>,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum OrderStatus {
        Pending,
        Delivered,
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct OrderView {
        pub id: Uuid,
        pub customer_id: Uuid,
        pub source: String,
        #[serde(rename = "type")]
        pub order_type: String,
        pub quantity: i64,
        pub pick_up: bool,
        pub delivery: bool,
        pub status: OrderStatus,
        pub price_minor: i64,
        pub total_paid_minor: i64,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
        pub delivered_at: Option<DateTime<Utc>>,
        pub created_by: Option<ActorView>,
        pub updated_by: Option<ActorView>,
        pub delivered_by: Option<ActorView>,
        pub payments: Vec<PaymentView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct OrderReconciliationView {
        pub order_id: Uuid,
        pub price_minor: i64,
        pub total_paid_minor: i64,
        pub outstanding_minor: i64,
        pub latest_snapshot_minor: Option<i64>,
        pub stale_snapshots: Vec<Uuid>,
        pub consistent: bool,
    }
}

pub mod oil_stock {
    use super::*;

    /// Either `oilPurchased` (with optional `purchasePriceMinor`) or
    /// `oilUsed`, never both.
    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct OilStockNew {
        pub oil_type: String,
        pub oil_purchased: Option<i64>,
        pub purchase_price_minor: Option<i64>,
        pub oil_used: Option<i64>,
    }

    /// Both bounds are required.
    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct OilStockQuery {
        pub start_date: String,
        pub end_date: String,
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct OilStockView {
        pub id: Uuid,
        pub oil_type: String,
        pub seq: i64,
        pub oil_purchased: i64,
        pub oil_used: i64,
        pub purchase_price_minor: i64,
        pub remaining_oil: i64,
        pub created_at: DateTime<Utc>,
        pub created_by: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct StockReconciliationView {
        pub oil_type: String,
        pub entries: usize,
        pub total_purchased: i64,
        pub total_used: i64,
        pub latest_remaining: i64,
        pub mismatched_entries: Vec<Uuid>,
        pub went_negative: bool,
        pub consistent: bool,
    }
}

pub mod report {
    use super::*;
    use crate::order::OrderView;

    /// Both bounds are required.
    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct PaymentRangeQuery {
        pub start_date: String,
        pub end_date: String,
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct CustomerView {
        pub id: Uuid,
        pub shop_name: String,
        pub name: String,
        pub phone_number: String,
    }

    /// An order with its full payment ledger (`payments`) and the ids of the
    /// payments that fall inside the requested range.
    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct OrderPaymentsView {
        #[serde(flatten)]
        pub order: OrderView,
        pub customer: Option<CustomerView>,
        pub in_range_payment_ids: Vec<Uuid>,
        pub total_in_range_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct PaymentRangeReportView {
        pub orders: Vec<OrderPaymentsView>,
        pub grand_total_minor: i64,
    }
}
