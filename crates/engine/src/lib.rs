//! Ledger core of the trading backend.
//!
//! The [`Engine`] owns two kinds of ledgers on top of a sea-orm database:
//!
//! - the payment ledger of every [`Order`], where each [`Payment`] snapshots
//!   the balance still owed;
//! - the oil stock ledger of every [`OilType`], where each [`OilStockEntry`]
//!   snapshots the remaining stock.
//!
//! Writes to one ledger key are serialized and run inside a single database
//! transaction; balances never go negative.

pub use commands::{CreatePaymentCmd, NewOrderCmd, OilStockCmd, UpdateOrderCmd, UpdatePaymentCmd};
pub use customers::Customer;
pub use dates::{Bound, DateRange, parse_bound};
pub use error::EngineError;
pub use oil_stock::{OilStockEntry, OilType, StockReconciliation, StockTransaction, reconcile_stock};
pub use ops::{
    Engine, EngineBuilder, OrderListFilter, OrderPaymentSummary, PaymentInRange,
    PaymentRangeReport,
};
pub use orders::{Order, OrderStatus};
pub use payments::{OrderReconciliation, Payment, PaymentLedger, reconcile_payments};
pub use users::Actor;

mod commands;
mod customers;
mod dates;
mod error;
mod locks;
mod oil_stock;
mod ops;
mod orders;
mod payments;
mod users;
mod util;

type ResultEngine<T> = Result<T, EngineError>;
