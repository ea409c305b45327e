//! The module contains the error the engine can throw.
//!
//! Business-rule and validation failures are detected before any write:
//!
//! - [`Overpayment`] thrown when a payment would exceed the order price.
//! - [`InsufficientStock`] thrown when a usage would drive stock below zero.
//! - [`KeyNotFound`] thrown when an order, payment, customer, user or stock
//!   type is unknown.
//! - [`Conflict`] thrown when another writer holds the same ledger key.
//!
//! Only [`Database`] carries storage faults.
//!
//!  [`Overpayment`]: EngineError::Overpayment
//!  [`InsufficientStock`]: EngineError::InsufficientStock
//!  [`KeyNotFound`]: EngineError::KeyNotFound
//!  [`Conflict`]: EngineError::Conflict
//!  [`Database`]: EngineError::Database
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Invalid stock transaction: {0}")]
    InvalidTransaction(String),
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("Payment exceeds the total amount due: {0}")]
    Overpayment(String),
    #[error("Not enough oil available: {0}")]
    InsufficientStock(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Validation(a), Self::Validation(b)) => a == b,
            (Self::InvalidTransaction(a), Self::InvalidTransaction(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::Overpayment(a), Self::Overpayment(b)) => a == b,
            (Self::InsufficientStock(a), Self::InsufficientStock(b)) => a == b,
            (Self::Conflict(a), Self::Conflict(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
