//! Internal helpers for model validation and conversion.
//!
//! These utilities are **not** part of the public API. They centralize
//! validation and mapping logic so the engine enforces consistent invariants.

use sea_orm::{DbErr, SqlErr};
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

/// Parse a UUID from storage and return a labeled error on failure.
pub(crate) fn parse_uuid(value: &str, label: &str) -> ResultEngine<Uuid> {
    Uuid::parse_str(value).map_err(|_| EngineError::Validation(format!("invalid {label} id")))
}

/// Map a unique-index violation on a ledger insert to [`EngineError::Conflict`].
///
/// Ledger rows carry a `(key, seq)` unique index, so a violation means another
/// writer appended to the same ledger between our read and our insert.
pub(crate) fn conflict_on_unique(err: DbErr, ledger: &str) -> EngineError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            EngineError::Conflict(format!("concurrent write on {ledger}"))
        }
        _ => EngineError::Database(err),
    }
}

pub(crate) fn ensure_positive(value: i64, label: &str) -> ResultEngine<()> {
    if value <= 0 {
        return Err(EngineError::Validation(format!("{label} must be > 0")));
    }
    Ok(())
}

pub(crate) fn ensure_non_negative(value: i64, label: &str) -> ResultEngine<()> {
    if value < 0 {
        return Err(EngineError::Validation(format!("{label} must be >= 0")));
    }
    Ok(())
}
