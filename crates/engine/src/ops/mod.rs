use std::time::Duration;

use sea_orm::DatabaseConnection;

use crate::{
    EngineError, ResultEngine,
    locks::{DEFAULT_LOCK_TIMEOUT, LedgerLocks},
};

mod access;
mod oil_stock;
mod orders;
mod payments;
mod reports;

pub use orders::OrderListFilter;
pub use reports::{OrderPaymentSummary, PaymentInRange, PaymentRangeReport};

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    locks: LedgerLocks,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }
}

fn normalize_required_text(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::Validation(format!("{label} must not be empty")));
    }
    Ok(trimmed.to_string())
}

/// The builder for `Engine`
pub struct EngineBuilder {
    database: DatabaseConnection,
    lock_timeout: Duration,
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self {
            database: DatabaseConnection::default(),
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
        }
    }
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// How long a writer waits for another writer on the same ledger key
    /// before failing with [`EngineError::Conflict`].
    pub fn lock_timeout(mut self, timeout: Duration) -> EngineBuilder {
        self.lock_timeout = timeout;
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        if self.lock_timeout.is_zero() {
            return Err(EngineError::Validation(
                "lock timeout must be > 0".to_string(),
            ));
        }
        Ok(Engine {
            database: self.database,
            locks: LedgerLocks::new(self.lock_timeout),
        })
    }
}
