//! Oil stock ledger primitives.
//!
//! Every [`OilType`] has its own append-only ledger of [`OilStockEntry`]s.
//! Each entry records one [`StockTransaction`] and the running stock balance
//! right after it (`remaining_oil`). Ledger order is the per-type `seq`.

use std::fmt;

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, util::parse_uuid};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OilType {
    Black,
    Tyre,
}

impl OilType {
    pub const ALL: [OilType; 2] = [OilType::Black, OilType::Tyre];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Black => "black",
            Self::Tyre => "tyre",
        }
    }
}

impl fmt::Display for OilType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for OilType {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "black" => Ok(Self::Black),
            "tyre" => Ok(Self::Tyre),
            other => Err(EngineError::KeyNotFound(format!("oil type {other}"))),
        }
    }
}

/// A single stock movement: either a purchase or a usage, never both.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StockTransaction {
    Purchase { quantity: i64, price_minor: i64 },
    Usage { quantity: i64 },
}

impl StockTransaction {
    /// Builds a transaction from the loose wire fields.
    ///
    /// A purchase needs `oil_purchased` (and optionally `purchase_price`,
    /// default 0); a usage needs `oil_used` alone. Mixed or empty input is
    /// rejected.
    pub fn from_parts(
        oil_purchased: Option<i64>,
        purchase_price_minor: Option<i64>,
        oil_used: Option<i64>,
    ) -> ResultEngine<Self> {
        let tx = match (oil_purchased, purchase_price_minor, oil_used) {
            (Some(quantity), price, None) => Self::Purchase {
                quantity,
                price_minor: price.unwrap_or(0),
            },
            (None, None, Some(quantity)) => Self::Usage { quantity },
            (None, Some(_), None) => {
                return Err(EngineError::InvalidTransaction(
                    "purchase_price requires oil_purchased".to_string(),
                ));
            }
            (None, None, None) => {
                return Err(EngineError::InvalidTransaction(
                    "either oil_purchased and purchase_price or oil_used must be provided"
                        .to_string(),
                ));
            }
            _ => {
                return Err(EngineError::InvalidTransaction(
                    "oil_purchased/purchase_price and oil_used are mutually exclusive"
                        .to_string(),
                ));
            }
        };
        tx.validate()?;
        Ok(tx)
    }

    pub fn validate(&self) -> ResultEngine<()> {
        match *self {
            Self::Purchase {
                quantity,
                price_minor,
            } => {
                if quantity <= 0 {
                    return Err(EngineError::InvalidTransaction(
                        "oil_purchased must be > 0".to_string(),
                    ));
                }
                if price_minor < 0 {
                    return Err(EngineError::InvalidTransaction(
                        "purchase_price must be >= 0".to_string(),
                    ));
                }
            }
            Self::Usage { quantity } => {
                if quantity <= 0 {
                    return Err(EngineError::InvalidTransaction(
                        "oil_used must be > 0".to_string(),
                    ));
                }
            }
        }
        Ok(())
    }

    pub fn purchased(&self) -> i64 {
        match *self {
            Self::Purchase { quantity, .. } => quantity,
            Self::Usage { .. } => 0,
        }
    }

    pub fn used(&self) -> i64 {
        match *self {
            Self::Purchase { .. } => 0,
            Self::Usage { quantity } => quantity,
        }
    }

    pub fn price_minor(&self) -> i64 {
        match *self {
            Self::Purchase { price_minor, .. } => price_minor,
            Self::Usage { .. } => 0,
        }
    }

    /// Applies the movement to `prior` stock and returns the new balance.
    pub fn apply(&self, oil_type: OilType, prior: i64) -> ResultEngine<i64> {
        self.validate()?;
        let remaining = prior
            .checked_add(self.purchased())
            .map(|v| v - self.used())
            .ok_or_else(|| EngineError::Validation("oil quantity overflow".to_string()))?;
        if remaining < 0 {
            return Err(EngineError::InsufficientStock(format!(
                "{oil_type}: available {prior}, requested {}",
                self.used()
            )));
        }
        Ok(remaining)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OilStockEntry {
    pub id: Uuid,
    pub oil_type: OilType,
    /// 1-based position in the type's ledger.
    pub seq: i64,
    pub oil_purchased: i64,
    pub oil_used: i64,
    pub purchase_price_minor: i64,
    pub remaining_oil: i64,
    pub created_at: DateTime<Utc>,
    pub created_by: Option<String>,
}

impl OilStockEntry {
    pub fn transaction(&self) -> StockTransaction {
        if self.oil_used > 0 {
            StockTransaction::Usage {
                quantity: self.oil_used,
            }
        } else {
            StockTransaction::Purchase {
                quantity: self.oil_purchased,
                price_minor: self.purchase_price_minor,
            }
        }
    }
}

/// Result of replaying one oil type's ledger.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockReconciliation {
    pub oil_type: OilType,
    pub entries: usize,
    pub total_purchased: i64,
    pub total_used: i64,
    pub latest_remaining: i64,
    /// Entries whose stored `remaining_oil` differs from the replayed balance.
    pub mismatched_entries: Vec<Uuid>,
    /// Whether the replayed balance dropped below zero at any point.
    pub went_negative: bool,
    pub consistent: bool,
}

/// Replays `entries` in `seq` order starting from zero stock.
///
/// The replay runs in `i128`; the reported totals saturate at `i64::MAX`.
pub fn reconcile_stock(oil_type: OilType, entries: &[OilStockEntry]) -> StockReconciliation {
    let mut ordered: Vec<&OilStockEntry> = entries.iter().collect();
    ordered.sort_by_key(|e| e.seq);

    let mut running = 0_i128;
    let mut total_purchased = 0_i64;
    let mut total_used = 0_i64;
    let mut mismatched_entries = Vec::new();
    let mut went_negative = false;
    for entry in &ordered {
        let tx = entry.transaction();
        total_purchased = total_purchased.saturating_add(tx.purchased());
        total_used = total_used.saturating_add(tx.used());
        running += i128::from(tx.purchased()) - i128::from(tx.used());
        went_negative |= running < 0;
        if i128::from(entry.remaining_oil) != running {
            mismatched_entries.push(entry.id);
        }
    }

    let latest_remaining = ordered.last().map_or(0, |e| e.remaining_oil);
    let consistent = !went_negative
        && mismatched_entries.is_empty()
        && i128::from(latest_remaining) == running;

    StockReconciliation {
        oil_type,
        entries: ordered.len(),
        total_purchased,
        total_used,
        latest_remaining,
        mismatched_entries,
        went_negative,
        consistent,
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "oil_stock_entries")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub oil_type: String,
    pub seq: i64,
    pub oil_purchased: i64,
    pub oil_used: i64,
    pub purchase_price_minor: i64,
    pub remaining_oil: i64,
    pub created_at: DateTimeUtc,
    pub created_by: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&OilStockEntry> for ActiveModel {
    fn from(entry: &OilStockEntry) -> Self {
        Self {
            id: ActiveValue::Set(entry.id.to_string()),
            oil_type: ActiveValue::Set(entry.oil_type.as_str().to_string()),
            seq: ActiveValue::Set(entry.seq),
            oil_purchased: ActiveValue::Set(entry.oil_purchased),
            oil_used: ActiveValue::Set(entry.oil_used),
            purchase_price_minor: ActiveValue::Set(entry.purchase_price_minor),
            remaining_oil: ActiveValue::Set(entry.remaining_oil),
            created_at: ActiveValue::Set(entry.created_at),
            created_by: ActiveValue::Set(entry.created_by.clone()),
        }
    }
}

impl TryFrom<Model> for OilStockEntry {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "oil stock entry")?,
            oil_type: OilType::try_from(model.oil_type.as_str())?,
            seq: model.seq,
            oil_purchased: model.oil_purchased,
            oil_used: model.oil_used,
            purchase_price_minor: model.purchase_price_minor,
            remaining_oil: model.remaining_oil,
            created_at: model.created_at,
            created_by: model.created_by,
        })
    }
}
