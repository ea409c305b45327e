use std::collections::BTreeMap;

use sea_orm::{DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    DateRange, OilStockCmd, OilStockEntry, OilType, ResultEngine, StockReconciliation,
    locks::LedgerKey, oil_stock, reconcile_stock, util::conflict_on_unique,
};

use super::{Engine, with_tx};

impl Engine {
    async fn latest_stock_entry(
        &self,
        db: &DatabaseTransaction,
        oil_type: OilType,
    ) -> ResultEngine<Option<OilStockEntry>> {
        oil_stock::Entity::find()
            .filter(oil_stock::Column::OilType.eq(oil_type.as_str()))
            .order_by_desc(oil_stock::Column::Seq)
            .one(db)
            .await?
            .map(OilStockEntry::try_from)
            .transpose()
    }

    /// Appends a stock movement to the ledger of its oil type.
    ///
    /// Usages larger than the remaining stock fail with
    /// [`crate::EngineError::InsufficientStock`] and nothing is written.
    pub async fn record_oil_stock(&self, cmd: OilStockCmd) -> ResultEngine<OilStockEntry> {
        cmd.transaction.validate()?;
        let _guard = self.locks.acquire(LedgerKey::Stock(cmd.oil_type)).await?;
        with_tx!(self, |db_tx| {
            self.require_user(&db_tx, &cmd.user_id).await?;
            let prior = self.latest_stock_entry(&db_tx, cmd.oil_type).await?;
            let (prior_remaining, seq) = prior
                .as_ref()
                .map_or((0, 1), |e| (e.remaining_oil, e.seq + 1));
            let remaining_oil = cmd.transaction.apply(cmd.oil_type, prior_remaining)?;

            let entry = OilStockEntry {
                id: Uuid::new_v4(),
                oil_type: cmd.oil_type,
                seq,
                oil_purchased: cmd.transaction.purchased(),
                oil_used: cmd.transaction.used(),
                purchase_price_minor: cmd.transaction.price_minor(),
                remaining_oil,
                created_at: cmd.at,
                created_by: Some(cmd.user_id.clone()),
            };
            let model: oil_stock::ActiveModel = (&entry).into();
            model
                .insert(&db_tx)
                .await
                .map_err(|err| conflict_on_unique(err, "oil stock ledger"))?;

            tracing::info!(
                oil_type = %entry.oil_type,
                seq,
                purchased = entry.oil_purchased,
                used = entry.oil_used,
                remaining_oil,
                "oil stock recorded"
            );
            Ok(entry)
        })
    }

    /// Stock entries of every type created within `range`.
    pub async fn list_oil_stock(&self, range: DateRange) -> ResultEngine<Vec<OilStockEntry>> {
        with_tx!(self, |db_tx| {
            oil_stock::Entity::find()
                .filter(oil_stock::Column::CreatedAt.gte(range.start))
                .filter(oil_stock::Column::CreatedAt.lte(range.end))
                .order_by_asc(oil_stock::Column::CreatedAt)
                .order_by_asc(oil_stock::Column::Seq)
                .all(&db_tx)
                .await?
                .into_iter()
                .map(OilStockEntry::try_from)
                .collect::<ResultEngine<Vec<_>>>()
        })
    }

    /// Latest remaining stock per oil type. Types without entries are absent.
    pub async fn remaining_oil(&self) -> ResultEngine<BTreeMap<OilType, i64>> {
        with_tx!(self, |db_tx| {
            let mut remaining = BTreeMap::new();
            for oil_type in OilType::ALL {
                if let Some(entry) = self.latest_stock_entry(&db_tx, oil_type).await? {
                    remaining.insert(oil_type, entry.remaining_oil);
                }
            }
            Ok(remaining)
        })
    }

    /// Replays one oil type's ledger against its stored snapshots.
    pub async fn reconcile_oil_stock(
        &self,
        oil_type: OilType,
    ) -> ResultEngine<StockReconciliation> {
        with_tx!(self, |db_tx| {
            let entries = oil_stock::Entity::find()
                .filter(oil_stock::Column::OilType.eq(oil_type.as_str()))
                .order_by_asc(oil_stock::Column::Seq)
                .all(&db_tx)
                .await?
                .into_iter()
                .map(OilStockEntry::try_from)
                .collect::<ResultEngine<Vec<_>>>()?;
            Ok(reconcile_stock(oil_type, &entries))
        })
    }
}
