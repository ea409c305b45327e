//! Users table (minimal entity).
//!
//! Users are managed outside the engine. Ledger rows reference them by
//! `username` (`created_by`, `updated_by`, `delivered_by`).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Denormalized view of a user, used to resolve actor references.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub username: String,
    pub role: String,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub username: String,
    pub role: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Actor {
    fn from(model: Model) -> Self {
        Self {
            username: model.username,
            role: model.role,
        }
    }
}
