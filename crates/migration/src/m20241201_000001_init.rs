//! Initial schema.
//!
//! - `users`: actors referenced by ledger rows
//! - `customers`: order counterparties
//! - `orders`: order header and fulfillment state
//! - `payments`: per-order payment ledger, ordered by `seq`
//! - `oil_stock_entries`: per-type stock ledger, ordered by `seq`

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Users {
    Table,
    Username,
    Role,
}

#[derive(Iden)]
enum Customers {
    Table,
    Id,
    ShopName,
    Name,
    PhoneNumber,
    CreatedAt,
}

#[derive(Iden)]
enum Orders {
    Table,
    Id,
    CustomerId,
    Source,
    OrderType,
    Quantity,
    PickUp,
    Delivery,
    PriceMinor,
    CreatedAt,
    UpdatedAt,
    DeliveredAt,
    CreatedBy,
    UpdatedBy,
    DeliveredBy,
}

#[derive(Iden)]
enum Payments {
    Table,
    Id,
    OrderId,
    Seq,
    CashInMinor,
    RemainingAmountMinor,
    CreatedAt,
    UpdatedAt,
    CreatedBy,
    UpdatedBy,
}

#[derive(Iden)]
enum OilStockEntries {
    Table,
    Id,
    OilType,
    Seq,
    OilPurchased,
    OilUsed,
    PurchasePriceMinor,
    RemainingOil,
    CreatedAt,
    CreatedBy,
}

fn actor_fk(
    name: &str,
    table: impl IntoIden + 'static,
    column: impl IntoIden + 'static,
) -> ForeignKeyCreateStatement {
    ForeignKey::create()
        .name(name)
        .from(table, column)
        .to(Users::Table, Users::Username)
        .on_delete(ForeignKeyAction::SetNull)
        .to_owned()
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Users
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Username)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Users::Role)
                            .string()
                            .not_null()
                            .default("employee"),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Customers
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Customers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Customers::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Customers::ShopName).string().not_null())
                    .col(ColumnDef::new(Customers::Name).string().not_null())
                    .col(ColumnDef::new(Customers::PhoneNumber).string().not_null())
                    .col(ColumnDef::new(Customers::CreatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Orders
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Orders::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Orders::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Orders::CustomerId).string().not_null())
                    .col(ColumnDef::new(Orders::Source).string().not_null())
                    .col(ColumnDef::new(Orders::OrderType).string().not_null())
                    .col(ColumnDef::new(Orders::Quantity).big_integer().not_null())
                    .col(
                        ColumnDef::new(Orders::PickUp)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Orders::Delivery)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Orders::PriceMinor).big_integer().not_null())
                    .col(ColumnDef::new(Orders::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Orders::UpdatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Orders::DeliveredAt).timestamp())
                    .col(ColumnDef::new(Orders::CreatedBy).string())
                    .col(ColumnDef::new(Orders::UpdatedBy).string())
                    .col(ColumnDef::new(Orders::DeliveredBy).string())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-orders-customer_id")
                            .from(Orders::Table, Orders::CustomerId)
                            .to(Customers::Table, Customers::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(&mut actor_fk(
                        "fk-orders-created_by",
                        Orders::Table,
                        Orders::CreatedBy,
                    ))
                    .foreign_key(&mut actor_fk(
                        "fk-orders-updated_by",
                        Orders::Table,
                        Orders::UpdatedBy,
                    ))
                    .foreign_key(&mut actor_fk(
                        "fk-orders-delivered_by",
                        Orders::Table,
                        Orders::DeliveredBy,
                    ))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-orders-created_at")
                    .table(Orders::Table)
                    .col(Orders::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-orders-customer_id-delivery")
                    .table(Orders::Table)
                    .col(Orders::CustomerId)
                    .col(Orders::Delivery)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 4. Payments
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Payments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Payments::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Payments::OrderId).string().not_null())
                    .col(ColumnDef::new(Payments::Seq).big_integer().not_null())
                    .col(
                        ColumnDef::new(Payments::CashInMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Payments::RemainingAmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Payments::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Payments::UpdatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Payments::CreatedBy).string())
                    .col(ColumnDef::new(Payments::UpdatedBy).string())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-payments-order_id")
                            .from(Payments::Table, Payments::OrderId)
                            .to(Orders::Table, Orders::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(&mut actor_fk(
                        "fk-payments-created_by",
                        Payments::Table,
                        Payments::CreatedBy,
                    ))
                    .foreign_key(&mut actor_fk(
                        "fk-payments-updated_by",
                        Payments::Table,
                        Payments::UpdatedBy,
                    ))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-payments-order_id-seq")
                    .table(Payments::Table)
                    .col(Payments::OrderId)
                    .col(Payments::Seq)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-payments-created_at")
                    .table(Payments::Table)
                    .col(Payments::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 5. Oil stock entries
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(OilStockEntries::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(OilStockEntries::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(OilStockEntries::OilType).string().not_null())
                    .col(ColumnDef::new(OilStockEntries::Seq).big_integer().not_null())
                    .col(
                        ColumnDef::new(OilStockEntries::OilPurchased)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(OilStockEntries::OilUsed)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(OilStockEntries::PurchasePriceMinor)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(OilStockEntries::RemainingOil)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(OilStockEntries::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .col(ColumnDef::new(OilStockEntries::CreatedBy).string())
                    .foreign_key(&mut actor_fk(
                        "fk-oil_stock_entries-created_by",
                        OilStockEntries::Table,
                        OilStockEntries::CreatedBy,
                    ))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-oil_stock_entries-oil_type-seq")
                    .table(OilStockEntries::Table)
                    .col(OilStockEntries::OilType)
                    .col(OilStockEntries::Seq)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-oil_stock_entries-created_at")
                    .table(OilStockEntries::Table)
                    .col(OilStockEntries::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(OilStockEntries::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Payments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Orders::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Customers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}
