//! Initial schema migration.
//!
//! - `vendors`: merchants on the marketplace
//! - `accounts`: one row per vendor, running balance and owed service charge
//! - `bank_accounts`: payout destinations, at most one default per vendor
//! - `transactions`: the vendor ledger (service charge payments, withdrawals)
//! - `app_defaults`: single-row platform settings
//! - `users`: admins and vendor logins

use sea_orm::{ConnectionTrait, Statement};
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Vendors {
    Table,
    Id,
    Name,
    CreatedAt,
}

#[derive(Iden)]
enum Accounts {
    Table,
    VendorId,
    Balance,
    ServiceCharge,
}

#[derive(Iden)]
enum BankAccounts {
    Table,
    Id,
    VendorId,
    BankName,
    AccountNumber,
    AccountName,
    IsDefault,
}

#[derive(Iden)]
enum Transactions {
    Table,
    Id,
    VendorId,
    Kind,
    AmountMinor,
    Status,
    Method,
    Details,
    BankAccountId,
    CreatedAt,
    ResolvedAt,
}

#[derive(Iden)]
enum AppDefaults {
    Table,
    Id,
    MaxDebtMinor,
    ServiceChargeBps,
}

#[derive(Iden)]
enum Users {
    Table,
    Username,
    Password,
    Role,
    VendorId,
}

/// One `processing` row per vendor and kind. Partial indexes are not
/// expressible through the schema builder, so this one is raw SQL (valid for
/// both SQLite and Postgres).
const ONE_PROCESSING_INDEX: &str = "CREATE UNIQUE INDEX IF NOT EXISTS \
     \"transactions_one_processing\" ON \"transactions\" (\"vendor_id\", \"kind\") \
     WHERE \"status\" = 'processing';";

const ONE_DEFAULT_BANK_INDEX: &str = "CREATE UNIQUE INDEX IF NOT EXISTS \
     \"bank_accounts_one_default\" ON \"bank_accounts\" (\"vendor_id\") \
     WHERE \"is_default\";";

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        let backend = db.get_database_backend();

        // ───────────────────────────────────────────────────────────────────
        // 1. Vendors
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Vendors::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Vendors::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Vendors::Name).string().not_null())
                    .col(
                        ColumnDef::new(Vendors::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Accounts
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Accounts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Accounts::VendorId)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Accounts::Balance)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Accounts::ServiceCharge)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .check(Expr::col(Accounts::Balance).gte(0))
                    .check(Expr::col(Accounts::ServiceCharge).gte(0))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-accounts-vendor_id")
                            .from(Accounts::Table, Accounts::VendorId)
                            .to(Vendors::Table, Vendors::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Bank accounts
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(BankAccounts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BankAccounts::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(BankAccounts::VendorId).string().not_null())
                    .col(ColumnDef::new(BankAccounts::BankName).string().not_null())
                    .col(ColumnDef::new(BankAccounts::AccountNumber).string().not_null())
                    .col(ColumnDef::new(BankAccounts::AccountName).string().not_null())
                    .col(
                        ColumnDef::new(BankAccounts::IsDefault)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-bank_accounts-vendor_id")
                            .from(BankAccounts::Table, BankAccounts::VendorId)
                            .to(Vendors::Table, Vendors::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-bank_accounts-vendor_id")
                    .table(BankAccounts::Table)
                    .col(BankAccounts::VendorId)
                    .to_owned(),
            )
            .await?;

        db.execute(Statement::from_string(
            backend,
            ONE_DEFAULT_BANK_INDEX.to_string(),
        ))
        .await?;

        // ───────────────────────────────────────────────────────────────────
        // 4. Transactions
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Transactions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Transactions::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Transactions::VendorId).string().not_null())
                    .col(ColumnDef::new(Transactions::Kind).string().not_null())
                    .col(
                        ColumnDef::new(Transactions::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Transactions::Status)
                            .string()
                            .not_null()
                            .default("processing"),
                    )
                    .col(ColumnDef::new(Transactions::Method).string())
                    .col(ColumnDef::new(Transactions::Details).string().not_null())
                    .col(ColumnDef::new(Transactions::BankAccountId).string())
                    .col(
                        ColumnDef::new(Transactions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Transactions::ResolvedAt).timestamp_with_time_zone())
                    .check(Expr::col(Transactions::AmountMinor).gt(0))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-transactions-vendor_id")
                            .from(Transactions::Table, Transactions::VendorId)
                            .to(Vendors::Table, Vendors::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-transactions-vendor_id-created_at")
                    .table(Transactions::Table)
                    .col(Transactions::VendorId)
                    .col(Transactions::CreatedAt)
                    .to_owned(),
            )
            .await?;

        db.execute(Statement::from_string(
            backend,
            ONE_PROCESSING_INDEX.to_string(),
        ))
        .await?;

        // ───────────────────────────────────────────────────────────────────
        // 5. App defaults
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(AppDefaults::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AppDefaults::Id)
                            .integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(AppDefaults::MaxDebtMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AppDefaults::ServiceChargeBps)
                            .big_integer()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 6. Users
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
                    .col(ColumnDef::new(Users::Password).string().not_null())
                    .col(ColumnDef::new(Users::Role).string().not_null())
                    .col(ColumnDef::new(Users::VendorId).string())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-users-vendor_id")
                            .from(Users::Table, Users::VendorId)
                            .to(Vendors::Table, Vendors::Id),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop in reverse order of creation (respecting FK dependencies)
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AppDefaults::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Transactions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(BankAccounts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Accounts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Vendors::Table).to_owned())
            .await?;
        Ok(())
    }
}
