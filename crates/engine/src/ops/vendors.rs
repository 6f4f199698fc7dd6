use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, TransactionTrait, prelude::*, sea_query::Expr,
};
use uuid::Uuid;

use crate::{
    Account, EngineError, MoneyCents, ResultEngine, Vendor, accounts, bank_accounts, transactions,
    users, util::ensure_positive_amount, util::normalize_required_text, vendors,
};

use super::{Engine, audit_rejection, expect_single_row, with_tx};

impl Engine {
    pub(super) async fn require_vendor(
        &self,
        db: &DatabaseTransaction,
        vendor_id: Uuid,
    ) -> ResultEngine<vendors::Model> {
        vendors::Entity::find_by_id(vendor_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("vendor not exists".to_string()))
    }

    pub(super) async fn require_account(
        &self,
        db: &DatabaseTransaction,
        vendor_id: Uuid,
    ) -> ResultEngine<Account> {
        let model = accounts::Entity::find_by_id(vendor_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("account not exists".to_string()))?;
        Account::try_from(model)
    }

    /// Register a vendor together with its empty account.
    pub async fn new_vendor(&self, name: &str) -> ResultEngine<Uuid> {
        let name = normalize_required_text(name, "vendor name")?;
        with_tx!(self, |db_tx| {
            let vendor = Vendor::new(name);
            vendors::ActiveModel::from(&vendor).insert(&db_tx).await?;

            let account = accounts::ActiveModel {
                vendor_id: ActiveValue::Set(vendor.id.to_string()),
                balance: ActiveValue::Set(0),
                service_charge: ActiveValue::Set(0),
            };
            account.insert(&db_tx).await?;

            tracing::info!(vendor_id = %vendor.id, "vendor created");
            Ok(vendor.id)
        })
    }

    pub async fn vendor(&self, vendor_id: Uuid) -> ResultEngine<Vendor> {
        with_tx!(self, |db_tx| {
            let model = self.require_vendor(&db_tx, vendor_id).await?;
            Vendor::try_from(model)
        })
    }

    /// Current balance and owed service charge of a vendor.
    pub async fn account(&self, vendor_id: Uuid) -> ResultEngine<Account> {
        with_tx!(self, |db_tx| self.require_account(&db_tx, vendor_id).await)
    }

    /// Credit a settled sale to the vendor.
    ///
    /// The gross amount goes to `balance` and the platform fee (computed from
    /// `service_charge_bps`) is added to `service_charge`.
    pub async fn settle_sale(&self, vendor_id: Uuid, gross_minor: i64) -> ResultEngine<Account> {
        ensure_positive_amount(gross_minor)?;
        self.settle_sale_tx(vendor_id, gross_minor)
            .await
            .inspect_err(|err| audit_rejection(vendor_id, "settle_sale", err))
    }

    async fn settle_sale_tx(&self, vendor_id: Uuid, gross_minor: i64) -> ResultEngine<Account> {
        with_tx!(self, |db_tx| {
            let account = self.require_account(&db_tx, vendor_id).await?;
            let defaults = self.require_app_defaults(&db_tx).await?;
            let too_large = || EngineError::InvalidAmount("amount too large".to_string());

            let gross = MoneyCents::new(gross_minor);
            let fee = gross
                .basis_points(defaults.service_charge_bps)
                .ok_or_else(too_large)?;
            MoneyCents::new(account.balance)
                .checked_add(gross)
                .ok_or_else(too_large)?;
            MoneyCents::new(account.service_charge)
                .checked_add(fee)
                .ok_or_else(too_large)?;

            // SQLite turns an overflowing integer sum into a REAL, so the
            // headroom is also part of the update filter.
            let res = accounts::Entity::update_many()
                .col_expr(
                    accounts::Column::Balance,
                    Expr::col(accounts::Column::Balance).add(gross.cents()),
                )
                .col_expr(
                    accounts::Column::ServiceCharge,
                    Expr::col(accounts::Column::ServiceCharge).add(fee.cents()),
                )
                .filter(accounts::Column::VendorId.eq(vendor_id.to_string()))
                .filter(accounts::Column::Balance.lte(i64::MAX - gross.cents()))
                .filter(accounts::Column::ServiceCharge.lte(i64::MAX - fee.cents()))
                .exec(&db_tx)
                .await?;
            if res.rows_affected == 0 {
                return Err(too_large());
            }
            expect_single_row(res.rows_affected, "account credit")?;

            self.require_account(&db_tx, vendor_id).await
        })
    }

    /// Hard delete a vendor and every row it owns.
    pub async fn delete_vendor(&self, vendor_id: Uuid) -> ResultEngine<()> {
        self.delete_vendor_tx(vendor_id)
            .await
            .inspect_err(|err| audit_rejection(vendor_id, "delete_vendor", err))
    }

    async fn delete_vendor_tx(&self, vendor_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_vendor(&db_tx, vendor_id).await?;
            let id = vendor_id.to_string();

            // Children first: none of the foreign keys cascade on their own.
            transactions::Entity::delete_many()
                .filter(transactions::Column::VendorId.eq(id.clone()))
                .exec(&db_tx)
                .await?;
            bank_accounts::Entity::delete_many()
                .filter(bank_accounts::Column::VendorId.eq(id.clone()))
                .exec(&db_tx)
                .await?;
            accounts::Entity::delete_many()
                .filter(accounts::Column::VendorId.eq(id.clone()))
                .exec(&db_tx)
                .await?;
            users::Entity::delete_many()
                .filter(users::Column::VendorId.eq(id.clone()))
                .exec(&db_tx)
                .await?;
            let res = vendors::Entity::delete_by_id(id).exec(&db_tx).await?;
            expect_single_row(res.rows_affected, "vendor delete")?;

            tracing::info!(vendor_id = %vendor_id, "vendor hard-deleted");
            Ok(())
        })
    }
}
