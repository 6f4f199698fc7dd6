use sea_orm::{DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*, sea_query::Expr};
use uuid::Uuid;

use crate::{
    BankAccount, EngineError, ResultEngine, bank_accounts, util::normalize_required_text,
};

use super::{Engine, expect_single_row, with_tx};

impl Engine {
    pub(super) async fn find_default_bank_account(
        &self,
        db: &DatabaseTransaction,
        vendor_id: Uuid,
    ) -> ResultEngine<Option<BankAccount>> {
        bank_accounts::Entity::find()
            .filter(bank_accounts::Column::VendorId.eq(vendor_id.to_string()))
            .filter(bank_accounts::Column::IsDefault.eq(true))
            .one(db)
            .await?
            .map(BankAccount::try_from)
            .transpose()
    }

    /// Add a payout destination. The first one a vendor adds becomes the
    /// default.
    pub async fn add_bank_account(
        &self,
        vendor_id: Uuid,
        bank_name: &str,
        account_number: &str,
        account_name: &str,
    ) -> ResultEngine<BankAccount> {
        let bank_name = normalize_required_text(bank_name, "bank_name")?;
        let account_number = normalize_required_text(account_number, "account_number")?;
        let account_name = normalize_required_text(account_name, "account_name")?;

        with_tx!(self, |db_tx| {
            self.require_vendor(&db_tx, vendor_id).await?;

            let duplicate = bank_accounts::Entity::find()
                .filter(bank_accounts::Column::VendorId.eq(vendor_id.to_string()))
                .filter(bank_accounts::Column::BankName.eq(bank_name.clone()))
                .filter(bank_accounts::Column::AccountNumber.eq(account_number.clone()))
                .one(&db_tx)
                .await?
                .is_some();
            if duplicate {
                return Err(EngineError::ExistingKey(format!(
                    "{bank_name} {account_number}"
                )));
            }

            let is_default = self
                .find_default_bank_account(&db_tx, vendor_id)
                .await?
                .is_none();
            let bank = BankAccount {
                id: Uuid::new_v4(),
                vendor_id,
                bank_name,
                account_number,
                account_name,
                is_default,
            };
            bank_accounts::ActiveModel::from(&bank).insert(&db_tx).await?;
            Ok(bank)
        })
    }

    pub async fn bank_accounts(&self, vendor_id: Uuid) -> ResultEngine<Vec<BankAccount>> {
        with_tx!(self, |db_tx| {
            self.require_vendor(&db_tx, vendor_id).await?;
            bank_accounts::Entity::find()
                .filter(bank_accounts::Column::VendorId.eq(vendor_id.to_string()))
                .order_by_desc(bank_accounts::Column::IsDefault)
                .order_by_asc(bank_accounts::Column::BankName)
                .all(&db_tx)
                .await?
                .into_iter()
                .map(BankAccount::try_from)
                .collect::<ResultEngine<Vec<_>>>()
        })
    }

    pub async fn default_bank_account(&self, vendor_id: Uuid) -> ResultEngine<Option<BankAccount>> {
        with_tx!(self, |db_tx| self.find_default_bank_account(&db_tx, vendor_id).await)
    }

    /// Make `bank_account_id` the vendor's only default bank account.
    pub async fn set_default_bank_account(
        &self,
        vendor_id: Uuid,
        bank_account_id: Uuid,
    ) -> ResultEngine<BankAccount> {
        with_tx!(self, |db_tx| {
            let model = bank_accounts::Entity::find_by_id(bank_account_id.to_string())
                .filter(bank_accounts::Column::VendorId.eq(vendor_id.to_string()))
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("bank account not exists".to_string()))?;

            bank_accounts::Entity::update_many()
                .col_expr(bank_accounts::Column::IsDefault, Expr::value(false))
                .filter(bank_accounts::Column::VendorId.eq(vendor_id.to_string()))
                .exec(&db_tx)
                .await?;
            let res = bank_accounts::Entity::update_many()
                .col_expr(bank_accounts::Column::IsDefault, Expr::value(true))
                .filter(bank_accounts::Column::Id.eq(model.id.clone()))
                .exec(&db_tx)
                .await?;
            expect_single_row(res.rows_affected, "default bank account")?;

            let mut bank = BankAccount::try_from(model)?;
            bank.is_default = true;
            Ok(bank)
        })
    }
}
