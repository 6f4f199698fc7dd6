use sea_orm::TransactionTrait;
use uuid::Uuid;

use crate::{
    EngineError, MoneyCents, PaymentMethod, ResultEngine, Transaction, TransactionKind,
    util::ensure_positive_amount,
};

use super::super::{Engine, audit_rejection, with_tx};
use super::{debt_payment_details, withdrawal_details};

impl Engine {
    /// Opens a service charge payment in `processing`.
    ///
    /// Rejected when another payment is still processing, when nothing is
    /// owed, or when `amount_minor` exceeds what is owed.
    pub async fn open_debt_payment(
        &self,
        vendor_id: Uuid,
        amount_minor: i64,
        method: PaymentMethod,
    ) -> ResultEngine<Transaction> {
        ensure_positive_amount(amount_minor)?;
        self.open_debt_payment_tx(vendor_id, amount_minor, method)
            .await
            .inspect_err(|err| audit_rejection(vendor_id, "open_debt_payment", err))
    }

    async fn open_debt_payment_tx(
        &self,
        vendor_id: Uuid,
        amount_minor: i64,
        method: PaymentMethod,
    ) -> ResultEngine<Transaction> {
        with_tx!(self, |db_tx| {
            let account = self.require_account(&db_tx, vendor_id).await?;
            self.ensure_no_pending(&db_tx, vendor_id, TransactionKind::ServiceChargePayment)
                .await?;

            if account.service_charge <= 0 {
                return Err(EngineError::NoServiceCharge);
            }
            if amount_minor > account.service_charge {
                return Err(EngineError::InsufficientFunds(format!(
                    "amount {} exceeds the outstanding service charge {}",
                    MoneyCents::new(amount_minor),
                    MoneyCents::new(account.service_charge)
                )));
            }

            let tx = Transaction::open(
                vendor_id,
                TransactionKind::ServiceChargePayment,
                amount_minor,
                Some(method),
                debt_payment_details(amount_minor, method),
                None,
            )?;
            self.insert_processing(&db_tx, &tx).await?;

            tracing::info!(
                vendor_id = %vendor_id,
                transaction_id = %tx.id,
                amount_minor,
                "service charge payment opened"
            );
            Ok(tx)
        })
    }

    /// Opens a withdrawal of `amount_minor` to the vendor's default bank
    /// account.
    ///
    /// Rejected when another withdrawal is still processing, when the balance
    /// is too low, when the owed service charge has reached the configured
    /// maximum, or when no default bank account is on file.
    pub async fn open_withdrawal(
        &self,
        vendor_id: Uuid,
        amount_minor: i64,
    ) -> ResultEngine<Transaction> {
        ensure_positive_amount(amount_minor)?;
        self.open_withdrawal_tx(vendor_id, amount_minor)
            .await
            .inspect_err(|err| audit_rejection(vendor_id, "open_withdrawal", err))
    }

    async fn open_withdrawal_tx(
        &self,
        vendor_id: Uuid,
        amount_minor: i64,
    ) -> ResultEngine<Transaction> {
        with_tx!(self, |db_tx| {
            let account = self.require_account(&db_tx, vendor_id).await?;
            self.ensure_no_pending(&db_tx, vendor_id, TransactionKind::Withdrawal)
                .await?;

            if amount_minor > account.balance {
                return Err(EngineError::InsufficientFunds(format!(
                    "amount {} exceeds the balance {}",
                    MoneyCents::new(amount_minor),
                    MoneyCents::new(account.balance)
                )));
            }

            let defaults = self.require_app_defaults(&db_tx).await?;
            if account.service_charge >= defaults.max_debt_minor {
                return Err(EngineError::ServiceChargeLimit(format!(
                    "outstanding service charge {} must be paid below {} before withdrawing",
                    MoneyCents::new(account.service_charge),
                    MoneyCents::new(defaults.max_debt_minor)
                )));
            }

            let bank = self
                .find_default_bank_account(&db_tx, vendor_id)
                .await?
                .ok_or(EngineError::MissingDefaultBank)?;

            let tx = Transaction::open(
                vendor_id,
                TransactionKind::Withdrawal,
                amount_minor,
                None,
                withdrawal_details(amount_minor, &bank),
                Some(bank.id),
            )?;
            self.insert_processing(&db_tx, &tx).await?;

            tracing::info!(
                vendor_id = %vendor_id,
                transaction_id = %tx.id,
                amount_minor,
                "withdrawal opened"
            );
            Ok(tx)
        })
    }
}
