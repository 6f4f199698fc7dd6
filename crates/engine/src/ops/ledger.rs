//! Vendor ledger: open, resolve and list debt payments and withdrawals.
//!
//! Invariants kept here:
//! - at most one `processing` transaction per vendor and kind (backed by the
//!   `transactions_one_processing` partial unique index);
//! - `completed` and `cancelled` are terminal, every status change is a
//!   compare-and-set on `status = 'processing'`;
//! - account decrements never take `balance` or `service_charge` below zero.

use sea_orm::{DatabaseTransaction, QueryFilter, prelude::*};
use uuid::Uuid;

use crate::{
    BankAccount, EngineError, MoneyCents, PaymentMethod, ResultEngine, Transaction,
    TransactionKind, TransactionStatus, transactions,
};

use super::{Engine, on_unique_violation};

mod list;
mod open;
mod resolve;

pub use list::TransactionListFilter;

fn debt_payment_details(amount_minor: i64, method: PaymentMethod) -> String {
    format!(
        "Service charge payment of {} via {}",
        MoneyCents::new(amount_minor),
        method.as_str()
    )
}

fn withdrawal_details(amount_minor: i64, bank: &BankAccount) -> String {
    format!(
        "Withdrawal of {} to {} ({})",
        MoneyCents::new(amount_minor),
        bank.bank_name,
        bank.masked_number()
    )
}

impl Engine {
    async fn ensure_no_pending(
        &self,
        db: &DatabaseTransaction,
        vendor_id: Uuid,
        kind: TransactionKind,
    ) -> ResultEngine<()> {
        let pending = transactions::Entity::find()
            .filter(transactions::Column::VendorId.eq(vendor_id.to_string()))
            .filter(transactions::Column::Kind.eq(kind.as_str()))
            .filter(transactions::Column::Status.eq(TransactionStatus::Processing.as_str()))
            .one(db)
            .await?;
        if pending.is_some() {
            return Err(EngineError::PendingTransaction(kind.label().to_string()));
        }
        Ok(())
    }

    /// Insert a freshly opened transaction.
    ///
    /// The read in `ensure_no_pending` can race with a concurrent request; the
    /// partial unique index catches whichever insert comes second.
    async fn insert_processing(
        &self,
        db: &DatabaseTransaction,
        tx: &Transaction,
    ) -> ResultEngine<()> {
        transactions::ActiveModel::from(tx)
            .insert(db)
            .await
            .map_err(|err| {
                on_unique_violation(err, || {
                    EngineError::PendingTransaction(tx.kind.label().to_string())
                })
            })?;
        Ok(())
    }
}
