use chrono::Utc;
use sea_orm::{DatabaseTransaction, QueryFilter, TransactionTrait, prelude::*, sea_query::Expr};
use uuid::Uuid;

use crate::{
    EngineError, MoneyCents, ResultEngine, Transaction, TransactionKind, TransactionStatus,
    accounts, transactions,
};

use super::super::{Engine, audit_rejection, with_tx};

impl Engine {
    /// Moves a `processing` transaction of `kind` to `status`.
    ///
    /// This is a single conditional update, so a transaction that is already
    /// terminal (or has another kind, or belongs to another vendor) is
    /// reported as not found and left untouched.
    async fn transition_from_processing(
        &self,
        db: &DatabaseTransaction,
        vendor_id: Uuid,
        transaction_id: Uuid,
        kind: TransactionKind,
        status: TransactionStatus,
    ) -> ResultEngine<Transaction> {
        let res = transactions::Entity::update_many()
            .col_expr(transactions::Column::Status, Expr::value(status.as_str()))
            .col_expr(transactions::Column::ResolvedAt, Expr::value(Utc::now()))
            .filter(transactions::Column::Id.eq(transaction_id.to_string()))
            .filter(transactions::Column::VendorId.eq(vendor_id.to_string()))
            .filter(transactions::Column::Kind.eq(kind.as_str()))
            .filter(transactions::Column::Status.eq(TransactionStatus::Processing.as_str()))
            .exec(db)
            .await?;
        if res.rows_affected == 0 {
            return Err(EngineError::KeyNotFound(
                "transaction not exists".to_string(),
            ));
        }

        let model = transactions::Entity::find_by_id(transaction_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::Persistence("resolved transaction vanished".to_string()))?;
        Transaction::try_from(model)
    }

    /// Cancels a processing transaction. Balances are not touched.
    pub async fn cancel_transaction(
        &self,
        vendor_id: Uuid,
        transaction_id: Uuid,
        kind: TransactionKind,
    ) -> ResultEngine<Transaction> {
        self.cancel_transaction_tx(vendor_id, transaction_id, kind)
            .await
            .inspect_err(|err| audit_rejection(vendor_id, "cancel_transaction", err))
    }

    async fn cancel_transaction_tx(
        &self,
        vendor_id: Uuid,
        transaction_id: Uuid,
        kind: TransactionKind,
    ) -> ResultEngine<Transaction> {
        with_tx!(self, |db_tx| {
            let tx = self
                .transition_from_processing(
                    &db_tx,
                    vendor_id,
                    transaction_id,
                    kind,
                    TransactionStatus::Cancelled,
                )
                .await?;
            tracing::info!(
                vendor_id = %vendor_id,
                transaction_id = %transaction_id,
                kind = kind.as_str(),
                "ledger transaction cancelled"
            );
            Ok(tx)
        })
    }

    /// Completes a processing transaction and settles it against the account.
    ///
    /// A service charge payment lowers `service_charge` by its amount, a
    /// withdrawal lowers `balance`. The status change and the account update
    /// commit together or not at all.
    pub async fn complete_transaction(
        &self,
        vendor_id: Uuid,
        transaction_id: Uuid,
        kind: TransactionKind,
    ) -> ResultEngine<Transaction> {
        self.complete_transaction_tx(vendor_id, transaction_id, kind)
            .await
            .inspect_err(|err| audit_rejection(vendor_id, "complete_transaction", err))
    }

    async fn complete_transaction_tx(
        &self,
        vendor_id: Uuid,
        transaction_id: Uuid,
        kind: TransactionKind,
    ) -> ResultEngine<Transaction> {
        with_tx!(self, |db_tx| {
            self.require_account(&db_tx, vendor_id).await?;
            let tx = self
                .transition_from_processing(
                    &db_tx,
                    vendor_id,
                    transaction_id,
                    kind,
                    TransactionStatus::Completed,
                )
                .await?;

            let (column, label) = match kind {
                TransactionKind::ServiceChargePayment => {
                    (accounts::Column::ServiceCharge, "service charge")
                }
                TransactionKind::Withdrawal => (accounts::Column::Balance, "balance"),
            };
            let res = accounts::Entity::update_many()
                .col_expr(column, Expr::col(column).sub(tx.amount_minor))
                .filter(accounts::Column::VendorId.eq(vendor_id.to_string()))
                .filter(column.gte(tx.amount_minor))
                .exec(&db_tx)
                .await?;
            if res.rows_affected == 0 {
                return Err(EngineError::InsufficientFunds(format!(
                    "{label} is below {}",
                    MoneyCents::new(tx.amount_minor)
                )));
            }

            tracing::info!(
                vendor_id = %vendor_id,
                transaction_id = %transaction_id,
                kind = kind.as_str(),
                amount_minor = tx.amount_minor,
                "ledger transaction completed"
            );
            Ok(tx)
        })
    }
}
