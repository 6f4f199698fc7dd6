use sea_orm::{QueryFilter, QueryOrder, QuerySelect, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine, Transaction, TransactionKind, TransactionStatus, transactions,
};

use super::super::{Engine, with_tx};

const DEFAULT_LIMIT: u64 = 50;
const MAX_LIMIT: u64 = 200;

/// Optional filters for [`Engine::list_transactions`].
///
/// `vendor_id: None` lists across every vendor and is meant for admins only.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TransactionListFilter {
    pub vendor_id: Option<Uuid>,
    pub kind: Option<TransactionKind>,
    pub status: Option<TransactionStatus>,
    pub limit: Option<u64>,
}

impl TransactionListFilter {
    fn effective_limit(&self) -> u64 {
        self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
    }
}

impl Engine {
    /// A single transaction of `vendor_id`.
    pub async fn transaction(
        &self,
        vendor_id: Uuid,
        transaction_id: Uuid,
    ) -> ResultEngine<Transaction> {
        with_tx!(self, |db_tx| {
            let model = transactions::Entity::find_by_id(transaction_id.to_string())
                .filter(transactions::Column::VendorId.eq(vendor_id.to_string()))
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("transaction not exists".to_string()))?;
            Transaction::try_from(model)
        })
    }

    /// Newest-first listing of ledger transactions.
    pub async fn list_transactions(
        &self,
        filter: &TransactionListFilter,
    ) -> ResultEngine<Vec<Transaction>> {
        with_tx!(self, |db_tx| {
            let mut query = transactions::Entity::find();
            if let Some(vendor_id) = filter.vendor_id {
                self.require_vendor(&db_tx, vendor_id).await?;
                query = query.filter(transactions::Column::VendorId.eq(vendor_id.to_string()));
            }
            if let Some(kind) = filter.kind {
                query = query.filter(transactions::Column::Kind.eq(kind.as_str()));
            }
            if let Some(status) = filter.status {
                query = query.filter(transactions::Column::Status.eq(status.as_str()));
            }

            query
                .order_by_desc(transactions::Column::CreatedAt)
                .order_by_asc(transactions::Column::Id)
                .limit(filter.effective_limit())
                .all(&db_tx)
                .await?
                .into_iter()
                .map(Transaction::try_from)
                .collect::<ResultEngine<Vec<_>>>()
        })
    }
}
