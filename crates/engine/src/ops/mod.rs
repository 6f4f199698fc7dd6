use sea_orm::{DatabaseConnection, DbErr, SqlErr};
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

mod bank_accounts;
mod defaults;
mod ledger;
mod users;
mod vendors;

pub use ledger::TransactionListFilter;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }
}

/// Log a rejected ledger operation for audit.
///
/// Only business-rule and persistence failures are logged here; validation
/// and lookup errors are the caller's problem.
pub(crate) fn audit_rejection(vendor_id: Uuid, operation: &str, err: &EngineError) {
    if err.is_persistence() {
        tracing::error!(vendor_id = %vendor_id, operation, "ledger persistence failure: {err}");
    } else if err.is_business_rule() {
        tracing::warn!(vendor_id = %vendor_id, operation, "ledger rule rejected request: {err}");
    }
}

/// Map a unique-constraint violation to a domain error, pass anything else through.
pub(crate) fn on_unique_violation(err: DbErr, mapped: impl FnOnce() -> EngineError) -> EngineError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => mapped(),
        _ => EngineError::Database(err),
    }
}

/// Fail with `Persistence` unless exactly one row was touched.
pub(crate) fn expect_single_row(rows_affected: u64, what: &str) -> ResultEngine<()> {
    if rows_affected != 1 {
        return Err(EngineError::Persistence(format!(
            "{what}: expected 1 row, got {rows_affected}"
        )));
    }
    Ok(())
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
        })
    }
}
