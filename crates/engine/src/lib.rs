//! Vendor ledger engine.
//!
//! The engine owns the marketplace's money-facing tables (vendors, accounts,
//! bank accounts, ledger transactions, app defaults) and the operations that
//! move a ledger transaction through `processing → completed | cancelled`.
//! Every operation runs inside one database transaction.

pub use accounts::Account;
pub use app_defaults::AppDefaults;
pub use bank_accounts::BankAccount;
pub use error::EngineError;
pub use money::MoneyCents;
pub use ops::{Engine, EngineBuilder, TransactionListFilter};
pub use transactions::{PaymentMethod, Transaction, TransactionKind, TransactionStatus};
pub use users::{Role, User};
pub use vendors::Vendor;

mod accounts;
mod app_defaults;
mod bank_accounts;
mod error;
mod money;
mod ops;
mod transactions;
mod users;
mod util;
mod vendors;

type ResultEngine<T> = Result<T, EngineError>;
