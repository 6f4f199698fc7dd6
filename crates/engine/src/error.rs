//! The module contains the errors the engine can throw.
//!
//! Errors fall in four groups:
//!
//! - validation: [`InvalidAmount`], [`Validation`]
//! - lookups: [`KeyNotFound`], [`Forbidden`]
//! - business rules: [`PendingTransaction`], [`NoServiceCharge`],
//!   [`InsufficientFunds`], [`ServiceChargeLimit`], [`MissingDefaultBank`],
//!   [`ExistingKey`]
//! - persistence: [`Persistence`], [`Database`]
//!
//!  [`InvalidAmount`]: EngineError::InvalidAmount
//!  [`Validation`]: EngineError::Validation
//!  [`KeyNotFound`]: EngineError::KeyNotFound
//!  [`Forbidden`]: EngineError::Forbidden
//!  [`PendingTransaction`]: EngineError::PendingTransaction
//!  [`NoServiceCharge`]: EngineError::NoServiceCharge
//!  [`InsufficientFunds`]: EngineError::InsufficientFunds
//!  [`ServiceChargeLimit`]: EngineError::ServiceChargeLimit
//!  [`MissingDefaultBank`]: EngineError::MissingDefaultBank
//!  [`ExistingKey`]: EngineError::ExistingKey
//!  [`Persistence`]: EngineError::Persistence
//!  [`Database`]: EngineError::Database
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("\"{0}\" already present!")]
    ExistingKey(String),
    #[error("There is a pending {0}")]
    PendingTransaction(String),
    #[error("No service charge to pay")]
    NoServiceCharge,
    #[error("Insufficient funds: {0}")]
    InsufficientFunds(String),
    #[error("Service charge limit reached: {0}")]
    ServiceChargeLimit(String),
    #[error("No default bank account on file")]
    MissingDefaultBank,
    #[error("Persistence failure: {0}")]
    Persistence(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl EngineError {
    /// `true` when the request was well formed but a ledger rule rejected it.
    pub fn is_business_rule(&self) -> bool {
        matches!(
            self,
            Self::PendingTransaction(_)
                | Self::NoServiceCharge
                | Self::InsufficientFunds(_)
                | Self::ServiceChargeLimit(_)
                | Self::MissingDefaultBank
                | Self::ExistingKey(_)
        )
    }

    /// `true` when the storage layer failed or did not do what was expected.
    pub fn is_persistence(&self) -> bool {
        matches!(self, Self::Persistence(_) | Self::Database(_))
    }
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::Validation(a), Self::Validation(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::Forbidden(a), Self::Forbidden(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::PendingTransaction(a), Self::PendingTransaction(b)) => a == b,
            (Self::NoServiceCharge, Self::NoServiceCharge) => true,
            (Self::InsufficientFunds(a), Self::InsufficientFunds(b)) => a == b,
            (Self::ServiceChargeLimit(a), Self::ServiceChargeLimit(b)) => a == b,
            (Self::MissingDefaultBank, Self::MissingDefaultBank) => true,
            (Self::Persistence(a), Self::Persistence(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
