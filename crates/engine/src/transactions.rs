//! Ledger transaction primitives.
//!
//! A `Transaction` is a vendor's request to move money out of its account:
//! either paying down the platform service charge or withdrawing the earned
//! balance. It starts in [`TransactionStatus::Processing`] and is resolved
//! exactly once, to `Completed` or `Cancelled`.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine,
    util::{ensure_positive_amount, parse_uuid},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    ServiceChargePayment,
    Withdrawal,
}

impl TransactionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ServiceChargePayment => "service_charge_payment",
            Self::Withdrawal => "withdrawal",
        }
    }

    /// Human label used in error messages ("There is a pending withdrawal").
    pub fn label(self) -> &'static str {
        match self {
            Self::ServiceChargePayment => "service charge payment",
            Self::Withdrawal => "withdrawal",
        }
    }
}

impl TryFrom<&str> for TransactionKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "service_charge_payment" => Ok(Self::ServiceChargePayment),
            "withdrawal" => Ok(Self::Withdrawal),
            other => Err(EngineError::Validation(format!(
                "invalid transaction kind: {other}"
            ))),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Processing,
    Completed,
    Cancelled,
}

impl TransactionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl TryFrom<&str> for TransactionStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "processing" => Ok(Self::Processing),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(EngineError::Validation(format!(
                "invalid transaction status: {other}"
            ))),
        }
    }
}

/// How a vendor pays its service charge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Card,
    Wallet,
    Transfer,
}

impl PaymentMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Card => "card",
            Self::Wallet => "wallet",
            Self::Transfer => "transfer",
        }
    }
}

impl TryFrom<&str> for PaymentMethod {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "card" => Ok(Self::Card),
            "wallet" => Ok(Self::Wallet),
            "transfer" => Ok(Self::Transfer),
            other => Err(EngineError::Validation(format!(
                "invalid payment method: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub vendor_id: Uuid,
    pub kind: TransactionKind,
    pub amount_minor: i64,
    pub status: TransactionStatus,
    pub method: Option<PaymentMethod>,
    pub details: String,
    pub bank_account_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

impl Transaction {
    /// Builds a new `processing` transaction.
    pub fn open(
        vendor_id: Uuid,
        kind: TransactionKind,
        amount_minor: i64,
        method: Option<PaymentMethod>,
        details: String,
        bank_account_id: Option<Uuid>,
    ) -> ResultEngine<Self> {
        ensure_positive_amount(amount_minor)?;
        Ok(Self {
            id: Uuid::new_v4(),
            vendor_id,
            kind,
            amount_minor,
            status: TransactionStatus::Processing,
            method,
            details,
            bank_account_id,
            created_at: Utc::now(),
            resolved_at: None,
        })
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub vendor_id: String,
    pub kind: String,
    pub amount_minor: i64,
    pub status: String,
    pub method: Option<String>,
    pub details: String,
    pub bank_account_id: Option<String>,
    pub created_at: DateTimeUtc,
    pub resolved_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::vendors::Entity",
        from = "Column::VendorId",
        to = "super::vendors::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Vendors,
}

impl Related<super::vendors::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Vendors.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Transaction> for ActiveModel {
    fn from(tx: &Transaction) -> Self {
        Self {
            id: ActiveValue::Set(tx.id.to_string()),
            vendor_id: ActiveValue::Set(tx.vendor_id.to_string()),
            kind: ActiveValue::Set(tx.kind.as_str().to_string()),
            amount_minor: ActiveValue::Set(tx.amount_minor),
            status: ActiveValue::Set(tx.status.as_str().to_string()),
            method: ActiveValue::Set(tx.method.map(|m| m.as_str().to_string())),
            details: ActiveValue::Set(tx.details.clone()),
            bank_account_id: ActiveValue::Set(tx.bank_account_id.map(|id| id.to_string())),
            created_at: ActiveValue::Set(tx.created_at),
            resolved_at: ActiveValue::Set(tx.resolved_at),
        }
    }
}

impl TryFrom<Model> for Transaction {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "transaction")?,
            vendor_id: parse_uuid(&model.vendor_id, "vendor")?,
            kind: TransactionKind::try_from(model.kind.as_str())?,
            amount_minor: model.amount_minor,
            status: TransactionStatus::try_from(model.status.as_str())?,
            method: model
                .method
                .as_deref()
                .map(PaymentMethod::try_from)
                .transpose()?,
            details: model.details,
            bank_account_id: model
                .bank_account_id
                .as_deref()
                .map(|id| parse_uuid(id, "bank account"))
                .transpose()?,
            created_at: model.created_at,
            resolved_at: model.resolved_at,
        })
    }
}
