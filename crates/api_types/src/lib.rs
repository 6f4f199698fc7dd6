use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JSON envelope wrapped around every response body.
///
/// Successful responses carry `data`, failed ones carry `errors`; `text` is a
/// short human-readable summary in both cases. `unique_id` correlates the
/// response with the server logs.
#[derive(Debug, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub unique_id: Uuid,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
}

impl<T> Envelope<T> {
    pub fn success(text: impl Into<String>, data: T) -> Self {
        Self {
            unique_id: Uuid::new_v4(),
            text: text.into(),
            data: Some(data),
            errors: None,
        }
    }
}

impl Envelope<()> {
    pub fn failure(text: impl Into<String>, errors: Vec<String>) -> Self {
        Self {
            unique_id: Uuid::new_v4(),
            text: text.into(),
            data: None,
            errors: Some(errors),
        }
    }
}

pub mod account {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountView {
        pub vendor_id: Uuid,
        pub balance_minor: i64,
        pub service_charge_minor: i64,
    }

    /// A settled sale credited to a vendor.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct SaleSettle {
        /// Gross amount of the sale, must be > 0.
        pub amount_minor: i64,
    }
}

pub mod vendor {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct VendorNew {
        pub name: String,
    }

    /// Returned when a vendor is created or deleted.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct VendorId {
        pub id: Uuid,
    }
}

pub mod bank_account {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BankAccountNew {
        pub bank_name: String,
        pub account_number: String,
        pub account_name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BankAccountView {
        pub id: Uuid,
        pub bank_name: String,
        /// Only the last four characters are visible.
        pub account_number: String,
        pub account_name: String,
        pub is_default: bool,
    }
}

pub mod defaults {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AppDefaults {
        pub max_debt_minor: i64,
        pub service_charge_bps: i64,
    }
}

pub mod transaction {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum TransactionKind {
        ServiceChargePayment,
        Withdrawal,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum TransactionStatus {
        Processing,
        Completed,
        Cancelled,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum PaymentMethod {
        Card,
        Wallet,
        Transfer,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DebtPaymentNew {
        /// Must be > 0 and not above the owed service charge.
        pub amount_minor: i64,
        pub method: PaymentMethod,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct WithdrawalNew {
        /// Must be > 0 and not above the balance.
        pub amount_minor: i64,
    }

    /// Body of the admin complete/cancel endpoints. The kind must match the
    /// stored transaction.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionResolve {
        pub kind: TransactionKind,
    }

    /// Query string of the list endpoints.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct TransactionList {
        /// Admin listing only; ignored for vendors.
        pub vendor_id: Option<Uuid>,
        pub kind: Option<TransactionKind>,
        pub status: Option<TransactionStatus>,
        pub limit: Option<u64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionView {
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
}
