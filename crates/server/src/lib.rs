use api_types::Envelope;
use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::IntoResponse,
};
use engine::EngineError;

pub use principal::{CurrentAdmin, CurrentVendor, Principal};
pub use server::{ServerState, router, run_with_listener, spawn_with_listener};

mod account;
mod bank_accounts;
mod defaults;
mod extract;
mod principal;
mod server;
mod transactions;
mod vendors;

pub mod types {
    pub use api_types::Envelope;

    pub mod account {
        pub use api_types::account::{AccountView, SaleSettle};
    }

    pub mod vendor {
        pub use api_types::vendor::{VendorId, VendorNew};
    }

    pub mod bank_account {
        pub use api_types::bank_account::{BankAccountNew, BankAccountView};
    }

    pub mod defaults {
        pub use api_types::defaults::AppDefaults;
    }

    pub mod transaction {
        pub use api_types::transaction::{
            DebtPaymentNew, PaymentMethod, TransactionKind, TransactionList, TransactionResolve,
            TransactionStatus, TransactionView, WithdrawalNew,
        };
    }
}

#[derive(Debug)]
pub enum ServerError {
    Engine(EngineError),
    /// Malformed or missing input, rejected before touching the engine.
    Validation(String),
    Unauthorized,
    Forbidden(String),
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::Forbidden(_) => StatusCode::FORBIDDEN,
        EngineError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::Persistence(_) | EngineError::Database(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
        EngineError::InvalidAmount(_)
        | EngineError::Validation(_)
        | EngineError::ExistingKey(_)
        | EngineError::PendingTransaction(_)
        | EngineError::NoServiceCharge
        | EngineError::InsufficientFunds(_)
        | EngineError::ServiceChargeLimit(_)
        | EngineError::MissingDefaultBank => StatusCode::BAD_REQUEST,
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        EngineError::Persistence(reason) => {
            tracing::error!("persistence failure: {reason}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

fn summary_for_status(status: StatusCode) -> &'static str {
    match status {
        StatusCode::BAD_REQUEST => "Bad request",
        StatusCode::UNAUTHORIZED => "Unauthorized",
        StatusCode::FORBIDDEN => "Forbidden",
        StatusCode::NOT_FOUND => "Not found",
        _ => "Server error",
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Engine(err) => {
                (status_for_engine_error(&err), message_for_engine_error(err))
            }
            ServerError::Validation(err) => (StatusCode::BAD_REQUEST, err),
            ServerError::Unauthorized => {
                (StatusCode::UNAUTHORIZED, "invalid credentials".to_string())
            }
            ServerError::Forbidden(err) => (StatusCode::FORBIDDEN, err),
        };

        let envelope = Envelope::failure(summary_for_status(status), vec![error]);
        tracing::debug!(
            unique_id = %envelope.unique_id,
            status = status.as_u16(),
            "request rejected"
        );
        (status, Json(envelope)).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

impl From<JsonRejection> for ServerError {
    fn from(value: JsonRejection) -> Self {
        Self::Validation(value.body_text())
    }
}

impl From<QueryRejection> for ServerError {
    fn from(value: QueryRejection) -> Self {
        Self::Validation(value.body_text())
    }
}

impl From<PathRejection> for ServerError {
    fn from(value: PathRejection) -> Self {
        Self::Validation(value.body_text())
    }
}

/// Wrap `data` in a success envelope.
pub(crate) fn ok<T>(text: &str, data: T) -> Json<Envelope<T>> {
    Json(Envelope::success(text, data))
}
