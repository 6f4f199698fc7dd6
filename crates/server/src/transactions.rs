//! Ledger transaction API endpoints

use api_types::{
    Envelope,
    transaction::{
        DebtPaymentNew, PaymentMethod as ApiMethod, TransactionKind as ApiKind, TransactionList,
        TransactionResolve, TransactionStatus as ApiStatus, TransactionView, WithdrawalNew,
    },
};
use axum::{Json, extract::State};
use uuid::Uuid;

use crate::{
    CurrentAdmin, CurrentVendor, ServerError,
    extract::{ApiJson, ApiPath, ApiQuery},
    ok,
    server::ServerState,
};

fn map_kind(kind: engine::TransactionKind) -> ApiKind {
    match kind {
        engine::TransactionKind::ServiceChargePayment => ApiKind::ServiceChargePayment,
        engine::TransactionKind::Withdrawal => ApiKind::Withdrawal,
    }
}

fn unmap_kind(kind: ApiKind) -> engine::TransactionKind {
    match kind {
        ApiKind::ServiceChargePayment => engine::TransactionKind::ServiceChargePayment,
        ApiKind::Withdrawal => engine::TransactionKind::Withdrawal,
    }
}

fn map_status(status: engine::TransactionStatus) -> ApiStatus {
    match status {
        engine::TransactionStatus::Processing => ApiStatus::Processing,
        engine::TransactionStatus::Completed => ApiStatus::Completed,
        engine::TransactionStatus::Cancelled => ApiStatus::Cancelled,
    }
}

fn unmap_status(status: ApiStatus) -> engine::TransactionStatus {
    match status {
        ApiStatus::Processing => engine::TransactionStatus::Processing,
        ApiStatus::Completed => engine::TransactionStatus::Completed,
        ApiStatus::Cancelled => engine::TransactionStatus::Cancelled,
    }
}

fn map_method(method: engine::PaymentMethod) -> ApiMethod {
    match method {
        engine::PaymentMethod::Card => ApiMethod::Card,
        engine::PaymentMethod::Wallet => ApiMethod::Wallet,
        engine::PaymentMethod::Transfer => ApiMethod::Transfer,
    }
}

fn unmap_method(method: ApiMethod) -> engine::PaymentMethod {
    match method {
        ApiMethod::Card => engine::PaymentMethod::Card,
        ApiMethod::Wallet => engine::PaymentMethod::Wallet,
        ApiMethod::Transfer => engine::PaymentMethod::Transfer,
    }
}

fn map_transaction(tx: engine::Transaction) -> TransactionView {
    TransactionView {
        id: tx.id,
        vendor_id: tx.vendor_id,
        kind: map_kind(tx.kind),
        amount_minor: tx.amount_minor,
        status: map_status(tx.status),
        method: tx.method.map(map_method),
        details: tx.details,
        bank_account_id: tx.bank_account_id,
        created_at: tx.created_at,
        resolved_at: tx.resolved_at,
    }
}

fn list_filter(vendor_id: Option<Uuid>, query: &TransactionList) -> engine::TransactionListFilter {
    engine::TransactionListFilter {
        vendor_id,
        kind: query.kind.map(unmap_kind),
        status: query.status.map(unmap_status),
        limit: query.limit,
    }
}

pub async fn debt_payment_new(
    vendor: CurrentVendor,
    State(state): State<ServerState>,
    ApiJson(payload): ApiJson<DebtPaymentNew>,
) -> Result<Json<Envelope<TransactionView>>, ServerError> {
    let tx = state
        .engine
        .open_debt_payment(
            vendor.vendor_id,
            payload.amount_minor,
            unmap_method(payload.method),
        )
        .await?;
    Ok(ok("Service charge payment opened", map_transaction(tx)))
}

pub async fn withdrawal_new(
    vendor: CurrentVendor,
    State(state): State<ServerState>,
    ApiJson(payload): ApiJson<WithdrawalNew>,
) -> Result<Json<Envelope<TransactionView>>, ServerError> {
    let tx = state
        .engine
        .open_withdrawal(vendor.vendor_id, payload.amount_minor)
        .await?;
    Ok(ok("Withdrawal opened", map_transaction(tx)))
}

/// The caller's own transactions; `vendor_id` in the query is ignored.
pub async fn list(
    vendor: CurrentVendor,
    State(state): State<ServerState>,
    ApiQuery(query): ApiQuery<TransactionList>,
) -> Result<Json<Envelope<Vec<TransactionView>>>, ServerError> {
    let txs = state
        .engine
        .list_transactions(&list_filter(Some(vendor.vendor_id), &query))
        .await?;
    Ok(ok(
        "Transactions retrieved",
        txs.into_iter().map(map_transaction).collect(),
    ))
}

pub async fn get_detail(
    vendor: CurrentVendor,
    State(state): State<ServerState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Envelope<TransactionView>>, ServerError> {
    let tx = state.engine.transaction(vendor.vendor_id, id).await?;
    Ok(ok("Transaction retrieved", map_transaction(tx)))
}

pub async fn admin_list(
    _admin: CurrentAdmin,
    State(state): State<ServerState>,
    ApiQuery(query): ApiQuery<TransactionList>,
) -> Result<Json<Envelope<Vec<TransactionView>>>, ServerError> {
    let txs = state
        .engine
        .list_transactions(&list_filter(query.vendor_id, &query))
        .await?;
    Ok(ok(
        "Transactions retrieved",
        txs.into_iter().map(map_transaction).collect(),
    ))
}

pub async fn complete(
    admin: CurrentAdmin,
    State(state): State<ServerState>,
    ApiPath((vendor_id, id)): ApiPath<(Uuid, Uuid)>,
    ApiJson(payload): ApiJson<TransactionResolve>,
) -> Result<Json<Envelope<TransactionView>>, ServerError> {
    let tx = state
        .engine
        .complete_transaction(vendor_id, id, unmap_kind(payload.kind))
        .await?;
    tracing::info!(admin = %admin.username, transaction_id = %id, "transaction completed by admin");
    Ok(ok("Transaction completed", map_transaction(tx)))
}

pub async fn cancel(
    admin: CurrentAdmin,
    State(state): State<ServerState>,
    ApiPath((vendor_id, id)): ApiPath<(Uuid, Uuid)>,
    ApiJson(payload): ApiJson<TransactionResolve>,
) -> Result<Json<Envelope<TransactionView>>, ServerError> {
    let tx = state
        .engine
        .cancel_transaction(vendor_id, id, unmap_kind(payload.kind))
        .await?;
    tracing::info!(admin = %admin.username, transaction_id = %id, "transaction cancelled by admin");
    Ok(ok("Transaction cancelled", map_transaction(tx)))
}
