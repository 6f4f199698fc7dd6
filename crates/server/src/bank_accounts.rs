//! Bank account API endpoints

use api_types::{
    Envelope,
    bank_account::{BankAccountNew, BankAccountView},
};
use axum::{Json, extract::State};
use uuid::Uuid;

use crate::{
    CurrentVendor, ServerError,
    extract::{ApiJson, ApiPath},
    ok,
    server::ServerState,
};

fn map_bank_account(bank: engine::BankAccount) -> BankAccountView {
    BankAccountView {
        id: bank.id,
        account_number: bank.masked_number(),
        bank_name: bank.bank_name,
        account_name: bank.account_name,
        is_default: bank.is_default,
    }
}

pub async fn list(
    vendor: CurrentVendor,
    State(state): State<ServerState>,
) -> Result<Json<Envelope<Vec<BankAccountView>>>, ServerError> {
    let banks = state.engine.bank_accounts(vendor.vendor_id).await?;
    Ok(ok(
        "Bank accounts retrieved",
        banks.into_iter().map(map_bank_account).collect(),
    ))
}

pub async fn create(
    vendor: CurrentVendor,
    State(state): State<ServerState>,
    ApiJson(payload): ApiJson<BankAccountNew>,
) -> Result<Json<Envelope<BankAccountView>>, ServerError> {
    let bank = state
        .engine
        .add_bank_account(
            vendor.vendor_id,
            &payload.bank_name,
            &payload.account_number,
            &payload.account_name,
        )
        .await?;
    Ok(ok("Bank account added", map_bank_account(bank)))
}

pub async fn set_default(
    vendor: CurrentVendor,
    State(state): State<ServerState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Envelope<BankAccountView>>, ServerError> {
    let bank = state
        .engine
        .set_default_bank_account(vendor.vendor_id, id)
        .await?;
    Ok(ok("Default bank account updated", map_bank_account(bank)))
}
