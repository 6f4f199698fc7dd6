//! Account API endpoints

use api_types::{
    Envelope,
    account::{AccountView, SaleSettle},
};
use axum::{Json, extract::State};
use uuid::Uuid;

use crate::{
    CurrentAdmin, CurrentVendor, ServerError,
    extract::{ApiJson, ApiPath},
    ok,
    server::ServerState,
};

fn map_account(account: engine::Account) -> AccountView {
    AccountView {
        vendor_id: account.vendor_id,
        balance_minor: account.balance,
        service_charge_minor: account.service_charge,
    }
}

pub async fn get(
    vendor: CurrentVendor,
    State(state): State<ServerState>,
) -> Result<Json<Envelope<AccountView>>, ServerError> {
    let account = state.engine.account(vendor.vendor_id).await?;
    Ok(ok("Account retrieved", map_account(account)))
}

pub async fn admin_get(
    _admin: CurrentAdmin,
    State(state): State<ServerState>,
    ApiPath(vendor_id): ApiPath<Uuid>,
) -> Result<Json<Envelope<AccountView>>, ServerError> {
    let account = state.engine.account(vendor_id).await?;
    Ok(ok("Account retrieved", map_account(account)))
}

pub async fn settle_sale(
    admin: CurrentAdmin,
    State(state): State<ServerState>,
    ApiPath(vendor_id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<SaleSettle>,
) -> Result<Json<Envelope<AccountView>>, ServerError> {
    let account = state
        .engine
        .settle_sale(vendor_id, payload.amount_minor)
        .await?;
    tracing::info!(
        admin = %admin.username,
        vendor_id = %vendor_id,
        amount_minor = payload.amount_minor,
        "sale settled"
    );
    Ok(ok("Sale settled", map_account(account)))
}
