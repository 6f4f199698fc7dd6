//! Admin vendor endpoints

use api_types::{
    Envelope,
    vendor::{VendorId, VendorNew},
};
use axum::{Json, extract::State};
use uuid::Uuid;

use crate::{
    CurrentAdmin, ServerError,
    extract::{ApiJson, ApiPath},
    ok,
    server::ServerState,
};

pub async fn create(
    _admin: CurrentAdmin,
    State(state): State<ServerState>,
    ApiJson(payload): ApiJson<VendorNew>,
) -> Result<Json<Envelope<VendorId>>, ServerError> {
    let id = state.engine.new_vendor(&payload.name).await?;
    Ok(ok("Vendor created", VendorId { id }))
}

/// Hard delete: the vendor, its account, bank accounts, transactions and
/// logins are removed.
pub async fn delete(
    admin: CurrentAdmin,
    State(state): State<ServerState>,
    ApiPath(vendor_id): ApiPath<Uuid>,
) -> Result<Json<Envelope<VendorId>>, ServerError> {
    state.engine.delete_vendor(vendor_id).await?;
    tracing::info!(admin = %admin.username, vendor_id = %vendor_id, "vendor deleted");
    Ok(ok("Vendor deleted", VendorId { id: vendor_id }))
}
