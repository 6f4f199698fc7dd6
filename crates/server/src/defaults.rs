//! Admin app defaults endpoints

use api_types::{Envelope, defaults::AppDefaults};
use axum::{Json, extract::State};

use crate::{CurrentAdmin, ServerError, extract::ApiJson, ok, server::ServerState};

fn map_defaults(defaults: engine::AppDefaults) -> AppDefaults {
    AppDefaults {
        max_debt_minor: defaults.max_debt_minor,
        service_charge_bps: defaults.service_charge_bps,
    }
}

pub async fn get(
    _admin: CurrentAdmin,
    State(state): State<ServerState>,
) -> Result<Json<Envelope<AppDefaults>>, ServerError> {
    let defaults = state.engine.app_defaults().await?;
    Ok(ok("App defaults retrieved", map_defaults(defaults)))
}

pub async fn update(
    admin: CurrentAdmin,
    State(state): State<ServerState>,
    ApiJson(payload): ApiJson<AppDefaults>,
) -> Result<Json<Envelope<AppDefaults>>, ServerError> {
    let defaults = state
        .engine
        .update_app_defaults(engine::AppDefaults {
            max_debt_minor: payload.max_debt_minor,
            service_charge_bps: payload.service_charge_bps,
        })
        .await?;
    tracing::info!(
        admin = %admin.username,
        max_debt_minor = defaults.max_debt_minor,
        service_charge_bps = defaults.service_charge_bps,
        "app defaults updated"
    );
    Ok(ok("App defaults updated", map_defaults(defaults)))
}
