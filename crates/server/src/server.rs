use axum::{
    Router,
    extract::{Request, State},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Basic},
};

use std::sync::Arc;

use crate::{
    Principal, ServerError, account, bank_accounts, defaults, transactions, vendors,
};
use engine::Engine;

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
}

async fn auth(
    auth_header: Option<TypedHeader<Authorization<Basic>>>,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ServerError> {
    let Some(TypedHeader(auth_header)) = auth_header else {
        return Err(ServerError::Unauthorized);
    };
    if auth_header.username().is_empty() || auth_header.password().is_empty() {
        return Err(ServerError::Unauthorized);
    }

    let user = state
        .engine
        .authenticate(auth_header.username(), auth_header.password())
        .await?
        .ok_or(ServerError::Unauthorized)?;

    let principal = Principal::try_from(user)?;
    tracing::debug!(username = principal.username(), "request authenticated");
    request.extensions_mut().insert(principal);
    Ok(next.run(request).await)
}

pub fn router(state: ServerState) -> Router {
    Router::new()
        .route("/account", get(account::get))
        .route(
            "/bank-accounts",
            get(bank_accounts::list).post(bank_accounts::create),
        )
        .route(
            "/bank-accounts/{id}/default",
            post(bank_accounts::set_default),
        )
        .route(
            "/transactions/debt-payment",
            post(transactions::debt_payment_new),
        )
        .route(
            "/transactions/withdrawal",
            post(transactions::withdrawal_new),
        )
        .route("/transactions", get(transactions::list))
        .route("/transactions/{id}", get(transactions::get_detail))
        .route("/admin/vendors", post(vendors::create))
        .route(
            "/admin/vendors/{vendor_id}",
            axum::routing::delete(vendors::delete),
        )
        .route(
            "/admin/vendors/{vendor_id}/account",
            get(account::admin_get),
        )
        .route(
            "/admin/vendors/{vendor_id}/sales",
            post(account::settle_sale),
        )
        .route("/admin/transactions", get(transactions::admin_list))
        .route(
            "/admin/vendors/{vendor_id}/transactions/{id}/complete",
            post(transactions::complete),
        )
        .route(
            "/admin/vendors/{vendor_id}/transactions/{id}/cancel",
            post(transactions::cancel),
        )
        .route("/admin/defaults", get(defaults::get).put(defaults::update))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth))
        .with_state(state)
}

pub async fn run_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    let state = ServerState {
        engine: Arc::new(engine),
    };

    axum::serve(listener, router(state)).await
}

pub fn spawn_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(engine, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
