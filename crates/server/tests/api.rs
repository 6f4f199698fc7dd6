use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode, header},
};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use engine::{AppDefaults, Engine, Role};
use http_body_util::BodyExt;
use migration::{Migrator, MigratorTrait};
use sea_orm::Database;
use serde_json::{Value, json};
use server::{ServerState, router};
use tower::ServiceExt;
use uuid::Uuid;

const ADMIN: (&str, &str) = ("root", "root-secret");
const VENDOR: (&str, &str) = ("shop", "shop-secret");

struct TestApp {
    state: ServerState,
    vendor_id: Uuid,
}

async fn test_app() -> TestApp {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder().database(db).build().await.unwrap();
    engine
        .ensure_app_defaults(AppDefaults {
            max_debt_minor: 60,
            service_charge_bps: 2_000,
        })
        .await
        .unwrap();

    let vendor_id = engine.new_vendor("Shop").await.unwrap();
    engine
        .new_user(ADMIN.0, ADMIN.1, Role::Admin, None)
        .await
        .unwrap();
    engine
        .new_user(VENDOR.0, VENDOR.1, Role::Vendor, Some(vendor_id))
        .await
        .unwrap();

    TestApp {
        state: ServerState {
            engine: Arc::new(engine),
        },
        vendor_id,
    }
}

fn basic(credentials: (&str, &str)) -> String {
    let token = STANDARD.encode(format!("{}:{}", credentials.0, credentials.1));
    format!("Basic {token}")
}

impl TestApp {
    async fn call(
        &self,
        method: &str,
        uri: &str,
        credentials: Option<(&str, &str)>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(credentials) = credentials {
            builder = builder.header(header::AUTHORIZATION, basic(credentials));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = router(self.state.clone()).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }
}

#[tokio::test]
async fn missing_credentials_are_unauthorized() {
    let app = test_app().await;
    let (status, body) = app.call("GET", "/account", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["errors"].is_array());
}

#[tokio::test]
async fn wrong_password_is_unauthorized() {
    let app = test_app().await;
    let (status, _) = app
        .call("GET", "/account", Some((VENDOR.0, "nope")), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn roles_are_enforced() {
    let app = test_app().await;
    let (status, _) = app.call("GET", "/account", Some(ADMIN), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.call("GET", "/admin/defaults", Some(VENDOR), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn vendor_reads_its_account_in_an_envelope() {
    let app = test_app().await;
    let (status, body) = app.call("GET", "/account", Some(VENDOR), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["unique_id"].is_string());
    assert_eq!(body["data"]["vendor_id"], app.vendor_id.to_string());
    assert_eq!(body["data"]["balance_minor"], 0);
    assert!(body.get("errors").is_none());
}

#[tokio::test]
async fn debt_payment_without_service_charge_is_rejected() {
    let app = test_app().await;
    let (status, body) = app
        .call(
            "POST",
            "/transactions/debt-payment",
            Some(VENDOR),
            Some(json!({"amount_minor": 10, "method": "card"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0], "No service charge to pay");

    let (_, list) = app.call("GET", "/transactions", Some(VENDOR), None).await;
    assert_eq!(list["data"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn malformed_json_is_a_bad_request() {
    let app = test_app().await;
    let (status, body) = app
        .call(
            "POST",
            "/transactions/withdrawal",
            Some(VENDOR),
            Some(json!({"amount": "lots"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errors"][0].is_string());
}

#[tokio::test]
async fn withdrawal_round_trip_through_admin_completion() {
    let app = test_app().await;
    let vendor_id = app.vendor_id;

    let (status, body) = app
        .call(
            "POST",
            &format!("/admin/vendors/{vendor_id}/sales"),
            Some(ADMIN),
            Some(json!({"amount_minor": 100})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["balance_minor"], 100);
    assert_eq!(body["data"]["service_charge_minor"], 20);

    let (status, _) = app
        .call(
            "POST",
            "/bank-accounts",
            Some(VENDOR),
            Some(json!({
                "bank_name": "First Bank",
                "account_number": "0123456789",
                "account_name": "Shop Ltd"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .call(
            "POST",
            "/transactions/withdrawal",
            Some(VENDOR),
            Some(json!({"amount_minor": 50})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "processing");
    let tx_id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = app
        .call(
            "POST",
            "/transactions/withdrawal",
            Some(VENDOR),
            Some(json!({"amount_minor": 10})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0], "There is a pending withdrawal");

    let (status, body) = app
        .call(
            "POST",
            &format!("/admin/vendors/{vendor_id}/transactions/{tx_id}/complete"),
            Some(ADMIN),
            Some(json!({"kind": "withdrawal"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "completed");

    let (_, body) = app.call("GET", "/account", Some(VENDOR), None).await;
    assert_eq!(body["data"]["balance_minor"], 50);
    assert_eq!(body["data"]["service_charge_minor"], 20);
}

#[tokio::test]
async fn resolving_with_the_wrong_kind_is_not_found() {
    let app = test_app().await;
    let vendor_id = app.vendor_id;
    app.state.engine.settle_sale(vendor_id, 100).await.unwrap();

    let (_, body) = app
        .call(
            "POST",
            "/transactions/debt-payment",
            Some(VENDOR),
            Some(json!({"amount_minor": 5, "method": "wallet"})),
        )
        .await;
    let tx_id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, _) = app
        .call(
            "POST",
            &format!("/admin/vendors/{vendor_id}/transactions/{tx_id}/cancel"),
            Some(ADMIN),
            Some(json!({"kind": "withdrawal"})),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn invalid_path_id_is_a_bad_request() {
    let app = test_app().await;
    let (status, _) = app
        .call("GET", "/transactions/not-a-uuid", Some(VENDOR), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn admin_updates_defaults() {
    let app = test_app().await;
    let (status, body) = app
        .call(
            "PUT",
            "/admin/defaults",
            Some(ADMIN),
            Some(json!({"max_debt_minor": 1000, "service_charge_bps": 250})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["service_charge_bps"], 250);

    let (status, _) = app
        .call(
            "PUT",
            "/admin/defaults",
            Some(ADMIN),
            Some(json!({"max_debt_minor": 1000, "service_charge_bps": 20000})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn admin_deletes_vendor() {
    let app = test_app().await;
    let vendor_id = app.vendor_id;
    let (status, body) = app
        .call(
            "DELETE",
            &format!("/admin/vendors/{vendor_id}"),
            Some(ADMIN),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["text"], "Vendor deleted");
    assert_eq!(body["data"]["id"], vendor_id.to_string());

    let (status, _) = app
        .call(
            "GET",
            &format!("/admin/vendors/{vendor_id}/account"),
            Some(ADMIN),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // The vendor's login went with it.
    let (status, _) = app.call("GET", "/account", Some(VENDOR), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
