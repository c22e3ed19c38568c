//! # Integration Tests for educred-api
//!
//! Drives the full router with `tower::ServiceExt::oneshot`: health checks,
//! mint/verify/revoke scenarios, issuance and bulk issuance, metadata
//! round trips and limits, authentication and the OpenAPI document.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use educred_api::state::{AppConfig, AppState};
use educred_issuance::IssuanceConfig;
use educred_store::{FsMetadataStore, MetadataStore};

const ISSUER: &str = "0xcccccccccccccccccccccccccccccccccccccccc";
const OWNER_A: &str = "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
const OWNER_B: &str = "0x9876543210987654321098765432109876543210";
const URI: &str = "ipfs://QmSvPd3sHK7iWgZuW47fyLy4CaZQe2DwxvRhrJ39VpBVMK";

/// Helper: build the test app with auth disabled.
fn test_app() -> axum::Router {
    educred_api::app(AppState::new())
}

/// Helper: build the test app with auth enabled.
fn test_app_with_auth(token: &str) -> axum::Router {
    let config = AppConfig {
        auth_token: Some(token.to_string()),
        ..AppConfig::default()
    };
    educred_api::app(AppState::try_with_config(config, None).unwrap())
}

/// Helper: read response body as string.
async fn body_string(response: axum::http::Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Helper: read response body as JSON.
async fn body_json(response: axum::http::Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

/// POST JSON as the issuer wallet (auth disabled).
fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .header("x-wallet-address", ISSUER)
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn post_empty(uri: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("x-wallet-address", ISSUER)
        .body(Body::empty())
        .unwrap()
}

async fn mint(app: &axum::Router, owner: &str, uri: &str) -> Value {
    let response = app
        .clone()
        .oneshot(post_json(
            "/v1/certificates",
            &json!({"owner": owner, "metadata_uri": uri}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await
}

fn issue_body(wallet: &str) -> Value {
    json!({
        "student_name": "Bob Johnson",
        "email": "bob@example.com",
        "wallet_address": wallet,
        "course": "Web3 Development",
        "institution": "QUIN Academy",
        "completion_date": "2024-01-25",
        "grade": "B+"
    })
}

// -- Health Checks ------------------------------------------------------------

#[tokio::test]
async fn test_liveness_endpoint() {
    let response = test_app().oneshot(get("/health/liveness")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "ok");
}

#[tokio::test]
async fn test_readiness_endpoint() {
    let response = test_app().oneshot(get("/health/readiness")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "ready");
}

#[tokio::test]
async fn test_health_is_outside_auth() {
    let response = test_app_with_auth("s3cret")
        .oneshot(get("/health/liveness"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_metrics_unavailable_without_recorder() {
    let response = test_app().oneshot(get("/metrics")).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

// -- Registry scenarios -------------------------------------------------------

#[tokio::test]
async fn test_mint_then_verify_names_caller_as_issuer() {
    let app = test_app();
    let cert = mint(&app, OWNER_A, URI).await;
    assert_eq!(cert["token_id"], 1);
    assert_eq!(cert["owner"], OWNER_A);
    assert_eq!(cert["issuer"], ISSUER);
    assert_eq!(cert["status"], "valid");
    assert!(cert.get("revoked_at").is_none());

    let owner = body_json(app.clone().oneshot(get("/v1/certificates/1/owner")).await.unwrap()).await;
    assert_eq!(owner["owner"], OWNER_A);

    let response = app.clone().oneshot(get("/v1/certificates/1/verify")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let verification = body_json(response).await;
    assert_eq!(verification["exists"], true);
    assert_eq!(verification["is_valid"], true);
    assert_eq!(verification["owner"], OWNER_A);
    assert_eq!(verification["issuer"], ISSUER);

    let second = mint(&app, OWNER_B, URI).await;
    assert_eq!(second["token_id"], 2);
}

#[tokio::test]
async fn test_verify_unknown_token_is_not_an_error() {
    for id in ["999", "0", "18446744073709551615"] {
        let response = test_app()
            .oneshot(get(&format!("/v1/certificates/{id}/verify")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK, "{id}");
        let body = body_json(response).await;
        assert_eq!(body["exists"], false, "{id}");
        assert_eq!(body["is_valid"], false, "{id}");
        assert!(body["owner"].is_null());
        assert!(body["issuer"].is_null());
    }
}

#[tokio::test]
async fn test_verify_non_integer_id_is_422() {
    for id in ["abc", "-1", "1.5"] {
        let response = test_app()
            .oneshot(get(&format!("/v1/certificates/{id}/verify")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY, "{id}");
        assert_eq!(body_json(response).await["error"]["code"], "VALIDATION_ERROR");
    }
}

#[tokio::test]
async fn test_unknown_token_lookup_is_404() {
    let response = test_app()
        .oneshot(get("/v1/certificates/999"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_malformed_token_id_is_422() {
    for uri in ["/v1/certificates/abc", "/v1/certificates/0"] {
        let response = test_app().oneshot(get(uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY, "{uri}");
    }
}

#[tokio::test]
async fn test_revoke_is_idempotent_and_keeps_owner() {
    let app = test_app();
    mint(&app, OWNER_A, URI).await;

    let response = app
        .clone()
        .oneshot(post_empty("/v1/certificates/1/revoke"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let first = body_json(response).await;
    assert_eq!(first["newly_revoked"], true);
    assert_eq!(first["certificate"]["status"], "revoked");
    let revoked_at = first["certificate"]["revoked_at"].clone();
    assert!(revoked_at.is_string());

    let second = body_json(
        app.clone()
            .oneshot(post_empty("/v1/certificates/1/revoke"))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(second["newly_revoked"], false);
    assert_eq!(second["certificate"]["revoked_at"], revoked_at);

    let verification = body_json(app.clone().oneshot(get("/v1/certificates/1/verify")).await.unwrap()).await;
    assert_eq!(verification["exists"], true);
    assert_eq!(verification["is_valid"], false);
    assert_eq!(verification["owner"], OWNER_A);

    let stats = body_json(app.oneshot(get("/v1/registry/stats")).await.unwrap()).await;
    assert_eq!(stats, json!({"total_supply": 1, "valid": 0, "revoked": 1}));
}

#[tokio::test]
async fn test_revoke_unknown_token_is_404() {
    let response = test_app()
        .oneshot(post_empty("/v1/certificates/42/revoke"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_mint_without_signing_identity_is_428() {
    let app = test_app();
    let request = Request::builder()
        .method("POST")
        .uri("/v1/certificates")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({"owner": OWNER_A, "metadata_uri": URI}).to_string(),
        ))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::PRECONDITION_REQUIRED);
    assert_eq!(body_json(response).await["error"]["code"], "NOT_INITIALIZED");

    let stats = body_json(app.oneshot(get("/v1/registry/stats")).await.unwrap()).await;
    assert_eq!(stats["total_supply"], 0);
}

#[tokio::test]
async fn test_mint_with_invalid_owner_is_422() {
    let response = test_app()
        .oneshot(post_json(
            "/v1/certificates",
            &json!({"owner": "0x123", "metadata_uri": URI}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body_json(response).await["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_owner_views() {
    let app = test_app();
    mint(&app, OWNER_A, URI).await;
    mint(&app, OWNER_B, URI).await;
    mint(&app, OWNER_A, URI).await;

    // Lookup is case-insensitive.
    let upper = OWNER_A.to_uppercase().replacen("0X", "0x", 1);
    let balance = body_json(
        app.clone()
            .oneshot(get(&format!("/v1/owners/{upper}/balance")))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(balance["balance"], 2);

    let holdings = body_json(
        app.clone()
            .oneshot(get(&format!("/v1/owners/{OWNER_A}/certificates")))
            .await
            .unwrap(),
    )
    .await;
    let ids: Vec<u64> = holdings["certificates"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["token_id"].as_u64().unwrap())
        .collect();
    assert_eq!(ids, vec![1, 3]);

    let empty = body_json(
        app.oneshot(get("/v1/owners/0x1111111111111111111111111111111111111111/balance"))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(empty["balance"], 0);
}

// -- Issuance -----------------------------------------------------------------

#[tokio::test]
async fn test_issue_then_report_is_verified() {
    let app = test_app();
    let response = app
        .clone()
        .oneshot(post_json("/v1/certificates/issue", &issue_body(OWNER_B)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let receipt = body_json(response).await;
    assert_eq!(receipt["token_id"], 1);
    assert_eq!(receipt["issuer"], ISSUER);
    assert!(receipt["certificate_hash"].as_str().unwrap().starts_with("0x"));
    let metadata_id = receipt["metadata_id"].as_str().unwrap().to_string();
    assert_eq!(receipt["metadata_uri"], format!("ipfs://{metadata_id}"));

    let report = body_json(app.clone().oneshot(get("/v1/certificates/1/report")).await.unwrap()).await;
    assert_eq!(report["exists"], true);
    assert_eq!(report["verified"], true);
    assert_eq!(report["metadata"]["status"], "verified");
    assert_eq!(report["metadata"]["content_id"], metadata_id);
    assert_eq!(
        report["metadata"]["document"]["certificate_data"]["student_name"],
        "Bob Johnson"
    );

    let document = body_json(
        app.oneshot(get(&format!("/v1/metadata/{metadata_id}")))
            .await
            .unwrap(),
    )
    .await;
    assert!(document.get("email").is_none());
    assert_eq!(document["certificate_data"]["grade"], "B+");
}

#[tokio::test]
async fn test_issue_with_invalid_wallet_stores_nothing() {
    let app = test_app();
    let response = app
        .clone()
        .oneshot(post_json("/v1/certificates/issue", &issue_body("0x1")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let stats = body_json(app.oneshot(get("/v1/registry/stats")).await.unwrap()).await;
    assert_eq!(stats["total_supply"], 0);
}

#[tokio::test]
async fn test_report_for_unknown_token() {
    let report = body_json(
        test_app()
            .oneshot(get("/v1/certificates/999/report"))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(report["exists"], false);
    assert_eq!(report["verified"], false);
    assert_eq!(report["metadata"], json!({"status": "skipped"}));
}

#[tokio::test]
async fn test_bulk_with_invalid_second_row() {
    let app = test_app();
    let csv = "student_name,email,wallet_address,course,institution,completion_date,grade\n\
               Ann,ann@x.io,0x1111111111111111111111111111111111111111,Rust,Uni,2024-01-01,A\n\
               Bob,bob@x.io,0xNOTANADDRESS,Rust,Uni,2024-01-01,B\n\
               Cy,cy@x.io,0x3333333333333333333333333333333333333333,Rust,Uni,2024-01-01,C\n";
    let request = Request::builder()
        .method("POST")
        .uri("/v1/certificates/bulk")
        .header("content-type", "text/csv")
        .header("x-wallet-address", ISSUER)
        .body(Body::from(csv))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let report = body_json(response).await;
    assert_eq!(report["succeeded"], 2);
    assert_eq!(report["failed"], 1);

    let outcomes = report["outcomes"].as_array().unwrap();
    assert_eq!(outcomes.len(), 3);
    assert_eq!(outcomes[1]["row"], 2);
    assert_eq!(outcomes[1]["success"], false);
    assert!(outcomes[1].get("token_id").is_none());
    assert_ne!(outcomes[0]["token_id"], outcomes[2]["token_id"]);

    let owner = body_json(
        app.oneshot(get(&format!(
            "/v1/certificates/{}/owner",
            outcomes[2]["token_id"]
        )))
        .await
        .unwrap(),
    )
    .await;
    assert_eq!(owner["owner"], "0x3333333333333333333333333333333333333333");
}

#[tokio::test]
async fn test_bulk_runs_rows_concurrently_in_input_order() {
    let config = AppConfig {
        issuance: IssuanceConfig {
            bulk_concurrency: 4,
            ..IssuanceConfig::default()
        },
        ..AppConfig::default()
    };
    let app = educred_api::app(AppState::try_with_config(config, None).unwrap());
    let mut csv =
        String::from("student_name,email,wallet_address,course,institution,completion_date,grade\n");
    for i in 1..=6 {
        let wallet = if i == 3 {
            "0xNOTANADDRESS".to_string()
        } else {
            format!("0x{}", i.to_string().repeat(40))
        };
        csv.push_str(&format!("Student {i},,{wallet},Rust,Uni,2024-01-0{i},A\n"));
    }
    let request = Request::builder()
        .method("POST")
        .uri("/v1/certificates/bulk")
        .header("content-type", "text/csv")
        .header("x-wallet-address", ISSUER)
        .body(Body::from(csv))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let report = body_json(response).await;
    assert_eq!(report["succeeded"], 5);
    assert_eq!(report["failed"], 1);

    let outcomes = report["outcomes"].as_array().unwrap();
    let rows: Vec<u64> = outcomes.iter().map(|o| o["row"].as_u64().unwrap()).collect();
    assert_eq!(rows, vec![1, 2, 3, 4, 5, 6]);
    assert_eq!(outcomes[2]["success"], false);

    let mut token_ids: Vec<u64> = outcomes
        .iter()
        .filter_map(|o| o["token_id"].as_u64())
        .collect();
    token_ids.sort_unstable();
    assert_eq!(token_ids, vec![1, 2, 3, 4, 5]);

    let stats = body_json(app.oneshot(get("/v1/registry/stats")).await.unwrap()).await;
    assert_eq!(stats["total_supply"], 5);
}

#[tokio::test]
async fn test_bulk_missing_column_is_422() {
    let request = Request::builder()
        .method("POST")
        .uri("/v1/certificates/bulk")
        .header("content-type", "text/csv")
        .header("x-wallet-address", ISSUER)
        .body(Body::from("student_name,wallet_address\nAnn,0x1111111111111111111111111111111111111111\n"))
        .unwrap();
    let response = test_app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_owner_verify_includes_revoked() {
    let app = test_app();
    for _ in 0..2 {
        let response = app
            .clone()
            .oneshot(post_json("/v1/certificates/issue", &issue_body(OWNER_B)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }
    app.clone()
        .oneshot(post_empty("/v1/certificates/1/revoke"))
        .await
        .unwrap();

    let reports = body_json(
        app.oneshot(get(&format!("/v1/owners/{OWNER_B}/verify")))
            .await
            .unwrap(),
    )
    .await;
    let reports = reports.as_array().unwrap();
    assert_eq!(reports.len(), 2);
    assert_eq!(reports[0]["is_valid"], false);
    assert_eq!(reports[0]["verified"], false);
    assert_eq!(reports[1]["verified"], true);
}

// -- Metadata store -----------------------------------------------------------

#[tokio::test]
async fn test_document_round_trip_is_canonical() {
    let app = test_app();
    let response = app
        .clone()
        .oneshot(post_json("/v1/metadata/documents", &json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let stored = body_json(response).await;
    assert_eq!(stored["id"], "QmSvPd3sHK7iWgZuW47fyLy4CaZQe2DwxvRhrJ39VpBVMK");
    assert_eq!(stored["size"], 2);

    let doc = json!({"b": [1, 2], "a": "x"});
    let stored = body_json(
        app.clone()
            .oneshot(post_json("/v1/metadata/documents", &doc))
            .await
            .unwrap(),
    )
    .await;
    let id = stored["id"].as_str().unwrap();
    let fetched = body_json(app.oneshot(get(&format!("/v1/metadata/{id}"))).await.unwrap()).await;
    assert_eq!(fetched, doc);
}

#[tokio::test]
async fn test_file_round_trip() {
    let app = test_app();
    let bytes: Vec<u8> = vec![0x89, b'P', b'N', b'G', 0, 1, 2, 255];
    let request = Request::builder()
        .method("POST")
        .uri("/v1/metadata/files")
        .header("content-type", "application/octet-stream")
        .body(Body::from(bytes.clone()))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let id = body_json(response).await["id"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(get(&format!("/v1/metadata/{id}/file")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let fetched = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(fetched.to_vec(), bytes);

    // Binary content is not a document.
    let response = app.oneshot(get(&format!("/v1/metadata/{id}"))).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_json(response).await["error"]["code"], "INTEGRITY_ERROR");
}

#[tokio::test]
async fn test_unknown_metadata_is_404_and_malformed_id_is_422() {
    let app = test_app();
    let response = app
        .clone()
        .oneshot(get("/v1/metadata/QmSvPd3sHK7iWgZuW47fyLy4CaZQe2DwxvRhrJ39VpBVMK"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app.oneshot(get("/v1/metadata/not-a-cid")).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_oversized_document_is_413() {
    let config = AppConfig {
        max_upload_bytes: 64,
        ..AppConfig::default()
    };
    let app = educred_api::app(AppState::try_with_config(config, None).unwrap());
    let doc = json!({"padding": "x".repeat(200)});
    let response = app
        .oneshot(post_json("/v1/metadata/documents", &doc))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "PAYLOAD_TOO_LARGE");
    assert_eq!(body["error"]["details"]["limit"], 64);
}

#[tokio::test]
async fn test_float_document_round_trips() {
    let app = test_app();
    let document = json!({"gpa": 3.5, "credits": 120, "name": "Ann"});
    let response = app
        .clone()
        .oneshot(post_json("/v1/metadata/documents", &document))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let stored = body_json(response).await;

    let response = app
        .oneshot(get(&format!("/v1/metadata/{}", stored["id"].as_str().unwrap())))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, document);
}

#[tokio::test]
async fn test_filesystem_store_detects_tampering() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(FsMetadataStore::open(dir.path(), AppConfig::default().store_config()).unwrap());
    let state = AppState::with_store(AppConfig::default(), store.clone(), None);
    let app = educred_api::app(state);

    let receipt = body_json(
        app.clone()
            .oneshot(post_json("/v1/certificates/issue", &issue_body(OWNER_B)))
            .await
            .unwrap(),
    )
    .await;
    let metadata_id = receipt["metadata_id"].as_str().unwrap();
    let path = dir.path().join(metadata_id);
    assert!(path.exists());

    let report = body_json(app.clone().oneshot(get("/v1/certificates/1/report")).await.unwrap()).await;
    assert_eq!(report["verified"], true);

    std::fs::write(&path, br#"{"name":"forged"}"#).unwrap();
    let report = body_json(app.oneshot(get("/v1/certificates/1/report")).await.unwrap()).await;
    assert_eq!(report["exists"], true);
    assert_eq!(report["verified"], false);
    assert_eq!(report["metadata"]["status"], "integrity_failure");
    assert!(store.contains(&metadata_id.parse().unwrap()).unwrap());
}

// -- Authentication -----------------------------------------------------------

#[tokio::test]
async fn test_missing_token_is_401() {
    let response = test_app_with_auth("s3cret")
        .oneshot(get("/v1/registry/stats"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["error"]["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_viewer_cannot_mint() {
    let request = Request::builder()
        .method("POST")
        .uri("/v1/certificates")
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer viewer:{ISSUER}:s3cret"))
        .body(Body::from(json!({"owner": OWNER_A, "metadata_uri": URI}).to_string()))
        .unwrap();
    let response = test_app_with_auth("s3cret").oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_issuer_token_signs_mint() {
    let app = test_app_with_auth("s3cret");
    let request = Request::builder()
        .method("POST")
        .uri("/v1/certificates")
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer issuer:{ISSUER}:s3cret"))
        .body(Body::from(json!({"owner": OWNER_A, "metadata_uri": URI}).to_string()))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(body_json(response).await["issuer"], ISSUER);

    let request = Request::builder()
        .uri("/v1/certificates/1/verify")
        .header("authorization", "Bearer viewer::s3cret")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_admin_secret_without_address_cannot_sign() {
    let request = Request::builder()
        .method("POST")
        .uri("/v1/certificates")
        .header("content-type", "application/json")
        .header("authorization", "Bearer s3cret")
        .body(Body::from(json!({"owner": OWNER_A, "metadata_uri": URI}).to_string()))
        .unwrap();
    let response = test_app_with_auth("s3cret").oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::PRECONDITION_REQUIRED);
}

#[tokio::test]
async fn test_rate_limit_applies_per_caller() {
    let config = AppConfig {
        rate_limit_per_minute: 2,
        ..AppConfig::default()
    };
    let app = educred_api::app(AppState::try_with_config(config, None).unwrap());
    for _ in 0..2 {
        let response = app.clone().oneshot(get("/v1/registry/stats")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
    let response = app.clone().oneshot(get("/v1/registry/stats")).await.unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body_json(response).await["error"]["code"], "RATE_LIMITED");

    // A different signing address has its own window.
    let request = Request::builder()
        .uri("/v1/registry/stats")
        .header("x-wallet-address", ISSUER)
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

// -- OpenAPI ------------------------------------------------------------------

#[tokio::test]
async fn test_openapi_document() {
    let response = test_app().oneshot(get("/openapi.json")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let doc = body_json(response).await;
    assert_eq!(doc["info"]["title"], "EduCred API");
    assert!(doc["paths"]["/v1/certificates/{id}/verify"].is_object());
}
