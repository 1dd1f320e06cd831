// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    error::ApiError,
    ledger::TransferKind,
    models::{
        AccountResponse, DelegateRequest, MintRequest, RelayedUndelegateRequest, SupplyResponse,
        TransferListResponse, UndelegateRequest,
    },
    state::AppState,
    storage::StoredTransfer,
};

pub mod accounts;
pub mod caller;
pub mod delegation;
pub mod health;
pub mod transfers;

pub use caller::{Caller, CALLER_HEADER};

pub fn router(state: AppState) -> Router {
    let v1_routes = Router::new()
        .route("/accounts/{address}", get(accounts::get_account))
        .route("/supply", get(accounts::get_supply))
        .route("/mint", post(delegation::mint))
        .route("/delegate", post(delegation::delegate))
        .route("/undelegate", post(delegation::undelegate))
        .route("/undelegate/relayed", post(delegation::undelegate_relayed))
        .route("/transfers", get(transfers::list_transfers))
        .with_state(state.clone());

    let health_routes = Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .with_state(state);

    Router::new()
        .merge(health_routes)
        .nest("/v1", v1_routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(CorsLayer::permissive())
}

async fn not_found() -> ApiError {
    ApiError::not_found("Route not found")
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        health::liveness,
        health::readiness,
        accounts::get_account,
        accounts::get_supply,
        delegation::mint,
        delegation::delegate,
        delegation::undelegate,
        delegation::undelegate_relayed,
        transfers::list_transfers
    ),
    components(
        schemas(
            AccountResponse,
            SupplyResponse,
            MintRequest,
            DelegateRequest,
            UndelegateRequest,
            RelayedUndelegateRequest,
            TransferListResponse,
            StoredTransfer,
            TransferKind,
            health::HealthResponse,
            health::ReadyResponse,
            health::HealthChecks
        )
    ),
    tags(
        (name = "Health", description = "Liveness and readiness probes"),
        (name = "Accounts", description = "Balance and supply queries"),
        (name = "Ledger", description = "Minting, delegation and relayed transfers"),
        (name = "Transfers", description = "Committed transfer history")
    )
)]
struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::Address;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::authorization::{sign_authorization, LocalSigner};

    fn test_state() -> (AppState, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let state = AppState::open(&dir.path().join("ledger.redb"), None).unwrap();
        (state, dir)
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn post_json(uri: &str, caller: Option<Address>, body: Value) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json");
        if let Some(caller) = caller {
            builder = builder.header(CALLER_HEADER, caller.to_string());
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn router_builds_with_all_routes() {
        let (state, _dir) = test_state();
        let _ = router(state).into_make_service();
    }

    #[tokio::test]
    async fn health_endpoints_report_ok() {
        let (state, _dir) = test_state();
        let app = router(state);

        let (status, body) = send(&app, get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["checks"]["ledger_db"], "ok");

        let (status, body) = send(&app, get("/health/live")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn mint_delegate_and_query() {
        let (state, _dir) = test_state();
        let app = router(state);
        let a = Address::repeat_byte(0xA);
        let b = Address::repeat_byte(0xB);

        let (status, body) = send(
            &app,
            post_json("/v1/mint", None, json!({"to": a.to_string(), "amount": "200"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["kind"], "mint");

        let (status, body) = send(
            &app,
            post_json("/v1/delegate", Some(a), json!({"to": b.to_string(), "amount": "150"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["sequence"], 1);

        let (_, body) = send(&app, get(&format!("/v1/accounts/{a}"))).await;
        assert_eq!(body["balance"], "50");
        assert_eq!(body["delegated_balance"], "0");

        let (_, body) = send(&app, get(&format!("/v1/accounts/{b}"))).await;
        assert_eq!(body["balance"], "0");
        assert_eq!(body["delegated_balance"], "150");

        let (_, body) = send(&app, get("/v1/supply")).await;
        assert_eq!(body["total_supply"], "200");
    }

    #[tokio::test]
    async fn delegate_without_caller_is_unauthorized() {
        let (state, _dir) = test_state();
        let app = router(state);

        let (status, body) = send(
            &app,
            post_json(
                "/v1/delegate",
                None,
                json!({"to": Address::repeat_byte(1).to_string(), "amount": "1"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error_code"], "unauthorized");
    }

    #[tokio::test]
    async fn insufficient_funds_is_unprocessable() {
        let (state, _dir) = test_state();
        let app = router(state);

        let (status, body) = send(
            &app,
            post_json(
                "/v1/delegate",
                Some(Address::repeat_byte(0xA)),
                json!({"to": Address::repeat_byte(0xB).to_string(), "amount": "1"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error_code"], "insufficient_funds");
    }

    #[tokio::test]
    async fn malformed_amount_is_bad_request() {
        let (state, _dir) = test_state();
        let app = router(state);

        let (status, body) = send(
            &app,
            post_json(
                "/v1/mint",
                None,
                json!({"to": Address::repeat_byte(0xA).to_string(), "amount": "-5"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error_code"], "bad_request");
    }

    #[tokio::test]
    async fn relayed_transfer_and_replay() {
        let (state, _dir) = test_state();
        let engine = state.engine.clone();
        let app = router(state);
        let delegate = LocalSigner::random();
        let relayer = Address::repeat_byte(0xC);

        engine.mint(Address::repeat_byte(0xA), 2_000_000).unwrap();
        engine
            .delegate(Address::repeat_byte(0xA), delegate.address(), 1_500_000)
            .unwrap();

        let (token, signature) = sign_authorization(&delegate, 500_000).unwrap();
        let body = json!({
            "account": delegate.address().to_string(),
            "signature": signature.to_hex(),
            "token": token.to_hex(),
            "amount": "500000",
        });

        let (status, response) =
            send(&app, post_json("/v1/undelegate/relayed", Some(relayer), body.clone())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(response["to"], relayer.to_string());

        let (status, response) =
            send(&app, post_json("/v1/undelegate/relayed", Some(relayer), body)).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(response["error_code"], "invalid_nonce");

        assert_eq!(engine.balance_of(&relayer), 500_000);
        assert_eq!(engine.delegated_balance_of(&delegate.address()), 1_000_000);
    }

    #[tokio::test]
    async fn relayed_transfer_with_wrong_amount_is_unauthorized() {
        let (state, _dir) = test_state();
        let engine = state.engine.clone();
        let app = router(state);
        let delegate = LocalSigner::random();

        engine.mint(delegate.address(), 100).unwrap();
        engine.delegate(delegate.address(), delegate.address(), 100).unwrap();

        let (token, signature) = sign_authorization(&delegate, 10).unwrap();
        let (status, response) = send(
            &app,
            post_json(
                "/v1/undelegate/relayed",
                Some(Address::repeat_byte(0xC)),
                json!({
                    "account": delegate.address().to_string(),
                    "signature": signature.to_hex(),
                    "token": token.to_hex(),
                    "amount": "20",
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(response["error_code"], "invalid_signature");
        assert!(!engine.is_consumed(&token));
    }

    #[tokio::test]
    async fn transfers_are_paginated() {
        let (state, _dir) = test_state();
        let engine = state.engine.clone();
        let app = router(state);
        for _ in 0..3 {
            engine.mint(Address::repeat_byte(0xA), 1).unwrap();
        }

        let (status, body) = send(&app, get("/v1/transfers?limit=2")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["transfers"].as_array().unwrap().len(), 2);
        assert_eq!(body["next_cursor"], 1);

        let (_, body) = send(&app, get("/v1/transfers?cursor=1&limit=2")).await;
        assert_eq!(body["transfers"].as_array().unwrap().len(), 1);
        assert_eq!(body["transfers"][0]["sequence"], 2);
        assert!(body.get("next_cursor").is_none());

        let (status, _) = send(&app, get("/v1/transfers?limit=0")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unknown_route_returns_json_404() {
        let (state, _dir) = test_state();
        let app = router(state);

        let (status, body) = send(&app, get("/v1/nope")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error_code"], "not_found");
    }
}
