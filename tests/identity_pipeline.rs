mod common;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use axum::response::Response;
use axum::routing::get;
use serde_json::{Value, json};
use tower::ServiceExt;

use common::*;
use yata_server::api;
use yata_server::middleware::auth::{AccessGate, access};
use yata_server::repos::ListStore;
use yata_server::services::auth::UserId;
use yata_server::state::AppState;

async fn send(router: &Router, req: Request<Body>) -> Response {
    router.clone().oneshot(req).await.unwrap()
}

async fn json_body(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn get_with(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::get(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

fn put_json(uri: &str, token: &str, body: Value) -> Request<Body> {
    Request::put(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn missing_header_is_rejected_before_the_handler() {
    let app = test_app(Some(jwks(&[(PRIMARY_KID, PRIMARY_X)])));

    let res = send(&app.router, get_with("/api/v1/lists", None)).await;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(res.headers()[header::WWW_AUTHENTICATE], "Bearer");
    assert_eq!(json_body(res).await["error"]["code"], "UNAUTHORIZED");
    assert_eq!(app.store.calls(), 0);
}

#[tokio::test]
async fn non_bearer_scheme_is_rejected() {
    let app = test_app(Some(jwks(&[(PRIMARY_KID, PRIMARY_X)])));

    let req = Request::get("/api/v1/lists")
        .header(header::AUTHORIZATION, format!("Basic {}", token_for("u-123")))
        .body(Body::empty())
        .unwrap();
    let res = send(&app.router, req).await;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(app.store.calls(), 0);
}

#[tokio::test]
async fn valid_token_reaches_handler_as_the_subject() {
    let app = test_app(Some(jwks(&[(PRIMARY_KID, PRIMARY_X)])));
    let token = token_for("u-123");

    let res = send(
        &app.router,
        put_json(
            "/api/v1/lists",
            &token,
            json!({ "list_id": "groceries", "title": "Groceries" }),
        ),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CREATED);
    assert_eq!(json_body(res).await["list_id"], "groceries");

    // Stored under the token subject, not anything the client sent.
    let owned = app.store.get_lists(&UserId::new("u-123")).await.unwrap();
    assert_eq!(owned.len(), 1);
    assert_eq!(owned[0].title, "Groceries");

    let res = send(&app.router, get_with("/api/v1/lists", Some(&token))).await;
    assert_eq!(res.status(), StatusCode::OK);
    let lists = json_body(res).await;
    assert_eq!(lists.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn users_only_see_their_own_data() {
    let app = test_app(Some(jwks(&[(PRIMARY_KID, PRIMARY_X)])));
    let alice = token_for("alice");
    let bob = token_for("bob");

    let res = send(
        &app.router,
        put_json("/api/v1/lists", &alice, json!({ "list_id": "l1", "title": "Mine" })),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = send(&app.router, get_with("/api/v1/lists/l1", Some(&bob))).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = send(
        &app.router,
        put_json("/api/v1/lists/l1/items", &bob, json!({ "content": "sneaky" })),
    )
    .await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = send(
        &app.router,
        put_json("/api/v1/lists/l1/items", &alice, json!({ "content": "milk" })),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let item = json_body(res).await;
    assert!(!item["item_id"].as_str().unwrap().is_empty());

    let res = send(&app.router, get_with("/api/v1/items", Some(&alice))).await;
    assert_eq!(json_body(res).await.as_array().unwrap().len(), 1);
    let res = send(&app.router, get_with("/api/v1/items", Some(&bob))).await;
    assert!(json_body(res).await.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn duplicate_list_id_conflicts_and_bad_payload_is_400() {
    let app = test_app(Some(jwks(&[(PRIMARY_KID, PRIMARY_X)])));
    let token = token_for("u-1");
    let body = json!({ "list_id": "dup", "title": "One" });

    let res = send(&app.router, put_json("/api/v1/lists", &token, body.clone())).await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let res = send(&app.router, put_json("/api/v1/lists", &token, body)).await;
    assert_eq!(res.status(), StatusCode::CONFLICT);

    let res = send(
        &app.router,
        put_json("/api/v1/lists", &token, json!({ "title": "   " })),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn wrong_audience_is_a_generic_401() {
    let app = test_app(Some(jwks(&[(PRIMARY_KID, PRIMARY_X)])));
    let mut c = claims("u-123");
    c["aud"] = json!("someone-else");
    let token = mint(PRIMARY_KID, PRIMARY_PEM, &c);

    let res = send(&app.router, get_with("/api/v1/lists", Some(&token))).await;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body = json_body(res).await;
    assert_eq!(body["error"]["message"], "unauthorized");
    assert_eq!(app.store.calls(), 0);
}

#[tokio::test]
async fn expired_token_is_rejected() {
    let app = test_app(Some(jwks(&[(PRIMARY_KID, PRIMARY_X)])));
    let now = chrono::Utc::now().timestamp();
    let mut c = claims("u-123");
    c["iat"] = json!(now - 7200);
    c["exp"] = json!(now - 3600);
    let token = mint(PRIMARY_KID, PRIMARY_PEM, &c);

    let res = send(&app.router, get_with("/api/v1/lists", Some(&token))).await;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(app.store.calls(), 0);
}

#[tokio::test]
async fn rotated_signing_key_is_picked_up() {
    let app = test_app(Some(jwks(&[(PRIMARY_KID, PRIMARY_X)])));

    let res = send(&app.router, get_with("/api/v1/lists", Some(&token_for("u-1")))).await;
    assert_eq!(res.status(), StatusCode::OK);

    app.source
        .set(Some(jwks(&[(PRIMARY_KID, PRIMARY_X), (ROTATED_KID, ROTATED_X)])));
    let rotated = mint(ROTATED_KID, ROTATED_PEM, &claims("u-1"));

    let res = send(&app.router, get_with("/api/v1/lists", Some(&rotated))).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(app.source.fetches(), 2);
}

#[tokio::test]
async fn no_keys_ever_fetched_fails_closed() {
    let app = test_app(None);

    let res = send(&app.router, get_with("/api/v1/lists", Some(&token_for("u-1")))).await;

    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(app.store.calls(), 0);

    // Recovers as soon as the source comes back.
    app.source.set(Some(jwks(&[(PRIMARY_KID, PRIMARY_X)])));
    let res = send(&app.router, get_with("/api/v1/lists", Some(&token_for("u-1")))).await;
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn handler_without_middleware_is_a_server_error() {
    let store = std::sync::Arc::new(CountingStore::default());
    let router = Router::new()
        .nest("/api/v1", api::v1::routes())
        .with_state(AppState::new(store.clone()));

    let res = send(&router, get_with("/api/v1/lists", Some(&token_for("u-1")))).await;

    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(store.calls(), 0);
}

#[tokio::test]
async fn allowlisted_paths_skip_verification() {
    let source = std::sync::Arc::new(StaticKeySource::new(Some(jwks(&[(
        PRIMARY_KID,
        PRIMARY_X,
    )]))));
    let gate = AccessGate::new(authenticator(source.clone()), vec!["/api/v1/ping".to_string()]);

    let v1 = Router::new()
        .route("/ping", get(|| async { "pong" }))
        .route("/secret", get(|| async { "hidden" }));
    let router = Router::new().nest("/api/v1", access::apply(v1, gate));

    let res = send(&router, get_with("/api/v1/ping", None)).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(source.fetches(), 0);

    let res = send(&router, get_with("/api/v1/secret", None)).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}
