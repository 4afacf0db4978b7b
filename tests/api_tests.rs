//! End-to-end tests over the HTTP router: catalog reads, registration, login
//! and the session-guarded order endpoint, all against an in-memory store.

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use shopfront::server::{AppState, router};
use shopfront::storage::Store;
use shopfront::storage::provision::{SCHEMA_SQL, SEED_PRODUCT_COUNT, apply_schema, seed_if_empty};

async fn test_app() -> Router {
    let store = Store::open_in_memory().expect("in-memory store");
    apply_schema(&store, SCHEMA_SQL).await.expect("schema");
    seed_if_empty(&store).await.expect("seed");
    router(AppState { store })
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn register_login_order_flow() {
    let app = test_app().await;
    let creds = json!({"email": "u@test.com", "password": "pass1234"});

    // Register
    let res = app.clone().oneshot(post_json("/api/register", &creds)).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(body_json(res).await, json!({"status": "registered"}));

    // Login with the wrong password
    let bad = json!({"email": "u@test.com", "password": "wrongpass"});
    let res = app.clone().oneshot(post_json("/api/login", &bad)).await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    // Login with the right password attaches the session cookie
    let res = app.clone().oneshot(post_json("/api/login", &creds)).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let cookie = res
        .headers()
        .get(header::SET_COOKIE)
        .expect("session artifact on login response")
        .to_str()
        .unwrap()
        .to_string();
    assert!(cookie.starts_with("session=u@test.com"));
    assert!(cookie.contains("HttpOnly"));
    assert_eq!(body_json(res).await, json!({"status": "ok"}));

    // Order without the artifact is rejected
    let res = app
        .clone()
        .oneshot(post_json("/api/order", &json!({"product_id": 1})))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    // Order with the artifact is accepted
    let session_pair = cookie.split(';').next().unwrap().to_string();
    let req = Request::builder()
        .method("POST")
        .uri("/api/order")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::COOKIE, session_pair)
        .body(Body::from(json!({"product_id": 1}).to_string()))
        .unwrap();
    let res = app.clone().oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(body_json(res).await, json!({"status": "order accepted"}));
}

#[tokio::test]
async fn duplicate_registration_is_a_conflict() {
    let app = test_app().await;
    let creds = json!({"email": "a@x.com", "password": "pass1234"});

    let res = app.clone().oneshot(post_json("/api/register", &creds)).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = app.clone().oneshot(post_json("/api/register", &creds)).await.unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn register_rejects_invalid_input() {
    let app = test_app().await;

    let short = json!({"email": "u@test.com", "password": "abc"});
    let res = app.clone().oneshot(post_json("/api/register", &short)).await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let empty = json!({"email": "", "password": "pass1234"});
    let res = app.clone().oneshot(post_json("/api/register", &empty)).await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn login_failures_do_not_reveal_identities() {
    let app = test_app().await;
    let creds = json!({"email": "real@x.com", "password": "pass1234"});
    let res = app.clone().oneshot(post_json("/api/register", &creds)).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let ghost = json!({"email": "ghost@x.com", "password": "anything"});
    let res_ghost = app.clone().oneshot(post_json("/api/login", &ghost)).await.unwrap();
    let wrong = json!({"email": "real@x.com", "password": "wrongpass"});
    let res_wrong = app.clone().oneshot(post_json("/api/login", &wrong)).await.unwrap();

    assert_eq!(res_ghost.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(res_wrong.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(res_ghost).await, body_json(res_wrong).await);
}

#[tokio::test]
async fn catalog_endpoints_serve_the_seeded_products() {
    let app = test_app().await;

    let res = app
        .clone()
        .oneshot(Request::builder().uri("/api/products").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let list = body_json(res).await;
    assert_eq!(list.as_array().unwrap().len(), SEED_PRODUCT_COUNT);

    let res = app
        .clone()
        .oneshot(Request::builder().uri("/api/products/1").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let product = body_json(res).await;
    assert_eq!(product["id"], 1);
    assert!(product["title"].as_str().unwrap().len() > 0);

    let res = app
        .clone()
        .oneshot(Request::builder().uri("/api/products/9999").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}
