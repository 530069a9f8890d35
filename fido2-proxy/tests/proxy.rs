use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use axum::{
    body::Body,
    extract::{Query, State},
    http::{header, HeaderMap, Method, Request, StatusCode},
    routing::{delete, post},
    Json, Router,
};
use fido2_proxy::{router, Upstream};
use serde_json::{json, Value};
use tower::ServiceExt;
use url::Url;

#[derive(Clone, Default)]
struct Seen {
    requests: Arc<Mutex<Vec<(String, Option<String>, Value)>>>,
}

impl Seen {
    fn record(&self, path: &str, headers: &HeaderMap, body: Value) {
        let authorization = headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        self.requests
            .lock()
            .unwrap()
            .push((path.to_owned(), authorization, body));
    }

    fn take(&self) -> Vec<(String, Option<String>, Value)> {
        std::mem::take(&mut *self.requests.lock().unwrap())
    }
}

/// A relying party that answers every operation the way a healthy deployment would, except for
/// the user "mallory" who is unknown.
fn relying_party(seen: Seen) -> Router {
    async fn attestation_options(
        State(seen): State<Seen>,
        headers: HeaderMap,
        Json(body): Json<Value>,
    ) -> Json<Value> {
        seen.record("attestation/options", &headers, body.clone());
        Json(json!({
            "status": "ok",
            "errorMessage": "",
            "challenge": "AQIDBA",
            "user": {
                "id": "dXNlci0x",
                "name": body["username"],
                "displayName": body["displayName"]
            },
            "rp": { "name": "Example" },
            "pubKeyCredParams": [{ "type": "public-key", "alg": -7 }]
        }))
    }

    async fn assertion_options(
        State(seen): State<Seen>,
        headers: HeaderMap,
        Json(body): Json<Value>,
    ) -> (StatusCode, Json<Value>) {
        seen.record("assertion/options", &headers, body.clone());
        if body["username"] == "mallory" {
            (StatusCode::OK, Json(json!({ "errorText": "user not found" })))
        } else {
            (StatusCode::OK, Json(json!({ "challenge": "BQYH" })))
        }
    }

    async fn assertion_result(
        State(seen): State<Seen>,
        headers: HeaderMap,
        Json(body): Json<Value>,
    ) -> (StatusCode, Json<Value>) {
        seen.record("assertion/result", &headers, body);
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "signature verification failed" })),
        )
    }

    async fn attestation_result(State(seen): State<Seen>, headers: HeaderMap) -> StatusCode {
        seen.record("attestation/result", &headers, Value::Null);
        StatusCode::INTERNAL_SERVER_ERROR
    }

    async fn deregister(
        State(seen): State<Seen>,
        headers: HeaderMap,
        Query(query): Query<HashMap<String, String>>,
    ) -> Json<Value> {
        seen.record("user", &headers, json!(query));
        Json(json!({ "status": "ok", "keyId": query["keyId"] }))
    }

    async fn devices(
        State(seen): State<Seen>,
        headers: HeaderMap,
        Query(query): Query<HashMap<String, String>>,
    ) -> (StatusCode, Json<Value>) {
        seen.record("user", &headers, json!(query));
        if query.get("username").map(String::as_str) == Some("carol") {
            return (StatusCode::CREATED, Json(json!([])));
        }
        (
            StatusCode::OK,
            Json(json!([{ "keyId": "AQID", "username": query["username"] }])),
        )
    }

    Router::new()
        .route(
            "/rp/api/versioned/fido2/attestation/options",
            post(attestation_options),
        )
        .route(
            "/rp/api/versioned/fido2/attestation/result",
            post(attestation_result),
        )
        .route(
            "/rp/api/versioned/fido2/assertion/options",
            post(assertion_options),
        )
        .route(
            "/rp/api/versioned/fido2/assertion/result",
            post(assertion_result),
        )
        .route(
            "/rp/api/versioned/fido2/user",
            delete(deregister).get(devices),
        )
        .with_state(seen)
}

async fn serve(router: Router) -> Url {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });
    Url::parse(&format!("http://{address}")).unwrap()
}

async fn proxy(token: &str) -> (Router, Seen) {
    let seen = Seen::default();
    let base = serve(relying_party(seen.clone())).await;
    (router(Upstream::new(base, token)), seen)
}

async fn call(app: Router, method: Method, uri: &str, body: Option<&str>) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    if body.is_some() {
        request = request.header(header::CONTENT_TYPE, "application/json");
    }
    let request = request
        .body(body.map(|body| Body::from(body.to_owned())).unwrap_or_default())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn health() {
    let (app, seen) = proxy("secret").await;

    let (status, body) = call(app, Method::GET, "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert!(seen.take().is_empty());
}

#[tokio::test]
async fn options_are_relayed_with_the_access_token() {
    let (app, seen) = proxy("secret").await;

    let (status, body) = call(
        app,
        Method::POST,
        "/attestation/options",
        Some(r#"{"username":"alice","displayName":"Alice","attestation":"direct"}"#),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["challenge"], "AQIDBA");
    assert_eq!(body["user"]["name"], "alice");
    assert_eq!(body["status"], "ok");

    let requests = seen.take();
    assert_eq!(requests.len(), 1);
    let (path, authorization, forwarded) = &requests[0];
    assert_eq!(path, "attestation/options");
    assert_eq!(authorization.as_deref(), Some("Bearer secret"));
    assert_eq!(
        forwarded,
        &json!({ "username": "alice", "displayName": "Alice", "attestation": "direct" })
    );
}

#[tokio::test]
async fn token_with_scheme_is_sent_verbatim() {
    let (app, seen) = proxy("Basic dXNlcjpwdw==").await;

    let (status, _) = call(
        app,
        Method::POST,
        "/assertion/options",
        Some(r#"{"username":"alice"}"#),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        seen.take()[0].1.as_deref(),
        Some("Basic dXNlcjpwdw==")
    );
}

#[tokio::test]
async fn error_text_in_reply_becomes_bad_request() {
    let (app, _) = proxy("secret").await;

    let (status, body) = call(
        app,
        Method::POST,
        "/assertion/options",
        Some(r#"{"username":"mallory"}"#),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "errorText": "user not found" }));
}

#[tokio::test]
async fn error_member_is_relayed_as_error_text() {
    let (app, _) = proxy("secret").await;

    let (status, body) = call(
        app,
        Method::POST,
        "/assertion/result",
        Some(r#"{"id":"AQID","rawId":"AQID","type":"public-key","response":{}}"#),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "errorText": "signature verification failed" }));
}

#[tokio::test]
async fn failure_status_becomes_bad_request() {
    let (app, _) = proxy("secret").await;

    let (status, body) = call(app, Method::POST, "/attestation/result", Some("{}")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({ "errorText": "relying party responded with status 500 Internal Server Error" })
    );
}

#[tokio::test]
async fn malformed_body_is_rejected_without_forwarding() {
    let (app, seen) = proxy("secret").await;

    let (status, body) = call(app, Method::POST, "/attestation/options", Some("{not json")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errorText"].as_str().is_some_and(|text| !text.is_empty()));
    assert!(seen.take().is_empty());
}

#[tokio::test]
async fn unreachable_relying_party() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    drop(listener);
    let app = router(Upstream::new(
        Url::parse(&format!("http://{address}")).unwrap(),
        "secret",
    ));

    let (status, body) = call(
        app,
        Method::POST,
        "/assertion/options",
        Some(r#"{"username":"alice"}"#),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errorText"]
        .as_str()
        .is_some_and(|text| text.starts_with("relying party is unreachable")));
}

#[tokio::test]
async fn device_deregistration() {
    let (app, seen) = proxy("secret").await;

    let (status, body) = call(app, Method::DELETE, "/devices/AQID", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok", "keyId": "AQID" }));

    let requests = seen.take();
    assert_eq!(requests[0].0, "user");
    assert_eq!(requests[0].1.as_deref(), Some("Bearer secret"));
    assert_eq!(requests[0].2, json!({ "keyId": "AQID" }));
}

#[tokio::test]
async fn registered_devices_are_listed() {
    let (app, seen) = proxy("secret").await;

    let (status, body) = call(app, Method::GET, "/devices?username=alice", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([{ "keyId": "AQID", "username": "alice" }]));

    let requests = seen.take();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].0, "user");
    assert_eq!(requests[0].1.as_deref(), Some("Bearer secret"));
    assert_eq!(requests[0].2, json!({ "username": "alice" }));
}

#[tokio::test]
async fn device_listing_requires_a_username() {
    let (app, seen) = proxy("secret").await;

    let (status, body) = call(app, Method::GET, "/devices", None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "errorText": "missing username" }));
    assert!(seen.take().is_empty());
}

#[tokio::test]
async fn status_other_than_ok_becomes_bad_request() {
    let (app, _) = proxy("secret").await;

    let (status, body) = call(app, Method::GET, "/devices?username=carol", None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({ "errorText": "relying party responded with status 201 Created" })
    );
}
