//! Integration test support for Shopfront.
//!
//! [`MockBackend`] is an in-process shop backend served by `axum` on a random
//! local port. It speaks the same `{ success, message? }` envelope as the
//! real backend, keeps one cart per token, and records every request so
//! tests can assert on what the storefront sent.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p shopfront-integration-tests
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use rust_decimal::Decimal;
use serde_json::{Value, json};
use shopfront_core::{Product, ProductId};
use shopfront_storefront::ShopState;
use shopfront_storefront::config::StorefrontConfig;
use shopfront_storefront::storage::LocalStorage;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use url::Url;

/// Message the backend sends when the token header is missing.
pub const NOT_AUTHORIZED: &str = "Not Authorized Login Again";

type RawCart = BTreeMap<String, BTreeMap<String, u32>>;

/// A listed product with sizes S, M and L in category Men / Topwear.
///
/// # Panics
///
/// Panics if `id` is blank.
#[must_use]
pub fn product(id: &str, price: i64) -> Product {
    Product {
        id: ProductId::parse(id).unwrap_or_else(|e| panic!("{e}")),
        name: format!("Product {id}"),
        description: String::new(),
        price: Decimal::from(price),
        images: vec![format!("https://cdn.example.com/{id}.png")],
        category: "Men".to_string(),
        sub_category: "Topwear".to_string(),
        sizes: vec!["S".to_string(), "M".to_string(), "L".to_string()],
        bestseller: false,
        date: 0,
    }
}

/// How the mock answers requests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Behavior {
    /// Serve requests normally.
    #[default]
    Normal,
    /// Answer `200` with `{ success: false, message }`.
    Reject(String),
    /// Answer with a bare error status.
    Fail(u16),
}

/// A request as seen by the mock.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub path: String,
    /// Value of the `token` header, if sent.
    pub token: Option<String>,
    pub body: Value,
}

#[derive(Debug, Default)]
struct MockState {
    products: Mutex<Vec<Value>>,
    carts: Mutex<HashMap<String, RawCart>>,
    requests: Mutex<Vec<RecordedRequest>>,
    behavior: Mutex<Behavior>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// In-process shop backend.
///
/// The server task is aborted when the mock is dropped.
#[derive(Debug)]
pub struct MockBackend {
    url: Url,
    state: Arc<MockState>,
    server: JoinHandle<()>,
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.server.abort();
    }
}

impl MockBackend {
    /// Start a mock backend listing `products` in backend order.
    ///
    /// # Panics
    ///
    /// Panics if no local port can be bound.
    pub async fn start(products: Vec<Product>) -> Self {
        let state = Arc::new(MockState::default());
        {
            let mut listed = lock(&state.products);
            for product in &products {
                listed.push(serde_json::to_value(product).unwrap_or(Value::Null));
            }
        }

        let app = Router::new()
            .route("/api/product/list", get(list_products))
            .route("/api/cart/add", post(add_to_cart))
            .route("/api/cart/update", post(update_cart))
            .route("/api/cart/get", post(get_cart))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .unwrap_or_else(|e| panic!("Failed to bind mock backend: {e}"));
        let addr = listener
            .local_addr()
            .unwrap_or_else(|e| panic!("Mock backend has no address: {e}"));
        let url = Url::parse(&format!("http://{addr}"))
            .unwrap_or_else(|e| panic!("Invalid mock backend URL: {e}"));

        let server = tokio::spawn(async move {
            // Only listener errors end the loop; the test fails on its own then.
            let _ = axum::serve(listener, app).await;
        });

        Self { url, state, server }
    }

    /// Base URL of the mock.
    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.url
    }

    /// A storefront configuration pointed at the mock.
    #[must_use]
    pub fn config(&self) -> StorefrontConfig {
        StorefrontConfig::for_backend(self.url.clone())
    }

    /// A storefront state pointed at the mock with in-memory storage.
    #[must_use]
    pub fn shop(&self) -> ShopState {
        ShopState::new(self.config(), LocalStorage::in_memory())
    }

    /// Change how the mock answers from now on.
    pub fn set_behavior(&self, behavior: Behavior) {
        *lock(&self.state.behavior) = behavior;
    }

    /// Seed the server-side cart of `token`.
    pub fn set_cart(&self, token: &str, cart: Value) {
        let cart: RawCart = serde_json::from_value(cart).unwrap_or_default();
        lock(&self.state.carts).insert(token.to_string(), cart);
    }

    /// The server-side cart of `token`.
    #[must_use]
    pub fn cart(&self, token: &str) -> Value {
        let carts = lock(&self.state.carts);
        json!(carts.get(token).cloned().unwrap_or_default())
    }

    /// Every request received so far.
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        lock(&self.state.requests).clone()
    }

    /// Requests received on `path`.
    #[must_use]
    pub fn requests_to(&self, path: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.path == path)
            .collect()
    }
}

fn record(state: &MockState, path: &str, headers: &HeaderMap, body: Value) -> Option<String> {
    let token = headers
        .get("token")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    lock(&state.requests).push(RecordedRequest {
        path: path.to_string(),
        token: token.clone(),
        body,
    });
    token
}

/// Short-circuit response for the configured behavior.
fn misbehave(state: &MockState) -> Option<Response> {
    match lock(&state.behavior).clone() {
        Behavior::Normal => None,
        Behavior::Reject(message) => {
            Some(Json(json!({ "success": false, "message": message })).into_response())
        }
        Behavior::Fail(status) => Some(
            StatusCode::from_u16(status)
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
                .into_response(),
        ),
    }
}

fn not_authorized() -> Response {
    Json(json!({ "success": false, "message": NOT_AUTHORIZED })).into_response()
}

fn ok(extra: Value) -> Response {
    let mut body = json!({ "success": true });
    if let (Some(body), Value::Object(extra)) = (body.as_object_mut(), extra) {
        body.extend(extra);
    }
    Json(body).into_response()
}

fn field(body: &Value, name: &str) -> Option<String> {
    body.get(name).and_then(Value::as_str).map(str::to_string)
}

async fn list_products(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    record(&state, "/api/product/list", &headers, Value::Null);
    if let Some(response) = misbehave(&state) {
        return response;
    }
    let products = lock(&state.products).clone();
    ok(json!({ "products": products }))
}

async fn add_to_cart(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let token = record(&state, "/api/cart/add", &headers, body.clone());
    if let Some(response) = misbehave(&state) {
        return response;
    }
    let Some(token) = token else {
        return not_authorized();
    };
    let (Some(item), Some(size)) = (field(&body, "itemId"), field(&body, "size")) else {
        return StatusCode::BAD_REQUEST.into_response();
    };

    let mut carts = lock(&state.carts);
    *carts
        .entry(token)
        .or_default()
        .entry(item)
        .or_default()
        .entry(size)
        .or_default() += 1;
    ok(json!({ "message": "Added To Cart" }))
}

async fn update_cart(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let token = record(&state, "/api/cart/update", &headers, body.clone());
    if let Some(response) = misbehave(&state) {
        return response;
    }
    let Some(token) = token else {
        return not_authorized();
    };
    let (Some(item), Some(size)) = (field(&body, "itemId"), field(&body, "size")) else {
        return StatusCode::BAD_REQUEST.into_response();
    };
    let Some(quantity) = body
        .get("quantity")
        .and_then(Value::as_u64)
        .and_then(|q| u32::try_from(q).ok())
    else {
        return StatusCode::BAD_REQUEST.into_response();
    };

    let mut carts = lock(&state.carts);
    carts
        .entry(token)
        .or_default()
        .entry(item)
        .or_default()
        .insert(size, quantity);
    ok(json!({ "message": "Cart Updated" }))
}

async fn get_cart(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let token = record(&state, "/api/cart/get", &headers, body);
    if let Some(response) = misbehave(&state) {
        return response;
    }
    let Some(token) = token else {
        return not_authorized();
    };
    let cart = lock(&state.carts).get(&token).cloned().unwrap_or_default();
    ok(json!({ "cartData": cart }))
}
