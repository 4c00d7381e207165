//! Integration tests for the Norkys order backend.
//!
//! # Running Tests
//!
//! ```bash
//! # HTTP tests against the in-memory store
//! cargo test -p norkys-integration-tests
//!
//! # Also run the PostgreSQL store tests (needs a migrated, empty database)
//! NORKYS_TEST_DATABASE_URL=postgres://localhost/norkys_test \
//!     cargo test -p norkys-integration-tests -- --include-ignored
//! ```
//!
//! # Test Categories
//!
//! - `carts_http` - cart creation, lifecycle and lookups
//! - `dashboard_http` - sales dashboard views
//! - `wishlist_http` - wishlist entries
//! - `postgres_store` - repository behaviour on a real database
//!
//! Each [`TestContext`] serves the real router on an ephemeral port, backed by
//! its own seeded [`MemoryStore`], so tests never share state.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use reqwest::{Client, Response, StatusCode};
use serde_json::{Value, json};
use tokio::net::TcpListener;

use norkys_api::config::ApiConfig;
use norkys_api::models::{NewCart, NewCartLine};
use norkys_api::state::AppState;
use norkys_api::store::{MemoryStore, Stores};
use norkys_core::{CartId, CartOwner, CartStatus, DeliveryInfo, ItemId, PaymentMethod, UserId};
use rust_decimal::Decimal;

/// A running server and a client pointed at it.
pub struct TestContext {
    pub client: Client,
    pub base_url: String,
    pub store: Arc<MemoryStore>,
}

impl TestContext {
    /// Start a server with default settings.
    pub async fn new() -> Self {
        Self::with_env(&[]).await
    }

    /// Start a server with extra environment overrides.
    ///
    /// The store is always in-memory and the dashboard cache is off.
    pub async fn with_env(overrides: &[(&str, &str)]) -> Self {
        let mut env: HashMap<String, String> = [
            ("NORKYS_STORE", "memory"),
            ("ANALYTICS_CACHE_TTL_SECS", "0"),
        ]
        .into_iter()
        .chain(overrides.iter().copied())
        .map(|(k, v)| (k.to_owned(), v.to_owned()))
        .collect();
        env.retain(|_, v| !v.is_empty());

        let config = ApiConfig::from_lookup(|key| env.get(key).cloned())
            .expect("Invalid test configuration");

        let store = Arc::new(MemoryStore::new(config.reserved_admin));
        store.seed_demo().await;

        let app = norkys_api::router(AppState::new(config, Stores::memory(store.clone())));
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Listener has no address");
        tokio::spawn(async move {
            axum::serve(listener, app)
                .await
                .expect("Test server stopped");
        });

        Self {
            client: Client::new(),
            base_url: format!("http://{addr}"),
            store,
        }
    }

    /// Absolute URL for `path`.
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    pub async fn get(&self, path: &str) -> Response {
        self.client
            .get(self.url(path))
            .send()
            .await
            .expect("GET failed")
    }

    pub async fn post(&self, path: &str, body: &Value) -> Response {
        self.client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .expect("POST failed")
    }

    pub async fn put(&self, path: &str, body: &Value) -> Response {
        self.client
            .put(self.url(path))
            .json(body)
            .send()
            .await
            .expect("PUT failed")
    }

    pub async fn put_empty(&self, path: &str) -> Response {
        self.client
            .put(self.url(path))
            .send()
            .await
            .expect("PUT failed")
    }

    pub async fn delete(&self, path: &str) -> Response {
        self.client
            .delete(self.url(path))
            .send()
            .await
            .expect("DELETE failed")
    }

    /// Create a cart over HTTP and return its id.
    pub async fn create_cart(&self, body: &Value) -> i64 {
        let resp = self.post("/api/carts", body).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let created: Value = resp.json().await.expect("Invalid JSON body");
        created["cart_id"].as_i64().expect("cart_id missing")
    }

    /// Store a completed cart directly, backdated to `at`.
    ///
    /// `lines` holds `(item_id, quantity, unit_price_cents)`.
    pub async fn place_order(
        &self,
        at: DateTime<Utc>,
        lines: &[(i32, i32, i64)],
        payment_method: Option<&str>,
    ) -> CartId {
        let cart = NewCart {
            owner: CartOwner::Registered {
                user_id: UserId::new(2),
            },
            delivery: DeliveryInfo {
                title: "Casa".to_owned(),
                address: "Av. Arequipa 1234, Lince".to_owned(),
                reference: None,
                phone_primary: "987654321".to_owned(),
                phone_secondary: None,
                location: None,
            },
            lines: lines
                .iter()
                .map(|&(item, quantity, cents)| NewCartLine {
                    item_id: ItemId::new(item),
                    quantity,
                    unit_price: Decimal::new(cents, 2),
                })
                .collect(),
        };
        self.store
            .insert_cart_at(
                &cart,
                at,
                CartStatus::Completed,
                payment_method.and_then(PaymentMethod::parse),
            )
            .await
            .expect("Failed to place order")
    }
}

/// The guest checkout used across the cart tests: two Chicha morada to "Home".
pub fn guest_cart() -> Value {
    json!({
        "name": "Ana",
        "surname": "Torres",
        "email": "ana@example.com",
        "national_id": "45678912",
        "address_title": "Home",
        "address": "123 Main",
        "phone_primary": "555-0100",
        "lines": [{ "item_id": 7, "quantity": 2 }]
    })
}

/// A registered checkout for `owner_id`.
pub fn registered_cart(owner_id: i64) -> Value {
    json!({
        "owner_id": owner_id,
        "address_title": "Casa",
        "address": "Av. Arequipa 1234, Lince",
        "phone_primary": "987654321",
        "lines": [{ "item_id": 1, "quantity": 1 }, { "item_id": 6, "quantity": 2 }]
    })
}

/// Read a JSON error body and return its `error` kind.
pub async fn error_kind(resp: Response) -> String {
    let body: Value = resp.json().await.expect("Invalid JSON error body");
    body["error"]
        .as_str()
        .expect("error kind missing")
        .to_owned()
}
