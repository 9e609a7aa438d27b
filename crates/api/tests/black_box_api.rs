use chrono::{Duration as ChronoDuration, Utc};
use grainbridge_auth::{JwtClaims, Role};
use grainbridge_core::UserId;
use grainbridge_infra::AppConfig;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::StatusCode;
use serde_json::{json, Value};

const JWT_SECRET: &str = "test-secret";
const ADMIN_SECRET: &str = "mill-owner-key";

struct TestServer {
    base_url: String,
    client: reqwest::Client,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        let mut config = AppConfig::for_tests(JWT_SECRET);
        config.admin_secret_key = Some(ADMIN_SECRET.to_string());
        Self::spawn_with(config).await
    }

    async fn spawn_with(config: AppConfig) -> Self {
        // Same router as prod, in-memory store, ephemeral port.
        let app = grainbridge_api::app::build_app(config)
            .await
            .expect("failed to build app");
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url,
            client: reqwest::Client::new(),
            handle,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post(&self, path: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        let mut req = self.client.post(self.url(path)).json(&body);
        if let Some(t) = token {
            req = req.bearer_auth(t);
        }
        let res = req.send().await.unwrap();
        (res.status(), res.json().await.unwrap_or(Value::Null))
    }

    async fn put(&self, path: &str, token: &str, body: Value) -> (StatusCode, Value) {
        let res = self
            .client
            .put(self.url(path))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .unwrap();
        (res.status(), res.json().await.unwrap_or(Value::Null))
    }

    async fn get(&self, path: &str, token: &str) -> (StatusCode, Value) {
        let res = self
            .client
            .get(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .unwrap();
        (res.status(), res.json().await.unwrap_or(Value::Null))
    }

    /// Register through the API and return the issued token.
    async fn register(&self, role: &str, email: &str) -> String {
        let mut body = json!({
            "name": format!("{role} user"),
            "email": email,
            "password": "hunter22",
            "role": role,
            "companyName": "Lahore Traders",
        });
        if role == "Admin" {
            body["adminKey"] = json!(ADMIN_SECRET);
        }
        let (status, body) = self.post("/api/auth/register", None, body).await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {body}");
        body["token"].as_str().unwrap().to_string()
    }

    async fn create_item(&self, admin: &str, name: &str, category: &str, quantity: i64, price: f64) -> String {
        let (status, body) = self
            .post(
                "/api/inventory",
                Some(admin),
                json!({ "name": name, "category": category, "quantity": quantity, "pricePerBag": price }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create item failed: {body}");
        body["id"].as_str().unwrap().to_string()
    }

    async fn item_quantity(&self, token: &str, id: &str) -> i64 {
        let (status, body) = self.get(&format!("/api/inventory/{id}"), token).await;
        assert_eq!(status, StatusCode::OK);
        body["quantity"].as_i64().unwrap()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn mint_jwt(secret: &str, role: Role, expires_in: ChronoDuration) -> String {
    let now = Utc::now();
    let claims = JwtClaims {
        sub: UserId::new(),
        role,
        issued_at: now - ChronoDuration::minutes(1),
        expires_at: now + expires_in,
    };

    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("failed to encode jwt")
}

fn admin_token() -> String {
    mint_jwt(JWT_SECRET, Role::Admin, ChronoDuration::minutes(10))
}

#[tokio::test]
async fn health_and_banner_are_public() {
    let srv = TestServer::spawn().await;

    let res = srv.client.get(srv.url("/health")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = srv.client.get(srv.url("/")).send().await.unwrap();
    assert_eq!(res.text().await.unwrap(), "GrainBridge backend is running!");
}

#[tokio::test]
async fn auth_required_for_protected_endpoints() {
    let srv = TestServer::spawn().await;

    let res = srv.client.get(srv.url("/api/inventory")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["message"], "Not authorized, no token");

    let forged = mint_jwt("some-other-secret", Role::Admin, ChronoDuration::minutes(10));
    let (status, body) = srv.get("/api/inventory", &forged).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Not authorized, token failed");

    let expired = mint_jwt(JWT_SECRET, Role::Admin, ChronoDuration::seconds(-30));
    let (status, _) = srv.get("/api/inventory", &expired).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn register_login_and_duplicate_email() {
    let srv = TestServer::spawn().await;
    let token = srv.register("Customer", "Buyer@Example.com").await;
    assert!(!token.is_empty());

    let (status, body) = srv
        .post(
            "/api/auth/register",
            None,
            json!({
                "name": "Again",
                "email": "buyer@example.com",
                "password": "x",
                "role": "Customer",
                "companyName": "Dup Co",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "User already exists");

    let (status, body) = srv
        .post("/api/auth/login", None, json!({ "email": "buyer@example.com", "password": "hunter22" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], "Customer");
    assert_eq!(body["companyName"], "Lahore Traders");
    assert!(body.get("passwordHash").is_none());

    let (status, body) = srv
        .post("/api/auth/login", None, json!({ "email": "buyer@example.com", "password": "wrong" }))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid email or password");
}

#[tokio::test]
async fn admin_registration_requires_the_shared_secret() {
    let srv = TestServer::spawn().await;
    let attempt = |key: &str| {
        json!({
            "name": "Intruder",
            "email": "boss@mill.pk",
            "password": "pw",
            "role": "Admin",
            "adminKey": key,
        })
    };

    let (status, _) = srv.post("/api/auth/register", None, attempt("guess")).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Nothing was created.
    let (status, _) = srv
        .post("/api/auth/login", None, json!({ "email": "boss@mill.pk", "password": "pw" }))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = srv.post("/api/auth/register", None, attempt(ADMIN_SECRET)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["role"], "Admin");
}

#[tokio::test]
async fn admin_registration_fails_closed_without_configured_secret() {
    let srv = TestServer::spawn_with(AppConfig::for_tests(JWT_SECRET)).await;

    let (status, body) = srv
        .post(
            "/api/auth/register",
            None,
            json!({ "name": "A", "email": "a@mill.pk", "password": "pw", "role": "Admin", "adminKey": "anything" }),
        )
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "Server Configuration Error: Admin Secret Key is missing.");
}

#[tokio::test]
async fn wrong_role_is_forbidden() {
    let srv = TestServer::spawn().await;
    let customer = srv.register("Customer", "c@example.com").await;

    let (status, body) = srv
        .post("/api/inventory", Some(&customer), json!({ "name": "X", "category": "Y", "quantity": 1 }))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "User role Customer is not authorized to access this route.");

    let (status, _) = srv.get("/api/analytics/metrics", &customer).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = srv.get("/api/auth/users", &customer).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn restock_adds_to_existing_quantity() {
    let srv = TestServer::spawn().await;
    let admin = admin_token();
    let id = srv.create_item(&admin, "Super Basmati", "Basmati", 50, 5000.0).await;

    let (status, body) = srv
        .put(&format!("/api/inventory/{id}/restock"), &admin, json!({ "quantity": 100 }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["quantity"], 150);

    let (status, _) = srv
        .put(&format!("/api/inventory/{id}/restock"), &admin, json!({ "quantity": 0 }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(srv.item_quantity(&admin, &id).await, 150);
}

#[tokio::test]
async fn malformed_and_unknown_ids() {
    let srv = TestServer::spawn().await;
    let admin = admin_token();

    let (status, _) = srv.get("/api/inventory/not-a-uuid", &admin).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = srv.get(&format!("/api/inventory/{}", uuid_like()), &admin).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

fn uuid_like() -> String {
    UserId::new().to_string()
}

#[tokio::test]
async fn order_placement_checks_and_deducts_stock() {
    let srv = TestServer::spawn().await;
    let admin = admin_token();
    let customer = srv.register("Customer", "buyer@example.com").await;
    let id = srv.create_item(&admin, "Irri-6", "Non-Basmati", 50, 3200.0).await;

    let (status, body) = srv
        .post(
            "/api/orders",
            Some(&customer),
            json!({ "items": [{ "product": id, "quantity": 60 }], "shippingAddress": "Lahore" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().starts_with("Insufficient stock for Irri-6"));
    assert_eq!(srv.item_quantity(&admin, &id).await, 50);

    let (status, body) = srv
        .post(
            "/api/orders",
            Some(&customer),
            json!({
                "items": [{ "product": id, "quantity": 20 }],
                "shippingAddress": "Lahore",
                "totalAmount": 1.0
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["status"], "Pending");
    assert_eq!(body["totalAmount"], 64_000.0);
    assert_eq!(srv.item_quantity(&admin, &id).await, 30);

    // Admins cannot place orders.
    let (status, _) = srv
        .post(
            "/api/orders",
            Some(&admin),
            json!({ "items": [{ "product": id, "quantity": 1 }], "shippingAddress": "Lahore" }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn orders_are_scoped_and_status_is_admin_only() {
    let srv = TestServer::spawn().await;
    let admin = admin_token();
    let alice = srv.register("Customer", "alice@example.com").await;
    let bob = srv.register("Customer", "bob@example.com").await;
    let id = srv.create_item(&admin, "Sella", "Sella", 100, 4200.0).await;

    let order = json!({ "items": [{ "product": id, "quantity": 1 }], "shippingAddress": "Karachi" });
    let (_, placed) = srv.post("/api/orders", Some(&alice), order.clone()).await;
    srv.post("/api/orders", Some(&bob), order).await;

    let (status, mine) = srv.get("/api/orders", &alice).await;
    assert_eq!(status, StatusCode::OK);
    let mine = mine.as_array().unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0]["customer"]["companyName"], "Lahore Traders");
    assert_eq!(mine[0]["items"][0]["productName"], "Sella");

    let (_, all) = srv.get("/api/orders", &admin).await;
    assert_eq!(all.as_array().unwrap().len(), 2);

    let path = format!("/api/orders/{}/status", placed["id"].as_str().unwrap());
    let (status, _) = srv.put(&path, &alice, json!({ "status": "Shipped" })).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = srv.put(&path, &admin, json!({ "status": "delivered" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "Delivered");

    let (status, _) = srv.put(&path, &admin, json!({ "status": "Lost" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn shipment_approval_credits_matching_category_once() {
    let srv = TestServer::spawn().await;
    let admin = admin_token();
    let supplier = srv.register("Supplier", "farm@example.com").await;
    let id = srv.create_item(&admin, "Super Kernel", "Premium Basmati", 50, 5000.0).await;

    let (status, shipment) = srv
        .post(
            "/api/shipments",
            Some(&supplier),
            json!({ "cropType": "Basmati", "quantity": 200, "expectedDate": "2026-11-01" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{shipment}");
    assert_eq!(shipment["status"], "Pending");

    let path = format!("/api/shipments/{}/status", shipment["id"].as_str().unwrap());
    let (status, body) = srv.put(&path, &admin, json!({ "status": "Approved" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "Approved");
    assert_eq!(srv.item_quantity(&admin, &id).await, 250);

    let (status, body) = srv.put(&path, &admin, json!({ "status": "Approved" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Already approved");
    assert_eq!(srv.item_quantity(&admin, &id).await, 250);

    let (_, listed) = srv.get("/api/shipments", &supplier).await;
    assert_eq!(listed[0]["supplier"]["companyName"], "Lahore Traders");
}

#[tokio::test]
async fn approval_without_matching_category_still_succeeds() {
    let srv = TestServer::spawn().await;
    let admin = admin_token();
    let supplier = srv.register("Supplier", "farm@example.com").await;
    let id = srv.create_item(&admin, "Bran", "Feed", 10, 1500.0).await;

    let (_, shipment) = srv
        .post(
            "/api/shipments",
            Some(&supplier),
            json!({ "cropType": "Brown", "quantity": 40, "expectedDate": "2026-11-01T00:00:00Z" }),
        )
        .await;
    let path = format!("/api/shipments/{}/status", shipment["id"].as_str().unwrap());
    let (status, body) = srv.put(&path, &admin, json!({ "status": "Approved" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "Approved");
    assert_eq!(srv.item_quantity(&admin, &id).await, 10);
}

#[tokio::test]
async fn analytics_and_alerts() {
    let srv = TestServer::spawn().await;
    let admin = admin_token();
    srv.create_item(&admin, "Red Rice", "Healthy", 40, 7000.0).await;
    srv.create_item(&admin, "Super Basmati", "Basmati", 15_000, 5000.0).await;

    let (status, alerts) = srv.get("/api/inventory/alerts", &admin).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(alerts["count"], 1);
    assert_eq!(alerts["alerts"][0]["name"], "Red Rice");

    let (status, insights) = srv.get("/api/analytics/market-insights", &admin).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(insights["growth"], "0.0");
    assert_eq!(insights["recommendation"], "Maintain current stock levels.");

    let (status, metrics) = srv.get("/api/analytics/metrics", &admin).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(metrics["totalInventory"], 15_040);
    assert_eq!(metrics["activeOrders"], 0);
    assert_eq!(metrics["millingEfficiency"], 98.5);
}

#[tokio::test]
async fn profile_update_returns_fresh_token() {
    let srv = TestServer::spawn().await;
    let token = srv.register("Customer", "old@example.com").await;

    let (status, body) = srv
        .put(
            "/api/auth/profile",
            &token,
            json!({ "email": "New@Example.com", "password": "changed1", "phone": "0300" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["email"], "new@example.com");
    assert_eq!(body["phone"], "0300");
    assert!(body["token"].as_str().is_some());

    let (status, _) = srv
        .post("/api/auth/login", None, json!({ "email": "new@example.com", "password": "changed1" }))
        .await;
    assert_eq!(status, StatusCode::OK);

    // A token whose user does not exist.
    let ghost = mint_jwt(JWT_SECRET, Role::Customer, ChronoDuration::minutes(10));
    let (status, _) = srv.put("/api/auth/profile", &ghost, json!({ "name": "Ghost" })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn payment_intent_goes_through_provider() {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    let provider = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/payment_intents"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "client_secret": "pi_1_secret_2" })))
        .mount(&provider)
        .await;

    let mut config = AppConfig::for_tests(JWT_SECRET);
    config.stripe_api_base = provider.uri();
    config.stripe_secret_key = Some("sk_test_1".to_string());
    let srv = TestServer::spawn_with(config).await;
    let customer = mint_jwt(JWT_SECRET, Role::Customer, ChronoDuration::minutes(10));

    let (status, body) = srv
        .post("/api/payment/create-intent", Some(&customer), json!({ "amount": 2500.0 }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["clientSecret"], "pi_1_secret_2");

    let (status, _) = srv
        .post("/api/payment/create-intent", Some(&customer), json!({ "amount": -1 }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unconfigured_payment_provider_is_a_server_error_with_detail() {
    let srv = TestServer::spawn().await;
    let customer = mint_jwt(JWT_SECRET, Role::Customer, ChronoDuration::minutes(10));

    let (status, body) = srv
        .post("/api/payment/create-intent", Some(&customer), json!({ "amount": 10 }))
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "payment provider is not configured");
    assert!(body["detail"].is_string());
}

#[tokio::test]
async fn malformed_bodies_are_json_bad_requests() {
    let srv = TestServer::spawn().await;
    let admin = admin_token();
    let customer = srv.register("Customer", "sloppy@example.com").await;
    let supplier = srv.register("Supplier", "grower@example.com").await;
    let id = srv.create_item(&admin, "Irri-6", "Non-Basmati", 50, 3200.0).await;

    let (status, body) = srv
        .post(
            "/api/orders",
            Some(&customer),
            json!({ "items": [{ "product": id, "quantity": 5 }] }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");
    assert!(body["message"].as_str().unwrap().contains("shippingAddress"), "{body}");
    assert_eq!(srv.item_quantity(&admin, &id).await, 50);

    let (status, body) = srv
        .post(
            "/api/shipments",
            Some(&supplier),
            json!({ "cropType": "Jasmine", "quantity": 200, "expectedDate": "2026-11-01" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");
    assert!(body["message"].as_str().unwrap().contains("Jasmine"), "{body}");

    let (status, body) = srv
        .post(
            "/api/auth/register",
            None,
            json!({ "name": "Who", "email": "who@example.com", "password": "hunter22", "role": "Miller" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");

    let (status, body) = srv.put(&format!("/api/inventory/{id}/restock"), &admin, json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");
    assert_eq!(srv.item_quantity(&admin, &id).await, 50);
}
