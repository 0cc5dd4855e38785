mod common;

use chrono::TimeDelta;
use common::*;
use serde_json::{Value, json};
use storefront::domain_model::*;
use storefront::domain_port::{Clock, CouponRepo};

async fn create_product(app: &TestApp, admin: &Session, name: &str, price_cents: i64) -> Value {
    let response = admin
        .request("POST", "/api/products")
        .json(&json!({
            "name": name,
            "description": format!("a {name}"),
            "price_cents": price_cents,
            "image": "https://img.example.com/p.png",
            "category": "kitchen",
        }))
        .reply(&app.routes())
        .await;
    assert_eq!(response.status(), 201, "{:?}", response.body());
    data(&response)
}

#[tokio::test]
async fn catalog_admin_operations() {
    let app = TestApp::new();
    let (_, admin) = app.signup_admin("admin").await;
    let mug = create_product(&app, &admin, "mug", 1500).await;
    let id = mug["id"].as_str().unwrap().to_string();

    let response = warp::test::request()
        .path("/api/products/featured")
        .reply(&app.routes())
        .await;
    assert_eq!(response.status(), 404);

    let response = admin
        .request("PATCH", &format!("/api/products/{id}"))
        .reply(&app.routes())
        .await;
    assert_eq!(data(&response)["is_featured"], true);

    let response = warp::test::request()
        .path("/api/products/featured")
        .reply(&app.routes())
        .await;
    assert_eq!(data(&response).as_array().unwrap().len(), 1);

    let response = warp::test::request()
        .path("/api/products/category/kitchen")
        .reply(&app.routes())
        .await;
    assert_eq!(data(&response)[0]["name"], "mug");

    let response = warp::test::request()
        .path("/api/products/recommendations")
        .reply(&app.routes())
        .await;
    assert_eq!(data(&response).as_array().unwrap().len(), 1);

    let response = admin
        .request("DELETE", &format!("/api/products/{id}"))
        .reply(&app.routes())
        .await;
    assert_eq!(response.status(), 200);

    let response = warp::test::request()
        .path(&format!("/api/products/{id}"))
        .reply(&app.routes())
        .await;
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn invalid_product_is_rejected() {
    let app = TestApp::new();
    let (_, admin) = app.signup_admin("admin").await;
    let response = admin
        .request("POST", "/api/products")
        .json(&json!({"name": "", "description": "x", "price_cents": 0, "category": "x"}))
        .reply(&app.routes())
        .await;
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn cart_lifecycle() {
    let app = TestApp::new();
    let (_, admin) = app.signup_admin("admin").await;
    let (_, shopper) = app.signup("shopper").await;
    let mug = create_product(&app, &admin, "mug", 1500).await;
    let id = mug["id"].as_str().unwrap().to_string();

    for _ in 0..2 {
        let response = shopper
            .request("POST", "/api/cart")
            .json(&json!({ "product_id": id }))
            .reply(&app.routes())
            .await;
        assert_eq!(response.status(), 200);
    }

    let response = shopper.request("GET", "/api/cart").reply(&app.routes()).await;
    let lines = data(&response);
    assert_eq!(lines[0]["name"], "mug");
    assert_eq!(lines[0]["quantity"], 2);

    let response = shopper
        .request("PUT", &format!("/api/cart/{id}"))
        .json(&json!({ "quantity": 5 }))
        .reply(&app.routes())
        .await;
    assert_eq!(data(&response)[0]["quantity"], 5);

    let response = shopper
        .request("PUT", &format!("/api/cart/{id}"))
        .json(&json!({ "quantity": -1 }))
        .reply(&app.routes())
        .await;
    assert_eq!(response.status(), 400);

    let response = shopper.request("DELETE", "/api/cart").reply(&app.routes()).await;
    assert_eq!(response.status(), 400);

    let response = shopper
        .request("DELETE", "/api/cart")
        .json(&json!({ "product_id": id }))
        .reply(&app.routes())
        .await;
    assert_eq!(data(&response), json!([]));

    let response = shopper
        .request("DELETE", "/api/cart/clear")
        .reply(&app.routes())
        .await;
    assert_eq!(response.status(), 200);

    let response = warp::test::request().path("/api/cart").reply(&app.routes()).await;
    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn coupon_validation() {
    let app = TestApp::new();
    let (_, shopper) = app.signup("shopper").await;
    let now = app.clock.now();
    app.coupons
        .insert(&Coupon {
            code: "SAVE20".to_string(),
            discount_percentage: 20,
            expiration_date: now + TimeDelta::days(3),
            is_active: true,
        })
        .await
        .unwrap();
    app.coupons
        .insert(&Coupon {
            code: "OLD".to_string(),
            discount_percentage: 50,
            expiration_date: now - TimeDelta::days(1),
            is_active: true,
        })
        .await
        .unwrap();

    let response = shopper
        .request("POST", "/api/coupons/validate")
        .json(&json!({ "code": " save20 " }))
        .reply(&app.routes())
        .await;
    assert_eq!(response.status(), 200);
    assert_eq!(data(&response)["discount_percentage"], 20);

    let response = shopper
        .request("POST", "/api/coupons/validate")
        .json(&json!({ "code": "OLD" }))
        .reply(&app.routes())
        .await;
    assert_eq!(response.status(), 400);
    assert_eq!(error_message(&response), "coupon expired");

    let response = shopper
        .request("POST", "/api/coupons/validate")
        .json(&json!({ "code": "NOPE" }))
        .reply(&app.routes())
        .await;
    assert_eq!(response.status(), 404);

    let response = shopper.request("GET", "/api/coupons").reply(&app.routes()).await;
    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn checkout_creates_order_and_feeds_analytics() {
    let app = TestApp::new();
    let (_, admin) = app.signup_admin("admin").await;
    let (_, shopper) = app.signup("shopper").await;
    let chair = create_product(&app, &admin, "chair", 12_500).await;

    let response = shopper
        .request("POST", "/api/payments/create-checkout-session")
        .json(&json!({
            "products": [{
                "product_id": chair["id"],
                "name": "chair",
                "price_cents": 12_500,
                "quantity": 2,
            }],
        }))
        .reply(&app.routes())
        .await;
    assert_eq!(response.status(), 200, "{:?}", response.body());
    let summary = data(&response);
    assert_eq!(summary["total_before_discount_cents"], 25_000);
    assert_eq!(summary["total_after_discount_cents"], 25_000);
    let reward = summary["reward_coupon_code"].as_str().unwrap();
    assert!(reward.starts_with("GIFT"));
    assert_eq!(reward.len(), 10);

    let session_id = summary["session_id"].as_str().unwrap().to_string();
    for _ in 0..2 {
        let response = shopper
            .request("POST", "/api/payments/checkout-success")
            .json(&json!({ "session_id": session_id }))
            .reply(&app.routes())
            .await;
        assert_eq!(response.status(), 200);
    }
    assert_eq!(app.orders.len(), 1);

    let response = admin.request("GET", "/api/analytics").reply(&app.routes()).await;
    assert_eq!(response.status(), 200);
    let analytics = data(&response);
    assert_eq!(analytics["summary"]["users"], 2);
    assert_eq!(analytics["summary"]["products"], 1);
    assert_eq!(analytics["summary"]["total_sales"], 1);
    assert_eq!(analytics["summary"]["total_revenue_cents"], 25_000);

    let days = analytics["daily_sales"].as_array().unwrap();
    assert_eq!(days.len(), 7);
    let today = app.clock.now().date_naive().format("%Y-%m-%d").to_string();
    assert_eq!(days[6]["date"], today);
    assert_eq!(days[6]["sales"], 1);
    assert_eq!(days[0]["sales"], 0);
}

#[tokio::test]
async fn checkout_rejects_empty_lines_and_unknown_coupon() {
    let app = TestApp::new();
    let (_, shopper) = app.signup("shopper").await;

    let response = shopper
        .request("POST", "/api/payments/create-checkout-session")
        .json(&json!({ "products": [] }))
        .reply(&app.routes())
        .await;
    assert_eq!(response.status(), 400);

    let response = shopper
        .request("POST", "/api/payments/create-checkout-session")
        .json(&json!({
            "products": [{ "product_id": ProductId::new(), "name": "x", "price_cents": 100 }],
            "coupon_code": "MISSING",
        }))
        .reply(&app.routes())
        .await;
    assert_eq!(response.status(), 404);
    assert_eq!(error_message(&response), "coupon not found or inactive");
}
