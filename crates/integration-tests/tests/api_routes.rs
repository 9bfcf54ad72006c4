//! The register's HTTP API, driven in-process.

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use axum::http::{Method, StatusCode};
use chrono::{DateTime, Utc};
use serde_json::json;

use tillpoint_integration_tests::{ADMIN, CASHIER, TestContext};
use tillpoint_register::config::RegisterConfig;

#[tokio::test]
async fn test_health_needs_no_user() {
    let ctx = TestContext::new();
    let (status, _) = ctx.send_text(Method::GET, "/health", ADMIN, "").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_api_requires_known_user() {
    let ctx = TestContext::new();

    let (status, body) = ctx.send(Method::GET, "/api/cart", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].is_string());

    let (status, _) = ctx.send(Method::GET, "/api/cart", Some("mallory"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_cashier_redirected_from_reports() {
    let ctx = TestContext::new();

    let (status, body) = ctx
        .send(Method::GET, "/api/reports/daily", Some(CASHIER), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["redirect"], "/");

    let (status, body) = ctx
        .send(Method::GET, "/api/reports/daily", Some(ADMIN), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["orders"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_session_landing() {
    let ctx = TestContext::new();

    let (status, body) = ctx.send(Method::GET, "/api/session", Some(CASHIER), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["landing"], "/");
    let features = body["features"].as_array().unwrap();
    assert!(features.contains(&json!("pos")));
    assert!(!features.contains(&json!("reports")));
}

#[tokio::test]
async fn test_cashier_reads_products_but_cannot_edit() {
    let ctx = TestContext::new();

    let (status, body) = ctx
        .send(Method::GET, "/api/products?barcode=400200", Some(CASHIER), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["name"], "Sandwich");

    let (status, _) = ctx
        .send(Method::DELETE, "/api/products/2", Some(CASHIER), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_sale_through_the_api() {
    let ctx = TestContext::new();
    let cashier = Some(CASHIER);

    for product_id in [1, 1, 2] {
        let (status, _) = ctx
            .send(
                Method::POST,
                "/api/cart/add",
                cashier,
                Some(json!({ "product_id": product_id })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, _) = ctx
        .send(
            Method::POST,
            "/api/cart/add",
            cashier,
            Some(json!({ "product_id": 99 })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, view) = ctx.send(Method::GET, "/api/cart", cashier, None).await;
    assert_eq!(view["cart"]["item_count"], 3);
    assert_eq!(view["cart"]["display_total"], "$17.59");
    assert_eq!(view["state"], "idle");

    let (status, view) = ctx
        .send(Method::POST, "/api/checkout/begin", cashier, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["state"], "payment_selection");

    let (status, body) = ctx
        .send(Method::POST, "/api/checkout/confirm", cashier, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"]["order"]["status"], "completed");
    assert_eq!(body["outcome"]["customer_update"]["result"], "not_applicable");
    assert_eq!(body["checkout"]["state"], "idle");
    assert_eq!(body["checkout"]["cart"]["item_count"], 0);

    let order_id = body["outcome"]["order"]["id"].as_i64().unwrap();

    let (status, html) = ctx
        .send_text(
            Method::GET,
            &format!("/api/orders/{order_id}/receipt"),
            CASHIER,
            "",
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("$17.59"));

    let (status, _) = ctx
        .send(
            Method::POST,
            &format!("/api/orders/{order_id}/status"),
            cashier,
            Some(json!({ "status": "pending" })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_daily_report_counts_completed_sales() {
    let ctx = TestContext::new();
    let admin = Some(ADMIN);

    ctx.send(
        Method::POST,
        "/api/cart/add",
        admin,
        Some(json!({ "product_id": 1 })),
    )
    .await;
    ctx.send(Method::POST, "/api/checkout/begin", admin, None)
        .await;
    let (_, body) = ctx
        .send(Method::POST, "/api/checkout/confirm", admin, None)
        .await;
    let placed: DateTime<Utc> = body["outcome"]["order"]["date"]
        .as_str()
        .unwrap()
        .parse()
        .unwrap();
    let date = placed.date_naive();

    let (status, report) = ctx
        .send(
            Method::GET,
            &format!("/api/reports/daily?date={date}"),
            admin,
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["summary"]["completed_orders"], 1);
    assert_eq!(report["summary"]["items_sold"], 1);

    let (status, html) = ctx
        .send_text(
            Method::GET,
            &format!("/api/reports/daily?date={date}&format=html"),
            ADMIN,
            "",
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("$3.85"));
}

#[tokio::test]
async fn test_oversized_quantity_rejected() {
    let ctx = TestContext::new();
    let cashier = Some(CASHIER);
    for product_id in [1, 2] {
        ctx.send(
            Method::POST,
            "/api/cart/add",
            cashier,
            Some(json!({ "product_id": product_id })),
        )
        .await;
    }

    for product_id in [1, 2] {
        let (status, body) = ctx
            .send(
                Method::POST,
                "/api/cart/update",
                cashier,
                Some(json!({ "product_id": product_id, "quantity": 3_000_000_000_i64 })),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    let (status, view) = ctx.send(Method::GET, "/api/cart", cashier, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["cart"]["item_count"], 2);
}

#[tokio::test]
async fn test_confirm_on_empty_register_conflicts() {
    let ctx = TestContext::new();
    let (status, _) = ctx
        .send(Method::POST, "/api/checkout/begin", Some(CASHIER), None)
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test(start_paused = true)]
async fn test_abort_settlement_over_http() {
    let ctx = TestContext::with_config(RegisterConfig {
        settlement_delay: Duration::from_secs(5),
        ..RegisterConfig::default()
    });
    let cashier = Some(CASHIER);
    ctx.send(
        Method::POST,
        "/api/cart/add",
        cashier,
        Some(json!({ "product_id": 1 })),
    )
    .await;
    ctx.send(Method::POST, "/api/checkout/begin", cashier, None)
        .await;

    let ((confirm_status, _), (abort_status, _)) = tokio::join!(
        ctx.send(Method::POST, "/api/checkout/confirm", cashier, None),
        async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            ctx.send(Method::POST, "/api/checkout/abort", cashier, None)
                .await
        }
    );
    assert_eq!(abort_status, StatusCode::ACCEPTED);
    assert_eq!(confirm_status, StatusCode::CONFLICT);

    let (_, view) = ctx.send(Method::GET, "/api/cart", cashier, None).await;
    assert_eq!(view["state"], "payment_selection");
    assert_eq!(view["cart"]["item_count"], 1);
    assert!(view["last_error"].is_string());
}

#[tokio::test]
async fn test_credit_repayment_limits() {
    let ctx = TestContext::new();
    let admin = Some(ADMIN);

    ctx.send(
        Method::POST,
        "/api/cart/add",
        admin,
        Some(json!({ "product_id": 2 })),
    )
    .await;
    ctx.send(Method::POST, "/api/checkout/begin", admin, None)
        .await;
    ctx.send(
        Method::POST,
        "/api/checkout/payment-method",
        admin,
        Some(json!({ "method": "credit" })),
    )
    .await;
    ctx.send(
        Method::POST,
        "/api/checkout/customer",
        admin,
        Some(json!({ "customer_id": 1 })),
    )
    .await;
    let (status, body) = ctx
        .send(Method::POST, "/api/checkout/confirm", admin, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"]["customer_update"]["result"], "updated");

    let (status, _) = ctx
        .send(
            Method::POST,
            "/api/customers/1/credit-payments",
            admin,
            Some(json!({ "amount": "50.00" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, customer) = ctx
        .send(
            Method::POST,
            "/api/customers/1/credit-payments",
            admin,
            Some(json!({ "amount": "5.00" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(customer["total_orders"], 1);
}

#[tokio::test]
async fn test_product_csv_import() {
    let ctx = TestContext::new();
    let csv = "name,price,category,in_stock,barcode\n\
               Bagel,2.25,Food,12,400400\n\
               Coffee Large,4.50,Drinks,5,400100\n\
               ,1.00,Food,1,\n";

    let (status, body) = ctx
        .send_text(Method::POST, "/api/products/import", ADMIN, csv)
        .await;
    assert_eq!(status, StatusCode::OK);
    let report: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(report["added"], 1);
    assert_eq!(report["updated"], 1);
    assert_eq!(report["errors"].as_array().unwrap().len(), 1);

    let (_, products) = ctx
        .send(Method::GET, "/api/products?barcode=400100", Some(ADMIN), None)
        .await;
    assert_eq!(products[0]["name"], "Coffee Large");

    let (status, exported) = ctx
        .send_text(Method::GET, "/api/products/export", ADMIN, "")
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(exported.starts_with("id,name,price"));
    assert!(exported.contains("Bagel"));
}

#[tokio::test]
async fn test_voice_adds_to_cart() {
    let ctx = TestContext::new();
    let cashier = Some(CASHIER);

    let (status, voice) = ctx.send(Method::POST, "/api/voice/start", cashier, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(voice["listening"], true);

    let (status, _) = ctx
        .send(
            Method::POST,
            "/api/voice/page",
            cashier,
            Some(json!({ "page": "pos" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = ctx
        .send(
            Method::POST,
            "/api/voice/events",
            cashier,
            Some(json!({ "type": "final", "transcript": "Add coffee" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["match"]["command"], "add coffee");
    assert_eq!(body["effect"]["effect"], "checkout");
    assert_eq!(body["effect"]["checkout"]["cart"]["item_count"], 1);

    let (_, body) = ctx
        .send(
            Method::POST,
            "/api/voice/events",
            cashier,
            Some(json!({ "type": "final", "transcript": "show reports" })),
        )
        .await;
    assert_eq!(body["effect"]["effect"], "navigate");
    assert_eq!(body["effect"]["route"], "/");

    let (_, body) = ctx
        .send(
            Method::POST,
            "/api/voice/events",
            cashier,
            Some(json!({ "type": "partial", "transcript": "add" })),
        )
        .await;
    assert!(body["transcript"].is_null());
    assert!(body["effect"].is_null());
}
