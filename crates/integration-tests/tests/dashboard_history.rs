//! Integration tests for the dashboard, reports and the activity log.

use axum::http::{Method, StatusCode};
use serde_json::{Value, json};

use stockroom_integration_tests::TestApp;

async fn sell(app: &TestApp, cookie: &str, item: &str, quantity: u32) {
    app.post("/pos/cart", cookie, json!({ "item": item, "quantity": quantity }))
        .await;
    let response = app.post("/pos/checkout", cookie, Value::Null).await;
    assert_eq!(response.status, StatusCode::OK, "{}", response.text());
}

#[tokio::test]
async fn test_dashboard_summary() {
    let app = TestApp::new().await;
    let staff = app.login_as_new("maria", "Staff").await;

    sell(&app, &staff, "Jeans", 2).await;
    sell(&app, &staff, "Hoodies", 1).await;

    let response = app.get("/dashboard?period=weekly", &staff).await;
    assert_eq!(response.status, StatusCode::OK);
    let body = response.json();
    assert_eq!(body["period"], "weekly");
    assert_eq!(body["totalSales"], 600.0);
    assert_eq!(body["productsSold"], 3);
    // Coats, Boots, Shorts, Slacks and Hoodies (now 14)
    assert_eq!(body["lowStockCount"], 5);
    assert_eq!(body["recentSales"].as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn test_unknown_period_is_rejected() {
    let app = TestApp::new().await;
    let staff = app.login_as_new("maria", "Staff").await;

    let response = app.get("/dashboard?period=fortnightly", &staff).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = app.get("/dashboard/sales?date=14/11/2025", &staff).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_charts() {
    let app = TestApp::new().await;
    let staff = app.login_as_new("maria", "Staff").await;

    sell(&app, &staff, "Jeans", 2).await;
    sell(&app, &staff, "Sandals", 5).await;

    let chart = app.get("/dashboard/charts/sales?period=weekly", &staff).await.json();
    assert_eq!(chart["labels"].as_array().map(Vec::len), Some(7));
    assert_eq!(chart["values"][6], 1000.0);

    let top = app
        .get("/dashboard/charts/products?period=weekly", &staff)
        .await
        .json();
    assert_eq!(top["labels"], json!(["Sandals", "Jeans"]));
    assert_eq!(top["values"], json!([5, 2]));

    let top = app
        .get("/dashboard/charts/products?period=weekly&category=Footwear", &staff)
        .await
        .json();
    assert_eq!(top["labels"], json!(["Sandals"]));

    let categories = app.get("/dashboard/categories", &staff).await.json();
    assert_eq!(
        categories,
        json!(["Bottoms", "Footwear", "Outerwear", "Tops"])
    );
}

#[tokio::test]
async fn test_sales_on_date() {
    let app = TestApp::new().await;
    let staff = app.login_as_new("maria", "Staff").await;

    sell(&app, &staff, "Jeans", 1).await;

    let today = app.state.now().format("%Y-%m-%d").to_string();
    let sales = app
        .get(&format!("/dashboard/sales?date={today}"), &staff)
        .await
        .json();
    assert_eq!(sales.as_array().map(Vec::len), Some(1));

    let sales = app.get("/dashboard/sales?date=2000-01-01", &staff).await.json();
    assert_eq!(sales, json!([]));
}

#[tokio::test]
async fn test_report() {
    let app = TestApp::new().await;
    let staff = app.login_as_new("maria", "Staff").await;

    sell(&app, &staff, "Jeans", 1).await;

    let report = app.get("/dashboard/report?period=monthly", &staff).await.json();
    assert_eq!(report["currentSales"], 200.0);
    assert_eq!(report["previousSales"], 0.0);
    assert_eq!(report["difference"], 200.0);

    let response = app.get("/dashboard/report.txt?period=monthly", &staff).await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(
        response
            .content_type
            .as_deref()
            .is_some_and(|c| c.starts_with("text/plain"))
    );
    let text = response.text();
    assert!(text.contains("Total Sales:      ₱200.00"));
    assert!(text.contains("Difference: +₱200.00"));
}

#[tokio::test]
async fn test_history_view_and_clear() {
    let app = TestApp::new().await;
    let staff = app.login_as_new("maria", "Staff").await;
    let admin = app.login_as_new("manager", "Admin").await;

    sell(&app, &staff, "Jeans", 1).await;

    let response = app.get("/history", &staff).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let history = app.get("/history", &admin).await.json();
    assert_eq!(history[0]["action"], "Sale completed");
    assert_eq!(history[0]["details"], "Jeans, Quantity: 1, Total: ₱200");
    let logins = history
        .as_array()
        .map(|h| h.iter().filter(|e| e["action"] == "Logged in").count())
        .unwrap_or_default();
    assert!(logins >= 2);

    let response = app
        .request(Method::DELETE, "/history", Some(&admin), None)
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let root = app.login_super_admin().await;
    let response = app.request(Method::DELETE, "/history", Some(&root), None).await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);

    let history = app.get("/history", &root).await.json();
    assert_eq!(history, json!([]));
}
