//! Integration tests for login, logout and account approval.

use axum::http::{Method, StatusCode};
use serde_json::json;

use stockroom_integration_tests::{SUPER_ADMIN, TestApp};

#[tokio::test]
async fn test_health() {
    let app = TestApp::new().await;

    let response = app.request(Method::GET, "/health", None, None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.text(), "ok");

    let response = app.request(Method::GET, "/health/ready", None, None).await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_protected_routes_require_login() {
    let app = TestApp::new().await;

    for uri in ["/auth/me", "/inventory", "/dashboard", "/pos/cart", "/history"] {
        let response = app.request(Method::GET, uri, None, None).await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED, "{uri}");
        assert_eq!(response.error(), "Please log in first");
    }
}

#[tokio::test]
async fn test_login_with_wrong_password() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::POST,
            "/auth/login",
            None,
            Some(json!({ "username": SUPER_ADMIN, "password": "nope" })),
        )
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.error(), "Invalid username or password");
}

#[tokio::test]
async fn test_login_me_logout() {
    let app = TestApp::new().await;
    let cookie = app.login_super_admin().await;

    let me = app.get("/auth/me", &cookie).await;
    assert_eq!(me.status, StatusCode::OK);
    let body = me.json();
    assert_eq!(body["username"], SUPER_ADMIN);
    assert_eq!(body["role"], "Super Admin");
    assert_eq!(body["is_super"], true);

    let response = app
        .request(Method::POST, "/auth/logout", Some(&cookie), None)
        .await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);

    let me = app.get("/auth/me", &cookie).await;
    assert_eq!(me.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_account_approval_flow() {
    let app = TestApp::new().await;
    let admin = app.login_as_new("manager", "Admin").await;

    // Accounts created by a regular admin wait for approval
    let created = app
        .post(
            "/accounts",
            &admin,
            json!({
                "username": "maria",
                "password": "secret123",
                "confirmPassword": "secret123",
                "role": "Staff",
            }),
        )
        .await;
    assert_eq!(created.status, StatusCode::CREATED);
    let body = created.json();
    assert_eq!(body["needsApproval"], true);
    let id = body["account"]["id"].as_str().unwrap_or_default().to_string();

    let response = app
        .request(
            Method::POST,
            "/auth/login",
            None,
            Some(json!({ "username": "maria", "password": "secret123" })),
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.error(), "Account is pending Super Admin approval");

    // Only the super admin sees and approves pending accounts
    let listing = app.get("/accounts", &admin).await.json();
    assert!(listing["pending"].as_array().is_some_and(Vec::is_empty));

    let response = app
        .request(Method::POST, &format!("/accounts/{id}/approve"), Some(&admin), None)
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let root = app.login_super_admin().await;
    let listing = app.get("/accounts", &root).await.json();
    assert_eq!(listing["pending"][0]["username"], "maria");

    let response = app
        .request(Method::POST, &format!("/accounts/{id}/approve"), Some(&root), None)
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["account"]["status"], "active");

    let staff = app.login("maria", "secret123").await;
    assert!(!staff.is_empty());
}

#[tokio::test]
async fn test_create_account_validation() {
    let app = TestApp::new().await;
    let root = app.login_super_admin().await;

    let mismatch = app
        .post(
            "/accounts",
            &root,
            json!({
                "username": "maria",
                "password": "secret123",
                "confirmPassword": "secret124",
                "role": "Staff",
            }),
        )
        .await;
    assert_eq!(mismatch.status, StatusCode::BAD_REQUEST);
    assert_eq!(mismatch.error(), "Passwords do not match");

    let second_super = app
        .post(
            "/accounts",
            &root,
            json!({
                "username": "boss",
                "password": "secret123",
                "confirmPassword": "secret123",
                "role": "Super Admin",
            }),
        )
        .await;
    assert_eq!(second_super.status, StatusCode::BAD_REQUEST);

    let duplicate = app
        .post(
            "/accounts",
            &root,
            json!({
                "username": SUPER_ADMIN,
                "password": "secret123",
                "confirmPassword": "secret123",
                "role": "Admin",
            }),
        )
        .await;
    assert_eq!(duplicate.status, StatusCode::CONFLICT);
    assert_eq!(duplicate.error(), "Username already exists");
}

#[tokio::test]
async fn test_staff_cannot_manage_accounts() {
    let app = TestApp::new().await;
    let staff = app.login_as_new("maria", "Staff").await;

    let response = app
        .post(
            "/accounts",
            &staff,
            json!({
                "username": "pedro",
                "password": "secret123",
                "confirmPassword": "secret123",
                "role": "Staff",
            }),
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let response = app.get("/accounts", &staff).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_super_admin_cannot_be_deleted() {
    let app = TestApp::new().await;
    let root = app.login_super_admin().await;

    let me = app.get("/auth/me", &root).await.json();
    let id = me["id"].as_str().unwrap_or_default().to_string();

    let response = app
        .request(Method::DELETE, &format!("/accounts/{id}"), Some(&root), None)
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.error(), "Cannot delete Super Admin account");

    let response = app
        .request(Method::DELETE, "/accounts/user_0_missing", Some(&root), None)
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}
