//! Sign-in, registration, logout and the profile pages behind them.

#![allow(clippy::unwrap_used)]

use oba_integration_tests::{TEST_TOKEN, TestContext, location, user_json};
use reqwest::StatusCode;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn test_login_redirects_to_next_with_toast() {
    let ctx = TestContext::new().await;
    ctx.mock_login().await;

    let response = ctx
        .post(
            "/login",
            &[
                ("email", "aysel@example.az"),
                ("password", "secret123"),
                ("next", "/cart"),
            ],
        )
        .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/cart");

    let body = ctx.page("/cart").await;
    assert!(body.contains("Login successful!"));
    assert!(body.contains("Aysel"));
}

#[tokio::test]
async fn test_login_ignores_offsite_next() {
    let ctx = TestContext::new().await;
    ctx.mock_login().await;

    let response = ctx
        .post(
            "/login",
            &[
                ("email", "aysel@example.az"),
                ("password", "secret123"),
                ("next", "https://evil.example.com/"),
            ],
        )
        .await;

    assert_eq!(location(&response), "/");
}

#[tokio::test]
async fn test_login_failure_shows_backend_message() {
    let ctx = TestContext::new().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"message": "Invalid credentials"})),
        )
        .mount(&ctx.backend)
        .await;

    let response = ctx
        .post(
            "/login",
            &[("email", "aysel@example.az"), ("password", "wrong")],
        )
        .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = response.text().await.unwrap();
    assert!(body.contains("Invalid credentials"));
    assert!(body.contains("aysel@example.az"));
}

#[tokio::test]
async fn test_login_rejects_malformed_email_without_backend_call() {
    let ctx = TestContext::new().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&ctx.backend)
        .await;

    let response = ctx
        .post("/login", &[("email", "not-an-email"), ("password", "secret123")])
        .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_attempts_are_rate_limited() {
    let ctx = TestContext::new().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&ctx.backend)
        .await;

    let mut statuses = Vec::new();
    for _ in 0..12 {
        let response = ctx
            .post("/login", &[("email", "aysel@example.az"), ("password", "x")])
            .await;
        statuses.push(response.status());
    }

    assert!(statuses.contains(&StatusCode::TOO_MANY_REQUESTS));
    // Reading the login page is never throttled.
    assert_eq!(ctx.get("/login").await.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_register_validates_before_calling_backend() {
    let ctx = TestContext::new().await;

    let response = ctx
        .post(
            "/register",
            &[
                ("name", "Aysel"),
                ("email", "aysel@example.az"),
                ("password", "secret123"),
                ("password_confirm", "secret124"),
            ],
        )
        .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = response.text().await.unwrap();
    assert!(body.contains("Passwords do not match"));
    assert!(ctx.backend.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_register_signs_in() {
    let ctx = TestContext::new().await;
    Mock::given(method("POST"))
        .and(path("/auth/register"))
        .and(body_partial_json(json!({
            "name": "Aysel Mammadova",
            "email": "aysel@example.az"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "token": TEST_TOKEN,
            "user": user_json()
        })))
        .expect(1)
        .mount(&ctx.backend)
        .await;

    let response = ctx
        .post(
            "/register",
            &[
                ("name", "Aysel Mammadova"),
                ("email", "aysel@example.az"),
                ("password", "secret123"),
                ("password_confirm", "secret123"),
            ],
        )
        .await;

    assert_eq!(location(&response), "/");
    assert!(ctx.page("/cart").await.contains("Registration successful!"));
}

#[tokio::test]
async fn test_protected_pages_redirect_to_login() {
    let ctx = TestContext::new().await;

    for (page, login) in [
        ("/profile", "/login?next=%2Fprofile"),
        ("/profile?tab=game", "/login?next=%2Fprofile%3Ftab%3Dgame"),
        ("/checkout", "/login?next=%2Fcheckout"),
        ("/game", "/login?next=%2Fgame"),
    ] {
        let response = ctx.get(page).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{page}");
        assert_eq!(location(&response), login, "{page}");
    }
}

#[tokio::test]
async fn test_rejected_token_signs_out() {
    let ctx = TestContext::new().await;
    ctx.login().await;
    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"message": "Token expired"})),
        )
        .mount(&ctx.backend)
        .await;

    let response = ctx.get("/profile").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login?next=%2Fprofile");

    let body = ctx.page("/login?next=%2Fprofile").await;
    assert!(body.contains("Your session has expired. Please login again."));
    assert_eq!(location(&ctx.get("/game").await), "/login?next=%2Fgame");
}

#[tokio::test]
async fn test_rejected_token_on_settings_save_signs_out() {
    let ctx = TestContext::new().await;
    ctx.login().await;
    Mock::given(method("PUT"))
        .and(path("/auth/profile"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&ctx.backend)
        .await;

    let response = ctx
        .post("/profile/settings", &[("email_notifications", "on")])
        .await;

    assert_eq!(
        location(&response),
        "/login?next=%2Fprofile%3Ftab%3Dsettings"
    );
    assert_eq!(ctx.get("/profile").await.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn test_logout_forgets_user() {
    let ctx = TestContext::new().await;
    ctx.login().await;

    let response = ctx.post("/logout", &[]).await;
    assert_eq!(location(&response), "/");

    let body = ctx.page("/cart").await;
    assert!(body.contains("You have been logged out"));
    assert!(body.contains("Sign Up"));
    assert_eq!(ctx.get("/profile").await.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn test_profile_settings_are_saved() {
    let ctx = TestContext::new().await;
    ctx.login().await;
    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .and(header("authorization", format!("Bearer {TEST_TOKEN}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"user": user_json()})))
        .mount(&ctx.backend)
        .await;
    Mock::given(method("PUT"))
        .and(path("/auth/profile"))
        .and(body_partial_json(json!({
            "preferences": {
                "notifications": {"email": true, "push": false, "sms": false},
                "privacy": {"aiRecommendations": false, "shareGameStats": true}
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"user": user_json()})))
        .expect(1)
        .mount(&ctx.backend)
        .await;

    let response = ctx
        .post(
            "/profile/settings",
            &[("email_notifications", "on"), ("share_game_stats", "on")],
        )
        .await;

    assert_eq!(location(&response), "/profile?tab=settings");
    let body = ctx.page("/profile?tab=settings").await;
    assert!(body.contains("Settings saved successfully!"));
    assert!(body.contains("Save Settings"));
}
