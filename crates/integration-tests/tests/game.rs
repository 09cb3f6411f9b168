//! Daily drawing challenge: rounds, submissions and bonus conversion.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use oba_core::game::CONVERSION_TIERS;
use oba_integration_tests::{PNG_DATA_URL, TestContext, location};
use reqwest::StatusCode;
use serde_json::{Value, json};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, ResponseTemplate};

fn game_state(bonuses: u32, can_play_today: bool) -> Value {
    json!({
        "dailyChallenge": {
            "id": "c1",
            "productId": "p1",
            "productName": "Copper Lamp",
            "productImage": "https://cdn.example.az/p1.jpg",
            "productDescription": "A warm copper desk lamp"
        },
        "userBonuses": bonuses,
        "gameHistory": [],
        "canPlayToday": can_play_today
    })
}

async fn signed_in_with_state(state: Value) -> TestContext {
    let ctx = TestContext::new().await;
    ctx.login().await;
    Mock::given(method("GET"))
        .and(path("/game/state"))
        .respond_with(ResponseTemplate::new(200).set_body_json(state))
        .mount(&ctx.backend)
        .await;
    ctx
}

#[tokio::test]
async fn test_game_page_shows_challenge() {
    let ctx = signed_in_with_state(game_state(120, true)).await;

    let response = ctx.get("/game").await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = response.text().await.unwrap();
    assert!(body.contains("Copper Lamp"));
    assert!(body.contains("Start Drawing"));
    assert!(body.contains("Convert Your Bonuses"));
    assert!(!body.contains("/static/js/game.js"));
}

#[tokio::test]
async fn test_game_page_fetches_missing_challenge() {
    let ctx = TestContext::new().await;
    ctx.login().await;
    Mock::given(method("GET"))
        .and(path("/game/state"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "userBonuses": 0,
            "canPlayToday": true
        })))
        .mount(&ctx.backend)
        .await;
    Mock::given(method("GET"))
        .and(path("/game/daily-challenge"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&ctx.backend)
        .await;

    let body = ctx.page("/game").await;

    assert!(body.contains("Failed to load daily challenge"));
    assert!(body.contains("No Challenge Available"));
}

#[tokio::test]
async fn test_already_played_cannot_start() {
    let ctx = signed_in_with_state(game_state(0, false)).await;
    assert!(ctx.page("/game").await.contains("Already Played Today"));

    let response = ctx.post("/game/start", &[]).await;

    assert_eq!(location(&response), "/game");
    assert!(ctx.page("/game").await.contains("You have already played today"));
}

#[tokio::test]
async fn test_round_start_and_submit() {
    let ctx = signed_in_with_state(game_state(10, true)).await;
    Mock::given(method("POST"))
        .and(path("/game/submit-drawing"))
        .and(body_partial_json(json!({
            "drawingData": PNG_DATA_URL,
            "productId": "p1",
            "challengeId": "c1"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "bonusEarned": 15,
            "accuracy": 82.5
        })))
        .expect(1)
        .mount(&ctx.backend)
        .await;

    let _ = ctx.get("/game").await;
    let response = ctx.post("/game/start", &[]).await;
    assert_eq!(location(&response), "/game");

    let body = ctx.page("/game").await;
    assert!(body.contains("Game started! You have 5 minutes to draw the product."));
    assert!(body.contains("Submit Drawing"));
    assert!(body.contains("data-remaining="));
    assert!(body.contains("/static/js/game.js"));

    let response = ctx
        .post("/game/submit", &[("drawing_data", PNG_DATA_URL)])
        .await;
    assert_eq!(location(&response), "/game");
    assert!(ctx.page("/game").await.contains("Great job! You earned 15 bonuses!"));

    // The round is over; a second submission is refused locally.
    let _ = ctx
        .post("/game/submit", &[("drawing_data", PNG_DATA_URL)])
        .await;
    assert!(ctx.page("/game").await.contains("No game in progress"));
}

#[tokio::test]
async fn test_malformed_drawing_is_rejected() {
    let ctx = signed_in_with_state(game_state(10, true)).await;
    Mock::given(method("POST"))
        .and(path("/game/submit-drawing"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&ctx.backend)
        .await;

    let _ = ctx.get("/game").await;
    let _ = ctx.post("/game/start", &[]).await;
    let _ = ctx
        .post("/game/submit", &[("drawing_data", "data:text/plain;base64,aGk=")])
        .await;

    assert!(ctx.page("/game").await.contains("Failed to submit drawing"));
}

#[tokio::test]
async fn test_unrecognised_drawing_keeps_round_open() {
    let ctx = signed_in_with_state(game_state(10, true)).await;
    Mock::given(method("POST"))
        .and(path("/game/submit-drawing"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "bonusEarned": 0,
            "accuracy": 12.0
        })))
        .mount(&ctx.backend)
        .await;

    let _ = ctx.get("/game").await;
    let _ = ctx.post("/game/start", &[]).await;
    let _ = ctx
        .post("/game/submit", &[("drawing_data", PNG_DATA_URL)])
        .await;

    let body = ctx.page("/game").await;
    assert!(body.contains("Drawing not recognized. Try again!"));
    assert!(body.contains("Submit Drawing"));
}

#[tokio::test]
async fn test_conversion_checks_balance_first() {
    let ctx = signed_in_with_state(game_state(30, true)).await;
    Mock::given(method("POST"))
        .and(path("/game/convert-bonuses"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&ctx.backend)
        .await;

    let _ = ctx.get("/game").await;
    let amount = CONVERSION_TIERS[0].0.to_string();
    let response = ctx
        .post("/game/convert", &[("bonus_amount", amount.as_str())])
        .await;

    assert_eq!(location(&response), "/game");
    assert!(ctx.page("/game").await.contains("You only have 30 bonuses"));
}

#[tokio::test]
async fn test_conversion_shows_discount_code() {
    let ctx = signed_in_with_state(game_state(120, true)).await;
    Mock::given(method("POST"))
        .and(path("/game/convert-bonuses"))
        .and(body_partial_json(json!({"bonusAmount": 100})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "discountCode": "OBA-10-XYZ",
            "discountAmount": 10
        })))
        .expect(1)
        .mount(&ctx.backend)
        .await;

    let _ = ctx.get("/game").await;
    let _ = ctx.post("/game/convert", &[("bonus_amount", "100")]).await;

    let body = ctx.page("/game").await;
    assert!(body.contains("Converted 100 bonuses to 10% discount!"));
    assert!(body.contains("Your discount code: OBA-10-XYZ"));
}
