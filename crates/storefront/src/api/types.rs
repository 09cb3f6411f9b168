//! Request and response envelopes of the marketplace API.
//!
//! Domain shapes (products, cart lines, game state, users) live in
//! `oba-core`; these types only wrap them the way the backend does.

use oba_core::game::{BonusConversion, SubmissionOutcome};
use oba_core::{ChallengeId, DailyChallenge, Email, Preferences, Product, ProductId, User};
use serde::{Deserialize, Serialize};

/// `GET /products/featured`.
#[derive(Debug, Clone, Deserialize)]
pub struct FeaturedResponse {
    #[serde(default)]
    pub products: Vec<Product>,
}

/// `GET /products/ai-recommendations`.
#[derive(Debug, Clone, Deserialize)]
pub struct RecommendationsResponse {
    #[serde(default)]
    pub recommendations: Vec<Product>,
}

/// `GET /products/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductResponse {
    pub product: Product,
}

/// `GET /game/daily-challenge`.
#[derive(Debug, Clone, Deserialize)]
pub struct ChallengeResponse {
    #[serde(default)]
    pub challenge: Option<DailyChallenge>,
}

/// `POST /game/submit-drawing` body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitDrawingRequest {
    pub drawing_data: String,
    pub product_id: ProductId,
    pub challenge_id: ChallengeId,
}

/// Alias kept next to its request for readability at call sites.
pub type SubmitDrawingResponse = SubmissionOutcome;

/// `POST /game/convert-bonuses` body.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertBonusesRequest {
    pub bonus_amount: u32,
}

pub type ConvertBonusesResponse = BonusConversion;

/// `POST /auth/login` body.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: Email,
    pub password: String,
}

/// Successful login or registration.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

/// `GET /auth/me`, `PUT /auth/profile`.
#[derive(Debug, Clone, Deserialize)]
pub struct UserResponse {
    pub user: User,
}

/// `PUT /auth/profile` body from the settings tab.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct PreferencesUpdate {
    pub preferences: Preferences,
}

/// Error body the backend sends with 4xx/5xx responses.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ErrorBody {
    /// Best available message from an error body.
    #[must_use]
    pub fn parse(body: &str) -> Option<String> {
        let parsed: Self = serde_json::from_str(body).ok()?;
        parsed.message.or(parsed.error).filter(|m| !m.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_body_prefers_message() {
        assert_eq!(
            ErrorBody::parse(r#"{"message":"Invalid credentials","error":"AUTH"}"#).as_deref(),
            Some("Invalid credentials")
        );
        assert_eq!(
            ErrorBody::parse(r#"{"error":"Not allowed"}"#).as_deref(),
            Some("Not allowed")
        );
        assert_eq!(ErrorBody::parse("<html>502</html>"), None);
        assert_eq!(ErrorBody::parse(r#"{"message":""}"#), None);
    }

    #[test]
    fn test_submit_request_is_camel_case() {
        let body = SubmitDrawingRequest {
            drawing_data: "data:image/png;base64,AAAA".to_string(),
            product_id: ProductId::new("p1"),
            challenge_id: ChallengeId::new("c1"),
        };
        let json = serde_json::to_value(&body).unwrap_or_default();
        assert_eq!(json["drawingData"], "data:image/png;base64,AAAA");
        assert_eq!(json["productId"], "p1");
        assert_eq!(json["challengeId"], "c1");
    }
}
