//! Daily "draw the product" challenge.
//!
//! Scoring happens on the backend. This module mirrors the player's game
//! state, validates the drawing before it is sent, and keeps the round timer
//! on the server side so a stale browser tab cannot extend a round.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{ChallengeId, ProductId};

/// Length of a drawing round.
pub const ROUND_SECONDS: i64 = 5 * 60;

/// Extra time accepted after the clock hits 0:00 for the automatic submission.
pub const SUBMISSION_GRACE_SECONDS: i64 = 10;

/// Canvas edge length in pixels.
pub const CANVAS_SIZE: u32 = 400;

/// Largest accepted encoded drawing.
pub const MAX_DRAWING_BYTES: usize = 2 * 1024 * 1024;

/// Prefix of a PNG data URL produced by `canvas.toDataURL("image/png")`.
pub const PNG_DATA_URL_PREFIX: &str = "data:image/png;base64,";

/// Brush palette offered next to the canvas.
pub const PALETTE: [&str; 12] = [
    "#000000", "#FF0000", "#00FF00", "#0000FF", "#FFFF00", "#FF00FF", "#00FFFF", "#FFA500",
    "#800080", "#008000", "#FFC0CB", "#A52A2A",
];

pub const MIN_BRUSH_SIZE: u32 = 1;
pub const MAX_BRUSH_SIZE: u32 = 20;
pub const DEFAULT_BRUSH_SIZE: u32 = 5;

/// Bonus amounts offered for conversion, with the discount percentage shown.
pub const CONVERSION_TIERS: [(u32, u32); 3] = [(50, 5), (100, 10), (200, 20)];

/// The product to draw today.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyChallenge {
    pub id: ChallengeId,
    pub product_id: ProductId,
    pub product_name: String,
    #[serde(default)]
    pub product_image: Option<String>,
    #[serde(default)]
    pub product_description: String,
}

/// One finished game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameHistoryEntry {
    #[serde(default)]
    pub product_id: Option<ProductId>,
    #[serde(default)]
    pub product_name: String,
    #[serde(default)]
    pub bonus_earned: u32,
    #[serde(default)]
    pub accuracy: f64,
    pub date: DateTime<Utc>,
}

impl GameHistoryEntry {
    #[must_use]
    pub fn display_date(&self) -> String {
        self.date.format("%d.%m.%Y").to_string()
    }

    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn accuracy_percent(&self) -> i64 {
        self.accuracy.round() as i64
    }
}

/// The player's game progress as mirrored from `GET /game/state`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    #[serde(default)]
    pub daily_challenge: Option<DailyChallenge>,
    #[serde(default)]
    pub user_bonuses: u32,
    #[serde(default)]
    pub game_history: Vec<GameHistoryEntry>,
    #[serde(default = "default_true")]
    pub can_play_today: bool,
    #[serde(default)]
    pub last_play_date: Option<DateTime<Utc>>,
}

const fn default_true() -> bool {
    true
}

impl Default for GameState {
    fn default() -> Self {
        Self {
            daily_challenge: None,
            user_bonuses: 0,
            game_history: Vec::new(),
            can_play_today: true,
            last_play_date: None,
        }
    }
}

/// Scoring result returned by `POST /game/submit-drawing`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionOutcome {
    pub success: bool,
    #[serde(default)]
    pub bonus_earned: u32,
    #[serde(default)]
    pub accuracy: f64,
}

/// Discount returned by `POST /game/convert-bonuses`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BonusConversion {
    pub discount_code: String,
    pub discount_amount: u32,
}

/// Rejected bonus conversions.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConversionError {
    #[error("Enter a bonus amount greater than zero")]
    Zero,
    #[error("You only have {available} bonuses")]
    Insufficient { available: u32 },
}

impl GameState {
    #[must_use]
    pub fn games_played(&self) -> usize {
        self.game_history.len()
    }

    /// Games that earned at least one bonus.
    #[must_use]
    pub fn games_won(&self) -> usize {
        self.game_history
            .iter()
            .filter(|game| game.bonus_earned > 0)
            .count()
    }

    /// Most recent games first.
    #[must_use]
    pub fn recent_games(&self, limit: usize) -> Vec<&GameHistoryEntry> {
        let mut games: Vec<&GameHistoryEntry> = self.game_history.iter().collect();
        games.sort_by(|a, b| b.date.cmp(&a.date));
        games.truncate(limit);
        games
    }

    /// Record a scored submission.
    ///
    /// Unsuccessful outcomes leave the state untouched so the player can try
    /// again within the same round.
    pub fn apply_submission(
        &mut self,
        outcome: &SubmissionOutcome,
        challenge: &DailyChallenge,
        now: DateTime<Utc>,
    ) {
        if !outcome.success {
            return;
        }

        self.user_bonuses = self.user_bonuses.saturating_add(outcome.bonus_earned);
        self.can_play_today = false;
        self.last_play_date = Some(now);
        self.game_history.push(GameHistoryEntry {
            product_id: Some(challenge.product_id.clone()),
            product_name: challenge.product_name.clone(),
            bonus_earned: outcome.bonus_earned,
            accuracy: outcome.accuracy,
            date: now,
        });
    }

    /// Check that `amount` bonuses can be converted.
    ///
    /// # Errors
    ///
    /// Returns a [`ConversionError`] for zero or more than the balance.
    pub const fn validate_conversion(&self, amount: u32) -> Result<(), ConversionError> {
        if amount == 0 {
            return Err(ConversionError::Zero);
        }
        if amount > self.user_bonuses {
            return Err(ConversionError::Insufficient {
                available: self.user_bonuses,
            });
        }
        Ok(())
    }

    /// Deduct converted bonuses.
    pub const fn apply_conversion(&mut self, amount: u32) {
        self.user_bonuses = self.user_bonuses.saturating_sub(amount);
    }

    /// Forget today's challenge and allow a new round.
    pub fn reset_daily(&mut self) {
        self.can_play_today = true;
        self.daily_challenge = None;
    }
}

/// An in-progress drawing round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRound {
    pub challenge_id: ChallengeId,
    pub product_id: ProductId,
    pub started_at: DateTime<Utc>,
}

impl GameRound {
    #[must_use]
    pub fn start(challenge: &DailyChallenge, now: DateTime<Utc>) -> Self {
        Self {
            challenge_id: challenge.id.clone(),
            product_id: challenge.product_id.clone(),
            started_at: now,
        }
    }

    #[must_use]
    pub fn deadline(&self) -> DateTime<Utc> {
        self.started_at + Duration::seconds(ROUND_SECONDS)
    }

    /// Whole seconds left on the clock, never negative.
    #[must_use]
    pub fn remaining(&self, now: DateTime<Utc>) -> i64 {
        (self.deadline() - now).num_seconds().clamp(0, ROUND_SECONDS)
    }

    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.deadline()
    }

    /// Whether a submission arriving at `now` still counts.
    #[must_use]
    pub fn accepts_submission(&self, now: DateTime<Utc>) -> bool {
        now <= self.deadline() + Duration::seconds(SUBMISSION_GRACE_SECONDS)
    }

    #[must_use]
    pub fn matches(&self, challenge: &DailyChallenge) -> bool {
        self.challenge_id == challenge.id
    }
}

/// Render seconds as `m:ss`.
#[must_use]
pub fn format_clock(seconds: i64) -> String {
    let seconds = seconds.max(0);
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

/// Rejected drawings.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DrawingError {
    #[error("drawing must be a PNG data URL")]
    NotPng,
    #[error("drawing is empty")]
    Empty,
    #[error("drawing is larger than {max} bytes")]
    TooLarge { max: usize },
    #[error("drawing is not valid base64")]
    InvalidEncoding,
}

/// A validated canvas export, kept in its data-URL form for the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Drawing(String);

impl Drawing {
    /// Validate a `data:image/png;base64,...` URL.
    ///
    /// # Errors
    ///
    /// Returns a [`DrawingError`] when the URL is not a decodable PNG payload
    /// within the size limit.
    pub fn parse(data_url: &str) -> Result<Self, DrawingError> {
        let data_url = data_url.trim();
        if data_url.len() > MAX_DRAWING_BYTES {
            return Err(DrawingError::TooLarge {
                max: MAX_DRAWING_BYTES,
            });
        }
        let payload = data_url
            .strip_prefix(PNG_DATA_URL_PREFIX)
            .ok_or(DrawingError::NotPng)?;
        if payload.is_empty() {
            return Err(DrawingError::Empty);
        }
        let bytes = STANDARD
            .decode(payload)
            .map_err(|_| DrawingError::InvalidEncoding)?;
        if !bytes.starts_with(b"\x89PNG") {
            return Err(DrawingError::NotPng);
        }
        Ok(Self(data_url.to_string()))
    }

    #[must_use]
    pub fn as_data_url(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_data_url(self) -> String {
        self.0
    }
}
