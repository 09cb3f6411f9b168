//! Daily drawing challenge route handlers.
//!
//! The round clock lives in the session. The page hands the remaining
//! seconds to `game.js`, which counts down and submits the canvas at 0:00;
//! submissions arriving after the deadline (plus a short grace) are refused.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect},
};
use chrono::Utc;
use oba_core::game::{
    CANVAS_SIZE, CONVERSION_TIERS, DEFAULT_BRUSH_SIZE, MAX_BRUSH_SIZE, MIN_BRUSH_SIZE, PALETTE,
    format_clock,
};
use oba_core::{DailyChallenge, Drawing, GameRound, GameState};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::api::ApiClient;
use crate::api::types::SubmitDrawingRequest;
use crate::error::Result;
use crate::filters;
use crate::flash::Toast;
use crate::middleware::{PageContext, RequireAuth};
use crate::models::CurrentUser;
use crate::routes::{redirect_with, session_expired};
use crate::services;
use crate::state::AppState;

/// Submit drawing form data.
#[derive(Debug, Deserialize)]
pub struct SubmitForm {
    pub drawing_data: String,
}

/// Convert bonuses form data.
#[derive(Debug, Deserialize)]
pub struct ConvertForm {
    pub bonus_amount: u32,
}

/// Clock state of a running round.
#[derive(Debug, Clone)]
pub struct RoundView {
    pub remaining: i64,
    pub clock: String,
}

/// A bonus conversion tier button.
#[derive(Debug, Clone, Copy)]
pub struct TierView {
    pub bonuses: u32,
    pub discount: u32,
    pub affordable: bool,
}

/// Game page template.
#[derive(Template, WebTemplate)]
#[template(path = "game/show.html")]
pub struct GameTemplate {
    pub ctx: PageContext,
    pub game: GameState,
    pub round: Option<RoundView>,
    pub tiers: Vec<TierView>,
    pub palette: [&'static str; 12],
    pub canvas_size: u32,
    pub min_brush: u32,
    pub max_brush: u32,
    pub default_brush: u32,
}

fn tiers(bonuses: u32) -> Vec<TierView> {
    CONVERSION_TIERS
        .iter()
        .map(|&(amount, discount)| TierView {
            bonuses: amount,
            discount,
            affordable: bonuses >= amount,
        })
        .collect()
}

/// The session's game state, fetching it when there is no snapshot yet.
async fn current_state(api: &ApiClient, session: &Session, current: &CurrentUser) -> GameState {
    match services::game::snapshot(session).await {
        Some(state) => state,
        None => services::game::load(api, session, &current.token()).await.state,
    }
}

/// Display the game page.
#[instrument(skip_all)]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(current): RequireAuth,
    mut ctx: PageContext,
) -> Result<impl IntoResponse> {
    let loaded = services::game::load(state.api(), &session, &current.token()).await;
    if let Some(warning) = loaded.warning {
        ctx.push(warning);
    }
    let game = loaded.state;
    ctx.bonuses = game.user_bonuses;

    let now = Utc::now();
    let round = match services::game::current_round(&session).await {
        Some(round)
            if round.accepts_submission(now)
                && game
                    .daily_challenge
                    .as_ref()
                    .is_some_and(|challenge| round.matches(challenge)) =>
        {
            let remaining = round.remaining(now);
            Some(RoundView {
                remaining,
                clock: format_clock(remaining),
            })
        }
        Some(_) => {
            services::game::end_round(&session).await?;
            None
        }
        None => None,
    };

    Ok(GameTemplate {
        ctx,
        tiers: tiers(game.user_bonuses),
        game,
        round,
        palette: PALETTE,
        canvas_size: CANVAS_SIZE,
        min_brush: MIN_BRUSH_SIZE,
        max_brush: MAX_BRUSH_SIZE,
        default_brush: DEFAULT_BRUSH_SIZE,
    })
}

/// Start a drawing round for today's challenge.
#[instrument(skip_all)]
pub async fn start(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(current): RequireAuth,
) -> Result<Redirect> {
    let game = current_state(state.api(), &session, &current).await;

    let Some(challenge) = game.daily_challenge.as_ref() else {
        return redirect_with(&session, Toast::error("No daily challenge available"), "/game").await;
    };
    if !game.can_play_today {
        return redirect_with(
            &session,
            Toast::error("You have already played today"),
            "/game",
        )
        .await;
    }

    services::game::start_round(&session, &GameRound::start(challenge, Utc::now())).await?;
    tracing::info!(challenge = %challenge.id, "Game round started");

    redirect_with(
        &session,
        Toast::info("Game started! You have 5 minutes to draw the product."),
        "/game",
    )
    .await
}

/// Submit the canvas for scoring.
#[instrument(skip_all)]
pub async fn submit(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(current): RequireAuth,
    Form(form): Form<SubmitForm>,
) -> Result<Redirect> {
    let Some(round) = services::game::current_round(&session).await else {
        return redirect_with(&session, Toast::error("No game in progress"), "/game").await;
    };

    let now = Utc::now();
    if !round.accepts_submission(now) {
        services::game::end_round(&session).await?;
        return redirect_with(&session, Toast::error("Time is up! The round has ended."), "/game")
            .await;
    }

    let drawing = match Drawing::parse(&form.drawing_data) {
        Ok(drawing) => drawing,
        Err(e) => {
            tracing::warn!("Rejected drawing: {e}");
            return redirect_with(&session, Toast::error("Failed to submit drawing"), "/game")
                .await;
        }
    };

    let mut game = current_state(state.api(), &session, &current).await;
    let challenge = game
        .daily_challenge
        .clone()
        .filter(|challenge| round.matches(challenge))
        .unwrap_or_else(|| DailyChallenge {
            id: round.challenge_id.clone(),
            product_id: round.product_id.clone(),
            product_name: String::new(),
            product_image: None,
            product_description: String::new(),
        });

    let request = SubmitDrawingRequest {
        drawing_data: drawing.into_data_url(),
        product_id: round.product_id.clone(),
        challenge_id: round.challenge_id.clone(),
    };

    let toast = match state.api().submit_drawing(&current.token(), &request).await {
        Ok(outcome) if outcome.success => {
            game.apply_submission(&outcome, &challenge, now);
            services::game::save_snapshot(&session, &game).await;
            services::game::end_round(&session).await?;
            Toast::success(format!(
                "Great job! You earned {} bonuses!",
                outcome.bonus_earned
            ))
        }
        Ok(_) => Toast::error("Drawing not recognized. Try again!"),
        Err(e) if e.is_unauthorized() => return session_expired(&session, "/game").await,
        Err(e) => {
            tracing::warn!("Failed to submit drawing: {e}");
            Toast::error("Failed to submit drawing")
        }
    };

    redirect_with(&session, toast, "/game").await
}

/// Convert bonuses into a discount code.
#[instrument(skip_all)]
pub async fn convert(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(current): RequireAuth,
    Form(form): Form<ConvertForm>,
) -> Result<Redirect> {
    let mut game = current_state(state.api(), &session, &current).await;

    if let Err(e) = game.validate_conversion(form.bonus_amount) {
        return redirect_with(&session, Toast::error(e.to_string()), "/game").await;
    }

    match state
        .api()
        .convert_bonuses(&current.token(), form.bonus_amount)
        .await
    {
        Ok(conversion) => {
            game.apply_conversion(form.bonus_amount);
            services::game::save_snapshot(&session, &game).await;
            crate::flash::push(
                &session,
                Toast::success(format!(
                    "Converted {} bonuses to {}% discount!",
                    form.bonus_amount, conversion.discount_amount
                )),
            )
            .await?;
            redirect_with(
                &session,
                Toast::info(format!("Your discount code: {}", conversion.discount_code)),
                "/game",
            )
            .await
        }
        Err(e) if e.is_unauthorized() => session_expired(&session, "/game").await,
        Err(e) => {
            tracing::warn!("Failed to convert bonuses: {e}");
            redirect_with(&session, Toast::error("Failed to convert bonuses"), "/game").await
        }
    }
}

/// Forget today's challenge and fetch it again.
#[instrument(skip_all)]
pub async fn refresh(session: Session, RequireAuth(_current): RequireAuth) -> Result<Redirect> {
    if let Some(mut game) = services::game::snapshot(&session).await {
        game.reset_daily();
        services::game::save_snapshot(&session, &game).await;
    }
    services::game::end_round(&session).await?;
    Ok(Redirect::to("/game"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tiers_mark_affordable() {
        let tiers = tiers(120);
        let affordable: Vec<bool> = tiers.iter().map(|tier| tier.affordable).collect();
        assert_eq!(affordable, vec![true, true, false]);
        assert_eq!(tiers.first().map(|tier| tier.discount), Some(5));
    }
}
