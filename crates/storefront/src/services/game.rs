//! Drawing game session state.
//!
//! The backend owns bonuses and history. The session keeps two things:
//! the running [`GameRound`] (the timer is enforced server-side) and the last
//! [`GameState`] seen, so the game page still renders if `/game/state` fails.

use oba_core::{GameRound, GameState};
use secrecy::SecretString;
use tower_sessions::Session;

use crate::api::ApiClient;
use crate::flash::Toast;
use crate::models::keys;

/// Game state for a page render, plus a warning to show if loading degraded.
#[derive(Debug)]
pub struct LoadedGame {
    pub state: GameState,
    pub warning: Option<Toast>,
}

/// Fetch the game state and, when needed, today's challenge.
///
/// Falls back to the session snapshot when the backend is unreachable. The
/// result is written back as the new snapshot.
pub async fn load(api: &ApiClient, session: &Session, token: &SecretString) -> LoadedGame {
    let mut state = match api.game_state(token).await {
        Ok(state) => state,
        Err(e) => {
            tracing::warn!("Failed to load game state: {e}");
            snapshot(session).await.unwrap_or_default()
        }
    };

    let mut warning = None;
    if state.daily_challenge.is_none() {
        match api.daily_challenge(token).await {
            Ok(challenge) => state.daily_challenge = challenge,
            Err(e) => {
                tracing::warn!("Failed to get daily challenge: {e}");
                warning = Some(Toast::error("Failed to load daily challenge"));
            }
        }
    }

    save_snapshot(session, &state).await;
    LoadedGame { state, warning }
}

/// Last game state seen by this session.
pub async fn snapshot(session: &Session) -> Option<GameState> {
    session.get(keys::GAME_STATE).await.ok().flatten()
}

/// Remember the game state. Failures are logged; the snapshot is a cache.
pub async fn save_snapshot(session: &Session, state: &GameState) {
    if let Err(e) = session.insert(keys::GAME_STATE, state).await {
        tracing::warn!("Failed to save game snapshot: {e}");
    }
}

/// The round in progress, if any.
pub async fn current_round(session: &Session) -> Option<GameRound> {
    session.get(keys::GAME_ROUND).await.ok().flatten()
}

/// Start timing a round.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn start_round(
    session: &Session,
    round: &GameRound,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(keys::GAME_ROUND, round).await
}

/// Stop timing the current round.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn end_round(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.remove_value(keys::GAME_ROUND).await?;
    Ok(())
}
