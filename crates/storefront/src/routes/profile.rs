//! Profile route handlers: account details, game statistics and settings.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use oba_core::game::GameHistoryEntry;
use oba_core::user::{NotificationPreferences, PrivacyPreferences};
use oba_core::{Address, GameState, Preferences, ProfileUpdate, User};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::Result;
use crate::filters;
use crate::flash::Toast;
use crate::middleware::{PageContext, RequireAuth};
use crate::models::{CurrentUser, keys};
use crate::routes::{redirect_with, session_expired};
use crate::services;
use crate::state::AppState;

/// Number of games listed on the statistics tab.
const RECENT_GAMES: usize = 5;

/// Profile page tabs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProfileTab {
    #[default]
    Profile,
    Game,
    Settings,
}

impl ProfileTab {
    pub const ALL: [Self; 3] = [Self::Profile, Self::Game, Self::Settings];

    fn parse(value: Option<&str>) -> Self {
        match value {
            Some("game") => Self::Game,
            Some("settings") => Self::Settings,
            _ => Self::Profile,
        }
    }

    #[must_use]
    pub const fn value(self) -> &'static str {
        match self {
            Self::Profile => "profile",
            Self::Game => "game",
            Self::Settings => "settings",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Profile => "Profile",
            Self::Game => "Game Stats",
            Self::Settings => "Settings",
        }
    }
}

/// Tab selection.
#[derive(Debug, Deserialize)]
pub struct TabQuery {
    pub tab: Option<String>,
}

/// Profile form data.
#[derive(Debug, Deserialize)]
pub struct ProfileForm {
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub street: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub zip_code: String,
}

impl From<ProfileForm> for ProfileUpdate {
    fn from(form: ProfileForm) -> Self {
        Self {
            name: form.name,
            phone: Some(form.phone),
            address: Address {
                street: form.street,
                city: form.city,
                zip_code: form.zip_code,
            },
        }
        .normalized()
    }
}

/// Settings form data. Unchecked boxes are simply absent.
#[derive(Debug, Default, Deserialize)]
pub struct SettingsForm {
    pub email_notifications: Option<String>,
    pub push_notifications: Option<String>,
    pub sms_notifications: Option<String>,
    pub ai_recommendations: Option<String>,
    pub share_game_stats: Option<String>,
}

impl From<SettingsForm> for Preferences {
    fn from(form: SettingsForm) -> Self {
        Self {
            notifications: NotificationPreferences {
                email: form.email_notifications.is_some(),
                push: form.push_notifications.is_some(),
                sms: form.sms_notifications.is_some(),
            },
            privacy: PrivacyPreferences {
                ai_recommendations: form.ai_recommendations.is_some(),
                share_game_stats: form.share_game_stats.is_some(),
            },
        }
    }
}

/// Profile page template.
#[derive(Template, WebTemplate)]
#[template(path = "profile/show.html")]
pub struct ProfileTemplate {
    pub ctx: PageContext,
    pub user: User,
    pub tab: ProfileTab,
    pub tabs: [ProfileTab; 3],
    pub game: Option<GameState>,
    pub recent_games: Vec<GameHistoryEntry>,
}

/// Display the profile page.
///
/// The account is refreshed from the backend when possible so edits made
/// elsewhere show up; the session copy is used otherwise. A rejected token
/// signs the visitor out.
#[instrument(skip_all)]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(mut current): RequireAuth,
    Query(query): Query<TabQuery>,
    ctx: PageContext,
) -> Result<Response> {
    let token = current.token();

    match state.api().me(&token).await {
        Ok(user) if user != current.user => {
            current.user = user;
            remember_user(&session, &current).await;
        }
        Ok(_) => {}
        Err(e) if e.is_unauthorized() => {
            return Ok(session_expired(&session, "/profile").await?.into_response());
        }
        Err(e) => tracing::warn!("Failed to refresh profile: {e}"),
    }

    let tab = ProfileTab::parse(query.tab.as_deref());
    let game = if tab == ProfileTab::Game {
        Some(services::game::load(state.api(), &session, &token).await.state)
    } else {
        None
    };
    let recent_games = game
        .as_ref()
        .map(|game| game.recent_games(RECENT_GAMES).into_iter().cloned().collect())
        .unwrap_or_default();

    Ok(ProfileTemplate {
        ctx,
        user: current.user,
        tab,
        tabs: ProfileTab::ALL,
        game,
        recent_games,
    }
    .into_response())
}

/// Save profile details.
#[instrument(skip_all)]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(mut current): RequireAuth,
    Form(form): Form<ProfileForm>,
) -> Result<Redirect> {
    let update = ProfileUpdate::from(form);
    if let Err(e) = update.validate() {
        return redirect_with(&session, Toast::error(e.to_string()), "/profile").await;
    }

    let toast = match state.api().update_profile(&current.token(), &update).await {
        Ok(user) => {
            current.user = user;
            remember_user(&session, &current).await;
            Toast::success("Profile updated successfully!")
        }
        Err(e) if e.is_unauthorized() => return session_expired(&session, "/profile").await,
        Err(e) => {
            tracing::warn!("Failed to update profile: {e}");
            Toast::error("Failed to update profile")
        }
    };

    redirect_with(&session, toast, "/profile").await
}

/// Save notification and privacy settings.
#[instrument(skip_all)]
pub async fn update_settings(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(mut current): RequireAuth,
    Form(form): Form<SettingsForm>,
) -> Result<Redirect> {
    let preferences = Preferences::from(form);

    let toast = match state
        .api()
        .update_preferences(&current.token(), preferences)
        .await
    {
        Ok(user) => {
            current.user = user;
            remember_user(&session, &current).await;
            Toast::success("Settings saved successfully!")
        }
        Err(e) if e.is_unauthorized() => {
            return session_expired(&session, "/profile?tab=settings").await;
        }
        Err(e) => {
            tracing::warn!("Failed to save settings: {e}");
            Toast::error("Failed to save settings")
        }
    };

    redirect_with(&session, toast, "/profile?tab=settings").await
}

/// Replace the session copy of the account.
async fn remember_user(session: &Session, current: &CurrentUser) {
    if let Err(e) = session.insert(keys::CURRENT_USER, current).await {
        tracing::warn!("Failed to update session user: {e}");
    }
}
