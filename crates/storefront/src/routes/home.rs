//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use oba_core::{Category, Product};
use tracing::instrument;

use crate::filters;
use crate::middleware::{OptionalAuth, PageContext};
use crate::state::AppState;

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub ctx: PageContext,
    pub categories: [Category; 10],
    pub featured: Vec<Product>,
    pub recommendations: Vec<Product>,
}

/// Display the home page.
///
/// Recommendations are only requested once featured products loaded, and
/// never for users who switched AI recommendations off.
#[instrument(skip_all)]
pub async fn home(
    State(state): State<AppState>,
    OptionalAuth(current): OptionalAuth,
    ctx: PageContext,
) -> impl IntoResponse {
    let featured = match state.api().featured_products().await {
        Ok(products) => products,
        Err(e) => {
            tracing::warn!("Failed to load featured products: {e}");
            Vec::new()
        }
    };

    let wants_recommendations = current
        .as_ref()
        .is_none_or(|current| current.user.preferences.privacy.ai_recommendations);

    let recommendations = if !featured.is_empty() && wants_recommendations {
        let token = current.as_ref().map(crate::models::CurrentUser::token);
        match state.api().ai_recommendations(token.as_ref()).await {
            Ok(products) => products,
            Err(e) => {
                tracing::warn!("Failed to load recommendations: {e}");
                Vec::new()
            }
        }
    } else {
        Vec::new()
    };

    HomeTemplate {
        ctx,
        categories: Category::ALL,
        featured,
        recommendations,
    }
}
