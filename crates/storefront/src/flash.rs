//! Toast notifications carried across redirects.
//!
//! A handler queues a [`Toast`] in the session and redirects; the next page
//! rendered drains the queue through the page context.

use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use crate::models::keys;

/// Toast severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastKind {
    Success,
    Error,
    Info,
}

impl ToastKind {
    /// CSS modifier class.
    #[must_use]
    pub const fn class(self) -> &'static str {
        match self {
            Self::Success => "toast--success",
            Self::Error => "toast--error",
            Self::Info => "toast--info",
        }
    }

    /// How long the toast stays on screen, in milliseconds.
    #[must_use]
    pub const fn duration_ms(self) -> u32 {
        match self {
            Self::Success => 3000,
            Self::Error => 5000,
            Self::Info => 4000,
        }
    }
}

/// A transient notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toast {
    pub kind: ToastKind,
    pub message: String,
}

impl Toast {
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: ToastKind::Success,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: ToastKind::Error,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: ToastKind::Info,
            message: message.into(),
        }
    }
}

/// Queue a toast for the next rendered page.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn push(session: &Session, toast: Toast) -> Result<(), tower_sessions::session::Error> {
    let mut queued: Vec<Toast> = session
        .get(keys::TOASTS)
        .await
        .ok()
        .flatten()
        .unwrap_or_default();
    queued.push(toast);
    session.insert(keys::TOASTS, queued).await
}

/// Remove and return all queued toasts.
pub async fn drain(session: &Session) -> Vec<Toast> {
    match session.remove::<Vec<Toast>>(keys::TOASTS).await {
        Ok(toasts) => toasts.unwrap_or_default(),
        Err(e) => {
            tracing::warn!("Discarding unreadable toasts: {e}");
            if let Err(e) = session.remove_value(keys::TOASTS).await {
                tracing::error!("Failed to remove unreadable toasts: {e}");
            }
            Vec::new()
        }
    }
}
