//! Visitor preferences: interface language (kept in the session) and the
//! once-per-browsing-session welcome banner (kept in a cookie without
//! `Max-Age`, so it is dropped when the browser closes).

use axum::{
    Json,
    extract::State,
    http::{HeaderMap, header},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tower_sessions::Session;
use tower_sessions::cookie::{Cookie, SameSite};
use tracing::{debug, instrument};

use teslix_core::Locale;

use crate::error::{AppError, Result};
use crate::models::session::keys;
use crate::state::AppState;

/// Cookie recording that the welcome banner was shown.
pub const WELCOME_COOKIE_NAME: &str = "teslix_welcome_shown";

/// Language preference body.
#[derive(Debug, Serialize, Deserialize)]
pub struct LanguagePref {
    pub lang: String,
}

/// The visitor's language, defaulting to Russian when unset or unreadable.
pub async fn current_locale(session: &Session) -> Locale {
    session
        .get::<Locale>(keys::LANG)
        .await
        .ok()
        .flatten()
        .unwrap_or_default()
}

/// Current language.
pub async fn language(session: Session) -> Json<Value> {
    let locale = current_locale(&session).await;
    Json(json!({ "lang": locale }))
}

/// Store a new language. Unsupported values are ignored and the current
/// language is returned unchanged.
#[instrument(skip(session))]
pub async fn set_language(session: Session, Json(body): Json<LanguagePref>) -> Result<Json<Value>> {
    match body.lang.parse::<Locale>() {
        Ok(locale) => {
            session
                .insert(keys::LANG, locale)
                .await
                .map_err(|e| AppError::Internal(format!("Failed to store language: {e}")))?;
        }
        Err(e) => debug!(error = %e, "Ignoring language preference"),
    }

    Ok(language(session).await)
}

/// Whether to show the welcome banner: true once per browsing session.
///
/// The first call answers `true` and sets a session cookie; later calls from
/// the same browser session see the cookie and answer `false`.
pub async fn welcome(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if welcome_shown(&headers) {
        return Json(json!({ "show": false })).into_response();
    }

    let cookie = welcome_cookie(state.config().is_secure());
    (
        [(header::SET_COOKIE, cookie.to_string())],
        Json(json!({ "show": true })),
    )
        .into_response()
}

fn welcome_shown(headers: &HeaderMap) -> bool {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(std::result::Result::ok)
        .any(|cookie| cookie.name() == WELCOME_COOKIE_NAME)
}

/// Session-scoped cookie: no `Max-Age` or `Expires`.
fn welcome_cookie(secure: bool) -> Cookie<'static> {
    Cookie::build((WELCOME_COOKIE_NAME, "1"))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .build()
}
