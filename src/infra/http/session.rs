//! Cookie-backed operator session.
//!
//! Two cookies make up a session: `token` carries the user id and `user`
//! carries the display summary as base64url JSON. Presence of `token` is what
//! grants access; `user` only feeds the header.

use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    response::Redirect,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use tracing::debug;

use crate::domain::users::UserSession;

pub const USER_COOKIE: &str = "user";
pub const TOKEN_COOKIE: &str = "token";

pub(crate) const LOGIN_PATH: &str = "/login";

/// Signed-in operator, extracted from the session cookies.
///
/// Handlers taking this extractor redirect to the login page when no session
/// token is present.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub UserSession);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = Redirect;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        read_session(&jar)
            .map(CurrentUser)
            .ok_or_else(|| Redirect::to(LOGIN_PATH))
    }
}

/// Session stored in `jar`, if any.
pub fn read_session(jar: &CookieJar) -> Option<UserSession> {
    let token = jar
        .get(TOKEN_COOKIE)
        .map(|cookie| cookie.value().trim())
        .filter(|value| !value.is_empty())?
        .to_string();

    let stored = jar
        .get(USER_COOKIE)
        .and_then(|cookie| decode_user(cookie.value()));

    match stored {
        Some(user) if user.id == token => Some(user),
        _ => {
            debug!(
                target = "rudra::http::session",
                "user cookie missing or stale; using token only"
            );
            Some(UserSession {
                id: token,
                username: String::new(),
                email: String::new(),
            })
        }
    }
}

pub fn has_session(jar: &CookieJar) -> bool {
    jar.get(TOKEN_COOKIE)
        .is_some_and(|cookie| !cookie.value().trim().is_empty())
}

/// Store `user` in both session cookies.
pub fn start_session(jar: CookieJar, user: &UserSession, secure: bool) -> CookieJar {
    let encoded = encode_user(user);
    jar.add(session_cookie(USER_COOKIE, encoded, secure))
        .add(session_cookie(TOKEN_COOKIE, user.id.clone(), secure))
}

pub fn end_session(jar: CookieJar) -> CookieJar {
    jar.remove(Cookie::build(USER_COOKIE).path("/"))
        .remove(Cookie::build(TOKEN_COOKIE).path("/"))
}

fn session_cookie(name: &'static str, value: String, secure: bool) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .build()
}

fn encode_user(user: &UserSession) -> String {
    // Serializing three strings cannot fail.
    let json = serde_json::to_vec(user).unwrap_or_default();
    URL_SAFE_NO_PAD.encode(json)
}

fn decode_user(value: &str) -> Option<UserSession> {
    let bytes = URL_SAFE_NO_PAD.decode(value.trim()).ok()?;
    serde_json::from_slice(&bytes).ok()
}
