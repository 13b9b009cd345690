use axum_extra::extract::cookie::{Cookie, Key, SameSite, SignedCookieJar};
use constant_time_eq::constant_time_eq;
use rand::{Rng, distr::Alphanumeric, rng};
use sha2::{Digest, Sha256};

pub const COOKIE_NAME: &str = "csrf_token";

const TOKEN_LEN: usize = 32;

/// Builds the cookie signing key from `SECRET_KEY`. Keys of 64+ bytes are used
/// directly; shorter ones are hashed to 32 bytes and stretched.
pub fn cookie_key(secret: Option<&str>) -> Key {
    match secret {
        None => {
            tracing::warn!("no SECRET_KEY provided, form tokens will not survive a restart");
            Key::generate()
        },
        Some(s) if s.len() >= 64 => Key::from(s.as_bytes()),
        Some(s) => Key::derive_from(&Sha256::digest(s.as_bytes())),
    }
}

/// Returns the token already held by the browser, or sets a fresh one.
pub fn issue(jar: SignedCookieJar) -> (SignedCookieJar, String) {
    if let Some(token) = jar.get(COOKIE_NAME).map(|c| c.value().to_string()) {
        return (jar, token);
    }

    let token: String = rng().sample_iter(&Alphanumeric).take(TOKEN_LEN).map(char::from).collect();
    let cookie = Cookie::build((COOKIE_NAME, token.clone()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::hours(12));
    (jar.add(cookie), token)
}

pub fn verify(jar: &SignedCookieJar, submitted: &str) -> bool {
    match jar.get(COOKIE_NAME) {
        Some(cookie) => {
            !submitted.is_empty()
                && constant_time_eq(cookie.value().as_bytes(), submitted.as_bytes())
        },
        None => false,
    }
}
