use axum_extra::extract::cookie::{Cookie, SignedCookieJar};
use serde::{Deserialize, Serialize};

const COOKIE_NAME: &str = "flash";

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Success,
    Error,
}

/// One-shot notice carried across a redirect in a signed cookie.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Flash {
    pub level: Level,
    pub message: String,
}

pub fn set(jar: SignedCookieJar, level: Level, message: impl Into<String>) -> SignedCookieJar {
    let flash = Flash { level, message: message.into() };
    let value = serde_json::to_string(&flash).unwrap_or_default();
    jar.add(Cookie::build((COOKIE_NAME, value)).path("/").http_only(true).build())
}

/// Reads and clears the pending notice, if any.
pub fn take(jar: SignedCookieJar) -> (SignedCookieJar, Option<Flash>) {
    let flash = jar.get(COOKIE_NAME).and_then(|c| serde_json::from_str(c.value()).ok());
    let jar = jar.remove(Cookie::build(COOKIE_NAME).path("/").build());
    (jar, flash)
}
