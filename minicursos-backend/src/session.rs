use core::convert::Infallible;

use axum::async_trait;
use axum::extract::{FromRef, FromRequestParts};
use axum::response::{IntoResponseParts, ResponseParts};
use axum_extra::extract::cookie::{Cookie, CookieJar, Key, SameSite};
use axum_extra::extract::PrivateCookieJar;
use http::request::Parts;
use rand::{thread_rng, Rng as _};
use tracing::debug;

const COOKIE_NAME_CSRF_TOKEN: &str = "__Host_csrf_token";
const COOKIE_NAME_ADMIN_SESSION: &str = "__Host_admin_session";

const CSRF_TOKEN_LENGTH: usize = 30;

/// Cookies of the current request. Changes are written back when the session
/// is part of the response.
#[derive(Clone)]
#[must_use]
pub struct Session {
    cookies: CookieJar,
    /// encrypted with the server key, so its content can be trusted
    private_cookies: PrivateCookieJar,
    csrf_token: String,
}

fn cookie(name: &'static str, value: String) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

fn is_valid_csrf_token(value: &str) -> bool {
    value.len() == CSRF_TOKEN_LENGTH && value.chars().all(|c| c.is_ascii_alphanumeric())
}

impl Session {
    pub fn new(cookies: CookieJar, private_cookies: PrivateCookieJar) -> Self {
        match cookies
            .get(COOKIE_NAME_CSRF_TOKEN)
            .map(|cookie| cookie.value().to_owned())
            .filter(|value| is_valid_csrf_token(value))
        {
            Some(csrf_token) => Self {
                cookies,
                private_cookies,
                csrf_token,
            },
            None => {
                let csrf_token: String = thread_rng()
                    .sample_iter(&rand::distributions::Alphanumeric)
                    .take(CSRF_TOKEN_LENGTH)
                    .map(char::from)
                    .collect();
                debug!("issuing new csrf token");
                Self {
                    cookies: cookies.add(cookie(COOKIE_NAME_CSRF_TOKEN, csrf_token.clone())),
                    private_cookies,
                    csrf_token,
                }
            }
        }
    }

    #[must_use]
    pub fn csrf_token(&self) -> &str {
        &self.csrf_token
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.private_cookies.get(COOKIE_NAME_ADMIN_SESSION).is_some()
    }

    pub fn with_admin(self) -> Self {
        Self {
            private_cookies: self
                .private_cookies
                .add(cookie(COOKIE_NAME_ADMIN_SESSION, "admin".to_owned())),
            ..self
        }
    }

    pub fn without_admin(self) -> Self {
        Self {
            private_cookies: self
                .private_cookies
                .remove(Cookie::build(COOKIE_NAME_ADMIN_SESSION).path("/")),
            ..self
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
    Key: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::new(
            CookieJar::from_headers(&parts.headers),
            PrivateCookieJar::from_headers(&parts.headers, Key::from_ref(state)),
        ))
    }
}

impl IntoResponseParts for Session {
    type Error = Infallible;

    fn into_response_parts(self, res: ResponseParts) -> Result<ResponseParts, Self::Error> {
        let res = self.cookies.into_response_parts(res)?;
        self.private_cookies.into_response_parts(res)
    }
}
