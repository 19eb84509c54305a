use std::sync::Arc;

use axum::extract::{FromRequest, Request};
use axum::{async_trait, Form, RequestExt as _};
use serde::de::DeserializeOwned;

use crate::error::{AppError, AppErrorWithMetadata};
use crate::session::Session;
use crate::AppState;

pub trait CsrfToken {
    fn csrf_token(&self) -> &str;
}

/// A form that is only accepted when its `csrf_token` field matches the token
/// of the session cookie. Carries the session so handlers don't extract it twice.
pub struct CsrfSafeForm<T: CsrfToken> {
    pub session: Session,
    pub value: T,
}

#[async_trait]
impl<T> FromRequest<AppState> for CsrfSafeForm<T>
where
    T: DeserializeOwned + CsrfToken + Send,
{
    type Rejection = AppErrorWithMetadata;

    async fn from_request(mut req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        let session = match req.extract_parts_with_state::<Session, AppState>(state).await {
            Ok(session) => session,
            Err(infallible) => match infallible {},
        };

        let result = async {
            let Form(value) = Form::<T>::from_request(req, state).await?;
            if !constant_time_eq(
                value.csrf_token().as_bytes(),
                session.csrf_token().as_bytes(),
            ) {
                return Err(AppError::WrongCsrfToken);
            }
            Ok(value)
        };
        match result.await {
            Ok(value) => Ok(Self { session, value }),
            Err(app_error) => Err(AppErrorWithMetadata {
                templates: Arc::clone(&state.templates),
                session,
                app_error,
            }),
        }
    }
}

#[must_use]
pub fn constant_time_eq(left: &[u8], right: &[u8]) -> bool {
    left.len() == right.len()
        && left
            .iter()
            .zip(right)
            .fold(0, |difference, (left, right)| difference | (left ^ right))
            == 0
}
