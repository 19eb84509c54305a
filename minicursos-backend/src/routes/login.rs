use std::sync::Arc;

use axum::extract::State;
use axum::response::{Html, IntoResponse, Redirect, Response};
use serde::Serialize;
use sha2::{Digest as _, Sha256};
use tracing::{info, warn};

use crate::csrf_protection::constant_time_eq;
use crate::error::{AppError, AppErrorWithMetadata};
use crate::form::{LoginForm, REQUIRED};
use crate::session::Session;
use crate::templating::Templates;
use crate::{AdminConfig, CsrfSafeForm};

pub const WRONG_PASSWORD: &str = "Senha incorreta.";

#[derive(Serialize)]
struct LoginPage {
    page_title: &'static str,
    password_error: Option<&'static str>,
    message: Option<&'static str>,
}

fn render_login(
    templates: &Templates,
    session: &Session,
    password_error: Option<&'static str>,
    message: Option<&'static str>,
) -> Result<Html<String>, AppError> {
    templates.render(
        session,
        "login",
        LoginPage {
            page_title: "Administração",
            password_error,
            message,
        },
    )
}

/// Hashing first makes the comparison independent of the password length.
fn password_matches(expected: &str, actual: &str) -> bool {
    constant_time_eq(
        &Sha256::digest(expected.as_bytes()),
        &Sha256::digest(actual.as_bytes()),
    )
}

pub async fn login_page(
    State(templates): State<Arc<Templates>>,
    session: Session,
) -> Result<(Session, Html<String>), AppErrorWithMetadata> {
    match render_login(&templates, &session, None, None) {
        Ok(html) => Ok((session, html)),
        Err(app_error) => Err(AppErrorWithMetadata {
            templates,
            session,
            app_error,
        }),
    }
}

pub async fn login(
    State(templates): State<Arc<Templates>>,
    State(admin): State<Arc<AdminConfig>>,
    CsrfSafeForm {
        session,
        value: form,
    }: CsrfSafeForm<LoginForm>,
) -> Result<Response, AppErrorWithMetadata> {
    let rendered = if form.password.is_empty() {
        render_login(&templates, &session, Some(REQUIRED), None)
    } else if password_matches(&admin.password, &form.password) {
        info!("admin logged in");
        return Ok((session.with_admin(), Redirect::to("/inscritos")).into_response());
    } else {
        warn!("admin login with wrong password");
        render_login(&templates, &session, None, Some(WRONG_PASSWORD))
    };
    match rendered {
        Ok(html) => Ok((session, html).into_response()),
        Err(app_error) => Err(AppErrorWithMetadata {
            templates,
            session,
            app_error,
        }),
    }
}
