use std::sync::Arc;

use axum::extract::rejection::FormRejection;
use axum::response::{IntoResponse, Response};
use http::StatusCode;
use minicursos_config::ConfigError;
use minicursos_database::error::DatabaseError;
use serde::Serialize;
use tracing::{error, warn};

use crate::session::Session;
use crate::templating::Templates;

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("IO error: {0}")]
    File(#[from] std::io::Error),
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("database error: {0}")]
    Database(#[from] DatabaseError),
    #[error("template error: {0}")]
    Template(#[from] Box<handlebars::TemplateError>),
    #[error("render error: {0}")]
    Render(#[from] Box<handlebars::RenderError>),
    #[error("form submission error: {0}")]
    FormRejection(#[from] FormRejection),
    #[error("wrong csrf token")]
    WrongCsrfToken,
    #[error("not found")]
    NotFound,
}

impl AppError {
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::FormRejection(rejection) => rejection.status(),
            Self::WrongCsrfToken => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::File(_)
            | Self::Config(_)
            | Self::Database(_)
            | Self::Template(_)
            | Self::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// What the visitor gets to see. Internal details only go to the log.
    #[must_use]
    pub const fn public_message(&self) -> &'static str {
        match self {
            Self::FormRejection(_) => "O formulário enviado é inválido.",
            Self::WrongCsrfToken => {
                "Sua sessão expirou. Recarregue a página e envie o formulário novamente."
            }
            Self::NotFound => "Página não encontrada.",
            Self::File(_)
            | Self::Config(_)
            | Self::Database(_)
            | Self::Template(_)
            | Self::Render(_) => "Ocorreu um erro interno. Tente novamente mais tarde.",
        }
    }
}

#[derive(Serialize)]
struct ErrorPage {
    page_title: &'static str,
    error: &'static str,
}

/// An [`AppError`] together with what is needed to render the error page.
pub struct AppErrorWithMetadata {
    pub templates: Arc<Templates>,
    pub session: Session,
    pub app_error: AppError,
}

impl IntoResponse for AppErrorWithMetadata {
    fn into_response(self) -> Response {
        let status = self.app_error.status_code();
        if status.is_server_error() {
            error!(error = %self.app_error, "request failed");
        } else {
            warn!(error = %self.app_error, %status, "request rejected");
        }
        let page_title = status.canonical_reason().unwrap_or("Error");
        let error = self.app_error.public_message();
        match self.templates.render(
            &self.session,
            "error",
            ErrorPage { page_title, error },
        ) {
            Ok(html) => (status, self.session, html).into_response(),
            Err(render_error) => {
                error!(error = %render_error, "failed to render error page");
                (status, self.session, error).into_response()
            }
        }
    }
}
