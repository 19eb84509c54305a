use std::sync::Arc;

use axum::extract::State;
use axum::response::Html;
use serde::Serialize;

use crate::error::AppErrorWithMetadata;
use crate::session::Session;
use crate::templating::Templates;

#[derive(Serialize)]
struct SucessoPage {
    page_title: &'static str,
}

pub async fn sucesso(
    State(templates): State<Arc<Templates>>,
    session: Session,
) -> Result<(Session, Html<String>), AppErrorWithMetadata> {
    match templates.render(
        &session,
        "sucesso",
        SucessoPage {
            page_title: "Inscrição realizada",
        },
    ) {
        Ok(html) => Ok((session, html)),
        Err(app_error) => Err(AppErrorWithMetadata {
            templates,
            session,
            app_error,
        }),
    }
}
