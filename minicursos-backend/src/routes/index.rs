use std::sync::Arc;

use axum::extract::State;
use axum::response::Html;
use minicursos_database::minicursos::MAX_PARTICIPANTS;
use minicursos_database::models::WorkshopCount;
use minicursos_database::RegistrationStore;
use serde::Serialize;

use crate::error::{AppError, AppErrorWithMetadata};
use crate::form::{FieldErrors, ParticipantForm};
use crate::session::Session;
use crate::templating::Templates;

#[derive(Serialize)]
struct MinicursoRow {
    index: i32,
    title: &'static str,
    count: i64,
    full: bool,
    selected: bool,
}

#[derive(Serialize)]
struct IndexPage<'a> {
    page_title: &'static str,
    minicursos: Vec<MinicursoRow>,
    max_participants: i64,
    form: &'a ParticipantForm,
    errors: &'a FieldErrors,
    message: Option<&'static str>,
}

/// The registration form together with the current number of registrations.
pub fn render_index(
    templates: &Templates,
    session: &Session,
    counts: Vec<WorkshopCount>,
    form: &ParticipantForm,
    errors: &FieldErrors,
    message: Option<&'static str>,
) -> Result<Html<String>, AppError> {
    let selected = form.selected_minicurso();
    let minicursos = counts
        .into_iter()
        .map(|WorkshopCount { minicurso, count }| MinicursoRow {
            index: minicurso.index,
            title: minicurso.title,
            count,
            full: count >= MAX_PARTICIPANTS,
            selected: selected == Some(minicurso.index),
        })
        .collect();
    templates.render(
        session,
        "index",
        IndexPage {
            page_title: "Inscrição",
            minicursos,
            max_participants: MAX_PARTICIPANTS,
            form,
            errors,
            message,
        },
    )
}

pub async fn index(
    State(store): State<Arc<dyn RegistrationStore>>,
    State(templates): State<Arc<Templates>>,
    session: Session,
) -> Result<(Session, Html<String>), AppErrorWithMetadata> {
    let result = async {
        let counts = store.count_all().await?;
        render_index(
            &templates,
            &session,
            counts,
            &ParticipantForm::default(),
            &FieldErrors::default(),
            None,
        )
    };
    match result.await {
        Ok(html) => Ok((session, html)),
        Err(app_error) => Err(AppErrorWithMetadata {
            templates,
            session,
            app_error,
        }),
    }
}
