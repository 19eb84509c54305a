use std::sync::Arc;

use axum::extract::State;
use axum::response::{IntoResponse, Redirect, Response};
use minicursos_database::minicursos::{Minicurso, MAX_PARTICIPANTS};
use minicursos_database::models::{Participant, WorkshopParticipants};
use minicursos_database::RegistrationStore;
use serde::Serialize;
use tracing::debug;

use crate::error::AppErrorWithMetadata;
use crate::session::Session;
use crate::templating::Templates;
use crate::AdminConfig;

#[derive(Serialize)]
struct Group {
    minicurso: &'static Minicurso,
    count: usize,
    participants: Vec<Participant>,
}

#[derive(Serialize)]
struct InscritosPage {
    page_title: &'static str,
    max_participants: i64,
    groups: Vec<Group>,
}

pub async fn list(
    State(store): State<Arc<dyn RegistrationStore>>,
    State(templates): State<Arc<Templates>>,
    State(admin): State<Arc<AdminConfig>>,
    session: Session,
) -> Result<Response, AppErrorWithMetadata> {
    if !admin.public_listing && !session.is_admin() {
        debug!("listing requested without admin session");
        return Ok((session, Redirect::to("/login")).into_response());
    }

    let result = async {
        let groups = store
            .list_all()
            .await?
            .into_iter()
            .map(
                |WorkshopParticipants {
                     minicurso,
                     participants,
                 }| Group {
                    minicurso,
                    count: participants.len(),
                    participants,
                },
            )
            .collect();
        templates.render(
            &session,
            "inscritos",
            InscritosPage {
                page_title: "Inscritos",
                max_participants: MAX_PARTICIPANTS,
                groups,
            },
        )
    };
    match result.await {
        Ok(html) => Ok((session, html).into_response()),
        Err(app_error) => Err(AppErrorWithMetadata {
            templates,
            session,
            app_error,
        }),
    }
}
