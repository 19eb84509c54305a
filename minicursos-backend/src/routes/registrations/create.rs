use std::sync::Arc;

use axum::extract::State;
use axum::response::{IntoResponse, Redirect, Response};
use minicursos_database::minicursos::MAX_PARTICIPANTS;
use minicursos_database::RegistrationStore;
use tracing::{info, warn};

use crate::error::{AppError, AppErrorWithMetadata};
use crate::form::{FieldErrors, ParticipantForm};
use crate::routes::index::render_index;
use crate::templating::Templates;
use crate::{AdmissionLock, CsrfSafeForm};

pub const CAPACITY_REACHED: &str = "máximo de participantes atingido, escolha outro minicurso.";

pub async fn create(
    State(store): State<Arc<dyn RegistrationStore>>,
    State(templates): State<Arc<Templates>>,
    State(admission): State<AdmissionLock>,
    CsrfSafeForm {
        session,
        value: form,
    }: CsrfSafeForm<ParticipantForm>,
) -> Result<Response, AppErrorWithMetadata> {
    let result = async {
        let participant = match form.validate() {
            Ok(participant) => participant,
            Err(errors) => {
                let counts = store.count_all().await?;
                return Ok(
                    render_index(&templates, &session, counts, &form, &errors, None)?
                        .into_response(),
                );
            }
        };

        // count and insert must not interleave with another registration
        let _admission = admission.lock().await;

        let counts = store.count_all().await?;
        let full = counts
            .iter()
            .find(|entry| entry.minicurso.index == participant.minicurso)
            .is_some_and(|entry| entry.count >= MAX_PARTICIPANTS);
        if full {
            warn!(
                minicurso = participant.minicurso,
                "rejected registration, minicurso is full"
            );
            return Ok(render_index(
                &templates,
                &session,
                counts,
                &form,
                &FieldErrors::default(),
                Some(CAPACITY_REACHED),
            )?
            .into_response());
        }

        let minicurso = participant.minicurso;
        store.add_participant(participant).await?;
        info!(minicurso, "accepted registration");
        Ok::<_, AppError>(Redirect::to("/sucesso").into_response())
    };
    match result.await {
        Ok(response) => Ok((session, response).into_response()),
        Err(app_error) => Err(AppErrorWithMetadata {
            templates,
            session,
            app_error,
        }),
    }
}
