use std::sync::Arc;

use axum::extract::State;

use crate::error::{AppError, AppErrorWithMetadata};
use crate::session::Session;
use crate::templating::Templates;

pub async fn not_found(
    State(templates): State<Arc<Templates>>,
    session: Session,
) -> AppErrorWithMetadata {
    AppErrorWithMetadata {
        templates,
        session,
        app_error: AppError::NotFound,
    }
}
