use axum::response::{IntoResponse, Redirect};

use crate::form::LogoutForm;
use crate::CsrfSafeForm;

pub async fn logout(
    CsrfSafeForm { session, value: _ }: CsrfSafeForm<LogoutForm>,
) -> impl IntoResponse {
    (session.without_admin(), Redirect::to("/login"))
}
