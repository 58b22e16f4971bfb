use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde_json::json;

use super::domain::ContactSubmission;
use super::gateway::{MailTransport, TokenProvider};
use super::relay::{ContactError, ContactRelay};

pub const DELIVERED_MESSAGE: &str = "Nachricht erfolgreich gesendet";

pub fn contact_router<T, M>(relay: Arc<ContactRelay<T, M>>) -> Router
where
    T: TokenProvider + 'static,
    M: MailTransport + 'static,
{
    Router::new()
        .route("/api/contact", post(contact_handler::<T, M>))
        .with_state(relay)
}

pub(crate) async fn contact_handler<T, M>(
    State(relay): State<Arc<ContactRelay<T, M>>>,
    payload: Result<Json<ContactSubmission>, JsonRejection>,
) -> Response
where
    T: TokenProvider + 'static,
    M: MailTransport + 'static,
{
    let Json(submission) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            let payload = json!({
                "error": rejection.body_text(),
            });
            return (StatusCode::BAD_REQUEST, Json(payload)).into_response();
        }
    };

    match relay.relay(submission).await {
        Ok(()) => {
            let payload = json!({
                "success": true,
                "message": DELIVERED_MESSAGE,
            });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(error @ ContactError::Validation(_)) => {
            let payload = json!({
                "error": error.to_string(),
            });
            (StatusCode::BAD_REQUEST, Json(payload)).into_response()
        }
        Err(error) => {
            let payload = json!({
                "error": "Fehler beim Senden der Nachricht",
                "details": error.to_string(),
            });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
        }
    }
}
