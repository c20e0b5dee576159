use axum::{
    extract::{multipart::MultipartRejection, rejection::JsonRejection, Multipart, State},
    Json,
};
use tracing::{debug, warn};

use service::{
    errors::{MissingInput, ServiceError},
    responses::{IdentifyResponse, VoteRequest, VoteResponse},
    VotingApp,
};

/// Multipart form field carrying the fingerprint file.
pub const FINGERPRINT_FIELD: &str = "fingerprint";

/// Pull the uploaded file name out of the form. `None` when the form has no
/// fingerprint field; `Some("")` when the field exists without a file name.
async fn fingerprint_filename(mut multipart: Multipart) -> Option<String> {
    loop {
        match multipart.next_field().await {
            Ok(Some(field)) if field.name() == Some(FINGERPRINT_FIELD) => {
                return Some(field.file_name().unwrap_or_default().to_string());
            }
            Ok(Some(_)) => continue,
            Ok(None) => return None,
            Err(e) => {
                warn!(error = %e, "malformed multipart body");
                return None;
            }
        }
    }
}

/// POST /identify_voter
pub async fn identify_voter(
    State(app): State<VotingApp>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Json<IdentifyResponse> {
    let filename = match multipart {
        Ok(form) => fingerprint_filename(form).await,
        Err(e) => {
            debug!(error = %e, "identify request without multipart form");
            None
        }
    };
    let outcome = app.identification.identify_upload(filename.as_deref()).await;
    Json(IdentifyResponse::from_outcome(&outcome))
}

/// POST /cast_vote
pub async fn cast_vote(
    State(app): State<VotingApp>,
    payload: Result<Json<VoteRequest>, JsonRejection>,
) -> Json<VoteResponse> {
    let outcome = match payload {
        Ok(Json(req)) => app.voting.cast_vote_request(&req).await,
        Err(e) => {
            debug!(error = %e, "cast_vote body rejected");
            Err(ServiceError::MissingInput(MissingInput::VoteData))
        }
    };
    Json(VoteResponse::from_outcome(&outcome))
}
