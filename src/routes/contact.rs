use axum::{Json, extract::State};
use axum_extra::extract::WithRejection;
use folio_contact::{Acknowledgment, Submission};

use crate::{error::ApiError, routes::AppState};

/// POST /api/contact
pub async fn action(
    State(app_state): State<AppState>,
    WithRejection(Json(input), _): WithRejection<Json<Submission>, ApiError>,
) -> Result<Json<Acknowledgment>, ApiError> {
    let ack = app_state.contact_command.submit(input).await?;

    Ok(Json(ack))
}
