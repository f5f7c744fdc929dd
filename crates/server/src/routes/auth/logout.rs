use axum::http::StatusCode;
use shared::api::error::{Nothing, ServerError};

use crate::SessionValue;

/// Drop the whole session, grant and progression snapshot included
pub async fn logout(mut session: SessionValue) -> Result<StatusCode, ServerError<Nothing>> {
    session.destroy().await?;
    Ok(StatusCode::NO_CONTENT)
}
