use axum::Json;
use shared::api::payloads::UserResponse;

use crate::UserState;

/// Who is signed in. Extracting [`UserState`] is the whole check: no
/// unexpired grant means this never runs
pub async fn fetch_user(user: UserState) -> Json<UserResponse> {
    Json(UserResponse { email: user.email })
}
