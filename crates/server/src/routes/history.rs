use std::collections::HashSet;

use axum::{extract::Path, Json};
use futures::try_join;
use shared::{
    api::{error::ServerError, payloads::HistoryResponse, response_errors::WorkoutError},
    metrics::{last_session_sets, personal_records, recent_sessions, PrPolicy, RECENT_SESSION_WINDOW},
    model::SetEntry,
};

use crate::{sheets::Store, SessionValue, UserState};

/// Full history view for one exercise: last session's sets, personal
/// records and the bounded recent-session trend. Records never count the
/// session that is still in progress
pub async fn fetch_history(
    Path(exercise): Path<String>,
    user: UserState,
    store: Store,
    session: SessionValue,
) -> Result<Json<HistoryResponse>, ServerError<WorkoutError>> {
    let token = &user.access_token;
    let (sessions, all_sets) = try_join!(
        store.sessions_for_user(token, &user.email),
        store.all_sets(token),
    )?;

    let session_ids: HashSet<&str> = sessions.iter().map(|s| s.id.as_str()).collect();
    let history: Vec<SetEntry> = all_sets
        .into_iter()
        .filter(|s| session_ids.contains(s.session_id.as_str()))
        .collect();

    let policy = PrPolicy {
        include_skipped: false,
        open_session: session
            .progression()
            .filter(|p| p.ended_at().is_none())
            .map(|p| p.session_id.clone()),
    };

    Ok(Json(HistoryResponse {
        last_session: last_session_sets(&history, &exercise),
        records: personal_records(&history, &exercise, &policy),
        recent_sessions: recent_sessions(&history, &exercise, RECENT_SESSION_WINDOW, &policy),
        exercise,
    }))
}
