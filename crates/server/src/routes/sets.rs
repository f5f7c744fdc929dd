use axum::{extract::Path, http::StatusCode, Json};
use chrono::Utc;
use shared::{
    api::{
        error::{ServerError, ValidationError},
        payloads::{SaveSetRequest, SaveSetResponse, UpdateSetRequest},
        response_errors::WorkoutError,
    },
    model::SetEntry,
};
use uuid::Uuid;

use crate::{sheets::Store, SessionValue, UserState, ValidatedJson};

/// Log one set. The row is appended to the sheet first; the progression
/// only advances once the append has been acknowledged, so a failed write
/// leaves the user on the same set to retry
pub async fn create_set(
    Path(id): Path<String>,
    user: UserState,
    store: Store,
    mut session: SessionValue,
    ValidatedJson(req): ValidatedJson<SaveSetRequest>,
) -> Result<Json<SaveSetResponse>, ServerError<WorkoutError>> {
    let mut progression = session
        .progression()
        .filter(|p| p.session_id == id)
        .cloned()
        .ok_or_else(|| WorkoutError::NotFound { what: format!("active session {id}") })?;

    let set_number = progression
        .next_set_for(&req.exercise)
        .map_err(|e| ValidationError::new(e.to_string()))?;
    let planned_rest = progression
        .exercises()
        .iter()
        .find(|e| e.key == req.exercise)
        .and_then(|e| e.rest_secs);

    let now = Utc::now();
    let set = SetEntry {
        id: Uuid::new_v4(),
        session_id: id,
        exercise: req.exercise,
        set_number,
        weight: req.weight,
        reps: req.reps,
        rpe: req.rpe,
        skipped: req.skipped,
        skip_reason: req.skip_reason,
        rest_taken_secs: req.rest_taken_secs,
        rest_target_secs: req.rest_target_secs.or(planned_rest),
        notes: req.notes,
        deleted: false,
        created_at: now,
    };

    store.append_set(&user.access_token, &set).await?;
    // Write acknowledged, now it's safe to advance
    progression
        .confirm_set(&set.exercise, now)
        .map_err(|e| ValidationError::new(e.to_string()))?;
    session.set_progression(progression.clone()).await?;

    Ok(Json(SaveSetResponse { set, progression }))
}

/// Non-deleted sets of a session, in logging order
pub async fn list_sets(
    Path(id): Path<String>,
    user: UserState,
    store: Store,
) -> Result<Json<Vec<SetEntry>>, ServerError<WorkoutError>> {
    let token = &user.access_token;
    store
        .find_session(token, &id)
        .await?
        .filter(|s| s.user_email.eq_ignore_ascii_case(&user.email))
        .ok_or_else(|| WorkoutError::NotFound { what: format!("session {id}") })?;

    let sets = store.sets_for_session(token, &id).await?;
    Ok(Json(sets))
}

/// A set is only addressable through the session it belongs to, and only
/// by that session's user. Anyone else sees it as absent
async fn owned_set(
    store: &Store,
    user: &UserState,
    id: &Uuid,
) -> Result<SetEntry, ServerError<WorkoutError>> {
    let token = &user.access_token;
    let not_found = || WorkoutError::NotFound { what: format!("set {id}") };

    let set = store.find_set(token, id).await?.ok_or_else(not_found)?;
    let owned = store
        .find_session(token, &set.session_id)
        .await?
        .is_some_and(|s| s.user_email.eq_ignore_ascii_case(&user.email));
    if !owned {
        return Err(not_found().into());
    }
    Ok(set)
}

/// Correct an already-logged set in place. Only the supplied fields change
pub async fn update_set(
    Path(id): Path<Uuid>,
    user: UserState,
    store: Store,
    ValidatedJson(req): ValidatedJson<UpdateSetRequest>,
) -> Result<Json<SetEntry>, ServerError<WorkoutError>> {
    let mut set = owned_set(&store, &user, &id).await?;

    if let Some(weight) = req.weight {
        set.weight = weight;
    }
    if let Some(reps) = req.reps {
        set.reps = reps;
    }
    if let Some(rpe) = req.rpe {
        set.rpe = Some(rpe);
    }
    if let Some(rest) = req.rest_taken_secs {
        set.rest_taken_secs = Some(rest);
    }
    if let Some(notes) = req.notes {
        set.notes = Some(notes);
    }

    store.update_set(&user.access_token, &set).await?;
    Ok(Json(set))
}

/// Soft delete: the row keeps its place in the sheet but drops out of
/// listings and aggregation
pub async fn delete_set(
    Path(id): Path<Uuid>,
    user: UserState,
    store: Store,
) -> Result<StatusCode, ServerError<WorkoutError>> {
    let mut set = owned_set(&store, &user, &id).await?;

    set.deleted = true;
    store.update_set(&user.access_token, &set).await?;
    Ok(StatusCode::NO_CONTENT)
}
