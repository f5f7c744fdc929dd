use axum::{extract::Path, Json};
use chrono::Utc;
use futures::try_join;
use shared::{
    api::{
        error::ServerError,
        payloads::{CreateSessionRequest, CreateSessionResponse, FinishSessionRequest},
        response_errors::WorkoutError,
    },
    model::{ExerciseNote, WorkoutSession},
    progression::{PlannedExercise, ProgressionState},
};
use uuid::Uuid;

use crate::{sheets::Store, SessionValue, UserState, ValidatedJson};

/// Start a workout: append the session row, seed the progression state from
/// the day's plan and stash the snapshot server-side
pub async fn create_session(
    user: UserState,
    store: Store,
    mut session: SessionValue,
    ValidatedJson(req): ValidatedJson<CreateSessionRequest>,
) -> Result<Json<CreateSessionResponse>, ServerError<WorkoutError>> {
    let token = &user.access_token;
    let (plan, catalog, setups) = try_join!(
        store.plan_for_day(token, &user.email, &req.plan_day),
        store.catalog(token),
        store.setups_for_user(token, &user.email),
    )?;

    if plan.is_empty() {
        return Err(WorkoutError::NotFound { what: format!("plan for day {:?}", req.plan_day) }.into());
    }

    // Rest target precedence: the user's setup, then the plan row, then the
    // catalog default
    let exercises: Vec<PlannedExercise> = plan
        .iter()
        .map(|entry| {
            let setup_rest =
                setups.iter().find(|s| s.exercise == entry.exercise).and_then(|s| s.rest_secs);
            let catalog_rest = catalog
                .iter()
                .find(|c| c.exercise == entry.exercise)
                .and_then(|c| c.default_rest_secs);
            PlannedExercise {
                key: entry.exercise.clone(),
                planned_sets: entry.planned_sets,
                rest_secs: setup_rest.or(entry.rest_secs).or(catalog_rest),
            }
        })
        .collect();

    let now = Utc::now();
    let workout = WorkoutSession {
        id: Uuid::new_v4().to_string(),
        user_email: user.email,
        plan_day: req.plan_day,
        started_at: now,
        ended_at: None,
        timezone: req.timezone,
        planned_exercises: exercises.len() as u32,
        completed_exercises: 0,
        total_sets: 0,
        notes: req.notes,
        created_at: now,
    };
    store.append_session(token, &workout).await?;

    let mut progression = ProgressionState::new(workout.id.clone(), exercises, now);
    progression.start();
    session.set_progression(progression.clone()).await?;

    Ok(Json(CreateSessionResponse { session: workout, progression }))
}

/// Stamp the end of a session and write the summary counts back to its row.
/// Idempotent: finishing an already-finished session returns it unchanged
pub async fn finish_session(
    Path(id): Path<String>,
    user: UserState,
    store: Store,
    mut session: SessionValue,
    ValidatedJson(req): ValidatedJson<FinishSessionRequest>,
) -> Result<Json<WorkoutSession>, ServerError<WorkoutError>> {
    let token = &user.access_token;
    let mut workout = store
        .find_session(token, &id)
        .await?
        .filter(|s| s.user_email.eq_ignore_ascii_case(&user.email))
        .ok_or_else(|| WorkoutError::NotFound { what: format!("session {id}") })?;

    let now = Utc::now();
    if workout.ended_at.is_none() {
        let (completed_exercises, total_sets) = match session.progression() {
            Some(p) if p.session_id == id => (p.completed_exercises(), p.total_sets()),
            // Snapshot gone (new device, expired session): recount from the
            // sheet instead
            _ => {
                let sets = store.sets_for_session(token, &id).await?;
                let mut exercises: Vec<&str> = sets.iter().map(|s| s.exercise.as_str()).collect();
                exercises.sort_unstable();
                exercises.dedup();
                (exercises.len() as u32, sets.len() as u32)
            },
        };

        workout.ended_at = Some(now);
        workout.completed_exercises = completed_exercises;
        workout.total_sets = total_sets;
        if req.notes.is_some() {
            workout.notes = req.notes;
        }
        store.update_session(token, &workout).await?;
    }

    // Notes are written after the end stamp. A failed append surfaces to
    // the caller; retrying the finish re-attempts the notes without
    // restamping
    for note in &req.exercise_notes {
        let entry = ExerciseNote {
            session_id: id.clone(),
            exercise: note.exercise.clone(),
            note: note.note.clone(),
            created_at: now,
        };
        store.append_note(token, &entry).await?;
    }

    if session.progression().is_some_and(|p| p.session_id == id) {
        session.clear_progression().await?;
    }

    Ok(Json(workout))
}
