use axum::{extract::Path, Json};
use futures::try_join;
use shared::api::{
    error::ServerError,
    payloads::{PlanExercise, PlanResponse},
    response_errors::WorkoutError,
};

use crate::{sheets::Store, UserState};

/// The user's planned exercises for one day, joined with catalog metadata
/// and per-exercise setup. A day with nothing planned is an empty list,
/// not an error
pub async fn fetch_plan(
    Path(day): Path<String>,
    user: UserState,
    store: Store,
) -> Result<Json<PlanResponse>, ServerError<WorkoutError>> {
    let token = &user.access_token;
    let (plan, catalog, setups) = try_join!(
        store.plan_for_day(token, &user.email, &day),
        store.catalog(token),
        store.setups_for_user(token, &user.email),
    )?;

    let exercises = plan
        .into_iter()
        .map(|entry| {
            let catalog = catalog.iter().find(|c| c.exercise == entry.exercise).cloned();
            let setup = setups.iter().find(|s| s.exercise == entry.exercise).cloned();
            PlanExercise { plan: entry, catalog, setup }
        })
        .collect();

    Ok(Json(PlanResponse { day, exercises }))
}
