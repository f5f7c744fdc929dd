use axum::{extract::Path, Json};
use shared::{
    api::{error::ServerError, payloads::SetupUpsertRequest, response_errors::WorkoutError},
    model::ExerciseSetup,
};

use crate::{sheets::Store, UserState, ValidatedJson};

/// The user's setup for one exercise, `null` when none has been saved
pub async fn fetch_setup(
    Path(exercise): Path<String>,
    user: UserState,
    store: Store,
) -> Result<Json<Option<ExerciseSetup>>, ServerError<WorkoutError>> {
    let setups = store.setups_for_user(&user.access_token, &user.email).await?;
    Ok(Json(setups.into_iter().find(|s| s.exercise == exercise)))
}

pub async fn upsert_setup(
    Path(exercise): Path<String>,
    user: UserState,
    store: Store,
    ValidatedJson(req): ValidatedJson<SetupUpsertRequest>,
) -> Result<Json<ExerciseSetup>, ServerError<WorkoutError>> {
    let setup = ExerciseSetup {
        user_email: user.email.clone(),
        exercise,
        rest_secs: req.rest_secs,
        requires_weight: req.requires_weight,
        notes: req.notes,
    };
    store.upsert_setup(&user.access_token, &setup).await?;
    Ok(Json(setup))
}
