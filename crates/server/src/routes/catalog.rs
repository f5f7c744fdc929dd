use axum::Json;
use shared::{
    api::{error::ServerError, response_errors::WorkoutError},
    model::CatalogEntry,
};

use crate::{sheets::Store, UserState};

/// Active catalog entries. Retired exercises stay in the tab for old rows
/// to reference but are not offered here
pub async fn fetch_catalog(
    user: UserState,
    store: Store,
) -> Result<Json<Vec<CatalogEntry>>, ServerError<WorkoutError>> {
    let catalog = store.catalog(&user.access_token).await?;
    Ok(Json(catalog.into_iter().filter(|c| c.active).collect()))
}
