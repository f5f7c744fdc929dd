use axum::{
    async_trait,
    extract::{FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use shared::{
    api::error::{Nothing, ServerError, ValidationError},
    model::ValidateModel,
};

/// `Json<T>` that turns body rejections into the JSON error payload and
/// runs the payload's own validation before the handler sees it. The client
/// always parses a JSON body, including on malformed requests
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + ValidateModel,
{
    type Rejection = ServerError<Nothing>;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| ServerError::from(ValidationError::new(e.body_text())))?;
        value.validate()?;
        Ok(Self(value))
    }
}
