use axum::Json;
use oauth2::{CsrfToken, Scope};
use shared::api::{
    error::ServerError, payloads::LoginResponse, response_errors::AuthError,
};

use crate::{oauth_client, Args, SessionValue, SHEETS_SCOPE};

/// Start the auth-code flow: hand the client the provider's authorize URL
/// and remember the CSRF state for the callback to check
pub async fn login(
    args: Args,
    mut session: SessionValue,
) -> Result<Json<LoginResponse>, ServerError<AuthError>> {
    let client = oauth_client(&args)?;

    let (authorize_url, csrf) = client
        .authorize_url(CsrfToken::new_random)
        .add_scope(Scope::new(SHEETS_SCOPE.to_string()))
        .add_scope(Scope::new("openid".to_string()))
        .add_scope(Scope::new("email".to_string()))
        // offline + consent so the provider hands back a refresh token
        .add_extra_param("access_type", "offline")
        .add_extra_param("prompt", "consent")
        .url();

    session.set_csrf(csrf.secret().clone()).await?;

    Ok(Json(LoginResponse { authorize_url: authorize_url.to_string() }))
}
