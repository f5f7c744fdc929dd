use axum::{extract::Query, Json};
use chrono::{Duration, Utc};
use oauth2::{reqwest::async_http_client, AuthorizationCode, TokenResponse};
use serde::Deserialize;
use shared::api::{
    error::{ServerError, ValidationError},
    payloads::UserResponse,
    response_errors::AuthError,
};

use crate::{cli::Cli, oauth_client, Args, OauthGrant, SessionValue};

/// Everything is optional because the provider controls this query string;
/// `error` is set when the user declined consent
#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UserInfo {
    email: String,
}

/// Second half of the auth-code flow: check the CSRF state, trade the code
/// for tokens, resolve the user's email and store the grant in the session
pub async fn callback(
    args: Args,
    mut session: SessionValue,
    Query(query): Query<CallbackQuery>,
) -> Result<Json<UserResponse>, ServerError<AuthError>> {
    if let Some(error) = query.error {
        tracing::info!(error, "provider declined the authorization");
        return Err(AuthError::Unauthorized.into());
    }
    let code = query.code.ok_or_else(|| ValidationError::new("missing code parameter"))?;
    let state = query.state.ok_or_else(|| ValidationError::new("missing state parameter"))?;

    // The stored state is single use whether or not it matches
    let expected = session.take_csrf().await?;
    if expected.as_deref() != Some(state.as_str()) {
        return Err(AuthError::StateMismatch.into());
    }

    let client = oauth_client(&args)?;
    let token = client
        .exchange_code(AuthorizationCode::new(code))
        .request_async(async_http_client)
        .await
        .map_err(|e| AuthError::TokenExchange { message: e.to_string() })?;

    let access_token = token.access_token().secret().clone();
    let refresh_token = token.refresh_token().map(|t| t.secret().clone());
    let expires_at = token
        .expires_in()
        .and_then(|d| Duration::from_std(d).ok())
        .map(|d| Utc::now() + d);

    let email = fetch_email(&args, &access_token).await?;
    session
        .set_grant(OauthGrant { email: email.clone(), access_token, refresh_token, expires_at })
        .await?;

    Ok(Json(UserResponse { email }))
}

async fn fetch_email(args: &Cli, access_token: &str) -> Result<String, ServerError<AuthError>> {
    let exchange = |message: String| AuthError::TokenExchange { message };

    let response = reqwest::Client::new()
        .get(&args.oauth_userinfo_url)
        .bearer_auth(access_token)
        .send()
        .await
        .map_err(|e| exchange(format!("userinfo request failed: {e}")))?;

    if !response.status().is_success() {
        return Err(exchange(format!("userinfo returned {}", response.status())).into());
    }

    let info: UserInfo =
        response.json().await.map_err(|e| exchange(format!("unparseable userinfo: {e}")))?;
    Ok(info.email)
}
