use oauth2::{
    basic::BasicClient, AuthUrl, ClientId, ClientSecret, RedirectUrl, TokenUrl,
};
use shared::api::response_errors::AuthError;

use crate::cli::Cli;

/// Scope covering spreadsheet read/write
pub const SHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";

fn misconfigured<S: Into<String>>(message: S) -> AuthError {
    AuthError::Misconfigured { message: message.into() }
}

/// Build the OAuth client from configuration. Built per request so missing
/// configuration is a structured error on the login route, not a startup
/// crash
pub fn oauth_client(args: &Cli) -> Result<BasicClient, AuthError> {
    let client_id = args
        .oauth_client_id
        .as_deref()
        .filter(|id| !id.is_empty())
        .ok_or_else(|| misconfigured("OAUTH_CLIENT_ID is not set"))?;

    let client_secret = args
        .oauth_client_secret
        .as_deref()
        .filter(|s| !s.is_empty())
        .map(|s| ClientSecret::new(s.to_string()));

    let auth_url = AuthUrl::new(args.oauth_auth_url.clone())
        .map_err(|e| misconfigured(format!("invalid OAUTH_AUTH_URL: {e}")))?;
    let token_url = TokenUrl::new(args.oauth_token_url.clone())
        .map_err(|e| misconfigured(format!("invalid OAUTH_TOKEN_URL: {e}")))?;
    let redirect_url = RedirectUrl::new(args.oauth_redirect_url.clone())
        .map_err(|e| misconfigured(format!("invalid OAUTH_REDIRECT_URL: {e}")))?;

    Ok(BasicClient::new(
        ClientId::new(client_id.to_string()),
        client_secret,
        auth_url,
        Some(token_url),
    )
    .set_redirect_uri(redirect_url))
}
