use clap::Parser;

use crate::errors::SheetsError;

#[derive(Debug, Clone, Parser)]
#[clap(name = "repsheet server")]
pub struct Cli {
    #[clap(long, env, default_value = "8080")]
    pub port: u16,
    #[clap(long, env, default_value = "127.0.0.1")]
    pub bind_addr: String,

    /// Document id of the spreadsheet holding every tab. Optional at startup
    /// so a first run produces a structured error instead of a crash
    #[clap(long, env)]
    pub spreadsheet_id: Option<String>,
    #[clap(long, env, default_value = "https://sheets.googleapis.com/v4/spreadsheets")]
    pub sheets_base_url: String,

    #[clap(long, env, default_value = "Plan")]
    pub plan_tab: String,
    #[clap(long, env, default_value = "Sessions")]
    pub sessions_tab: String,
    #[clap(long, env, default_value = "Sets")]
    pub sets_tab: String,
    #[clap(long, env, default_value = "Setup")]
    pub setup_tab: String,
    #[clap(long, env, default_value = "Catalog")]
    pub catalog_tab: String,
    #[clap(long, env, default_value = "Notes")]
    pub notes_tab: String,

    #[clap(long, env)]
    pub oauth_client_id: Option<String>,
    #[clap(long, env)]
    pub oauth_client_secret: Option<String>,
    #[clap(long, env, default_value = "http://localhost:8080/api/auth/callback")]
    pub oauth_redirect_url: String,
    #[clap(long, env, default_value = "https://accounts.google.com/o/oauth2/v2/auth")]
    pub oauth_auth_url: String,
    #[clap(long, env, default_value = "https://oauth2.googleapis.com/token")]
    pub oauth_token_url: String,
    #[clap(long, env, default_value = "https://openidconnect.googleapis.com/v1/userinfo")]
    pub oauth_userinfo_url: String,

    #[clap(long, env, default_value = "false")]
    pub secure_sessions: bool,
    #[clap(long, env, default_value = "30")]
    pub session_expiry_days: i64,
}

impl Cli {
    pub fn spreadsheet_id(&self) -> Result<&str, SheetsError> {
        match self.spreadsheet_id.as_deref() {
            Some(id) if !id.is_empty() => Ok(id),
            _ => Err(SheetsError::Misconfigured("SPREADSHEET_ID is not set".to_string())),
        }
    }
}
