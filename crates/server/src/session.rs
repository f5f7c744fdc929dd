use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::{
    api::{
        error::{Nothing, ServerError},
        response_errors::WorkoutError,
    },
    progression::ProgressionState,
};
use tower_sessions::Session;

/// What the OAuth callback stored for the signed-in user. Refresh handling
/// is deferred to the provider; an expired grant is treated the same as no
/// grant at all
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OauthGrant {
    pub email: String,
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl OauthGrant {
    pub fn expired(&self, now: DateTime<Utc>) -> bool {
        matches!(self.expires_at, Some(t) if t <= now)
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
struct SessionData {
    grant: Option<OauthGrant>,
    /// CSRF state between the login redirect and the callback
    csrf: Option<String>,
    /// Server-side copy of the workout progression snapshot, so a page
    /// reload resumes where the user left off
    progression: Option<ProgressionState>,
}

#[derive(Debug, Clone)]
pub struct SessionValue {
    session: Session,
    data: SessionData,
}

impl SessionValue {
    const SESSION_DATA_KEY: &'static str = "session.data";

    pub fn grant(&self) -> Option<&OauthGrant> {
        self.data.grant.as_ref()
    }

    pub async fn set_grant(&mut self, grant: OauthGrant) -> Result<(), anyhow::Error> {
        self.data.grant = Some(grant);
        Self::update_session(&self.session, &self.data).await
    }

    pub async fn set_csrf(&mut self, csrf: String) -> Result<(), anyhow::Error> {
        self.data.csrf = Some(csrf);
        Self::update_session(&self.session, &self.data).await
    }

    pub async fn take_csrf(&mut self) -> Result<Option<String>, anyhow::Error> {
        let csrf = self.data.csrf.take();
        Self::update_session(&self.session, &self.data).await?;
        Ok(csrf)
    }

    pub fn progression(&self) -> Option<&ProgressionState> {
        self.data.progression.as_ref()
    }

    pub async fn set_progression(&mut self, progression: ProgressionState) -> Result<(), anyhow::Error> {
        self.data.progression = Some(progression);
        Self::update_session(&self.session, &self.data).await
    }

    pub async fn clear_progression(&mut self) -> Result<(), anyhow::Error> {
        self.data.progression = None;
        Self::update_session(&self.session, &self.data).await
    }

    /// Drop everything, including the grant. Used by logout
    pub async fn destroy(&mut self) -> Result<(), anyhow::Error> {
        self.data = SessionData::default();
        self.session.flush().await?;
        Ok(())
    }

    async fn update_session(session: &Session, data: &SessionData) -> Result<(), anyhow::Error> {
        session.insert(Self::SESSION_DATA_KEY, data.clone()).await?;
        Ok(())
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for SessionValue
where
    S: Send + Sync,
{
    type Rejection = ServerError<Nothing>;

    async fn from_request_parts(req: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(req, state)
            .await
            .map_err(|e| ServerError::Server { message: format!("{e:?}") })?;

        let data: SessionData = session
            .get(Self::SESSION_DATA_KEY)
            .await
            .map_err(|e| ServerError::Server { message: format!("{e:?}") })?
            .unwrap_or_default();

        Ok(Self { session, data })
    }
}

/// The signed-in user. Extracting this is what makes an endpoint
/// data-bearing: no unexpired grant means a structured 401, never a 200
/// with empty data
#[derive(Debug, Clone)]
pub struct UserState {
    pub email: String,
    pub access_token: String,
}

#[async_trait]
impl<S> FromRequestParts<S> for UserState
where
    S: Send + Sync,
{
    type Rejection = ServerError<WorkoutError>;

    async fn from_request_parts(req: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = SessionValue::from_request_parts(req, state)
            .await
            .map_err(|e| ServerError::Server { message: e.to_string() })?;

        match session.grant() {
            Some(grant) if !grant.expired(Utc::now()) => Ok(UserState {
                email: grant.email.clone(),
                access_token: grant.access_token.clone(),
            }),
            _ => Err(WorkoutError::Unauthorized.into()),
        }
    }
}
