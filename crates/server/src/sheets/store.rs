//! Typed operations over the spreadsheet tabs.
//!
//! There is no index anywhere: every lookup is a linear scan over a tab,
//! bounded by total historical row count. Updates locate their row by
//! scanning the identifier column, then overwrite just that row's range.

use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{request::Parts, StatusCode},
};
use shared::model::{
    CatalogEntry, ExerciseNote, ExerciseSetup, PlanEntry, SetEntry, WorkoutSession,
};
use tracing::warn;
use uuid::Uuid;

use super::{
    client::{sheet_row_number, SheetsClient},
    codec::HeaderIndex,
    schema::SheetSchema,
};
use crate::{cli::Cli, errors::SheetsError};

/// Decoded tab contents. Entries keep their data-row index because rows
/// that fail to decode are skipped and would otherwise shift positions
struct TabData<T> {
    index: HeaderIndex,
    entries: Vec<(usize, T)>,
}

impl<T> TabData<T> {
    fn into_values(self) -> impl Iterator<Item = T> {
        self.entries.into_iter().map(|(_, entry)| entry)
    }
}

#[derive(Debug, Clone)]
pub struct SheetStore {
    client: SheetsClient,
    args: Arc<Cli>,
}

impl SheetStore {
    pub fn new(args: Arc<Cli>) -> Self {
        let client = SheetsClient::new(args.sheets_base_url.clone());
        Self { client, args }
    }

    async fn read_tab<T: SheetSchema>(
        &self,
        token: &str,
        tab: &str,
    ) -> Result<TabData<T>, SheetsError> {
        let document_id = self.args.spreadsheet_id()?;
        let mut rows = self.client.get_rows(token, document_id, tab).await?;

        let header = if rows.is_empty() { Vec::new() } else { rows.remove(0) };
        let index = HeaderIndex::resolve(&header, T::FIELDS);

        let mut entries = Vec::with_capacity(rows.len());
        for (i, row) in rows.iter().enumerate() {
            match T::decode(&index, row) {
                Ok(entry) => entries.push((i, entry)),
                // Best effort: a malformed row is logged and skipped, the
                // rest of the tab still decodes
                Err(e) => warn!(tab, row = sheet_row_number(i), "skipping undecodable row: {e}"),
            }
        }
        Ok(TabData { index, entries })
    }

    async fn append<T: SheetSchema>(
        &self,
        token: &str,
        tab: &str,
        value: &T,
    ) -> Result<(), SheetsError> {
        let data = self.read_tab::<T>(token, tab).await?;
        let document_id = self.args.spreadsheet_id()?;
        self.client.append_row(token, document_id, tab, value.encode(&data.index)).await
    }

    async fn update_where<T, F>(
        &self,
        token: &str,
        tab: &str,
        what: &str,
        pred: F,
        value: &T,
    ) -> Result<(), SheetsError>
    where
        T: SheetSchema,
        F: Fn(&T) -> bool,
    {
        let data = self.read_tab::<T>(token, tab).await?;
        let Some((i, _)) = data.entries.iter().find(|(_, entry)| pred(entry)) else {
            return Err(SheetsError::NotFound { what: what.to_string() });
        };
        let document_id = self.args.spreadsheet_id()?;
        self.client
            .update_row(token, document_id, tab, sheet_row_number(*i), value.encode(&data.index))
            .await
    }

    // --- Plan / catalog / setup ---

    pub async fn plan_for_day(
        &self,
        token: &str,
        email: &str,
        day: &str,
    ) -> Result<Vec<PlanEntry>, SheetsError> {
        let data = self.read_tab::<PlanEntry>(token, &self.args.plan_tab).await?;
        let mut entries: Vec<PlanEntry> = data
            .into_values()
            .filter(|p| {
                p.user_email.eq_ignore_ascii_case(email) && p.day.eq_ignore_ascii_case(day)
            })
            .collect();
        entries.sort_by_key(|p| p.order);
        Ok(entries)
    }

    pub async fn catalog(&self, token: &str) -> Result<Vec<CatalogEntry>, SheetsError> {
        let data = self.read_tab::<CatalogEntry>(token, &self.args.catalog_tab).await?;
        Ok(data.into_values().collect())
    }

    pub async fn setups_for_user(
        &self,
        token: &str,
        email: &str,
    ) -> Result<Vec<ExerciseSetup>, SheetsError> {
        let data = self.read_tab::<ExerciseSetup>(token, &self.args.setup_tab).await?;
        Ok(data.into_values().filter(|s| s.user_email.eq_ignore_ascii_case(email)).collect())
    }

    /// Create-if-absent, else overwrite, keyed by (user email, exercise)
    pub async fn upsert_setup(
        &self,
        token: &str,
        setup: &ExerciseSetup,
    ) -> Result<(), SheetsError> {
        let tab = self.args.setup_tab.clone();
        let data = self.read_tab::<ExerciseSetup>(token, &tab).await?;
        let existing = data.entries.iter().find(|(_, s)| {
            s.user_email.eq_ignore_ascii_case(&setup.user_email) && s.exercise == setup.exercise
        });
        let document_id = self.args.spreadsheet_id()?;
        match existing {
            Some((i, _)) => {
                self.client
                    .update_row(
                        token,
                        document_id,
                        &tab,
                        sheet_row_number(*i),
                        setup.encode(&data.index),
                    )
                    .await
            },
            None => self.client.append_row(token, document_id, &tab, setup.encode(&data.index)).await,
        }
    }

    // --- Sessions ---

    pub async fn append_session(
        &self,
        token: &str,
        session: &WorkoutSession,
    ) -> Result<(), SheetsError> {
        self.append(token, &self.args.sessions_tab, session).await
    }

    pub async fn find_session(
        &self,
        token: &str,
        id: &str,
    ) -> Result<Option<WorkoutSession>, SheetsError> {
        let data = self.read_tab::<WorkoutSession>(token, &self.args.sessions_tab).await?;
        Ok(data.into_values().find(|s| s.id == id))
    }

    pub async fn update_session(
        &self,
        token: &str,
        session: &WorkoutSession,
    ) -> Result<(), SheetsError> {
        let tab = self.args.sessions_tab.clone();
        let what = format!("session {}", session.id);
        self.update_where(token, &tab, &what, |s: &WorkoutSession| s.id == session.id, session)
            .await
    }

    pub async fn sessions_for_user(
        &self,
        token: &str,
        email: &str,
    ) -> Result<Vec<WorkoutSession>, SheetsError> {
        let data = self.read_tab::<WorkoutSession>(token, &self.args.sessions_tab).await?;
        Ok(data.into_values().filter(|s| s.user_email.eq_ignore_ascii_case(email)).collect())
    }

    // --- Sets ---

    pub async fn append_set(&self, token: &str, set: &SetEntry) -> Result<(), SheetsError> {
        self.append(token, &self.args.sets_tab, set).await
    }

    /// Non-deleted sets of one session, ordered by when they were logged
    pub async fn sets_for_session(
        &self,
        token: &str,
        session_id: &str,
    ) -> Result<Vec<SetEntry>, SheetsError> {
        let data = self.read_tab::<SetEntry>(token, &self.args.sets_tab).await?;
        let mut sets: Vec<SetEntry> = data
            .into_values()
            .filter(|s| s.session_id == session_id && !s.deleted)
            .collect();
        sets.sort_by_key(|s| (s.created_at, s.set_number));
        Ok(sets)
    }

    /// Everything in the sets tab, soft-deleted rows included; the
    /// aggregator applies its own filters
    pub async fn all_sets(&self, token: &str) -> Result<Vec<SetEntry>, SheetsError> {
        let data = self.read_tab::<SetEntry>(token, &self.args.sets_tab).await?;
        Ok(data.into_values().collect())
    }

    pub async fn find_set(&self, token: &str, id: &Uuid) -> Result<Option<SetEntry>, SheetsError> {
        let data = self.read_tab::<SetEntry>(token, &self.args.sets_tab).await?;
        Ok(data.into_values().find(|s| s.id == *id))
    }

    pub async fn update_set(&self, token: &str, set: &SetEntry) -> Result<(), SheetsError> {
        let tab = self.args.sets_tab.clone();
        let what = format!("set {}", set.id);
        self.update_where(token, &tab, &what, |s: &SetEntry| s.id == set.id, set).await
    }

    // --- Notes ---

    pub async fn append_note(&self, token: &str, note: &ExerciseNote) -> Result<(), SheetsError> {
        self.append(token, &self.args.notes_tab, note).await
    }
}

/// Extractor handing routes the store without threading `State` through
#[derive(Debug)]
pub struct Store(pub SheetStore);

impl Deref for Store {
    type Target = SheetStore;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for Store {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Store
where
    S: Send + Sync,
    SheetStore: FromRef<S>,
{
    type Rejection = (StatusCode, String);

    async fn from_request_parts(_parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Ok(Store(SheetStore::from_ref(state)))
    }
}
