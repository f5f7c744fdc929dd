use std::sync::Arc;

use axum::extract::FromRef;

mod args;
pub use args::*;

mod oauth;
pub use oauth::*;

use crate::{cli::Cli, sheets::SheetStore};

#[derive(Debug, Clone)]
pub struct AppState {
    pub args: Arc<Cli>,
    pub store: SheetStore,
}

impl AppState {
    pub fn new(args: Cli) -> Self {
        let args = Arc::new(args);
        let store = SheetStore::new(args.clone());
        Self { args, store }
    }
}

impl FromRef<AppState> for Arc<Cli> {
    fn from_ref(state: &AppState) -> Self {
        state.args.clone()
    }
}

impl FromRef<AppState> for SheetStore {
    fn from_ref(state: &AppState) -> Self {
        // the store holds an Arc'd config and a reqwest client, both cheap
        // to clone
        state.store.clone()
    }
}
