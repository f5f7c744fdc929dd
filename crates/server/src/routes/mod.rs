pub mod auth;
mod catalog;
mod history;
mod ping;
mod plan;
mod session;
mod sets;
mod setup;

pub use catalog::*;
pub use history::*;
pub use ping::*;
pub use plan::*;
pub use session::*;
pub use sets::*;
pub use setup::*;

use axum::{
    routing::{get, post, put},
    Router,
};
use shared::api::{Auth, Object};
use tower_http::{
    limit::RequestBodyLimitLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};
use tracing::Level;

use crate::AppState;

pub fn router(state: AppState) -> Router {
    let session_layer = SessionManagerLayer::new(MemoryStore::default())
        .with_secure(state.args.secure_sessions)
        .with_expiry(Expiry::OnInactivity(time::Duration::days(state.args.session_expiry_days)));

    Router::new()
        .route(Object::Ping.path(), get(ping))
        .route(Object::User.path(), get(auth::fetch_user))
        .route(Auth::Login.path(), get(auth::login))
        .route(Auth::Callback.path(), get(auth::callback))
        .route(Auth::Logout.path(), post(auth::logout))
        .route(Object::Plan.path(), get(fetch_plan))
        .route(Object::Catalog.path(), get(fetch_catalog))
        .route(Object::Session.path(), post(create_session))
        .route(Object::SessionSets.path(), get(list_sets).post(create_set))
        .route(Object::SessionFinish.path(), post(finish_session))
        .route(Object::SetId.path(), put(update_set).delete(delete_set))
        .route(Object::Setup.path(), get(fetch_setup).put(upsert_setup))
        .route(Object::History.path(), get(fetch_history))
        .layer(session_layer)
        .layer(RequestBodyLimitLayer::new(64 * 1024))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}
