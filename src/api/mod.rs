pub mod handlers;
pub mod identity;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::storage::KeyValueStore;
use crate::store::ProgressStore;

use self::identity::{AuthConfig, UserId};

/// Shared HTTP state: one storage backend, one progress store per
/// authenticated user, created lazily on first request.
#[derive(Clone)]
pub struct AppState {
    storage: Arc<dyn KeyValueStore>,
    sessions: Arc<Mutex<HashMap<String, ProgressStore>>>,
}

impl AppState {
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self {
            storage,
            sessions: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Run `f` against the caller's store, initializing it on first
    /// contact. The session lock serializes store access, matching the
    /// store's single-threaded execution model.
    pub fn with_store<T>(&self, user: &UserId, f: impl FnOnce(&mut ProgressStore) -> T) -> T {
        let mut sessions = self.sessions.lock().expect("session lock poisoned");
        let store = sessions
            .entry(user.0.clone())
            .or_insert_with(|| ProgressStore::new(self.storage.clone()));
        store.initialize(&user.0);
        f(store)
    }

    /// Roll every loaded session over to the new day. Driven by the
    /// midnight timer in `main`; sessions not in memory are handled by the
    /// day-boundary check in `ProgressStore::initialize` instead.
    pub fn refresh_all_sessions(&self) {
        let mut sessions = self.sessions.lock().expect("session lock poisoned");
        for store in sessions.values_mut() {
            store.refresh_daily_quests();
        }
    }
}

pub fn create_router(storage: Arc<dyn KeyValueStore>) -> Router {
    create_router_from_state(AppState::new(storage), AuthConfig::disabled())
}

pub fn create_router_with_auth(storage: Arc<dyn KeyValueStore>, auth: AuthConfig) -> Router {
    create_router_from_state(AppState::new(storage), auth)
}

/// Build the router around an existing state handle, so the owner (e.g. the
/// midnight refresh task) can keep a reference to the session map.
pub fn create_router_from_state(state: AppState, auth: AuthConfig) -> Router {
    let api = Router::new()
        // Character
        .route("/character", get(handlers::get_character))
        .route("/character", put(handlers::update_character))
        // Quests
        .route("/quests", get(handlers::list_quests))
        .route("/quests", post(handlers::create_quest))
        .route("/quests/{id}", get(handlers::get_quest))
        .route("/quests/{id}", delete(handlers::delete_quest))
        .route("/quests/{id}/complete", post(handlers::complete_quest))
        .route("/quests/{id}/uncheck", post(handlers::uncheck_quest))
        .route("/quests/{id}/fail", post(handlers::fail_quest))
        // Maintenance
        .route("/quests/refresh-daily", post(handlers::refresh_daily_quests))
        .route(
            "/quests/refresh-daily/force",
            post(handlers::force_refresh_daily_quests),
        )
        .route("/reset", post(handlers::reset_progress))
        .layer(middleware::from_fn_with_state(
            auth,
            identity::require_api_key,
        ))
        // Health stays reachable without the API key
        .route("/health", get(handlers::health));

    Router::new()
        .nest("/api/v1", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
