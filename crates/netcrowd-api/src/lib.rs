//! netcrowd-api: REST API server for netcrowd
//!
//! Provides HTTP endpoints for report CRUD, statistics, import/export and a
//! server-sent event stream of store changes. One store per process, owned
//! by [`AppState`].

use axum::{
    Router,
    routing::{get, post},
};
use netcrowd_core::config::Locale;
use netcrowd_core::{Change, ReportStore};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;
use tokio::sync::broadcast;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

mod error;
mod events;
mod handlers;

pub use error::ApiError;

const EVENT_CAPACITY: usize = 256;

/// Shared application state
pub struct AppState {
    store: RwLock<ReportStore>,
    events: broadcast::Sender<Change>,
    locale: Locale,
}

impl AppState {
    /// Take ownership of the store and relay its changes to event streams
    pub fn new(store: ReportStore, locale: Locale) -> Arc<Self> {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        let relay = events.clone();
        store
            .subscribe(move |change| {
                // No listeners connected is fine
                let _ = relay.send(change.clone());
                Ok(())
            })
            .detach();

        Arc::new(Self {
            store: RwLock::new(store),
            events,
            locale,
        })
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    /// Receive every store change from now on
    pub fn changes(&self) -> broadcast::Receiver<Change> {
        self.events.subscribe()
    }

    pub fn read(&self) -> Result<RwLockReadGuard<'_, ReportStore>, ApiError> {
        self.store
            .read()
            .map_err(|e: PoisonError<_>| ApiError::Internal(format!("store lock poisoned: {}", e)))
    }

    pub fn write(&self) -> Result<RwLockWriteGuard<'_, ReportStore>, ApiError> {
        self.store
            .write()
            .map_err(|e: PoisonError<_>| ApiError::Internal(format!("store lock poisoned: {}", e)))
    }
}

/// Build the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/reports",
            get(handlers::list_reports).post(handlers::create_report),
        )
        .route(
            "/reports/{id}",
            get(handlers::get_report)
                .patch(handlers::update_report)
                .delete(handlers::delete_report),
        )
        .route("/stats", get(handlers::location_stats))
        .route("/stats/summary", get(handlers::summary))
        .route("/stats/weekly", get(handlers::weekly_trend))
        .route("/stats/issue-types", get(handlers::issue_types))
        .route("/export", get(handlers::export))
        .route("/import", post(handlers::import))
        .route("/admin/reset", post(handlers::reset))
        .route("/admin/clear", post(handlers::clear))
        .route("/campus/buildings", get(handlers::campus))
        .route("/events", get(events::stream))
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Poll the data file for writes made by other processes
///
/// On a change the snapshot is replaced and observers are notified, which
/// also reaches connected event streams.
pub fn spawn_sync_task(state: Arc<AppState>, every: Duration) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;
            let mut store = match state.write() {
                Ok(store) => store,
                Err(e) => {
                    tracing::error!(error = %e, "Stopping file sync");
                    break;
                }
            };
            if let Err(e) = store.sync_external() {
                tracing::warn!(error = %e, "File sync failed");
            }
        }
    })
}
