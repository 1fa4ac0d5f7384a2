use std::sync::Arc;

use stockroom_api::{
    config::AppConfig,
    db::{self, DbConfig},
    events::{self, EventSender},
    AppState,
};
use tokio::sync::mpsc;

/// Helper harness for spinning up application state backed by an in-memory
/// SQLite database. A single pooled connection keeps every test task on the
/// same database.
pub struct TestApp {
    pub state: AppState,
    _event_task: tokio::task::JoinHandle<()>,
}

impl TestApp {
    /// Construct a new test application with fresh database state.
    pub async fn new() -> Self {
        let cfg = AppConfig::new(
            "sqlite::memory:".to_string(),
            "127.0.0.1".to_string(),
            0,
            "test".to_string(),
        );

        let db_cfg = DbConfig {
            url: cfg.database_url.clone(),
            max_connections: 1,
            min_connections: 1,
            ..Default::default()
        };
        let pool = db::establish_connection_with_config(&db_cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool).await.expect("migrations failed");

        let (event_tx, event_rx) = mpsc::channel(256);
        let event_sender = EventSender::new(event_tx);
        let event_task = tokio::spawn(events::process_events(event_rx));

        let state = AppState::new(Arc::new(pool), cfg, event_sender);

        Self {
            state,
            _event_task: event_task,
        }
    }

    /// Full axum router over this app's state, for handler-level tests.
    #[allow(dead_code)]
    pub fn router(&self) -> axum::Router {
        stockroom_api::app(self.state.clone())
    }
}
