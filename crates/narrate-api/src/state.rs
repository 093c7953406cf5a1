//! Application state

use metrics_exporter_prometheus::PrometheusHandle;
use narrate_auth::{AccessGuard, AuthService};
use narrate_db::Database;
use std::sync::Arc;

/// Handle used to render the Prometheus exposition
pub type MetricsHandle = PrometheusHandle;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub auth: Arc<AuthService>,
    pub guard: Arc<AccessGuard>,
}

impl AppState {
    pub fn new(db: Database, auth: Arc<AuthService>) -> Self {
        let guard = AccessGuard::new(auth.jwt().clone(), auth.sessions().clone(), db.clone());
        Self {
            db,
            auth,
            guard: Arc::new(guard),
        }
    }
}
