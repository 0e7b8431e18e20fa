use std::sync::Arc;

use crate::config::ServerConfig;
use crate::notifications::NotificationSender;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: syncdesk_db::DbPool,
    /// Server configuration (accessed by middleware and handlers).
    pub config: Arc<ServerConfig>,
    /// Outbound delivery capability for OTP codes.
    pub notifier: Arc<dyn NotificationSender>,
}
