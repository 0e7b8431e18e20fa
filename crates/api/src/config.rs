use syncdesk_core::guardrails::GuardrailConfig;
use syncdesk_core::types::DbId;

use crate::auth::jwt::JwtConfig;
use crate::auth::otp::OtpConfig;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Graceful shutdown timeout in seconds (default: `30`).
    #[allow(dead_code)]
    pub shutdown_timeout_secs: u64,
    /// JWT token configuration (secret, expiry).
    pub jwt: JwtConfig,
    /// OTP issuance and stub-login configuration.
    pub otp: OtpConfig,
    /// School assigned to users created on first OTP verification.
    pub default_school_id: DbId,
    /// Thresholds for the parent ticket-creation guardrails.
    pub guardrails: GuardrailConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                 | Default                 |
    /// |-------------------------|-------------------------|
    /// | `HOST`                  | `0.0.0.0`               |
    /// | `PORT`                  | `3000`                  |
    /// | `CORS_ORIGINS`          | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`  | `30`                    |
    /// | `SHUTDOWN_TIMEOUT_SECS` | `30`                    |
    /// | `DEFAULT_SCHOOL_ID`     | `1`                     |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let shutdown_timeout_secs: u64 = std::env::var("SHUTDOWN_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("SHUTDOWN_TIMEOUT_SECS must be a valid u64");

        let default_school_id: DbId = std::env::var("DEFAULT_SCHOOL_ID")
            .unwrap_or_else(|_| "1".into())
            .parse()
            .expect("DEFAULT_SCHOOL_ID must be a valid i64");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            jwt: JwtConfig::from_env(),
            otp: OtpConfig::from_env(),
            default_school_id,
            guardrails: guardrails_from_env(),
        }
    }
}

/// Load guardrail thresholds from the environment, falling back to the
/// built-in defaults (3 open / 30 min / 5 per week / 1 other / 1 urgent).
fn guardrails_from_env() -> GuardrailConfig {
    let defaults = GuardrailConfig::default();
    GuardrailConfig {
        max_open_tickets: env_i64("GUARDRAIL_MAX_OPEN_TICKETS", defaults.max_open_tickets),
        cooldown_minutes: env_i64("GUARDRAIL_COOLDOWN_MINUTES", defaults.cooldown_minutes),
        max_tickets_per_week: env_i64(
            "GUARDRAIL_MAX_TICKETS_PER_WEEK",
            defaults.max_tickets_per_week,
        ),
        max_open_other: env_i64("GUARDRAIL_MAX_OPEN_OTHER", defaults.max_open_other),
        max_urgent_per_week: env_i64(
            "GUARDRAIL_MAX_URGENT_PER_WEEK",
            defaults.max_urgent_per_week,
        ),
    }
}

fn env_i64(name: &str, default: i64) -> i64 {
    match std::env::var(name) {
        Ok(v) => v.parse().unwrap_or_else(|_| panic!("{name} must be a valid i64")),
        Err(_) => default,
    }
}
