//! One-time code generation, hashing, and stub-login configuration.
//!
//! Plaintext codes are handed to the notification sender and never stored;
//! only the SHA-256 hex digest lands in the `otps` table.

use rand::Rng;
use sha2::{Digest, Sha256};

/// OTP issuance configuration.
#[derive(Debug, Clone)]
pub struct OtpConfig {
    /// Code lifetime in minutes (default: 10).
    pub expiry_mins: i64,
    /// Development stub code that logs in (or creates) a Parent.
    /// Empty disables stub logins.
    pub stub_parent_code: String,
    /// Development stub code that logs in as a Teacher.
    pub stub_staff_code: String,
}

impl OtpConfig {
    /// Load OTP configuration from environment variables.
    ///
    /// | Env Var               | Default  |
    /// |-----------------------|----------|
    /// | `OTP_EXPIRY_MINS`     | `10`     |
    /// | `OTP_STUB_CODE`       | (empty)  |
    /// | `OTP_STUB_STAFF_CODE` | (empty)  |
    pub fn from_env() -> Self {
        let expiry_mins: i64 = std::env::var("OTP_EXPIRY_MINS")
            .unwrap_or_else(|_| "10".into())
            .parse()
            .expect("OTP_EXPIRY_MINS must be a valid i64");

        Self {
            expiry_mins,
            stub_parent_code: std::env::var("OTP_STUB_CODE").unwrap_or_default(),
            stub_staff_code: std::env::var("OTP_STUB_STAFF_CODE").unwrap_or_default(),
        }
    }

    /// Whether `code` matches the configured parent stub code.
    pub fn is_parent_stub(&self, code: &str) -> bool {
        !self.stub_parent_code.is_empty() && code == self.stub_parent_code
    }

    /// Whether `code` matches the configured staff stub code.
    pub fn is_staff_stub(&self, code: &str) -> bool {
        !self.stub_staff_code.is_empty() && code == self.stub_staff_code
    }
}

/// Generate a random 6-digit code, zero-padded.
pub fn generate_code() -> String {
    let n: u32 = rand::rng().random_range(0..1_000_000);
    format!("{n:06}")
}

/// Compute the SHA-256 hex digest of a code for at-rest storage.
pub fn hash_code(code: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(code.as_bytes());
    format!("{:x}", hasher.finalize())
}
