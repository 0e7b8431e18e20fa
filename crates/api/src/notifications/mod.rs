//! Outbound notification capability.
//!
//! OTP codes go out through [`NotificationSender`]; delivery is
//! fire-and-forget and a transport failure never fails the HTTP request
//! that triggered it.

use async_trait::async_trait;

/// Capability for delivering a one-time code to a phone number.
#[async_trait]
pub trait NotificationSender: Send + Sync {
    async fn send_otp(&self, phone: &str, code: &str) -> Result<(), NotificationError>;
}

/// Delivery failure from a notification transport.
#[derive(Debug, thiserror::Error)]
#[error("notification delivery failed: {0}")]
pub struct NotificationError(pub String);

/// Development sender that only logs. No SMS gateway is wired up; the
/// stub codes in [`crate::auth::otp::OtpConfig`] cover local logins.
#[derive(Debug, Default)]
pub struct StubNotificationSender;

#[async_trait]
impl NotificationSender for StubNotificationSender {
    async fn send_otp(&self, phone: &str, _code: &str) -> Result<(), NotificationError> {
        tracing::info!(%phone, "OTP issued (stub sender, not delivered)");
        Ok(())
    }
}
