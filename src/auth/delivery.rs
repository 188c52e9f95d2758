use axum::async_trait;
use tracing::{debug, info};

use crate::auth::dto::VerificationChannel;

/// Best-effort code delivery (email/SMS). Failures are logged by the caller
/// and never surfaced to the client, since sending can be retried.
#[async_trait]
pub trait Delivery: Send + Sync {
    async fn send_code(
        &self,
        channel: VerificationChannel,
        recipient: &str,
        code: &str,
    ) -> anyhow::Result<()>;
}

/// Stand-in delivery that only logs. Real email/SMS providers plug in here.
pub struct LogDelivery;

#[async_trait]
impl Delivery for LogDelivery {
    async fn send_code(
        &self,
        channel: VerificationChannel,
        recipient: &str,
        code: &str,
    ) -> anyhow::Result<()> {
        info!(channel = channel.as_str(), recipient, "verification code dispatched");
        debug!(code, "verification code (log delivery)");
        Ok(())
    }
}
