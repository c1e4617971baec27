use async_trait::async_trait;

use crate::error::SupportError;
use crate::types::{DeviceToken, IssueId, IssueReport};

/// Remote support-service boundary. Transport, authentication, and retry
/// policy all live behind this trait; the session only sees the results.
#[async_trait]
pub trait SupportBackend: Send + Sync {
    /// Fetch the number of issues with unread replies for the current user.
    ///
    /// Returned as a raw `i64`: the session treats negative values as a
    /// failed refresh and keeps its cached count.
    async fn fetch_notification_count(&self) -> Result<i64, SupportError>;

    /// Forward a platform push-registration token.
    async fn register_device_token(&self, token: DeviceToken) -> Result<(), SupportError>;

    /// File an issue report assembled by [`crate::SupportSession::issue_report`].
    async fn submit_issue(&self, report: IssueReport) -> Result<IssueId, SupportError>;
}
