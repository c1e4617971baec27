//! # hearth-sdk
//!
//! Client SDK for the Hearth in-app support service.
//!
//! The crate is the session and callback contract between a host application
//! and Hearth: install-once configuration, screen-launch requests for
//! conversations and FAQs, user identity and custom metadata attached to
//! reported issues, a bounded breadcrumb trail, reply-notification counts,
//! and push/local notification routing. Rendering, transport, and push
//! registration stay behind the [`ScreenPresenter`] and [`SupportBackend`]
//! boundary traits.
//!
//! ## Example
//!
//! ```no_run
//! use std::collections::BTreeMap;
//! use std::sync::Arc;
//!
//! use async_trait::async_trait;
//! use hearth_sdk::{
//!     DeviceToken, HostContext, InstallRequest, IssueId, IssueReport, ScreenPresenter,
//!     ScreenRequest, SupportBackend, SupportError, SupportSession,
//! };
//!
//! struct HttpBackend;
//!
//! #[async_trait]
//! impl SupportBackend for HttpBackend {
//!     async fn fetch_notification_count(&self) -> Result<i64, SupportError> {
//!         Ok(0)
//!     }
//!     async fn register_device_token(&self, _token: DeviceToken) -> Result<(), SupportError> {
//!         Ok(())
//!     }
//!     async fn submit_issue(&self, _report: IssueReport) -> Result<IssueId, SupportError> {
//!         Ok(IssueId("0".into()))
//!     }
//! }
//!
//! struct Presenter;
//!
//! impl ScreenPresenter for Presenter {
//!     fn present(&self, _request: ScreenRequest) {}
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), SupportError> {
//! let session = SupportSession::new(HttpBackend, Arc::new(Presenter));
//! session.install(InstallRequest::new("<api-key>", "acme.hearth.io", "acme_app_1"))?;
//! session.set_name_and_email("Ada", "ada@example.com")?;
//! session.show_faqs(HostContext("main-window".into()), BTreeMap::new())?;
//! # Ok(())
//! # }
//! ```

mod backend;
mod breadcrumbs;
mod delegate;
mod error;
mod lifecycle;
mod metadata;
mod presenter;
mod session;
mod types;

pub use backend::SupportBackend;
pub use breadcrumbs::{BreadcrumbTrail, BREADCRUMB_CAPACITY};
pub use delegate::SupportDelegate;
pub use error::{code as error_code, ErrorCategory, ErrorDetails, SupportError};
pub use lifecycle::{Lifecycle, SessionMethod, SessionState};
pub use metadata::{MetadataBlock, TAGS_KEY};
pub use presenter::ScreenPresenter;
pub use session::SupportSession;
pub use types::{
    DeviceToken, FaqId, HostContext, InstallConfig, InstallRequest, IssueId, IssueReport,
    LocalNotification, NotificationCount, NotificationPayload, Screen, ScreenRequest, SectionId,
    UserIdentity, NOTIFICATION_ORIGIN, OPTION_IN_APP_NOTIFICATIONS, PAYLOAD_FAQ_KEY,
    PAYLOAD_ISSUE_KEY, PAYLOAD_ORIGIN_KEY, PAYLOAD_SECTION_KEY,
};
