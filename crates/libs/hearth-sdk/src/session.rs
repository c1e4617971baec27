use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, Weak};

use time::OffsetDateTime;

use crate::backend::SupportBackend;
use crate::breadcrumbs::BreadcrumbTrail;
use crate::delegate::{DelegateSlot, SupportDelegate};
use crate::error::SupportError;
use crate::lifecycle::{Lifecycle, SessionMethod};
use crate::metadata::{MetadataBlock, MetadataSlot};
use crate::presenter::ScreenPresenter;
use crate::types::{
    DeviceToken, FaqId, HostContext, InstallConfig, InstallRequest, IssueReport,
    LocalNotification, NotificationCount, NotificationPayload, Screen, ScreenRequest, SectionId,
    UserIdentity,
};

/// The support session: one explicitly-constructed instance per process,
/// owned by the host's composition root and passed around by cheap clone.
///
/// Every operation other than [`install`](Self::install) fails fast with
/// `HEARTH_RUNTIME_NOT_INSTALLED` until install succeeds. The async entry
/// points ([`refresh_notification_count`](Self::refresh_notification_count),
/// [`register_device_token`](Self::register_device_token)) spawn onto the
/// ambient Tokio runtime and must be called from within one.
pub struct SupportSession<B: SupportBackend> {
    inner: Arc<SessionInner<B>>,
}

impl<B: SupportBackend> Clone for SupportSession<B> {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

struct SessionInner<B> {
    backend: B,
    presenter: Arc<dyn ScreenPresenter>,
    lifecycle: Mutex<Lifecycle>,
    identity: Mutex<UserIdentity>,
    breadcrumbs: Mutex<BreadcrumbTrail>,
    metadata: MetadataSlot,
    delegate: DelegateSlot,
    count: Mutex<NotificationCount>,
    // Serializes refresh completions: cache writes and delegate dispatch
    // happen in response-arrival order, and the delegate never observes
    // concurrent re-entrant calls.
    dispatch_gate: tokio::sync::Mutex<()>,
}

impl<B: SupportBackend + 'static> SupportSession<B> {
    /// Construct an uninstalled session over its two collaborators.
    pub fn new(backend: B, presenter: Arc<dyn ScreenPresenter>) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                backend,
                presenter,
                lifecycle: Mutex::new(Lifecycle::default()),
                identity: Mutex::new(UserIdentity::default()),
                breadcrumbs: Mutex::new(BreadcrumbTrail::new()),
                metadata: MetadataSlot::default(),
                delegate: DelegateSlot::default(),
                count: Mutex::new(NotificationCount::default()),
                dispatch_gate: tokio::sync::Mutex::new(()),
            }),
        }
    }

    fn ensure_legal(&self, method: SessionMethod) -> Result<(), SupportError> {
        self.inner
            .lifecycle
            .lock()
            .expect("lifecycle mutex poisoned")
            .ensure_method_legal(method)
    }

    /// Validate and apply the install request, exactly once per session.
    /// A second call is a reported logic error, never silently ignored.
    pub fn install(&self, request: InstallRequest) -> Result<(), SupportError> {
        request.validate()?;
        let config = request.into_config();
        let app_id = config.app_id.clone();
        self.inner
            .lifecycle
            .lock()
            .expect("lifecycle mutex poisoned")
            .mark_installed(config)?;
        log::debug!("support session installed for app {app_id}");
        Ok(())
    }

    /// Cloned copy of the immutable install config.
    pub fn install_config(&self) -> Result<InstallConfig, SupportError> {
        let lifecycle = self.inner.lifecycle.lock().expect("lifecycle mutex poisoned");
        lifecycle
            .config()
            .cloned()
            .ok_or_else(|| SupportError::not_installed("install_config"))
    }

    /// Whether in-app banner notifications were enabled at install time.
    /// Banner rendering itself belongs to the presentation layer.
    pub fn in_app_notifications_enabled(&self) -> Result<bool, SupportError> {
        Ok(self.install_config()?.in_app_notifications)
    }

    pub fn set_user_identifier(
        &self,
        user_identifier: impl Into<String>,
    ) -> Result<(), SupportError> {
        self.ensure_legal(SessionMethod::SetUserIdentifier)?;
        self.inner
            .identity
            .lock()
            .expect("identity mutex poisoned")
            .user_identifier = Some(user_identifier.into());
        Ok(())
    }

    pub fn set_name_and_email(
        &self,
        name: impl Into<String>,
        email: impl Into<String>,
    ) -> Result<(), SupportError> {
        self.ensure_legal(SessionMethod::SetNameAndEmail)?;
        let mut identity = self.inner.identity.lock().expect("identity mutex poisoned");
        identity.name = Some(name.into());
        identity.email = Some(email.into());
        Ok(())
    }

    /// Register the single delegate, replacing any previous one without
    /// notification. The session holds it weakly.
    pub fn set_delegate(&self, delegate: Weak<dyn SupportDelegate>) -> Result<(), SupportError> {
        self.ensure_legal(SessionMethod::SetDelegate)?;
        self.inner.delegate.replace(delegate);
        Ok(())
    }

    /// Append a debug breadcrumb, evicting the oldest entry past the
    /// capacity. There is no pre-install buffering: calls before install are
    /// rejected like every other operation.
    pub fn leave_breadcrumb(&self, crumb: impl Into<String>) -> Result<(), SupportError> {
        self.ensure_legal(SessionMethod::LeaveBreadcrumb)?;
        self.inner
            .breadcrumbs
            .lock()
            .expect("breadcrumb mutex poisoned")
            .leave(crumb);
        Ok(())
    }

    pub fn clear_breadcrumbs(&self) -> Result<(), SupportError> {
        self.ensure_legal(SessionMethod::ClearBreadcrumbs)?;
        self.inner
            .breadcrumbs
            .lock()
            .expect("breadcrumb mutex poisoned")
            .clear();
        Ok(())
    }

    /// Replace the metadata block. It is invoked lazily, only when an issue
    /// report is assembled; absence means no metadata is attached.
    pub fn set_metadata_block(&self, block: MetadataBlock) -> Result<(), SupportError> {
        self.ensure_legal(SessionMethod::SetMetadataBlock)?;
        self.inner.metadata.replace(block);
        Ok(())
    }

    pub fn show_conversation(
        &self,
        context: HostContext,
        options: BTreeMap<String, String>,
    ) -> Result<(), SupportError> {
        self.ensure_legal(SessionMethod::ShowScreen)?;
        self.present_screen(Screen::Conversation { issue: None }, context, options);
        Ok(())
    }

    pub fn show_faqs(
        &self,
        context: HostContext,
        options: BTreeMap<String, String>,
    ) -> Result<(), SupportError> {
        self.ensure_legal(SessionMethod::ShowScreen)?;
        self.present_screen(Screen::FaqList, context, options);
        Ok(())
    }

    pub fn show_faq_section(
        &self,
        section: SectionId,
        context: HostContext,
        options: BTreeMap<String, String>,
    ) -> Result<(), SupportError> {
        self.ensure_legal(SessionMethod::ShowScreen)?;
        self.present_screen(Screen::FaqSection { section }, context, options);
        Ok(())
    }

    pub fn show_single_faq(
        &self,
        faq: FaqId,
        context: HostContext,
        options: BTreeMap<String, String>,
    ) -> Result<(), SupportError> {
        self.ensure_legal(SessionMethod::ShowScreen)?;
        self.present_screen(Screen::SingleFaq { faq }, context, options);
        Ok(())
    }

    /// Forward an opaque push-registration token to the backend. The forward
    /// happens asynchronously; a failure is logged and otherwise swallowed.
    pub fn register_device_token(&self, token: DeviceToken) -> Result<(), SupportError> {
        self.ensure_legal(SessionMethod::RegisterDeviceToken)?;
        if token.0.trim().is_empty() {
            return Err(SupportError::invalid_argument("device token must not be empty"));
        }
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            if let Err(err) = inner.backend.register_device_token(token).await {
                log::warn!("device token registration failed: {err}");
            }
        });
        Ok(())
    }

    /// Route a platform push notification. Payloads without this SDK's origin
    /// sentinel are tolerated no-ops; matching payloads open the screen
    /// inferred from their issue/section/FAQ identifiers.
    pub fn handle_remote_notification(
        &self,
        payload: &NotificationPayload,
        context: HostContext,
    ) -> Result<(), SupportError> {
        self.ensure_legal(SessionMethod::HandleNotification)?;
        self.route_payload(payload, context);
        Ok(())
    }

    /// Route a local notification; same origin filtering as the remote path.
    pub fn handle_local_notification(
        &self,
        notification: &LocalNotification,
        context: HostContext,
    ) -> Result<(), SupportError> {
        self.ensure_legal(SessionMethod::HandleNotification)?;
        self.route_payload(&notification.payload, context);
        Ok(())
    }

    /// Last known reply-notification count; 0 until the first successful
    /// remote refresh. Never touches the network.
    pub fn notification_count(&self) -> Result<u32, SupportError> {
        self.ensure_legal(SessionMethod::NotificationCount)?;
        Ok(self.inner.count.lock().expect("count mutex poisoned").value)
    }

    /// Cached count together with its refresh timestamp.
    pub fn cached_count(&self) -> Result<NotificationCount, SupportError> {
        self.ensure_legal(SessionMethod::NotificationCount)?;
        Ok(*self.inner.count.lock().expect("count mutex poisoned"))
    }

    /// Kick off a remote count refresh and return immediately. Completion
    /// updates the cache and invokes the delegate's `on_count_received` once
    /// per response, in response-arrival order. On failure (including a
    /// negative count from the backend) the cached value is retained and no
    /// dispatch happens for that attempt. Overlapping refreshes complete
    /// independently; a new call does not cancel an in-flight one.
    pub fn refresh_notification_count(&self) -> Result<(), SupportError> {
        self.ensure_legal(SessionMethod::RefreshNotificationCount)?;
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            match inner.backend.fetch_notification_count().await {
                Ok(raw) => match u32::try_from(raw) {
                    Ok(value) => inner.complete_refresh(value).await,
                    Err(_) => log::warn!(
                        "backend returned malformed notification count {raw}; keeping cached value"
                    ),
                },
                Err(err) => log::warn!("notification count refresh failed: {err}"),
            }
        });
        Ok(())
    }

    /// Inbound from the presentation layer: a support screen was dismissed
    /// back to the host. Dispatches the delegate's optional callback.
    pub fn notify_session_ended(&self) -> Result<(), SupportError> {
        self.ensure_legal(SessionMethod::SessionEnded)?;
        self.inner.delegate.notify_session_ended();
        Ok(())
    }

    /// Assemble the snapshot the backend consumes when an issue is filed:
    /// identity, the metadata block's filtered output, and the breadcrumb
    /// trail. The metadata block runs here and nowhere else.
    pub fn issue_report(&self) -> Result<IssueReport, SupportError> {
        self.ensure_legal(SessionMethod::IssueReport)?;
        let (metadata, tags) = self.inner.metadata.collect();
        let identity = self.inner.identity.lock().expect("identity mutex poisoned").clone();
        let breadcrumbs = self
            .inner
            .breadcrumbs
            .lock()
            .expect("breadcrumb mutex poisoned")
            .snapshot();
        Ok(IssueReport { identity, metadata, tags, breadcrumbs })
    }

    /// Direct access to the backend collaborator, for hosts wiring issue
    /// submission from their presentation layer.
    pub fn backend(&self) -> &B {
        &self.inner.backend
    }

    fn route_payload(&self, payload: &NotificationPayload, context: HostContext) {
        if !payload.is_support_origin() {
            log::trace!("ignoring notification with origin {:?}", payload.origin());
            return;
        }
        self.present_screen(payload.target_screen(), context, BTreeMap::new());
    }

    fn present_screen(
        &self,
        screen: Screen,
        context: HostContext,
        options: BTreeMap<String, String>,
    ) {
        let request = ScreenRequest { screen, context, options };
        log::trace!("presenting support screen {:?}", request.screen);
        self.inner.presenter.present(request);
    }
}

impl<B: SupportBackend> SessionInner<B> {
    async fn complete_refresh(&self, value: u32) {
        let _gate = self.dispatch_gate.lock().await;
        {
            let mut count = self.count.lock().expect("count mutex poisoned");
            count.value = value;
            count.last_refreshed_ms = Some(now_ms());
        }
        self.delegate.notify_count(value);
    }
}

fn now_ms() -> i64 {
    (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
}
