use crate::types::ScreenRequest;

/// UI presentation boundary. The session emits fire-and-forget requests;
/// rendering, navigation, and dismissal are entirely the presenter's concern.
///
/// `present` is called on the session caller's context and must hand off
/// promptly — it must never block on rendering or I/O. When the presented
/// screen is dismissed back to the host, the presentation layer reports it
/// through [`crate::SupportSession::notify_session_ended`].
pub trait ScreenPresenter: Send + Sync {
    fn present(&self, request: ScreenRequest);
}
