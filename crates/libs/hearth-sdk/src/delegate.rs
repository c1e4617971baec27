use std::sync::{Arc, Mutex, Weak};

/// Host-registered recipient of session callbacks. At most one delegate is
/// registered at a time, and the session only holds it weakly: registering
/// never extends the delegate's lifetime.
pub trait SupportDelegate: Send + Sync {
    /// A remote notification-count refresh completed with a fresh value.
    fn on_count_received(&self, count: u32);

    /// A support screen was dismissed back to the host. Optional.
    fn on_session_ended(&self) {}
}

/// Single-slot weak delegate holder. Replacement is atomic; callbacks to a
/// dropped delegate are discarded, never queued for re-delivery.
#[derive(Default)]
pub(crate) struct DelegateSlot {
    slot: Mutex<Option<Weak<dyn SupportDelegate>>>,
}

impl DelegateSlot {
    pub(crate) fn replace(&self, delegate: Weak<dyn SupportDelegate>) {
        *self.slot.lock().expect("delegate slot mutex poisoned") = Some(delegate);
    }

    // Upgrade under the lock, invoke outside it, so a delegate may re-register
    // from inside its own callback.
    fn live(&self) -> Option<Arc<dyn SupportDelegate>> {
        self.slot
            .lock()
            .expect("delegate slot mutex poisoned")
            .as_ref()
            .and_then(Weak::upgrade)
    }

    pub(crate) fn notify_count(&self, count: u32) {
        match self.live() {
            Some(delegate) => delegate.on_count_received(count),
            None => log::trace!("no live delegate; dropping count callback ({count})"),
        }
    }

    pub(crate) fn notify_session_ended(&self) {
        if let Some(delegate) = self.live() {
            delegate.on_session_ended();
        }
    }
}
