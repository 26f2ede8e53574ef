//! Non-blocking user notifications.

/// Seam for surfacing action results to the user.
///
/// Implementations must not block: the controller emits a notification and
/// moves on. A UI crate would render toasts; the default logs.
pub trait Notifier: Send + Sync {
    fn success(&self, title: &str, message: &str);
    fn error(&self, title: &str, message: &str);
}

/// Default notifier that routes notifications through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn success(&self, title: &str, message: &str) {
        tracing::info!(title, message, "notification");
    }

    fn error(&self, title: &str, message: &str) {
        tracing::warn!(title, message, "notification");
    }
}
