use learnease_core::{Notification, Notifier};
use tracing::{info, warn};

/// Shows notifications on the desktop through the OS notification service.
pub struct DesktopNotifier;

impl Notifier for DesktopNotifier {
    fn notify(&self, notification: &Notification) {
        info!(title = %notification.title, "{}", notification.message);
        if let Err(e) = notify_rust::Notification::new()
            .summary(&notification.title)
            .body(&notification.message)
            .show()
        {
            warn!(error = %e, "desktop notification failed");
        }
    }
}
