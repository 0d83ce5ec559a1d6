//! User-notification boundary.

use tracing::{error, info, warn};

use roundtable_types::event::Severity;

/// Sink for user-facing notices (validation failures, pauses on error).
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str, severity: Severity);
}

/// Notifier that only writes to the tracing log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, message: &str, severity: Severity) {
        match severity {
            Severity::Info => info!(notice = message),
            Severity::Warning => warn!(notice = message),
            Severity::Error => error!(notice = message),
        }
    }
}
