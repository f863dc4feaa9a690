//! User-visible notifications

use tracing::{error, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Blocking alert the user has to acknowledge
    Alert,
    /// Non-blocking warning
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub severity: Severity,
    pub message: String,
}

impl Notice {
    pub fn alert<S: Into<String>>(message: S) -> Self {
        Self {
            severity: Severity::Alert,
            message: message.into(),
        }
    }

    pub fn warning<S: Into<String>>(message: S) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
        }
    }
}

/// Surface that shows notices to the user
pub trait Notifier {
    fn notify(&mut self, notice: Notice);
}

/// Notifier that only writes notices to the log
#[derive(Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&mut self, notice: Notice) {
        match notice.severity {
            Severity::Alert => error!("{}", notice.message),
            Severity::Warning => warn!("{}", notice.message),
        }
    }
}

impl Notifier for Vec<Notice> {
    fn notify(&mut self, notice: Notice) {
        self.push(notice);
    }
}
