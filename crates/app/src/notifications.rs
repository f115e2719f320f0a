//! User-facing notifications.

use mockall::automock;
use tracing::{error, info, warn};

/// Severity of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// Short message meant for the visitor, e.g. a toast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    #[must_use]
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

#[automock]
pub trait Notifier: Send + Sync {
    /// Show a notice to the visitor.
    fn notify(&self, notice: Notice);
}

/// Notifier that emits notices as log events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Info => info!(target: "rouge::notice", "{}", notice.message),
            NoticeLevel::Warning => warn!(target: "rouge::notice", "{}", notice.message),
            NoticeLevel::Error => error!(target: "rouge::notice", "{}", notice.message),
        }
    }
}
