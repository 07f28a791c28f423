//! User-facing feedback for cart operations.
//!
//! Every cart operation emits exactly one [`Notification`] on failure and at
//! most one on success. Delivery is fire-and-forget.

use std::fmt;

use tokio::sync::mpsc;

/// Severity of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Success,
    Error,
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Success => "success",
            Self::Error => "error",
            Self::Info => "info",
        })
    }
}

/// A message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub severity: Severity,
    pub message: String,
}

impl Notification {
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Success,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            message: message.into(),
        }
    }
}

/// Transient message surface (toasts, status lines, logs).
pub trait Notifier: Send + Sync {
    /// Deliver a notification. Must not block.
    fn notify(&self, notification: Notification);
}

/// Emits notifications as `tracing` events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: Notification) {
        match notification.severity {
            Severity::Error => tracing::warn!(
                severity = %notification.severity,
                "{}",
                notification.message
            ),
            Severity::Success | Severity::Info => tracing::info!(
                severity = %notification.severity,
                "{}",
                notification.message
            ),
        }
    }
}

/// Forwards notifications into an unbounded channel.
///
/// The receiving half is drained by a UI loop or inspected by tests.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    tx: mpsc::UnboundedSender<Notification>,
}

impl ChannelNotifier {
    /// Create a notifier and the receiver its messages arrive on.
    #[must_use]
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, notification: Notification) {
        // A dropped receiver means nobody is listening any more.
        let _ = self.tx.send(notification);
    }
}
