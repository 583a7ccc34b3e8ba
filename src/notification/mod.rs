#![doc = include_str!("README.md")]

use std::fmt::{Display, Formatter};

use async_channel::{Receiver, Sender};

/// Log target used by [`LogNotificationSink`].
pub const NOTIFICATION_LOG_TARGET: &str = "datacatalog::notification";

/// Visual weight of a toast notification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Severity {
    Success,
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Success => "success",
            Severity::Error => "error",
        }
    }
}

impl Display for Severity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single user-facing message produced by a settled mutation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notification {
    pub severity: Severity,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
        }
    }
}

/// Fire-and-forget receiver of notifications.
///
/// Implementations must not fail and must not block; the runner calls
/// [`NotificationSink::notify`] from inside its completion handler.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Sink that writes every notification through the `log` facade.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogNotificationSink;

impl NotificationSink for LogNotificationSink {
    fn notify(&self, notification: Notification) {
        match notification.severity {
            Severity::Success => {
                log::info!(target: NOTIFICATION_LOG_TARGET, "{}", notification.message)
            }
            Severity::Error => {
                log::warn!(target: NOTIFICATION_LOG_TARGET, "{}", notification.message)
            }
        }
    }
}

/// Sink backed by an unbounded channel so the view layer can drain toasts at
/// its own pace.
#[derive(Clone, Debug)]
pub struct ChannelNotificationSink {
    sender: Sender<Notification>,
}

impl ChannelNotificationSink {
    /// Creates a sink together with the receiving end of its channel.
    pub fn new() -> (Self, Receiver<Notification>) {
        let (sender, receiver) = async_channel::unbounded();
        (Self { sender }, receiver)
    }
}

impl NotificationSink for ChannelNotificationSink {
    fn notify(&self, notification: Notification) {
        // A dropped receiver means nobody is rendering toasts anymore.
        if self.sender.try_send(notification).is_err() {
            log::debug!(
                target: NOTIFICATION_LOG_TARGET,
                "notification dropped: receiver closed"
            );
        }
    }
}
