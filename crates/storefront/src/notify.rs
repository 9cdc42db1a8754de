//! User-visible notifications.
//!
//! The storefront reports every outcome a shopper should see (applied promo
//! codes, validation problems, failed backend calls) as a [`Notification`]
//! on a broadcast channel. Front-ends subscribe and render them as toasts.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;

use crate::error::add_breadcrumb;

/// Notifications kept for slow subscribers before older ones are dropped.
const CHANNEL_CAPACITY: usize = 64;

/// Severity of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Success,
    Info,
    Error,
}

impl fmt::Display for NotificationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Success => "success",
            Self::Info => "info",
            Self::Error => "error",
        })
    }
}

/// A single user-visible message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
    pub at: DateTime<Utc>,
}

/// Publishing side of the notification surface.
#[derive(Debug, Clone)]
pub struct Notifier {
    sender: broadcast::Sender<Notification>,
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier {
    /// Create a notifier with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    /// Subscribe to notifications published from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.sender.subscribe()
    }

    /// Publish a success notification.
    pub fn success(&self, message: impl Into<String>) {
        self.publish(NotificationLevel::Success, message.into());
    }

    /// Publish an informational notification.
    pub fn info(&self, message: impl Into<String>) {
        self.publish(NotificationLevel::Info, message.into());
    }

    /// Publish an error notification.
    pub fn error(&self, message: impl Into<String>) {
        self.publish(NotificationLevel::Error, message.into());
    }

    fn publish(&self, level: NotificationLevel, message: String) {
        tracing::info!(level = %level, message = %message, "Notification");
        let level_name = level.to_string();
        let data = [("level", level_name.as_str())];
        add_breadcrumb("notification", &message, Some(data.as_slice()));

        // No subscribers is fine: nobody is looking at the toasts.
        let _ = self.sender.send(Notification {
            level,
            message,
            at: Utc::now(),
        });
    }
}

/// Drain every notification currently queued on `receiver`.
///
/// Lagged notifications are skipped.
pub fn drain(receiver: &mut broadcast::Receiver<Notification>) -> Vec<Notification> {
    let mut out = Vec::new();
    loop {
        match receiver.try_recv() {
            Ok(n) => out.push(n),
            Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "Notification subscriber lagged");
            }
            Err(_) => break,
        }
    }
    out
}
