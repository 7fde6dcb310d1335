//! Transient user-facing notifications.
//!
//! A single slot: showing a new notification replaces whatever is visible
//! and restarts the timer.

use std::time::Duration;

use tokio::time::Instant;
use tracing::info;

use crate::config::NOTIFICATION_TTL;

/// A message with its expiry deadline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub expires_at: Instant,
}

impl Notification {
    /// Whether the deadline has passed at `now`.
    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// Single-slot notification sink shared by every coordinator.
#[derive(Debug)]
pub struct Notifier {
    slot: Option<Notification>,
    ttl: Duration,
}

impl Notifier {
    /// Empty notifier whose notifications last `ttl`.
    pub const fn new(ttl: Duration) -> Self {
        Self { slot: None, ttl }
    }

    /// Show `message`, superseding any visible notification.
    pub fn notify(&mut self, message: impl Into<String>) {
        let message = message.into();
        info!(%message, "notification");
        self.slot = Some(Notification {
            message,
            expires_at: Instant::now() + self.ttl,
        });
    }

    /// The visible notification, if it has not expired yet.
    pub fn current(&self) -> Option<&Notification> {
        self.slot.as_ref().filter(|n| !n.is_expired(Instant::now()))
    }

    /// Text of the visible notification.
    pub fn message(&self) -> Option<&str> {
        self.current().map(|n| n.message.as_str())
    }

    /// Hide the notification before it expires.
    pub fn dismiss(&mut self) {
        self.slot = None;
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new(NOTIFICATION_TTL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn expires_after_ttl() {
        let mut notifier = Notifier::default();
        notifier.notify("Session cleared successfully");
        assert_eq!(notifier.message(), Some("Session cleared successfully"));

        tokio::time::advance(Duration::from_millis(2_999)).await;
        assert!(notifier.current().is_some());

        tokio::time::advance(Duration::from_millis(1)).await;
        assert!(notifier.current().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn new_notification_supersedes_and_resets_timer() {
        let mut notifier = Notifier::default();
        notifier.notify("first");
        tokio::time::advance(Duration::from_secs(2)).await;

        notifier.notify("second");
        assert_eq!(notifier.message(), Some("second"));

        tokio::time::advance(Duration::from_secs(2)).await;
        assert_eq!(notifier.message(), Some("second"));

        tokio::time::advance(Duration::from_secs(1)).await;
        assert_eq!(notifier.message(), None);
    }

    #[test]
    fn dismiss_clears_slot() {
        let mut notifier = Notifier::default();
        notifier.notify("hello");
        notifier.dismiss();
        assert!(notifier.current().is_none());
    }
}
