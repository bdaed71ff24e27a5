//! Transient user-facing notices: a queue of alerts plus the single
//! short-lived banner used when a comment is posted.

use std::time::{Duration, Instant};

use tokio::sync::{broadcast, Mutex};
use tracing::debug;

/// Sign-in and sign-up alerts.
pub const AUTH_ALERT_TTL: Duration = Duration::from_millis(6000);
/// Feedback form alerts.
pub const FORM_ALERT_TTL: Duration = Duration::from_millis(3000);
/// "Comment posted" banner.
pub const BANNER_TTL: Duration = Duration::from_millis(5000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertKind {
    Success,
    Error,
    Info,
}

impl AlertKind {
    pub fn title(self) -> &'static str {
        match self {
            AlertKind::Success => "Success",
            AlertKind::Error => "Error",
            AlertKind::Info => "Info",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AlertId(u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub id: AlertId,
    pub kind: AlertKind,
    pub message: String,
    /// `None` keeps the alert until it is dismissed.
    pub expires_at: Option<Instant>,
}

impl Alert {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|deadline| now >= deadline)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Banner {
    pub message: String,
    pub expires_at: Instant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    Alert(Alert),
    Banner(Banner),
}

#[derive(Default)]
struct ChannelState {
    next_id: u64,
    alerts: Vec<Alert>,
    banner: Option<Banner>,
}

pub struct NotificationChannel {
    inner: Mutex<ChannelState>,
    events: broadcast::Sender<Notification>,
}

impl Default for NotificationChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationChannel {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            inner: Mutex::new(ChannelState::default()),
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.events.subscribe()
    }

    /// Appends an alert. Alerts are kept in the order their pushes complete.
    pub async fn push(
        &self,
        kind: AlertKind,
        message: impl Into<String>,
        ttl: Option<Duration>,
    ) -> AlertId {
        self.insert(kind, message.into(), ttl, false).await
    }

    /// Shows an alert in the single slot that stays until replaced or
    /// dismissed. Any earlier alert without an expiry is dropped first.
    pub async fn replace_sticky(&self, kind: AlertKind, message: impl Into<String>) -> AlertId {
        self.insert(kind, message.into(), None, true).await
    }

    async fn insert(
        &self,
        kind: AlertKind,
        message: String,
        ttl: Option<Duration>,
        replace_sticky: bool,
    ) -> AlertId {
        let alert = {
            let mut guard = self.inner.lock().await;
            if replace_sticky {
                guard.alerts.retain(|alert| alert.expires_at.is_some());
            }
            guard.next_id += 1;
            let alert = Alert {
                id: AlertId(guard.next_id),
                kind,
                message,
                expires_at: ttl.map(|ttl| Instant::now() + ttl),
            };
            guard.alerts.push(alert.clone());
            alert
        };
        debug!(id = alert.id.0, kind = ?alert.kind, message = %alert.message, "alert pushed");
        let _ = self.events.send(Notification::Alert(alert.clone()));
        alert.id
    }

    pub async fn dismiss(&self, id: AlertId) -> bool {
        let mut guard = self.inner.lock().await;
        let before = guard.alerts.len();
        guard.alerts.retain(|alert| alert.id != id);
        guard.alerts.len() != before
    }

    pub async fn clear_info(&self) {
        self.inner
            .lock()
            .await
            .alerts
            .retain(|alert| alert.kind != AlertKind::Info);
    }

    pub async fn active(&self) -> Vec<Alert> {
        self.active_at(Instant::now()).await
    }

    /// Drops alerts whose timer ran out by `now` and returns the rest.
    pub async fn active_at(&self, now: Instant) -> Vec<Alert> {
        let mut guard = self.inner.lock().await;
        guard.alerts.retain(|alert| !alert.is_expired(now));
        guard.alerts.clone()
    }

    pub async fn show_banner(&self, message: impl Into<String>, ttl: Duration) {
        let banner = Banner {
            message: message.into(),
            expires_at: Instant::now() + ttl,
        };
        self.inner.lock().await.banner = Some(banner.clone());
        let _ = self.events.send(Notification::Banner(banner));
    }

    pub async fn banner(&self) -> Option<Banner> {
        self.banner_at(Instant::now()).await
    }

    pub async fn banner_at(&self, now: Instant) -> Option<Banner> {
        let mut guard = self.inner.lock().await;
        if guard
            .banner
            .as_ref()
            .is_some_and(|banner| now >= banner.expires_at)
        {
            guard.banner = None;
        }
        guard.banner.clone()
    }

    pub async fn dismiss_banner(&self) {
        self.inner.lock().await.banner = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn alerts_keep_push_order_and_expire_individually() {
        let channel = NotificationChannel::new();
        let short = channel
            .push(AlertKind::Error, "first", Some(FORM_ALERT_TTL))
            .await;
        let sticky = channel.push(AlertKind::Success, "second", None).await;

        let now = Instant::now();
        let ids: Vec<_> = channel.active_at(now).await.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![short, sticky]);

        let later = now + FORM_ALERT_TTL + Duration::from_millis(1);
        let remaining = channel.active_at(later).await;
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].message, "second");
    }

    #[tokio::test]
    async fn dismiss_and_clear_info_remove_alerts() {
        let channel = NotificationChannel::new();
        let info = channel.push(AlertKind::Info, "working", None).await;
        let error = channel.push(AlertKind::Error, "failed", None).await;

        channel.clear_info().await;
        let active = channel.active().await;
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, error);

        assert!(!channel.dismiss(info).await);
        assert!(channel.dismiss(error).await);
        assert!(channel.active().await.is_empty());
    }

    #[tokio::test]
    async fn sticky_alerts_replace_each_other_but_keep_timed_ones() {
        let channel = NotificationChannel::new();
        channel
            .push(AlertKind::Success, "saved", Some(FORM_ALERT_TTL))
            .await;
        for _ in 0..5 {
            channel.replace_sticky(AlertKind::Error, "failed").await;
        }
        let last = channel.replace_sticky(AlertKind::Info, "working").await;

        let active = channel.active().await;
        assert_eq!(active.len(), 2);
        assert_eq!(active[0].message, "saved");
        assert_eq!(active[1].id, last);
        assert_eq!(active[1].expires_at, None);
    }

    #[tokio::test]
    async fn banner_is_separate_from_alerts_and_times_out() {
        let channel = NotificationChannel::new();
        let mut rx = channel.subscribe();
        channel.show_banner("posted", BANNER_TTL).await;

        assert!(channel.active().await.is_empty());
        assert_eq!(channel.banner().await.map(|b| b.message), Some("posted".into()));
        match rx.recv().await.expect("event") {
            Notification::Banner(banner) => assert_eq!(banner.message, "posted"),
            other => panic!("unexpected notification: {other:?}"),
        }

        let later = Instant::now() + BANNER_TTL + Duration::from_millis(1);
        assert!(channel.banner_at(later).await.is_none());
        assert!(channel.banner().await.is_none());
    }
}
