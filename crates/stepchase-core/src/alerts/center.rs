//! Deduplicated FIFO alert queue with publish/subscribe delivery.
//!
//! Posting appends to the queue and hands the alert to a dedicated dispatcher
//! thread, which calls every subscriber in post order. Queue mutation and the
//! hand-off happen under the same lock, so alerts posted from different
//! threads reach subscribers in the same order they entered the queue.
//!
//! Async consumers can use [`AlertCenter::watch`] instead of a callback.

use std::collections::VecDeque;
use std::fmt;
use std::sync::{mpsc, Arc, Mutex};
use std::thread;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use super::alert::Alert;
use crate::lock;

const BROADCAST_CAPACITY: usize = 64;

/// Handle returned by [`AlertCenter::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubscriptionId(u64);

type Callback = Arc<dyn Fn(&Alert) + Send + Sync>;

#[derive(Default)]
struct Subscribers {
    next_id: u64,
    entries: Vec<(SubscriptionId, Callback)>,
}

struct Queue {
    alerts: VecDeque<Alert>,
    /// `None` when the dispatcher thread could not be spawned; delivery then
    /// happens on the posting thread.
    dispatcher: Option<mpsc::Sender<Alert>>,
}

struct Inner {
    queue: Mutex<Queue>,
    subscribers: Arc<Mutex<Subscribers>>,
    broadcast: broadcast::Sender<Alert>,
}

/// Shared alert queue. Cloning yields another handle to the same queue.
#[derive(Clone)]
pub struct AlertCenter {
    inner: Arc<Inner>,
}

impl AlertCenter {
    pub fn new() -> Self {
        let subscribers = Arc::new(Mutex::new(Subscribers::default()));
        let dispatcher = spawn_dispatcher(Arc::clone(&subscribers));
        let (broadcast, _) = broadcast::channel(BROADCAST_CAPACITY);
        Self {
            inner: Arc::new(Inner {
                queue: Mutex::new(Queue {
                    alerts: VecDeque::new(),
                    dispatcher,
                }),
                subscribers,
                broadcast,
            }),
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn len(&self) -> usize {
        lock(&self.inner.queue).alerts.len()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.inner.queue).alerts.is_empty()
    }

    /// The alert that should be shown now.
    pub fn front(&self) -> Option<Alert> {
        lock(&self.inner.queue).alerts.front().cloned()
    }

    /// The alert queued behind [`front`](Self::front), if any.
    pub fn second(&self) -> Option<Alert> {
        lock(&self.inner.queue).alerts.get(1).cloned()
    }

    /// Copy of the whole queue, front first.
    pub fn alerts(&self) -> Vec<Alert> {
        lock(&self.inner.queue).alerts.iter().cloned().collect()
    }

    pub fn contains(&self, alert: &Alert) -> bool {
        lock(&self.inner.queue).alerts.contains(alert)
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Queue `alert` and notify subscribers.
    ///
    /// Returns `false` without notifying anyone when an alert with the same
    /// text is already queued.
    pub fn post(&self, alert: Alert) -> bool {
        let mut queue = lock(&self.inner.queue);
        if queue.alerts.contains(&alert) {
            tracing::trace!(text = alert.text(), "alert already queued");
            return false;
        }

        tracing::debug!(text = alert.text(), severity = ?alert.severity(), "alert posted");
        queue.alerts.push_back(alert.clone());
        // No receivers is not an error.
        let _ = self.inner.broadcast.send(alert.clone());

        let undelivered = match &queue.dispatcher {
            Some(tx) => tx.send(alert).err().map(|mpsc::SendError(alert)| alert),
            None => Some(alert),
        };
        if let Some(alert) = undelivered {
            if queue.dispatcher.take().is_some() {
                tracing::warn!("alert dispatcher stopped, delivering inline");
            }
            drop(queue);
            deliver(&self.inner.subscribers, &alert);
        }
        true
    }

    /// Remove the queued alert equal to `alert`. No-op if absent.
    pub fn clear(&self, alert: &Alert) {
        let mut queue = lock(&self.inner.queue);
        if let Some(index) = queue.alerts.iter().position(|queued| queued == alert) {
            queue.alerts.remove(index);
        }
    }

    pub fn clear_all(&self) {
        lock(&self.inner.queue).alerts.clear();
    }

    /// Register `callback` for every future successful post.
    ///
    /// Callbacks run on the dispatcher thread and may call back into this
    /// `AlertCenter`, or into an engine that posted while holding its own
    /// locks.
    ///
    /// If the dispatcher thread could not be spawned, callbacks run on the
    /// posting thread instead. Posters may then still hold their locks, so a
    /// callback that locks the engine or its progress model can deadlock.
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&Alert) + Send + Sync + 'static,
    {
        let mut subscribers = lock(&self.inner.subscribers);
        let id = SubscriptionId(subscribers.next_id);
        subscribers.next_id += 1;
        subscribers.entries.push((id, Arc::new(callback)));
        id
    }

    /// Returns `false` if `id` was not subscribed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = lock(&self.inner.subscribers);
        let before = subscribers.entries.len();
        subscribers.entries.retain(|(entry, _)| *entry != id);
        subscribers.entries.len() != before
    }

    /// Receive posted alerts through a broadcast channel.
    ///
    /// Only alerts posted after this call are received. A receiver that falls
    /// more than a few dozen alerts behind gets `RecvError::Lagged`.
    pub fn watch(&self) -> broadcast::Receiver<Alert> {
        self.inner.broadcast.subscribe()
    }
}

impl Default for AlertCenter {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for AlertCenter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlertCenter")
            .field("alerts", &self.alerts())
            .field("subscribers", &lock(&self.inner.subscribers).entries.len())
            .finish()
    }
}

fn spawn_dispatcher(subscribers: Arc<Mutex<Subscribers>>) -> Option<mpsc::Sender<Alert>> {
    let (tx, rx) = mpsc::channel::<Alert>();
    let spawned = thread::Builder::new()
        .name("alert-dispatch".into())
        .spawn(move || {
            for alert in rx {
                deliver(&subscribers, &alert);
            }
        });

    match spawned {
        Ok(_) => Some(tx),
        Err(e) => {
            tracing::error!(error = %e, "failed to spawn alert dispatcher");
            None
        }
    }
}

fn deliver(subscribers: &Mutex<Subscribers>, alert: &Alert) {
    // Snapshot so callbacks can subscribe/unsubscribe without deadlocking.
    let callbacks: Vec<Callback> = lock(subscribers)
        .entries
        .iter()
        .map(|(_, callback)| Arc::clone(callback))
        .collect();
    for callback in callbacks {
        callback(alert);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    const TIMEOUT: Duration = Duration::from_secs(1);

    fn recorder(center: &AlertCenter) -> mpsc::Receiver<Alert> {
        let (tx, rx) = mpsc::channel();
        let tx = Mutex::new(tx);
        center.subscribe(move |alert| {
            let _ = lock(&tx).send(alert.clone());
        });
        rx
    }

    #[test]
    fn starts_empty() {
        let center = AlertCenter::new();
        assert_eq!(center.len(), 0);
        assert!(center.is_empty());
        assert!(center.front().is_none());
        assert!(center.second().is_none());
    }

    #[test]
    fn post_appends_in_order() {
        let center = AlertCenter::new();
        center.post(Alert::new("first"));
        center.post(Alert::new("second"));
        center.post(Alert::new("third"));

        assert_eq!(center.len(), 3);
        assert_eq!(center.front(), Some(Alert::new("first")));
        assert_eq!(center.second(), Some(Alert::new("second")));
    }

    #[test]
    fn duplicate_text_is_ignored() {
        let center = AlertCenter::new();
        assert!(center.post(Alert::new("this is an alert")));
        assert!(!center.post(Alert::new("this is an alert")));
        assert_eq!(center.len(), 1);
    }

    #[test]
    fn second_needs_two_alerts() {
        let center = AlertCenter::new();
        center.post(Alert::new("only"));
        assert!(center.second().is_none());
    }

    #[test]
    fn clear_removes_matching_alert() {
        let center = AlertCenter::new();
        center.post(Alert::new("a"));
        center.post(Alert::new("b"));

        center.clear(&Alert::new("a"));

        assert_eq!(center.alerts(), vec![Alert::new("b")]);
    }

    #[test]
    fn clear_missing_alert_is_noop() {
        let center = AlertCenter::new();
        center.post(Alert::new("a"));
        center.clear(&Alert::new("missing"));
        assert_eq!(center.len(), 1);
    }

    #[test]
    fn cleared_alert_can_be_posted_again() {
        let center = AlertCenter::new();
        let alert = Alert::new("again");
        center.post(alert.clone());
        center.clear(&alert);
        assert!(center.post(alert));
        assert_eq!(center.len(), 1);
    }

    #[test]
    fn clear_all_empties_queue() {
        let center = AlertCenter::new();
        center.post(Alert::new("a"));
        center.post(Alert::new("b"));
        center.clear_all();
        assert!(center.is_empty());
    }

    #[test]
    fn subscribers_are_notified() {
        let center = AlertCenter::new();
        let rx = recorder(&center);

        center.post(Alert::new("notify me"));

        assert_eq!(rx.recv_timeout(TIMEOUT).unwrap(), Alert::new("notify me"));
    }

    #[test]
    fn duplicate_post_does_not_notify() {
        let center = AlertCenter::new();
        let rx = recorder(&center);

        center.post(Alert::new("once"));
        center.post(Alert::new("once"));
        center.post(Alert::new("marker"));

        assert_eq!(rx.recv_timeout(TIMEOUT).unwrap(), Alert::new("once"));
        assert_eq!(rx.recv_timeout(TIMEOUT).unwrap(), Alert::new("marker"));
    }

    #[test]
    fn notifications_keep_post_order() {
        let center = AlertCenter::new();
        let rx = recorder(&center);

        for i in 0..20 {
            center.post(Alert::new(format!("alert {i}")));
        }

        for i in 0..20 {
            assert_eq!(
                rx.recv_timeout(TIMEOUT).unwrap(),
                Alert::new(format!("alert {i}"))
            );
        }
    }

    #[test]
    fn delivery_happens_off_the_posting_thread() {
        let center = AlertCenter::new();
        let (tx, rx) = mpsc::channel();
        let tx = Mutex::new(tx);
        center.subscribe(move |_| {
            let _ = lock(&tx).send(thread::current().id());
        });

        center.post(Alert::new("where"));

        let delivered_on = rx.recv_timeout(TIMEOUT).unwrap();
        assert_ne!(delivered_on, thread::current().id());
    }

    #[test]
    fn unsubscribed_callback_is_not_called() {
        let center = AlertCenter::new();
        let (tx, rx) = mpsc::channel::<Alert>();
        let tx = Mutex::new(tx);
        let id = center.subscribe(move |alert| {
            let _ = lock(&tx).send(alert.clone());
        });
        let marker = recorder(&center);

        assert!(center.unsubscribe(id));
        assert!(!center.unsubscribe(id));
        center.post(Alert::new("after"));

        marker.recv_timeout(TIMEOUT).unwrap();
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn subscriber_may_clear_the_alert() {
        let center = AlertCenter::new();
        let handle = center.clone();
        let (tx, rx) = mpsc::channel();
        let tx = Mutex::new(tx);
        center.subscribe(move |alert| {
            handle.clear(alert);
            let _ = lock(&tx).send(());
        });

        center.post(Alert::new("dismiss"));
        rx.recv_timeout(TIMEOUT).unwrap();

        assert!(center.is_empty());
    }

    #[test]
    fn watch_receives_posted_alerts() {
        let center = AlertCenter::new();
        let mut rx = center.watch();

        center.post(Alert::new("watched"));
        center.post(Alert::new("watched"));

        assert_eq!(rx.try_recv().unwrap(), Alert::new("watched"));
        assert!(rx.try_recv().is_err());
    }
}
