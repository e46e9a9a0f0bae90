//! # Subscription registry - topic name to ordered callback list.
//!
//! Registry is shared by both dispatchers:
//! - `subscribe` appends a callback to its topic (creating the topic if absent)
//! - `unsubscribe` removes the first equal callback (dropping the topic once empty)
//! - `snapshot` hands dispatch an immutable view of a topic's callbacks
//!
//! ## Architecture
//! ```text
//! RwLock<HashMap<String, Arc<Vec<Callback>>>>
//!     subscribe   ── write ─► Arc::make_mut(list).push(cb)
//!     unsubscribe ── write ─► Arc::make_mut(list).remove(first match)
//!     snapshot    ── read  ─► Arc::clone(list)          (no copy)
//! ```
//!
//! ## Rules
//! - Topic lists are copy-on-write: a snapshot held by an in-progress publish is
//!   never mutated; the next writer clones the list instead.
//! - A topic with no subscribers is never stored.
//! - Callbacks never run under the lock, so they may subscribe, unsubscribe or
//!   publish re-entrantly.
//! - Unknown topics and callbacks are silent no-ops.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::debug;

use crate::callbacks::Callback;

/// Immutable view of one topic's callbacks, in subscription order.
pub type Snapshot<P> = Arc<Vec<Callback<P>>>;

/// Thread-safe mapping from topic name to subscribed callbacks.
pub struct Registry<P> {
    topics: RwLock<HashMap<String, Snapshot<P>>>,
}

impl<P> Registry<P> {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            topics: RwLock::new(HashMap::new()),
        }
    }

    /// Appends `callback` to `topic`. Duplicates are kept and invoked once per registration.
    pub fn subscribe(&self, topic: &str, callback: Callback<P>) {
        let mut topics = self.write();
        let list = topics.entry(topic.to_owned()).or_default();
        Arc::make_mut(list).push(callback);
        debug!(topic, subscribers = list.len(), "subscribed");
    }

    /// Removes the first occurrence of `callback` from `topic`.
    ///
    /// Returns `true` if a subscription was removed.
    pub fn unsubscribe(&self, topic: &str, callback: &Callback<P>) -> bool {
        let mut topics = self.write();
        let Some(list) = topics.get_mut(topic) else {
            return false;
        };
        let Some(pos) = list.iter().position(|cb| cb == callback) else {
            return false;
        };

        Arc::make_mut(list).remove(pos);
        let remaining = list.len();
        if remaining == 0 {
            topics.remove(topic);
        }
        debug!(topic, subscribers = remaining, "unsubscribed");
        true
    }

    /// Returns the callbacks currently subscribed to `topic` (empty if none).
    pub fn snapshot(&self, topic: &str) -> Snapshot<P> {
        self.read().get(topic).cloned().unwrap_or_default()
    }

    /// Number of subscriptions on `topic`.
    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.read().get(topic).map_or(0, |list| list.len())
    }

    /// Returns sorted list of topics with at least one subscriber.
    pub fn topics(&self) -> Vec<String> {
        let mut names: Vec<String> = self.read().keys().cloned().collect();
        names.sort_unstable();
        names
    }

    /// Returns true if no topic has subscribers.
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    // Callbacks never run under the lock, so a poisoned map is still consistent.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Snapshot<P>>> {
        self.topics.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Snapshot<P>>> {
        self.topics.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<P> Default for Registry<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> std::fmt::Debug for Registry<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("topics", &self.topics())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cb(name: &'static str) -> Callback<()> {
        Callback::from_fn(name, |_| Ok(()))
    }

    fn names(snapshot: &Snapshot<()>) -> Vec<String> {
        snapshot.iter().map(|c| c.name().to_string()).collect()
    }

    #[test]
    fn test_subscribe_preserves_order() {
        let reg = Registry::new();
        reg.subscribe("t", cb("c1"));
        reg.subscribe("t", cb("c2"));
        reg.subscribe("t", cb("c3"));
        assert_eq!(names(&reg.snapshot("t")), ["c1", "c2", "c3"]);
    }

    #[test]
    fn test_duplicates_are_kept_and_removed_one_at_a_time() {
        let reg = Registry::new();
        let a = cb("a");
        let b = cb("b");
        reg.subscribe("t", a.clone());
        reg.subscribe("t", b.clone());
        reg.subscribe("t", a.clone());
        assert_eq!(reg.subscriber_count("t"), 3);

        assert!(reg.unsubscribe("t", &a));
        assert_eq!(names(&reg.snapshot("t")), ["b", "a"]);
        assert!(reg.unsubscribe("t", &a));
        assert_eq!(names(&reg.snapshot("t")), ["b"]);
    }

    #[test]
    fn test_last_unsubscribe_removes_topic() {
        let reg = Registry::new();
        let a = cb("a");
        reg.subscribe("t", a.clone());
        assert_eq!(reg.topics(), ["t"]);

        assert!(reg.unsubscribe("t", &a));
        assert!(reg.is_empty());
        assert!(reg.topics().is_empty());
        assert!(reg.snapshot("t").is_empty());
    }

    #[test]
    fn test_unknown_unsubscribe_is_noop() {
        let reg = Registry::new();
        let a = cb("a");
        let stranger = cb("a");
        reg.subscribe("t", a.clone());

        assert!(!reg.unsubscribe("missing", &a));
        assert!(!reg.unsubscribe("t", &stranger));
        assert!(reg.unsubscribe("t", &a));
        assert!(!reg.unsubscribe("t", &a));
        assert!(reg.is_empty());
    }

    #[test]
    fn test_snapshot_is_isolated_from_later_mutation() {
        let reg = Registry::new();
        let a = cb("a");
        reg.subscribe("t", a.clone());
        reg.subscribe("t", cb("b"));

        let snap = reg.snapshot("t");
        reg.unsubscribe("t", &a);
        reg.subscribe("t", cb("c"));

        assert_eq!(names(&snap), ["a", "b"]);
        assert_eq!(names(&reg.snapshot("t")), ["b", "c"]);
    }

    #[test]
    fn test_topics_sorted() {
        let reg = Registry::new();
        reg.subscribe("zeta", cb("z"));
        reg.subscribe("alpha", cb("a"));
        reg.subscribe("mid", cb("m"));
        assert_eq!(reg.topics(), ["alpha", "mid", "zeta"]);
    }

    #[test]
    fn test_concurrent_mutation_keeps_counts() {
        let reg = Registry::new();
        let keeper = cb("keeper");
        reg.subscribe("t", keeper.clone());

        std::thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|| {
                    for _ in 0..200 {
                        let c = cb("tmp");
                        reg.subscribe("t", c.clone());
                        let snap = reg.snapshot("t");
                        assert!(snap.contains(&keeper));
                        assert!(snap.contains(&c));
                        assert!(reg.unsubscribe("t", &c));
                    }
                });
            }
        });

        assert_eq!(names(&reg.snapshot("t")), ["keeper"]);
    }
}
