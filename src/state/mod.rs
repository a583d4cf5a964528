//! Process-wide state containers.
//!
//! A [`Store`] holds one value, hands out clone snapshots, and notifies
//! subscribers synchronously on every change, emitting the current value on
//! subscribe. List stores keyed by `id` get set-semantics mutation helpers:
//! [`Store::upsert`] is a single idempotent insert-or-update.

use tracing::warn;

use crate::model::{DataSource, ReportConfig, User};

/// Handle returned by [`Store::subscribe`]; pass it back to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subscription(u64);

type Subscriber<T> = Box<dyn Fn(&T) + Send>;

/// A single-value state container with change notification.
pub struct Store<T> {
    value: T,
    next_id: u64,
    subscribers: Vec<(u64, Subscriber<T>)>,
}

impl<T: std::fmt::Debug> std::fmt::Debug for Store<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("value", &self.value)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

impl<T: Clone> Store<T> {
    pub fn new(initial: T) -> Self {
        Self {
            value: initial,
            next_id: 0,
            subscribers: Vec::new(),
        }
    }

    /// Snapshot of the current value.
    pub fn get(&self) -> T {
        self.value.clone()
    }

    /// Borrowing access to the current value.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.value)
    }

    /// Replace the value and notify subscribers.
    pub fn set(&mut self, value: T) {
        self.value = value;
        self.notify();
    }

    /// Mutate the value in place and notify subscribers.
    pub fn update(&mut self, f: impl FnOnce(&mut T)) {
        f(&mut self.value);
        self.notify();
    }

    /// Register a subscriber. It is called immediately with the current
    /// value, then on every change until unsubscribed.
    pub fn subscribe(&mut self, f: impl Fn(&T) + Send + 'static) -> Subscription {
        f(&self.value);
        let id = self.next_id;
        self.next_id += 1;
        self.subscribers.push((id, Box::new(f)));
        Subscription(id)
    }

    pub fn unsubscribe(&mut self, subscription: Subscription) {
        self.subscribers.retain(|(id, _)| *id != subscription.0);
    }

    fn notify(&self) {
        for (_, subscriber) in &self.subscribers {
            subscriber(&self.value);
        }
    }
}

impl<T: Clone + Default> Default for Store<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

/// Types stored in id-keyed list stores.
pub trait Keyed {
    fn key(&self) -> &str;
}

impl Keyed for ReportConfig {
    fn key(&self) -> &str {
        &self.id
    }
}

impl Keyed for DataSource {
    fn key(&self) -> &str {
        &self.id
    }
}

impl Keyed for User {
    fn key(&self) -> &str {
        &self.id
    }
}

impl<T: Keyed + Clone> Store<Vec<T>> {
    /// Replace the list, dropping entries whose key repeats (first
    /// occurrence wins).
    pub fn set_deduped(&mut self, items: Vec<T>) {
        let total = items.len();
        let mut unique: Vec<T> = Vec::with_capacity(total);
        for item in items {
            if unique.iter().any(|existing| existing.key() == item.key()) {
                continue;
            }
            unique.push(item);
        }
        if unique.len() != total {
            warn!(removed = total - unique.len(), "dropped duplicate entries");
        }
        self.set(unique);
    }

    /// Insert or update by key in one idempotent operation.
    pub fn upsert(&mut self, item: T) {
        self.update(|items| {
            items.retain(|existing| existing.key() != item.key());
            items.push(item);
        });
    }

    /// Remove the entry with `key`, if present.
    pub fn remove(&mut self, key: &str) {
        self.update(|items| items.retain(|existing| existing.key() != key));
    }

    /// Find an entry by key.
    pub fn find(&self, key: &str) -> Option<T> {
        self.value.iter().find(|item| item.key() == key).cloned()
    }
}

/// The catalog snapshot shared across the process.
pub type CatalogStore = Store<Vec<DataSource>>;

/// The saved-report list shared across the process.
pub type ReportStore = Store<Vec<ReportConfig>>;

/// The signed-in user, if any.
pub type UserStore = Store<Option<User>>;
