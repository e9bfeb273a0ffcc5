//! Long-lived subscription registrations and their listener index.

use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
    sync::Arc,
};

use fnv::{FnvHashMap, FnvHashSet};
use futures::future::BoxFuture;

use crate::{
    ast::AstNode,
    executor::{FragmentMap, RequestState},
    value::{MapValue, Value},
};

/// Key identifying one live subscription registration.
///
/// Keys are handed out in ascending order, but removing registrations
/// compacts the counter, so a key is only meaningful between its own
/// [`subscribe`] and [`unsubscribe`].
///
/// [`subscribe`]: crate::RootNode::subscribe
/// [`unsubscribe`]: crate::RootNode::unsubscribe
pub type SubscriptionKey = usize;

/// Field name a subscription listens on.
pub type SubscriptionName = String;

/// Callback invoked once per delivered event with a lazy future of the
/// wrapped response document.
pub type SubscriptionCallback = Box<dyn Fn(BoxFuture<'static, Value>) + Send + Sync>;

/// The inputs of a [`subscribe`] call.
///
/// [`subscribe`]: crate::RootNode::subscribe
pub struct SubscriptionParams {
    /// Opaque caller state, passed to resolvers on every delivery.
    pub state: Option<Arc<RequestState>>,

    /// The subscription's request document; the registration keeps it
    /// alive for as long as the subscription is registered.
    pub query: Arc<AstNode>,

    /// Operation name selecting one of several subscription operations;
    /// empty for a single-operation document.
    pub operation_name: String,

    /// Request variables, coerced against the operation's declarations at
    /// subscribe time.
    pub variables: MapValue,
}

/// Per-operation inputs captured when the subscription was registered and
/// replayed on every delivery.
pub(crate) struct OperationData {
    pub(crate) state: Option<Arc<RequestState>>,
    pub(crate) variables: Arc<MapValue>,
    pub(crate) fragments: Arc<FragmentMap>,
}

/// One live subscription registration.
pub(crate) struct SubscriptionData {
    pub(crate) data: OperationData,
    pub(crate) field_names: FnvHashSet<SubscriptionName>,
    pub(crate) query: Arc<AstNode>,
    pub(crate) operation_name: String,
    pub(crate) callback: SubscriptionCallback,
    pub(crate) selection_set: Arc<AstNode>,
}

impl fmt::Debug for SubscriptionData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriptionData")
            .field("operation_name", &self.operation_name)
            .field("field_names", &self.field_names)
            .field("query", &self.query.content())
            .finish_non_exhaustive()
    }
}

/// Subscription table plus the field-name index over it.
///
/// Between public operations the two stay in lockstep: a key is registered
/// exactly when every field name of its registration lists the key in its
/// listener bucket.
pub(crate) struct Registry {
    subscriptions: BTreeMap<SubscriptionKey, Arc<SubscriptionData>>,
    listeners: FnvHashMap<SubscriptionName, BTreeSet<SubscriptionKey>>,
    next_key: SubscriptionKey,
}

impl Registry {
    pub(crate) fn new() -> Self {
        Self {
            subscriptions: BTreeMap::new(),
            listeners: FnvHashMap::default(),
            next_key: 0,
        }
    }

    /// Stores `registration` under the next key and indexes it under each
    /// of its field names.
    pub(crate) fn register(&mut self, registration: Arc<SubscriptionData>) -> SubscriptionKey {
        let key = self.next_key;

        self.next_key += 1;

        for name in &registration.field_names {
            self.listeners.entry(name.clone()).or_default().insert(key);
        }

        self.subscriptions.insert(key, registration);

        key
    }

    /// Drops the registration under `key`, unindexing its field names and
    /// compacting the key counter: back to `0` on a full drain, else just
    /// past the highest key still registered.
    pub(crate) fn remove(&mut self, key: SubscriptionKey) {
        let Some(registration) = self.subscriptions.remove(&key) else {
            return;
        };

        for name in &registration.field_names {
            if let Some(bucket) = self.listeners.get_mut(name) {
                bucket.remove(&key);

                if bucket.is_empty() {
                    self.listeners.remove(name);
                }
            }
        }

        self.next_key = self
            .subscriptions
            .last_key_value()
            .map_or(0, |(max, _)| max + 1);
    }

    /// The registrations listening on `name`, in ascending key order.
    pub(crate) fn listeners_for(&self, name: &str) -> Vec<Arc<SubscriptionData>> {
        self.listeners
            .get(name)
            .map(|keys| {
                keys.iter()
                    .filter_map(|key| self.subscriptions.get(key))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    #[cfg(test)]
    pub(crate) fn is_consistent(&self) -> bool {
        let indexed = self.subscriptions.iter().all(|(key, registration)| {
            registration.field_names.iter().all(|name| {
                self.listeners
                    .get(name)
                    .is_some_and(|bucket| bucket.contains(key))
            })
        });
        let no_strays = self.listeners.values().all(|bucket| {
            !bucket.is_empty() && bucket.iter().all(|key| self.subscriptions.contains_key(key))
        });

        indexed && no_strays
    }
}
