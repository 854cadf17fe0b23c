// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Topic-keyed registry of subscribers.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use super::Subscriber;

/// Registry mapping topics to ordered subscriber lists.
///
/// Subscribers for a topic are stored in registration order, and dispatch
/// preserves that order. The registry is thread-safe; subscribers are
/// wrapped in `Arc` so the dispatch path can clone the list cheaply and
/// invoke handlers without holding the lock.
#[derive(Default)]
pub struct SubscriberRegistry {
    topics: RwLock<HashMap<String, Vec<Arc<dyn Subscriber>>>>,
}

impl SubscriberRegistry {
    /// Creates a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a subscriber at the tail of the topic's list.
    ///
    /// Returns `true` if this is the first subscriber for the topic.
    pub fn add(&self, topic: impl Into<String>, subscriber: Arc<dyn Subscriber>) -> bool {
        let topic = topic.into();
        let mut topics = self.topics.write();
        let entry = topics.entry(topic).or_default();
        entry.push(subscriber);
        entry.len() == 1
    }

    /// Returns the subscribers for a topic, in registration order.
    ///
    /// Returns an empty list for topics with no subscribers.
    #[must_use]
    pub fn subscribers(&self, topic: &str) -> Vec<Arc<dyn Subscriber>> {
        self.topics.read().get(topic).cloned().unwrap_or_default()
    }

    /// Returns `true` if the topic has at least one subscriber.
    #[must_use]
    pub fn has_topic(&self, topic: &str) -> bool {
        self.topics.read().contains_key(topic)
    }

    /// Returns the number of subscribed topics.
    #[must_use]
    pub fn topic_count(&self) -> usize {
        self.topics.read().len()
    }
}

impl std::fmt::Debug for SubscriberRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriberRegistry")
            .field("topic_count", &self.topic_count())
            .finish()
    }
}
