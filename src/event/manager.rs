// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The event manager: subscription registry, inbound queue, dispatch.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;

use super::{Event, Outbox};
use crate::Result;
use crate::subscription::{Subscriber, SubscriberRegistry};
use crate::transport::{InboundMessage, Transport};

/// Bridges the pub/sub transport to in-process subscribers.
///
/// The manager owns the transport, a topic-keyed subscriber registry, an
/// inbound FIFO queue, and the shared [`Outbox`]. Network delivery and
/// local dispatch are decoupled: [`pump`](EventManager::pump) turns one
/// transport poll into queued events, and [`execute`](EventManager::execute)
/// drains the queue to subscribers and flushes the outbox.
///
/// Publishing always round-trips through the transport. A locally
/// published event is never dispatched directly; subscribers only see it
/// once the broker echoes it back.
#[derive(Debug)]
pub struct EventManager<T: Transport> {
    transport: T,
    registry: SubscriberRegistry,
    queue: Mutex<VecDeque<Event>>,
    outbox: Outbox,
}

impl<T: Transport> EventManager<T> {
    /// Creates a manager over a connected transport.
    #[must_use]
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            registry: SubscriberRegistry::new(),
            queue: Mutex::new(VecDeque::new()),
            outbox: Outbox::new(),
        }
    }

    /// Returns a handle for queueing deferred publishes.
    #[must_use]
    pub fn outbox(&self) -> Outbox {
        self.outbox.clone()
    }

    /// Returns the transport.
    #[must_use]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Returns the transport mutably.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Registers a subscriber at the tail of the topic's dispatch list.
    ///
    /// The underlying transport subscription is issued exactly once per
    /// topic, when its first subscriber registers.
    ///
    /// # Errors
    ///
    /// Returns a transport error if the broker subscription fails.
    pub async fn subscribe<S>(&mut self, topic: &str, subscriber: S) -> Result<()>
    where
        S: Subscriber + 'static,
    {
        if self.registry.add(topic, Arc::new(subscriber)) {
            self.transport.subscribe(topic).await?;
        }
        Ok(())
    }

    /// Publishes an event through the transport at most once (QoS 0).
    ///
    /// Blocks the caller until the transport confirms the send, bounded
    /// by the transport's publish timeout. Confirmation covers the
    /// publish operation, not subscriber receipt.
    ///
    /// # Errors
    ///
    /// Returns a transport error if the publish fails or times out.
    pub async fn publish(&mut self, event: &Event) -> Result<()> {
        let payload = event.payload();
        tracing::debug!(topic = %event.name(), payload = %payload, "publishing event");
        self.transport.publish(event.name(), &payload).await?;
        Ok(())
    }

    /// Runs one transport poll and queues the received events.
    ///
    /// Payloads that do not decode to a JSON object are dropped and
    /// logged; they never reach subscribers and never abort the loop.
    ///
    /// # Errors
    ///
    /// Returns a transport error if the connection fails.
    pub async fn pump(&mut self) -> Result<()> {
        let messages = self.transport.poll().await?;
        for message in messages {
            self.enqueue(message);
        }
        Ok(())
    }

    /// Drains the inbound queue and dispatches each event, then flushes
    /// the outbox.
    ///
    /// The queue is taken as a unit: events enqueued while this pass runs
    /// (echoes arriving while the outbox flush pumps the connection) are
    /// visited on the next call. Subscribers for a topic run synchronously
    /// in registration order; a failing subscriber is logged and does not
    /// stop the remaining ones.
    ///
    /// # Errors
    ///
    /// Returns a transport error if an outbox flush publish fails.
    pub async fn execute(&mut self) -> Result<()> {
        let batch: VecDeque<Event> = std::mem::take(&mut *self.queue.lock());
        for event in &batch {
            self.dispatch(event);
        }
        self.flush_outbox().await
    }

    /// Returns the number of events waiting for the next dispatch pass.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.queue.lock().len()
    }

    fn enqueue(&self, message: InboundMessage) {
        match Event::from_payload(message.topic, &message.payload) {
            Ok(event) => {
                tracing::debug!(topic = %event.name(), "queued inbound event");
                self.queue.lock().push_back(event);
            }
            Err(error) => {
                tracing::warn!(error = %error, "dropping malformed inbound payload");
            }
        }
    }

    fn dispatch(&self, event: &Event) {
        let subscribers = self.registry.subscribers(event.name());
        if subscribers.is_empty() {
            tracing::trace!(topic = %event.name(), "no subscribers for event");
            return;
        }
        tracing::debug!(
            topic = %event.name(),
            subscriber_count = subscribers.len(),
            "dispatching event"
        );
        for subscriber in subscribers {
            if let Err(error) = subscriber.handle(event) {
                tracing::error!(topic = %event.name(), error = %error, "subscriber failed");
            }
        }
    }

    async fn flush_outbox(&mut self) -> Result<()> {
        for event in self.outbox.drain() {
            self.publish(&event).await?;
        }
        Ok(())
    }
}
