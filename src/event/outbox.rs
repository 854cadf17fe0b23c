// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Deferred publishing for devices and subscriber callbacks.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;

use super::Event;

/// A queue of pending outbound events.
///
/// Devices and subscriber callbacks are synchronous and never perform
/// transport I/O themselves. Instead they queue publish intents on an
/// `Outbox`, and the [`EventManager`](super::EventManager) flushes the
/// queue through the transport after each dispatch pass, in FIFO order.
///
/// The outbox is cheaply cloneable; all clones share the same queue.
#[derive(Debug, Clone, Default)]
pub struct Outbox {
    pending: Arc<Mutex<VecDeque<Event>>>,
}

impl Outbox {
    /// Creates a new empty outbox.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues an event for publication on the next flush.
    pub fn queue(&self, event: Event) {
        tracing::trace!(topic = %event.name(), "queued outbound event");
        self.pending.lock().push_back(event);
    }

    /// Takes all pending events, leaving the outbox empty.
    pub(crate) fn drain(&self) -> Vec<Event> {
        self.pending.lock().drain(..).collect()
    }

    /// Returns the number of pending events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.lock().len()
    }

    /// Returns `true` if no events are pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.lock().is_empty()
    }
}
