// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The subscriber abstraction.

use crate::Result;
use crate::event::Event;

/// A handler for events dispatched on a subscribed topic.
///
/// Subscribers are invoked synchronously, on the thread driving the
/// dispatch pass, in the order they were registered for the topic. A
/// subscriber must not block; outbound publishes from inside a handler go
/// through an [`Outbox`](crate::event::Outbox).
///
/// An error returned from [`handle`](Subscriber::handle) is logged by the
/// dispatcher and does not prevent later subscribers from running.
///
/// Any `Fn(&Event) -> Result<()>` closure is a subscriber:
///
/// ```
/// use lighthub::{Event, Subscriber};
///
/// let subscriber = |event: &Event| -> lighthub::Result<()> {
///     println!("got {}", event.name());
///     Ok(())
/// };
/// subscriber.handle(&Event::new("motion/state")).unwrap();
/// ```
pub trait Subscriber: Send + Sync {
    /// Handles one dispatched event.
    ///
    /// # Errors
    ///
    /// Returns an error if the event could not be processed; the failure
    /// is contained by the dispatcher and logged.
    fn handle(&self, event: &Event) -> Result<()>;
}

impl<F> Subscriber for F
where
    F: Fn(&Event) -> Result<()> + Send + Sync,
{
    fn handle(&self, event: &Event) -> Result<()> {
        self(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn closure_is_a_subscriber() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = Arc::clone(&counter);
        let subscriber = move |_event: &Event| -> Result<()> {
            counter_clone.fetch_add(1, Ordering::SeqCst);
            Ok(())
        };

        subscriber.handle(&Event::new("motion/state")).unwrap();
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }
}
