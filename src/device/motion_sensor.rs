// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Binary motion sensor.

use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::Value;

use crate::Result;
use crate::error::EventError;
use crate::event::{Event, EventManager};
use crate::transport::Transport;

/// A binary motion sensor fed by raw state reports.
///
/// The sensor subscribes to [`TOPIC_STATE`](MotionSensor::TOPIC_STATE)
/// (`{"active": bool}`) and publishes a value-less event on
/// [`TOPIC_ACTIVE_CHANGED`](MotionSensor::TOPIC_ACTIVE_CHANGED) whenever
/// the reported value differs from the stored one. Repeated reports of
/// the same value update nothing observable and emit nothing.
///
/// Change detection compares the incoming value against a snapshot of the
/// stored flag taken before any mutation, so a report can never be
/// compared against itself.
///
/// The handle is cheaply cloneable; clones share the same state.
#[derive(Debug, Clone)]
pub struct MotionSensor {
    active: Arc<RwLock<bool>>,
}

impl MotionSensor {
    /// Topic carrying raw sensor state, published by the sensor node.
    pub const TOPIC_STATE: &'static str = "motion/state";

    /// Topic the sensor publishes on when the active flag flips.
    pub const TOPIC_ACTIVE_CHANGED: &'static str = "motion/state/active/changed";

    /// Creates a sensor and registers its state handler on the bus.
    ///
    /// The initial stored value is `false`.
    ///
    /// # Errors
    ///
    /// Returns a transport error if the topic subscription fails.
    pub async fn attach<T: Transport>(events: &mut EventManager<T>) -> Result<Self> {
        let active = Arc::new(RwLock::new(false));
        let outbox = events.outbox();
        let stored = Arc::clone(&active);

        events
            .subscribe(Self::TOPIC_STATE, move |event: &Event| -> Result<()> {
                let incoming = event
                    .value()
                    .get("active")
                    .and_then(Value::as_bool)
                    .ok_or_else(|| EventError::MissingField("active".to_owned()))?;

                // Snapshot before mutation; the comparison must not see
                // the incoming write.
                let previous = *stored.read();
                tracing::debug!(previous, incoming, "motion state received");

                if incoming != previous {
                    outbox.queue(Event::new(Self::TOPIC_ACTIVE_CHANGED));
                }
                *stored.write() = incoming;
                Ok(())
            })
            .await?;

        Ok(Self { active })
    }

    /// Returns the last stored active value.
    #[must_use]
    pub fn is_active(&self) -> bool {
        *self.active.read()
    }
}
