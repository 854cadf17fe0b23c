// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device models attached to the bus.
//!
//! Devices hold minimal state and interact with the rest of the system
//! only through events. [`LedStrip`] is a pure intent emitter;
//! [`MotionSensor`] turns raw state reports into change-derived events.
//! Neither performs transport I/O directly: outbound publishes go through
//! the shared [`Outbox`](crate::event::Outbox) and are flushed by the
//! event manager.

mod led_strip;
mod motion_sensor;

pub use led_strip::{LedStrip, LightState};
pub use motion_sensor::MotionSensor;
