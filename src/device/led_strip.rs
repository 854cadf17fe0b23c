// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Binary light actuator.

use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::{Map, Value};

use crate::event::{Event, Outbox};

/// Full state of the strip, published whole on every transition.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct LightState {
    /// Whether the strip is powered.
    pub enabled: bool,
    /// The active color name.
    pub color: String,
}

/// A binary LED strip actuator.
///
/// The strip is a pure intent emitter: it holds `off`/`on(color)` state
/// and publishes its full state as a config event on every transition. It
/// subscribes to nothing. The initial `off` state is established at
/// construction by invoking [`power_off`](LedStrip::power_off), so the
/// first flush announces the strip on the bus.
///
/// The handle is cheaply cloneable; clones share the same state.
#[derive(Debug, Clone)]
pub struct LedStrip {
    state: Arc<RwLock<LightState>>,
    outbox: Outbox,
}

impl LedStrip {
    /// Topic the strip publishes its state on.
    pub const TOPIC_CONFIG: &'static str = "light/config";

    /// Topic reserved for device-reported state. Nothing produces it in
    /// the current installation; the constant is kept so the interface
    /// matches the deployed topic plan.
    pub const TOPIC_STATE: &'static str = "light/state";

    /// Color used by [`power_on`](LedStrip::power_on).
    pub const DEFAULT_COLOR: &'static str = "white";

    /// Creates a strip in the `off` state and queues the initial config
    /// event on `outbox`.
    #[must_use]
    pub fn new(outbox: Outbox) -> Self {
        let strip = Self {
            state: Arc::new(RwLock::new(LightState {
                enabled: false,
                color: "black".to_owned(),
            })),
            outbox,
        };
        strip.power_off();
        strip
    }

    /// Powers the strip on with the default color.
    pub fn power_on(&self) {
        self.power_on_with(Self::DEFAULT_COLOR);
    }

    /// Powers the strip on with an explicit color.
    pub fn power_on_with(&self, color: impl Into<String>) {
        let snapshot = {
            let mut state = self.state.write();
            state.enabled = true;
            state.color = color.into();
            state.clone()
        };
        tracing::debug!(color = %snapshot.color, "led strip power on");
        self.emit_config(&snapshot);
    }

    /// Powers the strip off. The color is left unchanged.
    ///
    /// Calling this twice publishes two identical config events; the
    /// strip does not deduplicate its own transitions.
    pub fn power_off(&self) {
        let snapshot = {
            let mut state = self.state.write();
            state.enabled = false;
            state.clone()
        };
        tracing::debug!("led strip power off");
        self.emit_config(&snapshot);
    }

    /// Returns a snapshot of the current state.
    #[must_use]
    pub fn state(&self) -> LightState {
        self.state.read().clone()
    }

    /// Returns `true` if the strip is powered.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.state.read().enabled
    }

    fn emit_config(&self, state: &LightState) {
        let mut value = Map::new();
        value.insert("enabled".to_owned(), Value::Bool(state.enabled));
        value.insert("color".to_owned(), Value::String(state.color.clone()));
        self.outbox.queue(Event::with_value(Self::TOPIC_CONFIG, value));
    }
}
