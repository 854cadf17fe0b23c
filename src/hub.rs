// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The hub composition root.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::Result;
use crate::device::{LedStrip, MotionSensor};
use crate::event::{Event, EventManager};
use crate::transport::{MqttConfig, MqttTransport, Transport};

/// Composition root wiring the motion-triggers-light rule.
///
/// The hub owns the event manager and both device models, installs the
/// reactive rule, and drives the cooperative run loop: each iteration is
/// one transport pump followed by one dispatch pass, on a single thread.
///
/// # Examples
///
/// ```no_run
/// use lighthub::{Hub, MqttConfig};
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() -> lighthub::Result<()> {
///     let config = MqttConfig::builder()
///         .host("192.168.1.50")
///         .credentials("hub", "secret")
///         .ca_certs("/etc/hub/ca.crt")
///         .client_id("hub0")
///         .build()?;
///
///     let mut hub = Hub::connect(config).await?;
///     hub.spin().await
/// }
/// ```
#[derive(Debug)]
pub struct Hub<T: Transport> {
    events: EventManager<T>,
    light: LedStrip,
    motion: MotionSensor,
    stop: Arc<AtomicBool>,
}

impl Hub<MqttTransport> {
    /// Connects to the broker and wires the hub.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established within
    /// the configured retry budget, or if a subscription fails.
    pub async fn connect(config: MqttConfig) -> Result<Self> {
        let transport = MqttTransport::connect(config).await?;
        Self::with_transport(transport).await
    }
}

impl<T: Transport> Hub<T> {
    /// Wires the hub over an already connected transport.
    ///
    /// Devices are attached first, then the rule: when the motion
    /// sensor's active flag flips, the strip is powered on (default
    /// color) or off to match. The rule is level-triggered with no
    /// debounce; every flip produces exactly one light command.
    ///
    /// # Errors
    ///
    /// Returns a transport error if a subscription fails.
    pub async fn with_transport(transport: T) -> Result<Self> {
        let mut events = EventManager::new(transport);

        let light = LedStrip::new(events.outbox());
        let motion = MotionSensor::attach(&mut events).await?;

        let rule_light = light.clone();
        let rule_motion = motion.clone();
        events
            .subscribe(
                MotionSensor::TOPIC_ACTIVE_CHANGED,
                move |_event: &Event| -> Result<()> {
                    if rule_motion.is_active() {
                        rule_light.power_on();
                    } else {
                        rule_light.power_off();
                    }
                    Ok(())
                },
            )
            .await?;

        Ok(Self {
            events,
            light,
            motion,
            stop: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Returns a handle that can stop [`spin`](Hub::spin) from anywhere.
    #[must_use]
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            stop: Arc::clone(&self.stop),
        }
    }

    /// Runs one loop iteration: a transport pump, then a dispatch pass.
    ///
    /// # Errors
    ///
    /// Returns a transport error if the connection fails; transport
    /// errors are fatal to the loop.
    pub async fn step(&mut self) -> Result<()> {
        self.events.pump().await?;
        self.events.execute().await
    }

    /// Runs the loop until the shutdown handle is triggered.
    ///
    /// The stop flag is consulted at the top of every iteration, so a
    /// requested shutdown takes effect within one poll window.
    ///
    /// # Errors
    ///
    /// Returns the first fatal transport error.
    pub async fn spin(&mut self) -> Result<()> {
        tracing::info!("hub run loop started");
        while !self.stop.load(Ordering::Acquire) {
            self.step().await?;
        }
        tracing::info!("hub run loop stopped");
        Ok(())
    }

    /// Returns the light actuator.
    #[must_use]
    pub fn light(&self) -> &LedStrip {
        &self.light
    }

    /// Returns the motion sensor.
    #[must_use]
    pub fn motion(&self) -> &MotionSensor {
        &self.motion
    }

    /// Returns the event manager.
    #[must_use]
    pub fn events(&self) -> &EventManager<T> {
        &self.events
    }

    /// Returns the event manager mutably.
    pub fn events_mut(&mut self) -> &mut EventManager<T> {
        &mut self.events
    }
}

/// Cloneable handle for stopping a running hub.
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    stop: Arc<AtomicBool>,
}

impl ShutdownHandle {
    /// Requests the hub loop to stop at its next iteration.
    pub fn stop(&self) {
        tracing::info!("hub shutdown requested");
        self.stop.store(true, Ordering::Release);
    }

    /// Returns `true` if a stop has been requested.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.stop.load(Ordering::Acquire)
    }
}
