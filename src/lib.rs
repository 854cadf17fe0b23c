// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `LightHub` - a local event bus for MQTT-connected devices.
//!
//! This library bridges an MQTT broker to in-process subscriber callbacks.
//! Network delivery and local dispatch are decoupled through an explicit
//! inbound queue: the transport pump only enqueues, and subscribers run
//! during a separate dispatch pass. On top of the bus sit two small device
//! models and a hub that wires a motion-triggers-lighting rule.
//!
//! # Design
//!
//! - **Echo-driven dispatch**: publishing never invokes local subscribers
//!   directly. Events reach subscribers only after the broker echoes them
//!   back, so every observer of a topic (in-process or remote) sees the
//!   same stream in the same order.
//! - **Cooperative loop**: one thread drives everything. Each iteration
//!   of [`Hub::spin`] runs one network-loop poll and then one dispatch
//!   pass; nothing is spawned.
//! - **Bounded waits**: publishing blocks until the transport confirms
//!   the send (not subscriber receipt), under a configurable timeout.
//!
//! # Quick Start
//!
//! ```no_run
//! use lighthub::{Hub, MqttConfig};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> lighthub::Result<()> {
//!     let config = MqttConfig::builder()
//!         .host("192.168.1.50")
//!         .credentials("hub", "secret")
//!         .ca_certs("/etc/hub/ca.crt")
//!         .client_id("hub0")
//!         .build()?;
//!
//!     let mut hub = Hub::connect(config).await?;
//!
//!     let shutdown = hub.shutdown_handle();
//!     tokio::spawn(async move {
//!         if tokio::signal::ctrl_c().await.is_ok() {
//!             shutdown.stop();
//!         }
//!     });
//!
//!     hub.spin().await
//! }
//! ```
//!
//! # Using the bus directly
//!
//! ```no_run
//! use lighthub::{Event, EventManager, MqttConfig, MqttTransport};
//! use serde_json::json;
//!
//! # async fn example() -> lighthub::Result<()> {
//! let config = MqttConfig::builder().host("192.168.1.50").build()?;
//! let transport = MqttTransport::connect(config).await?;
//! let mut events = EventManager::new(transport);
//!
//! events
//!     .subscribe("door/state", |event: &Event| -> lighthub::Result<()> {
//!         println!("door: {:?}", event.value());
//!         Ok(())
//!     })
//!     .await?;
//!
//! events
//!     .publish(&Event::from_json("door/ping", json!({"seq": 1}))?)
//!     .await?;
//!
//! loop {
//!     events.pump().await?;
//!     events.execute().await?;
//! }
//! # }
//! ```

pub mod device;
pub mod error;
pub mod event;
pub mod hub;
pub mod subscription;
pub mod transport;

pub use device::{LedStrip, LightState, MotionSensor};
pub use error::{Error, EventError, Result, TransportError};
pub use event::{Event, EventManager, Outbox};
pub use hub::{Hub, ShutdownHandle};
pub use subscription::{Subscriber, SubscriberRegistry};
pub use transport::{InboundMessage, MqttConfig, MqttConfigBuilder, MqttTransport, Transport};
