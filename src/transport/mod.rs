// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The pub/sub transport seam.
//!
//! The bus core never talks to the network directly; it goes through the
//! [`Transport`] trait. The production implementation is
//! [`MqttTransport`], backed by rumqttc. Tests substitute an in-process
//! transport with controlled echo behavior.

mod mqtt;

#[cfg(test)]
pub(crate) mod testing;

pub use mqtt::{MqttConfig, MqttConfigBuilder, MqttTransport};

use crate::error::TransportError;

/// A raw message received from the broker, before event decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    /// The topic the message arrived on.
    pub topic: String,
    /// The UTF-8 wire payload.
    pub payload: String,
}

/// A pub/sub transport the event bus drives cooperatively.
///
/// All methods are driven from a single caller; implementations do not
/// spawn background tasks. The receive path is enqueue-only: messages that
/// arrive while another operation pumps the connection are retained and
/// returned by the next [`poll`](Transport::poll), never dispatched inline.
#[allow(async_fn_in_trait)]
pub trait Transport {
    /// Subscribes to a topic on the broker.
    ///
    /// # Errors
    ///
    /// Returns `TransportError` if the subscription request fails.
    async fn subscribe(&mut self, topic: &str) -> Result<(), TransportError>;

    /// Publishes a payload at most once (QoS 0) and waits for the send
    /// to be confirmed, bounded by the transport's publish timeout.
    ///
    /// Confirmation covers the publish operation itself, not subscriber
    /// receipt.
    ///
    /// # Errors
    ///
    /// Returns `TransportError::Timeout` if the send is not confirmed in
    /// time, or another `TransportError` if the connection fails.
    async fn publish(&mut self, topic: &str, payload: &str) -> Result<(), TransportError>;

    /// Runs one network-loop iteration and returns the messages received.
    ///
    /// Returns an empty batch when the connection is idle for the poll
    /// window.
    ///
    /// # Errors
    ///
    /// Returns `TransportError` if the connection fails.
    async fn poll(&mut self) -> Result<Vec<InboundMessage>, TransportError>;
}
