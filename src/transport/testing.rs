// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! In-process transport for tests.

use std::collections::VecDeque;

use super::{InboundMessage, Transport};
use crate::error::TransportError;

/// Test transport that records traffic and optionally echoes publishes.
///
/// With echo enabled, a published message whose topic has been subscribed
/// is looped back and delivered by a later [`poll`](Transport::poll),
/// mimicking a broker round trip without a network.
#[derive(Debug, Default)]
pub(crate) struct MockTransport {
    pub subscribed: Vec<String>,
    pub published: Vec<(String, String)>,
    pub inbound: VecDeque<InboundMessage>,
    pub echo: bool,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn echoing() -> Self {
        Self {
            echo: true,
            ..Self::default()
        }
    }

    /// Delivers a message on the next poll, as if published externally.
    pub fn inject(&mut self, topic: impl Into<String>, payload: impl Into<String>) {
        self.inbound.push_back(InboundMessage {
            topic: topic.into(),
            payload: payload.into(),
        });
    }

    /// Returns the payloads published on a topic, in publish order.
    pub fn published_on(&self, topic: &str) -> Vec<&str> {
        self.published
            .iter()
            .filter(|(t, _)| t == topic)
            .map(|(_, p)| p.as_str())
            .collect()
    }
}

impl Transport for MockTransport {
    async fn subscribe(&mut self, topic: &str) -> Result<(), TransportError> {
        self.subscribed.push(topic.to_owned());
        Ok(())
    }

    async fn publish(&mut self, topic: &str, payload: &str) -> Result<(), TransportError> {
        self.published.push((topic.to_owned(), payload.to_owned()));
        if self.echo && self.subscribed.iter().any(|t| t == topic) {
            self.inbound.push_back(InboundMessage {
                topic: topic.to_owned(),
                payload: payload.to_owned(),
            });
        }
        Ok(())
    }

    async fn poll(&mut self) -> Result<Vec<InboundMessage>, TransportError> {
        Ok(self.inbound.drain(..).collect())
    }
}
