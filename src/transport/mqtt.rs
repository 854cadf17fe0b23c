// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! MQTT transport implementation.

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use rumqttc::{
    AsyncClient, ConnectReturnCode, Event, EventLoop, MqttOptions, Outgoing, Packet, QoS,
    TlsConfiguration,
};

use super::{InboundMessage, Transport};
use crate::error::TransportError;

/// Global counter for generating unique client IDs.
static CLIENT_ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Configuration for an MQTT transport connection.
#[derive(Debug, Clone)]
pub struct MqttConfig {
    host: String,
    port: u16,
    credentials: Option<(String, String)>,
    ca_certs: Option<PathBuf>,
    client_id: Option<String>,
    keep_alive: Duration,
    connection_timeout: Duration,
    publish_timeout: Duration,
    poll_window: Duration,
    connect_attempts: u32,
    retry_backoff: Duration,
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: 8883,
            credentials: None,
            ca_certs: None,
            client_id: None,
            keep_alive: Duration::from_secs(30),
            connection_timeout: Duration::from_secs(10),
            publish_timeout: Duration::from_secs(5),
            poll_window: Duration::from_secs(1),
            connect_attempts: 3,
            retry_backoff: Duration::from_millis(500),
        }
    }
}

impl MqttConfig {
    /// Creates a new builder for configuring an MQTT transport.
    #[must_use]
    pub fn builder() -> MqttConfigBuilder {
        MqttConfigBuilder::default()
    }

    /// Returns the broker host address.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the broker port.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Returns the publish confirmation timeout.
    #[must_use]
    pub fn publish_timeout(&self) -> Duration {
        self.publish_timeout
    }
}

/// Builder for [`MqttConfig`].
///
/// # Examples
///
/// ```
/// use lighthub::MqttConfig;
/// use std::time::Duration;
///
/// let config = MqttConfig::builder()
///     .host("192.168.1.50")
///     .port(8883)
///     .credentials("hub", "secret")
///     .ca_certs("/etc/hub/ca.crt")
///     .client_id("hub0")
///     .publish_timeout(Duration::from_secs(2))
///     .build()
///     .unwrap();
/// assert_eq!(config.host(), "192.168.1.50");
/// ```
#[derive(Debug, Default)]
pub struct MqttConfigBuilder {
    config: MqttConfig,
}

impl MqttConfigBuilder {
    /// Sets the broker host address.
    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    /// Sets the broker port (default: 8883).
    #[must_use]
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Sets authentication credentials.
    #[must_use]
    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.config.credentials = Some((username.into(), password.into()));
        self
    }

    /// Sets the CA certificate bundle used to verify the broker over TLS.
    ///
    /// Without a bundle the connection is plain TCP.
    #[must_use]
    pub fn ca_certs(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.ca_certs = Some(path.into());
        self
    }

    /// Sets a fixed client ID instead of the generated one.
    #[must_use]
    pub fn client_id(mut self, id: impl Into<String>) -> Self {
        self.config.client_id = Some(id.into());
        self
    }

    /// Sets the keep-alive interval (default: 30 seconds).
    #[must_use]
    pub fn keep_alive(mut self, duration: Duration) -> Self {
        self.config.keep_alive = duration;
        self
    }

    /// Sets the connection timeout (default: 10 seconds).
    #[must_use]
    pub fn connection_timeout(mut self, duration: Duration) -> Self {
        self.config.connection_timeout = duration;
        self
    }

    /// Sets the publish confirmation timeout (default: 5 seconds).
    #[must_use]
    pub fn publish_timeout(mut self, duration: Duration) -> Self {
        self.config.publish_timeout = duration;
        self
    }

    /// Sets how long one poll waits for network activity (default: 1 second).
    #[must_use]
    pub fn poll_window(mut self, duration: Duration) -> Self {
        self.config.poll_window = duration;
        self
    }

    /// Sets the number of connection attempts before giving up (default: 3).
    #[must_use]
    pub fn connect_attempts(mut self, attempts: u32) -> Self {
        self.config.connect_attempts = attempts.max(1);
        self
    }

    /// Sets the initial backoff between connection attempts (default:
    /// 500 ms, doubling per attempt).
    #[must_use]
    pub fn retry_backoff(mut self, duration: Duration) -> Self {
        self.config.retry_backoff = duration;
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns `TransportError::InvalidAddress` if no host is set.
    pub fn build(self) -> Result<MqttConfig, TransportError> {
        if self.config.host.is_empty() {
            return Err(TransportError::InvalidAddress(
                "MQTT broker host is required".to_owned(),
            ));
        }
        Ok(self.config)
    }
}

/// MQTT transport backed by rumqttc.
///
/// The transport owns both the client and its event loop and is driven
/// cooperatively: nothing is spawned, and the connection only makes
/// progress while [`poll`](Transport::poll) or
/// [`publish`](Transport::publish) pump it. Messages that arrive while a
/// publish waits for its send confirmation are stashed and handed out by
/// the next poll.
pub struct MqttTransport {
    client: AsyncClient,
    event_loop: EventLoop,
    config: MqttConfig,
    stash: VecDeque<InboundMessage>,
}

impl MqttTransport {
    /// Connects to the configured broker, retrying with exponential
    /// backoff up to the configured attempt budget.
    ///
    /// # Errors
    ///
    /// Returns `TransportError::AuthenticationFailed` immediately if the
    /// broker rejects the credentials, or the last connection error once
    /// the attempt budget is exhausted.
    pub async fn connect(config: MqttConfig) -> Result<Self, TransportError> {
        let mut backoff = config.retry_backoff;
        let mut last_error = TransportError::ConnectionFailed("no connection attempt made".to_owned());

        for attempt in 1..=config.connect_attempts {
            match Self::try_connect(&config).await {
                Ok(transport) => return Ok(transport),
                Err(TransportError::AuthenticationFailed) => {
                    return Err(TransportError::AuthenticationFailed);
                }
                Err(error) => {
                    tracing::warn!(
                        attempt,
                        of = config.connect_attempts,
                        error = %error,
                        "MQTT connection attempt failed"
                    );
                    last_error = error;
                    if attempt < config.connect_attempts {
                        tokio::time::sleep(backoff).await;
                        backoff *= 2;
                    }
                }
            }
        }

        Err(last_error)
    }

    /// Returns the broker host address.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.config.host
    }

    /// Returns the broker port.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.config.port
    }

    async fn try_connect(config: &MqttConfig) -> Result<Self, TransportError> {
        let client_id = config.client_id.clone().unwrap_or_else(|| {
            let counter = CLIENT_ID_COUNTER.fetch_add(1, Ordering::Relaxed);
            format!("lighthub_{}_{}", std::process::id(), counter)
        });

        let mut options = MqttOptions::new(&client_id, &config.host, config.port);
        options.set_keep_alive(config.keep_alive);
        options.set_clean_session(true);

        if let Some((username, password)) = &config.credentials {
            options.set_credentials(username, password);
        }

        if let Some(path) = &config.ca_certs {
            let ca = std::fs::read(path).map_err(|e| {
                TransportError::Tls(format!("failed to read CA bundle {}: {e}", path.display()))
            })?;
            options.set_transport(rumqttc::Transport::Tls(TlsConfiguration::Simple {
                ca,
                alpn: None,
                client_auth: None,
            }));
        }

        let (client, mut event_loop) = AsyncClient::new(options, 10);

        // Wait for the broker's ConnAck before handing the transport out.
        let connack = tokio::time::timeout(config.connection_timeout, async {
            loop {
                match event_loop.poll().await {
                    Ok(Event::Incoming(Packet::ConnAck(ack))) => return Ok(ack),
                    Ok(event) => tracing::trace!(?event, "event before ConnAck"),
                    Err(error) => return Err(TransportError::Link(error)),
                }
            }
        })
        .await
        .map_err(|_| {
            TransportError::ConnectionFailed(format!(
                "MQTT connection timeout after {}s",
                config.connection_timeout.as_secs()
            ))
        })??;

        match connack.code {
            ConnectReturnCode::Success => {
                tracing::info!(
                    host = %config.host,
                    port = config.port,
                    client_id = %client_id,
                    "connected to MQTT broker"
                );
                Ok(Self {
                    client,
                    event_loop,
                    config: config.clone(),
                    stash: VecDeque::new(),
                })
            }
            ConnectReturnCode::BadUserNamePassword | ConnectReturnCode::NotAuthorized => {
                Err(TransportError::AuthenticationFailed)
            }
            code => Err(TransportError::ConnectionFailed(format!(
                "broker refused connection: {code:?}"
            ))),
        }
    }

    /// Pumps the event loop until the pending publish is written out.
    async fn wait_for_send(&mut self) -> Result<(), TransportError> {
        loop {
            let polled = self.event_loop.poll().await;
            match polled {
                Ok(Event::Outgoing(Outgoing::Publish(_))) => {
                    tracing::trace!("publish written to broker link");
                    return Ok(());
                }
                Ok(event) => self.absorb(event),
                Err(error) => return Err(TransportError::Link(error)),
            }
        }
    }

    /// Records an event-loop event without dispatching anything.
    fn absorb(&mut self, event: Event) {
        match event {
            Event::Incoming(Packet::Publish(publish)) => {
                match String::from_utf8(publish.payload.to_vec()) {
                    Ok(payload) => {
                        tracing::debug!(
                            topic = %publish.topic,
                            payload = %payload,
                            "MQTT message received"
                        );
                        self.stash.push_back(InboundMessage {
                            topic: publish.topic,
                            payload,
                        });
                    }
                    Err(_) => {
                        tracing::warn!(topic = %publish.topic, "dropping non-UTF-8 payload");
                    }
                }
            }
            Event::Incoming(Packet::SubAck(suback)) => {
                tracing::debug!(?suback, "MQTT subscription acknowledged");
            }
            Event::Incoming(Packet::Disconnect) => {
                tracing::info!("broker sent disconnect");
            }
            _ => {}
        }
    }
}

impl Transport for MqttTransport {
    async fn subscribe(&mut self, topic: &str) -> Result<(), TransportError> {
        self.client
            .subscribe(topic, QoS::AtMostOnce)
            .await
            .map_err(TransportError::Mqtt)?;
        tracing::debug!(topic = %topic, "subscribed to topic");
        Ok(())
    }

    async fn publish(&mut self, topic: &str, payload: &str) -> Result<(), TransportError> {
        self.client
            .publish(topic, QoS::AtMostOnce, false, payload)
            .await
            .map_err(TransportError::Mqtt)?;

        let window = self.config.publish_timeout;
        let timeout_ms = u64::try_from(window.as_millis()).unwrap_or(u64::MAX);
        tokio::time::timeout(window, self.wait_for_send())
            .await
            .map_err(|_| TransportError::Timeout(timeout_ms))?
    }

    async fn poll(&mut self) -> Result<Vec<InboundMessage>, TransportError> {
        if self.stash.is_empty() {
            let polled =
                tokio::time::timeout(self.config.poll_window, self.event_loop.poll()).await;
            match polled {
                Ok(Ok(event)) => self.absorb(event),
                Ok(Err(error)) => return Err(TransportError::Link(error)),
                // Idle window, nothing arrived.
                Err(_) => {}
            }
        }
        Ok(self.stash.drain(..).collect())
    }
}

impl std::fmt::Debug for MqttTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MqttTransport")
            .field("host", &self.config.host)
            .field("port", &self.config.port)
            .field("stashed", &self.stash.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_default_values() {
        let config = MqttConfig::default();
        assert!(config.host.is_empty());
        assert_eq!(config.port, 8883);
        assert!(config.credentials.is_none());
        assert!(config.ca_certs.is_none());
        assert_eq!(config.keep_alive, Duration::from_secs(30));
        assert_eq!(config.connection_timeout, Duration::from_secs(10));
        assert_eq!(config.publish_timeout, Duration::from_secs(5));
        assert_eq!(config.connect_attempts, 3);
    }

    #[test]
    fn builder_missing_host_fails() {
        let result = MqttConfig::builder().build();
        assert!(matches!(result, Err(TransportError::InvalidAddress(_))));
    }

    #[test]
    fn builder_chain() {
        let config = MqttConfig::builder()
            .host("192.168.1.50")
            .port(1883)
            .credentials("hub", "secret")
            .ca_certs("/etc/hub/ca.crt")
            .client_id("hub0")
            .keep_alive(Duration::from_secs(45))
            .connection_timeout(Duration::from_secs(5))
            .publish_timeout(Duration::from_secs(2))
            .poll_window(Duration::from_millis(100))
            .connect_attempts(5)
            .retry_backoff(Duration::from_millis(100))
            .build()
            .unwrap();

        assert_eq!(config.host(), "192.168.1.50");
        assert_eq!(config.port(), 1883);
        assert_eq!(config.credentials, Some(("hub".to_owned(), "secret".to_owned())));
        assert_eq!(config.ca_certs, Some(PathBuf::from("/etc/hub/ca.crt")));
        assert_eq!(config.client_id, Some("hub0".to_owned()));
        assert_eq!(config.publish_timeout(), Duration::from_secs(2));
        assert_eq!(config.connect_attempts, 5);
    }

    #[test]
    fn connect_attempts_floor_is_one() {
        let config = MqttConfig::builder()
            .host("broker")
            .connect_attempts(0)
            .build()
            .unwrap();
        assert_eq!(config.connect_attempts, 1);
    }
}
