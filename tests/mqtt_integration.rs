// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Integration tests for the MQTT transport using mockforge-mqtt.

use std::time::Duration;

use lighthub::{MqttConfig, MqttTransport, Transport, TransportError};
use mockforge_mqtt::broker::MqttConfig as BrokerConfig;
use mockforge_mqtt::start_mqtt_server;
use tokio::time::sleep;

/// Helper to find an available port for testing.
fn get_test_port() -> u16 {
    use std::sync::atomic::{AtomicU16, Ordering};
    static PORT_COUNTER: AtomicU16 = AtomicU16::new(18950);
    PORT_COUNTER.fetch_add(1, Ordering::SeqCst)
}

/// Starts a mock MQTT broker on the given port.
async fn start_mock_broker(port: u16) {
    let config = BrokerConfig {
        port,
        host: "127.0.0.1".to_string(),
        ..Default::default()
    };

    tokio::spawn(async move {
        let _ = start_mqtt_server(config).await;
    });

    // Give the broker time to start, bind to port, and be ready to accept connections
    sleep(Duration::from_millis(500)).await;
}

/// Configuration pointing at the local mock broker.
fn local_config(port: u16) -> MqttConfig {
    MqttConfig::builder()
        .host("127.0.0.1")
        .port(port)
        .connection_timeout(Duration::from_secs(5))
        .publish_timeout(Duration::from_secs(5))
        .poll_window(Duration::from_millis(100))
        .build()
        .unwrap()
}

// ============================================================================
// Connection Tests
// ============================================================================

mod connection {
    use super::*;

    #[tokio::test]
    async fn connect_to_broker() {
        let port = get_test_port();
        start_mock_broker(port).await;

        let result = MqttTransport::connect(local_config(port)).await;

        assert!(result.is_ok(), "Failed to connect: {:?}", result.err());
        let transport = result.unwrap();
        assert_eq!(transport.host(), "127.0.0.1");
        assert_eq!(transport.port(), port);
    }

    #[tokio::test]
    async fn connect_with_fixed_client_id() {
        let port = get_test_port();
        start_mock_broker(port).await;

        let config = MqttConfig::builder()
            .host("127.0.0.1")
            .port(port)
            .client_id("hub0")
            .connection_timeout(Duration::from_secs(5))
            .build()
            .unwrap();

        let result = MqttTransport::connect(config).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn connect_fails_after_retry_budget() {
        // Nothing listens on this port.
        let port = get_test_port();

        let config = MqttConfig::builder()
            .host("127.0.0.1")
            .port(port)
            .connection_timeout(Duration::from_secs(1))
            .connect_attempts(2)
            .retry_backoff(Duration::from_millis(50))
            .build()
            .unwrap();

        let result = MqttTransport::connect(config).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn missing_ca_bundle_is_a_tls_error() {
        let config = MqttConfig::builder()
            .host("127.0.0.1")
            .port(get_test_port())
            .ca_certs("/nonexistent/ca.crt")
            .connect_attempts(1)
            .build()
            .unwrap();

        let result = MqttTransport::connect(config).await;
        assert!(matches!(result, Err(TransportError::Tls(_))));
    }
}

// ============================================================================
// Messaging Tests
// ============================================================================

mod messaging {
    use super::*;

    #[tokio::test]
    async fn subscribe_to_topic() {
        let port = get_test_port();
        start_mock_broker(port).await;

        let mut transport = MqttTransport::connect(local_config(port)).await.unwrap();
        let result = transport.subscribe("motion/state").await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn publish_confirms_the_send() {
        let port = get_test_port();
        start_mock_broker(port).await;

        let mut transport = MqttTransport::connect(local_config(port)).await.unwrap();
        let result = transport
            .publish("light/config", r#"{"enabled":false,"color":"black"}"#)
            .await;

        assert!(result.is_ok(), "Publish not confirmed: {:?}", result.err());
    }

    #[tokio::test]
    async fn idle_poll_returns_empty_batch() {
        let port = get_test_port();
        start_mock_broker(port).await;

        let mut transport = MqttTransport::connect(local_config(port)).await.unwrap();
        transport.subscribe("motion/state").await.unwrap();

        let messages = transport.poll().await.unwrap();
        assert!(messages.is_empty());
    }
}
