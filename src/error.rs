// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the `lighthub` library.
//!
//! This module provides the error hierarchy for failures across the library:
//! event construction and payload decoding, and transport communication.

use thiserror::Error;

/// The main error type for this library.
#[derive(Debug, Error)]
pub enum Error {
    /// Error occurred while constructing or decoding an event.
    #[error("event error: {0}")]
    Event(#[from] EventError),

    /// Error occurred during transport communication.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
}

/// Errors related to event construction and payload decoding.
#[derive(Debug, Error)]
pub enum EventError {
    /// An event value was built from JSON that is not an object.
    ///
    /// Event values are string-keyed mappings; any other JSON shape is
    /// rejected at construction time.
    #[error("event value must be a JSON object, got {found}")]
    ValueNotObject {
        /// The JSON type that was provided instead of an object.
        found: &'static str,
    },

    /// An inbound wire payload could not be decoded into an event value.
    #[error("malformed payload on topic {topic}: {source}")]
    MalformedPayload {
        /// The topic the payload arrived on.
        topic: String,
        /// The underlying decode failure.
        #[source]
        source: serde_json::Error,
    },

    /// An expected field is missing from an event value, or has the
    /// wrong type.
    #[error("missing or invalid field: {0}")]
    MissingField(String),
}

/// Errors related to the MQTT transport.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The MQTT client rejected a request.
    #[error("MQTT error: {0}")]
    Mqtt(#[from] rumqttc::ClientError),

    /// The MQTT connection failed while polling the network.
    #[error("MQTT connection error: {0}")]
    Link(#[from] rumqttc::ConnectionError),

    /// Connection to the broker failed.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// The broker rejected the configured credentials.
    #[error("authentication failed")]
    AuthenticationFailed,

    /// An operation did not complete within its configured timeout.
    #[error("operation timed out after {0} ms")]
    Timeout(u64),

    /// Invalid broker address or missing connection parameter.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// TLS setup failed (for example, the CA bundle could not be read).
    #[error("TLS configuration error: {0}")]
    Tls(String),
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_error_display() {
        let err = EventError::ValueNotObject { found: "array" };
        assert_eq!(
            err.to_string(),
            "event value must be a JSON object, got array"
        );
    }

    #[test]
    fn error_from_event_error() {
        let event_err = EventError::MissingField("active".to_owned());
        let err: Error = event_err.into();
        assert!(matches!(err, Error::Event(EventError::MissingField(_))));
    }

    #[test]
    fn transport_error_display() {
        let err = TransportError::Timeout(5000);
        assert_eq!(err.to_string(), "operation timed out after 5000 ms");
    }

    #[test]
    fn malformed_payload_carries_topic() {
        let source = serde_json::from_str::<serde_json::Map<String, serde_json::Value>>("not json")
            .unwrap_err();
        let err = EventError::MalformedPayload {
            topic: "motion/state".to_owned(),
            source,
        };
        assert!(
            err.to_string()
                .starts_with("malformed payload on topic motion/state")
        );
    }
}
