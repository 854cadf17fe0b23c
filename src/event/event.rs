// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The event value exchanged over the bus.

use serde_json::{Map, Value};

use crate::error::EventError;

/// A named event carrying a string-keyed JSON value.
///
/// Events are the unit of exchange on the bus. The `name` is the topic the
/// event is published on (by convention `"<domain>/<kind>"`) and the `value`
/// is a mapping of JSON-compatible data. The canonical empty value encodes
/// as `{}` on the wire.
///
/// # Examples
///
/// ```
/// use lighthub::Event;
///
/// let event = Event::new("motion/state/active/changed");
/// assert_eq!(event.name(), "motion/state/active/changed");
/// assert_eq!(event.payload(), "{}");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    name: String,
    value: Map<String, Value>,
}

impl Event {
    /// Creates an event with the canonical empty value.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: Map::new(),
        }
    }

    /// Creates an event with the given value mapping.
    #[must_use]
    pub fn with_value(name: impl Into<String>, value: Map<String, Value>) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    /// Creates an event from an arbitrary JSON value.
    ///
    /// # Errors
    ///
    /// Returns [`EventError::ValueNotObject`] if `value` is not a JSON
    /// object. Event values are mappings; scalars and arrays are rejected
    /// at construction time.
    pub fn from_json(name: impl Into<String>, value: Value) -> Result<Self, EventError> {
        match value {
            Value::Object(value) => Ok(Self::with_value(name, value)),
            other => Err(EventError::ValueNotObject {
                found: json_type_name(&other),
            }),
        }
    }

    /// Decodes an event from a wire payload received on `name`.
    ///
    /// # Errors
    ///
    /// Returns [`EventError::MalformedPayload`] if the payload is not a
    /// UTF-8 JSON object.
    pub fn from_payload(name: impl Into<String>, payload: &str) -> Result<Self, EventError> {
        let name = name.into();
        match serde_json::from_str::<Map<String, Value>>(payload) {
            Ok(value) => Ok(Self::with_value(name, value)),
            Err(source) => Err(EventError::MalformedPayload {
                topic: name,
                source,
            }),
        }
    }

    /// Returns the event name (topic).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the event value mapping.
    #[must_use]
    pub fn value(&self) -> &Map<String, Value> {
        &self.value
    }

    /// Encodes the event value as a wire payload.
    #[must_use]
    pub fn payload(&self) -> String {
        Value::Object(self.value.clone()).to_string()
    }
}

/// Returns the JSON type name of a value, for error messages.
fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn new_event_has_empty_value() {
        let event = Event::new("light/config");
        assert_eq!(event.name(), "light/config");
        assert!(event.value().is_empty());
    }

    #[test]
    fn empty_value_encodes_as_empty_object() {
        let event = Event::new("motion/state/active/changed");
        assert_eq!(event.payload(), "{}");
    }

    #[test]
    fn from_json_accepts_object() {
        let event = Event::from_json("motion/state", json!({"active": true})).unwrap();
        assert_eq!(event.value().get("active"), Some(&json!(true)));
    }

    #[test]
    fn from_json_rejects_non_object() {
        let err = Event::from_json("motion/state", json!([1, 2, 3])).unwrap_err();
        assert!(matches!(err, EventError::ValueNotObject { found: "array" }));

        let err = Event::from_json("motion/state", json!(42)).unwrap_err();
        assert!(matches!(err, EventError::ValueNotObject { found: "number" }));
    }

    #[test]
    fn from_payload_decodes_object() {
        let event = Event::from_payload("light/config", r#"{"enabled":false,"color":"black"}"#)
            .unwrap();
        assert_eq!(event.value().get("enabled"), Some(&json!(false)));
        assert_eq!(event.value().get("color"), Some(&json!("black")));
    }

    #[test]
    fn from_payload_rejects_invalid_json() {
        let err = Event::from_payload("motion/state", "not json").unwrap_err();
        assert!(matches!(err, EventError::MalformedPayload { ref topic, .. } if topic == "motion/state"));
    }

    #[test]
    fn from_payload_rejects_non_object_json() {
        let err = Event::from_payload("motion/state", "[true]").unwrap_err();
        assert!(matches!(err, EventError::MalformedPayload { .. }));
    }

    #[test]
    fn wire_round_trip_preserves_value() {
        let value = json!({
            "active": true,
            "count": 3,
            "ratio": 0.5,
            "label": "hallway",
            "nested": {"tags": ["a", "b"], "none": null}
        });
        let event = Event::from_json("motion/state", value).unwrap();

        let decoded = Event::from_payload("motion/state", &event.payload()).unwrap();
        assert_eq!(decoded.value(), event.value());
    }
}
