// Entity state domain models
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;

/// A parsed entity state, tagged once so downstream code never has to guess
/// whether a 0/1 came from a switch or a sensor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum StateValue {
    Numeric(f64),
    Boolean(bool),
}

impl StateValue {
    /// Parse a raw state string. `on`/`off` are booleans, finite floats are
    /// numeric, anything else (`unavailable`, `unknown`, ...) is `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.eq_ignore_ascii_case("on") {
            return Some(Self::Boolean(true));
        }
        if trimmed.eq_ignore_ascii_case("off") {
            return Some(Self::Boolean(false));
        }
        trimmed
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .map(Self::Numeric)
    }

    /// Parse a state as it appears in host JSON payloads, where it may be a
    /// string, a number or a bool.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(Self::Boolean(*b)),
            Value::Number(n) => n.as_f64().filter(|v| v.is_finite()).map(Self::Numeric),
            Value::String(s) => Self::parse(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> f64 {
        match self {
            Self::Numeric(v) => *v,
            Self::Boolean(true) => 1.0,
            Self::Boolean(false) => 0.0,
        }
    }
}

/// A single historical observation.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub timestamp: DateTime<Utc>,
    pub value: Option<StateValue>,
}

impl Sample {
    pub fn new(timestamp: DateTime<Utc>, value: Option<StateValue>) -> Self {
        Self { timestamp, value }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EntityState {
    pub raw_state: Value,
    pub unit_of_measurement: Option<String>,
    pub friendly_name: Option<String>,
}

impl EntityState {
    pub fn value(&self) -> Option<StateValue> {
        StateValue::from_json(&self.raw_state)
    }
}

#[cfg(test)]
impl EntityState {
    pub fn new(raw_state: Value) -> Self {
        Self {
            raw_state,
            unit_of_measurement: None,
            friendly_name: None,
        }
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit_of_measurement = Some(unit.into());
        self
    }

    pub fn with_friendly_name(mut self, name: impl Into<String>) -> Self {
        self.friendly_name = Some(name.into());
        self
    }
}

/// Immutable view of the host's entity states at one instant.
#[derive(Debug, Clone, Default)]
pub struct StateSnapshot {
    pub language: Option<String>,
    pub states: HashMap<String, EntityState>,
}

impl StateSnapshot {
    pub fn new(states: HashMap<String, EntityState>) -> Self {
        Self {
            language: None,
            states,
        }
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn get(&self, entity_id: &str) -> Option<&EntityState> {
        self.states.get(entity_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_on_off_is_boolean() {
        assert_eq!(StateValue::parse("on"), Some(StateValue::Boolean(true)));
        assert_eq!(StateValue::parse("OFF"), Some(StateValue::Boolean(false)));
    }

    #[test]
    fn test_parse_numbers() {
        assert_eq!(StateValue::parse("21.5"), Some(StateValue::Numeric(21.5)));
        assert_eq!(StateValue::parse(" -3 "), Some(StateValue::Numeric(-3.0)));
    }

    #[test]
    fn test_parse_unavailable_is_none() {
        assert_eq!(StateValue::parse("unavailable"), None);
        assert_eq!(StateValue::parse("unknown"), None);
        assert_eq!(StateValue::parse(""), None);
        assert_eq!(StateValue::parse("NaN"), None);
        assert_eq!(StateValue::parse("inf"), None);
    }

    #[test]
    fn test_from_json() {
        assert_eq!(StateValue::from_json(&json!(true)), Some(StateValue::Boolean(true)));
        assert_eq!(StateValue::from_json(&json!(12)), Some(StateValue::Numeric(12.0)));
        assert_eq!(StateValue::from_json(&json!("off")), Some(StateValue::Boolean(false)));
        assert_eq!(StateValue::from_json(&json!(null)), None);
    }

    #[test]
    fn test_boolean_normalizes_to_number() {
        assert_eq!(StateValue::Boolean(true).as_number(), 1.0);
        assert_eq!(StateValue::Boolean(false).as_number(), 0.0);
        assert_eq!(StateValue::Numeric(7.5).as_number(), 7.5);
    }
}
