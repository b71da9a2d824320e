// Resolved per-entity display settings
use super::color::{DEFAULT_BOOLEAN_THRESHOLDS, DEFAULT_NUMERIC_THRESHOLDS, ThresholdEntry};
use super::state::StateValue;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    Numeric,
    Boolean,
}

impl ValueKind {
    /// Infer the kind from a live state. Only switch-like states are boolean;
    /// a numeric reading stays numeric whatever its value.
    pub fn infer(value: Option<StateValue>) -> Self {
        match value {
            Some(StateValue::Boolean(_)) => Self::Boolean,
            _ => Self::Numeric,
        }
    }
}

/// Display settings for one entity after the entity -> global -> built-in
/// fallback chain has been applied.
#[derive(Debug, Clone, PartialEq)]
pub struct EntitySettings {
    pub entity_id: String,
    pub name: Option<String>,
    pub hours: u32,
    pub intervals: usize,
    pub min_value: Option<f64>,
    pub max_value: Option<f64>,
    pub thresholds: Option<Vec<ThresholdEntry>>,
    pub gradient: bool,
    pub show_current: bool,
    pub show_labels: bool,
    pub show_min_max: bool,
    pub unit: Option<String>,
    pub digits: usize,
    pub default_value: Option<f64>,
    pub kind: Option<ValueKind>,
}

impl EntitySettings {
    /// Ten years; larger spans overflow the window arithmetic.
    pub const MAX_HOURS: u32 = 24 * 365 * 10;

    pub fn new(entity_id: impl Into<String>) -> Self {
        Self {
            entity_id: entity_id.into(),
            name: None,
            hours: 24,
            intervals: 48,
            min_value: None,
            max_value: None,
            thresholds: None,
            gradient: false,
            show_current: true,
            show_labels: true,
            show_min_max: false,
            unit: None,
            digits: 1,
            default_value: None,
            kind: None,
        }
    }

    pub fn span(&self) -> Duration {
        Duration::hours(i64::from(self.hours))
    }

    pub fn bucket_width(&self) -> Duration {
        let intervals = self.intervals.max(1) as i64;
        Duration::milliseconds(self.span().num_milliseconds() / intervals)
    }

    /// How long a fetched history stays fresh: half a bucket, so every bucket
    /// is re-validated about twice over its lifetime.
    pub fn refresh_interval(&self) -> Duration {
        Duration::milliseconds(self.bucket_width().num_milliseconds() / 2)
    }

    /// History window ending at `now`.
    pub fn window(&self, now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
        (now - self.span(), now)
    }

    pub fn resolve_kind(&self, current: Option<StateValue>) -> ValueKind {
        self.kind.unwrap_or_else(|| ValueKind::infer(current))
    }

    /// Table used to color `value`: the configured table if any, otherwise the
    /// default for `kind`. Without a declared kind, a bare 0 or 1 is colored
    /// from the boolean table one value at a time.
    pub fn thresholds_for(&self, kind: ValueKind, value: Option<f64>) -> &[ThresholdEntry] {
        if let Some(table) = &self.thresholds {
            return table.as_slice();
        }
        let on_off = self.kind.is_none() && matches!(value, Some(v) if v == 0.0 || v == 1.0);
        match kind {
            ValueKind::Boolean => &DEFAULT_BOOLEAN_THRESHOLDS[..],
            ValueKind::Numeric if on_off => &DEFAULT_BOOLEAN_THRESHOLDS[..],
            ValueKind::Numeric => &DEFAULT_NUMERIC_THRESHOLDS[..],
        }
    }
}

/// Card-wide settings.
#[derive(Debug, Clone, PartialEq)]
pub struct CardSettings {
    pub title: Option<String>,
    pub height: u32,
    pub compact: bool,
    pub entities: Vec<EntitySettings>,
}

impl CardSettings {
    pub fn entity(&self, entity_id: &str) -> Option<&EntitySettings> {
        self.entities.iter().find(|e| e.entity_id == entity_id)
    }

    pub fn card_size(&self) -> usize {
        self.entities.len() * 2
    }
}
