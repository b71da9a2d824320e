// Waterfall render model
use super::color::Rgb;
use super::entity::ValueKind;
use super::i18n::Strings;
use chrono::{DateTime, Duration, Timelike, Utc};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WaterfallView {
    pub title: String,
    pub height: u32,
    pub compact: bool,
    pub card_size: usize,
    pub entities: Vec<EntityView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EntityView {
    /// Configured entity absent from the state snapshot.
    NotFound { entity_id: String, message: String },
    Strip(EntityStrip),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityStrip {
    pub entity_id: String,
    pub name: String,
    pub kind: ValueKind,
    pub current: Option<String>,
    pub segments: Vec<Segment>,
    pub labels: Option<RangeLabels>,
    pub min_max: Option<String>,
    pub scale: Scale,
    pub on_select: MoreInfoEvent,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Segment {
    pub color: Rgb,
    pub tooltip: String,
    pub is_now: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RangeLabels {
    pub start: String,
    pub end: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Scale {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

/// Raised when a user selects an entity's strip; the host shows its details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoreInfoEvent {
    #[serde(rename = "type")]
    pub event_type: &'static str,
    pub entity_id: String,
}

impl MoreInfoEvent {
    pub fn new(entity_id: impl Into<String>) -> Self {
        Self {
            event_type: "hass-more-info",
            entity_id: entity_id.into(),
        }
    }
}

/// Human-readable value: `on`/`off` for boolean entities, fixed precision plus
/// unit for numbers, `N/A` when missing.
pub fn display_value(value: Option<f64>, kind: ValueKind, digits: usize, unit: &str) -> String {
    match (value, kind) {
        (None, _) => "N/A".to_string(),
        (Some(v), ValueKind::Boolean) if v == 1.0 => "on".to_string(),
        (Some(v), ValueKind::Boolean) if v == 0.0 => "off".to_string(),
        (Some(v), _) => format!("{:.*}{}", digits, v, unit),
    }
}

/// Label for bucket `index` of `intervals` over a span of `hours` ending at
/// `now`. Short spans show the wall-clock hour range, long ones a relative age.
pub fn time_label(
    index: usize,
    intervals: usize,
    hours: u32,
    now: DateTime<Utc>,
    strings: &Strings,
) -> String {
    let intervals = intervals.max(1);
    let hours_ago = f64::from(hours) * (intervals - index.min(intervals)) as f64 / intervals as f64;

    if hours <= 24 {
        let start = now - hours_to_duration(hours_ago);
        let end = start + hours_to_duration(f64::from(hours) / intervals as f64);
        return format!("{}:00 - {}:00", start.hour(), end.hour());
    }

    if hours_ago < 1.0 {
        return format!("{}{}", (hours_ago * 60.0).round(), strings.minutes_ago);
    }
    format!("{:.1}{}", hours_ago, strings.hours_ago)
}

fn hours_to_duration(hours: f64) -> Duration {
    Duration::milliseconds((hours * 3_600_000.0).round() as i64)
}
