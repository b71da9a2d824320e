// Value-to-color mapping
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Color used for missing or unparsable values. Never derived from thresholds.
pub const NEUTRAL: Rgb = Rgb::new(0x66, 0x66, 0x66);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

#[derive(Debug, Error, Clone, PartialEq)]
#[error("invalid color {0:?}, expected #RRGGBB")]
pub struct ParseColorError(pub String);

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    /// Per-channel linear interpolation, rounded to the nearest integer.
    pub fn interpolate(self, other: Rgb, factor: f64) -> Rgb {
        let channel = |a: u8, b: u8| -> u8 {
            let a = f64::from(a);
            let b = f64::from(b);
            (a + (b - a) * factor).round().clamp(0.0, 255.0) as u8
        };

        Rgb::new(
            channel(self.r, other.r),
            channel(self.g, other.g),
            channel(self.b, other.b),
        )
    }
}

impl FromStr for Rgb {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ParseColorError(s.to_string()));
        }

        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16).map_err(|_| ParseColorError(s.to_string()))
        };

        Ok(Rgb::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }
}

impl TryFrom<String> for Rgb {
    type Error = ParseColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Rgb> for String {
    fn from(color: Rgb) -> Self {
        color.to_hex()
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({}, {}, {})", self.r, self.g, self.b)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdEntry {
    pub value: f64,
    pub color: Rgb,
}

impl ThresholdEntry {
    pub const fn new(value: f64, color: Rgb) -> Self {
        Self { value, color }
    }
}

/// cold / cool / warm / hot
pub const DEFAULT_NUMERIC_THRESHOLDS: [ThresholdEntry; 4] = [
    ThresholdEntry::new(60.0, Rgb::new(0x4F, 0xC3, 0xF7)),
    ThresholdEntry::new(70.0, Rgb::new(0x81, 0xC7, 0x84)),
    ThresholdEntry::new(80.0, Rgb::new(0xFF, 0xB7, 0x4D)),
    ThresholdEntry::new(100.0, Rgb::new(0xFF, 0x8A, 0x65)),
];

/// off / on
pub const DEFAULT_BOOLEAN_THRESHOLDS: [ThresholdEntry; 2] = [
    ThresholdEntry::new(0.0, Rgb::new(0x4F, 0xC3, 0xF7)),
    ThresholdEntry::new(1.0, Rgb::new(0xFF, 0x8A, 0x65)),
];

/// Map a value onto a threshold table.
///
/// In step mode the highest entry not exceeding the value wins (the first
/// entry if the value is below all of them). In gradient mode the value is
/// interpolated between the two entries surrounding it and clamped to the
/// boundary colors outside the table.
pub fn color_for_value(value: Option<f64>, thresholds: &[ThresholdEntry], gradient: bool) -> Rgb {
    let value = match value {
        Some(v) if !v.is_nan() => v,
        _ => return NEUTRAL,
    };
    let (Some(first), Some(last)) = (thresholds.first(), thresholds.last()) else {
        return NEUTRAL;
    };

    if !gradient {
        return thresholds
            .iter()
            .filter(|t| value >= t.value)
            .last()
            .map_or(first.color, |t| t.color);
    }

    for pair in thresholds.windows(2) {
        let (current, next) = (&pair[0], &pair[1]);
        if value >= current.value && value <= next.value {
            let span = next.value - current.value;
            let factor = if span == 0.0 {
                0.0
            } else {
                (value - current.value) / span
            };
            return current.color.interpolate(next.color, factor);
        }
    }

    if value < first.value {
        first.color
    } else {
        last.color
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BLACK: Rgb = Rgb::new(0, 0, 0);
    const WHITE: Rgb = Rgb::new(255, 255, 255);

    fn bw() -> Vec<ThresholdEntry> {
        vec![ThresholdEntry::new(0.0, BLACK), ThresholdEntry::new(10.0, WHITE)]
    }

    #[test]
    fn test_parse_hex() {
        assert_eq!("#4FC3F7".parse::<Rgb>(), Ok(Rgb::new(0x4F, 0xC3, 0xF7)));
        assert_eq!("ff8a65".parse::<Rgb>(), Ok(Rgb::new(0xFF, 0x8A, 0x65)));
        assert!("#FFF".parse::<Rgb>().is_err());
        assert!("#GG0000".parse::<Rgb>().is_err());
        assert!("#ÿÿÿ".parse::<Rgb>().is_err());
    }

    #[test]
    fn test_display_and_hex() {
        let color = Rgb::new(128, 64, 1);
        assert_eq!(color.to_string(), "rgb(128, 64, 1)");
        assert_eq!(color.to_hex(), "#804001");
    }

    #[test]
    fn test_interpolate_endpoints_are_exact() {
        let a = Rgb::new(0x4F, 0xC3, 0xF7);
        let b = Rgb::new(0xFF, 0x8A, 0x65);
        assert_eq!(a.interpolate(b, 0.0), a);
        assert_eq!(a.interpolate(b, 1.0), b);
    }

    #[test]
    fn test_gradient_midpoint_rounds() {
        let color = color_for_value(Some(5.0), &bw(), true);
        assert_eq!(color, Rgb::new(128, 128, 128));
        assert_eq!(color.to_string(), "rgb(128, 128, 128)");
    }

    #[test]
    fn test_missing_value_is_neutral() {
        assert_eq!(color_for_value(None, &bw(), false), NEUTRAL);
        assert_eq!(color_for_value(Some(f64::NAN), &bw(), true), NEUTRAL);
        assert_eq!(NEUTRAL.to_hex(), "#666666");
    }

    #[test]
    fn test_empty_table_is_neutral() {
        assert_eq!(color_for_value(Some(1.0), &[], false), NEUTRAL);
        assert_eq!(color_for_value(Some(1.0), &[], true), NEUTRAL);
    }

    #[test]
    fn test_step_mode_selects_highest_threshold_not_exceeding() {
        let table = DEFAULT_NUMERIC_THRESHOLDS;
        assert_eq!(color_for_value(Some(10.0), &table, false), table[0].color);
        assert_eq!(color_for_value(Some(60.0), &table, false), table[0].color);
        assert_eq!(color_for_value(Some(75.0), &table, false), table[1].color);
        assert_eq!(color_for_value(Some(80.0), &table, false), table[2].color);
        assert_eq!(color_for_value(Some(99.9), &table, false), table[2].color);
        assert_eq!(color_for_value(Some(150.0), &table, false), table[3].color);
    }

    #[test]
    fn test_step_mode_is_monotonic() {
        let table = DEFAULT_NUMERIC_THRESHOLDS;
        let index_of = |color: Rgb| table.iter().position(|t| t.color == color).unwrap();

        let mut previous = 0;
        for step in 0..300 {
            let value = step as f64 * 0.5;
            let index = index_of(color_for_value(Some(value), &table, false));
            assert!(index >= previous, "value {} went back to threshold {}", value, index);
            previous = index;
        }
    }

    #[test]
    fn test_gradient_at_threshold_returns_exact_color() {
        for entry in DEFAULT_NUMERIC_THRESHOLDS {
            let color = color_for_value(Some(entry.value), &DEFAULT_NUMERIC_THRESHOLDS, true);
            assert_eq!(color, entry.color);
        }
    }

    #[test]
    fn test_gradient_clamps_outside_range() {
        assert_eq!(color_for_value(Some(-5.0), &bw(), true), BLACK);
        assert_eq!(color_for_value(Some(50.0), &bw(), true), WHITE);
    }

    #[test]
    fn test_gradient_zero_width_pair() {
        let table = vec![
            ThresholdEntry::new(5.0, BLACK),
            ThresholdEntry::new(5.0, WHITE),
        ];
        assert_eq!(color_for_value(Some(5.0), &table, true), BLACK);
    }

    #[test]
    fn test_unsorted_table_does_not_panic() {
        let table = vec![
            ThresholdEntry::new(10.0, WHITE),
            ThresholdEntry::new(0.0, BLACK),
            ThresholdEntry::new(5.0, Rgb::new(1, 2, 3)),
        ];
        for value in [-1.0, 0.0, 3.0, 7.0, 11.0] {
            let _ = color_for_value(Some(value), &table, true);
            let _ = color_for_value(Some(value), &table, false);
        }
    }

    #[test]
    fn test_threshold_deserializes_hex_color() {
        let entry: ThresholdEntry =
            serde_json::from_str(r##"{"value": 70, "color": "#81C784"}"##).unwrap();
        assert_eq!(entry, ThresholdEntry::new(70.0, Rgb::new(0x81, 0xC7, 0x84)));

        let bad = serde_json::from_str::<ThresholdEntry>(r##"{"value": 70, "color": "green"}"##);
        assert!(bad.is_err());
    }
}
