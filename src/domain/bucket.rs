// Time bucketing with nearest-neighbour gap filling
use super::error::WaterfallError;
use super::state::Sample;
use chrono::{DateTime, Utc};

/// Spread `samples` over `interval_count` equal-width buckets covering
/// `[window_start, window_end)`.
///
/// Samples must be in chronological order: the last sample landing in a bucket
/// wins. Empty buckets are then filled forward from their left neighbour and
/// backward from their right neighbour, so the result contains `None` only when
/// no bucket received a value and `default_value` is `None`.
pub fn bucketize(
    samples: &[Sample],
    interval_count: usize,
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
    default_value: Option<f64>,
) -> Result<Vec<Option<f64>>, WaterfallError> {
    if interval_count == 0 {
        return Err(WaterfallError::ZeroIntervals);
    }

    let span_ms = (window_end - window_start).num_milliseconds();
    if span_ms <= 0 {
        return Err(WaterfallError::EmptyWindow {
            start: window_start.to_rfc3339(),
            end: window_end.to_rfc3339(),
        });
    }

    let mut buckets = vec![default_value; interval_count];

    for sample in samples {
        if sample.timestamp < window_start {
            continue;
        }
        let offset_ms = (sample.timestamp - window_start).num_milliseconds();
        // floor(offset / (span / n)) without the float round-off
        let index = i128::from(offset_ms) * interval_count as i128 / i128::from(span_ms);
        if index < interval_count as i128 {
            buckets[index as usize] = sample.value.map(|v| v.as_number());
        }
    }

    for i in 1..buckets.len() {
        if buckets[i].is_none() && buckets[i - 1].is_some() {
            buckets[i] = buckets[i - 1];
        }
    }
    for i in (0..buckets.len().saturating_sub(1)).rev() {
        if buckets[i].is_none() && buckets[i + 1].is_some() {
            buckets[i] = buckets[i + 1];
        }
    }

    Ok(buckets)
}

/// Smallest and largest non-null value, if any.
pub fn min_max<I>(values: I) -> Option<(f64, f64)>
where
    I: IntoIterator<Item = Option<f64>>,
{
    values
        .into_iter()
        .flatten()
        .filter(|v| !v.is_nan())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((min, max)) => Some((min.min(v), max.max(v))),
        })
}
