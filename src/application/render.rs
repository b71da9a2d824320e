// Render model construction - state snapshot + cached histories -> view
use crate::application::history_cache::HistoryCache;
use crate::domain::bucket::min_max;
use crate::domain::color::color_for_value;
use crate::domain::entity::{CardSettings, EntitySettings};
use crate::domain::i18n::{Language, Strings};
use crate::domain::state::StateSnapshot;
use crate::domain::waterfall::{
    display_value, time_label, EntityStrip, EntityView, MoreInfoEvent, RangeLabels, Scale, Segment,
    WaterfallView,
};
use chrono::{DateTime, Utc};

/// Build the card's render model. Pure: the same snapshot, cache and `now`
/// always give the same view.
pub fn render_card(
    card: &CardSettings,
    snapshot: &StateSnapshot,
    cache: &HistoryCache,
    now: DateTime<Utc>,
) -> WaterfallView {
    let strings = Language::from_tag(snapshot.language.as_deref()).strings();

    let entities = card
        .entities
        .iter()
        .map(|settings| render_entity(settings, snapshot, cache, now, strings))
        .collect();

    WaterfallView {
        title: card
            .title
            .clone()
            .unwrap_or_else(|| strings.history.to_string()),
        height: card.height,
        compact: card.compact,
        card_size: card.card_size(),
        entities,
    }
}

fn render_entity(
    settings: &EntitySettings,
    snapshot: &StateSnapshot,
    cache: &HistoryCache,
    now: DateTime<Utc>,
    strings: &Strings,
) -> EntityView {
    let entity_id = settings.entity_id.as_str();
    let Some(state) = snapshot.get(entity_id) else {
        tracing::warn!("Entity {} not found in state snapshot", entity_id);
        return EntityView::NotFound {
            entity_id: entity_id.to_string(),
            message: format!("Entity not found: {}", entity_id),
        };
    };

    let live = state.value();
    let current = live.map(|v| v.as_number());
    let kind = settings.resolve_kind(live);
    let unit = settings
        .unit
        .as_deref()
        .or(state.unit_of_measurement.as_deref())
        .unwrap_or("");
    let display = |value: Option<f64>| display_value(value, kind, settings.digits, unit);
    let color = |value: Option<f64>| {
        color_for_value(value, settings.thresholds_for(kind, value), settings.gradient)
    };

    let history = cache.buckets(entity_id).unwrap_or(&[]);

    let mut segments: Vec<Segment> = history
        .iter()
        .enumerate()
        .map(|(index, value)| {
            let label = time_label(index, settings.intervals, settings.hours, now, strings);
            let shown = match value {
                Some(_) => display(*value),
                None => strings.error_loading_data.to_string(),
            };
            Segment {
                color: color(*value),
                tooltip: format!("{} : {}", label, shown),
                is_now: false,
            }
        })
        .collect();

    segments.push(Segment {
        color: color(current),
        tooltip: format!("{} - {}", display(current), strings.now),
        is_now: true,
    });

    let min_max_label = settings.show_min_max.then(|| {
        let range = min_max(history.iter().copied().chain(std::iter::once(current)));
        format!(
            "{}: {} / {}: {}",
            strings.min_label,
            display(range.map(|(min, _)| min)),
            strings.max_label,
            display(range.map(|(_, max)| max)),
        )
    });

    let labels = settings.show_labels.then(|| RangeLabels {
        start: format!("{}{}", settings.hours, strings.hours_ago),
        end: strings.now.to_string(),
    });

    let name = settings
        .name
        .clone()
        .or_else(|| state.friendly_name.clone())
        .unwrap_or_else(|| entity_id.to_string());

    tracing::debug!(
        "Rendered {} with {} segments ({:?})",
        entity_id,
        segments.len(),
        kind
    );

    EntityView::Strip(EntityStrip {
        entity_id: entity_id.to_string(),
        name,
        kind,
        current: settings.show_current.then(|| display(current)),
        segments,
        labels,
        min_max: min_max_label,
        scale: Scale {
            min: settings.min_value,
            max: settings.max_value,
        },
        on_select: MoreInfoEvent::new(entity_id),
    })
}
