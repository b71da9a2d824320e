use crate::domain::color::ThresholdEntry;
use crate::domain::entity::{CardSettings, EntitySettings, ValueKind};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Deserialize, Clone)]
pub struct HomeAssistantConfig {
    pub homeassistant: HomeAssistantSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct HomeAssistantSettings {
    pub host: String,
    pub token: String,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default = "default_listen")]
    pub listen: String,
}

fn default_listen() -> String {
    "0.0.0.0:8080".to_string()
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Please define a list of entities.")]
    NoEntities,

    #[error("entity ids must not be empty")]
    EmptyEntityId,

    #[error("{entity}: intervals must be at least 1")]
    ZeroIntervals { entity: String },

    #[error("{entity}: hours must be at least 1")]
    ZeroHours { entity: String },

    #[error("{entity}: hours must be at most {max}")]
    TooManyHours { entity: String, max: u32 },

    #[error("{entity}: threshold table must not be empty")]
    EmptyThresholds { entity: String },
}

/// Card configuration as written by the user. Every display option is optional
/// here; `into_settings` applies the entity -> global -> built-in fallback.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct CardConfig {
    pub title: Option<String>,
    pub hours: Option<u32>,
    pub intervals: Option<usize>,
    pub height: Option<u32>,
    pub min_value: Option<f64>,
    pub max_value: Option<f64>,
    pub thresholds: Option<Vec<ThresholdEntry>>,
    pub gradient: Option<bool>,
    pub show_current: Option<bool>,
    pub show_labels: Option<bool>,
    pub show_min_max: Option<bool>,
    pub unit: Option<String>,
    pub compact: Option<bool>,
    pub default_value: Option<f64>,
    pub digits: Option<usize>,
    pub kind: Option<ValueKind>,
    #[serde(default)]
    pub entities: Vec<EntityEntry>,
}

/// An entity is either a bare id or a table of overrides.
#[derive(Debug, Deserialize, Clone)]
#[serde(untagged)]
pub enum EntityEntry {
    Id(String),
    Config(EntityConfig),
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct EntityConfig {
    pub entity: String,
    pub name: Option<String>,
    pub hours: Option<u32>,
    pub intervals: Option<usize>,
    pub min_value: Option<f64>,
    pub max_value: Option<f64>,
    pub thresholds: Option<Vec<ThresholdEntry>>,
    pub gradient: Option<bool>,
    pub show_current: Option<bool>,
    pub show_labels: Option<bool>,
    pub show_min_max: Option<bool>,
    pub unit: Option<String>,
    pub digits: Option<usize>,
    pub default_value: Option<f64>,
    pub kind: Option<ValueKind>,
}

impl From<EntityEntry> for EntityConfig {
    fn from(entry: EntityEntry) -> Self {
        match entry {
            EntityEntry::Id(entity) => EntityConfig {
                entity,
                ..Default::default()
            },
            EntityEntry::Config(config) => config,
        }
    }
}

impl CardConfig {
    pub const DEFAULT_HEIGHT: u32 = 60;

    /// Validate and resolve into per-entity settings.
    pub fn into_settings(self) -> Result<CardSettings, ConfigError> {
        if self.entities.is_empty() {
            return Err(ConfigError::NoEntities);
        }

        let entities = self
            .entities
            .iter()
            .cloned()
            .map(|entry| self.resolve(entry.into()))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(CardSettings {
            title: self.title,
            height: self.height.unwrap_or(Self::DEFAULT_HEIGHT),
            compact: self.compact.unwrap_or(false),
            entities,
        })
    }

    fn resolve(&self, entity: EntityConfig) -> Result<EntitySettings, ConfigError> {
        let id = entity.entity.trim().to_string();
        if id.is_empty() {
            return Err(ConfigError::EmptyEntityId);
        }

        let mut settings = EntitySettings::new(id.clone());
        settings.name = entity.name;
        settings.hours = entity.hours.or(self.hours).unwrap_or(settings.hours);
        settings.intervals = entity.intervals.or(self.intervals).unwrap_or(settings.intervals);
        settings.min_value = entity.min_value.or(self.min_value);
        settings.max_value = entity.max_value.or(self.max_value);
        settings.thresholds = entity.thresholds.or_else(|| self.thresholds.clone());
        settings.gradient = entity.gradient.or(self.gradient).unwrap_or(settings.gradient);
        settings.show_current = entity
            .show_current
            .or(self.show_current)
            .unwrap_or(settings.show_current);
        settings.show_labels = entity
            .show_labels
            .or(self.show_labels)
            .unwrap_or(settings.show_labels);
        settings.show_min_max = entity
            .show_min_max
            .or(self.show_min_max)
            .unwrap_or(settings.show_min_max);
        settings.unit = entity.unit.or_else(|| self.unit.clone());
        settings.digits = entity.digits.or(self.digits).unwrap_or(settings.digits);
        settings.default_value = entity.default_value.or(self.default_value);
        settings.kind = entity.kind.or(self.kind);

        if settings.hours == 0 {
            return Err(ConfigError::ZeroHours { entity: id });
        }
        if settings.hours > EntitySettings::MAX_HOURS {
            return Err(ConfigError::TooManyHours {
                entity: id,
                max: EntitySettings::MAX_HOURS,
            });
        }
        if settings.intervals == 0 {
            return Err(ConfigError::ZeroIntervals { entity: id });
        }
        if settings.thresholds.as_ref().is_some_and(|t| t.is_empty()) {
            return Err(ConfigError::EmptyThresholds { entity: id });
        }

        Ok(settings)
    }
}

/// `WATERFALL_HOMEASSISTANT__TOKEN` overrides `homeassistant.token`.
fn environment() -> config::Environment {
    config::Environment::with_prefix("WATERFALL")
        .prefix_separator("_")
        .separator("__")
}

pub fn load_homeassistant_config() -> anyhow::Result<HomeAssistantConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/homeassistant"))
        .add_source(environment())
        .build()?;

    Ok(settings.try_deserialize()?)
}

pub fn load_card_config() -> anyhow::Result<CardSettings> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/waterfall"))
        .build()?;

    let card: CardConfig = settings.try_deserialize()?;
    Ok(card.into_settings()?)
}
