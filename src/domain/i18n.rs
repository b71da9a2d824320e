// Card strings in the supported languages

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Language {
    #[default]
    En,
    Fr,
}

/// Translated strings used by the card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Strings {
    pub history: &'static str,
    pub error_loading_data: &'static str,
    pub min_label: &'static str,
    pub max_label: &'static str,
    pub hours_ago: &'static str,
    pub minutes_ago: &'static str,
    pub now: &'static str,
}

const EN: Strings = Strings {
    history: "History",
    error_loading_data: "Error loading historical data",
    min_label: "Min",
    max_label: "Max",
    hours_ago: "h ago",
    minutes_ago: "m ago",
    now: "Now",
};

const FR: Strings = Strings {
    history: "Historique",
    error_loading_data: "Erreur lors du chargement des données historiques",
    min_label: "Min",
    max_label: "Max",
    hours_ago: "h",
    minutes_ago: "min",
    now: "Actuel",
};

impl Language {
    /// Pick a language from a host tag such as `fr-FR`; unknown tags fall back
    /// to English.
    pub fn from_tag(tag: Option<&str>) -> Self {
        let primary = tag
            .and_then(|t| t.split(['-', '_']).next())
            .map(str::to_ascii_lowercase);

        match primary.as_deref() {
            Some("fr") => Self::Fr,
            _ => Self::En,
        }
    }

    pub fn strings(self) -> &'static Strings {
        match self {
            Self::En => &EN,
            Self::Fr => &FR,
        }
    }
}
