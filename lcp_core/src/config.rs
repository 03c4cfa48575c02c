//! Process-wide configuration, built once at startup and passed by
//! reference into the aggregation pipeline.
//!
//! The property table is fixed at process start; there is no dynamic
//! registration and no hidden global state.

use chrono::NaiveTime;
use chrono_tz::Tz;

use crate::store::normalize_property_key;

/// Properties registered when no `LCP_PROPERTIES` override is given.
pub static DEFAULT_PROPERTIES: [&str; 2] = ["LIVA", "BLOM"];

/// Environment suffixes of the external feed URLs, in merge order.
static SOURCE_SUFFIXES: [(&str, &str); 3] = [
    ("google", "GOOGLE_ICS"),
    ("airbnb", "AIRBNB_ICS"),
    ("booking", "BOOKING_ICS"),
];

/// One external iCalendar feed of a property.
#[derive(Debug, Clone)]
pub struct SourceConfig {
    /// Provider name, used as the interval source tag.
    pub name: String,
    pub url: String,
}

/// A rental unit: its normalized code and its ordered external feeds.
#[derive(Debug, Clone)]
pub struct PropertyConfig {
    pub code: String,
    pub sources: Vec<SourceConfig>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub properties: Vec<PropertyConfig>,
    /// The single operating time zone of the whole system.
    pub timezone: Tz,
    /// Default arrival time applied to date-only reservation starts.
    pub check_in: NaiveTime,
    /// Default departure time applied to date-only reservation ends.
    pub check_out: NaiveTime,
    /// Shift every emitted DTEND forward by one day (inclusive to
    /// exclusive end-date conversion), applied to all events or none.
    pub exclusive_end: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            properties: Vec::new(),
            timezone: chrono_tz::Europe::Paris,
            check_in: NaiveTime::from_hms_opt(15, 0, 0).unwrap(),
            check_out: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            exclusive_end: false,
        }
    }
}

impl Config {
    /// Register a property. The code is normalized so lookups are
    /// insensitive to case and accents.
    pub fn with_property(mut self, code: &str, sources: Vec<SourceConfig>) -> Self {
        self.properties.push(PropertyConfig {
            code: normalize_property_key(code),
            sources,
        });
        self
    }

    /// Look up a property by client-supplied key.
    pub fn property(&self, key: &str) -> Option<&PropertyConfig> {
        let key = normalize_property_key(key);
        self.properties.iter().find(|property| property.code == key)
    }

    /// Build the configuration from the environment.
    ///
    /// `LCP_PROPERTIES` is a comma-separated code list (default
    /// `LIVA,BLOM`); each property reads `{CODE}_GOOGLE_ICS`,
    /// `{CODE}_AIRBNB_ICS` and `{CODE}_BOOKING_ICS`, skipping unset or
    /// empty entries. `LCP_TIMEZONE` and `LCP_EXCLUSIVE_END` override the
    /// zone and the end-date policy.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(name) = std::env::var("LCP_TIMEZONE") {
            if let Ok(timezone) = name.parse() {
                config.timezone = timezone;
            }
        }
        if let Ok(value) = std::env::var("LCP_EXCLUSIVE_END") {
            config.exclusive_end = matches!(value.as_str(), "1" | "true" | "yes");
        }
        let names = std::env::var("LCP_PROPERTIES")
            .unwrap_or_else(|_| DEFAULT_PROPERTIES.join(","));
        for name in names.split(',').map(str::trim).filter(|name| !name.is_empty()) {
            let code = normalize_property_key(name);
            let mut sources = Vec::new();
            for (provider, suffix) in SOURCE_SUFFIXES {
                match std::env::var(format!("{code}_{suffix}")) {
                    Ok(url) if !url.trim().is_empty() => sources.push(SourceConfig {
                        name: provider.to_string(),
                        url,
                    }),
                    _ => {}
                }
            }
            config.properties.push(PropertyConfig { code, sources });
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_property_lookup_is_case_and_accent_insensitive() {
        let config = Config::default().with_property("LIVA", Vec::new());
        assert!(config.property("LIVA").is_some());
        assert!(config.property("liva").is_some());
        assert!(config.property("Lîvá").is_some());
        assert!(config.property("BLOM").is_none());
    }

    #[test]
    fn test_registration_normalizes_the_code() {
        let config = Config::default().with_property("Livablōm", Vec::new());
        assert_eq!(config.properties[0].code, "LIVABLOM");
        assert!(config.property("livablom").is_some());
    }

    #[test]
    fn test_default_policy_times() {
        let config = Config::default();
        assert_eq!(config.check_in, NaiveTime::from_hms_opt(15, 0, 0).unwrap());
        assert_eq!(config.check_out, NaiveTime::from_hms_opt(10, 0, 0).unwrap());
        assert_eq!(config.timezone, chrono_tz::Europe::Paris);
        assert!(!config.exclusive_end);
    }
}
