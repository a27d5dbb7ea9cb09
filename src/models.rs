//! Data models for the five persisted collections.
//!
//! Field names on disk follow the established JSON layout (`AQI`,
//! `AQI_level`, `AQI_range`). Decoding is lenient: missing fields take their
//! default, numeric fields accept either numbers or numeric strings, and keys
//! outside the known layout are carried in `extra` so they survive a rewrite.

use std::collections::BTreeMap;

use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::store::Collection;
use crate::util::parse_float;

// ---

/// Pollutant name to measured concentration. Keys are sparse.
pub type PollutantLevels = BTreeMap<String, f64>;

/// Stored keys this model does not know about.
pub type ExtraFields = Map<String, Value>;

/// A persisted entity with a string identifier.
pub trait Entity: Serialize + DeserializeOwned {
    // ---
    /// Collection the entity is stored in.
    const COLLECTION: Collection;

    fn id(&self) -> &str;
}

/// A single time-stamped regional air quality reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirQualityRecord {
    // ---
    #[serde(default, deserialize_with = "lenient_string")]
    pub record_id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub region: String,
    /// Usually `YYYY-MM-DD`, but may be arbitrary text.
    #[serde(default, deserialize_with = "lenient_string")]
    pub date: String,
    #[serde(rename = "AQI", default, deserialize_with = "lenient_aqi")]
    pub aqi: i64,
    #[serde(default, deserialize_with = "lenient_levels")]
    pub pollutants: PollutantLevels,
    #[serde(default, deserialize_with = "lenient_string")]
    pub health_risk: String,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

/// Pollutant definition. `name` is the key used in [`PollutantLevels`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pollutant {
    // ---
    #[serde(default, deserialize_with = "lenient_string")]
    pub pollutant_id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub description: String,
    /// Advisory threshold, not enforced anywhere.
    #[serde(default, deserialize_with = "lenient_number")]
    pub safe_limit: f64,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

/// Alert lifecycle state. Only `active` alerts are shown to citizens.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AlertStatus {
    #[default]
    Active,
    Withdrawn,
    /// Any other stored value, kept as written.
    Other(String),
}

impl AlertStatus {
    pub fn as_str(&self) -> &str {
        match self {
            AlertStatus::Active => "active",
            AlertStatus::Withdrawn => "withdrawn",
            AlertStatus::Other(text) => text,
        }
    }
}

impl From<String> for AlertStatus {
    fn from(text: String) -> Self {
        // ---
        match text.as_str() {
            "active" => AlertStatus::Active,
            "withdrawn" => AlertStatus::Withdrawn,
            _ => AlertStatus::Other(text),
        }
    }
}

impl Serialize for AlertStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for AlertStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        lenient_string(deserializer).map(AlertStatus::from)
    }
}

/// Advisory notice for a region. Severity is a free-text label and expiry is
/// never enforced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    // ---
    #[serde(default, deserialize_with = "lenient_string")]
    pub alert_id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub region: String,
    #[serde(rename = "AQI_level", default, deserialize_with = "lenient_string")]
    pub aqi_level: String,
    #[serde(default)]
    pub status: AlertStatus,
    #[serde(default, deserialize_with = "lenient_string")]
    pub issue_date: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub expiry_date: String,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Citizen {
    // ---
    #[serde(default, deserialize_with = "lenient_string")]
    pub citizen_id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    /// Free text as entered; numbers found on disk are read as their text.
    #[serde(default, deserialize_with = "lenient_string")]
    pub age: String,
    /// Region used for "current air quality" lookups.
    #[serde(default, deserialize_with = "lenient_string")]
    pub location: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub contact: String,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

/// Static AQI range to precaution text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Guideline {
    // ---
    #[serde(default, deserialize_with = "lenient_string")]
    pub guide_id: String,
    #[serde(rename = "AQI_range", default, deserialize_with = "lenient_string")]
    pub aqi_range: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub precautions: String,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl Entity for AirQualityRecord {
    const COLLECTION: Collection = Collection::Air;

    fn id(&self) -> &str {
        &self.record_id
    }
}

impl Entity for Pollutant {
    const COLLECTION: Collection = Collection::Pollutants;

    fn id(&self) -> &str {
        &self.pollutant_id
    }
}

impl Entity for Alert {
    const COLLECTION: Collection = Collection::Alerts;

    fn id(&self) -> &str {
        &self.alert_id
    }
}

impl Entity for Citizen {
    const COLLECTION: Collection = Collection::Citizens;

    fn id(&self) -> &str {
        &self.citizen_id
    }
}

impl Entity for Guideline {
    const COLLECTION: Collection = Collection::Guidelines;

    fn id(&self) -> &str {
        &self.guide_id
    }
}

// ---
// Lenient field decoders

fn coerce_number(value: &Value) -> f64 {
    // ---
    match value {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()).unwrap_or(0.0),
        Value::String(s) => parse_float(s, 0.0),
        _ => 0.0,
    }
}

fn lenient_string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    // ---
    Ok(match Value::deserialize(d)? {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

fn lenient_number<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
    // ---
    Ok(coerce_number(&Value::deserialize(d)?))
}

fn lenient_aqi<'de, D: Deserializer<'de>>(d: D) -> Result<i64, D::Error> {
    // ---
    Ok(coerce_number(&Value::deserialize(d)?) as i64)
}

fn lenient_levels<'de, D: Deserializer<'de>>(d: D) -> Result<PollutantLevels, D::Error> {
    // ---
    Ok(match Value::deserialize(d)? {
        Value::Object(map) => map
            .iter()
            .map(|(name, v)| (name.clone(), coerce_number(v)))
            .collect(),
        _ => PollutantLevels::new(),
    })
}
