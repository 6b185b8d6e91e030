use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Row of the capital-coordinate asset. Coordinates arrive as strings in the
/// published dataset and as numbers in hand-edited copies.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CapitalRecord {
    #[serde(default)]
    pub country_name: Option<String>,
    #[serde(default)]
    pub capital_name: Option<String>,
    pub country_code: String,
    #[serde(deserialize_with = "number_or_string")]
    pub capital_longitude: f64,
    #[serde(deserialize_with = "number_or_string")]
    pub capital_latitude: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CapitalLocation {
    pub capital_name: Option<String>,
    /// `[lon, lat]` in degrees.
    pub coordinates: [f64; 2],
}

/// Capital coordinates keyed by alpha-2 country code. The first entry for a
/// code wins; later duplicates are ignored.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct CapitalIndex {
    by_alpha2: BTreeMap<String, CapitalLocation>,
}

#[derive(Debug)]
pub enum AssetError {
    Json {
        asset: &'static str,
        source: serde_json::Error,
    },
}

impl fmt::Display for AssetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetError::Json { asset, source } => write!(f, "{asset} parse error: {source}"),
        }
    }
}

impl std::error::Error for AssetError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AssetError::Json { source, .. } => Some(source),
        }
    }
}

impl CapitalIndex {
    pub fn from_records(records: impl IntoIterator<Item = CapitalRecord>) -> Self {
        let mut by_alpha2 = BTreeMap::new();
        for record in records {
            by_alpha2
                .entry(record.country_code)
                .or_insert(CapitalLocation {
                    capital_name: record.capital_name,
                    coordinates: [record.capital_longitude, record.capital_latitude],
                });
        }
        Self { by_alpha2 }
    }

    pub fn from_json_str(payload: &str) -> Result<Self, AssetError> {
        let records: Vec<CapitalRecord> =
            serde_json::from_str(payload).map_err(|source| AssetError::Json {
                asset: "capital coordinates",
                source,
            })?;
        Ok(Self::from_records(records))
    }

    pub fn get(&self, alpha2: &str) -> Option<&CapitalLocation> {
        self.by_alpha2.get(alpha2)
    }

    pub fn len(&self) -> usize {
        self.by_alpha2.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_alpha2.is_empty()
    }
}

fn number_or_string<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| serde::de::Error::custom("coordinate out of range")),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| serde::de::Error::custom(format!("invalid coordinate {s:?}"))),
        other => Err(serde::de::Error::custom(format!(
            "coordinate must be a number or string, got {other}"
        ))),
    }
}
