use std::fmt;

use foundation::NumericId;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One row of the external country attribute table.
///
/// Unknown fields are ignored; `altSpellings` and `regionOf` are only
/// present once corrections have touched a record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountryRecord {
    pub name: String,
    #[serde(default)]
    pub capital: Option<String>,
    pub alpha3_code: String,
    pub alpha2_code: String,
    #[serde(default, deserialize_with = "lenient_numeric_code")]
    pub numeric_code: Option<NumericId>,
    #[serde(default)]
    pub area: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt_spellings: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region_of: Option<String>,
}

impl CountryRecord {
    pub fn new(
        name: impl Into<String>,
        alpha3_code: impl Into<String>,
        alpha2_code: impl Into<String>,
        numeric_code: Option<NumericId>,
    ) -> Self {
        Self {
            name: name.into(),
            capital: None,
            alpha3_code: alpha3_code.into(),
            alpha2_code: alpha2_code.into(),
            numeric_code,
            area: None,
            alt_spellings: None,
            region_of: None,
        }
    }
}

#[derive(Debug)]
pub enum AttributesError {
    Json(serde_json::Error),
    NotAnArray,
}

impl fmt::Display for AttributesError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributesError::Json(err) => write!(f, "attribute table parse error: {err}"),
            AttributesError::NotAnArray => write!(f, "attribute table must be a JSON array"),
        }
    }
}

impl std::error::Error for AttributesError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AttributesError::Json(err) => Some(err),
            AttributesError::NotAnArray => None,
        }
    }
}

pub fn parse_country_records(payload: &str) -> Result<Vec<CountryRecord>, AttributesError> {
    let value: Value = serde_json::from_str(payload).map_err(AttributesError::Json)?;
    if !value.is_array() {
        return Err(AttributesError::NotAnArray);
    }
    serde_json::from_value(value).map_err(AttributesError::Json)
}

/// `"250"`, `250`, `null` and `""` are all accepted; blank means "no code".
fn lenient_numeric_code<'de, D>(deserializer: D) -> Result<Option<NumericId>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::String(s) if s.trim().is_empty() => Ok(None),
        Value::String(s) => s.parse().map(Some).map_err(serde::de::Error::custom),
        Value::Number(n) => n
            .as_i64()
            .ok_or_else(|| serde::de::Error::custom(format!("non-integer numericCode {n}")))
            .and_then(|n| NumericId::try_from(n).map_err(serde::de::Error::custom))
            .map(Some),
        other => Err(serde::de::Error::custom(format!(
            "unexpected numericCode {other}"
        ))),
    }
}
