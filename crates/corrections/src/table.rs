use std::fmt;

use scene::Marker;
use serde::{Deserialize, Serialize};

use crate::builtin;
use crate::patch::{AttributePatch, CapitalOffset, GeometryPatch, LabelOverride, TerritoryPatch};

pub const CORRECTIONS_VERSION: &str = "1.0";

/// Versioned, ordered set of patches interpreted by the enrichment pipeline.
/// Order within each list is part of the contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorrectionTable {
    pub version: String,
    #[serde(default)]
    pub geometry: Vec<GeometryPatch>,
    #[serde(default)]
    pub attributes: Vec<AttributePatch>,
    #[serde(default)]
    pub territories: Vec<TerritoryPatch>,
    #[serde(default)]
    pub extra_capitals: Vec<Marker>,
    #[serde(default)]
    pub country_labels: Vec<LabelOverride>,
    #[serde(default)]
    pub capital_offsets: Vec<CapitalOffset>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CorrectionSummary {
    pub version: String,
    pub fingerprint: String,
    pub geometry_patches: usize,
    pub attribute_patches: usize,
    pub territory_patches: usize,
    pub extra_capitals: usize,
    pub country_labels: usize,
    pub capital_offsets: usize,
}

#[derive(Debug)]
pub enum CorrectionsError {
    Json(serde_json::Error),
    UnsupportedVersion { found: String },
}

impl fmt::Display for CorrectionsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CorrectionsError::Json(err) => write!(f, "correction table parse error: {err}"),
            CorrectionsError::UnsupportedVersion { found } => {
                write!(f, "Unsupported correction table version: {found}")
            }
        }
    }
}

impl std::error::Error for CorrectionsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CorrectionsError::Json(err) => Some(err),
            CorrectionsError::UnsupportedVersion { .. } => None,
        }
    }
}

impl Default for CorrectionTable {
    fn default() -> Self {
        Self::empty()
    }
}

impl CorrectionTable {
    /// A table that changes nothing.
    pub fn empty() -> Self {
        Self {
            version: CORRECTIONS_VERSION.to_string(),
            geometry: Vec::new(),
            attributes: Vec::new(),
            territories: Vec::new(),
            extra_capitals: Vec::new(),
            country_labels: Vec::new(),
            capital_offsets: Vec::new(),
        }
    }

    /// The table shipped with the application.
    pub fn builtin() -> Self {
        Self {
            version: CORRECTIONS_VERSION.to_string(),
            geometry: builtin::geometry_patches(),
            attributes: builtin::attribute_patches(),
            territories: builtin::territory_patches(),
            extra_capitals: builtin::extra_capitals(),
            country_labels: builtin::country_labels(),
            capital_offsets: builtin::capital_offsets(),
        }
    }

    pub fn from_json_str(payload: &str) -> Result<Self, CorrectionsError> {
        let table: CorrectionTable =
            serde_json::from_str(payload).map_err(CorrectionsError::Json)?;
        if table.version != CORRECTIONS_VERSION {
            return Err(CorrectionsError::UnsupportedVersion {
                found: table.version,
            });
        }
        Ok(table)
    }

    pub fn canonical_json(&self) -> Result<String, CorrectionsError> {
        serde_json::to_string(self).map_err(CorrectionsError::Json)
    }

    /// blake3 hex digest of [`Self::canonical_json`].
    pub fn fingerprint(&self) -> Result<String, CorrectionsError> {
        let json = self.canonical_json()?;
        Ok(blake3::hash(json.as_bytes()).to_hex().to_string())
    }

    pub fn summary(&self) -> Result<CorrectionSummary, CorrectionsError> {
        Ok(CorrectionSummary {
            version: self.version.clone(),
            fingerprint: self.fingerprint()?,
            geometry_patches: self.geometry.len(),
            attribute_patches: self.attributes.len(),
            territory_patches: self.territories.len(),
            extra_capitals: self.extra_capitals.len(),
            country_labels: self.country_labels.len(),
            capital_offsets: self.capital_offsets.len(),
        })
    }
}
