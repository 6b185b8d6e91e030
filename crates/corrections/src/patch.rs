use foundation::NumericId;
use serde::{Deserialize, Serialize};

/// Rewrites applied to ingested topology features before the join. Features
/// are addressed by their ingest position; `expect` is the id the feature
/// must carry for the patch to apply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum GeometryPatch {
    ReassignId {
        position: usize,
        expect: NumericId,
        to: NumericId,
    },
    Exclude {
        position: usize,
        expect: NumericId,
    },
}

impl GeometryPatch {
    pub fn name(&self) -> &'static str {
        match self {
            GeometryPatch::ReassignId { .. } => "reassign_id",
            GeometryPatch::Exclude { .. } => "exclude",
        }
    }

    pub fn position(&self) -> usize {
        match self {
            GeometryPatch::ReassignId { position, .. } | GeometryPatch::Exclude { position, .. } => {
                *position
            }
        }
    }

    pub fn expect(&self) -> NumericId {
        match self {
            GeometryPatch::ReassignId { expect, .. } | GeometryPatch::Exclude { expect, .. } => {
                *expect
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "attribute", content = "value", rename_all = "camelCase")]
pub enum AttributeValue {
    Name(String),
    Area(f64),
    Capital(String),
    NumericCode(NumericId),
    Alpha2Code(String),
}

impl AttributeValue {
    pub fn attribute(&self) -> &'static str {
        match self {
            AttributeValue::Name(_) => "name",
            AttributeValue::Area(_) => "area",
            AttributeValue::Capital(_) => "capital",
            AttributeValue::NumericCode(_) => "numericCode",
            AttributeValue::Alpha2Code(_) => "alpha2Code",
        }
    }
}

/// Edits to country attribute records, addressed by alpha-3 code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum AttributePatch {
    /// Append to the alternate-name list, creating it when absent.
    SeedAltSpelling { alpha3: String, spelling: String },
    /// Keep the current name as an alternate spelling before it is renamed.
    PreserveName { alpha3: String },
    Set { alpha3: String, value: AttributeValue },
    /// Mark each dependent as administered by `sovereign`.
    RegionOf {
        sovereign: String,
        dependents: Vec<String>,
    },
}

impl AttributePatch {
    pub fn name(&self) -> &'static str {
        match self {
            AttributePatch::SeedAltSpelling { .. } => "seed_alt_spelling",
            AttributePatch::PreserveName { .. } => "preserve_name",
            AttributePatch::Set { .. } => "set",
            AttributePatch::RegionOf { .. } => "region_of",
        }
    }
}

/// Entities synthesized out of an existing one.
///
/// Split ranges are written against the parent's coordinate groups as
/// ingested; for one parent they must be listed in ascending order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum TerritoryPatch {
    Split {
        parent: String,
        child: String,
        start: usize,
        count: usize,
    },
    Clone {
        source: String,
        child: String,
    },
}

impl TerritoryPatch {
    pub fn name(&self) -> &'static str {
        match self {
            TerritoryPatch::Split { .. } => "split",
            TerritoryPatch::Clone { .. } => "clone",
        }
    }

    pub fn child(&self) -> &str {
        match self {
            TerritoryPatch::Split { child, .. } | TerritoryPatch::Clone { child, .. } => child,
        }
    }
}

/// Country-label placement overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum LabelOverride {
    Coordinates { alpha3: String, coordinates: [f64; 2] },
    Offset { alpha3: String, offset: f64 },
}

impl LabelOverride {
    pub fn alpha3(&self) -> &str {
        match self {
            LabelOverride::Coordinates { alpha3, .. } | LabelOverride::Offset { alpha3, .. } => {
                alpha3
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapitalOffset {
    pub alpha3: String,
    pub offset: f64,
}
