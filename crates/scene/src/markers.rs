use serde::{Deserialize, Serialize};

/// A point label anchored to an entity: a country-name label or a capital.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Marker {
    pub name: String,
    pub alpha3_code: String,
    /// `[lon, lat]` in degrees.
    pub coordinates: [f64; 2],
    /// Vertical pixel offset of the rendered text.
    pub marker_offset: f64,
}
