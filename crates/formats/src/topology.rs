use std::collections::BTreeMap;
use std::fmt;

use foundation::NumericId;
use scene::{AreaGeometry, GeoPoint, Ring};
use serde::Deserialize;
use serde_json::Value;

use crate::geojson::{GeoJsonError, parse_feature_collection};

/// Object name holding country borders in the world atlas topology.
pub const COUNTRIES_OBJECT: &str = "countries";

/// One decoded country feature, in document order.
#[derive(Debug, Clone, PartialEq)]
pub struct TopologyFeature {
    pub id: NumericId,
    pub geometry: AreaGeometry,
}

#[derive(Debug)]
pub enum TopologyError {
    Json(serde_json::Error),
    UnsupportedDocument(String),
    MissingObject(String),
    InvalidGeometry { index: usize, reason: String },
    ArcOutOfRange { index: usize, arc: i64 },
    GeoJson(GeoJsonError),
}

impl fmt::Display for TopologyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TopologyError::Json(err) => write!(f, "topology JSON parse error: {err}"),
            TopologyError::UnsupportedDocument(kind) => {
                write!(f, "unsupported topology document type: {kind}")
            }
            TopologyError::MissingObject(name) => {
                write!(f, "topology has no object named {name:?}")
            }
            TopologyError::InvalidGeometry { index, reason } => {
                write!(f, "invalid geometry at index {index}: {reason}")
            }
            TopologyError::ArcOutOfRange { index, arc } => {
                write!(f, "geometry at index {index} references missing arc {arc}")
            }
            TopologyError::GeoJson(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for TopologyError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TopologyError::Json(err) => Some(err),
            TopologyError::GeoJson(err) => Some(err),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct Topology {
    #[serde(default)]
    transform: Option<Transform>,
    arcs: Vec<Vec<Vec<f64>>>,
    objects: BTreeMap<String, TopoObject>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
struct Transform {
    scale: [f64; 2],
    translate: [f64; 2],
}

#[derive(Debug, Deserialize)]
struct TopoObject {
    #[serde(rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    geometries: Vec<TopoGeometry>,
}

#[derive(Debug, Deserialize)]
struct TopoGeometry {
    #[serde(rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    id: Option<NumericId>,
    #[serde(default)]
    arcs: Value,
}

/// Decodes either a TopoJSON `Topology` (reading `object_name`) or a GeoJSON
/// `FeatureCollection` into ordered country features.
pub fn parse_country_features(
    payload: &str,
    object_name: &str,
) -> Result<Vec<TopologyFeature>, TopologyError> {
    let value: Value = serde_json::from_str(payload).map_err(TopologyError::Json)?;
    let kind = value
        .get("type")
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string();
    match kind.as_str() {
        "Topology" => decode_topology(value, object_name),
        "FeatureCollection" => parse_feature_collection(&value).map_err(TopologyError::GeoJson),
        _ => Err(TopologyError::UnsupportedDocument(kind)),
    }
}

fn decode_topology(value: Value, object_name: &str) -> Result<Vec<TopologyFeature>, TopologyError> {
    let topology: Topology = serde_json::from_value(value).map_err(TopologyError::Json)?;
    let object = topology
        .objects
        .get(object_name)
        .ok_or_else(|| TopologyError::MissingObject(object_name.to_string()))?;
    if object.kind.as_deref() != Some("GeometryCollection") {
        return Err(TopologyError::UnsupportedDocument(format!(
            "object {object_name:?} is not a GeometryCollection"
        )));
    }

    let arcs = decode_arcs(&topology.arcs, topology.transform);
    let mut out = Vec::with_capacity(object.geometries.len());
    for (index, geom) in object.geometries.iter().enumerate() {
        let id = geom.id.ok_or_else(|| TopologyError::InvalidGeometry {
            index,
            reason: "geometry missing id".to_string(),
        })?;
        let geometry = decode_geometry(index, geom, &arcs)?;
        out.push(TopologyFeature { id, geometry });
    }
    Ok(out)
}

/// Absolute positions for every arc. Quantized arcs are delta-encoded, with
/// the running sum reset at the start of each arc.
fn decode_arcs(raw: &[Vec<Vec<f64>>], transform: Option<Transform>) -> Vec<Vec<GeoPoint>> {
    raw.iter()
        .map(|arc| {
            let (mut x, mut y) = (0.0, 0.0);
            arc.iter()
                .filter(|p| p.len() >= 2)
                .map(|p| match transform {
                    Some(t) => {
                        x += p[0];
                        y += p[1];
                        GeoPoint::new(
                            x * t.scale[0] + t.translate[0],
                            y * t.scale[1] + t.translate[1],
                        )
                    }
                    None => GeoPoint::new(p[0], p[1]),
                })
                .collect()
        })
        .collect()
}

fn decode_geometry(
    index: usize,
    geom: &TopoGeometry,
    arcs: &[Vec<GeoPoint>],
) -> Result<AreaGeometry, TopologyError> {
    let invalid = |reason: String| TopologyError::InvalidGeometry { index, reason };
    match geom.kind.as_deref() {
        None => Ok(AreaGeometry::default()),
        Some("Polygon") => {
            let rings: Vec<Vec<i64>> = serde_json::from_value(geom.arcs.clone())
                .map_err(|e| invalid(format!("Polygon arcs: {e}")))?;
            Ok(AreaGeometry::Polygon(stitch_polygon(index, &rings, arcs)?))
        }
        Some("MultiPolygon") => {
            let polys: Vec<Vec<Vec<i64>>> = serde_json::from_value(geom.arcs.clone())
                .map_err(|e| invalid(format!("MultiPolygon arcs: {e}")))?;
            let mut out = Vec::with_capacity(polys.len());
            for rings in &polys {
                out.push(stitch_polygon(index, rings, arcs)?);
            }
            Ok(AreaGeometry::MultiPolygon(out))
        }
        Some(other) => Err(invalid(format!("unsupported geometry type: {other}"))),
    }
}

fn stitch_polygon(
    index: usize,
    rings: &[Vec<i64>],
    arcs: &[Vec<GeoPoint>],
) -> Result<Vec<Ring>, TopologyError> {
    rings.iter().map(|r| stitch_ring(index, r, arcs)).collect()
}

/// Concatenates arcs into a ring. Consecutive arcs share an endpoint, which
/// is emitted once; `~i` walks arc `i` backwards.
fn stitch_ring(index: usize, refs: &[i64], arcs: &[Vec<GeoPoint>]) -> Result<Ring, TopologyError> {
    let mut points: Ring = Vec::new();
    for &arc in refs {
        let arc_index = if arc < 0 { !arc } else { arc };
        let source = usize::try_from(arc_index)
            .ok()
            .and_then(|i| arcs.get(i))
            .ok_or(TopologyError::ArcOutOfRange { index, arc })?;
        points.pop();
        let start = points.len();
        points.extend_from_slice(source);
        if arc < 0 {
            points[start..].reverse();
        }
    }
    if let Some(&first) = points.first() {
        while points.len() < 4 {
            points.push(first);
        }
    }
    Ok(points)
}
