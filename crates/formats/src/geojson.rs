use foundation::NumericId;
use scene::{AreaGeometry, EntitySet, GeoPoint, Ring};
use serde_json::{Map, Value};

use crate::topology::TopologyFeature;

#[derive(Debug)]
pub enum GeoJsonError {
    NotAFeatureCollection,
    InvalidFeature { index: usize, reason: String },
    Properties(serde_json::Error),
}

impl std::fmt::Display for GeoJsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GeoJsonError::NotAFeatureCollection => {
                write!(f, "expected GeoJSON FeatureCollection")
            }
            GeoJsonError::InvalidFeature { index, reason } => {
                write!(f, "invalid feature at index {index}: {reason}")
            }
            GeoJsonError::Properties(err) => write!(f, "feature properties: {err}"),
        }
    }
}

impl std::error::Error for GeoJsonError {}

/// Reads country features from a GeoJSON FeatureCollection. Each feature must
/// carry an `id` (string or number); a `null` geometry becomes an empty one.
pub fn parse_feature_collection(value: &Value) -> Result<Vec<TopologyFeature>, GeoJsonError> {
    let obj = value
        .as_object()
        .ok_or(GeoJsonError::NotAFeatureCollection)?;
    if obj.get("type").and_then(|v| v.as_str()) != Some("FeatureCollection") {
        return Err(GeoJsonError::NotAFeatureCollection);
    }
    let features_val = obj
        .get("features")
        .and_then(|v| v.as_array())
        .ok_or(GeoJsonError::NotAFeatureCollection)?;

    let mut features = Vec::with_capacity(features_val.len());
    for (index, feat_val) in features_val.iter().enumerate() {
        let invalid = |reason: String| GeoJsonError::InvalidFeature { index, reason };
        let feat_obj = feat_val
            .as_object()
            .ok_or_else(|| invalid("feature must be an object".to_string()))?;
        if feat_obj.get("type").and_then(|v| v.as_str()) != Some("Feature") {
            return Err(invalid("feature type must be \"Feature\"".to_string()));
        }

        let id = match feat_obj.get("id") {
            Some(Value::String(s)) => s.parse::<NumericId>().map_err(|e| invalid(e.to_string()))?,
            Some(Value::Number(n)) => n
                .as_i64()
                .ok_or_else(|| invalid(format!("non-integer id {n}")))
                .and_then(|n| NumericId::try_from(n).map_err(|e| invalid(e.to_string())))?,
            _ => return Err(invalid("feature missing id".to_string())),
        };

        let geometry = match feat_obj.get("geometry") {
            None | Some(Value::Null) => AreaGeometry::default(),
            Some(geom) => parse_geometry(geom).map_err(invalid)?,
        };
        features.push(TopologyFeature { id, geometry });
    }
    Ok(features)
}

/// Exports entities as a FeatureCollection: `id` is the rendered numeric id,
/// `properties` the joined attributes (empty for unattributed geometries).
pub fn entities_to_feature_collection(set: &EntitySet) -> Result<Value, GeoJsonError> {
    let mut features: Vec<Value> = Vec::with_capacity(set.len());
    for (_, entity) in set.iter() {
        let mut fobj = Map::new();
        fobj.insert("type".to_string(), Value::String("Feature".to_string()));
        fobj.insert("id".to_string(), Value::String(entity.numeric_id.to_string()));
        let properties = match &entity.attributes {
            Some(attrs) => serde_json::to_value(attrs).map_err(GeoJsonError::Properties)?,
            None => Value::Object(Map::new()),
        };
        fobj.insert("properties".to_string(), properties);
        fobj.insert(
            "geometry".to_string(),
            geometry_to_geojson_value(&entity.geometry),
        );
        features.push(Value::Object(fobj));
    }

    let mut root = Map::new();
    root.insert(
        "type".to_string(),
        Value::String("FeatureCollection".to_string()),
    );
    root.insert("features".to_string(), Value::Array(features));
    Ok(Value::Object(root))
}

pub fn geometry_to_geojson_value(geom: &AreaGeometry) -> Value {
    let mut obj = Map::new();
    match geom {
        AreaGeometry::Polygon(rings) => {
            obj.insert("type".to_string(), Value::String("Polygon".to_string()));
            obj.insert("coordinates".to_string(), rings_value(rings));
        }
        AreaGeometry::MultiPolygon(polys) => {
            obj.insert(
                "type".to_string(),
                Value::String("MultiPolygon".to_string()),
            );
            let coords = polys.iter().map(|poly| rings_value(poly)).collect();
            obj.insert("coordinates".to_string(), Value::Array(coords));
        }
    }
    Value::Object(obj)
}

fn rings_value(rings: &[Ring]) -> Value {
    Value::Array(
        rings
            .iter()
            .map(|ring| Value::Array(ring.iter().map(point_coords).collect()))
            .collect(),
    )
}

fn point_coords(p: &GeoPoint) -> Value {
    Value::Array(vec![Value::from(p.lon_deg), Value::from(p.lat_deg)])
}

fn parse_geometry(value: &Value) -> Result<AreaGeometry, String> {
    let obj = value
        .as_object()
        .ok_or("geometry must be an object".to_string())?;
    let ty = obj
        .get("type")
        .and_then(|v| v.as_str())
        .ok_or("geometry missing type".to_string())?;
    let coords = obj
        .get("coordinates")
        .ok_or("geometry missing coordinates".to_string())?;

    match ty {
        "Polygon" => Ok(AreaGeometry::Polygon(parse_polygon(coords)?)),
        "MultiPolygon" => Ok(AreaGeometry::MultiPolygon(parse_multi_polygon(coords)?)),
        other => Err(format!("unsupported geometry type: {other}")),
    }
}

fn parse_point(coords: &Value) -> Result<GeoPoint, String> {
    let arr = coords
        .as_array()
        .ok_or("position must be an array".to_string())?;
    if arr.len() < 2 {
        return Err("position must have [lon, lat]".to_string());
    }
    let lon = arr[0].as_f64().ok_or("lon must be a number".to_string())?;
    let lat = arr[1].as_f64().ok_or("lat must be a number".to_string())?;
    Ok(GeoPoint::new(lon, lat))
}

fn parse_ring(coords: &Value) -> Result<Ring, String> {
    let arr = coords
        .as_array()
        .ok_or("ring must be an array of positions".to_string())?;
    arr.iter().map(parse_point).collect()
}

fn parse_polygon(coords: &Value) -> Result<Vec<Ring>, String> {
    let rings = coords
        .as_array()
        .ok_or("Polygon coordinates must be an array of rings".to_string())?;
    rings.iter().map(parse_ring).collect()
}

fn parse_multi_polygon(coords: &Value) -> Result<Vec<Vec<Ring>>, String> {
    let polys = coords
        .as_array()
        .ok_or("MultiPolygon coordinates must be an array of polygons".to_string())?;
    polys.iter().map(parse_polygon).collect()
}
