use foundation::NumericId;
use serde::Serialize;

use crate::geometry::AreaGeometry;

/// Index of a [`MapEntity`] inside its [`crate::EntitySet`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u32);

impl EntityId {
    pub fn index(&self) -> u32 {
        self.0
    }
}

/// Country metadata joined onto a topology feature.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityAttributes {
    pub name: String,
    pub capital: Option<String>,
    pub alpha3_code: String,
    pub alpha2_code: String,
    pub area: Option<f64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub alt_spellings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region_of: Option<String>,
}

/// A renderable, quizzable geographic unit: a sovereign country or a
/// territory decomposed out of one.
#[derive(Debug, Clone, PartialEq)]
pub struct MapEntity {
    pub numeric_id: NumericId,
    /// Index in the ingested topology; `None` for decomposed territories.
    pub position: Option<usize>,
    /// `None` only for disputed-territory geometries that join nothing.
    pub attributes: Option<EntityAttributes>,
    pub geometry: AreaGeometry,
    pub label_coordinates: Option<[f64; 2]>,
    pub marker_offset: f64,
}

impl MapEntity {
    pub fn new(numeric_id: NumericId, position: Option<usize>, geometry: AreaGeometry) -> Self {
        Self {
            numeric_id,
            position,
            attributes: None,
            geometry,
            label_coordinates: None,
            marker_offset: 0.0,
        }
    }

    pub fn with_attributes(mut self, attributes: EntityAttributes) -> Self {
        self.attributes = Some(attributes);
        self
    }

    pub fn alpha3(&self) -> Option<&str> {
        self.attributes.as_ref().map(|a| a.alpha3_code.as_str())
    }

    pub fn alpha2(&self) -> Option<&str> {
        self.attributes.as_ref().map(|a| a.alpha2_code.as_str())
    }

    pub fn name(&self) -> Option<&str> {
        self.attributes.as_ref().map(|a| a.name.as_str())
    }

    pub fn region_of(&self) -> Option<&str> {
        self.attributes.as_ref().and_then(|a| a.region_of.as_deref())
    }

    /// Non-sovereign territory administered by another entity.
    pub fn is_territory(&self) -> bool {
        self.region_of().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn attributes() -> EntityAttributes {
        EntityAttributes {
            name: "Réunion".to_string(),
            capital: Some("Saint-Denis".to_string()),
            alpha3_code: "REU".to_string(),
            alpha2_code: "RE".to_string(),
            area: None,
            alt_spellings: Vec::new(),
            region_of: None,
        }
    }

    #[test]
    fn attributes_serialize_camel_case_and_omit_empty_extras() {
        let value = serde_json::to_value(attributes()).expect("json");
        assert_eq!(
            value,
            json!({
                "name": "Réunion",
                "capital": "Saint-Denis",
                "alpha3Code": "REU",
                "alpha2Code": "RE",
                "area": null,
            })
        );
    }

    #[test]
    fn territories_carry_region_of_and_spellings() {
        let mut attrs = attributes();
        attrs.alt_spellings = vec!["La Réunion".to_string()];
        attrs.region_of = Some("FRA".to_string());
        let value = serde_json::to_value(&attrs).expect("json");
        assert_eq!(value["altSpellings"], json!(["La Réunion"]));
        assert_eq!(value["regionOf"], "FRA");

        let entity = MapEntity::new(NumericId::new(638), None, AreaGeometry::default())
            .with_attributes(attrs);
        assert!(entity.is_territory());
        assert_eq!(entity.region_of(), Some("FRA"));
        let disputed = MapEntity::new(NumericId::DISPUTED, Some(3), AreaGeometry::default());
        assert_eq!(disputed.alpha3(), None);
    }
}
