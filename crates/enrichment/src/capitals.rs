use std::collections::BTreeSet;

use corrections::CAPITAL_MARKER_OFFSET;
use formats::CapitalIndex;
use scene::{EntitySet, KeyIndex, Marker};

use crate::error::PipelineError;

/// Capital markers: the literal extra capitals first, then one marker per
/// attributed entity found in the capital asset by alpha-2 code.
///
/// An entity with an extra capital gets no second marker. Entities missing
/// from the asset are skipped.
pub fn capital_markers(
    set: &EntitySet,
    index: &KeyIndex,
    extras: &[Marker],
    capitals: &CapitalIndex,
) -> Result<Vec<Marker>, PipelineError> {
    let mut covered = BTreeSet::new();
    let mut markers = Vec::with_capacity(extras.len() + set.len());
    for extra in extras {
        if index.by_alpha3(&extra.alpha3_code).is_none() {
            return Err(PipelineError::CorrectionTargetNotFound {
                patch: "extra_capital",
                key: extra.alpha3_code.clone(),
            });
        }
        if !covered.insert(extra.alpha3_code.as_str()) {
            return Err(PipelineError::IdentityConflict {
                key: "capitalMarker",
                value: extra.alpha3_code.clone(),
            });
        }
        markers.push(extra.clone());
    }

    for (_, entity) in set.iter() {
        let Some(attrs) = &entity.attributes else {
            continue;
        };
        if covered.contains(attrs.alpha3_code.as_str()) {
            continue;
        }
        let Some(location) = capitals.get(&attrs.alpha2_code) else {
            continue;
        };
        markers.push(Marker {
            name: attrs.capital.clone().unwrap_or_default(),
            alpha3_code: attrs.alpha3_code.clone(),
            coordinates: location.coordinates,
            marker_offset: CAPITAL_MARKER_OFFSET,
        });
    }
    Ok(markers)
}

#[cfg(test)]
mod tests {
    use super::capital_markers;
    use crate::error::PipelineError;
    use formats::{CapitalIndex, CapitalRecord};
    use foundation::NumericId;
    use pretty_assertions::assert_eq;
    use scene::{AreaGeometry, EntityAttributes, EntitySet, MapEntity, Marker};

    fn entity(numeric: i32, alpha3: &str, alpha2: &str, capital: Option<&str>) -> MapEntity {
        MapEntity::new(NumericId::new(numeric), None, AreaGeometry::default()).with_attributes(
            EntityAttributes {
                name: alpha3.to_string(),
                capital: capital.map(str::to_string),
                alpha3_code: alpha3.to_string(),
                alpha2_code: alpha2.to_string(),
                area: None,
                alt_spellings: Vec::new(),
                region_of: None,
            },
        )
    }

    fn capital(code: &str, lon: f64, lat: f64) -> CapitalRecord {
        CapitalRecord {
            country_name: None,
            capital_name: None,
            country_code: code.to_string(),
            capital_longitude: lon,
            capital_latitude: lat,
        }
    }

    fn marker(name: &str, alpha3: &str, coordinates: [f64; 2], marker_offset: f64) -> Marker {
        Marker {
            name: name.to_string(),
            alpha3_code: alpha3.to_string(),
            coordinates,
            marker_offset,
        }
    }

    #[test]
    fn extras_come_first_and_suppress_asset_lookups() {
        let mut set = EntitySet::new();
        set.spawn(entity(250, "FRA", "FR", Some("Paris")));
        set.spawn(entity(254, "GUF", "GF", Some("Cayenne")));
        set.spawn(entity(74, "BVT", "BV", None));
        set.spawn(entity(4, "AFG", "AF", Some("Kabul")));
        set.spawn(MapEntity::new(NumericId::DISPUTED, Some(9), AreaGeometry::default()));
        let index = set.key_index().expect("index");
        let capitals = CapitalIndex::from_records(vec![
            capital("FR", 2.25, 48.75),
            capital("GF", -52.0, 5.0),
            capital("BV", 3.5, -54.5),
        ]);
        let extras = vec![marker("Cayenne", "GUF", [-52.3135, 4.9224], -7.0)];

        let markers = capital_markers(&set, &index, &extras, &capitals).expect("markers");
        assert_eq!(
            markers,
            vec![
                marker("Cayenne", "GUF", [-52.3135, 4.9224], -7.0),
                marker("Paris", "FRA", [2.25, 48.75], -7.0),
                marker("", "BVT", [3.5, -54.5], -7.0),
            ]
        );
    }

    #[test]
    fn extra_capital_for_unknown_entity_fails() {
        let mut set = EntitySet::new();
        set.spawn(entity(250, "FRA", "FR", Some("Paris")));
        let index = set.key_index().expect("index");
        let extras = vec![marker("Fakaofo", "TKL", [-171.2188, -9.3803], -7.0)];
        let err = capital_markers(&set, &index, &extras, &CapitalIndex::default())
            .expect_err("unknown");
        assert!(matches!(
            err,
            PipelineError::CorrectionTargetNotFound { patch: "extra_capital", ref key } if key == "TKL"
        ));
    }
}
