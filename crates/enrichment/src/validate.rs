use std::collections::BTreeSet;

use scene::{EntitySet, KeyIndex, Marker};

use crate::error::PipelineError;

/// Final integrity pass over the enriched set.
///
/// Keys are unique among attributed entities, every `regionOf` names a
/// present sovereign that is not itself a dependency, and every marker
/// references exactly one entity with at most one marker per list.
pub fn validate(
    set: &EntitySet,
    country_markers: &[Marker],
    capital_markers: &[Marker],
) -> Result<KeyIndex, PipelineError> {
    let index = set.key_index()?;

    for (_, entity) in set.iter() {
        let (Some(alpha3), Some(sovereign)) = (entity.alpha3(), entity.region_of()) else {
            continue;
        };
        let nested = index
            .by_alpha3(sovereign)
            .and_then(|id| set.get(id))
            .map(|s| s.is_territory());
        if nested != Some(false) {
            return Err(PipelineError::IdentityConflict {
                key: "regionOf",
                value: format!("{alpha3} -> {sovereign}"),
            });
        }
    }

    check_markers(&index, country_markers, "countryMarker")?;
    check_markers(&index, capital_markers, "capitalMarker")?;
    Ok(index)
}

fn check_markers(
    index: &KeyIndex,
    markers: &[Marker],
    key: &'static str,
) -> Result<(), PipelineError> {
    let mut seen = BTreeSet::new();
    for marker in markers {
        let alpha3 = marker.alpha3_code.as_str();
        if index.by_alpha3(alpha3).is_none() || !seen.insert(alpha3) {
            return Err(PipelineError::IdentityConflict {
                key,
                value: alpha3.to_string(),
            });
        }
    }
    Ok(())
}
