use std::collections::BTreeMap;

use formats::CountryRecord;
use foundation::NumericId;
use scene::{EntityAttributes, EntitySet, MapEntity};
use tracing::debug;

use crate::error::JoinError;
use crate::ingest::IngestedFeature;
use crate::records::CorrectedRecords;

/// Attribute block copied from a record onto an entity.
pub fn attributes_from_record(record: &CountryRecord) -> EntityAttributes {
    EntityAttributes {
        name: record.name.clone(),
        capital: record.capital.clone(),
        alpha3_code: record.alpha3_code.clone(),
        alpha2_code: record.alpha2_code.clone(),
        area: record.area,
        alt_spellings: record.alt_spellings.clone().unwrap_or_default(),
        region_of: record.region_of.clone(),
    }
}

/// Creates one entity per feature, in feature order.
///
/// The disputed sentinel may stay unmatched and becomes an entity without
/// attributes; any other unmatched id, or an id shared by several records,
/// is an error. Records without a numeric code never join.
pub fn join(
    features: Vec<IngestedFeature>,
    records: &CorrectedRecords,
) -> Result<EntitySet, JoinError> {
    let mut by_code: BTreeMap<NumericId, Vec<&CountryRecord>> = BTreeMap::new();
    for record in records.records() {
        if let Some(code) = record.numeric_code {
            by_code.entry(code).or_default().push(record);
        }
    }

    let mut set = EntitySet::new();
    for feature in features {
        let entity = MapEntity::new(feature.id, Some(feature.position), feature.geometry);
        let entity = match by_code.get(&feature.id).map(Vec::as_slice) {
            Some([record]) => entity.with_attributes(attributes_from_record(record)),
            Some(many) if many.len() > 1 => {
                return Err(JoinError::Ambiguous {
                    id: feature.id,
                    alpha3_codes: many.iter().map(|r| r.alpha3_code.clone()).collect(),
                });
            }
            _ if feature.id.is_disputed() => {
                debug!(position = feature.position, "keeping disputed geometry without attributes");
                entity
            }
            _ => {
                return Err(JoinError::Unmatched {
                    position: feature.position,
                    id: feature.id,
                });
            }
        };
        set.spawn(entity);
    }
    Ok(set)
}
