use corrections::{AttributePatch, AttributeValue};
use formats::CountryRecord;
use tracing::debug;

use crate::error::PipelineError;

/// Attribute records after the correction table has been applied once.
///
/// Only [`correct_records`] produces this type, so the join and the
/// decomposer can never see raw or twice-corrected records.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrectedRecords {
    records: Vec<CountryRecord>,
}

impl CorrectedRecords {
    pub fn records(&self) -> &[CountryRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The single record carrying `alpha3`.
    pub fn by_alpha3(&self, alpha3: &str) -> Option<&CountryRecord> {
        let mut matches = self.records.iter().filter(|r| r.alpha3_code == alpha3);
        let first = matches.next()?;
        matches.next().is_none().then_some(first)
    }
}

pub fn correct_records(
    mut records: Vec<CountryRecord>,
    patches: &[AttributePatch],
) -> Result<CorrectedRecords, PipelineError> {
    apply_attribute_patches(&mut records, patches)?;
    Ok(CorrectedRecords { records })
}

fn target_index(
    records: &[CountryRecord],
    patch: &'static str,
    alpha3: &str,
) -> Result<usize, PipelineError> {
    let mut hits = records
        .iter()
        .enumerate()
        .filter(|(_, r)| r.alpha3_code == alpha3)
        .map(|(i, _)| i);
    match (hits.next(), hits.next()) {
        (Some(i), None) => Ok(i),
        _ => Err(PipelineError::CorrectionTargetNotFound {
            patch,
            key: alpha3.to_string(),
        }),
    }
}

/// Applies attribute patches in order. Not idempotent: seeding and
/// name preservation append every time they run.
pub fn apply_attribute_patches(
    records: &mut [CountryRecord],
    patches: &[AttributePatch],
) -> Result<(), PipelineError> {
    for patch in patches {
        match patch {
            AttributePatch::SeedAltSpelling { alpha3, spelling } => {
                let i = target_index(records, patch.name(), alpha3)?;
                records[i]
                    .alt_spellings
                    .get_or_insert_with(Vec::new)
                    .push(spelling.clone());
            }
            AttributePatch::PreserveName { alpha3 } => {
                let i = target_index(records, patch.name(), alpha3)?;
                let name = records[i].name.clone();
                records[i]
                    .alt_spellings
                    .get_or_insert_with(Vec::new)
                    .push(name);
            }
            AttributePatch::Set { alpha3, value } => {
                let i = target_index(records, patch.name(), alpha3)?;
                let record = &mut records[i];
                match value {
                    AttributeValue::Name(name) => record.name = name.clone(),
                    AttributeValue::Area(area) => record.area = Some(*area),
                    AttributeValue::Capital(capital) => record.capital = Some(capital.clone()),
                    AttributeValue::NumericCode(code) => record.numeric_code = Some(*code),
                    AttributeValue::Alpha2Code(code) => record.alpha2_code = code.clone(),
                }
            }
            AttributePatch::RegionOf {
                sovereign,
                dependents,
            } => {
                target_index(records, patch.name(), sovereign)?;
                for dependent in dependents {
                    let i = target_index(records, patch.name(), dependent)?;
                    records[i].region_of = Some(sovereign.clone());
                }
            }
        }
        debug!(patch = patch.name(), "applied attribute patch");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{apply_attribute_patches, correct_records};
    use crate::error::PipelineError;
    use corrections::{AttributePatch, AttributeValue};
    use formats::CountryRecord;
    use foundation::NumericId;
    use pretty_assertions::assert_eq;

    fn records() -> Vec<CountryRecord> {
        vec![
            CountryRecord::new(
                "Congo (Democratic Republic of the)",
                "COD",
                "CD",
                Some(NumericId::new(180)),
            ),
            CountryRecord::new("Republic of Kosovo", "KOS", "XK", None),
            CountryRecord::new("France", "FRA", "FR", Some(NumericId::new(250))),
            CountryRecord::new("Réunion", "REU", "RE", Some(NumericId::new(638))),
        ]
    }

    fn seed_cod() -> AttributePatch {
        AttributePatch::SeedAltSpelling {
            alpha3: "COD".to_string(),
            spelling: "Democratic Republic of the Congo".to_string(),
        }
    }

    #[test]
    fn preserves_name_before_rename() {
        let corrected = correct_records(
            records(),
            &[
                seed_cod(),
                AttributePatch::PreserveName {
                    alpha3: "COD".to_string(),
                },
                AttributePatch::Set {
                    alpha3: "COD".to_string(),
                    value: AttributeValue::Name("DR Congo".to_string()),
                },
            ],
        )
        .expect("correct");
        let cod = corrected.by_alpha3("COD").expect("COD");
        assert_eq!(cod.name, "DR Congo");
        assert_eq!(
            cod.alt_spellings,
            Some(vec![
                "Democratic Republic of the Congo".to_string(),
                "Congo (Democratic Republic of the)".to_string(),
            ])
        );
    }

    #[test]
    fn overrides_fill_missing_identity() {
        let corrected = correct_records(
            records(),
            &[
                AttributePatch::Set {
                    alpha3: "KOS".to_string(),
                    value: AttributeValue::NumericCode(NumericId::new(999)),
                },
                AttributePatch::Set {
                    alpha3: "KOS".to_string(),
                    value: AttributeValue::Alpha2Code("KO".to_string()),
                },
                AttributePatch::RegionOf {
                    sovereign: "FRA".to_string(),
                    dependents: vec!["REU".to_string()],
                },
            ],
        )
        .expect("correct");
        let kos = corrected.by_alpha3("KOS").expect("KOS");
        assert_eq!(kos.numeric_code, Some(NumericId::new(999)));
        assert_eq!(kos.alpha2_code, "KO");
        assert_eq!(
            corrected.by_alpha3("REU").and_then(|r| r.region_of.as_deref()),
            Some("FRA")
        );
    }

    #[test]
    fn seeding_twice_double_appends() {
        let mut raw = records();
        apply_attribute_patches(&mut raw, &[seed_cod()]).expect("first pass");
        apply_attribute_patches(&mut raw, &[seed_cod()]).expect("second pass");
        assert_eq!(raw[0].alt_spellings.as_ref().map(Vec::len), Some(2));
    }

    #[test]
    fn missing_or_duplicated_targets_fail() {
        let err = correct_records(
            records(),
            &[AttributePatch::PreserveName {
                alpha3: "ATL".to_string(),
            }],
        )
        .expect_err("missing");
        assert!(matches!(
            err,
            PipelineError::CorrectionTargetNotFound { patch: "preserve_name", ref key } if key == "ATL"
        ));

        let mut dup = records();
        dup.push(CountryRecord::new("France again", "FRA", "FX", None));
        let err = correct_records(
            dup,
            &[AttributePatch::RegionOf {
                sovereign: "FRA".to_string(),
                dependents: vec!["REU".to_string()],
            }],
        )
        .expect_err("ambiguous sovereign");
        assert!(matches!(
            err,
            PipelineError::CorrectionTargetNotFound { patch: "region_of", .. }
        ));
    }

    #[test]
    fn builtin_table_preserves_every_name_it_renames() {
        let world = crate::fixture::world();
        let table = corrections::CorrectionTable::builtin();
        let corrected = correct_records(world.attributes.clone(), &table.attributes).expect("records");

        let preserved: Vec<&str> = table
            .attributes
            .iter()
            .filter_map(|p| match p {
                AttributePatch::PreserveName { alpha3 } => Some(alpha3.as_str()),
                _ => None,
            })
            .collect();
        assert!(preserved.contains(&"COD"));
        for alpha3 in &preserved {
            let original = world
                .attributes
                .iter()
                .find(|r| r.alpha3_code == *alpha3)
                .map(|r| r.name.clone())
                .expect("raw record");
            let record = corrected.by_alpha3(alpha3).expect("corrected record");
            let spellings = record.alt_spellings.as_deref().unwrap_or_default();
            assert!(
                spellings.contains(&original),
                "{alpha3} lost its original name {original:?}: {spellings:?}"
            );
        }

        for patch in &table.attributes {
            if let AttributePatch::Set {
                alpha3,
                value: AttributeValue::Name(_),
            } = patch
            {
                assert!(preserved.contains(&alpha3.as_str()), "{alpha3} renamed without preserving");
            }
        }
    }
}
