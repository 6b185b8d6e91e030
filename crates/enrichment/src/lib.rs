//! Turns raw country geometry and country records into the enriched map:
//! ingest, geometry patches, attribute corrections, join, territory
//! decomposition, markers and a final integrity check.

pub mod capitals;
pub mod decompose;
pub mod error;
pub mod ingest;
pub mod join;
pub mod records;
pub mod validate;

#[cfg(test)]
mod fixture;

pub use capitals::*;
pub use decompose::*;
pub use error::*;
pub use ingest::*;
pub use join::*;
pub use records::*;
pub use validate::*;

use corrections::CorrectionTable;
use formats::{CountryRecord, DEFAULT_VIEW, RegionFilters, StaticAssets, TopologyFeature};
use foundation::math::Projection;
use layers::{LabelPlacementConfig, LabelPlacer, apply_capital_offsets};
use scene::{EntitySet, Marker};
use tracing::{debug, info, warn};

/// Both remote sources, fetched and parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct SourcesReady {
    pub topology: Vec<TopologyFeature>,
    pub attributes: Vec<CountryRecord>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedMap {
    pub entities: EntitySet,
    pub capital_markers: Vec<Marker>,
    pub country_markers: Vec<Marker>,
    /// Alpha-3 codes shown by the default view.
    pub filter_regions: Vec<String>,
    pub decomposition: DecompositionReport,
}

pub fn enrich(
    sources: SourcesReady,
    assets: &StaticAssets,
    table: &CorrectionTable,
    config: &LabelPlacementConfig,
) -> Result<EnrichedMap, PipelineError> {
    enrich_with_placer(sources, assets, table, &LabelPlacer::new(config))
}

pub fn enrich_with_placer<P: Projection>(
    sources: SourcesReady,
    assets: &StaticAssets,
    table: &CorrectionTable,
    placer: &LabelPlacer<P>,
) -> Result<EnrichedMap, PipelineError> {
    let raw_features = sources.topology.len();
    let mut features = ingest(sources.topology);
    debug!(
        raw = raw_features,
        kept = features.len(),
        "filtered topology features"
    );
    apply_geometry_patches(&mut features, &table.geometry)?;

    let records = correct_records(sources.attributes, &table.attributes)?;
    let mut entities = join(features, &records)?;
    let decomposition = decompose(&mut entities, &records, &table.territories)?;

    let index = entities.key_index()?;
    let mut capital_markers = capital_markers(
        &entities,
        &index,
        &table.extra_capitals,
        &assets.capitals,
    )?;
    let country_markers = placer.place(&mut entities, &index, &table.country_labels)?;
    for (_, entity) in entities.iter() {
        if let Some(alpha3) = entity.alpha3()
            && entity.label_coordinates.is_none()
        {
            debug!(alpha3, "no label anchor for empty geometry");
        }
    }
    apply_capital_offsets(&mut capital_markers, &table.capital_offsets)?;

    validate(&entities, &country_markers, &capital_markers)?;
    let filter_regions = filter_regions(&assets.regions, &entities);

    info!(
        entities = entities.len(),
        country_markers = country_markers.len(),
        capital_markers = capital_markers.len(),
        territories = decomposition.parents.iter().map(|l| l.children.len()).sum::<usize>()
            + decomposition.clones.len(),
        "map enriched"
    );
    Ok(EnrichedMap {
        entities,
        capital_markers,
        country_markers,
        filter_regions,
        decomposition,
    })
}

/// Codes of the default view, or every attributed entity when the asset has
/// no default view.
pub fn filter_regions(regions: &RegionFilters, entities: &EntitySet) -> Vec<String> {
    if let Some(view) = regions.view(DEFAULT_VIEW) {
        return view.to_vec();
    }
    warn!(view = DEFAULT_VIEW, "region asset has no default view; showing every entity");
    entities
        .iter()
        .filter_map(|(_, e)| e.alpha3().map(str::to_string))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{EnrichedMap, SourcesReady, enrich, filter_regions};
    use crate::error::{JoinError, PipelineError};
    use crate::fixture::{self, CHILDREN, Fixture};
    use corrections::{CorrectionTable, GeometryPatch, TerritoryPatch};
    use formats::{RegionFilters, StaticAssets};
    use foundation::NumericId;
    use layers::LabelPlacementConfig;
    use pretty_assertions::assert_eq;
    use scene::{AreaGeometry, MapEntity};

    fn run(fixture: &Fixture, table: &CorrectionTable) -> Result<EnrichedMap, PipelineError> {
        enrich(
            SourcesReady {
                topology: fixture.topology.clone(),
                attributes: fixture.attributes.clone(),
            },
            &fixture.assets,
            table,
            &LabelPlacementConfig::default(),
        )
    }

    fn entity<'a>(map: &'a EnrichedMap, alpha3: &str) -> &'a MapEntity {
        let ids = map.entities.ids_with_alpha3(alpha3);
        assert_eq!(ids.len(), 1, "{alpha3} should appear once");
        map.entities.get(ids[0]).expect("entity")
    }

    fn groups(map: &EnrichedMap, alpha3: &str) -> usize {
        entity(map, alpha3).geometry.group_count()
    }

    fn original_geometry(fixture: &Fixture, id: i32) -> AreaGeometry {
        fixture
            .topology
            .iter()
            .find(|f| f.id == NumericId::new(id))
            .map(|f| f.geometry.clone())
            .expect("feature")
    }

    #[test]
    fn builtin_table_decomposes_parents_and_conserves_groups() {
        let fixture = fixture::world();
        let map = run(&fixture, &CorrectionTable::builtin()).expect("enrich");

        let counts: Vec<(&str, usize)> = [
            "FRA", "REU", "MYT", "GUF", "MTQ", "GLP", "NLD", "BES", "NOR", "SJM", "NZL", "TKL",
            "CXR", "CCK",
        ]
        .into_iter()
        .map(|code| (code, groups(&map, code)))
        .collect();
        assert_eq!(
            counts,
            vec![
                ("FRA", 5),
                ("REU", 1),
                ("MYT", 1),
                ("GUF", 1),
                ("MTQ", 1),
                ("GLP", 3),
                ("NLD", 1),
                ("BES", 3),
                ("NOR", 23),
                ("SJM", 10),
                ("NZL", 12),
                ("TKL", 2),
                ("CXR", 1),
                ("CCK", 2),
            ]
        );

        let mut france = original_geometry(&fixture, 250);
        let reunion = france.take_groups(0, 1).expect("first group");
        let mayotte = france.take_groups(0, 1).expect("second group");
        assert_eq!(entity(&map, "REU").geometry, reunion);
        assert_eq!(entity(&map, "MYT").geometry, mayotte);

        let mut norway = original_geometry(&fixture, 578);
        let svalbard = norway.take_groups(22, 10).expect("svalbard");
        assert_eq!(entity(&map, "SJM").geometry, svalbard);
        assert_eq!(entity(&map, "NOR").geometry, norway);

        for child in CHILDREN {
            let e = entity(&map, child);
            assert!(e.position.is_none(), "{child} has no ingest position");
            assert!(e.is_territory(), "{child} is a dependency");
        }
        assert_eq!(entity(&map, "GLP").region_of(), Some("FRA"));
        assert_eq!(map.decomposition.parents.len(), 5);
    }

    #[test]
    fn builtin_table_fixes_ids_and_drops_filtered_features() {
        let fixture = fixture::world();
        let map = run(&fixture, &CorrectionTable::builtin()).expect("enrich");

        // Antarctica and Ashmore Reef are dropped; each split adds one entity.
        let ingested = fixture.topology.len() - 1;
        let expected = ingested - 1 + CHILDREN.len();
        assert_eq!(map.entities.len(), expected);
        assert!(!map.entities.contains_numeric_id(NumericId::ANTARCTICA));

        let kosovo = entity(&map, "KOS");
        assert_eq!(kosovo.numeric_id, NumericId::new(999));
        assert_eq!(kosovo.alpha2(), Some("KO"));
        assert_eq!(kosovo.position, Some(fixture::KOSOVO_POSITION));

        let christmas = entity(&map, "CXR");
        assert_eq!(christmas.numeric_id, NumericId::new(162));
        assert_eq!(christmas.position, Some(fixture::CHRISTMAS_POSITION));

        let australia = entity(&map, "AUS");
        assert_ne!(australia.position, Some(fixture::ASHMORE_POSITION));
        assert_eq!(
            map.entities
                .iter()
                .filter(|(_, e)| e.numeric_id == NumericId::new(36))
                .count(),
            1
        );

        let disputed: Vec<_> = map
            .entities
            .iter()
            .filter(|(_, e)| e.numeric_id.is_disputed())
            .map(|(_, e)| (e.position, e.attributes.is_none(), e.label_coordinates))
            .collect();
        assert_eq!(disputed, vec![(Some(fixture::CYPRUS_POSITION), true, None)]);
    }

    #[test]
    fn builtin_table_corrects_names_and_keeps_old_spellings() {
        let fixture = fixture::world();
        let map = run(&fixture, &CorrectionTable::builtin()).expect("enrich");

        let congo = entity(&map, "COD").attributes.as_ref().expect("attributes");
        assert_eq!(congo.name, "DR Congo");
        assert!(congo
            .alt_spellings
            .contains(&"Congo (Democratic Republic of the)".to_string()));

        let vatican = entity(&map, "VAT").attributes.as_ref().expect("attributes");
        assert_eq!(vatican.name, "Vatican City");
        assert_eq!(vatican.capital.as_deref(), Some("Vatican City"));
    }

    #[test]
    fn builtin_table_orders_capitals_and_applies_offsets() {
        let fixture = fixture::world();
        let map = run(&fixture, &CorrectionTable::builtin()).expect("enrich");

        let leading: Vec<(&str, &str, f64)> = map.capital_markers[..7]
            .iter()
            .map(|m| (m.alpha3_code.as_str(), m.name.as_str(), m.marker_offset))
            .collect();
        assert_eq!(
            leading,
            vec![
                ("GUF", "Cayenne", 0.0),
                ("REU", "Saint-Denis", 13.0),
                ("MTQ", "Fort-de-France", -7.0),
                ("MYT", "Mamoudzou", 13.0),
                ("GLP", "Basse-Terre", -7.0),
                ("BES", "Kralendijk", -7.0),
                ("TKL", "Fakaofo", -7.0),
            ]
        );
        let guiana = map
            .capital_markers
            .iter()
            .filter(|m| m.alpha3_code == "GUF")
            .count();
        assert_eq!(guiana, 1);

        let kosovo = map
            .capital_markers
            .iter()
            .find(|m| m.alpha3_code == "KOS")
            .expect("kosovo capital via KO");
        assert_eq!(kosovo.name, "KOS City");

        // One country marker per attributed entity.
        let attributed = map.entities.iter().filter(|(_, e)| e.attributes.is_some()).count();
        assert_eq!(map.country_markers.len(), attributed);
        let canada = map
            .country_markers
            .iter()
            .find(|m| m.alpha3_code == "CAN")
            .expect("canada");
        assert_eq!(canada.coordinates, [-100.0, 55.0]);
    }

    #[test]
    fn default_view_becomes_filter_regions() {
        let fixture = fixture::world();
        let map = run(&fixture, &CorrectionTable::builtin()).expect("enrich");
        assert_eq!(map.filter_regions.len(), fixture.attributes.len());
        assert!(map.filter_regions.contains(&"TKL".to_string()));
    }

    #[test]
    fn missing_default_view_falls_back_to_attributed_entities() {
        let fixture = fixture::world();
        let map = run(&fixture, &CorrectionTable::builtin()).expect("enrich");
        let fallback = filter_regions(&RegionFilters::default(), &map.entities);
        let attributed = map.entities.iter().filter(|(_, e)| e.attributes.is_some()).count();
        assert_eq!(fallback.len(), attributed);
        assert_eq!(fallback[0], map.entities.entities()[0].alpha3().unwrap_or_default());
    }

    #[test]
    fn empty_table_trips_on_ashmore_sharing_australias_code() {
        let fixture = fixture::world();
        let err = run(&fixture, &CorrectionTable::empty()).expect_err("duplicate 036");
        match err {
            PipelineError::IdentityConflict { key, value } => {
                assert_eq!((key, value.as_str()), ("numericId", "036"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn stale_geometry_patch_has_no_target() {
        let fixture = fixture::world();
        let mut table = CorrectionTable::builtin();
        table.geometry.push(GeometryPatch::Exclude {
            position: 12,
            expect: NumericId::new(36),
        });
        let err = run(&fixture, &table).expect_err("stale patch");
        assert!(matches!(err, PipelineError::CorrectionTargetNotFound { .. }));
        assert!(err.is_integrity_failure());
    }

    #[test]
    fn out_of_range_split_is_rejected() {
        let fixture = fixture::world();
        let mut table = CorrectionTable::builtin();
        table.territories.push(TerritoryPatch::Split {
            parent: "NLD".to_string(),
            child: "ABW".to_string(),
            start: 0,
            count: 4,
        });
        let err = run(&fixture, &table).expect_err("range");
        assert!(matches!(err, PipelineError::DecompositionRange { .. }));
    }

    #[test]
    fn unmatched_feature_id_fails_the_join() {
        let mut fixture = fixture::world();
        fixture.topology[0].id = NumericId::new(4242);
        let err = run(&fixture, &CorrectionTable::builtin()).expect_err("unmatched");
        assert!(matches!(
            err,
            PipelineError::Join(JoinError::Unmatched { position: 0, .. })
        ));
    }

    #[test]
    fn empty_assets_keep_only_extra_capitals() {
        let fixture = fixture::world();
        let mut table = CorrectionTable::builtin();
        table.capital_offsets.clear();
        let map = enrich(
            SourcesReady {
                topology: fixture.topology.clone(),
                attributes: fixture.attributes.clone(),
            },
            &StaticAssets::default(),
            &table,
            &LabelPlacementConfig::default(),
        )
        .expect("enrich");
        assert_eq!(map.capital_markers, table.extra_capitals);
        let attributed = map.entities.iter().filter(|(_, e)| e.attributes.is_some()).count();
        assert_eq!(map.filter_regions.len(), attributed);
    }
}
