use std::fmt;
use std::sync::Arc;

use corrections::{CorrectionSummary, CorrectionTable, CorrectionsError};
use enrichment::{enrich, EnrichedMap, PipelineError};
use formats::{entities_to_feature_collection, BundleError, GeoJsonError, RegionFilters, StaticAssets};
use layers::LabelPlacementConfig;
use scene::KeyIndex;
use serde_json::Value;
use tracing::{error, info, warn};

use crate::sources::{fetch_sources, DataSource};

/// Errors that stop the server before it binds.
#[derive(Debug)]
pub enum StartupError {
    /// The correction table disagrees with the fetched data.
    Integrity(PipelineError),
    Export(GeoJsonError),
    Corrections(CorrectionsError),
    Assets(BundleError),
    Io(std::io::Error),
}

impl fmt::Display for StartupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StartupError::Integrity(err) => write!(f, "map integrity failure: {err}"),
            StartupError::Export(err) => write!(f, "feature export failed: {err}"),
            StartupError::Corrections(err) => write!(f, "{err}"),
            StartupError::Assets(err) => write!(f, "asset load failed: {err}"),
            StartupError::Io(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for StartupError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StartupError::Integrity(err) => Some(err),
            StartupError::Export(err) => Some(err),
            StartupError::Corrections(err) => Some(err),
            StartupError::Assets(err) => Some(err),
            StartupError::Io(err) => Some(err),
        }
    }
}

/// The enriched map plus everything the routes serve from it, computed once.
#[derive(Debug)]
pub struct PublishedMap {
    pub map: EnrichedMap,
    pub index: KeyIndex,
    pub regions: RegionFilters,
    pub features: Value,
    pub corrections: CorrectionSummary,
}

impl PublishedMap {
    pub fn new(
        map: EnrichedMap,
        regions: RegionFilters,
        corrections: CorrectionSummary,
    ) -> Result<Self, StartupError> {
        let index = map
            .entities
            .key_index()
            .map_err(|err| StartupError::Integrity(err.into()))?;
        let features = entities_to_feature_collection(&map.entities).map_err(StartupError::Export)?;
        Ok(Self {
            map,
            index,
            regions,
            features,
            corrections,
        })
    }

    /// Codes visible in `view`, or the default filter when no view is named.
    pub fn visible(&self, view: Option<&str>) -> Option<&[String]> {
        match view {
            Some(name) => self.regions.view(name),
            None => Some(&self.map.filter_regions),
        }
    }
}

#[derive(Clone, Debug)]
pub enum MapState {
    Ready(Arc<PublishedMap>),
    Unavailable { reason: Arc<str> },
}

#[derive(Clone, Debug)]
pub struct AppState {
    pub map: MapState,
}

impl AppState {
    pub fn ready(map: PublishedMap) -> Self {
        Self {
            map: MapState::Ready(Arc::new(map)),
        }
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            map: MapState::Unavailable {
                reason: Arc::from(reason.into()),
            },
        }
    }
}

/// Fetches both sources and runs the pipeline once.
///
/// Unreachable or unreadable sources leave the server up in the unavailable
/// state; integrity failures are returned so the caller can exit.
pub async fn load_map(
    topology: &dyn DataSource,
    attributes: &dyn DataSource,
    assets: &StaticAssets,
    table: &CorrectionTable,
    labels: &LabelPlacementConfig,
) -> Result<AppState, StartupError> {
    let corrections = table.summary().map_err(StartupError::Corrections)?;
    let sources = match fetch_sources(topology, attributes).await {
        Ok(sources) => sources,
        Err(err) => {
            warn!("map data unavailable: {err}");
            return Ok(AppState::unavailable(err.to_string()));
        }
    };

    match enrich(sources, assets, table, labels) {
        Ok(map) => {
            info!(
                entities = map.entities.len(),
                fingerprint = %corrections.fingerprint,
                "publishing enriched map"
            );
            let published = PublishedMap::new(map, assets.regions.clone(), corrections)?;
            Ok(AppState::ready(published))
        }
        Err(err) if err.is_integrity_failure() => {
            error!("enrichment failed: {err}");
            Err(StartupError::Integrity(err))
        }
        Err(err) => {
            warn!("map data unavailable: {err}");
            Ok(AppState::unavailable(err.to_string()))
        }
    }
}

pub fn load_corrections(path: Option<&std::path::Path>) -> Result<CorrectionTable, StartupError> {
    let Some(path) = path else {
        return Ok(CorrectionTable::builtin());
    };
    let payload = std::fs::read_to_string(path).map_err(StartupError::Io)?;
    CorrectionTable::from_json_str(&payload).map_err(StartupError::Corrections)
}
