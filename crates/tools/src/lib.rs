//! Offline counterpart of the quiz server: enriches an asset directory and
//! writes the results as JSON documents.

use std::fs;
use std::path::{Path, PathBuf};

use corrections::{CorrectionSummary, CorrectionTable};
use enrichment::{EnrichedMap, SourcesReady, enrich};
use formats::{AssetBundle, entities_to_feature_collection};
use layers::LabelPlacementConfig;
use serde::Serialize;
use tracing::info;

pub const FEATURES_FILE_NAME: &str = "features.geojson";
pub const COUNTRY_MARKERS_FILE_NAME: &str = "country_markers.json";
pub const CAPITAL_MARKERS_FILE_NAME: &str = "capital_markers.json";
pub const FILTER_REGIONS_FILE_NAME: &str = "regions.json";
pub const OUTPUT_MANIFEST_FILE_NAME: &str = "enrich.manifest.json";

#[derive(Debug, Clone, Default)]
pub struct EnrichOptions {
    pub labels: LabelPlacementConfig,
    pub pretty: bool,
    /// Correction table file; the built-in table when absent.
    pub corrections: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputFile {
    pub path: String,
    pub content_hash: String,
    pub bytes: usize,
}

/// Written next to the outputs; ties them to their inputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichManifest {
    pub input_hash: String,
    pub corrections: CorrectionSummary,
    pub entities: usize,
    pub outputs: Vec<OutputFile>,
}

pub fn load_corrections(path: Option<&Path>) -> Result<CorrectionTable, String> {
    match path {
        None => Ok(CorrectionTable::builtin()),
        Some(path) => {
            let payload = fs::read_to_string(path).map_err(|e| format!("read {path:?}: {e}"))?;
            CorrectionTable::from_json_str(&payload).map_err(|e| format!("{path:?}: {e}"))
        }
    }
}

pub fn corrections_summary(path: Option<&Path>) -> Result<CorrectionSummary, String> {
    load_corrections(path)?
        .summary()
        .map_err(|e| format!("corrections: {e}"))
}

/// Runs the pipeline over `assets_dir` and writes every output into
/// `output_dir`. Nothing is written when enrichment fails.
pub fn enrich_bundle(
    assets_dir: &Path,
    output_dir: &Path,
    options: &EnrichOptions,
) -> Result<EnrichManifest, String> {
    let table = load_corrections(options.corrections.as_deref())?;
    let corrections = table.summary().map_err(|e| format!("corrections: {e}"))?;
    let bundle = AssetBundle::load(assets_dir).map_err(|e| format!("assets: {e}"))?;
    let input_hash = bundle.content_hash().to_string();
    let (topology, attributes, assets) = bundle.into_parts();

    let map = enrich(
        SourcesReady {
            topology,
            attributes,
        },
        &assets,
        &table,
        &options.labels,
    )
    .map_err(|e| format!("enrich: {e}"))?;

    let documents = render_documents(&map, options.pretty)?;
    fs::create_dir_all(output_dir).map_err(|e| format!("create {output_dir:?}: {e}"))?;
    let mut outputs = Vec::with_capacity(documents.len());
    for (name, payload) in documents {
        let path = output_dir.join(name);
        fs::write(&path, &payload).map_err(|e| format!("write {path:?}: {e}"))?;
        outputs.push(OutputFile {
            path: name.to_string(),
            content_hash: blake3::hash(payload.as_bytes()).to_hex().to_string(),
            bytes: payload.len(),
        });
    }

    let manifest = EnrichManifest {
        input_hash,
        corrections,
        entities: map.entities.len(),
        outputs,
    };
    let manifest_path = output_dir.join(OUTPUT_MANIFEST_FILE_NAME);
    let payload = serde_json::to_string_pretty(&manifest).map_err(|e| format!("json: {e}"))?;
    fs::write(&manifest_path, payload).map_err(|e| format!("write {manifest_path:?}: {e}"))?;
    info!(
        entities = manifest.entities,
        output = %output_dir.display(),
        "wrote enriched map"
    );
    Ok(manifest)
}

fn render_documents(map: &EnrichedMap, pretty: bool) -> Result<Vec<(&'static str, String)>, String> {
    let features =
        entities_to_feature_collection(&map.entities).map_err(|e| format!("features: {e}"))?;
    Ok(vec![
        (FEATURES_FILE_NAME, to_json(&features, pretty)?),
        (COUNTRY_MARKERS_FILE_NAME, to_json(&map.country_markers, pretty)?),
        (CAPITAL_MARKERS_FILE_NAME, to_json(&map.capital_markers, pretty)?),
        (FILTER_REGIONS_FILE_NAME, to_json(&map.filter_regions, pretty)?),
    ])
}

fn to_json<T: Serialize + ?Sized>(value: &T, pretty: bool) -> Result<String, String> {
    let out = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    out.map_err(|e| format!("json: {e}"))
}
