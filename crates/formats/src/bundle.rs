use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::attributes::{AttributesError, CountryRecord, parse_country_records};
use crate::capitals::{AssetError, CapitalIndex};
use crate::regions::RegionFilters;
use crate::topology::{COUNTRIES_OBJECT, TopologyError, TopologyFeature, parse_country_features};

pub const TOPOLOGY_FILE_NAME: &str = "world-50m.json";
pub const ATTRIBUTES_FILE_NAME: &str = "countries.json";
pub const CAPITALS_FILE_NAME: &str = "country_capitals.json";
pub const REGIONS_FILE_NAME: &str = "regions.json";

/// Assets that always ship with the application, independent of where the
/// topology and attribute table come from.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct StaticAssets {
    pub capitals: CapitalIndex,
    pub regions: RegionFilters,
}

/// A complete offline asset directory.
#[derive(Debug, Clone)]
pub struct AssetBundle {
    topology: Vec<TopologyFeature>,
    attributes: Vec<CountryRecord>,
    assets: StaticAssets,
    content_hash: String,
}

#[derive(Debug)]
pub enum BundleError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Topology {
        path: PathBuf,
        source: TopologyError,
    },
    Attributes {
        path: PathBuf,
        source: AttributesError,
    },
    Asset {
        path: PathBuf,
        source: AssetError,
    },
}

impl fmt::Display for BundleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BundleError::Io { path, source } => write!(f, "{}: {source}", path.display()),
            BundleError::Topology { path, source } => write!(f, "{}: {source}", path.display()),
            BundleError::Attributes { path, source } => {
                write!(f, "{}: {source}", path.display())
            }
            BundleError::Asset { path, source } => write!(f, "{}: {source}", path.display()),
        }
    }
}

impl std::error::Error for BundleError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BundleError::Io { source, .. } => Some(source),
            BundleError::Topology { source, .. } => Some(source),
            BundleError::Attributes { source, .. } => Some(source),
            BundleError::Asset { source, .. } => Some(source),
        }
    }
}

fn read(path: &Path) -> Result<String, BundleError> {
    fs::read_to_string(path).map_err(|source| BundleError::Io {
        path: path.to_path_buf(),
        source,
    })
}

impl StaticAssets {
    pub fn load(root: impl AsRef<Path>) -> Result<Self, BundleError> {
        let root = root.as_ref();
        let capitals_path = root.join(CAPITALS_FILE_NAME);
        let capitals = CapitalIndex::from_json_str(&read(&capitals_path)?).map_err(|source| {
            BundleError::Asset {
                path: capitals_path.clone(),
                source,
            }
        })?;
        let regions_path = root.join(REGIONS_FILE_NAME);
        let regions =
            RegionFilters::from_json_str(&read(&regions_path)?).map_err(|source| {
                BundleError::Asset {
                    path: regions_path.clone(),
                    source,
                }
            })?;
        Ok(Self { capitals, regions })
    }
}

impl AssetBundle {
    pub fn load(root: impl AsRef<Path>) -> Result<Self, BundleError> {
        let root = root.as_ref().to_path_buf();

        let topology_path = root.join(TOPOLOGY_FILE_NAME);
        let topology_payload = read(&topology_path)?;
        let topology = parse_country_features(&topology_payload, COUNTRIES_OBJECT).map_err(
            |source| BundleError::Topology {
                path: topology_path.clone(),
                source,
            },
        )?;

        let attributes_path = root.join(ATTRIBUTES_FILE_NAME);
        let attributes_payload = read(&attributes_path)?;
        let attributes = parse_country_records(&attributes_payload).map_err(|source| {
            BundleError::Attributes {
                path: attributes_path.clone(),
                source,
            }
        })?;

        let assets = StaticAssets::load(&root)?;

        let mut hasher = blake3::Hasher::new();
        for name in [
            TOPOLOGY_FILE_NAME,
            ATTRIBUTES_FILE_NAME,
            CAPITALS_FILE_NAME,
            REGIONS_FILE_NAME,
        ] {
            let bytes = fs::read(root.join(name)).map_err(|source| BundleError::Io {
                path: root.join(name),
                source,
            })?;
            hasher.update(name.as_bytes());
            hasher.update(&(bytes.len() as u64).to_le_bytes());
            hasher.update(&bytes);
        }
        let content_hash = hasher.finalize().to_hex().to_string();

        Ok(Self {
            topology,
            attributes,
            assets,
            content_hash,
        })
    }

    /// blake3 over every bundle file, name-prefixed, in fixed order.
    pub fn content_hash(&self) -> &str {
        &self.content_hash
    }

    pub fn into_parts(self) -> (Vec<TopologyFeature>, Vec<CountryRecord>, StaticAssets) {
        (self.topology, self.attributes, self.assets)
    }
}
