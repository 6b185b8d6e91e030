use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use foundation::math::Viewport;
use layers::LabelPlacementConfig;

pub const DEFAULT_ATTRIBUTES_URL: &str = "https://restcountries.eu/rest/v2/all?fields=name;capital;alpha3Code;alpha2Code;numericCode;area;altSpellings";

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    pub assets_root: PathBuf,
    /// Path or http(s) URL of the TopoJSON/GeoJSON country geometry.
    pub topology_source: String,
    /// Path or http(s) URL of the country attribute table.
    pub attributes_source: String,
    /// Optional correction table replacing the built-in one.
    pub corrections_path: Option<PathBuf>,
    pub labels: LabelPlacementConfig,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let addr: SocketAddr = env::var("QUIZ_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:9200".to_string())
            .parse()
            .expect("invalid QUIZ_ADDR");
        let assets_root =
            PathBuf::from(env::var("QUIZ_ASSETS_ROOT").unwrap_or_else(|_| "data/assets".to_string()));
        let topology_source = env::var("QUIZ_TOPOLOGY_SOURCE").unwrap_or_else(|_| {
            assets_root
                .join(formats::TOPOLOGY_FILE_NAME)
                .to_string_lossy()
                .into_owned()
        });
        let attributes_source = env::var("QUIZ_ATTRIBUTES_SOURCE")
            .unwrap_or_else(|_| DEFAULT_ATTRIBUTES_URL.to_string());
        let corrections_path = env::var("QUIZ_CORRECTIONS").ok().map(PathBuf::from);

        let defaults = Viewport::default();
        let labels = LabelPlacementConfig {
            viewport: Viewport {
                width_px: env_var_f64("QUIZ_VIEWPORT_WIDTH", defaults.width_px),
                height_px: env_var_f64("QUIZ_VIEWPORT_HEIGHT", defaults.height_px),
                scale: env_var_f64("QUIZ_VIEWPORT_SCALE", defaults.scale),
            },
        };

        Self {
            addr,
            assets_root,
            topology_source,
            attributes_source,
            corrections_path,
            labels,
        }
    }
}

fn env_var_f64(key: &str, default: f64) -> f64 {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
