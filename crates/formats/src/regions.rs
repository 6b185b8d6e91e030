use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::capitals::AssetError;

/// View used when the caller does not name one.
pub const DEFAULT_VIEW: &str = "world";

/// Named region views: view name to the alpha-3 codes visible in it.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegionFilters {
    views: BTreeMap<String, Vec<String>>,
}

impl RegionFilters {
    pub fn new(views: BTreeMap<String, Vec<String>>) -> Self {
        Self { views }
    }

    pub fn from_json_str(payload: &str) -> Result<Self, AssetError> {
        serde_json::from_str(payload).map_err(|source| AssetError::Json {
            asset: "region filters",
            source,
        })
    }

    pub fn view(&self, name: &str) -> Option<&[String]> {
        self.views.get(name).map(Vec::as_slice)
    }

    pub fn view_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.views.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{DEFAULT_VIEW, RegionFilters};

    #[test]
    fn reads_named_views() {
        let filters = RegionFilters::from_json_str(
            r#"{ "world": ["FRA", "NLD"], "europe": ["FRA", "NLD", "NOR"] }"#,
        )
        .expect("parse");
        assert_eq!(
            filters.view(DEFAULT_VIEW),
            Some(&["FRA".to_string(), "NLD".to_string()][..])
        );
        assert_eq!(filters.view_names().collect::<Vec<_>>(), vec!["europe", "world"]);
        assert!(filters.view("asia").is_none());
    }

    #[test]
    fn rejects_non_object_documents() {
        assert!(RegionFilters::from_json_str("[]").is_err());
    }
}
