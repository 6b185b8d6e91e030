use corrections::{CapitalOffset, LabelOverride};
use foundation::math::{Projection, TimesProjection, Vec2, Viewport, path_centroid};
use scene::{AreaGeometry, EntitySet, KeyIndex, Marker};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LabelPlacementConfig {
    pub viewport: Viewport,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LabelError {
    /// An override names an alpha-3 code with no entity or marker.
    MissingTarget { table: &'static str, alpha3: String },
}

impl std::fmt::Display for LabelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LabelError::MissingTarget { table, alpha3 } => {
                write!(f, "{table} override targets unknown entity {alpha3:?}")
            }
        }
    }
}

impl std::error::Error for LabelError {}

pub const COUNTRY_LABELS_TABLE: &str = "country_labels";
pub const CAPITAL_OFFSETS_TABLE: &str = "capital_offsets";

/// Places one country label per attributed entity.
///
/// The default anchor is the planar centroid of the projected geometry,
/// inverted back to `[lon, lat]`.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelPlacer<P = TimesProjection> {
    projection: P,
}

impl LabelPlacer<TimesProjection> {
    pub fn new(config: &LabelPlacementConfig) -> Self {
        Self {
            projection: TimesProjection::new(config.viewport),
        }
    }
}

impl<P: Projection> LabelPlacer<P> {
    pub fn with_projection(projection: P) -> Self {
        Self { projection }
    }

    pub fn default_label(&self, geometry: &AreaGeometry) -> Option<[f64; 2]> {
        let projected: Vec<Vec<Vec2>> = geometry
            .rings()
            .map(|ring| {
                ring.iter()
                    .filter_map(|p| self.projection.project(p.as_array()))
                    .collect()
            })
            .collect();
        let centroid = path_centroid(projected.iter().map(Vec::as_slice))?;
        self.projection.invert(centroid)
    }

    /// Writes label coordinates and offsets onto `set` and returns the
    /// country markers in entity order.
    ///
    /// Every override is checked against `index` before anything is written.
    pub fn place(
        &self,
        set: &mut EntitySet,
        index: &KeyIndex,
        overrides: &[LabelOverride],
    ) -> Result<Vec<Marker>, LabelError> {
        let mut resolved = Vec::with_capacity(overrides.len());
        for entry in overrides {
            let id = index
                .by_alpha3(entry.alpha3())
                .ok_or_else(|| LabelError::MissingTarget {
                    table: COUNTRY_LABELS_TABLE,
                    alpha3: entry.alpha3().to_string(),
                })?;
            resolved.push((id, entry));
        }

        for (_, entity) in set.iter_mut() {
            if entity.attributes.is_none() {
                continue;
            }
            entity.label_coordinates = self.default_label(&entity.geometry);
            entity.marker_offset = 0.0;
        }

        for (id, entry) in resolved {
            let Some(entity) = set.get_mut(id) else {
                continue;
            };
            match entry {
                LabelOverride::Coordinates { coordinates, .. } => {
                    entity.label_coordinates = Some(*coordinates);
                }
                LabelOverride::Offset { offset, .. } => entity.marker_offset = *offset,
            }
        }

        Ok(set
            .iter()
            .filter_map(|(_, entity)| {
                let attrs = entity.attributes.as_ref()?;
                let coordinates = entity.label_coordinates?;
                Some(Marker {
                    name: attrs.name.clone(),
                    alpha3_code: attrs.alpha3_code.clone(),
                    coordinates,
                    marker_offset: entity.marker_offset,
                })
            })
            .collect())
    }
}

/// Replaces the offset of the capital marker for each listed alpha-3 code.
pub fn apply_capital_offsets(
    markers: &mut [Marker],
    offsets: &[CapitalOffset],
) -> Result<(), LabelError> {
    for entry in offsets {
        let marker = markers
            .iter_mut()
            .find(|m| m.alpha3_code == entry.alpha3)
            .ok_or_else(|| LabelError::MissingTarget {
                table: CAPITAL_OFFSETS_TABLE,
                alpha3: entry.alpha3.clone(),
            })?;
        marker.marker_offset = entry.offset;
    }
    Ok(())
}
