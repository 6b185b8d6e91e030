use corrections::GeometryPatch;
use formats::TopologyFeature;
use foundation::NumericId;
use scene::AreaGeometry;
use tracing::debug;

use crate::error::PipelineError;

/// A topology feature that survived the Antarctica filter. `position` is its
/// index among the survivors and never changes afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct IngestedFeature {
    pub position: usize,
    pub id: NumericId,
    pub geometry: AreaGeometry,
}

pub fn ingest(features: Vec<TopologyFeature>) -> Vec<IngestedFeature> {
    features
        .into_iter()
        .filter(|f| f.id != NumericId::ANTARCTICA)
        .enumerate()
        .map(|(position, f)| IngestedFeature {
            position,
            id: f.id,
            geometry: f.geometry,
        })
        .collect()
}

/// Applies id reassignments and exclusions in table order. A patch whose
/// position is gone, or holds a different id than expected, has no target.
pub fn apply_geometry_patches(
    features: &mut Vec<IngestedFeature>,
    patches: &[GeometryPatch],
) -> Result<(), PipelineError> {
    for patch in patches {
        let idx = features
            .iter()
            .position(|f| f.position == patch.position() && f.id == patch.expect())
            .ok_or_else(|| PipelineError::CorrectionTargetNotFound {
                patch: patch.name(),
                key: format!("position {} with id {}", patch.position(), patch.expect()),
            })?;
        match patch {
            GeometryPatch::ReassignId { position, to, .. } => {
                debug!(position, from = %features[idx].id, to = %to, "reassigning feature id");
                features[idx].id = *to;
            }
            GeometryPatch::Exclude { position, expect } => {
                debug!(position, id = %expect, "excluding feature");
                features.remove(idx);
            }
        }
    }
    Ok(())
}
