use corrections::TerritoryPatch;
use foundation::NumericId;
use scene::{AreaGeometry, EntityId, EntitySet, MapEntity};
use tracing::debug;

use crate::error::PipelineError;
use crate::join::attributes_from_record;
use crate::records::CorrectedRecords;

/// First id handed out to a territory whose record has no numeric code.
pub const SYNTHETIC_ID_START: i32 = 900;

/// Group bookkeeping for one parent touched by decomposition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParentLedger {
    pub parent: String,
    pub original_groups: usize,
    pub removed_groups: usize,
    /// Children in creation order with the number of groups each received.
    pub children: Vec<(String, usize)>,
    next_start: usize,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DecompositionReport {
    pub parents: Vec<ParentLedger>,
    /// Clones with the group count copied from their source.
    pub clones: Vec<(String, usize)>,
}

impl DecompositionReport {
    fn ledger_mut(&mut self, parent: &str, original_groups: usize) -> &mut ParentLedger {
        let idx = match self.parents.iter().position(|l| l.parent == parent) {
            Some(idx) => idx,
            None => {
                self.parents.push(ParentLedger {
                    parent: parent.to_string(),
                    original_groups,
                    removed_groups: 0,
                    children: Vec::new(),
                    next_start: 0,
                });
                self.parents.len() - 1
            }
        };
        &mut self.parents[idx]
    }

    fn removed_from(&self, alpha3: &str) -> usize {
        self.parents
            .iter()
            .find(|l| l.parent == alpha3)
            .map_or(0, |l| l.removed_groups)
    }

    /// Checks group conservation against the final entity set: each parent
    /// lost exactly what its children received, and each child holds what it
    /// received less what its own splits took.
    pub fn verify(&self, set: &EntitySet) -> Result<(), PipelineError> {
        let check = |alpha3: &str, expected: usize| -> Result<(), PipelineError> {
            let actual = match set.ids_with_alpha3(alpha3).as_slice() {
                [id] => set.get(*id).map(|e| e.geometry.group_count()),
                _ => None,
            };
            if actual == Some(expected) {
                return Ok(());
            }
            Err(PipelineError::GroupCount {
                alpha3: alpha3.to_string(),
                expected,
                actual: actual.unwrap_or(0),
            })
        };
        for ledger in &self.parents {
            let moved: usize = ledger.children.iter().map(|(_, n)| n).sum();
            check(
                ledger.parent.as_str(),
                ledger.original_groups.saturating_sub(moved),
            )?;
            for (child, received) in &ledger.children {
                check(child.as_str(), received.saturating_sub(self.removed_from(child)))?;
            }
        }
        for (child, copied) in &self.clones {
            check(child.as_str(), copied.saturating_sub(self.removed_from(child)))?;
        }
        Ok(())
    }
}

fn single_entity(set: &EntitySet, patch: &'static str, alpha3: &str) -> Result<EntityId, PipelineError> {
    match set.ids_with_alpha3(alpha3).as_slice() {
        [id] => Ok(*id),
        _ => Err(PipelineError::CorrectionTargetNotFound {
            patch,
            key: alpha3.to_string(),
        }),
    }
}

/// First id from 900 up that no entity holds and no record claims.
fn next_synthetic_id(set: &EntitySet, records: &CorrectedRecords) -> NumericId {
    let claimed = |id: NumericId| records.records().iter().any(|r| r.numeric_code == Some(id));
    let mut candidate = NumericId::new(SYNTHETIC_ID_START);
    while set.contains_numeric_id(candidate) || claimed(candidate) {
        candidate = NumericId::new(candidate.get() + 1);
    }
    candidate
}

/// Builds the child entity for `alpha3` from its corrected record.
fn spawn_child(
    set: &mut EntitySet,
    records: &CorrectedRecords,
    patch: &'static str,
    alpha3: &str,
    geometry: AreaGeometry,
) -> Result<EntityId, PipelineError> {
    let record = records
        .by_alpha3(alpha3)
        .ok_or_else(|| PipelineError::CorrectionTargetNotFound {
            patch,
            key: alpha3.to_string(),
        })?;
    if !set.ids_with_alpha3(alpha3).is_empty() {
        return Err(PipelineError::IdentityConflict {
            key: "alpha3Code",
            value: alpha3.to_string(),
        });
    }
    let numeric_id = match record.numeric_code {
        Some(code) => {
            if set.contains_numeric_id(code) {
                return Err(PipelineError::IdentityConflict {
                    key: "numericId",
                    value: code.to_string(),
                });
            }
            code
        }
        None => next_synthetic_id(set, records),
    };
    let entity =
        MapEntity::new(numeric_id, None, geometry).with_attributes(attributes_from_record(record));
    Ok(set.spawn(entity))
}

/// Runs territory patches in table order, appending one entity per patch.
pub fn decompose(
    set: &mut EntitySet,
    records: &CorrectedRecords,
    patches: &[TerritoryPatch],
) -> Result<DecompositionReport, PipelineError> {
    let mut report = DecompositionReport::default();
    for patch in patches {
        match patch {
            TerritoryPatch::Split {
                parent,
                child,
                start,
                count,
            } => {
                let parent_id = single_entity(set, patch.name(), parent)?;
                // Resolve the record before touching geometry so a missing
                // child leaves the parent intact.
                if records.by_alpha3(child).is_none() {
                    return Err(PipelineError::CorrectionTargetNotFound {
                        patch: patch.name(),
                        key: child.clone(),
                    });
                }
                let available = set
                    .get(parent_id)
                    .map(|e| e.geometry.group_count())
                    .unwrap_or(0);
                let ledger = report.ledger_mut(parent, available);
                let range_error = |available: usize| PipelineError::DecompositionRange {
                    parent: parent.clone(),
                    child: child.clone(),
                    start: *start,
                    count: *count,
                    available,
                };
                if *start < ledger.next_start {
                    return Err(range_error(ledger.original_groups));
                }
                let current_start = start - ledger.removed_groups;
                let geometry = set
                    .get_mut(parent_id)
                    .ok_or_else(|| range_error(0))?
                    .geometry
                    .take_groups(current_start, *count)
                    .map_err(|_| range_error(ledger.original_groups))?;
                ledger.removed_groups += count;
                ledger.next_start = start + count;
                ledger.children.push((child.clone(), *count));

                spawn_child(set, records, patch.name(), child, geometry)?;
                debug!(%parent, %child, start, count, "split territory");
            }
            TerritoryPatch::Clone { source, child } => {
                let source_id = single_entity(set, patch.name(), source)?;
                let geometry = set
                    .get(source_id)
                    .map(|e| e.geometry.clone())
                    .unwrap_or_default();
                let groups = geometry.group_count();
                spawn_child(set, records, patch.name(), child, geometry)?;
                report.clones.push((child.clone(), groups));
                debug!(%source, %child, groups, "cloned territory");
            }
        }
    }
    report.verify(set)?;
    Ok(report)
}
