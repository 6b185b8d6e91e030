use std::fmt;

use formats::{AttributesError, TopologyError};
use foundation::NumericId;
use layers::LabelError;
use scene::DuplicateKey;

/// Which external document a fetch failure refers to.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SourceKind {
    Topology,
    Attributes,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Topology => write!(f, "topology"),
            SourceKind::Attributes => write!(f, "country attributes"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinError {
    /// A geometry other than the disputed sentinel has no attribute record.
    Unmatched { position: usize, id: NumericId },
    /// Several attribute records carry the geometry's numeric code.
    Ambiguous {
        id: NumericId,
        alpha3_codes: Vec<String>,
    },
}

impl fmt::Display for JoinError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JoinError::Unmatched { position, id } => {
                write!(f, "geometry {id} at position {position} matches no country record")
            }
            JoinError::Ambiguous { id, alpha3_codes } => write!(
                f,
                "geometry {id} matches several country records: {}",
                alpha3_codes.join(", ")
            ),
        }
    }
}

impl std::error::Error for JoinError {}

#[derive(Debug)]
pub enum PipelineError {
    SourceUnavailable {
        source: SourceKind,
        reason: String,
    },
    Join(JoinError),
    CorrectionTargetNotFound {
        patch: &'static str,
        key: String,
    },
    DecompositionRange {
        parent: String,
        child: String,
        start: usize,
        count: usize,
        available: usize,
    },
    /// An entity touched by decomposition does not hold the groups its
    /// ledger accounts for.
    GroupCount {
        alpha3: String,
        expected: usize,
        actual: usize,
    },
    IdentityConflict {
        key: &'static str,
        value: String,
    },
    Topology(TopologyError),
    Attributes(AttributesError),
}

impl PipelineError {
    /// Failures caused by the correction table disagreeing with the data,
    /// as opposed to unreachable or unreadable sources.
    pub fn is_integrity_failure(&self) -> bool {
        matches!(
            self,
            PipelineError::Join(_)
                | PipelineError::CorrectionTargetNotFound { .. }
                | PipelineError::DecompositionRange { .. }
                | PipelineError::GroupCount { .. }
                | PipelineError::IdentityConflict { .. }
        )
    }
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::SourceUnavailable { source, reason } => {
                write!(f, "{source} source unavailable: {reason}")
            }
            PipelineError::Join(err) => write!(f, "join failed: {err}"),
            PipelineError::CorrectionTargetNotFound { patch, key } => {
                write!(f, "{patch} patch target not found: {key}")
            }
            PipelineError::DecompositionRange {
                parent,
                child,
                start,
                count,
                available,
            } => write!(
                f,
                "cannot move groups {start}..{} of {parent} into {child} ({available} available)",
                start.saturating_add(*count)
            ),
            PipelineError::GroupCount {
                alpha3,
                expected,
                actual,
            } => write!(
                f,
                "{alpha3} holds {actual} geometry groups after decomposition, expected {expected}"
            ),
            PipelineError::IdentityConflict { key, value } => {
                write!(f, "identity conflict on {key}: {value}")
            }
            PipelineError::Topology(err) => write!(f, "{err}"),
            PipelineError::Attributes(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for PipelineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PipelineError::Join(err) => Some(err),
            PipelineError::Topology(err) => Some(err),
            PipelineError::Attributes(err) => Some(err),
            _ => None,
        }
    }
}

impl From<JoinError> for PipelineError {
    fn from(err: JoinError) -> Self {
        PipelineError::Join(err)
    }
}

impl From<DuplicateKey> for PipelineError {
    fn from(err: DuplicateKey) -> Self {
        let key = match err.kind {
            scene::KeyKind::NumericId => "numericId",
            scene::KeyKind::Alpha3 => "alpha3Code",
            scene::KeyKind::Alpha2 => "alpha2Code",
        };
        PipelineError::IdentityConflict {
            key,
            value: err.value,
        }
    }
}

impl From<LabelError> for PipelineError {
    fn from(err: LabelError) -> Self {
        match err {
            LabelError::MissingTarget { table, alpha3 } => PipelineError::CorrectionTargetNotFound {
                patch: table,
                key: alpha3,
            },
        }
    }
}

impl From<TopologyError> for PipelineError {
    fn from(err: TopologyError) -> Self {
        PipelineError::Topology(err)
    }
}

impl From<AttributesError> for PipelineError {
    fn from(err: AttributesError) -> Self {
        PipelineError::Attributes(err)
    }
}
