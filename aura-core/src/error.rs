use thiserror::Error;

use crate::objects::ObjectId;

/// All errors produced by aura-core.
///
/// Rejections (`CapacityExceeded`, `NoTarget`, `UnknownObject`) are ordinary
/// outcomes of user input. The session turns them into HUD log messages; they
/// never abort a tick.
#[derive(Debug, Error)]
pub enum AuraError {
    #[error("malformed landmark set: expected at least {expected} points, got {got}")]
    MalformedLandmarks { expected: usize, got: usize },

    #[error("object capacity exceeded: {current} present + {requested} requested > {max}")]
    CapacityExceeded {
        current: usize,
        requested: usize,
        max: usize,
    },

    #[error("no target object for command")]
    NoTarget,

    #[error("unknown object: {0}")]
    UnknownObject(ObjectId),

    #[error("engine is already running")]
    AlreadyRunning,

    #[error("engine is not running")]
    NotRunning,

    #[error("input channel closed: engine stopped")]
    InputClosed,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AuraError {
    /// Whether this error is a user-facing rejection rather than a fault.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            AuraError::CapacityExceeded { .. } | AuraError::NoTarget | AuraError::UnknownObject(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, AuraError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_user_input_outcomes_are_rejections() {
        assert!(AuraError::NoTarget.is_rejection());
        assert!(AuraError::UnknownObject(ObjectId(4)).is_rejection());
        assert!(AuraError::CapacityExceeded {
            current: 3,
            requested: 1,
            max: 3
        }
        .is_rejection());
        assert!(!AuraError::NotRunning.is_rejection());
        assert!(!AuraError::Other(anyhow::anyhow!("tracker crashed")).is_rejection());
    }
}
