use thiserror::Error;

/// Why an interaction request was turned down. Rejections are part of normal
/// play and are never logged above `debug`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("an item is already held")]
    AlreadyHolding,
    #[error("pickup cooldown still running")]
    CoolingDown,
    #[error("collidable is not a registered carryable item")]
    Unregistered,
    #[error("collidable lacks the carryable capability")]
    NotCarryable,
    #[error("no item is held")]
    NothingHeld,
    #[error("another sequence is in flight")]
    Busy,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RigError {
    /// No animation target bound; the rig keeps moving without clips
    #[error("no animation target bound to {0}")]
    ConfigurationMissing(&'static str),
    /// A named clip does not exist; the current wait is treated as zero-length
    #[error("animation clip '{0}' not found")]
    AssetMissing(String),
    #[error("interaction rejected: {0}")]
    InvalidInteraction(#[from] Rejection),
    /// A required collaborator reference (anchor, body) is unset
    #[error("{0} reference not set")]
    ReferenceMissing(&'static str),
}

impl RigError {
    pub fn rejection(&self) -> Option<Rejection> {
        match self {
            RigError::InvalidInteraction(r) => Some(*r),
            _ => None,
        }
    }
}
