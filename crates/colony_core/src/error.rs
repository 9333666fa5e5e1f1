//! Error types for the colony simulation.

use thiserror::Error;

use crate::resources::Resource;

/// Result type alias using [`GameError`].
pub type Result<T> = std::result::Result<T, GameError>;

/// Top-level error type for all colony simulation errors.
///
/// No variant is fatal to a running simulation: every failure is local to
/// the rejected action and leaves state unchanged.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GameError {
    /// Attempted spend exceeds the available quantity.
    #[error("insufficient resources: need {required} {resource}, have {available}")]
    ResourceInsufficient {
        /// Resource that fell short.
        resource: Resource,
        /// Amount required.
        required: u32,
        /// Amount available.
        available: u32,
    },

    /// A cost references a resource the player has not unlocked yet.
    #[error("resource not yet unlocked: {0}")]
    PrerequisiteNotUnlocked(Resource),

    /// Ordering violation: the target must be unlocked first.
    #[error("{0} is not yet unlocked")]
    NotYetUnlocked(&'static str),

    /// Ordering violation: the target must be purchased first.
    #[error("{0} has not been purchased")]
    NotYetPurchased(&'static str),

    /// Idempotency guard: the technology was already researched.
    #[error("{0} has already been researched")]
    AlreadyResearched(&'static str),

    /// Idempotency guard: the vehicle was already purchased.
    #[error("{0} has already been purchased")]
    AlreadyPurchased(&'static str),

    /// Idempotency guard: the vehicle is at its maximum level.
    #[error("{0} is already at maximum level")]
    AlreadyAtMaxLevel(&'static str),

    /// Invalid building reference.
    #[error("building not found: {0}")]
    BuildingNotFound(u64),

    /// Invalid resource node reference.
    #[error("resource node not found: {0}")]
    NodeNotFound(u64),

    /// Persistence failure (store unavailable or blob rejected).
    #[error("save store error: {0}")]
    Save(String),
}
