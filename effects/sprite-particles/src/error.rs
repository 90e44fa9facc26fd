use thiserror::Error;

/// Error types for particle simulation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParticleError {
    /// The emitter geometry has no data to sample spawn positions from
    #[error("Empty emitter: {kind} geometry has no vertices to sample")]
    EmptyEmitter { kind: &'static str },

    /// The requested pool capacity cannot be allocated or indexed
    #[error("Invalid capacity: {capacity} (expected 1..={max})")]
    InvalidCapacity { capacity: usize, max: usize },

    /// A slot index outside the pool was requested
    #[error("Slot {slot} out of range for a pool of {capacity} particles")]
    SlotOutOfRange { slot: usize, capacity: usize },
}

/// Result type using ParticleError
pub type Result<T> = std::result::Result<T, ParticleError>;
