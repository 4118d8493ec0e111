//! Snapshot Codec: deterministic World encoder/decoder.
//!
//! Pure codec layer. No side-effects, no timestamps, no envelope.
//!
//! - `encode_world`:  World → JSON string (objects and edges in id order)
//! - `decode_world`:  JSON string → World (strict, no defaults)
//! - `restore_world`: decode + invariant validation
//! - `snapshot_hash`: SHA-256 of the JSON encoding (lowercase hex)

use thiserror::Error;

use anim_engine::hashing::hex_digest;
use anim_engine::invariants::try_validate_world;
use anim_engine::world::World;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("SerializationError: {0}")]
    Serialization(#[source] serde_json::Error),
    /// Malformed JSON, missing fields or unknown fields.
    #[error("DeserializationError: {0}")]
    Deserialization(#[source] serde_json::Error),
    #[error("InvariantViolation: {0}")]
    InvariantViolation(String),
}

// ---------------------------------------------------------------------------
// Codec
// ---------------------------------------------------------------------------

pub fn encode_world(world: &World) -> Result<String, SnapshotError> {
    serde_json::to_string(world).map_err(SnapshotError::Serialization)
}

/// Strict decode. No invariant validation; use `restore_world` for
/// untrusted input.
pub fn decode_world(json: &str) -> Result<World, SnapshotError> {
    serde_json::from_str::<World>(json).map_err(SnapshotError::Deserialization)
}

pub fn restore_world(json: &str) -> Result<World, SnapshotError> {
    let world = decode_world(json)?;
    try_validate_world(&world).map_err(SnapshotError::InvariantViolation)?;
    Ok(world)
}

/// Integrity hash of the snapshot text. Unlike the canonical world hash
/// it does not bind the protocol version.
pub fn snapshot_hash(world: &World) -> Result<String, SnapshotError> {
    Ok(hex_digest(encode_world(world)?.as_bytes()))
}
