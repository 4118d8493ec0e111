//! Replay: rebuild a World from recorded batches.
//!
//! No shortcuts, no cached state: every command goes through
//! `World::apply`, exactly as during playback.

use anim_engine::command::{CommandBatch, ProtocolError};
use anim_engine::hashing::canonical_hash;
use anim_engine::world::World;

/// Apply `batches` in order to a fresh World and return it with its
/// canonical hash.
pub fn rebuild_world(batches: &[CommandBatch]) -> Result<(World, String), ProtocolError> {
    let mut world = World::new();
    for batch in batches {
        for cmd in batch {
            world.apply(cmd)?;
        }
    }
    let hash = canonical_hash(&world);
    Ok((world, hash))
}

pub fn rebuild_hash(batches: &[CommandBatch]) -> Result<String, ProtocolError> {
    rebuild_world(batches).map(|(_, hash)| hash)
}
