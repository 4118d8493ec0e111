#![forbid(unsafe_code)]

//! Command-based animation protocol kernel: ids, commands, the World,
//! UndoBlock capture/reversal and the replaying ActionRecorder.

/// Protocol v1. Bound into every canonical hash.
pub const PROTOCOL_VERSION: u32 = 1;

pub mod ids;
pub mod command;
pub mod wire;
pub mod object;
pub mod world;
pub mod undo;
pub mod render;
pub mod invariants;
pub mod hashing;
pub mod recorder;
