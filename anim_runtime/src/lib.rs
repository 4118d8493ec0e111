#![forbid(unsafe_code)]

//! anim_runtime: playback, sessions and tooling around the anim_engine
//! command protocol.
//!
//! The kernel owns the World and the recorder; this crate plays batches
//! segment by segment, keeps the visual undo stack in step with logical
//! undo, and carries the codecs, replay and drift checks.

pub mod config;
pub mod orchestrator;
pub mod session;

pub mod input;
pub mod clients;

pub mod proto_types;
pub mod proto_bridge;
pub mod batch_codec;
pub mod snapshot_codec;
pub mod replay;
pub mod drift;
