//! Canonical World hashing.
//!
//! Deterministic serialization + SHA-256. Objects and edges are emitted in
//! id order (BTreeMap iteration), fields in a fixed order, with no
//! whitespace, so equal Worlds hash equal on every platform.
//!
//! Field order: protocol_version, objects, edges.

use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use crate::world::World;
use crate::PROTOCOL_VERSION;

/// Canonical UTF-8 JSON bytes of a World.
pub fn canonical_serialize(world: &World) -> Vec<u8> {
    let value = build_canonical_value(world);
    serde_json::to_string(&value)
        .expect("canonical_serialize: JSON serialization failed")
        .into_bytes()
}

/// SHA-256 of the canonical serialization, lowercase hex.
pub fn canonical_hash(world: &World) -> String {
    hex_digest(&canonical_serialize(world))
}

pub fn hex_digest(bytes: &[u8]) -> String {
    Sha256::digest(bytes)
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}

fn build_canonical_value(world: &World) -> Value {
    let objects: Vec<Value> = world
        .objects()
        .map(|obj| serde_json::to_value(obj).expect("canonical_serialize: object"))
        .collect();

    let edges: Vec<Value> = world
        .edges()
        .map(|(from, to, edge)| {
            let mut m = Map::new();
            m.insert("from".to_string(), Value::from(from.0));
            m.insert("to".to_string(), Value::from(to.0));
            m.insert(
                "edge".to_string(),
                serde_json::to_value(edge).expect("canonical_serialize: edge"),
            );
            Value::Object(m)
        })
        .collect();

    // protocol_version first: it is part of the hash identity.
    let mut root = Map::new();
    root.insert("protocol_version".to_string(), Value::from(PROTOCOL_VERSION));
    root.insert("objects".to_string(), Value::Array(objects));
    root.insert("edges".to_string(), Value::Array(edges));
    Value::Object(root)
}
