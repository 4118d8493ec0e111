//! World invariant checks.
//!
//! Hard-fail validation. `validate_world` panics on the first breach;
//! `try_validate_world` reports it instead and is what snapshot restore
//! uses on untrusted input.

use crate::object::{AnimatedObject, Shape};
use crate::world::World;

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Run every check. Panics on the first failure.
pub fn validate_world(world: &World) {
    if let Err(msg) = try_validate_world(world) {
        panic!("Invariant violation: {}", msg);
    }
}

/// Non-panicking variant of `validate_world`.
pub fn try_validate_world(world: &World) -> Result<(), String> {
    try_check_object_keys(world)?;
    try_check_edge_endpoints(world)?;
    try_check_alpha_ranges(world)?;
    try_check_slot_vectors(world)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Individual checks
// ---------------------------------------------------------------------------

/// Registry key and stored id agree. Only a hand-edited snapshot can break this.
fn try_check_object_keys(world: &World) -> Result<(), String> {
    let mut prev = None;
    for obj in world.objects() {
        if prev.is_some_and(|p| p >= obj.id) {
            return Err(format!(
                "[INVARIANT:object_keys] object {} out of order in registry",
                obj.id
            ));
        }
        if world.object(obj.id).map(|o| o.id) != Some(obj.id) {
            return Err(format!(
                "[INVARIANT:object_keys] registry entry for {} holds another id",
                obj.id
            ));
        }
        prev = Some(obj.id);
    }
    Ok(())
}

/// Every edge connects two live objects.
fn try_check_edge_endpoints(world: &World) -> Result<(), String> {
    for (from, to, _) in world.edges() {
        for end in [from, to] {
            if !world.contains(end) {
                return Err(format!(
                    "[INVARIANT:edge_endpoints] edge {} -> {} references missing object {}",
                    from, to, end
                ));
            }
        }
    }
    Ok(())
}

fn alpha_ok(alpha: f64) -> bool {
    (0.0..=1.0).contains(&alpha)
}

fn try_check_alpha_ranges(world: &World) -> Result<(), String> {
    for obj in world.objects() {
        if !alpha_ok(obj.alpha) {
            return Err(format!(
                "[INVARIANT:alpha_range] object {} has alpha {}",
                obj.id, obj.alpha
            ));
        }
    }
    for (from, to, edge) in world.edges() {
        if !alpha_ok(edge.alpha) {
            return Err(format!(
                "[INVARIANT:alpha_range] edge {} -> {} has alpha {}",
                from, to, edge.alpha
            ));
        }
    }
    Ok(())
}

fn slot_vectors_match(obj: &AnimatedObject) -> bool {
    match &obj.shape {
        Shape::LinkedList {
            labels,
            label_colors,
            ..
        } => !labels.is_empty() && labels.len() == label_colors.len(),
        _ => true,
    }
}

fn try_check_slot_vectors(world: &World) -> Result<(), String> {
    match world.objects().find(|o| !slot_vectors_match(o)) {
        Some(obj) => Err(format!(
            "[INVARIANT:slot_vectors] linked list {} has mismatched label/color slots",
            obj.id
        )),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{Command, Opcode};
    use crate::ids::ObjectId;
    use crate::operands;

    fn sample() -> World {
        let mut w = World::new();
        for cmd in [
            Command::new(Opcode::CreateCircle, operands![1, "a", 0, 0]),
            Command::new(Opcode::CreateCircle, operands![2, "b", 40, 0]),
            Command::new(Opcode::Connect, operands![1, 2]),
        ] {
            w.apply(&cmd).unwrap();
        }
        w
    }

    #[test]
    fn test_valid_world_passes() {
        let w = sample();
        validate_world(&w);
        assert_eq!(try_validate_world(&w), Ok(()));
        validate_world(&World::new());
    }

    #[test]
    fn test_out_of_range_alpha_is_reported() {
        let mut w = sample();
        w.expect_object_mut(ObjectId(2)).alpha = 1.5;
        let err = try_validate_world(&w).unwrap_err();
        assert!(err.contains("alpha_range"), "{}", err);
    }

    #[test]
    fn test_dangling_edge_is_reported() {
        let mut w = sample();
        w.put_edge(ObjectId(2), ObjectId(9), Some(crate::object::Edge::default()));
        let err = try_validate_world(&w).unwrap_err();
        assert!(err.contains("missing object 9"), "{}", err);
    }

    #[test]
    fn test_mismatched_slots_are_reported() {
        let mut w = World::new();
        w.apply(&Command::new(Opcode::CreateLinkedList, operands![3, "x", 60, 30, 0, 0]))
            .unwrap();
        if let Shape::LinkedList { label_colors, .. } =
            &mut w.expect_object_mut(ObjectId(3)).shape
        {
            label_colors.push("#000000".into());
        }
        assert!(try_validate_world(&w).unwrap_err().contains("slot_vectors"));
    }

    #[test]
    #[should_panic(expected = "Invariant violation: [INVARIANT:alpha_range]")]
    fn test_validate_world_panics() {
        let mut w = sample();
        w.expect_edge_mut(ObjectId(1), ObjectId(2)).alpha = -0.1;
        validate_world(&w);
    }
}
