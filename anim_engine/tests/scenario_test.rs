//! World-level scenarios and UndoBlock round-trip properties.

use anim_engine::command::{Command, CommandBatch, Opcode, Operand};
use anim_engine::hashing::canonical_hash;
use anim_engine::ids::ObjectId;
use anim_engine::invariants::validate_world;
use anim_engine::operands;
use anim_engine::undo::{reverse_all, UndoBlock};
use anim_engine::wire::{decode_batch, encode_batch};
use anim_engine::world::World;
use proptest::prelude::*;

fn play(world: &mut World, batch: &CommandBatch) -> Vec<UndoBlock> {
    batch
        .iter()
        .filter_map(|c| world.apply(c).expect("valid command"))
        .collect()
}

// ---------------------------------------------------------------------------
// Scenario A
// ---------------------------------------------------------------------------

#[test]
fn scenario_a_text_change_and_full_reversal() {
    let batch = CommandBatch::from(vec![
        Command::new(Opcode::CreateRectangle, operands![1, "A", 50, 50, 10, 10]),
        Command::step(),
        Command::new(Opcode::SetText, operands![1, "B"]),
        Command::step(),
    ]);
    let mut world = World::new();
    let mut log = play(&mut world, &batch);
    assert_eq!(log.len(), 2);
    assert_eq!(world.object(ObjectId(1)).unwrap().text(0), Some("B"));

    log.pop().unwrap().reverse(&mut world);
    assert_eq!(world.object(ObjectId(1)).unwrap().text(0), Some("A"));

    reverse_all(log, &mut world);
    assert!(world.object(ObjectId(1)).is_none());
    assert!(world.is_empty());
}

#[test]
fn wire_round_trip_plays_identically() {
    let batch = CommandBatch::from(vec![
        Command::new(Opcode::CreateCircle, operands![1, "7", 100, 100]),
        Command::new(Opcode::CreateCircle, operands![2, "3", 60, 160]),
        Command::new(Opcode::Connect, operands![1, 2, "#333333", 0.2]),
        Command::step(),
        Command::new(Opcode::SetEdgeHighlight, operands![1, 2, 1]),
        Command::new(Opcode::Move, operands![2, 140, 160]),
        Command::step(),
    ]);
    let lines = encode_batch(&batch).unwrap();
    let decoded = decode_batch(&lines).unwrap();

    let mut a = World::new();
    let mut b = World::new();
    play(&mut a, &batch);
    play(&mut b, &decoded);
    assert_eq!(canonical_hash(&a), canonical_hash(&b));
}

#[test]
fn delete_undo_restores_identical_object() {
    let mut world = World::new();
    let setup = CommandBatch::from(vec![
        Command::new(Opcode::CreateLinkedList, operands![4, "x", 70, 30, 200, 50, 0.3, 0, 1, 2]),
        Command::new(Opcode::CreateRectangle, operands![5, "", 50, 50, 100, 50]),
        Command::new(Opcode::SetText, operands![4, "y", 1]),
        Command::new(Opcode::SetNextNull, operands![4, 1]),
        Command::new(Opcode::SetForegroundColor, operands![4, "#AA0000"]),
        Command::new(Opcode::SetHighlightIndex, operands![4, 0]),
        Command::new(Opcode::Connect, operands![5, 4]),
    ]);
    play(&mut world, &setup);
    let hash = canonical_hash(&world);

    let block = world
        .apply(&Command::new(Opcode::Delete, operands![4]))
        .unwrap()
        .unwrap();
    assert_eq!(world.edge_count(), 0);
    block.reverse(&mut world);
    assert_eq!(canonical_hash(&world), hash);
    validate_world(&world);
}

// ---------------------------------------------------------------------------
// UndoBlock round-trip properties
// ---------------------------------------------------------------------------

/// 1: rectangle, 2: circle, 3: three-slot linked list, edge 1 -> 2.
fn base_world() -> World {
    let mut w = World::new();
    play(
        &mut w,
        &CommandBatch::from(vec![
            Command::new(Opcode::CreateRectangle, operands![1, "a", 50, 50, 0, 0]),
            Command::new(Opcode::CreateCircle, operands![2, "b", 100, 0]),
            Command::new(
                Opcode::CreateLinkedList,
                operands![3, "c", 70, 30, 200, 0, 0.25, 0, 1, 3],
            ),
            Command::new(Opcode::Connect, operands![1, 2]),
        ]),
    );
    w
}

fn object_id() -> impl Strategy<Value = i64> {
    1i64..=3
}

fn color() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["#000000", "#FF0000", "#2ECC71", "#0000FF"]).prop_map(String::from)
}

fn alpha() -> impl Strategy<Value = f64> {
    (0i64..=10).prop_map(|a| a as f64 / 10.0)
}

fn cmd(opcode: Opcode, operands: Vec<Operand>) -> Command {
    Command::new(opcode, operands)
}

/// Commands that are valid against `base_world()` and stay valid after
/// any earlier command in the sequence has been applied (Delete and
/// creates are reversed immediately by the property below).
fn valid_command() -> impl Strategy<Value = Command> {
    prop_oneof![
        (object_id(), "[a-z]{0,4}").prop_map(|(id, t)| cmd(Opcode::SetText, operands![id, t])),
        (0usize..3, "[a-z]{0,4}").prop_map(|(i, t)| cmd(Opcode::SetText, operands![3, t, i])),
        (object_id(), color())
            .prop_map(|(id, c)| cmd(Opcode::SetForegroundColor, operands![id, c])),
        (object_id(), color())
            .prop_map(|(id, c)| cmd(Opcode::SetBackgroundColor, operands![id, c])),
        (object_id(), alpha()).prop_map(|(id, a)| cmd(Opcode::SetAlpha, operands![id, a])),
        (object_id(), any::<bool>())
            .prop_map(|(id, b)| cmd(Opcode::SetHighlight, operands![id, b])),
        (object_id(), -2i64..4).prop_map(|(id, l)| cmd(Opcode::SetLayer, operands![id, l])),
        (prop::sample::select(vec![1i64, 3]), any::<bool>())
            .prop_map(|(id, b)| cmd(Opcode::SetNull, operands![id, b])),
        any::<bool>().prop_map(|b| cmd(Opcode::SetPrevNull, operands![3, b])),
        any::<bool>().prop_map(|b| cmd(Opcode::SetNextNull, operands![3, b])),
        (object_id(), -500i64..500, -500i64..500)
            .prop_map(|(id, x, y)| cmd(Opcode::Move, operands![id, x, y])),
        (object_id(), object_id(), color())
            .prop_map(|(f, t, c)| cmd(Opcode::Connect, operands![f, t, c])),
        (2i64..=3, object_id()).prop_map(|(f, t)| cmd(Opcode::Disconnect, operands![f, t])),
        any::<bool>().prop_map(|b| cmd(Opcode::SetEdgeHighlight, operands![1, 2, b])),
        color().prop_map(|c| cmd(Opcode::SetEdgeColor, operands![1, 2, c])),
        alpha().prop_map(|a| cmd(Opcode::SetEdgeAlpha, operands![1, 2, a])),
        (3usize..6).prop_map(|n| cmd(Opcode::SetNumElements, operands![3, n])),
        (object_id(), -1i64..3)
            .prop_map(|(id, i)| cmd(Opcode::SetHighlightIndex, operands![id, i])),
        object_id().prop_map(|id| cmd(Opcode::Delete, operands![id])),
        Just(cmd(Opcode::CreateLabel, operands![10, "new", 5, 5])),
    ]
}

fn is_transient(c: &Command) -> bool {
    c.opcode() == Opcode::Delete || c.opcode().is_create()
}

proptest! {
    /// Each block restores exactly the pre-command World, and repeating
    /// the mutate/undo cycle lands on the same state every time.
    #[test]
    fn prop_every_block_restores_prior_world(
        cmds in prop::collection::vec(valid_command(), 1..40),
    ) {
        let mut world = base_world();
        for c in &cmds {
            let before = world.clone();
            for _ in 0..2 {
                let block = world.apply(c).unwrap().unwrap();
                block.reverse(&mut world);
                prop_assert_eq!(&world, &before);
            }
            if !is_transient(c) {
                world.apply(c).unwrap();
            }
            validate_world(&world);
        }
    }

    /// Reversing a whole per-batch log newest-first returns to the start.
    #[test]
    fn prop_log_reversal_restores_start(cmds in prop::collection::vec(valid_command(), 1..40)) {
        let start = base_world();
        let mut world = start.clone();
        let mut log = Vec::new();
        for c in cmds.iter().filter(|c| !is_transient(c)) {
            log.push(world.apply(c).unwrap().unwrap());
        }
        reverse_all(log, &mut world);
        prop_assert_eq!(canonical_hash(&world), canonical_hash(&start));
        prop_assert_eq!(world, start);
    }
}
