//! Drift detection: determinism verification and scene comparison.

use std::collections::BTreeSet;

use anim_engine::command::CommandBatch;
use anim_engine::ids::ObjectId;
use anim_engine::recorder::{ActionRecorder, Algorithm, RecordingMode};
use anim_engine::world::World;

use crate::replay;

/// Run `actions` on two independently constructed instances and check
/// that they emit identical batches and build identical Worlds; then
/// check that reset + recorded replay reproduces the same batches once
/// more. Panics on any difference. Returns the final world hash.
pub fn verify_determinism<A, F>(make: F, actions: &[A::Action]) -> String
where
    A: Algorithm,
    F: Fn() -> A,
{
    let (batches1, mut recorder) = forward_run(make(), actions);
    let (batches2, _) = forward_run(make(), actions);

    if batches1 != batches2 {
        panic!("DETERMINISM FAILURE: two forward runs emitted different batches");
    }

    let hash1 = replay_hash(&batches1);
    let hash2 = replay_hash(&batches2);
    if hash1 != hash2 {
        panic!(
            "DETERMINISM FAILURE: two replays produced different hashes.\n\
             Run 1: {}\n\
             Run 2: {}",
            hash1, hash2
        );
    }

    // Replay panics itself if id allocation drifts.
    let replayed = recorder.replay(RecordingMode::Record);
    if replayed[..] != batches1[1..] {
        panic!("DETERMINISM FAILURE: reset + replay emitted different batches");
    }
    hash1
}

/// Setup batch followed by one batch per action.
fn forward_run<A: Algorithm>(
    algorithm: A,
    actions: &[A::Action],
) -> (Vec<CommandBatch>, ActionRecorder<A>) {
    let (mut recorder, setup) = ActionRecorder::new(algorithm);
    let mut batches = vec![setup];
    for action in actions {
        batches.push(recorder.record(action.clone()));
    }
    (batches, recorder)
}

fn replay_hash(batches: &[CommandBatch]) -> String {
    replay::rebuild_hash(batches)
        .unwrap_or_else(|e| panic!("Protocol violation during replay: {}", e))
}

/// Structural difference between two scenes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneDiff {
    pub added_objects: Vec<ObjectId>,
    pub removed_objects: Vec<ObjectId>,
    /// Present in both but with any field differing.
    pub changed_objects: Vec<ObjectId>,
    pub added_edges: Vec<(ObjectId, ObjectId)>,
    pub removed_edges: Vec<(ObjectId, ObjectId)>,
    pub changed_edges: Vec<(ObjectId, ObjectId)>,
}

impl SceneDiff {
    pub fn is_empty(&self) -> bool {
        *self == SceneDiff::default()
    }
}

/// Compare `a` (before) with `b` (after).
pub fn compare_worlds(a: &World, b: &World) -> SceneDiff {
    let ids_a: BTreeSet<ObjectId> = a.objects().map(|o| o.id).collect();
    let ids_b: BTreeSet<ObjectId> = b.objects().map(|o| o.id).collect();

    let changed_objects = ids_a
        .intersection(&ids_b)
        .filter(|id| a.object(**id) != b.object(**id))
        .copied()
        .collect();

    let edges_a: BTreeSet<(ObjectId, ObjectId)> = a.edges().map(|(f, t, _)| (f, t)).collect();
    let edges_b: BTreeSet<(ObjectId, ObjectId)> = b.edges().map(|(f, t, _)| (f, t)).collect();

    let changed_edges = edges_a
        .intersection(&edges_b)
        .filter(|(f, t)| a.edge(*f, *t) != b.edge(*f, *t))
        .copied()
        .collect();

    SceneDiff {
        added_objects: ids_b.difference(&ids_a).copied().collect(),
        removed_objects: ids_a.difference(&ids_b).copied().collect(),
        changed_objects,
        added_edges: edges_b.difference(&edges_a).copied().collect(),
        removed_edges: edges_a.difference(&edges_b).copied().collect(),
        changed_edges,
    }
}
