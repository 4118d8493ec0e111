/// anim_demo: drives the reference clients through full sessions.
///
/// Runs a stack and a merge sort session, undoes the last action of each,
/// checks determinism, and prints batch sizes, wire dumps and hashes.
/// An optional first argument names a playback config JSON file.

use std::path::Path;
use std::process;

use log::{error, info};

use anim_engine::command::CommandBatch;
use anim_engine::recorder::{ActionRecorder, Algorithm};
use anim_engine::wire::encode_batch;

use anim_runtime::batch_codec::{decode_batches, encode_batches};
use anim_runtime::clients::sort::{MergeSort, SortAction, MAX_ELEMENTS};
use anim_runtime::clients::stack::{StackAction, StackArray};
use anim_runtime::config::PlaybackConfig;
use anim_runtime::drift::verify_determinism;
use anim_runtime::input::{normalize_number, parse_number_list, require_non_empty, InputError};
use anim_runtime::replay::rebuild_hash;
use anim_runtime::session::Session;

const STACK_VALUE_LEN: usize = 4;

fn main() {
    env_logger::init();

    let config = match std::env::args().nth(1) {
        Some(path) => PlaybackConfig::load(Path::new(&path)).unwrap_or_else(|e| {
            eprintln!("{}", e);
            process::exit(2);
        }),
        None => PlaybackConfig::default(),
    };
    info!("playback config: {:?}", config);

    let mut ok = true;
    ok &= run_stack(&config);
    ok &= run_sort(&config);

    println!();
    if ok {
        println!("ALL CHECKS PASSED");
    } else {
        println!("SOME CHECKS FAILED");
        process::exit(1);
    }
}

fn stack_action(raw: &str) -> Result<StackAction, InputError> {
    match raw {
        "pop" => Ok(StackAction::Pop),
        "clear" => Ok(StackAction::Clear),
        _ => {
            let value = require_non_empty(raw, "value")?;
            Ok(StackAction::Push(normalize_number(value, STACK_VALUE_LEN)))
        }
    }
}

fn run_stack(config: &PlaybackConfig) -> bool {
    println!("== stack ==");
    let mut session = Session::new(StackArray::new(), config.clone());
    let baseline = session.current_hash();

    let mut actions = Vec::new();
    for raw in ["12", "7", "  ", "pop", "345"] {
        match stack_action(raw) {
            Ok(action) => {
                let allowed = match &action {
                    StackAction::Push(_) => session.algorithm().can_push(),
                    StackAction::Pop => session.algorithm().can_pop(),
                    StackAction::Clear => true,
                };
                if !allowed {
                    println!("  {:?}: unavailable", action);
                    continue;
                }
                println!("  {:?}", action);
                session.implement_action(action.clone());
                session.skip_forward();
                actions.push(action);
            }
            Err(e) => println!("  {:?} rejected: {}", raw, e),
        }
    }
    let before_undo = session.current_hash();
    println!("  top = {}, hash = {}", session.algorithm().top(), before_undo);

    let undone = matches!(session.undo(), Ok(true));
    let after_undo = session.current_hash();
    println!("  undo: {}, top = {}, hash = {}", undone, session.algorithm().top(), after_undo);

    let expected = replayed_hash(StackArray::new, &actions[..actions.len() - 1]);
    let undo_ok = undone && after_undo == expected && after_undo != baseline;
    report("stack undo matches replay", undo_ok);

    let det_hash = verify_determinism(StackArray::new, &actions);
    report("stack determinism", det_hash == before_undo);
    undo_ok && det_hash == before_undo
}

fn run_sort(config: &PlaybackConfig) -> bool {
    println!("== merge sort ==");
    let values = match parse_number_list("5, 3, 8, 1, 9, 2, 7", MAX_ELEMENTS) {
        Ok(v) => v,
        Err(e) => {
            error!("bad demo input: {}", e);
            return false;
        }
    };
    let seed = rand::random::<u64>();
    let actions = vec![
        SortAction::Clear,
        SortAction::Sort(values),
        SortAction::Shuffle { seed },
    ];

    let mut session = Session::new(MergeSort::new(), config.clone());
    for action in &actions {
        session.implement_action(action.clone());
        session.skip_forward();
    }
    println!("  values after shuffle (seed {}): {:?}", seed, session.algorithm().values());
    let final_hash = session.current_hash();

    let undone = matches!(session.undo(), Ok(true));
    println!("  undo: {}, values = {:?}", undone, session.algorithm().values());
    let sorted = session.algorithm().values().windows(2).all(|w| w[0] <= w[1]);
    report("sort undo restores sorted row", undone && sorted);

    // Wire dump and binary stream of the full run.
    let batches = forward_batches(MergeSort::new(), &actions);
    for (i, batch) in batches.iter().enumerate() {
        match encode_batch(batch) {
            Ok(lines) => {
                println!("  batch {}: {} commands", i, lines.len());
                for line in lines.iter().take(3) {
                    println!("    {}", line);
                }
            }
            Err(e) => {
                error!("batch {} does not encode: {}", i, e);
                return false;
            }
        }
    }
    let stream = match encode_batches(&batches) {
        Ok(bytes) => bytes,
        Err(e) => {
            error!("stream encode failed: {}", e);
            return false;
        }
    };
    let stream_ok = match decode_batches(&stream).map(|b| rebuild_hash(&b)) {
        Ok(Ok(hash)) => hash == final_hash,
        Ok(Err(e)) => {
            error!("replay of decoded stream failed: {}", e);
            false
        }
        Err(e) => {
            error!("stream decode failed: {}", e);
            false
        }
    };
    println!("  stream: {} bytes, hash = {}", stream.len(), final_hash);
    report("sort stream replays to live world", stream_ok);

    let det_hash = verify_determinism(MergeSort::new, &actions);
    report("sort determinism", det_hash == final_hash);
    undone && sorted && stream_ok && det_hash == final_hash
}

fn forward_batches<A: Algorithm>(algorithm: A, actions: &[A::Action]) -> Vec<CommandBatch> {
    let (mut recorder, setup) = ActionRecorder::new(algorithm);
    let mut batches = vec![setup];
    for action in actions {
        batches.push(recorder.record(action.clone()));
    }
    batches
}

fn replayed_hash<A: Algorithm, F: Fn() -> A>(make: F, actions: &[A::Action]) -> String {
    rebuild_hash(&forward_batches(make(), actions))
        .unwrap_or_else(|e| panic!("Protocol violation during replay: {}", e))
}

fn report(name: &str, ok: bool) {
    println!("  [{}] {}", if ok { "PASS" } else { "FAIL" }, name);
}
