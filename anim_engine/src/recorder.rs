//! ActionRecorder: turns algorithm execution into command batches and
//! implements logical undo by deterministic replay.
//!
//! A client algorithm implements [`Algorithm`]. Each user-triggered
//! operation is an `Action` value (the enum variant is the operation, its
//! payload the parameter). The recorder keeps the ordered history of those
//! values plus the id watermark reached after each one, so that
//! `reset` + replay can be checked against the original forward run.
//!
//! Replay is not reentrant by construction: `perform` only receives the
//! algorithm and an [`ActionContext`], never the recorder.

use std::fmt;

use log::debug;

use crate::command::{Command, CommandBatch, Opcode, Operand};
use crate::ids::{IdAllocator, ObjectId};

// ---------------------------------------------------------------------------
// Recording mode / context
// ---------------------------------------------------------------------------

/// Whether `cmd` calls reach the batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordingMode {
    Record,
    /// Replay: algorithm-local state still changes, no commands are kept.
    Silent,
}

/// Everything an action body may touch besides its own algorithm state.
pub struct ActionContext<'a> {
    mode: RecordingMode,
    ids: &'a mut IdAllocator,
    batch: CommandBatch,
}

impl<'a> ActionContext<'a> {
    pub fn new(mode: RecordingMode, ids: &'a mut IdAllocator) -> Self {
        Self {
            mode,
            ids,
            batch: CommandBatch::new(),
        }
    }

    pub fn mode(&self) -> RecordingMode {
        self.mode
    }

    pub fn is_recording(&self) -> bool {
        self.mode == RecordingMode::Record
    }

    /// Append a command; a no-op in `Silent` mode.
    pub fn cmd(&mut self, opcode: Opcode, operands: Vec<Operand>) {
        if self.is_recording() {
            self.batch.push(Command::new(opcode, operands));
        }
    }

    /// Animation barrier.
    pub fn step(&mut self) {
        self.cmd(Opcode::Step, Vec::new());
    }

    /// Next object id. Allocation happens in both modes.
    pub fn alloc(&mut self) -> ObjectId {
        self.ids.allocate()
    }

    pub fn ids(&self) -> &IdAllocator {
        &*self.ids
    }

    /// Commands recorded so far.
    pub fn batch(&self) -> &CommandBatch {
        &self.batch
    }

    pub fn finish(self) -> CommandBatch {
        self.batch
    }
}

// ---------------------------------------------------------------------------
// Client / orchestrator seams
// ---------------------------------------------------------------------------

/// A client algorithm driven through the recorder.
///
/// `perform` must be a deterministic function of the algorithm state, the
/// action and the ids it allocates. Randomness is chosen by the caller and
/// stored inside the action value.
pub trait Algorithm {
    type Action: Clone + fmt::Debug;

    /// Build the initial scene. Runs once, recorded.
    fn setup(&mut self, ctx: &mut ActionContext<'_>);

    fn perform(&mut self, action: &Self::Action, ctx: &mut ActionContext<'_>);

    /// Restore all bookkeeping to its state right after `setup`.
    /// Id counters are rewound by the recorder.
    fn reset(&mut self);
}

/// Whatever plays batches; implemented by the runtime orchestrator.
pub trait AnimationSubmitter {
    fn start_new_animation(&mut self, batch: CommandBatch);
}

// ---------------------------------------------------------------------------
// ActionRecorder
// ---------------------------------------------------------------------------

pub struct ActionRecorder<A: Algorithm> {
    algorithm: A,
    ids: IdAllocator,
    history: Vec<A::Action>,
    /// `ids.peek()` after each history entry.
    watermarks: Vec<u32>,
    /// Entries below this index were cleared: still replayed, never undone.
    floor: usize,
}

impl<A: Algorithm> ActionRecorder<A> {
    /// Run `setup` once and fix the id baseline. Returns the setup batch
    /// for the caller to play.
    pub fn new(mut algorithm: A) -> (Self, CommandBatch) {
        let mut ids = IdAllocator::new();
        let batch = {
            let mut ctx = ActionContext::new(RecordingMode::Record, &mut ids);
            algorithm.setup(&mut ctx);
            ctx.finish()
        };
        ids.mark_initial();
        debug!("recorder setup: {} commands, id baseline {}", batch.len(), ids.initial());
        let recorder = Self {
            algorithm,
            ids,
            history: Vec::new(),
            watermarks: Vec::new(),
            floor: 0,
        };
        (recorder, batch)
    }

    /// Record `action`, run it, and hand the resulting batch to `submitter`.
    pub fn implement_action(&mut self, action: A::Action, submitter: &mut impl AnimationSubmitter) {
        let batch = self.record(action);
        submitter.start_new_animation(batch);
    }

    /// Same as `implement_action` but returns the batch instead of submitting it.
    pub fn record(&mut self, action: A::Action) -> CommandBatch {
        let batch = {
            let mut ctx = ActionContext::new(RecordingMode::Record, &mut self.ids);
            self.algorithm.perform(&action, &mut ctx);
            ctx.finish()
        };
        debug!("action {:?}: {} commands", action, batch.len());
        self.history.push(action);
        self.watermarks.push(self.ids.peek().0);
        batch
    }

    /// Drop the last undoable action and resynchronize bookkeeping by
    /// silent replay. Returns false when there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        if self.history.len() <= self.floor {
            return false;
        }
        let popped = self.history.pop();
        self.watermarks.pop();
        debug!("undo {:?}", popped);
        self.replay(RecordingMode::Silent);
        true
    }

    /// Make everything performed so far permanent.
    pub fn clear_history(&mut self) {
        self.floor = self.history.len();
    }

    /// Reset, then re-perform every recorded action in order.
    ///
    /// Panics if the id allocation sequence differs from the forward run.
    /// In `Silent` mode the returned batches are all empty.
    pub fn replay(&mut self, mode: RecordingMode) -> Vec<CommandBatch> {
        self.reset();
        debug!("replaying {} actions ({:?})", self.history.len(), mode);
        let mut batches = Vec::with_capacity(self.history.len());
        for (index, action) in self.history.iter().enumerate() {
            let mut ctx = ActionContext::new(mode, &mut self.ids);
            self.algorithm.perform(action, &mut ctx);
            batches.push(ctx.finish());
            let reached = self.ids.peek().0;
            if reached != self.watermarks[index] {
                panic!(
                    "Determinism violation: replay of action #{} ({:?}) left next id at {}, \
                     forward run left it at {}",
                    index, action, reached, self.watermarks[index]
                );
            }
        }
        batches
    }

    fn reset(&mut self) {
        self.ids.reset();
        self.algorithm.reset();
    }

    // ── accessors ──────────────────────────────────────────────────────

    pub fn algorithm(&self) -> &A {
        &self.algorithm
    }

    /// Undoable actions, oldest first.
    pub fn history(&self) -> &[A::Action] {
        &self.history[self.floor..]
    }

    pub fn history_len(&self) -> usize {
        self.history.len() - self.floor
    }

    /// Every action since setup, including cleared ones.
    pub fn full_history(&self) -> &[A::Action] {
        &self.history
    }

    pub fn ids(&self) -> &IdAllocator {
        &self.ids
    }

    pub fn watermarks(&self) -> &[u32] {
        &self.watermarks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operands;

    /// Appends labels; keeps a count of how many exist.
    #[derive(Default)]
    struct Counter {
        labels: Vec<ObjectId>,
        title: Option<ObjectId>,
    }

    #[derive(Debug, Clone, PartialEq)]
    enum CounterAction {
        Add(String),
        Clear,
    }

    impl Algorithm for Counter {
        type Action = CounterAction;

        fn setup(&mut self, ctx: &mut ActionContext<'_>) {
            let id = ctx.alloc();
            self.title = Some(id);
            ctx.cmd(Opcode::CreateLabel, operands![id, "counter", 10, 10]);
        }

        fn perform(&mut self, action: &CounterAction, ctx: &mut ActionContext<'_>) {
            match action {
                CounterAction::Add(text) => {
                    let id = ctx.alloc();
                    ctx.cmd(Opcode::CreateLabel, operands![id, text, 10, 30]);
                    ctx.step();
                    self.labels.push(id);
                }
                CounterAction::Clear => {
                    for id in self.labels.drain(..) {
                        ctx.cmd(Opcode::Delete, operands![id]);
                    }
                }
            }
        }

        fn reset(&mut self) {
            self.labels.clear();
        }
    }

    #[derive(Default)]
    struct Collect(Vec<CommandBatch>);

    impl AnimationSubmitter for Collect {
        fn start_new_animation(&mut self, batch: CommandBatch) {
            self.0.push(batch);
        }
    }

    #[test]
    fn test_setup_batch_and_baseline() {
        let (rec, setup) = ActionRecorder::new(Counter::default());
        assert_eq!(setup.len(), 1);
        assert_eq!(rec.ids().initial(), ObjectId(1));
        assert_eq!(rec.history_len(), 0);
    }

    #[test]
    fn test_silent_context_drops_commands_but_allocates() {
        let mut ids = IdAllocator::new();
        let mut ctx = ActionContext::new(RecordingMode::Silent, &mut ids);
        let id = ctx.alloc();
        ctx.cmd(Opcode::CreateLabel, operands![id, "x", 0, 0]);
        ctx.step();
        assert!(ctx.finish().is_empty());
        assert_eq!(ids.peek(), ObjectId(1));
    }

    #[test]
    fn test_implement_action_submits_batch() {
        let (mut rec, _) = ActionRecorder::new(Counter::default());
        let mut sink = Collect::default();
        rec.implement_action(CounterAction::Add("a".into()), &mut sink);
        assert_eq!(sink.0.len(), 1);
        assert_eq!(sink.0[0].len(), 2);
        assert_eq!(rec.history(), &[CounterAction::Add("a".into())]);
        assert_eq!(rec.watermarks(), &[2]);
    }

    #[test]
    fn test_undo_truncates_and_resyncs() {
        let (mut rec, _) = ActionRecorder::new(Counter::default());
        let mut sink = Collect::default();
        rec.implement_action(CounterAction::Add("a".into()), &mut sink);
        rec.implement_action(CounterAction::Add("b".into()), &mut sink);
        assert!(rec.undo());
        assert_eq!(rec.history(), &[CounterAction::Add("a".into())]);
        assert_eq!(rec.algorithm().labels, vec![ObjectId(1)]);
        assert_eq!(rec.ids().peek(), ObjectId(2));

        // Re-invoking reproduces the same ids and commands.
        rec.implement_action(CounterAction::Add("b".into()), &mut sink);
        assert_eq!(sink.0[1], sink.0[2]);
    }

    #[test]
    fn test_undo_on_empty_history_is_noop() {
        let (mut rec, _) = ActionRecorder::new(Counter::default());
        assert!(!rec.undo());
        assert_eq!(rec.ids().peek(), ObjectId(1));
    }

    #[test]
    fn test_clear_history_blocks_undo_but_keeps_state() {
        let (mut rec, _) = ActionRecorder::new(Counter::default());
        let mut sink = Collect::default();
        rec.implement_action(CounterAction::Add("a".into()), &mut sink);
        rec.clear_history();
        rec.implement_action(CounterAction::Add("b".into()), &mut sink);
        assert!(rec.undo());
        assert!(!rec.undo());
        assert_eq!(rec.algorithm().labels, vec![ObjectId(1)]);
        assert_eq!(rec.full_history().len(), 1);
    }

    #[test]
    fn test_recorded_replay_reproduces_batches() {
        let (mut rec, _) = ActionRecorder::new(Counter::default());
        let mut sink = Collect::default();
        rec.implement_action(CounterAction::Add("a".into()), &mut sink);
        rec.implement_action(CounterAction::Clear, &mut sink);
        rec.implement_action(CounterAction::Add("c".into()), &mut sink);
        assert_eq!(rec.replay(RecordingMode::Record), sink.0);
    }

    /// Allocates a different number of ids on every call.
    struct Drifting {
        calls: u32,
    }

    impl Algorithm for Drifting {
        type Action = ();
        fn setup(&mut self, _ctx: &mut ActionContext<'_>) {}
        fn perform(&mut self, _action: &(), ctx: &mut ActionContext<'_>) {
            self.calls += 1;
            for _ in 0..self.calls {
                ctx.alloc();
            }
        }
        fn reset(&mut self) {}
    }

    #[test]
    #[should_panic(expected = "Determinism violation")]
    fn test_nondeterministic_body_panics_on_undo() {
        let (mut rec, _) = ActionRecorder::new(Drifting { calls: 0 });
        let mut sink = Collect::default();
        rec.implement_action((), &mut sink);
        rec.implement_action((), &mut sink);
        rec.undo();
    }
}
