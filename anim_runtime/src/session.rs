//! Session: one client algorithm bound to one orchestrator.
//!
//! The session is the only place both undo layers meet:
//!   1. orchestrator.undo(): visual reversal from captured UndoBlocks
//!   2. recorder.undo(): logical resync by silent replay
//!
//! The two histories advance in lockstep; any disagreement is a defect.

use log::info;

use anim_engine::hashing::canonical_hash;
use anim_engine::recorder::{ActionRecorder, Algorithm};
use anim_engine::world::World;

use crate::config::PlaybackConfig;
use crate::orchestrator::{AnimationEventKind, Listener, Orchestrator, PlaybackError};

pub struct Session<A: Algorithm> {
    orchestrator: Orchestrator,
    recorder: ActionRecorder<A>,
}

impl<A: Algorithm> Session<A> {
    /// Run the algorithm's setup, materialize it silently and make it the
    /// undo floor.
    pub fn new(algorithm: A, config: PlaybackConfig) -> Self {
        let (mut recorder, setup) = ActionRecorder::new(algorithm);
        let mut orchestrator = Orchestrator::new(config);
        orchestrator.start_new_animation(setup);
        orchestrator.skip_forward();
        orchestrator.clear_history();
        recorder.clear_history();
        info!(
            "session ready: {} objects, next id {}",
            orchestrator.world().len(),
            recorder.ids().peek()
        );
        Self {
            orchestrator,
            recorder,
        }
    }

    /// Record and start playing one action.
    pub fn implement_action(&mut self, action: A::Action) {
        self.recorder.implement_action(action, &mut self.orchestrator);
    }

    pub fn advance(&mut self) -> bool {
        self.orchestrator.advance()
    }

    pub fn skip_forward(&mut self) {
        self.orchestrator.skip_forward();
    }

    /// Undo the last action on both layers.
    ///
    /// `Ok(false)` when there is nothing to undo; `Err` while a batch is
    /// still playing (nothing changes in that case).
    pub fn undo(&mut self) -> Result<bool, PlaybackError> {
        if self.orchestrator.is_playing() {
            return self.orchestrator.undo();
        }
        let visual = self.orchestrator.undo_depth();
        let logical = self.recorder.history_len();
        if visual != logical {
            panic!(
                "Undo mismatch: {} visual logs but {} recorded actions",
                visual, logical
            );
        }
        if !self.orchestrator.undo()? {
            return Ok(false);
        }
        if !self.recorder.undo() {
            panic!("Undo mismatch: visual log reversed without a matching action");
        }
        Ok(true)
    }

    pub fn add_listener(&mut self, kind: AnimationEventKind, listener: Listener) {
        self.orchestrator.add_listener(kind, listener);
    }

    // ── accessors ──────────────────────────────────────────────────────

    pub fn world(&self) -> &World {
        self.orchestrator.world()
    }

    pub fn algorithm(&self) -> &A {
        self.recorder.algorithm()
    }

    pub fn orchestrator(&self) -> &Orchestrator {
        &self.orchestrator
    }

    pub fn recorder(&self) -> &ActionRecorder<A> {
        &self.recorder
    }

    pub fn history(&self) -> &[A::Action] {
        self.recorder.history()
    }

    pub fn history_len(&self) -> usize {
        self.recorder.history_len()
    }

    pub fn current_hash(&self) -> String {
        canonical_hash(self.orchestrator.world())
    }
}
