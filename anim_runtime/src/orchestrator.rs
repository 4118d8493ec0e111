//! Playback orchestrator.
//!
//! Owns the World. Plays command batches one Step-delimited segment at a
//! time, captures an UndoBlock for every mutating command, and keeps one
//! UndoBlock log per played batch so the last batch can be reversed
//! exactly.
//!
//! State machine: Idle -> Playing -> Ended; `undo()` is accepted only
//! when nothing is playing and reverses the newest log.

use std::collections::VecDeque;

use log::{debug, warn};
use thiserror::Error;

use anim_engine::command::{Command, CommandBatch, Opcode};
use anim_engine::ids::ObjectId;
use anim_engine::invariants::validate_world;
use anim_engine::recorder::AnimationSubmitter;
use anim_engine::undo::{reverse_all, UndoBlock};
use anim_engine::world::World;

use crate::config::PlaybackConfig;

// ---------------------------------------------------------------------------
// Events / listeners
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationEventKind {
    AnimationStarted,
    AnimationEnded,
    AnimationUndo,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnimationEvent {
    pub kind: AnimationEventKind,
    /// 1-based number of the batch the event belongs to.
    pub batch: u64,
}

pub type Listener = Box<dyn FnMut(&AnimationEvent)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Idle,
    Playing,
    Ended,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaybackError {
    #[error("undo rejected: batch {0} is still playing")]
    BatchInProgress(u64),
}

/// One object movement performed by the last played segment.
#[derive(Debug, Clone, PartialEq)]
pub struct MoveTransition {
    pub id: ObjectId,
    pub from: (f64, f64),
    pub to: (f64, f64),
}

impl MoveTransition {
    /// Linear position at `t` in [0, 1].
    pub fn position_at(&self, t: f64) -> (f64, f64) {
        let t = t.clamp(0.0, 1.0);
        (
            self.from.0 + (self.to.0 - self.from.0) * t,
            self.from.1 + (self.to.1 - self.from.1) * t,
        )
    }
}

struct ActiveBatch {
    number: u64,
    segments: VecDeque<Vec<Command>>,
    log: Vec<UndoBlock>,
}

// ---------------------------------------------------------------------------
// Orchestrator
// ---------------------------------------------------------------------------

pub struct Orchestrator {
    world: World,
    config: PlaybackConfig,
    state: PlaybackState,
    active: Option<ActiveBatch>,
    /// One log per completed batch, oldest first.
    /// (batch number, log) per completed batch.
    undo_stack: Vec<(u64, Vec<UndoBlock>)>,
    listeners: Vec<(AnimationEventKind, Listener)>,
    last_moves: Vec<MoveTransition>,
    batches_started: u64,
}

impl Orchestrator {
    pub fn new(config: PlaybackConfig) -> Self {
        Self {
            world: World::new(),
            config,
            state: PlaybackState::Idle,
            active: None,
            undo_stack: Vec::new(),
            listeners: Vec::new(),
            last_moves: Vec::new(),
            batches_started: 0,
        }
    }

    pub fn add_listener(&mut self, kind: AnimationEventKind, listener: Listener) {
        self.listeners.push((kind, listener));
    }

    fn fire(&mut self, kind: AnimationEventKind, batch: u64) {
        let event = AnimationEvent { kind, batch };
        for (k, listener) in self.listeners.iter_mut() {
            if *k == kind {
                listener(&event);
            }
        }
    }

    /// Begin playing `batch`. A batch still in flight is completed first,
    /// without pausing.
    pub fn start_new_animation(&mut self, batch: CommandBatch) {
        if self.active.is_some() {
            debug!("finishing batch {} before starting a new one", self.batches_started);
            self.skip_forward();
        }
        self.batches_started += 1;
        let number = self.batches_started;
        let segments: VecDeque<Vec<Command>> =
            batch.segments().into_iter().map(|s| s.to_vec()).collect();
        debug!(
            "batch {} started: {} commands in {} segments",
            number,
            batch.len(),
            segments.len()
        );
        self.active = Some(ActiveBatch {
            number,
            segments,
            log: Vec::new(),
        });
        self.state = PlaybackState::Playing;
        self.last_moves.clear();
        self.fire(AnimationEventKind::AnimationStarted, number);

        if self.config.step_mode {
            self.play_segment();
        } else {
            self.skip_forward();
        }
    }

    /// Play the next segment (step mode) or everything left.
    /// Returns false when nothing was pending.
    pub fn advance(&mut self) -> bool {
        if self.active.is_none() {
            return false;
        }
        if self.config.step_mode {
            self.play_segment();
        } else {
            self.skip_forward();
        }
        true
    }

    /// Play every pending segment of the current batch immediately.
    pub fn skip_forward(&mut self) {
        while self.active.is_some() {
            self.play_segment();
        }
    }

    fn play_segment(&mut self) {
        let Some(active) = self.active.as_mut() else {
            return;
        };
        let mut moves = Vec::new();
        if let Some(segment) = active.segments.pop_front() {
            for cmd in &segment {
                let before = if cmd.opcode() == Opcode::Move {
                    cmd.id(0)
                        .ok()
                        .and_then(|id| self.world.object(id))
                        .map(|o| (o.id, (o.x, o.y)))
                } else {
                    None
                };
                let block = self.world.apply(cmd).unwrap_or_else(|e| {
                    panic!("Protocol violation in batch {}: {}", active.number, e)
                });
                if let Some(block) = block {
                    active.log.push(block);
                }
                if let Some((id, from)) = before {
                    if let Some(obj) = self.world.object(id) {
                        moves.push(MoveTransition {
                            id,
                            from,
                            to: (obj.x, obj.y),
                        });
                    }
                }
            }
            debug!(
                "batch {}: segment played ({} commands, {} left)",
                active.number,
                segment.len(),
                active.segments.len()
            );
            if self.config.validate_each_segment {
                validate_world(&self.world);
            }
        }
        self.last_moves = moves;
        if active.segments.is_empty() {
            self.finish_active();
        }
    }

    fn finish_active(&mut self) {
        if let Some(active) = self.active.take() {
            self.undo_stack.push((active.number, active.log));
            self.state = PlaybackState::Ended;
            self.fire(AnimationEventKind::AnimationEnded, active.number);
        }
    }

    /// Forget every undo log. The current scene becomes the floor.
    pub fn clear_history(&mut self) {
        self.skip_forward();
        self.undo_stack.clear();
        self.state = PlaybackState::Idle;
    }

    /// Reverse the newest completed batch.
    ///
    /// `Ok(false)` when there is nothing to reverse.
    pub fn undo(&mut self) -> Result<bool, PlaybackError> {
        if let Some(active) = &self.active {
            warn!("undo rejected while batch {} is playing", active.number);
            return Err(PlaybackError::BatchInProgress(active.number));
        }
        let Some((number, log)) = self.undo_stack.pop() else {
            return Ok(false);
        };
        debug!("reversing {} undo blocks", log.len());
        reverse_all(log, &mut self.world);
        if self.config.validate_each_segment {
            validate_world(&self.world);
        }
        self.last_moves.clear();
        self.state = PlaybackState::Idle;
        self.fire(AnimationEventKind::AnimationUndo, number);
        Ok(true)
    }

    // ── accessors ──────────────────────────────────────────────────────

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.active.is_some()
    }

    pub fn pending_segments(&self) -> usize {
        self.active.as_ref().map_or(0, |a| a.segments.len())
    }

    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn config(&self) -> &PlaybackConfig {
        &self.config
    }

    /// Moves performed by the most recently played segment.
    pub fn last_moves(&self) -> &[MoveTransition] {
        &self.last_moves
    }

    /// Where a renderer should draw `id` at `frame` of the last segment's
    /// transition. `None` if `id` did not move.
    pub fn interpolated_position(&self, id: ObjectId, frame: u32) -> Option<(f64, f64)> {
        let t = frame as f64 / self.config.frames_per_step.max(1) as f64;
        self.last_moves
            .iter()
            .rev()
            .find(|m| m.id == id)
            .map(|m| m.position_at(t))
    }
}

impl AnimationSubmitter for Orchestrator {
    fn start_new_animation(&mut self, batch: CommandBatch) {
        Orchestrator::start_new_animation(self, batch);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anim_engine::operands;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn scenario_a() -> CommandBatch {
        CommandBatch::from(vec![
            Command::new(Opcode::CreateRectangle, operands![1, "A", 50, 50, 10, 10]),
            Command::step(),
            Command::new(Opcode::SetText, operands![1, "B"]),
            Command::step(),
        ])
    }

    fn recorder(orch: &mut Orchestrator) -> Rc<RefCell<Vec<AnimationEvent>>> {
        let seen = Rc::new(RefCell::new(Vec::new()));
        for kind in [
            AnimationEventKind::AnimationStarted,
            AnimationEventKind::AnimationEnded,
            AnimationEventKind::AnimationUndo,
        ] {
            let sink = Rc::clone(&seen);
            orch.add_listener(
                kind,
                Box::new(move |e: &AnimationEvent| sink.borrow_mut().push(e.clone())),
            );
        }
        seen
    }

    #[test]
    fn test_step_mode_pauses_at_barriers() {
        let mut orch = Orchestrator::new(PlaybackConfig::stepping());
        orch.start_new_animation(scenario_a());
        assert_eq!(orch.state(), PlaybackState::Playing);
        assert_eq!(orch.world().object(ObjectId(1)).unwrap().text(0), Some("A"));
        assert!(orch.advance());
        assert_eq!(orch.state(), PlaybackState::Ended);
        assert_eq!(orch.world().object(ObjectId(1)).unwrap().text(0), Some("B"));
        assert!(!orch.advance());
    }

    #[test]
    fn test_events_fire_in_order() {
        let mut orch = Orchestrator::new(PlaybackConfig::default());
        let seen = recorder(&mut orch);
        orch.start_new_animation(scenario_a());
        orch.undo().unwrap();
        let kinds: Vec<_> = seen.borrow().iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![
                AnimationEventKind::AnimationStarted,
                AnimationEventKind::AnimationEnded,
                AnimationEventKind::AnimationUndo,
            ]
        );
    }

    #[test]
    fn test_undo_rejected_while_playing() {
        let mut orch = Orchestrator::new(PlaybackConfig::stepping());
        orch.start_new_animation(scenario_a());
        assert_eq!(orch.undo(), Err(PlaybackError::BatchInProgress(1)));
        orch.skip_forward();
        assert_eq!(orch.undo(), Ok(true));
        assert!(orch.world().is_empty());
        assert_eq!(orch.undo(), Ok(false));
    }

    #[test]
    fn test_new_batch_completes_previous() {
        let mut orch = Orchestrator::new(PlaybackConfig::stepping());
        orch.start_new_animation(scenario_a());
        orch.start_new_animation(CommandBatch::from(vec![Command::new(
            Opcode::Move,
            operands![1, 100, 10],
        )]));
        assert_eq!(orch.undo_depth(), 2);
        assert_eq!(orch.world().object(ObjectId(1)).unwrap().text(0), Some("B"));
        orch.undo().unwrap();
        assert_eq!(orch.world().object(ObjectId(1)).unwrap().x, 10.0);
    }

    #[test]
    fn test_empty_batch_still_logs() {
        let mut orch = Orchestrator::new(PlaybackConfig::default());
        orch.start_new_animation(CommandBatch::new());
        assert_eq!(orch.state(), PlaybackState::Ended);
        assert_eq!(orch.undo_depth(), 1);
        assert_eq!(orch.undo(), Ok(true));
    }

    #[test]
    fn test_clear_history_drops_logs() {
        let mut orch = Orchestrator::new(PlaybackConfig::default());
        orch.start_new_animation(scenario_a());
        orch.clear_history();
        assert_eq!(orch.undo(), Ok(false));
        assert!(orch.world().object(ObjectId(1)).is_some());
    }

    #[test]
    fn test_moves_are_interpolated() {
        let mut orch = Orchestrator::new(PlaybackConfig {
            frames_per_step: 10,
            ..PlaybackConfig::stepping()
        });
        orch.start_new_animation(CommandBatch::from(vec![
            Command::new(Opcode::CreateLabel, operands![3, "x", 0, 0]),
            Command::step(),
            Command::new(Opcode::Move, operands![3, 100, 50]),
            Command::step(),
        ]));
        assert!(orch.last_moves().is_empty());
        orch.advance();
        assert_eq!(orch.interpolated_position(ObjectId(3), 5), Some((50.0, 25.0)));
        assert_eq!(orch.interpolated_position(ObjectId(3), 20), Some((100.0, 50.0)));
        assert_eq!(orch.interpolated_position(ObjectId(4), 5), None);
    }
}
