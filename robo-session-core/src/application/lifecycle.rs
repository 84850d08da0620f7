use crate::application::scoreboard::Scoreboard;
use crate::domain::{MessagePayload, NetworkMessage, ParticipantId};
use crate::replication::{PausableClock, Vec2};

/// Match countdown measured on the pausable game clock
#[derive(Debug, Clone, PartialEq)]
pub struct GameTimer {
    duration_ms: u64,
    started_at: Option<u64>,
}

impl GameTimer {
    pub fn new(duration_ms: u64) -> Self {
        Self {
            duration_ms,
            started_at: None,
        }
    }

    pub fn start(&mut self, now: u64) {
        self.started_at = Some(now);
    }

    pub fn stop(&mut self) {
        self.started_at = None;
    }

    pub fn is_running(&self) -> bool {
        self.started_at.is_some()
    }

    pub fn remaining_ms(&self, now: u64) -> Option<u64> {
        self.started_at
            .map(|start| self.duration_ms.saturating_sub(now.saturating_sub(start)))
    }

    pub fn is_expired(&self, now: u64) -> bool {
        self.remaining_ms(now) == Some(0)
    }
}

/// Observable outcome of applying a lifecycle-relevant message
#[derive(Debug, Clone, PartialEq)]
pub enum LifecycleEvent {
    PauseChanged { paused: bool },
    GameStarted { spawn: Vec2 },
    ScoreRecorded { id: ParticipantId, score: u32 },
}

/// Pause state, match timer and scores of one participant
#[derive(Debug, Clone)]
pub struct LifecycleCoordinator {
    local_id: Option<ParticipantId>,
    clock: PausableClock,
    timer: GameTimer,
    scoreboard: Scoreboard,
    local_score: u32,
    spawn: Option<Vec2>,
    ended: bool,
}

impl LifecycleCoordinator {
    pub fn new(clock: PausableClock, game_duration_ms: u64) -> Self {
        Self {
            local_id: None,
            clock,
            timer: GameTimer::new(game_duration_ms),
            scoreboard: Scoreboard::new(),
            local_score: 0,
            spawn: None,
            ended: false,
        }
    }

    pub fn set_local_id(&mut self, id: Option<ParticipantId>) {
        self.local_id = id;
    }

    /// Game time in milliseconds (frozen while paused)
    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    pub fn clock(&self) -> &PausableClock {
        &self.clock
    }

    pub fn is_paused(&self) -> bool {
        self.clock.is_paused()
    }

    pub fn is_running(&self) -> bool {
        self.timer.is_running() && !self.ended
    }

    pub fn has_ended(&self) -> bool {
        self.ended
    }

    pub fn remaining_ms(&self) -> Option<u64> {
        self.timer.remaining_ms(self.clock.now_ms())
    }

    pub fn spawn_point(&self) -> Option<Vec2> {
        self.spawn
    }

    pub fn scoreboard(&self) -> &Scoreboard {
        &self.scoreboard
    }

    pub fn local_score(&self) -> u32 {
        self.local_score
    }

    pub fn set_local_score(&mut self, score: u32) {
        self.local_score = score;
        if let Some(id) = &self.local_id {
            self.scoreboard.record(id.clone(), score);
        }
    }

    /// Payload that flips the current pause state
    pub fn pause_toggle(&self) -> MessagePayload {
        MessagePayload::PauseToggle {
            paused: !self.is_paused(),
        }
    }

    /// Apply a delivered message
    pub fn apply(&mut self, msg: &NetworkMessage) -> Option<LifecycleEvent> {
        match msg.payload() {
            MessagePayload::PauseToggle { paused } => {
                if *paused == self.is_paused() {
                    return None;
                }
                self.clock.set_paused(*paused);
                tracing::info!(
                    "{} Game {} by {}",
                    if *paused { "⏸️" } else { "▶️" },
                    if *paused { "paused" } else { "resumed" },
                    msg.sender_id()
                );
                Some(LifecycleEvent::PauseChanged { paused: *paused })
            }
            MessagePayload::GameStart { spawn } => {
                self.start(*spawn);
                tracing::info!("🏁 Game started by {}", msg.sender_id());
                Some(LifecycleEvent::GameStarted { spawn: *spawn })
            }
            MessagePayload::GameEnd { score } => {
                Some(self.record(msg.sender_id().clone(), *score))
            }
            MessagePayload::PlayerDied { id, score } => Some(self.record(id.clone(), *score)),
            MessagePayload::PlayerUpdate(delta) => delta
                .score
                .map(|score| self.record(msg.sender_id().clone(), score)),
            _ => None,
        }
    }

    /// Advance the match timer; yields `GAME_END` exactly once on expiry
    pub fn tick(&mut self) -> Option<MessagePayload> {
        if self.ended || !self.timer.is_expired(self.clock.now_ms()) {
            return None;
        }

        self.ended = true;
        if let Some(id) = &self.local_id {
            self.scoreboard.record(id.clone(), self.local_score);
        }
        tracing::info!("⏱️ Game timer expired, final score {}", self.local_score);

        Some(MessagePayload::GameEnd {
            score: self.local_score,
        })
    }

    /// Forget the current match (session closed)
    pub fn reset(&mut self) {
        self.clock.resume();
        self.timer.stop();
        self.scoreboard.clear();
        self.local_score = 0;
        self.spawn = None;
        self.ended = false;
    }

    fn start(&mut self, spawn: Vec2) {
        self.reset();
        self.spawn = Some(spawn);
        self.timer.start(self.clock.now_ms());
    }

    fn record(&mut self, id: ParticipantId, score: u32) -> LifecycleEvent {
        tracing::debug!("🏆 Score {} for {}", score, id);
        self.scoreboard.record(id.clone(), score);
        LifecycleEvent::ScoreRecorded { id, score }
    }
}
