use crate::domain::ParticipantId;
use std::collections::HashMap;

/// Locally observed scores. Each participant keeps its own; there is no
/// merged leaderboard.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scoreboard {
    scores: HashMap<ParticipantId, u32>,
}

impl Scoreboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the latest known score for `id`
    pub fn record(&mut self, id: ParticipantId, score: u32) {
        self.scores.insert(id, score);
    }

    pub fn get(&self, id: &ParticipantId) -> Option<u32> {
        self.scores.get(id).copied()
    }

    /// Scores ordered best first, ties broken by id
    pub fn ranking(&self) -> Vec<(ParticipantId, u32)> {
        let mut ranking: Vec<(ParticipantId, u32)> = self
            .scores
            .iter()
            .map(|(id, score)| (id.clone(), *score))
            .collect();
        ranking.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranking
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    pub fn clear(&mut self) {
        self.scores.clear();
    }
}
