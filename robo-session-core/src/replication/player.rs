use crate::replication::geometry::Vec2;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Detachable robot body parts
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LimbType {
    LeftArm,
    RightArm,
    LeftLeg,
    RightLeg,
    Torso,
    Head,
}

impl LimbType {
    pub const ALL: [LimbType; 6] = [
        LimbType::LeftArm,
        LimbType::RightArm,
        LimbType::LeftLeg,
        LimbType::RightLeg,
        LimbType::Torso,
        LimbType::Head,
    ];

    /// Hit points of a fresh limb
    pub fn max_hp(self) -> f32 {
        match self {
            LimbType::LeftArm | LimbType::RightArm => 50.0,
            LimbType::LeftLeg | LimbType::RightLeg => 75.0,
            LimbType::Torso => 100.0,
            LimbType::Head => 50.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct LimbState {
    pub hp: f32,
    pub exists: bool,
}

impl LimbState {
    pub fn full(limb: LimbType) -> Self {
        Self {
            hp: limb.max_hp(),
            exists: true,
        }
    }
}

/// Full avatar state, as simulated locally or reconstructed from deltas
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerState {
    pub position: Vec2,
    pub velocity: Vec2,
    /// Facing angle in radians
    pub facing: f32,
    pub on_ground: bool,
    pub limbs: BTreeMap<LimbType, LimbState>,
    pub score: u32,
}

impl PlayerState {
    /// Fresh avatar at full health
    pub fn spawn(position: Vec2) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            facing: 0.0,
            on_ground: false,
            limbs: LimbType::ALL
                .iter()
                .map(|&limb| (limb, LimbState::full(limb)))
                .collect(),
            score: 0,
        }
    }

    pub fn limb(&self, limb: LimbType) -> Option<&LimbState> {
        self.limbs.get(&limb)
    }

    /// Merge a received delta; absent fields are left untouched
    pub fn apply_delta(&mut self, delta: &PlayerDelta) {
        self.position = Vec2::new(delta.x, delta.y);
        self.velocity = Vec2::new(delta.vx, delta.vy);

        if let Some(facing) = delta.facing {
            self.facing = facing;
        }
        if let Some(on_ground) = delta.on_ground {
            self.on_ground = on_ground;
        }
        if let Some(score) = delta.score {
            self.score = score;
        }

        if let Some(limbs) = &delta.limbs {
            for (limb, change) in limbs {
                let state = self
                    .limbs
                    .entry(*limb)
                    .or_insert_with(|| LimbState::full(*limb));
                if let Some(hp) = change.hp {
                    state.hp = hp;
                }
                if let Some(exists) = change.exists {
                    state.exists = exists;
                }
            }
        }
    }

    /// Build a remote replica from its first delta
    pub fn from_delta(delta: &PlayerDelta) -> Self {
        let mut state = Self::spawn(Vec2::new(delta.x, delta.y));
        state.apply_delta(delta);
        state
    }
}

impl Default for PlayerState {
    fn default() -> Self {
        Self::spawn(Vec2::ZERO)
    }
}

/// Changed fields of one limb
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct LimbDelta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hp: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exists: Option<bool>,
}

impl LimbDelta {
    fn is_empty(&self) -> bool {
        self.hp.is_none() && self.exists.is_none()
    }
}

/// `PLAYER_UPDATE` payload.
///
/// Position and velocity are always present, everything else only when it
/// differs from what the sender last published.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlayerDelta {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facing: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_ground: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limbs: Option<BTreeMap<LimbType, LimbDelta>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<u32>,
}

impl PlayerDelta {
    /// Delta carrying every field of `state`
    pub fn full(state: &PlayerState) -> Self {
        Self {
            x: state.position.x,
            y: state.position.y,
            vx: state.velocity.x,
            vy: state.velocity.y,
            facing: Some(state.facing),
            on_ground: Some(state.on_ground),
            limbs: Some(
                state
                    .limbs
                    .iter()
                    .map(|(limb, s)| {
                        (
                            *limb,
                            LimbDelta {
                                hp: Some(s.hp),
                                exists: Some(s.exists),
                            },
                        )
                    })
                    .collect(),
            ),
            score: Some(state.score),
        }
    }
}

/// Sender-side record of the last published avatar state
#[derive(Debug, Clone, Default)]
pub struct DeltaBaseline {
    last_sent: Option<PlayerState>,
}

impl DeltaBaseline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Encode `current` against the baseline without committing it
    pub fn encode(&self, current: &PlayerState) -> PlayerDelta {
        let Some(prev) = &self.last_sent else {
            return PlayerDelta::full(current);
        };

        let mut delta = PlayerDelta {
            x: current.position.x,
            y: current.position.y,
            vx: current.velocity.x,
            vy: current.velocity.y,
            facing: None,
            on_ground: None,
            limbs: None,
            score: None,
        };

        if current.facing != prev.facing {
            delta.facing = Some(current.facing);
        }
        if current.on_ground != prev.on_ground {
            delta.on_ground = Some(current.on_ground);
        }
        if current.score != prev.score {
            delta.score = Some(current.score);
        }

        let mut limbs = BTreeMap::new();
        for (limb, state) in &current.limbs {
            let before = prev.limbs.get(limb);
            let mut change = LimbDelta::default();

            if before.map(|b| b.hp) != Some(state.hp) {
                change.hp = Some(state.hp);
            }
            if before.map(|b| b.exists) != Some(state.exists) {
                change.exists = Some(state.exists);
            }

            if !change.is_empty() {
                limbs.insert(*limb, change);
            }
        }
        if !limbs.is_empty() {
            delta.limbs = Some(limbs);
        }

        delta
    }

    /// Record `current` as sent
    pub fn commit(&mut self, current: &PlayerState) {
        self.last_sent = Some(current.clone());
    }

    /// Forget the baseline; the next encode carries every field
    pub fn reset(&mut self) {
        self.last_sent = None;
    }

    pub fn is_empty(&self) -> bool {
        self.last_sent.is_none()
    }
}
