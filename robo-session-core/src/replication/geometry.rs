use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// 2D world-space vector
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Linear interpolation, `t` clamped to `[0, 1]`. Lands on `target`
    /// exactly at `t >= 1`.
    pub fn lerp(self, target: Vec2, t: f32) -> Vec2 {
        if t >= 1.0 {
            return target;
        }
        let t = t.max(0.0);
        Vec2 {
            x: self.x + (target.x - self.x) * t,
            y: self.y + (target.y - self.y) * t,
        }
    }
}
