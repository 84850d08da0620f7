//! Toy game simulation used to drive a session from the command line.

use robo_session_core::{EnemySyncState, PlayerState, Vec2};
use std::time::Duration;

/// Enemy flying a fixed circle
#[derive(Debug, Clone)]
pub struct Drone {
    id: String,
    center: Vec2,
    radius: f32,
    /// Radians per second
    angular_speed: f32,
    angle: f32,
    hp: f32,
}

impl Drone {
    pub fn new(id: impl Into<String>, center: Vec2, radius: f32) -> Self {
        Self {
            id: id.into(),
            center,
            radius,
            angular_speed: 1.0,
            angle: 0.0,
            hp: 40.0,
        }
    }

    pub fn step(&mut self, dt: Duration) {
        self.angle = (self.angle + self.angular_speed * dt.as_secs_f32()) % std::f32::consts::TAU;
    }

    pub fn position(&self) -> Vec2 {
        Vec2::new(
            self.center.x + self.radius * self.angle.cos(),
            self.center.y + self.radius * self.angle.sin(),
        )
    }

    pub fn state(&self) -> EnemySyncState {
        let position = self.position();
        EnemySyncState {
            id: self.id.clone(),
            x: position.x,
            y: position.y,
            hp: self.hp,
        }
    }
}

/// Avatar pacing between two x coordinates, scoring one point per 10 px
#[derive(Debug, Clone)]
pub struct Walker {
    state: PlayerState,
    speed: f32,
    min_x: f32,
    max_x: f32,
    distance: f32,
}

impl Walker {
    pub fn new(spawn: Vec2, speed: f32, span: f32) -> Self {
        let mut state = PlayerState::spawn(spawn);
        state.on_ground = true;
        state.velocity = Vec2::new(speed, 0.0);
        Self {
            state,
            speed,
            min_x: spawn.x,
            max_x: spawn.x + span,
            distance: 0.0,
        }
    }

    pub fn step(&mut self, dt: Duration) {
        let dx = self.state.velocity.x * dt.as_secs_f32();
        self.state.position.x += dx;
        self.distance += dx.abs();

        if self.state.position.x >= self.max_x {
            self.state.position.x = self.max_x;
            self.state.velocity.x = -self.speed;
            self.state.facing = std::f32::consts::PI;
        } else if self.state.position.x <= self.min_x {
            self.state.position.x = self.min_x;
            self.state.velocity.x = self.speed;
            self.state.facing = 0.0;
        }

        self.state.score = (self.distance / 10.0) as u32;
    }

    pub fn state(&self) -> &PlayerState {
        &self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drone_stays_on_circle() {
        let mut drone = Drone::new("d", Vec2::new(100.0, 100.0), 50.0);
        for _ in 0..37 {
            drone.step(Duration::from_millis(100));
            let p = drone.position();
            let r = ((p.x - 100.0).powi(2) + (p.y - 100.0).powi(2)).sqrt();
            assert!((r - 50.0).abs() < 0.01);
        }
        assert_eq!(drone.state().id, "d");
    }

    #[test]
    fn test_walker_turns_around() {
        let mut walker = Walker::new(Vec2::ZERO, 100.0, 50.0);
        walker.step(Duration::from_secs(1));

        assert_eq!(walker.state().position.x, 50.0);
        assert!(walker.state().velocity.x < 0.0);

        walker.step(Duration::from_millis(250));
        assert_eq!(walker.state().position.x, 25.0);
        assert_eq!(walker.state().score, 12);
    }
}
