mod lifecycle;
mod scoreboard;

pub use lifecycle::{GameTimer, LifecycleCoordinator, LifecycleEvent};
pub use scoreboard::Scoreboard;
