pub mod demo;
pub mod simulation;

pub use demo::{run_demo, DemoOptions, DemoReport};
pub use simulation::{Drone, Walker};
