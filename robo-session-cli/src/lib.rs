pub mod application;
pub mod infrastructure;

pub use application::{run_demo, DemoOptions, DemoReport};
pub use infrastructure::{CliError, LogConfig, Result};
