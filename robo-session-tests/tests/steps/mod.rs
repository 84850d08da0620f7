mod lifecycle_steps;
mod relay_steps;
mod session_steps;
