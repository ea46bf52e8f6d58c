//! Trajectory storage between learning updates.

pub mod trajectory_buffer;

pub use trajectory_buffer::{TrajectoryBuffer, TrajectoryEntry};
