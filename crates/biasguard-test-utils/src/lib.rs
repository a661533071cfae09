//! Test helpers shared across BiasGuard crates.

pub mod patterns;
pub mod steps;

pub use patterns::sample_patterns;
pub use steps::{assistant_step, headache_conversation, user_step};
