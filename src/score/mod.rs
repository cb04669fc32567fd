//! Rating of quality results.

pub mod rating;

pub use rating::{classify, generate_suggestions, rate, Rating};
