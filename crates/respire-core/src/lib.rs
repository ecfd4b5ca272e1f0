//! Respire core domain: windowed breath-state detection, sample sources, and replay.

pub mod config;
pub mod detector;
pub mod domain;
pub mod replay;
pub mod source;
pub mod validation;

pub use config::*;
pub use detector::*;
pub use domain::*;
pub use replay::*;
pub use source::*;
pub use validation::*;

#[cfg(test)]
mod tests_detector;
