// src/audience/mod.rs
pub mod overlap;

pub use overlap::{analyze_overlap, Audience, OverlapResult};
