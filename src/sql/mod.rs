//! Assembling SQL from literal chunks and escaped values.

mod hazard;
pub mod template;

pub use template::*;
