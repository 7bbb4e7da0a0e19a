//! Utilities shared by the shiritori workspace crates.

pub mod logger;
pub mod time;
