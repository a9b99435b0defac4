//! Utility modules: aligned buffers and timing

pub mod buffer;
pub mod time;
