//! blklat - Instant block device latency measurement tool
//!
//! blklat issues one unbuffered, fixed-size read or write at a time against a raw
//! block device and prints the mean per-operation latency once per interval.
//!
//! # Architecture
//!
//! - **Target**: the block device, opened `O_DIRECT | O_SYNC` and owned for the whole run
//! - **Engine**: performs and times one operation, folds the result into the accumulator
//! - **Stats**: the interval accumulator and the iteration budget
//! - **Output**: the simple and verbose report line formats
//! - **Worker**: the main loop polling the interval timer between operations

pub mod config;
pub mod engine;
pub mod output;
pub mod stats;
pub mod target;
pub mod util;
pub mod worker;

// Re-export commonly used types
pub use config::Config;
pub use engine::OperationType;
pub use worker::Worker;

/// Result type used throughout blklat
pub type Result<T> = anyhow::Result<T>;
