//! Report output
//!
//! Report lines are the tool's only stdout output and a scraping contract, so
//! their formats live in one place (`text`).

pub mod text;

pub use text::Reporter;
