pub mod args;
pub mod batches;
pub mod config;
pub mod core;
pub mod encoding;
pub mod errors;
pub mod features;
pub mod readwrite;
pub mod runner;
pub mod sampling;
pub mod stats;
