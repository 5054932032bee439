//! CLI module for the watchdog
//!
//! Handles command-line argument parsing.

pub mod args;

pub use args::Args;
