//! CLI-specific utilities for tubedl
//!
//! This module contains code specific to the command-line interface,
//! separate from the core session logic.

pub mod progress;

pub use progress::ProgressManager;
