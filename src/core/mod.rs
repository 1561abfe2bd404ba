//! Core library modules for tubedl
//!
//! This module contains the internal implementation details of the tubedl library.

pub mod backend;
pub mod error;
pub mod paths;
pub mod request;
pub mod session;
pub mod ytdlp;

// Re-export main types for internal use
pub use session::Session;
pub use ytdlp::{YtDlp, YtDlpConfig};
