//! Error types for tubedl
//!
//! Every failure in a session ends up here. Recoverable input problems are
//! handled by re-prompting before they ever become an `Error`; anything that
//! does reach `main` terminates the process.

use std::fmt;

/// Main error type for tubedl operations
#[derive(Debug)]
pub enum Error {
    /// User input that cannot be recovered by re-prompting
    InvalidInput(String),

    /// The extractor could not resolve the URL
    ExtractionError(String),

    /// The URL resolved, but not to a playlist
    NotAPlaylist(String),

    /// yt-dlp reported a failure while downloading
    DownloadError(String),

    /// The yt-dlp executable could not be started
    ToolNotFound(String),

    /// File or terminal I/O error
    IoError(std::io::Error),
}

impl Error {
    /// Process exit code for this error.
    ///
    /// Every abort path of a session exits with `1`.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::InvalidInput(_)
            | Error::ExtractionError(_)
            | Error::NotAPlaylist(_)
            | Error::DownloadError(_)
            | Error::ToolNotFound(_)
            | Error::IoError(_) => 1,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidInput(msg) => {
                write!(f, "Invalid input: {}", msg)
            }
            Error::ExtractionError(msg) => {
                write!(f, "Extraction failed: {}", msg)
            }
            Error::NotAPlaylist(url) => {
                write!(f, "The provided URL does not appear to be a playlist: {}", url)
            }
            Error::DownloadError(msg) => {
                write!(f, "Download failed: {}", msg)
            }
            Error::ToolNotFound(program) => {
                write!(
                    f,
                    "Could not run '{}'. Install yt-dlp or point --yt-dlp at the executable",
                    program
                )
            }
            Error::IoError(err) => {
                write!(f, "I/O error: {}", err)
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::IoError(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::IoError(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::ExtractionError(format!("yt-dlp returned invalid JSON: {}", err))
    }
}

/// Convenience result type for tubedl operations
pub type Result<T> = std::result::Result<T, Error>;
