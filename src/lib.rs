//! # Tubedl
//!
//! Interactive front end for downloading a video or a playlist with yt-dlp.
//!
//! The dialogue lives in [`Session`]; extraction and downloading go through the
//! [`MediaBackend`] trait, implemented for the `yt-dlp` executable by [`YtDlp`].
//!
//! ```no_run
//! use std::io;
//! use tubedl::{Session, YtDlp};
//!
//! # async fn demo() -> tubedl::Result<()> {
//! let stdin = io::stdin();
//! let mut session = Session::new(YtDlp::new(), stdin.lock(), io::stdout());
//! session.run().await?;
//! # Ok(())
//! # }
//! ```

pub mod core;

pub use crate::core::backend::{
    DownloadOptions, EntryRecord, MediaBackend, MediaInfo, OutputCallback, OutputStream,
    ProgressCallback,
};
pub use crate::core::error::{Error, Result};
pub use crate::core::paths::{default_download_dir, expand_path};
pub use crate::core::request::{
    parse_selection, select_quality_format, DownloadRequest, MediaKind, PlaylistEntry, Quality,
};
pub use crate::core::session::Session;
pub use crate::core::ytdlp::{YtDlp, YtDlpConfig};
