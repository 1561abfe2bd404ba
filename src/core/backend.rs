//! Media backend abstraction for tubedl
//!
//! The session only ever needs two things from an extractor: a flat metadata
//! listing for a URL, and a download of a list of URLs. [`MediaBackend`] is that
//! seam; [`crate::core::ytdlp::YtDlp`] is the production implementation.

use std::sync::Arc;

use log::warn;
use serde::Deserialize;

use crate::core::error::Result;
use crate::core::request::{PlaylistEntry, UNTITLED};

/// Progress callback, called with the completed fraction (0.0 to 1.0) of the current file
pub type ProgressCallback = Arc<dyn Fn(f32) + Send + Sync>;

/// Stream a forwarded output line came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputStream {
    Stdout,
    Stderr,
}

/// Output callback, called for every non-progress line the extractor prints
pub type OutputCallback = Arc<dyn Fn(OutputStream, &str) + Send + Sync>;

/// Options for a single download call
#[derive(Clone)]
pub struct DownloadOptions {
    /// yt-dlp format selector
    pub format: String,

    /// yt-dlp output template
    pub output_template: String,

    /// Optional progress callback
    pub progress: Option<ProgressCallback>,

    /// Where extractor output goes; printed directly when unset
    pub output: Option<OutputCallback>,
}

impl std::fmt::Debug for DownloadOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DownloadOptions")
            .field("format", &self.format)
            .field("output_template", &self.output_template)
            .field("progress", &self.progress.is_some())
            .field("output", &self.output.is_some())
            .finish()
    }
}

/// Metadata record returned by a flat extraction
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MediaInfo {
    #[serde(default)]
    pub id: Option<String>,

    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub webpage_url: Option<String>,

    /// `playlist`, `video`, `url`... as reported by the extractor
    #[serde(default, rename = "_type")]
    pub kind: Option<String>,

    /// Present only for playlists
    #[serde(default)]
    pub entries: Option<Vec<Option<EntryRecord>>>,
}

/// Raw playlist item as listed by the extractor
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EntryRecord {
    #[serde(default)]
    pub id: Option<String>,

    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub url: Option<String>,

    #[serde(default)]
    pub webpage_url: Option<String>,
}

impl MediaInfo {
    /// Playlist entries in order, or `None` when this is not a playlist.
    ///
    /// Entries without any usable URL are skipped; positions are assigned
    /// after skipping so they match what the user is shown.
    pub fn playlist_entries(&self) -> Option<Vec<PlaylistEntry>> {
        let records = self.entries.as_ref()?;

        let entries = records
            .iter()
            .enumerate()
            .filter_map(|(raw_index, record)| {
                let record = record.as_ref()?;
                let url = record.url.clone().or_else(|| record.webpage_url.clone());
                if url.is_none() {
                    warn!(
                        "Skipping playlist item {} ({}): no URL",
                        raw_index + 1,
                        record.id.as_deref().unwrap_or("unknown id")
                    );
                }
                let title = record
                    .title
                    .clone()
                    .filter(|t| !t.is_empty())
                    .unwrap_or_else(|| UNTITLED.to_string());
                url.map(|url| (title, url))
            })
            .enumerate()
            .map(|(position, (title, url))| PlaylistEntry { title, url, position })
            .collect();

        Some(entries)
    }
}

/// The extractor operations a session relies on
#[allow(async_fn_in_trait)]
pub trait MediaBackend {
    /// Fetch metadata for `url` without downloading any media
    async fn extract_info(&self, url: &str) -> Result<MediaInfo>;

    /// Download every URL in `urls` using `options`
    async fn download(&self, urls: &[String], options: &DownloadOptions) -> Result<()>;
}
