//! Download request model for tubedl
//!
//! Maps menu answers to the values handed to yt-dlp: what to fetch, at which
//! quality, and which playlist entries.

use std::path::PathBuf;

/// Title shown for playlist entries that carry none
pub const UNTITLED: &str = "No Title";

/// What the user wants to download
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    SingleVideo,
    Playlist,
}

impl MediaKind {
    /// Menu choices, in display order
    pub const CHOICES: [&'static str; 2] = ["1", "2"];

    /// Parse a kind menu answer
    pub fn from_choice(choice: &str) -> Option<Self> {
        match choice {
            "1" => Some(MediaKind::SingleVideo),
            "2" => Some(MediaKind::Playlist),
            _ => None,
        }
    }

    /// Human-readable name used in prompts
    pub fn label(&self) -> &'static str {
        match self {
            MediaKind::SingleVideo => "Video",
            MediaKind::Playlist => "Playlist",
        }
    }
}

/// Maximum quality to request from yt-dlp
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quality {
    Best,
    High1080,
    Medium720,
    Low480,
}

impl Quality {
    /// Menu choices, in display order
    pub const CHOICES: [&'static str; 4] = ["1", "2", "3", "4"];

    /// Parse a quality menu answer
    pub fn from_choice(choice: &str) -> Option<Self> {
        match choice {
            "1" => Some(Quality::Best),
            "2" => Some(Quality::High1080),
            "3" => Some(Quality::Medium720),
            "4" => Some(Quality::Low480),
            _ => None,
        }
    }

    /// Menu label
    pub fn label(&self) -> &'static str {
        match self {
            Quality::Best => "Best",
            Quality::High1080 => "High (1080p)",
            Quality::Medium720 => "Medium (720p)",
            Quality::Low480 => "Low (480p)",
        }
    }

    /// yt-dlp format selector for this quality
    pub fn format_specifier(&self) -> &'static str {
        match self {
            Quality::Best => "bestvideo+bestaudio/best",
            Quality::High1080 => "bestvideo[height<=1080]+bestaudio/best[height<=1080]",
            Quality::Medium720 => "bestvideo[height<=720]+bestaudio/best[height<=720]",
            Quality::Low480 => "bestvideo[height<=480]+bestaudio/best[height<=480]",
        }
    }
}

/// Format selector used when a quality choice is not recognised
pub const FALLBACK_FORMAT: &str = "best";

/// Map a raw quality menu answer to a yt-dlp format selector.
///
/// Total: anything outside the menu maps to [`FALLBACK_FORMAT`].
pub fn select_quality_format(choice: &str) -> &'static str {
    Quality::from_choice(choice.trim())
        .map(|quality| quality.format_specifier())
        .unwrap_or(FALLBACK_FORMAT)
}

/// One video inside a playlist listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistEntry {
    pub title: String,
    pub url: String,
    /// Zero-based position in the playlist
    pub position: usize,
}

/// Everything needed to run one download session
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadRequest {
    pub url: String,
    pub kind: MediaKind,
    pub quality: Quality,
    pub destination: PathBuf,
    /// Explicit playlist subset; `None` downloads everything behind `url`
    pub selection: Option<Vec<PlaylistEntry>>,
}

impl DownloadRequest {
    /// yt-dlp format selector for the chosen quality
    pub fn format(&self) -> &'static str {
        self.quality.format_specifier()
    }

    /// yt-dlp output template placing files at `<destination>/<title>.<ext>`
    pub fn output_template(&self) -> String {
        self.destination
            .join("%(title)s.%(ext)s")
            .to_string_lossy()
            .into_owned()
    }

    /// URLs to hand to yt-dlp, one download call each
    pub fn download_targets(&self) -> Vec<String> {
        match (&self.kind, &self.selection) {
            (MediaKind::Playlist, Some(entries)) => {
                entries.iter().map(|entry| entry.url.clone()).collect()
            }
            _ => vec![self.url.clone()],
        }
    }
}

/// Parse a `1,3,5` style selection into zero-based indices.
///
/// Tokens that are not plain digits, `0`, and numbers past `entry_count` are
/// dropped. Duplicates are collapsed, keeping the first occurrence.
pub fn parse_selection(input: &str, entry_count: usize) -> Vec<usize> {
    let mut indices = Vec::new();

    for token in input.split(',').map(str::trim) {
        if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
            continue;
        }
        let Ok(number) = token.parse::<usize>() else {
            continue;
        };
        if number == 0 || number > entry_count {
            continue;
        }
        let index = number - 1;
        if !indices.contains(&index) {
            indices.push(index);
        }
    }

    indices
}
