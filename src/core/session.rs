//! Interactive download session
//!
//! Walks the user through a fixed dialogue:
//!
//! ```text
//! kind -> directory -> url -> [playlist: entries -> scope -> indices] -> quality -> download
//! ```
//!
//! Input and output are generic so the whole dialogue can be driven from a
//! script in tests.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use log::debug;

use crate::core::backend::{DownloadOptions, MediaBackend, OutputCallback, ProgressCallback};
use crate::core::error::{Error, Result};
use crate::core::paths::{default_download_dir, ensure_dir, expand_path};
use crate::core::request::{parse_selection, DownloadRequest, MediaKind, PlaylistEntry, Quality};

/// Width of the section rules
const RULE_WIDTH: usize = 50;

/// One interactive run against a backend
pub struct Session<B, R, W> {
    backend: B,
    input: R,
    output: W,
    progress: Option<ProgressCallback>,
    extractor_output: Option<OutputCallback>,
}

impl<B, R, W> Session<B, R, W>
where
    B: MediaBackend,
    R: BufRead,
    W: Write,
{
    /// Create a session reading answers from `input` and writing the dialogue to `output`
    pub fn new(backend: B, input: R, output: W) -> Self {
        Self {
            backend,
            input,
            output,
            progress: None,
            extractor_output: None,
        }
    }

    /// Report download progress to `progress`
    pub fn with_progress(mut self, progress: ProgressCallback) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Route yt-dlp's own output lines through `output` instead of printing them
    pub fn with_output(mut self, output: OutputCallback) -> Self {
        self.extractor_output = Some(output);
        self
    }

    /// Consume the session, returning its parts
    pub fn into_parts(self) -> (B, R, W) {
        (self.backend, self.input, self.output)
    }

    /// Run the full dialogue and download what was asked for
    pub async fn run(&mut self) -> Result<DownloadRequest> {
        self.header("YOUTUBE VIDEO/PLAYLIST DOWNLOADER")?;

        writeln!(self.output, "Please choose what you want to download:")?;
        writeln!(self.output, "1. Single Video")?;
        writeln!(self.output, "2. Playlist")?;
        self.rule()?;
        let choice = self.prompt_choice(
            "Enter the number corresponding to your choice (1 or 2) [default: 1]: ",
            &MediaKind::CHOICES,
            "1",
        )?;
        let kind = MediaKind::from_choice(&choice)
            .ok_or_else(|| Error::InvalidInput(format!("unknown download kind '{choice}'")))?;

        let destination = self.resolve_download_directory()?;
        writeln!(self.output, "\nDownload directory set to: {}\n", destination.display())?;

        let url = self.prompt_url(kind)?;

        let selection = match kind {
            MediaKind::SingleVideo => None,
            MediaKind::Playlist => self.choose_playlist_entries(&url).await?,
        };

        let quality = self.choose_quality()?;

        let request = DownloadRequest {
            url,
            kind,
            quality,
            destination,
            selection,
        };

        self.section(match kind {
            MediaKind::SingleVideo => "DOWNLOADING VIDEO",
            MediaKind::Playlist => "DOWNLOADING PLAYLIST",
        })?;
        writeln!(self.output)?;
        self.output.flush()?;

        self.execute_download(&request).await?;

        self.section("DOWNLOAD COMPLETED")?;
        writeln!(self.output)?;
        Ok(request)
    }

    /// Read one trimmed line; `None` once input is exhausted
    fn read_line(&mut self) -> Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn ask(&mut self, prompt: &str) -> Result<Option<String>> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;
        self.read_line()
    }

    /// Ask until the answer is one of `allowed`.
    ///
    /// Empty input, and exhausted input, select `default`.
    pub fn prompt_choice(&mut self, prompt: &str, allowed: &[&str], default: &str) -> Result<String> {
        loop {
            let answer = match self.ask(prompt)? {
                Some(answer) => answer,
                None => {
                    writeln!(self.output)?;
                    return Ok(default.to_string());
                }
            };
            if answer.is_empty() {
                return Ok(default.to_string());
            }
            if allowed.contains(&answer.as_str()) {
                return Ok(answer);
            }
            writeln!(
                self.output,
                "Invalid input. Please enter one of the following options: {}",
                allowed.join(", ")
            )?;
        }
    }

    /// Ask for the destination directory, expand it and make sure it exists
    pub fn resolve_download_directory(&mut self) -> Result<PathBuf> {
        let default_dir = default_download_dir();
        let prompt = format!(
            "Enter the download directory [default: {}]: ",
            default_dir.display()
        );

        let dir = match self.ask(&prompt)? {
            Some(answer) if !answer.is_empty() => expand_path(&answer),
            _ => default_dir,
        };

        ensure_dir(&dir)?;
        debug!("Download directory: {}", dir.display());
        Ok(dir)
    }

    fn prompt_url(&mut self, kind: MediaKind) -> Result<String> {
        let label = kind.label();
        let prompt = format!("Enter the URL of the YouTube {} [required]: ", label.to_lowercase());

        loop {
            match self.ask(&prompt)? {
                Some(url) if !url.is_empty() => return Ok(url),
                Some(_) => writeln!(self.output, "{label} URL cannot be empty.")?,
                None => {
                    writeln!(self.output)?;
                    return Err(Error::InvalidInput(format!("no {} URL given", label.to_lowercase())));
                }
            }
        }
    }

    /// Flat-extract `url` and return its entries; fails if it is not a playlist
    pub async fn list_playlist_entries(&self, url: &str) -> Result<Vec<PlaylistEntry>> {
        let info = self.backend.extract_info(url).await?;
        info.playlist_entries()
            .ok_or_else(|| Error::NotAPlaylist(url.to_string()))
    }

    /// `None` means the whole playlist
    async fn choose_playlist_entries(&mut self, url: &str) -> Result<Option<Vec<PlaylistEntry>>> {
        writeln!(self.output, "\nChecking the playlist... Please wait.\n")?;
        self.output.flush()?;

        let entries = match self.list_playlist_entries(url).await {
            Ok(entries) => entries,
            Err(e @ Error::NotAPlaylist(_)) => {
                writeln!(self.output, "The provided URL does not appear to be a playlist. Exiting.")?;
                return Err(e);
            }
            Err(e) => return Err(e),
        };
        debug!("Playlist has {} entries", entries.len());

        self.section("PLAYLIST DETECTED")?;
        writeln!(self.output)?;

        let whole = self.prompt_choice(
            "Do you want to download the entire playlist? (y/n) [default: y]: ",
            &["y", "n", "Y", "N"],
            "y",
        )?;
        if whole.eq_ignore_ascii_case("y") {
            return Ok(None);
        }

        writeln!(self.output, "\nAvailable videos in the playlist:")?;
        self.rule()?;
        for entry in &entries {
            writeln!(self.output, "{}. {}", entry.position + 1, entry.title)?;
        }
        self.rule()?;

        let answer = self
            .ask("Enter the numbers of the videos you want to download (e.g., 1,3,5) [default: all]: ")?
            .unwrap_or_default();
        if answer.is_empty() {
            return Ok(None);
        }

        let indices = parse_selection(&answer, entries.len());
        if indices.is_empty() {
            writeln!(self.output, "No valid videos selected. Exiting.")?;
            return Err(Error::InvalidInput(format!("no valid videos in '{answer}'")));
        }

        Ok(Some(indices.into_iter().map(|i| entries[i].clone()).collect()))
    }

    fn choose_quality(&mut self) -> Result<Quality> {
        self.section("SELECT VIDEO QUALITY")?;
        for (choice, quality) in Quality::CHOICES.iter().zip([
            Quality::Best,
            Quality::High1080,
            Quality::Medium720,
            Quality::Low480,
        ]) {
            writeln!(self.output, "{}. {}", choice, quality.label())?;
        }
        self.rule()?;

        let choice = self.prompt_choice(
            "Enter the number corresponding to the desired quality [default: 1]: ",
            &Quality::CHOICES,
            "1",
        )?;
        Quality::from_choice(&choice)
            .ok_or_else(|| Error::InvalidInput(format!("unknown quality '{choice}'")))
    }

    /// Hand the request to the backend.
    ///
    /// A selected subset is downloaded one entry per call, in order; the first
    /// failure stops the rest.
    pub async fn execute_download(&mut self, request: &DownloadRequest) -> Result<()> {
        let options = DownloadOptions {
            format: request.format().to_string(),
            output_template: request.output_template(),
            progress: self.progress.clone(),
            output: self.extractor_output.clone(),
        };

        for target in request.download_targets() {
            debug!("Downloading {target}");
            self.backend
                .download(std::slice::from_ref(&target), &options)
                .await?;
        }

        Ok(())
    }

    fn rule(&mut self) -> Result<()> {
        writeln!(self.output, "{}", "-".repeat(RULE_WIDTH))?;
        Ok(())
    }

    fn section(&mut self, title: &str) -> Result<()> {
        writeln!(self.output)?;
        self.rule()?;
        writeln!(self.output, "{:^width$}", format!(" {title} "), width = RULE_WIDTH)?;
        self.rule()
    }

    fn header(&mut self, title: &str) -> Result<()> {
        self.section(title)?;
        writeln!(self.output)?;
        Ok(())
    }
}
