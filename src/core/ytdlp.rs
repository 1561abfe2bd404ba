//! yt-dlp backend for tubedl
//!
//! Runs the `yt-dlp` executable as a child process. Metadata comes back as a
//! single JSON document; downloads stream progress lines on stdout.

use std::path::PathBuf;
use std::process::Stdio;

use log::{debug, info};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;

use crate::core::backend::{DownloadOptions, MediaBackend, MediaInfo, OutputCallback, OutputStream};
use crate::core::error::{Error, Result};

/// Marker prefixed to every progress line we ask yt-dlp to print
const PROGRESS_MARKER: &str = "tubedl-progress:";

/// Configuration for the yt-dlp backend
#[derive(Debug, Clone, PartialEq)]
pub struct YtDlpConfig {
    /// Executable to run
    pub program: PathBuf,

    /// Suppress yt-dlp's own messages (progress is still reported)
    pub quiet: bool,
}

impl Default for YtDlpConfig {
    fn default() -> Self {
        Self {
            program: PathBuf::from(if cfg!(target_os = "windows") {
                "yt-dlp.exe"
            } else {
                "yt-dlp"
            }),
            quiet: false,
        }
    }
}

/// Backend that shells out to yt-dlp
#[derive(Debug, Clone, Default)]
pub struct YtDlp {
    config: YtDlpConfig,
}

impl YtDlp {
    /// Create a backend with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a backend with custom configuration
    pub fn with_config(config: YtDlpConfig) -> Self {
        Self { config }
    }

    fn command(&self, args: &[String]) -> Command {
        debug!("Running {} {}", self.config.program.display(), args.join(" "));
        let mut command = Command::new(&self.config.program);
        command.args(args).stdin(Stdio::null()).kill_on_drop(true);
        command
    }

    fn spawn_error(&self, err: std::io::Error) -> Error {
        if err.kind() == std::io::ErrorKind::NotFound {
            Error::ToolNotFound(self.config.program.display().to_string())
        } else {
            Error::IoError(err)
        }
    }
}

/// Arguments for a metadata-only, flat extraction
pub fn extract_args(url: &str) -> Vec<String> {
    vec![
        "--dump-single-json".to_string(),
        "--flat-playlist".to_string(),
        "--quiet".to_string(),
        "--no-warnings".to_string(),
        "--".to_string(),
        url.to_string(),
    ]
}

/// Arguments for downloading `urls`
pub fn download_args(urls: &[String], options: &DownloadOptions, quiet: bool) -> Vec<String> {
    let mut args = vec![
        "-f".to_string(),
        options.format.clone(),
        "-o".to_string(),
        options.output_template.clone(),
        "--newline".to_string(),
        "--no-colors".to_string(),
        "--progress-template".to_string(),
        format!("download:{PROGRESS_MARKER}%(progress._percent_str)s"),
    ];

    if quiet {
        // --quiet alone would also hide the progress lines
        args.push("--quiet".to_string());
        args.push("--progress".to_string());
    }

    args.push("--".to_string());
    args.extend(urls.iter().cloned());
    args
}

/// Parse a progress line into a fraction between 0.0 and 1.0
pub fn parse_progress_line(line: &str) -> Option<f32> {
    let rest = line.trim().strip_prefix(PROGRESS_MARKER)?;
    let number = rest.trim().strip_suffix('%')?;
    let value = number.trim().parse::<f32>().ok()?;
    if value.is_finite() {
        Some((value / 100.0).clamp(0.0, 1.0))
    } else {
        None
    }
}

/// Decode one raw output line. yt-dlp prints titles in the platform encoding,
/// so invalid UTF-8 is replaced rather than treated as an error.
fn decode_line(raw: &[u8]) -> String {
    let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
    String::from_utf8_lossy(raw).into_owned()
}

fn forward_line(output: Option<&OutputCallback>, stream: OutputStream, line: &str) {
    match (output, stream) {
        (Some(output), _) => output(stream, line),
        (None, OutputStream::Stdout) => println!("{line}"),
        (None, OutputStream::Stderr) => eprintln!("{line}"),
    }
}

/// Last few non-empty stderr lines, for error messages
fn stderr_summary(stderr: &str) -> String {
    let lines: Vec<&str> = stderr
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();
    let start = lines.len().saturating_sub(3);
    lines[start..].join("\n")
}

impl MediaBackend for YtDlp {
    async fn extract_info(&self, url: &str) -> Result<MediaInfo> {
        let output = self
            .command(&extract_args(url))
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| self.spawn_error(e))?;

        if !output.status.success() {
            let stderr = stderr_summary(&String::from_utf8_lossy(&output.stderr));
            let reason = if stderr.is_empty() {
                format!("yt-dlp exited with {}", output.status)
            } else {
                stderr
            };
            return Err(Error::ExtractionError(format!("{url}: {reason}")));
        }

        let info: MediaInfo = serde_json::from_slice(&output.stdout)?;
        debug!(
            "Extracted {} ({} entries)",
            info.title.as_deref().unwrap_or(url),
            info.entries.as_ref().map_or(0, Vec::len)
        );
        Ok(info)
    }

    async fn download(&self, urls: &[String], options: &DownloadOptions) -> Result<()> {
        info!("Downloading {} with format {}", urls.join(", "), options.format);

        let mut child = self
            .command(&download_args(urls, options, self.config.quiet))
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| self.spawn_error(e))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| Error::DownloadError("yt-dlp stdout was not captured".to_string()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| Error::DownloadError("yt-dlp stderr was not captured".to_string()))?;

        let stderr_output = options.output.clone();
        let stderr_reader = tokio::spawn(async move {
            let mut collected = String::new();
            let mut segments = BufReader::new(stderr).split(b'\n');
            // Keep draining after a read error so the child never blocks on a full pipe
            loop {
                match segments.next_segment().await {
                    Ok(Some(raw)) => {
                        let line = decode_line(&raw);
                        forward_line(stderr_output.as_ref(), OutputStream::Stderr, &line);
                        collected.push_str(&line);
                        collected.push('\n');
                    }
                    Ok(None) => break,
                    Err(e) => {
                        debug!("Stopped reading yt-dlp stderr: {e}");
                        break;
                    }
                }
            }
            collected
        });

        let mut segments = BufReader::new(stdout).split(b'\n');
        while let Some(raw) = segments.next_segment().await? {
            let line = decode_line(&raw);
            match parse_progress_line(&line) {
                Some(fraction) => {
                    if let Some(progress) = &options.progress {
                        progress(fraction);
                    }
                }
                None if line.trim_start().starts_with(PROGRESS_MARKER) => {}
                None => forward_line(options.output.as_ref(), OutputStream::Stdout, &line),
            }
        }

        let status = child.wait().await?;
        let stderr = stderr_reader.await.unwrap_or_default();

        if !status.success() {
            let summary = stderr_summary(&stderr);
            let reason = if summary.is_empty() {
                format!("yt-dlp exited with {status}")
            } else {
                summary
            };
            return Err(Error::DownloadError(reason));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> DownloadOptions {
        DownloadOptions {
            format: "best".to_string(),
            output_template: "/tmp/out/%(title)s.%(ext)s".to_string(),
            progress: None,
            output: None,
        }
    }

    #[test]
    fn test_extract_args_are_flat_and_metadata_only() {
        let args = extract_args("https://example.com/playlist?list=x");
        assert!(args.contains(&"--flat-playlist".to_string()));
        assert!(args.contains(&"--dump-single-json".to_string()));
        assert_eq!(args.last().unwrap(), "https://example.com/playlist?list=x");
        assert_eq!(args[args.len() - 2], "--");
    }

    #[test]
    fn test_extract_args_keep_dash_urls_positional() {
        let args = extract_args("-U");
        assert_eq!(&args[args.len() - 2..], &["--", "-U"]);
        assert_eq!(args.iter().filter(|a| a.as_str() == "-U").count(), 1);
    }

    #[test]
    fn test_decode_line_replaces_invalid_utf8() {
        assert_eq!(decode_line(b"Caf\xe9.mp4\r"), "Caf\u{FFFD}.mp4");
        assert_eq!(decode_line(b"plain"), "plain");
    }

    #[test]
    fn test_download_args() {
        let urls = vec!["https://a".to_string(), "https://b".to_string()];
        let args = download_args(&urls, &options(), false);

        assert_eq!(&args[..4], &["-f", "best", "-o", "/tmp/out/%(title)s.%(ext)s"]);
        assert!(!args.contains(&"--quiet".to_string()));
        assert_eq!(&args[args.len() - 3..], &["--", "https://a", "https://b"]);
    }

    #[test]
    fn test_download_args_quiet_keeps_progress() {
        let args = download_args(&["https://a".to_string()], &options(), true);
        assert!(args.contains(&"--quiet".to_string()));
        assert!(args.contains(&"--progress".to_string()));
    }

    #[test]
    fn test_parse_progress_line() {
        assert_eq!(parse_progress_line("tubedl-progress: 42.0%"), Some(0.42));
        assert_eq!(parse_progress_line("tubedl-progress:100%"), Some(1.0));
        assert_eq!(parse_progress_line("  tubedl-progress:  0.0%  "), Some(0.0));
    }

    #[test]
    fn test_parse_progress_line_rejects_noise() {
        assert_eq!(parse_progress_line("[download] Destination: x.mp4"), None);
        assert_eq!(parse_progress_line("tubedl-progress:NA"), None);
        assert_eq!(parse_progress_line("tubedl-progress:Unknown%"), None);
        assert_eq!(parse_progress_line("tubedl-progress:nan%"), None);
        assert_eq!(parse_progress_line(""), None);
    }

    #[test]
    fn test_stderr_summary_keeps_tail() {
        let stderr = "line 1\n\nline 2\nline 3\nERROR: Unsupported URL\n";
        assert_eq!(stderr_summary(stderr), "line 2\nline 3\nERROR: Unsupported URL");
        assert_eq!(stderr_summary(""), "");
    }

    #[test]
    fn test_default_program() {
        let config = YtDlpConfig::default();
        assert!(config.program.to_string_lossy().starts_with("yt-dlp"));
        assert!(!config.quiet);
    }

    #[tokio::test]
    async fn test_missing_program_is_tool_not_found() {
        let backend = YtDlp::with_config(YtDlpConfig {
            program: PathBuf::from("/nonexistent/tubedl-test/yt-dlp"),
            quiet: true,
        });

        match backend.extract_info("https://example.com").await {
            Err(Error::ToolNotFound(program)) => assert!(program.contains("nonexistent")),
            other => panic!("Expected ToolNotFound, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_download_survives_non_utf8_output() {
        use std::os::unix::fs::PermissionsExt;
        use std::sync::{Arc, Mutex};

        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("yt-dlp");
        std::fs::write(
            &script,
            "#!/bin/sh\n\
             printf '[download] Destination: Caf\\351.mp4\\n'\n\
             printf 'tubedl-progress: 50.0%%\\n'\n\
             printf 'WARNING: \\377\\376 odd bytes\\n' >&2\n\
             printf 'tubedl-progress:100.0%%\\n'\n\
             exit 0\n",
        )
        .unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let lines = Arc::new(Mutex::new(Vec::new()));
        let fractions = Arc::new(Mutex::new(Vec::new()));
        let seen_lines = Arc::clone(&lines);
        let seen_fractions = Arc::clone(&fractions);

        let mut options = options();
        options.output = Some(Arc::new(move |stream: OutputStream, line: &str| {
            seen_lines.lock().unwrap().push((stream, line.to_string()));
        }));
        options.progress = Some(Arc::new(move |fraction: f32| {
            seen_fractions.lock().unwrap().push(fraction);
        }));

        let backend = YtDlp::with_config(YtDlpConfig {
            program: script,
            quiet: false,
        });
        backend
            .download(&["https://example.com/v".to_string()], &options)
            .await
            .unwrap();

        let lines = lines.lock().unwrap();
        assert!(lines.contains(&(
            OutputStream::Stdout,
            "[download] Destination: Caf\u{FFFD}.mp4".to_string()
        )));
        assert!(lines
            .iter()
            .any(|(stream, line)| *stream == OutputStream::Stderr && line.contains("odd bytes")));
        assert_eq!(*fractions.lock().unwrap(), vec![0.5, 1.0]);

        println!("✅ Non-UTF-8 output test passed!");
    }
}
