//! CLI-specific progress handling for tubedl
//!
//! Turns the per-file percentages reported by yt-dlp into an indicatif bar.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use indicatif::{ProgressBar, ProgressStyle};
use tubedl::{OutputCallback, OutputStream, ProgressCallback};

/// Bar length; progress is tracked in tenths of a percent
const BAR_LENGTH: u64 = 1000;

/// Creates a progress bar for CLI display
pub fn create_progress_bar() -> ProgressBar {
    let pb = ProgressBar::new(BAR_LENGTH);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {percent}% {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );
    pb
}

/// Progress manager spanning every file of a session
pub struct ProgressManager {
    pb: Mutex<Option<ProgressBar>>,
    files: AtomicU64,
}

impl ProgressManager {
    /// Create a new progress manager; bars are created lazily per file
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            pb: Mutex::new(None),
            files: AtomicU64::new(0),
        })
    }

    /// Record `fraction` of the current file.
    ///
    /// A fraction lower than the last one seen means yt-dlp moved on to the
    /// next file, so the current bar is finished and a fresh one started.
    pub fn update(&self, fraction: f32) {
        let position = (fraction.clamp(0.0, 1.0) * BAR_LENGTH as f32).round() as u64;
        let Ok(mut slot) = self.pb.lock() else {
            return;
        };

        let restart = slot.as_ref().map_or(true, |pb| position < pb.position());
        if restart {
            if let Some(pb) = slot.take() {
                pb.finish_and_clear();
            }
            let pb = create_progress_bar();
            let file = self.files.fetch_add(1, Ordering::Relaxed) + 1;
            pb.set_message(format!("file {file}"));
            *slot = Some(pb);
        }

        if let Some(pb) = slot.as_ref() {
            pb.set_position(position);
            if position >= BAR_LENGTH {
                pb.finish_with_message("✅ Done");
            }
        }
    }

    /// Number of files a bar was shown for
    pub fn files_seen(&self) -> u64 {
        self.files.load(Ordering::Relaxed)
    }

    /// Print a yt-dlp line without tearing the bar that is being drawn
    pub fn print_line(&self, stream: OutputStream, line: &str) {
        let print = || match stream {
            OutputStream::Stdout => println!("{line}"),
            OutputStream::Stderr => eprintln!("{line}"),
        };

        match self.pb.lock() {
            Ok(slot) => match slot.as_ref() {
                Some(pb) if !pb.is_finished() => pb.suspend(print),
                _ => print(),
            },
            Err(_) => print(),
        }
    }

    /// Finish whatever bar is still running
    pub fn finish(&self) {
        if let Ok(mut slot) = self.pb.lock() {
            if let Some(pb) = slot.take() {
                if !pb.is_finished() {
                    pb.abandon();
                }
            }
        }
    }

    /// Callback to hand to the session
    pub fn callback(self: &Arc<Self>) -> ProgressCallback {
        let manager = Arc::clone(self);
        Arc::new(move |fraction: f32| manager.update(fraction))
    }

    /// Output callback to hand to the session
    pub fn output_callback(self: &Arc<Self>) -> OutputCallback {
        let manager = Arc::clone(self);
        Arc::new(move |stream: OutputStream, line: &str| manager.print_line(stream, line))
    }
}
