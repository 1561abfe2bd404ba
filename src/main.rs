//! # Tubedl CLI
//!
//! Interactive command-line front end for the tubedl library.
//! Everything about the download is asked for at the prompt; flags only
//! configure how yt-dlp is run.

use std::io;
use std::path::PathBuf;

use clap::Parser;
use log::{debug, error};
use tubedl::{Result, Session, YtDlp, YtDlpConfig};

mod cli;

/// Command-line interface for tubedl
#[derive(Parser)]
#[command(name = "tubedl")]
#[command(about = "Interactive video and playlist downloader built on yt-dlp")]
#[command(long_about = "Downloads a single video or a playlist, asking for everything interactively:
  1. what to download (single video or playlist)
  2. where to save it (default: your Downloads directory)
  3. the URL
  4. for playlists: the whole list, or a selection such as 1,3,5
  5. the maximum quality

Files are saved as <directory>/<title>.<ext>. Requires yt-dlp.")]
#[command(version = env!("TUBEDL_VERSION"))]
struct Cli {
    /// Path to the yt-dlp executable
    #[arg(long = "yt-dlp", env = "TUBEDL_YT_DLP", value_name = "PATH")]
    yt_dlp: Option<PathBuf>,

    /// Hide yt-dlp's own messages (the progress bar is kept)
    #[arg(short, long)]
    quiet: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn backend_config(&self) -> YtDlpConfig {
        let defaults = YtDlpConfig::default();
        YtDlpConfig {
            program: self.yt_dlp.clone().unwrap_or(defaults.program),
            quiet: self.quiet,
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging to stderr
    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .target(env_logger::Target::Stderr)
        .init();

    if let Err(e) = run(&cli).await {
        error!("❌ Error: {e}");
        std::process::exit(e.exit_code());
    }
}

async fn run(cli: &Cli) -> Result<()> {
    let config = cli.backend_config();
    debug!("tubedl v{} using {}", env!("TUBEDL_VERSION"), config.program.display());

    let progress = cli::ProgressManager::new();
    let stdin = io::stdin();
    let mut session = Session::new(YtDlp::with_config(config), stdin.lock(), io::stdout())
        .with_progress(progress.callback())
        .with_output(progress.output_callback());

    let result = session.run().await;
    progress.finish();

    let request = result?;
    debug!(
        "Finished {} into {} ({} file(s) reported progress)",
        request.url,
        request.destination.display(),
        progress.files_seen()
    );
    Ok(())
}
