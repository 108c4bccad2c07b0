//! Symposium schedule CLI
//!
//! Scrapes the schedule page and writes a PDF (default), a JSON export
//! (`--json`) or a digest (`--hash`).

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use symposium_schedule::{
    error::Result,
    models::Config,
    pipeline::{self, Input, OutputMode, RunOptions},
    services::{HttpFetcher, MarkupSource},
    storage::LocalStorage,
};

/// Symposium schedule scraper
#[derive(Parser, Debug)]
#[command(
    name = "symposium-schedule",
    version,
    about = "Scrape the ORFE thesis symposium schedule into a PDF or JSON"
)]
struct Cli {
    /// Path to the TOML configuration file (missing file uses defaults)
    #[arg(short, long, default_value = "schedule.toml")]
    config: PathBuf,

    /// Schedule page URL
    #[arg(long)]
    url: Option<String>,

    /// Write the JSON export instead of the PDF, and print it
    #[arg(long, conflicts_with = "hash")]
    json: bool,

    /// Print a digest of the schedule instead of writing files
    #[arg(long)]
    hash: bool,

    /// Add a "Time | Presenter" header row to each table
    #[arg(long)]
    show_headers: bool,

    /// Let a room split across pages
    #[arg(long)]
    allow_breaks: bool,

    /// Omit the document title
    #[arg(long)]
    no_title: bool,

    /// Print a QR deep link next to each room heading
    #[arg(long)]
    qr: bool,

    /// Output file path (PDF or JSON depending on mode)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Extract from a saved HTML page instead of fetching
    #[arg(long, conflicts_with = "from_json")]
    from_html: Option<PathBuf>,

    /// Load a previous JSON export instead of fetching
    #[arg(long)]
    from_json: Option<PathBuf>,

    /// Fetch through headless Chrome
    #[cfg(feature = "browser")]
    #[arg(long)]
    browser: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    /// Layer command-line overrides onto the loaded configuration.
    fn apply(&self, config: &mut Config) {
        if let Some(url) = &self.url {
            config.fetch.url = url.clone();
        }
        config.render.show_headers |= self.show_headers;
        config.render.allow_breaks |= self.allow_breaks;
        config.render.include_qr |= self.qr;
        if self.no_title {
            config.render.include_title = false;
        }
    }

    fn run_options(&self) -> RunOptions {
        let input = match (&self.from_html, &self.from_json) {
            (Some(path), _) => Input::Html(path.clone()),
            (None, Some(path)) => Input::Export(path.clone()),
            (None, None) => Input::Live,
        };
        let mode = if self.hash {
            OutputMode::Digest
        } else if self.json {
            OutputMode::Export
        } else {
            OutputMode::Document
        };
        RunOptions {
            input,
            mode,
            output: self.output.clone(),
        }
    }

    fn source(&self, config: &Config) -> Result<Box<dyn MarkupSource>> {
        #[cfg(feature = "browser")]
        if self.browser {
            return Ok(Box::new(symposium_schedule::services::BrowserFetcher::new(
                &config.fetch,
            )));
        }
        Ok(Box::new(HttpFetcher::new(&config.fetch)?))
    }
}

/// Initialize logging; `RUST_LOG` takes precedence over `level`.
fn init_logging(level: &str) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

async fn run(cli: Cli, mut config: Config) -> Result<()> {
    cli.apply(&mut config);
    config.validate()?;

    let source = cli.source(&config)?;
    let storage = LocalStorage::new(".");
    let stdout = std::io::stdout();
    let mut stdout = stdout.lock();

    pipeline::run(
        &config,
        source.as_ref(),
        &storage,
        &cli.run_options(),
        &mut stdout,
    )
    .await?;
    stdout.flush()?;
    Ok(())
}

/// Main entry point for the CLI application.
#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let loaded = Config::load_or_default(&cli.config);
    let level = match &loaded {
        _ if cli.verbose => "debug".to_string(),
        Ok(config) => config.logging.level.clone(),
        Err(_) => "info".to_string(),
    };
    init_logging(&level);

    let config = match loaded {
        Ok(config) => config,
        Err(e) => {
            log::error!("Failed to load {}: {e}", cli.config.display());
            return ExitCode::FAILURE;
        }
    };

    match run(cli, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            if e.is_fetch() {
                log::info!("If the page is behind a browser challenge, retry with --from-html on a saved copy");
            }
            ExitCode::FAILURE
        }
    }
}
