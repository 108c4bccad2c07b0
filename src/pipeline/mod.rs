// src/pipeline/mod.rs

//! Scrape pipeline: acquire a schedule, then emit it in the chosen form.

use std::io::Write;
use std::path::PathBuf;

use crate::error::{AppError, Result};
use crate::models::{Config, Schedule};
use crate::render::{DocumentRenderer, digest, from_json, to_json};
use crate::services::{FileSource, MarkupSource, ScheduleExtractor};
use crate::storage::ArtifactStorage;
use crate::utils::progress;

const TOTAL_STEPS: usize = 2;

/// Where the schedule comes from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Input {
    /// Fetch the configured URL through the markup source
    #[default]
    Live,
    /// Extract from a saved HTML page
    Html(PathBuf),
    /// Load a previous JSON export; no extraction
    Export(PathBuf),
}

/// What the run produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// PDF written to the document path
    #[default]
    Document,
    /// JSON written to the export path and echoed to stdout
    Export,
    /// Hex digest printed to stdout
    Digest,
}

/// Per-run choices layered over the loaded [`Config`].
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub input: Input,
    pub mode: OutputMode,
    /// Overrides the configured artifact path for the chosen mode
    pub output: Option<PathBuf>,
}

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub rooms: usize,
    pub slots: usize,
    /// Written artifact; `None` in digest mode
    pub artifact: Option<PathBuf>,
}

/// Run the pipeline end to end.
///
/// `stdout` receives the export text or the digest.
pub async fn run(
    config: &Config,
    source: &dyn MarkupSource,
    storage: &dyn ArtifactStorage,
    options: &RunOptions,
    stdout: &mut dyn Write,
) -> Result<RunSummary> {
    progress::step(1, TOTAL_STEPS, "Acquiring schedule");
    let schedule = acquire(config, source, storage, &options.input).await?;
    log::info!(
        "Schedule has {} room(s) and {} slot(s)",
        schedule.len(),
        schedule.slot_count()
    );

    progress::step(2, TOTAL_STEPS, "Writing output");
    let artifact = emit(config, storage, options, &schedule, stdout).await?;

    let summary = RunSummary {
        rooms: schedule.len(),
        slots: schedule.slot_count(),
        artifact,
    };
    progress::summary(
        "Run complete",
        &[
            ("Rooms", summary.rooms.to_string()),
            ("Slots", summary.slots.to_string()),
            (
                "Artifact",
                summary
                    .artifact
                    .as_ref()
                    .map_or_else(|| "stdout".to_string(), |p| p.display().to_string()),
            ),
        ],
    );
    Ok(summary)
}

async fn acquire(
    config: &Config,
    source: &dyn MarkupSource,
    storage: &dyn ArtifactStorage,
    input: &Input,
) -> Result<Schedule> {
    let markup = match input {
        Input::Live => {
            log::info!("Fetching {}", config.fetch.url);
            source.fetch_markup(&config.fetch.url).await?
        }
        Input::Html(path) => {
            log::info!("Reading markup from {}", path.display());
            FileSource::new(path).fetch_markup(&config.fetch.url).await?
        }
        Input::Export(path) => {
            log::info!("Loading export from {}", path.display());
            let bytes = storage.read_artifact(path).await?.ok_or_else(|| {
                std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("{} not found", path.display()),
                )
            })?;
            return from_json(&bytes);
        }
    };

    ScheduleExtractor::new(&config.extract)?.extract(&markup)
}

async fn emit(
    config: &Config,
    storage: &dyn ArtifactStorage,
    options: &RunOptions,
    schedule: &Schedule,
    stdout: &mut dyn Write,
) -> Result<Option<PathBuf>> {
    match options.mode {
        OutputMode::Document => {
            let key = options
                .output
                .clone()
                .unwrap_or_else(|| config.output.document_path.clone());
            let bytes = DocumentRenderer::new(&config.render, &config.fetch.url).render(schedule)?;
            let path = storage
                .write_artifact(&key, &bytes)
                .await
                .map_err(AppError::render)?;
            log::info!("Document saved to {}", path.display());
            Ok(Some(path))
        }
        OutputMode::Export => {
            let key = options
                .output
                .clone()
                .unwrap_or_else(|| config.output.export_path.clone());
            let json = to_json(schedule)?;
            let path = storage
                .write_artifact(&key, json.as_bytes())
                .await
                .map_err(AppError::render)?;
            log::info!("Export saved to {}", path.display());
            writeln!(stdout, "{json}")?;
            Ok(Some(path))
        }
        OutputMode::Digest => {
            writeln!(stdout, "{}", digest(schedule)?)?;
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::LocalStorage;
    use async_trait::async_trait;
    use tempfile::TempDir;

    const PAGE: &str = r#"
        <html><body>
          <div id="001">
            <h2>001 - Sherrerd Hall</h2>
            <p>ORFE Advisors: Dr. Smith</p>
            <p>PhD Candidate Graders: Alex Chen</p>
            <table>
              <tr><td>9:00 am – 9:15 am</td><td>John Anderson</td></tr>
              <tr><td>9:15 am – 9:30 am</td><td>Sarah Mitchell</td></tr>
            </table>
          </div>
          <div id="110">
            <h2>110 - Sherrerd Hall</h2>
            <table>
              <tr><td>1:00 pm – 1:15 pm</td><td>Maria Garcia</td></tr>
            </table>
          </div>
        </body></html>
    "#;

    /// Serves fixed markup; `None` behaves like a page that never loads.
    struct StaticSource(Option<String>);

    #[async_trait]
    impl MarkupSource for StaticSource {
        async fn fetch_markup(&self, url: &str) -> Result<String> {
            self.0
                .clone()
                .ok_or_else(|| AppError::fetch_timeout(url, 30))
        }
    }

    fn ready() -> StaticSource {
        StaticSource(Some(PAGE.to_string()))
    }

    fn options(input: Input, mode: OutputMode) -> RunOptions {
        RunOptions {
            input,
            mode,
            output: None,
        }
    }

    #[tokio::test]
    async fn test_live_document_run() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());
        let mut out = Vec::new();

        let summary = run(
            &Config::default(),
            &ready(),
            &storage,
            &RunOptions::default(),
            &mut out,
        )
        .await
        .unwrap();

        assert_eq!(summary.rooms, 2);
        assert_eq!(summary.slots, 3);
        let path = tmp.path().join("symposium_schedule.pdf");
        assert_eq!(summary.artifact, Some(path.clone()));
        assert!(std::fs::read(path).unwrap().starts_with(b"%PDF"));
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_export_run_writes_file_and_stdout() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());
        let mut out = Vec::new();
        let opts = RunOptions {
            output: Some(PathBuf::from("custom.json")),
            ..options(Input::Live, OutputMode::Export)
        };

        let summary = run(&Config::default(), &ready(), &storage, &opts, &mut out)
            .await
            .unwrap();

        let written = std::fs::read_to_string(tmp.path().join("custom.json")).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), format!("{written}\n"));
        assert_eq!(summary.artifact, Some(tmp.path().join("custom.json")));

        let schedule = from_json(&written).unwrap();
        assert_eq!(schedule.room_ids().collect::<Vec<_>>(), vec!["001", "110"]);
    }

    #[tokio::test]
    async fn test_digest_from_saved_html() {
        let tmp = TempDir::new().unwrap();
        let html = tmp.path().join("page.html");
        std::fs::write(&html, PAGE).unwrap();
        let storage = LocalStorage::new(tmp.path());
        let mut out = Vec::new();

        // The live source must not be consulted.
        let unused = StaticSource(None);
        let summary = run(
            &Config::default(),
            &unused,
            &storage,
            &options(Input::Html(html), OutputMode::Digest),
            &mut out,
        )
        .await
        .unwrap();

        assert_eq!(summary.artifact, None);
        let printed = String::from_utf8(out).unwrap();
        assert_eq!(printed.trim().len(), 64);
        assert_eq!(std::fs::read_dir(tmp.path()).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn test_rerender_from_export() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());
        let config = Config::default();

        let mut first = Vec::new();
        run(&config, &ready(), &storage, &options(Input::Live, OutputMode::Digest), &mut first)
            .await
            .unwrap();

        run(&config, &ready(), &storage, &options(Input::Live, OutputMode::Export), &mut Vec::new())
            .await
            .unwrap();

        let unused = StaticSource(None);
        let mut second = Vec::new();
        run(
            &config,
            &unused,
            &storage,
            &options(Input::Export("symposium_schedule.json".into()), OutputMode::Digest),
            &mut second,
        )
        .await
        .unwrap();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_fetch_failure_writes_nothing() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());

        let failing = StaticSource(None);
        let err = run(
            &Config::default(),
            &failing,
            &storage,
            &RunOptions::default(),
            &mut Vec::new(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, AppError::FetchTimeout { .. }));
        assert_eq!(std::fs::read_dir(tmp.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_page_without_rooms_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());
        let empty = StaticSource(Some("<html><body><p>ORFE Advisors:</p></body></html>".into()));

        let err = run(
            &Config::default(),
            &empty,
            &storage,
            &RunOptions::default(),
            &mut Vec::new(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, AppError::Extraction(_)));
    }

    #[tokio::test]
    async fn test_unwritable_output_is_a_render_error() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("blocker"), b"not a directory").unwrap();
        let storage = LocalStorage::new(tmp.path());

        for mode in [OutputMode::Document, OutputMode::Export] {
            let opts = RunOptions {
                output: Some(PathBuf::from("blocker/out")),
                ..options(Input::Live, mode)
            };
            let mut out = Vec::new();
            let err = run(&Config::default(), &ready(), &storage, &opts, &mut out)
                .await
                .unwrap_err();

            assert!(matches!(err, AppError::Render(_)), "got {err:?}");
            assert!(out.is_empty());
        }
    }

    #[tokio::test]
    async fn test_export_with_invalid_utf8_is_rejected() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(
            tmp.path().join("broken.json"),
            b"{\"001\": {\"advisors\": \"Dr. M\xfcller\"}}",
        )
        .unwrap();
        let storage = LocalStorage::new(tmp.path());

        let err = run(
            &Config::default(),
            &ready(),
            &storage,
            &options(Input::Export("broken.json".into()), OutputMode::Digest),
            &mut Vec::new(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, AppError::Json(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn test_missing_export_file() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());

        let err = run(
            &Config::default(),
            &ready(),
            &storage,
            &options(Input::Export("missing.json".into()), OutputMode::Digest),
            &mut Vec::new(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, AppError::Io(_)));
    }
}
