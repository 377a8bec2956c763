//! Gallery archiver CLI: loads the RON config, initializes logging, and
//! drives one archive run to completion.
mod config;
mod logging;

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use archive_logging::archive_info;
use gallery_engine::{FetchSettings, GalleryArchiver, ReqwestFetcher};

fn main() -> anyhow::Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| config::DEFAULT_CONFIG_PATH.to_string());
    let config = config::load(Path::new(&config_path))?;
    logging::initialize(config.log_destination);

    let settings = config.archive_settings()?;
    let fetcher = Arc::new(ReqwestFetcher::new(FetchSettings::default()));
    let archiver = GalleryArchiver::new(fetcher, settings);

    let started = chrono::Local::now();
    archive_info!("archive run started at {}", started.to_rfc3339());

    let runtime = tokio::runtime::Runtime::new().context("tokio runtime")?;
    let summary = runtime.block_on(archiver.run())?;

    for year in &summary.years {
        let format = year
            .format
            .map(|f| f.to_string())
            .unwrap_or_else(|| "none".to_string());
        println!(
            "{}: {} archived, {} failed (format: {}){}",
            year.year,
            year.archived,
            year.failed,
            format,
            if year.skipped { " [skipped]" } else { "" },
        );
    }
    let finished = chrono::Local::now();
    archive_info!(
        "archive run finished at {}: {} archived, {} failed",
        finished.to_rfc3339(),
        summary.archived(),
        summary.failed()
    );
    println!(
        "total: {} archived, {} failed across {} years",
        summary.archived(),
        summary.failed(),
        summary.years.len()
    );
    Ok(())
}
