//! Entry point for the headless page-data preview.
//!
//! Responsibilities here are intentionally minimal:
//! - Parse command-line arguments (a geometry data directory and pages).
//! - Load user configuration from `conf/config.toml`.
//! - Wire the file-backed sources into a presenter, bind a console screen,
//!   and wait for the load sequence to finish.

mod cancellation;
mod config;
mod geometry;
mod presenter;
mod screen;
mod sources;

use crate::config::{AppConfig, load_config};
use crate::geometry::PageId;
use crate::presenter::{LoadStage, PagePresenter};
use crate::screen::ConsoleScreen;
use crate::sources::fs::{FileBookmarkSource, FileCoordinateSource};
use anyhow::{Context, Result, anyhow};
use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*, reload};

type ReloadHandle = reload::Handle<EnvFilter, tracing_subscriber::Registry>;

fn main() {
    let reload_handle = init_tracing();
    if let Err(err) = run(&reload_handle) {
        error!("{err:?}");
        std::process::exit(1);
    }
}

fn run(reload_handle: &ReloadHandle) -> Result<()> {
    let (data_dir, pages) = parse_args()?;
    let config = load_config(Path::new("conf/config.toml"));
    set_log_level(reload_handle, config.log_level.as_filter_str());
    info!(
        data = %data_dir.display(),
        pages = ?pages,
        tablet_mode = config.tablet_mode,
        highlight_bookmarks = config.highlight_bookmarks,
        "Starting page data preview"
    );
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start the async runtime")?;
    runtime.block_on(preview(data_dir, pages, config))
}

async fn preview(data_dir: PathBuf, pages: Vec<PageId>, config: AppConfig) -> Result<()> {
    let coordinates = Arc::new(FileCoordinateSource::new(data_dir.clone()));
    let bookmarks = Arc::new(FileBookmarkSource::new(data_dir.join("bookmarks.toml")));
    let tablet_mode = config.tablet_mode;
    let presenter = PagePresenter::new(
        coordinates,
        bookmarks,
        Arc::new(config),
        tablet_mode,
        pages,
    );

    let mut stages = presenter.stages();
    presenter.bind(Arc::new(ConsoleScreen));
    let outcome = loop {
        match *stages.borrow_and_update() {
            LoadStage::Done => break Ok(()),
            LoadStage::Failed => {
                break Err(anyhow!("page coordinates could not be loaded; check the data directory"));
            }
            _ => {}
        }
        if stages.changed().await.is_err() {
            break Ok(());
        }
    };
    presenter.unbind();
    outcome
}

fn parse_args() -> Result<(PathBuf, Vec<PageId>)> {
    let mut args = env::args().skip(1);
    let data_dir = args
        .next()
        .ok_or_else(|| anyhow!("Usage: mushaf-pages <data-dir> <page> [page...]"))?;
    let data_dir = PathBuf::from(data_dir);
    if !data_dir.is_dir() {
        return Err(anyhow!("Data directory not found: {}", data_dir.display()));
    }

    let mut pages = Vec::new();
    for arg in args {
        let page: PageId = arg
            .parse()
            .with_context(|| format!("Invalid page number: {arg}"))?;
        if page == 0 {
            return Err(anyhow!("Page numbers start at 1"));
        }
        pages.push(page);
    }
    if pages.is_empty() {
        return Err(anyhow!("Usage: mushaf-pages <data-dir> <page> [page...]"));
    }
    Ok((data_dir, pages))
}

fn init_tracing() -> ReloadHandle {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let (filter_layer, handle) = reload::Layer::new(env_filter);
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(true)
                .with_filter(filter_layer),
        )
        .init();
    handle
}

fn set_log_level(handle: &ReloadHandle, level: &str) {
    let parsed = EnvFilter::builder()
        .parse(level)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    if let Err(err) = handle.modify(|filter| *filter = parsed.clone()) {
        warn!(%level, "Failed to update log level from config: {err}");
    }
}
