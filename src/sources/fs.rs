//! File-backed coordinate and bookmark sources.
//!
//! Geometry lives in one TOML file per page under a mode directory
//! (`single/` or `dual/`, matching the one- and two-page layouts):
//!
//! ```toml
//! [bounds]
//! left = 48.0
//! top = 36.0
//! right = 732.0
//! bottom = 1204.0
//!
//! [[ayah]]
//! key = "2:255"
//! boxes = [
//!     { left = 48.0, top = 36.0, right = 732.0, bottom = 72.0 },
//!     { left = 48.0, top = 72.0, right = 410.0, bottom = 108.0 },
//! ]
//! ```
//!
//! Bookmarks are a single `bookmarks.toml` holding the whole collection:
//!
//! ```toml
//! [[bookmark]]
//! sura = 2
//! ayah = 255
//! page = 3
//! ```

use crate::geometry::{AyahBoundsMap, Bookmark, PageCoordinates, PageId, Rect, VerseKey};
use crate::sources::{BookmarkSource, CoordinateSource};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;
use tokio::sync::mpsc;
use tracing::debug;

#[derive(Deserialize)]
struct PageGeometry {
    bounds: Rect,
    #[serde(default, rename = "ayah")]
    ayahs: Vec<AyahGlyphs>,
}

#[derive(Deserialize)]
struct AyahGlyphs {
    key: VerseKey,
    boxes: Vec<Rect>,
}

#[derive(Deserialize)]
struct BookmarkFile {
    #[serde(default, rename = "bookmark")]
    bookmarks: Vec<Bookmark>,
}

/// Reads per-page geometry files from a data directory.
pub struct FileCoordinateSource {
    root: PathBuf,
}

impl FileCoordinateSource {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    fn page_path(&self, tablet_mode: bool, page: PageId) -> PathBuf {
        let mode = if tablet_mode { "dual" } else { "single" };
        self.root.join(mode).join(format!("page-{page:03}.toml"))
    }

    fn load_page(&self, tablet_mode: bool, page: PageId) -> Result<PageGeometry> {
        let path = self.page_path(tablet_mode, page);
        let data = fs::read_to_string(&path)
            .with_context(|| format!("reading page geometry from {}", path.display()))?;
        toml::from_str(&data)
            .with_context(|| format!("parsing page geometry in {}", path.display()))
    }
}

#[async_trait]
impl CoordinateSource for FileCoordinateSource {
    async fn page_coordinates(
        &self,
        tablet_mode: bool,
        pages: &[PageId],
        out: &mpsc::Sender<PageCoordinates>,
    ) -> Result<()> {
        for &page in pages {
            let geometry = self.load_page(tablet_mode, page)?;
            let coordinates = PageCoordinates {
                page,
                bounds: geometry.bounds,
            };
            if out.send(coordinates).await.is_err() {
                debug!(page, "coordinate receiver dropped; stopping fetch");
                break;
            }
        }
        Ok(())
    }

    async fn ayah_coordinates(&self, tablet_mode: bool, page: PageId) -> Result<AyahBoundsMap> {
        let geometry = self.load_page(tablet_mode, page)?;
        Ok(geometry
            .ayahs
            .into_iter()
            .map(|ayah| (ayah.key, ayah.boxes))
            .collect())
    }
}

/// Reads the bookmark collection from a single TOML file.
pub struct FileBookmarkSource {
    path: PathBuf,
}

impl FileBookmarkSource {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

#[async_trait]
impl BookmarkSource for FileBookmarkSource {
    async fn bookmarks_on_pages(&self, pages: &[PageId]) -> Result<Vec<Bookmark>> {
        // No bookmark file just means nothing has been saved yet.
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let data = fs::read_to_string(&self.path)
            .with_context(|| format!("reading bookmarks from {}", self.path.display()))?;
        let file: BookmarkFile = toml::from_str(&data)
            .with_context(|| format!("parsing bookmarks in {}", self.path.display()))?;
        Ok(file
            .bookmarks
            .into_iter()
            .filter(|bookmark| pages.contains(&bookmark.page))
            .collect())
    }
}
