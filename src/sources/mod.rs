//! Contracts for the external collaborators the presenter sequences.
//!
//! The presenter never touches storage itself; it drives a coordinate source
//! and a bookmark source and forwards whatever they produce. File-backed
//! implementations live in [`fs`]; tests substitute stubs.

pub mod fs;

use crate::geometry::{AyahBoundsMap, Bookmark, PageCoordinates, PageId};
use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::mpsc;

/// Supplies page and ayah geometry for a set of mushaf pages.
///
/// Both operations live on one source because they read the same layout data,
/// just at different granularity: whole-page bounds versus per-verse glyph
/// boxes.
#[async_trait]
pub trait CoordinateSource: Send + Sync {
    /// Stream the bounds of every page in `pages`, in whatever order they
    /// become available. Each result is pushed through `out` as soon as it is
    /// ready; returning `Err` marks the entire fetch failed. A closed `out`
    /// means the caller has lost interest and the fetch may stop early.
    async fn page_coordinates(
        &self,
        tablet_mode: bool,
        pages: &[PageId],
        out: &mpsc::Sender<PageCoordinates>,
    ) -> Result<()>;

    /// Glyph boxes for every ayah on `page`. Called once per page; the
    /// presenter fans these calls out concurrently.
    async fn ayah_coordinates(&self, tablet_mode: bool, page: PageId) -> Result<AyahBoundsMap>;
}

/// Supplies the bookmarks saved on a set of pages.
#[async_trait]
pub trait BookmarkSource: Send + Sync {
    async fn bookmarks_on_pages(&self, pages: &[PageId]) -> Result<Vec<Bookmark>>;
}

/// Live settings reads the presenter consults mid-sequence.
pub trait ReaderSettings: Send + Sync {
    /// Whether bookmarked verses should be highlighted on the page. Checked
    /// once per sequence, after ayah coordinates complete.
    fn highlight_bookmarks(&self) -> bool;
}
