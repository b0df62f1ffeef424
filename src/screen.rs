//! The display surface the presenter pushes page data to.

use crate::geometry::{AyahBoundsMap, Bookmark, PageId, Rect};
use tracing::{info, warn};

/// Push-only view of one reading page.
///
/// The presenter calls these from its own delivery context, one call at a
/// time; implementations never need their own locking to stay consistent.
/// There is no pull side: a screen that was never bound simply receives
/// nothing.
pub trait PageScreen: Send + Sync {
    /// Bounds of one page's content area.
    fn set_page_coordinates(&self, page: PageId, bounds: Rect);

    /// The page coordinate fetch failed; show the retry affordance.
    fn set_ayah_coordinates_error(&self);

    /// Glyph boxes for every ayah on `page`.
    fn set_ayah_coordinates(&self, page: PageId, coordinates: AyahBoundsMap);

    /// Bookmarks saved anywhere on the presenter's page set.
    fn set_bookmarks_on_page(&self, bookmarks: Vec<Bookmark>);
}

/// Screen that reports every delivery through the log. Used by the headless
/// preview binary in place of a rendered page.
pub struct ConsoleScreen;

impl PageScreen for ConsoleScreen {
    fn set_page_coordinates(&self, page: PageId, bounds: Rect) {
        info!(
            page,
            width = bounds.width(),
            height = bounds.height(),
            "page coordinates"
        );
    }

    fn set_ayah_coordinates_error(&self) {
        warn!("page coordinates unavailable; run again to retry");
    }

    fn set_ayah_coordinates(&self, page: PageId, coordinates: AyahBoundsMap) {
        for (verse, boxes) in &coordinates {
            info!(page, %verse, lines = boxes.len(), "ayah bounds");
        }
    }

    fn set_bookmarks_on_page(&self, bookmarks: Vec<Bookmark>) {
        for bookmark in &bookmarks {
            info!(page = bookmark.page, verse = %bookmark.verse(), "bookmark");
        }
    }
}
