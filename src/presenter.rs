//! Loads page data for a fixed set of mushaf pages and pushes it to a bound
//! screen.
//!
//! Each bind (or retry) runs one load sequence on a spawned driver task:
//! wait out the settling delay, stream page coordinates, fan out the per-page
//! ayah coordinates, then fetch bookmarks if highlighting is enabled. Only a
//! page-coordinate failure is user-visible; it flips `encountered_error` and
//! stops the sequence until [`PagePresenter::refresh`] is called. Ayah and
//! bookmark failures are logged and dropped.
//!
//! Every delivery happens on the driver task while holding the session lock,
//! so the bound-screen check and the callback are atomic with respect to
//! [`PagePresenter::unbind`]: once `unbind` returns, nothing further reaches
//! the screen.

use crate::cancellation::{CancelToken, TaskScope};
use crate::geometry::{PageCoordinates, PageId};
use crate::screen::PageScreen;
use crate::sources::{BookmarkSource, CoordinateSource, ReaderSettings};
use anyhow::Result;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinSet;
use tokio::time::sleep;
use tracing::{debug, info, warn};

/// Debounce before the first geometry request, so a rapid page flip does not
/// compute geometry for a page the user has already left.
pub const SETTLING_DELAY: Duration = Duration::from_millis(500);

const COORDINATE_CHANNEL_DEPTH: usize = 8;

/// Where the current load sequence stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStage {
    Idle,
    AwaitingCoordinates,
    AwaitingAyahBounds,
    AwaitingBookmarks,
    Done,
    Failed,
}

pub struct PagePresenter {
    inner: Arc<Inner>,
}

struct Inner {
    tablet_mode: bool,
    pages: Vec<PageId>,
    coordinates: Arc<dyn CoordinateSource>,
    bookmarks: Arc<dyn BookmarkSource>,
    settings: Arc<dyn ReaderSettings>,
    session: Mutex<Session>,
    stage: watch::Sender<LoadStage>,
}

#[derive(Default)]
struct Session {
    screen: Option<Arc<dyn PageScreen>>,
    scope: TaskScope,
    encountered_error: bool,
}

impl PagePresenter {
    /// Performs no I/O; loading starts at [`bind`](Self::bind).
    pub fn new(
        coordinates: Arc<dyn CoordinateSource>,
        bookmarks: Arc<dyn BookmarkSource>,
        settings: Arc<dyn ReaderSettings>,
        tablet_mode: bool,
        pages: Vec<PageId>,
    ) -> Self {
        let (stage, _) = watch::channel(LoadStage::Idle);
        Self {
            inner: Arc::new(Inner {
                tablet_mode,
                pages,
                coordinates,
                bookmarks,
                settings,
                session: Mutex::new(Session::default()),
                stage,
            }),
        }
    }

    /// Bind `screen` and start loading the full page set. Rebinding replaces
    /// the previous screen and restarts the sequence; the previous sequence
    /// is cancelled first so only one is ever outstanding. Must be called
    /// from within a tokio runtime.
    pub fn bind(&self, screen: Arc<dyn PageScreen>) {
        info!(pages = ?self.inner.pages, "binding page screen");
        self.start_sequence(Some(screen));
    }

    /// Drop the screen and cancel all outstanding work. No delivery reaches
    /// the screen after this returns, even if a fetch resolves later.
    pub fn unbind(&self) {
        {
            let mut session = self.inner.session.lock();
            session.screen = None;
            session.scope.cancel();
        }
        self.inner.stage.send_replace(LoadStage::Idle);
    }

    /// Retry after a failed sequence. Does nothing unless a page-coordinate
    /// fetch has failed since the last successful load.
    pub fn refresh(&self) {
        {
            let mut session = self.inner.session.lock();
            if !session.encountered_error {
                debug!("refresh without a pending error; nothing to do");
                return;
            }
            session.encountered_error = false;
        }
        info!("retrying page data load");
        self.start_sequence(None);
    }

    pub fn encountered_error(&self) -> bool {
        self.inner.session.lock().encountered_error
    }

    /// Stage updates for the load sequence; lands on `Done` or `Failed`.
    pub fn stages(&self) -> watch::Receiver<LoadStage> {
        self.inner.stage.subscribe()
    }

    fn start_sequence(&self, screen: Option<Arc<dyn PageScreen>>) {
        let inner = Arc::clone(&self.inner);
        let mut session = self.inner.session.lock();
        session.scope.cancel();
        session.scope = TaskScope::new();
        if let Some(screen) = screen {
            session.screen = Some(screen);
        }
        let token = session.scope.token();
        self.inner.stage.send_replace(LoadStage::AwaitingCoordinates);
        let driver = tokio::spawn(inner.run_sequence(token));
        session.scope.register(driver.abort_handle());
    }
}

impl Inner {
    async fn run_sequence(self: Arc<Self>, token: CancelToken) {
        sleep(SETTLING_DELAY).await;
        if token.is_cancelled() {
            return;
        }

        if let Err(err) = self.fetch_page_coordinates(&token).await {
            warn!(error = %err, "page coordinate fetch failed");
            self.mark_failed(&token);
            return;
        }

        self.set_stage(&token, LoadStage::AwaitingAyahBounds);
        self.fetch_ayah_coordinates(&token).await;

        if self.settings.highlight_bookmarks() {
            self.set_stage(&token, LoadStage::AwaitingBookmarks);
            self.fetch_bookmarks(&token).await;
        } else {
            debug!("bookmark highlighting disabled; skipping bookmark fetch");
        }

        self.set_stage(&token, LoadStage::Done);
    }

    /// Stream page bounds, delivering each as it arrives. The producer and
    /// the delivering consumer run in lockstep inside the driver task, so
    /// cancelling the driver cancels both.
    async fn fetch_page_coordinates(&self, token: &CancelToken) -> Result<()> {
        let (tx, mut rx) = mpsc::channel::<PageCoordinates>(COORDINATE_CHANNEL_DEPTH);
        let produce = async {
            let outcome = self
                .coordinates
                .page_coordinates(self.tablet_mode, &self.pages, &tx)
                .await;
            drop(tx);
            outcome
        };
        let consume = async {
            while let Some(coordinates) = rx.recv().await {
                debug!(page = coordinates.page, "delivering page coordinates");
                self.deliver(token, |screen| {
                    screen.set_page_coordinates(coordinates.page, coordinates.bounds);
                });
            }
        };
        let (outcome, ()) = tokio::join!(produce, consume);
        outcome?;

        let mut session = self.session.lock();
        if !token.is_cancelled() {
            session.encountered_error = false;
        }
        Ok(())
    }

    /// Fan out one ayah-coordinate fetch per page and deliver results in
    /// completion order. A failing page is dropped while the rest of the
    /// fan-out continues; the page simply renders without highlights.
    async fn fetch_ayah_coordinates(&self, token: &CancelToken) {
        let mut fetches = JoinSet::new();
        for &page in &self.pages {
            let source = Arc::clone(&self.coordinates);
            let tablet_mode = self.tablet_mode;
            fetches.spawn(async move { (page, source.ayah_coordinates(tablet_mode, page).await) });
        }
        while let Some(joined) = fetches.join_next().await {
            match joined {
                Ok((page, Ok(bounds))) => {
                    debug!(page, ayahs = bounds.len(), "delivering ayah coordinates");
                    self.deliver(token, |screen| screen.set_ayah_coordinates(page, bounds));
                }
                Ok((page, Err(err))) => {
                    warn!(page, error = %err, "dropping failed ayah coordinate fetch");
                }
                Err(err) => {
                    warn!(error = %err, "ayah coordinate task failed");
                }
            }
        }
    }

    /// Best-effort enrichment: failures are logged and the sequence still
    /// ends normally.
    async fn fetch_bookmarks(&self, token: &CancelToken) {
        match self.bookmarks.bookmarks_on_pages(&self.pages).await {
            Ok(bookmarks) => {
                debug!(count = bookmarks.len(), "delivering bookmarks");
                self.deliver(token, |screen| screen.set_bookmarks_on_page(bookmarks));
            }
            Err(err) => {
                debug!(error = %err, "dropping failed bookmark fetch");
            }
        }
    }

    fn deliver(&self, token: &CancelToken, update: impl FnOnce(&dyn PageScreen)) {
        let session = self.session.lock();
        if token.is_cancelled() {
            return;
        }
        if let Some(screen) = session.screen.as_deref() {
            update(screen);
        }
    }

    fn mark_failed(&self, token: &CancelToken) {
        {
            let mut session = self.session.lock();
            if token.is_cancelled() {
                return;
            }
            session.encountered_error = true;
            if let Some(screen) = session.screen.as_deref() {
                screen.set_ayah_coordinates_error();
            }
        }
        self.stage.send_replace(LoadStage::Failed);
    }

    fn set_stage(&self, token: &CancelToken, stage: LoadStage) {
        if !token.is_cancelled() {
            self.stage.send_replace(stage);
        }
    }
}
