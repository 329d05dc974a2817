mod classify;
mod scan;
#[cfg(test)]
mod testing;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use common::Track;
use parking_lot::{Condvar, Mutex, RwLock};
use tracing::{debug, info, warn};

pub use classify::is_audio;
pub use scan::{scan, ScanReport, Scanner, SkippedFile};

/// Result of a refresh that published a new snapshot.
#[derive(Clone, Debug)]
pub struct RefreshSummary {
    pub count: usize,
    pub skipped: Vec<SkippedFile>,
}

type RefreshOutcome = Result<RefreshSummary, LibraryError>;

/// In-memory index of the music root. Readers share the current snapshot;
/// a refresh rebuilds it off-lock and swaps it in whole.
#[derive(Clone)]
pub struct TrackCache {
    inner: Arc<CacheInner>,
}

struct CacheInner {
    root: PathBuf,
    scanner: Scanner,
    snapshot: RwLock<Arc<Vec<Track>>>,
    in_flight: Mutex<Option<Arc<Flight>>>,
}

#[derive(Default)]
struct Flight {
    outcome: Mutex<Option<RefreshOutcome>>,
    done: Condvar,
}

impl Flight {
    fn complete(&self, outcome: RefreshOutcome) {
        *self.outcome.lock() = Some(outcome);
        self.done.notify_all();
    }

    fn wait(&self) -> RefreshOutcome {
        let mut outcome = self.outcome.lock();
        loop {
            if let Some(result) = outcome.as_ref() {
                return result.clone();
            }
            self.done.wait(&mut outcome);
        }
    }
}

/// Held by the refresh that runs the scan. Dropping it without a result
/// (the scan panicked) still releases any waiters.
struct FlightLeader<'a> {
    inner: &'a CacheInner,
    flight: Arc<Flight>,
    finished: bool,
}

impl FlightLeader<'_> {
    fn finish(mut self, outcome: RefreshOutcome) {
        self.release(outcome);
        self.finished = true;
    }

    fn release(&self, outcome: RefreshOutcome) {
        *self.inner.in_flight.lock() = None;
        self.flight.complete(outcome);
    }
}

impl Drop for FlightLeader<'_> {
    fn drop(&mut self) {
        if !self.finished {
            self.release(Err(LibraryError::RefreshAborted));
        }
    }
}

impl TrackCache {
    pub fn new(root: PathBuf) -> Self {
        Self::with_scanner(root, Scanner::default())
    }

    pub fn with_scanner(root: PathBuf, scanner: Scanner) -> Self {
        Self {
            inner: Arc::new(CacheInner {
                root,
                scanner,
                snapshot: RwLock::new(Arc::new(Vec::new())),
                in_flight: Mutex::new(None),
            }),
        }
    }

    pub fn root(&self) -> &Path {
        &self.inner.root
    }

    /// Rescans the root and publishes the result. Blocks for the whole scan,
    /// so async callers should run it on a blocking thread. A call made while
    /// another refresh is running waits for that refresh and returns its
    /// outcome instead of scanning again.
    pub fn refresh(&self) -> Result<RefreshSummary, LibraryError> {
        let mut slot = self.inner.in_flight.lock();
        if let Some(flight) = slot.as_ref().map(Arc::clone) {
            drop(slot);
            debug!("Refresh already running; joining it");
            return flight.wait();
        }
        let flight = Arc::new(Flight::default());
        *slot = Some(Arc::clone(&flight));
        drop(slot);
        let leader = FlightLeader {
            inner: &*self.inner,
            flight,
            finished: false,
        };

        let outcome = self.scan_and_publish();
        leader.finish(outcome.clone());
        outcome
    }

    fn scan_and_publish(&self) -> RefreshOutcome {
        let report = match self.inner.scanner.scan(&self.inner.root) {
            Ok(report) => report,
            Err(err) => {
                warn!("Refresh failed, keeping previous snapshot: {}", err);
                return Err(err);
            }
        };
        let count = report.tracks.len();
        *self.inner.snapshot.write() = Arc::new(report.tracks);
        info!("Published snapshot with {} tracks", count);
        Ok(RefreshSummary {
            count,
            skipped: report.skipped,
        })
    }

    pub fn snapshot(&self) -> Arc<Vec<Track>> {
        Arc::clone(&self.inner.snapshot.read())
    }

    pub fn len(&self) -> usize {
        self.inner.snapshot.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Window of the current snapshot starting at `offset`. A negative
    /// offset counts as zero; a non-positive limit or an offset at or past
    /// the end gives an empty page.
    pub fn list(&self, offset: i64, limit: i64) -> Vec<Track> {
        if limit <= 0 {
            return Vec::new();
        }
        let offset = usize::try_from(offset.max(0)).unwrap_or(usize::MAX);
        let limit = usize::try_from(limit).unwrap_or(usize::MAX);

        let snapshot = self.inner.snapshot.read();
        if offset >= snapshot.len() {
            return Vec::new();
        }
        let end = offset.saturating_add(limit).min(snapshot.len());
        snapshot[offset..end].to_vec()
    }
}

#[derive(Clone, Debug)]
pub enum LibraryError {
    Walk(Arc<walkdir::Error>),
    RefreshAborted,
}

impl std::fmt::Display for LibraryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LibraryError::Walk(err) => write!(f, "scan error: {}", err),
            LibraryError::RefreshAborted => write!(f, "refresh aborted before completing"),
        }
    }
}

impl std::error::Error for LibraryError {}

impl From<walkdir::Error> for LibraryError {
    fn from(err: walkdir::Error) -> Self {
        LibraryError::Walk(Arc::new(err))
    }
}
