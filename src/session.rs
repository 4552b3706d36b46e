use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::{broadcast, Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::grid::{build_axis, on_axis, GridError, ReconcileReport, SelectionGrid};
use crate::limits::*;
use crate::model::*;
use crate::notify::NotifyHub;
use crate::observability::{SESSIONS_ACTIVE, SOURCE_FAILURES_TOTAL};

#[derive(Debug)]
pub enum SessionError {
    /// The booking service could not be reached or answered garbage.
    Source(String),
    Grid(GridError),
    LimitExceeded(&'static str),
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionError::Source(e) => write!(f, "room-night source error: {e}"),
            SessionError::Grid(e) => write!(f, "{e}"),
            SessionError::LimitExceeded(msg) => write!(f, "limit exceeded: {msg}"),
        }
    }
}

impl std::error::Error for SessionError {}

impl From<GridError> for SessionError {
    fn from(e: GridError) -> Self {
        SessionError::Grid(e)
    }
}

/// Where existing room-nights come from (the booking service, in production).
#[async_trait]
pub trait RoomNightSource: Send + Sync {
    /// Every known room-night in `[start, end)`, all bookings included.
    async fn fetch(&self, start: Night, end: Night) -> Result<Vec<ExistingRoomNight>, SessionError>;
}

/// In-memory source backed by a fixed list.
pub struct StaticSource {
    nights: RwLock<Vec<ExistingRoomNight>>,
    fetches: AtomicUsize,
}

impl StaticSource {
    pub fn new(nights: Vec<ExistingRoomNight>) -> Self {
        Self {
            nights: RwLock::new(nights),
            fetches: AtomicUsize::new(0),
        }
    }

    /// Swap the data, as if another operator had booked in the meantime.
    pub async fn replace(&self, nights: Vec<ExistingRoomNight>) {
        *self.nights.write().await = nights;
    }

    pub async fn extend(&self, nights: Vec<ExistingRoomNight>) {
        self.nights.write().await.extend(nights);
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl RoomNightSource for StaticSource {
    async fn fetch(&self, start: Night, end: Night) -> Result<Vec<ExistingRoomNight>, SessionError> {
        self.fetches.fetch_add(1, Ordering::Relaxed);
        let nights = self.nights.read().await;
        Ok(nights
            .iter()
            .filter(|n| on_axis(start, end, n.date))
            .cloned()
            .collect())
    }
}

async fn fetch_logged(
    source: &dyn RoomNightSource,
    start: Night,
    end: Night,
) -> Result<Vec<ExistingRoomNight>, SessionError> {
    match source.fetch(start, end).await {
        Ok(nights) => {
            debug!(%start, %end, count = nights.len(), "fetched room-nights");
            Ok(nights)
        }
        Err(e) => {
            metrics::counter!(SOURCE_FAILURES_TOTAL).increment(1);
            warn!(%start, %end, "room-night fetch failed: {e}");
            Err(e)
        }
    }
}

/// A grid bound to its data source and listeners.
///
/// All access goes through one lock, so a refresh (fetch + reconcile) and
/// operator input never interleave: input waits while fresh data loads.
pub struct GridSession {
    grid: Mutex<SelectionGrid>,
    source: Arc<dyn RoomNightSource>,
    notify: NotifyHub,
}

impl GridSession {
    pub async fn open(
        rooms: Vec<Room>,
        source: Arc<dyn RoomNightSource>,
        start: Night,
        end: Night,
        current_booking: Option<BookingId>,
    ) -> Result<Self, SessionError> {
        build_axis(start, end)?;
        let existing = fetch_logged(source.as_ref(), start, end).await?;
        let grid = SelectionGrid::new(rooms, &existing, start, end, current_booking)?;
        Ok(Self {
            grid: Mutex::new(grid),
            source,
            notify: NotifyHub::new(),
        })
    }

    pub fn subscribe(&self) -> broadcast::Receiver<GridEvent> {
        self.notify.subscribe()
    }

    /// Run one grid operation and broadcast what it emitted.
    pub async fn apply<R>(&self, op: impl FnOnce(&mut SelectionGrid) -> R) -> R {
        let mut grid = self.grid.lock().await;
        let out = op(&mut grid);
        self.flush(&mut grid);
        out
    }

    /// Re-fetch availability for the current range and reconcile.
    pub async fn refresh(&self) -> Result<ReconcileReport, SessionError> {
        let mut grid = self.grid.lock().await;
        let (start, end) = grid.range();
        let existing = fetch_logged(self.source.as_ref(), start, end).await?;
        let report = grid.replace_availability(&existing)?;
        self.flush(&mut grid);
        if !report.is_empty() {
            info!(
                removed = report.removed.len(),
                stale_pending = report.stale_pending.len(),
                "refresh pruned selection"
            );
        }
        Ok(report)
    }

    /// Move to a new range: fetch for it, then rebuild and reconcile once.
    /// An invalid range is rejected before anything is fetched.
    pub async fn change_range(&self, start: Night, end: Night) -> Result<ReconcileReport, SessionError> {
        build_axis(start, end)?;
        let mut grid = self.grid.lock().await;
        let existing = fetch_logged(self.source.as_ref(), start, end).await?;
        let report = grid.rebase(start, end, &existing)?;
        self.flush(&mut grid);
        Ok(report)
    }

    pub async fn committed_selection(&self) -> Vec<CommittedNight> {
        self.grid.lock().await.committed_selection()
    }

    fn flush(&self, grid: &mut SelectionGrid) {
        for event in grid.drain_events() {
            self.notify.send(event);
        }
    }
}

/// Open grid sessions, one per booking form. Discarding a form drops its
/// grid and everything staged in it.
pub struct SessionRegistry {
    sessions: DashMap<String, Arc<GridSession>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
        }
    }

    /// Get the session for `key`, or open one.
    pub async fn open(
        &self,
        key: &str,
        rooms: Vec<Room>,
        source: Arc<dyn RoomNightSource>,
        start: Night,
        end: Night,
        current_booking: Option<BookingId>,
    ) -> Result<Arc<GridSession>, SessionError> {
        if let Some(session) = self.sessions.get(key) {
            return Ok(session.value().clone());
        }
        if key.is_empty() || key.len() > MAX_SESSION_KEY_LEN {
            return Err(SessionError::LimitExceeded("session key length"));
        }
        if self.sessions.len() >= MAX_OPEN_SESSIONS {
            return Err(SessionError::LimitExceeded("too many open sessions"));
        }

        let session = Arc::new(GridSession::open(rooms, source, start, end, current_booking).await?);
        // A concurrent open of the same key may have won; keep the first.
        let session = self
            .sessions
            .entry(key.to_string())
            .or_insert(session)
            .value()
            .clone();
        metrics::gauge!(SESSIONS_ACTIVE).set(self.sessions.len() as f64);
        info!(key, "grid session opened");
        Ok(session)
    }

    pub fn get(&self, key: &str) -> Option<Arc<GridSession>> {
        self.sessions.get(key).map(|e| e.value().clone())
    }

    pub fn discard(&self, key: &str) -> bool {
        let removed = self.sessions.remove(key).is_some();
        if removed {
            metrics::gauge!(SESSIONS_ACTIVE).set(self.sessions.len() as f64);
            info!(key, "grid session discarded");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
