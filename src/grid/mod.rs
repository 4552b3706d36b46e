mod availability;
mod axis;
mod commit;
mod error;
mod mutations;
mod queries;
mod reconcile;
mod undo;

pub use availability::AvailabilityIndex;
pub use axis::{build_axis, on_axis};
pub use commit::{validate_price, PricePrompt, PromptScope};
pub use error::GridError;
pub use mutations::ToggleOutcome;
pub use reconcile::{plan_reconcile, ReconcileReport};
pub use undo::UndoSlot;

use std::collections::{BTreeMap, BTreeSet, HashSet, VecDeque};

use tracing::{debug, warn};

use crate::limits::*;
use crate::model::*;

/// The room-night allocation grid for one booking form.
///
/// Owns the committed selection (the only thing that gets submitted), the
/// pending multi-select batch, the selection mode, at most one open modal
/// (price prompt or destructive-action confirmation), and the one-slot undo.
/// Every method is a synchronous state transition with no I/O.
pub struct SelectionGrid {
    rooms: Vec<Room>,
    room_ids: HashSet<RoomId>,
    start: Night,
    end: Night,
    nights: Vec<Night>,
    current_booking: Option<BookingId>,
    index: AvailabilityIndex,
    /// Unique per address; ordered so the payload comes out room-then-date.
    committed: BTreeMap<CellAddress, Price>,
    pending: BTreeSet<CellAddress>,
    mode: SelectionMode,
    prompt: Option<PricePrompt>,
    confirm: Option<ConfirmRequest>,
    undo: UndoSlot,
    /// Outbox; bounded, oldest dropped first.
    events: VecDeque<GridEvent>,
}

impl SelectionGrid {
    /// Build a grid for `[start, end)`.
    ///
    /// When `current_booking` is set (edit mode) the committed set is seeded
    /// with that booking's own nights that fall on the axis, and those nights
    /// are excluded from the booked index.
    pub fn new(
        rooms: Vec<Room>,
        existing: &[ExistingRoomNight],
        start: Night,
        end: Night,
        current_booking: Option<BookingId>,
    ) -> Result<Self, GridError> {
        if rooms.len() > MAX_ROOMS {
            return Err(GridError::LimitExceeded("too many rooms"));
        }
        if existing.len() > MAX_EXISTING_ROOM_NIGHTS {
            return Err(GridError::LimitExceeded("too many existing room-nights"));
        }
        let nights = build_axis(start, end)?;
        let room_ids: HashSet<RoomId> = rooms.iter().map(|r| r.id).collect();
        let index = AvailabilityIndex::build(existing, current_booking.as_ref());

        let mut committed = BTreeMap::new();
        if let Some(current) = current_booking.as_ref() {
            for night in existing.iter().filter(|n| n.booking_id == *current) {
                let addr = night.address();
                if !room_ids.contains(&addr.room_id) {
                    warn!(%addr, booking = %current, "own night on a room not in this grid, not seeded");
                    continue;
                }
                if !on_axis(start, end, addr.date) {
                    continue;
                }
                if index.contains(&addr) {
                    warn!(%addr, booking = %current, "own night also claimed by another booking, not seeded");
                    continue;
                }
                committed.insert(addr, night.price);
            }
        }

        debug!(
            rooms = rooms.len(),
            nights = nights.len(),
            booked = index.len(),
            seeded = committed.len(),
            "grid built"
        );

        Ok(Self {
            rooms,
            room_ids,
            start,
            end,
            nights,
            current_booking,
            index,
            committed,
            pending: BTreeSet::new(),
            mode: SelectionMode::Single,
            prompt: None,
            confirm: None,
            undo: UndoSlot::new(),
            events: VecDeque::new(),
        })
    }

    /// Take every event emitted since the last drain.
    pub fn drain_events(&mut self) -> Vec<GridEvent> {
        self.events.drain(..).collect()
    }

    pub(crate) fn emit(&mut self, event: GridEvent) {
        if self.events.len() >= MAX_BUFFERED_EVENTS {
            self.events.pop_front();
        }
        self.events.push_back(event);
    }

    /// Room is known and date is one of the axis nights.
    pub(crate) fn is_cell(&self, addr: &CellAddress) -> bool {
        self.room_ids.contains(&addr.room_id) && on_axis(self.start, self.end, addr.date)
    }

    /// Cell can be staged: on the grid, not booked, not committed.
    pub(crate) fn is_free(&self, addr: &CellAddress) -> bool {
        self.is_cell(addr) && !self.index.contains(addr) && !self.committed.contains_key(addr)
    }
}
