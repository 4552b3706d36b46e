use crate::model::*;

use super::availability::AvailabilityIndex;
use super::commit::PricePrompt;
use super::SelectionGrid;

impl SelectionGrid {
    /// State of one cell, or `None` if it is not on this grid.
    ///
    /// A cell staged for the single-mode price prompt still reads as `Empty`;
    /// `Pending` is only reported for multi-select batches.
    pub fn cell_state(&self, room_id: RoomId, date: Night) -> Option<CellState> {
        let addr = CellAddress::new(room_id, date);
        if !self.is_cell(&addr) {
            return None;
        }
        let state = if self.index.contains(&addr) {
            CellState::Booked
        } else if let Some(price) = self.committed.get(&addr) {
            CellState::Committed(*price)
        } else if self.mode == SelectionMode::Multi && self.pending.contains(&addr) {
            CellState::Pending
        } else {
            CellState::Empty
        };
        Some(state)
    }

    /// One room's row across the axis, for rendering.
    pub fn row(&self, room_id: RoomId) -> Vec<(Night, CellState)> {
        self.nights
            .iter()
            .filter_map(|&date| self.cell_state(room_id, date).map(|s| (date, s)))
            .collect()
    }

    /// The payload for the booking request, sorted by room then date.
    pub fn committed_selection(&self) -> Vec<CommittedNight> {
        self.committed
            .iter()
            .map(|(addr, price)| CommittedNight {
                room_id: addr.room_id,
                date: addr.date,
                price: *price,
            })
            .collect()
    }

    pub fn committed_len(&self) -> usize {
        self.committed.len()
    }

    pub fn is_committed(&self, addr: &CellAddress) -> bool {
        self.committed.contains_key(addr)
    }

    pub fn pending(&self) -> impl Iterator<Item = &CellAddress> {
        self.pending.iter()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    pub fn price_prompt(&self) -> Option<&PricePrompt> {
        self.prompt.as_ref()
    }

    pub fn confirm_request(&self) -> Option<&ConfirmRequest> {
        self.confirm.as_ref()
    }

    /// The batch `undo_last` would remove. `None` disables the control.
    pub fn undo_available(&self) -> Option<&SelectionBatch> {
        self.undo.peek()
    }

    pub fn nights(&self) -> &[Night] {
        &self.nights
    }

    pub fn range(&self) -> (Night, Night) {
        (self.start, self.end)
    }

    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    pub fn current_booking(&self) -> Option<&BookingId> {
        self.current_booking.as_ref()
    }

    pub fn availability(&self) -> &AvailabilityIndex {
        &self.index
    }

    /// Nights with no committed room. Advisory only; commits never check it.
    pub fn uncovered_nights(&self) -> Vec<Night> {
        self.nights
            .iter()
            .filter(|&&date| !self.committed.keys().any(|addr| addr.date == date))
            .copied()
            .collect()
    }

    pub fn total_price(&self) -> Price {
        self.committed
            .values()
            .fold(Price::ZERO, |acc, p| acc.saturating_add(*p))
    }
}
