use std::collections::HashMap;

use crate::model::*;

/// Room-nights claimed by *other* bookings. Read-only snapshot; rebuilt
/// wholesale from fresh data, never patched.
#[derive(Debug, Clone, Default)]
pub struct AvailabilityIndex {
    booked: HashMap<CellAddress, BookingId>,
}

impl AvailabilityIndex {
    /// Index `existing`, skipping entries owned by `current` so that editing a
    /// booking never conflicts with its own nights.
    pub fn build(existing: &[ExistingRoomNight], current: Option<&BookingId>) -> Self {
        let mut booked = HashMap::with_capacity(existing.len());
        for night in existing {
            if current.is_some_and(|id| *id == night.booking_id) {
                continue;
            }
            booked.insert(night.address(), night.booking_id.clone());
        }
        Self { booked }
    }

    pub fn is_booked(&self, room_id: RoomId, date: Night) -> bool {
        self.booked.contains_key(&CellAddress::new(room_id, date))
    }

    pub fn contains(&self, addr: &CellAddress) -> bool {
        self.booked.contains_key(addr)
    }

    /// Which booking holds the cell, for tooltips.
    pub fn booked_by(&self, addr: &CellAddress) -> Option<&BookingId> {
        self.booked.get(addr)
    }

    pub fn len(&self) -> usize {
        self.booked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.booked.is_empty()
    }
}
