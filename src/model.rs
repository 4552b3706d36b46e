use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// One stay-night. Calendar date, no time component.
pub type Night = NaiveDate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(pub u32);

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "room#{}", self.0)
    }
}

/// Identifier of a booking as issued by the booking service (e.g. `BKN-5`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookingId(pub String);

impl From<&str> for BookingId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for BookingId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for BookingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    pub name: String,
}

impl Room {
    pub fn new(id: u32, name: impl Into<String>) -> Self {
        Self {
            id: RoomId(id),
            name: name.into(),
        }
    }
}

/// A `(room, night)` pair. Ordered by room first, then date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellAddress {
    pub room_id: RoomId,
    pub date: Night,
}

impl CellAddress {
    pub fn new(room_id: RoomId, date: Night) -> Self {
        Self { room_id, date }
    }
}

impl fmt::Display for CellAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.room_id, self.date)
    }
}

/// Non-negative amount in minor units (two decimal places).
///
/// Serializes as a decimal string (`"100.00"`) so the payload never goes
/// through a float.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Price {
    cents: u64,
}

impl Price {
    pub const ZERO: Price = Price { cents: 0 };

    pub fn from_cents(cents: u64) -> Self {
        Self { cents }
    }

    pub fn from_units(units: u64) -> Self {
        Self {
            cents: units.saturating_mul(100),
        }
    }

    pub fn cents(&self) -> u64 {
        self.cents
    }

    /// Parse operator input. Accepts `100`, `100.5`, `100.50`, surrounding
    /// whitespace. Rejects signs, exponents, more than two decimals and
    /// anything that overflows.
    pub fn parse(input: &str) -> Option<Price> {
        let s = input.trim();
        if s.is_empty() {
            return None;
        }
        let (whole, frac) = match s.split_once('.') {
            Some((w, f)) => (w, f),
            None => (s, ""),
        };
        if whole.is_empty() && frac.is_empty() {
            return None;
        }
        if frac.len() > 2 || s.matches('.').count() > 1 {
            return None;
        }
        if !whole.bytes().all(|b| b.is_ascii_digit()) || !frac.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let units: u64 = if whole.is_empty() { 0 } else { whole.parse().ok()? };
        let frac_cents: u64 = match frac.len() {
            0 => 0,
            1 => frac.parse::<u64>().ok()? * 10,
            _ => frac.parse().ok()?,
        };
        let cents = units.checked_mul(100)?.checked_add(frac_cents)?;
        Some(Price { cents })
    }

    pub fn saturating_add(self, other: Price) -> Price {
        Price {
            cents: self.cents.saturating_add(other.cents),
        }
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.cents / 100, self.cents % 100)
    }
}

impl TryFrom<String> for Price {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Price::parse(&s).ok_or_else(|| format!("invalid price: {s:?}"))
    }
}

impl From<Price> for String {
    fn from(p: Price) -> Self {
        p.to_string()
    }
}

/// The four mutually exclusive states of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellState {
    /// Occupied by a different booking. Inert.
    Booked,
    Committed(Price),
    /// Staged in a multi-select batch, not yet priced.
    Pending,
    Empty,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionMode {
    #[default]
    Single,
    Multi,
}

/// A room-night known to the booking service, tagged with its owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExistingRoomNight {
    pub room_id: RoomId,
    pub date: Night,
    pub booking_id: BookingId,
    pub price: Price,
}

impl ExistingRoomNight {
    pub fn address(&self) -> CellAddress {
        CellAddress::new(self.room_id, self.date)
    }
}

/// One entry of the payload merged into the booking create/update request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommittedNight {
    pub room_id: RoomId,
    pub date: Night,
    pub price: Price,
}

/// Cells committed together by one price prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionBatch {
    pub id: Ulid,
    pub cells: Vec<CellAddress>,
    pub price: Price,
}

impl SelectionBatch {
    pub fn new(cells: Vec<CellAddress>, price: Price) -> Self {
        Self {
            id: Ulid::new(),
            cells,
            price,
        }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemovalReason {
    Deselect,
    Clear,
    Undo,
    Reconcile,
}

impl RemovalReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RemovalReason::Deselect => "deselect",
            RemovalReason::Clear => "clear",
            RemovalReason::Undo => "undo",
            RemovalReason::Reconcile => "reconcile",
        }
    }
}

/// What a staged destructive request will do once confirmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfirmRequest {
    Deselect { cells: Vec<CellAddress> },
    ClearAll,
    Undo { batch: Ulid, cells: usize },
}

/// Grid transitions, flat. Drained by the session and broadcast to listeners.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GridEvent {
    PendingChanged {
        pending: usize,
    },
    PricePromptOpened {
        cells: usize,
    },
    PricePromptClosed,
    Committed {
        batch: Ulid,
        cells: Vec<CellAddress>,
        price: Price,
    },
    ConfirmRequested {
        request: ConfirmRequest,
    },
    ConfirmDismissed,
    /// The staged request was applied; `removed` may be zero.
    ConfirmResolved {
        removed: usize,
    },
    Removed {
        cells: Vec<CellAddress>,
        reason: RemovalReason,
    },
    ModeChanged {
        mode: SelectionMode,
    },
    RangeChanged {
        start: Night,
        end: Night,
    },
    Reconciled {
        removed: usize,
        stale_pending: usize,
    },
}
