/// Longest stay the axis will build (one leap year of nights).
pub const MAX_NIGHTS_PER_AXIS: usize = 366;

pub const MAX_ROOMS: usize = 2_000;

/// Existing room-nights accepted from the booking service per index build.
pub const MAX_EXISTING_ROOM_NIGHTS: usize = 1_000_000;

/// 10 million in minor units.
pub const MAX_PRICE_CENTS: u64 = 1_000_000_000;

pub const MAX_OPEN_SESSIONS: usize = 1_024;

pub const MAX_SESSION_KEY_LEN: usize = 128;

/// Grid events kept in the outbox between drains.
pub const MAX_BUFFERED_EVENTS: usize = 4_096;
