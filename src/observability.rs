// ── Grid transition metrics ─────────────────────────────────────
//
// Recorded through the `metrics` facade. The library installs no recorder;
// the host application decides where these go.

/// Counter: cells moved to Committed.
pub const CELLS_COMMITTED_TOTAL: &str = "nightgrid_cells_committed_total";

/// Counter: commits (single or batch) that committed at least one cell.
pub const BATCHES_COMMITTED_TOTAL: &str = "nightgrid_batches_committed_total";

/// Counter: cells removed from the committed set. Labels: reason.
pub const CELLS_REMOVED_TOTAL: &str = "nightgrid_cells_removed_total";

/// Counter: pointer toggles that changed nothing (booked, off-grid, modal open).
pub const TOGGLE_IGNORED_TOTAL: &str = "nightgrid_toggle_ignored_total";

/// Counter: staged cells dropped because another booking claimed them.
pub const STALE_CONFLICTS_TOTAL: &str = "nightgrid_stale_conflicts_total";

/// Histogram: committed cells removed per reconciliation pass.
pub const RECONCILE_REMOVED: &str = "nightgrid_reconcile_removed";

// ── Session metrics ─────────────────────────────────────────────

/// Gauge: open grid sessions.
pub const SESSIONS_ACTIVE: &str = "nightgrid_sessions_active";

/// Counter: availability fetches that failed at the source.
pub const SOURCE_FAILURES_TOTAL: &str = "nightgrid_source_failures_total";
