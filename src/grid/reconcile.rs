use std::collections::HashSet;

use tracing::{info, warn};

use crate::limits::MAX_EXISTING_ROOM_NIGHTS;
use crate::model::*;
use crate::observability::{CELLS_REMOVED_TOTAL, RECONCILE_REMOVED, STALE_CONFLICTS_TOTAL};

use super::availability::AvailabilityIndex;
use super::axis::{build_axis, on_axis};
use super::{GridError, SelectionGrid};

/// What a reconciliation pass pruned.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Committed cells dropped (off-axis or claimed by another booking).
    pub removed: Vec<CellAddress>,
    /// Pending cells dropped because another booking claimed them.
    pub stale_pending: Vec<CellAddress>,
}

impl ReconcileReport {
    pub fn is_empty(&self) -> bool {
        self.removed.is_empty() && self.stale_pending.is_empty()
    }
}

/// Addresses that would not survive an axis of `[start, end)` against
/// `index`. Pure filter; only ever shrinks.
pub fn plan_reconcile<'a>(
    cells: impl IntoIterator<Item = &'a CellAddress>,
    start: Night,
    end: Night,
    index: &AvailabilityIndex,
) -> Vec<CellAddress> {
    cells
        .into_iter()
        .filter(|addr| !on_axis(start, end, addr.date) || index.contains(addr))
        .copied()
        .collect()
}

impl SelectionGrid {
    /// Prune the committed and pending sets against the current axis and
    /// index. Unconditional: any operator warning happens before calling.
    pub fn reconcile(&mut self) -> ReconcileReport {
        let removed = plan_reconcile(self.committed.keys(), self.start, self.end, &self.index);
        for addr in &removed {
            self.committed.remove(addr);
        }

        let stale_pending = plan_reconcile(self.pending.iter(), self.start, self.end, &self.index);
        if !stale_pending.is_empty() {
            for addr in &stale_pending {
                self.pending.remove(addr);
            }
            warn!(count = stale_pending.len(), "pending cells claimed by another booking, dropped");
            metrics::counter!(STALE_CONFLICTS_TOTAL).increment(stale_pending.len() as u64);
            let pending = self.pending.len();
            if pending == 0 {
                if self.prompt.take().is_some() {
                    self.emit(GridEvent::PricePromptClosed);
                }
            } else if let Some(prompt) = self.prompt.as_mut() {
                prompt.cells = pending;
            }
            self.emit(GridEvent::PendingChanged { pending });
        }

        if !removed.is_empty() {
            let gone: HashSet<&CellAddress> = removed.iter().collect();
            self.undo.retain(|addr| !gone.contains(addr));
            metrics::counter!(CELLS_REMOVED_TOTAL, "reason" => RemovalReason::Reconcile.as_str())
                .increment(removed.len() as u64);
            info!(count = removed.len(), "reconciliation removed committed cells");
            self.emit(GridEvent::Removed {
                cells: removed.clone(),
                reason: RemovalReason::Reconcile,
            });
        }
        metrics::histogram!(RECONCILE_REMOVED).record(removed.len() as f64);
        self.revalidate_confirm();

        self.emit(GridEvent::Reconciled {
            removed: removed.len(),
            stale_pending: stale_pending.len(),
        });
        ReconcileReport {
            removed,
            stale_pending,
        }
    }

    /// Committed cells a move to `[start, end)` would drop, without changing
    /// anything. Lets the caller decide whether to warn first.
    pub fn preview_reconcile(&self, start: Night, end: Night) -> Result<Vec<CellAddress>, GridError> {
        build_axis(start, end)?;
        Ok(plan_reconcile(self.committed.keys(), start, end, &self.index))
    }

    /// Move the axis to `[start, end)`. Pending cells are discarded, the
    /// committed set is reconciled. An invalid range changes nothing.
    pub fn set_range(&mut self, start: Night, end: Night) -> Result<ReconcileReport, GridError> {
        let nights = build_axis(start, end)?;
        self.apply_range(start, end, nights);
        Ok(self.reconcile())
    }

    /// Swap in a fresh availability snapshot and reconcile.
    pub fn replace_availability(&mut self, existing: &[ExistingRoomNight]) -> Result<ReconcileReport, GridError> {
        self.apply_index(existing)?;
        Ok(self.reconcile())
    }

    /// Range change and fresh snapshot together, reconciled once.
    pub fn rebase(
        &mut self,
        start: Night,
        end: Night,
        existing: &[ExistingRoomNight],
    ) -> Result<ReconcileReport, GridError> {
        let nights = build_axis(start, end)?;
        self.apply_index(existing)?;
        self.apply_range(start, end, nights);
        Ok(self.reconcile())
    }

    fn apply_range(&mut self, start: Night, end: Night, nights: Vec<Night>) {
        self.discard_pending();
        self.start = start;
        self.end = end;
        self.nights = nights;
        self.emit(GridEvent::RangeChanged { start, end });
    }

    fn apply_index(&mut self, existing: &[ExistingRoomNight]) -> Result<(), GridError> {
        if existing.len() > MAX_EXISTING_ROOM_NIGHTS {
            return Err(GridError::LimitExceeded("too many existing room-nights"));
        }
        self.index = AvailabilityIndex::build(existing, self.current_booking.as_ref());
        Ok(())
    }
}
