use std::collections::BTreeSet;

use tracing::{debug, info};

use crate::model::*;
use crate::observability::{CELLS_REMOVED_TOTAL, TOGGLE_IGNORED_TOTAL};

use super::commit::PromptScope;
use super::{GridError, SelectionGrid};

/// What a pointer interaction did. Rejections are `Ignored`, never errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// Booked, off-grid, unknown room, or a modal is open.
    Ignored,
    PricePromptOpened,
    Staged,
    Unstaged,
    ConfirmRequested,
    ColumnSelected { added: usize },
    ColumnCleared { removed: usize },
}

impl SelectionGrid {
    fn modal_open(&self) -> bool {
        self.prompt.is_some() || self.confirm.is_some()
    }

    fn ignore(&self, addr: Option<&CellAddress>) -> ToggleOutcome {
        metrics::counter!(TOGGLE_IGNORED_TOTAL).increment(1);
        match addr {
            Some(addr) => debug!(%addr, "toggle ignored"),
            None => debug!("toggle ignored"),
        }
        ToggleOutcome::Ignored
    }

    /// Click on a cell.
    ///
    /// Booked cells are inert. A committed cell asks to be deselected in
    /// either mode. An empty cell opens the one-cell price prompt in single
    /// mode, or flips its membership in the pending batch in multi mode.
    pub fn toggle_cell(&mut self, room_id: RoomId, date: Night) -> ToggleOutcome {
        let addr = CellAddress::new(room_id, date);
        if !self.is_cell(&addr) || self.index.contains(&addr) || self.modal_open() {
            return self.ignore(Some(&addr));
        }

        if self.committed.contains_key(&addr) {
            self.request_confirm(ConfirmRequest::Deselect { cells: vec![addr] });
            return ToggleOutcome::ConfirmRequested;
        }

        match self.mode {
            SelectionMode::Single => {
                self.pending.clear();
                self.pending.insert(addr);
                self.open_prompt(PromptScope::Single);
                debug!(%addr, "staged for single commit");
                ToggleOutcome::PricePromptOpened
            }
            SelectionMode::Multi => {
                let outcome = if self.pending.remove(&addr) {
                    ToggleOutcome::Unstaged
                } else {
                    self.pending.insert(addr);
                    ToggleOutcome::Staged
                };
                debug!(%addr, ?outcome, pending = self.pending.len(), "batch toggle");
                self.emit(GridEvent::PendingChanged {
                    pending: self.pending.len(),
                });
                outcome
            }
        }
    }

    /// Select-all / deselect-all over the free cells of one room's column.
    ///
    /// Forces multi mode. If every free cell of the column is already
    /// pending they are all unstaged; otherwise the missing ones are staged.
    pub fn toggle_room_column(&mut self, room_id: RoomId) -> ToggleOutcome {
        if !self.room_ids.contains(&room_id) || self.modal_open() {
            return self.ignore(None);
        }
        self.set_mode(SelectionMode::Multi);

        let column: Vec<CellAddress> = self
            .nights
            .iter()
            .map(|&date| CellAddress::new(room_id, date))
            .filter(|addr| self.is_free(addr))
            .collect();
        if column.is_empty() {
            debug!(%room_id, "column has no free cells");
            return ToggleOutcome::ColumnSelected { added: 0 };
        }

        let outcome = if column.iter().all(|addr| self.pending.contains(addr)) {
            for addr in &column {
                self.pending.remove(addr);
            }
            ToggleOutcome::ColumnCleared {
                removed: column.len(),
            }
        } else {
            let mut added = 0;
            for addr in column {
                if self.pending.insert(addr) {
                    added += 1;
                }
            }
            ToggleOutcome::ColumnSelected { added }
        };

        debug!(%room_id, ?outcome, pending = self.pending.len(), "column toggle");
        self.emit(GridEvent::PendingChanged {
            pending: self.pending.len(),
        });
        outcome
    }

    /// Any mode change abandons the in-progress selection: leaving multi
    /// drops the batch, entering multi aborts an open one-cell prompt.
    pub fn set_mode(&mut self, mode: SelectionMode) {
        if self.mode == mode {
            return;
        }
        self.discard_pending();
        self.mode = mode;
        debug!(?mode, "mode changed");
        self.emit(GridEvent::ModeChanged { mode });
    }

    /// Drop the pending set and close the price prompt without committing.
    /// Returns false if there was nothing to cancel.
    pub fn cancel_pending(&mut self) -> bool {
        self.discard_pending()
    }

    pub(super) fn discard_pending(&mut self) -> bool {
        let had_pending = !self.pending.is_empty();
        self.pending.clear();
        if had_pending {
            self.emit(GridEvent::PendingChanged { pending: 0 });
        }
        let had_prompt = self.prompt.take().is_some();
        if had_prompt {
            self.emit(GridEvent::PricePromptClosed);
        }
        had_pending || had_prompt
    }

    // ── Destructive operations (two-phase) ──────────────────────

    fn request_confirm(&mut self, request: ConfirmRequest) {
        debug!(?request, "confirmation requested");
        self.confirm = Some(request.clone());
        self.emit(GridEvent::ConfirmRequested { request });
    }

    /// Ask to remove committed cells. Addresses that are not committed are
    /// skipped; returns false when none are, or while the price prompt is
    /// open.
    pub fn deselect(&mut self, addresses: &[CellAddress]) -> bool {
        if self.prompt.is_some() {
            return false;
        }
        let cells: BTreeSet<CellAddress> = addresses
            .iter()
            .filter(|addr| self.committed.contains_key(*addr))
            .copied()
            .collect();
        if cells.is_empty() {
            return false;
        }
        self.request_confirm(ConfirmRequest::Deselect {
            cells: cells.into_iter().collect(),
        });
        true
    }

    /// Ask to empty the committed set, the pending set and the undo slot.
    pub fn clear_all(&mut self) -> bool {
        if self.prompt.is_some() {
            return false;
        }
        if self.committed.is_empty() && self.pending.is_empty() && self.undo.peek().is_none() {
            return false;
        }
        self.request_confirm(ConfirmRequest::ClearAll);
        true
    }

    /// Ask to remove the most recent batch. False when the slot is empty.
    pub fn undo_last(&mut self) -> bool {
        if self.prompt.is_some() {
            return false;
        }
        let Some(batch) = self.undo.peek() else {
            return false;
        };
        let request = ConfirmRequest::Undo {
            batch: batch.id,
            cells: batch.len(),
        };
        self.request_confirm(request);
        true
    }

    /// Apply the staged destructive request. Returns the number of committed
    /// cells removed.
    pub fn confirm(&mut self) -> Result<usize, GridError> {
        let request = self.confirm.take().ok_or(GridError::NothingToConfirm)?;
        let removed = match request {
            ConfirmRequest::Deselect { cells } => self.remove_committed(&cells, RemovalReason::Deselect),
            ConfirmRequest::ClearAll => {
                let cells: Vec<CellAddress> = self.committed.keys().copied().collect();
                self.discard_pending();
                self.undo.clear();
                self.remove_committed(&cells, RemovalReason::Clear)
            }
            ConfirmRequest::Undo { batch, .. } => match self.undo.pop() {
                Some(last) if last.id == batch => self.remove_committed(&last.cells, RemovalReason::Undo),
                Some(last) => {
                    // A newer batch landed after the request was staged.
                    self.undo.push(last);
                    0
                }
                None => 0,
            },
        };
        self.emit(GridEvent::ConfirmResolved { removed });
        Ok(removed)
    }

    /// Re-check a staged request after the committed set shrank underneath
    /// it. A `Deselect` narrows to the cells still committed; a request left
    /// with nothing to do is dismissed.
    pub(super) fn revalidate_confirm(&mut self) {
        let Some(staged) = self.confirm.take() else {
            return;
        };
        let revised = match &staged {
            ConfirmRequest::Deselect { cells } => {
                let cells: Vec<CellAddress> = cells
                    .iter()
                    .filter(|addr| self.committed.contains_key(*addr))
                    .copied()
                    .collect();
                (!cells.is_empty()).then_some(ConfirmRequest::Deselect { cells })
            }
            ConfirmRequest::ClearAll => {
                let anything = !self.committed.is_empty() || !self.pending.is_empty() || self.undo.peek().is_some();
                anything.then_some(ConfirmRequest::ClearAll)
            }
            ConfirmRequest::Undo { batch, .. } => match self.undo.peek() {
                Some(last) if last.id == *batch => Some(ConfirmRequest::Undo {
                    batch: *batch,
                    cells: last.len(),
                }),
                _ => None,
            },
        };

        match revised {
            Some(request) if request == staged => self.confirm = Some(staged),
            Some(request) => self.request_confirm(request),
            None => {
                debug!(?staged, "confirmation no longer applies");
                self.emit(GridEvent::ConfirmDismissed);
            }
        }
    }

    /// Close the confirmation without applying it.
    pub fn dismiss(&mut self) -> bool {
        if self.confirm.take().is_some() {
            self.emit(GridEvent::ConfirmDismissed);
            true
        } else {
            false
        }
    }

    pub(super) fn remove_committed(&mut self, cells: &[CellAddress], reason: RemovalReason) -> usize {
        let removed: Vec<CellAddress> = cells
            .iter()
            .filter(|addr| self.committed.remove(*addr).is_some())
            .copied()
            .collect();
        if removed.is_empty() {
            return 0;
        }
        if reason != RemovalReason::Undo {
            let gone: BTreeSet<&CellAddress> = removed.iter().collect();
            self.undo.retain(|addr| !gone.contains(addr));
        }
        metrics::counter!(CELLS_REMOVED_TOTAL, "reason" => reason.as_str()).increment(removed.len() as u64);
        info!(count = removed.len(), reason = reason.as_str(), "committed cells removed");
        let count = removed.len();
        self.emit(GridEvent::Removed {
            cells: removed,
            reason,
        });
        count
    }
}
