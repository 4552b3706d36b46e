use std::mem;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::limits::MAX_PRICE_CENTS;
use crate::model::*;
use crate::observability::{BATCHES_COMMITTED_TOTAL, CELLS_COMMITTED_TOTAL, STALE_CONFLICTS_TOTAL};

use super::{GridError, SelectionGrid};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptScope {
    /// One cell clicked in single mode.
    Single,
    /// The whole pending multi-select batch.
    Batch,
}

/// The open price dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricePrompt {
    pub scope: PromptScope,
    pub cells: usize,
    /// Last input that failed validation, shown back to the operator.
    pub rejected: Option<String>,
}

/// Parse operator input into a price within limits.
pub fn validate_price(input: &str) -> Result<Price, GridError> {
    let price = Price::parse(input).ok_or_else(|| GridError::InvalidPrice(input.trim().to_string()))?;
    check_price_limit(price)?;
    Ok(price)
}

fn check_price_limit(price: Price) -> Result<(), GridError> {
    if price.cents() > MAX_PRICE_CENTS {
        return Err(GridError::LimitExceeded("price too large"));
    }
    Ok(())
}

impl SelectionGrid {
    pub(super) fn open_prompt(&mut self, scope: PromptScope) {
        let cells = self.pending.len();
        self.prompt = Some(PricePrompt {
            scope,
            cells,
            rejected: None,
        });
        self.emit(GridEvent::PricePromptOpened { cells });
    }

    /// Open the price prompt for the pending batch. No-op if one is already
    /// open.
    pub fn open_price_prompt(&mut self) -> Result<(), GridError> {
        if self.pending.is_empty() {
            return Err(GridError::NothingPending);
        }
        if self.prompt.is_some() {
            return Ok(());
        }
        if self.confirm.is_some() {
            return Err(GridError::ModalOpen);
        }
        let scope = match self.mode {
            SelectionMode::Single => PromptScope::Single,
            SelectionMode::Multi => PromptScope::Batch,
        };
        self.open_prompt(scope);
        Ok(())
    }

    /// Submit the operator's text to the open prompt.
    ///
    /// Invalid input leaves the prompt open with `rejected` set and changes
    /// nothing else. Valid input commits and closes it.
    pub fn submit_price(&mut self, input: &str) -> Result<usize, GridError> {
        let Some(prompt) = self.prompt.as_mut() else {
            return Err(GridError::NoPricePrompt);
        };
        let price = match validate_price(input) {
            Ok(price) => price,
            Err(e) => {
                debug!(input, "price rejected");
                prompt.rejected = Some(input.to_string());
                return Err(e);
            }
        };
        let scope = prompt.scope;
        match scope {
            PromptScope::Single => self.commit_single(price),
            PromptScope::Batch => self.commit_batch(price),
        }
    }

    /// Commit the one pending cell at `price`.
    pub fn commit_single(&mut self, price: Price) -> Result<usize, GridError> {
        if self.confirm.is_some() {
            return Err(GridError::ModalOpen);
        }
        check_price_limit(price)?;
        match self.pending.len() {
            0 => Err(GridError::NothingPending),
            1 => Ok(self.commit_pending(price)),
            found => Err(GridError::PendingMismatch { expected: 1, found }),
        }
    }

    /// Commit every pending cell at the same `price` and return to single
    /// mode. An empty batch is a no-op. Refused while a confirmation is open.
    pub fn commit_batch(&mut self, price: Price) -> Result<usize, GridError> {
        if self.confirm.is_some() {
            return Err(GridError::ModalOpen);
        }
        if self.pending.is_empty() {
            return Ok(0);
        }
        check_price_limit(price)?;
        let committed = self.commit_pending(price);
        if self.mode != SelectionMode::Single {
            self.mode = SelectionMode::Single;
            self.emit(GridEvent::ModeChanged {
                mode: SelectionMode::Single,
            });
        }
        Ok(committed)
    }

    fn commit_pending(&mut self, price: Price) -> usize {
        let staged = mem::take(&mut self.pending);
        let (stale, cells): (Vec<CellAddress>, Vec<CellAddress>) =
            staged.into_iter().partition(|addr| self.index.contains(addr));
        if !stale.is_empty() {
            warn!(count = stale.len(), "staged cells claimed by another booking, dropped");
            metrics::counter!(STALE_CONFLICTS_TOTAL).increment(stale.len() as u64);
        }

        for addr in &cells {
            self.committed.insert(*addr, price);
        }
        if self.prompt.take().is_some() {
            self.emit(GridEvent::PricePromptClosed);
        }
        self.emit(GridEvent::PendingChanged { pending: 0 });

        let count = cells.len();
        if count == 0 {
            return 0;
        }
        let batch = SelectionBatch::new(cells, price);
        metrics::counter!(CELLS_COMMITTED_TOTAL).increment(count as u64);
        metrics::counter!(BATCHES_COMMITTED_TOTAL).increment(1);
        info!(batch = %batch.id, count, %price, "cells committed");
        self.emit(GridEvent::Committed {
            batch: batch.id,
            cells: batch.cells.clone(),
            price,
        });
        self.undo.push(batch);
        count
    }
}
