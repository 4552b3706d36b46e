use crate::model::{CellAddress, SelectionBatch};

/// Single-slot undo memory. `push` overwrites; there is no history.
#[derive(Debug, Clone, Default)]
pub struct UndoSlot {
    last: Option<SelectionBatch>,
}

impl UndoSlot {
    pub fn new() -> Self {
        Self { last: None }
    }

    pub fn push(&mut self, batch: SelectionBatch) {
        self.last = Some(batch);
    }

    pub fn pop(&mut self) -> Option<SelectionBatch> {
        self.last.take()
    }

    pub fn peek(&self) -> Option<&SelectionBatch> {
        self.last.as_ref()
    }

    pub fn clear(&mut self) {
        self.last = None;
    }

    /// Drop addresses from the stored batch; an emptied batch empties the slot.
    pub(super) fn retain(&mut self, mut keep: impl FnMut(&CellAddress) -> bool) {
        if let Some(batch) = self.last.as_mut() {
            batch.cells.retain(|c| keep(c));
            if batch.cells.is_empty() {
                self.last = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Price, RoomId};
    use chrono::NaiveDate;

    fn cell(room: u32, day: u32) -> CellAddress {
        CellAddress::new(RoomId(room), NaiveDate::from_ymd_opt(2024, 4, day).unwrap())
    }

    #[test]
    fn push_overwrites() {
        let mut slot = UndoSlot::new();
        slot.push(SelectionBatch::new(vec![cell(1, 1)], Price::ZERO));
        slot.push(SelectionBatch::new(vec![cell(2, 1), cell(2, 2)], Price::ZERO));
        assert_eq!(slot.peek().unwrap().len(), 2);
        assert_eq!(slot.pop().unwrap().cells, vec![cell(2, 1), cell(2, 2)]);
        assert!(slot.pop().is_none());
    }

    #[test]
    fn peek_does_not_consume() {
        let mut slot = UndoSlot::new();
        assert!(slot.peek().is_none());
        slot.push(SelectionBatch::new(vec![cell(1, 1)], Price::ZERO));
        assert!(slot.peek().is_some());
        assert!(slot.peek().is_some());
        slot.clear();
        assert!(slot.peek().is_none());
    }

    #[test]
    fn retain_empties_slot_when_nothing_left() {
        let mut slot = UndoSlot::new();
        slot.push(SelectionBatch::new(vec![cell(1, 1), cell(1, 2)], Price::ZERO));
        slot.retain(|c| *c != cell(1, 1));
        assert_eq!(slot.peek().unwrap().cells, vec![cell(1, 2)]);
        slot.retain(|_| false);
        assert!(slot.peek().is_none());
    }
}
