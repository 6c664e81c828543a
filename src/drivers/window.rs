use crate::error::{Result, SqlError};

/// Forward-only position over `min(max_rows, available)` rows.
/// A `max_rows` of 0 exposes every available row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RowWindow {
    bound: usize,
    position: usize,
    exhausted: bool,
}

impl RowWindow {
    pub(crate) fn new(available: usize, max_rows: usize) -> Self {
        let bound = match max_rows {
            0 => available,
            n => n.min(available),
        };
        Self {
            bound,
            position: 0,
            exhausted: false,
        }
    }

    /// 0-based index of the row the next advance would move onto.
    pub(crate) fn upcoming(&self) -> Option<usize> {
        if self.exhausted || self.position >= self.bound {
            return None;
        }
        Some(self.position)
    }

    /// Moves onto the upcoming row, or marks the window exhausted.
    pub(crate) fn advance(&mut self) -> bool {
        if self.upcoming().is_some() {
            self.position += 1;
            true
        } else {
            self.exhausted = true;
            false
        }
    }

    /// 0-based index of the current row.
    pub(crate) fn current(&self) -> Result<usize> {
        if self.position == 0 || self.exhausted {
            return Err(SqlError::NoCurrentRow);
        }
        Ok(self.position - 1)
    }
}
