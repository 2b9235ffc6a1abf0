use crate::error::{Result, ReviewError};
use crate::review::ledger::{Exception, Ledger};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Forward => write!(f, "after this one"),
            Direction::Backward => write!(f, "before this one"),
        }
    }
}

/// The reviewer's place in the ledger.
///
/// A fresh cursor sits before the first entry; the first forward step lands
/// on entry 0.
#[derive(Debug, Clone, Default)]
pub struct Cursor {
    position: Option<usize>,
    unresolved_only: bool,
}

impl Cursor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.position = None;
    }

    pub fn position(&self) -> Option<usize> {
        self.position
    }

    pub fn unresolved_only(&self) -> bool {
        self.unresolved_only
    }

    pub fn set_unresolved_only(&mut self, on: bool) {
        self.unresolved_only = on;
    }

    pub fn current<'a>(&self, ledger: &'a Ledger) -> Result<&'a Exception> {
        let index = self.position.ok_or(ReviewError::NoCurrentException)?;
        ledger.get(index).ok_or(ReviewError::OutOfRange {
            index,
            len: ledger.len(),
        })
    }

    pub fn advance(&mut self, ledger: &Ledger) -> Result<usize> {
        self.step(ledger, Direction::Forward)
    }

    pub fn retreat(&mut self, ledger: &Ledger) -> Result<usize> {
        self.step(ledger, Direction::Backward)
    }

    /// Move one entry in `direction`. With the unresolved-only filter on,
    /// keep moving past reviewed entries, visiting each entry at most once.
    /// The cursor does not move when the step fails.
    pub fn step(&mut self, ledger: &Ledger, direction: Direction) -> Result<usize> {
        let len = ledger.len();
        let mut index = next_index(self.position, direction);

        if index >= len {
            if self.unresolved_only && len > 0 {
                return Err(ReviewError::NoUnresolvedEntry(direction));
            }
            return Err(ReviewError::OutOfRange { index, len });
        }

        if self.unresolved_only {
            for _ in 0..len {
                if ledger.get(index).is_some_and(Exception::is_unresolved) {
                    self.position = Some(index);
                    return Ok(index);
                }
                let next = next_index(Some(index), direction);
                if next == index || next >= len {
                    break;
                }
                index = next;
            }
            return Err(ReviewError::NoUnresolvedEntry(direction));
        }

        self.position = Some(index);
        Ok(index)
    }
}

fn next_index(position: Option<usize>, direction: Direction) -> usize {
    match (position, direction) {
        (None, _) => 0,
        (Some(index), Direction::Forward) => index + 1,
        (Some(index), Direction::Backward) => index.saturating_sub(1),
    }
}
