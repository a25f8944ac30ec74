//! Range-shift planning for a single-item move.
//!
//! Moving an item from rank `from` to rank `to` vacates `from` and needs a
//! free slot at `to`. Every item strictly between the two ranks, plus the one
//! currently at `to`, moves by exactly one step towards the vacated slot:
//!
//! - `to > from` (move later): ranks in `(from, to]` shift back by one
//! - `to < from` (move earlier): ranks in `[to, from)` shift forward by one
//!
//! Items outside the span keep their rank. [`Shift::plan`] is pure; the store
//! turns the plan into one ranged `UPDATE` inside its transaction.

/// The range update implied by moving one item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shift {
    /// Source and target rank are equal; nothing moves.
    None,
    /// Ranks in `(after, through]` decrease by one.
    Back { after: u32, through: u32 },
    /// Ranks in `[from, before)` increase by one.
    Forward { from: u32, before: u32 },
}

impl Shift {
    /// Plan the shift for moving the item at rank `current` to rank `target`.
    #[must_use]
    pub const fn plan(current: u32, target: u32) -> Self {
        if target > current {
            Self::Back {
                after: current,
                through: target,
            }
        } else if target < current {
            Self::Forward {
                from: target,
                before: current,
            }
        } else {
            Self::None
        }
    }

    /// Rank that an item *other than the moved one* ends up at.
    #[must_use]
    pub const fn apply(self, position: u32) -> u32 {
        match self {
            Self::Back { after, through } if position > after && position <= through => {
                position - 1
            }
            Self::Forward { from, before } if position >= from && position < before => {
                position + 1
            }
            _ => position,
        }
    }

    /// Number of neighbouring items the shift touches.
    #[must_use]
    pub const fn span(self) -> u32 {
        match self {
            Self::None => 0,
            Self::Back { after, through } => through - after,
            Self::Forward { from, before } => before - from,
        }
    }

    /// The ranged `UPDATE` statement and its two bounds, or `None` for a no-op.
    #[must_use]
    pub(crate) fn statement(self) -> Option<(&'static str, i64, i64)> {
        match self {
            Self::None => None,
            Self::Back { after, through } => Some((
                "UPDATE items SET position = position - 1 WHERE position > ?1 AND position <= ?2",
                i64::from(after),
                i64::from(through),
            )),
            Self::Forward { from, before } => Some((
                "UPDATE items SET position = position + 1 WHERE position >= ?1 AND position < ?2",
                i64::from(from),
                i64::from(before),
            )),
        }
    }

    /// Short label for logs.
    #[must_use]
    pub const fn direction(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Back { .. } => "back",
            Self::Forward { .. } => "forward",
        }
    }
}
