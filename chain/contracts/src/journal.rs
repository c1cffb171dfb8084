//! Undo journal for withdrawal call frames
//!
//! A withdrawal mutates vault state before it hands value to the gateway.
//! If the gateway then reports failure, every mutation made since the
//! withdrawal began has to disappear, including mutations made by calls
//! that re-entered the vault from inside the gateway. The journal records
//! the previous value of each touched field while at least one withdrawal
//! frame is open, and hands entries back in reverse order on rollback.
//!
//! Outside of any frame nothing is recorded: a top-level deposit has no
//! external interaction and cannot be partially applied.

use vault_types::ids::AccountId;
use vault_types::numeric::Wei;

/// Previous value of a single piece of vault state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JournalEntry {
    /// Balance of `account` before the change; `None` if it had no entry.
    Balance {
        account: AccountId,
        previous: Option<Wei>,
    },
    /// Custody holdings before the change.
    Custody { previous: Wei },
    DepositCounted,
    WithdrawalCounted,
    /// An event was appended to the log.
    EventEmitted,
}

/// Position in the journal at which a frame was opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use = "a frame must be committed or rolled back"]
pub struct Checkpoint {
    mark: usize,
    depth: usize,
}

impl Checkpoint {
    /// Nesting depth of the frame this checkpoint opened (1 = outermost).
    pub fn depth(&self) -> usize {
        self.depth
    }
}

#[derive(Debug, Clone, Default)]
pub struct Journal {
    entries: Vec<JournalEntry>,
    depth: usize,
}

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a frame. Frames nest; entries are kept until the outermost one
    /// closes.
    pub fn open(&mut self) -> Checkpoint {
        self.depth += 1;
        Checkpoint {
            mark: self.entries.len(),
            depth: self.depth,
        }
    }

    /// Record an undo entry. No-op when no frame is open.
    pub fn record(&mut self, entry: JournalEntry) {
        if self.depth > 0 {
            self.entries.push(entry);
        }
    }

    /// Close a frame keeping its effects. Entries stay around while an
    /// enclosing frame may still roll back.
    pub fn commit(&mut self, checkpoint: Checkpoint) {
        debug_assert_eq!(checkpoint.depth, self.depth, "frames must close in LIFO order");
        self.close();
    }

    /// Close a frame discarding its effects. Returns the undo entries newest
    /// first; the caller applies them in that order.
    pub fn rollback(&mut self, checkpoint: Checkpoint) -> Vec<JournalEntry> {
        debug_assert_eq!(checkpoint.depth, self.depth, "frames must close in LIFO order");
        let mut undone = self.entries.split_off(checkpoint.mark);
        undone.reverse();
        self.close();
        undone
    }

    /// Whether a withdrawal frame is currently open.
    pub fn in_frame(&self) -> bool {
        self.depth > 0
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn close(&mut self) {
        self.depth = self.depth.saturating_sub(1);
        if self.depth == 0 {
            self.entries.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_outside_frame_is_ignored() {
        let mut journal = Journal::new();
        journal.record(JournalEntry::DepositCounted);
        assert!(journal.is_empty());
        assert!(!journal.in_frame());
    }

    #[test]
    fn test_commit_outermost_clears_entries() {
        let mut journal = Journal::new();
        let cp = journal.open();
        journal.record(JournalEntry::WithdrawalCounted);
        assert_eq!(journal.len(), 1);
        journal.commit(cp);
        assert!(journal.is_empty());
        assert_eq!(journal.depth(), 0);
    }

    #[test]
    fn test_rollback_returns_newest_first() {
        let mut journal = Journal::new();
        let cp = journal.open();
        journal.record(JournalEntry::Custody {
            previous: Wei::from_wei(5),
        });
        journal.record(JournalEntry::WithdrawalCounted);
        let undone = journal.rollback(cp);
        assert_eq!(
            undone,
            vec![
                JournalEntry::WithdrawalCounted,
                JournalEntry::Custody {
                    previous: Wei::from_wei(5)
                },
            ]
        );
        assert!(!journal.in_frame());
    }

    #[test]
    fn test_inner_commit_is_undone_by_outer_rollback() {
        let mut journal = Journal::new();
        let outer = journal.open();
        journal.record(JournalEntry::WithdrawalCounted);

        let inner = journal.open();
        assert_eq!(inner.depth(), 2);
        journal.record(JournalEntry::EventEmitted);
        journal.commit(inner);
        assert_eq!(journal.len(), 2, "inner entries survive until outer closes");

        let undone = journal.rollback(outer);
        assert_eq!(
            undone,
            vec![JournalEntry::EventEmitted, JournalEntry::WithdrawalCounted]
        );
    }

    #[test]
    fn test_inner_rollback_keeps_outer_entries() {
        let mut journal = Journal::new();
        let outer = journal.open();
        journal.record(JournalEntry::WithdrawalCounted);

        let inner = journal.open();
        journal.record(JournalEntry::DepositCounted);
        let undone = journal.rollback(inner);
        assert_eq!(undone, vec![JournalEntry::DepositCounted]);
        assert_eq!(journal.len(), 1);
        assert!(journal.in_frame());

        journal.commit(outer);
        assert!(journal.is_empty());
    }
}
