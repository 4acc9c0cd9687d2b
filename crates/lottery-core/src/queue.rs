// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// BLOCK-HASH LOTTERY - WAGER QUEUE
//
// Append-only wager history with a single head cursor.
// Indices below `head` are resolved, indices at or above it are not.
// `head` never moves backwards except when the engine undoes an aborted call.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use crate::error::{LotteryError, LotteryResult};
use crate::Wager;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct WagerQueue {
    wagers: Vec<Wager>,
    head: usize,
}

impl WagerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a wager. Returns its index.
    pub fn append(&mut self, wager: Wager) -> usize {
        self.wagers.push(wager);
        self.wagers.len() - 1
    }

    /// Oldest unresolved wager, if any.
    pub fn peek_head(&self) -> Option<&Wager> {
        self.wagers.get(self.head)
    }

    /// Mark the head resolved and move past it.
    pub fn advance_head(&mut self) -> LotteryResult<()> {
        let wager = self
            .wagers
            .get_mut(self.head)
            .ok_or(LotteryError::QueueDrained)?;
        wager.resolved = true;
        self.head += 1;
        Ok(())
    }

    pub fn get(&self, index: usize) -> LotteryResult<&Wager> {
        self.wagers.get(index).ok_or(LotteryError::NotFound {
            index,
            len: self.wagers.len(),
        })
    }

    pub fn head(&self) -> usize {
        self.head
    }

    pub fn len(&self) -> usize {
        self.wagers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wagers.is_empty()
    }

    pub fn is_drained(&self) -> bool {
        self.head >= self.wagers.len()
    }

    /// Every wager ever placed, resolved or not.
    pub fn iter(&self) -> impl Iterator<Item = &Wager> {
        self.wagers.iter()
    }

    /// Unresolved wagers in FIFO order.
    pub fn pending(&self) -> impl Iterator<Item = &Wager> {
        self.wagers[self.head.min(self.wagers.len())..].iter()
    }

    pub fn pending_count(&self) -> usize {
        self.wagers.len().saturating_sub(self.head)
    }

    /// Sum of stakes still waiting for judgement. `None` on overflow.
    pub fn unresolved_total(&self) -> Option<u128> {
        self.pending()
            .try_fold(0u128, |acc, w| acc.checked_add(w.amount))
    }

    /// Roll back to an earlier `(len, head)` pair taken before an aborted call.
    pub(crate) fn restore(&mut self, len: usize, head: usize) {
        self.wagers.truncate(len);
        for wager in self.wagers.iter_mut().skip(head) {
            wager.resolved = false;
        }
        self.head = head.min(self.wagers.len());
    }

    /// Check the resolved/unresolved split around `head`.
    pub fn is_consistent(&self) -> bool {
        self.head <= self.wagers.len()
            && self
                .wagers
                .iter()
                .enumerate()
                .all(|(i, w)| w.resolved == (i < self.head))
    }
}
