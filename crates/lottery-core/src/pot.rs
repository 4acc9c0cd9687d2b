// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// BLOCK-HASH LOTTERY - POT LEDGER
//
// Funds owned by no bettor. Grows by every failed stake, drained by a full match.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use serde::{Deserialize, Serialize};

/// Funds that belong to no specific bettor.
///
/// Grows by the stake of every failed wager and is drained to zero by the
/// next full match.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct PotLedger {
    #[serde(with = "crate::u128_str")]
    balance: u128,
}

impl PotLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn balance(&self) -> u128 {
        self.balance
    }

    pub fn credit(&mut self, amount: u128) {
        self.balance = self.balance.saturating_add(amount);
    }

    /// Read and zero the pot in one step. Returns the prior balance.
    pub fn debit_all(&mut self) -> u128 {
        std::mem::take(&mut self.balance)
    }

    /// Used only to undo an aborted call.
    pub(crate) fn restore(&mut self, balance: u128) {
        self.balance = balance;
    }
}
