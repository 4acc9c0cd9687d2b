// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// BLOCK-HASH LOTTERY - FUNDS TRANSFER
//
// Moves value out of the lottery to a bettor. The ledger itself lives outside
// this crate; `InMemoryBank` stands in for it and records every payout so
// conservation can be audited.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use std::collections::{BTreeMap, BTreeSet};

pub trait FundsTransfer {
    /// Send `amount` to `to`. An `Err` means nothing was delivered.
    fn transfer(&mut self, to: &str, amount: u128) -> Result<(), String>;
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryBank {
    /// BTreeMap keeps iteration deterministic
    received: BTreeMap<String, u128>,
    rejecting: BTreeSet<String>,
    transfer_count: u64,
}

impl InMemoryBank {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total paid to `address` so far.
    pub fn received(&self, address: &str) -> u128 {
        self.received.get(address).copied().unwrap_or(0)
    }

    /// Total paid to everyone.
    pub fn total_paid(&self) -> u128 {
        self.received
            .values()
            .fold(0u128, |acc, v| acc.saturating_add(*v))
    }

    pub fn transfer_count(&self) -> u64 {
        self.transfer_count
    }

    /// Make every later transfer to `address` fail.
    pub fn reject_transfers_to(&mut self, address: &str) {
        self.rejecting.insert(address.to_string());
    }

    pub fn accept_transfers_to(&mut self, address: &str) {
        self.rejecting.remove(address);
    }
}

impl FundsTransfer for InMemoryBank {
    fn transfer(&mut self, to: &str, amount: u128) -> Result<(), String> {
        if self.rejecting.contains(to) {
            return Err(format!("recipient {} rejected the transfer", to));
        }
        let entry = self.received.entry(to.to_string()).or_insert(0);
        *entry = entry
            .checked_add(amount)
            .ok_or("Overflow: recipient balance exceeds u128")?;
        self.transfer_count += 1;
        Ok(())
    }
}
