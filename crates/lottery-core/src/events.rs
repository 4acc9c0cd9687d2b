// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// BLOCK-HASH LOTTERY - EVENTS
//
// One `WagerPlaced` per accepted wager and at most one settlement event per
// call. Delivery is fire-and-forget.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use crate::{BlockHash, Challenge};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum LotteryEvent {
    WagerPlaced {
        index: usize,
        bettor: String,
        challenge: Challenge,
        #[serde(with = "crate::u128_str")]
        amount: u128,
        answer_block: u64,
    },
    /// Both nibbles matched; payout is stake + the whole pot
    WagerWon {
        index: usize,
        bettor: String,
        challenge: Challenge,
        answer: BlockHash,
        #[serde(with = "crate::u128_str")]
        payout: u128,
    },
    /// One nibble matched; stake returned
    WagerDrew {
        index: usize,
        bettor: String,
        challenge: Challenge,
        answer: BlockHash,
        #[serde(with = "crate::u128_str")]
        payout: u128,
    },
    /// No nibble matched; stake moved into the pot
    WagerFailed {
        index: usize,
        bettor: String,
        challenge: Challenge,
        answer: BlockHash,
        #[serde(with = "crate::u128_str")]
        amount: u128,
    },
    /// Answer hash expired; stake returned
    WagerRefunded {
        index: usize,
        bettor: String,
        #[serde(with = "crate::u128_str")]
        amount: u128,
    },
    /// Answer hash expired; stake moved into the pot
    WagerForfeited {
        index: usize,
        bettor: String,
        #[serde(with = "crate::u128_str")]
        amount: u128,
    },
}

impl LotteryEvent {
    /// Queue index of the wager this event is about
    pub fn index(&self) -> usize {
        match self {
            LotteryEvent::WagerPlaced { index, .. }
            | LotteryEvent::WagerWon { index, .. }
            | LotteryEvent::WagerDrew { index, .. }
            | LotteryEvent::WagerFailed { index, .. }
            | LotteryEvent::WagerRefunded { index, .. }
            | LotteryEvent::WagerForfeited { index, .. } => *index,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            LotteryEvent::WagerPlaced { .. } => "BET",
            LotteryEvent::WagerWon { .. } => "WIN",
            LotteryEvent::WagerDrew { .. } => "DRAW",
            LotteryEvent::WagerFailed { .. } => "FAIL",
            LotteryEvent::WagerRefunded { .. } => "REFUND",
            LotteryEvent::WagerForfeited { .. } => "FORFEIT",
        }
    }
}

pub trait EventSink {
    fn emit(&mut self, event: LotteryEvent);
}

/// Discards everything.
impl EventSink for () {
    fn emit(&mut self, _event: LotteryEvent) {}
}

/// In-memory event sink.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<LotteryEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[LotteryEvent] {
        &self.events
    }

    pub fn last(&self) -> Option<&LotteryEvent> {
        self.events.last()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn count(&self, name: &str) -> usize {
        self.events.iter().filter(|e| e.name() == name).count()
    }

    /// One JSON object per line.
    pub fn to_json_lines(&self) -> Result<String, serde_json::Error> {
        let mut out = String::new();
        for event in &self.events {
            out.push_str(&serde_json::to_string(event)?);
            out.push('\n');
        }
        Ok(out)
    }
}

impl EventSink for EventLog {
    fn emit(&mut self, event: LotteryEvent) {
        log::debug!("event {} for wager #{}", event.name(), event.index());
        self.events.push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn placed(index: usize) -> LotteryEvent {
        LotteryEvent::WagerPlaced {
            index,
            bettor: "alice".to_string(),
            challenge: Challenge(0xab),
            amount: 5,
            answer_block: 4,
        }
    }

    #[test]
    fn test_event_log_records_in_order() {
        let mut log = EventLog::new();
        log.emit(placed(0));
        log.emit(LotteryEvent::WagerRefunded {
            index: 0,
            bettor: "alice".to_string(),
            amount: 5,
        });
        assert_eq!(log.len(), 2);
        assert_eq!(log.count("BET"), 1);
        assert_eq!(log.last().map(|e| e.name()), Some("REFUND"));
    }

    #[test]
    fn test_json_lines_tagged() {
        let mut log = EventLog::new();
        log.emit(placed(3));
        let out = log.to_json_lines().unwrap();
        assert_eq!(out.lines().count(), 1);
        assert!(out.contains("\"event\":\"WagerPlaced\""));
        assert!(out.contains("\"challenge\":171"));
        let back: LotteryEvent = serde_json::from_str(out.trim()).unwrap();
        assert_eq!(back, placed(3));
    }
}
