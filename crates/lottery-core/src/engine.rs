// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// BLOCK-HASH LOTTERY - SETTLEMENT ENGINE
//
// Owns the wager queue and the pot. Every accepted wager runs as one atomic step:
//
//   validate stake ─▶ enqueue new wager ─▶ try to resolve the HEAD wager ─▶ emit
//                                            │
//                       ┌────────────────────┼─────────────────────┐
//                       ▼                    ▼                     ▼
//                  not due yet         answer available       answer expired
//                   (no-op)          Win / Draw / Fail        expiry policy
//
// At most one wager is resolved per call, always the oldest one. The newly
// placed wager is never judged in the call that placed it.
//
// State is mutated first (head advanced, pot debited) and the transfer runs
// last. If the transfer fails, the whole call is rolled back from a
// checkpoint, including the enqueue, so no partial movement is observable.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use crate::config::{ExpiredWagerPolicy, LotteryConfig};
use crate::error::{LotteryError, LotteryResult};
use crate::events::{EventLog, EventSink, LotteryEvent};
use crate::funds::FundsTransfer;
use crate::matcher::{self, MatchResult};
use crate::oracle::ChainOracle;
use crate::pot::PotLedger;
use crate::queue::WagerQueue;
use crate::{BlockHash, Challenge, Wager, WagerState};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

/// How a resolved wager ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SettlementOutcome {
    /// Judged against the revealed hash
    Judged {
        result: MatchResult,
        answer: BlockHash,
    },
    /// Answer expired, stake returned
    Refunded,
    /// Answer expired, stake moved to the pot
    Forfeited,
}

/// Record of the single resolution performed by a call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    pub index: usize,
    pub bettor: String,
    pub challenge: Challenge,
    pub outcome: SettlementOutcome,
    /// The wager's own stake
    #[serde(with = "crate::u128_str")]
    pub stake: u128,
    /// Amount transferred to the bettor (0 when nothing was paid)
    #[serde(with = "crate::u128_str")]
    pub payout: u128,
    #[serde(with = "crate::u128_str")]
    pub pot_after: u128,
}

impl Settlement {
    pub fn match_result(&self) -> Option<MatchResult> {
        match self.outcome {
            SettlementOutcome::Judged { result, .. } => Some(result),
            _ => None,
        }
    }

    fn to_event(&self) -> LotteryEvent {
        let index = self.index;
        let bettor = self.bettor.clone();
        let challenge = self.challenge;
        match self.outcome {
            SettlementOutcome::Judged { result, answer } => match result {
                MatchResult::Win => LotteryEvent::WagerWon {
                    index,
                    bettor,
                    challenge,
                    answer,
                    payout: self.payout,
                },
                MatchResult::Draw => LotteryEvent::WagerDrew {
                    index,
                    bettor,
                    challenge,
                    answer,
                    payout: self.payout,
                },
                MatchResult::Fail => LotteryEvent::WagerFailed {
                    index,
                    bettor,
                    challenge,
                    answer,
                    amount: self.stake,
                },
            },
            SettlementOutcome::Refunded => LotteryEvent::WagerRefunded {
                index,
                bettor,
                amount: self.payout,
            },
            SettlementOutcome::Forfeited => LotteryEvent::WagerForfeited {
                index,
                bettor,
                amount: self.stake,
            },
        }
    }
}

/// Returned by every accepted wager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceReceipt {
    /// Queue index of the new wager
    pub index: usize,
    pub answer_block: u64,
    /// The head wager resolved by this call, if any
    pub settlement: Option<Settlement>,
}

/// Serializable engine state (queue, pot and running totals).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineState {
    pub queue: WagerQueue,
    pub pot: PotLedger,
    #[serde(with = "crate::u128_str")]
    pub total_deposited: u128,
    #[serde(with = "crate::u128_str")]
    pub total_paid_out: u128,
}

impl EngineState {
    pub fn to_json(&self) -> LotteryResult<String> {
        serde_json::to_string(self).map_err(|e| LotteryError::Encoding(e.to_string()))
    }

    pub fn from_json(json: &str) -> LotteryResult<Self> {
        serde_json::from_str(json).map_err(|e| LotteryError::Encoding(e.to_string()))
    }
}

/// Everything a single call may touch, captured before it starts.
#[derive(Debug, Clone, Copy)]
struct Checkpoint {
    queue_len: usize,
    head: usize,
    pot: u128,
    total_deposited: u128,
    total_paid_out: u128,
}

pub struct SettlementEngine<O: ChainOracle, F: FundsTransfer, S: EventSink = EventLog> {
    config: LotteryConfig,
    oracle: O,
    funds: F,
    events: S,
    queue: WagerQueue,
    pot: PotLedger,
    total_deposited: u128,
    total_paid_out: u128,
    /// Pinned answer that bypasses the oracle. Not compiled into mainnet builds.
    #[cfg(not(feature = "mainnet"))]
    answer_override: Option<BlockHash>,
}

impl<O: ChainOracle, F: FundsTransfer, S: EventSink> SettlementEngine<O, F, S> {
    pub fn new(config: LotteryConfig, oracle: O, funds: F, events: S) -> LotteryResult<Self> {
        Self::restore(
            EngineState {
                queue: WagerQueue::new(),
                pot: PotLedger::new(),
                total_deposited: 0,
                total_paid_out: 0,
            },
            config,
            oracle,
            funds,
            events,
        )
    }

    /// Rebuild an engine from a snapshot. The snapshot must be internally
    /// consistent, hold only wagers of the configured stake and satisfy the
    /// conservation audit.
    pub fn restore(
        state: EngineState,
        config: LotteryConfig,
        oracle: O,
        funds: F,
        events: S,
    ) -> LotteryResult<Self> {
        config.validate()?;
        if !state.queue.is_consistent() {
            return Err(LotteryError::Encoding(
                "queue resolved flags disagree with head".to_string(),
            ));
        }
        // Only one denomination is ever accepted
        if let Some(w) = state.queue.iter().find(|w| w.amount != config.stake) {
            return Err(LotteryError::InvalidStake {
                expected: config.stake,
                got: w.amount,
            });
        }
        let engine = Self {
            config,
            oracle,
            funds,
            events,
            queue: state.queue,
            pot: state.pot,
            total_deposited: state.total_deposited,
            total_paid_out: state.total_paid_out,
            #[cfg(not(feature = "mainnet"))]
            answer_override: None,
        };
        engine.audit_conservation()?;
        Ok(engine)
    }

    // ─────────────────────────────────────────────────────────────
    // COLLABORATORS
    // ─────────────────────────────────────────────────────────────

    pub fn config(&self) -> &LotteryConfig {
        &self.config
    }

    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    pub fn oracle_mut(&mut self) -> &mut O {
        &mut self.oracle
    }

    pub fn funds(&self) -> &F {
        &self.funds
    }

    pub fn funds_mut(&mut self) -> &mut F {
        &mut self.funds
    }

    pub fn events(&self) -> &S {
        &self.events
    }

    // ─────────────────────────────────────────────────────────────
    // MUTATING ENTRY POINTS
    // ─────────────────────────────────────────────────────────────

    /// Accept a wager and resolve at most one overdue wager (the head).
    pub fn place_wager_and_settle(
        &mut self,
        bettor: &str,
        challenge: Challenge,
        stake: u128,
    ) -> LotteryResult<PlaceReceipt> {
        self.validate_stake(stake)?;
        let height = self.oracle.current_height();
        let checkpoint = self.checkpoint();

        let (index, answer_block) = self.enqueue(bettor, challenge, stake, height);
        let settlement = match self.settle_head(height) {
            Ok(settlement) => settlement,
            Err(e) => {
                warn!(
                    "wager from {} at height {} rolled back: {}",
                    bettor, height, e
                );
                self.rollback(checkpoint);
                return Err(e);
            }
        };

        self.emit_placed(index);
        if let Some(s) = &settlement {
            self.events.emit(s.to_event());
        }
        Ok(PlaceReceipt {
            index,
            answer_block,
            settlement,
        })
    }

    /// Accept a wager without attempting any resolution.
    pub fn place_wager(
        &mut self,
        bettor: &str,
        challenge: Challenge,
        stake: u128,
    ) -> LotteryResult<PlaceReceipt> {
        self.validate_stake(stake)?;
        let height = self.oracle.current_height();
        let (index, answer_block) = self.enqueue(bettor, challenge, stake, height);
        self.emit_placed(index);
        Ok(PlaceReceipt {
            index,
            answer_block,
            settlement: None,
        })
    }

    /// Pin the answer hash for every judgement, bypassing the oracle.
    /// Owner only; absent from mainnet builds.
    #[cfg(not(feature = "mainnet"))]
    pub fn set_answer_for_test(&mut self, caller: &str, answer: BlockHash) -> LotteryResult<()> {
        self.require_owner(caller)?;
        info!("answer pinned to {} by {}", answer, caller);
        self.answer_override = Some(answer);
        Ok(())
    }

    #[cfg(not(feature = "mainnet"))]
    pub fn clear_answer_for_test(&mut self, caller: &str) -> LotteryResult<()> {
        self.require_owner(caller)?;
        self.answer_override = None;
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────
    // READ-ONLY QUERIES
    // ─────────────────────────────────────────────────────────────

    pub fn current_pot(&self) -> u128 {
        self.pot.balance()
    }

    pub fn wager_at(&self, index: usize) -> LotteryResult<&Wager> {
        self.queue.get(index)
    }

    pub fn classify(&self, challenge: Challenge, answer: &BlockHash) -> MatchResult {
        matcher::classify(challenge, answer)
    }

    /// Where a wager currently sits in its lifecycle.
    pub fn wager_state(&self, index: usize) -> LotteryResult<WagerState> {
        let wager = self.queue.get(index)?;
        if wager.resolved {
            return Ok(WagerState::Resolved);
        }
        if !wager.is_due(self.oracle.current_height()) {
            return Ok(WagerState::Pending);
        }
        Ok(match self.revealed_answer(wager) {
            Ok(_) => WagerState::Judgeable,
            Err(_) => WagerState::Expired,
        })
    }

    pub fn head_index(&self) -> usize {
        self.queue.head()
    }

    pub fn wager_count(&self) -> usize {
        self.queue.len()
    }

    pub fn pending_count(&self) -> usize {
        self.queue.pending_count()
    }

    pub fn total_deposited(&self) -> u128 {
        self.total_deposited
    }

    pub fn total_paid_out(&self) -> u128 {
        self.total_paid_out
    }

    /// Verifies: pot + sum(unresolved stakes) + total paid out == total deposited
    pub fn audit_conservation(&self) -> LotteryResult<()> {
        let pot = self.pot.balance();
        let unresolved = self.queue.unresolved_total();
        // An overflowing sum can never equal a u128 deposit total
        let accounted = unresolved
            .and_then(|u| u.checked_add(pot))
            .and_then(|sum| sum.checked_add(self.total_paid_out));
        match accounted {
            Some(sum) if sum == self.total_deposited => Ok(()),
            _ => Err(LotteryError::ConservationViolation {
                pot,
                unresolved: unresolved.unwrap_or(u128::MAX),
                paid_out: self.total_paid_out,
                deposited: self.total_deposited,
            }),
        }
    }

    pub fn snapshot(&self) -> EngineState {
        EngineState {
            queue: self.queue.clone(),
            pot: self.pot.clone(),
            total_deposited: self.total_deposited,
            total_paid_out: self.total_paid_out,
        }
    }

    // ─────────────────────────────────────────────────────────────
    // INTERNALS
    // ─────────────────────────────────────────────────────────────

    fn validate_stake(&self, stake: u128) -> LotteryResult<()> {
        if stake != self.config.stake {
            return Err(LotteryError::InvalidStake {
                expected: self.config.stake,
                got: stake,
            });
        }
        Ok(())
    }

    #[cfg(not(feature = "mainnet"))]
    fn require_owner(&self, caller: &str) -> LotteryResult<()> {
        if caller != self.config.owner {
            return Err(LotteryError::Unauthorized(format!(
                "{} is not the lottery owner",
                caller
            )));
        }
        Ok(())
    }

    fn enqueue(&mut self, bettor: &str, challenge: Challenge, stake: u128, height: u64) -> (usize, u64) {
        let wager = Wager::new(bettor, challenge, stake, height, self.config.reveal_delay);
        let answer_block = wager.answer_block;
        let index = self.queue.append(wager);
        self.total_deposited = self.total_deposited.saturating_add(stake);
        info!(
            "wager #{} from {} on {} (answer block {})",
            index, bettor, challenge, answer_block
        );
        (index, answer_block)
    }

    fn emit_placed(&mut self, index: usize) {
        if let Ok(w) = self.queue.get(index) {
            let event = LotteryEvent::WagerPlaced {
                index,
                bettor: w.bettor.clone(),
                challenge: w.challenge,
                amount: w.amount,
                answer_block: w.answer_block,
            };
            self.events.emit(event);
        }
    }

    fn revealed_answer(&self, wager: &Wager) -> LotteryResult<BlockHash> {
        #[cfg(not(feature = "mainnet"))]
        {
            if let Some(answer) = self.answer_override {
                return Ok(answer);
            }
        }
        self.oracle
            .hash_of(wager.answer_block)
            .ok_or(LotteryError::OracleUnavailable {
                height: wager.answer_block,
            })
    }

    /// One resolution attempt on the head wager. Mutates state first and
    /// transfers last; the caller rolls back on `Err`.
    fn settle_head(&mut self, height: u64) -> LotteryResult<Option<Settlement>> {
        let index = self.queue.head();
        let head = match self.queue.peek_head() {
            Some(w) => w.clone(),
            None => return Ok(None),
        };
        if !head.is_due(height) {
            debug!(
                "head #{} not due: height {} <= answer block {}",
                index, height, head.answer_block
            );
            return Ok(None);
        }

        let (outcome, payout) = match self.revealed_answer(&head) {
            Ok(answer) => {
                let result = matcher::classify(head.challenge, &answer);
                let payout = match result {
                    MatchResult::Win => head.amount.saturating_add(self.pot.debit_all()),
                    MatchResult::Draw => head.amount,
                    MatchResult::Fail => {
                        self.pot.credit(head.amount);
                        0
                    }
                };
                (SettlementOutcome::Judged { result, answer }, payout)
            }
            Err(LotteryError::OracleUnavailable { height: answer_block }) => {
                warn!(
                    "answer block {} for wager #{} is no longer retrievable at height {}",
                    answer_block, index, height
                );
                match self.config.expired_policy {
                    ExpiredWagerPolicy::Refund => (SettlementOutcome::Refunded, head.amount),
                    ExpiredWagerPolicy::Forfeit => {
                        self.pot.credit(head.amount);
                        (SettlementOutcome::Forfeited, 0)
                    }
                    ExpiredWagerPolicy::Stall => return Ok(None),
                }
            }
            Err(e) => return Err(e),
        };

        self.queue.advance_head()?;
        if payout > 0 {
            self.total_paid_out = self.total_paid_out.saturating_add(payout);
            self.funds
                .transfer(&head.bettor, payout)
                .map_err(|reason| LotteryError::TransferFailed {
                    to: head.bettor.clone(),
                    amount: payout,
                    reason,
                })?;
        }

        let settlement = Settlement {
            index,
            bettor: head.bettor,
            challenge: head.challenge,
            outcome,
            stake: head.amount,
            payout,
            pot_after: self.pot.balance(),
        };
        info!(
            "wager #{} settled: {:?}, payout {}, pot {}",
            index, settlement.outcome, payout, settlement.pot_after
        );
        Ok(Some(settlement))
    }

    fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            queue_len: self.queue.len(),
            head: self.queue.head(),
            pot: self.pot.balance(),
            total_deposited: self.total_deposited,
            total_paid_out: self.total_paid_out,
        }
    }

    fn rollback(&mut self, cp: Checkpoint) {
        self.queue.restore(cp.queue_len, cp.head);
        self.pot.restore(cp.pot);
        self.total_deposited = cp.total_deposited;
        self.total_paid_out = cp.total_paid_out;
    }
}
