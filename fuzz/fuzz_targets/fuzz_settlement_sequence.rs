//! Fuzz target: settlement engine under arbitrary call sequences
//!
//! Random gaps between calls, random challenges, random stakes (mostly valid),
//! random transfer refusals and every expiry policy. After each call the
//! engine must pass the conservation audit and the head may move by at most one.
//!
//! Run: cargo +nightly fuzz run fuzz_settlement_sequence

#![no_main]
use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use lottery_core::{
    Challenge, EventLog, ExpiredWagerPolicy, InMemoryBank, LotteryConfig, SettlementEngine,
    SimulatedChain, DEFAULT_STAKE,
};

#[derive(Arbitrary, Debug)]
struct FuzzCall {
    gap: u8,
    bettor: u8,
    challenge: u8,
    wrong_stake: Option<u128>,
    enqueue_only: bool,
    toggle_refusal: bool,
}

#[derive(Arbitrary, Debug)]
struct FuzzSession {
    policy_idx: u8,
    lookback: u8,
    calls: Vec<FuzzCall>,
}

fuzz_target!(|session: FuzzSession| {
    let policy = match session.policy_idx % 3 {
        0 => ExpiredWagerPolicy::Refund,
        1 => ExpiredWagerPolicy::Forfeit,
        _ => ExpiredWagerPolicy::Stall,
    };
    let lookback = u64::from(session.lookback.max(1));
    let mut config = LotteryConfig::new("deployer");
    config.expired_policy = policy;
    config.hash_lookback = lookback;

    let chain = SimulatedChain::from_config(&config);
    let Ok(mut engine) = SettlementEngine::new(
        config,
        chain,
        InMemoryBank::new(),
        EventLog::new(),
    ) else {
        return;
    };

    // Cap the session length (prevent OOM / timeouts)
    for call in session.calls.iter().take(256) {
        engine.oracle_mut().mine(u64::from(call.gap % 16));
        let bettor = format!("bettor{}", call.bettor % 8);
        if call.toggle_refusal {
            engine.funds_mut().reject_transfers_to(&bettor);
        } else {
            engine.funds_mut().accept_transfers_to(&bettor);
        }

        let stake = call.wrong_stake.unwrap_or(DEFAULT_STAKE);
        let head_before = engine.head_index();
        let before = engine.snapshot();

        let result = if call.enqueue_only {
            engine.place_wager(&bettor, Challenge(call.challenge), stake)
        } else {
            engine.place_wager_and_settle(&bettor, Challenge(call.challenge), stake)
        };

        if result.is_err() {
            assert_eq!(engine.snapshot(), before, "failed call left state behind");
        }
        let head_after = engine.head_index();
        assert!(head_after >= head_before && head_after - head_before <= 1);
        engine
            .audit_conservation()
            .expect("conservation must hold after every call");
    }
});
