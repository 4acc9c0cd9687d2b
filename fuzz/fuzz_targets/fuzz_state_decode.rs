//! Fuzz target: EngineState JSON decoding + restore
//!
//! Random bytes fed to EngineState::from_json and then SettlementEngine::restore.
//! Decoding must never panic; a state that restores must pass the audit.
//!
//! Run: cargo +nightly fuzz run fuzz_state_decode

#![no_main]
use libfuzzer_sys::fuzz_target;
use lottery_core::{EngineState, EventLog, InMemoryBank, LotteryConfig, SettlementEngine, SimulatedChain};

fuzz_target!(|data: &[u8]| {
    let Ok(json) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(state) = EngineState::from_json(json) else {
        return;
    };

    let config = LotteryConfig::new("deployer");
    let chain = SimulatedChain::from_config(&config);
    if let Ok(engine) = SettlementEngine::restore(
        state,
        config,
        chain,
        InMemoryBank::new(),
        EventLog::new(),
    ) {
        assert!(engine.audit_conservation().is_ok());
        assert!(engine.head_index() <= engine.wager_count());
        // Re-encoding a restored state must be stable
        let again = engine.snapshot().to_json().expect("encode");
        let _ = serde_json::from_str::<serde_json::Value>(&again).expect("valid json");
    }
});
