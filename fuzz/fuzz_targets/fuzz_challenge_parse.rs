//! Fuzz target: Challenge / BlockHash text parsing
//!
//! Arbitrary strings must parse or fail cleanly, and anything that parses must
//! print back to a string that parses to the same value.
//!
//! Run: cargo +nightly fuzz run fuzz_challenge_parse

#![no_main]
use libfuzzer_sys::fuzz_target;
use lottery_core::{BlockHash, Challenge};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    if let Ok(challenge) = text.parse::<Challenge>() {
        let again: Challenge = challenge
            .to_string()
            .parse()
            .expect("printed challenge must parse");
        assert_eq!(again, challenge);
    }

    if let Ok(hash) = text.parse::<BlockHash>() {
        let again: BlockHash = hash.to_string().parse().expect("printed hash must parse");
        assert_eq!(again, hash);
    }
});
