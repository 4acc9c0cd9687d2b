// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// BLOCK-HASH LOTTERY - TWO-NIBBLE MATCHER
//
// Compares the two hex characters of a challenge against the first byte of a
// revealed block hash. Pure and total over every input.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use crate::{BlockHash, Challenge};
use serde::{Deserialize, Serialize};

/// Outcome of matching a challenge against a revealed hash.
///
/// Discriminants are part of the external ABI (`Fail = 0`, `Win = 1`, `Draw = 2`).
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MatchResult {
    /// No nibble matches
    Fail = 0,
    /// Both nibbles match
    Win = 1,
    /// Exactly one nibble matches
    Draw = 2,
}

impl MatchResult {
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

/// Number of nibble positions (0, 1 or 2) where `challenge` equals `answer`.
pub fn matching_nibbles(challenge: u8, answer: u8) -> u8 {
    let high = (challenge >> 4 == answer >> 4) as u8;
    let low = (challenge & 0x0f == answer & 0x0f) as u8;
    high + low
}

/// Classify `challenge` against the first byte of `revealed`.
pub fn classify(challenge: Challenge, revealed: &BlockHash) -> MatchResult {
    match matching_nibbles(challenge.byte(), revealed.first_byte()) {
        2 => MatchResult::Win,
        1 => MatchResult::Draw,
        _ => MatchResult::Fail,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ANSWER: &str = "0xab439950a17c26eb3ae0d0c55ae8d6e61e5313650b14c6f26632280af6459c8a";

    fn answer() -> BlockHash {
        ANSWER.parse().unwrap()
    }

    #[test]
    fn test_both_characters_win() {
        assert_eq!(classify(Challenge(0xab), &answer()), MatchResult::Win);
        assert_eq!(MatchResult::Win.as_u8(), 1);
    }

    #[test]
    fn test_no_character_fails() {
        assert_eq!(classify(Challenge(0xbc), &answer()), MatchResult::Fail);
        assert_eq!(MatchResult::Fail.as_u8(), 0);
    }

    #[test]
    fn test_first_character_draws() {
        assert_eq!(classify(Challenge(0xac), &answer()), MatchResult::Draw);
        assert_eq!(MatchResult::Draw.as_u8(), 2);
    }

    #[test]
    fn test_second_character_draws() {
        assert_eq!(classify(Challenge(0xfb), &answer()), MatchResult::Draw);
    }

    #[test]
    fn test_swapped_nibbles_fail() {
        // 0xba shares both hex digits with 0xab but in the wrong positions
        assert_eq!(classify(Challenge(0xba), &answer()), MatchResult::Fail);
    }

    #[test]
    fn test_only_first_byte_matters() {
        let mut bytes = [0xffu8; 32];
        bytes[0] = 0x00;
        assert_eq!(classify(Challenge(0x00), &BlockHash(bytes)), MatchResult::Win);
    }

    #[test]
    fn test_exhaustive_against_fixed_byte() {
        let h = answer();
        let mut counts = [0usize; 3];
        for b in 0..=255u8 {
            counts[classify(Challenge(b), &h).as_u8() as usize] += 1;
        }
        // 1 exact match, 15 + 15 single matches, the rest fail
        assert_eq!(counts[MatchResult::Win as usize], 1);
        assert_eq!(counts[MatchResult::Draw as usize], 30);
        assert_eq!(counts[MatchResult::Fail as usize], 225);
    }
}
