// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// BLOCK-HASH LOTTERY - CONFIGURATION
//
// Deployment parameters, loaded from TOML or LOTTERY_* environment variables.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use crate::error::LotteryError;
use crate::{DEFAULT_STAKE, HASH_LOOKBACK, REVEAL_DELAY};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// What happens to an overdue wager whose answer hash can no longer be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpiredWagerPolicy {
    /// Return the stake to the bettor
    #[default]
    Refund,
    /// Move the stake into the pot
    Forfeit,
    /// Leave the wager pending forever; the queue stops draining
    Stall,
}

impl std::str::FromStr for ExpiredWagerPolicy {
    type Err = LotteryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "refund" => Ok(ExpiredWagerPolicy::Refund),
            "forfeit" => Ok(ExpiredWagerPolicy::Forfeit),
            "stall" => Ok(ExpiredWagerPolicy::Stall),
            other => Err(LotteryError::Config(format!(
                "unknown expired_policy {:?} (refund | forfeit | stall)",
                other
            ))),
        }
    }
}

/// Lottery deployment parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LotteryConfig {
    /// Account allowed to pin the test answer
    pub owner: String,
    /// The one accepted stake, in base units
    #[serde(with = "crate::u128_str")]
    pub stake: u128,
    #[serde(default = "default_reveal_delay")]
    pub reveal_delay: u64,
    /// Block-hash retention window of the chain. `SimulatedChain::from_config`
    /// builds its window from this.
    #[serde(default = "default_hash_lookback")]
    pub hash_lookback: u64,
    #[serde(default)]
    pub expired_policy: ExpiredWagerPolicy,
}

fn default_reveal_delay() -> u64 {
    REVEAL_DELAY
}

fn default_hash_lookback() -> u64 {
    HASH_LOOKBACK
}

impl Default for LotteryConfig {
    fn default() -> Self {
        Self::new("owner")
    }
}

impl LotteryConfig {
    pub fn new(owner: &str) -> Self {
        Self {
            owner: owner.to_string(),
            stake: DEFAULT_STAKE,
            reveal_delay: REVEAL_DELAY,
            hash_lookback: HASH_LOOKBACK,
            expired_policy: ExpiredWagerPolicy::Refund,
        }
    }

    /// Load config from TOML file
    pub fn load_from_file(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let content = fs::read_to_string(path)?;
        let config: LotteryConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load config from environment variables.
    /// Unset variables fall back to defaults; `LOTTERY_OWNER` is required.
    pub fn load_from_env() -> Result<Self, Box<dyn std::error::Error>> {
        let owner = std::env::var("LOTTERY_OWNER").map_err(|_| "LOTTERY_OWNER not set")?;

        let stake: u128 = std::env::var("LOTTERY_STAKE")
            .unwrap_or_else(|_| DEFAULT_STAKE.to_string())
            .parse()?;

        let reveal_delay: u64 = std::env::var("LOTTERY_REVEAL_DELAY")
            .unwrap_or_else(|_| REVEAL_DELAY.to_string())
            .parse()?;

        let hash_lookback: u64 = std::env::var("LOTTERY_HASH_LOOKBACK")
            .unwrap_or_else(|_| HASH_LOOKBACK.to_string())
            .parse()?;

        let expired_policy: ExpiredWagerPolicy = std::env::var("LOTTERY_EXPIRED_POLICY")
            .unwrap_or_else(|_| "refund".to_string())
            .parse()?;

        let config = Self {
            owner,
            stake,
            reveal_delay,
            hash_lookback,
            expired_policy,
        };
        config.validate()?;
        Ok(config)
    }

    /// Save config to TOML file
    pub fn save_to_file(&self, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), LotteryError> {
        if self.owner.is_empty() {
            return Err(LotteryError::Config("owner cannot be empty".to_string()));
        }
        if self.stake == 0 {
            return Err(LotteryError::Config("stake must be > 0".to_string()));
        }
        if self.reveal_delay == 0 {
            // A zero delay would judge a wager with the hash of the block it sits in
            return Err(LotteryError::Config("reveal_delay must be >= 1".to_string()));
        }
        if self.hash_lookback == 0 {
            return Err(LotteryError::Config("hash_lookback must be >= 1".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let cfg = LotteryConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.stake, DEFAULT_STAKE);
        assert_eq!(cfg.reveal_delay, 3);
        assert_eq!(cfg.expired_policy, ExpiredWagerPolicy::Refund);
    }

    #[test]
    fn test_validate_rejects_zero_values() {
        let mut cfg = LotteryConfig::default();
        cfg.stake = 0;
        assert!(cfg.validate().is_err());

        let mut cfg = LotteryConfig::default();
        cfg.reveal_delay = 0;
        assert!(cfg.validate().is_err());

        let mut cfg = LotteryConfig::default();
        cfg.owner.clear();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_toml_accepts_integer_or_string_stake() {
        let as_int: LotteryConfig = toml::from_str("owner = \"deployer\"\nstake = 1000\n").unwrap();
        assert_eq!(as_int.stake, 1000);
        assert_eq!(as_int.reveal_delay, REVEAL_DELAY);
        assert_eq!(as_int.hash_lookback, HASH_LOOKBACK);

        let as_str: LotteryConfig = toml::from_str(
            "owner = \"deployer\"\nstake = \"5000000000000000\"\nexpired_policy = \"forfeit\"\n",
        )
        .unwrap();
        assert_eq!(as_str.stake, DEFAULT_STAKE);
        assert_eq!(as_str.expired_policy, ExpiredWagerPolicy::Forfeit);
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lottery.toml");
        let mut cfg = LotteryConfig::new("deployer");
        cfg.expired_policy = ExpiredWagerPolicy::Stall;
        cfg.save_to_file(&path).unwrap();
        let loaded = LotteryConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn test_load_from_file_validates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        fs::write(&path, "owner = \"deployer\"\nstake = 0\n").unwrap();
        assert!(LotteryConfig::load_from_file(&path).is_err());
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!("Forfeit".parse::<ExpiredWagerPolicy>().unwrap(), ExpiredWagerPolicy::Forfeit);
        assert!("burn".parse::<ExpiredWagerPolicy>().is_err());
    }
}
