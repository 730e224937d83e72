use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const DEFAULT_SEED: u64 = 42;
const DEFAULT_RUNS: u32 = 100;
const DEFAULT_TICK_LIMIT: u32 = 20_000;
const DEFAULT_ENEMY: &str = "Corrupted Wolf";
const DEFAULT_ABSORB_BELOW: u32 = 30;
const DEFAULT_WALK_TICKS: u32 = 36_000;

#[derive(Debug, Error, PartialEq)]
pub enum BalanceError {
    #[error("simulation.runs must be at least 1")]
    NoRuns,
    #[error("simulation.tick_limit must be at least 1")]
    NoTickLimit,
    #[error("win rate bound {0} is outside 0..=1")]
    WinRateOutOfRange(f32),
    #[error("expectations.min_win_rate ({min}) exceeds max_win_rate ({max})")]
    InvertedWinRates { min: f32, max: f32 },
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BalanceConfig {
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub policy: PolicyConfig,
    #[serde(default)]
    pub expectations: Expectations,
    #[serde(default)]
    pub encounters: EncounterConfig,
    #[serde(default)]
    pub report: Option<ReportConfig>,
}

impl BalanceConfig {
    pub fn from_path(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("failed to read balance config {}", path.display()))?;
        Self::from_toml(&data).with_context(|| format!("invalid balance config {}", path.display()))
    }

    pub fn from_toml(data: &str) -> Result<Self> {
        let cfg: BalanceConfig = toml::from_str(data)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), BalanceError> {
        if self.simulation.runs == 0 {
            return Err(BalanceError::NoRuns);
        }
        if self.simulation.tick_limit == 0 {
            return Err(BalanceError::NoTickLimit);
        }
        let Expectations {
            min_win_rate: min,
            max_win_rate: max,
            ..
        } = self.expectations;
        for bound in [min, max] {
            if !(0.0..=1.0).contains(&bound) {
                return Err(BalanceError::WinRateOutOfRange(bound));
            }
        }
        if min > max {
            return Err(BalanceError::InvertedWinRates { min, max });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub seed: u64,
    pub runs: u32,
    pub tick_limit: u32,
    pub enemy: String,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            runs: DEFAULT_RUNS,
            tick_limit: DEFAULT_TICK_LIMIT,
            enemy: DEFAULT_ENEMY.to_owned(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VictoryPolicy {
    #[default]
    Consume,
    Skip,
}

/// How the scripted player fights.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Absorb instead of attacking while HP is below this.
    pub absorb_below: u32,
    pub victory: VictoryPolicy,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            absorb_below: DEFAULT_ABSORB_BELOW,
            victory: VictoryPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct Expectations {
    pub min_win_rate: f32,
    pub max_win_rate: f32,
    /// Win rates this close to either bound are reported as a warning.
    pub warn_margin: f32,
}

impl Default for Expectations {
    fn default() -> Self {
        Self {
            min_win_rate: 0.5,
            max_win_rate: 1.0,
            warn_margin: 0.05,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct EncounterConfig {
    /// Ticks of continuous walking in the danger zone to sample.
    pub walk_ticks: u32,
}

impl Default for EncounterConfig {
    fn default() -> Self {
        Self {
            walk_ticks: DEFAULT_WALK_TICKS,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReportConfig {
    pub path: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let cfg = BalanceConfig::from_toml("").expect("defaults are valid");
        assert_eq!(cfg.simulation.seed, 42);
        assert_eq!(cfg.simulation.enemy, "Corrupted Wolf");
        assert_eq!(cfg.policy.victory, VictoryPolicy::Consume);
        assert!(cfg.report.is_none());
    }

    #[test]
    fn sections_override_fields() {
        let cfg = BalanceConfig::from_toml(
            r#"
            [simulation]
            seed = 9
            runs = 5

            [policy]
            absorb_below = 50
            victory = "skip"

            [report]
            path = "reports/balance.json"
            "#,
        )
        .expect("valid config");
        assert_eq!(cfg.simulation.seed, 9);
        assert_eq!(cfg.simulation.runs, 5);
        assert_eq!(cfg.simulation.tick_limit, DEFAULT_TICK_LIMIT);
        assert_eq!(cfg.policy.absorb_below, 50);
        assert_eq!(cfg.policy.victory, VictoryPolicy::Skip);
        assert_eq!(
            cfg.report.map(|r| r.path),
            Some(PathBuf::from("reports/balance.json"))
        );
    }

    #[test]
    fn inverted_bounds_are_rejected() {
        let mut cfg = BalanceConfig::default();
        cfg.expectations.min_win_rate = 0.9;
        cfg.expectations.max_win_rate = 0.2;
        assert_eq!(
            cfg.validate(),
            Err(BalanceError::InvertedWinRates { min: 0.9, max: 0.2 })
        );
    }

    #[test]
    fn zero_runs_are_rejected() {
        assert!(BalanceConfig::from_toml("[simulation]\nruns = 0").is_err());
    }
}
