//! Headless balance runs: plays many seeded fights with a scripted player
//! and reports how often the player wins.

pub mod config;
pub mod report;
pub mod runner;

pub use config::{BalanceConfig, BalanceError, PolicyConfig, VictoryPolicy};
pub use report::{
    BalanceReport, EncounterStats, ReportStatus, ReportSummary, RunOutcome, RunResult,
    RunSetup,
};
pub use runner::{
    run_balance, simulate_encounters, trace_combat, trace_combat_with, BalanceOptions, CombatTrace,
};
