use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::config::{Expectations, VictoryPolicy};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceReport {
    pub id: String,
    pub timestamp: String,
    pub setup: RunSetup,
    pub summary: ReportSummary,
    pub encounters: EncounterStats,
    pub runs: Vec<RunResult>,
}

impl BalanceReport {
    pub fn new(
        id: impl Into<String>,
        setup: RunSetup,
        expectations: &Expectations,
        runs: Vec<RunResult>,
        encounters: EncounterStats,
    ) -> Self {
        let summary = ReportSummary::from_runs(&runs, expectations);
        Self {
            id: id.into(),
            timestamp: Utc::now().to_rfc3339(),
            setup,
            summary,
            encounters,
            runs,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunSetup {
    pub seed: u64,
    pub runs: u32,
    pub enemy: String,
    pub absorb_below: u32,
    pub victory: VictoryPolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSummary {
    pub status: ReportStatus,
    pub win_rate: f32,
    pub wins: u32,
    pub losses: u32,
    pub timeouts: u32,
    pub mean_ticks: f32,
    pub notes: String,
}

impl ReportSummary {
    fn from_runs(runs: &[RunResult], expectations: &Expectations) -> Self {
        let count = |outcome: RunOutcome| runs.iter().filter(|r| r.outcome == outcome).count() as u32;
        let wins = count(RunOutcome::Win);
        let losses = count(RunOutcome::Lose);
        let timeouts = count(RunOutcome::Timeout);
        let total = runs.len().max(1) as f32;
        let win_rate = wins as f32 / total;
        let mean_ticks = runs.iter().map(|r| r.ticks as f32).sum::<f32>() / total;
        let (status, notes) = judge(win_rate, timeouts, expectations);
        Self {
            status,
            win_rate,
            wins,
            losses,
            timeouts,
            mean_ticks,
            notes,
        }
    }
}

fn judge(win_rate: f32, timeouts: u32, expectations: &Expectations) -> (ReportStatus, String) {
    let Expectations {
        min_win_rate: min,
        max_win_rate: max,
        warn_margin,
    } = *expectations;

    if win_rate < min || win_rate > max {
        return (
            ReportStatus::Fail,
            format!("win rate {win_rate:.2} outside {min:.2}..={max:.2}"),
        );
    }
    if timeouts > 0 {
        return (
            ReportStatus::Warn,
            format!("{timeouts} run(s) hit the tick limit"),
        );
    }
    if win_rate - min < warn_margin || max - win_rate < warn_margin {
        // A bound of 1.0 is the ceiling, not a target to stay away from.
        if !(max >= 1.0 && win_rate >= 1.0) {
            return (
                ReportStatus::Warn,
                format!("win rate {win_rate:.2} within {warn_margin:.2} of a bound"),
            );
        }
    }
    (ReportStatus::Pass, format!("win rate {win_rate:.2}"))
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    Pass,
    Fail,
    Warn,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RunOutcome {
    Win,
    Lose,
    Timeout,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunResult {
    pub seed: u64,
    pub outcome: RunOutcome,
    pub ticks: u32,
    pub player_actions: u32,
    pub player_hp: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EncounterStats {
    pub walk_ticks: u32,
    pub encounters: u32,
    /// Mean ticks from the start of the walk (or the previous encounter) to
    /// the next encounter. `None` if nothing triggered.
    pub mean_ticks_between: Option<f32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(outcome: RunOutcome) -> RunResult {
        RunResult {
            seed: 0,
            outcome,
            ticks: 100,
            player_actions: 4,
            player_hp: 50,
        }
    }

    fn expectations(min: f32, max: f32) -> Expectations {
        Expectations {
            min_win_rate: min,
            max_win_rate: max,
            warn_margin: 0.05,
        }
    }

    #[test]
    fn win_rate_below_floor_fails() {
        let runs = vec![run(RunOutcome::Win), run(RunOutcome::Lose), run(RunOutcome::Lose)];
        let summary = ReportSummary::from_runs(&runs, &expectations(0.5, 1.0));
        assert_eq!(summary.status, ReportStatus::Fail);
        assert_eq!((summary.wins, summary.losses), (1, 2));
    }

    #[test]
    fn perfect_record_against_open_ceiling_passes() {
        let runs = vec![run(RunOutcome::Win); 4];
        let summary = ReportSummary::from_runs(&runs, &expectations(0.5, 1.0));
        assert_eq!(summary.status, ReportStatus::Pass);
        assert_eq!(summary.win_rate, 1.0);
        assert_eq!(summary.mean_ticks, 100.0);
    }

    #[test]
    fn timeouts_warn() {
        let runs = vec![run(RunOutcome::Win), run(RunOutcome::Timeout)];
        let summary = ReportSummary::from_runs(&runs, &expectations(0.0, 1.0));
        assert_eq!(summary.status, ReportStatus::Warn);
        assert_eq!(summary.timeouts, 1);
    }

    #[test]
    fn rate_near_bound_warns() {
        let mut runs = vec![run(RunOutcome::Win); 52];
        runs.extend(vec![run(RunOutcome::Lose); 48]);
        let summary = ReportSummary::from_runs(&runs, &expectations(0.5, 0.9));
        assert_eq!(summary.status, ReportStatus::Warn);
    }

    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&ReportStatus::Warn).expect("serializes"),
            "\"warn\""
        );
    }
}
