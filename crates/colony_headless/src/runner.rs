//! The playthrough loop.
//!
//! Advances simulated time at a fixed cadence, letting the scripted player
//! act before every tick. Runs end when the campaign completes or the time
//! budget is spent. With a save path the run resumes from and persists to a
//! [`FileStore`](crate::store::FileStore).

use std::path::PathBuf;

use serde::Serialize;

use colony_core::prelude::*;

use crate::store::FileStore;
use crate::strategy::ScriptedPlayer;

/// Configuration for one playthrough.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Seed for node placement and the scripted player.
    pub seed: u64,
    /// Simulated time budget in seconds.
    pub duration_secs: u64,
    /// Simulated milliseconds per tick.
    pub tick_ms: u64,
    /// Save file to resume from and persist to, if any.
    pub save_path: Option<PathBuf>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            duration_secs: 300,
            tick_ms: 1_000,
            save_path: None,
        }
    }
}

/// Outcome of a playthrough.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Ticks executed.
    pub ticks: u64,
    /// Whether the campaign completed within the budget.
    pub completed: bool,
    /// Final colony report.
    pub summary: GameSummary,
    /// The goal left active, if the campaign did not complete.
    pub goal: Option<GoalStatus>,
}

/// Run one scripted playthrough.
pub fn run(config: &RunConfig) -> Result<RunReport> {
    let mut store = match &config.save_path {
        Some(path) => Some(FileStore::open(path)?),
        None => None,
    };

    let mut colony = store
        .as_ref()
        .and_then(|store| load_game(store))
        .map_or_else(
            || Colony::new(config.seed, 0),
            |data| Colony::from_save(config.seed, data),
        );
    let mut player = ScriptedPlayer::new(config.seed);

    let mut now_ms = 0;
    let mut ticks = 0;
    let budget_ms = config.duration_secs * 1_000;
    while now_ms < budget_ms && !colony.is_complete() {
        now_ms += config.tick_ms;
        ticks += 1;
        player.act(&mut colony, now_ms);
        let events = colony.tick(now_ms);
        for goal in &events.goals {
            if let GoalEvent::GoalCompleted { description, .. } = goal {
                tracing::info!(at_secs = now_ms / 1_000, goal = %description, "goal completed");
            }
        }
    }

    if let Some(store) = store.as_mut() {
        save_game(store, &colony.to_save())?;
    }

    let report = RunReport {
        ticks,
        completed: colony.is_complete(),
        summary: colony.summary(now_ms),
        goal: colony.goal_status(),
    };
    tracing::info!(
        ticks = report.ticks,
        completed = report.completed,
        buildings = report.summary.buildings,
        "run finished"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_run_makes_progress() {
        let config = RunConfig {
            seed: 5,
            duration_secs: 120,
            ..RunConfig::default()
        };
        let report = run(&config).unwrap();
        assert_eq!(report.ticks, 120);
        assert!(!report.completed);
        assert!(report.summary.buildings > 0);
        assert!(report.goal.is_some());
    }

    #[test]
    fn test_run_persists_and_resumes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.json");
        let config = RunConfig {
            seed: 5,
            duration_secs: 60,
            save_path: Some(path.clone()),
            ..RunConfig::default()
        };

        let first = run(&config).unwrap();
        assert!(path.exists());

        // The second run resumes from the saved buildings.
        let second = run(&config).unwrap();
        assert!(second.summary.buildings >= first.summary.buildings);
    }
}
