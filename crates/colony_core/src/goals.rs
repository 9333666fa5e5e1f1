//! Campaign goals: the ordered objective chain that ends the game.
//!
//! Exactly one goal is active at a time. Progress is measured against live
//! colony state, so a goal whose target was reached earlier completes
//! immediately, and several goals can complete in a single refresh.

use serde::{Deserialize, Serialize};

use crate::buildings::{BuildingKind, BuildingRegistry};
use crate::resources::{Resource, ResourceLedger};

/// What a goal measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GoalKind {
    /// Count of buildings of one kind.
    Build {
        /// Building kind counted.
        kind: BuildingKind,
    },
    /// Stored quantity of one resource.
    Stockpile {
        /// Resource measured.
        resource: Resource,
    },
    /// Total buildings of any kind.
    TotalBuildings,
}

/// One campaign objective.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    /// What this goal measures.
    pub kind: GoalKind,
    /// Value the measurement must reach.
    pub target: u32,
    /// Player-facing description.
    pub description: String,
}

impl Goal {
    fn new(kind: GoalKind, target: u32, description: &str) -> Self {
        Self {
            kind,
            target,
            description: description.to_owned(),
        }
    }

    /// Current value of this goal's measurement.
    #[must_use]
    pub fn measure(&self, ledger: &ResourceLedger, buildings: &BuildingRegistry) -> u32 {
        match self.kind {
            GoalKind::Build { kind } => buildings.count_of(kind) as u32,
            GoalKind::Stockpile { resource } => ledger.quantity(resource),
            GoalKind::TotalBuildings => buildings.len() as u32,
        }
    }
}

/// Snapshot of the active goal for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalStatus {
    /// Description of the active goal.
    pub description: String,
    /// Current measurement.
    pub progress: u32,
    /// Target measurement.
    pub target: u32,
    /// Completion percentage in `[0, 100]`.
    pub percentage: u32,
}

/// Events fired as goals complete.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GoalEvent {
    /// The active goal's target was reached.
    GoalCompleted {
        /// Index of the completed goal.
        index: usize,
        /// Its description.
        description: String,
    },
    /// The final goal completed; the campaign is over.
    GameComplete,
}

/// Tracks the goal chain and the index of the active goal.
///
/// The index only advances. `GameComplete` fires exactly once even if
/// refresh keeps being called afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressionTracker {
    goals: Vec<Goal>,
    current: usize,
    complete_announced: bool,
}

impl Default for ProgressionTracker {
    fn default() -> Self {
        Self::campaign()
    }
}

impl ProgressionTracker {
    /// The standard campaign: ramp up each production chain, stockpile
    /// steel, add storage, then grow the colony.
    #[must_use]
    pub fn campaign() -> Self {
        let goals = vec![
            Goal::new(GoalKind::Build { kind: BuildingKind::Mine }, 5, "Build 5 mines"),
            Goal::new(GoalKind::Build { kind: BuildingKind::Farm }, 3, "Build 3 farms"),
            Goal::new(
                GoalKind::Build { kind: BuildingKind::Factory },
                2,
                "Build 2 factories",
            ),
            Goal::new(
                GoalKind::Stockpile { resource: Resource::Steel },
                100,
                "Stockpile 100 steel",
            ),
            Goal::new(
                GoalKind::Build { kind: BuildingKind::Warehouse },
                1,
                "Build a warehouse",
            ),
            Goal::new(GoalKind::TotalBuildings, 15, "Grow the colony to 15 buildings"),
        ];
        Self {
            goals,
            current: 0,
            complete_announced: false,
        }
    }

    /// Index of the active goal.
    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    /// All goals in campaign order.
    #[must_use]
    pub fn goals(&self) -> &[Goal] {
        &self.goals
    }

    /// True once every goal has completed.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.current >= self.goals.len()
    }

    /// Snapshot of the active goal, or `None` after the campaign ends.
    #[must_use]
    pub fn status(
        &self,
        ledger: &ResourceLedger,
        buildings: &BuildingRegistry,
    ) -> Option<GoalStatus> {
        let goal = self.goals.get(self.current)?;
        let progress = goal.measure(ledger, buildings);
        let percentage = if goal.target == 0 {
            100
        } else {
            (u64::from(progress) * 100 / u64::from(goal.target)).min(100) as u32
        };
        Some(GoalStatus {
            description: goal.description.clone(),
            progress,
            target: goal.target,
            percentage,
        })
    }

    /// Advance past every goal whose target the live state already meets.
    pub fn refresh(
        &mut self,
        ledger: &ResourceLedger,
        buildings: &BuildingRegistry,
    ) -> Vec<GoalEvent> {
        let mut events = Vec::new();
        while let Some(goal) = self.goals.get(self.current) {
            if goal.measure(ledger, buildings) < goal.target {
                break;
            }
            tracing::info!(goal = %goal.description, "goal completed");
            events.push(GoalEvent::GoalCompleted {
                index: self.current,
                description: goal.description.clone(),
            });
            self.current += 1;
        }
        if self.is_complete() && !self.complete_announced {
            self.complete_announced = true;
            events.push(GoalEvent::GameComplete);
        }
        events
    }

    /// Restore the active goal index from a save snapshot.
    pub fn restore(&mut self, current: usize) {
        self.current = current.min(self.goals.len());
        self.complete_announced = self.is_complete();
    }
}
