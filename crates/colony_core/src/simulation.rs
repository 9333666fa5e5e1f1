//! The colony simulation facade.
//!
//! [`Colony`] owns every subsystem and drives them in a fixed order each
//! tick: unlocks, then tech availability, then building upkeep and
//! production, then goal progression. Player actions are separate methods
//! that validate and apply immediately. All timing comes from the caller's
//! `now_ms` stamps; the core never reads a clock.

use serde::{Deserialize, Serialize};

use crate::buildings::{BuildingEvent, BuildingId, BuildingKind, BuildingRegistry};
use crate::error::Result;
use crate::goals::{GoalEvent, GoalStatus, ProgressionTracker};
use crate::math::Position;
use crate::nodes::{HarvestOutcome, NodeField, NodeId, NodeKind};
use crate::resources::ResourceLedger;
use crate::save::SaveData;
use crate::tech::{TechAvailableEvent, TechGraph, TechId};
use crate::unlocks::{RequirementCtx, UnlockEvent, UnlockGraph};
use crate::vehicles::{VehicleEvent, VehicleFleet, VehicleKind};

/// Buildings per colony level.
const BUILDINGS_PER_LEVEL: u32 = 5;

/// Derived colony demographics, updated on construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColonyStatus {
    /// Colony level; gates vehicle unlocks and only ever rises.
    pub level: u32,
    /// Population headcount.
    pub population: u32,
    /// Prosperity score in `[0, 100]`.
    pub prosperity: u32,
}

impl ColonyStatus {
    fn for_building_count(count: u32) -> Self {
        Self {
            level: count / BUILDINGS_PER_LEVEL + 1,
            population: 10 + 2 * count,
            prosperity: (25 + 3 * count).min(100),
        }
    }
}

/// Everything that happened during one tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickEvents {
    /// Resources that unlocked this tick.
    pub unlocks: Vec<UnlockEvent>,
    /// Technologies that became available this tick.
    pub tech_available: Vec<TechAvailableEvent>,
    /// Production and upkeep events.
    pub buildings: Vec<BuildingEvent>,
    /// Vehicle upkeep events.
    pub vehicles: Vec<VehicleEvent>,
    /// Goal completions.
    pub goals: Vec<GoalEvent>,
}

impl TickEvents {
    /// True if the tick changed nothing noteworthy.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.unlocks.is_empty()
            && self.tech_available.is_empty()
            && self.buildings.is_empty()
            && self.vehicles.is_empty()
            && self.goals.is_empty()
    }
}

/// Outcome of a successful construction.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstructionOutcome {
    /// Id of the new building.
    pub building: BuildingId,
    /// Vehicles unlocked by the resulting colony level.
    pub vehicle_unlocks: Vec<VehicleEvent>,
}

/// End-of-run report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSummary {
    /// Seconds since the run started.
    pub elapsed_secs: u64,
    /// Total buildings constructed.
    pub buildings: u32,
    /// Sum of all stored resources.
    pub total_resources: u32,
}

/// The whole game state.
#[derive(Debug, Clone)]
pub struct Colony {
    ledger: ResourceLedger,
    unlocks: UnlockGraph,
    tech: TechGraph,
    buildings: BuildingRegistry,
    fleet: VehicleFleet,
    goals: ProgressionTracker,
    nodes: NodeField,
    status: ColonyStatus,
    game_started_ms: u64,
}

impl Colony {
    /// Start a fresh colony at `now_ms` with a seeded node field.
    #[must_use]
    pub fn new(seed: u64, now_ms: u64) -> Self {
        let mut nodes = NodeField::new(seed);
        nodes.seed_initial_field();
        Self {
            ledger: ResourceLedger::new(),
            unlocks: UnlockGraph::new(),
            tech: TechGraph::new(),
            buildings: BuildingRegistry::new(),
            fleet: VehicleFleet::new(),
            goals: ProgressionTracker::campaign(),
            nodes,
            status: ColonyStatus::for_building_count(0),
            game_started_ms: now_ms,
        }
    }

    /// The resource ledger.
    #[must_use]
    pub fn ledger(&self) -> &ResourceLedger {
        &self.ledger
    }

    /// The unlock graph.
    #[must_use]
    pub fn unlocks(&self) -> &UnlockGraph {
        &self.unlocks
    }

    /// The technology tree.
    #[must_use]
    pub fn tech(&self) -> &TechGraph {
        &self.tech
    }

    /// The building registry.
    #[must_use]
    pub fn buildings(&self) -> &BuildingRegistry {
        &self.buildings
    }

    /// The transport fleet.
    #[must_use]
    pub fn fleet(&self) -> &VehicleFleet {
        &self.fleet
    }

    /// The node field.
    #[must_use]
    pub fn nodes(&self) -> &NodeField {
        &self.nodes
    }

    /// Derived colony demographics.
    #[must_use]
    pub fn status(&self) -> ColonyStatus {
        self.status
    }

    /// True once every campaign goal has completed.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.goals.is_complete()
    }

    /// Snapshot of the active goal, or `None` after the campaign ends.
    #[must_use]
    pub fn goal_status(&self) -> Option<GoalStatus> {
        self.goals.status(&self.ledger, &self.buildings)
    }

    /// End-of-run report at `now_ms`.
    #[must_use]
    pub fn summary(&self, now_ms: u64) -> GameSummary {
        GameSummary {
            elapsed_secs: now_ms.saturating_sub(self.game_started_ms) / 1000,
            buildings: self.buildings.len() as u32,
            total_resources: self.ledger.total_stored(),
        }
    }

    /// Advance the simulation to `now_ms`.
    ///
    /// Runs unlocks, tech availability, capacity recompute, upkeep (on its
    /// 5-second window, vehicles included), production scaled by the
    /// selected vehicle, and finally goal progression. Safe to call at any
    /// cadence; a long gap is caught up in one burst.
    pub fn tick(&mut self, now_ms: u64) -> TickEvents {
        let mut events = TickEvents::default();

        events.unlocks = self.update_unlocks();
        events.tech_available = self.tech.update(&self.ledger, &self.buildings);

        self.ledger.recompute_capacity(self.buildings.capacity_bonus());
        if let Some(maintained) = self.buildings.run_maintenance(now_ms, &mut self.ledger) {
            events.buildings.extend(maintained);
            if let Some(degraded) = self.fleet.run_maintenance(&mut self.ledger) {
                events.vehicles.push(degraded);
            }
        }
        events.buildings.extend(self.buildings.tick(
            now_ms,
            self.fleet.speed_multiplier(),
            &mut self.ledger,
        ));

        events.goals = self.goals.refresh(&self.ledger, &self.buildings);
        if !events.is_empty() {
            tracing::debug!(
                unlocks = events.unlocks.len(),
                produced = events.buildings.len(),
                goals = events.goals.len(),
                "tick events"
            );
        }
        events
    }

    /// Harvest one unit from a node.
    pub fn harvest_node(&mut self, id: NodeId) -> Result<HarvestOutcome> {
        self.nodes.harvest(id, &mut self.ledger)
    }

    /// Construct a building and update the derived colony status.
    pub fn construct_building(
        &mut self,
        kind: BuildingKind,
        position: Position,
        now_ms: u64,
    ) -> Result<ConstructionOutcome> {
        let building =
            self.buildings
                .construct(kind, position, now_ms, &mut self.ledger, &self.unlocks)?;
        let vehicle_unlocks = self.refresh_status();
        Ok(ConstructionOutcome {
            building,
            vehicle_unlocks,
        })
    }

    /// Upgrade a building one level.
    pub fn upgrade_building(&mut self, id: BuildingId) -> Result<()> {
        self.buildings.upgrade(id, &mut self.ledger, &self.unlocks)
    }

    /// Research a technology.
    pub fn research_tech(&mut self, id: TechId) -> Result<()> {
        self.tech.research(id, &mut self.ledger, &mut self.buildings)
    }

    /// Purchase an unlocked vehicle.
    pub fn purchase_vehicle(&mut self, kind: VehicleKind) -> Result<()> {
        self.fleet.purchase(kind, &mut self.ledger)
    }

    /// Upgrade a purchased vehicle.
    pub fn upgrade_vehicle(&mut self, kind: VehicleKind) -> Result<()> {
        self.fleet.upgrade(kind, &mut self.ledger)
    }

    /// Switch the active vehicle.
    pub fn select_vehicle(&mut self, kind: VehicleKind) -> Result<()> {
        self.fleet.select(kind)
    }

    /// Snapshot the persistable state.
    #[must_use]
    pub fn to_save(&self) -> SaveData {
        SaveData {
            resources: self.ledger.quantities().clone(),
            buildings: self.buildings.buildings().to_vec(),
            game_goals: self.goals.goals().to_vec(),
            current_goal_index: self.goals.current_index(),
            game_started_time: self.game_started_ms,
            transportation: self.fleet.clone(),
        }
    }

    /// Rebuild a colony from a save snapshot.
    ///
    /// Unlocks and tech availability are re-derived from the restored
    /// ledger and buildings; research done before saving is forgotten. The
    /// node field is freshly seeded from `seed`.
    #[must_use]
    pub fn from_save(seed: u64, data: SaveData) -> Self {
        let mut colony = Self::new(seed, data.game_started_time);
        colony.ledger.restore(&data.resources);
        colony.buildings.restore(data.buildings);
        colony.fleet = data.transportation;
        colony.goals.restore(data.current_goal_index);

        colony.status = ColonyStatus::for_building_count(colony.buildings.len() as u32);
        colony.fleet.unlock_for_level(colony.status.level);
        colony.update_unlocks();
        colony.tech.update(&colony.ledger, &colony.buildings);
        colony
    }

    /// Recompute the derived status after construction.
    ///
    /// The level never regresses, so a status recomputed from fewer
    /// buildings than before keeps the old level.
    fn refresh_status(&mut self) -> Vec<VehicleEvent> {
        let computed = ColonyStatus::for_building_count(self.buildings.len() as u32);
        self.status = ColonyStatus {
            level: computed.level.max(self.status.level),
            ..computed
        };
        self.fleet.unlock_for_level(self.status.level)
    }

    /// Run the unlock pass and scatter deposits for new resources.
    fn update_unlocks(&mut self) -> Vec<UnlockEvent> {
        let events = {
            let ctx = RequirementCtx {
                ledger: &self.ledger,
                buildings: &self.buildings,
                researched: self.tech.researched(),
            };
            self.unlocks.update(&ctx)
        };
        for event in &events {
            if let Some(kind) = NodeKind::for_resource(event.resource) {
                self.nodes.spawn_deposits(kind);
            }
        }
        events
    }
}
