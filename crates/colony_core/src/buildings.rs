//! Production buildings: construction, upgrades, per-tick production and
//! upkeep.
//!
//! Buildings are the colony's only automated income. Mines yield stone,
//! farms yield food, factories yield wood, stone and steel, and warehouses
//! raise storage capacity instead of producing. Elapsed time is always
//! `now - last_stamp`, so a paused simulation catches up in one burst on the
//! next tick.

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};
use crate::math::Position;
use crate::resources::{cost, Cost, Resource, ResourceLedger};
use crate::unlocks::UnlockGraph;

/// Seconds between upkeep charges.
pub const MAINTENANCE_INTERVAL_SECS: u64 = 5;

/// Storage capacity added per warehouse level.
pub const WAREHOUSE_CAPACITY_PER_LEVEL: u32 = 50;

/// Per-level production growth: each level past the first adds 50% of the
/// base rate.
const UPGRADE_RATE_STEP: f32 = 0.5;

/// Unique identifier for a constructed building.
pub type BuildingId = u64;

/// The building kinds the colony can construct.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum BuildingKind {
    /// Produces stone.
    Mine,
    /// Produces food.
    Farm,
    /// Produces wood, stone and steel.
    Factory,
    /// Raises storage capacity; produces nothing.
    Warehouse,
}

impl BuildingKind {
    /// All building kinds.
    pub const ALL: [BuildingKind; 4] = [
        BuildingKind::Mine,
        BuildingKind::Farm,
        BuildingKind::Factory,
        BuildingKind::Warehouse,
    ];

    /// Stable lowercase name, matching the persisted representation.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            BuildingKind::Mine => "mine",
            BuildingKind::Farm => "farm",
            BuildingKind::Factory => "factory",
            BuildingKind::Warehouse => "warehouse",
        }
    }

    /// Construction cost at level 1. Upgrade costs scale from the same table.
    #[must_use]
    pub fn base_cost(self) -> Cost {
        match self {
            BuildingKind::Mine => cost(&[(Resource::Stone, 10), (Resource::Wood, 5)]),
            BuildingKind::Farm => cost(&[(Resource::Wood, 8), (Resource::Stone, 3)]),
            BuildingKind::Factory => cost(&[(Resource::Wood, 15), (Resource::Stone, 10)]),
            BuildingKind::Warehouse => cost(&[
                (Resource::Wood, 10),
                (Resource::Stone, 15),
                (Resource::Steel, 5),
            ]),
        }
    }

    /// Units produced per second at level 1.
    #[must_use]
    pub const fn base_rate(self) -> f32 {
        match self {
            BuildingKind::Mine | BuildingKind::Farm => 1.0,
            BuildingKind::Factory => 0.5,
            BuildingKind::Warehouse => 0.0,
        }
    }

    /// Resources credited per production pulse.
    #[must_use]
    pub const fn outputs(self) -> &'static [Resource] {
        match self {
            BuildingKind::Mine => &[Resource::Stone],
            BuildingKind::Farm => &[Resource::Food],
            BuildingKind::Factory => &[Resource::Wood, Resource::Stone, Resource::Steel],
            BuildingKind::Warehouse => &[],
        }
    }

    /// Upkeep cost at level 1. Warehouses are upkeep-free.
    #[must_use]
    pub fn maintenance_base(self) -> Cost {
        match self {
            BuildingKind::Mine => cost(&[(Resource::Stone, 1), (Resource::Wood, 1)]),
            BuildingKind::Farm => cost(&[(Resource::Wood, 1), (Resource::Food, 1)]),
            BuildingKind::Factory => cost(&[
                (Resource::Wood, 2),
                (Resource::Stone, 2),
                (Resource::Steel, 1),
            ]),
            BuildingKind::Warehouse => Cost::new(),
        }
    }
}

impl std::fmt::Display for BuildingKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Scale a base cost by `factor^exponent`, flooring each entry.
fn scaled_cost(base: &Cost, factor: f64, exponent: i32) -> Cost {
    let multiplier = factor.powi(exponent);
    base.iter()
        .map(|(&resource, &amount)| {
            (resource, (f64::from(amount) * multiplier).floor() as u32)
        })
        .collect()
}

/// Upgrade cost for a building of `kind` currently at `level`.
#[must_use]
pub fn upgrade_cost(kind: BuildingKind, level: u32) -> Cost {
    scaled_cost(&kind.base_cost(), 1.5, level as i32)
}

/// Upkeep cost for a building of `kind` at `level`.
#[must_use]
pub fn maintenance_cost(kind: BuildingKind, level: u32) -> Cost {
    scaled_cost(&kind.maintenance_base(), 1.2, level.saturating_sub(1) as i32)
}

/// A constructed building.
///
/// `production_rate` and `last_production_ms` are absent for warehouses.
/// `level` only ever increases; buildings are removed only by a full
/// game-state reset or load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Building {
    /// Registry-unique identifier.
    pub id: BuildingId,
    /// The kind of this building.
    #[serde(rename = "type")]
    pub kind: BuildingKind,
    /// Placement on the field.
    pub position: Position,
    /// Current level, starting at 1.
    pub level: u32,
    /// Units produced per second, after upgrades and tech effects.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub production_rate: Option<f32>,
    /// Wall-clock stamp of the last production pulse.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_production_ms: Option<u64>,
    /// False while upkeep is unaffordable; idle buildings produce nothing.
    #[serde(default = "default_functional")]
    pub is_functional: bool,
}

const fn default_functional() -> bool {
    true
}

/// Events generated by construction, production and upkeep.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum BuildingEvent {
    /// A building credited resources to the ledger.
    Produced {
        /// The producing building.
        building: BuildingId,
        /// Resource credited.
        resource: Resource,
        /// Amount actually credited (after the capacity clamp).
        amount: u32,
    },
    /// Upkeep became unaffordable; the building stops producing.
    BecameIdle {
        /// The affected building.
        building: BuildingId,
    },
    /// Upkeep is affordable again; the building resumes producing.
    Restored {
        /// The affected building.
        building: BuildingId,
    },
}

/// All constructed buildings plus the shared upkeep window.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuildingRegistry {
    buildings: Vec<Building>,
    next_id: BuildingId,
    last_maintenance_ms: Option<u64>,
}

impl BuildingRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of constructed buildings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buildings.len()
    }

    /// True if no buildings exist.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buildings.is_empty()
    }

    /// Number of buildings of a given kind.
    #[must_use]
    pub fn count_of(&self, kind: BuildingKind) -> usize {
        self.buildings.iter().filter(|b| b.kind == kind).count()
    }

    /// Look up a building by id.
    #[must_use]
    pub fn get(&self, id: BuildingId) -> Option<&Building> {
        self.buildings.iter().find(|b| b.id == id)
    }

    /// Iterate over all buildings in construction order.
    pub fn iter(&self) -> impl Iterator<Item = &Building> {
        self.buildings.iter()
    }

    /// Iterate mutably; used by the tech effect application pass.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Building> {
        self.buildings.iter_mut()
    }

    /// Summed warehouse capacity bonus (`50 * level` per warehouse).
    #[must_use]
    pub fn capacity_bonus(&self) -> u32 {
        self.buildings
            .iter()
            .filter(|b| b.kind == BuildingKind::Warehouse)
            .map(|b| WAREHOUSE_CAPACITY_PER_LEVEL * b.level)
            .sum()
    }

    /// Construct a building of `kind` at `position`.
    ///
    /// Fails with [`GameError::PrerequisiteNotUnlocked`] if any resource in
    /// the cost is still locked, and [`GameError::ResourceInsufficient`] if
    /// the cost cannot be paid. On success the cost is paid and the new
    /// building starts at level 1 with its base production rate.
    pub fn construct(
        &mut self,
        kind: BuildingKind,
        position: Position,
        now_ms: u64,
        ledger: &mut ResourceLedger,
        unlocks: &UnlockGraph,
    ) -> Result<BuildingId> {
        let price = kind.base_cost();
        for &resource in price.keys() {
            if !unlocks.is_unlocked(resource) {
                return Err(GameError::PrerequisiteNotUnlocked(resource));
            }
        }
        ledger.pay(&price)?;

        let id = self.next_id;
        self.next_id += 1;

        let producing = kind != BuildingKind::Warehouse;
        self.buildings.push(Building {
            id,
            kind,
            position,
            level: 1,
            production_rate: producing.then(|| kind.base_rate()),
            last_production_ms: producing.then_some(now_ms),
            is_functional: true,
        });
        tracing::info!(kind = %kind, id, "building constructed");
        Ok(id)
    }

    /// Upgrade a building one level.
    ///
    /// Cost is `base * 1.5^level`, floored per resource, with the same two
    /// failure modes as [`construct`](Self::construct). On success the
    /// production rate is recomputed from the base rate, so any tech
    /// multipliers applied earlier are replaced by the level bonus.
    pub fn upgrade(
        &mut self,
        id: BuildingId,
        ledger: &mut ResourceLedger,
        unlocks: &UnlockGraph,
    ) -> Result<()> {
        let building = self
            .buildings
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or(GameError::BuildingNotFound(id))?;

        let price = upgrade_cost(building.kind, building.level);
        for &resource in price.keys() {
            if !unlocks.is_unlocked(resource) {
                return Err(GameError::PrerequisiteNotUnlocked(resource));
            }
        }
        ledger.pay(&price)?;

        building.level += 1;
        if building.kind != BuildingKind::Warehouse {
            building.production_rate = Some(
                building.kind.base_rate()
                    * (1.0 + (building.level - 1) as f32 * UPGRADE_RATE_STEP),
            );
        }
        tracing::info!(kind = %building.kind, id, level = building.level, "building upgraded");
        Ok(())
    }

    /// Run one production pass.
    ///
    /// For every functional, non-warehouse building with at least one second
    /// elapsed, credits `floor(elapsed_secs * rate * speed_multiplier)` of
    /// each output resource (independently capacity-clamped) and resets the
    /// production stamp.
    pub fn tick(
        &mut self,
        now_ms: u64,
        speed_multiplier: f32,
        ledger: &mut ResourceLedger,
    ) -> Vec<BuildingEvent> {
        let mut events = Vec::new();

        for building in &mut self.buildings {
            if building.kind == BuildingKind::Warehouse || !building.is_functional {
                continue;
            }
            let (Some(rate), Some(last)) =
                (building.production_rate, building.last_production_ms)
            else {
                continue;
            };

            let elapsed = now_ms.saturating_sub(last) as f64 / 1000.0;
            if elapsed < 1.0 {
                continue;
            }
            let amount =
                (elapsed * f64::from(rate) * f64::from(speed_multiplier)).floor() as u32;
            if amount == 0 {
                continue;
            }

            for &resource in building.kind.outputs() {
                let credited = ledger.credit(resource, amount);
                if credited > 0 {
                    events.push(BuildingEvent::Produced {
                        building: building.id,
                        resource,
                        amount: credited,
                    });
                }
            }
            building.last_production_ms = Some(now_ms);
        }

        events
    }

    /// Charge upkeep if the 5-second window has elapsed.
    ///
    /// Returns `None` while the window is still open. When it runs, every
    /// non-warehouse building either pays `maintenance_cost` and is
    /// (re)marked functional, or is idled until a later window finds the
    /// cost affordable. No upkeep debt accrues while idle.
    pub fn run_maintenance(
        &mut self,
        now_ms: u64,
        ledger: &mut ResourceLedger,
    ) -> Option<Vec<BuildingEvent>> {
        let Some(last) = self.last_maintenance_ms else {
            self.last_maintenance_ms = Some(now_ms);
            return None;
        };
        if now_ms.saturating_sub(last) < MAINTENANCE_INTERVAL_SECS * 1000 {
            return None;
        }
        self.last_maintenance_ms = Some(now_ms);

        let mut events = Vec::new();
        for building in &mut self.buildings {
            if building.kind == BuildingKind::Warehouse {
                continue;
            }
            let upkeep = maintenance_cost(building.kind, building.level);
            if ledger.pay(&upkeep).is_ok() {
                if !building.is_functional {
                    building.is_functional = true;
                    events.push(BuildingEvent::Restored {
                        building: building.id,
                    });
                }
            } else if building.is_functional {
                building.is_functional = false;
                tracing::debug!(kind = %building.kind, id = building.id, "upkeep unaffordable");
                events.push(BuildingEvent::BecameIdle {
                    building: building.id,
                });
            }
        }
        Some(events)
    }

    /// Replace the registry contents from a save snapshot.
    pub fn restore(&mut self, buildings: Vec<Building>) {
        self.next_id = buildings.iter().map(|b| b.id + 1).max().unwrap_or(0);
        self.buildings = buildings;
        self.last_maintenance_ms = None;
    }

    /// Consume the registry, yielding the buildings for the save contract.
    #[must_use]
    pub fn into_buildings(self) -> Vec<Building> {
        self.buildings
    }

    /// Snapshot of the buildings for the save contract.
    #[must_use]
    pub fn buildings(&self) -> &[Building] {
        &self.buildings
    }
}
