//! Scripted player for automated playthroughs.
//!
//! The player follows the campaign greedily: harvest whatever has storage
//! headroom, build toward the goal chain, research anything affordable and
//! keep the best purchased vehicle selected. Every action failure is
//! expected (not enough resources yet, nothing unlocked) and silently
//! retried on a later tick.

use colony_core::math::FieldRng;
use colony_core::prelude::*;

/// Harvest clicks attempted per act call.
const HARVESTS_PER_ACT: usize = 5;

/// A deterministic scripted player.
#[derive(Debug)]
pub struct ScriptedPlayer {
    rng: FieldRng,
}

impl ScriptedPlayer {
    /// Create a player with a seeded placement RNG.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: FieldRng::new(seed),
        }
    }

    /// Take one round of actions. Returns how many succeeded.
    pub fn act(&mut self, colony: &mut Colony, now_ms: u64) -> usize {
        let mut performed = 0;
        performed += self.harvest(colony);
        performed += usize::from(self.build(colony, now_ms));
        performed += Self::research(colony);
        performed += Self::manage_fleet(colony);
        performed
    }

    fn harvest(&mut self, colony: &mut Colony) -> usize {
        let targets: Vec<NodeId> = colony
            .nodes()
            .iter()
            .filter(|node| colony.ledger().headroom(node.kind.resource()) > 0)
            .take(HARVESTS_PER_ACT)
            .map(|node| node.id)
            .collect();
        let mut harvested = 0;
        for id in targets {
            if colony.harvest_node(id).is_ok() {
                harvested += 1;
            }
        }
        harvested
    }

    fn build(&mut self, colony: &mut Colony, now_ms: u64) -> bool {
        let Some(kind) = Self::next_build(colony) else {
            return false;
        };
        let position = self.rng.next_position();
        colony.construct_building(kind, position, now_ms).is_ok()
    }

    /// The campaign's goal chain, as a build priority.
    fn next_build(colony: &Colony) -> Option<BuildingKind> {
        let buildings = colony.buildings();
        if buildings.count_of(BuildingKind::Mine) < 5 {
            Some(BuildingKind::Mine)
        } else if buildings.count_of(BuildingKind::Farm) < 3 {
            Some(BuildingKind::Farm)
        } else if buildings.count_of(BuildingKind::Factory) < 2 {
            Some(BuildingKind::Factory)
        } else if buildings.count_of(BuildingKind::Warehouse) < 1
            && colony.unlocks().is_unlocked(Resource::Steel)
        {
            Some(BuildingKind::Warehouse)
        } else if buildings.len() < 15 {
            Some(BuildingKind::Mine)
        } else {
            None
        }
    }

    fn research(colony: &mut Colony) -> usize {
        let mut researched = 0;
        for id in TechId::ALL {
            if !colony.tech().is_researched(id) && colony.research_tech(id).is_ok() {
                researched += 1;
            }
        }
        researched
    }

    fn manage_fleet(colony: &mut Colony) -> usize {
        let mut actions = 0;
        // Best vehicle last, so the final successful select wins.
        for kind in VehicleKind::ALL {
            let vehicle = colony.fleet().vehicle(kind);
            if vehicle.unlocked && !vehicle.purchased && colony.purchase_vehicle(kind).is_ok()
            {
                actions += 1;
            }
            if colony.fleet().vehicle(kind).purchased && colony.select_vehicle(kind).is_ok()
            {
                actions += 1;
            }
        }
        actions
    }
}
