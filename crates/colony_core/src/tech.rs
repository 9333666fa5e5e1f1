//! Technology tree: researchable upgrades paid for from the ledger.
//!
//! A technology becomes available once its requirements are met, and
//! research is a player action that pays the cost and applies the
//! technology's effects. Rate effects apply retroactively to buildings that
//! already exist; buildings constructed afterwards start at their base rate.
//! Research is permanent.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::buildings::{BuildingKind, BuildingRegistry};
use crate::error::{GameError, Result};
use crate::resources::{cost, Cost, Resource, ResourceLedger};
use crate::unlocks::{Progress, Requirement, RequirementCtx};

/// The researchable technologies.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum TechId {
    /// Improved hand tools for gathering.
    BasicTools,
    /// Farming techniques.
    Agriculture,
    /// Deep mining methods.
    MiningTech,
    /// Factory organisation.
    Industrialization,
    /// High-grade steel processing.
    AdvancedMetallurgy,
    /// Oil extraction and refining.
    OilTechnology,
    /// Fully automated production lines.
    Automation,
}

impl TechId {
    /// All technologies in tree order.
    pub const ALL: [TechId; 7] = [
        TechId::BasicTools,
        TechId::Agriculture,
        TechId::MiningTech,
        TechId::Industrialization,
        TechId::AdvancedMetallurgy,
        TechId::OilTechnology,
        TechId::Automation,
    ];

    /// Stable key, matching the persisted representation.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            TechId::BasicTools => "basicTools",
            TechId::Agriculture => "agriculture",
            TechId::MiningTech => "miningTech",
            TechId::Industrialization => "industrialization",
            TechId::AdvancedMetallurgy => "advancedMetallurgy",
            TechId::OilTechnology => "oilTechnology",
            TechId::Automation => "automation",
        }
    }

    /// Human-readable title.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            TechId::BasicTools => "Basic Tools",
            TechId::Agriculture => "Agriculture",
            TechId::MiningTech => "Mining Technology",
            TechId::Industrialization => "Industrialization",
            TechId::AdvancedMetallurgy => "Advanced Metallurgy",
            TechId::OilTechnology => "Oil Technology",
            TechId::Automation => "Automation",
        }
    }
}

impl std::fmt::Display for TechId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.title())
    }
}

/// An effect granted by a researched technology.
///
/// `BuildingRate` and `GlobalRate` multiply the production rate of buildings
/// that exist at research time. `ResourceRate` and `BuildingCost` are
/// carried on the tree for display but no system consumes them yet.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TechEffect {
    /// Multiply the production rate of existing buildings of one kind.
    BuildingRate {
        /// Affected building kind.
        kind: BuildingKind,
        /// Rate multiplier.
        factor: f32,
    },
    /// Multiply the gathering rate of one resource.
    ResourceRate {
        /// Affected resource.
        resource: Resource,
        /// Rate multiplier.
        factor: f32,
    },
    /// Multiply the production rate of every existing building.
    GlobalRate {
        /// Rate multiplier.
        factor: f32,
    },
    /// Multiply future building costs.
    BuildingCost {
        /// Cost multiplier.
        factor: f32,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct TechEntry {
    cost: Cost,
    requirements: Vec<Requirement>,
    effects: Vec<TechEffect>,
    available: bool,
    met: usize,
}

/// Fired when a technology's requirements are first satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TechAvailableEvent {
    /// The newly available technology.
    pub tech: TechId,
}

/// The full technology tree plus research state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TechGraph {
    entries: BTreeMap<TechId, TechEntry>,
    researched: BTreeSet<TechId>,
}

impl Default for TechGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl TechGraph {
    /// Build the standard technology tree.
    #[must_use]
    pub fn new() -> Self {
        use BuildingKind::{Factory, Farm, Mine};
        use Resource::{Coal, Iron, Oil, Steel, Stone, Wood};

        let mut entries = BTreeMap::new();
        let mut add = |id: TechId,
                       price: &[(Resource, u32)],
                       requirements: Vec<Requirement>,
                       effects: Vec<TechEffect>| {
            entries.insert(
                id,
                TechEntry {
                    cost: cost(price),
                    requirements,
                    effects,
                    available: false,
                    met: 0,
                },
            );
        };

        add(
            TechId::BasicTools,
            &[(Wood, 50), (Stone, 30)],
            vec![],
            vec![
                TechEffect::ResourceRate { resource: Wood, factor: 1.5 },
                TechEffect::ResourceRate { resource: Stone, factor: 1.5 },
            ],
        );
        add(
            TechId::Agriculture,
            &[(Wood, 40), (Stone, 20)],
            vec![],
            vec![TechEffect::BuildingRate { kind: Farm, factor: 1.5 }],
        );
        add(
            TechId::MiningTech,
            &[(Wood, 100), (Stone, 80), (Iron, 50)],
            vec![
                Requirement::TechResearched(TechId::BasicTools),
                Requirement::BuildingCountAtLeast { kind: Mine, count: 2 },
            ],
            vec![
                TechEffect::ResourceRate { resource: Iron, factor: 2.0 },
                TechEffect::ResourceRate { resource: Coal, factor: 2.0 },
            ],
        );
        add(
            TechId::Industrialization,
            &[(Wood, 150), (Stone, 120), (Iron, 80), (Coal, 60)],
            vec![
                Requirement::TechResearched(TechId::BasicTools),
                Requirement::BuildingCountAtLeast { kind: Factory, count: 1 },
            ],
            vec![
                TechEffect::BuildingRate { kind: Factory, factor: 1.5 },
                TechEffect::ResourceRate { resource: Steel, factor: 1.5 },
            ],
        );
        add(
            TechId::AdvancedMetallurgy,
            &[(Wood, 200), (Stone, 150), (Iron, 120), (Coal, 100), (Steel, 80)],
            vec![
                Requirement::TechResearched(TechId::MiningTech),
                Requirement::TechResearched(TechId::Industrialization),
            ],
            vec![
                TechEffect::ResourceRate { resource: Steel, factor: 2.5 },
                TechEffect::BuildingCost { factor: 0.8 },
            ],
        );
        add(
            TechId::OilTechnology,
            &[(Wood, 250), (Stone, 200), (Iron, 150), (Steel, 100), (Oil, 50)],
            vec![
                Requirement::TechResearched(TechId::Industrialization),
                Requirement::ResourceAtLeast { resource: Oil, amount: 20 },
            ],
            vec![
                TechEffect::ResourceRate { resource: Oil, factor: 2.0 },
                TechEffect::BuildingRate { kind: Factory, factor: 2.0 },
            ],
        );
        add(
            TechId::Automation,
            &[
                (Wood, 300),
                (Stone, 250),
                (Iron, 200),
                (Coal, 150),
                (Steel, 120),
                (Oil, 100),
            ],
            vec![
                Requirement::TechResearched(TechId::AdvancedMetallurgy),
                Requirement::TechResearched(TechId::OilTechnology),
                Requirement::BuildingCountAtLeast { kind: Factory, count: 3 },
            ],
            vec![
                TechEffect::GlobalRate { factor: 2.0 },
                TechEffect::BuildingCost { factor: 0.6 },
            ],
        );

        Self {
            entries,
            researched: BTreeSet::new(),
        }
    }

    /// True once a technology has been researched.
    #[must_use]
    pub fn is_researched(&self, id: TechId) -> bool {
        self.researched.contains(&id)
    }

    /// The set of researched technologies.
    #[must_use]
    pub fn researched(&self) -> &BTreeSet<TechId> {
        &self.researched
    }

    /// Research cost of a technology.
    ///
    /// # Panics
    ///
    /// Never panics; every [`TechId`] has an entry.
    #[must_use]
    pub fn cost_of(&self, id: TechId) -> &Cost {
        &self.entries[&id].cost
    }

    /// True once a technology's requirements have been met at some point.
    ///
    /// Availability is permanent, like a resource unlock: spending a
    /// stockpile requirement back down does not re-lock the technology.
    #[must_use]
    pub fn is_available(&self, id: TechId) -> bool {
        self.entries[&id].available
    }

    /// Progress toward a technology's requirements.
    ///
    /// Available and researched technologies report full progress.
    #[must_use]
    pub fn progress(&self, id: TechId) -> Progress {
        let entry = &self.entries[&id];
        if self.researched.contains(&id) || entry.available {
            return Progress {
                met: entry.requirements.len(),
                total: entry.requirements.len(),
            };
        }
        Progress {
            met: entry.met,
            total: entry.requirements.len(),
        }
    }

    /// Re-evaluate requirement progress for every still-locked technology.
    ///
    /// Returns one event per technology that became available this call.
    /// Already available technologies are never re-checked, so availability
    /// survives its requirements later becoming unmet.
    pub fn update(
        &mut self,
        ledger: &ResourceLedger,
        buildings: &BuildingRegistry,
    ) -> Vec<TechAvailableEvent> {
        let researched = self.researched.clone();
        let ctx = RequirementCtx {
            ledger,
            buildings,
            researched: &researched,
        };

        let mut events = Vec::new();
        for (&id, entry) in &mut self.entries {
            if researched.contains(&id) || entry.available {
                continue;
            }
            entry.met = entry.requirements.iter().filter(|r| r.is_met(&ctx)).count();
            if entry.met == entry.requirements.len() {
                entry.available = true;
                events.push(TechAvailableEvent { tech: id });
            }
        }
        events
    }

    /// Research a technology: pay its cost and apply its effects.
    ///
    /// Consults the permanent availability flag, evaluating requirements
    /// directly only for technologies no update pass has seen yet, so
    /// research works before the first tick. Rate effects multiply the
    /// production rate of buildings existing right now.
    pub fn research(
        &mut self,
        id: TechId,
        ledger: &mut ResourceLedger,
        buildings: &mut BuildingRegistry,
    ) -> Result<()> {
        if self.researched.contains(&id) {
            return Err(GameError::AlreadyResearched(id.name()));
        }
        if !self.entries[&id].available {
            let satisfied = {
                let ctx = RequirementCtx {
                    ledger,
                    buildings: &*buildings,
                    researched: &self.researched,
                };
                self.entries[&id]
                    .requirements
                    .iter()
                    .all(|r| r.is_met(&ctx))
            };
            if !satisfied {
                return Err(GameError::NotYetUnlocked(id.name()));
            }
            if let Some(entry) = self.entries.get_mut(&id) {
                entry.available = true;
            }
        }

        ledger.pay(&self.entries[&id].cost)?;
        self.researched.insert(id);

        for effect in &self.entries[&id].effects {
            match *effect {
                TechEffect::BuildingRate { kind, factor } => {
                    for building in buildings.iter_mut().filter(|b| b.kind == kind) {
                        if let Some(rate) = building.production_rate.as_mut() {
                            *rate *= factor;
                        }
                    }
                }
                TechEffect::GlobalRate { factor } => {
                    for building in buildings.iter_mut() {
                        if let Some(rate) = building.production_rate.as_mut() {
                            *rate *= factor;
                        }
                    }
                }
                TechEffect::ResourceRate { .. } | TechEffect::BuildingCost { .. } => {}
            }
        }
        tracing::info!(tech = %id, "technology researched");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Position;
    use crate::unlocks::UnlockGraph;

    fn funded_ledger() -> ResourceLedger {
        let mut ledger = ResourceLedger::new();
        ledger.recompute_capacity(900);
        for &r in &Resource::ALL {
            ledger.credit(r, 1_000);
        }
        ledger
    }

    #[test]
    fn test_basic_tools_available_immediately() {
        let mut graph = TechGraph::new();
        let ledger = ResourceLedger::new();
        let buildings = BuildingRegistry::new();

        let events = graph.update(&ledger, &buildings);
        let available: Vec<TechId> = events.iter().map(|e| e.tech).collect();
        assert!(available.contains(&TechId::BasicTools));
        assert!(available.contains(&TechId::Agriculture));
        assert!(!available.contains(&TechId::MiningTech));
    }

    #[test]
    fn test_research_pays_cost_and_is_permanent() {
        let mut graph = TechGraph::new();
        let mut ledger = funded_ledger();
        let mut buildings = BuildingRegistry::new();

        graph
            .research(TechId::BasicTools, &mut ledger, &mut buildings)
            .unwrap();
        assert!(graph.is_researched(TechId::BasicTools));
        assert_eq!(ledger.quantity(Resource::Wood), 950);
        assert_eq!(ledger.quantity(Resource::Stone), 970);

        let err = graph
            .research(TechId::BasicTools, &mut ledger, &mut buildings)
            .unwrap_err();
        assert_eq!(err, GameError::AlreadyResearched("basicTools"));
    }

    #[test]
    fn test_research_rejects_unmet_requirements() {
        let mut graph = TechGraph::new();
        let mut ledger = funded_ledger();
        let mut buildings = BuildingRegistry::new();

        let err = graph
            .research(TechId::MiningTech, &mut ledger, &mut buildings)
            .unwrap_err();
        assert_eq!(err, GameError::NotYetUnlocked("miningTech"));
    }

    #[test]
    fn test_research_rejects_unaffordable_cost() {
        let mut graph = TechGraph::new();
        let mut ledger = ResourceLedger::new();
        let mut buildings = BuildingRegistry::new();
        ledger.credit(Resource::Wood, 49);
        ledger.credit(Resource::Stone, 30);

        let err = graph
            .research(TechId::BasicTools, &mut ledger, &mut buildings)
            .unwrap_err();
        assert!(matches!(err, GameError::ResourceInsufficient { .. }));
        assert!(!graph.is_researched(TechId::BasicTools));
    }

    #[test]
    fn test_building_rate_effect_is_retroactive_only() {
        let mut graph = TechGraph::new();
        let mut ledger = funded_ledger();
        let mut buildings = BuildingRegistry::new();
        let unlocks = UnlockGraph::new();

        let existing = buildings
            .construct(BuildingKind::Farm, Position::default(), 0, &mut ledger, &unlocks)
            .unwrap();

        graph
            .research(TechId::Agriculture, &mut ledger, &mut buildings)
            .unwrap();
        assert_eq!(buildings.get(existing).unwrap().production_rate, Some(1.5));

        // A farm built after research starts at its base rate.
        let newer = buildings
            .construct(BuildingKind::Farm, Position::default(), 0, &mut ledger, &unlocks)
            .unwrap();
        assert_eq!(buildings.get(newer).unwrap().production_rate, Some(1.0));
    }

    #[test]
    fn test_tech_requirement_chains() {
        let mut graph = TechGraph::new();
        let mut ledger = funded_ledger();
        let mut buildings = BuildingRegistry::new();
        let unlocks = UnlockGraph::new();
        for _ in 0..2 {
            buildings
                .construct(
                    BuildingKind::Mine,
                    Position::default(),
                    0,
                    &mut ledger,
                    &unlocks,
                )
                .unwrap();
        }

        // MiningTech needs BasicTools researched first.
        assert_eq!(
            graph
                .research(TechId::MiningTech, &mut ledger, &mut buildings)
                .unwrap_err(),
            GameError::NotYetUnlocked("miningTech")
        );
        graph
            .research(TechId::BasicTools, &mut ledger, &mut buildings)
            .unwrap();
        graph
            .research(TechId::MiningTech, &mut ledger, &mut buildings)
            .unwrap();
        assert!(graph.is_researched(TechId::MiningTech));
    }

    #[test]
    fn test_availability_is_permanent_after_stockpile_dip() {
        let mut graph = TechGraph::new();
        let mut ledger = funded_ledger();
        let mut buildings = BuildingRegistry::new();
        let unlocks = UnlockGraph::new();
        buildings
            .construct(
                BuildingKind::Factory,
                Position::default(),
                0,
                &mut ledger,
                &unlocks,
            )
            .unwrap();
        graph
            .research(TechId::BasicTools, &mut ledger, &mut buildings)
            .unwrap();
        graph
            .research(TechId::Industrialization, &mut ledger, &mut buildings)
            .unwrap();

        let events = graph.update(&ledger, &buildings);
        assert!(events
            .iter()
            .any(|e| e.tech == TechId::OilTechnology));
        assert!(graph.is_available(TechId::OilTechnology));

        // Spend oil below its requirement threshold; availability holds,
        // progress stays full, and no duplicate event fires when the
        // stockpile recovers.
        let oil = ledger.quantity(Resource::Oil);
        ledger.pay(&cost(&[(Resource::Oil, oil)])).unwrap();
        assert!(graph.update(&ledger, &buildings).is_empty());
        assert!(graph.is_available(TechId::OilTechnology));
        assert_eq!(graph.progress(TechId::OilTechnology).met, 2);

        ledger.credit(Resource::Oil, 60);
        assert!(graph.update(&ledger, &buildings).is_empty());

        // Research is gated on the permanent flag, so only the cost can
        // reject it now.
        graph
            .research(TechId::OilTechnology, &mut ledger, &mut buildings)
            .unwrap();
        assert!(graph.is_researched(TechId::OilTechnology));
    }
}
