//! Resource unlock graph.
//!
//! Advanced resources start locked: they cannot be spent, harvested or
//! produced until their requirements are met. Requirements are re-evaluated
//! every tick against live colony state, and an unlock is permanent once it
//! fires. Wood, stone and food are available from the start.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::buildings::{BuildingKind, BuildingRegistry};
use crate::resources::{Resource, ResourceLedger};
use crate::tech::TechId;

/// A single condition gating an unlock or a research.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Requirement {
    /// At least `count` buildings of `kind` exist.
    BuildingCountAtLeast {
        /// Building kind counted.
        kind: BuildingKind,
        /// Minimum number required.
        count: usize,
    },
    /// The ledger holds at least `amount` of `resource`.
    ResourceAtLeast {
        /// Resource inspected.
        resource: Resource,
        /// Minimum quantity required.
        amount: u32,
    },
    /// The given technology has been researched.
    TechResearched(TechId),
}

/// Read-only view of the colony state requirements are checked against.
#[derive(Debug, Clone, Copy)]
pub struct RequirementCtx<'a> {
    /// Current resource quantities.
    pub ledger: &'a ResourceLedger,
    /// Constructed buildings.
    pub buildings: &'a BuildingRegistry,
    /// Technologies researched so far.
    pub researched: &'a BTreeSet<TechId>,
}

impl Requirement {
    /// Evaluate the requirement against the current colony state.
    #[must_use]
    pub fn is_met(&self, ctx: &RequirementCtx<'_>) -> bool {
        match *self {
            Requirement::BuildingCountAtLeast { kind, count } => {
                ctx.buildings.count_of(kind) >= count
            }
            Requirement::ResourceAtLeast { resource, amount } => {
                ctx.ledger.quantity(resource) >= amount
            }
            Requirement::TechResearched(id) => ctx.researched.contains(&id),
        }
    }
}

impl std::fmt::Display for Requirement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            Requirement::BuildingCountAtLeast { kind, count } => {
                write!(f, "{count} {kind}(s)")
            }
            Requirement::ResourceAtLeast { resource, amount } => {
                write!(f, "{amount} {resource}")
            }
            Requirement::TechResearched(id) => write!(f, "research {id}"),
        }
    }
}

/// How many requirements of a gated item are currently satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    /// Requirements currently met.
    pub met: usize,
    /// Total requirements.
    pub total: usize,
}

impl Progress {
    /// Completion percentage in `[0, 100]`. An empty requirement list counts
    /// as complete.
    #[must_use]
    pub fn percentage(self) -> u32 {
        if self.total == 0 {
            return 100;
        }
        (self.met * 100 / self.total) as u32
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct UnlockEntry {
    requirements: Vec<Requirement>,
    unlocked: bool,
    met: usize,
}

/// Fired when a locked resource becomes available.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnlockEvent {
    /// The newly unlocked resource.
    pub resource: Resource,
}

/// Tracks which resources are available and how close the rest are.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnlockGraph {
    entries: BTreeMap<Resource, UnlockEntry>,
}

impl Default for UnlockGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl UnlockGraph {
    /// Build the standard unlock tree.
    ///
    /// Wood, stone and food are pre-unlocked. Iron needs 2 mines, coal needs
    /// 3, steel needs stockpiled iron and coal plus a factory, and oil needs
    /// stockpiled steel plus a second factory.
    #[must_use]
    pub fn new() -> Self {
        let mut entries = BTreeMap::new();
        for resource in [Resource::Wood, Resource::Stone, Resource::Food] {
            entries.insert(
                resource,
                UnlockEntry {
                    requirements: Vec::new(),
                    unlocked: true,
                    met: 0,
                },
            );
        }

        let locked: [(Resource, Vec<Requirement>); 4] = [
            (
                Resource::Iron,
                vec![Requirement::BuildingCountAtLeast {
                    kind: BuildingKind::Mine,
                    count: 2,
                }],
            ),
            (
                Resource::Coal,
                vec![Requirement::BuildingCountAtLeast {
                    kind: BuildingKind::Mine,
                    count: 3,
                }],
            ),
            (
                Resource::Steel,
                vec![
                    Requirement::ResourceAtLeast {
                        resource: Resource::Iron,
                        amount: 20,
                    },
                    Requirement::ResourceAtLeast {
                        resource: Resource::Coal,
                        amount: 10,
                    },
                    Requirement::BuildingCountAtLeast {
                        kind: BuildingKind::Factory,
                        count: 1,
                    },
                ],
            ),
            (
                Resource::Oil,
                vec![
                    Requirement::ResourceAtLeast {
                        resource: Resource::Steel,
                        amount: 30,
                    },
                    Requirement::BuildingCountAtLeast {
                        kind: BuildingKind::Factory,
                        count: 2,
                    },
                ],
            ),
        ];
        for (resource, requirements) in locked {
            entries.insert(
                resource,
                UnlockEntry {
                    requirements,
                    unlocked: false,
                    met: 0,
                },
            );
        }

        Self { entries }
    }

    /// True if the resource may be spent, harvested and produced.
    #[must_use]
    pub fn is_unlocked(&self, resource: Resource) -> bool {
        self.entries.get(&resource).is_some_and(|e| e.unlocked)
    }

    /// Progress toward unlocking a still-locked resource.
    ///
    /// Unlocked resources report full progress.
    #[must_use]
    pub fn progress(&self, resource: Resource) -> Progress {
        match self.entries.get(&resource) {
            Some(entry) if entry.unlocked => Progress {
                met: entry.requirements.len(),
                total: entry.requirements.len(),
            },
            Some(entry) => Progress {
                met: entry.met,
                total: entry.requirements.len(),
            },
            None => Progress { met: 0, total: 0 },
        }
    }

    /// Requirements gating a resource, for display.
    #[must_use]
    pub fn requirements(&self, resource: Resource) -> &[Requirement] {
        self.entries
            .get(&resource)
            .map_or(&[], |e| e.requirements.as_slice())
    }

    /// Re-evaluate every locked resource against the colony state.
    ///
    /// Returns one event per resource that transitioned this call. Already
    /// unlocked resources are never re-checked, so an unlock survives its
    /// requirements later becoming unmet.
    pub fn update(&mut self, ctx: &RequirementCtx<'_>) -> Vec<UnlockEvent> {
        let mut events = Vec::new();
        for (&resource, entry) in &mut self.entries {
            if entry.unlocked {
                continue;
            }
            entry.met = entry
                .requirements
                .iter()
                .filter(|req| req.is_met(ctx))
                .count();
            if entry.met == entry.requirements.len() {
                entry.unlocked = true;
                tracing::info!(resource = %resource, "resource unlocked");
                events.push(UnlockEvent { resource });
            }
        }
        events
    }

    #[cfg(test)]
    pub(crate) fn force_unlock(&mut self, resource: Resource) {
        if let Some(entry) = self.entries.get_mut(&resource) {
            entry.unlocked = true;
        }
    }
}
