//! Resource ledger: the authoritative store of per-resource quantities.
//!
//! Every subsystem that spends or earns resources goes through the ledger so
//! the capacity invariant (`0 <= quantity <= capacity`) holds after every
//! mutation. All quantities are non-negative integers.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};

/// Baseline storage capacity per resource, before warehouse bonuses.
pub const BASE_CAPACITY: u32 = 100;

/// The resource kinds tracked by the colony.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Resource {
    /// Basic construction material.
    Wood,
    /// Mined construction material.
    Stone,
    /// Sustains the colony population.
    Food,
    /// Advanced construction material, produced by factories.
    Steel,
    /// Ore used for steel production.
    Iron,
    /// Fuel for energy production.
    Coal,
    /// Advanced energy resource.
    Oil,
}

impl Resource {
    /// All resource kinds in display order.
    pub const ALL: [Resource; 7] = [
        Resource::Wood,
        Resource::Stone,
        Resource::Food,
        Resource::Steel,
        Resource::Iron,
        Resource::Coal,
        Resource::Oil,
    ];

    /// Stable lowercase name, matching the persisted representation.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Resource::Wood => "wood",
            Resource::Stone => "stone",
            Resource::Food => "food",
            Resource::Steel => "steel",
            Resource::Iron => "iron",
            Resource::Coal => "coal",
            Resource::Oil => "oil",
        }
    }
}

impl std::fmt::Display for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A priced amount of resources, keyed by kind.
///
/// Costs iterate in a stable order so failures always report the same
/// shortfall first.
pub type Cost = BTreeMap<Resource, u32>;

/// Build a [`Cost`] from entries.
#[must_use]
pub fn cost(entries: &[(Resource, u32)]) -> Cost {
    entries.iter().copied().collect()
}

/// Current and maximum quantities for every resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceLedger {
    quantities: BTreeMap<Resource, u32>,
    capacities: BTreeMap<Resource, u32>,
}

impl Default for ResourceLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceLedger {
    /// Create an empty ledger: every resource at 0 with baseline capacity.
    #[must_use]
    pub fn new() -> Self {
        let quantities = Resource::ALL.iter().map(|&r| (r, 0)).collect();
        let capacities = Resource::ALL.iter().map(|&r| (r, BASE_CAPACITY)).collect();
        Self {
            quantities,
            capacities,
        }
    }

    /// Current quantity of a resource.
    #[must_use]
    pub fn quantity(&self, resource: Resource) -> u32 {
        self.quantities.get(&resource).copied().unwrap_or(0)
    }

    /// Current capacity of a resource.
    #[must_use]
    pub fn capacity(&self, resource: Resource) -> u32 {
        self.capacities.get(&resource).copied().unwrap_or(0)
    }

    /// Remaining headroom before a resource hits capacity.
    #[must_use]
    pub fn headroom(&self, resource: Resource) -> u32 {
        self.capacity(resource).saturating_sub(self.quantity(resource))
    }

    /// Sum of all stored quantities, for end-of-game reporting.
    #[must_use]
    pub fn total_stored(&self) -> u32 {
        self.quantities.values().sum()
    }

    /// True iff every entry of `cost` is covered by the current quantities.
    ///
    /// Resources absent from `cost` are ignored.
    #[must_use]
    pub fn can_afford(&self, cost: &Cost) -> bool {
        cost.iter().all(|(&r, &amount)| self.quantity(r) >= amount)
    }

    /// Deduct `cost` from the ledger.
    ///
    /// The deduction is atomic: if any entry is short, nothing is spent and
    /// the first shortfall (in resource order) is reported. Callers that
    /// checked [`can_afford`](Self::can_afford) first never see an error.
    pub fn pay(&mut self, cost: &Cost) -> Result<()> {
        for (&resource, &required) in cost {
            let available = self.quantity(resource);
            if available < required {
                return Err(GameError::ResourceInsufficient {
                    resource,
                    required,
                    available,
                });
            }
        }
        for (&resource, &amount) in cost {
            if let Some(q) = self.quantities.get_mut(&resource) {
                *q -= amount;
            }
        }
        Ok(())
    }

    /// Add `amount` of a resource, clamped at capacity.
    ///
    /// Returns the amount actually credited; overflow is silently dropped.
    pub fn credit(&mut self, resource: Resource, amount: u32) -> u32 {
        let credited = amount.min(self.headroom(resource));
        if let Some(q) = self.quantities.get_mut(&resource) {
            *q += credited;
        }
        credited
    }

    /// Recompute every capacity as `BASE_CAPACITY + bonus`.
    ///
    /// Invoked once per production tick with the summed warehouse bonus.
    /// Quantities above the new capacity are left in place; they simply
    /// block further credits until spent down.
    pub fn recompute_capacity(&mut self, bonus: u32) {
        for capacity in self.capacities.values_mut() {
            *capacity = BASE_CAPACITY + bonus;
        }
    }

    /// Snapshot of the quantities, used by the save contract.
    #[must_use]
    pub fn quantities(&self) -> &BTreeMap<Resource, u32> {
        &self.quantities
    }

    /// Restore quantities from a save snapshot. Unknown resources in the
    /// snapshot are ignored; missing ones stay at 0.
    pub fn restore(&mut self, quantities: &BTreeMap<Resource, u32>) {
        for (&resource, &q) in quantities {
            self.quantities.insert(resource, q);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_ledger_is_empty_at_baseline_capacity() {
        let ledger = ResourceLedger::new();
        for &r in &Resource::ALL {
            assert_eq!(ledger.quantity(r), 0);
            assert_eq!(ledger.capacity(r), BASE_CAPACITY);
        }
    }

    #[test]
    fn test_credit_clamps_at_capacity() {
        let mut ledger = ResourceLedger::new();

        let credited = ledger.credit(Resource::Wood, 60);
        assert_eq!(credited, 60);
        assert_eq!(ledger.quantity(Resource::Wood), 60);

        // Only 40 headroom left
        let credited = ledger.credit(Resource::Wood, 60);
        assert_eq!(credited, 40);
        assert_eq!(ledger.quantity(Resource::Wood), 100);

        // Full: nothing credited
        assert_eq!(ledger.credit(Resource::Wood, 1), 0);
        assert_eq!(ledger.quantity(Resource::Wood), 100);
    }

    #[test]
    fn test_can_afford_and_pay() {
        let mut ledger = ResourceLedger::new();
        ledger.credit(Resource::Wood, 10);
        ledger.credit(Resource::Stone, 10);

        let price = cost(&[(Resource::Wood, 5), (Resource::Stone, 10)]);
        assert!(ledger.can_afford(&price));
        ledger.pay(&price).unwrap();
        assert_eq!(ledger.quantity(Resource::Wood), 5);
        assert_eq!(ledger.quantity(Resource::Stone), 0);
    }

    #[test]
    fn test_pay_is_atomic_on_shortfall() {
        let mut ledger = ResourceLedger::new();
        ledger.credit(Resource::Wood, 10);

        let price = cost(&[(Resource::Wood, 5), (Resource::Stone, 1)]);
        let err = ledger.pay(&price).unwrap_err();
        assert_eq!(
            err,
            GameError::ResourceInsufficient {
                resource: Resource::Stone,
                required: 1,
                available: 0,
            }
        );
        // Nothing was spent
        assert_eq!(ledger.quantity(Resource::Wood), 10);
    }

    #[test]
    fn test_missing_cost_entries_are_ignored() {
        let ledger = ResourceLedger::new();
        assert!(ledger.can_afford(&Cost::new()));
    }

    #[test]
    fn test_recompute_capacity_applies_bonus() {
        let mut ledger = ResourceLedger::new();
        ledger.recompute_capacity(150);
        for &r in &Resource::ALL {
            assert_eq!(ledger.capacity(r), 250);
        }
        ledger.recompute_capacity(0);
        assert_eq!(ledger.capacity(Resource::Oil), BASE_CAPACITY);
    }

    #[test]
    fn test_over_capacity_stock_blocks_credit_after_shrink() {
        let mut ledger = ResourceLedger::new();
        ledger.recompute_capacity(100);
        ledger.credit(Resource::Iron, 150);
        assert_eq!(ledger.quantity(Resource::Iron), 150);

        ledger.recompute_capacity(0);
        assert_eq!(ledger.credit(Resource::Iron, 5), 0);
        assert_eq!(ledger.quantity(Resource::Iron), 150);
    }

    // =========================================================================
    // Property-based tests using proptest
    // =========================================================================

    use proptest::prelude::*;

    proptest! {
        /// Any interleaving of credits and spends keeps every quantity
        /// within `[0, capacity]`.
        #[test]
        fn prop_ledger_stays_within_capacity(
            ops in proptest::collection::vec(
                (0usize..7, 0u32..250, proptest::bool::ANY),
                0..64,
            ),
        ) {
            let mut ledger = ResourceLedger::new();
            for (index, amount, is_credit) in ops {
                let resource = Resource::ALL[index];
                if is_credit {
                    ledger.credit(resource, amount);
                } else {
                    let _ = ledger.pay(&cost(&[(resource, amount)]));
                }
                prop_assert!(ledger.quantity(resource) <= ledger.capacity(resource));
            }
        }

        /// A failed payment never changes any quantity.
        #[test]
        fn prop_failed_pay_leaves_ledger_untouched(
            stock in 0u32..100,
            short in 1u32..100,
        ) {
            let mut ledger = ResourceLedger::new();
            ledger.credit(Resource::Wood, stock);
            let before = ledger.quantities().clone();

            let price = cost(&[(Resource::Wood, stock + short)]);
            prop_assert!(ledger.pay(&price).is_err());
            prop_assert_eq!(ledger.quantities(), &before);
        }
    }
}
