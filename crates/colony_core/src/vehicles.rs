//! Transport fleet: vehicles that scale building production.
//!
//! Exactly one vehicle is selected at a time and its speed drives the
//! production multiplier (`speed / 2`). Vehicles unlock as the colony levels
//! up, are purchased once, and can be upgraded a bounded number of times.
//! Only the selected vehicle pays upkeep; missing it degrades the vehicle's
//! speed instead of idling it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};
use crate::resources::{cost, Cost, Resource, ResourceLedger};

/// Maximum upgrade level for every vehicle.
pub const VEHICLE_MAX_LEVEL: u32 = 3;

/// The transport vehicle kinds, in unlock order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum VehicleKind {
    /// Hand-carried transport, available from the start.
    Manual,
    /// Wooden cart.
    Cart,
    /// Farm tractor.
    Tractor,
    /// Cargo truck.
    Truck,
    /// Freight train.
    Train,
}

impl VehicleKind {
    /// All vehicle kinds in unlock order.
    pub const ALL: [VehicleKind; 5] = [
        VehicleKind::Manual,
        VehicleKind::Cart,
        VehicleKind::Tractor,
        VehicleKind::Truck,
        VehicleKind::Train,
    ];

    /// Stable lowercase name, matching the persisted representation.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            VehicleKind::Manual => "manual",
            VehicleKind::Cart => "cart",
            VehicleKind::Tractor => "tractor",
            VehicleKind::Truck => "truck",
            VehicleKind::Train => "train",
        }
    }

    /// Base speed before upgrades.
    #[must_use]
    pub const fn base_speed(self) -> f32 {
        match self {
            VehicleKind::Manual => 1.0,
            VehicleKind::Cart => 2.0,
            VehicleKind::Tractor => 4.0,
            VehicleKind::Truck => 6.0,
            VehicleKind::Train => 10.0,
        }
    }

    /// Base carrying capacity before upgrades.
    #[must_use]
    pub const fn base_capacity(self) -> f32 {
        match self {
            VehicleKind::Manual => 5.0,
            VehicleKind::Cart => 15.0,
            VehicleKind::Tractor => 30.0,
            VehicleKind::Truck => 50.0,
            VehicleKind::Train => 100.0,
        }
    }

    /// Colony level at which the vehicle unlocks. Manual transport needs no
    /// unlock.
    #[must_use]
    pub const fn unlock_level(self) -> u32 {
        match self {
            VehicleKind::Manual => 1,
            VehicleKind::Cart => 2,
            VehicleKind::Tractor => 3,
            VehicleKind::Truck => 4,
            VehicleKind::Train => 5,
        }
    }

    /// One-time purchase cost. Manual transport is free and pre-purchased.
    #[must_use]
    pub fn purchase_cost(self) -> Cost {
        match self {
            VehicleKind::Manual => Cost::new(),
            VehicleKind::Cart => cost(&[(Resource::Wood, 100), (Resource::Stone, 50)]),
            VehicleKind::Tractor => cost(&[
                (Resource::Wood, 300),
                (Resource::Stone, 200),
                (Resource::Steel, 50),
            ]),
            VehicleKind::Truck => cost(&[
                (Resource::Wood, 500),
                (Resource::Stone, 400),
                (Resource::Steel, 200),
            ]),
            VehicleKind::Train => cost(&[
                (Resource::Wood, 1_000),
                (Resource::Stone, 800),
                (Resource::Steel, 500),
                (Resource::Oil, 200),
            ]),
        }
    }

    /// Upgrade cost at level 1. Later levels scale from this table.
    #[must_use]
    pub fn upgrade_base(self) -> Cost {
        match self {
            VehicleKind::Manual => cost(&[(Resource::Food, 10)]),
            VehicleKind::Cart => cost(&[(Resource::Wood, 50), (Resource::Stone, 25)]),
            VehicleKind::Tractor => cost(&[
                (Resource::Wood, 150),
                (Resource::Stone, 100),
                (Resource::Steel, 25),
            ]),
            VehicleKind::Truck => cost(&[
                (Resource::Wood, 250),
                (Resource::Stone, 200),
                (Resource::Steel, 100),
            ]),
            VehicleKind::Train => cost(&[
                (Resource::Wood, 500),
                (Resource::Stone, 400),
                (Resource::Steel, 250),
                (Resource::Oil, 100),
            ]),
        }
    }

    /// Upkeep charged each maintenance window while selected.
    #[must_use]
    pub fn maintenance_cost(self) -> Cost {
        match self {
            VehicleKind::Manual => cost(&[(Resource::Food, 1)]),
            VehicleKind::Cart => cost(&[(Resource::Wood, 1), (Resource::Stone, 1)]),
            VehicleKind::Tractor => cost(&[
                (Resource::Wood, 2),
                (Resource::Stone, 2),
                (Resource::Steel, 1),
            ]),
            VehicleKind::Truck => cost(&[
                (Resource::Wood, 3),
                (Resource::Stone, 3),
                (Resource::Steel, 2),
            ]),
            VehicleKind::Train => cost(&[
                (Resource::Wood, 5),
                (Resource::Stone, 5),
                (Resource::Steel, 3),
                (Resource::Oil, 2),
            ]),
        }
    }
}

impl std::fmt::Display for VehicleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Upgrade cost for a vehicle of `kind` currently at `level`.
#[must_use]
pub fn vehicle_upgrade_cost(kind: VehicleKind, level: u32) -> Cost {
    let multiplier = 1.5f64.powi(level.saturating_sub(1) as i32);
    kind.upgrade_base()
        .iter()
        .map(|(&resource, &amount)| {
            (resource, (f64::from(amount) * multiplier).floor() as u32)
        })
        .collect()
}

/// One vehicle's mutable state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    /// Current speed, after upgrades and upkeep degradation.
    pub speed: f32,
    /// Current carrying capacity.
    pub capacity: f32,
    /// Whether the colony level has unlocked this vehicle.
    pub unlocked: bool,
    /// Whether the vehicle has been purchased.
    pub purchased: bool,
    /// Upgrade level: 0 until purchased, then at least 1.
    pub level: u32,
    /// Upgrade ceiling.
    pub max_level: u32,
}

/// Fleet events surfaced to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VehicleEvent {
    /// A vehicle became purchasable.
    Unlocked {
        /// The newly unlocked vehicle.
        vehicle: VehicleKind,
    },
    /// The selected vehicle missed upkeep and lost speed.
    Degraded {
        /// The degraded vehicle.
        vehicle: VehicleKind,
    },
}

/// All vehicles plus the current selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleFleet {
    vehicles: BTreeMap<VehicleKind, Vehicle>,
    current: VehicleKind,
}

impl Default for VehicleFleet {
    fn default() -> Self {
        Self::new()
    }
}

impl VehicleFleet {
    /// Create the starting fleet: manual transport selected, everything else
    /// locked.
    #[must_use]
    pub fn new() -> Self {
        let vehicles = VehicleKind::ALL
            .iter()
            .map(|&kind| {
                let starter = kind == VehicleKind::Manual;
                (
                    kind,
                    Vehicle {
                        speed: kind.base_speed(),
                        capacity: kind.base_capacity(),
                        unlocked: starter,
                        purchased: starter,
                        level: u32::from(starter),
                        max_level: VEHICLE_MAX_LEVEL,
                    },
                )
            })
            .collect();
        Self {
            vehicles,
            current: VehicleKind::Manual,
        }
    }

    /// The currently selected vehicle kind.
    #[must_use]
    pub fn current(&self) -> VehicleKind {
        self.current
    }

    /// State of one vehicle.
    ///
    /// # Panics
    ///
    /// Never panics; every [`VehicleKind`] has an entry.
    #[must_use]
    pub fn vehicle(&self, kind: VehicleKind) -> &Vehicle {
        &self.vehicles[&kind]
    }

    /// Production multiplier contributed by the selected vehicle.
    #[must_use]
    pub fn speed_multiplier(&self) -> f32 {
        self.vehicles[&self.current].speed / 2.0
    }

    /// Unlock every vehicle whose threshold the colony level now meets.
    ///
    /// Unlocks are permanent; a level that somehow regressed would not
    /// re-lock anything.
    pub fn unlock_for_level(&mut self, colony_level: u32) -> Vec<VehicleEvent> {
        let mut events = Vec::new();
        for (&kind, vehicle) in &mut self.vehicles {
            if !vehicle.unlocked && colony_level >= kind.unlock_level() {
                vehicle.unlocked = true;
                tracing::info!(vehicle = %kind, "vehicle unlocked");
                events.push(VehicleEvent::Unlocked { vehicle: kind });
            }
        }
        events
    }

    /// Purchase an unlocked vehicle.
    pub fn purchase(&mut self, kind: VehicleKind, ledger: &mut ResourceLedger) -> Result<()> {
        let vehicle = &self.vehicles[&kind];
        if !vehicle.unlocked {
            return Err(GameError::NotYetUnlocked(kind.name()));
        }
        if vehicle.purchased {
            return Err(GameError::AlreadyPurchased(kind.name()));
        }
        ledger.pay(&kind.purchase_cost())?;
        if let Some(vehicle) = self.vehicles.get_mut(&kind) {
            vehicle.purchased = true;
            vehicle.level = 1;
        }
        tracing::info!(vehicle = %kind, "vehicle purchased");
        Ok(())
    }

    /// Upgrade a purchased vehicle one level.
    ///
    /// Cost is `base * 1.5^(level - 1)`, floored per resource. Speed grows
    /// by 20% and capacity by 30% per level.
    pub fn upgrade(&mut self, kind: VehicleKind, ledger: &mut ResourceLedger) -> Result<()> {
        let vehicle = &self.vehicles[&kind];
        if !vehicle.purchased {
            return Err(GameError::NotYetPurchased(kind.name()));
        }
        if vehicle.level >= vehicle.max_level {
            return Err(GameError::AlreadyAtMaxLevel(kind.name()));
        }
        ledger.pay(&vehicle_upgrade_cost(kind, vehicle.level))?;
        if let Some(vehicle) = self.vehicles.get_mut(&kind) {
            vehicle.level += 1;
            vehicle.speed *= 1.2;
            vehicle.capacity *= 1.3;
            tracing::info!(vehicle = %kind, level = vehicle.level, "vehicle upgraded");
        }
        Ok(())
    }

    /// Switch the active vehicle.
    pub fn select(&mut self, kind: VehicleKind) -> Result<()> {
        let vehicle = &self.vehicles[&kind];
        if !vehicle.unlocked {
            return Err(GameError::NotYetUnlocked(kind.name()));
        }
        if !vehicle.purchased {
            return Err(GameError::NotYetPurchased(kind.name()));
        }
        self.current = kind;
        Ok(())
    }

    /// Charge upkeep for the selected vehicle.
    ///
    /// Called from the shared maintenance window. If the cost cannot be paid
    /// the vehicle's speed halves (never below the base manual speed) and a
    /// [`VehicleEvent::Degraded`] is returned.
    pub fn run_maintenance(&mut self, ledger: &mut ResourceLedger) -> Option<VehicleEvent> {
        let kind = self.current;
        if ledger.pay(&kind.maintenance_cost()).is_ok() {
            return None;
        }
        if let Some(vehicle) = self.vehicles.get_mut(&kind) {
            vehicle.speed = (vehicle.speed * 0.5).max(1.0);
        }
        tracing::debug!(vehicle = %kind, "vehicle upkeep unaffordable");
        Some(VehicleEvent::Degraded { vehicle: kind })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn funded_ledger() -> ResourceLedger {
        let mut ledger = ResourceLedger::new();
        ledger.recompute_capacity(1_900);
        for &r in &Resource::ALL {
            ledger.credit(r, 2_000);
        }
        ledger
    }

    #[test]
    fn test_fleet_starts_with_manual_selected() {
        let fleet = VehicleFleet::new();
        assert_eq!(fleet.current(), VehicleKind::Manual);
        assert!(fleet.vehicle(VehicleKind::Manual).purchased);
        assert!(!fleet.vehicle(VehicleKind::Cart).unlocked);
        // Manual speed 1 -> multiplier 0.5
        assert!((fleet.speed_multiplier() - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn test_unpurchased_vehicles_start_at_level_zero() {
        let mut fleet = VehicleFleet::new();
        assert_eq!(fleet.vehicle(VehicleKind::Manual).level, 1);
        assert_eq!(fleet.vehicle(VehicleKind::Cart).level, 0);
        assert_eq!(fleet.vehicle(VehicleKind::Train).level, 0);

        let mut ledger = funded_ledger();
        fleet.unlock_for_level(2);
        fleet.purchase(VehicleKind::Cart, &mut ledger).unwrap();
        assert_eq!(fleet.vehicle(VehicleKind::Cart).level, 1);
        assert_eq!(fleet.vehicle(VehicleKind::Train).level, 0);
    }

    #[test]
    fn test_unlock_thresholds_follow_colony_level() {
        let mut fleet = VehicleFleet::new();
        assert!(fleet.unlock_for_level(1).is_empty());

        let events = fleet.unlock_for_level(3);
        assert_eq!(
            events,
            vec![
                VehicleEvent::Unlocked { vehicle: VehicleKind::Cart },
                VehicleEvent::Unlocked { vehicle: VehicleKind::Tractor },
            ]
        );
        // No re-notification for already unlocked vehicles.
        assert_eq!(
            fleet.unlock_for_level(5),
            vec![
                VehicleEvent::Unlocked { vehicle: VehicleKind::Truck },
                VehicleEvent::Unlocked { vehicle: VehicleKind::Train },
            ]
        );
    }

    #[test]
    fn test_purchase_requires_unlock_then_pays() {
        let mut fleet = VehicleFleet::new();
        let mut ledger = funded_ledger();

        assert_eq!(
            fleet.purchase(VehicleKind::Cart, &mut ledger).unwrap_err(),
            GameError::NotYetUnlocked("cart")
        );

        fleet.unlock_for_level(2);
        fleet.purchase(VehicleKind::Cart, &mut ledger).unwrap();
        assert_eq!(ledger.quantity(Resource::Wood), 1_900);
        assert_eq!(ledger.quantity(Resource::Stone), 1_950);

        assert_eq!(
            fleet.purchase(VehicleKind::Cart, &mut ledger).unwrap_err(),
            GameError::AlreadyPurchased("cart")
        );
    }

    #[test]
    fn test_select_requires_purchase() {
        let mut fleet = VehicleFleet::new();
        let mut ledger = funded_ledger();
        fleet.unlock_for_level(2);

        assert_eq!(
            fleet.select(VehicleKind::Cart).unwrap_err(),
            GameError::NotYetPurchased("cart")
        );
        fleet.purchase(VehicleKind::Cart, &mut ledger).unwrap();
        fleet.select(VehicleKind::Cart).unwrap();
        assert_eq!(fleet.current(), VehicleKind::Cart);
        // Cart speed 2 -> multiplier 1
        assert!((fleet.speed_multiplier() - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_upgrade_scales_stats_and_caps_at_max_level() {
        let mut fleet = VehicleFleet::new();
        let mut ledger = funded_ledger();
        fleet.unlock_for_level(2);
        fleet.purchase(VehicleKind::Cart, &mut ledger).unwrap();

        fleet.upgrade(VehicleKind::Cart, &mut ledger).unwrap();
        let cart = fleet.vehicle(VehicleKind::Cart);
        assert_eq!(cart.level, 2);
        assert!((cart.speed - 2.4).abs() < 1e-5);
        assert!((cart.capacity - 19.5).abs() < 1e-4);

        fleet.upgrade(VehicleKind::Cart, &mut ledger).unwrap();
        assert_eq!(
            fleet.upgrade(VehicleKind::Cart, &mut ledger).unwrap_err(),
            GameError::AlreadyAtMaxLevel("cart")
        );
    }

    #[test]
    fn test_upgrade_cost_scales_per_level() {
        assert_eq!(
            vehicle_upgrade_cost(VehicleKind::Cart, 1),
            cost(&[(Resource::Wood, 50), (Resource::Stone, 25)])
        );
        assert_eq!(
            vehicle_upgrade_cost(VehicleKind::Cart, 2),
            cost(&[(Resource::Wood, 75), (Resource::Stone, 37)])
        );
    }

    #[test]
    fn test_missed_upkeep_halves_speed_with_floor() {
        let mut fleet = VehicleFleet::new();
        let mut ledger = funded_ledger();
        fleet.unlock_for_level(2);
        fleet.purchase(VehicleKind::Cart, &mut ledger).unwrap();
        fleet.select(VehicleKind::Cart).unwrap();

        // Paid upkeep leaves speed alone.
        assert!(fleet.run_maintenance(&mut ledger).is_none());
        assert!((fleet.vehicle(VehicleKind::Cart).speed - 2.0).abs() < f32::EPSILON);

        let mut broke = ResourceLedger::new();
        assert_eq!(
            fleet.run_maintenance(&mut broke),
            Some(VehicleEvent::Degraded { vehicle: VehicleKind::Cart })
        );
        assert!((fleet.vehicle(VehicleKind::Cart).speed - 1.0).abs() < f32::EPSILON);
        // Floor: repeated misses never drop below base manual speed.
        fleet.run_maintenance(&mut broke);
        assert!((fleet.vehicle(VehicleKind::Cart).speed - 1.0).abs() < f32::EPSILON);
    }
}
