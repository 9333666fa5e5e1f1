//! # Colony Core
//!
//! Progression and economy engine for Steel Colony.
//!
//! This crate contains **only** game logic:
//! - No rendering
//! - No IO
//! - No wall-clock reads (callers supply `now_ms` stamps)
//!
//! This separation enables:
//! - Headless scripted playthroughs
//! - Save/load against any blob store
//! - Fast deterministic tests
//!
//! ## Crate Structure
//!
//! - [`resources`] - Resource ledger and capacity rules
//! - [`unlocks`] - Resource unlock graph
//! - [`tech`] - Technology tree
//! - [`buildings`] - Construction, production and upkeep
//! - [`vehicles`] - Transport fleet and the production multiplier
//! - [`goals`] - Campaign goal chain
//! - [`nodes`] - Harvestable field nodes
//! - [`simulation`] - The [`Colony`](simulation::Colony) facade and tick loop
//! - [`save`] - Persistence contract

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod buildings;
pub mod error;
pub mod goals;
pub mod math;
pub mod nodes;
pub mod resources;
pub mod save;
pub mod simulation;
pub mod tech;
pub mod unlocks;
pub mod vehicles;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::buildings::{
        Building, BuildingEvent, BuildingId, BuildingKind, BuildingRegistry,
    };
    pub use crate::error::{GameError, Result};
    pub use crate::goals::{Goal, GoalEvent, GoalStatus, ProgressionTracker};
    pub use crate::math::Position;
    pub use crate::nodes::{HarvestOutcome, NodeField, NodeId, NodeKind, ResourceNode};
    pub use crate::resources::{Cost, Resource, ResourceLedger};
    pub use crate::save::{
        load_game, load_settings, save_game, save_settings, MemoryStore, SaveData,
        SaveStore, Settings,
    };
    pub use crate::simulation::{
        Colony, ColonyStatus, ConstructionOutcome, GameSummary, TickEvents,
    };
    pub use crate::tech::{TechEffect, TechGraph, TechId};
    pub use crate::unlocks::{Progress, Requirement, UnlockEvent, UnlockGraph};
    pub use crate::vehicles::{Vehicle, VehicleEvent, VehicleFleet, VehicleKind};
}
