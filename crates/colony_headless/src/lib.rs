//! Headless colony runner for scripted playthroughs and CI verification.
//!
//! This crate drives [`colony_core`] without graphics: a scripted player
//! harvests, builds, researches and upgrades while the runner advances
//! simulated time at a fixed cadence. This enables:
//!
//! - **CI verification**: automated playthroughs of the campaign
//! - **Balance checks**: how long a scripted player takes to finish
//! - **Save/load testing**: runs persist to a file-backed store
//!
//! Progress logs go to stderr; the final report is JSON on stdout.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod runner;
pub mod store;
pub mod strategy;

pub use runner::{run, RunConfig, RunReport};
pub use store::FileStore;
pub use strategy::ScriptedPlayer;
