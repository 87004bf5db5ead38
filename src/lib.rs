//! School timetable generation.
//!
//! A school configuration (subjects, teachers, classes, resources and their
//! weekly availability) is turned into one conflict-free weekly grid per
//! class:
//!
//! 1. [`index`] builds lookups over the configuration.
//! 2. [`requirements`] expands weekly subject counts into placement units,
//!    hardest first.
//! 3. [`assigner`] places each unit at the first slot where a qualified,
//!    available teacher (and resource, if needed) is free.
//! 4. [`optimizer`] swaps lessons under a seeded generator while the
//!    [`diagnostics`] penalty strictly improves.
//!
//! [`solver::generate`] runs the whole pipeline; [`server`] exposes it over
//! HTTP.

pub mod assigner;
pub mod config;
pub mod data;
pub mod diagnostics;
pub mod error;
pub mod index;
pub mod occupancy;
pub mod optimizer;
pub mod requirements;
pub mod rng;
pub mod server;
pub mod solver;
pub mod timetable;

pub use data::{Diagnostics, GenerateOptions, GenerationResult, SchoolConfig, Timetable};
pub use diagnostics::{compute_diagnostics, compute_penalty};
pub use solver::generate;
