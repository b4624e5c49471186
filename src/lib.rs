//! Tiered dispatch: assigns response units to incidents one priority tier at a
//! time, minimizing travel cost with a MILP per tier.

pub mod cli;
pub mod config;
pub mod cost;
pub mod data;
pub mod logging;
pub mod model;
pub mod optimizer;
pub mod parallel;
pub mod server;
pub mod validation;
