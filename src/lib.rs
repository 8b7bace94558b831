//! Mesa Abierta - monthly dinner-matching engine
//!
//! This library seats the guests of a monthly community dinner round at
//! volunteer hosts' tables. It shuffles both pools for fairness, balances
//! tables by occupancy ratio within each host's capacity, rotates food
//! contributions and reports every guest it could not place.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use core::{MatchingEngine, MatchingError, RandomSource};
pub use models::{MatchPlan, MonthSnapshot, Participant, RunMatchingRequest, RunMatchingResponse};
