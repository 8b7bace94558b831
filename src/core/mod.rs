// Core algorithm exports
pub mod aggregator;
pub mod allocator;
pub mod capacity;
pub mod engine;
pub mod food;
pub mod shuffle;

pub use aggregator::aggregate;
pub use allocator::{allocate, Allocation, HostSlot};
pub use capacity::{plan_capacity, CapacityReport};
pub use engine::{MatchingEngine, MatchingError};
pub use food::{apply_host_food_overrides, category_for, rotate_food};
pub use shuffle::{fisher_yates, shuffle_pools, RandomSource};
