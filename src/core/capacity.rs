use serde::{Deserialize, Serialize};
use crate::models::Participant;

/// Capacity against demand for one month, in guest units.
///
/// Totals are `u64`: a single host may declare up to `i32::MAX` units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapacityReport {
    #[serde(rename = "totalCapacity")]
    pub total_capacity: u64,
    #[serde(rename = "totalDemand")]
    pub total_demand: u64,
    #[serde(rename = "hasShortfall")]
    pub has_shortfall: bool,
    #[serde(rename = "shortfallUnits")]
    pub shortfall_units: u64,
}

/// Compare what the hosts can seat with what the guests need.
///
/// Advisory only. A shortfall does not stop allocation.
pub fn plan_capacity(
    hosts: &[&Participant],
    guests: &[&Participant],
    default_capacity: u32,
) -> CapacityReport {
    let total_capacity: u64 = hosts
        .iter()
        .map(|h| u64::from(h.capacity(default_capacity)))
        .sum();
    let total_demand: u64 = guests.iter().map(|g| u64::from(g.unit_size())).sum();

    CapacityReport {
        total_capacity,
        total_demand,
        has_shortfall: total_demand > total_capacity,
        shortfall_units: total_demand.saturating_sub(total_capacity),
    }
}
