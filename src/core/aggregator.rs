use crate::core::{allocator::Allocation, capacity::CapacityReport, food::rotate_food};
use crate::models::{HostMatch, MatchPlan, UnassignedReport};

/// Package an allocation into the plan handed back to the caller.
///
/// Hosts that received guests become matches; the rest are listed as idle.
/// No placement decisions happen here.
pub fn aggregate(
    month_id: &str,
    total_participants: usize,
    capacity: CapacityReport,
    allocation: Allocation,
) -> MatchPlan {
    let hosts_available = allocation.slots.len();
    let assigned_units = allocation.assigned_units();
    let unassigned_units = allocation.unassigned_units();

    debug_assert_eq!(assigned_units + unassigned_units, capacity.total_demand);

    let mut matches = Vec::new();
    let mut idle_host_ids = Vec::new();

    for slot in allocation.slots {
        if slot.guests.is_empty() {
            idle_host_ids.push(slot.host_id);
            continue;
        }

        matches.push(HostMatch {
            month_id: month_id.to_string(),
            remaining_units: slot.remaining(),
            used_units: slot.occupied,
            capacity: slot.capacity,
            guests: rotate_food(&slot.guests),
            host_food: Default::default(),
            host_id: slot.host_id,
        });
    }

    let guests_assigned = matches.iter().map(|m| m.guests.len()).sum();

    MatchPlan {
        run_id: uuid::Uuid::new_v4(),
        month_id: month_id.to_string(),
        created_at: chrono::Utc::now(),
        total_matches: matches.len(),
        hosts_available,
        hosts_used: matches.len(),
        idle_host_ids,
        guests_assigned,
        guests_unassigned: allocation.unassigned.len(),
        total_participants,
        assigned_units,
        unassigned_units,
        total_demand_units: capacity.total_demand,
        total_capacity_units: capacity.total_capacity,
        has_shortfall: capacity.has_shortfall,
        matches,
        unassigned: UnassignedReport {
            guests: allocation.unassigned,
            units: unassigned_units,
            shortfall_units: capacity.shortfall_units,
        },
    }
}
