use std::collections::HashMap;
use crate::models::{AssignedGuest, FoodCategory, GuestUnit, MatchPlan, FOOD_ROTATION};

/// Category for the guest at `index` of a host's placement order
#[inline]
pub fn category_for(index: usize) -> FoodCategory {
    FOOD_ROTATION[index % FOOD_ROTATION.len()]
}

/// Hand out food categories round-robin across one host's guests
pub fn rotate_food(guests: &[GuestUnit]) -> Vec<AssignedGuest> {
    guests
        .iter()
        .enumerate()
        .map(|(index, unit)| AssignedGuest {
            guest_id: unit.guest_id.clone(),
            has_plus_one: unit.has_plus_one,
            units: unit.units,
            food_assignment: category_for(index),
        })
        .collect()
}

/// Apply hosts' own food choices to a finished plan.
///
/// Hosts default to `none`. Overrides naming a host without a table are ignored.
pub fn apply_host_food_overrides(
    mut plan: MatchPlan,
    overrides: &HashMap<String, FoodCategory>,
) -> MatchPlan {
    for (host_id, category) in overrides {
        match plan.matches.iter_mut().find(|m| &m.host_id == host_id) {
            Some(host_match) => host_match.host_food = *category,
            None => tracing::warn!(
                "Ignoring food override for host {} without a table in month {}",
                host_id,
                plan.month_id
            ),
        }
    }
    plan
}
