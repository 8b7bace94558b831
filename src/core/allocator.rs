use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use crate::models::{GuestUnit, Participant};

/// Working state of one host during a single run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostSlot {
    pub host_id: String,
    pub capacity: u32,
    pub occupied: u32,
    /// Guests in placement order
    pub guests: Vec<GuestUnit>,
}

impl HostSlot {
    pub fn new(host: &Participant, default_capacity: u32) -> Self {
        Self {
            host_id: host.id.clone(),
            capacity: host.capacity(default_capacity),
            occupied: 0,
            guests: Vec::new(),
        }
    }

    #[inline]
    pub fn remaining(&self) -> u32 {
        self.capacity.saturating_sub(self.occupied)
    }

    #[inline]
    pub fn fits(&self, units: u32) -> bool {
        self.occupied + units <= self.capacity
    }

    fn load_key(&self, position: usize) -> LoadKey {
        LoadKey {
            occupied: self.occupied,
            capacity: self.capacity,
            position,
        }
    }
}

/// Result of placing every guest of a run
#[derive(Debug, Clone)]
pub struct Allocation {
    /// One slot per host, in shuffled host order
    pub slots: Vec<HostSlot>,
    /// Guests that fit nowhere, in shuffled guest order
    pub unassigned: Vec<GuestUnit>,
}

impl Allocation {
    pub fn assigned_units(&self) -> u64 {
        self.slots.iter().map(|s| u64::from(s.occupied)).sum()
    }

    pub fn unassigned_units(&self) -> u64 {
        self.unassigned.iter().map(|g| u64::from(g.units)).sum()
    }
}

/// Ranking key for a host: occupancy ratio first, shuffled position second.
///
/// Ratios are compared by cross-multiplication so no floats are involved.
/// Equal ratios fall back to the position in the shuffled host list, which
/// keeps ties deterministic for a given shuffle while the shuffle itself
/// decides who wins them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct LoadKey {
    occupied: u32,
    capacity: u32,
    position: usize,
}

impl Ord for LoadKey {
    fn cmp(&self, other: &Self) -> Ordering {
        let lhs = u64::from(self.occupied) * u64::from(other.capacity);
        let rhs = u64::from(other.occupied) * u64::from(self.capacity);
        lhs.cmp(&rhs).then_with(|| self.position.cmp(&other.position))
    }
}

impl PartialOrd for LoadKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Greedy load-balancing placement of guests onto hosts
///
/// # Algorithm
/// For each guest, in the given order:
/// 1. Take hosts from least to most loaded (by `occupied / capacity`)
/// 2. Seat the guest, plus-one included, at the first host with room for all of its units
/// 3. If no host has room, record the whole guest as unassigned
///
/// Hosts live in a min-heap so each placement re-ranks in `O(log n)`.
/// Hosts with zero capacity never enter the heap and full hosts leave it.
pub fn allocate(
    hosts: &[&Participant],
    guests: &[&Participant],
    default_capacity: u32,
) -> Allocation {
    let mut slots: Vec<HostSlot> = hosts
        .iter()
        .map(|host| HostSlot::new(host, default_capacity))
        .collect();

    let mut ranking: BinaryHeap<Reverse<LoadKey>> = slots
        .iter()
        .enumerate()
        .filter(|(_, slot)| slot.capacity > 0)
        .map(|(position, slot)| Reverse(slot.load_key(position)))
        .collect();

    let mut unassigned = Vec::new();
    let mut skipped: Vec<LoadKey> = Vec::new();

    for guest in guests {
        let unit = GuestUnit::from(*guest);

        let mut chosen = None;
        while let Some(Reverse(key)) = ranking.pop() {
            if slots[key.position].fits(unit.units) {
                chosen = Some(key.position);
                break;
            }
            skipped.push(key);
        }
        ranking.extend(skipped.drain(..).map(Reverse));

        match chosen {
            Some(position) => {
                let slot = &mut slots[position];
                slot.occupied += unit.units;

                tracing::debug!(
                    "Seated guest {} ({} unit(s)) with host {} ({}/{})",
                    unit.guest_id,
                    unit.units,
                    slot.host_id,
                    slot.occupied,
                    slot.capacity
                );

                slot.guests.push(unit);
                if slot.remaining() > 0 {
                    ranking.push(Reverse(slot.load_key(position)));
                }
            }
            None => {
                tracing::debug!(
                    "No host has room for guest {} ({} unit(s))",
                    unit.guest_id,
                    unit.units
                );
                unassigned.push(unit);
            }
        }
    }

    Allocation { slots, unassigned }
}
