use std::collections::HashSet;
use thiserror::Error;
use crate::core::{
    aggregator::aggregate,
    allocator::allocate,
    capacity::plan_capacity,
    shuffle::{shuffle_pools, RandomSource},
};
use crate::models::{MatchPlan, MonthSnapshot, MonthStatus, Participant, DEFAULT_HOST_CAPACITY};

/// Reasons a matching run refuses to start
///
/// A capacity shortfall is not among them; it is reported inside the plan.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatchingError {
    #[error("Month {0} not found")]
    MonthNotFound(String),

    #[error("Month {month_id} is {status}; matching only runs on an open month")]
    MonthNotOpen { month_id: String, status: MonthStatus },

    #[error("Snapshot for month {expected} carries month {found}")]
    MonthMismatch { expected: String, found: String },

    #[error("No confirmed participants for this month")]
    NoParticipants,

    #[error("Need at least one host among confirmed participants")]
    NoHosts,

    #[error("Need at least one guest among confirmed participants")]
    NoGuests,

    #[error("Participant with an empty id")]
    EmptyParticipantId,

    #[error("Participant {0} appears more than once")]
    DuplicateParticipant(String),
}

impl MatchingError {
    /// Short machine-readable code for API consumers
    pub fn code(&self) -> &'static str {
        match self {
            MatchingError::MonthNotFound(_) => "month_not_found",
            MatchingError::MonthNotOpen { .. } => "month_not_open",
            MatchingError::MonthMismatch { .. } => "month_mismatch",
            MatchingError::NoParticipants => "no_participants",
            MatchingError::NoHosts => "no_hosts",
            MatchingError::NoGuests => "no_guests",
            MatchingError::EmptyParticipantId => "empty_participant_id",
            MatchingError::DuplicateParticipant(_) => "duplicate_participant",
        }
    }
}

/// Main matching orchestrator - runs one month through the pipeline
///
/// # Pipeline Stages
/// 1. Precondition and structure checks
/// 2. Fairness shuffle of hosts and guests
/// 3. Capacity planning
/// 4. Load-balancing allocation
/// 5. Food rotation and aggregation into a plan
#[derive(Debug, Clone)]
pub struct MatchingEngine {
    default_capacity: u32,
}

impl MatchingEngine {
    pub fn new(default_capacity: u32) -> Self {
        Self { default_capacity }
    }

    pub fn default_capacity(&self) -> u32 {
        self.default_capacity
    }

    /// Match the confirmed guests of a month to its confirmed hosts
    ///
    /// # Arguments
    /// * `snapshot` - Month and participants as read from the sign-up store
    /// * `rng` - Source for the fairness shuffle
    ///
    /// # Returns
    /// A plan, possibly with unassigned guests, or the precondition that failed.
    /// Nothing in `snapshot` is modified.
    pub fn run<R>(&self, snapshot: &MonthSnapshot, rng: &mut R) -> Result<MatchPlan, MatchingError>
    where
        R: RandomSource + ?Sized,
    {
        let month = snapshot
            .month
            .as_ref()
            .ok_or_else(|| MatchingError::MonthNotFound(snapshot.month_id.clone()))?;

        if month.id != snapshot.month_id {
            return Err(MatchingError::MonthMismatch {
                expected: snapshot.month_id.clone(),
                found: month.id.clone(),
            });
        }

        if month.status != MonthStatus::Open {
            return Err(MatchingError::MonthNotOpen {
                month_id: month.id.clone(),
                status: month.status,
            });
        }

        let confirmed: Vec<&Participant> = snapshot
            .participants
            .iter()
            .filter(|p| p.is_confirmed())
            .collect();

        check_structure(&confirmed)?;

        if confirmed.is_empty() {
            return Err(MatchingError::NoParticipants);
        }

        let (hosts, guests): (Vec<&Participant>, Vec<&Participant>) =
            confirmed.iter().copied().partition(|p| p.is_host());

        if hosts.is_empty() {
            return Err(MatchingError::NoHosts);
        }
        if guests.is_empty() {
            return Err(MatchingError::NoGuests);
        }

        tracing::info!(
            "Matching month {}: {} hosts, {} guests",
            snapshot.month_id,
            hosts.len(),
            guests.len()
        );

        let (hosts, guests) = shuffle_pools(&hosts, &guests, rng);

        let capacity = plan_capacity(&hosts, &guests, self.default_capacity);
        if capacity.has_shortfall {
            tracing::warn!(
                "Month {} is short by {} unit(s): demand {} vs capacity {}",
                snapshot.month_id,
                capacity.shortfall_units,
                capacity.total_demand,
                capacity.total_capacity
            );
        }

        let allocation = allocate(&hosts, &guests, self.default_capacity);
        let plan = aggregate(&snapshot.month_id, confirmed.len(), capacity, allocation);

        tracing::info!(
            "Month {} matched: {} tables, {} guests seated, {} unassigned",
            plan.month_id,
            plan.total_matches,
            plan.guests_assigned,
            plan.guests_unassigned
        );

        Ok(plan)
    }
}

impl Default for MatchingEngine {
    fn default() -> Self {
        Self::new(DEFAULT_HOST_CAPACITY)
    }
}

/// Reject snapshots that would break placement bookkeeping
fn check_structure(participants: &[&Participant]) -> Result<(), MatchingError> {
    let mut seen = HashSet::with_capacity(participants.len());
    for participant in participants {
        if participant.id.trim().is_empty() {
            return Err(MatchingError::EmptyParticipantId);
        }
        if !seen.insert(participant.id.as_str()) {
            return Err(MatchingError::DuplicateParticipant(participant.id.clone()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Month, ParticipantRole, ParticipantStatus};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn participant(id: &str, role: ParticipantRole, plus_one: bool, max: Option<i32>) -> Participant {
        Participant {
            id: id.to_string(),
            role,
            has_plus_one: plus_one,
            max_guest_units: max,
            status: ParticipantStatus::Confirmed,
        }
    }

    fn snapshot(status: MonthStatus, participants: Vec<Participant>) -> MonthSnapshot {
        MonthSnapshot {
            month_id: "2026-10".to_string(),
            month: Some(Month {
                id: "2026-10".to_string(),
                status,
                event_date: None,
                label: None,
            }),
            participants,
        }
    }

    fn run(snapshot: &MonthSnapshot) -> Result<MatchPlan, MatchingError> {
        MatchingEngine::default().run(snapshot, &mut ChaCha8Rng::seed_from_u64(7))
    }

    #[test]
    fn test_month_not_found() {
        let mut snap = snapshot(MonthStatus::Open, vec![]);
        snap.month = None;

        assert_eq!(run(&snap).unwrap_err(), MatchingError::MonthNotFound("2026-10".to_string()));
    }

    #[test]
    fn test_month_must_be_open() {
        let snap = snapshot(
            MonthStatus::Matched,
            vec![
                participant("h1", ParticipantRole::Host, false, Some(4)),
                participant("g1", ParticipantRole::Guest, false, None),
            ],
        );

        let err = run(&snap).unwrap_err();
        assert_eq!(err.code(), "month_not_open");
        assert!(err.to_string().contains("matched"));
    }

    #[test]
    fn test_no_confirmed_participants() {
        let mut pending = participant("h1", ParticipantRole::Host, false, None);
        pending.status = ParticipantStatus::Pending;
        let snap = snapshot(MonthStatus::Open, vec![pending]);

        assert_eq!(run(&snap).unwrap_err(), MatchingError::NoParticipants);
    }

    #[test]
    fn test_no_hosts() {
        let snap = snapshot(
            MonthStatus::Open,
            vec![participant("g1", ParticipantRole::Guest, false, None)],
        );

        assert_eq!(run(&snap).unwrap_err(), MatchingError::NoHosts);
    }

    #[test]
    fn test_no_guests() {
        let snap = snapshot(
            MonthStatus::Open,
            vec![participant("h1", ParticipantRole::Host, false, None)],
        );

        assert_eq!(run(&snap).unwrap_err(), MatchingError::NoGuests);
    }

    #[test]
    fn test_duplicate_participant() {
        let snap = snapshot(
            MonthStatus::Open,
            vec![
                participant("p1", ParticipantRole::Host, false, None),
                participant("p1", ParticipantRole::Guest, false, None),
            ],
        );

        assert_eq!(
            run(&snap).unwrap_err(),
            MatchingError::DuplicateParticipant("p1".to_string())
        );
    }

    #[test]
    fn test_cancelled_participants_ignored() {
        let mut cancelled = participant("g2", ParticipantRole::Guest, true, None);
        cancelled.status = ParticipantStatus::Cancelled;
        let snap = snapshot(
            MonthStatus::Open,
            vec![
                participant("h1", ParticipantRole::Host, false, Some(2)),
                participant("g1", ParticipantRole::Guest, false, None),
                cancelled,
            ],
        );

        let plan = run(&snap).unwrap();

        assert_eq!(plan.total_participants, 2);
        assert_eq!(plan.guests_assigned, 1);
        assert!(plan.host_of("g2").is_none());
        assert!(plan.unassigned.is_empty());
    }

    #[test]
    fn test_snapshot_untouched() {
        let snap = snapshot(
            MonthStatus::Open,
            vec![
                participant("h1", ParticipantRole::Host, false, None),
                participant("g1", ParticipantRole::Guest, false, None),
                participant("g2", ParticipantRole::Guest, true, None),
            ],
        );
        let ids_before: Vec<String> = snap.participants.iter().map(|p| p.id.clone()).collect();

        run(&snap).unwrap();

        let ids_after: Vec<String> = snap.participants.iter().map(|p| p.id.clone()).collect();
        assert_eq!(ids_before, ids_after);
    }

    #[test]
    fn test_max_guest_units_totals_widen() {
        let snap = snapshot(
            MonthStatus::Open,
            vec![
                participant("h1", ParticipantRole::Host, false, Some(i32::MAX)),
                participant("h2", ParticipantRole::Host, false, Some(i32::MAX)),
                participant("h3", ParticipantRole::Host, false, Some(i32::MAX)),
                participant("g1", ParticipantRole::Guest, true, None),
            ],
        );

        let plan = run(&snap).unwrap();

        assert_eq!(plan.total_capacity_units, 3 * i32::MAX as u64);
        assert_eq!(plan.total_demand_units, 2);
        assert_eq!(plan.assigned_units, 2);
        assert!(!plan.has_shortfall);
        assert_eq!(plan.idle_host_ids.len(), 2);
    }
}
