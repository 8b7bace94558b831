use serde::{Deserialize, Serialize};
use std::fmt;

/// Capacity used for hosts that registered without a usable guest limit
pub const DEFAULT_HOST_CAPACITY: u32 = 5;

/// Role a participant signed up for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParticipantRole {
    Host,
    Guest,
}

/// Sign-up status of a participant for one month
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParticipantStatus {
    Pending,
    #[default]
    Confirmed,
    Cancelled,
}

/// A participant of one month's dinner round, as delivered by the sign-up snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Participant {
    pub id: String,
    pub role: ParticipantRole,
    #[serde(rename = "hasPlusOne", default)]
    pub has_plus_one: bool,
    /// Only meaningful for hosts. Null, zero and negative values fall back to the default
    #[serde(rename = "maxGuestUnits", default)]
    pub max_guest_units: Option<i32>,
    #[serde(default)]
    pub status: ParticipantStatus,
}

impl Participant {
    pub fn is_host(&self) -> bool {
        self.role == ParticipantRole::Host
    }

    pub fn is_guest(&self) -> bool {
        self.role == ParticipantRole::Guest
    }

    pub fn is_confirmed(&self) -> bool {
        self.status == ParticipantStatus::Confirmed
    }

    /// Guest units this participant occupies when seated as a guest
    pub fn unit_size(&self) -> u32 {
        if self.has_plus_one {
            2
        } else {
            1
        }
    }

    /// Seating capacity of a host in guest units
    pub fn capacity(&self, default_capacity: u32) -> u32 {
        match self.max_guest_units {
            Some(units) if units > 0 => units as u32,
            _ => default_capacity,
        }
    }
}

/// Lifecycle status of a monthly dinner round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MonthStatus {
    Open,
    Matched,
    Closed,
}

impl fmt::Display for MonthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MonthStatus::Open => "open",
            MonthStatus::Matched => "matched",
            MonthStatus::Closed => "closed",
        };
        f.write_str(s)
    }
}

/// One month's dinner round
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Month {
    pub id: String,
    pub status: MonthStatus,
    #[serde(rename = "eventDate", default)]
    pub event_date: Option<chrono::NaiveDate>,
    #[serde(default)]
    pub label: Option<String>,
}

/// Everything the engine needs for one run.
///
/// `month` is `None` when the month lookup found nothing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthSnapshot {
    #[serde(rename = "monthId")]
    pub month_id: String,
    #[serde(default)]
    pub month: Option<Month>,
    #[serde(default)]
    pub participants: Vec<Participant>,
}

/// Dinner contribution a participant brings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FoodCategory {
    MainCourse,
    Salad,
    Drinks,
    Dessert,
    #[default]
    None,
}

/// Categories cycled across a host's guest list, in rotation order
pub const FOOD_ROTATION: [FoodCategory; 4] = [
    FoodCategory::MainCourse,
    FoodCategory::Salad,
    FoodCategory::Drinks,
    FoodCategory::Dessert,
];

/// Indivisible allocation quantum: a guest together with their plus-one
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuestUnit {
    #[serde(rename = "guestId")]
    pub guest_id: String,
    #[serde(rename = "hasPlusOne")]
    pub has_plus_one: bool,
    pub units: u32,
}

impl From<&Participant> for GuestUnit {
    fn from(participant: &Participant) -> Self {
        Self {
            guest_id: participant.id.clone(),
            has_plus_one: participant.has_plus_one,
            units: participant.unit_size(),
        }
    }
}

/// A guest seated at a host's table with their food contribution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignedGuest {
    #[serde(rename = "guestId")]
    pub guest_id: String,
    #[serde(rename = "hasPlusOne")]
    pub has_plus_one: bool,
    pub units: u32,
    #[serde(rename = "foodAssignment")]
    pub food_assignment: FoodCategory,
}

/// One host's table for the month
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostMatch {
    #[serde(rename = "monthId")]
    pub month_id: String,
    #[serde(rename = "hostId")]
    pub host_id: String,
    #[serde(rename = "hostFood")]
    pub host_food: FoodCategory,
    pub guests: Vec<AssignedGuest>,
    pub capacity: u32,
    #[serde(rename = "usedUnits")]
    pub used_units: u32,
    #[serde(rename = "remainingUnits")]
    pub remaining_units: u32,
}

impl HostMatch {
    pub fn guest_ids(&self) -> impl Iterator<Item = &str> {
        self.guests.iter().map(|g| g.guest_id.as_str())
    }
}

/// Guests left without a table and the shortfall behind it
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UnassignedReport {
    pub guests: Vec<GuestUnit>,
    pub units: u64,
    #[serde(rename = "shortfallUnits")]
    pub shortfall_units: u64,
}

impl UnassignedReport {
    pub fn is_empty(&self) -> bool {
        self.guests.is_empty()
    }
}

/// Outcome of one matching run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchPlan {
    #[serde(rename = "runId")]
    pub run_id: uuid::Uuid,
    #[serde(rename = "monthId")]
    pub month_id: String,
    #[serde(rename = "createdAt")]
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(rename = "totalMatches")]
    pub total_matches: usize,
    #[serde(rename = "hostsAvailable")]
    pub hosts_available: usize,
    #[serde(rename = "hostsUsed")]
    pub hosts_used: usize,
    #[serde(rename = "idleHostIds")]
    pub idle_host_ids: Vec<String>,
    #[serde(rename = "guestsAssigned")]
    pub guests_assigned: usize,
    #[serde(rename = "guestsUnassigned")]
    pub guests_unassigned: usize,
    #[serde(rename = "totalParticipants")]
    pub total_participants: usize,
    #[serde(rename = "assignedUnits")]
    pub assigned_units: u64,
    #[serde(rename = "unassignedUnits")]
    pub unassigned_units: u64,
    #[serde(rename = "totalDemandUnits")]
    pub total_demand_units: u64,
    #[serde(rename = "totalCapacityUnits")]
    pub total_capacity_units: u64,
    #[serde(rename = "hasShortfall")]
    pub has_shortfall: bool,
    pub matches: Vec<HostMatch>,
    pub unassigned: UnassignedReport,
}

impl MatchPlan {
    /// Find the table a guest was seated at
    pub fn host_of(&self, guest_id: &str) -> Option<&HostMatch> {
        self.matches
            .iter()
            .find(|m| m.guests.iter().any(|g| g.guest_id == guest_id))
    }
}
