// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    AssignedGuest, FoodCategory, GuestUnit, HostMatch, MatchPlan, Month, MonthSnapshot, MonthStatus,
    Participant, ParticipantRole, ParticipantStatus, UnassignedReport, DEFAULT_HOST_CAPACITY,
    FOOD_ROTATION,
};
pub use requests::{RunMatchingRequest, RunStoredMonthRequest};
pub use responses::{ErrorResponse, HealthResponse, RunMatchingResponse};
