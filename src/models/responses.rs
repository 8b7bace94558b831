use serde::{Deserialize, Serialize};
use crate::models::domain::MatchPlan;

/// Response of both matching endpoints
///
/// On success the plan is flattened into the top level object. A shortfall
/// still counts as success and carries a warning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunMatchingResponse {
    pub success: bool,
    #[serde(flatten)]
    pub plan: Option<MatchPlan>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RunMatchingResponse {
    pub fn from_plan(plan: MatchPlan) -> Self {
        let warning = if plan.unassigned.is_empty() {
            None
        } else {
            Some(format!(
                "{} guest(s) could not be placed ({} unit(s) short)",
                plan.guests_unassigned, plan.unassigned.units
            ))
        };

        Self {
            success: true,
            plan: Some(plan),
            warning,
            error: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            plan: None,
            warning: None,
            error: Some(message.into()),
        }
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
