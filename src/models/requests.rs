use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use validator::Validate;
use crate::models::domain::{FoodCategory, Month, MonthSnapshot, Participant};

/// Request to run the matching engine over a supplied snapshot
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RunMatchingRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "month_id", rename = "monthId")]
    pub month_id: String,
    #[serde(default)]
    pub month: Option<Month>,
    #[serde(default)]
    pub participants: Vec<Participant>,
    #[serde(default)]
    #[serde(alias = "host_food_overrides", rename = "hostFoodOverrides")]
    pub host_food_overrides: HashMap<String, FoodCategory>,
}

impl RunMatchingRequest {
    /// Split the request into the engine snapshot and the host food overrides
    pub fn into_parts(self) -> (MonthSnapshot, HashMap<String, FoodCategory>) {
        (
            MonthSnapshot {
                month_id: self.month_id,
                month: self.month,
                participants: self.participants,
            },
            self.host_food_overrides,
        )
    }
}

/// Request body for running a stored month
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunStoredMonthRequest {
    #[serde(default)]
    #[serde(alias = "host_food_overrides", rename = "hostFoodOverrides")]
    pub host_food_overrides: HashMap<String, FoodCategory>,
}
