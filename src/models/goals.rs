use serde::{Deserialize, Serialize};

pub const DEFAULT_SALES_GOAL: f64 = 50000.0;
pub const DEFAULT_CMV_TARGET: f64 = 30.0;

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Goals {
    pub user_id: String,
    pub sales_goal: f64,
    pub cmv_target: f64,
}

impl Goals {
    pub fn default_for(user_id: &str) -> Self {
        Goals {
            user_id: user_id.to_string(),
            sales_goal: DEFAULT_SALES_GOAL,
            cmv_target: DEFAULT_CMV_TARGET,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct GoalsUpdate {
    pub sales_goal: f64,
    pub cmv_target: f64,
}
