use crate::model::{DateRange, Id};
use serde::{Deserialize, Serialize};

/// Capacity a team brings to a lane, in person-days per working day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamCapacity {
    pub lane_id: Id,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_name: Option<String>,
    pub capacity: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapacityRequest {
    pub window: DateRange,
    #[serde(default)]
    pub teams: Vec<TeamCapacity>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LoadWarningKind {
    Overload,
    Idle,
    NoCapacity,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadWarning {
    pub lane_id: Id,
    pub kind: LoadWarningKind,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaneLoad {
    pub lane_id: Id,
    pub lane_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_name: Option<String>,
    pub capacity: f64,
    pub task_count: usize,
    pub effort: f64,
    pub working_days: f64,
    /// Effort over available capacity, in percent
    pub load_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapacityReport {
    pub window: DateRange,
    pub lanes: Vec<LaneLoad>,
    pub warnings: Vec<LoadWarning>,
}
