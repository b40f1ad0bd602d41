use crate::model::{generate_id, Id, Relation, ScheduledItem};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default timestamp for plans submitted without audit fields
fn default_timestamp() -> DateTime<Utc> {
    DateTime::from_timestamp(0, 0).unwrap_or_else(Utc::now)
}

/// A named row of the plan (a product workstream or team timeline)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lane {
    #[serde(default = "generate_id")]
    pub id: Id,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Lane {
    pub fn new(id: impl Into<Id>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    #[serde(default = "generate_id")]
    pub id: Id,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub lanes: Vec<Lane>,
    #[serde(default)]
    pub items: Vec<ScheduledItem>,
    #[serde(default)]
    pub relations: Vec<Relation>,

    #[serde(default = "default_timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "default_timestamp")]
    pub updated_at: DateTime<Utc>,
}

impl Plan {
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: generate_id(),
            name: name.into(),
            lanes: Vec::new(),
            items: Vec::new(),
            relations: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_lane(mut self, lane: Lane) -> Self {
        self.lanes.push(lane);
        self
    }

    pub fn with_item(mut self, item: ScheduledItem) -> Self {
        self.items.push(item);
        self
    }

    pub fn with_relation(mut self, relation: Relation) -> Self {
        self.relations.push(relation);
        self
    }

    pub fn get_lane(&self, lane_id: &str) -> Option<&Lane> {
        self.lanes.iter().find(|l| l.id == lane_id)
    }

    pub fn get_item(&self, item_id: &str) -> Option<&ScheduledItem> {
        self.items.iter().find(|i| i.id == item_id)
    }

    pub fn items_in_lane<'a>(&'a self, lane_id: &'a str) -> impl Iterator<Item = &'a ScheduledItem> {
        self.items.iter().filter(move |i| i.lane_id == lane_id)
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Plan creation payload; ids and timestamps are assigned server-side
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPlan {
    pub name: String,
    #[serde(default)]
    pub lanes: Vec<Lane>,
    #[serde(default)]
    pub items: Vec<ScheduledItem>,
    #[serde(default)]
    pub relations: Vec<Relation>,
}

/// Compact listing entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanSummary {
    pub id: Id,
    pub name: String,
    pub lane_count: usize,
    pub item_count: usize,
    pub relation_count: usize,
    pub updated_at: DateTime<Utc>,
}

impl From<&Plan> for PlanSummary {
    fn from(plan: &Plan) -> Self {
        Self {
            id: plan.id.clone(),
            name: plan.name.clone(),
            lane_count: plan.lanes.len(),
            item_count: plan.items.len(),
            relation_count: plan.relations.len(),
            updated_at: plan.updated_at,
        }
    }
}
