use crate::error::Result;
use crate::model::{Id, Lane, NewPlan, Plan, Relation, ScheduledItem};

#[async_trait::async_trait]
pub trait PlanStore: Send + Sync {
    async fn get_plan(&self, id: &Id) -> Result<Option<Plan>>;
    async fn list_plans(&self) -> Result<Vec<Plan>>;
    /// Create a plan; the payload goes through the same checks as single edits
    async fn create_plan(&self, plan: NewPlan) -> Result<Plan>;
    async fn delete_plan(&self, id: &Id) -> Result<bool>;
}

#[async_trait::async_trait]
pub trait LaneStore: Send + Sync {
    async fn upsert_lane(&self, plan_id: &Id, lane: Lane) -> Result<Lane>;
    /// Delete a lane together with its items and every relation touching them
    async fn delete_lane(&self, plan_id: &Id, lane_id: &Id) -> Result<bool>;
}

#[async_trait::async_trait]
pub trait ItemStore: Send + Sync {
    /// Insert or replace an item; moving it to another lane is a replace with a new lane id
    async fn upsert_item(&self, plan_id: &Id, item: ScheduledItem) -> Result<ScheduledItem>;
    /// Delete an item and every relation touching it
    async fn delete_item(&self, plan_id: &Id, item_id: &Id) -> Result<bool>;
}

#[async_trait::async_trait]
pub trait RelationStore: Send + Sync {
    async fn add_relation(&self, plan_id: &Id, relation: Relation) -> Result<Relation>;
    async fn delete_relation(&self, plan_id: &Id, relation_id: &Id) -> Result<bool>;
}

pub trait Store: PlanStore + LaneStore + ItemStore + RelationStore + Send + Sync {}
impl<T: PlanStore + LaneStore + ItemStore + RelationStore + Send + Sync> Store for T {}
