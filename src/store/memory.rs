use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};

use crate::error::{PlanError, Result};
use crate::logic::RelationValidator;
use crate::model::{generate_id, Id, Lane, NewPlan, Plan, Relation, ScheduledItem};
use crate::store::traits::{ItemStore, LaneStore, PlanStore, RelationStore};

/// In-memory plan store. Readers get cloned snapshots, so no lock is held while computing.
#[derive(Debug, Default)]
pub struct MemoryStore {
    plans: RwLock<HashMap<Id, Plan>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` against a plan. `f` reports whether it changed anything; only then is
    /// `updated_at` bumped.
    fn with_plan<T>(
        &self,
        plan_id: &Id,
        f: impl FnOnce(&mut Plan) -> Result<(T, bool)>,
    ) -> Result<T> {
        let mut plans = self.plans.write();
        let plan = plans
            .get_mut(plan_id)
            .ok_or_else(|| PlanError::PlanNotFound(plan_id.clone()))?;
        let (result, changed) = f(plan)?;
        if changed {
            plan.touch();
        }
        Ok(result)
    }

    fn check_item(plan: &Plan, item: &ScheduledItem) -> Result<()> {
        if item.id.trim().is_empty() {
            return Err(PlanError::InvalidItem("item id must not be empty".to_string()));
        }
        if plan.get_lane(&item.lane_id).is_none() {
            return Err(PlanError::InvalidItem(format!(
                "item '{}' refers to unknown lane '{}'",
                item.id, item.lane_id
            )));
        }
        if let Some(problem) = item.date_problem() {
            return Err(PlanError::InvalidItem(problem));
        }
        Ok(())
    }

    fn check_relation(plan: &Plan, relation: &Relation) -> Result<()> {
        if relation.is_self_reference() {
            return Err(PlanError::InvalidRelation(format!(
                "item '{}' cannot depend on itself",
                relation.from_id
            )));
        }
        for endpoint in [&relation.from_id, &relation.to_id] {
            if plan.get_item(endpoint).is_none() {
                return Err(PlanError::InvalidRelation(format!(
                    "endpoint '{}' does not exist",
                    endpoint
                )));
            }
        }
        if let Some(existing) = plan
            .relations
            .iter()
            .find(|r| r.from_id == relation.from_id && r.to_id == relation.to_id)
        {
            return Err(PlanError::DuplicateRelation {
                from_id: relation.from_id.clone(),
                to_id: relation.to_id.clone(),
                existing_id: existing.id.clone(),
            });
        }
        if plan.relations.iter().any(|r| r.id == relation.id) {
            return Err(PlanError::InvalidRelation(format!(
                "relation id '{}' is already in use",
                relation.id
            )));
        }
        Ok(())
    }

    /// Drop every relation touching one of `removed`
    fn cascade_relations(plan: &mut Plan, removed: &HashSet<Id>) -> usize {
        let before = plan.relations.len();
        plan.relations
            .retain(|r| !removed.contains(&r.from_id) && !removed.contains(&r.to_id));
        before - plan.relations.len()
    }
}

#[async_trait::async_trait]
impl PlanStore for MemoryStore {
    async fn get_plan(&self, id: &Id) -> Result<Option<Plan>> {
        Ok(self.plans.read().get(id).cloned())
    }

    async fn list_plans(&self) -> Result<Vec<Plan>> {
        let mut plans: Vec<Plan> = self.plans.read().values().cloned().collect();
        plans.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(plans)
    }

    async fn create_plan(&self, new_plan: NewPlan) -> Result<Plan> {
        let mut plan = Plan::new(new_plan.name);

        let mut lane_ids = HashSet::new();
        for lane in new_plan.lanes {
            if !lane_ids.insert(lane.id.clone()) {
                return Err(PlanError::InvalidLane(format!(
                    "lane id '{}' appears more than once",
                    lane.id
                )));
            }
            plan.lanes.push(lane);
        }

        let mut item_ids = HashSet::new();
        for item in new_plan.items {
            Self::check_item(&plan, &item)?;
            if !item_ids.insert(item.id.clone()) {
                return Err(PlanError::InvalidItem(format!(
                    "item id '{}' appears more than once",
                    item.id
                )));
            }
            plan.items.push(item);
        }

        // Imported relations are cleaned rather than rejected
        plan.relations = RelationValidator::validate(&plan.items, &new_plan.relations).relations;

        log::info!(
            "Created plan '{}' ({}) with {} lanes, {} items, {} relations",
            plan.name,
            plan.id,
            plan.lanes.len(),
            plan.items.len(),
            plan.relations.len()
        );

        self.plans.write().insert(plan.id.clone(), plan.clone());
        Ok(plan)
    }

    async fn delete_plan(&self, id: &Id) -> Result<bool> {
        Ok(self.plans.write().remove(id).is_some())
    }
}

#[async_trait::async_trait]
impl LaneStore for MemoryStore {
    async fn upsert_lane(&self, plan_id: &Id, lane: Lane) -> Result<Lane> {
        self.with_plan(plan_id, |plan| {
            match plan.lanes.iter_mut().find(|l| l.id == lane.id) {
                Some(existing) => *existing = lane.clone(),
                None => plan.lanes.push(lane.clone()),
            }
            Ok((lane, true))
        })
    }

    async fn delete_lane(&self, plan_id: &Id, lane_id: &Id) -> Result<bool> {
        self.with_plan(plan_id, |plan| {
            let Some(index) = plan.lanes.iter().position(|l| &l.id == lane_id) else {
                return Ok((false, false));
            };
            plan.lanes.remove(index);

            let removed: HashSet<Id> = plan
                .items
                .iter()
                .filter(|i| &i.lane_id == lane_id)
                .map(|i| i.id.clone())
                .collect();
            plan.items.retain(|i| &i.lane_id != lane_id);
            let dropped = Self::cascade_relations(plan, &removed);

            log::info!(
                "Deleted lane '{}' with {} items and {} relations",
                lane_id,
                removed.len(),
                dropped
            );
            Ok((true, true))
        })
    }
}

#[async_trait::async_trait]
impl ItemStore for MemoryStore {
    async fn upsert_item(&self, plan_id: &Id, mut item: ScheduledItem) -> Result<ScheduledItem> {
        if item.id.trim().is_empty() {
            item.id = generate_id();
        }
        self.with_plan(plan_id, |plan| {
            Self::check_item(plan, &item)?;
            match plan.items.iter_mut().find(|i| i.id == item.id) {
                Some(existing) => *existing = item.clone(),
                None => plan.items.push(item.clone()),
            }
            Ok((item, true))
        })
    }

    async fn delete_item(&self, plan_id: &Id, item_id: &Id) -> Result<bool> {
        self.with_plan(plan_id, |plan| {
            let Some(index) = plan.items.iter().position(|i| &i.id == item_id) else {
                return Ok((false, false));
            };
            plan.items.remove(index);
            let before = plan.relations.len();
            plan.relations.retain(|r| !r.touches(item_id));
            log::info!(
                "Deleted item '{}' and {} relations",
                item_id,
                before - plan.relations.len()
            );
            Ok((true, true))
        })
    }
}

#[async_trait::async_trait]
impl RelationStore for MemoryStore {
    async fn add_relation(&self, plan_id: &Id, relation: Relation) -> Result<Relation> {
        self.with_plan(plan_id, |plan| {
            Self::check_relation(plan, &relation)?;
            plan.relations.push(relation.clone());
            Ok((relation, true))
        })
    }

    async fn delete_relation(&self, plan_id: &Id, relation_id: &Id) -> Result<bool> {
        self.with_plan(plan_id, |plan| {
            let before = plan.relations.len();
            plan.relations.retain(|r| &r.id != relation_id);
            let removed = plan.relations.len() < before;
            Ok((removed, removed))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, d).unwrap()
    }

    async fn seeded() -> (MemoryStore, Id) {
        let store = MemoryStore::new();
        let plan = store
            .create_plan(NewPlan {
                name: "Roadmap".to_string(),
                lanes: vec![Lane::new("L1", "Chassis"), Lane::new("L2", "Software")],
                items: vec![
                    ScheduledItem::task("T1", "L1", date(1), Some(date(10))),
                    ScheduledItem::milestone("M1", "L1", date(15)),
                    ScheduledItem::task("T2", "L2", date(2), Some(date(6))),
                ],
                relations: vec![
                    Relation::dependency("T1", "M1").with_id("r1"),
                    Relation::dependency("T2", "M1").with_id("r2"),
                    Relation::dependency("T2", "M1").with_id("r-dup"),
                    Relation::dependency("T2", "ghost").with_id("r-ghost"),
                ],
            })
            .await
            .unwrap();
        (store, plan.id)
    }

    #[tokio::test]
    async fn test_create_plan_strips_invalid_relations() {
        let (store, plan_id) = seeded().await;
        let plan = store.get_plan(&plan_id).await.unwrap().unwrap();
        let ids: Vec<&str> = plan.relations.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["r1", "r2"]);
    }

    #[tokio::test]
    async fn test_delete_lane_cascades_items_and_relations() {
        let (store, plan_id) = seeded().await;

        assert!(store.delete_lane(&plan_id, &"L2".to_string()).await.unwrap());

        let plan = store.get_plan(&plan_id).await.unwrap().unwrap();
        assert_eq!(plan.lanes.len(), 1);
        assert!(plan.get_item("T2").is_none());
        assert_eq!(plan.relations.len(), 1);
        assert_eq!(plan.relations[0].id, "r1");

        assert!(!store.delete_lane(&plan_id, &"L2".to_string()).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_item_cascades_relations() {
        let (store, plan_id) = seeded().await;
        assert!(store.delete_item(&plan_id, &"M1".to_string()).await.unwrap());
        let plan = store.get_plan(&plan_id).await.unwrap().unwrap();
        assert!(plan.relations.is_empty());
        assert_eq!(plan.items.len(), 2);
    }

    #[tokio::test]
    async fn test_add_relation_rejects_duplicates_and_bad_endpoints() {
        let (store, plan_id) = seeded().await;

        let duplicate = store
            .add_relation(&plan_id, Relation::dependency("T1", "M1"))
            .await
            .unwrap_err();
        assert_eq!(
            duplicate,
            PlanError::DuplicateRelation {
                from_id: "T1".to_string(),
                to_id: "M1".to_string(),
                existing_id: "r1".to_string(),
            }
        );

        let self_ref = store
            .add_relation(&plan_id, Relation::dependency("T1", "T1"))
            .await
            .unwrap_err();
        assert!(matches!(self_ref, PlanError::InvalidRelation(_)));

        let dangling = store
            .add_relation(&plan_id, Relation::dependency("T1", "nope"))
            .await
            .unwrap_err();
        assert!(matches!(dangling, PlanError::InvalidRelation(_)));

        // the reverse pair is a different relation
        let reverse = store
            .add_relation(&plan_id, Relation::dependency("M1", "T1"))
            .await
            .unwrap();
        assert_eq!(reverse.from_id, "M1");
    }

    #[tokio::test]
    async fn test_upsert_item_moves_between_lanes_and_validates() {
        let (store, plan_id) = seeded().await;

        let moved = ScheduledItem::task("T1", "L2", date(1), Some(date(10)));
        store.upsert_item(&plan_id, moved).await.unwrap();
        let plan = store.get_plan(&plan_id).await.unwrap().unwrap();
        assert_eq!(plan.get_item("T1").unwrap().lane_id, "L2");
        assert_eq!(plan.items.len(), 3);

        let inverted = ScheduledItem::task("T9", "L1", date(9), Some(date(1)));
        let err = store.upsert_item(&plan_id, inverted).await.unwrap_err();
        assert!(matches!(err, PlanError::InvalidItem(_)));

        let orphan = ScheduledItem::milestone("M9", "nowhere", date(9));
        assert!(store.upsert_item(&plan_id, orphan).await.is_err());
    }

    #[tokio::test]
    async fn test_deleting_unknown_ids_leaves_plan_untouched() {
        let (store, plan_id) = seeded().await;
        let stamp = store.get_plan(&plan_id).await.unwrap().unwrap().updated_at;

        let missing = "missing".to_string();
        assert!(!store.delete_lane(&plan_id, &missing).await.unwrap());
        assert!(!store.delete_item(&plan_id, &missing).await.unwrap());
        assert!(!store.delete_relation(&plan_id, &missing).await.unwrap());
        assert_eq!(
            store.get_plan(&plan_id).await.unwrap().unwrap().updated_at,
            stamp
        );

        assert!(store.delete_relation(&plan_id, &"r2".to_string()).await.unwrap());
        assert!(store.get_plan(&plan_id).await.unwrap().unwrap().updated_at >= stamp);
    }

    #[tokio::test]
    async fn test_missing_plan_is_reported() {
        let store = MemoryStore::new();
        let err = store
            .upsert_lane(&"missing".to_string(), Lane::new("L", "Lane"))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
        assert!(store.get_plan(&"missing".to_string()).await.unwrap().is_none());
    }
}
