//! Lane × checkpoint matrix
//!
//! Columns are the dated milestones and gateways of a plan, sorted by date. A cell gathers
//! the checkpoint itself (when it sits in the cell's lane) and, for milestones, the lines of
//! that lane feeding into it through a dependency.

use itertools::Itertools;
use std::collections::{BTreeMap, HashMap, HashSet};

use crate::config::MatrixConfig;
use crate::logic::{ContentExtractor, EffortEstimator};
use crate::model::{
    CellContent, CellStatus, Checkpoint, DateRange, ItemKind, ItemStatus, Lane, MatrixCell,
    MatrixData, Plan, ScheduledItem,
};

pub fn compute_matrix(plan: &Plan, config: &MatrixConfig) -> MatrixData {
    MatrixEngine::compute(plan, config)
}

pub struct MatrixEngine;

impl MatrixEngine {
    pub fn compute(plan: &Plan, config: &MatrixConfig) -> MatrixData {
        let checkpoint_items = Self::checkpoint_items(&plan.items);
        let related = Self::related_items(plan, &checkpoint_items);

        let mut cells = BTreeMap::new();
        for lane in &plan.lanes {
            for checkpoint in &checkpoint_items {
                let cell = Self::build_cell(
                    lane,
                    checkpoint,
                    related.get(checkpoint.id.as_str()).map_or(&[][..], Vec::as_slice),
                    config,
                );
                cells.insert((lane.id.clone(), checkpoint.id.clone()), cell);
            }
        }

        let total_effort: f64 = cells.values().map(|c: &MatrixCell| c.total_effort).sum();

        let checkpoints: Vec<Checkpoint> = checkpoint_items
            .iter()
            .filter_map(|item| {
                item.anchor_date().map(|date| Checkpoint {
                    id: item.id.clone(),
                    lane_id: item.lane_id.clone(),
                    kind: item.kind(),
                    date,
                    title: item.title.clone(),
                })
            })
            .collect();

        let date_range = match (checkpoints.first(), checkpoints.last()) {
            (Some(first), Some(last)) => DateRange::new(first.date, last.date),
            _ => DateRange::single(chrono::Utc::now().date_naive()),
        };

        log::debug!(
            "Matrix of {} lanes x {} checkpoints, total effort {:.1}",
            plan.lanes.len(),
            checkpoints.len(),
            total_effort
        );

        MatrixData {
            lanes: plan.lanes.clone(),
            checkpoints,
            cells,
            total_effort,
            date_range,
        }
    }

    /// Dated milestones and gateways, ascending by date, ties kept in input order
    fn checkpoint_items(items: &[ScheduledItem]) -> Vec<&ScheduledItem> {
        items
            .iter()
            .filter(|item| item.is_checkpoint() && item.anchor_date().is_some())
            .unique_by(|item| item.id.clone())
            .sorted_by_key(|item| item.anchor_date())
            .collect()
    }

    /// Milestone id -> lines that feed into it through a dependency
    fn related_items<'a>(
        plan: &'a Plan,
        checkpoints: &[&'a ScheduledItem],
    ) -> HashMap<&'a str, Vec<&'a ScheduledItem>> {
        let milestones: HashSet<&str> = checkpoints
            .iter()
            .filter(|item| item.kind() == ItemKind::Milestone)
            .map(|item| item.id.as_str())
            .collect();
        let by_id: HashMap<&str, &ScheduledItem> =
            plan.items.iter().map(|i| (i.id.as_str(), i)).collect();

        let mut related: HashMap<&str, Vec<&ScheduledItem>> = HashMap::new();
        for relation in plan.relations.iter().filter(|r| r.is_dependency()) {
            if relation.is_self_reference() || !milestones.contains(relation.to_id.as_str()) {
                continue;
            }
            let Some(&source) = by_id.get(relation.from_id.as_str()) else {
                continue;
            };
            let entry = related.entry(relation.to_id.as_str()).or_default();
            if !entry.iter().any(|item| item.id == source.id) {
                entry.push(source);
            }
        }
        related
    }

    fn build_cell(
        lane: &Lane,
        checkpoint: &ScheduledItem,
        related: &[&ScheduledItem],
        config: &MatrixConfig,
    ) -> MatrixCell {
        let mut cell = MatrixCell::empty(&lane.id, &checkpoint.id);

        let direct: Vec<&ScheduledItem> = if checkpoint.lane_id == lane.id {
            vec![checkpoint]
        } else {
            Vec::new()
        };
        let related: Vec<&ScheduledItem> = related
            .iter()
            .filter(|item| item.lane_id == lane.id)
            .copied()
            .collect();

        if direct.is_empty() && related.is_empty() {
            return cell;
        }

        // The checkpoint marker only adds its default effort when no work feeds into it
        let mut contributions: Vec<(&ScheduledItem, f64)> = Vec::new();
        for item in &direct {
            let effort = match EffortEstimator::explicit(item) {
                Some(effort) => effort,
                None if related.is_empty() => EffortEstimator::fallback(item, &config.effort),
                None => 0.0,
            };
            contributions.push((*item, effort));
        }
        for item in &related {
            contributions.push((*item, EffortEstimator::estimate(item, &config.effort)));
        }

        for (item, effort) in &contributions {
            cell.total_effort += effort;
            cell.priority_distribution.add(item.priority(), 1);
            cell.effort_by_priority.add(item.priority(), *effort);
        }

        cell.status = Self::cell_status(contributions.iter().map(|(item, _)| item.status()));
        cell.load_rate = Self::load_rate(cell.total_effort, config);
        cell.direct_item_ids = direct.iter().map(|i| i.id.clone()).collect();
        cell.related_item_ids = related.iter().map(|i| i.id.clone()).collect();

        cell.content = match checkpoint.kind() {
            ItemKind::Milestone => Some(CellContent::Milestone(ContentExtractor::milestone(
                direct.iter().chain(related.iter()).copied(),
                config.preview_limit,
            ))),
            ItemKind::Gateway if !direct.is_empty() => {
                Some(CellContent::Gateway(ContentExtractor::gateway(checkpoint)))
            }
            _ => None,
        };

        cell
    }

    fn cell_status(statuses: impl Iterator<Item = ItemStatus>) -> CellStatus {
        let statuses: Vec<ItemStatus> = statuses.collect();
        if statuses.is_empty() {
            CellStatus::Empty
        } else if statuses.iter().all(|s| *s == ItemStatus::Completed) {
            CellStatus::Completed
        } else if statuses.iter().any(|s| *s == ItemStatus::InProgress) {
            CellStatus::InProgress
        } else {
            CellStatus::Planned
        }
    }

    /// Effort over the capacity of one time window, clamped to [0, 1]
    fn load_rate(total_effort: f64, config: &MatrixConfig) -> f64 {
        let capacity = config.time_window_days * config.daily_capacity;
        if total_effort <= 0.0 {
            0.0
        } else if capacity <= 0.0 {
            1.0
        } else {
            (total_effort / capacity).min(1.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CheckOutcome, ChecklistEntry, Priority, Relation, RequirementRef};
    use chrono::NaiveDate;

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, m, d).unwrap()
    }

    fn scenario() -> Plan {
        Plan::new("scenario")
            .with_lane(Lane::new("L1", "Platform"))
            .with_lane(Lane::new("L2", "Apps"))
            .with_item(
                ScheduledItem::task("T1", "L1", date(1, 1), Some(date(1, 10))).with_effort(5.0),
            )
            .with_item(ScheduledItem::milestone("M1", "L1", date(1, 15)))
            .with_relation(Relation::dependency("T1", "M1"))
    }

    #[test]
    fn test_related_task_effort_flows_into_milestone_cell() {
        let matrix = compute_matrix(&scenario(), &MatrixConfig::default());

        assert_eq!(matrix.checkpoints.len(), 1);
        assert_eq!(matrix.checkpoints[0].id, "M1");

        let cell = matrix.cell("L1", "M1").unwrap();
        assert_eq!(cell.total_effort, 5.0);
        assert_eq!(cell.direct_item_ids, vec!["M1"]);
        assert_eq!(cell.related_item_ids, vec!["T1"]);
        assert_eq!(cell.status, CellStatus::Planned);
        assert!((cell.load_rate - 5.0 / 30.0).abs() < 1e-9);

        let empty = matrix.cell("L2", "M1").unwrap();
        assert_eq!(empty.status, CellStatus::Empty);
        assert_eq!(empty.total_effort, 0.0);
        assert_eq!(empty.load_rate, 0.0);
        assert!(empty.content.is_none());

        assert_eq!(matrix.total_effort, 5.0);
        assert_eq!(matrix.date_range, DateRange::single(date(1, 15)));
    }

    #[test]
    fn test_matrix_is_idempotent() {
        let plan = scenario();
        let config = MatrixConfig::default();
        assert_eq!(compute_matrix(&plan, &config), compute_matrix(&plan, &config));
    }

    #[test]
    fn test_dashed_ids_keep_one_cell_per_pair() {
        // ("a-b", "c") and ("a", "b-c") flatten to the same wire key
        let plan = Plan::new("dashes")
            .with_lane(Lane::new("a-b", "First"))
            .with_lane(Lane::new("a", "Second"))
            .with_item(ScheduledItem::milestone("c", "a-b", date(1, 10)).with_effort(4.0))
            .with_item(ScheduledItem::milestone("b-c", "a", date(1, 20)).with_effort(7.0))
            .with_relation(Relation::dependency("c", "b-c"));

        let matrix = compute_matrix(&plan, &MatrixConfig::default());

        assert_eq!(matrix.cells.len(), 4);
        assert_eq!(matrix.total_effort, 15.0);

        let first = matrix.cell("a-b", "c").unwrap();
        assert_eq!((first.lane_id.as_str(), first.checkpoint_id.as_str()), ("a-b", "c"));
        assert_eq!(first.total_effort, 4.0);

        let second = matrix.cell("a", "b-c").unwrap();
        assert_eq!((second.lane_id.as_str(), second.checkpoint_id.as_str()), ("a", "b-c"));
        assert_eq!(second.total_effort, 7.0);

        assert_eq!(matrix.cell("a-b", "b-c").unwrap().related_item_ids, vec!["c"]);
        assert_eq!(matrix.cell("a", "c").unwrap().status, CellStatus::Empty);

        assert_eq!(matrix.ambiguous_key().as_deref(), Some("a-b-c"));
        assert!(serde_json::to_value(&matrix).is_err());
    }

    #[test]
    fn test_cells_round_trip_through_flat_wire_keys() {
        let matrix = compute_matrix(&scenario(), &MatrixConfig::default());
        assert!(matrix.ambiguous_key().is_none());

        let value = serde_json::to_value(&matrix).unwrap();
        assert_eq!(value["cells"]["L1-M1"]["totalEffort"], 5.0);
        assert_eq!(value["cells"]["L2-M1"]["status"], "empty");

        let parsed: MatrixData = serde_json::from_value(value).unwrap();
        assert_eq!(parsed, matrix);
    }

    #[test]
    fn test_checkpoints_sorted_by_date_with_stable_ties() {
        let plan = Plan::new("p")
            .with_lane(Lane::new("L1", "Lane"))
            .with_item(ScheduledItem::gateway("G2", "L1", date(3, 1)))
            .with_item(ScheduledItem::milestone("M1", "L1", date(2, 1)))
            .with_item(ScheduledItem::milestone("M2", "L1", date(3, 1)))
            .with_item(ScheduledItem::task("T", "L1", date(1, 1), None));

        let matrix = compute_matrix(&plan, &MatrixConfig::default());
        let ids: Vec<&str> = matrix.checkpoints.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["M1", "G2", "M2"]);
        assert_eq!(matrix.date_range, DateRange::new(date(2, 1), date(3, 1)));
        assert_eq!(matrix.cells.len(), 3);
    }

    #[test]
    fn test_undated_checkpoints_are_not_columns() {
        let mut undated = ScheduledItem::milestone("M0", "L1", date(1, 1));
        undated.start_date = None;
        let plan = Plan::new("p")
            .with_lane(Lane::new("L1", "Lane"))
            .with_item(undated);

        let matrix = compute_matrix(&plan, &MatrixConfig::default());
        assert!(matrix.checkpoints.is_empty());
        assert!(matrix.cells.is_empty());
        assert_eq!(matrix.total_effort, 0.0);
        assert_eq!(matrix.date_range.start, matrix.date_range.end);
    }

    #[test]
    fn test_lone_checkpoint_uses_default_effort() {
        let plan = Plan::new("p")
            .with_lane(Lane::new("L1", "Lane"))
            .with_item(ScheduledItem::milestone("M1", "L1", date(1, 1)))
            .with_item(ScheduledItem::gateway("G1", "L1", date(2, 1)));

        let matrix = compute_matrix(&plan, &MatrixConfig::default());
        assert_eq!(matrix.cell("L1", "M1").unwrap().total_effort, 1.0);
        assert_eq!(matrix.cell("L1", "G1").unwrap().total_effort, 0.5);
        assert_eq!(matrix.total_effort, 1.5);
    }

    #[test]
    fn test_related_items_are_split_by_lane() {
        let plan = Plan::new("p")
            .with_lane(Lane::new("L1", "One"))
            .with_lane(Lane::new("L2", "Two"))
            .with_item(ScheduledItem::milestone("M1", "L1", date(2, 1)))
            .with_item(
                ScheduledItem::task("A", "L1", date(1, 1), None)
                    .with_effort(2.0)
                    .with_priority(Priority::P0)
                    .with_status(ItemStatus::Completed),
            )
            .with_item(
                ScheduledItem::task("B", "L2", date(1, 1), None)
                    .with_effort(3.0)
                    .with_priority(Priority::P1)
                    .with_status(ItemStatus::InProgress),
            )
            .with_relation(Relation::dependency("A", "M1"))
            .with_relation(Relation::dependency("B", "M1"));

        let matrix = compute_matrix(&plan, &MatrixConfig::default());

        let own = matrix.cell("L1", "M1").unwrap();
        assert_eq!(own.related_item_ids, vec!["A"]);
        assert_eq!(own.total_effort, 2.0);
        assert_eq!(own.priority_distribution.get(Priority::P0), 1);
        assert_eq!(own.priority_distribution.get(Priority::P3), 1);
        assert_eq!(own.effort_by_priority.get(Priority::P0), 2.0);
        // milestone itself is still planned
        assert_eq!(own.status, CellStatus::Planned);

        let other = matrix.cell("L2", "M1").unwrap();
        assert!(other.direct_item_ids.is_empty());
        assert_eq!(other.related_item_ids, vec!["B"]);
        assert_eq!(other.total_effort, 3.0);
        assert_eq!(other.status, CellStatus::InProgress);
        assert_eq!(matrix.total_effort, 5.0);
    }

    #[test]
    fn test_status_completed_only_when_everything_is_done() {
        let plan = Plan::new("p")
            .with_lane(Lane::new("L1", "One"))
            .with_item(
                ScheduledItem::milestone("M1", "L1", date(2, 1)).with_status(ItemStatus::Completed),
            )
            .with_item(
                ScheduledItem::task("A", "L1", date(1, 1), None).with_status(ItemStatus::Completed),
            )
            .with_relation(Relation::dependency("A", "M1"));

        let matrix = compute_matrix(&plan, &MatrixConfig::default());
        assert_eq!(matrix.cell("L1", "M1").unwrap().status, CellStatus::Completed);
    }

    #[test]
    fn test_load_rate_is_capped() {
        let plan = Plan::new("p")
            .with_lane(Lane::new("L1", "One"))
            .with_item(ScheduledItem::milestone("M1", "L1", date(2, 1)).with_effort(45.0));

        let matrix = compute_matrix(&plan, &MatrixConfig::default());
        assert_eq!(matrix.cell("L1", "M1").unwrap().load_rate, 1.0);
    }

    #[test]
    fn test_kind_specific_content() {
        let plan = Plan::new("p")
            .with_lane(Lane::new("L1", "One"))
            .with_item(
                ScheduledItem::milestone("M1", "L1", date(2, 1))
                    .with_requirements(vec![RequirementRef::new("SSTS-1", "Cruise range")]),
            )
            .with_item(
                ScheduledItem::task("A", "L1", date(1, 1), None)
                    .with_requirements(vec![RequirementRef::new("SSTS-2", "Fast charge")]),
            )
            .with_item(ScheduledItem::gateway("G1", "L1", date(3, 1)).with_checklist(vec![
                ChecklistEntry {
                    label: "PPAP".to_string(),
                    result: CheckOutcome::Passed,
                },
                ChecklistEntry {
                    label: "Homologation".to_string(),
                    result: CheckOutcome::Pending,
                },
            ]))
            .with_relation(Relation::dependency("A", "M1"));

        let matrix = compute_matrix(&plan, &MatrixConfig::default());

        match &matrix.cell("L1", "M1").unwrap().content {
            Some(CellContent::Milestone(content)) => {
                assert_eq!(content.requirement_count, 2);
                assert_eq!(content.previews, vec!["SSTS-1 Cruise range", "SSTS-2 Fast charge"]);
            }
            other => panic!("expected milestone content, got {:?}", other),
        }
        match &matrix.cell("L1", "G1").unwrap().content {
            Some(CellContent::Gateway(content)) => {
                assert_eq!(content.passed, 1);
                assert_eq!(content.pending, 1);
                assert_eq!(content.completion_rate, 0.5);
            }
            other => panic!("expected gateway content, got {:?}", other),
        }
    }
}
