use crate::model::{inclusive_days, Id};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Task,
    Milestone,
    Gateway,
}

impl ItemKind {
    /// Milestones and gateways are the matrix columns
    pub fn is_checkpoint(&self) -> bool {
        matches!(self, ItemKind::Milestone | ItemKind::Gateway)
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemKind::Task => write!(f, "task"),
            ItemKind::Milestone => write!(f, "milestone"),
            ItemKind::Gateway => write!(f, "gateway"),
        }
    }
}

/// Work status of a line. Imported data spells these many ways, so parsing is lenient
/// and anything unrecognised (including non-string values) counts as planned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", from = "serde_json::Value")]
pub enum ItemStatus {
    Planned,
    InProgress,
    Completed,
}

impl From<String> for ItemStatus {
    fn from(value: String) -> Self {
        match value.trim().to_ascii_lowercase().replace(['_', ' '], "-").as_str() {
            "completed" | "complete" | "done" | "finished" | "closed" => ItemStatus::Completed,
            "in-progress" | "inprogress" | "active" | "started" | "doing" => ItemStatus::InProgress,
            _ => ItemStatus::Planned,
        }
    }
}

impl From<serde_json::Value> for ItemStatus {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::String(s) => ItemStatus::from(s),
            _ => ItemStatus::Planned,
        }
    }
}

/// Priority bucket. Accepts `"P1"`, `"1"` or `1`; anything else lands in the lowest bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "serde_json::Value")]
pub enum Priority {
    P0,
    P1,
    P2,
    P3,
}

impl Default for Priority {
    fn default() -> Self {
        Priority::P3
    }
}

impl From<String> for Priority {
    fn from(value: String) -> Self {
        match value.trim().to_ascii_uppercase().as_str() {
            "P0" | "0" => Priority::P0,
            "P1" | "1" => Priority::P1,
            "P2" | "2" => Priority::P2,
            _ => Priority::P3,
        }
    }
}

impl From<serde_json::Value> for Priority {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::String(s) => Priority::from(s),
            serde_json::Value::Number(n) => match n.as_u64() {
                Some(0) => Priority::P0,
                Some(1) => Priority::P1,
                Some(2) => Priority::P2,
                _ => Priority::P3,
            },
            _ => Priority::P3,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Outcome of a gateway check, also used as the coarse gate result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckOutcome {
    #[serde(alias = "pass", alias = "ok")]
    Passed,
    #[serde(alias = "fail")]
    Failed,
    #[default]
    Pending,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistEntry {
    pub label: String,
    #[serde(default)]
    pub result: CheckOutcome,
}

/// Reference to a requirement (SSTS entry or similar) a line delivers
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequirementRef {
    pub id: Id,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl RequirementRef {
    pub fn new(id: impl Into<Id>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            source: None,
        }
    }

    /// One-line preview shown in a matrix cell
    pub fn summary(&self) -> String {
        match (&self.source, self.title.is_empty()) {
            (Some(source), false) => format!("[{}] {} {}", source, self.id, self.title),
            (Some(source), true) => format!("[{}] {}", source, self.id),
            (None, false) => format!("{} {}", self.id, self.title),
            (None, true) => self.id.clone(),
        }
    }
}

/// Kind-specific content, tagged by `kind` on the wire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ItemDetails {
    Task {
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        requirements: Vec<RequirementRef>,
    },
    Milestone {
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        requirements: Vec<RequirementRef>,
    },
    #[serde(rename_all = "camelCase")]
    Gateway {
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        checklist: Vec<ChecklistEntry>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        gate_result: Option<CheckOutcome>,
    },
}

/// Common attributes. Keys the engine does not understand are kept in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemAttributes {
    /// Explicit effort estimate in person-days
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effort: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ItemStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// A line on the plan: a task, milestone or gateway
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledItem {
    pub id: Id,
    pub lane_id: Id,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(flatten)]
    pub details: ItemDetails,
    #[serde(default)]
    pub attributes: ItemAttributes,
}

impl ScheduledItem {
    pub fn task(
        id: impl Into<Id>,
        lane_id: impl Into<Id>,
        start: NaiveDate,
        end: Option<NaiveDate>,
    ) -> Self {
        Self::with_details(
            id,
            lane_id,
            Some(start),
            end,
            ItemDetails::Task {
                requirements: Vec::new(),
            },
        )
    }

    pub fn milestone(id: impl Into<Id>, lane_id: impl Into<Id>, date: NaiveDate) -> Self {
        Self::with_details(
            id,
            lane_id,
            Some(date),
            None,
            ItemDetails::Milestone {
                requirements: Vec::new(),
            },
        )
    }

    pub fn gateway(id: impl Into<Id>, lane_id: impl Into<Id>, date: NaiveDate) -> Self {
        Self::with_details(
            id,
            lane_id,
            Some(date),
            None,
            ItemDetails::Gateway {
                checklist: Vec::new(),
                gate_result: None,
            },
        )
    }

    fn with_details(
        id: impl Into<Id>,
        lane_id: impl Into<Id>,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
        details: ItemDetails,
    ) -> Self {
        Self {
            id: id.into(),
            lane_id: lane_id.into(),
            title: None,
            start_date,
            end_date,
            details,
            attributes: ItemAttributes::default(),
        }
    }

    pub fn with_effort(mut self, effort: f64) -> Self {
        self.attributes.effort = Some(effort);
        self
    }

    pub fn with_status(mut self, status: ItemStatus) -> Self {
        self.attributes.status = Some(status);
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.attributes.priority = Some(priority);
        self
    }

    /// Replaces requirement references. Gateways carry none, so this is a no-op for them.
    pub fn with_requirements(mut self, refs: Vec<RequirementRef>) -> Self {
        match &mut self.details {
            ItemDetails::Task { requirements } | ItemDetails::Milestone { requirements } => {
                *requirements = refs;
            }
            ItemDetails::Gateway { .. } => {}
        }
        self
    }

    /// Replaces the checklist of a gateway. No-op for other kinds.
    pub fn with_checklist(mut self, entries: Vec<ChecklistEntry>) -> Self {
        if let ItemDetails::Gateway { checklist, .. } = &mut self.details {
            *checklist = entries;
        }
        self
    }

    pub fn with_gate_result(mut self, outcome: CheckOutcome) -> Self {
        if let ItemDetails::Gateway { gate_result, .. } = &mut self.details {
            *gate_result = Some(outcome);
        }
        self
    }

    pub fn kind(&self) -> ItemKind {
        match self.details {
            ItemDetails::Task { .. } => ItemKind::Task,
            ItemDetails::Milestone { .. } => ItemKind::Milestone,
            ItemDetails::Gateway { .. } => ItemKind::Gateway,
        }
    }

    pub fn is_checkpoint(&self) -> bool {
        self.kind().is_checkpoint()
    }

    /// The single date used to place a checkpoint: start date, else end date
    pub fn anchor_date(&self) -> Option<NaiveDate> {
        self.start_date.or(self.end_date)
    }

    /// Inclusive duration in whole days, at least 1. Lines without any date count as one day.
    pub fn duration_days(&self) -> i64 {
        match self.start_date {
            Some(start) => inclusive_days(start, self.end_date),
            None => 1,
        }
    }

    pub fn status(&self) -> ItemStatus {
        self.attributes.status.unwrap_or(ItemStatus::Planned)
    }

    pub fn priority(&self) -> Priority {
        self.attributes.priority.unwrap_or_default()
    }

    pub fn requirements(&self) -> &[RequirementRef] {
        match &self.details {
            ItemDetails::Task { requirements } | ItemDetails::Milestone { requirements } => {
                requirements
            }
            ItemDetails::Gateway { .. } => &[],
        }
    }

    /// `endDate` must not precede `startDate`; tasks need a start date
    pub fn date_problem(&self) -> Option<String> {
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if end < start {
                return Some(format!(
                    "end date {} precedes start date {} on '{}'",
                    end, start, self.id
                ));
            }
        }
        if self.kind() == ItemKind::Task && self.start_date.is_none() {
            return Some(format!("task '{}' has no start date", self.id));
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_duration_pins_inclusive_day_count() {
        let item = ScheduledItem::task("t1", "l1", date(2026, 1, 1), Some(date(2026, 1, 5)));
        assert_eq!(item.duration_days(), 5);

        let open_ended = ScheduledItem::task("t2", "l1", date(2026, 1, 1), None);
        assert_eq!(open_ended.duration_days(), 1);
    }

    #[test]
    fn test_item_deserializes_tagged_kind_and_extra_attributes() {
        let json = r#"{
            "id": "g1",
            "laneId": "lane-a",
            "kind": "gateway",
            "startDate": "2026-02-01",
            "checklist": [
                {"label": "design review", "result": "pass"},
                {"label": "safety sign-off"}
            ],
            "gateResult": "pending",
            "attributes": {"priority": "p1", "status": "Done", "owner": "ops"}
        }"#;

        let item: ScheduledItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.kind(), ItemKind::Gateway);
        assert_eq!(item.priority(), Priority::P1);
        assert_eq!(item.status(), ItemStatus::Completed);
        assert_eq!(item.attributes.extra.get("owner"), Some(&serde_json::json!("ops")));
        match &item.details {
            ItemDetails::Gateway {
                checklist,
                gate_result,
            } => {
                assert_eq!(checklist.len(), 2);
                assert_eq!(checklist[0].result, CheckOutcome::Passed);
                assert_eq!(checklist[1].result, CheckOutcome::Pending);
                assert_eq!(*gate_result, Some(CheckOutcome::Pending));
            }
            other => panic!("expected gateway details, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_priority_falls_back_to_p3() {
        let json = r#"{"id": "t", "laneId": "l", "kind": "task", "startDate": "2026-01-01",
            "attributes": {"priority": "urgent-ish"}}"#;
        let item: ScheduledItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.priority(), Priority::P3);

        let bare: ScheduledItem =
            serde_json::from_str(r#"{"id": "m", "laneId": "l", "kind": "milestone"}"#).unwrap();
        assert_eq!(bare.priority(), Priority::P3);
        assert_eq!(bare.status(), ItemStatus::Planned);
        assert_eq!(bare.anchor_date(), None);
    }

    #[test]
    fn test_non_string_priority_and_status_do_not_reject_item() {
        let parse = |attributes: &str| -> ScheduledItem {
            let json = format!(
                r#"{{"id": "t", "laneId": "l", "kind": "task", "startDate": "2026-01-01",
                    "attributes": {}}}"#,
                attributes
            );
            serde_json::from_str(&json).unwrap()
        };

        assert_eq!(parse(r#"{"priority": 1}"#).priority(), Priority::P1);
        assert_eq!(parse(r#"{"priority": 0, "effort": 2}"#).priority(), Priority::P0);
        assert_eq!(parse(r#"{"priority": 7}"#).priority(), Priority::P3);
        assert_eq!(parse(r#"{"priority": 1.5}"#).priority(), Priority::P3);
        assert_eq!(parse(r#"{"priority": true}"#).priority(), Priority::P3);
        assert_eq!(parse(r#"{"priority": ["P0"]}"#).priority(), Priority::P3);

        assert_eq!(parse(r#"{"status": 3}"#).status(), ItemStatus::Planned);
        assert_eq!(parse(r#"{"status": {"x": 1}}"#).status(), ItemStatus::Planned);
        assert_eq!(parse(r#"{"status": "Done"}"#).status(), ItemStatus::Completed);
    }

    #[test]
    fn test_date_problem_detection() {
        let inverted = ScheduledItem::task("t", "l", date(2026, 1, 5), Some(date(2026, 1, 1)));
        assert!(inverted.date_problem().is_some());

        let undated: ScheduledItem =
            serde_json::from_str(r#"{"id": "t", "laneId": "l", "kind": "task"}"#).unwrap();
        assert!(undated.date_problem().is_some());

        let fine = ScheduledItem::milestone("m", "l", date(2026, 1, 5));
        assert!(fine.date_problem().is_none());
    }

    #[test]
    fn test_serialized_item_keeps_kind_tag() {
        let item = ScheduledItem::milestone("m1", "l1", date(2026, 1, 15))
            .with_requirements(vec![RequirementRef::new("REQ-1", "Braking distance")]);
        let value = serde_json::to_value(&item).unwrap();
        assert_eq!(value["kind"], "milestone");
        assert_eq!(value["laneId"], "l1");
        assert_eq!(value["requirements"][0]["id"], "REQ-1");
    }
}
