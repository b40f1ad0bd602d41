use crate::model::{DateRange, Id, ItemKind, Lane, Priority};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::AddAssign;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CellStatus {
    Empty,
    Planned,
    InProgress,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeatLevel {
    Empty,
    Low,
    Normal,
    High,
    Overload,
}

/// One value per priority bucket
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PriorityBuckets<T> {
    #[serde(rename = "P0")]
    pub p0: T,
    #[serde(rename = "P1")]
    pub p1: T,
    #[serde(rename = "P2")]
    pub p2: T,
    #[serde(rename = "P3")]
    pub p3: T,
}

impl<T: Copy + AddAssign> PriorityBuckets<T> {
    pub fn add(&mut self, priority: Priority, value: T) {
        match priority {
            Priority::P0 => self.p0 += value,
            Priority::P1 => self.p1 += value,
            Priority::P2 => self.p2 += value,
            Priority::P3 => self.p3 += value,
        }
    }

    pub fn get(&self, priority: Priority) -> T {
        match priority {
            Priority::P0 => self.p0,
            Priority::P1 => self.p1,
            Priority::P2 => self.p2,
            Priority::P3 => self.p3,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MilestoneContent {
    /// Distinct requirements delivered by the milestone and its contributing lines
    pub requirement_count: usize,
    pub previews: Vec<String>,
    pub truncated: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayContent {
    pub passed: usize,
    pub failed: usize,
    pub pending: usize,
    pub total: usize,
    pub completion_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum CellContent {
    Milestone(MilestoneContent),
    Gateway(GatewayContent),
}

/// A matrix column: a dated milestone or gateway
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Checkpoint {
    pub id: Id,
    pub lane_id: Id,
    pub kind: ItemKind,
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatrixCell {
    pub lane_id: Id,
    pub checkpoint_id: Id,
    pub direct_item_ids: Vec<Id>,
    pub related_item_ids: Vec<Id>,
    pub total_effort: f64,
    pub status: CellStatus,
    pub load_rate: f64,
    pub priority_distribution: PriorityBuckets<usize>,
    pub effort_by_priority: PriorityBuckets<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<CellContent>,
}

impl MatrixCell {
    pub fn empty(lane_id: impl Into<Id>, checkpoint_id: impl Into<Id>) -> Self {
        Self {
            lane_id: lane_id.into(),
            checkpoint_id: checkpoint_id.into(),
            direct_item_ids: Vec::new(),
            related_item_ids: Vec::new(),
            total_effort: 0.0,
            status: CellStatus::Empty,
            load_rate: 0.0,
            priority_distribution: PriorityBuckets::default(),
            effort_by_priority: PriorityBuckets::default(),
            content: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatrixData {
    pub lanes: Vec<Lane>,
    pub checkpoints: Vec<Checkpoint>,
    /// One cell per (lane, checkpoint). On the wire this is a map keyed by
    /// `"{laneId}-{checkpointId}"`.
    #[serde(with = "cell_map")]
    pub cells: BTreeMap<(Id, Id), MatrixCell>,
    pub total_effort: f64,
    pub date_range: DateRange,
}

impl MatrixData {
    pub fn cell_key(lane_id: &str, checkpoint_id: &str) -> String {
        format!("{}-{}", lane_id, checkpoint_id)
    }

    pub fn cell(&self, lane_id: &str, checkpoint_id: &str) -> Option<&MatrixCell> {
        self.cells
            .get(&(lane_id.to_string(), checkpoint_id.to_string()))
    }

    /// A wire key shared by two different (lane, checkpoint) pairs, if any
    pub fn ambiguous_key(&self) -> Option<String> {
        cell_map::ambiguous_key(&self.cells)
    }
}

/// Flat `"{laneId}-{checkpointId}"` wire map. Two pairs that flatten to the same key
/// cannot both be represented, so serialization fails instead of dropping a cell.
mod cell_map {
    use super::{MatrixCell, MatrixData};
    use crate::model::Id;
    use serde::ser::SerializeMap;
    use serde::{Deserialize, Deserializer, Serializer};
    use std::collections::{BTreeMap, HashSet};

    pub(super) fn ambiguous_key(cells: &BTreeMap<(Id, Id), MatrixCell>) -> Option<String> {
        let mut seen = HashSet::with_capacity(cells.len());
        cells
            .keys()
            .map(|(lane_id, checkpoint_id)| MatrixData::cell_key(lane_id, checkpoint_id))
            .find(|key| !seen.insert(key.clone()))
    }

    pub fn serialize<S: Serializer>(
        cells: &BTreeMap<(Id, Id), MatrixCell>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        if let Some(key) = ambiguous_key(cells) {
            return Err(serde::ser::Error::custom(format!(
                "cell key '{}' matches more than one lane/checkpoint pair",
                key
            )));
        }
        let mut map = serializer.serialize_map(Some(cells.len()))?;
        for ((lane_id, checkpoint_id), cell) in cells {
            map.serialize_entry(&MatrixData::cell_key(lane_id, checkpoint_id), cell)?;
        }
        map.end()
    }

    /// Rebuilds the pair key from the ids each cell carries
    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<BTreeMap<(Id, Id), MatrixCell>, D::Error> {
        let flat = BTreeMap::<String, MatrixCell>::deserialize(deserializer)?;
        Ok(flat
            .into_values()
            .map(|cell| ((cell.lane_id.clone(), cell.checkpoint_id.clone()), cell))
            .collect())
    }
}

/// Heat bucket of one cell, ready for the heatmap view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeatmapEntry {
    pub lane_id: Id,
    pub checkpoint_id: Id,
    pub load_rate: f64,
    pub level: HeatLevel,
}
