//! Critical path over finish-to-start dependencies
//!
//! Only lines touched by at least one schedule-driving dependency are considered. The graph
//! is ordered with Kahn's algorithm and the longest chain (by inclusive duration in days) is
//! found by relaxing edges in topological order. A cycle yields an empty path.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};

use crate::model::{Id, Relation, ScheduledItem};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CriticalPathResult {
    /// Line ids from the first to the last line of the chain
    pub path: Vec<Id>,
    /// Sum of inclusive durations along `path`
    pub total_duration_days: i64,
    /// Topological order of the dependency-linked lines; empty on a cycle
    pub topological_order: Vec<Id>,
    pub cycle_detected: bool,
}

impl CriticalPathResult {
    pub fn contains(&self, item_id: &str) -> bool {
        self.path.iter().any(|id| id == item_id)
    }
}

/// Ordered ids of the critical path, or an empty list when there is none
pub fn compute_critical_path(items: &[ScheduledItem], relations: &[Relation]) -> Vec<Id> {
    CriticalPathResolver::resolve(items, relations).path
}

pub struct CriticalPathResolver;

impl CriticalPathResolver {
    pub fn resolve(items: &[ScheduledItem], relations: &[Relation]) -> CriticalPathResult {
        if items.is_empty() || relations.is_empty() {
            return CriticalPathResult::default();
        }

        let by_id: HashMap<&str, &ScheduledItem> =
            items.iter().map(|i| (i.id.as_str(), i)).collect();

        let mut successors: HashMap<&str, Vec<&str>> = HashMap::new();
        let mut predecessors: HashMap<&str, Vec<&str>> = HashMap::new();
        let mut edges: HashSet<(&str, &str)> = HashSet::new();

        for relation in relations.iter().filter(|r| r.is_schedule_driving()) {
            let from = relation.from_id.as_str();
            let to = relation.to_id.as_str();
            if !by_id.contains_key(from) || !by_id.contains_key(to) {
                continue;
            }
            if !edges.insert((from, to)) {
                continue;
            }
            successors.entry(from).or_default().push(to);
            predecessors.entry(to).or_default().push(from);
        }

        // In-chain lines, in input order
        let mut in_chain: Vec<&str> = Vec::new();
        let mut seen: HashSet<&str> = HashSet::new();
        for item in items {
            let id = item.id.as_str();
            if (successors.contains_key(id) || predecessors.contains_key(id)) && seen.insert(id) {
                in_chain.push(id);
            }
        }

        if in_chain.is_empty() {
            return CriticalPathResult::default();
        }

        let order = match Self::topological_order(&in_chain, &successors, &predecessors) {
            Some(order) => order,
            None => {
                log::warn!(
                    "Circular dependency among {} linked lines; no critical path",
                    in_chain.len()
                );
                return CriticalPathResult {
                    cycle_detected: true,
                    ..CriticalPathResult::default()
                };
            }
        };

        let duration: HashMap<&str, i64> = in_chain
            .iter()
            .map(|id| (*id, by_id[id].duration_days()))
            .collect();

        let mut longest: HashMap<&str, i64> = duration.clone();
        let mut previous: HashMap<&str, &str> = HashMap::new();

        for id in &order {
            let here = longest[id];
            for succ in successors.get(id).into_iter().flatten() {
                let candidate = here + duration[succ];
                if candidate > longest[succ] {
                    longest.insert(*succ, candidate);
                    previous.insert(*succ, *id);
                }
            }
        }

        // First line in topological order wins a tie
        let mut end = order[0];
        for id in &order[1..] {
            if longest[id] > longest[end] {
                end = *id;
            }
        }

        let mut path = vec![end.to_string()];
        let mut current = end;
        while let Some(prev) = previous.get(current) {
            path.push(prev.to_string());
            current = *prev;
        }
        path.reverse();

        log::debug!(
            "Critical path of {} lines, {} days, over {} linked lines",
            path.len(),
            longest[end],
            order.len()
        );

        CriticalPathResult {
            path,
            total_duration_days: longest[end],
            topological_order: order.iter().map(|id| id.to_string()).collect(),
            cycle_detected: false,
        }
    }

    /// Kahn's algorithm; `None` when some line never reaches in-degree zero
    fn topological_order<'a>(
        in_chain: &[&'a str],
        successors: &HashMap<&'a str, Vec<&'a str>>,
        predecessors: &HashMap<&'a str, Vec<&'a str>>,
    ) -> Option<Vec<&'a str>> {
        let mut in_degree: HashMap<&str, usize> = in_chain
            .iter()
            .map(|id| (*id, predecessors.get(id).map_or(0, Vec::len)))
            .collect();

        let mut queue: VecDeque<&str> = in_chain
            .iter()
            .filter(|id| in_degree[*id] == 0)
            .copied()
            .collect();

        let mut order = Vec::with_capacity(in_chain.len());
        while let Some(id) = queue.pop_front() {
            order.push(id);
            for succ in successors.get(id).into_iter().flatten() {
                if let Some(degree) = in_degree.get_mut(succ) {
                    *degree -= 1;
                    if *degree == 0 {
                        queue.push_back(*succ);
                    }
                }
            }
        }

        (order.len() == in_chain.len()).then_some(order)
    }
}
