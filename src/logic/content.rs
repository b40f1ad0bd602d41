//! Kind-specific cell content: requirement previews for milestones, checklist counts for gateways

use std::collections::HashSet;

use crate::model::{
    CheckOutcome, GatewayContent, ItemDetails, ItemStatus, MilestoneContent, ScheduledItem,
};

pub struct ContentExtractor;

impl ContentExtractor {
    /// Merge requirement references from the given lines, first occurrence of an id wins.
    /// At most `limit` previews are kept.
    pub fn milestone<'a, I>(items: I, limit: usize) -> MilestoneContent
    where
        I: IntoIterator<Item = &'a ScheduledItem>,
    {
        let mut seen = HashSet::new();
        let mut previews = Vec::new();
        let mut count = 0;

        for requirement in items.into_iter().flat_map(|item| item.requirements()) {
            if !seen.insert(requirement.id.as_str()) {
                continue;
            }
            count += 1;
            if previews.len() < limit {
                previews.push(requirement.summary());
            }
        }

        MilestoneContent {
            requirement_count: count,
            truncated: count > previews.len(),
            previews,
        }
    }

    /// Checklist counts of a gateway. Without a checklist the coarse gate result, then the
    /// line status, gives a completion of 0, 0.5 or 1.
    pub fn gateway(item: &ScheduledItem) -> GatewayContent {
        let (checklist, gate_result) = match &item.details {
            ItemDetails::Gateway {
                checklist,
                gate_result,
            } => (checklist.as_slice(), *gate_result),
            _ => (&[][..], None),
        };

        if checklist.is_empty() {
            let completion_rate = match gate_result {
                Some(CheckOutcome::Passed) => 1.0,
                Some(CheckOutcome::Pending) => 0.5,
                Some(CheckOutcome::Failed) => 0.0,
                None => match item.status() {
                    ItemStatus::Completed => 1.0,
                    ItemStatus::InProgress => 0.5,
                    ItemStatus::Planned => 0.0,
                },
            };
            return GatewayContent {
                completion_rate,
                ..GatewayContent::default()
            };
        }

        let mut content = GatewayContent {
            total: checklist.len(),
            ..GatewayContent::default()
        };
        for entry in checklist {
            match entry.result {
                CheckOutcome::Passed => content.passed += 1,
                CheckOutcome::Failed => content.failed += 1,
                CheckOutcome::Pending => content.pending += 1,
            }
        }
        content.completion_rate = content.passed as f64 / content.total as f64;
        content
    }
}
