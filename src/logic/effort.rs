use crate::config::EffortPolicy;
use crate::model::{ItemKind, ScheduledItem};

pub struct EffortEstimator;

impl EffortEstimator {
    /// Effort in person-days: the explicit estimate when present, else the policy default
    pub fn estimate(item: &ScheduledItem, policy: &EffortPolicy) -> f64 {
        if let Some(effort) = Self::explicit(item) {
            return effort;
        }
        Self::fallback(item, policy)
    }

    /// Explicit estimate, ignoring negative or non-finite values
    pub fn explicit(item: &ScheduledItem) -> Option<f64> {
        item.attributes
            .effort
            .filter(|effort| effort.is_finite() && *effort >= 0.0)
    }

    pub fn fallback(item: &ScheduledItem, policy: &EffortPolicy) -> f64 {
        match item.kind() {
            ItemKind::Gateway => policy.gateway,
            ItemKind::Milestone => policy.milestone,
            ItemKind::Task => match item.start_date {
                Some(_) => (item.duration_days() as f64 * policy.task_factor)
                    .ceil()
                    .max(1.0),
                None => policy.undated,
            },
        }
    }
}
