//! Lane load against team capacity over an arbitrary date window

use crate::config::{CapacityConfig, EffortPolicy};
use crate::logic::EffortEstimator;
use crate::model::{
    CapacityReport, CapacityRequest, ItemKind, LaneLoad, LoadWarning, LoadWarningKind, Plan,
};

pub fn analyze_capacity(
    plan: &Plan,
    request: &CapacityRequest,
    config: &CapacityConfig,
    effort: &EffortPolicy,
) -> CapacityReport {
    CapacityAnalyzer::analyze(plan, request, config, effort)
}

pub struct CapacityAnalyzer;

impl CapacityAnalyzer {
    pub fn analyze(
        plan: &Plan,
        request: &CapacityRequest,
        config: &CapacityConfig,
        effort: &EffortPolicy,
    ) -> CapacityReport {
        let window = request.window;
        let working_days = window.calendar_days() as f64 * config.working_day_ratio;

        let mut lanes = Vec::with_capacity(plan.lanes.len());
        let mut warnings = Vec::new();

        for lane in &plan.lanes {
            let team = request.teams.iter().find(|t| t.lane_id == lane.id);
            let capacity = team.map_or(0.0, |t| t.capacity.max(0.0));

            let tasks: Vec<_> = plan
                .items_in_lane(&lane.id)
                .filter(|item| item.kind() == ItemKind::Task)
                .filter(|item| match item.start_date {
                    Some(start) => window.overlaps(start, item.end_date.unwrap_or(start)),
                    None => false,
                })
                .collect();

            let lane_effort: f64 = tasks
                .iter()
                .map(|item| EffortEstimator::estimate(item, effort))
                .sum();

            let available = capacity * working_days;
            let load_rate = if available > 0.0 {
                lane_effort / available * 100.0
            } else {
                0.0
            };

            if let Some(warning) =
                Self::warning(&lane.id, &lane.name, tasks.len(), available, load_rate, config)
            {
                log::info!("{}", warning.message);
                warnings.push(warning);
            }

            lanes.push(LaneLoad {
                lane_id: lane.id.clone(),
                lane_name: lane.name.clone(),
                team_name: team.and_then(|t| t.team_name.clone()),
                capacity,
                task_count: tasks.len(),
                effort: lane_effort,
                working_days,
                load_rate,
            });
        }

        CapacityReport {
            window,
            lanes,
            warnings,
        }
    }

    fn warning(
        lane_id: &str,
        lane_name: &str,
        task_count: usize,
        available: f64,
        load_rate: f64,
        config: &CapacityConfig,
    ) -> Option<LoadWarning> {
        if task_count == 0 {
            return None;
        }

        let (kind, message) = if available <= 0.0 {
            (
                LoadWarningKind::NoCapacity,
                format!("Lane '{}' has {} tasks but no team capacity", lane_name, task_count),
            )
        } else if load_rate > config.overload_percent {
            (
                LoadWarningKind::Overload,
                format!("Lane '{}' is overloaded at {:.1}%", lane_name, load_rate),
            )
        } else if load_rate < config.idle_percent {
            (
                LoadWarningKind::Idle,
                format!("Lane '{}' is underused at {:.1}%", lane_name, load_rate),
            )
        } else {
            return None;
        };

        Some(LoadWarning {
            lane_id: lane_id.to_string(),
            kind,
            message,
        })
    }
}
