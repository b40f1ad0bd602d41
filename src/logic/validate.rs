use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::model::{Id, Plan, Relation, ScheduledItem};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationValidationResult {
    pub valid: bool,
    /// Relations that passed, in input order
    pub relations: Vec<Relation>,
    pub issues: Vec<ValidationIssue>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanValidationResult {
    pub valid: bool,
    pub item_count: usize,
    pub relation_count: usize,
    pub issues: Vec<ValidationIssue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationIssue {
    pub subject_id: Id,
    pub issue_type: ValidationIssueType,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ValidationIssueType {
    MissingEndpoint,
    SelfReference,
    DuplicateRelation,
    InvalidDates,
    UnknownLane,
    DuplicateItem,
}

pub struct RelationValidator;

impl RelationValidator {
    /// Strip relations with a missing endpoint, self references and repeated `(from, to)` pairs.
    /// The first occurrence of a pair survives; reverse pairs are distinct.
    pub fn validate(items: &[ScheduledItem], relations: &[Relation]) -> RelationValidationResult {
        let item_ids: HashSet<&str> = items.iter().map(|i| i.id.as_str()).collect();
        let mut seen_pairs: HashSet<(&str, &str)> = HashSet::new();
        let mut kept = Vec::with_capacity(relations.len());
        let mut issues = Vec::new();

        for relation in relations {
            let missing: Vec<&str> = [relation.from_id.as_str(), relation.to_id.as_str()]
                .into_iter()
                .filter(|id| !item_ids.contains(id))
                .collect();

            if !missing.is_empty() {
                issues.push(ValidationIssue {
                    subject_id: relation.id.clone(),
                    issue_type: ValidationIssueType::MissingEndpoint,
                    message: format!(
                        "Relation '{}' references missing item(s): {}",
                        relation.id,
                        missing.join(", ")
                    ),
                });
                continue;
            }

            if relation.is_self_reference() {
                issues.push(ValidationIssue {
                    subject_id: relation.id.clone(),
                    issue_type: ValidationIssueType::SelfReference,
                    message: format!(
                        "Relation '{}' links item '{}' to itself",
                        relation.id, relation.from_id
                    ),
                });
                continue;
            }

            if !seen_pairs.insert((relation.from_id.as_str(), relation.to_id.as_str())) {
                issues.push(ValidationIssue {
                    subject_id: relation.id.clone(),
                    issue_type: ValidationIssueType::DuplicateRelation,
                    message: format!(
                        "Relation '{}' duplicates {} -> {}",
                        relation.id, relation.from_id, relation.to_id
                    ),
                });
                continue;
            }

            kept.push(relation.clone());
        }

        for issue in &issues {
            log::warn!("{}", issue.message);
        }

        RelationValidationResult {
            valid: issues.is_empty(),
            relations: kept,
            issues,
        }
    }
}

pub struct PlanValidator;

impl PlanValidator {
    /// Item checks (dates, lane membership, unique ids) plus the relation checks
    pub fn validate(plan: &Plan) -> PlanValidationResult {
        let lane_ids: HashSet<&str> = plan.lanes.iter().map(|l| l.id.as_str()).collect();
        let mut seen_items: HashSet<&str> = HashSet::new();
        let mut issues = Vec::new();

        for item in &plan.items {
            if !seen_items.insert(item.id.as_str()) {
                issues.push(ValidationIssue {
                    subject_id: item.id.clone(),
                    issue_type: ValidationIssueType::DuplicateItem,
                    message: format!("Item id '{}' appears more than once", item.id),
                });
            }
            if !lane_ids.contains(item.lane_id.as_str()) {
                issues.push(ValidationIssue {
                    subject_id: item.id.clone(),
                    issue_type: ValidationIssueType::UnknownLane,
                    message: format!("Item '{}' belongs to unknown lane '{}'", item.id, item.lane_id),
                });
            }
            if let Some(problem) = item.date_problem() {
                issues.push(ValidationIssue {
                    subject_id: item.id.clone(),
                    issue_type: ValidationIssueType::InvalidDates,
                    message: problem,
                });
            }
        }

        let relation_result = RelationValidator::validate(&plan.items, &plan.relations);
        issues.extend(relation_result.issues);

        PlanValidationResult {
            valid: issues.is_empty(),
            item_count: plan.items.len(),
            relation_count: plan.relations.len(),
            issues,
        }
    }
}
