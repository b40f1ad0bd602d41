use thiserror::Error;

use crate::model::Id;

#[derive(Debug, Error, PartialEq)]
pub enum PlanError {
    #[error("Plan '{0}' not found")]
    PlanNotFound(Id),
    #[error("Lane '{0}' not found")]
    LaneNotFound(Id),
    #[error("Item '{0}' not found")]
    ItemNotFound(Id),
    #[error("Relation '{0}' not found")]
    RelationNotFound(Id),
    #[error("Invalid lane: {0}")]
    InvalidLane(String),
    #[error("Invalid item: {0}")]
    InvalidItem(String),
    #[error("Invalid relation: {0}")]
    InvalidRelation(String),
    #[error("Relation {from_id} -> {to_id} already exists as '{existing_id}'")]
    DuplicateRelation {
        from_id: Id,
        to_id: Id,
        existing_id: Id,
    },
}

impl PlanError {
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            PlanError::PlanNotFound(_)
                | PlanError::LaneNotFound(_)
                | PlanError::ItemNotFound(_)
                | PlanError::RelationNotFound(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, PlanError>;
