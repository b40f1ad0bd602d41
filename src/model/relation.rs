use crate::model::{generate_id, Id};
use serde::{Deserialize, Serialize};

/// Relation type. Only dependencies take part in scheduling; anything else is carried through.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationType {
    Dependency,
    #[serde(other)]
    Other,
}

/// Temporal constraint of a dependency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DependencyKind {
    FinishToStart,
    StartToStart,
    FinishToFinish,
    StartToFinish,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relation {
    #[serde(default = "generate_id")]
    pub id: Id,
    #[serde(rename = "type")]
    pub relation_type: RelationType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependency_kind: Option<DependencyKind>,
    pub from_id: Id,
    pub to_id: Id,
}

impl Relation {
    /// Finish-to-start dependency with a generated id
    pub fn dependency(from_id: impl Into<Id>, to_id: impl Into<Id>) -> Self {
        Self {
            id: generate_id(),
            relation_type: RelationType::Dependency,
            dependency_kind: Some(DependencyKind::FinishToStart),
            from_id: from_id.into(),
            to_id: to_id.into(),
        }
    }

    pub fn with_id(mut self, id: impl Into<Id>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_kind(mut self, kind: Option<DependencyKind>) -> Self {
        self.dependency_kind = kind;
        self
    }

    pub fn is_dependency(&self) -> bool {
        self.relation_type == RelationType::Dependency
    }

    /// Dependencies that drive the critical path: finish-to-start, or no declared kind
    pub fn is_schedule_driving(&self) -> bool {
        self.is_dependency()
            && matches!(
                self.dependency_kind,
                None | Some(DependencyKind::FinishToStart)
            )
    }

    pub fn is_self_reference(&self) -> bool {
        self.from_id == self.to_id
    }

    pub fn touches(&self, item_id: &str) -> bool {
        self.from_id == item_id || self.to_id == item_id
    }
}
