use serde::{Deserialize, Serialize};

use crate::domain::project::ProjectId;
use crate::errors::{ApplicationError, DomainError};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IndentId(pub i64);

impl std::fmt::Display for IndentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle of a material indent. Only moves forward:
/// `Pending -> Quoted -> Approved`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IndentStatus {
    #[default]
    Pending,
    Quoted,
    Approved,
}

impl IndentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Quoted => "Quoted",
            Self::Approved => "Approved",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "Pending" => Some(Self::Pending),
            "Quoted" => Some(Self::Quoted),
            "Approved" => Some(Self::Approved),
            _ => None,
        }
    }
}

impl std::fmt::Display for IndentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Priority {
    type Err = ApplicationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "high" => Ok(Self::High),
            "medium" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            other => Err(ApplicationError::InvalidInput(format!(
                "unsupported priority `{other}` (expected High|Medium|Low)"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialIndent {
    pub id: IndentId,
    pub project_id: ProjectId,
    pub item_name: String,
    pub quantity: String,
    pub priority: Priority,
    pub status: IndentStatus,
    pub requested_by: String,
    pub date: String,
}

impl MaterialIndent {
    pub fn can_transition_to(&self, next: IndentStatus) -> bool {
        matches!(
            (self.status, next),
            (IndentStatus::Pending, IndentStatus::Quoted)
                | (IndentStatus::Quoted, IndentStatus::Quoted)
                | (IndentStatus::Quoted, IndentStatus::Approved)
        )
    }

    pub fn transition_to(&mut self, next: IndentStatus) -> Result<(), DomainError> {
        if self.can_transition_to(next) {
            self.status = next;
            return Ok(());
        }

        Err(DomainError::InvalidIndentTransition { from: self.status, to: next })
    }
}

/// Indent as raised by a requester, before the store assigns an id.
/// There is no status field: every new indent starts `Pending`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewIndent {
    pub project_id: ProjectId,
    pub item_name: String,
    pub quantity: String,
    pub priority: Priority,
    pub requested_by: String,
    pub date: String,
}

impl NewIndent {
    pub fn into_indent(self, id: IndentId) -> MaterialIndent {
        MaterialIndent {
            id,
            project_id: self.project_id,
            item_name: self.item_name,
            quantity: self.quantity,
            priority: self.priority,
            status: IndentStatus::Pending,
            requested_by: self.requested_by,
            date: self.date,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{IndentId, IndentStatus, MaterialIndent, NewIndent, Priority};
    use crate::domain::project::ProjectId;
    use crate::errors::DomainError;

    fn indent(status: IndentStatus) -> MaterialIndent {
        MaterialIndent {
            id: IndentId(1),
            project_id: ProjectId(1),
            item_name: "Cement".to_string(),
            quantity: "50 bags".to_string(),
            priority: Priority::High,
            status,
            requested_by: "Ramesh".to_string(),
            date: "2024-01-01".to_string(),
        }
    }

    #[test]
    fn allows_forward_lifecycle() {
        let mut indent = indent(IndentStatus::Pending);
        indent.transition_to(IndentStatus::Quoted).expect("pending -> quoted");
        indent.transition_to(IndentStatus::Quoted).expect("further quotes keep it quoted");
        indent.transition_to(IndentStatus::Approved).expect("quoted -> approved");
        assert_eq!(indent.status, IndentStatus::Approved);
    }

    #[test]
    fn blocks_backward_and_skipping_transitions() {
        let mut approved = indent(IndentStatus::Approved);
        let error = approved.transition_to(IndentStatus::Quoted).expect_err("approved -> quoted");
        assert_eq!(
            error,
            DomainError::InvalidIndentTransition {
                from: IndentStatus::Approved,
                to: IndentStatus::Quoted
            }
        );

        let mut pending = indent(IndentStatus::Pending);
        assert!(pending.transition_to(IndentStatus::Approved).is_err());
        assert!(pending.transition_to(IndentStatus::Pending).is_err());
        assert_eq!(pending.status, IndentStatus::Pending);
    }

    #[test]
    fn priority_parses_case_insensitively() {
        assert_eq!("high".parse::<Priority>().expect("high"), Priority::High);
        assert_eq!(" Low ".parse::<Priority>().expect("low"), Priority::Low);
        assert_eq!("MEDIUM".parse::<Priority>().expect("medium"), Priority::Medium);
        assert!("urgent".parse::<Priority>().is_err());
        assert_eq!(Priority::default(), Priority::Medium);
    }

    #[test]
    fn status_round_trips_through_storage_text() {
        for status in [IndentStatus::Pending, IndentStatus::Quoted, IndentStatus::Approved] {
            assert_eq!(IndentStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(IndentStatus::parse("pending"), None);
    }

    #[test]
    fn new_indent_always_starts_pending() {
        let created = NewIndent {
            project_id: ProjectId(7),
            item_name: "Steel".to_string(),
            quantity: "2 tons".to_string(),
            priority: Priority::Low,
            requested_by: "Suresh".to_string(),
            date: "2024-02-01".to_string(),
        }
        .into_indent(IndentId(42));

        assert_eq!(created.id, IndentId(42));
        assert_eq!(created.status, IndentStatus::Pending);
    }
}
