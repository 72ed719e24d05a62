use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{Record, RecordId};

/// A unit of work inside a project, assigned to one person.
///
/// `progress` and `estimate` are in the same (unspecified) unit; the ratio of
/// their sums across a project is that project's completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    #[serde(default)]
    pub id: Option<RecordId>,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub status: TicketStatus,
    #[serde(default, rename = "type")]
    pub ticket_type: TicketType,
    #[serde(default)]
    pub priority: TicketPriority,
    #[serde(default)]
    pub progress: i32,
    #[serde(default)]
    pub estimate: i32,
    /// RFC 3339 creation time, set by the ticket service.
    #[serde(default)]
    pub created_at: Option<String>,
    /// RFC 3339 time the ticket moved to `Done`.
    #[serde(default)]
    pub resolved_at: Option<String>,
    pub project_id: RecordId,
    pub people_id: RecordId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TicketKey {
    Project,
    Person,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TicketFilter {
    Status(TicketStatus),
    Priority(TicketPriority),
}

impl Ticket {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        project_id: RecordId,
        people_id: RecordId,
    ) -> Self {
        Self {
            id: None,
            title: title.into(),
            description: description.into(),
            status: TicketStatus::default(),
            ticket_type: TicketType::default(),
            priority: TicketPriority::default(),
            progress: 0,
            estimate: 0,
            created_at: None,
            resolved_at: None,
            project_id,
            people_id,
        }
    }

    pub fn with_progress(mut self, progress: i32, estimate: i32) -> Self {
        self.progress = progress;
        self.estimate = estimate;
        self
    }

    /// Copy the fields the update path is allowed to change.
    ///
    /// Type, timestamps and both foreign keys have their own paths.
    pub fn apply_changes(&mut self, incoming: Ticket) {
        self.title = incoming.title;
        self.description = incoming.description;
        self.status = incoming.status;
        self.priority = incoming.priority;
        self.progress = incoming.progress;
        self.estimate = incoming.estimate;
    }
}

impl Record for Ticket {
    type ForeignKey = TicketKey;
    type Filter = TicketFilter;

    const KIND: &'static str = "Ticket";

    fn id(&self) -> Option<RecordId> {
        self.id
    }

    fn with_id(mut self, id: RecordId) -> Self {
        self.id = Some(id);
        self
    }

    fn foreign_key(&self, key: TicketKey) -> RecordId {
        match key {
            TicketKey::Project => self.project_id,
            TicketKey::Person => self.people_id,
        }
    }

    fn matches(&self, filter: &TicketFilter) -> bool {
        match filter {
            TicketFilter::Status(status) => self.status == *status,
            TicketFilter::Priority(priority) => self.priority == *priority,
        }
    }
}

/// Error parsing a stored enum column.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} value: {value}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

// Enums are stored and sent as their SCREAMING_SNAKE_CASE names.
macro_rules! text_enum {
    ($name:ident, $kind:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err(UnknownVariant {
                        kind: $kind,
                        value: other.to_string(),
                    }),
                }
            }
        }
    };
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TicketStatus {
    #[default]
    New,
    Rejected,
    Assigned,
    InProgress,
    Aborted,
    Done,
}

text_enum!(TicketStatus, "status", {
    New => "NEW",
    Rejected => "REJECTED",
    Assigned => "ASSIGNED",
    InProgress => "IN_PROGRESS",
    Aborted => "ABORTED",
    Done => "DONE",
});

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TicketType {
    Bug,
    Feature,
    #[default]
    Task,
    Improvement,
}

text_enum!(TicketType, "type", {
    Bug => "BUG",
    Feature => "FEATURE",
    Task => "TASK",
    Improvement => "IMPROVEMENT",
});

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TicketPriority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

text_enum!(TicketPriority, "priority", {
    Low => "LOW",
    Medium => "MEDIUM",
    High => "HIGH",
    Critical => "CRITICAL",
});
