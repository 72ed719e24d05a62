//! Read-time compositions of a local record with records owned by peers.
//!
//! Views flatten the local record so a view is also a valid payload for the
//! plain record type: a peer deserializing `Project` from a `ProjectView`
//! simply ignores the extra `area` field.

use serde::{Deserialize, Serialize};

use super::{Area, Person, Project, RecordId, Ticket};

/// A person decorated with their area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonView {
    #[serde(flatten)]
    pub person: Person,
    pub area: Area,
}

/// A project decorated with its area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectView {
    #[serde(flatten)]
    pub project: Project,
    pub area: Area,
}

/// A ticket decorated with its project and assignee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TicketView {
    #[serde(flatten)]
    pub ticket: Ticket,
    pub project: Project,
    pub people: Person,
}

/// Identity and schedule of a project, without relations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDetails {
    pub id: Option<RecordId>,
    pub name: String,
    pub start_date: String,
    pub end_date: String,
}

impl From<Project> for ProjectDetails {
    fn from(project: Project) -> Self {
        Self {
            id: project.id,
            name: project.name,
            start_date: project.start_date,
            end_date: project.end_date,
        }
    }
}

/// A project with its furthest-progressed ticket and overall completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectProgress {
    pub project: Project,
    pub top_ticket: Ticket,
    pub progress_percentage: f64,
}
