use serde::{Deserialize, Serialize};

use super::{Record, RecordId};

/// A project inside an area. Tickets point at projects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    #[serde(default)]
    pub id: Option<RecordId>,
    pub name: String,
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub end_date: String,
    pub area_id: RecordId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectKey {
    Area,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectFilter {
    Area(RecordId),
}

impl Project {
    pub fn new(name: impl Into<String>, area_id: RecordId) -> Self {
        Self {
            id: None,
            name: name.into(),
            start_date: String::new(),
            end_date: String::new(),
            area_id,
        }
    }

    /// Copy the fields the update path is allowed to change.
    pub fn apply_changes(&mut self, incoming: Project) {
        self.name = incoming.name;
        self.start_date = incoming.start_date;
        self.end_date = incoming.end_date;
    }
}

impl Record for Project {
    type ForeignKey = ProjectKey;
    type Filter = ProjectFilter;

    const KIND: &'static str = "Project";

    fn id(&self) -> Option<RecordId> {
        self.id
    }

    fn with_id(mut self, id: RecordId) -> Self {
        self.id = Some(id);
        self
    }

    fn foreign_key(&self, key: ProjectKey) -> RecordId {
        match key {
            ProjectKey::Area => self.area_id,
        }
    }

    fn matches(&self, filter: &ProjectFilter) -> bool {
        match filter {
            ProjectFilter::Area(area_id) => self.area_id == *area_id,
        }
    }
}
