use serde::{Deserialize, Serialize};

use super::{NoField, Record, RecordId};

/// An organisational area. Projects and people point at areas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Area {
    #[serde(default)]
    pub id: Option<RecordId>,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl Area {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            description: description.into(),
        }
    }

    /// Copy the fields the update path is allowed to change.
    pub fn apply_changes(&mut self, incoming: Area) {
        self.name = incoming.name;
        self.description = incoming.description;
    }
}

impl Record for Area {
    type ForeignKey = NoField;
    type Filter = NoField;

    const KIND: &'static str = "Area";

    fn id(&self) -> Option<RecordId> {
        self.id
    }

    fn with_id(mut self, id: RecordId) -> Self {
        self.id = Some(id);
        self
    }

    fn foreign_key(&self, key: NoField) -> RecordId {
        match key {}
    }

    fn matches(&self, filter: &NoField) -> bool {
        match *filter {}
    }
}
