use serde::{Deserialize, Serialize};

use super::{Record, RecordId};

/// A person who can be assigned tickets. Belongs to one area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    #[serde(default)]
    pub id: Option<RecordId>,
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub username: String,
    pub area_id: RecordId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersonKey {
    Area,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersonFilter {
    Name(String),
}

impl Person {
    pub fn new(name: impl Into<String>, email: impl Into<String>, area_id: RecordId) -> Self {
        Self {
            id: None,
            name: name.into(),
            email: email.into(),
            username: String::new(),
            area_id,
        }
    }

    /// Copy the fields the update path is allowed to change.
    pub fn apply_changes(&mut self, incoming: Person) {
        self.name = incoming.name;
        self.email = incoming.email;
    }
}

impl Record for Person {
    type ForeignKey = PersonKey;
    type Filter = PersonFilter;

    const KIND: &'static str = "Person";

    fn id(&self) -> Option<RecordId> {
        self.id
    }

    fn with_id(mut self, id: RecordId) -> Self {
        self.id = Some(id);
        self
    }

    fn foreign_key(&self, key: PersonKey) -> RecordId {
        match key {
            PersonKey::Area => self.area_id,
        }
    }

    fn matches(&self, filter: &PersonFilter) -> bool {
        match filter {
            PersonFilter::Name(name) => &self.name == name,
        }
    }
}
