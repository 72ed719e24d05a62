use std::sync::Arc;

use tracing::info;

use super::{require_id, require_text, Result, ServiceError};
use crate::aggregation::Enricher;
use crate::model::{Person, PersonFilter, PersonView, Record, RecordId};
use crate::storage::RecordStore;

/// People, each read back with their area.
pub struct PeopleService {
    store: Arc<dyn RecordStore<Person>>,
    enricher: Enricher,
}

impl PeopleService {
    pub fn new(store: Arc<dyn RecordStore<Person>>, enricher: Enricher) -> Self {
        Self { store, enricher }
    }

    pub async fn list(&self) -> Result<Vec<Person>> {
        Ok(self.store.find_all().await?)
    }

    /// The person with their area, or `None` without calling the area service.
    pub async fn get_view(&self, id: RecordId) -> Result<Option<PersonView>> {
        let Some(person) = self.store.find_by_id(id).await? else {
            return Ok(None);
        };
        Ok(Some(self.enricher.person_view(person).await?))
    }

    pub async fn find_by_name(&self, name: &str) -> Result<Vec<Person>> {
        require_text("Person name", name)?;
        Ok(self
            .store
            .find_matching(&PersonFilter::Name(name.to_string()))
            .await?)
    }

    pub async fn create(&self, mut person: Person) -> Result<Person> {
        require_text("Person name", &person.name)?;
        person.id = None;
        let person = self.store.save(person).await?;
        info!(id = ?person.id, area_id = person.area_id, "Created person");
        Ok(person)
    }

    pub async fn update(&self, id: RecordId, changes: Person) -> Result<Person> {
        require_text("Person name", &changes.name)?;
        let mut person = self
            .store
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found(Person::KIND, id))?;
        person.apply_changes(changes);
        Ok(self.store.save(person).await?)
    }

    pub async fn delete(&self, id: RecordId) -> Result<()> {
        require_id("Person id", id)?;
        if !self.store.delete_by_id(id).await? {
            return Err(ServiceError::not_found(Person::KIND, id));
        }
        info!(id, "Deleted person");
        Ok(())
    }
}
