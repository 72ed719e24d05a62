//! Record types owned by the four services, and the read-time views that
//! compose them across service boundaries.
//!
//! Foreign keys are plain numeric references into a peer's store. Nothing
//! enforces them; they are resolved over the network at read time.

use std::collections::HashMap;
use std::fmt::Debug;

use serde::de::DeserializeOwned;
use serde::Serialize;

mod area;
mod person;
mod project;
mod ticket;
mod views;

pub use area::Area;
pub use person::{Person, PersonFilter, PersonKey};
pub use project::{Project, ProjectFilter, ProjectKey};
pub use ticket::{Ticket, TicketFilter, TicketKey, TicketPriority, TicketStatus, TicketType};
pub use views::{PersonView, ProjectDetails, ProjectProgress, ProjectView, TicketView};

/// Numeric surrogate key shared by every record kind.
pub type RecordId = i64;

/// Foreign-key value → number of rows referencing it.
pub type CountMap = HashMap<RecordId, u64>;

/// Uninhabited marker for records with no foreign keys or no custom filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoField {}

/// A persisted record owned by exactly one service.
pub trait Record: Clone + Debug + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Foreign-key columns this record can be grouped by.
    type ForeignKey: Copy + Debug + Send + Sync + 'static;
    /// Equality filters supported by `RecordStore::find_matching`.
    type Filter: Debug + Send + Sync + 'static;

    /// Human-readable kind, used in log fields and error messages.
    const KIND: &'static str;

    /// Surrogate key; `None` until first saved.
    fn id(&self) -> Option<RecordId>;

    fn with_id(self, id: RecordId) -> Self;

    /// Value of the given foreign key on this record.
    fn foreign_key(&self, key: Self::ForeignKey) -> RecordId;

    fn matches(&self, filter: &Self::Filter) -> bool;
}
