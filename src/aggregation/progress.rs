//! Per-parent completion over a dependent collection.

use std::collections::HashMap;

use tracing::debug;

use crate::model::{Project, ProjectProgress, Record, RecordId, Ticket};

/// A dependent record that carries progress toward an estimate.
pub trait ProgressItem {
    fn item_id(&self) -> RecordId;
    fn parent_id(&self) -> RecordId;
    fn progress(&self) -> i64;
    fn estimate(&self) -> i64;
}

impl ProgressItem for Ticket {
    fn item_id(&self) -> RecordId {
        self.id.unwrap_or_default()
    }

    fn parent_id(&self) -> RecordId {
        self.project_id
    }

    fn progress(&self) -> i64 {
        i64::from(self.progress)
    }

    fn estimate(&self) -> i64 {
        i64::from(self.estimate)
    }
}

/// One parent, its furthest-progressed dependent, and overall completion.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressRecord<P, D> {
    pub parent: P,
    pub top: D,
    /// `100 × Σprogress ÷ Σestimate`, or 0.0 when nothing is estimated.
    pub percentage: f64,
}

impl From<ProgressRecord<Project, Ticket>> for ProjectProgress {
    fn from(record: ProgressRecord<Project, Ticket>) -> Self {
        Self {
            project: record.parent,
            top_ticket: record.top,
            progress_percentage: record.percentage,
        }
    }
}

/// Join parents against dependents in one pass over each.
///
/// Output follows parent order. Parents without dependents are omitted. The
/// top dependent has the highest progress; ties go to the lowest id.
pub fn synthesize<P, D>(parents: Vec<P>, dependents: &[D]) -> Vec<ProgressRecord<P, D>>
where
    P: Record,
    D: ProgressItem + Clone,
{
    let mut by_parent: HashMap<RecordId, Vec<&D>> = HashMap::new();
    for item in dependents {
        by_parent.entry(item.parent_id()).or_default().push(item);
    }

    let records: Vec<ProgressRecord<P, D>> = parents
        .into_iter()
        .filter_map(|parent| {
            let items = by_parent.get(&parent.id()?)?;
            let top = items.iter().copied().max_by(|a, b| {
                a.progress()
                    .cmp(&b.progress())
                    .then_with(|| b.item_id().cmp(&a.item_id()))
            })?;
            Some(ProgressRecord {
                top: top.clone(),
                percentage: percentage(items),
                parent,
            })
        })
        .collect();

    debug!(
        kind = P::KIND,
        dependents = dependents.len(),
        parents = records.len(),
        "Synthesized progress"
    );
    records
}

fn percentage<D: ProgressItem>(items: &[&D]) -> f64 {
    let progress: i64 = items.iter().map(|item| item.progress()).sum();
    let estimate: i64 = items.iter().map(|item| item.estimate()).sum();
    if estimate == 0 {
        return 0.0;
    }
    100.0 * progress as f64 / estimate as f64
}
