//! Declarative schedule of structural genome edits.

use serde::{Deserialize, Serialize};

/// A structural edit applied uniformly to every genome of the population.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StructuralAction {
    /// Append a copy of every gene, then shuffle gene order.
    DuplicateGenes,
    /// Remove `count` randomly chosen genes from every genome.
    RemoveGenes { count: usize },
}

/// A structural action bound to the generation that triggers it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledAction {
    pub generation: u64,
    pub action: StructuralAction,
}

/// Ordered list of scheduled structural actions. Empty by default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StructuralSchedule {
    entries: Vec<ScheduledAction>,
}

impl StructuralSchedule {
    pub fn new(entries: Vec<ScheduledAction>) -> Self {
        Self { entries }
    }

    /// Actions due at `generation`, in declaration order.
    pub fn due_at(&self, generation: u64) -> impl Iterator<Item = StructuralAction> + '_ {
        self.entries
            .iter()
            .filter(move |e| e.generation == generation)
            .map(|e| e.action)
    }

    pub fn entries(&self) -> &[ScheduledAction] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
