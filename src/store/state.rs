use uuid::Uuid;

use crate::models::{Entity, ListQuery};

/// Load state of a collection.
///
/// `Idle → Loading → {Ready, Error}`, and back to `Loading` on any refetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadPhase {
    #[default]
    Idle,
    Loading,
    Ready,
    Error,
}

/// Everything a store caches for one collection.
#[derive(Debug)]
pub(crate) struct CollectionState<E> {
    pub items: Vec<E>,
    pub total_count: u64,
    pub phase: LoadPhase,
    /// Writes in flight. Reads are never blocked by it.
    pub mutating: usize,
    /// The single surfaced error, replaced by each new failure.
    pub error: Option<String>,
    pub selected: Option<E>,
    pub last_query: Option<ListQuery>,
    /// Sequence number of the most recently issued list request.
    pub list_seq: u64,
    /// Sequence number of the most recently issued detail request.
    pub detail_seq: u64,
}

impl<E> Default for CollectionState<E> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            total_count: 0,
            phase: LoadPhase::Idle,
            mutating: 0,
            error: None,
            selected: None,
            last_query: None,
            list_seq: 0,
            detail_seq: 0,
        }
    }
}

impl<E: Entity> CollectionState<E> {
    pub fn position(&self, id: Uuid) -> Option<usize> {
        self.items.iter().position(|e| e.id() == id)
    }

    /// Puts a confirmed entity at the front, or replaces it in place if the
    /// collection already holds that id.
    pub fn prepend(&mut self, entity: E) -> bool {
        match self.position(entity.id()) {
            Some(index) => {
                self.items[index] = entity;
                false
            }
            None => {
                self.items.insert(0, entity);
                true
            }
        }
    }

    /// Replaces the cached row and the selected reference for the same id.
    pub fn replace(&mut self, entity: E) {
        let id = entity.id();
        if let Some(index) = self.position(id) {
            self.items[index] = entity.clone();
        }
        if self.selected.as_ref().is_some_and(|s| s.id() == id) {
            self.selected = Some(entity);
        }
    }

    pub fn remove(&mut self, id: Uuid) {
        self.items.retain(|e| e.id() != id);
        self.total_count = self.total_count.saturating_sub(1);
        if self.selected.as_ref().is_some_and(|s| s.id() == id) {
            self.selected = None;
        }
    }

    pub fn snapshot(&self) -> ViewState<E> {
        ViewState {
            items: self.items.clone(),
            total_count: self.total_count,
            phase: self.phase,
            is_loading: self.phase == LoadPhase::Loading,
            is_mutating: self.mutating > 0,
            error: self.error.clone(),
            selected: self.selected.clone(),
        }
    }
}

/// Read model exposed to the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState<E> {
    pub items: Vec<E>,
    pub total_count: u64,
    pub phase: LoadPhase,
    pub is_loading: bool,
    pub is_mutating: bool,
    pub error: Option<String>,
    pub selected: Option<E>,
}
