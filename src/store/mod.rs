//! View-state store: the cached, remote-backed copy of one entity collection.
//!
//! Each collection (employees, projects, allocations, skills) gets its own
//! [`Store`]. A store is a cheap handle: clones share the same state, so it
//! can be passed to every consumer that needs the collection.
//!
//! # Consistency rules
//!
//! - Writes are never applied optimistically. The cache changes only after
//!   the server confirms, and is left untouched on failure.
//! - List and detail reads are last-write-wins by *issue* order. Each request
//!   takes a sequence number; a response is applied only if no newer request
//!   of the same kind was issued in the meantime.
//! - The lock is never held across a remote call.

mod outcome;
mod remote;
mod state;

pub use outcome::Outcome;
pub use remote::Remote;
pub use state::{LoadPhase, ViewState};

use std::marker::PhantomData;
use std::sync::{Arc, Mutex, MutexGuard};

use uuid::Uuid;

use crate::capacity::{check_capacity, CapacityPolicy, Commitment};
use crate::error::{CoreError, RemoteError, ValidationError};
use crate::models::*;
use crate::skills::validate_assignment;
use crate::validation::Validate;
use state::CollectionState;

/// Cached state and remote operations for one collection.
pub struct Store<E, R> {
    remote: Arc<R>,
    state: Arc<Mutex<CollectionState<E>>>,
    _kind: PhantomData<fn() -> E>,
}

impl<E, R> Clone for Store<E, R> {
    fn clone(&self) -> Self {
        Self {
            remote: Arc::clone(&self.remote),
            state: Arc::clone(&self.state),
            _kind: PhantomData,
        }
    }
}

impl<E: Entity, R: Remote<E>> Store<E, R> {
    pub fn new(remote: R) -> Self {
        Self::from_shared(Arc::new(remote))
    }

    pub fn from_shared(remote: Arc<R>) -> Self {
        Self {
            remote,
            state: Arc::new(Mutex::new(CollectionState::default())),
            _kind: PhantomData,
        }
    }

    fn remote(&self) -> &R {
        &self.remote
    }

    fn lock(&self) -> MutexGuard<'_, CollectionState<E>> {
        self.state.lock().expect("store lock poisoned")
    }

    // ============================================================
    // Read model
    // ============================================================

    pub fn snapshot(&self) -> ViewState<E> {
        self.lock().snapshot()
    }

    pub fn items(&self) -> Vec<E> {
        self.lock().items.clone()
    }

    pub fn total_count(&self) -> u64 {
        self.lock().total_count
    }

    pub fn phase(&self) -> LoadPhase {
        self.lock().phase
    }

    pub fn error(&self) -> Option<String> {
        self.lock().error.clone()
    }

    pub fn selected(&self) -> Option<E> {
        self.lock().selected.clone()
    }

    pub fn find(&self, id: Uuid) -> Option<E> {
        let state = self.lock();
        state.position(id).map(|i| state.items[i].clone())
    }

    pub fn last_query(&self) -> Option<ListQuery> {
        self.lock().last_query.clone()
    }

    /// Marks a cached entity as the selected/detail reference.
    pub fn select(&self, id: Uuid) -> bool {
        let mut state = self.lock();
        match state.position(id) {
            Some(index) => {
                state.selected = Some(state.items[index].clone());
                true
            }
            None => false,
        }
    }

    pub fn clear_selection(&self) {
        self.lock().selected = None;
    }

    pub fn clear_error(&self) {
        self.lock().error = None;
    }

    // ============================================================
    // Reads
    // ============================================================

    /// Fetches a page and replaces the cached collection with it.
    ///
    /// If another `list` is issued before this one resolves, this response
    /// is discarded regardless of which one completes first.
    pub async fn list(&self, query: ListQuery) -> Outcome<Page<E>> {
        let seq = {
            let mut state = self.lock();
            state.list_seq += 1;
            state.phase = LoadPhase::Loading;
            state.error = None;
            state.last_query = Some(query.clone());
            state.list_seq
        };
        tracing::debug!(kind = E::KIND.path(), seq, ?query, "Issuing list request");

        let result = self.remote().list(&query).await;

        let mut state = self.lock();
        if seq != state.list_seq {
            tracing::debug!(
                kind = E::KIND.path(),
                seq,
                latest = state.list_seq,
                "Discarding stale list response"
            );
            return Outcome::discarded();
        }

        match result {
            Ok(page) => {
                state.items = page.items.clone();
                state.total_count = page.total;
                state.phase = LoadPhase::Ready;
                Outcome::ok(page)
            }
            Err(e) => {
                tracing::warn!(kind = E::KIND.path(), error = %e, "List request failed");
                let error = CoreError::remote(e, format!("Failed to load {}", E::KIND.path()));
                state.phase = LoadPhase::Error;
                state.error = Some(error.to_string());
                Outcome::failed(error)
            }
        }
    }

    /// Reads a page straight from the remote.
    ///
    /// The cache, the sequence numbers and the surfaced error are left as
    /// they are, so a derivation can read this collection without
    /// disturbing the view that shows it.
    pub async fn fetch(&self, query: &ListQuery) -> Result<Page<E>, RemoteError> {
        tracing::debug!(kind = E::KIND.path(), ?query, "Issuing detached list request");
        self.remote().list(query).await
    }

    /// Re-issues the most recent list query (or the default query).
    pub async fn refresh(&self) -> Outcome<Page<E>> {
        let query = self.last_query().unwrap_or_default();
        self.list(query).await
    }

    /// Fetches one entity and makes it the selected reference.
    ///
    /// The cached row with the same id is refreshed too.
    pub async fn get(&self, id: Uuid) -> Outcome<E> {
        let seq = {
            let mut state = self.lock();
            state.detail_seq += 1;
            state.detail_seq
        };

        let result = self.remote().get(id).await;

        let mut state = self.lock();
        if seq != state.detail_seq {
            tracing::debug!(kind = E::KIND.path(), %id, "Discarding stale detail response");
            return Outcome::discarded();
        }

        match result {
            Ok(entity) => {
                if let Some(index) = state.position(id) {
                    state.items[index] = entity.clone();
                }
                state.selected = Some(entity.clone());
                Outcome::ok(entity)
            }
            Err(e) => {
                tracing::warn!(kind = E::KIND.path(), %id, error = %e, "Detail request failed");
                let error = CoreError::remote(e, format!("Failed to load {}", E::KIND.noun()));
                state.error = Some(error.to_string());
                Outcome::failed(error)
            }
        }
    }

    // ============================================================
    // Mutations
    // ============================================================

    /// Clears the surfaced error and runs local validation.
    ///
    /// The returned guard counts the write as in flight until it is dropped,
    /// including when the calling future is cancelled.
    fn begin(&self, validation: Result<(), Vec<ValidationError>>) -> Result<Mutating<E>, CoreError> {
        let mut state = self.lock();
        state.error = None;
        validation.map_err(CoreError::Validation)?;
        state.mutating += 1;
        Ok(Mutating {
            state: Arc::clone(&self.state),
        })
    }

    /// Records a failed remote write as the single surfaced error.
    fn fail(&self, state: &mut CollectionState<E>, e: RemoteError, verb: &str) -> CoreError {
        tracing::warn!(kind = E::KIND.path(), error = %e, "Failed to {} {}", verb, E::KIND.noun());
        let error = CoreError::remote(e, format!("Failed to {} {}", verb, E::KIND.noun()));
        state.error = Some(error.to_string());
        error
    }

    /// Creates an entity. Nothing is added to the cache until the server
    /// confirms; the confirmed entity is then prepended.
    pub async fn create(&self, input: E::Create) -> Outcome<E> {
        let mutating = match self.begin(input.validate()) {
            Ok(guard) => guard,
            Err(e) => return Outcome::failed(e),
        };

        let result = self.remote().create(&input).await;

        drop(mutating);
        let mut state = self.lock();
        match result {
            Ok(entity) => {
                if state.prepend(entity.clone()) {
                    state.total_count += 1;
                }
                tracing::debug!(kind = E::KIND.path(), id = %entity.id(), "Created");
                Outcome::ok(entity)
            }
            Err(e) => Outcome::failed(self.fail(&mut state, e, "create")),
        }
    }

    /// Updates an entity. The cached row and the selected reference are
    /// replaced together with the server's version.
    pub async fn update(&self, id: Uuid, input: E::Update) -> Outcome<E> {
        let mutating = match self.begin(input.validate()) {
            Ok(guard) => guard,
            Err(e) => return Outcome::failed(e),
        };

        let result = self.remote().update(id, &input).await;

        drop(mutating);
        let mut state = self.lock();
        match result {
            Ok(entity) => {
                state.replace(entity.clone());
                tracing::debug!(kind = E::KIND.path(), %id, "Updated");
                Outcome::ok(entity)
            }
            Err(e) => Outcome::failed(self.fail(&mut state, e, "update")),
        }
    }

    /// Deletes an entity and clears the selection if it pointed at it.
    pub async fn delete(&self, id: Uuid) -> Outcome<()> {
        let mutating = match self.begin(Ok(())) {
            Ok(guard) => guard,
            Err(e) => return Outcome::failed(e),
        };

        let result = self.remote().delete(id).await;

        drop(mutating);
        let mut state = self.lock();
        match result {
            Ok(()) => {
                state.remove(id);
                tracing::debug!(kind = E::KIND.path(), %id, "Deleted");
                Outcome::ok(())
            }
            Err(e) => Outcome::failed(self.fail(&mut state, e, "delete")),
        }
    }
}

/// Marks one write as in flight for as long as it lives.
struct Mutating<E> {
    state: Arc<Mutex<CollectionState<E>>>,
}

impl<E> Drop for Mutating<E> {
    fn drop(&mut self) {
        if let Ok(mut state) = self.state.lock() {
            state.mutating = state.mutating.saturating_sub(1);
        }
    }
}

/// Cross-entity facts needed to validate an allocation write.
#[derive(Debug, Clone, Copy)]
pub struct AllocationContext<'a> {
    /// The project the allocation points at.
    pub project: &'a Project,
    /// The employee, when capacity should be checked.
    pub employee: Option<&'a Employee>,
    /// The employee's other allocations.
    pub existing: &'a [Allocation],
    pub policy: CapacityPolicy,
}

impl<'a> AllocationContext<'a> {
    pub fn new(project: &'a Project) -> Self {
        Self {
            project,
            employee: None,
            existing: &[],
            policy: CapacityPolicy::Advisory,
        }
    }

    pub fn with_capacity(
        mut self,
        employee: &'a Employee,
        existing: &'a [Allocation],
        policy: CapacityPolicy,
    ) -> Self {
        self.employee = Some(employee);
        self.existing = existing;
        self.policy = policy;
        self
    }

    fn check(&self, project_id: Uuid, assigned: &[Uuid], candidate: Option<Commitment>) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        if project_id != self.project.id {
            // The tech stack in hand belongs to another project.
            errors.push(ValidationError::ProjectMismatch {
                expected: self.project.id,
                actual: project_id,
            });
        } else if let Err(mismatch) = validate_assignment(assigned, self.project) {
            errors.push(ValidationError::from(mismatch));
        }
        if let (Some(employee), Some(candidate)) = (self.employee, candidate) {
            if let Err(e) = check_capacity(employee, self.existing, candidate, self.policy) {
                errors.push(e);
            }
        }
        errors
    }
}

impl<R: Remote<Allocation>> Store<Allocation, R> {
    /// Creates an allocation after checking skills against the project's
    /// tech stack and, when an employee is given, capacity.
    pub async fn create_checked(&self, input: CreateAllocationInput, ctx: &AllocationContext<'_>) -> Outcome<Allocation> {
        let mut errors = input.validate().err().unwrap_or_default();
        errors.extend(ctx.check(
            input.project_id,
            &input.assigned_skills,
            Some(Commitment::from(&input)),
        ));
        if !errors.is_empty() {
            self.clear_error();
            return Outcome::failed(errors);
        }
        self.create(input).await
    }

    /// Updates an allocation with the same checks as [`Store::create_checked`].
    ///
    /// Fields missing from a partial patch are taken from the cached row.
    pub async fn update_checked(
        &self,
        id: Uuid,
        input: UpdateAllocationInput,
        ctx: &AllocationContext<'_>,
    ) -> Outcome<Allocation> {
        let cached = self.find(id);
        let mut errors = input.validate().err().unwrap_or_default();

        let project_id = input
            .project_id
            .or(cached.as_ref().map(|a| a.project_id))
            .unwrap_or(ctx.project.id);
        let assigned = input
            .assigned_skills
            .clone()
            .or(cached.as_ref().map(|a| a.assigned_skills.clone()))
            .unwrap_or_default();

        let start = input.start_date.or(cached.as_ref().map(|a| a.start_date));
        let fte = input.fte.or(cached.as_ref().map(|a| a.fte));
        let end = match input.end_date {
            Some(end) => end,
            None => cached.as_ref().and_then(|a| a.end_date),
        };
        let candidate = match (start, fte) {
            (Some(start), Some(fte)) => {
                if end.is_some_and(|end| end < start) {
                    errors.push(ValidationError::DateOrder { field: "endDate" });
                }
                Some(Commitment {
                    id: Some(id),
                    start,
                    end,
                    fte,
                })
            }
            _ => None,
        };

        errors.extend(ctx.check(project_id, &assigned, candidate));
        errors.dedup();
        if !errors.is_empty() {
            self.clear_error();
            return Outcome::failed(errors);
        }
        self.update(id, input).await
    }
}
