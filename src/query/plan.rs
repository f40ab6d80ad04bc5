use chrono::NaiveDate;

use super::filter::{resolve_employees, resolve_local, Queryable};
use super::state::{QueryState, QuickFilter};
use crate::capacity::Roster;
use crate::error::CoreError;
use crate::models::{Allocation, Employee, Entity, ListQuery, Page, Project};
use crate::store::{Outcome, Remote, Store};

/// Default size of the broad fetch that backs local filtering.
pub const DEFAULT_BROAD_FETCH_SIZE: u32 = 1000;

/// How a [`QueryState`] will be resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryPlan {
    /// Send this query and use the server's page.
    Remote(ListQuery),
    /// Fetch this broad query, then filter, sort and page locally.
    Local { fetch: ListQuery },
}

impl QueryPlan {
    pub fn is_local(&self) -> bool {
        matches!(self, Self::Local { .. })
    }
}

/// Plans and runs list queries against stores.
#[derive(Debug, Clone, Copy)]
pub struct Combinator {
    broad_fetch_size: u32,
}

impl Default for Combinator {
    fn default() -> Self {
        Self::new(DEFAULT_BROAD_FETCH_SIZE)
    }
}

impl Combinator {
    pub fn new(broad_fetch_size: u32) -> Self {
        Self {
            broad_fetch_size: broad_fetch_size.max(1),
        }
    }

    pub fn broad_fetch_size(&self) -> u32 {
        self.broad_fetch_size
    }

    /// Decides between the remote and the local path for `E`.
    ///
    /// Filters on fields `E` does not declare are dropped.
    pub fn plan<E: Queryable>(&self, state: &QueryState) -> QueryPlan {
        let mut filters = state.field_filters().clone();
        filters.retain(|field, _| {
            let known = E::FILTER_FIELDS.contains(&field.as_str());
            if !known {
                tracing::warn!(field = %field, "Ignoring filter on undeclared field");
            }
            known
        });

        let needs_local =
            state.quick_filter() != QuickFilter::All || !state.search().trim().is_empty();

        if needs_local {
            QueryPlan::Local {
                fetch: ListQuery {
                    page: Some(0),
                    size: Some(self.broad_fetch_size),
                    sort: None,
                    filters,
                },
            }
        } else {
            QueryPlan::Remote(ListQuery {
                page: Some(state.page()),
                size: Some(state.page_size()),
                sort: state.sort().cloned(),
                filters,
            })
        }
    }

    /// Resolves a view of any collection. Quick filters only apply to
    /// employees (see [`Combinator::run_employees`]) and are ignored here.
    ///
    /// A page past the end of the result is clamped before the page is
    /// built, so the returned rows always belong to `state.page()`.
    pub async fn run<E, R>(&self, store: &Store<E, R>, state: &mut QueryState) -> Outcome<Page<E>>
    where
        E: Entity + Queryable,
        R: Remote<E>,
    {
        match self.plan::<E>(state) {
            QueryPlan::Remote(query) => run_remote(store, state, query).await,
            QueryPlan::Local { fetch } => {
                let outcome = store.list(fetch).await;
                outcome.map(|broad| {
                    warn_if_truncated(&broad, self.broad_fetch_size);
                    resolve_clamped(state, |state| resolve_local(&broad.items, state, |_| true))
                })
            }
        }
    }

    /// Resolves an employee view, deriving FTE from the allocation and
    /// project collections when a quick filter is active.
    ///
    /// Allocations and projects are read through [`Store::fetch`], so their
    /// own views keep their cached pages and in-flight requests. Allocations
    /// on projects that no longer exist are ignored.
    pub async fn run_employees<R, A, P>(
        &self,
        employees: &Store<Employee, R>,
        allocations: &Store<Allocation, A>,
        projects: &Store<Project, P>,
        state: &mut QueryState,
        as_of: NaiveDate,
    ) -> Outcome<Page<Employee>>
    where
        R: Remote<Employee>,
        A: Remote<Allocation>,
        P: Remote<Project>,
    {
        let fetch = match self.plan::<Employee>(state) {
            QueryPlan::Remote(query) => return run_remote(employees, state, query).await,
            QueryPlan::Local { fetch } => fetch,
        };

        let outcome = employees.list(fetch).await;
        let staff = match outcome.data {
            Some(page) if outcome.success => page,
            _ => return outcome,
        };
        warn_if_truncated(&staff, self.broad_fetch_size);

        let (committed, roster) = if state.quick_filter() == QuickFilter::All {
            (Vec::new(), Roster::default())
        } else {
            let broad = ListQuery::paged(0, self.broad_fetch_size);
            let committed = match allocations.fetch(&broad).await {
                Ok(page) => page,
                Err(e) => return Outcome::failed(CoreError::remote(e, "Failed to load allocations")),
            };
            let known = match projects.fetch(&broad).await {
                Ok(page) => page,
                Err(e) => return Outcome::failed(CoreError::remote(e, "Failed to load projects")),
            };
            warn_if_truncated(&committed, self.broad_fetch_size);
            warn_if_truncated(&known, self.broad_fetch_size);
            let roster = Roster::from_entities(&staff.items, &known.items);
            (committed.items, roster)
        };

        let page = resolve_clamped(state, |state| {
            resolve_employees(&staff.items, &committed, &roster, state, as_of)
        });
        Outcome::ok(page)
    }
}

/// Lists one server page, re-issuing the request once if the requested page
/// lies past the end of the reported total.
async fn run_remote<E, R>(store: &Store<E, R>, state: &mut QueryState, mut query: ListQuery) -> Outcome<Page<E>>
where
    E: Entity,
    R: Remote<E>,
{
    let requested = state.page();
    let outcome = store.list(query.clone()).await;
    let total = outcome.data.as_ref().map(|page| page.total);
    let Some(total) = total else {
        return outcome;
    };
    state.set_total_count(total);
    if state.page() == requested {
        return outcome;
    }

    tracing::debug!(requested, clamped = state.page(), total, "Requested page past the end, refetching");
    query.page = Some(state.page());
    let outcome = store.list(query).await;
    if let Some(ref page) = outcome.data {
        state.set_total_count(page.total);
    }
    outcome
}

/// Records the result size on `state`, re-resolving when that moves the
/// current page.
fn resolve_clamped<T>(state: &mut QueryState, resolve: impl Fn(&QueryState) -> Page<T>) -> Page<T> {
    let requested = state.page();
    let page = resolve(state);
    state.set_total_count(page.total);
    if state.page() == requested {
        page
    } else {
        resolve(state)
    }
}

fn warn_if_truncated<T>(page: &Page<T>, broad_fetch_size: u32) {
    if page.total > page.items.len() as u64 {
        tracing::warn!(
            fetched = page.items.len(),
            total = page.total,
            broad_fetch_size,
            "Broad fetch did not cover the whole collection; local results are partial"
        );
    }
}
