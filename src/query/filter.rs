use std::cmp::Ordering;
use std::collections::HashMap;

use chrono::NaiveDate;
use uuid::Uuid;

use super::state::{QueryState, QuickFilter};
use crate::capacity::{compute_fte_with_roster, FteSummary, Roster};
use crate::models::*;

/// A comparable value extracted from an entity for local sorting.
#[derive(Debug, Clone, PartialEq)]
pub enum SortKey {
    Text(String),
    Number(f64),
    Date(NaiveDate),
    Bool(bool),
}

impl SortKey {
    fn compare(&self, other: &SortKey) -> Ordering {
        match (self, other) {
            (Self::Text(a), Self::Text(b)) => a.to_lowercase().cmp(&b.to_lowercase()),
            (Self::Number(a), Self::Number(b)) => a.total_cmp(b),
            (Self::Date(a), Self::Date(b)) => a.cmp(b),
            (Self::Bool(a), Self::Bool(b)) => a.cmp(b),
            _ => Ordering::Equal,
        }
    }
}

/// Entities that can be searched, filtered and sorted in memory.
///
/// Field names match the wire names used for remote filters, so the same
/// [`QueryState`] drives both paths.
pub trait Queryable {
    /// Fields accepted as equality filters.
    const FILTER_FIELDS: &'static [&'static str];

    /// Values matched by free-text search (any one matching is enough).
    fn search_values(&self) -> Vec<&str>;

    /// Value of a filterable field as its wire string.
    fn field_value(&self, field: &str) -> Option<String>;

    fn sort_key(&self, field: &str) -> Option<SortKey>;
}

impl Queryable for Employee {
    const FILTER_FIELDS: &'static [&'static str] = &["department", "designation", "status"];

    fn search_values(&self) -> Vec<&str> {
        vec![self.name.as_str(), self.email.as_str(), self.employee_id.as_str()]
    }

    fn field_value(&self, field: &str) -> Option<String> {
        match field {
            "department" => Some(self.department.clone()),
            "designation" => Some(self.designation.clone()),
            "status" => Some(self.status.as_str().to_string()),
            _ => None,
        }
    }

    fn sort_key(&self, field: &str) -> Option<SortKey> {
        match field {
            "name" => Some(SortKey::Text(self.name.clone())),
            "employeeId" => Some(SortKey::Text(self.employee_id.clone())),
            "email" => Some(SortKey::Text(self.email.clone())),
            "department" => Some(SortKey::Text(self.department.clone())),
            "designation" => Some(SortKey::Text(self.designation.clone())),
            "status" => Some(SortKey::Text(self.status.as_str().to_string())),
            "maxFTE" => Some(SortKey::Number(self.max_fte.fraction())),
            _ => None,
        }
    }
}

impl Queryable for Project {
    const FILTER_FIELDS: &'static [&'static str] = &["status", "priority", "client"];

    fn search_values(&self) -> Vec<&str> {
        vec![self.name.as_str(), self.client.as_str()]
    }

    fn field_value(&self, field: &str) -> Option<String> {
        match field {
            "status" => Some(self.status.as_str().to_string()),
            "priority" => Some(self.priority.as_str().to_string()),
            "client" => Some(self.client.clone()),
            _ => None,
        }
    }

    fn sort_key(&self, field: &str) -> Option<SortKey> {
        match field {
            "name" => Some(SortKey::Text(self.name.clone())),
            "client" => Some(SortKey::Text(self.client.clone())),
            "status" => Some(SortKey::Text(self.status.as_str().to_string())),
            // Ranked, not alphabetical: LOW < MEDIUM < HIGH < CRITICAL.
            "priority" => Some(SortKey::Number(self.priority as u8 as f64)),
            "startDate" => self.start_date.map(SortKey::Date),
            "endDate" => self.end_date.map(SortKey::Date),
            _ => None,
        }
    }
}

impl Queryable for Allocation {
    const FILTER_FIELDS: &'static [&'static str] = &["employeeId", "projectId", "billable"];

    fn search_values(&self) -> Vec<&str> {
        vec![self.role.as_str()]
    }

    fn field_value(&self, field: &str) -> Option<String> {
        match field {
            "employeeId" => Some(self.employee_id.to_string()),
            "projectId" => Some(self.project_id.to_string()),
            "billable" => Some(self.billable.to_string()),
            _ => None,
        }
    }

    fn sort_key(&self, field: &str) -> Option<SortKey> {
        match field {
            "role" => Some(SortKey::Text(self.role.clone())),
            "fte" | "allocationPercentage" => Some(SortKey::Number(self.fte.fraction())),
            "startDate" => Some(SortKey::Date(self.start_date)),
            "endDate" => self.end_date.map(SortKey::Date),
            "billable" => Some(SortKey::Bool(self.billable)),
            _ => None,
        }
    }
}

impl Queryable for Skill {
    const FILTER_FIELDS: &'static [&'static str] = &["category"];

    fn search_values(&self) -> Vec<&str> {
        vec![self.name.as_str(), self.category.as_str()]
    }

    fn field_value(&self, field: &str) -> Option<String> {
        match field {
            "category" => Some(self.category.clone()),
            _ => None,
        }
    }

    fn sort_key(&self, field: &str) -> Option<SortKey> {
        match field {
            "name" => Some(SortKey::Text(self.name.clone())),
            "category" => Some(SortKey::Text(self.category.clone())),
            _ => None,
        }
    }
}

/// Case-insensitive substring match across the entity's search fields.
pub fn matches_search<E: Queryable>(entity: &E, search: &str) -> bool {
    let needle = search.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }
    entity
        .search_values()
        .iter()
        .any(|value| value.to_lowercase().contains(&needle))
}

/// Every filter must match exactly. Filters on fields the entity does not
/// declare never match.
pub fn matches_filters<E: Queryable>(entity: &E, state: &QueryState) -> bool {
    state
        .field_filters()
        .iter()
        .all(|(field, expected)| entity.field_value(field).as_deref() == Some(expected.as_str()))
}

/// Filters, sorts and pages `items` in memory.
///
/// `predicate` carries any derived-state condition (e.g. a quick filter).
/// Sorting applies to the filtered rows, before paging.
pub fn resolve_local<E, P>(items: &[E], state: &QueryState, predicate: P) -> Page<E>
where
    E: Queryable + Clone,
    P: Fn(&E) -> bool,
{
    let mut rows: Vec<&E> = items
        .iter()
        .filter(|e| matches_filters(*e, state))
        .filter(|e| matches_search(*e, state.search()))
        .filter(|e| predicate(*e))
        .collect();

    if let Some(sort) = state.sort() {
        rows.sort_by(|a, b| {
            let ordering = match (a.sort_key(&sort.field), b.sort_key(&sort.field)) {
                (Some(a), Some(b)) => a.compare(&b),
                // Rows without a value sort last in either direction.
                (Some(_), None) => return Ordering::Less,
                (None, Some(_)) => return Ordering::Greater,
                (None, None) => Ordering::Equal,
            };
            match sort.direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            }
        });
    }

    let total = rows.len() as u64;
    let page = rows
        .into_iter()
        .skip(state.offset())
        .take(state.page_size() as usize)
        .cloned()
        .collect();
    Page::new(page, total)
}

/// Whether an employee's FTE summary satisfies a quick filter.
pub fn matches_quick_filter(summary: &FteSummary, quick_filter: QuickFilter) -> bool {
    match quick_filter {
        QuickFilter::All => true,
        QuickFilter::Bench => summary.is_bench(),
        QuickFilter::Allocated => summary.is_allocated(),
        QuickFilter::OverAllocated => summary.over_allocated,
    }
}

/// Resolves an employee view, including its quick filter, against a locally
/// held employee set and the allocations needed to derive FTE.
///
/// Allocations outside `roster` are orphans and never count toward FTE.
pub fn resolve_employees(
    employees: &[Employee],
    allocations: &[Allocation],
    roster: &Roster,
    state: &QueryState,
    as_of: NaiveDate,
) -> Page<Employee> {
    let summaries: HashMap<Uuid, FteSummary> = employees
        .iter()
        .map(|e| (e.id, compute_fte_with_roster(e, allocations, roster, as_of)))
        .collect();

    resolve_local(employees, state, |e: &Employee| {
        summaries
            .get(&e.id)
            .is_some_and(|s| matches_quick_filter(s, state.quick_filter()))
    })
}
