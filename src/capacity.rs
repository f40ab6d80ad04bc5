//! FTE and availability calculations.
//!
//! Every function here is pure: same inputs, same outputs, no rounding of
//! stored fractions. Rounding happens only in display helpers.
//!
//! An employee's *current* FTE is the sum of `fte` over their allocations
//! whose inclusive date range contains the reference date. Open-ended
//! allocations extend into the unbounded future.

use std::collections::{BTreeSet, HashSet};

use chrono::{Local, NaiveDate};
use serde::Serialize;
use uuid::Uuid;

use crate::error::ValidationError;
use crate::models::{Allocation, CreateAllocationInput, Employee, Fte, Project};

/// Committed and remaining capacity of one employee at one date.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FteSummary {
    pub current: Fte,
    pub available: Fte,
    pub max: Fte,
    /// `current > max`. Equality is fully allocated, not over-allocated.
    pub over_allocated: bool,
}

impl FteSummary {
    pub fn is_bench(&self) -> bool {
        self.current.is_zero()
    }

    /// `0 < current <= max`.
    pub fn is_allocated(&self) -> bool {
        !self.is_bench() && !self.over_allocated
    }

    /// Committed share of capacity (1.0 = fully allocated).
    pub fn utilization(&self) -> f64 {
        if self.max.fraction() <= 0.0 {
            0.0
        } else {
            self.current.fraction() / self.max.fraction()
        }
    }

    /// Utilization as a percentage rounded to two decimals, for display.
    pub fn utilization_percentage(&self) -> f64 {
        (self.utilization() * 10_000.0).round() / 100.0
    }
}

/// Allocations of `employee_id` that are in effect on `as_of`.
pub fn active_allocations<'a>(
    employee_id: Uuid,
    allocations: &'a [Allocation],
    as_of: NaiveDate,
) -> impl Iterator<Item = &'a Allocation> + 'a {
    allocations
        .iter()
        .filter(move |a| a.employee_id == employee_id && a.is_active_on(as_of))
}

/// Computes current, available and over-allocated FTE for `employee` at `as_of`.
///
/// `allocations` may be the full set; entries for other employees are ignored.
pub fn compute_fte(employee: &Employee, allocations: &[Allocation], as_of: NaiveDate) -> FteSummary {
    let current: Fte = active_allocations(employee.id, allocations, as_of)
        .map(|a| a.fte)
        .sum();
    summarize(current, employee.max_fte)
}

/// [`compute_fte`] as of today's local date.
pub fn compute_fte_now(employee: &Employee, allocations: &[Allocation]) -> FteSummary {
    compute_fte(employee, allocations, today())
}

/// [`compute_fte`] ignoring allocations that reference unknown employees or projects.
pub fn compute_fte_with_roster(
    employee: &Employee,
    allocations: &[Allocation],
    roster: &Roster,
    as_of: NaiveDate,
) -> FteSummary {
    let current: Fte = active_allocations(employee.id, allocations, as_of)
        .filter(|a| roster.is_valid(a))
        .map(|a| a.fte)
        .sum();
    summarize(current, employee.max_fte)
}

fn summarize(current: Fte, max: Fte) -> FteSummary {
    FteSummary {
        current,
        available: max.saturating_sub(current),
        max,
        over_allocated: current.exceeds(max),
    }
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// The set of employee and project ids known to exist.
///
/// Allocations pointing outside the roster are orphans (their employee or
/// project was deleted) and must not count toward anyone's FTE.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    employees: HashSet<Uuid>,
    projects: HashSet<Uuid>,
}

impl Roster {
    pub fn new(
        employees: impl IntoIterator<Item = Uuid>,
        projects: impl IntoIterator<Item = Uuid>,
    ) -> Self {
        Self {
            employees: employees.into_iter().collect(),
            projects: projects.into_iter().collect(),
        }
    }

    pub fn from_entities(employees: &[Employee], projects: &[Project]) -> Self {
        Self::new(
            employees.iter().map(|e| e.id),
            projects.iter().map(|p| p.id),
        )
    }

    pub fn is_valid(&self, allocation: &Allocation) -> bool {
        self.employees.contains(&allocation.employee_id)
            && self.projects.contains(&allocation.project_id)
    }

    /// Allocations whose references both resolve.
    pub fn retain_valid(&self, allocations: &[Allocation]) -> Vec<Allocation> {
        allocations
            .iter()
            .filter(|a| self.is_valid(a))
            .cloned()
            .collect()
    }
}

/// A dated FTE commitment, existing or proposed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Commitment {
    /// `None` for an allocation that has not been created yet.
    pub id: Option<Uuid>,
    pub start: NaiveDate,
    pub end: Option<NaiveDate>,
    pub fte: Fte,
}

impl Commitment {
    fn covers(&self, date: NaiveDate) -> bool {
        self.start <= date && self.end.map_or(true, |end| date <= end)
    }
}

impl From<&Allocation> for Commitment {
    fn from(a: &Allocation) -> Self {
        Self {
            id: Some(a.id),
            start: a.start_date,
            end: a.end_date,
            fte: a.fte,
        }
    }
}

impl From<&CreateAllocationInput> for Commitment {
    fn from(input: &CreateAllocationInput) -> Self {
        Self {
            id: None,
            start: input.start_date,
            end: input.end_date,
            fte: input.fte,
        }
    }
}

/// A maximal date range during which an employee's summed FTE exceeds their maximum.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverallocationWindow {
    pub start: NaiveDate,
    /// `None` when the over-allocation never ends (open-ended allocations).
    pub end: Option<NaiveDate>,
    /// Highest summed FTE reached inside the window.
    pub peak: Fte,
}

/// Finds every period in which `employee` is over-allocated.
pub fn overallocation_windows(employee: &Employee, allocations: &[Allocation]) -> Vec<OverallocationWindow> {
    let commitments: Vec<Commitment> = allocations
        .iter()
        .filter(|a| a.employee_id == employee.id)
        .map(Commitment::from)
        .collect();
    windows_over(&commitments, employee.max_fte)
}

/// Sweeps commitment boundaries and collects the ranges above `max`.
pub fn windows_over(commitments: &[Commitment], max: Fte) -> Vec<OverallocationWindow> {
    // Dates where the level can change. An end takes effect the day after.
    let mut boundaries: BTreeSet<NaiveDate> = BTreeSet::new();
    for c in commitments {
        boundaries.insert(c.start);
        if let Some(after_end) = c.end.and_then(|end| end.succ_opt()) {
            boundaries.insert(after_end);
        }
    }

    let mut windows = Vec::new();
    let mut open: Option<OverallocationWindow> = None;

    // Level at a boundary is re-summed so it matches compute_fte exactly.
    for &date in &boundaries {
        let level: Fte = commitments
            .iter()
            .filter(|c| c.covers(date))
            .map(|c| c.fte)
            .sum();

        match open.as_mut() {
            Some(window) if level.exceeds(max) => {
                if level > window.peak {
                    window.peak = level;
                }
            }
            Some(window) => {
                window.end = date.pred_opt();
                windows.push(*window);
                open = None;
            }
            None if level.exceeds(max) => {
                open = Some(OverallocationWindow {
                    start: date,
                    end: None,
                    peak: level,
                });
            }
            None => {}
        }
    }

    if let Some(window) = open {
        windows.push(window);
    }
    windows
}

/// Highest summed FTE of `commitments` on any day of `[from, to]`.
///
/// The level only rises at a start date, so it is enough to sample `from`
/// and every start date inside the range.
pub fn peak_fte(commitments: &[Commitment], from: NaiveDate, to: Option<NaiveDate>) -> Fte {
    let level_at = |date: NaiveDate| -> Fte {
        commitments
            .iter()
            .filter(|c| c.covers(date))
            .map(|c| c.fte)
            .sum()
    };

    commitments
        .iter()
        .map(|c| c.start)
        .filter(|&start| start > from && to.map_or(true, |to| start <= to))
        .chain(std::iter::once(from))
        .map(level_at)
        .fold(Fte::ZERO, |peak, level| if level > peak { level } else { peak })
}

/// Whether over-allocation blocks a submission or only warns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CapacityPolicy {
    /// Over-allocation is reported but the write proceeds.
    #[default]
    Advisory,
    /// Over-allocation rejects the write before it reaches the server.
    Strict,
}

/// Outcome of checking a proposed allocation against an employee's capacity.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CapacityCheck {
    /// Highest summed FTE over the proposed allocation's range.
    pub peak: Fte,
    pub max: Fte,
    pub over_allocated: bool,
    /// Over-allocation periods inside the proposed allocation's range.
    pub windows: Vec<OverallocationWindow>,
}

/// Checks `candidate` against `employee`'s other allocations.
///
/// An existing allocation with the candidate's id is replaced (edit case).
/// Under [`CapacityPolicy::Strict`] an over-allocation is an error;
/// otherwise it is returned for display.
pub fn check_capacity(
    employee: &Employee,
    existing: &[Allocation],
    candidate: Commitment,
    policy: CapacityPolicy,
) -> Result<CapacityCheck, ValidationError> {
    let mut commitments: Vec<Commitment> = existing
        .iter()
        .filter(|a| a.employee_id == employee.id && Some(a.id) != candidate.id)
        .map(Commitment::from)
        .collect();
    commitments.push(candidate);

    let peak = peak_fte(&commitments, candidate.start, candidate.end);
    let over_allocated = peak.exceeds(employee.max_fte);
    let windows = windows_over(&commitments, employee.max_fte)
        .into_iter()
        .filter(|w| window_intersects(w, candidate.start, candidate.end))
        .collect();

    if over_allocated {
        match policy {
            CapacityPolicy::Strict => {
                return Err(ValidationError::OverAllocated {
                    peak,
                    max: employee.max_fte,
                });
            }
            CapacityPolicy::Advisory => {
                tracing::warn!(
                    employee = %employee.id,
                    peak = %peak,
                    max = %employee.max_fte,
                    "Allocation over-allocates employee"
                );
            }
        }
    }

    Ok(CapacityCheck {
        peak,
        max: employee.max_fte,
        over_allocated,
        windows,
    })
}

fn window_intersects(window: &OverallocationWindow, start: NaiveDate, end: Option<NaiveDate>) -> bool {
    let window_starts_in_time = end.map_or(true, |end| window.start <= end);
    let window_ends_in_time = window.end.map_or(true, |w_end| start <= w_end);
    window_starts_in_time && window_ends_in_time
}
