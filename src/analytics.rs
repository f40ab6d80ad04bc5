//! Utilization reporting across the whole roster.
//!
//! Built entirely on [`crate::capacity`]; nothing here talks to the remote.
//! Inactive employees get a row but are left out of the bench, allocated and
//! over-allocated counts and out of the average.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

use crate::capacity::{active_allocations, compute_fte_with_roster, FteSummary, Roster};
use crate::models::{Allocation, Employee, EmployeeStatus, Fte};

/// One employee's line in a [`UtilizationReport`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UtilizationRow {
    pub employee_id: Uuid,
    pub name: String,
    pub department: String,
    pub status: EmployeeStatus,
    #[serde(flatten)]
    pub summary: FteSummary,
    pub billable: Fte,
    pub non_billable: Fte,
}

/// Aggregates for one department.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentRollup {
    pub headcount: usize,
    pub committed: Fte,
    pub capacity: Fte,
    pub over_allocated: usize,
}

impl DepartmentRollup {
    pub fn utilization(&self) -> f64 {
        if self.capacity.fraction() <= 0.0 {
            0.0
        } else {
            self.committed.fraction() / self.capacity.fraction()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UtilizationReport {
    pub as_of: NaiveDate,
    pub rows: Vec<UtilizationRow>,
    pub bench: usize,
    pub allocated: usize,
    pub over_allocated: usize,
    pub inactive: usize,
    /// Mean of `current / max` over active employees; 0 when there are none.
    pub average_utilization: f64,
    pub billable: Fte,
    pub non_billable: Fte,
    /// Active employees only, keyed by department name.
    pub departments: BTreeMap<String, DepartmentRollup>,
}

/// Builds a report treating every project an allocation points at as live.
///
/// Allocations for employees missing from `employees` are still excluded.
pub fn utilization_report(
    employees: &[Employee],
    allocations: &[Allocation],
    as_of: NaiveDate,
) -> UtilizationReport {
    let roster = Roster::new(
        employees.iter().map(|e| e.id),
        allocations.iter().map(|a| a.project_id),
    );
    utilization_report_with_roster(employees, allocations, &roster, as_of)
}

/// Builds a report counting only allocations whose employee and project are
/// both in `roster`.
pub fn utilization_report_with_roster(
    employees: &[Employee],
    allocations: &[Allocation],
    roster: &Roster,
    as_of: NaiveDate,
) -> UtilizationReport {
    let mut report = UtilizationReport {
        as_of,
        rows: Vec::with_capacity(employees.len()),
        bench: 0,
        allocated: 0,
        over_allocated: 0,
        inactive: 0,
        average_utilization: 0.0,
        billable: Fte::ZERO,
        non_billable: Fte::ZERO,
        departments: BTreeMap::new(),
    };
    let mut utilization_sum = 0.0;

    for employee in employees {
        let summary = compute_fte_with_roster(employee, allocations, roster, as_of);
        let (billable, non_billable) = billable_split(employee, allocations, roster, as_of);

        if employee.is_active() {
            if summary.over_allocated {
                report.over_allocated += 1;
            } else if summary.is_bench() {
                report.bench += 1;
            } else {
                report.allocated += 1;
            }
            utilization_sum += summary.utilization();
            report.billable = report.billable + billable;
            report.non_billable = report.non_billable + non_billable;

            let dept = report
                .departments
                .entry(employee.department.clone())
                .or_default();
            dept.headcount += 1;
            dept.committed = dept.committed + summary.current;
            dept.capacity = dept.capacity + summary.max;
            if summary.over_allocated {
                dept.over_allocated += 1;
            }
        } else {
            report.inactive += 1;
        }

        report.rows.push(UtilizationRow {
            employee_id: employee.id,
            name: employee.name.clone(),
            department: employee.department.clone(),
            status: employee.status,
            summary,
            billable,
            non_billable,
        });
    }

    let active = employees.len() - report.inactive;
    if active > 0 {
        report.average_utilization = utilization_sum / active as f64;
    }
    report
}

fn billable_split(
    employee: &Employee,
    allocations: &[Allocation],
    roster: &Roster,
    as_of: NaiveDate,
) -> (Fte, Fte) {
    active_allocations(employee.id, allocations, as_of)
        .filter(|a| roster.is_valid(a))
        .fold((Fte::ZERO, Fte::ZERO), |(billable, other), a| {
            if a.billable {
                (billable + a.fte, other)
            } else {
                (billable, other + a.fte)
            }
        })
}
