mod common;

use common::*;
use speculate2::speculate;
use staffing_console::analytics::*;
use staffing_console::capacity::Roster;
use staffing_console::models::*;

speculate! {
    before {
        let apollo = project("Apollo", &[]);
        let gemini = project("Gemini", &[]);
        let idle = employee("Idle", 1.0);
        let half = employee("Half", 1.0);
        let mut over = employee("Over", 1.0);
        over.department = "Sales".to_string();
        let mut gone = employee("Gone", 1.0);
        gone.status = EmployeeStatus::Inactive;

        let mut internal = allocation(&half, &gemini, 0.25, "2025-01-01", None);
        internal.billable = false;
        let allocations = vec![
            allocation(&half, &apollo, 0.25, "2025-01-01", None),
            internal,
            allocation(&over, &apollo, 0.75, "2025-01-01", None),
            allocation(&over, &gemini, 0.5, "2025-01-01", None),
            allocation(&gone, &apollo, 1.0, "2025-01-01", None),
        ];
        let employees = vec![idle.clone(), half.clone(), over.clone(), gone.clone()];
        let as_of = date("2025-06-15");
    }

    describe "utilization_report" {
        it "buckets active employees by capacity" {
            let report = utilization_report(&employees, &allocations, as_of);

            assert_eq!(report.bench, 1);
            assert_eq!(report.allocated, 1);
            assert_eq!(report.over_allocated, 1);
            assert_eq!(report.inactive, 1);
            assert_eq!(report.rows.len(), 4);
        }

        it "averages utilization over active employees only" {
            let report = utilization_report(&employees, &allocations, as_of);

            assert!((report.average_utilization - (0.0 + 0.5 + 1.25) / 3.0).abs() < 1e-9);
        }

        it "splits billable from non-billable FTE" {
            let report = utilization_report(&employees, &allocations, as_of);

            assert_eq!(report.billable, Fte::new(0.25) + Fte::new(0.75) + Fte::new(0.5));
            assert_eq!(report.non_billable, Fte::new(0.25));
        }

        it "rolls up departments" {
            let report = utilization_report(&employees, &allocations, as_of);

            let engineering = &report.departments["Engineering"];
            assert_eq!(engineering.headcount, 2);
            assert_eq!(engineering.capacity, Fte::new(2.0));
            assert!((engineering.utilization() - 0.25).abs() < 1e-9);
            assert_eq!(report.departments["Sales"].over_allocated, 1);
        }

        it "excludes allocations on deleted projects" {
            let roster = Roster::from_entities(&employees, &[apollo.clone()]);

            let report = utilization_report_with_roster(&employees, &allocations, &roster, as_of);

            assert_eq!(report.over_allocated, 0);
            assert_eq!(report.allocated, 2);
            assert_eq!(report.non_billable, Fte::ZERO);
        }

        it "is empty for an empty roster" {
            let report = utilization_report(&[], &allocations, as_of);

            assert!(report.rows.is_empty());
            assert_eq!(report.average_utilization, 0.0);
            assert!(report.departments.is_empty());
        }
    }
}
