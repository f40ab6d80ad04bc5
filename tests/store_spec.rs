mod common;

use std::sync::Arc;
use std::time::Duration;

use common::*;
use staffing_console::capacity::CapacityPolicy;
use staffing_console::error::{RemoteError, ValidationError};
use staffing_console::models::*;
use staffing_console::store::{AllocationContext, LoadPhase, Store};

fn employee_store(items: Vec<Employee>) -> (Arc<FakeRemote<Employee>>, Store<Employee, FakeRemote<Employee>>) {
    let remote = Arc::new(FakeRemote::new(items));
    let store = Store::from_shared(Arc::clone(&remote));
    (remote, store)
}

mod last_write_wins {
    use super::*;

    #[tokio::test]
    async fn keeps_the_newer_request_when_it_resolves_first() {
        let (remote, store) = employee_store(Vec::new());
        let older = remote.gate();
        let newer = remote.gate();
        let a = vec![employee("Stale", 1.0)];
        let b = vec![employee("Fresh", 1.0)];

        let first = store.list(ListQuery::paged(0, 10));
        let second = store.list(ListQuery::paged(1, 10));
        let (stale, fresh) = (Page::new(a, 11), Page::new(b.clone(), 11));
        let driver = async move {
            newer.send(Ok(fresh)).unwrap();
            tokio::task::yield_now().await;
            older.send(Ok(stale)).unwrap();
        };
        let (first, second, ()) = tokio::join!(first, second, driver);

        assert!(first.discarded);
        assert!(second.success);
        assert_eq!(store.items(), b);
        assert_eq!(store.last_query(), Some(ListQuery::paged(1, 10)));
    }

    #[tokio::test]
    async fn discards_the_older_request_even_when_it_resolves_last() {
        let (remote, store) = employee_store(Vec::new());
        let older = remote.gate();
        let newer = remote.gate();
        let a = vec![employee("Stale", 1.0)];
        let b = vec![employee("Fresh", 1.0)];

        let first = store.list(ListQuery::paged(0, 10));
        let second = store.list(ListQuery::paged(1, 10));
        let (stale, fresh) = (Page::new(a, 11), Page::new(b.clone(), 11));
        let driver = async move {
            older.send(Ok(stale)).unwrap();
            tokio::task::yield_now().await;
            newer.send(Ok(fresh)).unwrap();
        };
        let (first, second, ()) = tokio::join!(first, second, driver);

        assert!(first.discarded);
        assert!(first.error.is_none());
        assert!(second.success);
        assert_eq!(store.items(), b);
        assert_eq!(store.phase(), LoadPhase::Ready);
    }

    #[tokio::test]
    async fn drops_a_stale_failure_without_surfacing_it() {
        let (remote, store) = employee_store(Vec::new());
        let older = remote.gate();
        let newer = remote.gate();
        let b = vec![employee("Fresh", 1.0)];

        let first = store.list(ListQuery::default());
        let second = store.list(ListQuery::default());
        let fresh = Page::new(b.clone(), 1);
        let driver = async move {
            newer.send(Ok(fresh)).unwrap();
            tokio::task::yield_now().await;
            older.send(Err(RemoteError::Transport("connection reset".into()))).unwrap();
        };
        let (first, _, ()) = tokio::join!(first, second, driver);

        assert!(first.discarded);
        assert_eq!(store.error(), None);
        assert_eq!(store.items(), b);
    }
}

mod reads {
    use super::*;

    #[tokio::test]
    async fn list_replaces_the_collection_and_total() {
        let people: Vec<_> = (0..12).map(|i| employee(&format!("E{i}"), 1.0)).collect();
        let (_, store) = employee_store(people);

        let outcome = store.list(ListQuery::paged(1, 5)).await;

        assert!(outcome.success);
        assert_eq!(store.items().len(), 5);
        assert_eq!(store.total_count(), 12);
        assert!(!store.snapshot().is_loading);
    }

    #[tokio::test]
    async fn failed_list_sets_the_error_phase() {
        let (remote, store) = employee_store(Vec::new());
        remote.fail_with(RemoteError::rejected(503, "Maintenance window"));

        let outcome = store.list(ListQuery::default()).await;

        assert!(!outcome.success);
        assert_eq!(outcome.error_message().as_deref(), Some("Maintenance window"));
        assert_eq!(store.phase(), LoadPhase::Error);
    }

    #[tokio::test]
    async fn refresh_reissues_the_last_query() {
        let people: Vec<_> = (0..12).map(|i| employee(&format!("E{i}"), 1.0)).collect();
        let (remote, store) = employee_store(people);
        store.list(ListQuery::paged(2, 5)).await;

        remote.items.lock().unwrap().truncate(11);
        store.refresh().await;

        assert_eq!(store.items().len(), 1);
        assert_eq!(store.total_count(), 11);
    }

    #[tokio::test]
    async fn get_selects_and_refreshes_the_cached_row() {
        let alice = employee("Alice", 1.0);
        let (remote, store) = employee_store(vec![alice.clone()]);
        store.list(ListQuery::default()).await;
        remote.items.lock().unwrap()[0].name = "Alice Smith".to_string();

        let outcome = store.get(alice.id).await;

        assert!(outcome.success);
        assert_eq!(store.selected().map(|e| e.name), Some("Alice Smith".to_string()));
        assert_eq!(store.find(alice.id).map(|e| e.name), Some("Alice Smith".to_string()));
    }
}

mod mutations {
    use super::*;

    #[tokio::test]
    async fn create_prepends_the_confirmed_entity() {
        let (_, store) = employee_store(vec![employee("Alice", 1.0)]);
        store.list(ListQuery::default()).await;

        let outcome = store.create(create_employee_input("Bob")).await;

        let bob = outcome.data.expect("Expected the created employee");
        assert_eq!(store.items()[0].id, bob.id);
        assert_eq!(store.total_count(), 2);
        assert!(!store.snapshot().is_mutating);
    }

    #[tokio::test]
    async fn failed_create_leaves_the_collection_untouched() {
        let (remote, store) = employee_store(vec![employee("Alice", 1.0)]);
        store.list(ListQuery::default()).await;
        let before = store.items();
        remote.fail_with(RemoteError::Transport("connection refused".into()));

        let outcome = store.create(create_employee_input("Bob")).await;

        assert!(!outcome.success);
        assert_eq!(store.items(), before);
        assert_eq!(store.total_count(), 1);
        assert_eq!(store.error().as_deref(), Some("Failed to create employee"));
        assert!(!store.snapshot().is_mutating);
    }

    #[tokio::test]
    async fn surfaces_the_server_message_when_one_is_sent() {
        let (remote, store) = employee_store(Vec::new());
        remote.fail_with(RemoteError::rejected(409, "Email already exists"));

        let outcome = store.create(create_employee_input("Bob")).await;

        assert_eq!(outcome.error_message().as_deref(), Some("Email already exists"));
        assert_eq!(store.error().as_deref(), Some("Email already exists"));
    }

    #[tokio::test]
    async fn invalid_input_never_reaches_the_remote() {
        let (remote, store) = employee_store(Vec::new());
        let mut input = create_employee_input("Bob");
        input.name = "  ".to_string();

        let outcome = store.create(input).await;

        assert_eq!(outcome.validation_errors(), &[ValidationError::Required { field: "name" }]);
        assert_eq!(remote.writes(), 0);
        assert_eq!(store.error(), None);
    }

    #[tokio::test]
    async fn update_keeps_the_selection_in_sync() {
        let alice = employee("Alice", 1.0);
        let (_, store) = employee_store(vec![alice.clone(), employee("Bob", 1.0)]);
        store.list(ListQuery::default()).await;
        assert!(store.select(alice.id));

        let patch = UpdateEmployeeInput {
            name: Some("Alice Smith".to_string()),
            ..UpdateEmployeeInput::default()
        };
        let outcome = store.update(alice.id, patch).await;

        assert!(outcome.success);
        assert_eq!(store.find(alice.id), store.selected());
        assert_eq!(store.selected().map(|e| e.name), Some("Alice Smith".to_string()));
    }

    #[tokio::test]
    async fn failed_update_changes_nothing() {
        let alice = employee("Alice", 1.0);
        let (remote, store) = employee_store(vec![alice.clone()]);
        store.list(ListQuery::default()).await;
        store.select(alice.id);
        remote.fail_with(RemoteError::rejected(500, ""));

        let patch = UpdateEmployeeInput {
            name: Some("Alice Smith".to_string()),
            ..UpdateEmployeeInput::default()
        };
        store.update(alice.id, patch).await;

        assert_eq!(store.find(alice.id), Some(alice.clone()));
        assert_eq!(store.selected(), Some(alice));
        assert_eq!(store.error().as_deref(), Some("Failed to update employee"));
    }

    #[tokio::test]
    async fn delete_clears_the_selection() {
        let alice = employee("Alice", 1.0);
        let (_, store) = employee_store(vec![alice.clone(), employee("Bob", 1.0)]);
        store.list(ListQuery::default()).await;
        store.select(alice.id);

        let outcome = store.delete(alice.id).await;

        assert!(outcome.success);
        assert_eq!(store.selected(), None);
        assert_eq!(store.find(alice.id), None);
        assert_eq!(store.total_count(), 1);
    }

    #[tokio::test]
    async fn failed_delete_leaves_everything_in_place() {
        let alice = employee("Alice", 1.0);
        let (remote, store) = employee_store(vec![alice.clone(), employee("Bob", 1.0)]);
        store.list(ListQuery::default()).await;
        store.select(alice.id);
        let before = store.items();
        remote.fail_with(RemoteError::rejected(409, "Employee has active allocations"));

        let outcome = store.delete(alice.id).await;

        assert!(!outcome.success);
        assert_eq!(store.items(), before);
        assert_eq!(store.total_count(), 2);
        assert_eq!(store.selected(), Some(alice));
        assert_eq!(store.error().as_deref(), Some("Employee has active allocations"));
    }

    #[tokio::test]
    async fn successful_mutation_clears_the_previous_error() {
        let (remote, store) = employee_store(Vec::new());
        remote.fail_with(RemoteError::Transport("connection refused".into()));
        store.create(create_employee_input("Bob")).await;
        assert!(store.error().is_some());

        remote.recover();
        let outcome = store.create(create_employee_input("Bob")).await;

        assert!(outcome.success);
        assert_eq!(store.error(), None);
        assert_eq!(store.snapshot().error, None);
    }

    #[tokio::test]
    async fn update_refreshes_a_selection_outside_the_cached_page() {
        let alice = employee("Alice", 1.0);
        let bob = employee("Bob", 1.0);
        let (_, store) = employee_store(vec![alice.clone(), bob.clone()]);
        store.list(ListQuery::paged(1, 1)).await;
        store.get(alice.id).await;
        assert_eq!(store.items(), vec![bob.clone()]);

        let patch = UpdateEmployeeInput {
            name: Some("Alice Smith".to_string()),
            ..UpdateEmployeeInput::default()
        };
        let outcome = store.update(alice.id, patch).await;

        assert!(outcome.success);
        assert_eq!(store.selected().map(|e| e.name), Some("Alice Smith".to_string()));
        assert_eq!(store.items(), vec![bob]);
    }

    #[tokio::test]
    async fn cancelled_write_does_not_stay_in_flight() {
        let (remote, store) = employee_store(Vec::new());
        remote.stall_writes();

        let create = store.create(create_employee_input("Bob"));
        let timed_out = tokio::time::timeout(Duration::from_millis(20), create).await;

        assert!(timed_out.is_err());
        assert_eq!(remote.writes(), 1);
        assert!(!store.snapshot().is_mutating);
        assert!(store.items().is_empty());
    }
}

mod checked_allocations {
    use super::*;

    #[tokio::test]
    async fn strict_capacity_rejects_without_a_remote_call() {
        let alice = employee("Alice", 1.0);
        let apollo = project("Apollo", &[]);
        let existing = vec![allocation(&alice, &apollo, 0.8, "2025-01-01", None)];
        let remote = Arc::new(FakeRemote::new(existing.clone()));
        let store = Store::from_shared(Arc::clone(&remote));
        let ctx = AllocationContext::new(&apollo).with_capacity(&alice, &existing, CapacityPolicy::Strict);

        let outcome = store
            .create_checked(create_input(&alice, &apollo, 0.5, "2025-03-01", None), &ctx)
            .await;

        assert!(!outcome.success);
        assert!(matches!(
            outcome.validation_errors(),
            [ValidationError::OverAllocated { .. }]
        ));
        assert_eq!(remote.writes(), 0);
    }

    #[tokio::test]
    async fn advisory_capacity_lets_the_write_through() {
        let alice = employee("Alice", 1.0);
        let apollo = project("Apollo", &[]);
        let existing = vec![allocation(&alice, &apollo, 0.8, "2025-01-01", None)];
        let remote = Arc::new(FakeRemote::new(existing.clone()));
        let store = Store::from_shared(Arc::clone(&remote));
        let ctx = AllocationContext::new(&apollo).with_capacity(&alice, &existing, CapacityPolicy::Advisory);

        let outcome = store
            .create_checked(create_input(&alice, &apollo, 0.5, "2025-03-01", None), &ctx)
            .await;

        assert!(outcome.success);
        assert_eq!(remote.writes(), 1);
    }

    #[tokio::test]
    async fn rejects_skills_outside_the_tech_stack() {
        let alice = employee("Alice", 1.0);
        let rust = skill("Rust");
        let figma = skill("Figma");
        let apollo = project("Apollo", &[rust.clone()]);
        let remote = Arc::new(FakeRemote::<Allocation>::new(Vec::new()));
        let store = Store::from_shared(Arc::clone(&remote));
        let ctx = AllocationContext::new(&apollo);

        let mut input = create_input(&alice, &apollo, 0.5, "2025-03-01", None);
        input.assigned_skills = vec![rust.id, figma.id];
        let outcome = store.create_checked(input, &ctx).await;

        assert_eq!(
            outcome.validation_errors(),
            &[ValidationError::SkillMismatch(
                staffing_console::error::SkillMismatchError { skill_id: figma.id }
            )]
        );
        assert_eq!(remote.writes(), 0);
    }

    #[tokio::test]
    async fn update_checks_the_merged_allocation() {
        let alice = employee("Alice", 1.0);
        let apollo = project("Apollo", &[]);
        let gemini = project("Gemini", &[]);
        let existing = vec![
            allocation(&alice, &apollo, 0.5, "2025-01-01", None),
            allocation(&alice, &gemini, 0.5, "2025-01-01", None),
        ];
        let remote = Arc::new(FakeRemote::new(existing.clone()));
        let store = Store::from_shared(Arc::clone(&remote));
        store.list(ListQuery::default()).await;
        let ctx = AllocationContext::new(&apollo).with_capacity(&alice, &existing, CapacityPolicy::Strict);

        let grow = UpdateAllocationInput {
            fte: Some(Fte::new(0.75)),
            ..UpdateAllocationInput::default()
        };
        let rejected = store.update_checked(existing[0].id, grow, &ctx).await;

        let shrink = UpdateAllocationInput {
            fte: Some(Fte::new(0.25)),
            ..UpdateAllocationInput::default()
        };
        let accepted = store.update_checked(existing[0].id, shrink, &ctx).await;

        assert!(matches!(
            rejected.validation_errors(),
            [ValidationError::OverAllocated { .. }]
        ));
        assert!(accepted.success);
        assert_eq!(store.find(existing[0].id).map(|a| a.fte), Some(Fte::new(0.25)));
        assert_eq!(remote.writes(), 1);
    }

    #[tokio::test]
    async fn rejects_a_context_built_for_another_project() {
        let alice = employee("Alice", 1.0);
        let a = skill("A");
        let b = skill("B");
        let p1 = project("P1", &[a.clone()]);
        let p2 = project("P2", &[b.clone()]);
        let mut current = allocation(&alice, &p1, 0.5, "2025-01-01", None);
        current.assigned_skills = vec![a.id];
        let remote = Arc::new(FakeRemote::new(vec![current.clone()]));
        let store = Store::from_shared(Arc::clone(&remote));
        store.list(ListQuery::default()).await;

        let move_to_p2 = UpdateAllocationInput {
            project_id: Some(p2.id),
            ..UpdateAllocationInput::default()
        };
        let stale_ctx = store
            .update_checked(current.id, move_to_p2.clone(), &AllocationContext::new(&p1))
            .await;
        let right_ctx = store
            .update_checked(current.id, move_to_p2, &AllocationContext::new(&p2))
            .await;

        assert_eq!(
            stale_ctx.validation_errors(),
            &[ValidationError::ProjectMismatch {
                expected: p1.id,
                actual: p2.id
            }]
        );
        assert_eq!(
            right_ctx.validation_errors(),
            &[ValidationError::SkillMismatch(
                staffing_console::error::SkillMismatchError { skill_id: a.id }
            )]
        );
        assert_eq!(remote.writes(), 0);
    }

    #[tokio::test]
    async fn update_can_reopen_the_end_date() {
        let alice = employee("Alice", 1.0);
        let apollo = project("Apollo", &[]);
        let current = allocation(&alice, &apollo, 0.5, "2025-01-01", Some("2025-06-30"));
        let remote = Arc::new(FakeRemote::new(vec![current.clone()]));
        let store = Store::from_shared(Arc::clone(&remote));
        store.list(ListQuery::default()).await;

        let reopen = UpdateAllocationInput {
            end_date: Some(None),
            ..UpdateAllocationInput::default()
        };
        let outcome = store
            .update_checked(current.id, reopen, &AllocationContext::new(&apollo))
            .await;

        assert!(outcome.success);
        assert_eq!(store.find(current.id).map(|a| a.end_date), Some(None));
    }

    #[tokio::test]
    async fn update_rejects_an_end_before_the_cached_start() {
        let alice = employee("Alice", 1.0);
        let apollo = project("Apollo", &[]);
        let current = allocation(&alice, &apollo, 0.5, "2025-03-01", None);
        let remote = Arc::new(FakeRemote::new(vec![current.clone()]));
        let store = Store::from_shared(Arc::clone(&remote));
        store.list(ListQuery::default()).await;

        let patch = UpdateAllocationInput {
            end_date: Some(Some(date("2025-02-01"))),
            ..UpdateAllocationInput::default()
        };
        let outcome = store
            .update_checked(current.id, patch, &AllocationContext::new(&apollo))
            .await;

        assert_eq!(
            outcome.validation_errors(),
            &[ValidationError::DateOrder { field: "endDate" }]
        );
        assert_eq!(remote.writes(), 0);
    }
}
