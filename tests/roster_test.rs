//! Roster management and bulk import tests
//!
//! Run with: cargo test --test roster_test

mod common;

use common::{TestEnvironment, ADMIN_A, EMPLOYEE, OUTSIDER};
use pretty_assertions::assert_eq;
use telepay::workflow::{import_employees, Actor, FormInput, FormOutcome, ImportReport, RosterError};

#[tokio::test]
async fn test_added_employee_is_notified_and_can_submit() {
    let env = TestEnvironment::new();

    env.deps
        .roster
        .add(ADMIN_A, OUTSIDER, Some("newbie"), Some("Nina"))
        .await
        .unwrap();

    assert!(env.store.is_active_employee(OUTSIDER));
    assert!(env.notifier.last_text_to(OUTSIDER).unwrap().contains("Welcome aboard"));

    let newbie = Actor::new(OUTSIDER, Some("newbie".to_string()));
    assert_eq!(env.feed(&newbie, FormInput::Start).await, FormOutcome::Advanced);

    assert_eq!(
        env.deps.roster.add(ADMIN_A, OUTSIDER, None, None).await.unwrap_err(),
        RosterError::AlreadyEmployee(OUTSIDER)
    );
}

#[tokio::test]
async fn test_removed_employee_loses_access() {
    let env = TestEnvironment::new();

    env.deps.roster.remove(ADMIN_A, EMPLOYEE).await.unwrap();

    assert!(!env.store.is_active_employee(EMPLOYEE));
    assert!(env.notifier.last_text_to(EMPLOYEE).unwrap().contains("revoked"));
    assert_eq!(env.feed(&env.employee(), FormInput::Start).await, FormOutcome::NotEmployee);

    assert_eq!(
        env.deps.roster.remove(ADMIN_A, EMPLOYEE).await.unwrap_err(),
        RosterError::NotEmployee(EMPLOYEE)
    );

    // Re-adding reactivates the same row
    env.deps.roster.add(ADMIN_A, EMPLOYEE, None, None).await.unwrap();
    assert!(env.store.is_active_employee(EMPLOYEE));
    assert_eq!(env.store.active_employee_count(), 1);
}

#[tokio::test]
async fn test_roster_changes_require_admin() {
    let env = TestEnvironment::new();

    assert_eq!(
        env.deps.roster.add(EMPLOYEE, OUTSIDER, None, None).await.unwrap_err(),
        RosterError::NotAdmin
    );
    assert_eq!(
        env.deps.roster.remove(EMPLOYEE, EMPLOYEE).await.unwrap_err(),
        RosterError::NotAdmin
    );
    assert_eq!(env.deps.roster.list(EMPLOYEE).unwrap_err(), RosterError::NotAdmin);
    assert!(env.notifier.sent_to(OUTSIDER).is_empty());
}

#[tokio::test]
async fn test_list_shows_active_employees_only() {
    let env = TestEnvironment::new();
    env.deps.roster.add(ADMIN_A, OUTSIDER, None, Some("Otto")).await.unwrap();
    env.deps.roster.remove(ADMIN_A, EMPLOYEE).await.unwrap();

    let employees = env.deps.roster.list(ADMIN_A).unwrap();
    assert_eq!(employees.len(), 1);
    assert_eq!(employees[0].user_id, OUTSIDER);
    assert_eq!(employees[0].display_name(), "Otto");
}

#[test]
fn test_import_skips_active_employees() {
    let env = TestEnvironment::new();

    let report = import_employees(&env.store, &[EMPLOYEE, OUTSIDER, 4001], ADMIN_A);

    assert_eq!(
        report,
        ImportReport {
            added: 2,
            skipped: 1,
            failed: 0,
        }
    );
    assert_eq!(env.store.active_employee_count(), 3);
    assert!(env.notifier.sent().is_empty());
}
